//! Citation and usage document bundled into every `-all.zip`

use crate::core::error::{GbResult, ResultExt};
use std::fs;
use std::path::Path;

const COLUMNS: &[(&str, &str)] = &[
  (
    "boundaryID",
    "A unique ID created for every boundary in the geoBoundaries database by concatenating ISO 3166-1 3 letter country code, boundary level, geoBoundaries version, and an incrementing ID.",
  ),
  ("boundaryISO", "The ISO 3166-1 3-letter country codes for each boundary."),
  ("boundaryYear", "The year for which a boundary is representative."),
  (
    "boundaryType",
    "The type of boundary defined (i.e., ADM0 is equivalent to a country border; ADM1 a state. Levels below ADM1 can vary in definition by country.)",
  ),
  (
    "boundarySource-K",
    "The name of the Kth source for the boundary definition used (with most boundaries having two identified sources).",
  ),
  ("boundaryLicense", "The specific license the data is released under."),
  ("licenseDetail", "Any details necessary for the interpretation or use of the license noted."),
  (
    "licenseSource",
    "A resolvable URL (checked at the time of data release) declaring the license under which a data product is made available.",
  ),
  (
    "boundarySourceURL",
    "A resolvable URL (checked at the time of data release) from which source data was retrieved.",
  ),
  (
    "boundaryUpdate",
    "A date encoded following ISO 8601 (Year-Month-Date) describing the last date this boundary was updated, for use in programmatic updating based on new releases.",
  ),
  ("downloadURL", "A URL from which the geoBoundary can be downloaded."),
  (
    "shapeID",
    "The boundary ID, followed by the letter `B' and a unique integer for each shape which is a member of that boundary.",
  ),
  ("shapeName", "The identified name for a given shape. 'None' if not identified."),
  (
    "shapeGroup",
    "The country or similar organizational group that a shape belongs to, in ISO 3166-1 where relevant.",
  ),
  ("shapeType", "The type of boundary represented by the shape."),
  (
    "shapeISO",
    "ISO codes for individual administrative districts, where available. Where possible, these conform to ISO 3166-2, but this is not guaranteed in all cases. 'None' if not identified.",
  ),
];

const RULE: &str = "====================================================";

fn section(out: &mut String, title: &str) {
  out.push_str(RULE);
  out.push('\n');
  out.push_str(title);
  out.push('\n');
  out.push_str(RULE);
  out.push('\n');
}

/// Render the document for a version tag (`3_0_0` is shown as `3.0.0`)
pub fn render(version: &str) -> String {
  let dotted = version.replace('_', ".");
  let mut out = String::new();

  section(&mut out, "Citation of the geoBoundaries Data Product");
  out.push_str(&format!("geoBoundaries Version {}\n", dotted));
  out.push_str(
    "www.geoboundaries.org\n\
     geolab.wm.edu\n\
     The geoBoundaries database is made available in a variety of software\n\
     formats to support GIS software programs. Contrasted to other administrative\n\
     boundary datasets, geoBoundaries is an open product: all boundaries are open\n\
     and redistributable, and are released alongside extensive metadata and\n\
     license information to help inform end users.\n\
     We update geoBoundaries on a yearly cycle, with new versions in or around\n\
     August of each calendar year; old versions remain accessible at\n\
     www.geoboundaries.org.\n\
     The only requirement to use this data is to, with any use, provide\n\
     information on the authors (us), a link to geoboundaries.org or our\n\
     academic citation, and the version of geoBoundaries used.\n\
     Example citations for the current version of geoBoundaries are:\n\n",
  );

  out.push_str("+++++ General Use Citation +++++\n");
  out.push_str(&format!(
    "Please include the term 'geoBoundaries v. {}' with a link to https://www.geoboundaries.org\n\n",
    dotted
  ));
  out.push_str(
    "+++++ Academic Use Citation +++++++++++\n\
     Runfola D, Anderson A, Baier H, Crittenden M, Dowker E, Fuhrig S, et al. (2020)\n\
     geoBoundaries: A global database of political administrative boundaries.\n\
     PLoS ONE 15(4): e0231866. https://doi.org/10.1371/journal.pone.0231866.\n\n\
     Users using individual boundary files from geoBoundaries should additionally\n\
     ensure that they are citing the sources provided in the metadata for each file.\n\n",
  );

  section(&mut out, "Column Definitions");
  for (column, definition) in COLUMNS {
    out.push_str(&format!("{} - {}\n", column, definition));
  }
  out.push('\n');

  section(&mut out, "Reporting Issues or Errors");
  out.push_str(
    "We track issues associated with the geoBoundaries dataset publicly,\n\
     and any individual can contribute comments through our github repository:\n\
     https://github.com/wmgeolab/gbRelease\n\n\
     Thank you for citing your use of geoBoundaries and reporting any issues you find -\n\
     as a non-profit academic project, your citations are what keeps geoBoundaries alive.\n",
  );

  out
}

pub fn write(path: &Path, version: &str) -> GbResult<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  fs::write(path, render(version)).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_version_is_dotted() {
    let text = render("3_0_0");
    assert!(text.contains("geoBoundaries Version 3.0.0\n"));
    assert!(text.contains("'geoBoundaries v. 3.0.0'"));
    assert!(!text.contains("3_0_0"));
  }

  #[test]
  fn test_sections_and_columns() {
    let text = render("4_1");
    assert!(text.starts_with(RULE));
    assert!(text.contains("Column Definitions"));
    assert!(text.contains("shapeID - The boundary ID"));
    assert!(text.contains("Reporting Issues or Errors"));
  }

  #[test]
  fn test_write_creates_parent() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("tmp/CITATION.txt");
    write(&path, "3_0_0").unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("Version 3.0.0"));
  }
}
