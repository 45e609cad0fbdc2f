//! Field rules for meta.txt
//!
//! `MetaValidator` applies the schema to one archive's parsed entries. It is a
//! pure function of its inputs: the lookup tables, the current year, the
//! archive path and whether a license image is present.

use super::meta_file::ParsedMeta;
use super::report::{ArchiveReport, Finding};
use super::schema::{Field, VALID_BOUNDARY_TYPES, is_provided};
use super::status::Accumulator;
use crate::reference::{IsoTable, LicenseTable, ReleaseType};

/// Earliest year (exclusive) a boundary may represent
pub const MIN_YEAR: i64 = 1990;

/// Validates parsed meta.txt entries against the field schema
pub struct MetaValidator<'a> {
  iso: &'a IsoTable,
  licenses: &'a LicenseTable,
  current_year: i64,
}

/// Scan state for one archive
struct Scan<'r> {
  archive: &'r str,
  has_license_image: bool,
  acc: Accumulator,
  findings: Vec<Finding>,
}

impl Scan<'_> {
  fn info(&mut self, field: Field, msg: impl Into<String>) {
    self.findings.push(Finding::info(Some(field), msg));
  }

  fn warn(&mut self, field: Field, msg: impl Into<String>) {
    self.findings.push(Finding::warning(Some(field), msg));
  }

  fn critical(&mut self, field: Option<Field>, msg: impl Into<String>) {
    self.acc.mark_critical();
    self.findings.push(Finding::critical(field, msg));
  }
}

impl<'a> MetaValidator<'a> {
  pub fn new(iso: &'a IsoTable, licenses: &'a LicenseTable, current_year: i64) -> Self {
    Self {
      iso,
      licenses,
      current_year,
    }
  }

  /// Validate one archive's metadata
  ///
  /// `archive` is the path as it appears in the change list; the release type
  /// folder check runs against it.
  pub fn validate(&self, archive: &str, meta: &ParsedMeta, has_license_image: bool) -> ArchiveReport {
    let mut scan = Scan {
      archive,
      has_license_image,
      acc: Accumulator::new(),
      findings: Vec::new(),
    };

    for line in &meta.skipped {
      scan
        .findings
        .push(Finding::warning(None, format!("Ignoring line {} with no key/value separator", line)));
    }

    for entry in &meta.entries {
      for field in Field::matching(&entry.key) {
        self.apply(&mut scan, field, &entry.value);
      }
    }

    self.check_license_compatibility(&mut scan);

    if !scan.acc.status(Field::Source).is_satisfied() {
      scan.critical(Some(Field::Source), "No data source was provided in the metadata.");
    }

    let passed = !scan.acc.is_critical();
    let (required, optional) = scan.acc.into_groups();
    ArchiveReport {
      archive: archive.to_string(),
      meta_found: true,
      passed,
      entries: meta.entries.clone(),
      findings: scan.findings,
      required,
      optional,
    }
  }

  fn apply(&self, scan: &mut Scan<'_>, field: Field, value: &str) {
    match field {
      Field::Year => self.check_year(scan, value),
      Field::BoundaryType => check_boundary_type(scan, value),
      Field::Iso => self.check_iso(scan, value),
      Field::Source => {
        if is_provided(value) {
          scan.acc.satisfy(Field::Source);
          scan.info(field, format!("Source detected: {}", value));
        } else {
          scan.critical(Some(field), "Empty source line.");
        }
      }
      Field::ReleaseType => check_release_type(scan, value),
      Field::License => self.check_license(scan, value),
      Field::LicenseSource => {
        if is_provided(value) {
          scan.acc.satisfy(Field::LicenseSource);
          scan.info(field, format!("License source detected: {}", value));
          if scan.has_license_image {
            scan.acc.satisfy(Field::LicenseImage);
            scan.info(Field::LicenseImage, "License image found.");
          } else {
            scan.warn(
              Field::LicenseImage,
              "No license image found. This is not required. We check for license.png and license.jpg.",
            );
          }
        } else {
          scan.critical(Some(field), "No license source detected.");
        }
      }
      Field::DataSource => {
        if is_provided(value) {
          scan.acc.satisfy(Field::DataSource);
          scan.info(field, format!("Data source found: {}", value));
        } else {
          scan.critical(Some(field), "No link to source data detected.");
        }
      }
      Field::Canonical | Field::LicenseNotes | Field::OtherNotes => check_optional(scan, field, value),
      Field::ReleaseTypeFolder | Field::LicenseImage => {}
    }
  }

  fn check_year(&self, scan: &mut Scan<'_>, value: &str) {
    let year = match value.trim().parse::<f64>() {
      Ok(y) if y.is_finite() => y.trunc() as i64,
      _ => {
        scan.critical(
          Some(Field::Year),
          format!("The year in the meta.txt file is not a number: {}", value),
        );
        return;
      }
    };

    if year > MIN_YEAR && year < self.current_year {
      scan.acc.satisfy(Field::Year);
      scan.info(Field::Year, format!("Valid year {} detected.", year));
    } else {
      scan.critical(
        Some(Field::Year),
        format!(
          "The year in the meta.txt file is invalid: {}. We expect a value between {} and {}.",
          year, MIN_YEAR, self.current_year
        ),
      );
    }
  }

  fn check_iso(&self, scan: &mut Scan<'_>, value: &str) {
    if value.chars().count() != 3 {
      scan.critical(
        Some(Field::Iso),
        format!(
          "ISO is invalid: {} - we expect a 3-character ISO code following ISO-3166-1 (Alpha 3).",
          value
        ),
      );
    } else if !self.iso.contains(value) {
      scan.critical(
        Some(Field::Iso),
        format!("ISO {} is not on our list of valid ISO-3 codes.", value),
      );
    } else {
      scan.acc.satisfy(Field::Iso);
      scan.info(Field::Iso, format!("Valid ISO detected: {}", value));
    }
  }

  fn check_license(&self, scan: &mut Scan<'_>, value: &str) {
    if self.licenses.contains(value) {
      scan.acc.satisfy_with(Field::License, value.trim().to_lowercase());
      scan.info(Field::License, format!("Valid license type detected: {}", value));
    } else {
      scan.critical(
        Some(Field::License),
        format!(
          "Invalid license detected: {}. If you believe your license should be included, please open a ticket.",
          value
        ),
      );
    }
  }

  fn check_license_compatibility(&self, scan: &mut Scan<'_>) {
    let license = scan.acc.status(Field::License).value().map(str::to_string);
    let release = scan
      .acc
      .status(Field::ReleaseType)
      .value()
      .and_then(ReleaseType::parse);

    let (Some(license), Some(release)) = (license, release) else {
      return;
    };

    if self.licenses.eligible_for(&license, release) {
      scan.info(
        Field::License,
        format!("License type is a valid license for the {} product.", release),
      );
    } else {
      scan.critical(
        Some(Field::License),
        format!("The license you have specified is not valid for the {} product.", release),
      );
    }
  }
}

fn check_boundary_type(scan: &mut Scan<'_>, value: &str) {
  let normalized = value.to_uppercase().replace(' ', "");
  if VALID_BOUNDARY_TYPES.contains(&normalized.as_str()) {
    scan.acc.satisfy(Field::BoundaryType);
    scan.info(Field::BoundaryType, format!("Valid boundary type detected: {}.", value));
  } else {
    scan.critical(
      Some(Field::BoundaryType),
      format!(
        "The boundary type in the meta.txt file is invalid: {}. We expect one of: {}",
        value,
        VALID_BOUNDARY_TYPES.join(", ")
      ),
    );
  }
}

fn check_release_type(scan: &mut Scan<'_>, value: &str) {
  let Some(release) = ReleaseType::parse(value) else {
    scan.critical(
      Some(Field::ReleaseType),
      format!(
        "Invalid release type detected: {}. We expect one of three values: gbOpen, gbAuthoritative, and gbHumanitarian",
        value
      ),
    );
    return;
  };

  scan.acc.satisfy_with(Field::ReleaseType, release.identifier());
  if scan.archive.to_lowercase().contains(release.identifier()) {
    scan.acc.satisfy(Field::ReleaseTypeFolder);
    scan.info(Field::ReleaseType, format!("Valid release type detected: {}", release));
  } else {
    let archive = scan.archive.to_string();
    scan.critical(
      Some(Field::ReleaseTypeFolder),
      format!(
        "The zip file is in the incorrect subdirectory - according to meta.txt you are submitting a {} boundary, but have the zip file in the folder {}.",
        release, archive
      ),
    );
  }
}

fn check_optional(scan: &mut Scan<'_>, field: Field, value: &str) {
  if is_provided(value) {
    scan.acc.satisfy(field);
    scan.info(field, format!("{} detected: {}", field, value));
  } else {
    scan.warn(field, format!("No {} detected. This field is optional.", field));
  }
}
