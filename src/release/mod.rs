//! Release assembly
//!
//! Turns the nightly metadata table and the fixed source shapefiles into the
//! versioned release tree. The batch driver ([`batch`]) resolves the snapshot,
//! stamps boundary IDs and fans rows out over a rayon pool; each row goes
//! through [`boundary::BoundaryBuilder`], which writes GeoJSON, shapefile,
//! sidecars and bundles for every product with a build step.
//!
//! # Output tree
//!
//! ```text
//! gbReleaseData/
//!   geoBoundaries-3_0_0.csv
//!   HPSCU/QAT/ADM1/
//!     geoBoundaries-3_0_0-QAT-ADM1.geojson
//!     geoBoundaries-3_0_0-QAT-ADM1-metaData.json
//!     geoBoundaries-3_0_0-QAT-ADM1-metaData.txt
//!     geoBoundaries-3_0_0-QAT-ADM1-shp.zip
//!     geoBoundaries-3_0_0-QAT-ADM1-all.zip
//! ```

pub mod batch;
pub mod boundary;
pub mod buildlog;
mod bundle;
pub mod citation;
mod geojson;
pub mod geometry;
pub mod layout;
pub mod metadata;
pub mod plan;
pub mod product;
mod shp_writer;
mod sidecar;

pub use batch::{ReleaseReport, prepare, run, worker_count};
pub use layout::ReleaseLayout;
pub use plan::BuildPlan;
pub use product::ProductType;
