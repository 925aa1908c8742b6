//! # demrelief-dem
//!
//! Download Digital Elevation Model (DEM) rasters from the OpenTopography
//! global DEM API and apply simple raster transforms to them.
//!
//! ## Overview
//!
//! - [`fetch`]: validated, all-or-nothing GeoTIFF download for a bounding box
//!   and one of the eleven global datasets.
//! - [`transform`]: downsampling ([`simplify`]), 8-bit conversion
//!   ([`convert_to_image`]) and summaries ([`describe`]).
//! - [`validate`]: path, extension and character checks shared by every
//!   operation. All checks run before any network or file I/O.
//!
//! ## Example
//!
//! ```no_run
//! use demrelief_dem::{describe, simplify, BoundingBox, Dataset, DemFetcher, DemRequest};
//!
//! let bbox = BoundingBox::new(46.9, 46.7, -121.6, -121.9)?;
//! let request = DemRequest::new(bbox, Dataset::Cop30, "my-api-key");
//! DemFetcher::new()?.fetch(&request, "rainier.tif")?;
//!
//! let summary = describe("rainier.tif")?;
//! println!("Elevation range: {} - {} meters", summary.min, summary.max);
//!
//! simplify("rainier.tif", "rainier_small.tif", 4)?;
//! # Ok::<(), demrelief_dem::DemError>(())
//! ```

mod bbox;
mod dataset;
mod error;
pub mod fetch;
pub mod output;
pub mod raster;
pub mod transform;
pub mod validate;

pub use bbox::BoundingBox;
pub use dataset::Dataset;
pub use error::{DemError, InvalidInput, RemoteError};
pub use fetch::{fetch_dem, DemFetcher, DemRequest, OPENTOPOGRAPHY_URL};
pub use output::write_atomic;
pub use raster::{read_dimensions, GeoBounds, GeoReference, Raster};
pub use transform::{convert_to_image, describe, simplify, DemSummary};

/// Result type for DEM operations.
pub type Result<T> = std::result::Result<T, DemError>;
