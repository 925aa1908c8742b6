//! OpenTopography global DEM fetcher.
//!
//! Downloads a GeoTIFF covering a bounding box from the `globaldem` endpoint:
//!
//! `https://portal.opentopography.org/API/globaldem?demtype=..&south=..&north=..&west=..&east=..&outputFormat=GTiff&API_Key=..`
//!
//! Non-success statuses are mapped to [`RemoteError`]; a success response
//! whose body reports "No Data" is mapped to [`DemError::NoDataAvailable`].
//! The output file is only created when the whole body has been received.

use crate::bbox::BoundingBox;
use crate::dataset::Dataset;
use crate::error::{InvalidInput, RemoteError};
use crate::output::write_atomic;
use crate::validate::{check_output_path, GEOTIFF_EXTENSIONS};
use crate::{DemError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Production endpoint for global DEM requests.
pub const OPENTOPOGRAPHY_URL: &str = "https://portal.opentopography.org/API/globaldem";

/// Default request timeout. Large extents can take minutes to be cut.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Marker the API puts in the body when the extent has no coverage.
const NO_DATA_SENTINEL: &[u8] = b"No Data";

/// Parameters of a single DEM download.
#[derive(Clone, PartialEq)]
pub struct DemRequest {
    /// Extent to download.
    pub bbox: BoundingBox,
    /// Dataset to cut from.
    pub dataset: Dataset,
    /// OpenTopography API key.
    pub api_key: String,
}

impl std::fmt::Debug for DemRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemRequest")
            .field("bbox", &self.bbox)
            .field("dataset", &self.dataset)
            .finish_non_exhaustive()
    }
}

impl DemRequest {
    /// Build a request from already validated parts.
    pub fn new(bbox: BoundingBox, dataset: Dataset, api_key: impl Into<String>) -> Self {
        Self {
            bbox,
            dataset,
            api_key: api_key.into(),
        }
    }

    /// Build a request from raw bounds and a dataset name.
    ///
    /// The dataset is checked before the bounds.
    pub fn from_bounds(
        north: f64,
        south: f64,
        east: f64,
        west: f64,
        dataset: &str,
        api_key: impl Into<String>,
    ) -> std::result::Result<Self, InvalidInput> {
        let dataset: Dataset = dataset.parse()?;
        let bbox = BoundingBox::new(north, south, east, west)?;
        Ok(Self::new(bbox, dataset, api_key))
    }

    /// Query parameters in the order the API documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("demtype", self.dataset.api_name().to_string()),
            ("south", self.bbox.south().to_string()),
            ("north", self.bbox.north().to_string()),
            ("west", self.bbox.west().to_string()),
            ("east", self.bbox.east().to_string()),
            ("outputFormat", "GTiff".to_string()),
            ("API_Key", self.api_key.clone()),
        ]
    }
}

/// Blocking client for the global DEM endpoint.
pub struct DemFetcher {
    /// Endpoint URL without query string.
    base_url: String,
    /// HTTP client for downloading rasters.
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for DemFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemFetcher")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DemFetcher {
    /// Create a fetcher for the production endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(OPENTOPOGRAPHY_URL, DEFAULT_TIMEOUT)
    }

    /// Create a fetcher for a different endpoint (mirror or test server).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Endpoint this fetcher talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Download the DEM described by `request` into `output`.
    ///
    /// `output` must end in `.tif`/`.tiff` and its directory must exist.
    /// Returns the path written.
    pub fn fetch<P: AsRef<Path>>(&self, request: &DemRequest, output: P) -> Result<PathBuf> {
        let output = output.as_ref();
        check_output_path(output, GEOTIFF_EXTENSIONS)?;

        debug!(
            dataset = %request.dataset,
            north = request.bbox.north(),
            south = request.bbox.south(),
            east = request.bbox.east(),
            west = request.bbox.west(),
            "requesting DEM"
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&request.query_pairs())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::from_status(status.as_u16()).into());
        }

        let bytes = response.bytes()?;
        if contains_sentinel(&bytes) {
            return Err(DemError::NoDataAvailable);
        }

        let path = write_atomic(output, |w| {
            w.write_all(&bytes)?;
            Ok(())
        })?;

        info!(path = %path.display(), bytes = bytes.len(), "DEM downloaded");
        Ok(path)
    }
}

fn contains_sentinel(body: &[u8]) -> bool {
    body.windows(NO_DATA_SENTINEL.len())
        .any(|w| w == NO_DATA_SENTINEL)
}

/// Download a DEM from OpenTopography with a one-off fetcher.
pub fn fetch_dem<P: AsRef<Path>>(
    bbox: BoundingBox,
    api_key: &str,
    output: P,
    dataset: Dataset,
) -> Result<PathBuf> {
    // Validate before building a client so bad paths never touch the network stack.
    check_output_path(output.as_ref(), GEOTIFF_EXTENSIONS)?;
    DemFetcher::new()?.fetch(&DemRequest::new(bbox, dataset, api_key), output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> DemRequest {
        DemRequest::from_bounds(10.0, -0.5, 10.0, -20.25, "SRTMGL1", "key").unwrap()
    }

    #[test]
    fn test_query_pairs() {
        let pairs = request().query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("demtype", "SRTMGL1".to_string()),
                ("south", "-0.5".to_string()),
                ("north", "10".to_string()),
                ("west", "-20.25".to_string()),
                ("east", "10".to_string()),
                ("outputFormat", "GTiff".to_string()),
                ("API_Key", "key".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_bounds_checks_dataset_first() {
        let err = DemRequest::from_bounds(0.0, 10.0, 10.0, 0.0, "BOGUS", "key").unwrap_err();
        assert!(matches!(err, InvalidInput::UnknownDataset(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let request = DemRequest::from_bounds(1.0, 0.0, 1.0, 0.0, "COP30", "SECRET123").unwrap();
        let text = format!("{:?}", request);
        assert!(!text.contains("SECRET123"));
        assert!(text.contains("Cop30"));
    }

    #[test]
    fn test_sentinel_detection() {
        assert!(contains_sentinel(b"{\"error\": \"No Data\"}"));
        assert!(!contains_sentinel(b"II*\0binary"));
        assert!(!contains_sentinel(b""));
    }
}
