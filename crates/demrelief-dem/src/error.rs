//! Error types for the DEM crate.

use thiserror::Error;

/// Errors that can occur when fetching or transforming DEM data.
#[derive(Debug, Error)]
pub enum DemError {
    /// A caller-supplied argument failed validation. No I/O was performed.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// The elevation API answered with a non-success status.
    #[error(transparent)]
    RemoteRequestFailed(#[from] RemoteError),

    /// The request succeeded but the dataset has no samples for the extent.
    #[error("Request was OK, however there is no data for specified extent")]
    NoDataAvailable,

    /// Every sample in the raster has the same value, so it cannot be rescaled.
    #[error("Raster has a uniform sample value of {value}; cannot rescale to 8-bit")]
    DegenerateData {
        /// The single value found in the raster.
        value: f32,
    },

    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding or encoding error.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// Image codec error (PNG/BMP/TIFF via the `image` crate).
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// HTTP transport error (connection refused, timeout, ...).
    ///
    /// Built without the request URL, whose query carries the API key.
    #[error("HTTP request error: {0}")]
    HttpRequest(#[source] reqwest::Error),

    /// Temporary output could not be moved into place.
    #[error("Failed to persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Invalid GeoTIFF - inconsistent size or tags.
    #[error("Invalid GeoTIFF: {0}")]
    InvalidGeoTiff(String),

    /// Unsupported data type or band layout in the TIFF file.
    #[error("Unsupported TIFF data type: {0}")]
    UnsupportedDataType(String),
}

impl From<reqwest::Error> for DemError {
    fn from(err: reqwest::Error) -> Self {
        DemError::HttpRequest(err.without_url())
    }
}

/// A violated input constraint. Each variant names the check that failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    /// Path contains characters outside `[a-zA-Z0-9_\-\\/.\s:]`.
    #[error("Path \"{0}\" contains invalid characters")]
    InvalidCharacters(String),

    /// The directory that should receive an output file does not exist.
    #[error("Output file path \"{0}\" does not exist, please create it")]
    MissingDirectory(String),

    /// An input file does not exist.
    #[error("Input file path \"{0}\" does not exist")]
    MissingFile(String),

    /// The file extension is not one the operation accepts.
    #[error("File \"{path}\" has an unsupported extension (expected one of: {allowed})")]
    UnsupportedExtension {
        /// Offending path.
        path: String,
        /// Comma-separated list of accepted extensions.
        allowed: String,
    },

    /// North or south bound outside [-90, 90].
    #[error("The values for north/south bounds must fall between -90 and 90 (got north={north}, south={south})")]
    LatitudeOutOfRange {
        /// North bound.
        north: f64,
        /// South bound.
        south: f64,
    },

    /// East or west bound outside [-180, 180].
    #[error("The values for east/west bounds must fall between -180 and 180 (got east={east}, west={west})")]
    LongitudeOutOfRange {
        /// East bound.
        east: f64,
        /// West bound.
        west: f64,
    },

    /// North bound below south bound.
    #[error("The north bound must be greater than the south bound (north={north}, south={south})")]
    NorthBelowSouth {
        /// North bound.
        north: f64,
        /// South bound.
        south: f64,
    },

    /// East bound below west bound.
    #[error("The east bound must be greater than the west bound (east={east}, west={west})")]
    EastBelowWest {
        /// East bound.
        east: f64,
        /// West bound.
        west: f64,
    },

    /// Dataset name not offered by OpenTopography.
    #[error("Invalid dataset: \"{0}\" not present in available datasets offered by OpenTopography")]
    UnknownDataset(String),

    /// Reduction factor below 2 would not shrink the image.
    #[error("reduction_factor \"{0}\" must be greater than or equal to 2 to reduce resolution")]
    ReductionFactorTooSmall(u32),

    /// Reduction factor so large that a dimension would become zero.
    #[error("reduction_factor \"{factor}\" would reduce a {width}x{height} image to nothing")]
    ReductionTooLarge {
        /// Requested factor.
        factor: u32,
        /// Input width.
        width: u32,
        /// Input height.
        height: u32,
    },

    /// A numeric parameter is outside its accepted range.
    #[error("Parameter {name} = {value} is out of range ({expected})")]
    OutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Supplied value.
        value: f64,
        /// Human-readable accepted range.
        expected: &'static str,
    },

    /// Colormap name is not one of the built-ins.
    #[error("Unknown colormap \"{name}\" (supported: {supported})")]
    UnknownColormap {
        /// Requested name.
        name: String,
        /// Comma-separated list of supported names.
        supported: String,
    },
}

/// Non-success HTTP responses from the elevation API, keyed on status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// HTTP 400.
    #[error("Bad Request (Error Code 400): Verify boundaries provided create a valid bounding box and do not exceed the area limitations of the dataset")]
    BadRequest,

    /// HTTP 401.
    #[error("Unauthorized (Error Code 401): API key provided is invalid")]
    Unauthorized,

    /// HTTP 500.
    #[error("Internal Server Error (Error Code 500): OpenTopography database is currently down")]
    ServerUnavailable,

    /// Any other non-success status.
    #[error("HTTP request failed with status {status}")]
    Http {
        /// Original status code.
        status: u16,
    },
}

impl RemoteError {
    /// Classify a non-success HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => RemoteError::BadRequest,
            401 => RemoteError::Unauthorized,
            500 => RemoteError::ServerUnavailable,
            _ => RemoteError::Http { status },
        }
    }

    /// The HTTP status code this error was built from.
    pub fn status(&self) -> u16 {
        match self {
            RemoteError::BadRequest => 400,
            RemoteError::Unauthorized => 401,
            RemoteError::ServerUnavailable => 500,
            RemoteError::Http { status } => *status,
        }
    }
}
