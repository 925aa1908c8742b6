//! Error types for plotting.

use demrelief_dem::{DemError, InvalidInput};
use thiserror::Error;

/// Errors that can occur while building or saving a plot.
#[derive(Debug, Error)]
pub enum PlotError {
    /// A caller-supplied argument failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// Reading the raster or writing the figure failed.
    #[error(transparent)]
    Dem(#[from] DemError),

    /// The raster has no valid samples to plot.
    #[error("Raster has no valid samples to plot")]
    Empty,

    /// PNG encoding error.
    #[error("PNG encode error: {0}")]
    Png(#[from] png::EncodingError),
}
