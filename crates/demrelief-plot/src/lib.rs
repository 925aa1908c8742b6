//! # demrelief-plot
//!
//! 2D visualisation of GeoTIFF DEMs: the first band drawn through a
//! colormap, a colour bar, and an optional histogram of elevation values.
//!
//! ```no_run
//! use demrelief_plot::{plot, PlotOptions};
//!
//! let figure = plot("rainier.tif", &PlotOptions::default())?;
//! figure.save("rainier_plot.png")?;
//! # Ok::<(), demrelief_plot::PlotError>(())
//! ```

pub mod colormap;
mod error;
mod figure;
mod font;
pub mod histogram;
mod plot;

pub use colormap::Colormap;
pub use error::PlotError;
pub use figure::Figure;
pub use histogram::Histogram;
pub use plot::{plot, PlotOptions};
