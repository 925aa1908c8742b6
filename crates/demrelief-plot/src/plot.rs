//! Build a [`Figure`] from a GeoTIFF DEM.

use crate::colormap::Colormap;
use crate::figure::Figure;
use crate::histogram::{Histogram, DEFAULT_BINS};
use crate::PlotError;
use demrelief_dem::validate::{check_input_path, GEOTIFF_EXTENSIONS};
use demrelief_dem::Raster;
use image::{Rgb, RgbImage};
use std::path::Path;
use tracing::debug;

/// Colour used for no-data samples.
const NODATA_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Options for [`plot`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    /// Add a value-distribution panel next to the map.
    pub show_histogram: bool,
    /// Colormap name, see [`crate::colormap::SUPPORTED`].
    pub colormap: String,
    /// Figure title.
    pub title: String,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            show_histogram: true,
            colormap: "Greys_r".to_string(),
            title: "DEM Map".to_string(),
        }
    }
}

/// Plot the first band of a GeoTIFF DEM.
pub fn plot<P: AsRef<Path>>(geotiff: P, options: &PlotOptions) -> Result<Figure, PlotError> {
    let path = geotiff.as_ref();
    check_input_path(path, GEOTIFF_EXTENSIONS)?;
    let colormap = Colormap::from_name(&options.colormap)?;

    let raster = Raster::from_file(path)?;
    let (width, height) = raster.dimensions();
    let band = raster.band(0);
    let valid: Vec<f32> = band.iter().copied().filter(|v| raster.is_valid(*v)).collect();
    let (min, max) = valid
        .iter()
        .copied()
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f32::min(lo, v), f32::max(hi, v))),
        })
        .ok_or(PlotError::Empty)?;

    let span = max - min;
    let map = RgbImage::from_fn(width, height, |x, y| {
        let v = band[(y * width + x) as usize];
        if !raster.is_valid(v) {
            NODATA_COLOR
        } else if span > 0.0 {
            colormap.map((v - min) / span)
        } else {
            colormap.map(0.0)
        }
    });

    let histogram = if options.show_histogram {
        Histogram::from_values(&valid, DEFAULT_BINS)
    } else {
        None
    };

    debug!(width, height, min, max, colormap = colormap.name(), "plotted band 1");

    Ok(Figure {
        title: options.title.clone(),
        x_label: "Longitude".to_string(),
        y_label: "Latitude".to_string(),
        colorbar_label: "Pixel Value".to_string(),
        colormap,
        value_range: (min, max),
        extent: raster.bounds(),
        map,
        histogram,
    })
}
