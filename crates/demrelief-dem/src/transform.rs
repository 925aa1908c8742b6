//! Raster transforms: downsampling, 8-bit conversion and summaries.

use crate::error::InvalidInput;
use crate::output::write_atomic;
use crate::raster::{GeoBounds, Raster};
use crate::validate::{
    check_input_path, check_output_path, has_extension, GEOTIFF_EXTENSIONS, IMAGE_EXTENSIONS,
};
use crate::{DemError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Smallest reduction factor that actually shrinks an image.
pub const MIN_REDUCTION_FACTOR: u32 = 2;

/// Validity mask level for good samples; kept inside the `0..=1` range the
/// float filters clamp to so negative filter lobes still show up.
const MASK_VALID: f32 = 0.5;
const MASK_TOLERANCE: f32 = 1e-4;

/// Downsample an image or GeoTIFF by an integer factor.
///
/// The output is `floor(width / factor)` x `floor(height / factor)`, resampled
/// with a bicubic (Catmull-Rom) filter. When both paths are GeoTIFFs the
/// samples stay `f32` and the georeferencing is rescaled to the new grid;
/// otherwise the file goes through the `image` codecs and is saved in the
/// format implied by the output extension.
///
/// Returns the new dimensions.
pub fn simplify<P, Q>(input: P, output: Q, reduction_factor: u32) -> Result<(u32, u32)>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (input, output) = (input.as_ref(), output.as_ref());
    check_input_path(input, IMAGE_EXTENSIONS)?;
    check_output_path(output, IMAGE_EXTENSIONS)?;
    if reduction_factor < MIN_REDUCTION_FACTOR {
        return Err(InvalidInput::ReductionFactorTooSmall(reduction_factor).into());
    }

    let dims = if has_extension(input, GEOTIFF_EXTENSIONS) && has_extension(output, GEOTIFF_EXTENSIONS)
    {
        simplify_raster(input, output, reduction_factor)?
    } else {
        simplify_image(input, output, reduction_factor)?
    };

    info!(
        input = %input.display(),
        output = %output.display(),
        width = dims.0,
        height = dims.1,
        "simplified raster"
    );
    Ok(dims)
}

fn reduced_dimensions(width: u32, height: u32, factor: u32) -> Result<(u32, u32)> {
    let (new_width, new_height) = (width / factor, height / factor);
    if new_width == 0 || new_height == 0 {
        return Err(InvalidInput::ReductionTooLarge {
            factor,
            width,
            height,
        }
        .into());
    }
    Ok((new_width, new_height))
}

fn simplify_raster(input: &Path, output: &Path, factor: u32) -> Result<(u32, u32)> {
    let raster = Raster::from_file(input)?;
    let (width, height) = raster.dimensions();
    let (new_width, new_height) = reduced_dimensions(width, height, factor)?;
    let bands = raster.bands();

    let fill = raster.geo().nodata_value().unwrap_or(f32::NAN);

    let mut samples = vec![0.0f32; new_width as usize * new_height as usize * bands];
    for band in 0..bands {
        let resized = resize_band(
            raster.band(band),
            (width, height),
            (new_width, new_height),
            |v| raster.is_valid(v),
            fill,
        )?;
        for (i, value) in resized.into_iter().enumerate() {
            samples[i * bands + band] = value;
        }
    }

    let mut geo = raster.geo().clone();
    if let Some(scale) = geo.pixel_scale.as_mut() {
        if scale.len() >= 2 {
            scale[0] *= width as f64 / new_width as f64;
            scale[1] *= height as f64 / new_height as f64;
        }
    }

    let reduced = Raster::new(new_width, new_height, bands, samples, geo)?;
    write_atomic(output, |w| reduced.write_geotiff_f32(w))?;
    Ok((new_width, new_height))
}

/// Bicubic resize of one band.
///
/// The `image` float filters clamp to `0.0..=1.0`, so valid samples are
/// normalised to their own range first and mapped back afterwards. Output
/// pixels whose filter footprint touches an invalid sample become `fill`.
fn resize_band(
    values: Vec<f32>,
    from: (u32, u32),
    to: (u32, u32),
    is_valid: impl Fn(f32) -> bool,
    fill: f32,
) -> Result<Vec<f32>> {
    let valid: Vec<bool> = values.iter().map(|&v| is_valid(v)).collect();
    let (lo, hi) = values
        .iter()
        .zip(&valid)
        .filter(|(_, ok)| **ok)
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), (&v, _)| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return Ok(vec![fill; to.0 as usize * to.1 as usize]);
    }

    let span = hi - lo;
    let normalised: Vec<f32> = values
        .iter()
        .zip(&valid)
        .map(|(&v, &ok)| if ok && span > 0.0 { (v - lo) / span } else { 0.0 })
        .collect();
    let resized = resize_plane(normalised, from, to)?;

    let voids = if valid.iter().all(|&ok| ok) {
        None
    } else {
        let mask = valid
            .iter()
            .map(|&ok| if ok { MASK_VALID } else { 0.0 })
            .collect();
        Some(resize_plane(mask, from, to)?)
    };

    Ok(resized
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let touched = voids
                .as_ref()
                .is_some_and(|mask| (mask[i] - MASK_VALID).abs() > MASK_TOLERANCE);
            if touched {
                fill
            } else {
                lo + v * span
            }
        })
        .collect())
}

fn resize_plane(values: Vec<f32>, from: (u32, u32), to: (u32, u32)) -> Result<Vec<f32>> {
    let plane: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_raw(from.0, from.1, values)
        .ok_or_else(|| {
            DemError::InvalidGeoTiff(format!("band does not match {}x{}", from.0, from.1))
        })?;
    Ok(imageops::resize(&plane, to.0, to.1, FilterType::CatmullRom).into_raw())
}

fn simplify_image(input: &Path, output: &Path, factor: u32) -> Result<(u32, u32)> {
    let img = image::open(input)?;
    let (new_width, new_height) = reduced_dimensions(img.width(), img.height(), factor)?;
    let format = ImageFormat::from_path(output)?;
    let resized = img.resize_exact(new_width, new_height, FilterType::CatmullRom);
    write_atomic(output, |w| Ok(resized.write_to(w, format)?))?;
    Ok((new_width, new_height))
}

/// Linearly rescale samples to `0..=255`.
///
/// Invalid samples map to 0. Fails with [`DemError::DegenerateData`] when every
/// valid sample has the same value.
pub fn rescale_to_u8(raster: &Raster) -> Result<Vec<u8>> {
    let (min, max) = raster
        .min_max()
        .ok_or_else(|| DemError::InvalidGeoTiff("raster holds no valid samples".to_string()))?;
    if max == min {
        return Err(DemError::DegenerateData { value: min });
    }

    let span = (max - min) as f64;
    Ok(raster
        .samples()
        .iter()
        .map(|&v| {
            if raster.is_valid(v) {
                ((v - min) as f64 * 255.0 / span) as u8
            } else {
                0
            }
        })
        .collect())
}

/// Convert a GeoTIFF DEM into a viewable 8-bit image.
///
/// The output format follows the extension: `.png` and `.bmp` are written by
/// the `image` codecs, `.tif`/`.tiff` become an 8-bit GeoTIFF that keeps the
/// source georeferencing. Nothing is written if any step fails, and no
/// auxiliary sidecar file is ever produced.
pub fn convert_to_image<P, Q>(geotiff: P, output: Q) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (input, output) = (geotiff.as_ref(), output.as_ref());
    check_input_path(input, GEOTIFF_EXTENSIONS)?;
    check_output_path(output, IMAGE_EXTENSIONS)?;

    let raster = Raster::from_file(input)?;
    let data = rescale_to_u8(&raster)?;
    let (width, height) = raster.dimensions();

    if has_extension(output, GEOTIFF_EXTENSIONS) {
        write_atomic(output, |w| raster.write_geotiff_u8(&data, w))?;
    } else {
        let format = ImageFormat::from_path(output)?;
        let img = to_dynamic_image(width, height, raster.bands(), data)?;
        write_atomic(output, |w| Ok(img.write_to(w, format)?))?;
    }

    debug!(bands = raster.bands(), width, height, "rescaled to 8-bit");
    info!(input = %input.display(), output = %output.display(), "converted GeoTIFF to image");
    Ok(())
}

fn to_dynamic_image(width: u32, height: u32, bands: usize, data: Vec<u8>) -> Result<DynamicImage> {
    let mismatch = || DemError::InvalidGeoTiff("sample count does not match dimensions".to_string());
    let img = match bands {
        1 => DynamicImage::ImageLuma8(ImageBuffer::from_raw(width, height, data).ok_or_else(mismatch)?),
        2 => DynamicImage::ImageLumaA8(ImageBuffer::from_raw(width, height, data).ok_or_else(mismatch)?),
        3 => DynamicImage::ImageRgb8(ImageBuffer::from_raw(width, height, data).ok_or_else(mismatch)?),
        4 => DynamicImage::ImageRgba8(ImageBuffer::from_raw(width, height, data).ok_or_else(mismatch)?),
        n => {
            return Err(DemError::UnsupportedDataType(format!(
                "cannot write {n}-band image"
            )))
        }
    };
    Ok(img)
}

/// Summary statistics of a GeoTIFF DEM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemSummary {
    /// Smallest valid sample over all bands.
    pub min: f32,
    /// Largest valid sample over all bands.
    pub max: f32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of bands.
    pub bands: usize,
    /// Corner coordinates, when the file is georeferenced.
    pub bounds: Option<GeoBounds>,
    /// EPSG code of the CRS, when declared.
    pub epsg: Option<u16>,
}

impl DemSummary {
    /// Key/value view labelled "min pixel value" and "max pixel value".
    pub fn to_map(&self) -> BTreeMap<&'static str, f32> {
        BTreeMap::from([("min pixel value", self.min), ("max pixel value", self.max)])
    }
}

/// Summarise a GeoTIFF DEM.
pub fn describe<P: AsRef<Path>>(geotiff: P) -> Result<DemSummary> {
    let path = geotiff.as_ref();
    check_input_path(path, GEOTIFF_EXTENSIONS)?;

    let raster = Raster::from_file(path)?;
    let (min, max) = raster
        .min_max()
        .ok_or_else(|| DemError::InvalidGeoTiff("raster holds no valid samples".to_string()))?;
    let (width, height) = raster.dimensions();

    Ok(DemSummary {
        min,
        max,
        width,
        height,
        bands: raster.bands(),
        bounds: raster.bounds(),
        epsg: raster.geo().epsg(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::GeoReference;

    #[test]
    fn test_reduced_dimensions_floor() {
        assert_eq!(reduced_dimensions(101, 99, 2).unwrap(), (50, 49));
        assert_eq!(reduced_dimensions(200, 300, 3).unwrap(), (66, 100));
    }

    #[test]
    fn test_reduced_dimensions_too_large() {
        assert!(matches!(
            reduced_dimensions(3, 100, 4),
            Err(DemError::InvalidInput(InvalidInput::ReductionTooLarge { .. }))
        ));
    }

    #[test]
    fn test_resize_band_keeps_elevation_range() {
        let values: Vec<f32> = (0..16).map(|v| 1000.0 + v as f32 * 10.0).collect();
        let resized = resize_band(values, (4, 4), (2, 2), f32::is_finite, f32::NAN).unwrap();
        assert_eq!(resized.len(), 4);
        for v in resized {
            assert!((1000.0..=1150.0).contains(&v), "{v} outside source range");
        }
    }

    #[test]
    fn test_resize_band_uniform() {
        let resized = resize_band(vec![42.0; 9], (3, 3), (1, 1), f32::is_finite, f32::NAN).unwrap();
        assert_eq!(resized, vec![42.0]);
    }

    #[test]
    fn test_resize_band_masks_voids() {
        // 8x8 plateau with one void near the bottom-right corner.
        let mut values = vec![1000.0f32; 64];
        values[6 * 8 + 6] = -32768.0;
        let resized =
            resize_band(values, (8, 8), (4, 4), |v| v != -32768.0, -32768.0).unwrap();

        assert_eq!(resized[0], 1000.0);
        assert_eq!(resized[15], -32768.0);
        for v in resized {
            assert!(v == 1000.0 || v == -32768.0, "invented elevation {v}");
        }
    }

    #[test]
    fn test_resize_band_all_invalid() {
        let resized = resize_band(vec![f32::NAN; 4], (2, 2), (1, 1), f32::is_finite, -9999.0).unwrap();
        assert_eq!(resized, vec![-9999.0]);
    }

    #[test]
    fn test_rescale_endpoints() {
        let raster = Raster::new(4, 1, 1, vec![0.0, 5.0, 10.0, 255.0], GeoReference::default()).unwrap();
        let data = rescale_to_u8(&raster).unwrap();
        assert_eq!(data, vec![0, 5, 10, 255]);

        let raster = Raster::new(3, 1, 1, vec![100.0, 150.0, 200.0], GeoReference::default()).unwrap();
        assert_eq!(rescale_to_u8(&raster).unwrap(), vec![0, 127, 255]);
    }

    #[test]
    fn test_rescale_maximum_reaches_255() {
        for max in [0.3f32, 0.7, 7.7, 113.0, 1234.567, 8848.86] {
            let raster = Raster::new(2, 1, 1, vec![0.0, max], GeoReference::default()).unwrap();
            assert_eq!(rescale_to_u8(&raster).unwrap(), vec![0, 255], "max {max}");
        }
        let raster = Raster::new(2, 1, 1, vec![-12.1, 3.3], GeoReference::default()).unwrap();
        assert_eq!(rescale_to_u8(&raster).unwrap(), vec![0, 255]);
    }

    #[test]
    fn test_rescale_uniform_is_degenerate() {
        let raster = Raster::new(2, 2, 1, vec![7.0; 4], GeoReference::default()).unwrap();
        assert!(matches!(
            rescale_to_u8(&raster),
            Err(DemError::DegenerateData { value }) if value == 7.0
        ));
    }

    #[test]
    fn test_summary_map_keys() {
        let summary = DemSummary {
            min: 0.0,
            max: 255.0,
            width: 4,
            height: 1,
            bands: 1,
            bounds: None,
            epsg: None,
        };
        let map = summary.to_map();
        assert_eq!(map["min pixel value"], 0.0);
        assert_eq!(map["max pixel value"], 255.0);
    }
}
