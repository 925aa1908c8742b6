//! GeoTIFF raster reading and writing.

use crate::{DemError, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tiff::ColorType;

/// ModelPixelScaleTag: size of a pixel in model units (x, y, z).
const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
/// ModelTiepointTag: raster point (i, j, k) tied to model point (x, y, z).
const TAG_MODEL_TIEPOINT: u16 = 33922;
/// GeoKeyDirectoryTag: CRS description as a table of geo keys.
const TAG_GEO_KEY_DIRECTORY: u16 = 34735;
/// GDAL_NODATA: no-data value stored as an ASCII string.
const TAG_GDAL_NODATA: u16 = 42113;

/// GeographicTypeGeoKey (geographic CRS EPSG code).
const GEO_KEY_GEOGRAPHIC_TYPE: u16 = 2048;
/// ProjectedCSTypeGeoKey (projected CRS EPSG code).
const GEO_KEY_PROJECTED_CS_TYPE: u16 = 3072;
/// Geo key value meaning "user defined", i.e. no EPSG code.
const GEO_KEY_USER_DEFINED: u16 = 32767;

fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// Geographic bounds of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// Minimum latitude (south edge).
    pub min_lat: f64,
    /// Maximum latitude (north edge).
    pub max_lat: f64,
    /// Minimum longitude (west edge).
    pub min_lon: f64,
    /// Maximum longitude (east edge).
    pub max_lon: f64,
}

impl GeoBounds {
    /// Check if a coordinate is within the bounds.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// GeoTIFF tags carried through reads and writes unchanged (except scale on resize).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoReference {
    /// ModelPixelScale (x, y, z).
    pub pixel_scale: Option<Vec<f64>>,
    /// ModelTiepoint (i, j, k, x, y, z).
    pub tiepoint: Option<Vec<f64>>,
    /// Raw GeoKeyDirectory.
    pub geo_keys: Option<Vec<u16>>,
    /// No-data value as written by GDAL.
    pub nodata: Option<String>,
}

impl GeoReference {
    fn read<R: Read + Seek>(decoder: &mut Decoder<R>) -> Self {
        Self {
            pixel_scale: decoder.get_tag_f64_vec(tag(TAG_MODEL_PIXEL_SCALE)).ok(),
            tiepoint: decoder.get_tag_f64_vec(tag(TAG_MODEL_TIEPOINT)).ok(),
            geo_keys: decoder.get_tag_u16_vec(tag(TAG_GEO_KEY_DIRECTORY)).ok(),
            nodata: decoder
                .get_tag_ascii_string(tag(TAG_GDAL_NODATA))
                .ok()
                .map(|s| s.trim_end_matches('\0').trim().to_string()),
        }
    }

    fn write<W: Write + Seek, K: tiff::encoder::TiffKind>(
        &self,
        dir: &mut tiff::encoder::DirectoryEncoder<'_, W, K>,
    ) -> Result<()> {
        if let Some(scale) = &self.pixel_scale {
            dir.write_tag(tag(TAG_MODEL_PIXEL_SCALE), &scale[..])?;
        }
        if let Some(tiepoint) = &self.tiepoint {
            dir.write_tag(tag(TAG_MODEL_TIEPOINT), &tiepoint[..])?;
        }
        if let Some(keys) = &self.geo_keys {
            dir.write_tag(tag(TAG_GEO_KEY_DIRECTORY), &keys[..])?;
        }
        if let Some(nodata) = &self.nodata {
            dir.write_tag(tag(TAG_GDAL_NODATA), nodata.as_str())?;
        }
        Ok(())
    }

    /// Parsed no-data value, if the tag is present and numeric.
    pub fn nodata_value(&self) -> Option<f32> {
        self.nodata.as_deref().and_then(|s| s.parse().ok())
    }

    /// Corner coordinates of a `width` x `height` raster.
    ///
    /// Requires both the tiepoint and the pixel scale; the tiepoint is taken
    /// as the north-west corner with data running south and east.
    pub fn bounds(&self, width: u32, height: u32) -> Option<GeoBounds> {
        let tiepoint = self.tiepoint.as_ref()?;
        let scale = self.pixel_scale.as_ref()?;
        if tiepoint.len() < 6 || scale.len() < 2 {
            return None;
        }

        // Tiepoint format: [i, j, k, x, y, z]
        let tie_x = tiepoint[3] - tiepoint[0] * scale[0];
        let tie_y = tiepoint[4] + tiepoint[1] * scale[1];

        Some(GeoBounds {
            min_lat: tie_y - height as f64 * scale[1],
            max_lat: tie_y,
            min_lon: tie_x,
            max_lon: tie_x + width as f64 * scale[0],
        })
    }

    /// EPSG code of the coordinate reference system, if declared.
    ///
    /// A projected CRS wins over a geographic one.
    pub fn epsg(&self) -> Option<u16> {
        let keys = self.geo_keys.as_ref()?;
        if keys.len() < 4 {
            return None;
        }
        let count = keys[3] as usize;
        let mut geographic = None;
        let mut projected = None;

        // Entries after the header: [KeyID, TIFFTagLocation, Count, Value]
        for entry in keys[4..].chunks_exact(4).take(count) {
            let (id, location, value) = (entry[0], entry[1], entry[3]);
            if location != 0 || value == GEO_KEY_USER_DEFINED {
                continue;
            }
            match id {
                GEO_KEY_GEOGRAPHIC_TYPE => geographic = Some(value),
                GEO_KEY_PROJECTED_CS_TYPE => projected = Some(value),
                _ => {}
            }
        }
        projected.or(geographic)
    }
}

/// A raster loaded from a GeoTIFF, with every sample widened to `f32`.
#[derive(Debug, Clone)]
pub struct Raster {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// Samples per pixel.
    bands: usize,
    /// Pixel-interleaved samples in row-major order (north to south, west to east).
    samples: Vec<f32>,
    /// Georeferencing tags.
    geo: GeoReference,
}

impl Raster {
    /// Build a raster from interleaved samples.
    pub fn new(
        width: u32,
        height: u32,
        bands: usize,
        samples: Vec<f32>,
        geo: GeoReference,
    ) -> Result<Self> {
        let expected = width as usize * height as usize * bands;
        if bands == 0 || samples.len() != expected {
            return Err(DemError::InvalidGeoTiff(format!(
                "expected {expected} samples for {width}x{height}x{bands}, got {}",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bands,
            samples,
            geo,
        })
    }

    /// Load a raster from a GeoTIFF file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let mut decoder = Decoder::new(file)?;

        // A 1 arc-second 1x1 degree tile is 3601 x 3601 f32 samples (~52 MB);
        // OpenTopography cuts can be much larger.
        let mut limits = Limits::default();
        limits.decoding_buffer_size = 1024 * 1024 * 1024; // 1 GB
        limits.intermediate_buffer_size = 1024 * 1024 * 1024; // 1 GB
        limits.ifd_value_size = 1024 * 1024 * 1024;
        decoder = decoder.with_limits(limits);

        let (width, height) = decoder.dimensions()?;
        let bands = bands_for(decoder.colortype()?)?;
        let geo = GeoReference::read(&mut decoder);
        let samples = Self::decode_samples(&mut decoder)?;

        Self::new(width, height, bands, samples, geo)
    }

    /// Decode sample data from the TIFF decoder.
    fn decode_samples<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Vec<f32>> {
        let result = decoder.read_image()?;

        match result {
            DecodingResult::F32(data) => Ok(data),
            DecodingResult::F64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::I16(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::I32(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::U16(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::U32(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::U8(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::I8(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::U64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::I64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        }
    }

    /// Get the dimensions of this raster in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of bands (samples per pixel).
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// All samples, pixel-interleaved.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Georeferencing tags.
    pub fn geo(&self) -> &GeoReference {
        &self.geo
    }

    /// Mutable access to the georeferencing tags.
    pub fn geo_mut(&mut self) -> &mut GeoReference {
        &mut self.geo
    }

    /// Samples of a single band in row-major order.
    pub fn band(&self, index: usize) -> Vec<f32> {
        self.samples
            .iter()
            .skip(index)
            .step_by(self.bands)
            .copied()
            .collect()
    }

    /// Whether a sample holds real data (not NaN and not the declared no-data value).
    pub fn is_valid(&self, value: f32) -> bool {
        if value.is_nan() {
            return false;
        }
        match self.geo.nodata_value() {
            Some(nodata) => (value - nodata).abs() >= 0.001,
            None => true,
        }
    }

    /// Minimum and maximum over every valid sample of every band.
    ///
    /// Returns `None` when the raster holds no valid samples.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.samples
            .iter()
            .copied()
            .filter(|v| self.is_valid(*v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Corner coordinates, when the file is georeferenced.
    pub fn bounds(&self) -> Option<GeoBounds> {
        self.geo.bounds(self.width, self.height)
    }

    /// Encode as a 32-bit float GeoTIFF. Supports 1, 3 and 4 bands.
    pub fn write_geotiff_f32<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut encoder = TiffEncoder::new(writer)?;
        match self.bands {
            1 => {
                let mut image = encoder.new_image::<colortype::Gray32Float>(self.width, self.height)?;
                self.geo.write(image.encoder())?;
                image.write_data(&self.samples)?;
            }
            3 => {
                let mut image = encoder.new_image::<colortype::RGB32Float>(self.width, self.height)?;
                self.geo.write(image.encoder())?;
                image.write_data(&self.samples)?;
            }
            4 => {
                let mut image = encoder.new_image::<colortype::RGBA32Float>(self.width, self.height)?;
                self.geo.write(image.encoder())?;
                image.write_data(&self.samples)?;
            }
            n => {
                return Err(DemError::UnsupportedDataType(format!(
                    "cannot write {n}-band float GeoTIFF"
                )))
            }
        }
        Ok(())
    }

    /// Encode 8-bit samples with this raster's geometry and georeferencing.
    pub fn write_geotiff_u8<W: Write + Seek>(&self, data: &[u8], writer: W) -> Result<()> {
        if data.len() != self.samples.len() {
            return Err(DemError::InvalidGeoTiff(format!(
                "expected {} samples, got {}",
                self.samples.len(),
                data.len()
            )));
        }
        let mut encoder = TiffEncoder::new(writer)?;
        match self.bands {
            1 => {
                let mut image = encoder.new_image::<colortype::Gray8>(self.width, self.height)?;
                self.geo.write(image.encoder())?;
                image.write_data(data)?;
            }
            3 => {
                let mut image = encoder.new_image::<colortype::RGB8>(self.width, self.height)?;
                self.geo.write(image.encoder())?;
                image.write_data(data)?;
            }
            4 => {
                let mut image = encoder.new_image::<colortype::RGBA8>(self.width, self.height)?;
                self.geo.write(image.encoder())?;
                image.write_data(data)?;
            }
            n => {
                return Err(DemError::UnsupportedDataType(format!(
                    "cannot write {n}-band 8-bit GeoTIFF"
                )))
            }
        }
        Ok(())
    }
}

/// Pixel dimensions of a raster or image file without decoding its samples.
///
/// TIFFs are read with the TIFF decoder so float elevation rasters work;
/// other formats go through the `image` codecs.
pub fn read_dimensions<P: AsRef<Path>>(path: P) -> Result<(u32, u32)> {
    let path = path.as_ref();
    if crate::validate::has_extension(path, crate::validate::GEOTIFF_EXTENSIONS) {
        let file = std::fs::File::open(path)?;
        let mut decoder = Decoder::new(file)?;
        Ok(decoder.dimensions()?)
    } else {
        Ok(image::image_dimensions(path)?)
    }
}

/// Samples per pixel for a TIFF colour type.
fn bands_for(color: ColorType) -> Result<usize> {
    match color {
        ColorType::Gray(_) => Ok(1),
        ColorType::GrayA(_) => Ok(2),
        ColorType::RGB(_) => Ok(3),
        ColorType::RGBA(_) | ColorType::CMYK(_) => Ok(4),
        other => Err(DemError::UnsupportedDataType(format!("{other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn georeferenced() -> GeoReference {
        GeoReference {
            pixel_scale: Some(vec![0.25, 0.5, 0.0]),
            tiepoint: Some(vec![0.0, 0.0, 0.0, -123.0, 48.0, 0.0]),
            geo_keys: Some(vec![1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326]),
            nodata: None,
        }
    }

    #[test]
    fn test_bounds_from_tags() {
        let bounds = georeferenced().bounds(4, 2).unwrap();
        assert_relative_eq!(bounds.min_lon, -123.0);
        assert_relative_eq!(bounds.max_lon, -122.0);
        assert_relative_eq!(bounds.max_lat, 48.0);
        assert_relative_eq!(bounds.min_lat, 47.0);
        assert!(bounds.contains(47.5, -122.5));
        assert!(!bounds.contains(46.5, -122.5));
    }

    #[test]
    fn test_bounds_missing_tags() {
        assert!(GeoReference::default().bounds(10, 10).is_none());
    }

    #[test]
    fn test_epsg_from_geo_keys() {
        assert_eq!(georeferenced().epsg(), Some(4326));

        let projected = GeoReference {
            geo_keys: Some(vec![1, 1, 0, 2, 2048, 0, 1, 4326, 3072, 0, 1, 32610]),
            ..Default::default()
        };
        assert_eq!(projected.epsg(), Some(32610));

        let user_defined = GeoReference {
            geo_keys: Some(vec![1, 1, 0, 1, 2048, 0, 1, 32767]),
            ..Default::default()
        };
        assert_eq!(user_defined.epsg(), None);
    }

    #[test]
    fn test_min_max_skips_nodata_and_nan() {
        let geo = GeoReference {
            nodata: Some("-32768".to_string()),
            ..Default::default()
        };
        let raster = Raster::new(2, 2, 1, vec![-32768.0, 12.0, f32::NAN, 40.0], geo).unwrap();
        assert_eq!(raster.min_max(), Some((12.0, 40.0)));
    }

    #[test]
    fn test_band_extraction() {
        let raster = Raster::new(2, 1, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], GeoReference::default())
            .unwrap();
        assert_eq!(raster.band(0), vec![1.0, 4.0]);
        assert_eq!(raster.band(2), vec![3.0, 6.0]);
    }

    #[test]
    fn test_sample_count_mismatch() {
        assert!(Raster::new(2, 2, 1, vec![0.0; 3], GeoReference::default()).is_err());
    }

    #[test]
    fn test_f32_roundtrip_keeps_georeference() {
        let raster = Raster::new(4, 2, 1, (0..8).map(|v| v as f32).collect(), georeferenced())
            .unwrap();
        let mut buf = Cursor::new(Vec::new());
        raster.write_geotiff_f32(&mut buf).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dem.tif");
        std::fs::write(&path, buf.into_inner()).unwrap();

        let loaded = Raster::from_file(&path).unwrap();
        assert_eq!(loaded.dimensions(), (4, 2));
        assert_eq!(loaded.samples(), raster.samples());
        assert_eq!(loaded.geo().pixel_scale, georeferenced().pixel_scale);
        assert_eq!(loaded.geo().epsg(), Some(4326));
        assert_eq!(read_dimensions(&path).unwrap(), (4, 2));
    }
}
