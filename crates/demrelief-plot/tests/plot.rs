//! Plotting tests on generated rasters.

use demrelief_dem::{GeoReference, InvalidInput, Raster};
use demrelief_plot::{plot, PlotError, PlotOptions};
use image::Rgb;
use std::fs::File;
use std::path::{Path, PathBuf};

fn write_dem(dir: &Path, samples: Vec<f32>, width: u32, height: u32) -> PathBuf {
    let path = dir.join("dem.tif");
    let geo = GeoReference {
        pixel_scale: Some(vec![0.5, 0.5, 0.0]),
        tiepoint: Some(vec![0.0, 0.0, 0.0, 5.0, 10.0, 0.0]),
        geo_keys: None,
        nodata: Some("-9999".to_string()),
    };
    Raster::new(width, height, 1, samples, geo)
        .unwrap()
        .write_geotiff_f32(File::create(&path).unwrap())
        .unwrap();
    path
}

#[test]
fn test_plot_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let samples: Vec<f32> = (0..20).map(|v| v as f32 * 10.0).collect();
    let path = write_dem(dir.path(), samples, 5, 4);

    let figure = plot(&path, &PlotOptions::default()).unwrap();
    assert_eq!(figure.title, "DEM Map");
    assert_eq!(figure.colormap.name(), "Greys_r");
    assert_eq!(figure.value_range, (0.0, 190.0));
    assert_eq!(figure.map.dimensions(), (5, 4));
    // Greys_r: lowest value black, highest white.
    assert_eq!(*figure.map.get_pixel(0, 0), Rgb([0, 0, 0]));
    assert_eq!(*figure.map.get_pixel(4, 3), Rgb([255, 255, 255]));

    let histogram = figure.histogram.as_ref().unwrap();
    assert_eq!(histogram.counts.len(), 10);
    assert_eq!(histogram.total(), 20);

    let extent = figure.extent.unwrap();
    assert_eq!((extent.min_lon, extent.max_lon), (5.0, 7.5));
    assert_eq!((extent.min_lat, extent.max_lat), (8.0, 10.0));
}

#[test]
fn test_plot_nodata_and_no_histogram() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dem(dir.path(), vec![-9999.0, 1.0, 2.0, 3.0], 2, 2);

    let options = PlotOptions {
        show_histogram: false,
        colormap: "viridis".to_string(),
        title: "Ridge".to_string(),
    };
    let figure = plot(&path, &options).unwrap();
    assert!(figure.histogram.is_none());
    assert_eq!(figure.value_range, (1.0, 3.0));
    assert_eq!(*figure.map.get_pixel(0, 0), Rgb([255, 255, 255]));
}

#[test]
fn test_plot_rejects_unknown_colormap() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dem(dir.path(), vec![1.0, 2.0], 2, 1);
    let options = PlotOptions {
        colormap: "rainbow_trout".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        plot(&path, &options),
        Err(PlotError::InvalidInput(InvalidInput::UnknownColormap { .. }))
    ));
}

#[test]
fn test_plot_rejects_bad_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = plot(dir.path().join("missing.tif"), &PlotOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        PlotError::InvalidInput(InvalidInput::MissingFile(_))
    ));
    let err = plot(dir.path().join("bad|name.tif"), &PlotOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        PlotError::InvalidInput(InvalidInput::InvalidCharacters(_))
    ));
}

fn itxt(path: &Path, keyword: &str) -> Option<String> {
    let decoder = png::Decoder::new(File::open(path).unwrap());
    let reader = decoder.read_info().unwrap();
    reader
        .info()
        .utf8_text
        .iter()
        .find(|chunk| chunk.keyword == keyword)
        .map(|chunk| chunk.get_text().unwrap())
}

#[test]
fn test_save_writes_annotated_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dem(dir.path(), (0..16).map(|v| v as f32).collect(), 4, 4);
    let figure = plot(&path, &PlotOptions::default()).unwrap();

    let out = dir.path().join("figure.png");
    figure.save(&out).unwrap();

    assert_eq!(image::image_dimensions(&out).unwrap(), figure.render().dimensions());
    assert_eq!(itxt(&out, "Title").as_deref(), Some("DEM Map"));
    assert_eq!(itxt(&out, "YLabel").as_deref(), Some("Latitude"));
}

#[test]
fn test_save_unicode_title() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dem(dir.path(), (0..16).map(|v| v as f32).collect(), 4, 4);
    let options = PlotOptions {
        title: "富士山 DEM".to_string(),
        ..Default::default()
    };
    let figure = plot(&path, &options).unwrap();

    let out = dir.path().join("fuji.png");
    // Overwrites an existing file in one step.
    std::fs::write(&out, b"stale").unwrap();
    figure.save(&out).unwrap();

    assert_eq!(itxt(&out, "Title").as_deref(), Some("富士山 DEM"));
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["dem.tif".to_string(), "fuji.png".to_string()]);
}

#[test]
fn test_save_requires_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dem(dir.path(), vec![1.0, 2.0], 2, 1);
    let figure = plot(&path, &PlotOptions::default()).unwrap();
    assert!(matches!(
        figure.save(dir.path().join("figure.bmp")),
        Err(PlotError::InvalidInput(InvalidInput::UnsupportedExtension { .. }))
    ));
}
