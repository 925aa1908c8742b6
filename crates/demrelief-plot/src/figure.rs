//! Figure composition and PNG output.

use crate::colormap::Colormap;
use crate::font::{draw_text, draw_text_vertical, text_width, GLYPH_HEIGHT};
use crate::histogram::Histogram;
use crate::PlotError;
use demrelief_dem::validate::{check_output_path, RENDER_EXTENSIONS};
use demrelief_dem::{write_atomic, GeoBounds};
use image::{Rgb, RgbImage};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Blank border around the figure, in pixels.
const MARGIN: u32 = 24;
/// Gap between the map and the colour bar.
const GAP: u32 = 12;
/// Gap between a panel and its text.
const TEXT_GAP: u32 = 4;
/// Width of the colour bar.
const COLORBAR_WIDTH: u32 = 20;
/// Smallest side of the histogram panel.
const MIN_HISTOGRAM_SIZE: u32 = 64;
/// Title glyphs are drawn at twice the label size.
const TITLE_SCALE: u32 = 2;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);
const BAR: Rgb<u8> = Rgb([31, 119, 180]);

/// A 2D plot of one raster band, ready to render or save.
#[derive(Debug, Clone)]
pub struct Figure {
    /// Plot title.
    pub title: String,
    /// Label of the horizontal axis.
    pub x_label: String,
    /// Label of the vertical axis.
    pub y_label: String,
    /// Label of the colour bar.
    pub colorbar_label: String,
    /// Colormap used for the map panel and colour bar.
    pub colormap: Colormap,
    /// Value range mapped onto the colormap.
    pub value_range: (f32, f32),
    /// Geographic extent of the map panel, when known.
    pub extent: Option<GeoBounds>,
    /// Colour-mapped raster, one pixel per sample.
    pub map: RgbImage,
    /// Optional value distribution panel.
    pub histogram: Option<Histogram>,
}

/// Canvas positions of the figure elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    width: u32,
    height: u32,
    map_x: u32,
    map_y: u32,
    bar_x: u32,
    /// Column of the colour-bar tick labels.
    bar_ticks_x: u32,
    /// Column of the vertical colour-bar label.
    bar_label_x: u32,
    hist_x: Option<u32>,
    hist_size: u32,
    /// Row of the horizontal tick labels.
    x_ticks_y: u32,
    /// Column of the upper horizontal tick label.
    x_hi_x: u32,
    x_label_x: u32,
    x_label_y: u32,
}

impl Figure {
    /// Tick labels at the left and right edges of the map.
    fn x_ticks(&self) -> (String, String) {
        match &self.extent {
            Some(e) => (tick_label(e.min_lon), tick_label(e.max_lon)),
            None => ("0".to_string(), self.map.width().to_string()),
        }
    }

    /// Tick labels at the top and bottom edges of the map.
    fn y_ticks(&self) -> (String, String) {
        match &self.extent {
            Some(e) => (tick_label(e.max_lat), tick_label(e.min_lat)),
            None => ("0".to_string(), self.map.height().to_string()),
        }
    }

    /// Colour-bar tick labels, maximum first.
    fn value_ticks(&self) -> (String, String) {
        (
            tick_label(self.value_range.1 as f64),
            tick_label(self.value_range.0 as f64),
        )
    }

    fn layout(&self) -> Layout {
        let (map_w, map_h) = self.map.dimensions();
        let hist_size = map_h.max(MIN_HISTOGRAM_SIZE);
        let (x_lo, x_hi) = self.x_ticks();
        let (y_top, y_bottom) = self.y_ticks();
        let (v_top, v_bottom) = self.value_ticks();

        // Left of the map: vertical axis label, then tick labels.
        let y_ticks_w = text_width(&y_top, 1).max(text_width(&y_bottom, 1));
        let map_x = MARGIN + GLYPH_HEIGHT + TEXT_GAP + y_ticks_w + TEXT_GAP;
        let map_y = MARGIN + GLYPH_HEIGHT * TITLE_SCALE + 2 * TEXT_GAP;

        let bar_x = map_x + map_w + GAP;
        let bar_ticks_x = bar_x + COLORBAR_WIDTH + TEXT_GAP;
        let bar_ticks_w = text_width(&v_top, 1).max(text_width(&v_bottom, 1));
        let bar_label_x = bar_ticks_x + bar_ticks_w + TEXT_GAP;
        let mut right = bar_label_x + GLYPH_HEIGHT;

        let hist_x = if self.histogram.is_some() {
            let x = right + MARGIN;
            right = x + hist_size;
            Some(x)
        } else {
            None
        };

        let mut panel_h = map_h
            .max(text_width(&self.y_label, 1))
            .max(text_width(&self.colorbar_label, 1));
        if hist_x.is_some() {
            panel_h = panel_h.max(hist_size);
        }

        let x_ticks_y = map_y + map_h + TEXT_GAP;
        let x_lo_w = text_width(&x_lo, 1);
        let x_hi_w = text_width(&x_hi, 1);
        let x_hi_x = (map_x + map_w)
            .saturating_sub(x_hi_w)
            .max(map_x + x_lo_w + TEXT_GAP);
        let x_label_w = text_width(&self.x_label, 1);
        let x_label_x = (map_x + map_w / 2)
            .saturating_sub(x_label_w / 2)
            .max(MARGIN);
        let x_label_y = x_ticks_y + GLYPH_HEIGHT + TEXT_GAP;

        let width = (right + MARGIN)
            .max(x_hi_x + x_hi_w + MARGIN)
            .max(x_label_x + x_label_w + MARGIN)
            .max(MARGIN + text_width(&self.title, TITLE_SCALE) + MARGIN);
        let height = (map_y + panel_h).max(x_label_y + GLYPH_HEIGHT) + MARGIN;

        Layout {
            width,
            height,
            map_x,
            map_y,
            bar_x,
            bar_ticks_x,
            bar_label_x,
            hist_x,
            hist_size,
            x_ticks_y,
            x_hi_x,
            x_label_x,
            x_label_y,
        }
    }

    /// Compose the panels and their text into a single image.
    ///
    /// Layout: title across the top; below it the framed map with latitude
    /// on the left and longitude underneath, the colour bar (maximum at the
    /// top) with its value range and label, then the histogram when present.
    /// Without a geographic extent the axes are labelled in pixels.
    pub fn render(&self) -> RgbImage {
        let l = self.layout();
        let (map_w, map_h) = self.map.dimensions();
        let mut canvas = RgbImage::from_pixel(l.width, l.height, BACKGROUND);

        let title_x = (l.width - text_width(&self.title, TITLE_SCALE)) / 2;
        draw_text(&mut canvas, &self.title, title_x, MARGIN, TITLE_SCALE, INK);

        image::imageops::replace(&mut canvas, &self.map, l.map_x as i64, l.map_y as i64);
        draw_frame(&mut canvas, l.map_x, l.map_y, map_w, map_h);

        let (x_lo, x_hi) = self.x_ticks();
        draw_text(&mut canvas, &x_lo, l.map_x, l.x_ticks_y, 1, INK);
        draw_text(&mut canvas, &x_hi, l.x_hi_x, l.x_ticks_y, 1, INK);
        draw_text(&mut canvas, &self.x_label, l.x_label_x, l.x_label_y, 1, INK);

        let (y_top, y_bottom) = self.y_ticks();
        let ticks_right = l.map_x - TEXT_GAP;
        draw_text(
            &mut canvas,
            &y_top,
            ticks_right - text_width(&y_top, 1),
            l.map_y,
            1,
            INK,
        );
        draw_text(
            &mut canvas,
            &y_bottom,
            ticks_right - text_width(&y_bottom, 1),
            bottom_row(l.map_y, map_h),
            1,
            INK,
        );
        draw_vertical_label(&mut canvas, &self.y_label, MARGIN, l.map_y, map_h);

        for y in 0..map_h {
            let t = if map_h > 1 {
                1.0 - y as f32 / (map_h - 1) as f32
            } else {
                1.0
            };
            let color = self.colormap.map(t);
            for x in 0..COLORBAR_WIDTH {
                canvas.put_pixel(l.bar_x + x, l.map_y + y, color);
            }
        }
        draw_frame(&mut canvas, l.bar_x, l.map_y, COLORBAR_WIDTH, map_h);

        let (v_top, v_bottom) = self.value_ticks();
        draw_text(&mut canvas, &v_top, l.bar_ticks_x, l.map_y, 1, INK);
        draw_text(
            &mut canvas,
            &v_bottom,
            l.bar_ticks_x,
            bottom_row(l.map_y, map_h),
            1,
            INK,
        );
        draw_vertical_label(
            &mut canvas,
            &self.colorbar_label,
            l.bar_label_x,
            l.map_y,
            map_h,
        );

        if let (Some(histogram), Some(hist_x)) = (&self.histogram, l.hist_x) {
            draw_histogram(&mut canvas, histogram, hist_x, l.map_y, l.hist_size);
        }

        canvas
    }

    /// Text annotations stored alongside the pixels.
    pub fn annotations(&self) -> Vec<(String, String)> {
        let mut text = vec![
            ("Title".to_string(), self.title.clone()),
            ("XLabel".to_string(), self.x_label.clone()),
            ("YLabel".to_string(), self.y_label.clone()),
            (
                "Colorbar".to_string(),
                format!(
                    "{} [{}, {}] ({})",
                    self.colorbar_label,
                    self.value_range.0,
                    self.value_range.1,
                    self.colormap.name()
                ),
            ),
        ];
        if let Some(extent) = &self.extent {
            text.push((
                "Extent".to_string(),
                format!(
                    "{}: {} to {}; {}: {} to {}",
                    self.x_label,
                    extent.min_lon,
                    extent.max_lon,
                    self.y_label,
                    extent.min_lat,
                    extent.max_lat
                ),
            ));
        }
        if let Some(histogram) = &self.histogram {
            let counts: Vec<String> = histogram.counts.iter().map(|c| c.to_string()).collect();
            text.push(("Histogram".to_string(), counts.join(",")));
        }
        text
    }

    /// Encode the rendered figure as PNG, annotations in UTF-8 iTXt chunks.
    pub fn encode_png(&self) -> Result<Vec<u8>, PlotError> {
        let canvas = self.render();
        let mut bytes = Vec::new();
        let mut encoder = png::Encoder::new(&mut bytes, canvas.width(), canvas.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        for (keyword, text) in self.annotations() {
            encoder.add_itxt_chunk(keyword, text)?;
        }
        let mut writer = encoder.write_header()?;
        writer.write_image_data(canvas.as_raw())?;
        writer.finish()?;
        Ok(bytes)
    }

    /// Render and write the figure as a PNG.
    ///
    /// The file appears only once fully written; on failure `path` is untouched.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PlotError> {
        let path = path.as_ref();
        check_output_path(path, RENDER_EXTENSIONS)?;

        let png = self.encode_png()?;
        write_atomic(path, |w| {
            w.write_all(&png)?;
            Ok(())
        })?;

        info!(path = %path.display(), title = %self.title, "figure saved");
        Ok(())
    }
}

/// Short decimal form: at most two decimals, trailing zeros dropped.
fn tick_label(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Top row of a label sitting on the bottom edge of a panel.
fn bottom_row(top: u32, height: u32) -> u32 {
    (top + height).saturating_sub(GLYPH_HEIGHT).max(top)
}

/// Vertical label centred on a panel of `height` rows starting at `top`.
fn draw_vertical_label(canvas: &mut RgbImage, text: &str, x: u32, top: u32, height: u32) {
    let len = text_width(text, 1);
    if len == 0 {
        return;
    }
    let span = height.max(len);
    draw_text_vertical(canvas, text, x, top + (span + len) / 2 - 1, 1, INK);
}

fn draw_frame(canvas: &mut RgbImage, x: u32, y: u32, w: u32, h: u32) {
    if w == 0 || h == 0 || x == 0 || y == 0 {
        return;
    }
    let (left, top, right, bottom) = (x - 1, y - 1, x + w, y + h);
    for px in left..=right {
        canvas.put_pixel(px, top, INK);
        canvas.put_pixel(px, bottom, INK);
    }
    for py in top..=bottom {
        canvas.put_pixel(left, py, INK);
        canvas.put_pixel(right, py, INK);
    }
}

fn draw_histogram(canvas: &mut RgbImage, histogram: &Histogram, x: u32, y: u32, size: u32) {
    let bins = histogram.counts.len() as u32;
    let peak = histogram.peak();
    if bins == 0 || peak == 0 {
        draw_frame(canvas, x, y, size, size);
        return;
    }

    let bar_width = (size / bins).max(1);
    for (i, &count) in histogram.counts.iter().enumerate() {
        let bar_height = (count as f64 / peak as f64 * size as f64).round() as u32;
        let x0 = x + i as u32 * bar_width;
        // One-pixel gutter between bars.
        for px in x0..(x0 + bar_width.saturating_sub(1)).min(x + size) {
            for py in (y + size - bar_height)..(y + size) {
                canvas.put_pixel(px, py, BAR);
            }
        }
    }
    draw_frame(canvas, x, y, size, size);
}
