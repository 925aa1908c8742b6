//! Built-in 5x7 bitmap font for figure text.
//!
//! Letters are drawn in upper case. Characters outside the table are drawn
//! as a hollow box so the text keeps its width.

use image::{Rgb, RgbImage};

/// Glyph cell width in font pixels.
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph cell height in font pixels.
pub const GLYPH_HEIGHT: u32 = 7;
/// Blank columns between glyphs.
const SPACING: u32 = 1;

const UNKNOWN: [u8; 7] = [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F];

/// Rows of `c`, top to bottom, with bit 4 as the leftmost column.
fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        ' ' => [0; 7],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '[' => [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E],
        ']' => [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '\'' => [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        _ => UNKNOWN,
    }
}

/// Width in canvas pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    (n * (GLYPH_WIDTH + SPACING) - SPACING) * scale
}

/// Draw `text` left to right with its top-left corner at (x, y).
///
/// Pixels falling outside the canvas are skipped.
pub fn draw_text(canvas: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    let advance = (GLYPH_WIDTH + SPACING) * scale;
    for (i, c) in text.chars().enumerate() {
        let gx = x + i as u32 * advance;
        stamp(canvas, c, scale, color, |col, row| (gx + col, y + row));
    }
}

/// Draw `text` bottom to top (rotated a quarter turn anticlockwise), its
/// first glyph ending at row `bottom` and its glyph tops at column `x`.
pub fn draw_text_vertical(
    canvas: &mut RgbImage,
    text: &str,
    x: u32,
    bottom: u32,
    scale: u32,
    color: Rgb<u8>,
) {
    let advance = (GLYPH_WIDTH + SPACING) * scale;
    let glyph_w = GLYPH_WIDTH * scale;
    for (i, c) in text.chars().enumerate() {
        let offset = i as u32 * advance;
        let Some(base) = bottom.checked_sub(offset + glyph_w - 1) else {
            break;
        };
        // Glyph column becomes a row counted up from the bottom.
        stamp(canvas, c, scale, color, |col, row| {
            (x + row, base + glyph_w - 1 - col)
        });
    }
}

fn stamp<F>(canvas: &mut RgbImage, c: char, scale: u32, color: Rgb<u8>, place: F)
where
    F: Fn(u32, u32) -> (u32, u32),
{
    let (width, height) = canvas.dimensions();
    for (row, bits) in glyph(c).iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (0x10 >> col) == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let (px, py) = place(col * scale + dx, row as u32 * scale + dy);
                    if px < width && py < height {
                        canvas.put_pixel(px, py, color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn ink(canvas: &RgbImage) -> Vec<(u32, u32)> {
        canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == BLACK)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("A", 1), 5);
        assert_eq!(text_width("AB", 1), 11);
        assert_eq!(text_width("AB", 2), 22);
        // Counted per character, not per byte.
        assert_eq!(text_width("山", 1), 5);
    }

    #[test]
    fn test_draw_hyphen() {
        let mut canvas = RgbImage::from_pixel(10, 10, WHITE);
        draw_text(&mut canvas, "-", 2, 1, 1, BLACK);
        let expected: Vec<(u32, u32)> = (2..7).map(|x| (x, 4)).collect();
        assert_eq!(ink(&canvas), expected);
    }

    #[test]
    fn test_lowercase_matches_uppercase() {
        let mut lower = RgbImage::from_pixel(12, 8, WHITE);
        let mut upper = RgbImage::from_pixel(12, 8, WHITE);
        draw_text(&mut lower, "dm", 0, 0, 1, BLACK);
        draw_text(&mut upper, "DM", 0, 0, 1, BLACK);
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_vertical_hyphen_is_a_column() {
        let mut canvas = RgbImage::from_pixel(10, 10, WHITE);
        draw_text_vertical(&mut canvas, "-", 1, 8, 1, BLACK);
        // Row 3 of the glyph becomes column x + 3, running up from the bottom.
        let expected: Vec<(u32, u32)> = (4..9).map(|y| (4, y)).collect();
        assert_eq!(ink(&canvas), expected);
    }

    #[test]
    fn test_clipped_at_canvas_edge() {
        let mut canvas = RgbImage::from_pixel(4, 4, WHITE);
        draw_text(&mut canvas, "W", 2, 2, 2, BLACK);
        assert!(!ink(&canvas).is_empty());
    }

    #[test]
    fn test_unknown_character_is_boxed() {
        let mut canvas = RgbImage::from_pixel(5, 7, WHITE);
        draw_text(&mut canvas, "山", 0, 0, 1, BLACK);
        assert_eq!(*canvas.get_pixel(0, 0), BLACK);
        assert_eq!(*canvas.get_pixel(4, 6), BLACK);
        assert_eq!(*canvas.get_pixel(2, 3), WHITE);
    }
}
