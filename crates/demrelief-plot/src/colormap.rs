//! Built-in colormaps, named after their matplotlib counterparts.
//!
//! Any name may take an `_r` suffix to reverse the ramp.

use demrelief_dem::InvalidInput;
use image::Rgb;

/// Built-in colormap names (case-sensitive).
pub const SUPPORTED: &[&str] = &["Greys", "gray", "viridis", "magma", "terrain"];

type Stops = &'static [(f32, [u8; 3])];

const GREYS: Stops = &[(0.0, [255, 255, 255]), (1.0, [0, 0, 0])];

const GRAY: Stops = &[(0.0, [0, 0, 0]), (1.0, [255, 255, 255])];

const VIRIDIS: Stops = &[
    (0.0, [68, 1, 84]),
    (0.25, [59, 82, 139]),
    (0.5, [33, 145, 140]),
    (0.75, [94, 201, 98]),
    (1.0, [253, 231, 37]),
];

const MAGMA: Stops = &[
    (0.0, [0, 0, 4]),
    (0.25, [81, 18, 124]),
    (0.5, [183, 55, 121]),
    (0.75, [252, 137, 97]),
    (1.0, [252, 253, 191]),
];

const TERRAIN: Stops = &[
    (0.0, [51, 51, 153]),
    (0.15, [0, 153, 255]),
    (0.25, [0, 204, 102]),
    (0.5, [255, 255, 153]),
    (0.75, [128, 92, 84]),
    (1.0, [255, 255, 255]),
];

/// A piecewise-linear colour ramp over `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    stops: Stops,
    reversed: bool,
}

impl Colormap {
    /// Look up a colormap by name, e.g. `"Greys_r"` or `"viridis"`.
    pub fn from_name(name: &str) -> Result<Self, InvalidInput> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        let stops = match base {
            "Greys" => GREYS,
            "gray" => GRAY,
            "viridis" => VIRIDIS,
            "magma" => MAGMA,
            "terrain" => TERRAIN,
            _ => {
                return Err(InvalidInput::UnknownColormap {
                    name: name.to_string(),
                    supported: SUPPORTED.join(", "),
                })
            }
        };
        Ok(Self {
            name: name.to_string(),
            stops,
            reversed,
        })
    }

    /// Name the colormap was looked up with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Colour at position `t`, clamped to `0.0..=1.0`.
    pub fn map(&self, t: f32) -> Rgb<u8> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };

        let upper = self
            .stops
            .iter()
            .position(|(pos, _)| *pos >= t)
            .unwrap_or(self.stops.len() - 1);
        if upper == 0 {
            return Rgb(self.stops[0].1);
        }

        let (p0, c0) = self.stops[upper - 1];
        let (p1, c1) = self.stops[upper];
        let f = (t - p0) / (p1 - p0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * f).round() as u8;
        Rgb([lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2])])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greys_r_runs_black_to_white() {
        let cmap = Colormap::from_name("Greys_r").unwrap();
        assert_eq!(cmap.map(0.0), Rgb([0, 0, 0]));
        assert_eq!(cmap.map(1.0), Rgb([255, 255, 255]));
        assert_eq!(cmap.map(0.5), Rgb([128, 128, 128]));
    }

    #[test]
    fn test_greys_runs_white_to_black() {
        let cmap = Colormap::from_name("Greys").unwrap();
        assert_eq!(cmap.map(0.0), Rgb([255, 255, 255]));
        assert_eq!(cmap.map(1.0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_stops_are_hit_exactly() {
        let cmap = Colormap::from_name("viridis").unwrap();
        assert_eq!(cmap.map(0.5), Rgb([33, 145, 140]));
        assert_eq!(cmap.map(1.0), Rgb([253, 231, 37]));
        let reversed = Colormap::from_name("viridis_r").unwrap();
        assert_eq!(reversed.map(0.0), Rgb([253, 231, 37]));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let cmap = Colormap::from_name("terrain").unwrap();
        assert_eq!(cmap.map(-3.0), cmap.map(0.0));
        assert_eq!(cmap.map(7.0), cmap.map(1.0));
        assert_eq!(cmap.map(f32::NAN), cmap.map(0.0));
    }

    #[test]
    fn test_unknown_colormap() {
        assert!(matches!(
            Colormap::from_name("jet"),
            Err(InvalidInput::UnknownColormap { .. })
        ));
        assert!(Colormap::from_name("greys_r").is_err());
    }
}
