//! Rendering parameters.

use demrelief_dem::InvalidInput;
use serde::{Deserialize, Serialize};

/// Rendering parameters for a shaded-relief image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Vertical exaggeration applied by the displacement node.
    pub exaggeration: f32,
    /// Angular diameter of the sun in degrees (0 = hard shadows, 180 = fully diffuse).
    pub shadow_softness: f32,
    /// Elevation of the sun above the horizon in degrees.
    pub sun_angle: f32,
    /// Compass bearing the light comes from, in degrees clockwise from north.
    pub sun_azimuth: f32,
    /// Output resolution as a percentage of the DEM image resolution.
    pub resolution_scale: u32,
    /// Path-tracing samples per pixel.
    pub samples: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            exaggeration: 0.5,
            shadow_softness: 90.0,
            sun_angle: 45.0,
            sun_azimuth: 315.0,
            resolution_scale: 50,
            samples: 5,
        }
    }
}

impl RenderConfig {
    /// Check every parameter against its accepted range.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if !self.exaggeration.is_finite() || self.exaggeration < 0.0 {
            return Err(InvalidInput::OutOfRange {
                name: "exaggeration",
                value: self.exaggeration as f64,
                expected: "finite and >= 0",
            });
        }
        if !(0.0..=180.0).contains(&self.shadow_softness) {
            return Err(InvalidInput::OutOfRange {
                name: "shadow_softness",
                value: self.shadow_softness as f64,
                expected: "0 to 180 degrees",
            });
        }
        if !(0.0..=90.0).contains(&self.sun_angle) {
            return Err(InvalidInput::OutOfRange {
                name: "sun_angle",
                value: self.sun_angle as f64,
                expected: "0 to 90 degrees",
            });
        }
        if !(0.0..360.0).contains(&self.sun_azimuth) {
            return Err(InvalidInput::OutOfRange {
                name: "sun_azimuth",
                value: self.sun_azimuth as f64,
                expected: "0 to 360 degrees (exclusive)",
            });
        }
        if !(1..=100).contains(&self.resolution_scale) {
            return Err(InvalidInput::OutOfRange {
                name: "resolution_scale",
                value: self.resolution_scale as f64,
                expected: "1 to 100 percent",
            });
        }
        if self.samples == 0 {
            return Err(InvalidInput::OutOfRange {
                name: "samples",
                value: 0.0,
                expected: ">= 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range() {
        let cases = [
            RenderConfig { exaggeration: -0.1, ..Default::default() },
            RenderConfig { exaggeration: f32::NAN, ..Default::default() },
            RenderConfig { shadow_softness: 181.0, ..Default::default() },
            RenderConfig { sun_angle: -1.0, ..Default::default() },
            RenderConfig { sun_angle: f32::NAN, ..Default::default() },
            RenderConfig { sun_azimuth: 360.0, ..Default::default() },
            RenderConfig { sun_azimuth: -45.0, ..Default::default() },
            RenderConfig { sun_azimuth: f32::INFINITY, ..Default::default() },
            RenderConfig { resolution_scale: 0, ..Default::default() },
            RenderConfig { resolution_scale: 101, ..Default::default() },
            RenderConfig { samples: 0, ..Default::default() },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(InvalidInput::OutOfRange { .. })),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_edges_are_inclusive() {
        let config = RenderConfig {
            exaggeration: 0.0,
            shadow_softness: 180.0,
            sun_angle: 90.0,
            sun_azimuth: 0.0,
            resolution_scale: 100,
            samples: 1,
        };
        assert!(config.validate().is_ok());
    }
}
