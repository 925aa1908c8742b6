//! Geographic bounding box for DEM requests.

use crate::error::InvalidInput;
use serde::{Deserialize, Serialize};

/// Latitude/longitude extent of a DEM request, in decimal degrees.
///
/// Constructed through [`BoundingBox::new`], which guarantees
/// `-90 <= south <= north <= 90` and `-180 <= west <= east <= 180`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds")]
pub struct BoundingBox {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

/// Unchecked wire form; deserialization goes through [`BoundingBox::new`].
#[derive(Deserialize)]
struct RawBounds {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

impl TryFrom<RawBounds> for BoundingBox {
    type Error = InvalidInput;

    fn try_from(raw: RawBounds) -> Result<Self, Self::Error> {
        Self::new(raw.north, raw.south, raw.east, raw.west)
    }
}

impl BoundingBox {
    /// Validate and build a bounding box.
    ///
    /// Checks run in a fixed order: latitude range, north/south ordering,
    /// longitude range, east/west ordering.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self, InvalidInput> {
        let lat_ok = |v: f64| (-90.0..=90.0).contains(&v);
        let lon_ok = |v: f64| (-180.0..=180.0).contains(&v);

        if !lat_ok(north) || !lat_ok(south) {
            return Err(InvalidInput::LatitudeOutOfRange { north, south });
        }
        if north < south {
            return Err(InvalidInput::NorthBelowSouth { north, south });
        }
        if !lon_ok(east) || !lon_ok(west) {
            return Err(InvalidInput::LongitudeOutOfRange { east, west });
        }
        if east < west {
            return Err(InvalidInput::EastBelowWest { east, west });
        }

        Ok(Self {
            north,
            south,
            east,
            west,
        })
    }

    /// Northern latitude.
    pub fn north(&self) -> f64 {
        self.north
    }

    /// Southern latitude.
    pub fn south(&self) -> f64 {
        self.south
    }

    /// Eastern longitude.
    pub fn east(&self) -> f64 {
        self.east
    }

    /// Western longitude.
    pub fn west(&self) -> f64 {
        self.west
    }

    /// Extent in degrees as `(longitude span, latitude span)`.
    pub fn span(&self) -> (f64, f64) {
        (self.east - self.west, self.north - self.south)
    }
}
