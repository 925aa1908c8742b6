//! Global DEM datasets offered by the OpenTopography API.

use crate::error::InvalidInput;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A global elevation dataset accepted by the `demtype` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dataset {
    /// SRTM GL3 (90m).
    #[serde(rename = "SRTMGL3")]
    SrtmGl3,
    /// SRTM GL1 (30m).
    #[default]
    #[serde(rename = "SRTMGL1")]
    SrtmGl1,
    /// SRTM GL1 ellipsoidal heights.
    #[serde(rename = "SRTMGL1_E")]
    SrtmGl1E,
    /// ALOS World 3D (30m).
    #[serde(rename = "AW3D30")]
    Aw3d30,
    /// ALOS World 3D ellipsoidal heights.
    #[serde(rename = "AW3D30_E")]
    Aw3d30E,
    /// Global bathymetry and topography at 15 arc-seconds.
    #[serde(rename = "SRTM15Plus")]
    Srtm15Plus,
    /// NASADEM (30m).
    #[serde(rename = "NASADEM")]
    NasaDem,
    /// Copernicus GLO-30.
    #[serde(rename = "COP30")]
    Cop30,
    /// Copernicus GLO-90.
    #[serde(rename = "COP90")]
    Cop90,
    /// Continental Europe digital terrain model.
    #[serde(rename = "EU_DTM")]
    EuDtm,
    /// GEDI L3 gridded land surface elevation.
    #[serde(rename = "GEDI_L3")]
    GediL3,
}

impl Dataset {
    /// Every dataset, in the order the API documents them.
    pub const ALL: [Dataset; 11] = [
        Dataset::SrtmGl3,
        Dataset::SrtmGl1,
        Dataset::SrtmGl1E,
        Dataset::Aw3d30,
        Dataset::Aw3d30E,
        Dataset::Srtm15Plus,
        Dataset::NasaDem,
        Dataset::Cop30,
        Dataset::Cop90,
        Dataset::EuDtm,
        Dataset::GediL3,
    ];

    /// Name used by the API.
    pub fn api_name(&self) -> &'static str {
        match self {
            Dataset::SrtmGl3 => "SRTMGL3",
            Dataset::SrtmGl1 => "SRTMGL1",
            Dataset::SrtmGl1E => "SRTMGL1_E",
            Dataset::Aw3d30 => "AW3D30",
            Dataset::Aw3d30E => "AW3D30_E",
            Dataset::Srtm15Plus => "SRTM15Plus",
            Dataset::NasaDem => "NASADEM",
            Dataset::Cop30 => "COP30",
            Dataset::Cop90 => "COP90",
            Dataset::EuDtm => "EU_DTM",
            Dataset::GediL3 => "GEDI_L3",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

impl FromStr for Dataset {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::ALL
            .iter()
            .copied()
            .find(|d| d.api_name() == s)
            .ok_or_else(|| InvalidInput::UnknownDataset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_names() {
        for dataset in Dataset::ALL {
            assert_eq!(dataset.api_name().parse::<Dataset>().unwrap(), dataset);
        }
    }

    #[test]
    fn test_unknown_dataset() {
        assert_eq!(
            "srtmgl1".parse::<Dataset>(),
            Err(InvalidInput::UnknownDataset("srtmgl1".to_string()))
        );
        assert!("ASTER".parse::<Dataset>().is_err());
        assert!("".parse::<Dataset>().is_err());
    }

    #[test]
    fn test_default_is_srtmgl1() {
        assert_eq!(Dataset::default().to_string(), "SRTMGL1");
    }
}
