//! Engine configuration
//!
//! [`EngineConfig`] is built once at startup and passed by reference into
//! every calculation. It is never mutated afterwards. All fields have
//! regional defaults; a JSON file may override any subset of them.

pub mod crop_params;

pub use crop_params::{
    CropParameters, MonthDay, SoilTrend, SplitTable, StageFractions, StrawParameters, YieldTier,
};

use crate::core_types::{CropType, NutrientTriple};
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rectangle of accepted request coordinates.
///
/// This is the deployment region, not the raster extent: a point may be
/// inside the service area and still fall outside every raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceArea {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Default for ServiceArea {
    fn default() -> Self {
        Self {
            lon_min: 110.0,
            lon_max: 122.0,
            lat_min: 28.0,
            lat_max: 33.0,
        }
    }
}

/// Upper bounds of the LOW, MEDIUM and HIGH soil classes.
///
/// Values above the last bound are VERY HIGH.
pub type LevelBounds = [f64; 3];

/// Complete, immutable engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rice: CropParameters,
    pub wheat: CropParameters,
    pub service_area: ServiceArea,

    /// Raster values are stored as true concentration times this factor
    pub layer_scales: NutrientTriple<f64>,

    /// Soil class bounds per nutrient (mg/kg). Not crop specific.
    pub soil_level_bounds: NutrientTriple<LevelBounds>,

    /// Maximum distance to a soil survey point, in degrees
    pub soil_survey_radius_deg: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rice: CropParameters::rice(),
            wheat: CropParameters::wheat(),
            service_area: ServiceArea::default(),
            layer_scales: NutrientTriple::new(1.0, 10.0, 1.0),
            soil_level_bounds: NutrientTriple::new(
                [100.0, 150.0, 200.0],
                [10.0, 20.0, 40.0],
                [80.0, 150.0, 250.0],
            ),
            soil_survey_radius_deg: 0.05,
        }
    }
}

impl EngineConfig {
    /// Parameters for the given crop
    #[inline]
    pub fn crop(&self, crop: CropType) -> &CropParameters {
        match crop {
            CropType::Rice => &self.rice,
            CropType::Wheat => &self.wheat,
        }
    }

    /// Load an override file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| EngineError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
