//! Soil nutrient resolution with provenance
//!
//! Each nutrient is resolved independently through an ordered chain of
//! sources (see [`SoilSource`]). The resulting [`SoilNutrientRecord`] tells
//! the caller both the value used and where it came from, so a client can
//! warn the user when the plan rests on simulated or default soil.

pub mod jitter;
pub mod resolver;

pub use jitter::{FixedJitter, JitterSource, RngJitter};
pub use resolver::SoilNutrientResolver;

use crate::config::LevelBounds;
use crate::core_types::NutrientTriple;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest soil value handed to the balance calculator (mg/kg).
///
/// The rice correction curves divide by the soil value.
pub const SOIL_VALUE_FLOOR: f64 = 1.0;

/// Soil nutrient class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SoilLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl SoilLevel {
    /// Classify against `[low, medium, high]` upper bounds (inclusive)
    pub fn classify(value: f64, bounds: &LevelBounds) -> Self {
        let [low, medium, high] = *bounds;
        if value <= low {
            SoilLevel::Low
        } else if value <= medium {
            SoilLevel::Medium
        } else if value <= high {
            SoilLevel::High
        } else {
            SoilLevel::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SoilLevel::Low => "low",
            SoilLevel::Medium => "medium",
            SoilLevel::High => "high",
            SoilLevel::VeryHigh => "very high",
        }
    }
}

impl fmt::Display for SoilLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a soil value came from, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SoilSource {
    /// Entered by the user
    Manual,
    /// Sampled from the soil raster
    Raster,
    /// Nearest soil survey point
    GeoFeature,
    /// Spatial trend plus jitter
    Simulated,
    /// Crop default, no location known
    Default,
}

impl SoilSource {
    /// Resolution order
    pub const CHAIN: [SoilSource; 5] = [
        SoilSource::Manual,
        SoilSource::Raster,
        SoilSource::GeoFeature,
        SoilSource::Simulated,
        SoilSource::Default,
    ];

    /// Whether the value reflects real data about this field.
    /// Survey points are regional samples, not this field.
    pub fn is_measured(&self) -> bool {
        matches!(self, SoilSource::Manual | SoilSource::Raster)
    }
}

/// Resolved soil nutrients for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilNutrientRecord {
    /// Available N, P2O5 and K2O (mg/kg)
    #[serde(flatten)]
    pub values: NutrientTriple<f64>,
    pub level: NutrientTriple<SoilLevel>,
    pub source: NutrientTriple<SoilSource>,
    /// True when no nutrient came from measured data
    pub is_default: bool,
}

impl SoilNutrientRecord {
    /// Assemble a record, classifying each value
    pub fn new(
        values: NutrientTriple<f64>,
        source: NutrientTriple<SoilSource>,
        bounds: &NutrientTriple<LevelBounds>,
    ) -> Self {
        let level = values.map(|nutrient, v| SoilLevel::classify(*v, bounds.get(nutrient)));
        let is_default = !source.iter().any(|(_, s)| s.is_measured());
        Self {
            values,
            level,
            source,
            is_default,
        }
    }
}
