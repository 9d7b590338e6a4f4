//! Per-crop agronomic constants
//!
//! One immutable [`CropParameters`] value per crop, built from the preset
//! constructors below. The numbers are the regional defaults for the middle
//! and lower Yangtze rice-wheat rotation; deployments can override any of
//! them through a JSON config file (see [`crate::config::EngineConfig`]).
//!
//! Phosphorus and potassium figures are oxide equivalents (P2O5, K2O).

use crate::core_types::{CropType, NutrientTriple};
use serde::{Deserialize, Serialize};

/// Calendar day without a year, anchored to the sowing year when used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub const fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }
}

/// Nutrient uptake per 100 kg grain for yields up to `max_yield`
///
/// A tier with `max_yield == None` is unbounded and should come last.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldTier {
    pub max_yield: Option<f64>,
    pub per_100kg: NutrientTriple<f64>,
}

/// Fractions of the seasonal dose applied at basal, mid and late stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageFractions {
    pub base: f64,
    pub mid: f64,
    pub late: f64,
}

impl StageFractions {
    pub const fn new(base: f64, mid: f64, late: f64) -> Self {
        Self { base, mid, late }
    }

    pub fn sum(&self) -> f64 {
        self.base + self.mid + self.late
    }
}

/// Split fractions for sowing earlier than, on, and later than the norm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitTable {
    pub early: StageFractions,
    pub normal: StageFractions,
    pub late: StageFractions,
}

/// Residue returned from the preceding crop of the rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrawParameters {
    /// Water content of returned straw (%)
    pub moisture_percent: f64,

    /// Nutrient content of dry straw (% of dry mass)
    pub nutrient_percent: NutrientTriple<f64>,

    /// Share of straw nutrient released within the season.
    ///
    /// Negative values mean net immobilization: decomposing straw ties up
    /// soil nitrogen instead of supplying it.
    pub release_rate: NutrientTriple<f64>,

    /// Extra basal N per kg dry straw to feed decomposition
    pub additional_n_rate: f64,
}

/// Spatial trend used when no measured soil value exists
///
/// `value = base + grad_lon * (lon - ref_lon) + grad_lat * (lat - ref_lat)
/// + jitter * u`, with `u` in `[-1, 1]`, clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilTrend {
    pub reference_lon: f64,
    pub reference_lat: f64,
    pub base: NutrientTriple<f64>,
    pub grad_lon: NutrientTriple<f64>,
    pub grad_lat: NutrientTriple<f64>,
    pub jitter: NutrientTriple<f64>,
    pub min: NutrientTriple<f64>,
    pub max: NutrientTriple<f64>,
}

/// Immutable agronomic constants for one crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropParameters {
    pub crop: CropType,

    /// Nutrient uptake per 100 kg grain (kg)
    pub nutrient_per_100kg: NutrientTriple<f64>,

    /// Yield-dependent uptake. Empty means `nutrient_per_100kg` applies
    /// at every yield.
    #[serde(default)]
    pub yield_tiers: Vec<YieldTier>,

    /// Fertilizer use efficiency when no regional value is known (0-1)
    pub default_efficiency: NutrientTriple<f64>,

    pub straw: StrawParameters,

    /// Regional normal sowing date
    pub normal_sowing: MonthDay,

    pub split: SplitTable,

    /// Forecast temperature below which basal share is increased (°C)
    pub cold_threshold: f64,

    /// Fraction moved from the late to the basal stage in cold weather
    pub cold_shift: f64,

    /// P2O5 content of the superphosphate product sold in the region (0-1)
    pub superphosphate_p_fraction: f64,

    /// Soil values used when neither measurement nor location is available
    pub default_soil: NutrientTriple<f64>,

    pub soil_trend: SoilTrend,

    /// Organic matter used when the request omits it (g/kg)
    pub default_organic_matter: f64,

    /// Soil pH used when the request omits it
    pub default_ph: f64,
}

impl CropParameters {
    /// Paddy rice following wheat.
    ///
    /// Wheat straw returned into a flooded paddy immobilizes nitrogen during
    /// early decomposition, hence the negative N release rate.
    pub fn rice() -> Self {
        Self {
            crop: CropType::Rice,
            nutrient_per_100kg: NutrientTriple::new(2.2, 1.1, 2.6),
            yield_tiers: Vec::new(),
            default_efficiency: NutrientTriple::new(0.35, 0.20, 0.45),
            straw: StrawParameters {
                moisture_percent: 15.0,
                nutrient_percent: NutrientTriple::new(0.65, 0.18, 1.20),
                release_rate: NutrientTriple::new(-0.10, 0.50, 0.85),
                additional_n_rate: 0.005,
            },
            normal_sowing: MonthDay::new(6, 17),
            split: SplitTable {
                early: StageFractions::new(0.45, 0.30, 0.25),
                normal: StageFractions::new(0.50, 0.30, 0.20),
                late: StageFractions::new(0.60, 0.25, 0.15),
            },
            cold_threshold: 15.0,
            cold_shift: 0.05,
            superphosphate_p_fraction: 0.12,
            default_soil: NutrientTriple::new(120.0, 15.0, 120.0),
            soil_trend: SoilTrend {
                reference_lon: 114.30,
                reference_lat: 30.60,
                base: NutrientTriple::new(125.0, 16.0, 115.0),
                grad_lon: NutrientTriple::new(-2.0, 0.4, 3.0),
                grad_lat: NutrientTriple::new(4.0, -0.6, -5.0),
                jitter: NutrientTriple::new(10.0, 3.0, 12.0),
                min: NutrientTriple::new(50.0, 5.0, 50.0),
                max: NutrientTriple::new(220.0, 50.0, 250.0),
            },
            default_organic_matter: 20.7,
            default_ph: 8.18,
        }
    }

    /// Winter wheat following rice.
    ///
    /// Uptake per 100 kg grain falls as yield rises, so wheat demand is
    /// looked up from yield tiers.
    pub fn wheat() -> Self {
        Self {
            crop: CropType::Wheat,
            nutrient_per_100kg: NutrientTriple::new(3.0, 1.25, 2.5),
            yield_tiers: vec![
                YieldTier {
                    max_yield: Some(300.0),
                    per_100kg: NutrientTriple::new(3.2, 1.4, 2.8),
                },
                YieldTier {
                    max_yield: Some(400.0),
                    per_100kg: NutrientTriple::new(3.0, 1.25, 2.5),
                },
                YieldTier {
                    max_yield: Some(500.0),
                    per_100kg: NutrientTriple::new(2.8, 1.15, 2.3),
                },
                YieldTier {
                    max_yield: None,
                    per_100kg: NutrientTriple::new(2.6, 1.05, 2.1),
                },
            ],
            default_efficiency: NutrientTriple::new(0.38, 0.22, 0.48),
            straw: StrawParameters {
                moisture_percent: 15.0,
                nutrient_percent: NutrientTriple::new(0.91, 0.30, 1.89),
                release_rate: NutrientTriple::new(0.25, 0.45, 0.80),
                additional_n_rate: 0.005,
            },
            normal_sowing: MonthDay::new(10, 25),
            split: SplitTable {
                early: StageFractions::new(0.50, 0.30, 0.20),
                normal: StageFractions::new(0.60, 0.25, 0.15),
                late: StageFractions::new(0.70, 0.20, 0.10),
            },
            cold_threshold: 5.0,
            cold_shift: 0.05,
            superphosphate_p_fraction: 0.14,
            default_soil: NutrientTriple::new(100.0, 15.0, 120.0),
            soil_trend: SoilTrend {
                reference_lon: 114.30,
                reference_lat: 30.60,
                base: NutrientTriple::new(105.0, 17.0, 125.0),
                grad_lon: NutrientTriple::new(-1.5, 0.5, 2.5),
                grad_lat: NutrientTriple::new(3.0, -0.8, -4.0),
                jitter: NutrientTriple::new(8.0, 3.0, 10.0),
                min: NutrientTriple::new(40.0, 5.0, 50.0),
                max: NutrientTriple::new(200.0, 50.0, 250.0),
            },
            default_organic_matter: 20.7,
            default_ph: 8.18,
        }
    }

    /// Uptake per 100 kg grain at the given target yield
    pub fn uptake_per_100kg(&self, target_yield: f64) -> NutrientTriple<f64> {
        self.yield_tiers
            .iter()
            .find(|tier| match tier.max_yield {
                Some(max) => target_yield <= max,
                None => true,
            })
            .map_or(self.nutrient_per_100kg, |tier| tier.per_100kg)
    }
}
