//! Fertilizer plan computation
//!
//! - [`correction`]: soil supply curves per crop
//! - [`split`]: basal / mid / late split ratios
//! - [`products`]: product grades and dressing names
//! - [`calculator`]: the balance itself

pub mod calculator;
pub mod correction;
pub mod products;
pub mod split;

pub use calculator::{compute_plan, resolve_efficiency, round1, round_mass, straw_contribution};
pub use products::{ApplicationStage, FertilizerProduct, ProductAmounts};
pub use split::{split_ratios, SowingRegime, SplitRatios};

use crate::core_types::{CropType, NutrientTriple};
use crate::soil::SoilNutrientRecord;
use serde::{Deserialize, Serialize};

/// Where a fertilizer use efficiency came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencySource {
    /// Nearest regional efficiency point
    Regional,
    CropDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Efficiency {
    /// Fraction of applied nutrient taken up by the crop (0-1)
    pub value: f64,
    pub source: EfficiencySource,
}

/// Per-nutrient balance, kg/mu of nutrient unless noted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientBreakdown {
    pub demand: f64,
    pub soil_supply: f64,
    /// Negative when straw immobilizes the nutrient
    pub straw_supply: f64,
    /// Nutrient to apply as fertilizer
    pub required: f64,
    /// Efficiency used, after the pH adjustment for phosphorus
    pub efficiency: f64,
    pub efficiency_source: EfficiencySource,
    pub product: FertilizerProduct,
    /// Seasonal product mass before split (kg/mu)
    pub product_mass: f64,
}

impl NutrientBreakdown {
    fn rounded(&self) -> Self {
        Self {
            demand: round1(self.demand),
            soil_supply: round1(self.soil_supply),
            straw_supply: round1(self.straw_supply),
            required: round_mass(self.required),
            product_mass: round_mass(self.product_mass),
            ..*self
        }
    }
}

/// Straw returned from the previous crop
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StrawContribution {
    /// Fresh straw (kg/mu)
    pub amount: f64,
    pub dry_mass: f64,
    /// Nutrient released this season (kg/mu)
    pub supply: NutrientTriple<f64>,
    /// Extra basal N for decomposition (kg/mu)
    pub additional_n: f64,
}

impl StrawContribution {
    fn rounded(&self) -> Self {
        Self {
            amount: round1(self.amount),
            dry_mass: round1(self.dry_mass),
            supply: self.supply.map(|_, v| round1(*v)),
            additional_n: round_mass(self.additional_n),
        }
    }
}

/// Product masses for one dressing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageApplication {
    pub stage: ApplicationStage,
    pub label: String,
    /// Share of the seasonal dose
    pub fraction: f64,
    pub products: ProductAmounts,
}

/// Complete fertilizer plan
///
/// Masses are kg/mu, rounded to one decimal. `totals` includes the straw
/// decomposition urea carried by the basal dressing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub crop: CropType,
    pub target_yield: f64,
    pub soil: SoilNutrientRecord,
    pub nutrients: NutrientTriple<NutrientBreakdown>,
    pub totals: ProductAmounts,
    pub stages: Vec<StageApplication>,
    pub split: SplitRatios,
    pub straw: StrawContribution,
    /// Comparison with the nearest regional sowing window
    pub sowing_window: Option<String>,
    pub guidance: Vec<String>,
}

impl CalculationResult {
    pub fn stage(&self, stage: ApplicationStage) -> Option<&StageApplication> {
        self.stages.iter().find(|s| s.stage == stage)
    }
}
