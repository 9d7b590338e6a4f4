//! Commercial fertilizer products and application stages

use crate::core_types::{CropType, Nutrient};
use serde::{Deserialize, Serialize};
use std::fmt;

/// N content of urea
pub const UREA_N_FRACTION: f64 = 0.46;

/// K2O content of potassium chloride
pub const KCL_K_FRACTION: f64 = 0.60;

/// Straight fertilizer supplying one nutrient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FertilizerProduct {
    Urea,
    Superphosphate,
    PotassiumChloride,
}

impl FertilizerProduct {
    pub const ALL: [FertilizerProduct; 3] = [
        FertilizerProduct::Urea,
        FertilizerProduct::Superphosphate,
        FertilizerProduct::PotassiumChloride,
    ];

    /// Product carrying a nutrient
    pub fn for_nutrient(nutrient: Nutrient) -> Self {
        match nutrient {
            Nutrient::N => FertilizerProduct::Urea,
            Nutrient::P => FertilizerProduct::Superphosphate,
            Nutrient::K => FertilizerProduct::PotassiumChloride,
        }
    }

    /// Nutrient mass fraction; superphosphate grade varies by crop region
    pub fn nutrient_fraction(&self, superphosphate_p_fraction: f64) -> f64 {
        match self {
            FertilizerProduct::Urea => UREA_N_FRACTION,
            FertilizerProduct::Superphosphate => superphosphate_p_fraction,
            FertilizerProduct::PotassiumChloride => KCL_K_FRACTION,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FertilizerProduct::Urea => "urea",
            FertilizerProduct::Superphosphate => "superphosphate",
            FertilizerProduct::PotassiumChloride => "potassium chloride",
        }
    }
}

impl fmt::Display for FertilizerProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Product masses in kg/mu
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductAmounts {
    pub urea: f64,
    pub superphosphate: f64,
    pub potassium_chloride: f64,
}

impl ProductAmounts {
    pub fn get(&self, product: FertilizerProduct) -> f64 {
        match product {
            FertilizerProduct::Urea => self.urea,
            FertilizerProduct::Superphosphate => self.superphosphate,
            FertilizerProduct::PotassiumChloride => self.potassium_chloride,
        }
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            urea: f(self.urea),
            superphosphate: f(self.superphosphate),
            potassium_chloride: f(self.potassium_chloride),
        }
    }

    pub fn scaled(&self, fraction: f64) -> Self {
        self.map(|mass| mass * fraction)
    }

    pub fn total(&self) -> f64 {
        self.urea + self.superphosphate + self.potassium_chloride
    }
}

/// Split application timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStage {
    /// Incorporated before sowing or transplanting
    Base,
    Mid,
    Late,
}

impl ApplicationStage {
    pub const ALL: [ApplicationStage; 3] = [
        ApplicationStage::Base,
        ApplicationStage::Mid,
        ApplicationStage::Late,
    ];

    /// Agronomic name of the dressing for a crop
    pub fn label(&self, crop: CropType) -> &'static str {
        match (crop, self) {
            (_, ApplicationStage::Base) => "basal dressing",
            (CropType::Rice, ApplicationStage::Mid) => "tillering topdressing",
            (CropType::Rice, ApplicationStage::Late) => "panicle fertilizer",
            (CropType::Wheat, ApplicationStage::Mid) => "jointing topdressing",
            (CropType::Wheat, ApplicationStage::Late) => "booting topdressing",
        }
    }
}
