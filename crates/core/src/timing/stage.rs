//! Growth stages keyed on days since sowing

use crate::core_types::CropType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    PreSowing,
    Sowing,
    Seedling,
    Tillering,
    /// Wheat only
    Overwintering,
    /// Wheat only
    Greenup,
    Jointing,
    Booting,
    Heading,
    Maturity,
    /// No usable sowing date
    Unknown,
}

impl GrowthStage {
    pub fn name(&self) -> &'static str {
        match self {
            GrowthStage::PreSowing => "pre-sowing",
            GrowthStage::Sowing => "sowing",
            GrowthStage::Seedling => "seedling",
            GrowthStage::Tillering => "tillering",
            GrowthStage::Overwintering => "overwintering",
            GrowthStage::Greenup => "green-up",
            GrowthStage::Jointing => "jointing",
            GrowthStage::Booting => "booting",
            GrowthStage::Heading => "heading",
            GrowthStage::Maturity => "maturity",
            GrowthStage::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stage while `days < bound`, in order; later days are maturity
const RICE_STAGES: &[(i64, GrowthStage)] = &[
    (0, GrowthStage::PreSowing),
    (7, GrowthStage::Sowing),
    (21, GrowthStage::Seedling),
    (45, GrowthStage::Tillering),
    (65, GrowthStage::Jointing),
    (85, GrowthStage::Booting),
    (105, GrowthStage::Heading),
];

const WHEAT_STAGES: &[(i64, GrowthStage)] = &[
    (0, GrowthStage::PreSowing),
    (15, GrowthStage::Sowing),
    (60, GrowthStage::Tillering),
    (120, GrowthStage::Overwintering),
    (150, GrowthStage::Greenup),
    (180, GrowthStage::Jointing),
    (210, GrowthStage::Booting),
    (240, GrowthStage::Heading),
];

/// Stage reached `days_since_sowing` days after sowing
pub fn stage_for(crop: CropType, days_since_sowing: i64) -> GrowthStage {
    let table = match crop {
        CropType::Rice => RICE_STAGES,
        CropType::Wheat => WHEAT_STAGES,
    };
    table
        .iter()
        .find(|(bound, _)| days_since_sowing < *bound)
        .map_or(GrowthStage::Maturity, |(_, stage)| *stage)
}
