//! Per-crop, per-stage fertilizing advice

use crate::core_types::CropType;
use crate::timing::GrowthStage;

/// Fixed advice for one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageAdvice {
    pub description: &'static str,
    pub best_timing: &'static str,
    pub advice: &'static [&'static str],
}

const UNKNOWN: StageAdvice = StageAdvice {
    description: "Sowing date not provided or unreadable; the growth stage is unknown.",
    best_timing: "Enter the sowing date to get stage-specific timing.",
    advice: &["Follow the basal / topdressing split from the fertilizer plan."],
};

pub fn stage_advice(crop: CropType, stage: GrowthStage) -> StageAdvice {
    match (crop, stage) {
        (_, GrowthStage::Unknown) => UNKNOWN,

        (CropType::Rice, GrowthStage::PreSowing) => StageAdvice {
            description: "Field preparation before transplanting.",
            best_timing: "Work the basal dressing in during the last harrowing, 1-2 days before transplanting.",
            advice: &[
                "Apply all phosphate and most potash as basal dressing.",
                "Keep a shallow water layer after incorporation to limit loss.",
            ],
        },
        (CropType::Rice, GrowthStage::Sowing) => StageAdvice {
            description: "Transplanting and seedling establishment.",
            best_timing: "Apply any missed basal dressing now, before the first irrigation.",
            advice: &["Avoid heavy nitrogen on newly set seedlings."],
        },
        (CropType::Rice, GrowthStage::Seedling) => StageAdvice {
            description: "Seedlings recovering and starting to grow.",
            best_timing: "Tillering topdressing 7-10 days after transplanting, once seedlings turn green.",
            advice: &[
                "Drain to a shallow layer before topdressing and hold water for 3-5 days after.",
            ],
        },
        (CropType::Rice, GrowthStage::Tillering) => StageAdvice {
            description: "Active tillering.",
            best_timing: "Apply the tillering topdressing now if not yet done.",
            advice: &[
                "Stop nitrogen once the target tiller count is reached.",
                "Dry the field lightly at the end of tillering to curb unproductive tillers.",
            ],
        },
        (CropType::Rice, GrowthStage::Jointing) => StageAdvice {
            description: "Stem elongation and young panicle differentiation.",
            best_timing: "Panicle fertilizer when the young panicle is 1-2 cm long.",
            advice: &["Add the remaining potash with the panicle fertilizer."],
        },
        (CropType::Rice, GrowthStage::Booting) => StageAdvice {
            description: "Booting.",
            best_timing: "Only a light grain-filling spray if leaves are pale.",
            advice: &["Avoid soil nitrogen now: it delays maturity and invites lodging."],
        },
        (CropType::Rice, GrowthStage::Heading) => StageAdvice {
            description: "Heading and flowering.",
            best_timing: "Foliar potassium dihydrogen phosphate after flowering if needed.",
            advice: &["No soil-applied fertilizer at this stage."],
        },
        (CropType::Rice, GrowthStage::Maturity) => StageAdvice {
            description: "Grain filling to maturity.",
            best_timing: "No fertilizing until the next crop.",
            advice: &["Plan straw return for the following wheat crop."],
        },

        (CropType::Wheat, GrowthStage::PreSowing) => StageAdvice {
            description: "Seedbed preparation after the rice harvest.",
            best_timing: "Broadcast the basal dressing before the final tillage.",
            advice: &[
                "Apply all phosphate and most potash as basal dressing.",
                "Chop returned rice straw finely and mix it into the topsoil.",
            ],
        },
        (CropType::Wheat, GrowthStage::Sowing) => StageAdvice {
            description: "Sowing and emergence.",
            best_timing: "Basal dressing should already be in; avoid fertilizer contact with seed.",
            advice: &["Keep seed and fertilizer apart to protect germination."],
        },
        (CropType::Wheat, GrowthStage::Tillering) => StageAdvice {
            description: "Autumn tillering.",
            best_timing: "A light nitrogen top-up only on weak, yellowing stands.",
            advice: &["Strong stands need no extra nitrogen before winter."],
        },
        (CropType::Wheat, GrowthStage::Overwintering) => StageAdvice {
            description: "Winter dormancy.",
            best_timing: "Do not fertilize; wait for green-up.",
            advice: &["Nutrient uptake is negligible and losses are high in winter."],
        },
        (CropType::Wheat, GrowthStage::Greenup) => StageAdvice {
            description: "Spring green-up.",
            best_timing: "Hold the main topdressing for jointing unless the stand is weak.",
            advice: &["Weak stands may take a small share of the jointing dressing now."],
        },
        (CropType::Wheat, GrowthStage::Jointing) => StageAdvice {
            description: "Jointing.",
            best_timing: "Main nitrogen topdressing at the start of jointing.",
            advice: &["Apply before rain or irrigate afterwards."],
        },
        (CropType::Wheat, GrowthStage::Booting) => StageAdvice {
            description: "Booting.",
            best_timing: "Booting topdressing when the flag leaf is fully out.",
            advice: &["Keep this dose small on fields prone to lodging."],
        },
        (CropType::Wheat, GrowthStage::Heading) => StageAdvice {
            description: "Heading and grain filling.",
            best_timing: "Foliar spray only, in the late afternoon.",
            advice: &["Combine foliar feeding with disease control sprays."],
        },
        (CropType::Wheat, GrowthStage::Maturity) => StageAdvice {
            description: "Ripening.",
            best_timing: "No fertilizing until the next crop.",
            advice: &["Return the straw to feed the following rice crop."],
        },

        // Rice has no winter stages, wheat goes straight from sowing to tillering
        (CropType::Rice, GrowthStage::Overwintering | GrowthStage::Greenup)
        | (CropType::Wheat, GrowthStage::Seedling) => UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_reachable_stage_has_advice() {
        for crop in CropType::ALL {
            for days in -5..260 {
                let stage = crate::timing::stage_for(crop, days);
                let advice = stage_advice(crop, stage);
                assert_ne!(advice, UNKNOWN, "{crop} day {days}");
                assert!(!advice.advice.is_empty());
            }
        }
    }

    #[test]
    fn test_stages_a_crop_never_enters() {
        assert_eq!(stage_advice(CropType::Wheat, GrowthStage::Seedling), UNKNOWN);
        assert_eq!(stage_advice(CropType::Rice, GrowthStage::Overwintering), UNKNOWN);
        assert_eq!(stage_advice(CropType::Rice, GrowthStage::Greenup), UNKNOWN);
        assert_ne!(stage_advice(CropType::Rice, GrowthStage::Seedling), UNKNOWN);
    }
}
