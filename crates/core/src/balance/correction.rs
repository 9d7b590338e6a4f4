//! Soil supply correction curves
//!
//! The share of a soil test value that a crop can actually take up falls as
//! the soil gets richer. Rice uses hyperbolic fits, wheat exponential ones,
//! both from regional field trials. Inputs are soil test values in mg/kg and
//! must be positive (the soil resolver floors them).

use crate::core_types::{CropType, Nutrient};

/// Fraction of the soil test value counted as plant-available
pub const SOIL_AVAILABILITY: f64 = 0.15;

/// Organic matter at which the organic matter factor is 1 (g/kg)
pub const ORGANIC_MATTER_PIVOT: f64 = 20.0;

/// Organic matter factor bounds
pub const ORGANIC_MATTER_FACTOR_RANGE: (f64, f64) = (0.5, 1.5);

/// pH range with full phosphorus availability
pub const NEUTRAL_PH: (f64, f64) = (6.0, 7.0);

/// Phosphorus availability factor outside the neutral range
pub const OFF_NEUTRAL_PH_FACTOR: f64 = 0.7;

/// Crop-specific correction coefficient for one nutrient
pub fn correction_factor(crop: CropType, nutrient: Nutrient, soil_value: f64) -> f64 {
    match crop {
        CropType::Rice => {
            let (a, b) = match nutrient {
                Nutrient::N => (3.2164, 4799.9239),
                Nutrient::P => (17.4898, 2235.9674),
                Nutrient::K => (10.7412, 6147.1032),
            };
            (a + b / soil_value) / 100.0
        }
        CropType::Wheat => {
            let (a, k) = match nutrient {
                Nutrient::N => (0.821222, 0.005429),
                Nutrient::P => (1.976, 0.041744),
                Nutrient::K => (1.1038, 0.006362),
            };
            a * (-k * soil_value).exp()
        }
    }
}

/// Linear organic matter effect, clamped
pub fn organic_matter_factor(nutrient: Nutrient, organic_matter: f64) -> f64 {
    let slope = match nutrient {
        Nutrient::N => 0.02,
        Nutrient::P => 0.01,
        Nutrient::K => 0.015,
    };
    let (lo, hi) = ORGANIC_MATTER_FACTOR_RANGE;
    (1.0 + slope * (organic_matter - ORGANIC_MATTER_PIVOT)).clamp(lo, hi)
}

/// Phosphorus availability at a given soil pH
pub fn ph_factor(ph: f64) -> f64 {
    let (lo, hi) = NEUTRAL_PH;
    if (lo..=hi).contains(&ph) {
        1.0
    } else {
        OFF_NEUTRAL_PH_FACTOR
    }
}

/// Soil supply for one nutrient (kg/mu)
pub fn soil_supply(
    crop: CropType,
    nutrient: Nutrient,
    soil_value: f64,
    organic_matter: f64,
    ph: f64,
) -> f64 {
    let mut supply = soil_value
        * SOIL_AVAILABILITY
        * correction_factor(crop, nutrient, soil_value)
        * organic_matter_factor(nutrient, organic_matter);
    if nutrient == Nutrient::P {
        supply *= ph_factor(ph);
    }
    supply
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rice_curves() {
        assert_relative_eq!(
            correction_factor(CropType::Rice, Nutrient::N, 100.0),
            (3.2164 + 47.999239) / 100.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            correction_factor(CropType::Rice, Nutrient::P, 20.0),
            (17.4898 + 111.79837) / 100.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_wheat_curves() {
        assert_relative_eq!(
            correction_factor(CropType::Wheat, Nutrient::K, 0.0),
            1.1038,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            correction_factor(CropType::Wheat, Nutrient::N, 100.0),
            0.821222 * (-0.5429_f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_corrections_fall_with_richer_soil() {
        for crop in CropType::ALL {
            for nutrient in Nutrient::ALL {
                let poor = correction_factor(crop, nutrient, 10.0);
                let rich = correction_factor(crop, nutrient, 200.0);
                assert!(poor > rich, "{crop} {nutrient}");
            }
        }
    }

    #[test]
    fn test_organic_matter_factor() {
        assert_eq!(organic_matter_factor(Nutrient::N, 20.0), 1.0);
        assert_relative_eq!(organic_matter_factor(Nutrient::N, 30.0), 1.2);
        assert_relative_eq!(organic_matter_factor(Nutrient::K, 10.0), 0.85);
        assert_eq!(organic_matter_factor(Nutrient::N, 100.0), 1.5);
        assert_relative_eq!(organic_matter_factor(Nutrient::N, 0.0), 0.6);
        assert_eq!(organic_matter_factor(Nutrient::N, -50.0), 0.5);
    }

    #[test]
    fn test_ph_factor_edges() {
        assert_eq!(ph_factor(6.0), 1.0);
        assert_eq!(ph_factor(7.0), 1.0);
        assert_eq!(ph_factor(7.01), 0.7);
        assert_eq!(ph_factor(8.18), 0.7);
    }

    #[test]
    fn test_ph_only_affects_phosphorus() {
        let neutral = soil_supply(CropType::Rice, Nutrient::N, 120.0, 20.0, 6.5);
        let alkaline = soil_supply(CropType::Rice, Nutrient::N, 120.0, 20.0, 8.5);
        assert_eq!(neutral, alkaline);

        let neutral = soil_supply(CropType::Rice, Nutrient::P, 15.0, 20.0, 6.5);
        let alkaline = soil_supply(CropType::Rice, Nutrient::P, 15.0, 20.0, 8.5);
        assert_relative_eq!(alkaline, neutral * 0.7);
    }
}
