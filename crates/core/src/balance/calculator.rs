//! Nutrient balance: demand minus supply, converted to products
//!
//! For each nutrient the crop demand at the target yield is reduced by what
//! the soil and returned straw supply; the shortfall divided by fertilizer
//! use efficiency is the nutrient to apply, which is then converted to
//! product mass and split across the three dressings.

use crate::balance::correction::{ph_factor, soil_supply};
use crate::balance::products::{ApplicationStage, FertilizerProduct, ProductAmounts, UREA_N_FRACTION};
use crate::balance::split::{split_ratios, SowingRegime, SplitRatios};
use crate::balance::{
    CalculationResult, Efficiency, EfficiencySource, NutrientBreakdown, StageApplication,
    StrawContribution,
};
use crate::config::{CropParameters, StrawParameters};
use crate::core_types::{Nutrient, NutrientTriple};
use crate::grid::NearestFeatureIndex;
use crate::request::CalculationInput;
use crate::soil::{SoilLevel, SoilNutrientRecord};

/// Round to one decimal for output
#[inline]
pub fn round1(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // Avoid "-0.0" in serialized output
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round a mass for output, never below zero
#[inline]
pub fn round_mass(value: f64) -> f64 {
    round1(value.max(0.0))
}

/// Fertilizer use efficiency per nutrient
///
/// The nearest regional point wins when the request has a location and the
/// point carries a usable value for that nutrient; otherwise the crop default
/// applies.
pub fn resolve_efficiency(
    index: &NearestFeatureIndex,
    input: &CalculationInput,
    params: &CropParameters,
) -> NutrientTriple<Efficiency> {
    let regional = input
        .position
        .and_then(|p| index.nearest(input.crop, p.x, p.y));

    NutrientTriple::from_fn(|nutrient| {
        let value = regional
            .and_then(|feature| *feature.values.get(nutrient))
            .filter(|v| v.is_finite() && *v > 0.0 && *v <= 1.0);
        match value {
            Some(value) => Efficiency {
                value,
                source: EfficiencySource::Regional,
            },
            None => Efficiency {
                value: *params.default_efficiency.get(nutrient),
                source: EfficiencySource::CropDefault,
            },
        }
    })
}

/// Nutrient contribution of returned straw
pub fn straw_contribution(amount: f64, straw: &StrawParameters) -> StrawContribution {
    if amount <= 0.0 {
        return StrawContribution::default();
    }
    let dry_mass = amount * (1.0 - straw.moisture_percent / 100.0);
    let supply = NutrientTriple::from_fn(|nutrient| {
        let mass = dry_mass * straw.nutrient_percent.get(nutrient) / 100.0;
        mass * straw.release_rate.get(nutrient)
    });
    StrawContribution {
        amount,
        dry_mass,
        supply,
        additional_n: straw.additional_n_rate * dry_mass,
    }
}

/// Compute the full plan for a validated request
///
/// `soil` values must be positive; the resolver guarantees this.
pub fn compute_plan(
    input: &CalculationInput,
    soil: &SoilNutrientRecord,
    efficiency: &NutrientTriple<Efficiency>,
    params: &CropParameters,
) -> CalculationResult {
    let crop = input.crop;
    let uptake = params.uptake_per_100kg(input.target_yield);
    let straw = straw_contribution(input.straw_return, &params.straw);
    let p_availability = ph_factor(input.soil_ph);

    let nutrients = NutrientTriple::from_fn(|nutrient| {
        let demand = input.target_yield / 100.0 * uptake.get(nutrient);
        let supply = soil_supply(
            crop,
            nutrient,
            *soil.values.get(nutrient),
            input.organic_matter,
            input.soil_ph,
        );
        let straw_supply = *straw.supply.get(nutrient);

        let eff = efficiency.get(nutrient);
        let effective = if nutrient == Nutrient::P {
            eff.value * p_availability
        } else {
            eff.value
        };

        let required = (demand - supply - straw_supply).max(0.0) / effective;
        let product = FertilizerProduct::for_nutrient(nutrient);
        let product_mass = required / product.nutrient_fraction(params.superphosphate_p_fraction);

        NutrientBreakdown {
            demand,
            soil_supply: supply,
            straw_supply,
            required,
            efficiency: effective,
            efficiency_source: eff.source,
            product,
            product_mass,
        }
    });

    let seasonal = ProductAmounts {
        urea: nutrients.n.product_mass,
        superphosphate: nutrients.p.product_mass,
        potassium_chloride: nutrients.k.product_mass,
    };
    let split = split_ratios(input.sowing_date.as_deref(), input.temperature_forecast, params);
    let extra_urea = straw.additional_n / UREA_N_FRACTION;

    let stages: Vec<StageApplication> = ApplicationStage::ALL
        .iter()
        .map(|&stage| {
            let fraction = match stage {
                ApplicationStage::Base => split.base,
                ApplicationStage::Mid => split.mid,
                ApplicationStage::Late => split.late,
            };
            let mut products = seasonal.scaled(fraction);
            if stage == ApplicationStage::Base {
                products.urea += extra_urea;
            }
            StageApplication {
                stage,
                label: stage.label(crop).to_string(),
                fraction,
                products,
            }
        })
        .collect();

    let totals = stages.iter().fold(ProductAmounts::default(), |acc, s| ProductAmounts {
        urea: acc.urea + s.products.urea,
        superphosphate: acc.superphosphate + s.products.superphosphate,
        potassium_chloride: acc.potassium_chloride + s.products.potassium_chloride,
    });

    let guidance = guidance(input, soil, &nutrients, &straw, &split, p_availability);

    // Round only here, after every intermediate value is final
    CalculationResult {
        crop,
        target_yield: input.target_yield,
        soil: soil.clone(),
        nutrients: nutrients.map(|_, b| b.rounded()),
        totals: totals.map(round_mass),
        stages: stages
            .into_iter()
            .map(|s| StageApplication {
                products: s.products.map(round_mass),
                ..s
            })
            .collect(),
        split,
        straw: straw.rounded(),
        sowing_window: None,
        guidance,
    }
}

fn guidance(
    input: &CalculationInput,
    soil: &SoilNutrientRecord,
    nutrients: &NutrientTriple<NutrientBreakdown>,
    straw: &StrawContribution,
    split: &SplitRatios,
    p_availability: f64,
) -> Vec<String> {
    let mut notes = Vec::new();

    if soil.is_default {
        notes.push(
            "Soil nutrients are estimated, not measured; a soil test will make this plan more precise."
                .to_string(),
        );
    }

    for (nutrient, breakdown) in nutrients.iter() {
        let symbol = nutrient.symbol();
        match soil.level.get(nutrient) {
            SoilLevel::Low => notes.push(format!(
                "Soil {symbol} is low; do not cut the {} rate below this plan.",
                breakdown.product
            )),
            SoilLevel::VeryHigh => notes.push(format!(
                "Soil {symbol} is very high; watch for excess and consider skipping a topdressing."
            )),
            SoilLevel::Medium | SoilLevel::High => {}
        }
        if breakdown.required <= 0.0 {
            notes.push(format!(
                "Soil and straw cover the {symbol} demand; no {} is needed this season.",
                breakdown.product
            ));
        }
    }

    if p_availability < 1.0 {
        notes.push(format!(
            "Soil pH {:.1} is outside 6.0-7.0, which locks up phosphorus; the phosphate rate has been raised.",
            input.soil_ph
        ));
    }

    if straw.additional_n > 0.0 {
        let sign = if straw.supply.n < 0.0 {
            "ties up soil nitrogen while it decomposes"
        } else {
            "needs nitrogen to decompose"
        };
        notes.push(format!(
            "Returned straw {sign}; {:.1} kg/mu extra urea is included in the basal dressing.",
            round_mass(straw.additional_n / UREA_N_FRACTION)
        ));
    }

    if let Some(days) = split.days_from_norm {
        match split.regime {
            SowingRegime::Early => notes.push(format!(
                "Sown {} days before the regional norm; more nitrogen is kept for later dressings.",
                -days
            )),
            SowingRegime::Late => notes.push(format!(
                "Sown {days} days after the regional norm; more fertilizer goes into the basal dressing."
            )),
            SowingRegime::Normal => {}
        }
    }
    if split.cold_adjusted {
        notes.push(
            "Cold weather is forecast; part of the late dressing has been moved to the basal dressing."
                .to_string(),
        );
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::core_types::CropType;
    use crate::request::CalculationRequest;
    use crate::soil::SoilSource;
    use approx::assert_relative_eq;

    fn plan(request: CalculationRequest, soil_values: NutrientTriple<f64>) -> CalculationResult {
        let config = EngineConfig::default();
        let input = request.validate(&config).unwrap();
        let params = config.crop(input.crop);
        let soil = SoilNutrientRecord::new(
            soil_values,
            NutrientTriple::splat(SoilSource::Manual),
            &config.soil_level_bounds,
        );
        let eff = resolve_efficiency(&NearestFeatureIndex::default(), &input, params);
        compute_plan(&input, &soil, &eff, params)
    }

    #[test]
    fn test_round_mass() {
        assert_eq!(round_mass(12.345), 12.3);
        assert_eq!(round_mass(12.36), 12.4);
        assert_eq!(round1(-0.26), -0.3);
        assert_eq!(round_mass(-3.0), 0.0);
        assert_eq!(round_mass(-0.01).to_string(), "0");
    }

    #[test]
    fn test_hand_computed_rice_nitrogen() {
        let result = plan(
            CalculationRequest::new("rice", 500.0).with_soil_ph(6.5).with_organic_matter(20.0),
            NutrientTriple::new(120.0, 15.0, 120.0),
        );
        // demand 5 * 2.2 = 11; supply 120 * 0.15 * (3.2164 + 4799.9239/120)/100
        let supply = 120.0 * 0.15 * (3.2164 + 4799.9239 / 120.0) / 100.0;
        let required = (11.0 - supply) / 0.35;
        assert_relative_eq!(result.nutrients.n.demand, 11.0);
        assert_relative_eq!(result.nutrients.n.required, round_mass(required));
        assert_relative_eq!(result.totals.urea, round_mass(required / 0.46), epsilon = 0.051);
    }

    #[test]
    fn test_oversupply_gives_zero() {
        let result = plan(
            CalculationRequest::new("wheat", 1.0),
            NutrientTriple::new(300.0, 100.0, 500.0),
        );
        assert_eq!(result.totals.urea, 0.0);
        for stage in &result.stages {
            assert!(stage.products.total() >= 0.0);
        }
    }

    #[test]
    fn test_ph_raises_phosphate() {
        let soil = NutrientTriple::new(120.0, 15.0, 120.0);
        let neutral = plan(CalculationRequest::new("rice", 600.0).with_soil_ph(6.5), soil);
        let alkaline = plan(CalculationRequest::new("rice", 600.0).with_soil_ph(8.5), soil);
        assert!(alkaline.totals.superphosphate > neutral.totals.superphosphate);
        assert_eq!(alkaline.totals.urea, neutral.totals.urea);
    }

    #[test]
    fn test_straw_additional_n_only_in_base_urea() {
        let soil = NutrientTriple::new(120.0, 15.0, 120.0);
        let bare = plan(CalculationRequest::new("rice", 500.0), soil);
        let straw = plan(CalculationRequest::new("rice", 500.0).with_straw_return(400.0), soil);

        // dry = 340 kg, additional N = 1.7 kg
        assert_relative_eq!(straw.straw.dry_mass, 340.0);
        assert_relative_eq!(straw.straw.additional_n, 1.7);
        // Rice-season straw immobilizes N, so seasonal N demand grows
        assert!(straw.nutrients.n.straw_supply < 0.0);
        assert!(straw.nutrients.n.required > bare.nutrients.n.required);
        // And the extra urea lands only in the base stage
        let base_gain = straw.stages[0].products.urea - bare.stages[0].products.urea;
        let mid_gain = straw.stages[1].products.urea - bare.stages[1].products.urea;
        assert!(base_gain > mid_gain);
    }

    #[test]
    fn test_stage_split_sums_to_totals() {
        let result = plan(
            CalculationRequest::new("wheat", 450.0).with_sowing_date("2024-10-25"),
            NutrientTriple::new(90.0, 12.0, 100.0),
        );
        let sum: f64 = result.stages.iter().map(|s| s.products.superphosphate).sum();
        assert_relative_eq!(sum, result.totals.superphosphate, epsilon = 0.15);
        assert_eq!(result.stages[0].fraction, 0.60);
        assert_eq!(result.stages[2].label, "booting topdressing");
        assert_eq!(result.crop, CropType::Wheat);
    }
}
