//! Fertilizer recommendation engine
//!
//! [`FertilizerEngine`] owns the immutable configuration and geospatial
//! context and runs the full pipeline for a request:
//!
//! 1. validate the request
//! 2. resolve soil N, P and K through the source chain
//! 3. pick fertilizer use efficiencies
//! 4. compute the balance, products and split
//! 5. compare the sowing date with the nearest regional window
//!
//! Timing advice is independent of the balance and is exposed alongside it.

use crate::balance::split::parse_sowing_date;
use crate::balance::{compute_plan, resolve_efficiency, CalculationResult};
use crate::config::EngineConfig;
use crate::core_types::{CropType, WeatherSnapshot};
use crate::error::Result;
use crate::grid::GeospatialContext;
use crate::request::{CalculationInput, CalculationRequest};
use crate::soil::{JitterSource, RngJitter, SoilNutrientResolver};
use crate::timing::{advise, TimingRecommendation};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

/// Shared, read-only engine state
#[derive(Debug, Clone, Default)]
pub struct FertilizerEngine {
    config: EngineConfig,
    context: GeospatialContext,
}

impl FertilizerEngine {
    pub fn new(config: EngineConfig, context: GeospatialContext) -> Self {
        Self { config, context }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&self) -> &GeospatialContext {
        &self.context
    }

    /// Run one request
    ///
    /// `jitter` is only drawn from when a nutrient falls through to the
    /// simulated soil tier.
    pub fn calculate(
        &self,
        request: &CalculationRequest,
        jitter: &mut dyn JitterSource,
    ) -> Result<CalculationResult> {
        let input = request.validate(&self.config)?;
        let params = self.config.crop(input.crop);

        let soil = SoilNutrientResolver::new(&self.config, &self.context).resolve(
            input.crop,
            input.position,
            &input.custom_soil,
            jitter,
        );
        let efficiency = resolve_efficiency(&self.context.efficiency, &input, params);

        let mut result = compute_plan(&input, &soil, &efficiency, params);
        result.sowing_window = self.sowing_window_note(&input);
        debug!(
            "Plan for {} at {:?}: urea {:.1}, superphosphate {:.1}, KCl {:.1} kg/mu",
            input.crop,
            input.position,
            result.totals.urea,
            result.totals.superphosphate,
            result.totals.potassium_chloride
        );
        Ok(result)
    }

    /// Run many requests in parallel
    ///
    /// Request `i` draws its jitter from `StdRng` seeded with `seed + i`, so
    /// the output matches sequential [`calculate`](Self::calculate) calls
    /// with the same seeds whatever the thread count.
    pub fn calculate_batch(
        &self,
        requests: &[CalculationRequest],
        seed: u64,
    ) -> Vec<Result<CalculationResult>> {
        requests
            .par_iter()
            .enumerate()
            .map(|(i, request)| {
                let mut jitter = RngJitter::new(StdRng::seed_from_u64(seed.wrapping_add(i as u64)));
                self.calculate(request, &mut jitter)
            })
            .collect()
    }

    /// Fertilizing advice for today
    pub fn advise_timing(
        &self,
        crop: CropType,
        sowing_date: Option<&str>,
        today: NaiveDate,
        weather: &WeatherSnapshot,
    ) -> TimingRecommendation {
        advise(crop, sowing_date, today, weather)
    }

    /// Compare the sowing date with the nearest regional sowing window
    fn sowing_window_note(&self, input: &CalculationInput) -> Option<String> {
        let position = input.position?;
        let sowing = input.sowing_date.as_deref().and_then(parse_sowing_date)?;
        let window = self
            .context
            .sowing
            .nearest(input.crop, position.x, position.y)?
            .sowing?;

        let range = format!(
            "{} to {}",
            window.start.format("%m-%d"),
            window.end.format("%m-%d")
        );
        Some(if window.contains_in_year(sowing) {
            format!("Sowing date is within the regional window ({range}).")
        } else {
            format!(
                "Sowing date is outside the regional window ({range}); adjust the split and watch crop development."
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PointFeature;
    use crate::soil::{FixedJitter, SoilSource};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn engine_with_window() -> FertilizerEngine {
        let context = GeospatialContext::empty().with_sowing(vec![
            PointFeature::new(114.3, 30.6, CropType::Wheat).with_sowing(date(10, 15), date(11, 5)),
            PointFeature::new(114.3, 30.6, CropType::Rice).with_sowing(date(5, 20), date(6, 20)),
        ]);
        FertilizerEngine::new(EngineConfig::default(), context)
    }

    #[test]
    fn test_validation_error_surfaces() {
        let engine = FertilizerEngine::default();
        let request = CalculationRequest::new("barley", 500.0);
        assert!(engine.calculate(&request, &mut FixedJitter::zero()).is_err());
    }

    #[test]
    fn test_sowing_window_note() {
        let engine = engine_with_window();
        let inside = CalculationRequest::new("wheat", 400.0)
            .with_location(114.4, 30.5)
            .with_sowing_date("2025-10-25");
        let result = engine.calculate(&inside, &mut FixedJitter::zero()).unwrap();
        let note = result.sowing_window.unwrap();
        assert!(note.contains("within"), "{note}");
        assert!(note.contains("10-15 to 11-05"), "{note}");

        let outside = inside.clone().with_sowing_date("2025-12-01");
        let result = engine.calculate(&outside, &mut FixedJitter::zero()).unwrap();
        assert!(result.sowing_window.unwrap().contains("outside"));

        // No location, no note
        let unplaced = CalculationRequest::new("wheat", 400.0).with_sowing_date("2025-10-25");
        let result = engine.calculate(&unplaced, &mut FixedJitter::zero()).unwrap();
        assert!(result.sowing_window.is_none());
    }

    #[test]
    fn test_batch_matches_sequential() {
        let engine = FertilizerEngine::default();
        let requests: Vec<_> = (0..8_i32)
            .map(|i| {
                CalculationRequest::new(if i % 2 == 0 { "rice" } else { "wheat" }, 400.0)
                    .with_location(112.0 + f64::from(i), 30.0)
            })
            .collect();

        let batch = engine.calculate_batch(&requests, 42);
        for (i, (request, result)) in requests.iter().zip(&batch).enumerate() {
            let mut jitter = RngJitter::new(StdRng::seed_from_u64(42 + i as u64));
            let expected = engine.calculate(request, &mut jitter).unwrap();
            let result = result.as_ref().unwrap();
            assert_eq!(result, &expected);
            assert_eq!(result.soil.source.n, SoilSource::Simulated);
        }
    }
}
