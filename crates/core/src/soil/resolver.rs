//! Ordered soil source chain

use crate::config::{CropParameters, EngineConfig, SoilTrend};
use crate::core_types::{CropType, LonLat, Nutrient, NutrientTriple};
use crate::grid::GeospatialContext;
use crate::soil::{JitterSource, SoilNutrientRecord, SoilSource, SOIL_VALUE_FLOOR};
use tracing::debug;

/// Spatial trend value before clamping
pub fn trend_value(trend: &SoilTrend, nutrient: Nutrient, position: &LonLat, u: f64) -> f64 {
    let d_lon = position.x - trend.reference_lon;
    let d_lat = position.y - trend.reference_lat;
    trend.base.get(nutrient)
        + trend.grad_lon.get(nutrient) * d_lon
        + trend.grad_lat.get(nutrient) * d_lat
        + trend.jitter.get(nutrient) * u
}

/// Per-request inputs to the chain
struct Query<'q> {
    crop: CropType,
    params: &'q CropParameters,
    position: Option<LonLat>,
    custom: &'q NutrientTriple<Option<f64>>,
}

/// Resolves soil N, P and K for a location
///
/// Borrowing the shared context keeps one resolver per request cheap.
pub struct SoilNutrientResolver<'a> {
    config: &'a EngineConfig,
    context: &'a GeospatialContext,
}

impl<'a> SoilNutrientResolver<'a> {
    pub fn new(config: &'a EngineConfig, context: &'a GeospatialContext) -> Self {
        Self { config, context }
    }

    /// Resolve all three nutrients.
    ///
    /// `custom` holds user-entered values; `jitter` is drawn from only for
    /// nutrients that reach the simulated tier.
    pub fn resolve(
        &self,
        crop: CropType,
        position: Option<LonLat>,
        custom: &NutrientTriple<Option<f64>>,
        jitter: &mut dyn JitterSource,
    ) -> SoilNutrientRecord {
        let params = self.config.crop(crop);
        let query = Query {
            crop,
            params,
            position,
            custom,
        };

        let mut values = NutrientTriple::splat(0.0);
        let mut sources = NutrientTriple::splat(SoilSource::Default);
        for nutrient in Nutrient::ALL {
            let (value, source) = SoilSource::CHAIN
                .iter()
                .find_map(|&source| {
                    self.attempt(source, nutrient, &query, jitter)
                        .map(|value| (value, source))
                })
                .unwrap_or((*params.default_soil.get(nutrient), SoilSource::Default));

            let value = value.max(SOIL_VALUE_FLOOR);
            debug!("Soil {nutrient}: {value:.2} mg/kg from {source:?}");
            *values.get_mut(nutrient) = value;
            *sources.get_mut(nutrient) = source;
        }

        SoilNutrientRecord::new(values, sources, &self.config.soil_level_bounds)
    }

    /// One step of the chain; `None` passes to the next source
    fn attempt(
        &self,
        source: SoilSource,
        nutrient: Nutrient,
        query: &Query<'_>,
        jitter: &mut dyn JitterSource,
    ) -> Option<f64> {
        match source {
            SoilSource::Manual => *query.custom.get(nutrient),

            SoilSource::Raster => {
                let position = query.position?;
                let layer = self.context.layer(nutrient)?;
                layer.sample_decoded(
                    position.x,
                    position.y,
                    *self.config.layer_scales.get(nutrient),
                )
            }

            SoilSource::GeoFeature => {
                let position = query.position?;
                let point = self.context.soil_points.nearest_within(
                    query.crop,
                    position.x,
                    position.y,
                    self.config.soil_survey_radius_deg,
                )?;
                *point.values.get(nutrient)
            }

            SoilSource::Simulated => {
                let position = query.position?;
                let trend = &query.params.soil_trend;
                let u = jitter.next_jitter();
                let raw = trend_value(trend, nutrient, &position, u);
                Some(raw.clamp(*trend.min.get(nutrient), *trend.max.get(nutrient)))
            }

            SoilSource::Default => {
                if query.position.is_some() {
                    None
                } else {
                    Some(*query.params.default_soil.get(nutrient))
                }
            }
        }
    }
}
