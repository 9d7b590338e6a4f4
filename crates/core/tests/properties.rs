//! Invariants that hold for any valid request
mod common;

use approx::assert_relative_eq;
use common::{engine_with_n_raster, uniform_layer};
use fertiplan_core::balance::split_ratios;
use fertiplan_core::grid::BoundingBox;
use fertiplan_core::{
    CalculationRequest, CropType, EngineConfig, FertilizerEngine, FixedJitter, GeospatialContext,
    Nutrient, RasterLayer, RngJitter, SoilSource,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_masses_never_negative() {
    let engine = FertilizerEngine::default();
    let mut rng = StdRng::seed_from_u64(2024);

    for crop in CropType::ALL {
        for target_yield in [1.0, 50.0, 300.0, 450.0, 700.0, 1000.0] {
            for _ in 0..20 {
                let request = CalculationRequest::new(crop.as_str(), target_yield)
                    .with_custom_soil(
                        Some(rng.random_range(0.0..=300.0)),
                        Some(rng.random_range(0.0..=100.0)),
                        Some(rng.random_range(0.0..=500.0)),
                    )
                    .with_organic_matter(rng.random_range(0.0..=100.0))
                    .with_soil_ph(rng.random_range(3.0..=10.0))
                    .with_straw_return(rng.random_range(0.0..=2000.0));

                let result = engine.calculate(&request, &mut FixedJitter::zero()).unwrap();
                let totals = result.totals;
                assert!(totals.urea >= 0.0 && totals.superphosphate >= 0.0);
                assert!(totals.potassium_chloride >= 0.0);
                for stage in &result.stages {
                    assert!(stage.products.urea >= 0.0, "{request:?}");
                    assert!(stage.products.superphosphate >= 0.0, "{request:?}");
                    assert!(stage.products.potassium_chloride >= 0.0, "{request:?}");
                }
                for (_, breakdown) in result.nutrients.iter() {
                    assert!(breakdown.required >= 0.0);
                    assert!(breakdown.product_mass >= 0.0);
                }
                assert!(result.straw.additional_n >= 0.0);
            }
        }
    }
}

#[test]
fn test_is_default_tracks_measured_sources() {
    let engine = engine_with_n_raster(140.0);
    let mut jitter = FixedJitter::zero();

    // No location, no soil test
    let result = engine
        .calculate(&CalculationRequest::new("rice", 500.0), &mut jitter)
        .unwrap();
    assert!(result.soil.is_default);
    assert!(result
        .soil
        .source
        .iter()
        .all(|(_, s)| *s == SoilSource::Default));

    // Location outside the raster: simulated only
    let result = engine
        .calculate(
            &CalculationRequest::new("rice", 500.0).with_location(118.0, 32.0),
            &mut jitter,
        )
        .unwrap();
    assert!(result.soil.is_default);

    // One manual value is enough
    let result = engine
        .calculate(
            &CalculationRequest::new("rice", 500.0).with_custom_soil(None, Some(20.0), None),
            &mut jitter,
        )
        .unwrap();
    assert!(!result.soil.is_default);

    // So is one raster hit
    let result = engine
        .calculate(
            &CalculationRequest::new("rice", 500.0).with_location(114.5, 30.5),
            &mut jitter,
        )
        .unwrap();
    assert_eq!(result.soil.source.n, SoilSource::Raster);
    assert!(!result.soil.is_default);
}

#[test]
fn test_raster_pixel_center_round_trip() {
    let bbox = BoundingBox::new(110.0, 28.0, 122.0, 33.0);
    let (width, height) = (24, 10);
    let values: Vec<f64> = (0..width * height).map(|i| i as f64).collect();
    let layer = RasterLayer::from_values(width, height, bbox, values).unwrap();

    for row in 0..height {
        for col in 0..width {
            let (lon, lat) = layer.pixel_center(col, row);
            assert_eq!(layer.pixel_index(lon, lat), Some((col, row)));
            assert_eq!(layer.sample(lon, lat), Some((row * width + col) as f64));
        }
    }
}

#[test]
fn test_fixed_seed_is_idempotent() {
    let engine = FertilizerEngine::default();
    let request = CalculationRequest::new("wheat", 420.0)
        .with_location(113.2, 29.4)
        .with_sowing_date("2024-10-30")
        .with_straw_return(300.0);

    let first = engine
        .calculate(&request, &mut RngJitter::new(StdRng::seed_from_u64(9)))
        .unwrap();
    let second = engine
        .calculate(&request, &mut RngJitter::new(StdRng::seed_from_u64(9)))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_boundary_coordinates_never_panic() {
    let layer = uniform_layer(130.0);
    let bbox = layer.bbox();
    let corners = [
        (bbox.min_x, bbox.min_y),
        (bbox.min_x, bbox.max_y),
        (bbox.max_x, bbox.min_y),
        (bbox.max_x, bbox.max_y),
        (bbox.max_x - f64::EPSILON * 200.0, bbox.min_y + 1e-12),
        (f64::NAN, 30.5),
        (114.5, f64::INFINITY),
    ];
    for (lon, lat) in corners {
        let _ = layer.sample(lon, lat);
    }
    // East and south edges are outside the last cell
    assert_eq!(layer.sample(bbox.max_x, 30.5), None);
    assert_eq!(layer.sample(114.5, bbox.min_y), None);
    assert_eq!(layer.sample(bbox.min_x, bbox.max_y), Some(130.0));

    // Engine requests on the service-area corners
    let context = GeospatialContext::empty()
        .with_layer(Nutrient::N, uniform_layer(130.0))
        .with_layer(Nutrient::K, uniform_layer(-9999.0));
    let engine = FertilizerEngine::new(EngineConfig::default(), context);
    for (lon, lat) in [(110.0, 28.0), (122.0, 33.0), (115.0, 30.0), (114.0, 31.0)] {
        for crop in CropType::ALL {
            let request = CalculationRequest::new(crop.as_str(), 500.0).with_location(lon, lat);
            let result = engine.calculate(&request, &mut FixedJitter::zero()).unwrap();
            // NODATA never counts as a raster hit
            assert_ne!(result.soil.source.k, SoilSource::Raster);
        }
    }
}

#[test]
fn test_split_ratios_sum_to_one() {
    let config = EngineConfig::default();
    for crop in CropType::ALL {
        let params = config.crop(crop);
        let norm = format!(
            "2024-{:02}-{:02}",
            params.normal_sowing.month, params.normal_sowing.day
        );
        let norm_date = chrono::NaiveDate::parse_from_str(&norm, "%Y-%m-%d").unwrap();

        for offset in [-30_i64, -8, -7, 0, 7, 8, 30] {
            let sowing = (norm_date + chrono::Duration::days(offset))
                .format("%Y-%m-%d")
                .to_string();
            for forecast in [None, Some(-5.0), Some(params.cold_threshold), Some(25.0)] {
                let ratios = split_ratios(Some(&sowing), forecast, params);
                assert_relative_eq!(ratios.sum(), 1.0, epsilon = 1e-6);
                assert!(ratios.base >= 0.0 && ratios.mid >= 0.0 && ratios.late >= 0.0);
            }
        }
        let fallback = split_ratios(Some("not a date"), Some(-20.0), params);
        assert_relative_eq!(fallback.sum(), 1.0, epsilon = 1e-6);
        assert!(!fallback.cold_adjusted);
    }
}
