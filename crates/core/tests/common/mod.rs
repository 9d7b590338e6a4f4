//! Shared setup for integration tests
#![allow(dead_code)]

use chrono::NaiveDate;
use fertiplan_core::grid::BoundingBox;
use fertiplan_core::{EngineConfig, FertilizerEngine, GeospatialContext, Nutrient, RasterLayer};
use tracing_subscriber::EnvFilter;

/// Route library logs to the test harness, filtered by `RUST_LOG`
#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 4x4 layer over 114-115°E, 30-31°N filled with one raw value
pub fn uniform_layer(raw: f64) -> RasterLayer {
    RasterLayer::from_values(4, 4, BoundingBox::new(114.0, 30.0, 115.0, 31.0), vec![raw; 16])
        .unwrap()
}

/// Engine with an N raster around Wuhan and nothing else
pub fn engine_with_n_raster(raw_n: f64) -> FertilizerEngine {
    let context = GeospatialContext::empty().with_layer(Nutrient::N, uniform_layer(raw_n));
    FertilizerEngine::new(EngineConfig::default(), context)
}
