//! Fertilizer Planning Core Library
//!
//! Recommends rice and wheat fertilizer rates and application timing from
//! geolocated soil data, yield targets and weather forecasts.
//!
//! ## Pipeline
//!
//! - Soil N, P and K are resolved per nutrient through an ordered source
//!   chain: user input, soil rasters, survey points, a simulated regional
//!   trend, then crop defaults. Every value carries its provenance.
//! - The nutrient balance subtracts soil and straw supply from crop demand,
//!   divides by fertilizer use efficiency and converts to urea,
//!   superphosphate and potassium chloride.
//! - Doses are split across basal, mid and late dressings according to the
//!   sowing date and forecast temperature.
//! - Independently, weather risk and growth stage combine into a go / no-go
//!   timing recommendation.
//!
//! All computation is pure and synchronous given an [`EngineConfig`] and a
//! [`GeospatialContext`]; randomness only enters through a [`JitterSource`].

// Core types and utilities
pub mod core_types;
pub mod config;
pub mod error;

// Geospatial lookup
pub mod grid;

// Fertilizer plan
pub mod balance;
pub mod request;
pub mod soil;

// Timing
pub mod timing;
pub mod weather;

pub mod engine;

// Re-export core types
pub use core_types::{CropType, LonLat, Nutrient, NutrientTriple};
pub use core_types::{CurrentWeather, DailyForecast, WeatherSnapshot};

pub use config::{CropParameters, EngineConfig};
pub use error::{EngineError, Result, ValidationError};

pub use grid::{GeospatialContext, NearestFeatureIndex, PointFeature, RasterLayer};
pub use soil::{FixedJitter, JitterSource, RngJitter, SoilNutrientRecord, SoilSource};

pub use balance::{ApplicationStage, CalculationResult, SplitRatios};
pub use request::{CalculationInput, CalculationRequest};

pub use timing::{GrowthStage, TimingRecommendation};
pub use weather::{RiskLevel, WeatherRiskReport};

pub use engine::FertilizerEngine;
