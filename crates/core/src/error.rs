//! Error types for the fertilizer engine.
//!
//! Only two things can fail: a request that does not pass validation, and
//! loading geospatial data from disk. Missing measurements are not errors;
//! they are resolved by the soil fallback chain and reported as provenance.

use std::path::PathBuf;
use thiserror::Error;

/// Request rejected before any computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Crop label is not one of the supported crops.
    #[error("unsupported crop type '{0}', expected rice or wheat")]
    UnknownCrop(String),

    /// Target yield outside 1-1000 kg/mu.
    #[error("target yield {0} kg/mu is outside the accepted range 1-1000")]
    YieldOutOfRange(f64),

    /// Coordinate outside the deployment window.
    #[error("{axis} {value} is outside the service area [{min}, {max}]")]
    CoordinateOutOfRange {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Exactly one of longitude/latitude was supplied.
    #[error("longitude and latitude must be given together")]
    IncompleteCoordinates,

    /// Custom soil value outside its accepted range.
    #[error("custom soil {nutrient} value {value} is outside [0, {max}]")]
    SoilValueOutOfRange {
        nutrient: &'static str,
        value: f64,
        max: f64,
    },

    /// Organic matter outside 0-100 g/kg.
    #[error("organic matter {0} g/kg is outside [0, 100]")]
    OrganicMatterOutOfRange(f64),

    /// Soil pH outside 3-10.
    #[error("soil pH {0} is outside [3, 10]")]
    PhOutOfRange(f64),

    /// Straw return outside 0-2000 kg/mu.
    #[error("straw return {0} kg/mu is outside [0, 2000]")]
    StrawOutOfRange(f64),

    /// A numeric field was NaN or infinite.
    #[error("field '{0}' must be a finite number")]
    NonFinite(&'static str),
}

/// Errors surfaced by the engine and its loaders.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to read {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Raster dimensions, bounding box, or sample count are inconsistent.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
