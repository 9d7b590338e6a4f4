//! Geospatial data: soil rasters, regional point layers, and their loaders

pub mod context;
pub mod feature_index;
pub mod loader;
pub mod raster;

// Re-export main types
pub use context::GeospatialContext;
pub use feature_index::{NearestFeatureIndex, PointFeature, SowingRange};
pub use loader::{load_point_features, load_raster};
pub use raster::{is_nodata, BoundingBox, RasterLayer};
