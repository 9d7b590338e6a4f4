//! Read-only geospatial data shared by every calculation

use crate::core_types::{Nutrient, NutrientTriple};
use crate::grid::{NearestFeatureIndex, PointFeature, RasterLayer};

/// Soil rasters plus the regional point layers
///
/// Built once at startup and shared immutably; every field may be absent,
/// in which case the lookups that depend on it fall through to defaults.
#[derive(Debug, Clone, Default)]
pub struct GeospatialContext {
    /// One raster per nutrient (N, P, K)
    pub soil_layers: NutrientTriple<Option<RasterLayer>>,

    /// Regional fertilizer use efficiency points
    pub efficiency: NearestFeatureIndex,

    /// Regional sowing window points
    pub sowing: NearestFeatureIndex,

    /// Field soil survey points
    pub soil_points: NearestFeatureIndex,
}

impl GeospatialContext {
    /// Context with no data at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, nutrient: Nutrient, layer: RasterLayer) -> Self {
        *self.soil_layers.get_mut(nutrient) = Some(layer);
        self
    }

    pub fn with_efficiency(mut self, features: Vec<PointFeature>) -> Self {
        self.efficiency = NearestFeatureIndex::new(features);
        self
    }

    pub fn with_sowing(mut self, features: Vec<PointFeature>) -> Self {
        self.sowing = NearestFeatureIndex::new(features);
        self
    }

    pub fn with_soil_points(mut self, features: Vec<PointFeature>) -> Self {
        self.soil_points = NearestFeatureIndex::new(features);
        self
    }

    #[inline]
    pub fn layer(&self, nutrient: Nutrient) -> Option<&RasterLayer> {
        self.soil_layers.get(nutrient).as_ref()
    }

    /// Number of soil rasters present
    pub fn layer_count(&self) -> usize {
        self.soil_layers.iter().filter(|(_, l)| l.is_some()).count()
    }
}
