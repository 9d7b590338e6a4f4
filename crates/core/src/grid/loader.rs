//! Loading soil rasters and regional point layers from a data directory
//!
//! # Directory layout
//!
//! | File | Content |
//! |------|---------|
//! | `soil_n.json`, `soil_p.json`, `soil_k.json` | Soil rasters |
//! | `efficiency.geojson` | Fertilizer use efficiency points (`N`, `P`, `K` as 0-1 fractions) |
//! | `sowing_dates.geojson` | Sowing windows (`sowing_start`, `sowing_end` as `YYYY-MM-DD`) |
//! | `soil_points.geojson` | Soil survey points (`N`, `P`, `K` in mg/kg) |
//!
//! Rasters are JSON objects `{ "width", "height", "bbox": [minX, minY, maxX,
//! maxY], "data": [...] }` with `data` in row-major order, row 0 northernmost,
//! and `null` for missing cells. Every point feature carries a `crop`
//! property.
//!
//! A missing file is not an error: the layer is left empty and lookups fall
//! back to defaults. A file that exists but cannot be parsed is an error.

use crate::core_types::{CropType, Nutrient};
use crate::error::{EngineError, Result};
use crate::grid::{BoundingBox, GeospatialContext, PointFeature, RasterLayer};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

pub const EFFICIENCY_FILE: &str = "efficiency.geojson";
pub const SOWING_FILE: &str = "sowing_dates.geojson";
pub const SOIL_POINTS_FILE: &str = "soil_points.geojson";

/// Raster file name for a nutrient
pub fn raster_file_name(nutrient: Nutrient) -> &'static str {
    match nutrient {
        Nutrient::N => "soil_n.json",
        Nutrient::P => "soil_p.json",
        Nutrient::K => "soil_k.json",
    }
}

#[derive(Debug, Deserialize)]
struct RasterFile {
    width: usize,
    height: usize,
    bbox: [f64; 4],
    data: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<GeoFeature>,
}

#[derive(Debug, Deserialize)]
struct GeoFeature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureProperties {
    #[serde(alias = "crop_type")]
    crop: Option<String>,
    #[serde(rename = "N")]
    n: Option<f64>,
    #[serde(rename = "P")]
    p: Option<f64>,
    #[serde(rename = "K")]
    k: Option<f64>,
    sowing_start: Option<String>,
    sowing_end: Option<String>,
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| EngineError::Load {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| EngineError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a single raster file
pub fn load_raster(path: &Path) -> Result<RasterLayer> {
    let text = read_file(path)?;
    let file: RasterFile = parse_json(path, &text)?;
    let [min_x, min_y, max_x, max_y] = file.bbox;
    RasterLayer::new(
        file.width,
        file.height,
        BoundingBox::new(min_x, min_y, max_x, max_y),
        file.data,
    )
}

/// Load point features from a GeoJSON `FeatureCollection`
///
/// Features that are not points, have no usable coordinates, or name an
/// unknown crop are skipped with a warning.
pub fn load_point_features(path: &Path) -> Result<Vec<PointFeature>> {
    let text = read_file(path)?;
    let collection: FeatureCollection = parse_json(path, &text)?;

    let total = collection.features.len();
    let features: Vec<PointFeature> = collection
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(i, feature)| convert_feature(path, i, feature))
        .collect();

    if features.len() < total {
        warn!(
            "{}: skipped {} of {} features",
            path.display(),
            total - features.len(),
            total
        );
    }
    Ok(features)
}

fn convert_feature(path: &Path, index: usize, feature: GeoFeature) -> Option<PointFeature> {
    let Some(geometry) = feature.geometry else {
        warn!("{} feature {index}: no geometry", path.display());
        return None;
    };
    if geometry.kind != "Point" {
        warn!(
            "{} feature {index}: unsupported geometry '{}'",
            path.display(),
            geometry.kind
        );
        return None;
    }

    let coords = geometry
        .coordinates
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default();
    let (Some(lon), Some(lat)) = (
        coords.first().and_then(serde_json::Value::as_f64),
        coords.get(1).and_then(serde_json::Value::as_f64),
    ) else {
        warn!("{} feature {index}: malformed coordinates", path.display());
        return None;
    };

    let props = feature.properties;
    let crop = match props.crop.as_deref().map(str::parse::<CropType>) {
        Some(Ok(crop)) => crop,
        Some(Err(label)) => {
            warn!("{} feature {index}: unknown crop '{}'", path.display(), label.0);
            return None;
        }
        None => {
            warn!("{} feature {index}: missing crop property", path.display());
            return None;
        }
    };

    let mut point = PointFeature::new(lon, lat, crop).with_values(props.n, props.p, props.k);

    if let (Some(start), Some(end)) = (props.sowing_start, props.sowing_end) {
        match (parse_date(&start), parse_date(&end)) {
            (Some(start), Some(end)) => point = point.with_sowing(start, end),
            _ => warn!(
                "{} feature {index}: unparsable sowing window '{start}'..'{end}'",
                path.display()
            ),
        }
    }

    Some(point)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Load a file if it exists, logging when it does not
fn load_optional<T>(path: &Path, load: impl FnOnce(&Path) -> Result<T>) -> Result<Option<T>> {
    if path.is_file() {
        load(path).map(Some)
    } else {
        info!("{} not found, layer disabled", path.display());
        Ok(None)
    }
}

impl GeospatialContext {
    /// Load every known layer from `dir`
    ///
    /// # Errors
    /// Returns error if a present file cannot be read or parsed, or if a
    /// raster's dimensions do not match its data.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut context = Self::empty();

        for nutrient in Nutrient::ALL {
            let path = dir.join(raster_file_name(nutrient));
            if let Some(layer) = load_optional(&path, load_raster)? {
                info!(
                    "Loaded {} raster {}x{} ({} valid cells)",
                    nutrient,
                    layer.width(),
                    layer.height(),
                    layer.valid_count()
                );
                *context.soil_layers.get_mut(nutrient) = Some(layer);
            }
        }

        if let Some(points) = load_optional(&dir.join(EFFICIENCY_FILE), load_point_features)? {
            info!("Loaded {} efficiency points", points.len());
            context = context.with_efficiency(points);
        }
        if let Some(points) = load_optional(&dir.join(SOWING_FILE), load_point_features)? {
            info!("Loaded {} sowing date points", points.len());
            context = context.with_sowing(points);
        }
        if let Some(points) = load_optional(&dir.join(SOIL_POINTS_FILE), load_point_features)? {
            info!("Loaded {} soil survey points", points.len());
            context = context.with_soil_points(points);
        }

        Ok(context)
    }
}
