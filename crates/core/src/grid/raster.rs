//! Soil nutrient raster layers and point sampling
//!
//! A [`RasterLayer`] is a north-up grid of encoded nutrient values covering a
//! geographic bounding box. Sampling is nearest-cell: the value returned for
//! a coordinate is the raw stored number of the cell containing it, so any
//! per-layer decode factor applied downstream sees exactly the encoded
//! integer that was written to the file.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Sentinel values written by GIS tools for "no measurement"
const NODATA_SENTINELS: [f64; 2] = [-9999.0, -32768.0];

/// Smallest plausible stored value
const MIN_VALID: f64 = -9999.0;

/// Largest plausible stored value
const MAX_VALID: f64 = 100_000.0;

/// Geographic extent in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Inclusive containment test on all four edges
    #[inline]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_x && lon <= self.max_x && lat >= self.min_y && lat <= self.max_y
    }
}

/// Whether a stored sample means "no data"
#[inline]
pub fn is_nodata(value: f64) -> bool {
    !value.is_finite()
        || !(MIN_VALID..=MAX_VALID).contains(&value)
        || NODATA_SENTINELS.contains(&value)
}

/// Immutable raster layer holding one encoded nutrient
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayer {
    /// Number of columns
    width: usize,
    /// Number of rows
    height: usize,
    bbox: BoundingBox,
    /// Degrees of longitude per column
    cell_width: f64,
    /// Degrees of latitude per row
    cell_height: f64,
    /// Stored values in row-major order, row 0 northernmost: `[row * width + col]`
    samples: Vec<Option<f64>>,
}

impl RasterLayer {
    /// Create a layer from row-major samples
    ///
    /// # Errors
    /// Returns error if the sample count is not `width * height`, or if the
    /// bounding box does not give strictly positive, finite cell sizes.
    pub fn new(
        width: usize,
        height: usize,
        bbox: BoundingBox,
        samples: Vec<Option<f64>>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidRaster(format!(
                "dimensions must be positive, got {width}x{height}"
            )));
        }
        let Some(expected) = width.checked_mul(height) else {
            return Err(EngineError::InvalidRaster(format!(
                "dimensions {width}x{height} overflow the cell count"
            )));
        };
        if samples.len() != expected {
            return Err(EngineError::InvalidRaster(format!(
                "sample count mismatch: expected {}x{} = {} values, got {}",
                width,
                height,
                expected,
                samples.len()
            )));
        }

        let cell_width = (bbox.max_x - bbox.min_x) / width as f64;
        let cell_height = (bbox.max_y - bbox.min_y) / height as f64;
        if !(cell_width.is_finite() && cell_width > 0.0) {
            return Err(EngineError::InvalidRaster(format!(
                "cell width must be positive, got {cell_width}"
            )));
        }
        if !(cell_height.is_finite() && cell_height > 0.0) {
            return Err(EngineError::InvalidRaster(format!(
                "cell height must be positive, got {cell_height}"
            )));
        }

        Ok(Self {
            width,
            height,
            bbox,
            cell_width,
            cell_height,
            samples,
        })
    }

    /// Create a layer where every cell holds a value
    pub fn from_values(
        width: usize,
        height: usize,
        bbox: BoundingBox,
        values: Vec<f64>,
    ) -> Result<Self> {
        Self::new(width, height, bbox, values.into_iter().map(Some).collect())
    }

    /// Column and row of the cell containing a coordinate
    ///
    /// Returns `None` outside the bounding box, and also when a coordinate
    /// exactly on the east or south edge floors to one past the last index.
    pub fn pixel_index(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        if !self.bbox.contains(lon, lat) {
            return None;
        }

        let col = ((lon - self.bbox.min_x) / self.cell_width).floor();
        let row = ((self.bbox.max_y - lat) / self.cell_height).floor();

        // Re-check after flooring: edge coordinates may land one cell outside
        if !(col >= 0.0 && col < self.width as f64 && row >= 0.0 && row < self.height as f64) {
            return None;
        }

        Some((col as usize, row as usize))
    }

    /// Stored value at a cell, `None` when it is NODATA or out of range
    #[inline]
    pub fn value_at(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.samples[row * self.width + col].filter(|v| !is_nodata(*v))
    }

    /// Raw stored value at a coordinate (nearest cell, no interpolation)
    pub fn sample(&self, lon: f64, lat: f64) -> Option<f64> {
        let (col, row) = self.pixel_index(lon, lat)?;
        self.value_at(col, row)
    }

    /// Sample and divide by the layer's encode factor
    pub fn sample_decoded(&self, lon: f64, lat: f64, scale: f64) -> Option<f64> {
        self.sample(lon, lat).map(|raw| raw / scale)
    }

    /// Geographic centre of a cell as `(lon, lat)`
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        let lon = self.bbox.min_x + (col as f64 + 0.5) * self.cell_width;
        let lat = self.bbox.max_y - (row as f64 + 0.5) * self.cell_height;
        (lon, lat)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    #[inline]
    pub fn cell_size(&self) -> (f64, f64) {
        (self.cell_width, self.cell_height)
    }

    /// Count of cells holding a usable value
    pub fn valid_count(&self) -> usize {
        self.samples
            .iter()
            .filter(|v| v.is_some_and(|x| !is_nodata(x)))
            .count()
    }
}
