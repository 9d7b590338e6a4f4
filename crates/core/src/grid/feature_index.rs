//! Nearest-neighbour lookup over regional point features
//!
//! Regional data (fertilizer efficiency, sowing windows, soil survey points)
//! arrives as labelled points. Queries always return the single nearest
//! point by planar squared distance in degrees, restricted to the requested
//! crop when any point of that crop exists. Equal distances resolve to the
//! feature loaded first, so answers never depend on hash iteration order.
//!
//! Points are bucketed into a coarse hash grid; a query walks square rings
//! of cells outward from its own cell and stops once no unvisited cell can
//! hold a closer point.

use crate::core_types::{lon_lat, CropType, LonLat, NutrientTriple};
use chrono::{Datelike, NaiveDate};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Below this many points a plain scan beats bucketing
const LINEAR_SCAN_LIMIT: usize = 32;

/// Keeps cell coordinates well inside `i32` for any plausible longitude
const MIN_CELL_SIZE: f64 = 1e-6;

/// Sowing window attached to a sowing-date feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SowingRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SowingRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Like [`contains`](Self::contains) but on month and day only, so a
    /// window recorded for one season applies to any year. Windows that run
    /// past December 31 wrap around.
    pub fn contains_in_year(&self, date: NaiveDate) -> bool {
        let key = |d: NaiveDate| (d.month(), d.day());
        let (start, end, day) = (key(self.start), key(self.end), key(date));
        if start <= end {
            day >= start && day <= end
        } else {
            day >= start || day <= end
        }
    }
}

/// Labelled geographic point
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    pub position: LonLat,
    pub crop: CropType,
    /// Per-nutrient attribute (efficiency fraction, or soil mg/kg)
    pub values: NutrientTriple<Option<f64>>,
    pub sowing: Option<SowingRange>,
}

impl PointFeature {
    pub fn new(lon: f64, lat: f64, crop: CropType) -> Self {
        Self {
            position: lon_lat(lon, lat),
            crop,
            values: NutrientTriple::default(),
            sowing: None,
        }
    }

    pub fn with_values(mut self, n: Option<f64>, p: Option<f64>, k: Option<f64>) -> Self {
        self.values = NutrientTriple::new(n, p, k);
        self
    }

    pub fn with_sowing(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.sowing = Some(SowingRange { start, end });
        self
    }

    #[inline]
    fn distance_sq(&self, query: &LonLat) -> f64 {
        (self.position - query).norm_squared()
    }
}

/// Hash-bucketed subset of the feature list
#[derive(Debug, Clone, Default)]
struct BucketGrid {
    cells: FxHashMap<(i32, i32), Vec<u32>>,
    /// Ascending load indices of every member
    members: Vec<u32>,
    cell_size: f64,
    /// Occupied cell extent: (min_x, min_y, max_x, max_y)
    extent: (i32, i32, i32, i32),
}

impl BucketGrid {
    fn build(features: &[PointFeature], members: Vec<u32>) -> Self {
        if members.len() <= LINEAR_SCAN_LIMIT {
            return Self {
                members,
                cell_size: 1.0,
                ..Self::default()
            };
        }

        let (mut min, mut max) = (
            lon_lat(f64::INFINITY, f64::INFINITY),
            lon_lat(f64::NEG_INFINITY, f64::NEG_INFINITY),
        );
        for &i in &members {
            let p = features[i as usize].position;
            min = min.inf(&p);
            max = max.sup(&p);
        }

        // Aim for about one point per cell over the occupied extent
        let span = (max - min).max();
        let cell_size = if span > 0.0 {
            (span / (members.len() as f64).sqrt()).max(MIN_CELL_SIZE)
        } else {
            1.0
        };

        let mut grid = Self {
            cells: FxHashMap::default(),
            members: Vec::new(),
            cell_size,
            extent: (i32::MAX, i32::MAX, i32::MIN, i32::MIN),
        };
        for &i in &members {
            let (cx, cy) = grid.cell_of(&features[i as usize].position);
            grid.extent.0 = grid.extent.0.min(cx);
            grid.extent.1 = grid.extent.1.min(cy);
            grid.extent.2 = grid.extent.2.max(cx);
            grid.extent.3 = grid.extent.3.max(cy);
            grid.cells.entry((cx, cy)).or_default().push(i);
        }
        grid.members = members;
        grid
    }

    #[inline]
    fn cell_of(&self, p: &LonLat) -> (i32, i32) {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn nearest(&self, features: &[PointFeature], query: &LonLat) -> Option<(usize, f64)> {
        if self.cells.is_empty() {
            return nearest_linear(features, self.members.iter().copied(), query);
        }

        let (qx, qy) = self.cell_of(query);
        let (qx, qy) = (i64::from(qx), i64::from(qy));
        let (min_x, min_y, max_x, max_y) = (
            i64::from(self.extent.0),
            i64::from(self.extent.1),
            i64::from(self.extent.2),
            i64::from(self.extent.3),
        );

        // Queries outside the occupied cells would walk many empty rings
        if qx < min_x || qx > max_x || qy < min_y || qy > max_y {
            return nearest_linear(features, self.members.iter().copied(), query);
        }
        let last_ring = (qx - min_x).max(max_x - qx).max(qy - min_y).max(max_y - qy);

        let mut best: Option<(usize, f64)> = None;
        for ring in 0..=last_ring {
            for cell in ring_cells(qx, qy, ring) {
                if let Some(ids) = self.cells.get(&cell) {
                    for &id in ids {
                        let idx = id as usize;
                        consider(&mut best, idx, features[idx].distance_sq(query));
                    }
                }
            }

            // Anything beyond this ring is at least `ring` cells away
            if let Some((_, d2)) = best {
                let reach = ring as f64 * self.cell_size;
                if d2 < reach * reach {
                    break;
                }
            }
        }
        best
    }
}

/// Keep the closer candidate; equal distances keep the lower index
#[inline]
fn consider(best: &mut Option<(usize, f64)>, idx: usize, d2: f64) {
    let better = match *best {
        None => d2.is_finite(),
        Some((best_idx, best_d2)) => d2 < best_d2 || (d2 == best_d2 && idx < best_idx),
    };
    if better {
        *best = Some((idx, d2));
    }
}

fn nearest_linear(
    features: &[PointFeature],
    ids: impl Iterator<Item = u32>,
    query: &LonLat,
) -> Option<(usize, f64)> {
    let mut best = None;
    for id in ids {
        let idx = id as usize;
        consider(&mut best, idx, features[idx].distance_sq(query));
    }
    best
}

/// Cells on the square ring at Chebyshev distance `r` from `(cx, cy)`
fn ring_cells(cx: i64, cy: i64, r: i64) -> impl Iterator<Item = (i32, i32)> {
    let top_bottom = (-r..=r).flat_map(move |dx| {
        let bottom = (cx + dx, cy - r);
        let top = (cx + dx, cy + r);
        std::iter::once(bottom).chain((r > 0).then_some(top))
    });
    let sides = (-r + 1..r).flat_map(move |dy| [(cx - r, cy + dy), (cx + r, cy + dy)]);
    // Rings are confined to the occupied extent, which fits in i32
    top_bottom
        .chain(sides)
        .map(|(x, y)| (x as i32, y as i32))
}

/// Immutable nearest-point index over one feature set
#[derive(Debug, Clone, Default)]
pub struct NearestFeatureIndex {
    features: Vec<PointFeature>,
    all: BucketGrid,
    rice: BucketGrid,
    wheat: BucketGrid,
}

impl NearestFeatureIndex {
    pub fn new(features: Vec<PointFeature>) -> Self {
        let ids_for = |crop: Option<CropType>| -> Vec<u32> {
            features
                .iter()
                .enumerate()
                .filter(|(_, f)| match crop {
                    Some(wanted) => wanted == f.crop,
                    None => true,
                })
                .map(|(i, _)| i as u32)
                .collect()
        };

        let all = BucketGrid::build(&features, ids_for(None));
        let rice = BucketGrid::build(&features, ids_for(Some(CropType::Rice)));
        let wheat = BucketGrid::build(&features, ids_for(Some(CropType::Wheat)));

        Self {
            features,
            all,
            rice,
            wheat,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[PointFeature] {
        &self.features
    }

    fn grid_for(&self, crop: CropType) -> &BucketGrid {
        let grid = match crop {
            CropType::Rice => &self.rice,
            CropType::Wheat => &self.wheat,
        };
        // No point of this crop: fall back to every point
        if grid.is_empty() {
            &self.all
        } else {
            grid
        }
    }

    /// Nearest feature of `crop`, or of any crop when none match
    pub fn nearest(&self, crop: CropType, lon: f64, lat: f64) -> Option<&PointFeature> {
        self.nearest_with_distance(crop, lon, lat).map(|(f, _)| f)
    }

    /// Nearest feature no farther than `max_distance` degrees
    pub fn nearest_within(
        &self,
        crop: CropType,
        lon: f64,
        lat: f64,
        max_distance: f64,
    ) -> Option<&PointFeature> {
        self.nearest_with_distance(crop, lon, lat)
            .filter(|(_, d2)| *d2 <= max_distance * max_distance)
            .map(|(f, _)| f)
    }

    fn nearest_with_distance(
        &self,
        crop: CropType,
        lon: f64,
        lat: f64,
    ) -> Option<(&PointFeature, f64)> {
        if !(lon.is_finite() && lat.is_finite()) {
            return None;
        }
        let query = lon_lat(lon, lat);
        self.grid_for(crop)
            .nearest(&self.features, &query)
            .map(|(idx, d2)| (&self.features[idx], d2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn linear_reference(
        features: &[PointFeature],
        crop: CropType,
        lon: f64,
        lat: f64,
    ) -> Option<usize> {
        let query = lon_lat(lon, lat);
        let matching: Vec<u32> = features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.crop == crop)
            .map(|(i, _)| i as u32)
            .collect();
        let ids: Vec<u32> = if matching.is_empty() {
            (0..features.len() as u32).collect()
        } else {
            matching
        };
        nearest_linear(features, ids.into_iter(), &query).map(|(i, _)| i)
    }

    fn index_of(index: &NearestFeatureIndex, found: Option<&PointFeature>) -> Option<usize> {
        found.map(|f| {
            index
                .features()
                .iter()
                .position(|g| std::ptr::eq(f, g))
                .unwrap()
        })
    }

    #[test]
    fn test_empty_index_returns_none() {
        let index = NearestFeatureIndex::new(Vec::new());
        assert!(index.nearest(CropType::Rice, 114.0, 30.0).is_none());
    }

    #[test]
    fn test_crop_filter_and_fallback() {
        let features = vec![
            PointFeature::new(114.0, 30.0, CropType::Wheat),
            PointFeature::new(116.0, 31.0, CropType::Rice),
        ];
        let index = NearestFeatureIndex::new(features);

        // Rice query ignores the closer wheat point
        let rice = index.nearest(CropType::Rice, 114.0, 30.0).unwrap();
        assert_eq!(rice.crop, CropType::Rice);

        // Only wheat in this index: rice queries fall back to it
        let wheat_only = NearestFeatureIndex::new(vec![PointFeature::new(
            114.0,
            30.0,
            CropType::Wheat,
        )]);
        assert_eq!(
            wheat_only.nearest(CropType::Rice, 120.0, 32.0).unwrap().crop,
            CropType::Wheat
        );
    }

    #[test]
    fn test_equal_distance_prefers_first_loaded() {
        let features = vec![
            PointFeature::new(115.0, 30.0, CropType::Rice).with_values(Some(0.1), None, None),
            PointFeature::new(113.0, 30.0, CropType::Rice).with_values(Some(0.2), None, None),
        ];
        let index = NearestFeatureIndex::new(features);
        let found = index.nearest(CropType::Rice, 114.0, 30.0).unwrap();
        assert_eq!(found.values.n, Some(0.1));
    }

    #[test]
    fn test_nearest_within_radius() {
        let index = NearestFeatureIndex::new(vec![PointFeature::new(114.0, 30.0, CropType::Rice)]);
        assert!(index.nearest_within(CropType::Rice, 114.03, 30.0, 0.05).is_some());
        assert!(index.nearest_within(CropType::Rice, 114.1, 30.0, 0.05).is_none());
    }

    #[test]
    fn test_bucketed_search_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut features = Vec::new();
        for i in 0..400 {
            let crop = if i % 3 == 0 {
                CropType::Wheat
            } else {
                CropType::Rice
            };
            // Coarse grid coordinates force many exact ties
            let lon = 110.0 + f64::from(rng.random_range(0..48_i32)) * 0.25;
            let lat = 28.0 + f64::from(rng.random_range(0..20_i32)) * 0.25;
            features.push(PointFeature::new(lon, lat, crop));
        }
        let index = NearestFeatureIndex::new(features.clone());

        for _ in 0..300 {
            let lon = rng.random_range(105.0..127.0);
            let lat = rng.random_range(25.0..36.0);
            for crop in CropType::ALL {
                let expected = linear_reference(&features, crop, lon, lat);
                let got = index_of(&index, index.nearest(crop, lon, lat));
                assert_eq!(got, expected, "query ({lon}, {lat}) {crop}");
            }
        }

        // Queries exactly on feature positions and far outside the data
        for (lon, lat) in [(110.0, 28.0), (121.75, 32.75), (200.0, -50.0), (0.0, 0.0)] {
            let expected = linear_reference(&features, CropType::Rice, lon, lat);
            let got = index_of(&index, index.nearest(CropType::Rice, lon, lat));
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_non_finite_query_returns_none() {
        let index = NearestFeatureIndex::new(vec![PointFeature::new(114.0, 30.0, CropType::Rice)]);
        assert!(index.nearest(CropType::Rice, f64::NAN, 30.0).is_none());
    }

    #[test]
    fn test_ring_cells_cover_square_once() {
        let mut seen = std::collections::HashSet::new();
        for r in 0..4 {
            for cell in ring_cells(0, 0, r) {
                assert!(seen.insert(cell), "duplicate {cell:?}");
            }
        }
        assert_eq!(seen.len(), 49);
    }

    #[test]
    fn test_sowing_window_ignores_year_and_wraps() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let autumn = SowingRange {
            start: d(2023, 10, 15),
            end: d(2023, 11, 5),
        };
        assert!(autumn.contains_in_year(d(2025, 10, 25)));
        assert!(autumn.contains_in_year(d(2025, 11, 5)));
        assert!(!autumn.contains_in_year(d(2025, 11, 6)));
        assert!(!autumn.contains(d(2025, 10, 25)));

        let winter = SowingRange {
            start: d(2023, 12, 20),
            end: d(2024, 1, 10),
        };
        assert!(winter.contains_in_year(d(2025, 1, 2)));
        assert!(winter.contains_in_year(d(2025, 12, 31)));
        assert!(!winter.contains_in_year(d(2025, 2, 1)));
    }
}
