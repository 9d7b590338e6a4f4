//! Vector type alias for geographic positions.

use nalgebra::Vector2;

/// Geographic position as `(longitude, latitude)` in decimal degrees.
///
/// This is a simple alias for `nalgebra::Vector2<f64>`, used for feature
/// coordinates and query points. Distances computed on it are planar degree
/// distances with no geodesic correction.
pub type LonLat = Vector2<f64>;

/// Build a position from longitude and latitude.
#[inline]
#[must_use]
pub fn lon_lat(lon: f64, lat: f64) -> LonLat {
    Vector2::new(lon, lat)
}
