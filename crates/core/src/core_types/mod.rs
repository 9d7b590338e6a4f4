//! Core types and utilities

pub mod crop;
pub mod lonlat;
pub mod units;
pub mod weather;

pub use crop::{CropType, Nutrient, NutrientTriple, UnknownCropLabel};
pub use lonlat::{lon_lat, LonLat};
pub use units::{Celsius, Millimeters, Percent};
pub use weather::{CurrentWeather, DailyForecast, WeatherSnapshot};
