//! Weather snapshot supplied by the caller for timing advice
//!
//! The engine never fetches weather itself. The surrounding service pulls
//! current conditions and a daily forecast from its provider and hands them
//! over as a [`WeatherSnapshot`]. Descriptions are kept as free text because
//! providers report conditions as localized phrases ("小雨", "light rain").

use crate::core_types::units::{Celsius, Millimeters, Percent};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Observed conditions at request time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Air temperature
    pub temperature: Celsius,

    /// Relative humidity (0-100)
    pub humidity: Percent,

    /// Wind force on the Beaufort-style 0-12 scale reported by Chinese providers
    #[serde(default)]
    pub wind_scale: u8,

    /// Precipitation amount in the last hour
    #[serde(default)]
    pub precipitation: Millimeters,

    /// Precipitation probability, when the provider reports one for "now"
    #[serde(default)]
    pub precipitation_probability: Option<Percent>,

    /// Provider's condition text
    #[serde(default)]
    pub description: String,
}

impl CurrentWeather {
    /// Fair-weather conditions with the given temperature and humidity
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature: Celsius::new(temperature),
            humidity: Percent::new(humidity),
            wind_scale: 1,
            precipitation: Millimeters::new(0.0),
            precipitation_probability: None,
            description: String::new(),
        }
    }

    pub fn with_precipitation(mut self, mm: f64) -> Self {
        self.precipitation = Millimeters::new(mm);
        self
    }

    pub fn with_probability(mut self, percent: f64) -> Self {
        self.precipitation_probability = Some(Percent::new(percent));
        self
    }

    pub fn with_wind_scale(mut self, scale: u8) -> Self {
        self.wind_scale = scale;
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }
}

/// One day of the forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_max: Celsius,
    pub temp_min: Celsius,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub precipitation: Millimeters,
    #[serde(default)]
    pub precipitation_probability: Percent,
}

impl DailyForecast {
    /// Dry day with the given temperature range
    pub fn new(date: NaiveDate, temp_min: f64, temp_max: f64) -> Self {
        Self {
            date,
            temp_max: Celsius::new(temp_max),
            temp_min: Celsius::new(temp_min),
            description: String::new(),
            precipitation: Millimeters::new(0.0),
            precipitation_probability: Percent::new(0.0),
        }
    }

    pub fn with_rain(mut self, mm: f64, probability: f64) -> Self {
        self.precipitation = Millimeters::new(mm);
        self.precipitation_probability = Percent::new(probability);
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }
}

/// Current conditions plus up to seven daily forecasts
///
/// `daily[0]` is "today".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentWeather,
    #[serde(default)]
    pub daily: Vec<DailyForecast>,
}

impl WeatherSnapshot {
    /// Maximum number of forecast days considered
    pub const FORECAST_DAYS: usize = 7;

    pub fn new(current: CurrentWeather, mut daily: Vec<DailyForecast>) -> Self {
        daily.truncate(Self::FORECAST_DAYS);
        Self { current, daily }
    }

    /// Today's forecast entry, if the provider sent one
    pub fn today(&self) -> Option<&DailyForecast> {
        self.daily.first()
    }

    /// Forecast days in order, capped at [`Self::FORECAST_DAYS`]
    pub fn forecast(&self) -> &[DailyForecast] {
        let len = self.daily.len().min(Self::FORECAST_DAYS);
        &self.daily[..len]
    }
}
