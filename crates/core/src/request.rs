//! Calculation requests and their validation
//!
//! [`CalculationRequest`] mirrors what a client sends. It is checked once by
//! [`CalculationRequest::validate`], which either rejects it with a
//! [`ValidationError`] or produces a [`CalculationInput`] with every default
//! filled in. Nothing downstream re-validates.

use crate::config::EngineConfig;
use crate::core_types::{lon_lat, CropType, LonLat, Nutrient, NutrientTriple};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Accepted target yield (kg/mu)
pub const YIELD_RANGE: (f64, f64) = (1.0, 1000.0);

/// Upper bounds of user-entered soil values (mg/kg)
pub const CUSTOM_SOIL_MAX: NutrientTriple<f64> = NutrientTriple::new(300.0, 100.0, 500.0);

pub const ORGANIC_MATTER_MAX: f64 = 100.0;
pub const PH_RANGE: (f64, f64) = (3.0, 10.0);
pub const STRAW_RETURN_MAX: f64 = 2000.0;

/// Partial soil test entered by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomSoil {
    #[serde(default, alias = "N")]
    pub n: Option<f64>,
    #[serde(default, alias = "P")]
    pub p: Option<f64>,
    #[serde(default, alias = "K")]
    pub k: Option<f64>,
}

/// Raw request as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub crop: String,
    /// kg/mu
    pub target_yield: f64,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    /// ISO date; bad values are tolerated and fall back to normal timing
    #[serde(default)]
    pub sowing_date: Option<String>,
    #[serde(default)]
    pub custom_soil: Option<CustomSoil>,
    /// g/kg
    #[serde(default)]
    pub organic_matter: Option<f64>,
    #[serde(default)]
    pub soil_ph: Option<f64>,
    /// Fresh straw returned from the previous crop (kg/mu)
    #[serde(default)]
    pub straw_return: Option<f64>,
    /// Forecast mean temperature around basal application (°C)
    #[serde(default)]
    pub temperature_forecast: Option<f64>,
}

impl CalculationRequest {
    pub fn new(crop: impl Into<String>, target_yield: f64) -> Self {
        Self {
            crop: crop.into(),
            target_yield,
            lon: None,
            lat: None,
            sowing_date: None,
            custom_soil: None,
            organic_matter: None,
            soil_ph: None,
            straw_return: None,
            temperature_forecast: None,
        }
    }

    pub fn with_location(mut self, lon: f64, lat: f64) -> Self {
        self.lon = Some(lon);
        self.lat = Some(lat);
        self
    }

    pub fn with_sowing_date(mut self, date: impl Into<String>) -> Self {
        self.sowing_date = Some(date.into());
        self
    }

    pub fn with_custom_soil(mut self, n: Option<f64>, p: Option<f64>, k: Option<f64>) -> Self {
        self.custom_soil = Some(CustomSoil { n, p, k });
        self
    }

    pub fn with_organic_matter(mut self, organic_matter: f64) -> Self {
        self.organic_matter = Some(organic_matter);
        self
    }

    pub fn with_soil_ph(mut self, ph: f64) -> Self {
        self.soil_ph = Some(ph);
        self
    }

    pub fn with_straw_return(mut self, kg_per_mu: f64) -> Self {
        self.straw_return = Some(kg_per_mu);
        self
    }

    pub fn with_temperature_forecast(mut self, celsius: f64) -> Self {
        self.temperature_forecast = Some(celsius);
        self
    }

    /// Check every field and fill defaults from the crop parameters
    pub fn validate(&self, config: &EngineConfig) -> Result<CalculationInput, ValidationError> {
        let crop: CropType = self
            .crop
            .parse()
            .map_err(|_| ValidationError::UnknownCrop(self.crop.trim().to_string()))?;
        let params = config.crop(crop);

        let target_yield = finite("target_yield", self.target_yield)?;
        if !(YIELD_RANGE.0..=YIELD_RANGE.1).contains(&target_yield) {
            return Err(ValidationError::YieldOutOfRange(target_yield));
        }

        let position = match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => {
                let area = &config.service_area;
                let lon = in_range("longitude", finite("lon", lon)?, area.lon_min, area.lon_max)?;
                let lat = in_range("latitude", finite("lat", lat)?, area.lat_min, area.lat_max)?;
                Some(lon_lat(lon, lat))
            }
            (None, None) => None,
            _ => return Err(ValidationError::IncompleteCoordinates),
        };

        let soil = self.custom_soil.unwrap_or_default();
        let custom_soil = NutrientTriple::new(soil.n, soil.p, soil.k);
        for (nutrient, value) in custom_soil.iter() {
            if let Some(value) = *value {
                check_soil_value(nutrient, value)?;
            }
        }

        let organic_matter = match self.organic_matter {
            Some(om) => {
                let om = finite("organic_matter", om)?;
                if !(0.0..=ORGANIC_MATTER_MAX).contains(&om) {
                    return Err(ValidationError::OrganicMatterOutOfRange(om));
                }
                om
            }
            None => params.default_organic_matter,
        };

        let soil_ph = match self.soil_ph {
            Some(ph) => {
                let ph = finite("soil_ph", ph)?;
                if !(PH_RANGE.0..=PH_RANGE.1).contains(&ph) {
                    return Err(ValidationError::PhOutOfRange(ph));
                }
                ph
            }
            None => params.default_ph,
        };

        let straw_return = match self.straw_return {
            Some(straw) => {
                let straw = finite("straw_return", straw)?;
                if !(0.0..=STRAW_RETURN_MAX).contains(&straw) {
                    return Err(ValidationError::StrawOutOfRange(straw));
                }
                straw
            }
            None => 0.0,
        };

        let temperature_forecast = self
            .temperature_forecast
            .map(|t| finite("temperature_forecast", t))
            .transpose()?;

        Ok(CalculationInput {
            crop,
            target_yield,
            position,
            sowing_date: self.sowing_date.clone(),
            custom_soil,
            organic_matter,
            soil_ph,
            straw_return,
            temperature_forecast,
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite(field))
    }
}

fn in_range(axis: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::CoordinateOutOfRange {
            axis,
            value,
            min,
            max,
        })
    }
}

fn check_soil_value(nutrient: Nutrient, value: f64) -> Result<(), ValidationError> {
    let field = match nutrient {
        Nutrient::N => "custom_soil.N",
        Nutrient::P => "custom_soil.P",
        Nutrient::K => "custom_soil.K",
    };
    let value = finite(field, value)?;
    let max = *CUSTOM_SOIL_MAX.get(nutrient);
    if (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::SoilValueOutOfRange {
            nutrient: nutrient.symbol(),
            value,
            max,
        })
    }
}

/// Validated request with defaults applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationInput {
    pub crop: CropType,
    pub target_yield: f64,
    pub position: Option<LonLat>,
    pub sowing_date: Option<String>,
    pub custom_soil: NutrientTriple<Option<f64>>,
    pub organic_matter: f64,
    pub soil_ph: f64,
    pub straw_return: f64,
    pub temperature_forecast: Option<f64>,
}
