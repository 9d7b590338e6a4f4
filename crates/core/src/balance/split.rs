//! Split ratios across basal, mid and late dressings
//!
//! The split depends on how far sowing is from the regional norm. Early
//! sowing leaves a long season, so more goes into late dressings; late
//! sowing shortens it, so more goes in at the base. A cold forecast moves a
//! little more from the late dressing to the base.

use crate::config::{CropParameters, StageFractions};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Days either side of the norm still counted as normal sowing
pub const NORMAL_WINDOW_DAYS: i64 = 7;

/// Sowing time relative to the regional norm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SowingRegime {
    Early,
    Normal,
    Late,
}

impl SowingRegime {
    pub fn from_days(days_from_norm: i64) -> Self {
        if days_from_norm < -NORMAL_WINDOW_DAYS {
            SowingRegime::Early
        } else if days_from_norm > NORMAL_WINDOW_DAYS {
            SowingRegime::Late
        } else {
            SowingRegime::Normal
        }
    }
}

/// Fractions of each product applied per stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub base: f64,
    pub mid: f64,
    pub late: f64,
    pub regime: SowingRegime,
    /// Whether the cold-weather shift was applied
    pub cold_adjusted: bool,
    /// Sowing date minus the norm, when the date parsed
    pub days_from_norm: Option<i64>,
}

impl SplitRatios {
    fn from_fractions(fractions: StageFractions, regime: SowingRegime) -> Self {
        Self {
            base: fractions.base,
            mid: fractions.mid,
            late: fractions.late,
            regime,
            cold_adjusted: false,
            days_from_norm: None,
        }
    }

    pub fn sum(&self) -> f64 {
        self.base + self.mid + self.late
    }
}

/// Parse an ISO `YYYY-MM-DD` sowing date
pub fn parse_sowing_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Days between a sowing date and the norm in the same year
pub fn days_from_norm(sowing: NaiveDate, params: &CropParameters) -> Option<i64> {
    let norm = NaiveDate::from_ymd_opt(
        sowing.year(),
        params.normal_sowing.month,
        params.normal_sowing.day,
    )?;
    Some((sowing - norm).num_days())
}

/// Split ratios for a crop
///
/// A missing or unparsable sowing date gives the normal split with no cold
/// adjustment.
pub fn split_ratios(
    sowing_date: Option<&str>,
    temperature_forecast: Option<f64>,
    params: &CropParameters,
) -> SplitRatios {
    let normal = SplitRatios::from_fractions(params.split.normal, SowingRegime::Normal);

    let Some(text) = sowing_date.map(str::trim).filter(|t| !t.is_empty()) else {
        return normal;
    };
    let Some(sowing) = parse_sowing_date(text) else {
        warn!("Unparsable sowing date '{text}', using normal split");
        return normal;
    };
    let Some(days) = days_from_norm(sowing, params) else {
        warn!(
            "Invalid normal sowing date {:?} for {}, using normal split",
            params.normal_sowing, params.crop
        );
        return normal;
    };

    let regime = SowingRegime::from_days(days);
    let fractions = match regime {
        SowingRegime::Early => params.split.early,
        SowingRegime::Normal => params.split.normal,
        SowingRegime::Late => params.split.late,
    };
    let mut ratios = SplitRatios::from_fractions(fractions, regime);
    ratios.days_from_norm = Some(days);

    if temperature_forecast.is_some_and(|t| t < params.cold_threshold) {
        let shift = params.cold_shift.min(ratios.late).max(0.0);
        ratios.late -= shift;
        ratios.base += shift;
        ratios.cold_adjusted = true;
    }

    ratios.base = ratios.base.clamp(0.0, 1.0);
    ratios.mid = ratios.mid.clamp(0.0, 1.0);
    ratios.late = ratios.late.clamp(0.0, 1.0);
    ratios
}
