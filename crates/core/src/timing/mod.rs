//! Fertilizing time advice
//!
//! Combines the crop's growth stage (from the sowing date) with the weather
//! risk report into a go / no-go decision plus stage-specific guidance.
//! `today` is always passed in so the result depends only on its inputs.

pub mod advice;
pub mod stage;

pub use advice::{stage_advice, StageAdvice};
pub use stage::{stage_for, GrowthStage};

use crate::balance::split::parse_sowing_date;
use crate::core_types::{CropType, WeatherSnapshot};
use crate::weather::{analyze, next_suitable_day, WeatherRiskReport};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Timing advice for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingRecommendation {
    pub crop: CropType,
    pub stage: GrowthStage,
    pub days_since_sowing: Option<i64>,
    pub stage_description: String,
    pub can_fertilize: bool,
    pub best_timing: String,
    /// Stage advice followed by every weather alert message
    pub advice: Vec<String>,
    pub weather: WeatherRiskReport,
    /// First good forecast day when only the weather is in the way
    pub next_window: Option<NaiveDate>,
}

/// Whether the stage itself allows fertilizing
pub fn stage_allows_fertilizing(crop: CropType, stage: GrowthStage) -> bool {
    match stage {
        GrowthStage::Maturity => false,
        GrowthStage::Overwintering => crop != CropType::Wheat,
        _ => true,
    }
}

/// Advise on fertilizing today
pub fn advise(
    crop: CropType,
    sowing_date: Option<&str>,
    today: NaiveDate,
    snapshot: &WeatherSnapshot,
) -> TimingRecommendation {
    let sowing = sowing_date.and_then(|text| {
        let parsed = parse_sowing_date(text);
        if parsed.is_none() && !text.trim().is_empty() {
            warn!("Unparsable sowing date '{text}', growth stage unknown");
        }
        parsed
    });

    let days_since_sowing = sowing.map(|date| (today - date).num_days());
    let stage = days_since_sowing.map_or(GrowthStage::Unknown, |days| stage_for(crop, days));

    let weather = analyze(snapshot);
    let stage_ok = stage_allows_fertilizing(crop, stage);
    let can_fertilize = weather.suitable && stage_ok;

    let table = stage_advice(crop, stage);
    let mut advice: Vec<String> = table.advice.iter().map(|s| (*s).to_string()).collect();
    advice.extend(weather.alerts.iter().map(|alert| alert.message.clone()));

    let next_window = if stage_ok && !weather.suitable {
        next_suitable_day(snapshot)
    } else {
        None
    };

    TimingRecommendation {
        crop,
        stage,
        days_since_sowing,
        stage_description: table.description.to_string(),
        can_fertilize,
        best_timing: table.best_timing.to_string(),
        advice,
        weather,
        next_window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{CurrentWeather, DailyForecast};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fair(today: NaiveDate) -> WeatherSnapshot {
        WeatherSnapshot::new(
            CurrentWeather::new(22.0, 65.0),
            vec![DailyForecast::new(today, 16.0, 26.0)],
        )
    }

    #[test]
    fn test_tillering_rice_in_fair_weather() {
        let today = date(2024, 7, 15);
        let rec = advise(CropType::Rice, Some("2024-06-17"), today, &fair(today));
        assert_eq!(rec.days_since_sowing, Some(28));
        assert_eq!(rec.stage, GrowthStage::Tillering);
        assert!(rec.can_fertilize);
        assert!(rec.next_window.is_none());
    }

    #[test]
    fn test_wheat_overwintering_blocks() {
        let today = date(2025, 1, 10);
        let rec = advise(CropType::Wheat, Some("2024-10-25"), today, &fair(today));
        assert_eq!(rec.stage, GrowthStage::Overwintering);
        assert!(rec.weather.suitable);
        assert!(!rec.can_fertilize);
    }

    #[test]
    fn test_maturity_blocks() {
        let today = date(2024, 11, 1);
        let rec = advise(CropType::Rice, Some("2024-06-17"), today, &fair(today));
        assert_eq!(rec.stage, GrowthStage::Maturity);
        assert!(!rec.can_fertilize);
    }

    #[test]
    fn test_missing_sowing_date_is_unknown_stage() {
        let today = date(2024, 7, 15);
        for input in [None, Some(""), Some("soon")] {
            let rec = advise(CropType::Rice, input, today, &fair(today));
            assert_eq!(rec.stage, GrowthStage::Unknown);
            assert_eq!(rec.days_since_sowing, None);
            assert!(rec.stage_description.contains("not provided"));
            assert!(rec.can_fertilize);
        }
    }

    #[test]
    fn test_alert_messages_appended_and_window_offered() {
        let today = date(2024, 7, 15);
        let snapshot = WeatherSnapshot::new(
            CurrentWeather::new(24.0, 70.0).with_precipitation(15.0),
            vec![
                DailyForecast::new(today, 22.0, 28.0).with_rain(25.0, 95.0),
                DailyForecast::new(date(2024, 7, 16), 22.0, 29.0).with_rain(0.0, 10.0),
            ],
        );
        let rec = advise(CropType::Rice, Some("2024-06-17"), today, &snapshot);
        assert!(!rec.can_fertilize);
        let rain = rec.weather.alerts[0].message.clone();
        assert_eq!(rec.advice.last(), Some(&rain));
        assert_eq!(rec.next_window, Some(date(2024, 7, 16)));
    }
}
