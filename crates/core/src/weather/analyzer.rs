//! Factor-by-factor weather rating

use crate::core_types::{DailyForecast, WeatherSnapshot};
use crate::weather::{rain_keyword_level, AlertKind, RiskLevel, WeatherAlert, WeatherRiskReport};
use chrono::NaiveDate;

// Rain thresholds
const RAIN_HIGH_MM: f64 = 10.0;
const RAIN_MEDIUM_MM: f64 = 5.0;
const RAIN_LOW_MM: f64 = 0.1;
const TODAY_RAIN_HIGH_MM: f64 = 15.0;
const PROBABILITY_ESCALATE: f64 = 80.0;
const PROBABILITY_NOTE: f64 = 60.0;

// Temperature thresholds (°C)
const HEAT_HIGH: f64 = 35.0;
const HEAT_MEDIUM: f64 = 30.0;
const COLD_HIGH: f64 = 5.0;
const COLD_MEDIUM: f64 = 10.0;

// Humidity thresholds (%)
const HUMID: f64 = 85.0;
const DRY: f64 = 40.0;

// Wind scale thresholds
const WIND_HIGH: u8 = 5;
const WIND_NOTE: u8 = 3;

// Limits for a good application day
const GOOD_DAY_MAX_RAIN_MM: f64 = 5.0;
const GOOD_DAY_MAX_PROBABILITY: f64 = 60.0;

fn raise(level: &mut Option<RiskLevel>, to: RiskLevel) {
    *level = Some(level.map_or(to, |l| l.max(to)));
}

fn rain_alert(snapshot: &WeatherSnapshot) -> Option<WeatherAlert> {
    let current = &snapshot.current;
    let today = snapshot.today();
    let mut level = None;
    let mut details = Vec::new();

    let precipitation = current.precipitation.value();
    if precipitation > RAIN_HIGH_MM {
        raise(&mut level, RiskLevel::High);
    } else if precipitation > RAIN_MEDIUM_MM {
        raise(&mut level, RiskLevel::Medium);
    } else if precipitation > RAIN_LOW_MM {
        raise(&mut level, RiskLevel::Low);
    }
    if precipitation > RAIN_LOW_MM {
        details.push(format!("Current precipitation {precipitation:.1} mm"));
    }

    // Probability escalates whatever the amount checks found
    let probability = current
        .precipitation_probability
        .or_else(|| today.map(|d| d.precipitation_probability))
        .map(|p| p.value());
    if let Some(probability) = probability {
        if probability > PROBABILITY_ESCALATE {
            let escalated = level.map_or(RiskLevel::Medium, RiskLevel::escalate);
            raise(&mut level, escalated.max(RiskLevel::Medium));
            details.push(format!("Precipitation probability {probability:.0}%"));
        } else if probability > PROBABILITY_NOTE {
            raise(&mut level, RiskLevel::Low);
            details.push(format!("Precipitation probability {probability:.0}%"));
        }
    }

    if let Some(today) = today {
        let forecast = today.precipitation.value();
        if forecast > TODAY_RAIN_HIGH_MM {
            raise(&mut level, RiskLevel::High);
            details.push(format!("Forecast precipitation today {forecast:.1} mm"));
        }
    }

    for text in std::iter::once(current.description.as_str())
        .chain(today.map(|d| d.description.as_str()))
    {
        if let Some(keyword_level) = rain_keyword_level(text) {
            raise(&mut level, keyword_level);
            details.push(format!("Conditions: {text}"));
        }
    }

    let level = level?;
    let message = match level {
        RiskLevel::High => "Heavy rain expected: postpone fertilizing to avoid nutrient runoff",
        RiskLevel::Medium => "Rain likely: fertilizer may be washed away, apply after it clears",
        RiskLevel::Low => "Light rain possible: topdress just before light rain to help it dissolve",
    };
    Some(WeatherAlert {
        kind: AlertKind::Rain,
        level,
        message: message.to_string(),
        details,
    })
}

fn temperature_alert(snapshot: &WeatherSnapshot) -> Option<WeatherAlert> {
    let t = snapshot.current.temperature.value();
    let (level, message) = if t > HEAT_HIGH {
        (
            RiskLevel::High,
            "Extreme heat: urea volatilizes quickly, fertilize in the early morning or evening",
        )
    } else if t < COLD_HIGH {
        (
            RiskLevel::High,
            "Too cold: roots take up little nutrient, wait for warmer weather",
        )
    } else if t >= HEAT_MEDIUM {
        (
            RiskLevel::Medium,
            "Hot weather: avoid fertilizing at midday",
        )
    } else if t <= COLD_MEDIUM {
        (
            RiskLevel::Medium,
            "Cool weather: nutrient uptake is slow, expect a delayed response",
        )
    } else {
        return None;
    };
    Some(WeatherAlert {
        kind: AlertKind::Temperature,
        level,
        message: message.to_string(),
        details: vec![format!("Current temperature {t:.1}°C")],
    })
}

fn humidity_alert(snapshot: &WeatherSnapshot) -> Option<WeatherAlert> {
    let h = snapshot.current.humidity.value();
    let (level, message) = if h > HUMID {
        (
            RiskLevel::Medium,
            "High humidity: foliage stays wet, keep granules off the leaves",
        )
    } else if h < DRY {
        (
            RiskLevel::Low,
            "Dry air: irrigate after application so fertilizer dissolves",
        )
    } else {
        return None;
    };
    Some(WeatherAlert {
        kind: AlertKind::Humidity,
        level,
        message: message.to_string(),
        details: vec![format!("Relative humidity {h:.0}%")],
    })
}

fn wind_alert(snapshot: &WeatherSnapshot) -> Option<WeatherAlert> {
    let scale = snapshot.current.wind_scale;
    let (level, message) = if scale >= WIND_HIGH {
        (
            RiskLevel::High,
            "Strong wind: broadcast fertilizer will drift, do not spread today",
        )
    } else if scale >= WIND_NOTE {
        (
            RiskLevel::Low,
            "Breezy: spread close to the ground to limit drift",
        )
    } else {
        return None;
    };
    Some(WeatherAlert {
        kind: AlertKind::Wind,
        level,
        message: message.to_string(),
        details: vec![format!("Wind scale {scale}")],
    })
}

/// Rate every factor and combine
pub fn analyze(snapshot: &WeatherSnapshot) -> WeatherRiskReport {
    let alerts: Vec<WeatherAlert> = [
        rain_alert(snapshot),
        temperature_alert(snapshot),
        humidity_alert(snapshot),
        wind_alert(snapshot),
    ]
    .into_iter()
    .flatten()
    .collect();

    let worst = |kind: Option<AlertKind>| {
        alerts
            .iter()
            .filter(|a| kind.is_none() || kind == Some(a.kind))
            .map(|a| a.level)
            .max()
            .unwrap_or_default()
    };
    let level = worst(None);
    let rain_risk = worst(Some(AlertKind::Rain));
    let temperature_risk = worst(Some(AlertKind::Temperature));

    WeatherRiskReport {
        level,
        rain_risk,
        temperature_risk,
        suitable: level != RiskLevel::High,
        alerts,
    }
}

fn is_good_day(day: &DailyForecast) -> bool {
    day.precipitation.value() <= GOOD_DAY_MAX_RAIN_MM
        && day.precipitation_probability.value() <= GOOD_DAY_MAX_PROBABILITY
        && day.temp_max.value() <= HEAT_HIGH
        && day.temp_min.value() >= COLD_HIGH
        && !matches!(
            rain_keyword_level(&day.description),
            Some(RiskLevel::Medium | RiskLevel::High)
        )
}

/// First forecast day fit for fertilizing
pub fn next_suitable_day(snapshot: &WeatherSnapshot) -> Option<NaiveDate> {
    snapshot
        .forecast()
        .iter()
        .find(|day| is_good_day(day))
        .map(|day| day.date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::CurrentWeather;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 20).unwrap() + chrono::Days::new(offset)
    }

    fn calm(current: CurrentWeather) -> WeatherSnapshot {
        WeatherSnapshot::new(current, vec![DailyForecast::new(day(0), 20.0, 28.0)])
    }

    #[test]
    fn test_fair_weather_has_no_alerts() {
        let report = analyze(&calm(CurrentWeather::new(24.0, 60.0)));
        assert!(report.alerts.is_empty());
        assert_eq!(report.level, RiskLevel::Low);
        assert!(report.suitable);
    }

    #[test]
    fn test_rain_amount_thresholds() {
        for (mm, expected) in [
            (0.1, None),
            (0.2, Some(RiskLevel::Low)),
            (5.0, Some(RiskLevel::Low)),
            (5.5, Some(RiskLevel::Medium)),
            (10.5, Some(RiskLevel::High)),
        ] {
            let report = analyze(&calm(CurrentWeather::new(24.0, 60.0).with_precipitation(mm)));
            assert_eq!(report.alert(AlertKind::Rain).map(|a| a.level), expected, "{mm} mm");
        }
    }

    #[test]
    fn test_probability_escalates() {
        // Light drizzle plus a very likely forecast becomes medium
        let report = analyze(&calm(
            CurrentWeather::new(24.0, 60.0)
                .with_precipitation(1.0)
                .with_probability(90.0),
        ));
        assert_eq!(report.rain_risk, RiskLevel::Medium);

        // Medium amount plus very likely becomes high
        let report = analyze(&calm(
            CurrentWeather::new(24.0, 60.0)
                .with_precipitation(6.0)
                .with_probability(85.0),
        ));
        assert_eq!(report.rain_risk, RiskLevel::High);

        // Probability alone, from today's forecast
        let snapshot = WeatherSnapshot::new(
            CurrentWeather::new(24.0, 60.0),
            vec![DailyForecast::new(day(0), 20.0, 28.0).with_rain(2.0, 70.0)],
        );
        assert_eq!(analyze(&snapshot).rain_risk, RiskLevel::Low);
    }

    #[test]
    fn test_keywords_layer_on_top() {
        let snapshot = WeatherSnapshot::new(
            CurrentWeather::new(24.0, 60.0).with_description("多云"),
            vec![DailyForecast::new(day(0), 20.0, 28.0).with_description("大暴雨")],
        );
        let report = analyze(&snapshot);
        assert_eq!(report.rain_risk, RiskLevel::High);
        assert!(!report.suitable);
    }

    #[test]
    fn test_temperature_bands() {
        for (t, expected) in [
            (36.0, Some(RiskLevel::High)),
            (35.0, Some(RiskLevel::Medium)),
            (30.0, Some(RiskLevel::Medium)),
            (29.9, None),
            (10.1, None),
            (10.0, Some(RiskLevel::Medium)),
            (5.0, Some(RiskLevel::Medium)),
            (4.9, Some(RiskLevel::High)),
        ] {
            let report = analyze(&calm(CurrentWeather::new(t, 60.0)));
            assert_eq!(
                report.alert(AlertKind::Temperature).map(|a| a.level),
                expected,
                "{t}°C"
            );
            assert_eq!(report.temperature_risk, expected.unwrap_or_default());
        }
    }

    #[test]
    fn test_humidity_never_blocks() {
        let report = analyze(&calm(CurrentWeather::new(24.0, 95.0)));
        assert_eq!(report.level, RiskLevel::Medium);
        assert!(report.suitable);

        let report = analyze(&calm(CurrentWeather::new(24.0, 30.0)));
        assert_eq!(report.alert(AlertKind::Humidity).unwrap().level, RiskLevel::Low);
    }

    #[test]
    fn test_wind() {
        let report = analyze(&calm(CurrentWeather::new(24.0, 60.0).with_wind_scale(3)));
        assert_eq!(report.level, RiskLevel::Low);
        assert_eq!(report.alerts.len(), 1);

        let report = analyze(&calm(CurrentWeather::new(24.0, 60.0).with_wind_scale(6)));
        assert_eq!(report.level, RiskLevel::High);
        assert!(!report.suitable);
        // Wind is not rain or temperature
        assert_eq!(report.rain_risk, RiskLevel::Low);
    }

    #[test]
    fn test_next_suitable_day() {
        let snapshot = WeatherSnapshot::new(
            CurrentWeather::new(24.0, 60.0).with_precipitation(12.0),
            vec![
                DailyForecast::new(day(0), 20.0, 28.0).with_rain(20.0, 95.0),
                DailyForecast::new(day(1), 20.0, 28.0).with_description("阵雨"),
                DailyForecast::new(day(2), 22.0, 37.0),
                DailyForecast::new(day(3), 21.0, 30.0)
                    .with_rain(1.0, 40.0)
                    .with_description("小雨"),
            ],
        );
        assert_eq!(next_suitable_day(&snapshot), Some(day(3)));

        let wet = WeatherSnapshot::new(
            CurrentWeather::new(24.0, 60.0),
            vec![DailyForecast::new(day(0), 20.0, 28.0).with_rain(30.0, 100.0)],
        );
        assert_eq!(next_suitable_day(&wet), None);
    }
}
