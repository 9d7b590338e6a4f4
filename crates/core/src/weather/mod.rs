//! Weather risk for fertilizer application
//!
//! [`analyze`] rates a [`WeatherSnapshot`](crate::core_types::WeatherSnapshot)
//! factor by factor (rain, temperature, humidity, wind). Each factor that
//! triggers produces one [`WeatherAlert`]; the overall level is the worst of
//! them and decides whether fertilizing today is advisable.

pub mod analyzer;
pub mod keywords;

pub use analyzer::{analyze, next_suitable_day};
pub use keywords::rain_keyword_level;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered risk severity
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// One step more severe, saturating at `High`
    pub fn escalate(self) -> Self {
        match self {
            RiskLevel::Low => RiskLevel::Medium,
            RiskLevel::Medium | RiskLevel::High => RiskLevel::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather factor behind an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Rain,
    Temperature,
    Humidity,
    Wind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub kind: AlertKind,
    pub level: RiskLevel,
    pub message: String,
    /// Observations that triggered the alert
    pub details: Vec<String>,
}

/// Outcome of [`analyze`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRiskReport {
    /// Worst level across all factors
    pub level: RiskLevel,
    pub alerts: Vec<WeatherAlert>,
    /// Worst rain sub-level
    pub rain_risk: RiskLevel,
    /// Worst temperature sub-level
    pub temperature_risk: RiskLevel,
    /// False when any factor is high
    pub suitable: bool,
}

impl WeatherRiskReport {
    pub fn alert(&self, kind: AlertKind) -> Option<&WeatherAlert> {
        self.alerts.iter().find(|a| a.kind == kind)
    }
}
