//! Rain severity from provider condition text
//!
//! Chinese providers report conditions as short phrases; English feeds use
//! words like "light rain". Matching is substring based and checks the most
//! severe terms first, so "大暴雨" is never read as "大雨" or "暴雨" alone
//! and "雷阵雨" resolves before "阵雨".

use crate::weather::RiskLevel;

const HIGH_TERMS: &[&str] = &[
    "特大暴雨",
    "大暴雨",
    "暴雨",
    "大雨",
    "heavy rain",
    "rainstorm",
    "thunderstorm",
];

const MEDIUM_TERMS: &[&str] = &["雷阵雨", "中雨", "阵雨", "moderate rain", "shower"];

const LOW_TERMS: &[&str] = &["小雨", "毛毛雨", "light rain", "drizzle"];

/// Most severe rain level named in `text`, if any
pub fn rain_keyword_level(text: &str) -> Option<RiskLevel> {
    if text.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    let contains_any = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));

    if contains_any(HIGH_TERMS) {
        Some(RiskLevel::High)
    } else if contains_any(MEDIUM_TERMS) {
        Some(RiskLevel::Medium)
    } else if contains_any(LOW_TERMS) {
        Some(RiskLevel::Low)
    } else {
        None
    }
}
