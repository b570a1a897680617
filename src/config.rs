// Frigo Analytics - Refrigeration equipment analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Analytics configuration.
//!
//! Every threshold used by the analyses lives here. Defaults reproduce the
//! production rules; any subset can be overridden from a JSON document.

use crate::error::{AnalyticsError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Master configuration for all analyses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Trend fitting.
    pub trend: TrendConfig,

    /// Health scoring.
    pub health: HealthConfig,

    /// Rate-of-change anomaly detection.
    pub anomaly: AnomalyConfig,

    /// Energy cost analysis.
    pub cost: CostConfig,

    /// Maintenance risk forecasting.
    pub maintenance: MaintenanceConfig,
}

impl AnalyticsConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject threshold sets that cannot produce meaningful tiers.
    pub fn validate(&self) -> Result<()> {
        if self.trend.min_readings < 3 {
            return Err(invalid("trend.min_readings must be at least 3"));
        }
        if self.trend.slope_threshold < Decimal::ZERO {
            return Err(invalid("trend.slope_threshold must not be negative"));
        }
        if self.anomaly.recent_window < 2 {
            return Err(invalid("anomaly.recent_window must be at least 2"));
        }
        if self.anomaly.compressor_min_rate >= self.anomaly.door_open_rate {
            return Err(invalid(
                "anomaly.compressor_min_rate must be below anomaly.door_open_rate",
            ));
        }
        if self.anomaly.rapid_cooling_rate >= Decimal::ZERO {
            return Err(invalid("anomaly.rapid_cooling_rate must be negative"));
        }
        if self.cost.electricity_rate < Decimal::ZERO {
            return Err(invalid("cost.electricity_rate must not be negative"));
        }
        if self.cost.period_days == 0 {
            return Err(invalid("cost.period_days must be positive"));
        }

        let m = &self.maintenance;
        if m.days_per_month == 0 {
            return Err(invalid("maintenance.days_per_month must be positive"));
        }
        for (name, tiers, cap) in [
            ("variance_tiers", &m.variance_tiers, m.variance_cap),
            ("efficiency_tiers", &m.efficiency_tiers, m.efficiency_cap),
            ("age_tiers", &m.age_tiers, m.age_cap),
        ] {
            if !tiers.windows(2).all(|w| w[0].above > w[1].above) {
                return Err(invalid(format!(
                    "maintenance.{name} must be ordered by descending threshold"
                )));
            }
            if tiers.iter().any(|t| t.score > cap) {
                return Err(invalid(format!(
                    "maintenance.{name} score exceeds its cap of {cap}"
                )));
            }
        }
        if m.variance_cap + m.efficiency_cap + m.age_cap + m.trend_score > 100 {
            return Err(invalid("maintenance caps must sum to at most 100"));
        }
        if !(m.critical.min_score > m.high.min_score && m.high.min_score > m.moderate.min_score) {
            return Err(invalid(
                "maintenance risk bands must be ordered critical > high > moderate",
            ));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::Config(message.into())
}

/// Least-squares trend fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Readings required before a trend is fitted.
    pub min_readings: usize,

    /// Slope magnitude (degrees per reading) above which the trend is rising or falling.
    pub slope_threshold: Decimal,

    /// Readings assumed per 24 hours when projecting the slope.
    pub readings_per_day: u32,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_readings: 3,
            slope_threshold: Decimal::new(5, 2), // 0.05
            readings_per_day: 24,                // hourly cadence
        }
    }
}

/// Health scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Readings required before a score is computed.
    pub min_readings: usize,

    /// Points lost per degree of standard deviation.
    pub std_dev_penalty: Decimal,

    /// Standard deviation below which equipment counts as stable.
    pub stability_threshold: Decimal,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            min_readings: 5,
            std_dev_penalty: Decimal::from(20),
            stability_threshold: Decimal::ONE,
        }
    }
}

/// Rate-of-change anomaly detection. Rates are in degrees per minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Readings required before classification.
    pub min_readings: usize,

    /// Number of most recent readings whose rates are averaged.
    pub recent_window: usize,

    /// Average rate above which a door-open event is reported.
    pub door_open_rate: Decimal,

    /// Average rate below which rapid cooling is reported.
    pub rapid_cooling_rate: Decimal,

    /// Lower bound (exclusive) of the slow warming band that indicates compressor failure.
    /// The upper bound is `door_open_rate`.
    pub compressor_min_rate: Decimal,

    /// Minutes the window must span before slow warming counts as compressor failure.
    pub compressor_min_duration_minutes: Decimal,

    pub door_open_confidence: u8,
    pub rapid_cooling_confidence: u8,
    pub compressor_failure_confidence: u8,
    pub normal_confidence: u8,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_readings: 3,
            recent_window: 5,
            door_open_rate: Decimal::new(5, 1),      // 0.5
            rapid_cooling_rate: Decimal::new(-5, 1), // -0.5
            compressor_min_rate: Decimal::new(1, 1), // 0.1
            compressor_min_duration_minutes: Decimal::from(120),
            door_open_confidence: 80,
            rapid_cooling_confidence: 75,
            compressor_failure_confidence: 85,
            normal_confidence: 90,
        }
    }
}

/// Energy cost analysis. Percentages are expressed as 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Currency units per kWh.
    pub electricity_rate: Decimal,

    /// Length of one billing period in days.
    pub period_days: u32,

    /// Days used to annualise the daily average.
    pub days_per_year: u32,

    /// Absolute percent change above which the trend is not stable.
    pub trend_threshold_percent: Decimal,

    /// Percent increase that triggers a maintenance check recommendation.
    pub maintenance_check_percent: Decimal,

    /// Percent increase that triggers a coil cleaning recommendation.
    pub coil_cleaning_percent: Decimal,

    /// Percent increase above which savings are estimated.
    pub savings_threshold_percent: Decimal,

    /// Share of the current cost considered recoverable.
    pub savings_fraction: Decimal,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            electricity_rate: Decimal::new(12, 2), // 0.12
            period_days: 30,
            days_per_year: 365,
            trend_threshold_percent: Decimal::from(5),
            maintenance_check_percent: Decimal::from(20),
            coil_cleaning_percent: Decimal::from(10),
            savings_threshold_percent: Decimal::from(15),
            savings_fraction: Decimal::new(15, 2), // 0.15
        }
    }
}

/// One step of a tiered sub-score: values strictly above `above` earn `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTier {
    pub above: Decimal,
    pub score: u32,
    /// Reason recorded when this tier fires.
    pub reason: String,
}

impl ScoreTier {
    pub fn new(above: Decimal, score: u32, reason: impl Into<String>) -> Self {
        Self {
            above,
            score,
            reason: reason.into(),
        }
    }
}

/// Recommendation bucket for a risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBand {
    /// Lowest risk score (inclusive) that falls into this band.
    pub min_score: u32,
    pub days_to_maintenance: u32,
    pub estimated_cost: Decimal,
}

impl RiskBand {
    pub fn new(min_score: u32, days_to_maintenance: u32, estimated_cost: Decimal) -> Self {
        Self {
            min_score,
            days_to_maintenance,
            estimated_cost,
        }
    }
}

/// Maintenance risk forecasting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Readings required before a forecast is made.
    pub min_readings: usize,

    /// Standard deviation tiers, highest threshold first.
    pub variance_tiers: Vec<ScoreTier>,
    pub variance_cap: u32,

    /// Actual-range / optimal-range ratio tiers, highest threshold first.
    pub efficiency_tiers: Vec<ScoreTier>,
    pub efficiency_cap: u32,

    /// Equipment age tiers in months, highest threshold first.
    pub age_tiers: Vec<ScoreTier>,
    pub age_cap: u32,
    pub days_per_month: u32,

    /// Projected 24h rise that, with a rising trend, adds `trend_score`.
    pub trend_projection_threshold: Decimal,
    pub trend_score: u32,

    pub critical: RiskBand,
    pub high: RiskBand,
    pub moderate: RiskBand,

    /// Reading counts above which confidence is high / medium.
    pub high_confidence_readings: usize,
    pub medium_confidence_readings: usize,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            min_readings: 10,
            variance_tiers: vec![
                ScoreTier::new(
                    Decimal::from(3),
                    40,
                    "Severe temperature instability (std dev above 3.0°C)",
                ),
                ScoreTier::new(
                    Decimal::from(2),
                    25,
                    "High temperature variance (std dev above 2.0°C)",
                ),
                ScoreTier::new(
                    Decimal::ONE,
                    10,
                    "Moderate temperature variance (std dev above 1.0°C)",
                ),
            ],
            variance_cap: 40,
            efficiency_tiers: vec![
                ScoreTier::new(
                    Decimal::from(2),
                    30,
                    "Temperature range more than twice the optimal band",
                ),
                ScoreTier::new(
                    Decimal::new(15, 1),
                    20,
                    "Temperature range exceeds the optimal band by over 50%",
                ),
            ],
            efficiency_cap: 30,
            age_tiers: vec![
                ScoreTier::new(Decimal::from(60), 20, "Equipment older than 5 years"),
                ScoreTier::new(Decimal::from(36), 10, "Equipment older than 3 years"),
            ],
            age_cap: 20,
            days_per_month: 30,
            trend_projection_threshold: Decimal::ONE,
            trend_score: 10,
            critical: RiskBand::new(70, 3, Decimal::from(850)),
            high: RiskBand::new(50, 14, Decimal::from(450)),
            moderate: RiskBand::new(30, 30, Decimal::from(250)),
            high_confidence_readings: 100,
            medium_confidence_readings: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.trend.slope_threshold, dec!(0.05));
        assert_eq!(config.health.min_readings, 5);
        assert_eq!(config.anomaly.recent_window, 5);
        assert_eq!(config.cost.electricity_rate, dec!(0.12));
        assert_eq!(config.maintenance.min_readings, 10);
        assert_eq!(config.maintenance.critical, RiskBand::new(70, 3, dec!(850)));
        assert_eq!(config.maintenance.moderate, RiskBand::new(30, 30, dec!(250)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AnalyticsConfig::default();
        let json = config.to_json_pretty().unwrap();
        let parsed = AnalyticsConfig::from_json(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{ "cost": { "electricity_rate": "0.20" }, "health": { "min_readings": 8 } }"#;
        let config = AnalyticsConfig::from_json(json).unwrap();
        assert_eq!(config.cost.electricity_rate, dec!(0.20));
        assert_eq!(config.cost.period_days, 30);
        assert_eq!(config.health.min_readings, 8);
        assert_eq!(config.anomaly, AnomalyConfig::default());
    }

    #[test]
    fn test_unordered_tiers_rejected() {
        let mut config = AnalyticsConfig::default();
        config.maintenance.variance_tiers.reverse();
        assert!(matches!(
            config.validate(),
            Err(AnalyticsError::Config(_))
        ));
    }

    #[test]
    fn test_tier_above_cap_rejected() {
        let mut config = AnalyticsConfig::default();
        config.maintenance.age_tiers[0].score = 25;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_rate_band_rejected() {
        let mut config = AnalyticsConfig::default();
        config.anomaly.compressor_min_rate = dec!(0.6);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics.json");
        std::fs::write(&path, r#"{ "anomaly": { "recent_window": 8 } }"#).unwrap();

        let config = AnalyticsConfig::from_file(&path).unwrap();
        assert_eq!(config.anomaly.recent_window, 8);

        let missing = AnalyticsConfig::from_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(AnalyticsError::Io(_))));
    }
}
