// Frigo Analytics - Refrigeration equipment analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Maintenance risk forecasting.
//!
//! The risk score is the plain sum of four capped sub-scores:
//!
//! | Indicator  | Cap | Source                                        |
//! |------------|-----|-----------------------------------------------|
//! | variance   | 40  | standard deviation of the window              |
//! | efficiency | 30  | actual range relative to the optimal band     |
//! | age        | 20  | months since installation, if known           |
//! | trend      | 10  | rising trend with a large 24h projection      |

use crate::config::{MaintenanceConfig, RiskBand, ScoreTier};
use crate::diagnostics::{default_diagnostics, SharedDiagnostics};
use crate::health::{EquipmentHealth, HealthScorer};
use crate::reading::{EquipmentProfile, TemperatureReading};
use crate::stats::TrendDirection;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const COMPONENT: &str = "maintenance";

/// Bucketed risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Confidence derived from the number of readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastConfidence {
    Low,
    Medium,
    High,
}

/// The four sub-scores behind a risk score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskIndicators {
    pub variance_score: u32,
    pub efficiency_score: u32,
    pub age_score: u32,
    pub trend_score: u32,
}

impl RiskIndicators {
    pub fn total(&self) -> u32 {
        self.variance_score
            .saturating_add(self.efficiency_score)
            .saturating_add(self.age_score)
            .saturating_add(self.trend_score)
    }
}

/// Maintenance forecast for one piece of equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceForecast {
    /// 0-100, always `indicators.total()`.
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub estimated_days_to_maintenance: Option<u32>,
    pub confidence: ForecastConfidence,
    pub indicators: RiskIndicators,
    pub recommendation: String,
    pub estimated_cost: Option<Decimal>,
    /// Triggered tiers in evaluation order: variance, efficiency, age, trend.
    pub reasons: Vec<String>,
}

impl MaintenanceForecast {
    /// Result for a window too short to forecast.
    pub fn insufficient_data() -> Self {
        Self {
            risk_score: 0,
            risk_level: RiskLevel::Low,
            estimated_days_to_maintenance: None,
            confidence: ForecastConfidence::Low,
            indicators: RiskIndicators::default(),
            recommendation: "insufficient data".to_string(),
            estimated_cost: None,
            reasons: Vec::new(),
        }
    }
}

/// Combines health, age and band efficiency into a maintenance risk.
#[derive(Clone)]
pub struct MaintenanceForecaster {
    config: MaintenanceConfig,
    health: HealthScorer,
    diagnostics: SharedDiagnostics,
}

impl Default for MaintenanceForecaster {
    fn default() -> Self {
        Self::new(MaintenanceConfig::default(), HealthScorer::default())
    }
}

impl std::fmt::Debug for MaintenanceForecaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceForecaster")
            .field("config", &self.config)
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}

impl MaintenanceForecaster {
    pub fn new(config: MaintenanceConfig, health: HealthScorer) -> Self {
        Self {
            config,
            health,
            diagnostics: default_diagnostics(),
        }
    }

    /// Route this forecaster's and its health scorer's diagnostics to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: SharedDiagnostics) -> Self {
        self.health = self.health.with_diagnostics(diagnostics.clone());
        self.diagnostics = diagnostics;
        self
    }

    /// Forecast maintenance need. Age is measured up to `as_of`.
    pub fn forecast(
        &self,
        readings: &[TemperatureReading],
        profile: &EquipmentProfile,
        as_of: DateTime<Utc>,
    ) -> MaintenanceForecast {
        if readings.len() < self.config.min_readings {
            return MaintenanceForecast::insufficient_data();
        }

        let health = self.health.score(readings);
        let mut reasons = Vec::new();
        let c = &self.config;

        let variance_score = apply_tier(
            &c.variance_tiers,
            health.standard_deviation,
            c.variance_cap,
            &mut reasons,
        );
        let efficiency_score = apply_tier(
            &c.efficiency_tiers,
            range_ratio(&health, profile.optimal_range()),
            c.efficiency_cap,
            &mut reasons,
        );
        let age_months = profile
            .installation_date
            .and_then(|installed| self.age_in_months(installed, as_of));
        let age_score = match age_months {
            Some(months) => apply_tier(&c.age_tiers, months, c.age_cap, &mut reasons),
            None => 0,
        };
        let trend_score = if health.trend.direction == TrendDirection::Rising
            && health.trend.projected_change_24h > c.trend_projection_threshold
        {
            reasons.push(format!(
                "Temperature rising, projected +{}°C over 24h",
                health.trend.projected_change_24h
            ));
            c.trend_score
        } else {
            0
        };

        let indicators = RiskIndicators {
            variance_score,
            efficiency_score,
            age_score,
            trend_score,
        };
        let risk_score = indicators.total();
        let (risk_level, band) = self.bucket(risk_score);

        self.diagnostics.debug(
            COMPONENT,
            &format!("equipment={} indicators={:?}", profile.equipment_id, indicators),
        );
        if risk_level != RiskLevel::Low {
            self.diagnostics.info(
                COMPONENT,
                &format!(
                    "equipment={} risk={} level={}",
                    profile.equipment_id,
                    risk_score,
                    risk_level.as_str()
                ),
            );
        }

        MaintenanceForecast {
            risk_score,
            risk_level,
            estimated_days_to_maintenance: band.map(|b| b.days_to_maintenance),
            confidence: self.confidence(readings.len()),
            indicators,
            recommendation: recommendation(risk_level, band),
            estimated_cost: band.map(|b| b.estimated_cost),
            reasons,
        }
    }

    /// Map a score to its level and, above low, its recommendation band.
    pub fn bucket(&self, risk_score: u32) -> (RiskLevel, Option<&RiskBand>) {
        let c = &self.config;
        if risk_score >= c.critical.min_score {
            (RiskLevel::Critical, Some(&c.critical))
        } else if risk_score >= c.high.min_score {
            (RiskLevel::High, Some(&c.high))
        } else if risk_score >= c.moderate.min_score {
            (RiskLevel::Moderate, Some(&c.moderate))
        } else {
            (RiskLevel::Low, None)
        }
    }

    fn confidence(&self, readings: usize) -> ForecastConfidence {
        if readings > self.config.high_confidence_readings {
            ForecastConfidence::High
        } else if readings > self.config.medium_confidence_readings {
            ForecastConfidence::Medium
        } else {
            ForecastConfidence::Low
        }
    }

    /// Whole months (fixed-length) since installation; zero if installed after
    /// `as_of`. `None` when the month length is zero.
    fn age_in_months(&self, installed: DateTime<Utc>, as_of: DateTime<Utc>) -> Option<Decimal> {
        let days = (as_of - installed).num_days().max(0);
        match days.checked_div(i64::from(self.config.days_per_month)) {
            Some(months) => Some(Decimal::from(months)),
            None => {
                self.diagnostics.warn(
                    COMPONENT,
                    "days_per_month is zero, equipment age not scored",
                );
                None
            }
        }
    }
}

/// Score of the first tier `value` exceeds, capped; records the tier's reason.
fn apply_tier(tiers: &[ScoreTier], value: Decimal, cap: u32, reasons: &mut Vec<String>) -> u32 {
    match tiers.iter().find(|t| value > t.above) {
        Some(tier) if tier.score > 0 => {
            reasons.push(tier.reason.clone());
            tier.score.min(cap)
        }
        _ => 0,
    }
}

/// Actual range over optimal range, zero for a degenerate band. Saturates
/// when the band is too narrow to divide by.
fn range_ratio(health: &EquipmentHealth, optimal_range: Decimal) -> Decimal {
    if optimal_range > Decimal::ZERO {
        health.range.checked_div(optimal_range).unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    }
}

fn recommendation(level: RiskLevel, band: Option<&RiskBand>) -> String {
    let days = band.map(|b| b.days_to_maintenance).unwrap_or_default();
    match level {
        RiskLevel::Critical => format!(
            "Schedule emergency service within {days} days; failure is likely"
        ),
        RiskLevel::High => format!("Schedule preventive maintenance within {days} days"),
        RiskLevel::Moderate => format!("Plan an inspection within the next {days} days"),
        RiskLevel::Low => "No maintenance needed, continue routine monitoring".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::testing::RecordingDiagnostics;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap()
    }

    fn hourly(temps: &[Decimal]) -> Vec<TemperatureReading> {
        let n = temps.len() as i64;
        temps
            .iter()
            .enumerate()
            .map(|(i, t)| TemperatureReading::new(9, *t, as_of() - Duration::hours(n - i as i64)))
            .collect()
    }

    fn profile() -> EquipmentProfile {
        EquipmentProfile::new(9, dec!(2), dec!(8)).unwrap()
    }

    #[test]
    fn test_insufficient_data() {
        let forecast =
            MaintenanceForecaster::default().forecast(&hourly(&[dec!(4); 9]), &profile(), as_of());
        assert_eq!(forecast.risk_score, 0);
        assert_eq!(forecast.risk_level, RiskLevel::Low);
        assert_eq!(forecast.confidence, ForecastConfidence::Low);
        assert_eq!(forecast.recommendation, "insufficient data");
    }

    #[test]
    fn test_steady_new_equipment_is_low_risk() {
        let profile = profile().with_installation_date(as_of() - Duration::days(200));
        let forecast =
            MaintenanceForecaster::default().forecast(&hourly(&[dec!(4); 12]), &profile, as_of());
        assert_eq!(forecast.risk_score, 0);
        assert_eq!(forecast.risk_level, RiskLevel::Low);
        assert!(forecast.estimated_days_to_maintenance.is_none());
        assert!(forecast.estimated_cost.is_none());
        assert!(forecast.reasons.is_empty());
    }

    #[test]
    fn test_variance_tiers() {
        let forecaster = MaintenanceForecaster::default();
        // Alternating ±s around 4 gives std dev s, range 2s (band width 6)
        let cases = [
            (dec!(0.5), 0),
            (dec!(1.5), 10),
            (dec!(2.5), 25),
            (dec!(3.5), 40),
        ];
        for (s, expected) in cases {
            let temps: Vec<_> = (0..10)
                .map(|i| if i % 2 == 0 { dec!(4) - s } else { dec!(4) + s })
                .collect();
            let forecast = forecaster.forecast(&hourly(&temps), &profile(), as_of());
            assert_eq!(forecast.indicators.variance_score, expected, "s = {s}");
        }
    }

    #[test]
    fn test_age_tiers_and_missing_date() {
        let forecaster = MaintenanceForecaster::default();
        let steady = hourly(&[dec!(4); 10]);

        for (days, expected) in [(1080, 0), (1110, 10), (1830, 20)] {
            let p = profile().with_installation_date(as_of() - Duration::days(days));
            let forecast = forecaster.forecast(&steady, &p, as_of());
            assert_eq!(forecast.indicators.age_score, expected, "days = {days}");
        }

        let forecast = forecaster.forecast(&steady, &profile(), as_of());
        assert_eq!(forecast.indicators.age_score, 0);
    }

    #[test]
    fn test_zero_month_length_skips_age() {
        let recorder = Arc::new(RecordingDiagnostics::default());
        let config = MaintenanceConfig {
            days_per_month: 0,
            ..MaintenanceConfig::default()
        };
        let forecaster = MaintenanceForecaster::new(config, HealthScorer::default())
            .with_diagnostics(recorder.clone());
        let p = profile().with_installation_date(as_of() - Duration::days(100));

        let forecast = forecaster.forecast(&hourly(&[dec!(4); 12]), &p, as_of());
        assert_eq!(forecast.indicators.age_score, 0);
        assert_eq!(forecast.risk_level, RiskLevel::Low);
        assert!(recorder
            .entries()
            .iter()
            .any(|e| e.starts_with("WARN maintenance:")));
    }

    #[test]
    fn test_elevated_risk_is_reported_at_info() {
        let recorder = Arc::new(RecordingDiagnostics::default());
        let forecaster = MaintenanceForecaster::default().with_diagnostics(recorder.clone());
        // Falling alternation: variance tier only, no trend points.
        let temps: Vec<_> = (0..10).map(|i| if i % 2 == 0 { dec!(8) } else { dec!(0) }).collect();

        let forecast = forecaster.forecast(&hourly(&temps), &profile(), as_of());
        assert_eq!(forecast.risk_level, RiskLevel::Moderate);
        assert_eq!(
            recorder.entries().last().map(String::as_str),
            Some("INFO maintenance: equipment=9 risk=40 level=moderate")
        );

        let quiet = Arc::new(RecordingDiagnostics::default());
        MaintenanceForecaster::default()
            .with_diagnostics(quiet.clone())
            .forecast(&hourly(&[dec!(4); 12]), &profile(), as_of());
        assert!(quiet.entries().iter().all(|e| !e.starts_with("INFO")));
    }

    #[test]
    fn test_zero_width_band() {
        let band = EquipmentProfile::new(9, dec!(4), dec!(4)).unwrap();
        let temps: Vec<_> = (0..10).map(|i| if i % 2 == 0 { dec!(0) } else { dec!(8) }).collect();
        let forecast = MaintenanceForecaster::default().forecast(&hourly(&temps), &band, as_of());
        assert_eq!(forecast.indicators.efficiency_score, 0);
    }

    #[test]
    fn test_buckets() {
        let forecaster = MaintenanceForecaster::default();
        assert_eq!(forecaster.bucket(100).0, RiskLevel::Critical);
        assert_eq!(forecaster.bucket(70).0, RiskLevel::Critical);
        assert_eq!(forecaster.bucket(69).0, RiskLevel::High);
        assert_eq!(forecaster.bucket(50).0, RiskLevel::High);
        assert_eq!(forecaster.bucket(49).0, RiskLevel::Moderate);
        assert_eq!(forecaster.bucket(30).0, RiskLevel::Moderate);
        assert_eq!(forecaster.bucket(29), (RiskLevel::Low, None));
        assert_eq!(forecaster.bucket(70).1.map(|b| b.days_to_maintenance), Some(3));
    }

    #[test]
    fn test_confidence_by_count() {
        let forecaster = MaintenanceForecaster::default();
        assert_eq!(forecaster.confidence(50), ForecastConfidence::Low);
        assert_eq!(forecaster.confidence(51), ForecastConfidence::Medium);
        assert_eq!(forecaster.confidence(100), ForecastConfidence::Medium);
        assert_eq!(forecaster.confidence(101), ForecastConfidence::High);
    }

    #[test]
    fn test_score_is_sum_of_indicators() {
        let forecaster = MaintenanceForecaster::default();
        let p = profile().with_installation_date(as_of() - Duration::days(1200));
        let temps: Vec<_> = (0..30)
            .map(|i| Decimal::from(i % 7) - dec!(1) + Decimal::from(i) / dec!(10))
            .collect();
        let forecast = forecaster.forecast(&hourly(&temps), &p, as_of());
        assert_eq!(forecast.risk_score, forecast.indicators.total());
        assert!(forecast.indicators.variance_score <= 40);
        assert!(forecast.indicators.efficiency_score <= 30);
        assert!(forecast.indicators.age_score <= 20);
        assert!(forecast.indicators.trend_score <= 10);
        assert_eq!(
            forecast.risk_score >= 70,
            forecast.risk_level == RiskLevel::Critical
        );
    }
}
