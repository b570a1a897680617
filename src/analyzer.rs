// Frigo Analytics - Refrigeration equipment analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! EquipmentAnalyzer - one configuration, all analyses.

use crate::anomaly::{AnomalyDetection, AnomalyDetector};
use crate::config::AnalyticsConfig;
use crate::cost::{CostAnalysis, CostAnalyzer};
use crate::diagnostics::SharedDiagnostics;
use crate::error::Result;
use crate::health::{EquipmentHealth, HealthScorer};
use crate::maintenance::{MaintenanceForecast, MaintenanceForecaster};
use crate::reading::{validate_window, EnergyReading, EquipmentProfile, TemperatureReading};
use crate::stats::{StatisticsSummarizer, TemperatureStats, TemperatureTrend};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// All four analyses for one piece of equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentReport {
    pub equipment_id: i64,
    pub generated_at: DateTime<Utc>,
    pub health: EquipmentHealth,
    pub anomaly: AnomalyDetection,
    pub cost: CostAnalysis,
    pub maintenance: MaintenanceForecast,
}

impl EquipmentReport {
    /// Serialize to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Holds every component built from a single [`AnalyticsConfig`].
///
/// Stateless between calls; share it freely across threads.
#[derive(Debug, Clone)]
pub struct EquipmentAnalyzer {
    config: AnalyticsConfig,
    health: HealthScorer,
    anomaly: AnomalyDetector,
    cost: CostAnalyzer,
    maintenance: MaintenanceForecaster,
}

impl Default for EquipmentAnalyzer {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl EquipmentAnalyzer {
    /// Build components from `config` without validating it.
    pub fn new(config: AnalyticsConfig) -> Self {
        let summarizer = StatisticsSummarizer::new(config.trend.clone());
        let health = HealthScorer::new(config.health.clone(), summarizer);
        Self {
            anomaly: AnomalyDetector::new(config.anomaly.clone()),
            cost: CostAnalyzer::new(config.cost.clone()),
            maintenance: MaintenanceForecaster::new(config.maintenance.clone(), health.clone()),
            health,
            config,
        }
    }

    /// Validate `config`, then build.
    pub fn try_new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Route every component's diagnostics to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: SharedDiagnostics) -> Self {
        self.health = self.health.with_diagnostics(diagnostics.clone());
        self.anomaly = self.anomaly.with_diagnostics(diagnostics.clone());
        self.cost = self.cost.with_diagnostics(diagnostics.clone());
        self.maintenance = self.maintenance.with_diagnostics(diagnostics);
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn summarize(&self, readings: &[TemperatureReading]) -> Option<TemperatureStats> {
        self.health.summarizer().summarize(readings)
    }

    pub fn trend(&self, readings: &[TemperatureReading]) -> TemperatureTrend {
        self.health.summarizer().fit_trend(readings)
    }

    pub fn health(&self, readings: &[TemperatureReading]) -> EquipmentHealth {
        self.health.score(readings)
    }

    pub fn detect_anomaly(
        &self,
        readings: &[TemperatureReading],
        profile: &EquipmentProfile,
        as_of: DateTime<Utc>,
    ) -> AnomalyDetection {
        self.anomaly
            .detect(readings, profile.optimal_min, profile.optimal_max, as_of)
    }

    pub fn analyze_cost(
        &self,
        current: &[EnergyReading],
        previous: &[EnergyReading],
    ) -> CostAnalysis {
        self.cost.analyze(current, previous)
    }

    /// Split `readings` into billing periods ending at `as_of`, then compare them.
    pub fn analyze_cost_as_of(
        &self,
        readings: &[EnergyReading],
        as_of: DateTime<Utc>,
    ) -> CostAnalysis {
        let (current, previous) = self.cost.split_periods(readings, as_of);
        self.cost.analyze(&current, &previous)
    }

    pub fn forecast_maintenance(
        &self,
        readings: &[TemperatureReading],
        profile: &EquipmentProfile,
        as_of: DateTime<Utc>,
    ) -> MaintenanceForecast {
        self.maintenance.forecast(readings, profile, as_of)
    }

    /// Run all analyses after checking that every reading belongs to `profile`.
    pub fn report(
        &self,
        profile: &EquipmentProfile,
        temperatures: &[TemperatureReading],
        energy: &[EnergyReading],
        as_of: DateTime<Utc>,
    ) -> Result<EquipmentReport> {
        validate_window(profile.equipment_id, temperatures)?;
        validate_window(profile.equipment_id, energy)?;

        Ok(EquipmentReport {
            equipment_id: profile.equipment_id,
            generated_at: as_of,
            health: self.health(temperatures),
            anomaly: self.detect_anomaly(temperatures, profile, as_of),
            cost: self.analyze_cost_as_of(energy, as_of),
            maintenance: self.forecast_maintenance(temperatures, profile, as_of),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::testing::RecordingDiagnostics;
    use crate::error::AnalyticsError;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let mut config = AnalyticsConfig::default();
        config.cost.period_days = 0;
        assert!(matches!(
            EquipmentAnalyzer::try_new(config),
            Err(AnalyticsError::Config(_))
        ));
    }

    #[test]
    fn test_config_flows_to_components() {
        let mut config = AnalyticsConfig::default();
        config.health.min_readings = 2;
        let analyzer = EquipmentAnalyzer::new(config);
        let readings = vec![
            TemperatureReading::new(1, dec!(4), as_of()),
            TemperatureReading::new(1, dec!(4), as_of() + Duration::hours(1)),
        ];
        assert_eq!(analyzer.health(&readings).health_score, dec!(100));
    }

    #[test]
    fn test_unvalidated_config_does_not_panic() {
        let mut config = AnalyticsConfig::default();
        config.maintenance.days_per_month = 0;
        let recorder = Arc::new(RecordingDiagnostics::default());
        let analyzer = EquipmentAnalyzer::new(config).with_diagnostics(recorder.clone());
        let profile = EquipmentProfile::new(1, dec!(2), dec!(8))
            .unwrap()
            .with_installation_date(as_of() - Duration::days(100));
        let temps: Vec<_> = (0..12)
            .map(|i| TemperatureReading::new(1, dec!(4), as_of() - Duration::hours(12 - i)))
            .collect();

        let forecast = analyzer.forecast_maintenance(&temps, &profile, as_of());
        assert_eq!(forecast.indicators.age_score, 0);
        assert!(recorder
            .entries()
            .iter()
            .any(|e| e.starts_with("WARN maintenance:")));
    }

    #[test]
    fn test_diagnostics_reach_statistics() {
        let recorder = Arc::new(RecordingDiagnostics::default());
        let analyzer = EquipmentAnalyzer::default().with_diagnostics(recorder.clone());
        let window = [Decimal::ZERO, Decimal::MAX, Decimal::ZERO, Decimal::MAX, Decimal::ZERO];
        let temps: Vec<_> = window
            .iter()
            .enumerate()
            .map(|(i, t)| TemperatureReading::new(1, *t, as_of() + Duration::hours(i as i64)))
            .collect();

        assert!(analyzer.summarize(&temps).is_none());
        assert_eq!(recorder.entries().len(), 1);
        assert!(recorder.entries()[0].starts_with("WARN stats:"));
    }

    #[test]
    fn test_report_rejects_foreign_readings() {
        let analyzer = EquipmentAnalyzer::default();
        let profile = EquipmentProfile::new(1, dec!(2), dec!(8)).unwrap();
        let temps = vec![TemperatureReading::new(2, dec!(4), as_of())];
        assert!(analyzer.report(&profile, &temps, &[], as_of()).is_err());
    }

    #[test]
    fn test_report_json_roundtrip() {
        let analyzer = EquipmentAnalyzer::default();
        let profile = EquipmentProfile::new(1, dec!(2), dec!(8)).unwrap();
        let temps: Vec<_> = (0..12)
            .map(|i| TemperatureReading::new(1, dec!(4), as_of() - Duration::hours(12 - i)))
            .collect();
        let energy: Vec<_> = (1..=40)
            .map(|d| EnergyReading::kwh(1, dec!(3), as_of() - Duration::days(d)))
            .collect();

        let report = analyzer.report(&profile, &temps, &energy, as_of()).unwrap();
        assert_eq!(report.health.health_score, dec!(100));
        assert_eq!(report.cost.total_kwh, dec!(90));
        assert_eq!(report.cost.previous_month_cost, dec!(3.60));

        let json = report.to_json().unwrap();
        assert!(json.contains("\"generatedAt\""));
        let restored = EquipmentReport::from_json(&json).unwrap();
        assert_eq!(restored, report);
    }
}
