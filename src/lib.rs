// Frigo Analytics - Refrigeration equipment analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Frigo Analytics
//!
//! Rule-based analytics for refrigeration equipment, computed from windows of
//! temperature and energy readings supplied by an external reading store.
//!
//! Four independent analyses:
//! - **Health**: stability score from temperature variance, plus a linear trend
//! - **Anomaly**: door open, rapid cooling or compressor failure from the recent rate of change
//! - **Cost**: energy cost of the current period against the previous one
//! - **Maintenance**: additive risk score from variance, band efficiency, age and trend
//!
//! Every analysis is a pure function of its inputs. Short or empty windows
//! yield a degraded result, never an error.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use frigo_analytics::{AnomalyType, EquipmentAnalyzer, EquipmentProfile, TemperatureReading};
//! use rust_decimal::Decimal;
//!
//! let analyzer = EquipmentAnalyzer::default();
//! let profile = EquipmentProfile::new(7, Decimal::from(2), Decimal::from(8)).unwrap();
//!
//! let t0 = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();
//! let readings: Vec<_> = [20, 26, 32, 38, 44]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, t)| {
//!         TemperatureReading::new(7, Decimal::new(*t, 1), t0 + Duration::minutes(i as i64))
//!     })
//!     .collect();
//!
//! let anomaly = analyzer.detect_anomaly(&readings, &profile, t0 + Duration::minutes(5));
//! assert_eq!(anomaly.anomaly_type, AnomalyType::DoorOpen);
//! assert!(!anomaly.should_alert);
//!
//! let health = analyzer.health(&readings);
//! assert_eq!(health.readings_analyzed, 5);
//! ```
//!
//! ## Configuration
//!
//! All thresholds live in [`AnalyticsConfig`]. Defaults reproduce the
//! production rules; a partial JSON document overrides only what it names:
//!
//! ```rust
//! use frigo_analytics::{AnalyticsConfig, EquipmentAnalyzer};
//!
//! let config = AnalyticsConfig::from_json(r#"{ "cost": { "electricity_rate": "0.18" } }"#).unwrap();
//! let analyzer = EquipmentAnalyzer::try_new(config).unwrap();
//! assert_eq!(analyzer.config().cost.period_days, 30);
//! ```
//!
//! ## Numbers
//!
//! Temperatures, energy and money are [`rust_decimal::Decimal`]. Results are
//! rounded half away from zero at fixed output points; classification
//! decisions use unrounded intermediates unless documented otherwise.

// Core modules
pub mod analyzer;
pub mod anomaly;
pub mod config;
pub mod cost;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod maintenance;
pub mod reading;
pub mod stats;

// Re-exports for convenience
pub use analyzer::{EquipmentAnalyzer, EquipmentReport};
pub use anomaly::{AnomalyDetection, AnomalyDetector, AnomalyType, Severity};
pub use config::AnalyticsConfig;
pub use cost::{CostAnalysis, CostAnalyzer, CostTrend};
pub use diagnostics::{Diagnostics, LogDiagnostics, NoopDiagnostics, SharedDiagnostics};
pub use error::{AnalyticsError, InvalidArgument, Result};
pub use health::{EquipmentHealth, HealthScorer};
pub use maintenance::{
    ForecastConfidence, MaintenanceForecast, MaintenanceForecaster, RiskIndicators, RiskLevel,
};
pub use reading::{EnergyReading, EquipmentProfile, TemperatureReading};
pub use stats::{StatisticsSummarizer, TemperatureStats, TemperatureTrend, TrendDirection};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
