// Frigo Analytics - Refrigeration equipment analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Short-term anomaly classification from the rate of temperature change.

use crate::config::AnomalyConfig;
use crate::diagnostics::{default_diagnostics, SharedDiagnostics};
use crate::reading::{sorted_by_time, TemperatureReading};
use crate::stats::round;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const COMPONENT: &str = "anomaly";

/// Kind of operational anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    Normal,
    DoorOpen,
    CompressorFailure,
    /// Part of the wire vocabulary; the rate rules never produce it.
    PowerOutage,
    RapidCooling,
}

impl AnomalyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::Normal => "normal",
            AnomalyType::DoorOpen => "door_open",
            AnomalyType::CompressorFailure => "compressor_failure",
            AnomalyType::PowerOutage => "power_outage",
            AnomalyType::RapidCooling => "rapid_cooling",
        }
    }
}

/// Severity of an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// Outcome of one anomaly check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyDetection {
    pub has_anomaly: bool,
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    pub message: String,
    pub recommendation: String,
    /// Average degrees per minute over the recent window, 2 dp.
    pub change_rate: Decimal,
    /// Minutes from the first reading to the newest recent reading, 1 dp.
    pub duration_minutes: Decimal,
    /// Callers dispatch notifications on this flag.
    pub should_alert: bool,
    pub detected_at: DateTime<Utc>,
    /// 0-100.
    pub confidence: u8,
}

impl AnomalyDetection {
    fn quiet(message: &str, detected_at: DateTime<Utc>) -> Self {
        Self {
            has_anomaly: false,
            anomaly_type: AnomalyType::Normal,
            severity: Severity::Normal,
            message: message.to_string(),
            recommendation: "Collect more readings before drawing conclusions".to_string(),
            change_rate: Decimal::ZERO,
            duration_minutes: Decimal::ZERO,
            should_alert: false,
            detected_at,
            confidence: 0,
        }
    }

    /// Result for a window too short to classify.
    pub fn insufficient_data(detected_at: DateTime<Utc>) -> Self {
        Self::quiet("insufficient data", detected_at)
    }
}

/// Classifies door openings, rapid cooling and compressor failure.
#[derive(Clone)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
    diagnostics: SharedDiagnostics,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(AnomalyConfig::default())
    }
}

impl std::fmt::Debug for AnomalyDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnomalyDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self {
            config,
            diagnostics: default_diagnostics(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: SharedDiagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Classify the most recent behaviour of a window.
    ///
    /// The optimal band is accepted for future band checks but does not
    /// influence the rate rules.
    pub fn detect(
        &self,
        readings: &[TemperatureReading],
        optimal_min: Decimal,
        optimal_max: Decimal,
        as_of: DateTime<Utc>,
    ) -> AnomalyDetection {
        if readings.len() < self.config.min_readings {
            return AnomalyDetection::insufficient_data(as_of);
        }

        let sorted = sorted_by_time(readings);
        let recent = &sorted[sorted.len().saturating_sub(self.config.recent_window)..];

        let mut rates = Vec::with_capacity(recent.len());
        for pair in recent.windows(2) {
            let minutes = minutes_between(pair[0].timestamp, pair[1].timestamp);
            if minutes <= Decimal::ZERO {
                continue;
            }
            let rate = pair[1]
                .temperature
                .checked_sub(pair[0].temperature)
                .and_then(|delta| delta.checked_div(minutes));
            match rate {
                Some(rate) => rates.push(rate),
                None => return self.overflowed(as_of),
            }
        }

        if rates.is_empty() {
            self.diagnostics.debug(
                COMPONENT,
                "no positive time delta in recent window, skipping classification",
            );
            return AnomalyDetection::quiet("no usable time deltas", as_of);
        }

        let avg_rate = rates
            .iter()
            .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(*r))
            .and_then(|sum| sum.checked_div(Decimal::from(rates.len())));
        let Some(avg_rate) = avg_rate else {
            return self.overflowed(as_of);
        };
        let (earliest, latest) = match (sorted.first(), recent.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => return AnomalyDetection::insufficient_data(as_of),
        };
        let duration = minutes_between(earliest, latest);

        let detection = self.classify(avg_rate, duration, as_of);
        self.diagnostics.debug(
            COMPONENT,
            &format!(
                "avg_rate={} duration_min={} band=[{}, {}] -> {}",
                detection.change_rate,
                detection.duration_minutes,
                optimal_min,
                optimal_max,
                detection.anomaly_type.as_str()
            ),
        );
        detection
    }

    fn overflowed(&self, as_of: DateTime<Utc>) -> AnomalyDetection {
        self.diagnostics.warn(
            COMPONENT,
            "rate of change overflows decimal arithmetic, skipping classification",
        );
        AnomalyDetection::quiet("rate of change out of range", as_of)
    }

    /// Apply the rate rules in priority order; the first match wins.
    pub fn classify(
        &self,
        avg_rate: Decimal,
        duration_minutes: Decimal,
        detected_at: DateTime<Utc>,
    ) -> AnomalyDetection {
        let c = &self.config;
        let (anomaly_type, severity, should_alert, confidence, message, recommendation) =
            if avg_rate > c.door_open_rate {
                (
                    AnomalyType::DoorOpen,
                    Severity::Warning,
                    false,
                    c.door_open_confidence,
                    "Rapid temperature rise detected, door may be open",
                    "Check that the door is fully closed and the gasket seals",
                )
            } else if avg_rate < c.rapid_cooling_rate {
                (
                    AnomalyType::RapidCooling,
                    Severity::Warning,
                    false,
                    c.rapid_cooling_confidence,
                    "Rapid temperature drop detected",
                    "Verify the thermostat set point and watch for product freezing",
                )
            } else if avg_rate > c.compressor_min_rate
                && avg_rate < c.door_open_rate
                && duration_minutes > c.compressor_min_duration_minutes
            {
                (
                    AnomalyType::CompressorFailure,
                    Severity::Critical,
                    true,
                    c.compressor_failure_confidence,
                    "Sustained temperature rise, possible compressor failure",
                    "Inspect the compressor now and relocate perishable stock",
                )
            } else {
                (
                    AnomalyType::Normal,
                    Severity::Normal,
                    false,
                    c.normal_confidence,
                    "Temperature behaviour is normal",
                    "No action required",
                )
            };

        AnomalyDetection {
            has_anomaly: anomaly_type != AnomalyType::Normal,
            anomaly_type,
            severity,
            message: message.to_string(),
            recommendation: recommendation.to_string(),
            change_rate: round(avg_rate, 2),
            duration_minutes: round(duration_minutes, 1),
            should_alert,
            detected_at,
            confidence,
        }
    }
}

/// Fractional minutes from `from` to `to`; negative when `to` is earlier.
fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Decimal {
    Decimal::from((to - from).num_milliseconds()) / Decimal::from(60_000)
}
