// Frigo Analytics - Refrigeration equipment analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Temperature stability health score.

use crate::config::HealthConfig;
use crate::diagnostics::SharedDiagnostics;
use crate::reading::TemperatureReading;
use crate::stats::{round, StatisticsSummarizer, TemperatureTrend};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Health of one piece of equipment over a reading window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentHealth {
    /// 0-100, whole points.
    pub health_score: Decimal,
    pub mean: Decimal,
    pub standard_deviation: Decimal,
    pub variance: Decimal,
    pub range: Decimal,
    pub min_temperature: Decimal,
    pub max_temperature: Decimal,
    pub is_stable: bool,
    pub trend: TemperatureTrend,
    pub readings_analyzed: usize,
}

impl EquipmentHealth {
    /// Result for a window too short to score.
    pub fn insufficient(readings_analyzed: usize) -> Self {
        Self {
            health_score: Decimal::ZERO,
            mean: Decimal::ZERO,
            standard_deviation: Decimal::ZERO,
            variance: Decimal::ZERO,
            range: Decimal::ZERO,
            min_temperature: Decimal::ZERO,
            max_temperature: Decimal::ZERO,
            is_stable: false,
            trend: TemperatureTrend::unknown(),
            readings_analyzed,
        }
    }
}

/// Scores temperature stability.
#[derive(Debug, Clone, Default)]
pub struct HealthScorer {
    config: HealthConfig,
    summarizer: StatisticsSummarizer,
}

impl HealthScorer {
    pub fn new(config: HealthConfig, summarizer: StatisticsSummarizer) -> Self {
        Self { config, summarizer }
    }

    /// Route the summarizer's diagnostics to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: SharedDiagnostics) -> Self {
        self.summarizer = self.summarizer.with_diagnostics(diagnostics);
        self
    }

    pub fn summarizer(&self) -> &StatisticsSummarizer {
        &self.summarizer
    }

    /// `100 - std_dev * penalty`, floored at zero. The rounded standard
    /// deviation feeds both the score and the stability flag.
    pub fn score(&self, readings: &[TemperatureReading]) -> EquipmentHealth {
        if readings.len() < self.config.min_readings {
            return EquipmentHealth::insufficient(readings.len());
        }
        let Some(stats) = self.summarizer.summarize(readings) else {
            return EquipmentHealth::insufficient(readings.len());
        };

        // A penalty too large to represent leaves nothing of the score.
        let raw = stats
            .standard_deviation
            .checked_mul(self.config.std_dev_penalty)
            .and_then(|penalty| Decimal::ONE_HUNDRED.checked_sub(penalty))
            .unwrap_or(Decimal::ZERO);
        let health_score = round(raw.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED), 0);

        EquipmentHealth {
            health_score,
            mean: stats.mean,
            standard_deviation: stats.standard_deviation,
            variance: stats.variance,
            range: stats.range,
            min_temperature: stats.min,
            max_temperature: stats.max,
            is_stable: stats.standard_deviation < self.config.stability_threshold,
            trend: self.summarizer.fit_trend(readings),
            readings_analyzed: readings.len(),
        }
    }
}
