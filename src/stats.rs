// Frigo Analytics - Refrigeration equipment analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Descriptive statistics and linear trend over a temperature window.

use crate::config::TrendConfig;
use crate::diagnostics::{default_diagnostics, SharedDiagnostics};
use crate::reading::{sorted_by_time, TemperatureReading};
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use serde::{Deserialize, Serialize};

const COMPONENT: &str = "stats";

/// Round half away from zero to `dp` decimal places.
pub(crate) fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Direction of a fitted temperature trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
    /// Too few readings to fit a line.
    Unknown,
}

impl TrendDirection {
    /// Classify a slope against a symmetric dead band. Both bounds are exclusive.
    pub fn from_slope(slope: Decimal, threshold: Decimal) -> Self {
        if slope > threshold {
            TrendDirection::Rising
        } else if slope < -threshold {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Falling => "falling",
            TrendDirection::Stable => "stable",
            TrendDirection::Unknown => "unknown",
        }
    }
}

/// Fitted temperature trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureTrend {
    pub direction: TrendDirection,
    /// Degrees per reading, 4 dp.
    pub slope: Decimal,
    /// `slope` times the assumed readings per day, 2 dp.
    pub projected_change_24h: Decimal,
}

impl TemperatureTrend {
    pub fn unknown() -> Self {
        Self {
            direction: TrendDirection::Unknown,
            slope: Decimal::ZERO,
            projected_change_24h: Decimal::ZERO,
        }
    }
}

/// Population statistics of a temperature window, all rounded to 2 dp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureStats {
    pub mean: Decimal,
    pub variance: Decimal,
    pub standard_deviation: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    pub range: Decimal,
    pub count: usize,
}

/// Computes summary statistics and least-squares trends.
#[derive(Clone)]
pub struct StatisticsSummarizer {
    config: TrendConfig,
    diagnostics: SharedDiagnostics,
}

impl Default for StatisticsSummarizer {
    fn default() -> Self {
        Self::new(TrendConfig::default())
    }
}

impl std::fmt::Debug for StatisticsSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticsSummarizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StatisticsSummarizer {
    pub fn new(config: TrendConfig) -> Self {
        Self {
            config,
            diagnostics: default_diagnostics(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: SharedDiagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Mean, population variance, standard deviation and extremes.
    /// Returns `None` for an empty window, or when the window's values
    /// overflow decimal arithmetic.
    pub fn summarize(&self, readings: &[TemperatureReading]) -> Option<TemperatureStats> {
        if readings.is_empty() {
            return None;
        }
        let stats = population_stats(readings);
        if stats.is_none() {
            self.diagnostics.warn(
                COMPONENT,
                &format!("{} readings overflow decimal arithmetic, no statistics", readings.len()),
            );
        }
        stats
    }

    /// Ordinary least squares of temperature against reading index, after
    /// sorting by timestamp. Assumes evenly spaced readings: the projection
    /// multiplies the per-reading slope by `readings_per_day`.
    pub fn fit_trend(&self, readings: &[TemperatureReading]) -> TemperatureTrend {
        if readings.len() < self.config.min_readings.max(2) {
            return TemperatureTrend::unknown();
        }

        let sorted = sorted_by_time(readings);
        let fitted = least_squares_slope(&sorted).and_then(|slope| {
            let projected = slope.checked_mul(Decimal::from(self.config.readings_per_day))?;
            Some((slope, projected))
        });
        let Some((slope, projected)) = fitted else {
            self.diagnostics.warn(
                COMPONENT,
                &format!("trend fit over {} readings overflowed, direction unknown", sorted.len()),
            );
            return TemperatureTrend::unknown();
        };

        TemperatureTrend {
            direction: TrendDirection::from_slope(slope, self.config.slope_threshold),
            slope: round(slope, 4),
            projected_change_24h: round(projected, 2),
        }
    }
}

/// `None` on an empty window or arithmetic overflow.
fn population_stats(readings: &[TemperatureReading]) -> Option<TemperatureStats> {
    let first = readings.first()?.temperature;
    let n = Decimal::from(readings.len());

    let (sum, min, max) = readings.iter().try_fold(
        (Decimal::ZERO, first, first),
        |(sum, min, max), r| {
            let t = r.temperature;
            Some((sum.checked_add(t)?, min.min(t), max.max(t)))
        },
    )?;
    let mean = sum.checked_div(n)?;

    let squared = readings.iter().try_fold(Decimal::ZERO, |acc, r| {
        let d = r.temperature.checked_sub(mean)?;
        acc.checked_add(d.checked_mul(d)?)
    })?;
    let variance = squared.checked_div(n)?;
    let std_dev = variance.sqrt()?;

    Some(TemperatureStats {
        mean: round(mean, 2),
        variance: round(variance, 2),
        standard_deviation: round(std_dev, 2),
        min: round(min, 2),
        max: round(max, 2),
        range: round(max.checked_sub(min)?, 2),
        count: readings.len(),
    })
}

/// Slope of temperature against index. `None` on overflow or a degenerate fit.
fn least_squares_slope(sorted: &[&TemperatureReading]) -> Option<Decimal> {
    let n = Decimal::from(sorted.len());
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) =
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
    for (i, r) in sorted.iter().enumerate() {
        let x = Decimal::from(i);
        let y = r.temperature;
        sum_x = sum_x.checked_add(x)?;
        sum_y = sum_y.checked_add(y)?;
        sum_xy = sum_xy.checked_add(x.checked_mul(y)?)?;
        sum_xx = sum_xx.checked_add(x.checked_mul(x)?)?;
    }

    let numerator = n.checked_mul(sum_xy)?.checked_sub(sum_x.checked_mul(sum_y)?)?;
    let denominator = n.checked_mul(sum_xx)?.checked_sub(sum_x.checked_mul(sum_x)?)?;
    numerator.checked_div(denominator)
}
