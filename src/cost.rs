// Frigo Analytics - Refrigeration equipment analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Energy cost comparison between two billing periods.

use crate::config::CostConfig;
use crate::diagnostics::{default_diagnostics, SharedDiagnostics};
use crate::reading::{window_start, EnergyReading};
use crate::stats::round;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const COMPONENT: &str = "cost";
const MS_PER_DAY: i64 = 86_400_000;

/// Direction of cost between periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl CostTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostTrend::Increasing => "increasing",
            CostTrend::Decreasing => "decreasing",
            CostTrend::Stable => "stable",
        }
    }
}

/// Cost report comparing the current period with the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysis {
    pub current_month_cost: Decimal,
    pub previous_month_cost: Decimal,
    pub difference: Decimal,
    /// 1 dp; zero when the previous period cost nothing.
    pub percent_change: Decimal,
    pub projected_annual_cost: Decimal,
    pub daily_average_cost: Decimal,
    /// Current period consumption.
    pub total_kwh: Decimal,
    pub electricity_rate: Decimal,
    pub days_analyzed: i64,
    pub trend: CostTrend,
    pub potential_savings: Option<Decimal>,
    pub recommendations: Vec<String>,
}

impl CostAnalysis {
    /// Result when the totals cannot be represented: all zero, stable.
    pub fn unavailable(electricity_rate: Decimal) -> Self {
        Self {
            current_month_cost: Decimal::ZERO,
            previous_month_cost: Decimal::ZERO,
            difference: Decimal::ZERO,
            percent_change: Decimal::ZERO,
            projected_annual_cost: Decimal::ZERO,
            daily_average_cost: Decimal::ZERO,
            total_kwh: Decimal::ZERO,
            electricity_rate,
            days_analyzed: 0,
            trend: CostTrend::Stable,
            potential_savings: None,
            recommendations: Vec::new(),
        }
    }
}

pub const MAINTENANCE_CHECK_RECOMMENDATION: &str =
    "Energy use is up sharply: schedule a maintenance check";
pub const COIL_CLEANING_RECOMMENDATION: &str =
    "Clean the condenser coils to restore cooling efficiency";

/// Aggregates energy readings into a cost comparison.
#[derive(Clone)]
pub struct CostAnalyzer {
    config: CostConfig,
    diagnostics: SharedDiagnostics,
}

impl Default for CostAnalyzer {
    fn default() -> Self {
        Self::new(CostConfig::default())
    }
}

impl std::fmt::Debug for CostAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostAnalyzer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CostAnalyzer {
    pub fn new(config: CostConfig) -> Self {
        Self {
            config,
            diagnostics: default_diagnostics(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: SharedDiagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Compare two disjoint periods at the configured electricity rate.
    pub fn analyze(&self, current: &[EnergyReading], previous: &[EnergyReading]) -> CostAnalysis {
        self.analyze_with_rate(current, previous, self.config.electricity_rate)
    }

    /// Compare two disjoint periods at an explicit rate per kWh.
    ///
    /// Totals too large for decimal arithmetic yield
    /// [`CostAnalysis::unavailable`] and a warning.
    pub fn analyze_with_rate(
        &self,
        current: &[EnergyReading],
        previous: &[EnergyReading],
        rate: Decimal,
    ) -> CostAnalysis {
        match self.compare(current, previous, rate) {
            Some(analysis) => analysis,
            None => {
                self.diagnostics.warn(
                    COMPONENT,
                    &format!(
                        "cost of {} + {} readings at rate {} overflows, no comparison",
                        current.len(),
                        previous.len(),
                        rate
                    ),
                );
                CostAnalysis::unavailable(rate)
            }
        }
    }

    fn compare(
        &self,
        current: &[EnergyReading],
        previous: &[EnergyReading],
        rate: Decimal,
    ) -> Option<CostAnalysis> {
        let c = &self.config;
        let current_kwh = self.total_kwh(current)?;
        let previous_kwh = self.total_kwh(previous)?;

        let current_cost = current_kwh.checked_mul(rate)?;
        let previous_cost = previous_kwh.checked_mul(rate)?;
        let difference = current_cost.checked_sub(previous_cost)?;
        let percent_change = if previous_cost > Decimal::ZERO {
            difference
                .checked_div(previous_cost)?
                .checked_mul(Decimal::ONE_HUNDRED)?
        } else {
            Decimal::ZERO
        };

        let days_analyzed = inclusive_day_span(current);
        let daily_average = if days_analyzed > 0 {
            current_cost.checked_div(Decimal::from(days_analyzed))?
        } else {
            Decimal::ZERO
        };
        let projected_annual = daily_average.checked_mul(Decimal::from(c.days_per_year))?;

        let trend = if percent_change.abs() > c.trend_threshold_percent {
            if percent_change > Decimal::ZERO {
                CostTrend::Increasing
            } else {
                CostTrend::Decreasing
            }
        } else {
            CostTrend::Stable
        };

        let mut recommendations = Vec::new();
        if percent_change > c.maintenance_check_percent {
            recommendations.push(MAINTENANCE_CHECK_RECOMMENDATION.to_string());
        }
        if percent_change > c.coil_cleaning_percent {
            recommendations.push(COIL_CLEANING_RECOMMENDATION.to_string());
        }

        let potential_savings = if percent_change > c.savings_threshold_percent {
            Some(round(current_cost.checked_mul(c.savings_fraction)?, 2))
        } else {
            None
        };

        Some(CostAnalysis {
            current_month_cost: round(current_cost, 2),
            previous_month_cost: round(previous_cost, 2),
            difference: round(difference, 2),
            percent_change: round(percent_change, 1),
            projected_annual_cost: round(projected_annual, 2),
            daily_average_cost: round(daily_average, 2),
            total_kwh: round(current_kwh, 2),
            electricity_rate: rate,
            days_analyzed,
            trend,
            potential_savings,
            recommendations,
        })
    }

    /// Split readings into the current `[as_of - period, as_of)` and
    /// previous `[as_of - 2 * period, as_of - period)` billing periods.
    pub fn split_periods(
        &self,
        readings: &[EnergyReading],
        as_of: DateTime<Utc>,
    ) -> (Vec<EnergyReading>, Vec<EnergyReading>) {
        split_periods(readings, as_of, self.config.period_days)
    }

    /// Sum consumption in kWh, reporting unrecognised units once each.
    /// `None` on overflow.
    fn total_kwh(&self, readings: &[EnergyReading]) -> Option<Decimal> {
        let mut unknown_units = BTreeSet::new();
        let total = readings.iter().try_fold(Decimal::ZERO, |acc, r| {
            let kwh = match kwh_factor(&r.unit) {
                Some(factor) => r.consumption.checked_mul(factor)?,
                None => {
                    unknown_units.insert(r.unit.as_str());
                    r.consumption
                }
            };
            acc.checked_add(kwh)
        });

        for unit in unknown_units {
            self.diagnostics.warn(
                COMPONENT,
                &format!("unrecognised energy unit {unit:?}, treating as kWh"),
            );
        }
        total
    }
}

/// Multiplier converting `unit` to kWh.
pub fn kwh_factor(unit: &str) -> Option<Decimal> {
    match unit.to_ascii_lowercase().as_str() {
        "wh" => Some(Decimal::new(1, 3)),
        "kwh" => Some(Decimal::ONE),
        "mwh" => Some(Decimal::ONE_THOUSAND),
        _ => None,
    }
}

/// See [`CostAnalyzer::split_periods`].
pub fn split_periods(
    readings: &[EnergyReading],
    as_of: DateTime<Utc>,
    period_days: u32,
) -> (Vec<EnergyReading>, Vec<EnergyReading>) {
    let days = i64::from(period_days);
    let current_start = window_start(as_of, days, MS_PER_DAY);
    let previous_start = window_start(current_start, days, MS_PER_DAY);

    let mut current = Vec::new();
    let mut previous = Vec::new();
    for r in readings {
        if r.timestamp >= current_start && r.timestamp < as_of {
            current.push(r.clone());
        } else if r.timestamp >= previous_start && r.timestamp < current_start {
            previous.push(r.clone());
        }
    }
    (current, previous)
}

/// Whole days between the earliest and latest reading, plus one; zero when empty.
fn inclusive_day_span(readings: &[EnergyReading]) -> i64 {
    let first = readings.iter().map(|r| r.timestamp).min();
    let last = readings.iter().map(|r| r.timestamp).max();
    match (first, last) {
        (Some(first), Some(last)) => (last - first).num_days() + 1,
        _ => 0,
    }
}
