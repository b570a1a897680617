// Frigo Analytics - Refrigeration equipment analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sensor readings, equipment metadata and window helpers.
//!
//! Readings are produced by an external store and handed to the analyses as
//! borrowed slices. Nothing in this crate mutates them.

use crate::error::{InvalidArgument, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single temperature measurement in degrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureReading {
    pub equipment_id: i64,
    pub temperature: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl TemperatureReading {
    pub fn new(equipment_id: i64, temperature: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            equipment_id,
            temperature,
            timestamp,
        }
    }
}

/// A single energy consumption measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyReading {
    pub equipment_id: i64,
    /// Non-negative consumption expressed in `unit`.
    pub consumption: Decimal,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

impl EnergyReading {
    /// Create a reading in kWh.
    pub fn kwh(equipment_id: i64, consumption: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self::new(equipment_id, consumption, "kWh", timestamp)
    }

    pub fn new(
        equipment_id: i64,
        consumption: Decimal,
        unit: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            equipment_id,
            consumption,
            unit: unit.into(),
            timestamp,
        }
    }
}

/// Anything carrying an equipment id and a timestamp.
pub trait Timestamped {
    fn equipment_id(&self) -> i64;
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for TemperatureReading {
    fn equipment_id(&self) -> i64 {
        self.equipment_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for EnergyReading {
    fn equipment_id(&self) -> i64 {
        self.equipment_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Registry metadata for one piece of equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentProfile {
    pub equipment_id: i64,
    pub optimal_min: Decimal,
    pub optimal_max: Decimal,
    /// Missing when the registry has no record; age then does not contribute to risk.
    pub installation_date: Option<DateTime<Utc>>,
}

impl EquipmentProfile {
    /// Create a profile, rejecting an inverted band.
    pub fn new(equipment_id: i64, optimal_min: Decimal, optimal_max: Decimal) -> Result<Self> {
        if optimal_min > optimal_max {
            return Err(InvalidArgument::InvalidBand {
                min: optimal_min,
                max: optimal_max,
            }
            .into());
        }
        Ok(Self {
            equipment_id,
            optimal_min,
            optimal_max,
            installation_date: None,
        })
    }

    pub fn with_installation_date(mut self, installed: DateTime<Utc>) -> Self {
        self.installation_date = Some(installed);
        self
    }

    /// Width of the optimal band.
    pub fn optimal_range(&self) -> Decimal {
        self.optimal_max.saturating_sub(self.optimal_min)
    }
}

/// Borrow the readings sorted ascending by timestamp. The sort is stable,
/// so readings sharing a timestamp keep their input order.
pub fn sorted_by_time<T: Timestamped>(readings: &[T]) -> Vec<&T> {
    let mut sorted: Vec<&T> = readings.iter().collect();
    sorted.sort_by_key(|r| r.timestamp());
    sorted
}

/// Readings with `start <= timestamp < end`, in input order.
pub fn filter_window<T: Timestamped + Clone>(
    readings: &[T],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<T> {
    readings
        .iter()
        .filter(|r| r.timestamp() >= start && r.timestamp() < end)
        .cloned()
        .collect()
}

/// Readings from the `hours` preceding `as_of`. A span reaching past the
/// representable calendar starts at its earliest instant.
pub fn last_hours<T: Timestamped + Clone>(
    readings: &[T],
    as_of: DateTime<Utc>,
    hours: i64,
) -> Vec<T> {
    filter_window(readings, window_start(as_of, hours, 3_600_000), as_of)
}

/// `end` minus `units` spans of `unit_ms` milliseconds, clamped to the
/// earliest representable instant.
pub(crate) fn window_start(end: DateTime<Utc>, units: i64, unit_ms: i64) -> DateTime<Utc> {
    units
        .checked_mul(unit_ms)
        .map(Duration::milliseconds)
        .and_then(|span| end.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Check that every reading belongs to `equipment_id`.
pub fn validate_window<T: Timestamped>(equipment_id: i64, readings: &[T]) -> Result<()> {
    match readings.iter().find(|r| r.equipment_id() != equipment_id) {
        Some(stray) => Err(InvalidArgument::EquipmentMismatch {
            expected: equipment_id,
            found: stray.equipment_id(),
        }
        .into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap() + Duration::minutes(minute)
    }

    #[test]
    fn test_sorted_by_time() {
        let readings = vec![
            TemperatureReading::new(1, dec!(3.0), at(10)),
            TemperatureReading::new(1, dec!(1.0), at(0)),
            TemperatureReading::new(1, dec!(2.0), at(5)),
        ];
        let sorted = sorted_by_time(&readings);
        let temps: Vec<_> = sorted.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![dec!(1.0), dec!(2.0), dec!(3.0)]);
        // Input untouched
        assert_eq!(readings[0].temperature, dec!(3.0));
    }

    #[test]
    fn test_filter_window_half_open() {
        let readings: Vec<_> = (0..6)
            .map(|i| TemperatureReading::new(1, Decimal::from(i), at(i * 10)))
            .collect();
        let window = filter_window(&readings, at(10), at(40));
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].timestamp, at(10));
        assert_eq!(window[2].timestamp, at(30));
    }

    #[test]
    fn test_last_hours() {
        let readings = vec![
            EnergyReading::kwh(1, dec!(1), at(0)),
            EnergyReading::kwh(1, dec!(1), at(90)),
            EnergyReading::kwh(1, dec!(1), at(150)),
        ];
        let window = last_hours(&readings, at(180), 2);
        assert_eq!(window.len(), 2);
        assert_eq!(last_hours(&readings, at(180), i64::MAX).len(), 3);
    }

    #[test]
    fn test_validate_window() {
        let readings = vec![
            TemperatureReading::new(4, dec!(3.0), at(0)),
            TemperatureReading::new(5, dec!(3.0), at(1)),
        ];
        assert!(validate_window(4, &readings[..1]).is_ok());
        let err = validate_window(4, &readings).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InvalidArgument(InvalidArgument::EquipmentMismatch {
                expected: 4,
                found: 5
            })
        ));
        assert!(validate_window::<TemperatureReading>(4, &[]).is_ok());
    }

    #[test]
    fn test_equipment_profile() {
        let profile = EquipmentProfile::new(1, dec!(2), dec!(8)).unwrap();
        assert_eq!(profile.optimal_range(), dec!(6));
        assert!(profile.installation_date.is_none());

        assert!(EquipmentProfile::new(1, dec!(8), dec!(2)).is_err());
    }
}
