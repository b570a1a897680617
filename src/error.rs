// Frigo Analytics - Refrigeration equipment analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for Frigo Analytics
//!
//! Analyses never fail on short or empty windows; they return degraded
//! results instead. Errors are reserved for contract violations and for
//! loading configuration.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias for Frigo Analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Main error type for Frigo Analytics operations
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Caller broke an input precondition
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// Configuration is internally inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration document could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input precondition violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    /// Window contains a reading of another equipment
    #[error("Reading for equipment {found} in window of equipment {expected}")]
    EquipmentMismatch { expected: i64, found: i64 },

    /// Optimal band is inverted
    #[error("Optimal band is inverted: min {min} > max {max}")]
    InvalidBand { min: Decimal, max: Decimal },
}
