//! Error types for the Payroll Engine.
//!
//! Every failure is an [`EngineError`]. Its [`ErrorKind`] tells a payroll run
//! whether the failure stops the whole run or only the employee it concerns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for the Payroll Engine.
///
/// Loading, computing and persisting all return this type.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/settings.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/settings.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A rate table was loaded but violates its structural rules.
    #[error("Invalid rate table '{table}': {message}")]
    InvalidRateTable {
        /// The table that was rejected.
        table: String,
        /// A description of the violation.
        message: String,
    },

    /// Engine settings or organisation metadata are out of range.
    #[error("Invalid setting '{field}': {message}")]
    InvalidSettings {
        /// The setting that was invalid.
        field: String,
        /// A description of what made the setting invalid.
        message: String,
    },

    /// The rate tables belong to a different tax year than the payroll period.
    #[error("Rate tables are for {tables_year} but the payroll period is in {period_year}")]
    TableYearMismatch {
        /// The year the tables were loaded for.
        tables_year: i32,
        /// The year of the requested period.
        period_year: i32,
    },

    /// The requested payroll period does not exist.
    #[error("Invalid payroll period {year}-{month}")]
    InvalidPeriod {
        /// The requested year.
        year: i32,
        /// The requested month.
        month: u32,
    },

    /// The employee's social security category has no contribution rate.
    #[error("Invalid category '{category}' for employee '{employee_id}'")]
    InvalidCategory {
        /// The employee whose computation failed.
        employee_id: String,
        /// The category that was not found.
        category: String,
    },

    /// The employee's tax computation mode has no bracket table.
    #[error("Invalid tax computation '{mode}' for employee '{employee_id}'")]
    InvalidTaxComputation {
        /// The employee whose computation failed.
        employee_id: String,
        /// The computation mode that has no table.
        mode: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee '{employee_id}' field '{field}': {message}")]
    InvalidEmployee {
        /// The employee whose record is invalid.
        employee_id: String,
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A computed result broke one of the engine's own invariants.
    #[error("Invariant violated for employee '{employee_id}': {message}")]
    InvariantViolation {
        /// The employee whose result is inconsistent.
        employee_id: String,
        /// A description of the broken invariant.
        message: String,
    },

    /// An output file or directory could not be written.
    #[error("Failed to write '{path}': {message}")]
    OutputError {
        /// The path that could not be written.
        path: String,
        /// A description of the failure.
        message: String,
    },
}

/// Broad classification of an [`EngineError`].
///
/// Configuration errors are fatal to a run because the tables are shared by
/// every employee; the other kinds only affect the employee they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed configuration, tables or output locations.
    Configuration,
    /// A malformed employee record or request.
    Validation,
    /// An employee references a category or computation mode with no table entry.
    Lookup,
    /// An internal consistency check failed.
    Invariant,
}

impl EngineError {
    /// Returns the broad kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidRateTable { .. }
            | EngineError::InvalidSettings { .. }
            | EngineError::TableYearMismatch { .. }
            | EngineError::OutputError { .. } => ErrorKind::Configuration,
            EngineError::InvalidEmployee { .. } | EngineError::InvalidPeriod { .. } => {
                ErrorKind::Validation
            }
            EngineError::InvalidCategory { .. } | EngineError::InvalidTaxComputation { .. } => {
                ErrorKind::Lookup
            }
            EngineError::InvariantViolation { .. } => ErrorKind::Invariant,
        }
    }

    /// Returns true if the error must abort the whole run.
    pub fn is_fatal_to_run(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
