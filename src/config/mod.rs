//! Configuration loading and management for the Payroll Engine.
//!
//! This module loads a payroll data directory: organisation metadata, engine
//! settings, the rate tables of a tax year, employees and adjustments.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./data/sample", 2024).unwrap();
//! println!("Loaded tables for {}", loader.tables().year());
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, EmployeeRecords, RejectedRecord};
pub(crate) use loader::{load_yaml, yaml_files};
pub use types::{
    EngineSettings, PayrollConfig, RawBonusEntry, RawContributionRate, RawRateTables,
    RawTaxBracket,
};
