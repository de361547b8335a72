//! Configuration types for the payroll data directory.
//!
//! This module contains the strongly-typed structures deserialized from the
//! YAML files, each a raw row mirroring the file layout, plus the validated
//! [`EngineSettings`] and the assembled [`PayrollConfig`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::Organisation;
use crate::tables::{RateTables, RateType};

/// One row of `income_tax.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTaxBracket {
    /// Inclusive upper bound; omitted or null for the top bracket.
    #[serde(default, alias = "upto")]
    pub upper_bound: Option<Decimal>,
    /// Marginal rate.
    pub rate: Decimal,
    /// Subtraction constant.
    pub subtract: Decimal,
}

/// One row of `social_security.yaml` or `maternity_fund.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawContributionRate {
    /// The category key.
    pub category: String,
    /// `Fixed`, `Percentage` or `Rate`.
    pub rate_type: RateType,
    /// Employee rate.
    #[serde(alias = "rate")]
    pub rate_value: Decimal,
    /// Employee weekly maximum.
    #[serde(alias = "maximum")]
    pub maximum_value: Decimal,
    /// Employer rate, when different.
    #[serde(default)]
    pub employer_rate_value: Option<Decimal>,
    /// Employer weekly maximum, when different.
    #[serde(default)]
    pub employer_maximum_value: Option<Decimal>,
}

/// One row of `statutory_bonus.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBonusEntry {
    /// Month name (e.g., "march").
    pub month: String,
    /// Bonus amount.
    pub bonus: Decimal,
}

/// The raw contents of a `tables/<year>/` directory.
#[derive(Debug, Clone)]
pub struct RawRateTables {
    /// The directory's tax year.
    pub year: i32,
    /// Bracket rows per computation mode.
    pub income_tax: BTreeMap<String, Vec<RawTaxBracket>>,
    /// Social security rows.
    pub social_security: Vec<RawContributionRate>,
    /// Maternity fund rows, if the file exists.
    pub maternity_fund: Option<Vec<RawContributionRate>>,
    /// Bonus schedule rows.
    pub statutory_bonus: Vec<RawBonusEntry>,
}

/// Engine-wide settings from `settings.yaml`.
///
/// # Example
///
/// ```
/// use payroll_engine::config::EngineSettings;
///
/// let yaml = "full_time_hours_per_week: 40\npart_time_tax_rate: 0.15\nstatutory_bonus_taxable: false\n";
/// let settings: EngineSettings = serde_yaml::from_str(yaml).unwrap();
/// assert!(settings.validate().is_ok());
/// assert!(!settings.statutory_bonus_taxable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Weekly hours of a full-time contract.
    pub full_time_hours_per_week: Decimal,
    /// Flat tax rate for the part-time computation mode.
    pub part_time_tax_rate: Decimal,
    /// Whether the statutory bonus is part of taxable income.
    pub statutory_bonus_taxable: bool,
}

impl EngineSettings {
    /// Checks ranges: full-time hours above zero, part-time rate in `[0, 1]`.
    pub fn validate(&self) -> EngineResult<()> {
        if self.full_time_hours_per_week <= Decimal::ZERO {
            return Err(EngineError::InvalidSettings {
                field: "full_time_hours_per_week".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.part_time_tax_rate < Decimal::ZERO || self.part_time_tax_rate > Decimal::ONE {
            return Err(EngineError::InvalidSettings {
                field: "part_time_tax_rate".to_string(),
                message: "must be between 0 and 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Everything a run needs besides employees and adjustments.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    /// The paying organisation.
    pub organisation: Organisation,
    /// Engine-wide settings.
    pub settings: EngineSettings,
    /// Rate tables for the tax year.
    pub tables: RateTables,
}
