//! Employee model and related types.
//!
//! This module defines the [`Employee`] record, its [`TaxComputation`] mode and
//! the [`PriorTaxInformation`] carried by employees who joined mid-year.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// How an employee's income tax is computed.
///
/// The first three modes select a progressive bracket table. `PartTime` is the
/// flat-rate computation for hourly part-time emoluments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxComputation {
    /// Single rates.
    Single,
    /// Married rates.
    Married,
    /// Parent rates.
    Parent,
    /// Flat-rate part-time computation.
    #[serde(rename = "parttime", alias = "part_time")]
    PartTime,
}

impl TaxComputation {
    /// Returns the canonical name used in tables and files.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxComputation::Single => "single",
            TaxComputation::Married => "married",
            TaxComputation::Parent => "parent",
            TaxComputation::PartTime => "parttime",
        }
    }

    /// Returns true for the flat-rate part-time mode.
    pub fn is_part_time(&self) -> bool {
        *self == TaxComputation::PartTime
    }
}

impl fmt::Display for TaxComputation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxComputation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(TaxComputation::Single),
            "married" => Ok(TaxComputation::Married),
            "parent" => Ok(TaxComputation::Parent),
            "parttime" | "part_time" => Ok(TaxComputation::PartTime),
            other => Err(format!("unknown tax computation '{}'", other)),
        }
    }
}

/// Emoluments received and tax withheld by previous employers earlier in the
/// tax year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorTaxInformation {
    /// Gross emoluments already received this year.
    #[serde(default)]
    pub gross_emoluments: Decimal,
    /// Income tax already withheld this year.
    #[serde(default)]
    pub income_tax: Decimal,
}

/// Represents an employee on the payroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The employee's first name.
    pub first_name: String,
    /// The employee's surname.
    pub surname: String,
    /// National identity or tax registration number.
    #[serde(default)]
    pub registration_number: Option<String>,
    /// Social security number.
    #[serde(default)]
    pub social_security_number: Option<String>,
    /// Contractual hours per week.
    pub hours_per_week: Decimal,
    /// The income tax computation mode.
    pub tax_computation: TaxComputation,
    /// The social security category key (e.g., "C/D #2").
    pub social_security_category: String,
    /// Gross annual salary at the contractual hours' full-time equivalent.
    pub gross_annual_salary: Decimal,
    /// The first day of employment.
    pub start_date: NaiveDate,
    /// The last day of employment, if the employee has left or is leaving.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Emoluments and tax from earlier employment this tax year.
    #[serde(default)]
    pub prior_tax_information: Option<PriorTaxInformation>,
}

impl Employee {
    /// Returns the employee's display name.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Employee, TaxComputation};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp-001".to_string(),
    ///     first_name: "Maria".to_string(),
    ///     surname: "Borg".to_string(),
    ///     registration_number: None,
    ///     social_security_number: None,
    ///     hours_per_week: Decimal::from(40),
    ///     tax_computation: TaxComputation::Single,
    ///     social_security_category: "C/D #2".to_string(),
    ///     gross_annual_salary: Decimal::from(24000),
    ///     start_date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
    ///     end_date: None,
    ///     prior_tax_information: None,
    /// };
    /// assert_eq!(employee.name(), "Maria Borg");
    /// ```
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.surname)
    }

    /// Returns the later of the employment start and `date`.
    pub fn employed_from(&self, date: NaiveDate) -> NaiveDate {
        self.start_date.max(date)
    }

    /// Returns the last employed day on or before `date`.
    pub fn employed_until(&self, date: NaiveDate) -> NaiveDate {
        match self.end_date {
            Some(end) => end.min(date),
            None => date,
        }
    }

    /// Validates the record's internal consistency.
    ///
    /// Records are validated once, before they reach the computation engine.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |field: &str, message: &str| EngineError::InvalidEmployee {
            employee_id: self.id.clone(),
            field: field.to_string(),
            message: message.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id", "must not be empty"));
        }
        if self.gross_annual_salary < Decimal::ZERO {
            return Err(invalid("gross_annual_salary", "must not be negative"));
        }
        if self.hours_per_week < Decimal::ZERO {
            return Err(invalid("hours_per_week", "must not be negative"));
        }
        if self.end_date.is_some_and(|end| end < self.start_date) {
            return Err(invalid("end_date", "must not be before start_date"));
        }
        if self.social_security_category.trim().is_empty() {
            return Err(invalid("social_security_category", "must not be empty"));
        }
        if let Some(prior) = &self.prior_tax_information {
            if prior.gross_emoluments < Decimal::ZERO {
                return Err(invalid(
                    "prior_tax_information.gross_emoluments",
                    "must not be negative",
                ));
            }
            if prior.income_tax < Decimal::ZERO {
                return Err(invalid(
                    "prior_tax_information.income_tax",
                    "must not be negative",
                ));
            }
        }
        Ok(())
    }
}
