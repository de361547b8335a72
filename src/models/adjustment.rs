//! One-off adjustments applied alongside an employee's salary.
//!
//! An adjustment is dated, keyed to an employee, and applies to the pay period
//! containing its date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PayPeriod;

/// A one-off adjustment for an employee.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Adjustment;
///
/// let yaml = r#"
/// kind: work_log
/// employee: emp-004
/// dated: 2024-03-04
/// hours: 12
/// hourly_wage: 15.50
/// "#;
/// let adjustment: Adjustment = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(adjustment.employee_id(), "emp-004");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    /// A one-time payment that is taxed with the salary. May be negative.
    ManualAdjustment {
        /// The employee receiving the adjustment.
        employee: String,
        /// The date the adjustment is booked on.
        dated: NaiveDate,
        /// The amount of the adjustment.
        value: Decimal,
        /// What the adjustment is for.
        description: String,
    },
    /// An expense reimbursement credited to net pay without tax.
    Reimbursement {
        /// The employee being reimbursed.
        employee: String,
        /// The date the expense is reimbursed on.
        dated: NaiveDate,
        /// The amount reimbursed.
        value: Decimal,
        /// What the expense was.
        description: String,
    },
    /// Hourly work paid and taxed as an emolument.
    WorkLog {
        /// The employee who did the work.
        employee: String,
        /// The date the work was done.
        dated: NaiveDate,
        /// Hours worked.
        hours: Decimal,
        /// The wage per hour.
        hourly_wage: Decimal,
        /// Optional note about the work.
        #[serde(default)]
        description: Option<String>,
    },
}

impl Adjustment {
    /// Returns the employee the adjustment belongs to.
    pub fn employee_id(&self) -> &str {
        match self {
            Adjustment::ManualAdjustment { employee, .. }
            | Adjustment::Reimbursement { employee, .. }
            | Adjustment::WorkLog { employee, .. } => employee,
        }
    }

    /// Returns the date the adjustment applies on.
    pub fn dated(&self) -> NaiveDate {
        match self {
            Adjustment::ManualAdjustment { dated, .. }
            | Adjustment::Reimbursement { dated, .. }
            | Adjustment::WorkLog { dated, .. } => *dated,
        }
    }

    /// Returns the monetary value of the adjustment.
    pub fn value(&self) -> Decimal {
        match self {
            Adjustment::ManualAdjustment { value, .. } | Adjustment::Reimbursement { value, .. } => {
                *value
            }
            Adjustment::WorkLog {
                hours, hourly_wage, ..
            } => *hours * *hourly_wage,
        }
    }

    /// Returns true if the adjustment belongs to `employee_id` and falls in `period`.
    pub fn applies_to(&self, employee_id: &str, period: &PayPeriod) -> bool {
        self.employee_id() == employee_id && period.contains_date(self.dated())
    }
}
