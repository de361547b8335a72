//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod adjustment;
mod employee;
mod money;
mod organisation;
mod pay_period;
mod payroll_result;

pub use adjustment::Adjustment;
pub use employee::{Employee, PriorTaxInformation, TaxComputation};
pub use money::{Currency, ROUNDING_STRATEGY};
pub use organisation::Organisation;
pub use pay_period::{PayPeriod, count_mondays, days_inclusive};
pub use payroll_result::{AuditStep, AuditTrace, AuditWarning, PayrollResult, YearToDate};

#[cfg(test)]
pub(crate) use payroll_result::test_support;
