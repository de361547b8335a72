//! Calculation logic for the Payroll Engine.
//!
//! This module contains the rules applied to one employee for one period:
//! time worked, hours factor, basic pay, adjustments, statutory bonus, income
//! tax projection and withholding, social security and the maternity fund.
//! [`calculate_payroll`] chains them into a [`crate::models::PayrollResult`]
//! and [`run_payroll`] applies it to every employee of a run.

mod adjustments;
mod basic_pay;
mod engine;
mod hours_factor;
mod income_tax;
mod run;
mod social_security;
mod statutory_bonus;
mod time_worked;

pub use adjustments::{AdjustmentsResult, apply_adjustments};
pub use basic_pay::{BasicPayResult, MONTHS_PER_YEAR, calculate_basic_pay, monthly_salary};
pub use engine::{CalculationContext, calculate_payroll};
pub use hours_factor::{HoursFactorResult, calculate_hours_factor};
pub use income_tax::{
    IncomeTaxResult, NO_PRIOR_TAX_INFORMATION, TaxProjectionResult, calculate_income_tax,
    calculate_part_time_tax, future_taxable_income, project_annual_taxable,
};
pub use run::{EmployeeFailure, PayrollInput, PayrollRun, RunStatus, run_payroll};
pub use social_security::{
    MaternityFundResult, SocialSecurityResult, WEEKS_PER_YEAR, calculate_maternity_fund,
    calculate_social_security, weekly_wage,
};
pub use statutory_bonus::{
    BONUS_WINDOW_MONTHS, BonusAccrual, StatutoryBonusResult, bonus_for_period,
    calculate_statutory_bonus,
};
pub use time_worked::{
    TimeWorkedResult, calculate_time_worked, employment_fraction, employment_overlap,
};
