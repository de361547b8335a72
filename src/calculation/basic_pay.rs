//! Basic pay calculation.
//!
//! This module provides the salary part of an employee's pay for a period: the
//! annual salary scaled by the hours factor, spread over twelve months and
//! pro-rated by the time worked.

use rust_decimal::Decimal;

use crate::models::{AuditStep, Employee};

/// Number of pay periods in a tax year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// The result of a basic pay calculation.
#[derive(Debug, Clone)]
pub struct BasicPayResult {
    /// Salary for a whole month at the employee's hours.
    pub monthly_salary: Decimal,
    /// Salary paid for the period.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Monthly salary at the employee's hours, before pro-rating.
pub fn monthly_salary(employee: &Employee, hours_factor: Decimal) -> Decimal {
    employee.gross_annual_salary * hours_factor / Decimal::from(MONTHS_PER_YEAR)
}

/// Calculates the basic pay for a period.
///
/// Employees on the part-time tax computation are paid through work logs, so
/// their basic pay is zero.
pub fn calculate_basic_pay(
    employee: &Employee,
    hours_factor: Decimal,
    time_worked: Decimal,
    step_number: u32,
) -> BasicPayResult {
    let monthly_salary = monthly_salary(employee, hours_factor);

    let (amount, reasoning) = if employee.tax_computation.is_part_time() {
        (
            Decimal::ZERO,
            "Part-time computation: pay comes from work logs only".to_string(),
        )
    } else {
        let amount = monthly_salary * time_worked;
        (
            amount,
            format!(
                "Monthly salary {} x {} of the period worked",
                monthly_salary.round_dp(2),
                time_worked.round_dp(4)
            ),
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "basic_pay".to_string(),
        rule_name: "Basic Pay".to_string(),
        table_ref: None,
        input: serde_json::json!({
            "gross_annual_salary": employee.gross_annual_salary.to_string(),
            "hours_factor": hours_factor.round_dp(6).to_string(),
            "time_worked": time_worked.round_dp(6).to_string(),
            "tax_computation": employee.tax_computation.as_str(),
        }),
        output: serde_json::json!({
            "monthly_salary": monthly_salary.round_dp(6).to_string(),
            "amount": amount.round_dp(6).to_string(),
        }),
        reasoning,
    };

    BasicPayResult {
        monthly_salary,
        amount,
        audit_step,
    }
}
