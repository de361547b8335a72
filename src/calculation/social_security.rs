//! Social security and maternity fund contributions.
//!
//! Contributions are assessed weekly on the employee's weekly wage and paid for
//! every contribution week in the period. Caps are quoted at full-time hours
//! and scaled by the hours factor.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, Employee};
use crate::tables::RateTables;

/// Number of weeks the annual salary is spread over for the weekly wage.
pub const WEEKS_PER_YEAR: u32 = 52;

/// The result of the social security calculation.
#[derive(Debug, Clone)]
pub struct SocialSecurityResult {
    /// Weekly wage the contributions are assessed on.
    pub weekly_wage: Decimal,
    /// Employee weekly cap after the hours adjustment.
    pub weekly_cap: Decimal,
    /// Employer weekly cap after the hours adjustment.
    pub employer_weekly_cap: Decimal,
    /// Employee contribution for the period.
    pub employee_contribution: Decimal,
    /// Employer contribution for the period.
    pub employer_contribution: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// The result of the maternity fund calculation.
#[derive(Debug, Clone)]
pub struct MaternityFundResult {
    /// Weekly employer contribution.
    pub weekly: Decimal,
    /// Weekly cap after the hours adjustment.
    pub weekly_cap: Decimal,
    /// Employer contribution for the period.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Weekly wage of an employee at their contractual hours.
pub fn weekly_wage(employee: &Employee, hours_factor: Decimal) -> Decimal {
    employee.gross_annual_salary * hours_factor / Decimal::from(WEEKS_PER_YEAR)
}

/// Calculates employee and employer social security contributions.
///
/// The category is always looked up, so an unknown category fails even for
/// employees on the part-time computation, who otherwise pay nothing.
///
/// Returns `InvalidCategory` if the category has no rate.
pub fn calculate_social_security(
    employee: &Employee,
    tables: &RateTables,
    hours_factor: Decimal,
    contribution_weeks: u32,
    step_number: u32,
) -> EngineResult<SocialSecurityResult> {
    let rate = tables.contribution_rate(&employee.id, &employee.social_security_category)?;
    let weekly_wage = weekly_wage(employee, hours_factor);
    let weekly_cap = rate.employee_cap(hours_factor);
    let employer_weekly_cap = rate.employer_cap(hours_factor);
    let weeks = Decimal::from(contribution_weeks);

    let (employee_weekly, employer_weekly, reasoning) = if employee.tax_computation.is_part_time()
    {
        (
            Decimal::ZERO,
            Decimal::ZERO,
            "Part-time computation: no social security contribution".to_string(),
        )
    } else {
        let employee_weekly = rate.employee_weekly(weekly_wage, hours_factor);
        let employer_weekly = rate.employer_weekly(weekly_wage, hours_factor);
        (
            employee_weekly,
            employer_weekly,
            format!(
                "Category {} ({:?}): {} per week capped at {}, for {} weeks",
                rate.category,
                rate.rate_type,
                employee_weekly.round_dp(4),
                weekly_cap.round_dp(4),
                contribution_weeks
            ),
        )
    };

    let employee_contribution = employee_weekly * weeks;
    let employer_contribution = employer_weekly * weeks;

    let audit_step = AuditStep {
        step_number,
        rule_id: "social_security".to_string(),
        rule_name: "Social Security Contribution".to_string(),
        table_ref: Some(format!("social_security.{}", rate.category)),
        input: serde_json::json!({
            "category": rate.category,
            "rate_type": rate.rate_type,
            "rate_value": rate.rate_value.to_string(),
            "maximum_value": rate.maximum_value.to_string(),
            "weekly_wage": weekly_wage.round_dp(6).to_string(),
            "hours_factor": hours_factor.round_dp(6).to_string(),
            "contribution_weeks": contribution_weeks,
        }),
        output: serde_json::json!({
            "weekly_cap": weekly_cap.round_dp(6).to_string(),
            "employee_weekly": employee_weekly.round_dp(6).to_string(),
            "employer_weekly": employer_weekly.round_dp(6).to_string(),
            "employee_contribution": employee_contribution.round_dp(6).to_string(),
            "employer_contribution": employer_contribution.round_dp(6).to_string(),
        }),
        reasoning,
    };

    Ok(SocialSecurityResult {
        weekly_wage,
        weekly_cap,
        employer_weekly_cap,
        employee_contribution,
        employer_contribution,
        audit_step,
    })
}

/// Calculates the employer's maternity fund contribution.
///
/// With no maternity fund table loaded the contribution is zero.
///
/// Returns `InvalidCategory` if a table is loaded but has no rate for the
/// employee's category.
pub fn calculate_maternity_fund(
    employee: &Employee,
    tables: &RateTables,
    hours_factor: Decimal,
    contribution_weeks: u32,
    step_number: u32,
) -> EngineResult<MaternityFundResult> {
    let rate = tables.maternity_rate(&employee.id, &employee.social_security_category)?;
    let weekly_wage = weekly_wage(employee, hours_factor);

    let (weekly, weekly_cap, reasoning) = match rate {
        Some(rate) => {
            let weekly = rate.employer_weekly(weekly_wage, hours_factor);
            (
                weekly,
                rate.employer_cap(hours_factor),
                format!(
                    "Category {}: {} per week for {} weeks",
                    rate.category,
                    weekly.round_dp(4),
                    contribution_weeks
                ),
            )
        }
        None => (
            Decimal::ZERO,
            Decimal::ZERO,
            "No maternity fund table loaded".to_string(),
        ),
    };
    let amount = weekly * Decimal::from(contribution_weeks);

    let audit_step = AuditStep {
        step_number,
        rule_id: "maternity_fund".to_string(),
        rule_name: "Maternity Fund Contribution".to_string(),
        table_ref: rate.map(|r| format!("maternity_fund.{}", r.category)),
        input: serde_json::json!({
            "category": employee.social_security_category,
            "weekly_wage": weekly_wage.round_dp(6).to_string(),
            "contribution_weeks": contribution_weeks,
        }),
        output: serde_json::json!({
            "weekly": weekly.round_dp(6).to_string(),
            "amount": amount.round_dp(6).to_string(),
        }),
        reasoning,
    };

    Ok(MaternityFundResult {
        weekly,
        weekly_cap,
        amount,
        audit_step,
    })
}
