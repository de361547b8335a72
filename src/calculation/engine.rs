//! The per-employee computation engine.
//!
//! [`calculate_payroll`] chains the individual rules for one employee and one
//! period. Every intermediate value stays unrounded; amounts are rounded to the
//! currency's minor unit only when the [`PayrollResult`] is built.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Adjustment, AuditStep, AuditTrace, Currency, Employee, PayPeriod, PayrollResult, YearToDate,
};
use crate::tables::RateTables;

use super::adjustments::apply_adjustments;
use super::basic_pay::calculate_basic_pay;
use super::hours_factor::calculate_hours_factor;
use super::income_tax::{
    calculate_income_tax, calculate_part_time_tax, future_taxable_income, project_annual_taxable,
    remaining_employed_months,
};
use super::social_security::{calculate_maternity_fund, calculate_social_security};
use super::statutory_bonus::calculate_statutory_bonus;
use super::time_worked::calculate_time_worked;

/// Decimal places kept for non-monetary fractions in results.
const FRACTION_DP: u32 = 6;

/// The shared, read-only inputs of a computation.
#[derive(Debug, Clone, Copy)]
pub struct CalculationContext<'a> {
    /// Rate tables for the period's tax year.
    pub tables: &'a RateTables,
    /// Engine-wide settings.
    pub settings: &'a EngineSettings,
    /// Currency results are rounded to.
    pub currency: &'a Currency,
    /// The period being computed.
    pub period: PayPeriod,
}

/// Computes one employee's payroll for the context's period.
///
/// `adjustments` may contain entries for other employees and periods; only the
/// employee's adjustments dated in the period apply. `ytd` holds the employee's
/// totals from earlier months of the same tax year.
///
/// # Errors
///
/// - `InvalidCategory` if the social security or maternity fund table has no
///   rate for the employee's category
/// - `InvalidTaxComputation` if there is no bracket table for the employee's mode
/// - `InvariantViolation` if the computed result is inconsistent
pub fn calculate_payroll(
    ctx: &CalculationContext<'_>,
    employee: &Employee,
    adjustments: &[Adjustment],
    ytd: &YearToDate,
) -> EngineResult<PayrollResult> {
    let period = &ctx.period;
    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings = Vec::new();
    let mut step_number: u32 = 1;

    let time_worked = calculate_time_worked(employee, period, step_number);
    steps.push(time_worked.audit_step.clone());
    step_number += 1;

    let hours = calculate_hours_factor(employee, ctx.settings, step_number);
    let factor = hours.factor;
    steps.push(hours.audit_step);
    step_number += 1;

    let basic_pay = calculate_basic_pay(employee, factor, time_worked.fraction, step_number);
    steps.push(basic_pay.audit_step.clone());
    step_number += 1;

    let adjusted = apply_adjustments(&employee.id, period, adjustments, step_number);
    steps.push(adjusted.audit_step.clone());
    step_number += 1;

    let bonus = calculate_statutory_bonus(
        employee,
        ctx.tables.bonus_schedule(),
        period,
        factor,
        step_number,
    )?;
    steps.push(bonus.audit_step.clone());
    step_number += 1;

    let gross_pay =
        basic_pay.amount + adjusted.work_log_pay + adjusted.manual_adjustments + bonus.amount;
    let untaxed_bonus = if ctx.settings.statutory_bonus_taxable {
        Decimal::ZERO
    } else {
        bonus.amount
    };
    let taxable_income = gross_pay - untaxed_bonus;

    let (projected_annual_taxable, tax) = if employee.tax_computation.is_part_time() {
        let tax = calculate_part_time_tax(taxable_income, ctx.settings, step_number);
        (taxable_income, tax)
    } else {
        let table = ctx
            .tables
            .income_tax_brackets(&employee.id, employee.tax_computation)?;
        let future_taxable = future_taxable_income(
            employee,
            ctx.tables,
            ctx.settings,
            period,
            basic_pay.monthly_salary,
            factor,
        );
        let projection = project_annual_taxable(
            employee,
            period,
            ytd,
            taxable_income,
            future_taxable,
            step_number,
        );
        steps.push(projection.audit_step);
        warnings.extend(projection.warning);
        step_number += 1;

        let remaining_months = remaining_employed_months(employee, period);
        let tax = calculate_income_tax(
            employee,
            table,
            projection.projected_annual_taxable,
            ytd,
            time_worked.fraction,
            remaining_months,
            step_number,
        );
        (projection.projected_annual_taxable, tax)
    };
    steps.push(tax.audit_step.clone());
    step_number += 1;

    let social_security = calculate_social_security(
        employee,
        ctx.tables,
        factor,
        time_worked.contribution_weeks,
        step_number,
    )?;
    steps.push(social_security.audit_step.clone());
    step_number += 1;

    let maternity = calculate_maternity_fund(
        employee,
        ctx.tables,
        factor,
        time_worked.contribution_weeks,
        step_number,
    )?;
    steps.push(maternity.audit_step.clone());

    let weeks = Decimal::from(time_worked.contribution_weeks);
    check_unrounded(
        employee,
        tax.amount,
        social_security.employee_contribution,
        social_security.weekly_cap * weeks,
        social_security.employer_contribution,
        social_security.employer_weekly_cap * weeks,
        maternity.amount,
    )?;

    let currency = ctx.currency;
    let basic_pay_rounded = currency.round(basic_pay.amount);
    let work_log_pay = currency.round(adjusted.work_log_pay);
    let manual_adjustments = currency.round(adjusted.manual_adjustments);
    let statutory_bonus = currency.round(bonus.amount);
    let gross_pay = basic_pay_rounded + work_log_pay + manual_adjustments + statutory_bonus;
    let taxable_income = if ctx.settings.statutory_bonus_taxable {
        gross_pay
    } else {
        gross_pay - statutory_bonus
    };
    let income_tax = currency.round(tax.amount);
    let employee_contribution = currency.round(social_security.employee_contribution);
    let employer_contribution = currency.round(social_security.employer_contribution);
    let maternity_fund_contribution = currency.round(maternity.amount);
    let reimbursements = currency.round(adjusted.reimbursements);
    let net_pay = gross_pay - income_tax - employee_contribution + reimbursements;
    let tax_due =
        income_tax + employee_contribution + employer_contribution + maternity_fund_contribution;

    let result = PayrollResult {
        employee_id: employee.id.clone(),
        employee_name: employee.name(),
        period: *period,
        currency: currency.clone(),
        tax_computation: employee.tax_computation,
        social_security_category: employee.social_security_category.clone(),
        employment_start: employee.start_date,
        employment_end: employee.end_date,
        time_worked: time_worked.fraction.round_dp(FRACTION_DP),
        active_days: time_worked.active_days,
        contribution_weeks: time_worked.contribution_weeks,
        weekly_wage: currency.round(social_security.weekly_wage),
        weekly_contribution_cap: currency.round(social_security.weekly_cap),
        basic_pay: basic_pay_rounded,
        work_log_pay,
        manual_adjustments,
        statutory_bonus,
        gross_pay,
        taxable_income,
        projected_annual_taxable: currency.round(projected_annual_taxable),
        annual_tax_liability: currency.round(tax.annual_liability),
        income_tax,
        employee_contribution,
        employer_contribution,
        maternity_fund_contribution,
        reimbursements,
        net_pay,
        tax_due,
        audit_trace: AuditTrace { steps, warnings },
    };

    if !result.net_pay_identity_holds() {
        return Err(EngineError::InvariantViolation {
            employee_id: employee.id.clone(),
            message: "net pay does not equal gross less deductions plus reimbursements"
                .to_string(),
        });
    }

    debug!(
        employee_id = %employee.id,
        period = %period.label(),
        gross_pay = %result.gross_pay,
        income_tax = %result.income_tax,
        net_pay = %result.net_pay,
        "Computed payroll"
    );

    Ok(result)
}

fn check_unrounded(
    employee: &Employee,
    income_tax: Decimal,
    employee_contribution: Decimal,
    employee_limit: Decimal,
    employer_contribution: Decimal,
    employer_limit: Decimal,
    maternity_fund: Decimal,
) -> EngineResult<()> {
    let violation = |message: &str| EngineError::InvariantViolation {
        employee_id: employee.id.clone(),
        message: message.to_string(),
    };
    if income_tax < Decimal::ZERO {
        return Err(violation("income tax is negative"));
    }
    if employee_contribution < Decimal::ZERO
        || employer_contribution < Decimal::ZERO
        || maternity_fund < Decimal::ZERO
    {
        return Err(violation("a contribution is negative"));
    }
    if employee_contribution > employee_limit {
        return Err(violation("employee contribution exceeds the weekly cap"));
    }
    if employer_contribution > employer_limit {
        return Err(violation("employer contribution exceeds the weekly cap"));
    }
    Ok(())
}
