//! Income tax calculation.
//!
//! Progressive modes spread the tax on a projection of the whole year's taxable
//! income over the months that remain, after deducting what has already been
//! withheld. The part-time mode withholds a flat rate on the period's taxable
//! income.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::config::EngineSettings;
use crate::models::{AuditStep, AuditWarning, Employee, PayPeriod, YearToDate};
use crate::tables::{IncomeTaxTable, RateTables};

use super::statutory_bonus::bonus_for_period;
use super::time_worked::employment_fraction;

/// Warning code for a joiner without tax information from earlier employment.
pub const NO_PRIOR_TAX_INFORMATION: &str = "NO_PRIOR_TAX_INFORMATION";

/// The projection of an employee's taxable income over the tax year.
#[derive(Debug, Clone)]
pub struct TaxProjectionResult {
    /// Projected taxable income for the whole year.
    pub projected_annual_taxable: Decimal,
    /// Warning raised when earlier employment is unaccounted for.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this projection.
    pub audit_step: AuditStep,
}

/// The result of an income tax calculation.
#[derive(Debug, Clone)]
pub struct IncomeTaxResult {
    /// Tax due on the projected annual income, net of earlier employment's tax.
    pub annual_liability: Decimal,
    /// Tax withheld for the period.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Taxable income expected from the months after `period`.
///
/// Each later month contributes the monthly salary weighted by the fraction of
/// it the employee is employed for, plus its statutory bonus when bonuses are
/// taxable.
pub fn future_taxable_income(
    employee: &Employee,
    tables: &RateTables,
    settings: &EngineSettings,
    period: &PayPeriod,
    monthly_salary: Decimal,
    hours_factor: Decimal,
) -> Decimal {
    period
        .remaining_in_year()
        .iter()
        .map(|month| {
            let salary = monthly_salary * employment_fraction(employee, month);
            let bonus = if settings.statutory_bonus_taxable {
                bonus_for_period(employee, tables.bonus_schedule(), month, hours_factor)
            } else {
                Decimal::ZERO
            };
            salary + bonus
        })
        .sum()
}

/// Months after `period` the employee is employed for, each weighted by the
/// fraction of it employed.
///
/// A leaver has no weight past the end date, so the last month worked
/// withholds whatever of the annual liability is still owed.
pub fn remaining_employed_months(employee: &Employee, period: &PayPeriod) -> Decimal {
    period
        .remaining_in_year()
        .iter()
        .map(|month| employment_fraction(employee, month))
        .sum()
}

/// Projects the employee's taxable income for the whole tax year.
///
/// The projection is the earlier employment's emoluments, plus the taxable
/// income already paid this year, the current period's and the later months'.
pub fn project_annual_taxable(
    employee: &Employee,
    period: &PayPeriod,
    ytd: &YearToDate,
    current_taxable: Decimal,
    future_taxable: Decimal,
    step_number: u32,
) -> TaxProjectionResult {
    let prior_gross_emoluments = employee
        .prior_tax_information
        .as_ref()
        .map_or(Decimal::ZERO, |prior| prior.gross_emoluments);

    let projected_annual_taxable =
        prior_gross_emoluments + ytd.taxable_income + current_taxable + future_taxable;

    let warning = joined_without_prior_information(employee, period.year).then(|| AuditWarning {
        code: NO_PRIOR_TAX_INFORMATION.to_string(),
        message: format!(
            "Employee {} started on {} without tax information from earlier employment; \
             the projection starts from zero",
            employee.id, employee.start_date
        ),
        severity: "medium".to_string(),
    });

    let audit_step = AuditStep {
        step_number,
        rule_id: "annual_tax_projection".to_string(),
        rule_name: "Annual Taxable Income Projection".to_string(),
        table_ref: None,
        input: serde_json::json!({
            "prior_gross_emoluments": prior_gross_emoluments.to_string(),
            "year_to_date_taxable": ytd.taxable_income.to_string(),
            "current_taxable": current_taxable.round_dp(6).to_string(),
            "future_taxable": future_taxable.round_dp(6).to_string(),
        }),
        output: serde_json::json!({
            "projected_annual_taxable": projected_annual_taxable.round_dp(6).to_string(),
        }),
        reasoning: format!(
            "Prior {} + paid to date {} + this period {} + later months {}",
            prior_gross_emoluments,
            ytd.taxable_income,
            current_taxable.round_dp(2),
            future_taxable.round_dp(2)
        ),
    };

    TaxProjectionResult {
        projected_annual_taxable,
        warning,
        audit_step,
    }
}

fn joined_without_prior_information(employee: &Employee, year: i32) -> bool {
    let year_start = NaiveDate::from_ymd_opt(year, 1, 1);
    employee.prior_tax_information.is_none()
        && employee.start_date.year() == year
        && year_start.is_some_and(|start| employee.start_date > start)
}

/// Calculates progressive income tax for the period.
///
/// The annual liability is the table's tax on the projected income less tax
/// withheld by earlier employment. What remains after the tax already withheld
/// this year is spread over the period and the months still to be worked, in
/// proportion to time worked.
pub fn calculate_income_tax(
    employee: &Employee,
    table: &IncomeTaxTable,
    projected_annual_taxable: Decimal,
    ytd: &YearToDate,
    time_worked: Decimal,
    remaining_months: Decimal,
    step_number: u32,
) -> IncomeTaxResult {
    let prior_income_tax = employee
        .prior_tax_information
        .as_ref()
        .map_or(Decimal::ZERO, |prior| prior.income_tax);

    let bracket = table.bracket_for(projected_annual_taxable);
    let bracket_tax = bracket.tax_on(projected_annual_taxable);
    let annual_liability = (bracket_tax - prior_income_tax).max(Decimal::ZERO);
    let remaining_liability = (annual_liability - ytd.income_tax).max(Decimal::ZERO);

    let divisor = time_worked + remaining_months;
    let amount = if divisor.is_zero() {
        Decimal::ZERO
    } else {
        remaining_liability * time_worked / divisor
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax".to_string(),
        rule_name: "Income Tax".to_string(),
        table_ref: Some(format!("income_tax.{}", table.name())),
        input: serde_json::json!({
            "projected_annual_taxable": projected_annual_taxable.round_dp(6).to_string(),
            "bracket_upper_bound": bracket.upper_bound.map(|u| u.to_string()),
            "bracket_rate": bracket.rate.to_string(),
            "bracket_subtract": bracket.subtract.to_string(),
            "prior_income_tax": prior_income_tax.to_string(),
            "year_to_date_income_tax": ytd.income_tax.to_string(),
            "time_worked": time_worked.round_dp(6).to_string(),
            "remaining_months": remaining_months.round_dp(6).to_string(),
        }),
        output: serde_json::json!({
            "annual_liability": annual_liability.round_dp(6).to_string(),
            "remaining_liability": remaining_liability.round_dp(6).to_string(),
            "amount": amount.round_dp(6).to_string(),
        }),
        reasoning: format!(
            "Annual liability {} less {} withheld, spread as {}/({} + {} months)",
            annual_liability.round_dp(2),
            ytd.income_tax,
            time_worked.round_dp(4),
            time_worked.round_dp(4),
            remaining_months.round_dp(4)
        ),
    };

    IncomeTaxResult {
        annual_liability,
        amount,
        audit_step,
    }
}

/// Calculates flat-rate income tax for the part-time computation mode.
pub fn calculate_part_time_tax(
    taxable_income: Decimal,
    settings: &EngineSettings,
    step_number: u32,
) -> IncomeTaxResult {
    let amount = (taxable_income * settings.part_time_tax_rate).max(Decimal::ZERO);

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax_part_time".to_string(),
        rule_name: "Part-Time Income Tax".to_string(),
        table_ref: None,
        input: serde_json::json!({
            "taxable_income": taxable_income.round_dp(6).to_string(),
            "part_time_tax_rate": settings.part_time_tax_rate.to_string(),
        }),
        output: serde_json::json!({
            "amount": amount.round_dp(6).to_string(),
        }),
        reasoning: format!(
            "Flat {} on taxable income {}",
            settings.part_time_tax_rate,
            taxable_income.round_dp(2)
        ),
    };

    IncomeTaxResult {
        annual_liability: amount,
        amount,
        audit_step,
    }
}
