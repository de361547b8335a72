//! Time worked within a pay period.
//!
//! This module measures how much of a period an employee was employed for:
//! active days, the fraction of the period they represent, and the number of
//! contribution weeks (Mondays) inside the employment.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{AuditStep, Employee, PayPeriod, count_mondays, days_inclusive};

/// The result of measuring time worked in a period.
#[derive(Debug, Clone)]
pub struct TimeWorkedResult {
    /// Days employed within the period.
    pub active_days: i64,
    /// Days in the period.
    pub period_days: i64,
    /// `active_days / period_days`, unrounded.
    pub fraction: Decimal,
    /// Mondays employed within the period.
    pub contribution_weeks: u32,
    /// The audit step recording this measurement.
    pub audit_step: AuditStep,
}

/// Returns the employed part of `period`, if any.
pub fn employment_overlap(employee: &Employee, period: &PayPeriod) -> Option<(NaiveDate, NaiveDate)> {
    let from = employee.employed_from(period.start_date);
    let until = employee.employed_until(period.end_date);
    (from <= until).then_some((from, until))
}

/// Fraction of `period` the employee is employed for.
pub fn employment_fraction(employee: &Employee, period: &PayPeriod) -> Decimal {
    match employment_overlap(employee, period) {
        Some((from, until)) => {
            Decimal::from(days_inclusive(from, until)) / Decimal::from(period.days())
        }
        None => Decimal::ZERO,
    }
}

/// Measures the time an employee worked in `period`.
///
/// An employee who starts and leaves within the period is counted from the
/// start date to the end date, both inclusive.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_time_worked;
/// use payroll_engine::models::{Employee, PayPeriod, TaxComputation};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp-005".to_string(),
///     first_name: "Ritienne".to_string(),
///     surname: "Grech".to_string(),
///     registration_number: None,
///     social_security_number: None,
///     hours_per_week: Decimal::from(40),
///     tax_computation: TaxComputation::Single,
///     social_security_category: "E".to_string(),
///     gross_annual_salary: Decimal::from(28000),
///     start_date: NaiveDate::from_ymd_opt(2021, 5, 3).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 3, 15),
///     prior_tax_information: None,
/// };
/// let period = PayPeriod::month(2024, 3).unwrap();
///
/// let result = calculate_time_worked(&employee, &period, 1);
/// assert_eq!(result.active_days, 15);
/// assert_eq!(result.contribution_weeks, 2);
/// ```
pub fn calculate_time_worked(
    employee: &Employee,
    period: &PayPeriod,
    step_number: u32,
) -> TimeWorkedResult {
    let period_days = period.days();
    let overlap = employment_overlap(employee, period);

    let (active_days, contribution_weeks) = match overlap {
        Some((from, until)) => (days_inclusive(from, until), count_mondays(from, until)),
        None => (0, 0),
    };
    let fraction = Decimal::from(active_days) / Decimal::from(period_days);

    let reasoning = match overlap {
        Some(_) if active_days == period_days => format!(
            "Employed for the whole of {} ({} days, {} contribution weeks)",
            period.label(),
            period_days,
            contribution_weeks
        ),
        Some((from, until)) => format!(
            "Employed from {} to {}: {} of {} days, {} contribution weeks",
            from, until, active_days, period_days, contribution_weeks
        ),
        None => format!("Not employed during {}", period.label()),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "time_worked".to_string(),
        rule_name: "Time Worked".to_string(),
        table_ref: None,
        input: serde_json::json!({
            "period_start": period.start_date.to_string(),
            "period_end": period.end_date.to_string(),
            "employment_start": employee.start_date.to_string(),
            "employment_end": employee.end_date.map(|d| d.to_string()),
        }),
        output: serde_json::json!({
            "active_days": active_days,
            "period_days": period_days,
            "fraction": fraction.round_dp(6).to_string(),
            "contribution_weeks": contribution_weeks,
        }),
        reasoning,
    };

    TimeWorkedResult {
        active_days,
        period_days,
        fraction,
        contribution_weeks,
        audit_step,
    }
}
