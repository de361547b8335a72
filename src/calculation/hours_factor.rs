//! Hours factor for reduced-hours contracts.
//!
//! Salaries, bonuses and contribution caps are quoted at full-time hours and
//! scaled by the employee's contractual hours over the full-time week.

use rust_decimal::Decimal;

use crate::config::EngineSettings;
use crate::models::{AuditStep, Employee};

/// The result of the hours factor calculation.
#[derive(Debug, Clone)]
pub struct HoursFactorResult {
    /// Contractual hours over full-time hours.
    pub factor: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the hours factor of an employee.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_hours_factor;
/// use payroll_engine::config::EngineSettings;
/// use payroll_engine::models::{Employee, TaxComputation};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let settings = EngineSettings {
///     full_time_hours_per_week: Decimal::from(40),
///     part_time_tax_rate: Decimal::new(15, 2),
///     statutory_bonus_taxable: false,
/// };
/// let employee = Employee {
///     id: "emp-003".to_string(),
///     first_name: "Claire".to_string(),
///     surname: "Farrugia".to_string(),
///     registration_number: None,
///     social_security_number: None,
///     hours_per_week: Decimal::from(20),
///     tax_computation: TaxComputation::Parent,
///     social_security_category: "C/D #2".to_string(),
///     gross_annual_salary: Decimal::from(30000),
///     start_date: NaiveDate::from_ymd_opt(2019, 9, 2).unwrap(),
///     end_date: None,
///     prior_tax_information: None,
/// };
///
/// let result = calculate_hours_factor(&employee, &settings, 2);
/// assert_eq!(result.factor, Decimal::new(5, 1));
/// ```
pub fn calculate_hours_factor(
    employee: &Employee,
    settings: &EngineSettings,
    step_number: u32,
) -> HoursFactorResult {
    let factor = employee.hours_per_week / settings.full_time_hours_per_week;

    let audit_step = AuditStep {
        step_number,
        rule_id: "hours_factor".to_string(),
        rule_name: "Hours Factor".to_string(),
        table_ref: None,
        input: serde_json::json!({
            "hours_per_week": employee.hours_per_week.to_string(),
            "full_time_hours_per_week": settings.full_time_hours_per_week.to_string(),
        }),
        output: serde_json::json!({
            "factor": factor.round_dp(6).to_string(),
        }),
        reasoning: format!(
            "{} contractual hours of a {} hour week",
            employee.hours_per_week, settings.full_time_hours_per_week
        ),
    };

    HoursFactorResult { factor, audit_step }
}
