//! Payroll result models for the Payroll Engine.
//!
//! This module contains the [`PayrollResult`] type produced for one employee and
//! one period, the audit trace recording every rule applied while computing it,
//! and the [`YearToDate`] totals folded from earlier results.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Currency, PayPeriod, TaxComputation};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The rate table the rule read from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_ref: Option<String>,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditTrace;
///
/// let trace = AuditTrace::default();
/// assert!(trace.steps.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    #[serde(default)]
    pub warnings: Vec<AuditWarning>,
}

/// The payroll outcome for one employee in one period.
///
/// Monetary fields are rounded to the minor unit of [`PayrollResult::currency`].
/// The net pay is derived from the rounded components, so
/// `net_pay == gross_pay - income_tax - employee_contribution + reimbursements`
/// holds exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollResult {
    /// The ID of the employee the result is for.
    pub employee_id: String,
    /// The employee's display name.
    pub employee_name: String,
    /// The period the result covers.
    pub period: PayPeriod,
    /// The currency of every amount.
    pub currency: Currency,
    /// The tax computation mode applied.
    pub tax_computation: TaxComputation,
    /// The social security category applied.
    pub social_security_category: String,
    /// First day of employment.
    pub employment_start: NaiveDate,
    /// Last day of employment, if any.
    #[serde(default)]
    pub employment_end: Option<NaiveDate>,
    /// Fraction of the period the employee was employed.
    pub time_worked: Decimal,
    /// Days employed within the period.
    pub active_days: i64,
    /// Contribution weeks (Mondays employed) within the period.
    pub contribution_weeks: u32,
    /// The weekly wage contributions were assessed on.
    pub weekly_wage: Decimal,
    /// The weekly contribution cap after the hours adjustment.
    pub weekly_contribution_cap: Decimal,
    /// Salary paid for the period.
    pub basic_pay: Decimal,
    /// Pay from work logs in the period.
    pub work_log_pay: Decimal,
    /// Taxable one-off adjustments in the period.
    pub manual_adjustments: Decimal,
    /// Statutory bonus paid in the period.
    pub statutory_bonus: Decimal,
    /// Total gross emoluments for the period.
    pub gross_pay: Decimal,
    /// The part of gross pay subject to income tax.
    pub taxable_income: Decimal,
    /// Projected taxable income for the whole tax year.
    pub projected_annual_taxable: Decimal,
    /// Income tax due on the projected annual income.
    pub annual_tax_liability: Decimal,
    /// Income tax withheld this period.
    pub income_tax: Decimal,
    /// Social security paid by the employee.
    pub employee_contribution: Decimal,
    /// Social security paid by the employer.
    pub employer_contribution: Decimal,
    /// Maternity fund contribution paid by the employer.
    pub maternity_fund_contribution: Decimal,
    /// Untaxed reimbursements credited to net pay.
    pub reimbursements: Decimal,
    /// Amount paid to the employee.
    pub net_pay: Decimal,
    /// Amount remitted to the tax authority for this employee.
    pub tax_due: Decimal,
    /// Complete audit trace of calculation decisions.
    #[serde(default)]
    pub audit_trace: AuditTrace,
}

impl PayrollResult {
    /// Total income tax and employee contributions withheld.
    pub fn total_deductions(&self) -> Decimal {
        self.income_tax + self.employee_contribution
    }

    /// Returns true if the result was computed with the part-time mode.
    pub fn is_part_time(&self) -> bool {
        self.tax_computation.is_part_time()
    }

    /// Checks the net pay identity.
    pub fn net_pay_identity_holds(&self) -> bool {
        self.net_pay
            == self.gross_pay - self.income_tax - self.employee_contribution + self.reimbursements
    }
}

/// Year-to-date totals for one employee, folded from earlier results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearToDate {
    /// Number of earlier payments included.
    pub payments: u32,
    /// Gross pay to date.
    pub gross_pay: Decimal,
    /// Taxable income to date.
    pub taxable_income: Decimal,
    /// Statutory bonus to date.
    pub statutory_bonus: Decimal,
    /// Income tax withheld to date.
    pub income_tax: Decimal,
    /// Employee contributions to date.
    pub employee_contribution: Decimal,
    /// Employer contributions to date.
    pub employer_contribution: Decimal,
}

impl YearToDate {
    /// Folds the results of `employee_id` from months of `period`'s year that
    /// precede `period`.
    ///
    /// Results for other employees, other years or later months are ignored.
    pub fn from_history<'a, I>(history: I, employee_id: &str, period: &PayPeriod) -> Self
    where
        I: IntoIterator<Item = &'a PayrollResult>,
    {
        history
            .into_iter()
            .filter(|r| r.employee_id == employee_id && period.follows_in_year(&r.period))
            .fold(Self::default(), |mut ytd, r| {
                ytd.add(r);
                ytd
            })
    }

    /// Adds one result to the totals.
    pub fn add(&mut self, result: &PayrollResult) {
        self.payments += 1;
        self.gross_pay += result.gross_pay;
        self.taxable_income += result.taxable_income;
        self.statutory_bonus += result.statutory_bonus;
        self.income_tax += result.income_tax;
        self.employee_contribution += result.employee_contribution;
        self.employer_contribution += result.employer_contribution;
    }
}
