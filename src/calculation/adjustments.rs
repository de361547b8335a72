//! One-off adjustments for a pay period.

use rust_decimal::Decimal;

use crate::models::{Adjustment, AuditStep, PayPeriod};

/// The adjustments of one employee in one period, summed by kind.
#[derive(Debug, Clone)]
pub struct AdjustmentsResult {
    /// Taxable manual adjustments.
    pub manual_adjustments: Decimal,
    /// Untaxed reimbursements.
    pub reimbursements: Decimal,
    /// Pay from work logs.
    pub work_log_pay: Decimal,
    /// Hours from work logs.
    pub work_log_hours: Decimal,
    /// Number of adjustments applied.
    pub count: usize,
    /// The audit step recording which adjustments applied.
    pub audit_step: AuditStep,
}

/// Sums the adjustments dated within `period` for `employee_id`.
///
/// Adjustments for other employees or dated outside the period are ignored.
pub fn apply_adjustments(
    employee_id: &str,
    period: &PayPeriod,
    adjustments: &[Adjustment],
    step_number: u32,
) -> AdjustmentsResult {
    let mut manual_adjustments = Decimal::ZERO;
    let mut reimbursements = Decimal::ZERO;
    let mut work_log_pay = Decimal::ZERO;
    let mut work_log_hours = Decimal::ZERO;
    let mut count = 0;

    for adjustment in adjustments
        .iter()
        .filter(|a| a.applies_to(employee_id, period))
    {
        count += 1;
        match adjustment {
            Adjustment::ManualAdjustment { value, .. } => manual_adjustments += *value,
            Adjustment::Reimbursement { value, .. } => reimbursements += *value,
            Adjustment::WorkLog { hours, .. } => {
                work_log_hours += *hours;
                work_log_pay += adjustment.value();
            }
        }
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "adjustments".to_string(),
        rule_name: "Adjustments".to_string(),
        table_ref: None,
        input: serde_json::json!({
            "employee_id": employee_id,
            "period": period.label(),
            "candidates": adjustments.len(),
        }),
        output: serde_json::json!({
            "applied": count,
            "manual_adjustments": manual_adjustments.to_string(),
            "reimbursements": reimbursements.to_string(),
            "work_log_hours": work_log_hours.to_string(),
            "work_log_pay": work_log_pay.to_string(),
        }),
        reasoning: if count == 0 {
            format!("No adjustments dated in {}", period.label())
        } else {
            format!("{} adjustment(s) dated in {}", count, period.label())
        },
    };

    AdjustmentsResult {
        manual_adjustments,
        reimbursements,
        work_log_pay,
        work_log_hours,
        count,
        audit_step,
    }
}
