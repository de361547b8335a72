//! Statutory bonus calculation.
//!
//! A bonus month in the schedule pays the scheduled amount to employees
//! employed for the whole six-month accrual window ending at the month end.
//! Shorter tenure earns the bonus in proportion to the days employed in the
//! window, and reduced hours scale it by the hours factor.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Employee, PayPeriod};
use crate::tables::BonusSchedule;

/// Length of the bonus accrual window.
pub const BONUS_WINDOW_MONTHS: u32 = 6;

/// The result of a statutory bonus calculation.
#[derive(Debug, Clone)]
pub struct StatutoryBonusResult {
    /// The bonus paid for the period.
    pub amount: Decimal,
    /// The scheduled full bonus for the month, if it is a bonus month.
    pub scheduled: Option<Decimal>,
    /// Days employed within the accrual window.
    pub days_employed: i64,
    /// Days in the accrual window.
    pub days_in_window: i64,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Accrual of an employee over the window ending at `month_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusAccrual {
    /// Days employed within the window.
    pub days_employed: i64,
    /// Days in the window.
    pub days_in_window: i64,
}

impl BonusAccrual {
    /// Measures the accrual for the window ending at `month_end`.
    ///
    /// The window runs from the day after `month_end` minus six months up to
    /// `month_end`. The employee's start day counts, and days after the end
    /// date do not.
    pub fn measure(employee: &Employee, month_end: NaiveDate) -> Option<Self> {
        let window_start = month_end.checked_sub_months(Months::new(BONUS_WINDOW_MONTHS))?;
        let days_in_window = (month_end - window_start).num_days();
        let from = employee.employed_from(window_start.succ_opt()?);
        let until = employee.employed_until(month_end);
        let days_employed = ((until - from).num_days() + 1).clamp(0, days_in_window);
        Some(Self {
            days_employed,
            days_in_window,
        })
    }

    /// Applies the accrual to a scheduled amount.
    pub fn apply(&self, bonus: Decimal) -> Decimal {
        if self.days_employed >= self.days_in_window {
            bonus
        } else {
            bonus * Decimal::from(self.days_employed) / Decimal::from(self.days_in_window)
        }
    }
}

/// Bonus an employee earns in `period`, without an audit step.
///
/// Used to project the bonuses of later months.
pub fn bonus_for_period(
    employee: &Employee,
    schedule: &BonusSchedule,
    period: &PayPeriod,
    hours_factor: Decimal,
) -> Decimal {
    schedule
        .bonus_for(period.month)
        .and_then(|bonus| {
            BonusAccrual::measure(employee, period.end_date)
                .map(|accrual| accrual.apply(bonus) * hours_factor)
        })
        .unwrap_or(Decimal::ZERO)
}

/// Calculates the statutory bonus for a period.
///
/// Returns `InvalidPeriod` if the accrual window cannot be represented.
pub fn calculate_statutory_bonus(
    employee: &Employee,
    schedule: &BonusSchedule,
    period: &PayPeriod,
    hours_factor: Decimal,
    step_number: u32,
) -> EngineResult<StatutoryBonusResult> {
    let scheduled = schedule.bonus_for(period.month);

    let (amount, accrual) = match scheduled {
        Some(bonus) => {
            let accrual = BonusAccrual::measure(employee, period.end_date).ok_or(
                EngineError::InvalidPeriod {
                    year: period.year,
                    month: period.month,
                },
            )?;
            (accrual.apply(bonus) * hours_factor, Some(accrual))
        }
        None => (Decimal::ZERO, None),
    };

    let reasoning = match (scheduled, accrual) {
        (Some(bonus), Some(accrual)) if accrual.days_employed >= accrual.days_in_window => {
            format!(
                "Bonus month: full bonus {} x hours factor {}",
                bonus,
                hours_factor.round_dp(4)
            )
        }
        (Some(bonus), Some(accrual)) => format!(
            "Bonus month: {} x {}/{} days employed in the window x hours factor {}",
            bonus,
            accrual.days_employed,
            accrual.days_in_window,
            hours_factor.round_dp(4)
        ),
        _ => format!("No statutory bonus scheduled in {}", period.label()),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "statutory_bonus".to_string(),
        rule_name: "Statutory Bonus".to_string(),
        table_ref: Some("statutory_bonus".to_string()),
        input: serde_json::json!({
            "month": period.month,
            "scheduled_bonus": scheduled.map(|b| b.to_string()),
            "employment_start": employee.start_date.to_string(),
            "employment_end": employee.end_date.map(|d| d.to_string()),
            "hours_factor": hours_factor.round_dp(6).to_string(),
        }),
        output: serde_json::json!({
            "days_employed": accrual.map(|a| a.days_employed),
            "days_in_window": accrual.map(|a| a.days_in_window),
            "amount": amount.round_dp(6).to_string(),
        }),
        reasoning,
    };

    Ok(StatutoryBonusResult {
        amount,
        scheduled,
        days_employed: accrual.map_or(0, |a| a.days_employed),
        days_in_window: accrual.map_or(0, |a| a.days_in_window),
        audit_step,
    })
}
