//! Aggregation of payroll results into regulatory totals.
//!
//! [`aggregate`] folds a set of [`PayrollResult`]s into [`OrganisationTotals`]:
//! the FS3 summary of every employee for the year to date, the FS5 return for
//! the month and the FS7 reconciliation of the FS3s. Totals are plain decimal
//! sums, so the order of the input does not matter and partial totals can be
//! combined with [`OrganisationTotals::merge`].

mod fs3;
mod fs5;
mod fs7;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{PayPeriod, PayrollResult};

pub use fs3::{ContributionLine, Fs3Summary};
pub use fs5::Fs5Totals;
pub use fs7::Fs7Totals;

/// The aggregated totals of an organisation for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganisationTotals {
    /// The tax year.
    pub year: i32,
    /// The month the totals were computed up to.
    pub month: u32,
    /// FS3 summaries, ordered by employee ID.
    pub fs3: Vec<Fs3Summary>,
    /// FS5 totals of the month.
    pub fs5: Fs5Totals,
    /// FS7 reconciliation of the FS3 summaries.
    pub fs7: Fs7Totals,
}

impl OrganisationTotals {
    /// Creates empty totals for a period.
    pub fn empty(period: &PayPeriod) -> Self {
        Self {
            year: period.year,
            month: period.month,
            fs3: Vec::new(),
            fs5: Fs5Totals::new(period.year, period.month),
            fs7: Fs7Totals::from_summaries(period.year, Vec::<&Fs3Summary>::new()),
        }
    }

    /// Combines totals aggregated from disjoint sets of results of the same
    /// period.
    pub fn merge(mut self, other: &OrganisationTotals) -> Self {
        let mut by_employee: BTreeMap<String, Fs3Summary> = self
            .fs3
            .into_iter()
            .map(|summary| (summary.employee_id.clone(), summary))
            .collect();
        for summary in &other.fs3 {
            by_employee
                .entry(summary.employee_id.clone())
                .and_modify(|existing| existing.merge(summary))
                .or_insert_with(|| summary.clone());
        }
        self.fs3 = by_employee.into_values().collect();
        self.fs5.merge(&other.fs5);
        self.fs7 = Fs7Totals::from_summaries(self.year, &self.fs3);
        self
    }

    /// Returns the FS3 summary of an employee.
    pub fn fs3_for(&self, employee_id: &str) -> Option<&Fs3Summary> {
        self.fs3.iter().find(|s| s.employee_id == employee_id)
    }
}

/// Aggregates results into the totals of `period`.
///
/// FS3 summaries include results of `period`'s year up to and including its
/// month; the FS5 includes results of exactly that month. Results of other
/// years or later months are ignored.
pub fn aggregate<'a, I>(results: I, period: &PayPeriod) -> OrganisationTotals
where
    I: IntoIterator<Item = &'a PayrollResult>,
{
    let mut fs3: BTreeMap<&str, Fs3Summary> = BTreeMap::new();
    let mut fs5 = Fs5Totals::new(period.year, period.month);

    for result in results {
        if result.period.year != period.year || result.period.month > period.month {
            continue;
        }
        fs3.entry(result.employee_id.as_str())
            .or_insert_with(|| Fs3Summary::for_employee(result))
            .add(result);
        if result.period.month == period.month {
            fs5.add(result);
        }
    }

    let fs3: Vec<Fs3Summary> = fs3.into_values().collect();
    let fs7 = Fs7Totals::from_summaries(period.year, &fs3);

    OrganisationTotals {
        year: period.year,
        month: period.month,
        fs3,
        fs5,
        fs7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::sample_result;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_history() -> Vec<PayrollResult> {
        vec![
            sample_result("emp-001", 1, dec("2000.00"), dec("272.92"), dec("6.92")),
            sample_result("emp-002", 1, dec("1500.00"), dec("120.00"), dec("4.50")),
            sample_result("emp-001", 2, dec("2000.00"), dec("272.92"), dec("5.76")),
            sample_result("emp-002", 2, dec("1500.00"), dec("120.00"), dec("3.60")),
            sample_result("emp-001", 3, dec("2121.16"), dec("272.92"), dec("5.76")),
        ]
    }

    /// AGG-001: FS3 covers the year to date and FS5 only the month
    #[test]
    fn test_year_to_date_and_month() {
        let period = PayPeriod::month(2024, 2).unwrap();
        let totals = aggregate(&sample_history(), &period);

        assert_eq!(totals.fs3.len(), 2);
        assert_eq!(totals.fs3_for("emp-001").unwrap().payments, 2);
        assert_eq!(totals.fs3_for("emp-001").unwrap().gross_total, dec("4000.00"));
        assert_eq!(totals.fs5.payees(), 2);
        assert_eq!(totals.fs5.gross_total, dec("3500"));
        assert_eq!(totals.fs7.fs3_count, 2);
        assert_eq!(totals.fs7.gross_total, dec("7000.00"));
    }

    /// AGG-002: Input order does not change the totals
    #[test]
    fn test_order_independent() {
        let period = PayPeriod::month(2024, 3).unwrap();
        let history = sample_history();
        let mut reversed = history.clone();
        reversed.reverse();

        assert_eq!(aggregate(&history, &period), aggregate(&reversed, &period));
    }

    /// AGG-003: Merging split inputs equals aggregating all of them
    #[test]
    fn test_merge_matches_single_pass() {
        let period = PayPeriod::month(2024, 3).unwrap();
        let history = sample_history();
        let (left, right) = history.split_at(2);

        let merged = aggregate(left, &period).merge(&aggregate(right, &period));

        assert_eq!(merged, aggregate(&history, &period));
    }

    #[test]
    fn test_other_years_ignored() {
        let period = PayPeriod::month(2025, 3).unwrap();
        let totals = aggregate(&sample_history(), &period);

        assert_eq!(totals, OrganisationTotals::empty(&period));
    }
}
