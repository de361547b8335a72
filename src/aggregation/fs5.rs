//! FS5: the monthly withholding return.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::PayrollResult;

/// Totals withheld and due for one month.
///
/// Gross emoluments are reported in whole currency units, rounded per payee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fs5Totals {
    /// The tax year.
    pub year: i32,
    /// The month (1-12).
    pub month: u32,
    /// Payees under a full-time computation.
    pub payees_full_time: u32,
    /// Payees under the part-time computation.
    pub payees_part_time: u32,
    /// Gross emoluments under a full-time computation.
    pub gross_full_time: Decimal,
    /// Gross emoluments under the part-time computation.
    pub gross_part_time: Decimal,
    /// All gross emoluments.
    pub gross_total: Decimal,
    /// Income tax under a full-time computation.
    pub income_tax_full_time: Decimal,
    /// Income tax under the part-time computation.
    pub income_tax_part_time: Decimal,
    /// All income tax deducted.
    pub total_tax_deductions: Decimal,
    /// Employee plus employer social security.
    pub social_security_contributions: Decimal,
    /// Maternity fund contributions.
    pub maternity_fund: Decimal,
    /// Total remitted for the month.
    pub tax_due: Decimal,
}

impl Fs5Totals {
    /// Creates empty totals for a month.
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            payees_full_time: 0,
            payees_part_time: 0,
            gross_full_time: Decimal::ZERO,
            gross_part_time: Decimal::ZERO,
            gross_total: Decimal::ZERO,
            income_tax_full_time: Decimal::ZERO,
            income_tax_part_time: Decimal::ZERO,
            total_tax_deductions: Decimal::ZERO,
            social_security_contributions: Decimal::ZERO,
            maternity_fund: Decimal::ZERO,
            tax_due: Decimal::ZERO,
        }
    }

    /// Adds one payee's result.
    pub fn add(&mut self, result: &PayrollResult) {
        let gross = result.currency.round_whole(result.gross_pay);
        if result.is_part_time() {
            self.payees_part_time += 1;
            self.gross_part_time += gross;
            self.income_tax_part_time += result.income_tax;
        } else {
            self.payees_full_time += 1;
            self.gross_full_time += gross;
            self.income_tax_full_time += result.income_tax;
        }
        self.gross_total += gross;
        self.total_tax_deductions += result.income_tax;
        self.social_security_contributions +=
            result.employee_contribution + result.employer_contribution;
        self.maternity_fund += result.maternity_fund_contribution;
        self.tax_due += result.tax_due;
    }

    /// Folds totals of the same month into these.
    pub fn merge(&mut self, other: &Fs5Totals) {
        self.payees_full_time += other.payees_full_time;
        self.payees_part_time += other.payees_part_time;
        self.gross_full_time += other.gross_full_time;
        self.gross_part_time += other.gross_part_time;
        self.gross_total += other.gross_total;
        self.income_tax_full_time += other.income_tax_full_time;
        self.income_tax_part_time += other.income_tax_part_time;
        self.total_tax_deductions += other.total_tax_deductions;
        self.social_security_contributions += other.social_security_contributions;
        self.maternity_fund += other.maternity_fund;
        self.tax_due += other.tax_due;
    }

    /// Total number of payees.
    pub fn payees(&self) -> u32 {
        self.payees_full_time + self.payees_part_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaxComputation;
    use crate::models::test_support::sample_result;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// FS5-001: Gross is rounded to whole units per payee
    #[test]
    fn test_gross_rounded_per_payee() {
        let mut totals = Fs5Totals::new(2024, 3);
        totals.add(&sample_result("emp-001", 3, dec("2271.16"), dec("290.00"), dec("6.92")));
        totals.add(&sample_result("emp-002", 3, dec("1000.40"), dec("50.00"), dec("4.00")));

        assert_eq!(totals.gross_total, dec("3271"));
        assert_eq!(totals.payees(), 2);
        assert_eq!(totals.total_tax_deductions, dec("340.00"));
        assert_eq!(totals.social_security_contributions, dec("21.84"));
    }

    /// FS5-002: Part-time payees are counted separately
    #[test]
    fn test_part_time_payees() {
        let mut part = sample_result("emp-004", 2, dec("310.00"), dec("46.50"), Decimal::ZERO);
        part.tax_computation = TaxComputation::PartTime;

        let mut totals = Fs5Totals::new(2024, 2);
        totals.add(&part);
        totals.add(&sample_result("emp-001", 2, dec("2000.00"), dec("272.92"), dec("5.76")));

        assert_eq!(totals.payees_part_time, 1);
        assert_eq!(totals.payees_full_time, 1);
        assert_eq!(totals.income_tax_part_time, dec("46.50"));
        assert_eq!(totals.gross_part_time, dec("310"));
    }
}
