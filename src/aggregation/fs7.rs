//! FS7: the annual reconciliation of all FS3 summaries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fs3::Fs3Summary;

/// Sums of every FS3 summary issued for a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fs7Totals {
    /// The tax year.
    pub year: i32,
    /// Number of FS3 summaries reconciled.
    pub fs3_count: u32,
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
}

impl Fs7Totals {
    /// Reconciles a set of FS3 summaries of `year`.
    pub fn from_summaries<'a, I>(year: i32, summaries: I) -> Self
    where
        I: IntoIterator<Item = &'a Fs3Summary>,
    {
        summaries
            .into_iter()
            .fold(Self::new(year), |mut totals, summary| {
                totals.add_fs3(summary);
                totals
            })
    }

    fn new(year: i32) -> Self {
        Self {
            year,
            fs3_count: 0,
            gross_full_time: Decimal::ZERO,
            gross_part_time: Decimal::ZERO,
            gross_total: Decimal::ZERO,
            income_tax_full_time: Decimal::ZERO,
            income_tax_part_time: Decimal::ZERO,
            total_tax_deductions: Decimal::ZERO,
            social_security_contributions: Decimal::ZERO,
            maternity_fund: Decimal::ZERO,
        }
    }

    /// Adds one FS3 summary.
    pub fn add_fs3(&mut self, summary: &Fs3Summary) {
        self.fs3_count += 1;
        self.gross_full_time += summary.gross_full_time;
        self.gross_part_time += summary.gross_part_time;
        self.gross_total += summary.gross_total;
        self.income_tax_full_time += summary.income_tax_full_time;
        self.income_tax_part_time += summary.income_tax_part_time;
        self.total_tax_deductions += summary.income_tax_total;
        self.social_security_contributions += summary.total_contributions;
        self.maternity_fund += summary.total_maternity_fund;
    }
}
