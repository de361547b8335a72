//! FS3: the per-employee annual summary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::PayrollResult;

/// Contributions paid at one weekly wage and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionLine {
    /// The weekly wage contributions were assessed on.
    pub weekly_wage: Decimal,
    /// The social security category.
    pub category: String,
    /// Number of contribution weeks.
    pub contribution_weeks: u32,
    /// Social security paid by the employee.
    pub employee_contribution: Decimal,
    /// Social security paid by the employer.
    pub employer_contribution: Decimal,
    /// Employee plus employer contributions.
    pub total_contribution: Decimal,
    /// Maternity fund contributions.
    pub maternity_fund: Decimal,
}

impl ContributionLine {
    fn empty(weekly_wage: Decimal, category: &str) -> Self {
        Self {
            weekly_wage,
            category: category.to_string(),
            contribution_weeks: 0,
            employee_contribution: Decimal::ZERO,
            employer_contribution: Decimal::ZERO,
            total_contribution: Decimal::ZERO,
            maternity_fund: Decimal::ZERO,
        }
    }

    fn key(&self) -> (Decimal, &str) {
        (self.weekly_wage, self.category.as_str())
    }

    fn add(&mut self, other: &ContributionLine) {
        self.contribution_weeks += other.contribution_weeks;
        self.employee_contribution += other.employee_contribution;
        self.employer_contribution += other.employer_contribution;
        self.total_contribution += other.total_contribution;
        self.maternity_fund += other.maternity_fund;
    }
}

impl From<&PayrollResult> for ContributionLine {
    fn from(result: &PayrollResult) -> Self {
        Self {
            weekly_wage: result.weekly_wage,
            category: result.social_security_category.clone(),
            contribution_weeks: result.contribution_weeks,
            employee_contribution: result.employee_contribution,
            employer_contribution: result.employer_contribution,
            total_contribution: result.employee_contribution + result.employer_contribution,
            maternity_fund: result.maternity_fund_contribution,
        }
    }
}

/// One employee's emoluments, tax and contributions for a tax year.
///
/// Results of employees on the part-time computation count as part-time
/// emoluments and tax; every other mode counts as full-time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fs3Summary {
    /// The payee.
    pub employee_id: String,
    /// The payee's name as of the latest payment included.
    pub employee_name: String,
    /// The tax year.
    pub year: i32,
    /// First day of employment within the year.
    pub period_start: NaiveDate,
    /// Last day of employment within the year.
    pub period_end: NaiveDate,
    /// Number of payments included.
    pub payments: u32,
    /// Month of the latest payment included.
    pub last_paid_month: u32,
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
    pub income_tax_total: Decimal,
    /// Contributions, ordered by weekly wage and category.
    pub contributions: Vec<ContributionLine>,
    /// Social security paid by the employee.
    pub total_employee_contributions: Decimal,
    /// Social security paid by the employer.
    pub total_employer_contributions: Decimal,
    /// Employee plus employer social security.
    pub total_contributions: Decimal,
    /// Maternity fund contributions.
    pub total_maternity_fund: Decimal,
}

impl Fs3Summary {
    /// Starts an empty summary for the employee of `result`.
    pub fn for_employee(result: &PayrollResult) -> Self {
        let year = result.period.year;
        let (period_start, period_end) = employment_within_year(result, year);
        Self {
            employee_id: result.employee_id.clone(),
            employee_name: result.employee_name.clone(),
            year,
            period_start,
            period_end,
            payments: 0,
            last_paid_month: result.period.month,
            gross_full_time: Decimal::ZERO,
            gross_part_time: Decimal::ZERO,
            gross_total: Decimal::ZERO,
            income_tax_full_time: Decimal::ZERO,
            income_tax_part_time: Decimal::ZERO,
            income_tax_total: Decimal::ZERO,
            contributions: Vec::new(),
            total_employee_contributions: Decimal::ZERO,
            total_employer_contributions: Decimal::ZERO,
            total_contributions: Decimal::ZERO,
            total_maternity_fund: Decimal::ZERO,
        }
    }

    /// Adds one payment.
    pub fn add(&mut self, result: &PayrollResult) {
        let (start, end) = employment_within_year(result, self.year);
        self.period_start = self.period_start.min(start);
        self.period_end = self.period_end.max(end);
        self.payments += 1;
        self.take_name(result.period.month, &result.employee_name);

        if result.is_part_time() {
            self.gross_part_time += result.gross_pay;
            self.income_tax_part_time += result.income_tax;
        } else {
            self.gross_full_time += result.gross_pay;
            self.income_tax_full_time += result.income_tax;
        }
        self.gross_total += result.gross_pay;
        self.income_tax_total += result.income_tax;

        self.add_line(&ContributionLine::from(result));
        self.total_employee_contributions += result.employee_contribution;
        self.total_employer_contributions += result.employer_contribution;
        self.total_contributions += result.employee_contribution + result.employer_contribution;
        self.total_maternity_fund += result.maternity_fund_contribution;
    }

    /// Folds another summary of the same employee and year into this one.
    pub fn merge(&mut self, other: &Fs3Summary) {
        self.period_start = self.period_start.min(other.period_start);
        self.period_end = self.period_end.max(other.period_end);
        self.payments += other.payments;
        self.take_name(other.last_paid_month, &other.employee_name);
        self.gross_full_time += other.gross_full_time;
        self.gross_part_time += other.gross_part_time;
        self.gross_total += other.gross_total;
        self.income_tax_full_time += other.income_tax_full_time;
        self.income_tax_part_time += other.income_tax_part_time;
        self.income_tax_total += other.income_tax_total;
        for line in &other.contributions {
            self.add_line(line);
        }
        self.total_employee_contributions += other.total_employee_contributions;
        self.total_employer_contributions += other.total_employer_contributions;
        self.total_contributions += other.total_contributions;
        self.total_maternity_fund += other.total_maternity_fund;
    }

    // Ties within a month go to the greater name so the fold order never matters.
    fn take_name(&mut self, month: u32, name: &str) {
        if (month, name) > (self.last_paid_month, self.employee_name.as_str()) {
            self.last_paid_month = month;
            self.employee_name = name.to_string();
        }
    }

    fn add_line(&mut self, line: &ContributionLine) {
        match self
            .contributions
            .binary_search_by(|existing| existing.key().cmp(&line.key()))
        {
            Ok(index) => self.contributions[index].add(line),
            Err(index) => {
                let mut entry = ContributionLine::empty(line.weekly_wage, &line.category);
                entry.add(line);
                self.contributions.insert(index, entry);
            }
        }
    }
}

fn employment_within_year(result: &PayrollResult, year: i32) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(result.period.start_date);
    let last = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(result.period.end_date);
    let start = result.employment_start.max(first);
    let end = result.employment_end.map_or(last, |end| end.min(last));
    (start, end)
}
