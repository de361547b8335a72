//! Progressive income tax bracket tables.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::RawTaxBracket;
use crate::error::{EngineError, EngineResult};

/// One bracket of a progressive income tax table.
///
/// The bracket covers incomes above the previous bracket's upper bound up to and
/// including its own. Tax on an income in the bracket is
/// `income * rate - subtract`, never below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxBracket {
    /// Inclusive upper bound, or `None` for the unbounded top bracket.
    pub upper_bound: Option<Decimal>,
    /// Marginal rate in `[0, 1]`.
    pub rate: Decimal,
    /// Amount subtracted from `income * rate`.
    pub subtract: Decimal,
}

impl TaxBracket {
    /// Creates a bracket.
    pub fn new(upper_bound: Option<Decimal>, rate: Decimal, subtract: Decimal) -> Self {
        Self {
            upper_bound,
            rate,
            subtract,
        }
    }

    /// Tax on `income` under this bracket's formula.
    pub fn tax_on(&self, income: Decimal) -> Decimal {
        (income.max(Decimal::ZERO) * self.rate - self.subtract).max(Decimal::ZERO)
    }
}

impl From<RawTaxBracket> for TaxBracket {
    fn from(raw: RawTaxBracket) -> Self {
        Self::new(raw.upper_bound, raw.rate, raw.subtract)
    }
}

/// A validated income tax table for one computation mode.
///
/// # Example
///
/// ```
/// use payroll_engine::tables::{IncomeTaxTable, TaxBracket};
/// use rust_decimal::Decimal;
///
/// let table = IncomeTaxTable::new(
///     "single",
///     vec![
///         TaxBracket::new(Some(Decimal::from(9100)), Decimal::ZERO, Decimal::ZERO),
///         TaxBracket::new(None, Decimal::new(15, 2), Decimal::from(1365)),
///     ],
/// )
/// .unwrap();
/// assert_eq!(table.tax_on(Decimal::from(9100)), Decimal::ZERO);
/// assert_eq!(table.tax_on(Decimal::from(10100)), Decimal::from(150));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeTaxTable {
    name: String,
    brackets: Vec<TaxBracket>,
}

impl IncomeTaxTable {
    /// Validates and builds a table.
    ///
    /// Brackets must be in ascending order of upper bound, only the last may be
    /// unbounded, rates must lie in `[0, 1]` and subtraction constants must not
    /// be negative. At every boundary the next bracket must not give less tax
    /// than the bracket ending there, which keeps tax non-decreasing in income.
    pub fn new(name: impl Into<String>, brackets: Vec<TaxBracket>) -> EngineResult<Self> {
        let name = name.into();
        let invalid = |message: String| EngineError::InvalidRateTable {
            table: format!("income_tax.{}", name),
            message,
        };

        let Some(last) = brackets.last() else {
            return Err(invalid("table has no brackets".to_string()));
        };
        if last.upper_bound.is_some() {
            return Err(invalid("last bracket must have no upper bound".to_string()));
        }

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(invalid(format!(
                    "bracket {} rate {} is outside [0, 1]",
                    index, bracket.rate
                )));
            }
            if bracket.subtract < Decimal::ZERO {
                return Err(invalid(format!(
                    "bracket {} subtract {} is negative",
                    index, bracket.subtract
                )));
            }
        }

        let mut previous_bound: Option<Decimal> = None;
        for (index, pair) in brackets.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            let Some(bound) = current.upper_bound else {
                return Err(invalid(format!(
                    "bracket {} has no upper bound but is not the last",
                    index
                )));
            };
            if bound < Decimal::ZERO {
                return Err(invalid(format!("bracket {} upper bound is negative", index)));
            }
            if previous_bound.is_some_and(|previous| bound <= previous) {
                return Err(invalid(format!(
                    "bracket {} upper bound {} is not above the previous bound",
                    index, bound
                )));
            }
            if next.tax_on(bound) < current.tax_on(bound) {
                return Err(invalid(format!(
                    "tax drops at the {} boundary ({} to {})",
                    bound,
                    current.tax_on(bound),
                    next.tax_on(bound)
                )));
            }
            previous_bound = Some(bound);
        }

        Ok(Self { name, brackets })
    }

    /// Returns the table's name (its computation mode).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the brackets in ascending order.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Finds the bracket that applies to `income`.
    ///
    /// An income exactly on a boundary uses the bracket ending at that boundary.
    /// Negative income is treated as zero.
    pub fn bracket_for(&self, income: Decimal) -> &TaxBracket {
        let income = income.max(Decimal::ZERO);
        let index = self
            .brackets
            .partition_point(|b| b.upper_bound.is_some_and(|upper| upper < income));
        // The last bracket is unbounded, so the index is always in range.
        &self.brackets[index]
    }

    /// Annual tax on `income`.
    pub fn tax_on(&self, income: Decimal) -> Decimal {
        self.bracket_for(income).tax_on(income)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::str::FromStr;

    fn bracket(upper: Option<&str>, rate: &str, subtract: &str) -> TaxBracket {
        TaxBracket::new(
            upper.map(|u| Decimal::from_str(u).unwrap()),
            Decimal::from_str(rate).unwrap(),
            Decimal::from_str(subtract).unwrap(),
        )
    }

    /// The 2024 single-rates table of the sample data.
    pub fn single_table() -> IncomeTaxTable {
        IncomeTaxTable::new(
            "single",
            vec![
                bracket(Some("9100"), "0", "0"),
                bracket(Some("14500"), "0.15", "1365"),
                bracket(Some("19500"), "0.25", "2815"),
                bracket(Some("60000"), "0.25", "2725"),
                bracket(None, "0.35", "8725"),
            ],
        )
        .unwrap()
    }

    /// The 2024 married-rates table of the sample data.
    pub fn married_table() -> IncomeTaxTable {
        IncomeTaxTable::new(
            "married",
            vec![
                bracket(Some("12700"), "0", "0"),
                bracket(Some("21200"), "0.15", "1905"),
                bracket(Some("28700"), "0.25", "4025"),
                bracket(Some("60000"), "0.25", "3905"),
                bracket(None, "0.35", "9905"),
            ],
        )
        .unwrap()
    }
}
