//! Social security and maternity fund contribution tables.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RawContributionRate;
use crate::error::{EngineError, EngineResult};

/// How a weekly contribution is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateType {
    /// A flat amount per contribution week.
    #[serde(alias = "fixed")]
    Fixed,
    /// A fraction of the weekly wage.
    #[serde(alias = "Rate", alias = "rate", alias = "percentage")]
    Percentage,
}

/// The contribution rate of one social security category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionRate {
    /// The category key (e.g., "C/D #2").
    pub category: String,
    /// Whether `rate_value` is an amount or a fraction.
    pub rate_type: RateType,
    /// Employee rate: amount per week or fraction of the weekly wage.
    pub rate_value: Decimal,
    /// Employee weekly maximum at full-time hours.
    pub maximum_value: Decimal,
    /// Employer rate, if it differs from the employee's.
    pub employer_rate_value: Option<Decimal>,
    /// Employer weekly maximum, if it differs from the employee's.
    pub employer_maximum_value: Option<Decimal>,
}

impl ContributionRate {
    /// Creates a rate shared equally by employee and employer.
    pub fn symmetric(
        category: impl Into<String>,
        rate_type: RateType,
        rate_value: Decimal,
        maximum_value: Decimal,
    ) -> Self {
        Self {
            category: category.into(),
            rate_type,
            rate_value,
            maximum_value,
            employer_rate_value: None,
            employer_maximum_value: None,
        }
    }

    /// Employee weekly cap after scaling by the hours factor.
    pub fn employee_cap(&self, hours_factor: Decimal) -> Decimal {
        self.maximum_value * hours_factor
    }

    /// Employer weekly cap after scaling by the hours factor.
    pub fn employer_cap(&self, hours_factor: Decimal) -> Decimal {
        self.employer_maximum_value.unwrap_or(self.maximum_value) * hours_factor
    }

    /// Weekly employee contribution on `weekly_wage`.
    pub fn employee_weekly(&self, weekly_wage: Decimal, hours_factor: Decimal) -> Decimal {
        weekly_amount(
            self.rate_type,
            self.rate_value,
            self.employee_cap(hours_factor),
            weekly_wage,
        )
    }

    /// Weekly employer contribution on `weekly_wage`.
    pub fn employer_weekly(&self, weekly_wage: Decimal, hours_factor: Decimal) -> Decimal {
        weekly_amount(
            self.rate_type,
            self.employer_rate_value.unwrap_or(self.rate_value),
            self.employer_cap(hours_factor),
            weekly_wage,
        )
    }

    fn validate(&self, table: &str) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidRateTable {
            table: table.to_string(),
            message: format!("category '{}': {}", self.category, message),
        };
        if self.category.trim().is_empty() {
            return Err(invalid("category must not be empty".to_string()));
        }
        for (field, rate) in [
            ("rate_value", Some(self.rate_value)),
            ("employer_rate_value", self.employer_rate_value),
        ] {
            let Some(rate) = rate else { continue };
            if rate < Decimal::ZERO {
                return Err(invalid(format!("{} must not be negative", field)));
            }
            if self.rate_type == RateType::Percentage && rate > Decimal::ONE {
                return Err(invalid(format!("{} {} is outside [0, 1]", field, rate)));
            }
        }
        for (field, maximum) in [
            ("maximum_value", Some(self.maximum_value)),
            ("employer_maximum_value", self.employer_maximum_value),
        ] {
            if maximum.is_some_and(|m| m < Decimal::ZERO) {
                return Err(invalid(format!("{} must not be negative", field)));
            }
        }
        Ok(())
    }
}

fn weekly_amount(rate_type: RateType, rate: Decimal, cap: Decimal, weekly_wage: Decimal) -> Decimal {
    let uncapped = match rate_type {
        RateType::Fixed => rate,
        RateType::Percentage => weekly_wage.max(Decimal::ZERO) * rate,
    };
    uncapped.min(cap).max(Decimal::ZERO)
}

impl From<RawContributionRate> for ContributionRate {
    fn from(raw: RawContributionRate) -> Self {
        Self {
            category: raw.category,
            rate_type: raw.rate_type,
            rate_value: raw.rate_value,
            maximum_value: raw.maximum_value,
            employer_rate_value: raw.employer_rate_value,
            employer_maximum_value: raw.employer_maximum_value,
        }
    }
}

/// A validated table of contribution rates keyed by category.
///
/// # Example
///
/// ```
/// use payroll_engine::tables::{ContributionRate, ContributionTable, RateType};
/// use rust_decimal::Decimal;
///
/// let table = ContributionTable::new(
///     "social_security",
///     vec![ContributionRate::symmetric(
///         "C/D #2",
///         RateType::Percentage,
///         Decimal::new(10, 2),
///         Decimal::new(5443, 2),
///     )],
/// )
/// .unwrap();
/// let rate = table.get("C/D #2").unwrap();
/// assert_eq!(rate.employee_weekly(Decimal::from(400), Decimal::ONE), Decimal::from(40));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionTable {
    name: String,
    rates: BTreeMap<String, ContributionRate>,
}

impl ContributionTable {
    /// Validates and builds a table. Each category may appear once.
    pub fn new(name: impl Into<String>, rates: Vec<ContributionRate>) -> EngineResult<Self> {
        let name = name.into();
        let mut by_category = BTreeMap::new();
        for rate in rates {
            rate.validate(&name)?;
            if by_category.contains_key(&rate.category) {
                return Err(EngineError::InvalidRateTable {
                    table: name,
                    message: format!("category '{}' appears more than once", rate.category),
                });
            }
            by_category.insert(rate.category.clone(), rate);
        }
        if by_category.is_empty() {
            return Err(EngineError::InvalidRateTable {
                table: name,
                message: "table has no categories".to_string(),
            });
        }
        Ok(Self {
            name,
            rates: by_category,
        })
    }

    /// Returns the table's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rate for `category`, if any.
    pub fn get(&self, category: &str) -> Option<&ContributionRate> {
        self.rates.get(category)
    }

    /// Returns the rate for an employee's category.
    ///
    /// Returns `InvalidCategory` if the table has no entry for it.
    pub fn lookup(&self, employee_id: &str, category: &str) -> EngineResult<&ContributionRate> {
        self.get(category)
            .ok_or_else(|| EngineError::InvalidCategory {
                employee_id: employee_id.to_string(),
                category: category.to_string(),
            })
    }

    /// Iterates over the rates in category order.
    pub fn rates(&self) -> impl Iterator<Item = &ContributionRate> {
        self.rates.values()
    }
}
