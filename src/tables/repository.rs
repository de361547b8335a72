//! The bundle of rate tables for one tax year.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use super::{BonusEntry, BonusSchedule, ContributionRate, ContributionTable, IncomeTaxTable, TaxBracket};
use crate::config::RawRateTables;
use crate::error::{EngineError, EngineResult};
use crate::models::TaxComputation;

/// Every rate table a payroll run reads, for a single tax year.
///
/// Tables are validated when the bundle is built and never change afterwards;
/// runs only ever borrow them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTables {
    year: i32,
    income_tax: HashMap<TaxComputation, IncomeTaxTable>,
    social_security: ContributionTable,
    maternity_fund: Option<ContributionTable>,
    statutory_bonus: BonusSchedule,
}

impl RateTables {
    /// Bundles already validated tables.
    pub fn new(
        year: i32,
        income_tax: HashMap<TaxComputation, IncomeTaxTable>,
        social_security: ContributionTable,
        maternity_fund: Option<ContributionTable>,
        statutory_bonus: BonusSchedule,
    ) -> Self {
        Self {
            year,
            income_tax,
            social_security,
            maternity_fund,
            statutory_bonus,
        }
    }

    /// Returns the tax year the tables apply to.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Fails with `TableYearMismatch` unless the tables are for `period_year`.
    pub fn ensure_year(&self, period_year: i32) -> EngineResult<()> {
        if self.year != period_year {
            return Err(EngineError::TableYearMismatch {
                tables_year: self.year,
                period_year,
            });
        }
        Ok(())
    }

    /// Returns the bracket table for an employee's computation mode.
    ///
    /// Returns `InvalidTaxComputation` if no table was loaded for the mode.
    pub fn income_tax_brackets(
        &self,
        employee_id: &str,
        mode: TaxComputation,
    ) -> EngineResult<&IncomeTaxTable> {
        self.income_tax
            .get(&mode)
            .ok_or_else(|| EngineError::InvalidTaxComputation {
                employee_id: employee_id.to_string(),
                mode: mode.to_string(),
            })
    }

    /// Returns the social security rate for an employee's category.
    ///
    /// Returns `InvalidCategory` if the category is unknown.
    pub fn contribution_rate(
        &self,
        employee_id: &str,
        category: &str,
    ) -> EngineResult<&ContributionRate> {
        self.social_security.lookup(employee_id, category)
    }

    /// Returns the maternity fund rate for an employee's category, or `None`
    /// when no maternity fund table was loaded.
    pub fn maternity_rate(
        &self,
        employee_id: &str,
        category: &str,
    ) -> EngineResult<Option<&ContributionRate>> {
        self.maternity_fund
            .as_ref()
            .map(|table| table.lookup(employee_id, category))
            .transpose()
    }

    /// Returns the statutory bonus schedule.
    pub fn bonus_schedule(&self) -> &BonusSchedule {
        &self.statutory_bonus
    }

    /// Returns the social security table.
    pub fn social_security(&self) -> &ContributionTable {
        &self.social_security
    }

    /// Returns the maternity fund table, if loaded.
    pub fn maternity_fund(&self) -> Option<&ContributionTable> {
        self.maternity_fund.as_ref()
    }
}

impl TryFrom<RawRateTables> for RateTables {
    type Error = EngineError;

    fn try_from(raw: RawRateTables) -> Result<Self, Self::Error> {
        let mut income_tax = HashMap::new();
        for (mode, rows) in raw.income_tax {
            let computation =
                TaxComputation::from_str(&mode).map_err(|message| EngineError::InvalidRateTable {
                    table: "income_tax".to_string(),
                    message,
                })?;
            if computation.is_part_time() {
                return Err(EngineError::InvalidRateTable {
                    table: format!("income_tax.{}", mode),
                    message: "part-time income is taxed at the flat part_time_tax_rate setting, \
                              not by brackets"
                        .to_string(),
                });
            }
            let brackets = rows.into_iter().map(TaxBracket::from).collect();
            income_tax.insert(computation, IncomeTaxTable::new(computation.as_str(), brackets)?);
        }

        let social_security = ContributionTable::new(
            "social_security",
            raw.social_security.into_iter().map(ContributionRate::from).collect(),
        )?;

        let maternity_fund = raw
            .maternity_fund
            .map(|rows| {
                ContributionTable::new(
                    "maternity_fund",
                    rows.into_iter().map(ContributionRate::from).collect(),
                )
            })
            .transpose()?;

        let entries = raw
            .statutory_bonus
            .into_iter()
            .map(BonusEntry::try_from)
            .collect::<EngineResult<Vec<_>>>()?;
        let statutory_bonus = BonusSchedule::new(entries)?;

        debug!(
            year = raw.year,
            income_tax_tables = income_tax.len(),
            maternity_fund = maternity_fund.is_some(),
            "Validated rate tables"
        );

        Ok(Self::new(
            raw.year,
            income_tax,
            social_security,
            maternity_fund,
            statutory_bonus,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RawBonusEntry, RawContributionRate, RawTaxBracket};
    use crate::tables::RateType;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn raw_tables() -> RawRateTables {
        let mut income_tax = BTreeMap::new();
        income_tax.insert(
            "single".to_string(),
            vec![
                RawTaxBracket {
                    upper_bound: Some(dec("9100")),
                    rate: dec("0"),
                    subtract: dec("0"),
                },
                RawTaxBracket {
                    upper_bound: None,
                    rate: dec("0.15"),
                    subtract: dec("1365"),
                },
            ],
        );
        RawRateTables {
            year: 2024,
            income_tax,
            social_security: vec![RawContributionRate {
                category: "C/D #2".to_string(),
                rate_type: RateType::Percentage,
                rate_value: dec("0.10"),
                maximum_value: dec("54.43"),
                employer_rate_value: None,
                employer_maximum_value: None,
            }],
            maternity_fund: None,
            statutory_bonus: vec![RawBonusEntry {
                month: "june".to_string(),
                bonus: dec("135.10"),
            }],
        }
    }

    #[test]
    fn test_build_from_raw_rows() {
        let tables = RateTables::try_from(raw_tables()).unwrap();
        assert_eq!(tables.year(), 2024);
        assert!(tables.income_tax_brackets("emp-001", TaxComputation::Single).is_ok());
        assert_eq!(tables.bonus_schedule().bonus_for(6), Some(dec("135.10")));
        assert!(tables.maternity_rate("emp-001", "C/D #2").unwrap().is_none());
    }

    #[test]
    fn test_missing_mode_is_a_lookup_failure() {
        let tables = RateTables::try_from(raw_tables()).unwrap();
        match tables.income_tax_brackets("emp-002", TaxComputation::Married) {
            Err(EngineError::InvalidTaxComputation { employee_id, mode }) => {
                assert_eq!(employee_id, "emp-002");
                assert_eq!(mode, "married");
            }
            other => panic!("Expected InvalidTaxComputation, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_mode_key_is_rejected() {
        let mut raw = raw_tables();
        raw.income_tax.insert("widowed".to_string(), vec![]);
        assert!(matches!(
            RateTables::try_from(raw),
            Err(EngineError::InvalidRateTable { .. })
        ));
    }

    #[test]
    fn test_part_time_bracket_table_is_rejected() {
        let mut raw = raw_tables();
        let single = raw.income_tax["single"].clone();
        raw.income_tax.insert("parttime".to_string(), single);
        match RateTables::try_from(raw) {
            Err(EngineError::InvalidRateTable { table, .. }) => {
                assert_eq!(table, "income_tax.parttime");
            }
            other => panic!("Expected InvalidRateTable, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_year() {
        let tables = RateTables::try_from(raw_tables()).unwrap();
        assert!(tables.ensure_year(2024).is_ok());
        assert!(matches!(
            tables.ensure_year(2025),
            Err(EngineError::TableYearMismatch {
                tables_year: 2024,
                period_year: 2025
            })
        ));
    }

    #[test]
    fn test_maternity_category_lookup() {
        let mut raw = raw_tables();
        raw.maternity_fund = Some(vec![RawContributionRate {
            category: "C/D #2".to_string(),
            rate_type: RateType::Percentage,
            rate_value: dec("0.003"),
            maximum_value: dec("1.44"),
            employer_rate_value: None,
            employer_maximum_value: None,
        }]);
        let tables = RateTables::try_from(raw).unwrap();
        assert!(tables.maternity_rate("emp-001", "C/D #2").unwrap().is_some());
        assert!(matches!(
            tables.maternity_rate("emp-001", "F"),
            Err(EngineError::InvalidCategory { .. })
        ));
    }
}
