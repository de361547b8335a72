//! Rate tables for income tax, social security, maternity fund and the
//! statutory bonus.
//!
//! Tables are built from the raw rows in [`crate::config`] and validated once;
//! the computation engine trusts them afterwards.

mod bonus;
mod contribution;
mod income_tax;
mod repository;

pub use bonus::{BonusEntry, BonusSchedule};
pub use contribution::{ContributionRate, ContributionTable, RateType};
pub use income_tax::{IncomeTaxTable, TaxBracket};
pub use repository::RateTables;

#[cfg(test)]
pub(crate) use income_tax::test_support;
