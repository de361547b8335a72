//! Statutory bonus schedule.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::Month;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::RawBonusEntry;
use crate::error::{EngineError, EngineResult};

/// A bonus paid in a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BonusEntry {
    /// Calendar month (1-12).
    pub month: u32,
    /// Full-time, full-tenure bonus amount.
    pub bonus: Decimal,
}

impl TryFrom<RawBonusEntry> for BonusEntry {
    type Error = EngineError;

    fn try_from(raw: RawBonusEntry) -> Result<Self, Self::Error> {
        let month = Month::from_str(raw.month.trim()).map_err(|_| EngineError::InvalidRateTable {
            table: "statutory_bonus".to_string(),
            message: format!("unknown month '{}'", raw.month),
        })?;
        Ok(Self {
            month: month.number_from_month(),
            bonus: raw.bonus,
        })
    }
}

/// The months in which a statutory bonus is paid and the amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BonusSchedule {
    entries: BTreeMap<u32, Decimal>,
}

impl BonusSchedule {
    /// Validates and builds a schedule. Months must be unique and bonuses
    /// non-negative.
    pub fn new(entries: Vec<BonusEntry>) -> EngineResult<Self> {
        let invalid = |message: String| EngineError::InvalidRateTable {
            table: "statutory_bonus".to_string(),
            message,
        };
        let mut by_month = BTreeMap::new();
        for entry in entries {
            if !(1..=12).contains(&entry.month) {
                return Err(invalid(format!("month {} is not in 1-12", entry.month)));
            }
            if entry.bonus < Decimal::ZERO {
                return Err(invalid(format!("bonus for month {} is negative", entry.month)));
            }
            if by_month.insert(entry.month, entry.bonus).is_some() {
                return Err(invalid(format!("month {} appears more than once", entry.month)));
            }
        }
        Ok(Self { entries: by_month })
    }

    /// Returns the bonus paid in `month`, if any.
    pub fn bonus_for(&self, month: u32) -> Option<Decimal> {
        self.entries.get(&month).copied()
    }

    /// Iterates over the entries in month order.
    pub fn entries(&self) -> impl Iterator<Item = BonusEntry> + '_ {
        self.entries
            .iter()
            .map(|(&month, &bonus)| BonusEntry { month, bonus })
    }
}
