//! Currency and rounding.
//!
//! Amounts are plain [`Decimal`]s throughout the engine. The [`Currency`] of a
//! run decides how many minor units an amount keeps once it leaves the engine.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rounding applied at the output boundary (round half to even).
pub const ROUNDING_STRATEGY: RoundingStrategy = RoundingStrategy::MidpointNearestEven;

/// ISO 4217 currencies with no minor unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "UYI", "VND",
    "VUV", "XAF", "XOF", "XPF",
];

/// ISO 4217 currencies with three minor-unit digits.
const THREE_DECIMAL_CURRENCIES: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

/// An ISO 4217 currency code together with its minor-unit precision.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let eur = Currency::from_str("EUR").unwrap();
/// assert_eq!(eur.minor_units(), 2);
/// assert_eq!(eur.round(Decimal::from_str("272.91666").unwrap()).to_string(), "272.92");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency {
    code: String,
    minor_units: u32,
}

impl Currency {
    /// The euro, the sample organisation's currency.
    pub fn eur() -> Self {
        Self {
            code: "EUR".to_string(),
            minor_units: 2,
        }
    }

    /// Returns the three-letter currency code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the number of decimal places of the currency's minor unit.
    pub fn minor_units(&self) -> u32 {
        self.minor_units
    }

    /// Rounds an amount to the currency's minor unit with a fixed scale.
    pub fn round(&self, amount: Decimal) -> Decimal {
        let mut rounded = amount.round_dp_with_strategy(self.minor_units, ROUNDING_STRATEGY);
        rounded.rescale(self.minor_units);
        rounded
    }

    /// Rounds an amount to whole currency units.
    pub fn round_whole(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(0, ROUNDING_STRATEGY)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::eur()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(format!(
                "'{}' is not an ISO 4217 code (three uppercase letters)",
                s
            ));
        }

        let minor_units = if ZERO_DECIMAL_CURRENCIES.contains(&code) {
            0
        } else if THREE_DECIMAL_CURRENCIES.contains(&code) {
            3
        } else {
            2
        };

        Ok(Self {
            code: code.to_string(),
            minor_units,
        })
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code)
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Currency::from_str(&code).map_err(serde::de::Error::custom)
    }
}
