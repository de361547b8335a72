//! Organisation metadata.
//!
//! The paying organisation appears on every payslip and regulatory form; its
//! currency decides the rounding of every amount in a run.

use serde::{Deserialize, Serialize};

use super::Currency;
use crate::error::{EngineError, EngineResult};

/// The employer running the payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organisation {
    /// Legal name of the organisation.
    pub name: String,
    /// Postal address.
    pub address: String,
    /// Postcode.
    pub postcode: String,
    /// Company registration number.
    pub registration_number: String,
    /// Tax identification number.
    pub tax_number: String,
    /// Employer number used on FS3/FS5/FS7 forms.
    pub employer_number: String,
    /// Contact telephone number.
    #[serde(default)]
    pub telephone_number: Option<String>,
    /// Name of the manager who signs the forms.
    pub manager_name: String,
    /// Role of the manager who signs the forms.
    pub manager_role: String,
    /// Currency all payments are made in.
    pub currency: Currency,
}

impl Organisation {
    /// Validates required fields.
    pub fn validate(&self) -> EngineResult<()> {
        let required = [
            ("name", &self.name),
            ("registration_number", &self.registration_number),
            ("tax_number", &self.tax_number),
            ("employer_number", &self.employer_number),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(EngineError::InvalidSettings {
                    field: format!("organisation.{}", field),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}
