//! Request types for the Payroll Engine API.
//!
//! This module defines the JSON request structures for the `/payments` and
//! `/reports` endpoints.

use serde::{Deserialize, Serialize};

use crate::calculation::PayrollInput;
use crate::error::EngineResult;
use crate::models::{Adjustment, Employee, PayPeriod, PayrollResult};

/// Request body for the `/payments` endpoint.
///
/// Contains everything needed to run one month of payroll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsRequest {
    /// The tax year.
    pub year: i32,
    /// The month to run (1-12).
    pub month: u32,
    /// The employees on the payroll.
    pub employees: Vec<Employee>,
    /// One-off adjustments.
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
    /// Results of earlier months of the year.
    #[serde(default)]
    pub history: Vec<PayrollResult>,
}

impl PaymentsRequest {
    /// Converts the request into the inputs of a payroll run.
    ///
    /// Returns `InvalidPeriod` if the year and month do not name a month.
    pub fn into_input(self) -> EngineResult<PayrollInput> {
        Ok(PayrollInput {
            period: PayPeriod::month(self.year, self.month)?,
            employees: self.employees,
            adjustments: self.adjustments,
            history: self.history,
            rejected: Vec::new(),
        })
    }
}

/// Request body for the `/reports` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsRequest {
    /// The tax year.
    pub year: i32,
    /// The month to report up to (1-12).
    pub month: u32,
    /// Results to aggregate.
    pub results: Vec<PayrollResult>,
}

impl ReportsRequest {
    /// Returns the period reported on.
    pub fn period(&self) -> EngineResult<PayPeriod> {
        PayPeriod::month(self.year, self.month)
    }
}
