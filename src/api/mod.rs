//! HTTP API module for the Payroll Engine.
//!
//! This module provides the REST API endpoints for running payroll and
//! aggregating results into the FS3/FS5/FS7 totals.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{PaymentsRequest, ReportsRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
