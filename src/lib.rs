//! Monthly payroll engine.
//!
//! This crate computes monthly payroll under a progressive income tax regime
//! with weekly social security contributions, an employer maternity fund
//! contribution and a statutory bonus, and aggregates the results into the
//! FS3, FS5 and FS7 regulatory totals.

#![warn(missing_docs)]

pub mod aggregation;
pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tables;
