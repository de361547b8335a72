//! Payroll runs over every employee of an organisation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregation::{OrganisationTotals, aggregate};
use crate::config::{PayrollConfig, RejectedRecord};
use crate::error::{EngineError, EngineResult, ErrorKind};
use crate::models::{Adjustment, Employee, Organisation, PayPeriod, PayrollResult, YearToDate};

use super::engine::{CalculationContext, calculate_payroll};
use super::time_worked::employment_overlap;

/// The inputs of one payroll run.
#[derive(Debug, Clone)]
pub struct PayrollInput {
    /// The period to run.
    pub period: PayPeriod,
    /// Every employee on the payroll.
    pub employees: Vec<Employee>,
    /// One-off adjustments; only those dated in the period apply.
    pub adjustments: Vec<Adjustment>,
    /// Stored results of earlier periods.
    pub history: Vec<PayrollResult>,
    /// Employee records that could not be read, reported as failures of the run.
    pub rejected: Vec<EmployeeFailure>,
}

/// An employee whose computation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFailure {
    /// The employee that failed.
    pub employee_id: String,
    /// The kind of error.
    pub kind: ErrorKind,
    /// The error message.
    pub message: String,
}

impl EmployeeFailure {
    fn new(employee_id: &str, error: &EngineError) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<&RejectedRecord> for EmployeeFailure {
    fn from(record: &RejectedRecord) -> Self {
        Self::new(&record.employee_id, &record.error)
    }
}

/// Whether every employee of a run was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every employee employed in the period was computed.
    Complete,
    /// Some employees failed.
    Partial {
        /// Number of failed employees.
        failed: usize,
    },
}

/// The outcome of a payroll run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run was computed.
    pub generated_at: DateTime<Utc>,
    /// Version of the engine that computed the run.
    pub engine_version: String,
    /// The period run.
    pub period: PayPeriod,
    /// The paying organisation.
    pub organisation: Organisation,
    /// Results of the employees computed, ordered as the input.
    pub results: Vec<PayrollResult>,
    /// Employees not employed in the period.
    pub skipped: Vec<String>,
    /// Employees whose computation failed.
    pub failures: Vec<EmployeeFailure>,
    /// Totals over this run and the earlier months of the year.
    pub totals: OrganisationTotals,
}

impl PayrollRun {
    /// Returns whether the run is complete.
    pub fn status(&self) -> RunStatus {
        if self.failures.is_empty() {
            RunStatus::Complete
        } else {
            RunStatus::Partial {
                failed: self.failures.len(),
            }
        }
    }
}

/// Runs payroll for every employee of `input`.
///
/// A failing employee is recorded in [`PayrollRun::failures`] and does not
/// stop the run. Every record in [`PayrollInput::rejected`] is reported there
/// too. Employees not employed at any point of the period are listed in
/// [`PayrollRun::skipped`].
///
/// # Errors
///
/// Returns `TableYearMismatch` if the rate tables are for a different year
/// than the period.
pub fn run_payroll(config: &PayrollConfig, input: &PayrollInput) -> EngineResult<PayrollRun> {
    let period = input.period;
    config.tables.ensure_year(period.year)?;

    info!(
        period = %period.label(),
        employees = input.employees.len(),
        rejected = input.rejected.len(),
        adjustments = input.adjustments.len(),
        "Starting payroll run"
    );

    let ctx = CalculationContext {
        tables: &config.tables,
        settings: &config.settings,
        currency: &config.organisation.currency,
        period,
    };

    let mut results = Vec::with_capacity(input.employees.len());
    let mut skipped = Vec::new();
    let mut failures = input.rejected.clone();

    for employee in &input.employees {
        if let Err(error) = employee.validate() {
            warn!(employee_id = %employee.id, error = %error, "Rejected employee record");
            failures.push(EmployeeFailure::new(&employee.id, &error));
            continue;
        }

        if employment_overlap(employee, &period).is_none() {
            debug!(employee_id = %employee.id, "Not employed in period, skipping");
            skipped.push(employee.id.clone());
            continue;
        }

        let ytd = YearToDate::from_history(&input.history, &employee.id, &period);
        match calculate_payroll(&ctx, employee, &input.adjustments, &ytd) {
            Ok(result) => results.push(result),
            Err(error) => {
                warn!(employee_id = %employee.id, error = %error, "Payroll computation failed");
                failures.push(EmployeeFailure::new(&employee.id, &error));
            }
        }
    }

    let earlier = input
        .history
        .iter()
        .filter(|r| period.follows_in_year(&r.period));
    let totals = aggregate(earlier.chain(results.iter()), &period);

    info!(
        period = %period.label(),
        computed = results.len(),
        skipped = skipped.len(),
        failed = failures.len(),
        "Finished payroll run"
    );

    Ok(PayrollRun {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        period,
        organisation: config.organisation.clone(),
        results,
        skipped,
        failures,
        totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineSettings;
    use crate::models::{Currency, TaxComputation};
    use crate::tables::test_support::single_table;
    use crate::tables::{
        BonusSchedule, ContributionRate, ContributionTable, RateTables, RateType,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_config() -> PayrollConfig {
        let social_security = ContributionTable::new(
            "social_security",
            vec![ContributionRate::symmetric(
                "C/D #2",
                RateType::Percentage,
                dec("0.003"),
                dec("1.44"),
            )],
        )
        .unwrap();
        PayrollConfig {
            organisation: Organisation {
                name: "Harbour Analytics Ltd".to_string(),
                address: "12 Quay Street".to_string(),
                postcode: "VLT 1000".to_string(),
                registration_number: "C 12345".to_string(),
                tax_number: "987654321".to_string(),
                employer_number: "E-4321".to_string(),
                telephone_number: None,
                manager_name: "Anna Vella".to_string(),
                manager_role: "Director".to_string(),
                currency: Currency::eur(),
            },
            settings: EngineSettings {
                full_time_hours_per_week: Decimal::from(40),
                part_time_tax_rate: dec("0.15"),
                statutory_bonus_taxable: false,
            },
            tables: RateTables::new(
                2024,
                HashMap::from([(TaxComputation::Single, single_table())]),
                social_security,
                None,
                BonusSchedule::default(),
            ),
        }
    }

    fn create_test_employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            first_name: "Maria".to_string(),
            surname: "Borg".to_string(),
            registration_number: None,
            social_security_number: None,
            hours_per_week: Decimal::from(40),
            tax_computation: TaxComputation::Single,
            social_security_category: "C/D #2".to_string(),
            gross_annual_salary: Decimal::from(24000),
            start_date: date(2020, 1, 6),
            end_date: None,
            prior_tax_information: None,
        }
    }

    fn input(month: u32, employees: Vec<Employee>) -> PayrollInput {
        PayrollInput {
            period: PayPeriod::month(2024, month).unwrap(),
            employees,
            adjustments: Vec::new(),
            history: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// RUN-001: An unknown category fails only that employee
    #[test]
    fn test_failure_is_isolated() {
        let mut broken = create_test_employee("emp-009");
        broken.social_security_category = "Z".to_string();
        let employees = vec![create_test_employee("emp-001"), broken];

        let run = run_payroll(&create_test_config(), &input(1, employees)).unwrap();

        assert_eq!(run.results.len(), 1);
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].employee_id, "emp-009");
        assert_eq!(run.failures[0].kind, ErrorKind::Lookup);
        assert_eq!(run.status(), RunStatus::Partial { failed: 1 });
        assert_eq!(run.totals.fs5.payees(), 1);
    }

    /// RUN-002: Tables of another year abort the run
    #[test]
    fn test_table_year_mismatch() {
        let mut run_input = input(1, vec![create_test_employee("emp-001")]);
        run_input.period = PayPeriod::month(2025, 1).unwrap();

        assert!(matches!(
            run_payroll(&create_test_config(), &run_input),
            Err(EngineError::TableYearMismatch {
                tables_year: 2024,
                period_year: 2025
            })
        ));
    }

    /// RUN-003: Employees outside the period are skipped
    #[test]
    fn test_not_employed_is_skipped() {
        let mut leaver = create_test_employee("emp-005");
        leaver.end_date = Some(date(2024, 3, 15));
        let mut joiner = create_test_employee("emp-006");
        joiner.start_date = date(2024, 6, 1);

        let run = run_payroll(&create_test_config(), &input(4, vec![leaver, joiner])).unwrap();

        assert!(run.results.is_empty());
        assert_eq!(run.skipped, vec!["emp-005", "emp-006"]);
        assert_eq!(run.status(), RunStatus::Complete);
    }

    /// RUN-004: An invalid record is reported as a validation failure
    #[test]
    fn test_invalid_employee() {
        let mut employee = create_test_employee("emp-001");
        employee.gross_annual_salary = dec("-1");

        let run = run_payroll(&create_test_config(), &input(1, vec![employee])).unwrap();

        assert_eq!(run.failures[0].kind, ErrorKind::Validation);
    }

    /// RUN-005: History feeds year-to-date tax and the FS3 totals
    #[test]
    fn test_history_carried_forward() {
        let config = create_test_config();
        let january = run_payroll(&config, &input(1, vec![create_test_employee("emp-001")]))
            .unwrap();

        let mut february_input = input(2, vec![create_test_employee("emp-001")]);
        february_input.history = january.results.clone();
        let february = run_payroll(&config, &february_input).unwrap();

        let fs3 = february.totals.fs3_for("emp-001").unwrap();
        assert_eq!(fs3.payments, 2);
        assert_eq!(fs3.income_tax_total, dec("545.84"));
        assert_eq!(february.totals.fs5.payees(), 1);
        assert_eq!(february.engine_version, env!("CARGO_PKG_VERSION"));
    }

    /// RUN-006: Unreadable records are reported alongside computed employees
    #[test]
    fn test_rejected_records_reported() {
        let mut run_input = input(1, vec![create_test_employee("emp-001")]);
        run_input.rejected = vec![EmployeeFailure {
            employee_id: "emp-003".to_string(),
            kind: ErrorKind::Validation,
            message: "Invalid employee 'emp-003' field 'record': bad date".to_string(),
        }];

        let run = run_payroll(&create_test_config(), &run_input).unwrap();

        assert_eq!(run.results.len(), 1);
        assert_eq!(run.failures, run_input.rejected);
        assert_eq!(run.status(), RunStatus::Partial { failed: 1 });
    }
}
