//! Integration tests for the Payroll Engine.
//!
//! This test suite runs the engine against the sample data directory:
//! - Single month runs through the library
//! - Multi-month runs with stored history
//! - Regulatory totals over stored results
//! - The HTTP API
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tempfile::TempDir;
use tower::ServiceExt;

use payroll_engine::aggregation::aggregate;
use payroll_engine::api::{AppState, create_router};
use payroll_engine::calculation::{
    EmployeeFailure, PayrollInput, PayrollRun, RunStatus, run_payroll,
};
use payroll_engine::config::ConfigLoader;
use payroll_engine::error::ErrorKind;
use payroll_engine::models::{PayPeriod, PayrollResult, TaxComputation};
use payroll_engine::store::{PaymentStore, ReportWriter};

// =============================================================================
// Test Helpers
// =============================================================================

const SAMPLE_DIR: &str = "./data/sample";

fn load_sample() -> ConfigLoader {
    ConfigLoader::load(SAMPLE_DIR, 2024).expect("Failed to load sample data")
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sample_input(loader: &ConfigLoader, month: u32, history: Vec<PayrollResult>) -> PayrollInput {
    PayrollInput {
        period: PayPeriod::month(2024, month).unwrap(),
        employees: loader.load_employees().unwrap().employees,
        adjustments: loader.load_adjustments().unwrap(),
        history,
        rejected: Vec::new(),
    }
}

fn result_for<'a>(run: &'a PayrollRun, employee_id: &str) -> &'a PayrollResult {
    run.results
        .iter()
        .find(|r| r.employee_id == employee_id)
        .unwrap_or_else(|| panic!("no result for {}", employee_id))
}

/// Runs January to `last_month`, storing each month before running the next.
fn run_months(store: &PaymentStore, last_month: u32) -> Vec<PayrollRun> {
    let loader = load_sample();
    (1..=last_month)
        .map(|month| {
            let history = store.load_year(2024).unwrap();
            let run = run_payroll(loader.config(), &sample_input(&loader, month, history))
                .unwrap();
            store.save(&run.results).unwrap();
            run
        })
        .collect()
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let path = entry.unwrap().path();
        let target = to.join(path.file_name().unwrap());
        if path.is_dir() {
            copy_dir(&path, &target);
        } else {
            fs::copy(&path, &target).unwrap();
        }
    }
}

fn create_router_for_test() -> Router {
    create_router(AppState::new(load_sample().into_config()))
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn assert_amount(value: &Value, expected: &str) {
    let actual = Decimal::from_str(value.as_str().unwrap()).unwrap();
    assert_eq!(actual, decimal(expected), "Expected {}, got {}", expected, actual);
}

// =============================================================================
// Single Month Runs
// =============================================================================

#[test]
fn test_january_sample_run() {
    let loader = load_sample();
    let run = run_payroll(loader.config(), &sample_input(&loader, 1, Vec::new())).unwrap();

    assert_eq!(run.status(), RunStatus::Complete);
    assert_eq!(run.results.len(), 4);
    assert_eq!(run.skipped, vec!["emp-002"]);

    let maria = result_for(&run, "emp-001");
    assert_eq!(maria.gross_pay, decimal("2000.00"));
    assert_eq!(maria.annual_tax_liability, decimal("3275.00"));
    assert_eq!(maria.income_tax, decimal("272.92"));
    assert_eq!(maria.contribution_weeks, 5);
    assert_eq!(maria.employee_contribution, decimal("230.77"));
    assert_eq!(maria.maternity_fund_contribution, decimal("6.92"));
    assert_eq!(maria.net_pay, decimal("1496.31"));
}

#[test]
fn test_every_result_satisfies_net_identity() {
    let loader = load_sample();
    for month in 1..=12 {
        let run = run_payroll(loader.config(), &sample_input(&loader, month, Vec::new())).unwrap();
        for result in &run.results {
            assert!(
                result.net_pay_identity_holds(),
                "net identity broken for {} in {}",
                result.employee_id,
                month
            );
        }
    }
}

#[test]
fn test_march_adjustments_and_bonus() {
    let loader = load_sample();
    let run = run_payroll(loader.config(), &sample_input(&loader, 3, Vec::new())).unwrap();

    let maria = result_for(&run, "emp-001");
    assert_eq!(maria.manual_adjustments, decimal("150.00"));
    assert_eq!(maria.reimbursements, decimal("42.30"));
    assert_eq!(maria.statutory_bonus, decimal("121.16"));
    assert_eq!(maria.taxable_income, maria.gross_pay - maria.statutory_bonus);

    let daniel = result_for(&run, "emp-004");
    assert_eq!(daniel.tax_computation, TaxComputation::PartTime);
    assert_eq!(daniel.work_log_pay, decimal("310.00"));
    assert_eq!(daniel.income_tax, decimal("46.50"));
    assert_eq!(daniel.employee_contribution, Decimal::ZERO);
}

#[test]
fn test_leaver_paid_to_end_date() {
    let loader = load_sample();
    let run = run_payroll(loader.config(), &sample_input(&loader, 3, Vec::new())).unwrap();

    let ritienne = result_for(&run, "emp-005");
    assert_eq!(ritienne.active_days, 15);
    assert_eq!(ritienne.basic_pay, decimal("1129.03"));
    assert!(ritienne.statutory_bonus < decimal("121.16"));

    let april = run_payroll(loader.config(), &sample_input(&loader, 4, Vec::new())).unwrap();
    assert!(april.skipped.contains(&"emp-005".to_string()));
}

#[test]
fn test_joiner_flagged_without_prior_information() {
    let loader = load_sample();
    let run = run_payroll(loader.config(), &sample_input(&loader, 4, Vec::new())).unwrap();

    // emp-002 declares earlier emoluments, so no warning is raised.
    let joseph = result_for(&run, "emp-002");
    assert!(joseph.audit_trace.warnings.is_empty());
    assert!(joseph.time_worked < Decimal::ONE);
}

// =============================================================================
// Multi-Month Runs
// =============================================================================

#[test]
fn test_stored_history_feeds_later_months() {
    let dir = TempDir::new().unwrap();
    let store = PaymentStore::new(dir.path());

    let runs = run_months(&store, 3);

    let february = result_for(&runs[1], "emp-001");
    assert_eq!(february.income_tax, decimal("272.92"));

    let fs3 = runs[2].totals.fs3_for("emp-001").unwrap();
    assert_eq!(fs3.payments, 3);
    let paid: Decimal = runs
        .iter()
        .map(|run| result_for(run, "emp-001").income_tax)
        .sum();
    assert_eq!(fs3.income_tax_total, paid);
}

#[test]
fn test_totals_match_stored_results() {
    let dir = TempDir::new().unwrap();
    let store = PaymentStore::new(dir.path());
    run_months(&store, 3);

    let stored = store.load_year(2024).unwrap();
    let totals = aggregate(&stored, &PayPeriod::month(2024, 12).unwrap());

    let gross: Decimal = stored.iter().map(|r| r.gross_pay).sum();
    let tax: Decimal = stored.iter().map(|r| r.income_tax).sum();
    assert_eq!(totals.fs7.gross_total, gross);
    assert_eq!(totals.fs7.total_tax_deductions, tax);
    assert_eq!(totals.fs7.fs3_count as usize, totals.fs3.len());
    assert_eq!(totals.fs5.payees(), 0);
}

#[test]
fn test_revert_and_rerun_month() {
    let dir = TempDir::new().unwrap();
    let store = PaymentStore::new(dir.path());
    let runs = run_months(&store, 2);

    let february = PayPeriod::month(2024, 2).unwrap();
    assert_eq!(store.revert(&february).unwrap(), runs[1].results.len());
    assert!(store.load_month(&february).unwrap().is_empty());

    let loader = load_sample();
    let history = store.load_year(2024).unwrap();
    let rerun = run_payroll(loader.config(), &sample_input(&loader, 2, history)).unwrap();
    assert_eq!(rerun.results, runs[1].results);
}

#[test]
fn test_rerun_drops_result_of_newly_failing_employee() {
    let dir = TempDir::new().unwrap();
    let store = PaymentStore::new(dir.path());
    run_months(&store, 2);

    let february = PayPeriod::month(2024, 2).unwrap();
    let loader = load_sample();
    let mut input = sample_input(&loader, 2, store.load_year(2024).unwrap());
    input.employees[0].social_security_category = "Z".to_string();
    let rerun = run_payroll(loader.config(), &input).unwrap();
    assert_eq!(rerun.failures[0].employee_id, "emp-001");

    store.replace_month(&february, &rerun.results).unwrap();

    let stored = store.load_month(&february).unwrap();
    assert_eq!(stored, rerun.results);
    assert!(stored.iter().all(|r| r.employee_id != "emp-001"));

    let totals = aggregate(&store.load_year(2024).unwrap(), &february);
    assert_eq!(totals.fs3_for("emp-001").unwrap().payments, 1);
}

#[test]
fn test_report_files_written() {
    let dir = TempDir::new().unwrap();
    let store = PaymentStore::new(dir.path());
    let runs = run_months(&store, 1);

    let writer = ReportWriter::new(dir.path());
    let fs3 = writer.write_fs3(&runs[0].totals).unwrap();
    let fs5 = writer.write_fs5(&runs[0].totals).unwrap();

    assert_eq!(fs3.len(), 4);
    assert!(fs5.exists());
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn test_unknown_category_fails_one_employee() {
    let loader = load_sample();
    let mut input = sample_input(&loader, 1, Vec::new());
    input.employees[0].social_security_category = "Z".to_string();

    let run = run_payroll(loader.config(), &input).unwrap();

    assert_eq!(run.results.len(), 3);
    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].employee_id, "emp-001");
    assert_eq!(run.failures[0].kind, ErrorKind::Lookup);
}

#[test]
fn test_broken_employee_file_fails_only_that_employee() {
    let dir = TempDir::new().unwrap();
    copy_dir(Path::new(SAMPLE_DIR), dir.path());
    fs::write(
        dir.path().join("employees").join("emp-003.yaml"),
        "id: emp-003\nfirst_name: Claire\nhours_per_week: twenty\n",
    )
    .unwrap();

    let loader = ConfigLoader::load(dir.path(), 2024).unwrap();
    let records = loader.load_employees().unwrap();
    let input = PayrollInput {
        period: PayPeriod::month(2024, 1).unwrap(),
        employees: records.employees,
        adjustments: loader.load_adjustments().unwrap(),
        history: Vec::new(),
        rejected: records.rejected.iter().map(EmployeeFailure::from).collect(),
    };

    let run = run_payroll(loader.config(), &input).unwrap();

    assert_eq!(run.results.len(), 3);
    assert!(run.results.iter().all(|r| r.employee_id != "emp-003"));
    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].employee_id, "emp-003");
    assert_eq!(run.failures[0].kind, ErrorKind::Validation);
    assert_eq!(run.status(), RunStatus::Partial { failed: 1 });
}

#[test]
fn test_missing_year_tables() {
    let result = ConfigLoader::load(SAMPLE_DIR, 2031);
    assert!(result.is_err());
    assert_eq!(
        result.unwrap_err().kind(),
        ErrorKind::Configuration
    );
}

// =============================================================================
// HTTP API
// =============================================================================

#[tokio::test]
async fn test_api_payments_and_reports() {
    let loader = load_sample();
    let body = json!({
        "year": 2024,
        "month": 1,
        "employees": loader.load_employees().unwrap().employees,
    });

    let (status, run) = post_json(create_router_for_test(), "/payments", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["results"].as_array().unwrap().len(), 4);
    assert_amount(&run["results"][0]["income_tax"], "272.92");
    assert_eq!(run["engine_version"], env!("CARGO_PKG_VERSION"));

    let (status, totals) = post_json(
        create_router_for_test(),
        "/reports",
        json!({
            "year": 2024,
            "month": 1,
            "results": run["results"],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(totals["fs5"]["payees_full_time"], 3);
    assert_eq!(totals["fs5"]["payees_part_time"], 1);
    assert_eq!(totals, run["totals"]);
}

#[tokio::test]
async fn test_api_invalid_employee_reported_as_failure() {
    let body = json!({
        "year": 2024,
        "month": 1,
        "employees": [{
            "id": "emp-100",
            "first_name": "Test",
            "surname": "Person",
            "hours_per_week": "40",
            "tax_computation": "single",
            "social_security_category": "C/D #2",
            "gross_annual_salary": "-100",
            "start_date": "2020-01-01"
        }]
    });

    let (status, run) = post_json(create_router_for_test(), "/payments", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["failures"][0]["kind"], "validation");
    assert!(run["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_api_unknown_tax_computation_returns_400() {
    let body = json!({
        "year": 2024,
        "month": 1,
        "employees": [{
            "id": "emp-100",
            "first_name": "Test",
            "surname": "Person",
            "hours_per_week": "40",
            "tax_computation": "widowed",
            "social_security_category": "C/D #2",
            "gross_annual_salary": "24000",
            "start_date": "2020-01-01"
        }]
    });

    let (status, error) = post_json(create_router_for_test(), "/payments", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MALFORMED_JSON");
}
