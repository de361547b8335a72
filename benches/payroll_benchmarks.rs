//! Performance benchmarks for the Payroll Engine.
//!
//! - One employee through the rule pipeline
//! - A full year for one employee with growing history
//! - Monthly runs of 100 and 1000 employees
//! - The `/payments` endpoint
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use payroll_engine::api::{AppState, PaymentsRequest, create_router};
use payroll_engine::calculation::{CalculationContext, PayrollInput, calculate_payroll, run_payroll};
use payroll_engine::config::{ConfigLoader, PayrollConfig};
use payroll_engine::models::{Employee, PayPeriod, PayrollResult, TaxComputation, YearToDate};

use axum::{body::Body, http::Request};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tower::ServiceExt;

fn load_config() -> PayrollConfig {
    ConfigLoader::load("./data/sample", 2024)
        .expect("Failed to load sample data")
        .into_config()
}

/// Creates `count` employees cycling through the computation modes.
fn create_employees(count: usize) -> Vec<Employee> {
    let modes = [
        TaxComputation::Single,
        TaxComputation::Married,
        TaxComputation::Parent,
        TaxComputation::PartTime,
    ];
    (0..count)
        .map(|i| Employee {
            id: format!("emp_bench_{:04}", i),
            first_name: "Bench".to_string(),
            surname: format!("Employee {}", i),
            registration_number: None,
            social_security_number: None,
            hours_per_week: if i % 5 == 0 { Decimal::from(20) } else { Decimal::from(40) },
            tax_computation: modes[i % modes.len()],
            social_security_category: if i % 2 == 0 { "C/D #2" } else { "E" }.to_string(),
            gross_annual_salary: Decimal::from(18_000 + (i as u32 % 40) * 1_000),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
            end_date: None,
            prior_tax_information: None,
        })
        .collect()
}

fn run_month(config: &PayrollConfig, employees: &[Employee], month: u32) -> Vec<PayrollResult> {
    let input = PayrollInput {
        period: PayPeriod::month(2024, month).unwrap(),
        employees: employees.to_vec(),
        adjustments: Vec::new(),
        history: Vec::new(),
        rejected: Vec::new(),
    };
    run_payroll(config, &input).unwrap().results
}

/// Benchmark: One employee, one month.
fn bench_single_employee(c: &mut Criterion) {
    let config = load_config();
    let employee = create_employees(1).remove(0);
    let ctx = CalculationContext {
        tables: &config.tables,
        settings: &config.settings,
        currency: &config.organisation.currency,
        period: PayPeriod::month(2024, 6).unwrap(),
    };
    let ytd = YearToDate::default();

    c.bench_function("single_employee", |b| {
        b.iter(|| black_box(calculate_payroll(&ctx, black_box(&employee), &[], &ytd).unwrap()))
    });
}

/// Benchmark: December run for one employee after eleven stored months.
fn bench_december_with_history(c: &mut Criterion) {
    let config = load_config();
    let employees = create_employees(1);
    let history: Vec<PayrollResult> = (1..=11)
        .flat_map(|month| run_month(&config, &employees, month))
        .collect();
    let input = PayrollInput {
        period: PayPeriod::month(2024, 12).unwrap(),
        employees,
        adjustments: Vec::new(),
        history,
        rejected: Vec::new(),
    };

    c.bench_function("december_with_history", |b| {
        b.iter(|| black_box(run_payroll(&config, black_box(&input)).unwrap()))
    });
}

/// Benchmark: Monthly runs for growing workforces.
fn bench_batch(c: &mut Criterion) {
    let config = load_config();
    let mut group = c.benchmark_group("batch_processing");

    for count in [100usize, 1000] {
        let input = PayrollInput {
            period: PayPeriod::month(2024, 3).unwrap(),
            employees: create_employees(count),
            adjustments: Vec::new(),
            history: Vec::new(),
            rejected: Vec::new(),
        };
        if count >= 1000 {
            group.sample_size(10);
        }
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("employees", count), &input, |b, input| {
            b.iter(|| black_box(run_payroll(&config, input).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark: POST /payments for the sample workforce.
fn bench_payments_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let loader = ConfigLoader::load("./data/sample", 2024).expect("Failed to load sample data");
    let request = PaymentsRequest {
        year: 2024,
        month: 3,
        employees: loader.load_employees().unwrap().employees,
        adjustments: loader.load_adjustments().unwrap(),
        history: Vec::new(),
    };
    let body = serde_json::to_string(&request).unwrap();
    let router = create_router(AppState::new(loader.into_config()));

    c.bench_function("payments_endpoint", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/payments")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_single_employee,
    bench_december_with_history,
    bench_batch,
    bench_payments_endpoint,
);
criterion_main!(benches);
