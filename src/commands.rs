//! Implementations of the command line subcommands.

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use payroll_engine::aggregation::{OrganisationTotals, aggregate};
use payroll_engine::api::{AppState, create_router};
use payroll_engine::calculation::{EmployeeFailure, PayrollInput, RunStatus, run_payroll};
use payroll_engine::config::ConfigLoader;
use payroll_engine::models::PayPeriod;
use payroll_engine::store::{PaymentStore, ReportWriter};
use tracing::info;

/// Runs payroll for a month and stores the results.
///
/// Exits with a failure status if any employee could not be computed.
pub fn payments(data_dir: &Path, year: i32, month: u32) -> Result<ExitCode> {
    let period = PayPeriod::month(year, month)?;
    let loader = ConfigLoader::load(data_dir, year)
        .with_context(|| format!("loading {}", data_dir.display()))?;
    let store = PaymentStore::new(data_dir);

    let records = loader.load_employees()?;
    let input = PayrollInput {
        period,
        employees: records.employees,
        adjustments: loader.load_adjustments()?,
        history: store.load_year(year)?,
        rejected: records.rejected.iter().map(EmployeeFailure::from).collect(),
    };
    let run = run_payroll(loader.config(), &input)?;
    store
        .replace_month(&period, &run.results)
        .context("storing payments")?;

    println!(
        "{:<12} {:<24} {:>12} {:>10} {:>10} {:>12}",
        "Employee", "Name", "Gross", "Tax", "SSC", "Net"
    );
    for result in &run.results {
        println!(
            "{:<12} {:<24} {:>12} {:>10} {:>10} {:>12}",
            result.employee_id,
            result.employee_name,
            result.gross_pay,
            result.income_tax,
            result.employee_contribution,
            result.net_pay
        );
    }
    println!(
        "{} paid, {} not employed, {} failed; tax due {}",
        run.results.len(),
        run.skipped.len(),
        run.failures.len(),
        run.totals.fs5.tax_due
    );

    for failure in &run.failures {
        eprintln!("  {}: {}", failure.employee_id, failure.message);
    }

    Ok(match run.status() {
        RunStatus::Complete => ExitCode::SUCCESS,
        RunStatus::Partial { .. } => ExitCode::FAILURE,
    })
}

/// Deletes the stored results of a month.
pub fn revert(data_dir: &Path, year: i32, month: u32) -> Result<ExitCode> {
    let period = PayPeriod::month(year, month)?;
    let removed = PaymentStore::new(data_dir).revert(&period)?;
    println!("Removed {} payment(s) for {}", removed, period.label());
    Ok(ExitCode::SUCCESS)
}

/// Writes one FS3 summary per employee paid in the year.
pub fn fs3(data_dir: &Path, year: i32) -> Result<ExitCode> {
    let totals = year_totals(data_dir, year, 12)?;
    for path in ReportWriter::new(data_dir).write_fs3(&totals)? {
        println!("Wrote {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// Writes the FS5 return of a month.
pub fn fs5(data_dir: &Path, year: i32, month: u32) -> Result<ExitCode> {
    let totals = year_totals(data_dir, year, month)?;
    let path = ReportWriter::new(data_dir).write_fs5(&totals)?;
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// Writes the FS7 reconciliation of a year.
pub fn fs7(data_dir: &Path, year: i32) -> Result<ExitCode> {
    let totals = year_totals(data_dir, year, 12)?;
    let path = ReportWriter::new(data_dir).write_fs7(&totals)?;
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// Serves the HTTP API until the process is stopped.
pub async fn serve(data_dir: &Path, year: i32, addr: SocketAddr) -> Result<ExitCode> {
    let loader = ConfigLoader::load(data_dir, year)
        .with_context(|| format!("loading {}", data_dir.display()))?;
    let router = create_router(AppState::new(loader.into_config()));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, year, "Serving payroll API");
    axum::serve(listener, router).await?;
    Ok(ExitCode::SUCCESS)
}

fn year_totals(data_dir: &Path, year: i32, month: u32) -> Result<OrganisationTotals> {
    let period = PayPeriod::month(year, month)?;
    let results = PaymentStore::new(data_dir).load_year(year)?;
    info!(year, results = results.len(), "Aggregating stored payments");
    Ok(aggregate(&results, &period))
}
