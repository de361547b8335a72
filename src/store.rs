//! Persistence of payroll results and reports.
//!
//! Results are stored as one YAML file per employee and period under
//! `payments/<year>/<year>-<mm>/<employee>.yaml`, and read back as the
//! history of later runs and as the input of the regulatory reports.
//! Reports are written under `reports/<year>/`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregation::OrganisationTotals;
use crate::config::{load_yaml, yaml_files};
use crate::error::{EngineError, EngineResult};
use crate::models::{PayPeriod, PayrollResult};

/// Stores payroll results below a data directory.
#[derive(Debug, Clone)]
pub struct PaymentStore {
    root: PathBuf,
}

impl PaymentStore {
    /// Creates a store for the `payments` directory of `data_dir`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            root: data_dir.as_ref().join("payments"),
        }
    }

    /// Returns the directory holding the results of `period`.
    pub fn month_dir(&self, period: &PayPeriod) -> PathBuf {
        self.root
            .join(period.year.to_string())
            .join(period.label())
    }

    /// Writes every result to its period's directory, replacing any earlier
    /// file of the same employee and period.
    pub fn save(&self, results: &[PayrollResult]) -> EngineResult<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(results.len());
        for result in results {
            let dir = self.month_dir(&result.period);
            let path = dir.join(format!("{}.yaml", result.employee_id));
            create_dir(&dir)?;
            write_yaml(&path, result)?;
            written.push(path);
        }
        info!(count = written.len(), "Stored payroll results");
        Ok(written)
    }

    /// Replaces everything stored for `period` with `results`.
    ///
    /// Employees stored by an earlier run of the period but absent from
    /// `results` are removed, so a rerun never leaves a stale result behind.
    pub fn replace_month(
        &self,
        period: &PayPeriod,
        results: &[PayrollResult],
    ) -> EngineResult<Vec<PathBuf>> {
        if let Some(other) = results.iter().find(|r| r.period != *period) {
            return Err(EngineError::InvalidPeriod {
                year: other.period.year,
                month: other.period.month,
            });
        }
        let removed = self.revert(period)?;
        if removed > 0 {
            warn!(period = %period.label(), removed, "Replacing stored payments");
        }
        self.save(results)
    }

    /// Loads the stored results of one period.
    ///
    /// A period without stored results yields an empty list.
    pub fn load_month(&self, period: &PayPeriod) -> EngineResult<Vec<PayrollResult>> {
        let dir = self.month_dir(period);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        yaml_files(&dir)?
            .iter()
            .map(|path| load_yaml::<PayrollResult>(path))
            .collect()
    }

    /// Loads every stored result of a tax year, in period order.
    pub fn load_year(&self, year: i32) -> EngineResult<Vec<PayrollResult>> {
        let mut results = Vec::new();
        for month in 1..=12 {
            let period = PayPeriod::month(year, month)?;
            results.extend(self.load_month(&period)?);
        }
        debug!(year, count = results.len(), "Loaded stored results");
        Ok(results)
    }

    /// Deletes the stored results of a period and returns how many were removed.
    pub fn revert(&self, period: &PayPeriod) -> EngineResult<usize> {
        let dir = self.month_dir(period);
        if !dir.is_dir() {
            return Ok(0);
        }
        let files = yaml_files(&dir)?;
        for path in &files {
            fs::remove_file(path).map_err(|e| output_error(path, e))?;
        }
        fs::remove_dir(&dir).map_err(|e| output_error(&dir, e))?;
        info!(period = %period.label(), count = files.len(), "Reverted payroll results");
        Ok(files.len())
    }
}

/// Writes report files below a data directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    root: PathBuf,
}

impl ReportWriter {
    /// Creates a writer for the `reports` directory of `data_dir`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            root: data_dir.as_ref().join("reports"),
        }
    }

    /// Writes one FS3 file per employee.
    pub fn write_fs3(&self, totals: &OrganisationTotals) -> EngineResult<Vec<PathBuf>> {
        let dir = self.year_dir(totals.year)?;
        totals
            .fs3
            .iter()
            .map(|summary| {
                let path = dir.join(format!("{}-fs3-{}.yaml", totals.year, summary.employee_id));
                write_yaml(&path, summary).map(|_| path)
            })
            .collect()
    }

    /// Writes the FS5 file of the totals' month.
    pub fn write_fs5(&self, totals: &OrganisationTotals) -> EngineResult<PathBuf> {
        let dir = self.year_dir(totals.year)?;
        let path = dir.join(format!("{}-{:02}-fs5.yaml", totals.year, totals.month));
        write_yaml(&path, &totals.fs5)?;
        Ok(path)
    }

    /// Writes the FS7 file of the totals' year.
    pub fn write_fs7(&self, totals: &OrganisationTotals) -> EngineResult<PathBuf> {
        let dir = self.year_dir(totals.year)?;
        let path = dir.join(format!("{}-fs7.yaml", totals.year));
        write_yaml(&path, &totals.fs7)?;
        Ok(path)
    }

    fn year_dir(&self, year: i32) -> EngineResult<PathBuf> {
        let dir = self.root.join(year.to_string());
        create_dir(&dir)?;
        Ok(dir)
    }
}

fn create_dir(dir: &Path) -> EngineResult<()> {
    fs::create_dir_all(dir).map_err(|e| output_error(dir, e))
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> EngineResult<()> {
    let content = serde_yaml::to_string(value).map_err(|e| EngineError::OutputError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    fs::write(path, content).map_err(|e| output_error(path, e))?;
    debug!(path = %path.display(), "Wrote file");
    Ok(())
}

fn output_error(path: &Path, error: std::io::Error) -> EngineError {
    EngineError::OutputError {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}
