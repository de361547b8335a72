//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a payroll data
//! directory from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{Adjustment, Employee, Organisation};
use crate::tables::RateTables;

use super::types::{
    EngineSettings, PayrollConfig, RawBonusEntry, RawContributionRate, RawRateTables,
    RawTaxBracket,
};

/// An employee file that could not be read.
#[derive(Debug)]
pub struct RejectedRecord {
    /// The employee the file is named after.
    pub employee_id: String,
    /// The file that was rejected.
    pub path: PathBuf,
    /// Why it was rejected, always an `InvalidEmployee` error.
    pub error: EngineError,
}

/// The employee files of a data directory.
#[derive(Debug, Default)]
pub struct EmployeeRecords {
    /// Employees read successfully, ordered by file name.
    pub employees: Vec<Employee>,
    /// Files that could not be read as an employee.
    pub rejected: Vec<RejectedRecord>,
}

/// Loads and provides access to a payroll data directory.
///
/// # Directory Structure
///
/// ```text
/// data/sample/
/// ├── organisation.yaml
/// ├── settings.yaml
/// ├── tables/
/// │   └── 2024/
/// │       ├── income_tax.yaml
/// │       ├── social_security.yaml
/// │       ├── maternity_fund.yaml   # optional
/// │       └── statutory_bonus.yaml
/// ├── employees/                    # one employee per file
/// └── adjustments/                  # lists of adjustments
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./data/sample", 2024).unwrap();
/// println!("Organisation: {}", loader.organisation().name);
/// let records = loader.load_employees().unwrap();
/// println!("{} employees", records.employees.len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    root: PathBuf,
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads the organisation, settings and the rate tables for `year`.
    ///
    /// Returns an error if any required file is missing or contains invalid
    /// YAML, or if a table or setting fails validation.
    pub fn load<P: AsRef<Path>>(path: P, year: i32) -> EngineResult<Self> {
        let root = path.as_ref().to_path_buf();

        let organisation = load_yaml::<Organisation>(&root.join("organisation.yaml"))?;
        organisation.validate()?;

        let settings = load_yaml::<EngineSettings>(&root.join("settings.yaml"))?;
        settings.validate()?;

        let tables = Self::load_tables(root.join("tables").join(year.to_string()), year)?;

        info!(
            path = %root.display(),
            year,
            organisation = %organisation.name,
            "Loaded payroll configuration"
        );

        Ok(Self {
            root,
            config: PayrollConfig {
                organisation,
                settings,
                tables,
            },
        })
    }

    /// Loads and validates the rate tables in a `tables/<year>` directory.
    pub fn load_tables<P: AsRef<Path>>(dir: P, year: i32) -> EngineResult<RateTables> {
        let dir = dir.as_ref();

        let income_tax =
            load_yaml::<BTreeMap<String, Vec<RawTaxBracket>>>(&dir.join("income_tax.yaml"))?;
        let social_security =
            load_yaml::<Vec<RawContributionRate>>(&dir.join("social_security.yaml"))?;
        let statutory_bonus = load_yaml::<Vec<RawBonusEntry>>(&dir.join("statutory_bonus.yaml"))?;

        let maternity_path = dir.join("maternity_fund.yaml");
        let maternity_fund = if maternity_path.exists() {
            Some(load_yaml::<Vec<RawContributionRate>>(&maternity_path)?)
        } else {
            debug!(path = %maternity_path.display(), "No maternity fund table");
            None
        };

        RateTables::try_from(RawRateTables {
            year,
            income_tax,
            social_security,
            maternity_fund,
            statutory_bonus,
        })
    }

    /// Loads every employee file in `employees/`, ordered by file name.
    ///
    /// A file that cannot be parsed is rejected on its own and identified by
    /// its file name; the other employees still load. Only an unreadable
    /// directory is an error.
    pub fn load_employees(&self) -> EngineResult<EmployeeRecords> {
        let dir = self.root.join("employees");
        let mut records = EmployeeRecords::default();
        for path in yaml_files(&dir)? {
            match load_yaml::<Employee>(&path) {
                Ok(employee) => records.employees.push(employee),
                Err(error) => {
                    let employee_id = path
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    warn!(path = %path.display(), error = %error, "Rejected employee file");
                    records.rejected.push(RejectedRecord {
                        error: EngineError::InvalidEmployee {
                            employee_id: employee_id.clone(),
                            field: "record".to_string(),
                            message: error.to_string(),
                        },
                        employee_id,
                        path,
                    });
                }
            }
        }
        debug!(
            count = records.employees.len(),
            rejected = records.rejected.len(),
            "Loaded employees"
        );
        Ok(records)
    }

    /// Loads every adjustment list in `adjustments/`.
    ///
    /// A missing directory means there are no adjustments.
    pub fn load_adjustments(&self) -> EngineResult<Vec<Adjustment>> {
        let dir = self.root.join("adjustments");
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut adjustments = Vec::new();
        for path in yaml_files(&dir)? {
            adjustments.extend(load_yaml::<Vec<Adjustment>>(&path)?);
        }
        debug!(count = adjustments.len(), "Loaded adjustments");
        Ok(adjustments)
    }

    /// Returns the data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader and returns its configuration.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }

    /// Returns the organisation metadata.
    pub fn organisation(&self) -> &Organisation {
        &self.config.organisation
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.config.settings
    }

    /// Returns the rate tables.
    pub fn tables(&self) -> &RateTables {
        &self.config.tables
    }
}

/// Loads and parses a YAML file.
pub(crate) fn load_yaml<T: DeserializeOwned>(path: &Path) -> EngineResult<T> {
    let path_str = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
        path: path_str.clone(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
        path: path_str,
        message: e.to_string(),
    })
}

/// Lists the `.yaml` files of a directory in name order.
pub(crate) fn yaml_files(dir: &Path) -> EngineResult<Vec<PathBuf>> {
    let dir_str = dir.display().to_string();

    let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
        path: dir_str.clone(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
            files.push(path);
        } else if path.is_file() {
            warn!(path = %path.display(), "Skipping non-YAML file");
        }
    }
    files.sort();
    Ok(files)
}
