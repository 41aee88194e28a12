use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use vmc_core::errors::{ErrorInfo, VmcError};

use crate::obs::{ObsManager, ObsStats};

/// One reporting step: the registry's summaries at a driver iteration plus
/// the sampler's acceptance rates.
#[derive(Debug, Clone)]
pub struct IterationRecord {
    /// Driver iteration the record belongs to.
    pub iteration: usize,
    /// Observable summaries in registry order.
    pub observables: Vec<(String, ObsStats)>,
    /// Elementwise sampler acceptance rates (local slots, then exchanges).
    pub acceptance: Vec<f64>,
}

impl IterationRecord {
    /// Snapshots a registry into a record.
    pub fn from_manager(iteration: usize, manager: &ObsManager, acceptance: Vec<f64>) -> Self {
        Self {
            iteration,
            observables: manager.all_stats(),
            acceptance,
        }
    }

    /// Renders the record as a JSON object with stable field names.
    pub fn to_json(&self) -> Result<Value, VmcError> {
        let mut map = Map::new();
        map.insert("Iteration".to_string(), Value::from(self.iteration as u64));
        for (name, stats) in &self.observables {
            let value = serde_json::to_value(stats).map_err(|err| {
                VmcError::Serde(
                    ErrorInfo::new("record-serialize", err.to_string())
                        .with_context("observable", name.clone()),
                )
            })?;
            map.insert(name.clone(), value);
        }
        let acceptance = serde_json::to_value(&self.acceptance).map_err(|err| {
            VmcError::Serde(ErrorInfo::new("record-serialize", err.to_string()))
        })?;
        map.insert("Acceptance".to_string(), acceptance);
        Ok(Value::Object(map))
    }
}

#[derive(Serialize)]
struct OutputLog<'a> {
    #[serde(rename = "Output")]
    output: &'a [Value],
}

/// Accumulates iteration records and mirrors them to a JSON log file.
///
/// Only the coordinating process should report; the `enabled` flag is
/// decided once by the surrounding orchestration and every write is a no-op
/// when it is off.
#[derive(Debug)]
pub struct ReportWriter {
    path: PathBuf,
    enabled: bool,
    records: Vec<Value>,
}

impl ReportWriter {
    /// Creates a writer targeting `path`.
    pub fn new(path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            path: path.into(),
            enabled,
            records: Vec::new(),
        }
    }

    /// Returns whether this writer actually emits output.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the number of records written so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether no record has been written.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a record and rewrites the full log file.
    pub fn append(&mut self, record: &IterationRecord) -> Result<(), VmcError> {
        if !self.enabled {
            return Ok(());
        }
        self.records.push(record.to_json()?);
        let log = OutputLog {
            output: &self.records,
        };
        let text = serde_json::to_string_pretty(&log).map_err(|err| {
            VmcError::Serde(
                ErrorInfo::new("report-serialize", err.to_string())
                    .with_context("path", self.path.display().to_string()),
            )
        })?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    VmcError::Serde(
                        ErrorInfo::new("report-mkdir", err.to_string())
                            .with_context("path", parent.display().to_string()),
                    )
                })?;
            }
        }
        fs::write(&self.path, text).map_err(|err| {
            VmcError::Serde(
                ErrorInfo::new("report-write", err.to_string())
                    .with_context("path", self.path.display().to_string()),
            )
        })
    }
}
