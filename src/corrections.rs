// src/corrections.rs
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::model::EmpCode;

/// One known upstream double-booking: the store reports a single overtime
/// record of `original_hours` for this employee/date, but the amounts in
/// `replacement_hours` are what was actually worked.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeCorrection {
    pub emp_code: EmpCode,
    pub date: NaiveDate,
    pub original_hours: f64,
    pub replacement_hours: Vec<f64>,
}

#[derive(Error, Debug)]
pub enum CorrectionLoadError {
    #[error("failed to read corrections file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse corrections file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Injectable table of overtime corrections, keyed by (employee, date).
/// Empty unless the operator configures a corrections file, so the anomaly
/// handling is data, not code.
#[derive(Debug, Clone, Default)]
pub struct CorrectionTable {
    entries: HashMap<(EmpCode, NaiveDate), OvertimeCorrection>,
}

impl CorrectionTable {
    pub fn new(corrections: Vec<OvertimeCorrection>) -> Self {
        let entries = corrections
            .into_iter()
            .map(|c| ((c.emp_code.clone(), c.date), c))
            .collect();
        Self { entries }
    }

    /// Loads a JSON array of corrections from disk. A configured path that
    /// cannot be read or parsed is a startup error, not a silent default.
    pub fn load_from_file(path: &Path) -> Result<Self, CorrectionLoadError> {
        let json = fs::read_to_string(path).map_err(|source| CorrectionLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let corrections: Vec<OvertimeCorrection> =
            serde_json::from_str(&json).map_err(|source| CorrectionLoadError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        let table = Self::new(corrections);
        info!(
            path = %path.display(),
            count = table.len(),
            "loaded overtime correction table"
        );
        Ok(table)
    }

    /// Replacement amounts for a single-record day, if one is configured for
    /// this employee/date and the reported hours match exactly.
    pub fn lookup(&self, emp_code: &str, date: NaiveDate, hours: f64) -> Option<&[f64]> {
        let correction = self.entries.get(&(emp_code.to_string(), date))?;
        if correction.original_hours == hours {
            Some(&correction.replacement_hours)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
