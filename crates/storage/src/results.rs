// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-file detection records as CSV.
//!
//! The first detection's field names determine the column order and
//! header; subsequent detections are written under the same schema. An
//! empty detection list produces a file containing a single empty record.

use std::path::{Path, PathBuf};

use serde_json::Value;

use faunanet_core::Detection;

use crate::error::SinkError;
use crate::run_output::results_file_name;

pub struct ResultsSink;

impl ResultsSink {
    /// Write `output_dir/results_<stem>.csv` for one analyzed input.
    pub fn write(
        output_dir: &Path,
        stem: &str,
        detections: &[Detection],
    ) -> Result<PathBuf, SinkError> {
        let path = output_dir.join(results_file_name(stem));
        let mut writer = csv::Writer::from_path(&path).map_err(|source| SinkError::Csv {
            path: path.clone(),
            source,
        })?;

        let csv_err = |source| SinkError::Csv {
            path: path.clone(),
            source,
        };

        match detections.first() {
            None => {
                writer.write_record([""]).map_err(csv_err)?;
            }
            Some(first) => {
                let header: Vec<&str> = first.field_names().collect();
                writer.write_record(&header).map_err(csv_err)?;
                for detection in detections {
                    let row: Vec<String> = header
                        .iter()
                        .map(|name| detection.get(name).map(csv_value).unwrap_or_default())
                        .collect();
                    writer.write_record(&row).map_err(csv_err)?;
                }
            }
        }

        writer
            .flush()
            .map_err(|source| SinkError::io(&path, source))?;
        Ok(path)
    }
}

fn csv_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "results_tests.rs"]
mod tests;
