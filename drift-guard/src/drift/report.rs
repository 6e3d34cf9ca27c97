//! Per-column drift report.

use crate::prelude::*;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

/// Drift outcome for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDrift {
    /// Two-sided KS p-value.
    pub p_value: f64,
    /// KS statistic D. Kept for logging, not serialized.
    pub statistic: f64,
    pub drift_detected: bool,
}

impl Serialize for ColumnDrift {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut entry = serializer.serialize_struct("ColumnDrift", 2)?;
        entry.serialize_field("p_value", &self.p_value)?;
        entry.serialize_field("drift_status", &self.drift_detected)?;
        entry.end()
    }
}

/// Drift outcomes keyed by column, in the base partition's column order.
///
/// Serializes as a mapping `column -> {p_value, drift_status}`.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftReport {
    columns: Vec<(String, ColumnDrift)>,
    status: bool,
}

impl Default for DriftReport {
    fn default() -> Self {
        Self::new()
    }
}

impl DriftReport {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            status: true,
        }
    }

    /// Appends a column. A drifted column downgrades the overall status for good.
    pub fn record(&mut self, column: impl Into<String>, drift: ColumnDrift) {
        if drift.drift_detected {
            self.status = false;
        }
        self.columns.push((column.into(), drift));
    }

    /// `true` while no recorded column has drifted.
    pub fn status(&self) -> bool {
        self.status
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&ColumnDrift> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, drift)| drift)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnDrift)> {
        self.columns.iter().map(|(name, drift)| (name.as_str(), drift))
    }

    /// Names of the columns flagged as drifted.
    pub fn drifted_columns(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, drift)| drift.drift_detected)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| PipelineError::Serialization(e.to_string()))
    }

    /// Writes the report as YAML, creating parent directories as needed.
    #[instrument(skip(self), fields(columns = self.len()))]
    pub fn write_yaml(&self, path: &Path) -> Result<()> {
        let yaml = self.to_yaml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PipelineError::io_with_source(format!("cannot create {}", parent.display()), e)
            })?;
        }
        fs::write(path, yaml).map_err(|e| {
            PipelineError::io_with_source(format!("cannot write {}", path.display()), e)
        })?;
        debug!(path = %path.display(), "Wrote drift report");
        Ok(())
    }
}

impl Serialize for DriftReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, drift) in &self.columns {
            map.serialize_entry(column, drift)?;
        }
        map.end()
    }
}
