//! The `/data` payload: tasks, workers and overall progress.
//!
//! Decoding happens in two stages so each failure maps to its own error:
//! the body text is parsed into a JSON value (`Format`), then the value is
//! checked for the three top-level fields and converted (`Shape`).

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DashboardError, Result};

const REQUIRED_FIELDS: [&str; 3] = ["tasks", "workers", "progress"];

/// A single display cell. Any JSON scalar is accepted; absent fields render as `-`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Cell(Value);

impl Cell {
    pub fn text(&self) -> String {
        match &self.0 {
            Value::Null => "-".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell(Value::String(s.to_string()))
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell(Value::from(n))
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: Cell,
    #[serde(default, rename = "type")]
    pub kind: Cell,
    #[serde(default)]
    pub status: Cell,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Worker {
    #[serde(default)]
    pub id: Cell,
    #[serde(default)]
    pub tasks_assigned: Cell,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub workers: Vec<Worker>,
    pub progress: f64,
}

impl Snapshot {
    /// Decode a raw response body.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }

    /// Validate an already parsed JSON value. A `null` field counts as absent.
    pub fn from_value(value: Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(DashboardError::mistyped(format!(
                "expected an object, got {value}"
            )));
        };

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| object.get(*field).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(DashboardError::missing_fields(missing));
        }

        serde_json::from_value(value).map_err(|e| DashboardError::mistyped(e.to_string()))
    }
}
