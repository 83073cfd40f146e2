//! Dashboard view model and its terminal rendering.
//!
//! [`Dashboard`] owns the task table, worker table and progress chart. It is
//! created once at startup, handed to the poller, and mutated only when a
//! refresh produces a valid snapshot.
//!
//! - [`ui`] - ratatui layout for the three panels and the status line
//! - [`app`] - terminal setup and the redraw/keyboard loop

pub mod app;
pub mod ui;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::snapshot::{Snapshot, Task, Worker};

pub type SharedDashboard = Arc<RwLock<Dashboard>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: String,
    pub kind: String,
    pub status: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.text(),
            kind: task.kind.text(),
            status: task.status.text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRow {
    pub id: String,
    pub tasks_assigned: String,
}

impl From<&Worker> for WorkerRow {
    fn from(worker: &Worker) -> Self {
        Self {
            id: worker.id.text(),
            tasks_assigned: worker.tasks_assigned.text(),
        }
    }
}

/// An ordered table body. Rows keep input order; nothing is sorted or deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R> Table<R> {
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Clear the body and append one row per item.
    pub fn replace<'a, T, I>(&mut self, items: I)
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
        R: From<&'a T>,
    {
        self.rows.clear();
        for item in items {
            self.rows.push(R::from(item));
        }
    }
}

pub type TaskTable = Table<TaskRow>;
pub type WorkerTable = Table<WorkerRow>;

/// Horizontal bar chart with a single data point on a 0..=100 axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressChart {
    label: &'static str,
    dataset_label: &'static str,
    max: f64,
    value: f64,
}

impl Default for ProgressChart {
    fn default() -> Self {
        Self {
            label: "Progress",
            dataset_label: "Job Progress (%)",
            max: 100.0,
            value: 0.0,
        }
    }
}

impl ProgressChart {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn dataset_label(&self) -> &'static str {
        self.dataset_label
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// The data point exactly as last set.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set(&mut self, value: f64) {
        self.value = value;
    }

    /// Bar length on the chart axis, clamped to `0..=max`.
    pub fn bar_value(&self) -> u64 {
        if self.value.is_nan() {
            return 0;
        }
        self.value.clamp(0.0, self.max).round() as u64
    }
}

#[derive(Debug, Default)]
pub struct Dashboard {
    pub tasks: TaskTable,
    pub workers: WorkerTable,
    pub progress: ProgressChart,
    rendered_at: Option<DateTime<Utc>>,
    renders: u64,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedDashboard {
        Arc::new(RwLock::new(self))
    }

    /// Replace everything on screen with the contents of `snapshot`.
    pub fn apply(&mut self, snapshot: &Snapshot) {
        self.tasks.replace(&snapshot.tasks);
        self.workers.replace(&snapshot.workers);
        self.progress.set(snapshot.progress);
        self.rendered_at = Some(Utc::now());
        self.renders += 1;
    }

    pub fn rendered_at(&self) -> Option<DateTime<Utc>> {
        self.rendered_at
    }

    /// Number of snapshots applied since startup.
    pub fn renders(&self) -> u64 {
        self.renders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> Snapshot {
        Snapshot::from_value(value).unwrap()
    }

    #[test]
    fn new_dashboard_is_empty() {
        let dash = Dashboard::new();
        assert!(dash.tasks.is_empty());
        assert!(dash.workers.is_empty());
        assert_eq!(dash.progress.value(), 0.0);
        assert_eq!(dash.progress.label(), "Progress");
        assert_eq!(dash.progress.dataset_label(), "Job Progress (%)");
        assert_eq!(dash.progress.max(), 100.0);
        assert!(dash.rendered_at().is_none());
        assert_eq!(dash.renders(), 0);
    }

    #[test]
    fn apply_preserves_order_and_duplicates() {
        let mut dash = Dashboard::new();
        dash.apply(&snapshot(json!({
            "tasks": [
                {"id": 2, "type": "reduce", "status": "idle"},
                {"id": 0, "type": "map", "status": "done"},
                {"id": 0, "type": "map", "status": "done"}
            ],
            "workers": [{"id": "worker-1", "tasks_assigned": 4}],
            "progress": 42
        })));

        let ids: Vec<&str> = dash.tasks.rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "0", "0"]);
        assert_eq!(dash.workers.len(), 1);
        assert_eq!(
            dash.workers.rows()[0],
            WorkerRow {
                id: "worker-1".to_string(),
                tasks_assigned: "4".to_string()
            }
        );
        assert_eq!(dash.progress.value(), 42.0);
        assert_eq!(dash.renders(), 1);
        assert!(dash.rendered_at().is_some());
    }

    #[test]
    fn apply_fully_replaces_previous_rows() {
        let mut dash = Dashboard::new();
        dash.apply(&snapshot(json!({
            "tasks": [{"id": 1}, {"id": 2}, {"id": 3}],
            "workers": [{"id": "a"}, {"id": "b"}],
            "progress": 10
        })));
        dash.apply(&snapshot(json!({
            "tasks": [{"id": 9}],
            "workers": [],
            "progress": 90
        })));

        assert_eq!(dash.tasks.len(), 1);
        assert_eq!(dash.tasks.rows()[0].id, "9");
        assert!(dash.workers.is_empty());
        assert_eq!(dash.progress.value(), 90.0);
        assert_eq!(dash.renders(), 2);
    }

    #[test]
    fn chart_bar_is_clamped_but_value_is_exact() {
        let mut chart = ProgressChart::default();
        chart.set(142.5);
        assert_eq!(chart.value(), 142.5);
        assert_eq!(chart.bar_value(), 100);

        chart.set(-3.0);
        assert_eq!(chart.bar_value(), 0);

        chart.set(66.6);
        assert_eq!(chart.bar_value(), 67);

        chart.set(f64::NAN);
        assert_eq!(chart.bar_value(), 0);
    }
}
