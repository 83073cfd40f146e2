pub mod config;
pub mod dashboard;
pub mod error;
pub mod poller;
pub mod shutdown;
pub mod snapshot;
pub mod source;

pub use config::PollerConfig;
pub use dashboard::{Dashboard, SharedDashboard};
pub use error::{DashboardError, Result};
pub use poller::{PollCounts, Poller};
pub use snapshot::{Snapshot, Task, Worker};
pub use source::{HttpSource, SnapshotSource};
