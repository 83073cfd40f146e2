use std::time::Duration;

use reqwest::Url;

use crate::error::{DashboardError, Result};

/// Configuration for the dashboard poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Base URL of the job queue server (scheme, host and port)
    pub base_url: String,
    /// Path of the snapshot endpoint
    pub data_path: String,
    /// Delay between scheduled refreshes
    pub interval_ms: u64,
    /// Per-request timeout. `None` leaves the transport default in place.
    pub request_timeout_ms: Option<u64>,
    /// Skip a scheduled refresh while the previous one is still in flight.
    /// When false, slow responses may overlap and the last to complete wins.
    pub skip_overlapping: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            data_path: "/data".to_string(),
            interval_ms: 1000,
            request_timeout_ms: None,
            skip_overlapping: false,
        }
    }
}

impl PollerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_data_path(mut self, path: impl Into<String>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_skip_overlapping(mut self, skip: bool) -> Self {
        self.skip_overlapping = skip;
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Resolve the endpoint URL, without the cache-busting parameter.
    pub fn endpoint(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| DashboardError::Config(format!("invalid base url {}: {e}", self.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(DashboardError::Config(format!(
                "base url {} cannot carry a path",
                self.base_url
            )));
        }
        base.join(&self.data_path).map_err(|e| {
            DashboardError::Config(format!("invalid data path {}: {e}", self.data_path))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(DashboardError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        self.endpoint().map(|_| ())
    }
}
