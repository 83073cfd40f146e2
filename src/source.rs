use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};

use crate::config::PollerConfig;
use crate::error::{DashboardError, Result};

/// Where snapshots come from. Returns the raw response body; decoding is the
/// poller's job so that every source fails the same way on bad payloads.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<String>;

    /// Human readable origin, shown in the status line.
    fn describe(&self) -> String;
}

/// Fetches snapshots over HTTP with a timestamp cache-buster.
pub struct HttpSource {
    client: Client,
    endpoint: Url,
}

impl HttpSource {
    pub fn new(config: &PollerConfig) -> Result<Self> {
        let endpoint = config.endpoint()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DashboardError::Config(format!("HTTP client error: {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Endpoint URL with `t=<unix-ms>` appended.
    pub fn request_url(&self, now_ms: i64) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("t", &now_ms.to_string());
        url
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    async fn fetch(&self) -> Result<String> {
        let url = self.request_url(Utc::now().timestamp_millis());

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        tracing::debug!(url = %url, status = status.as_u16(), headers = ?response.headers(), "Response received");

        if !status.is_success() {
            return Err(DashboardError::Transport {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        tracing::trace!(body = %body, "Raw snapshot body");
        Ok(body)
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}
