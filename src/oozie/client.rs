use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::error::OozieError;
use super::types::{JobsResponse, RawJobRecord};
use crate::config::ExporterConfig;

/// Anything that can hand the poll loop one cycle's worth of job records.
pub trait JobSource {
    async fn fetch_workflows(&self) -> Result<Vec<RawJobRecord>, OozieError>;
}

pub struct OozieClient {
    client: Client,
    base_url: String,
    depth: u32,
    page_size: u32,
}

impl OozieClient {
    pub fn new(config: &ExporterConfig) -> Result<Self, OozieError> {
        let base_url = format!("http://{}:{}", config.server, config.port);
        Self::with_base_url(base_url, config.depth, config.page_size)
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(base_url: String, depth: u32, page_size: u32) -> Result<Self, OozieError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            base_url,
            depth,
            page_size,
        })
    }

    /// Workflow jobs created within the last `depth` days.
    pub fn jobs_url(&self) -> String {
        format!(
            "{}/oozie/v2/jobs?len={}&jobtype=wf&filter=%3BendCreatedTime%3D-{}d",
            self.base_url.trim_end_matches('/'),
            self.page_size,
            self.depth
        )
    }
}

impl JobSource for OozieClient {
    async fn fetch_workflows(&self) -> Result<Vec<RawJobRecord>, OozieError> {
        let url = self.jobs_url();
        debug!(%url, "querying oozie");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OozieError::Unavailable {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.json::<JobsResponse>().await?;
        if body.workflows.is_empty() {
            return Err(OozieError::EmptyResultSet { depth: self.depth });
        }
        debug!(count = body.workflows.len(), "received workflow jobs");
        Ok(body.workflows)
    }
}
