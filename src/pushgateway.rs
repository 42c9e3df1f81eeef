//! Ships derived metrics to a Prometheus Pushgateway.
//!
//! Every workflow is pushed as its own job, named after the workflow, using
//! `PUT` so a push replaces whatever that job held before.

use std::time::Duration;

use prometheus::{Encoder, IntGaugeVec, Opts, Registry, TextEncoder};
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::ExporterError;
use crate::metrics::DerivedMetric;

const STATE_LABELS: [&str; 3] = ["app_name", "console_url", "start_time"];
const TIMING_LABELS: [&str; 4] = ["app_name", "console_url", "start_time", "status"];

/// Destination for one workflow's metric set.
pub trait MetricSink {
    async fn push(&self, metric: &DerivedMetric) -> Result<(), ExporterError>;
}

/// Renders one workflow's gauges in the Prometheus text format.
pub fn encode(metric: &DerivedMetric) -> Result<String, ExporterError> {
    let registry = Registry::new();
    let state_labels = [
        metric.workflow_name.as_str(),
        metric.console_url.as_str(),
        metric.start_label.as_str(),
    ];
    let timing_labels = [
        metric.workflow_name.as_str(),
        metric.console_url.as_str(),
        metric.start_label.as_str(),
        metric.status_symbol,
    ];

    let current_state = IntGaugeVec::new(Opts::new("oozie_current_state", "wf_status"), &STATE_LABELS)?;
    registry.register(Box::new(current_state.clone()))?;
    current_state
        .with_label_values(&state_labels[..])
        .set(i64::from(metric.state_code));

    let last_status_time = IntGaugeVec::new(
        Opts::new("oozie_last_status_time", "wf_last_status_time"),
        &TIMING_LABELS,
    )?;
    registry.register(Box::new(last_status_time.clone()))?;
    last_status_time
        .with_label_values(&timing_labels[..])
        .set(metric.age_seconds);

    if let Some(duration) = metric.duration_seconds {
        let completed_time = IntGaugeVec::new(
            Opts::new("oozie_completed_time", "wf_last_completed_time"),
            &TIMING_LABELS,
        )?;
        registry.register(Box::new(completed_time.clone()))?;
        completed_time.with_label_values(&timing_labels[..]).set(duration);
    }

    let mut buffer = String::new();
    TextEncoder::new().encode_utf8(&registry.gather(), &mut buffer)?;
    Ok(buffer)
}

/// Grouping-key URL for `job`, e.g. `http://localhost:9091/metrics/job/daily-ingest`.
pub fn job_url(address: &str, job: &str) -> Result<Url, ExporterError> {
    let base = if address.starts_with("http://") || address.starts_with("https://") {
        address.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", address.trim_end_matches('/'))
    };
    let mut url = Url::parse(&format!("{base}/metrics/job"))
        .map_err(|e| ExporterError::Config(format!("invalid pushgateway address {address:?}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ExporterError::Config(format!("pushgateway address {address:?} cannot carry a path")))?
        .push(job);
    Ok(url)
}

pub struct PushgatewayExporter {
    client: Client,
    address: String,
}

impl PushgatewayExporter {
    pub fn new(address: String) -> Result<Self, ExporterError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, address })
    }
}

impl MetricSink for PushgatewayExporter {
    async fn push(&self, metric: &DerivedMetric) -> Result<(), ExporterError> {
        let url = job_url(&self.address, &metric.workflow_name)?;
        let body = encode(metric)?;
        debug!(job = %metric.workflow_name, %url, "pushing metrics");

        let response = self
            .client
            .put(url)
            .header("content-type", TextEncoder::new().format_type())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Push {
                job: metric.workflow_name.clone(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
