use thiserror::Error;

use crate::oozie::OozieError;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Unknown workflow status: {0}")]
    UnknownStatus(String),

    #[error("Unknown status code: {0}")]
    UnknownCode(u8),

    #[error("Malformed {field} timestamp: {value:?}")]
    MalformedTimestamp { field: &'static str, value: String },

    #[error("Clock skew for {workflow}: last status is {ahead_secs}s in the future")]
    ClockSkew { workflow: String, ahead_secs: i64 },

    #[error("Inverted interval for {workflow}: end time is {behind_secs}s before start time")]
    InvertedInterval { workflow: String, behind_secs: i64 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Oozie error: {0}")]
    Oozie(#[from] OozieError),

    #[error("Pushgateway returned status {status} for job {job}")]
    Push { job: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Metric encoding error: {0}")]
    Prometheus(#[from] prometheus::Error),
}
