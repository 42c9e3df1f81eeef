//! Shapes of the Oozie `v2/jobs` response.
//!
//! Only the fields the exporter reads are declared; serde ignores the rest
//! of the (fairly large) job objects Oozie returns.

use serde::Deserialize;

/// Body returned by `GET /oozie/v2/jobs?jobtype=wf`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsResponse {
    /// Workflow jobs, in the order the server returned them.
    #[serde(default)]
    pub workflows: Vec<RawJobRecord>,
}

/// One workflow job instance as reported by Oozie.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJobRecord {
    /// Workflow display name, shared by every run of the same workflow.
    pub app_name: String,
    /// Lifecycle symbol, e.g. "RUNNING" or "SUCCEEDED".
    pub status: String,
    pub console_url: String,
    /// Formatted like "Mon, 01 Jan 2024 10:00:00 GMT".
    pub start_time: String,
    /// `None` until the job reaches a terminal state.
    #[serde(default)]
    pub end_time: Option<String>,
}
