//! Turns a representative record into the values pushed for its workflow.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::ExporterError;
use crate::status::{NormalizedRecord, symbol_of};

/// Label used when a state code has no symbol. Unreachable for records
/// that went through `normalize`.
const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// Gauge values and label data for one workflow in one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedMetric {
    pub workflow_name: String,
    pub console_url: String,
    pub start_label: String,
    pub state_code: u8,
    pub status_symbol: &'static str,
    /// Seconds since the last status change.
    pub age_seconds: i64,
    /// Run time of a finished job. `None` while it is still going.
    pub duration_seconds: Option<i64>,
}

impl DerivedMetric {
    fn from_parts(
        rep: &NormalizedRecord,
        status_symbol: &'static str,
        age_seconds: i64,
        duration_seconds: Option<i64>,
    ) -> Self {
        Self {
            workflow_name: rep.workflow_name.clone(),
            console_url: rep.console_url.clone(),
            start_label: rep.start_label.clone(),
            state_code: rep.state_code,
            status_symbol,
            age_seconds,
            duration_seconds,
        }
    }
}

// Rounds a positive gap up so sub-second anomalies never report as 0s.
fn whole_seconds_up(gap: chrono::Duration) -> i64 {
    let secs = gap.num_seconds();
    if gap > chrono::Duration::seconds(secs) { secs + 1 } else { secs }
}

/// Whole seconds from `rep.last_status_time` to `now`.
pub fn age_seconds(rep: &NormalizedRecord, now: DateTime<Utc>) -> Result<i64, ExporterError> {
    let age = now - rep.last_status_time;
    if age < chrono::Duration::zero() {
        return Err(ExporterError::ClockSkew {
            workflow: rep.workflow_name.clone(),
            ahead_secs: whole_seconds_up(-age),
        });
    }
    Ok(age.num_seconds())
}

/// Whole seconds from start to end, or `None` if the job has not ended.
pub fn duration_seconds(rep: &NormalizedRecord) -> Result<Option<i64>, ExporterError> {
    let Some(end_time) = rep.end_time else {
        return Ok(None);
    };
    let duration = end_time - rep.start_time;
    if duration < chrono::Duration::zero() {
        return Err(ExporterError::InvertedInterval {
            workflow: rep.workflow_name.clone(),
            behind_secs: whole_seconds_up(-duration),
        });
    }
    Ok(Some(duration.num_seconds()))
}

/// Derives the metric set, failing on any inconsistency in the record.
pub fn derive(rep: &NormalizedRecord, now: DateTime<Utc>) -> Result<DerivedMetric, ExporterError> {
    let status_symbol = symbol_of(rep.state_code)?;
    let age = age_seconds(rep, now)?;
    let duration = duration_seconds(rep)?;
    Ok(DerivedMetric::from_parts(rep, status_symbol, age, duration))
}

/// Same as [`derive`] but never fails: clock skew clamps the age to zero and
/// an inverted interval drops the duration. Each problem is logged.
pub fn derive_lenient(rep: &NormalizedRecord, now: DateTime<Utc>) -> DerivedMetric {
    if let Ok(metric) = derive(rep, now) {
        return metric;
    }

    let status_symbol = symbol_of(rep.state_code).unwrap_or_else(|err| {
        warn!(workflow = %rep.workflow_name, %err, "labelling series as {UNKNOWN_SYMBOL}");
        UNKNOWN_SYMBOL
    });

    let age = age_seconds(rep, now).unwrap_or_else(|err| {
        warn!(workflow = %rep.workflow_name, %err, "clamping age to 0");
        0
    });

    let duration = duration_seconds(rep).unwrap_or_else(|err| {
        warn!(workflow = %rep.workflow_name, %err, "omitting completed-run duration");
        None
    });

    DerivedMetric::from_parts(rep, status_symbol, age, duration)
}
