use chrono::{DateTime, NaiveDateTime, Utc};

use super::code::code_of;
use crate::error::ExporterError;
use crate::oozie::RawJobRecord;

/// Date and time part of an Oozie REST API timestamp,
/// e.g. "Mon, 01 Jan 2024 10:00:00" in "Mon, 01 Jan 2024 10:00:00 GMT".
pub const TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Zone names that mean UTC. Anything else is rejected rather than
/// silently read as UTC.
const UTC_ZONES: [&str; 2] = ["GMT", "UTC"];

/// A job record in canonical shape, built fresh every poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub workflow_name: String,
    pub state_code: u8,
    pub console_url: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// `end_time` when the job has finished, `start_time` otherwise.
    pub last_status_time: DateTime<Utc>,
    /// Start timestamp as the server printed it. Exported as a label value.
    pub start_label: String,
}

/// Parses one API timestamp. `field` only feeds the error message.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ExporterError> {
    let malformed = || ExporterError::MalformedTimestamp {
        field,
        value: value.to_string(),
    };

    let (datetime, zone) = value.trim().rsplit_once(' ').ok_or_else(malformed)?;
    if !UTC_ZONES.contains(&zone) {
        return Err(malformed());
    }
    NaiveDateTime::parse_from_str(datetime, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| malformed())
}

/// Converts one raw API record into a [`NormalizedRecord`].
///
/// An unrecognized status is an error, never a skipped record: it means
/// the upstream contract changed.
pub fn normalize(raw: &RawJobRecord) -> Result<NormalizedRecord, ExporterError> {
    let state_code = code_of(&raw.status)?;
    let start_time = parse_timestamp("startTime", &raw.start_time)?;
    let end_time = raw
        .end_time
        .as_deref()
        .map(|value| parse_timestamp("endTime", value))
        .transpose()?;

    Ok(NormalizedRecord {
        workflow_name: raw.app_name.clone(),
        state_code,
        console_url: raw.console_url.clone(),
        start_time,
        end_time,
        last_status_time: end_time.unwrap_or(start_time),
        start_label: raw.start_time.clone(),
    })
}

/// Normalizes a whole response, stopping at the first bad record.
pub fn normalize_all(raw: &[RawJobRecord]) -> Result<Vec<NormalizedRecord>, ExporterError> {
    raw.iter().map(normalize).collect()
}
