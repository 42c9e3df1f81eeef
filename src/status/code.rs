use std::fmt;
use std::str::FromStr;

use crate::error::ExporterError;

/// Lifecycle states reported by Oozie for a workflow job.
///
/// The numeric codes are what dashboards graph, so they are fixed:
/// DONE=0 through WAITING=10, in alphabetical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Done,
    Error,
    Failed,
    Killed,
    Ok,
    Running,
    StartManual,
    StartRetry,
    Succeeded,
    Suspended,
    Waiting,
}

impl StatusCode {
    /// Every state, indexed by its code.
    pub const ALL: [StatusCode; 11] = [
        StatusCode::Done,
        StatusCode::Error,
        StatusCode::Failed,
        StatusCode::Killed,
        StatusCode::Ok,
        StatusCode::Running,
        StatusCode::StartManual,
        StatusCode::StartRetry,
        StatusCode::Succeeded,
        StatusCode::Suspended,
        StatusCode::Waiting,
    ];

    pub fn code(self) -> u8 {
        match self {
            StatusCode::Done => 0,
            StatusCode::Error => 1,
            StatusCode::Failed => 2,
            StatusCode::Killed => 3,
            StatusCode::Ok => 4,
            StatusCode::Running => 5,
            StatusCode::StartManual => 6,
            StatusCode::StartRetry => 7,
            StatusCode::Succeeded => 8,
            StatusCode::Suspended => 9,
            StatusCode::Waiting => 10,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// The symbol exactly as the Oozie API spells it.
    pub fn symbol(self) -> &'static str {
        match self {
            StatusCode::Done => "DONE",
            StatusCode::Error => "ERROR",
            StatusCode::Failed => "FAILED",
            StatusCode::Killed => "KILLED",
            StatusCode::Ok => "OK",
            StatusCode::Running => "RUNNING",
            StatusCode::StartManual => "START_MANUAL",
            StatusCode::StartRetry => "START_RETRY",
            StatusCode::Succeeded => "SUCCEEDED",
            StatusCode::Suspended => "SUSPENDED",
            StatusCode::Waiting => "WAITING",
        }
    }

    /// True for states after which Oozie reports an end time.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StatusCode::Done
                | StatusCode::Error
                | StatusCode::Failed
                | StatusCode::Killed
                | StatusCode::Ok
                | StatusCode::Succeeded
        )
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for StatusCode {
    type Err = ExporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.symbol() == s)
            .ok_or_else(|| ExporterError::UnknownStatus(s.to_string()))
    }
}

/// Looks up the integer code for an upstream status symbol.
pub fn code_of(symbol: &str) -> Result<u8, ExporterError> {
    symbol.parse::<StatusCode>().map(StatusCode::code)
}

/// Reverse lookup used when labelling exported series.
pub fn symbol_of(code: u8) -> Result<&'static str, ExporterError> {
    StatusCode::from_code(code)
        .map(StatusCode::symbol)
        .ok_or(ExporterError::UnknownCode(code))
}
