//! Terminal table for the `show` command.
//!
//! Uses `console` for colors: terminal failures in red, successes in
//! green, anything still in flight in yellow.

use console::{Alignment, Style, pad_str};

use crate::metrics::DerivedMetric;
use crate::status::StatusCode;

fn style_for(state_code: u8) -> Style {
    match StatusCode::from_code(state_code) {
        Some(StatusCode::Error | StatusCode::Failed | StatusCode::Killed) => Style::new().red().bold(),
        Some(status) if status.is_terminal() => Style::new().green(),
        Some(_) => Style::new().yellow(),
        None => Style::new().dim(),
    }
}

fn format_seconds(seconds: i64) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{h}h{m:02}m{s:02}s")
    } else if m > 0 {
        format!("{m}m{s:02}s")
    } else {
        format!("{s}s")
    }
}

/// One line per workflow: name, status, time in status, run duration.
pub fn render_table(metrics: &[DerivedMetric]) -> String {
    let width = metrics
        .iter()
        .map(|m| m.workflow_name.len())
        .max()
        .unwrap_or(0)
        .max("WORKFLOW".len());

    let header = Style::new().bold();
    let mut out = format!(
        "{}  {}  {}  {}\n",
        header.apply_to(pad_str("WORKFLOW", width, Alignment::Left, None)),
        header.apply_to(pad_str("STATUS", 12, Alignment::Left, None)),
        header.apply_to(pad_str("IN STATUS", 12, Alignment::Right, None)),
        header.apply_to(pad_str("DURATION", 12, Alignment::Right, None)),
    );

    for metric in metrics {
        let duration = metric
            .duration_seconds
            .map(format_seconds)
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{}  {}  {}  {}\n",
            pad_str(&metric.workflow_name, width, Alignment::Left, None),
            style_for(metric.state_code).apply_to(pad_str(metric.status_symbol, 12, Alignment::Left, None)),
            pad_str(&format_seconds(metric.age_seconds), 12, Alignment::Right, None),
            pad_str(&duration, 12, Alignment::Right, None),
        ));
    }
    out
}
