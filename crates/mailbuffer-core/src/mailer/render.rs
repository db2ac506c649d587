//! Alert body rendering.

use chrono::NaiveDate;

use crate::entry::LogEntry;

/// Width of the dashed rule under the heading.
pub const RULE_WIDTH: usize = 40;

/// Shown in place of a call-site function that was never recorded.
pub const UNKNOWN_FUNCTION: &str = "<unknown>";

/// Renders the alert body: heading, rule, custom alerts, then one line per
/// entry. Every line ends in CRLF.
#[must_use]
pub fn render_body(entries: &[LogEntry], custom_alerts: &[String], date: NaiveDate) -> String {
    let mut body = format!(
        "Error Alert - {} - Specific Error Messages:\r\n{}\r\n",
        date.format("%m-%d-%Y"),
        "-".repeat(RULE_WIDTH)
    );

    for alert in custom_alerts {
        body.push_str(alert);
        body.push_str("\r\n");
    }

    for entry in entries {
        body.push_str(&format_entry(entry));
        body.push_str("\r\n");
    }
    body
}

/// Formats one entry as
/// `<timestamp> - <file> - <function> - <line> - [<LEVEL>] - <message>`.
#[must_use]
pub fn format_entry(entry: &LogEntry) -> String {
    format!(
        "{} - {} - {} - {} - [{}] - {}",
        entry.asctime.as_deref().unwrap_or_default(),
        entry.filename(),
        entry.function.as_deref().unwrap_or(UNKNOWN_FUNCTION),
        entry.lineno,
        entry.level,
        entry.message
    )
}
