//! Monthly membership report rendering.
//!
//! A report is a CSV file named `<id>.csv` where `id` is a freshly generated
//! UUID. Rows come from the audit log, already sorted by user id.

use uuid::Uuid;

use crate::operation::OperationAction;
use crate::types::{DbId, Timestamp};

/// Column header row of every report.
pub const REPORT_HEADER: [&str; 4] = ["user id", "segment_slug", "action", "date"];

/// Timestamp layout used in the `date` column (UTC).
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Path under which reports are served, relative to the server root.
pub const REPORT_ROUTE_PREFIX: &str = "/api/v1/users/report";

/// One audit entry as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub user_id: DbId,
    pub segment_slug: String,
    pub action: OperationAction,
    pub date: Timestamp,
}

/// Generate a new opaque report identifier.
pub fn new_report_id() -> Uuid {
    Uuid::new_v4()
}

/// File name of the CSV artifact for a report.
///
/// Always the lowercase hyphenated UUID form, so caller-supplied text never
/// reaches the filesystem.
pub fn report_file_name(id: Uuid) -> String {
    format!("{}.csv", id.hyphenated())
}

/// Public download URL of a report.
pub fn report_url(host: &str, port: u16, id: Uuid) -> String {
    format!("http://{host}:{port}{REPORT_ROUTE_PREFIX}/{}", id.hyphenated())
}

/// Render report entries as CSV, header first, one `\n`-terminated line each.
pub fn render_csv(entries: &[ReportEntry]) -> String {
    let mut out = String::with_capacity(64 * (entries.len() + 1));
    out.push_str(&REPORT_HEADER.map(csv_escape).join(","));
    out.push('\n');

    for entry in entries {
        let row = [
            entry.user_id.to_string(),
            csv_escape(&entry.segment_slug),
            entry.action.as_str().to_string(),
            entry.date.format(REPORT_DATE_FORMAT).to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quote a CSV field if it contains a separator, quote or line break.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
