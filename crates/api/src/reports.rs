//! Local-disk storage for CSV membership reports.

use std::path::PathBuf;

use dus_core::report::{new_report_id, render_csv, report_file_name, ReportEntry};
use uuid::Uuid;

/// Writes and opens `<dir>/<uuid>.csv` report files.
///
/// File names are derived only from generated or parsed UUIDs, never from
/// raw request text.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of the report with the given id.
    pub fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(report_file_name(id))
    }

    /// Render `entries` to a new report file and return its id.
    ///
    /// Creates the reports directory if needed.
    pub async fn write(&self, entries: &[ReportEntry]) -> std::io::Result<Uuid> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let id = new_report_id();
        let path = self.path_for(id);
        tokio::fs::write(&path, render_csv(entries)).await?;

        tracing::info!(
            report_id = %id,
            rows = entries.len(),
            path = %path.display(),
            "Report written"
        );
        Ok(id)
    }

    /// Open an existing report for streaming.
    pub async fn open(&self, id: Uuid) -> std::io::Result<tokio::fs::File> {
        tokio::fs::File::open(self.path_for(id)).await
    }
}
