//! Audit log entity. Operations are append-only (no updated_at).

use dus_core::error::CoreError;
use dus_core::operation::OperationAction;
use dus_core::report::ReportEntry;
use dus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `operations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Operation {
    pub id: DbId,
    pub user_id: DbId,
    pub segment_slug: String,
    pub date: Timestamp,
    pub action: String,
    pub auto_add: bool,
}

impl Operation {
    /// Parsed `action` column. The table constraint limits it to known values.
    pub fn action(&self) -> Option<OperationAction> {
        OperationAction::parse(&self.action)
    }

    /// Convert into a report row.
    ///
    /// An unknown action means the table was written outside this service
    /// and fails with [`CoreError::Internal`].
    pub fn to_report_entry(&self) -> Result<ReportEntry, CoreError> {
        let action = self.action().ok_or_else(|| {
            CoreError::Internal(format!(
                "operation {} has unknown action '{}'",
                self.id, self.action
            ))
        })?;
        Ok(ReportEntry {
            user_id: self.user_id,
            segment_slug: self.segment_slug.clone(),
            action,
            date: self.date,
        })
    }
}

/// DTO for appending an operation inside an open transaction.
#[derive(Debug, Clone)]
pub struct NewOperation<'a> {
    pub user_id: DbId,
    pub segment_slug: &'a str,
    pub date: Timestamp,
    pub action: OperationAction,
    pub auto_add: bool,
}
