//! Segment catalog entity and DTOs.

use dus_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `segments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Segment {
    pub slug: String,
    /// Target share of the known user population, `0` disables auto-enrollment.
    pub auto_add_percentage: i16,
    pub deleted: bool,
    pub created_at: Timestamp,
}

/// Validated input for creating (or reinstating) a segment.
#[derive(Debug, Clone)]
pub struct CreateSegment {
    pub slug: String,
    pub auto_add_percentage: i16,
}

/// What `SegmentRepo::create` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new row was inserted.
    Created,
    /// A soft-deleted row was reactivated with the new percentage.
    Reinstated,
}

/// Result of deleting a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedSegment {
    pub slug: String,
    /// Users whose membership was purged, ascending.
    pub affected_users: Vec<i64>,
}
