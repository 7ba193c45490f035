//! Membership (`user_segments`) entity and update results.

use dus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_segments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Membership {
    pub user_id: DbId,
    pub segment_slug: String,
    /// True when the row was produced by the auto-enrollment loop.
    pub auto_add: bool,
    pub created_at: Timestamp,
}

/// What an `UpdateUserSegments` call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipUpdate {
    /// Slugs newly bound to the user (already-held slugs are skipped).
    pub added: Vec<String>,
    /// Slugs removed from the user.
    pub removed: Vec<String>,
}
