//! Repository for the `user_segments` table.
//!
//! Every insertion or removal appends a matching row to `operations` in the
//! same transaction.

use chrono::Utc;
use dus_core::error::CoreError;
use dus_core::operation::OperationAction;
use dus_core::types::{DbId, Timestamp};
use dus_core::validation::SegmentChanges;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::StoreResult;
use crate::models::membership::{Membership, MembershipUpdate};
use crate::models::operation::NewOperation;
use crate::repositories::OperationRepo;

/// Column list for `user_segments` queries.
const COLUMNS: &str = "user_id, segment_slug, auto_add, created_at";

/// Transactional add/remove of (user, segment) pairs.
pub struct MembershipRepo;

impl MembershipRepo {
    /// Apply a validated membership update for one user.
    ///
    /// Adds run before deletes. Adding a segment the user already holds is a
    /// no-op. Adding a missing or deleted segment fails with
    /// [`CoreError::SegmentMissing`]; deleting a segment the user does not
    /// hold fails with [`CoreError::UserLacksSegment`]. Any failure rolls
    /// back the whole update.
    pub async fn update_user_segments(
        pool: &PgPool,
        changes: &SegmentChanges,
    ) -> StoreResult<MembershipUpdate> {
        let mut tx = pool.begin().await?;
        let now = Utc::now();
        let user_id = changes.user_id;
        let mut update = MembershipUpdate::default();

        for slug in &changes.to_add {
            if Self::has_segment(&mut tx, user_id, slug).await? {
                continue;
            }
            if !lock_active_segment(&mut tx, slug).await? {
                return Err(CoreError::SegmentMissing { slug: slug.clone() }.into());
            }
            if Self::insert_with_audit(&mut tx, user_id, slug, false, now).await? {
                update.added.push(slug.clone());
            }
        }

        for slug in &changes.to_delete {
            let result = sqlx::query(
                "DELETE FROM user_segments WHERE user_id = $1 AND segment_slug = $2",
            )
            .bind(user_id)
            .bind(slug)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(CoreError::UserLacksSegment {
                    user_id,
                    slug: slug.clone(),
                }
                .into());
            }

            OperationRepo::record(
                &mut tx,
                &NewOperation {
                    user_id,
                    segment_slug: slug,
                    date: now,
                    action: OperationAction::Delete,
                    auto_add: false,
                },
            )
            .await?;
            update.removed.push(slug.clone());
        }

        tx.commit().await?;

        tracing::debug!(
            user_id,
            added = update.added.len(),
            removed = update.removed.len(),
            "User segments updated"
        );
        Ok(update)
    }

    /// Slugs currently bound to `user_id`, ascending. Unknown users yield an
    /// empty list.
    pub async fn active_segments(pool: &PgPool, user_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT segment_slug FROM user_segments \
             WHERE user_id = $1 \
             ORDER BY segment_slug",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// All memberships of one segment, by user id.
    pub async fn list_members(pool: &PgPool, slug: &str) -> Result<Vec<Membership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_segments \
             WHERE segment_slug = $1 \
             ORDER BY user_id"
        );
        sqlx::query_as::<_, Membership>(&query)
            .bind(slug)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    async fn has_segment(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        slug: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (\
                 SELECT 1 FROM user_segments WHERE user_id = $1 AND segment_slug = $2\
             )",
        )
        .bind(user_id)
        .bind(slug)
        .fetch_one(&mut **tx)
        .await
    }

    /// Insert a membership and its `add` audit row.
    ///
    /// Returns `false` (and records nothing) when a concurrent transaction
    /// inserted the same pair first. The caller must already hold a share
    /// lock on the segment row.
    pub(crate) async fn insert_with_audit(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        slug: &str,
        auto_add: bool,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_segments (user_id, segment_slug, auto_add) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, segment_slug) DO NOTHING",
        )
        .bind(user_id)
        .bind(slug)
        .bind(auto_add)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        OperationRepo::record(
            tx,
            &NewOperation {
                user_id,
                segment_slug: slug,
                date: now,
                action: OperationAction::Add,
                auto_add,
            },
        )
        .await?;
        Ok(true)
    }
}

/// Take a share lock on an active segment row.
///
/// Returns `false` if the segment does not exist or is soft-deleted. The lock
/// blocks a concurrent delete until this transaction ends, so no membership
/// can be attached to a segment that is being deleted.
pub(crate) async fn lock_active_segment(
    tx: &mut Transaction<'_, Postgres>,
    slug: &str,
) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, String>(
        "SELECT slug FROM segments \
         WHERE slug = $1 AND deleted = false \
         FOR SHARE",
    )
    .bind(slug)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(found.is_some())
}
