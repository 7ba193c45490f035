//! Repository for the `segments` table.
//!
//! Segments are soft-deleted. Creating a slug that was deleted earlier
//! reactivates the existing row instead of inserting a new one.

use chrono::Utc;
use dus_core::error::CoreError;
use dus_core::operation::OperationAction;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::models::operation::NewOperation;
use crate::models::segment::{CreateOutcome, CreateSegment, DeletedSegment, Segment};
use crate::repositories::OperationRepo;

/// Column list for `segments` queries.
const COLUMNS: &str = "slug, auto_add_percentage, deleted, created_at";

/// Segment catalog operations.
pub struct SegmentRepo;

impl SegmentRepo {
    /// Create a segment, or reinstate it if it was soft-deleted.
    ///
    /// Fails with [`CoreError::AlreadyExists`] if an active segment with the
    /// same slug exists.
    pub async fn create(pool: &PgPool, input: &CreateSegment) -> StoreResult<CreateOutcome> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query_scalar::<_, bool>(
            "SELECT deleted FROM segments WHERE slug = $1 FOR UPDATE",
        )
        .bind(&input.slug)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match deleted {
            None => {
                // A concurrent create may win the race between the lookup
                // and this insert; treat that as a duplicate.
                let result = sqlx::query(
                    "INSERT INTO segments (slug, auto_add_percentage) \
                     VALUES ($1, $2) \
                     ON CONFLICT (slug) DO NOTHING",
                )
                .bind(&input.slug)
                .bind(input.auto_add_percentage)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(CoreError::AlreadyExists {
                        slug: input.slug.clone(),
                    }
                    .into());
                }
                CreateOutcome::Created
            }
            Some(true) => {
                sqlx::query(
                    "UPDATE segments \
                     SET deleted = false, auto_add_percentage = $2 \
                     WHERE slug = $1",
                )
                .bind(&input.slug)
                .bind(input.auto_add_percentage)
                .execute(&mut *tx)
                .await?;
                CreateOutcome::Reinstated
            }
            Some(false) => {
                return Err(CoreError::AlreadyExists {
                    slug: input.slug.clone(),
                }
                .into());
            }
        };

        tx.commit().await?;

        tracing::info!(
            slug = %input.slug,
            percentage = input.auto_add_percentage,
            outcome = ?outcome,
            "Segment created"
        );
        Ok(outcome)
    }

    /// Soft-delete a segment and purge its memberships.
    ///
    /// Every purged membership gets a `delete` audit row with
    /// `auto_add = false`. Fails with [`CoreError::SegmentDoesNotExist`] if
    /// there is no active segment with this slug.
    pub async fn delete(pool: &PgPool, slug: &str) -> StoreResult<DeletedSegment> {
        let mut tx = pool.begin().await?;
        let now = Utc::now();

        // Flag first: the row lock makes concurrent membership inserts wait
        // and then observe `deleted = true`.
        let result = sqlx::query(
            "UPDATE segments SET deleted = true \
             WHERE slug = $1 AND deleted = false",
        )
        .bind(slug)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::SegmentDoesNotExist {
                slug: slug.to_string(),
            }
            .into());
        }

        let mut affected_users = sqlx::query_scalar::<_, i64>(
            "DELETE FROM user_segments WHERE segment_slug = $1 RETURNING user_id",
        )
        .bind(slug)
        .fetch_all(&mut *tx)
        .await?;
        affected_users.sort_unstable();

        for &user_id in &affected_users {
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
        }

        tx.commit().await?;

        tracing::info!(
            slug,
            purged = affected_users.len(),
            "Segment deleted"
        );
        Ok(DeletedSegment {
            slug: slug.to_string(),
            affected_users,
        })
    }

    /// Find a segment by slug, including soft-deleted ones.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM segments WHERE slug = $1");
        sqlx::query_as::<_, Segment>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }
}
