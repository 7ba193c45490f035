//! Repository for the append-only `operations` table.

use dus_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::operation::{NewOperation, Operation};

/// Column list for `operations` queries.
const COLUMNS: &str = "id, user_id, segment_slug, date, action, auto_add";

/// Appends and reads audit entries. There is no update or delete path.
pub struct OperationRepo;

impl OperationRepo {
    /// Append one audit entry inside the caller's transaction.
    pub async fn record(
        tx: &mut Transaction<'_, Postgres>,
        op: &NewOperation<'_>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO operations (user_id, segment_slug, date, action, auto_add) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(op.user_id)
        .bind(op.segment_slug)
        .bind(op.date)
        .bind(op.action.as_str())
        .bind(op.auto_add)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// All operations with `from <= date < to`, ordered by user id.
    ///
    /// Ties are broken by date and insertion order so reports are stable.
    pub async fn list_between(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Operation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM operations \
             WHERE date >= $1 AND date < $2 \
             ORDER BY user_id, date, id"
        );
        sqlx::query_as::<_, Operation>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Full history of one user, oldest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Operation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM operations \
             WHERE user_id = $1 \
             ORDER BY date, id"
        );
        sqlx::query_as::<_, Operation>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Full history of one segment, oldest first.
    pub async fn list_for_segment(pool: &PgPool, slug: &str) -> Result<Vec<Operation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM operations \
             WHERE segment_slug = $1 \
             ORDER BY date, id"
        );
        sqlx::query_as::<_, Operation>(&query)
            .bind(slug)
            .fetch_all(pool)
            .await
    }
}
