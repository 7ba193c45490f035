//! One auto-enrollment pass over all segments with a target percentage.

use chrono::Utc;
use dus_core::enrollment::{shortfall, target_count, EnrollmentSummary};
use dus_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::repositories::MembershipRepo;

/// Auto-enrollment queries. All work of a tick happens in one transaction.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Run one enrollment tick.
    ///
    /// The population is the set of distinct users holding any segment when
    /// the tick starts. For every active segment with a non-zero percentage,
    /// users outside the segment are enrolled (lowest user id first) until
    /// the segment covers `floor(population * percentage / 100)` users or no
    /// candidates remain. Each insertion is audited with `auto_add = true`.
    ///
    /// Counts are read inside the transaction, so repeated ticks never
    /// overshoot the target. Dropping the returned future before it resolves
    /// rolls the transaction back.
    pub async fn run_tick(pool: &PgPool) -> Result<EnrollmentSummary, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let now = Utc::now();

        let population = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT user_id) FROM user_segments",
        )
        .fetch_one(&mut *tx)
        .await?;

        // Share locks keep these segments from being deleted mid-tick.
        let segments = sqlx::query_as::<_, (String, i16)>(
            "SELECT slug, auto_add_percentage FROM segments \
             WHERE auto_add_percentage > 0 AND deleted = false \
             ORDER BY slug \
             FOR SHARE",
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut summary = EnrollmentSummary {
            population,
            segments_checked: segments.len(),
            memberships_added: 0,
        };

        if population == 0 {
            tx.commit().await?;
            return Ok(summary);
        }

        for (slug, percentage) in &segments {
            let target = target_count(population, *percentage);
            let have = Self::count_members(&mut tx, slug).await?;
            let needed = shortfall(target, have);
            if needed == 0 {
                continue;
            }

            let candidates = Self::candidates(&mut tx, slug, needed).await?;
            let mut added = 0u64;
            for user_id in candidates {
                if MembershipRepo::insert_with_audit(&mut tx, user_id, slug, true, now).await? {
                    added += 1;
                }
            }

            tracing::debug!(
                slug = %slug,
                target,
                have,
                added,
                "Auto-enrollment topped up segment"
            );
            summary.memberships_added += added;
        }

        tx.commit().await?;
        Ok(summary)
    }

    async fn count_members(
        tx: &mut Transaction<'_, Postgres>,
        slug: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT user_id) FROM user_segments WHERE segment_slug = $1",
        )
        .bind(slug)
        .fetch_one(&mut **tx)
        .await
    }

    /// Known users that do not hold `slug`, lowest id first.
    async fn candidates(
        tx: &mut Transaction<'_, Postgres>,
        slug: &str,
        limit: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT DISTINCT us.user_id FROM user_segments us \
             WHERE NOT EXISTS (\
                 SELECT 1 FROM user_segments m \
                 WHERE m.user_id = us.user_id AND m.segment_slug = $1\
             ) \
             ORDER BY us.user_id \
             LIMIT $2",
        )
        .bind(slug)
        .bind(limit)
        .fetch_all(&mut **tx)
        .await
    }
}
