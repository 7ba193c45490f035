//! Periodic auto-enrollment.
//!
//! Every `interval` the loop runs one enrollment tick, topping up each
//! segment with a non-zero percentage toward its share of the known users.
//! The first tick fires immediately.

use std::time::Duration;

use dus_db::repositories::EnrollmentRepo;
use sqlx::PgPool;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Run the auto-enrollment loop until `cancel` is triggered.
///
/// A tick that is still running when the token fires is dropped, which
/// rolls back its transaction. Failed ticks are logged and the loop keeps
/// going.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Auto-enrollment loop started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Auto-enrollment loop stopping");
                break;
            }
            _ = ticker.tick() => {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Auto-enrollment tick cancelled, rolling back");
                        break;
                    }
                    result = EnrollmentRepo::run_tick(&pool) => match result {
                        Ok(summary) if summary.is_noop() => {
                            tracing::debug!(
                                population = summary.population,
                                segments = summary.segments_checked,
                                "Auto-enrollment: nothing to add"
                            );
                        }
                        Ok(summary) => {
                            tracing::info!(
                                population = summary.population,
                                segments = summary.segments_checked,
                                added = summary.memberships_added,
                                "Auto-enrollment: memberships added"
                            );
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Auto-enrollment: tick failed");
                        }
                    }
                }
            }
        }
    }
}
