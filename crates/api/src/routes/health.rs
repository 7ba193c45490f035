use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Liveness plus database reachability, for load balancers and deploy checks.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `degraded` while Postgres does not answer `SELECT 1`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

/// GET /health
///
/// Always 200; callers read `status` to tell the two states apart.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = dus_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// `/health` is served unversioned, next to `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
