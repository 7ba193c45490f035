//! Handlers for user membership endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use dus_core::types::DbId;
use dus_core::validation::{validate_user_id, SegmentChanges};
use dus_db::repositories::MembershipRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

/// Body of `POST /users`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserSegmentsRequest {
    #[serde(default)]
    pub segments_to_add: Vec<String>,
    #[serde(default)]
    pub segments_to_delete: Vec<String>,
    pub user_id: DbId,
}

/// Body of `POST /users/active_segments`.
#[derive(Debug, Deserialize)]
pub struct ActiveSegmentsRequest {
    pub user_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct ActiveSegmentsResponse {
    pub segments: Vec<String>,
}

/// POST /api/v1/users
///
/// Adds then removes segments for one user in a single transaction.
pub async fn update_user_segments(
    State(state): State<AppState>,
    payload: Result<Json<UpdateUserSegmentsRequest>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(body) = payload?;

    let changes = SegmentChanges::new(
        body.user_id,
        &body.segments_to_add,
        &body.segments_to_delete,
    )?;
    MembershipRepo::update_user_segments(&state.pool, &changes).await?;

    Ok(StatusCode::OK)
}

/// POST /api/v1/users/active_segments
///
/// Lists the user's segments in slug order. Unknown users have none.
pub async fn active_segments(
    State(state): State<AppState>,
    payload: Result<Json<ActiveSegmentsRequest>, JsonRejection>,
) -> AppResult<Json<ActiveSegmentsResponse>> {
    let Json(body) = payload?;

    let user_id = validate_user_id(body.user_id)?;
    let segments = MembershipRepo::active_segments(&state.pool, user_id).await?;

    Ok(Json(ActiveSegmentsResponse { segments }))
}
