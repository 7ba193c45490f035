//! Handlers for the `/segments` resource.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use dus_core::validation::{parse_percentage, validate_slug};
use dus_db::models::segment::CreateSegment;
use dus_db::repositories::SegmentRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Body of `POST /segments`.
#[derive(Debug, Deserialize)]
pub struct CreateSegmentRequest {
    pub slug: String,
    /// `"N%"` with N in 1..=100, or empty for no auto-enrollment.
    #[serde(default)]
    pub auto_add_percentage: String,
}

/// Body of `DELETE /segments`.
#[derive(Debug, Deserialize)]
pub struct DeleteSegmentRequest {
    pub slug: String,
}

/// POST /api/v1/segments
///
/// Creates the segment, or reinstates a previously deleted one. Responds
/// 201 with no body.
pub async fn create_segment(
    State(state): State<AppState>,
    payload: Result<Json<CreateSegmentRequest>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(body) = payload?;

    let input = CreateSegment {
        slug: validate_slug(&body.slug)?,
        auto_add_percentage: parse_percentage(&body.auto_add_percentage)?,
    };
    SegmentRepo::create(&state.pool, &input).await?;

    Ok(StatusCode::CREATED)
}

/// DELETE /api/v1/segments
///
/// Soft-deletes the segment and removes it from every user.
pub async fn delete_segment(
    State(state): State<AppState>,
    payload: Result<Json<DeleteSegmentRequest>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(body) = payload?;

    let slug = validate_slug(&body.slug)?;
    SegmentRepo::delete(&state.pool, &slug).await?;

    Ok(StatusCode::OK)
}
