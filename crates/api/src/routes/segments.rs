//! Route definitions for the segment catalog.

use axum::routing::post;
use axum::Router;

use crate::handlers::segments;
use crate::state::AppState;

/// Segment routes mounted at `/segments`.
///
/// ```text
/// POST    /    -> create_segment
/// DELETE  /    -> delete_segment
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        post(segments::create_segment).delete(segments::delete_segment),
    )
}
