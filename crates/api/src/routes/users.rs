//! Route definitions for user memberships and reports.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{reports, users};
use crate::state::AppState;

/// User routes mounted at `/users`.
///
/// ```text
/// POST  /                  -> update_user_segments
/// POST  /active_segments   -> active_segments
/// POST  /report            -> create_report
/// GET   /report/{id}       -> get_report
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(users::update_user_segments))
        .route("/active_segments", post(users::active_segments))
        .route("/report", post(reports::create_report))
        .route("/report/{id}", get(reports::get_report))
}
