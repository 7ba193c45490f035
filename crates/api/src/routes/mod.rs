pub mod health;
pub mod segments;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /segments                      create (POST), delete (DELETE)
///
/// /users                         add/remove segments (POST)
/// /users/active_segments         list a user's segments (POST)
/// /users/report                  build monthly CSV report (POST)
/// /users/report/{id}             download report (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/segments", segments::router())
        .nest("/users", users::router())
}
