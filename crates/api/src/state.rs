use std::sync::Arc;

use crate::config::AppConfig;
use crate::reports::ReportStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference-counted and everything else is
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: dus_db::DbPool,
    /// Loaded configuration (report URLs use the server section).
    pub config: Arc<AppConfig>,
    /// CSV report files on local disk.
    pub reports: Arc<ReportStore>,
}
