use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dus_core::error::CoreError;
use dus_db::StoreError;
use serde::Serialize;

/// Message returned for request bodies that are not valid JSON for the
/// endpoint.
pub const MSG_PARSING_BODY: &str = "error parsing json body";

/// Application-level error type for HTTP handlers.
///
/// Business failures (validation, missing segments, duplicates) become 400
/// responses carrying the offending field. Everything else is a 500 with a
/// sanitized message; the detail goes to the log.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `dus_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed transactional repository call.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A database error from a plain read.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Report file I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// JSON error body: `{"field"?, "message", "error"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    pub message: String,
    pub error: &'static str,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        AppError::BadRequest(MSG_PARSING_BODY.to_string())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Store(StoreError::Core(core)) => classify_core_error(core),
            AppError::Store(StoreError::Database(err)) | AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                internal()
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    field: None,
                    message: msg.clone(),
                    error: "BAD_REQUEST",
                },
            ),
            AppError::Io(err) => {
                tracing::error!(error = %err, "I/O error");
                internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error to a status and body.
///
/// Referential failures are caller errors here, so they share 400 with
/// validation rather than using 404.
fn classify_core_error(err: &CoreError) -> (StatusCode, ErrorBody) {
    let code = match err {
        CoreError::Validation { .. } => "VALIDATION_ERROR",
        CoreError::SegmentMissing { .. }
        | CoreError::UserLacksSegment { .. }
        | CoreError::SegmentDoesNotExist { .. } => "NOT_FOUND",
        CoreError::AlreadyExists { .. } => "ALREADY_EXISTS",
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            return internal();
        }
    };

    (
        StatusCode::BAD_REQUEST,
        ErrorBody {
            field: err.field(),
            message: err.to_string(),
            error: code,
        },
    )
}

fn internal() -> (StatusCode, ErrorBody) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorBody {
            field: None,
            message: "An internal error occurred".to_string(),
            error: "INTERNAL_ERROR",
        },
    )
}
