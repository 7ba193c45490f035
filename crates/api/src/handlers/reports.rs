//! Handlers for monthly CSV reports.
//!
//! A report is built from the audit log for one UTC calendar month, written
//! to the reports directory and then served by id.

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dus_core::report::{report_file_name, report_url};
use dus_core::validation::{parse_report_id, ReportMonth};
use dus_db::repositories::OperationRepo;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use crate::error::AppResult;
use crate::state::AppState;

/// Body of `POST /users/report`.
#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    /// `YYYY-MM`.
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct CreateReportResponse {
    pub report_url: String,
}

/// POST /api/v1/users/report
///
/// Writes the report for the requested month and returns its download URL.
pub async fn create_report(
    State(state): State<AppState>,
    payload: Result<Json<CreateReportRequest>, JsonRejection>,
) -> AppResult<Json<CreateReportResponse>> {
    let Json(body) = payload?;

    let month = ReportMonth::parse(&body.date)?;
    let entries = OperationRepo::list_between(&state.pool, month.start(), month.end())
        .await?
        .iter()
        .map(|op| op.to_report_entry())
        .collect::<Result<Vec<_>, _>>()?;

    let id = state.reports.write(&entries).await?;
    tracing::debug!(report_id = %id, %month, "Report created");

    let server = &state.config.server;
    Ok(Json(CreateReportResponse {
        report_url: report_url(server.advertised_host(), server.port, id),
    }))
}

/// GET /api/v1/users/report/{id}
///
/// Streams the CSV as an attachment. A missing file is an I/O failure.
pub async fn get_report(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let id = parse_report_id(&raw_id)?;
    let file = state.reports.open(id).await?;

    let disposition = format!("attachment; filename=\"{}\"", report_file_name(id));
    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}
