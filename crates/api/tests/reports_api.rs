//! HTTP-level integration tests for monthly CSV reports.

mod common;

use axum::http::{header, StatusCode};
use chrono::{TimeZone, Utc};
use common::{body_json, body_text, build_test_app, get, post_json, TEST_HOST, TEST_PORT};
use dus_core::operation::OperationAction;
use dus_db::models::operation::NewOperation;
use dus_db::repositories::OperationRepo;
use serde_json::json;
use sqlx::PgPool;

async fn record(pool: &PgPool, user_id: i64, action: OperationAction, day: u32, month: u32) {
    let mut tx = pool.begin().await.unwrap();
    OperationRepo::record(
        &mut tx,
        &NewOperation {
            user_id,
            segment_slug: "AVITO_TEST",
            date: Utc.with_ymd_and_hms(2023, month, day, 12, 0, 0).unwrap(),
            action,
            auto_add: false,
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
}

/// Strip scheme and authority from a report URL.
fn url_path(url: &str) -> &str {
    let prefix = format!("http://{TEST_HOST}:{TEST_PORT}");
    assert!(url.starts_with(&prefix), "unexpected report url {url}");
    &url[prefix.len()..]
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_then_download_report(pool: PgPool) {
    record(&pool, 2, OperationAction::Add, 3, 8).await;
    record(&pool, 1, OperationAction::Add, 10, 8).await;
    record(&pool, 1, OperationAction::Delete, 20, 8).await;
    record(&pool, 5, OperationAction::Add, 1, 9).await;

    let app = build_test_app(pool);
    let response = post_json(app.router(), "/api/v1/users/report", json!({"date": "2023-08"})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let report_url = body_json(response).await["report_url"]
        .as_str()
        .expect("report_url should be a string")
        .to_string();
    let path = url_path(&report_url).to_string();
    assert!(path.starts_with("/api/v1/users/report/"));

    let download = get(app.router(), &path).await;
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(download.headers()[header::CONTENT_TYPE], "text/csv");
    let disposition = download.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains(".csv"));

    assert_eq!(
        body_text(download).await,
        "user id,segment_slug,action,date\n\
         1,AVITO_TEST,add,2023-08-10 12:00:00\n\
         1,AVITO_TEST,delete,2023-08-20 12:00:00\n\
         2,AVITO_TEST,add,2023-08-03 12:00:00\n"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn report_file_lands_in_reports_dir(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(app.router(), "/api/v1/users/report", json!({"date": "2023-01"})).await;
    let report_url = body_json(response).await["report_url"]
        .as_str()
        .unwrap()
        .to_string();
    let id = report_url.rsplit('/').next().unwrap();

    let file = app.reports_dir.path().join(format!("{id}.csv"));
    assert!(file.exists(), "report file {} should exist", file.display());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bad_month_returns_400(pool: PgPool) {
    let app = build_test_app(pool);
    for date in ["2023-8", "08-2023", "2023-13", "yesterday", ""] {
        let response = post_json(app.router(), "/api/v1/users/report", json!({"date": date})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "date {date:?}");
        let json = body_json(response).await;
        assert_eq!(json["field"], "date");
        assert_eq!(json["message"], "invalid date (year-month, e.g. 2023-08)");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_report_id_returns_400(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app.router(), "/api/v1/users/report/not-a-uuid").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["field"], "id");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_report_file_is_internal_error(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(
        app.router(),
        "/api/v1/users/report/6f1c2b1e-3d7a-4c55-9a0e-2f4b8d9e1a77",
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "INTERNAL_ERROR");
    assert!(json.get("field").is_none());
}
