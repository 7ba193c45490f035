//! Request-body rejection and error envelope behaviour.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, post_json, send_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_json_returns_400(pool: PgPool) {
    let app = build_test_app(pool);
    let response = send_json(
        app.router(),
        Method::POST,
        "/api/v1/segments",
        "{\"slug\": ".to_string(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "error parsing json body");
    assert_eq!(json["error"], "BAD_REQUEST");
    assert!(json.get("field").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_field_type_returns_400(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app.router(),
        "/api/v1/users",
        json!({"segments_to_add": ["A"], "user_id": "one"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "error parsing json body");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_required_field_returns_400(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(app.router(), "/api/v1/users/report", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_content_type_returns_400(pool: PgPool) {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = build_test_app(pool);
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/v1/segments")
        .body(Body::from("{\"slug\":\"AVITO_TEST\"}"))
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "error parsing json body");
}
