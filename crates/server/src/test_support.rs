use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use db::DBService;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use utils_jwt::JwtService;

use crate::AppState;

/// Fresh sqlite database in a tempdir; dropping the guard removes it.
pub async fn test_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("db.sqlite");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
    let db = DBService::new(&db_url).await.unwrap();
    let jwt = JwtService::new(b"test-secret");
    (dir, AppState::new(db, jwt))
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers a user through the API and returns their bearer token.
pub async fn register_user(app: &Router, name: &str, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            None,
            serde_json::json!({ "name": name, "email": email, "password": "hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}
