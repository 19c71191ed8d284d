//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::OnceCell;
use tower::ServiceExt;

/// Returns the test database URL from the `TEST_DATABASE_URL` environment variable.
/// Panics if the variable is not set.
pub fn test_db_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for integration tests")
}

/// Returns true if the test database URL is configured.
pub fn has_test_db() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

/// One-time schema initialization.
static SCHEMA_INIT: OnceCell<()> = OnceCell::const_new();

/// Ensure the test database schema is set up (applies the schema once per test suite).
pub async fn ensure_schema() {
    SCHEMA_INIT
        .get_or_init(|| async {
            let db = mysterd::db::Database::connect(&test_db_url())
                .await
                .expect("Failed to connect to test database");
            db.init_schema().await.expect("Schema init failed");
        })
        .await;
}

/// Connect to the test database (also ensures schema is set up).
pub async fn setup_test_db() -> mysterd::db::Database {
    ensure_schema().await;
    let db = mysterd::db::Database::connect(&test_db_url())
        .await
        .expect("Failed to connect to test database");
    truncate_all_tables(db.pool()).await;
    db
}

/// Truncate all tables to ensure test isolation.
pub async fn truncate_all_tables(pool: &sqlx::PgPool) {
    sqlx::raw_sql("TRUNCATE TABLE guesses, attempts, mystery_numbers, users CASCADE")
        .execute(pool)
        .await
        .unwrap();
}

/// Settings used by every test app: 3 tries, history retention on, UTC day
/// boundary, deterministic daily numbers, fixed signing secret.
pub fn test_settings() -> mysterd::config::Settings {
    mysterd::config::Settings {
        allowed_tries: 3,
        keep_history: true,
        tz_offset_hours: 0,
        number_seed: Some(42),
        jwt_secret: "test-secret".to_string(),
    }
}

/// Build an Axum test app router connected to the test database, returning
/// the database handle alongside for direct assertions.
pub async fn build_test_app_with_db() -> (Router, mysterd::db::Database) {
    let db = setup_test_db().await;
    let state = mysterd::server::AppState::with_db(db.clone(), test_settings());
    (mysterd::server::build_router(state, None), db)
}

/// Build an Axum test app router connected to the test database.
pub async fn build_test_app() -> Router {
    build_test_app_with_db().await.0
}

/// Today's target number read straight from the table. Tests use it to
/// craft guaranteed hits and misses.
pub async fn today_number(db: &mysterd::db::Database) -> i32 {
    sqlx::query_scalar("SELECT number FROM mystery_numbers ORDER BY id DESC LIMIT 1")
        .fetch_one(db.pool())
        .await
        .expect("no mystery row yet")
}

/// A four-digit guess guaranteed to differ from the given target.
pub fn wrong_guess(target: i32) -> String {
    format!("{:04}", (target + 1) % 10_000)
}

// ── Request helpers ─────────────────────────────────────────────

async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or(serde_json::json!(null));
    (status, json)
}

/// Sends a GET request to the given URI and returns the status code and parsed JSON body.
///
/// If the response body is not valid JSON, returns `serde_json::json!(null)`.
pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

/// GET with a bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// Sends a POST request with a JSON body and returns the status code and parsed response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

/// POST with a JSON body and a bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

/// Register an account and log it in, returning the bearer token.
pub async fn signup_and_login(app: &Router, username: &str) -> String {
    let (status, _) = post_json(
        app.clone(),
        "/api/auth/signup",
        serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "hunter2x",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(
        app.clone(),
        "/api/auth/login",
        serde_json::json!({
            "username": username,
            "password": "hunter2x",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"]
        .as_str()
        .expect("login returns a token")
        .to_string()
}
