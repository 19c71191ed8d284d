//! Account endpoints: signup, login, logout, and the current-user view.
//!
//! Login responses carry the token twice: in the JSON body for API clients
//! and as an `HttpOnly` cookie for the built-in page. Responses never
//! include the password digest.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::TOKEN_TTL_SECS;

use super::auth::{self, RequireAuth};
use super::AppState;

// ── POST /api/auth/signup ─────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct SignupPayload {
    username: String,
    email: String,
    password: String,
}

pub(super) async fn handler_signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupPayload>,
) -> impl IntoResponse {
    // Basic validation
    if payload.username.len() < 3 || payload.username.len() > 32 {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Username must be 3-32 characters"})),
        );
    }
    if !payload.email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid email address"})),
        );
    }
    if payload.password.len() < 6 {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Password must be at least 6 characters"})),
        );
    }

    let digest = auth::hash_password(&payload.password);
    match state
        .db
        .create_user(&payload.username, &payload.email, &digest)
        .await
    {
        Ok(user) => {
            state.prom_metrics.signups.inc();
            (
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "id": user.id,
                    "username": user.username,
                })),
            )
        }
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                (
                    StatusCode::CONFLICT,
                    Json(serde_json::json!({"error": "Username or email already registered"})),
                )
            } else {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": format!("Signup failed: {}", e)})),
                )
            }
        }
    }
}

// ── POST /api/auth/login ──────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct LoginPayload {
    username: String,
    password: String,
}

pub(super) async fn handler_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> axum::response::Response {
    let user = match state.db.get_user_by_username(&payload.username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "Invalid username or password"})),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Database error: {}", e)})),
            )
                .into_response();
        }
    };

    if !auth::verify_password(&user.password_digest, &payload.password) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "Invalid username or password"})),
        )
            .into_response();
    }

    let token = match auth::mint_token(&state.settings.jwt_secret, user.id) {
        Ok(t) => t,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Token minting failed: {}", e)})),
            )
                .into_response();
        }
    };

    state.prom_metrics.logins.inc();
    (
        StatusCode::OK,
        [(header::SET_COOKIE, auth::session_cookie(&token))],
        Json(serde_json::json!({
            "token": token,
            "expires_in": TOKEN_TTL_SECS,
        })),
    )
        .into_response()
}

// ── POST /api/auth/logout ─────────────────────────────────────────

pub(super) async fn handler_logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, auth::clear_session_cookie())],
        Json(serde_json::json!({"ok": true})),
    )
}

// ── GET /api/auth/me ──────────────────────────────────────────────

pub(super) async fn handler_me(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "tries": user.tries,
            "successes": user.successes,
            "attempts": user.attempts,
            "created_at": user.created_at,
        })),
    )
}
