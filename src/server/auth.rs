//! JWT auth for the game API.
//!
//! The server mints its own HS256 tokens at login. Handlers accept the token
//! from the `Authorization: Bearer <token>` header or, for browser clients,
//! from the `access_token` cookie set alongside the login response. The
//! `RequireAuth` extractor resolves the token to a live `users` row and
//! rejects with 401 otherwise.
//!
//! Passwords are stored as salted SHA-256 digests in the form
//! `sha256$<salt_hex>$<digest_hex>`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::TOKEN_TTL_SECS;
use crate::db;

use super::AppState;

/// Cookie carrying the session token for browser clients.
pub const TOKEN_COOKIE: &str = "access_token";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user ID (UUID).
    sub: String,
    /// Expiry as a Unix timestamp.
    exp: i64,
}

/// Issue a token for a user, expiring after the session TTL.
pub fn mint_token(secret: &str, user_id: uuid::Uuid) -> Result<String, jsonwebtoken::errors::Error> {
    mint_token_with_exp(secret, user_id, chrono::Utc::now().timestamp() + TOKEN_TTL_SECS)
}

fn mint_token_with_exp(
    secret: &str,
    user_id: uuid::Uuid,
    exp: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify an HS256 token, including expiry.
fn decode_token(secret: &str, token: &str) -> Result<Claims, String> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| format!("JWT verification failed: {}", e))?;
    Ok(data.claims)
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let auth_header = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    auth_header.strip_prefix("Bearer ").map(|t| t.to_string())
}

fn token_from_cookie(parts: &Parts) -> Option<String> {
    let cookies = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    parse_cookie(cookies, TOKEN_COOKIE)
}

fn parse_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        if k == name {
            Some(v.to_string())
        } else {
            None
        }
    })
}

/// `Set-Cookie` value installing the session token.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        TOKEN_COOKIE, token, TOKEN_TTL_SECS
    )
}

/// `Set-Cookie` value clearing the session token.
pub fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax", TOKEN_COOKIE)
}

/// Resolve the request's token to a user row.
///
/// Call this from handlers that need optional auth. For required auth,
/// use the `RequireAuth` extractor instead.
pub async fn extract_auth_user(state: &Arc<AppState>, parts: &Parts) -> Option<db::UserRow> {
    let token = bearer_token(parts).or_else(|| token_from_cookie(parts))?;
    let claims = decode_token(&state.settings.jwt_secret, &token).ok()?;
    let user_id = uuid::Uuid::parse_str(&claims.sub).ok()?;
    state.db.get_user_by_id(user_id).await.ok().flatten()
}

/// Axum extractor that requires any authenticated user.
///
/// Returns 401 if no valid token is present or the user no longer exists.
pub struct RequireAuth(pub db::UserRow);

impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = extract_auth_user(state, parts).await.ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "Authentication required"})),
            )
                .into_response()
        })?;

        Ok(RequireAuth(user))
    }
}

// ── Password hashing ────────────────────────────────────────────

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_hex = hex_encode(&salt);
    let digest = salted_digest(&salt_hex, password);
    format!("sha256${}${}", salt_hex, digest)
}

/// Check a candidate password against a stored digest. Comparison runs over
/// every byte regardless of where the first mismatch occurs.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(scheme), Some(salt_hex), Some(digest)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != "sha256" {
        return false;
    }
    constant_time_eq(&salted_digest(salt_hex, candidate), digest)
}

fn salted_digest(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
