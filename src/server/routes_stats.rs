//! Statistics endpoints: personal aggregates, the success-rate
//! leaderboard, and today's cross-player summary.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use super::auth::RequireAuth;
use super::AppState;

// ── GET /api/stats/me ─────────────────────────────────────────────

pub(super) async fn handler_stats_me(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    match state.db.get_user_stats(user.id).await {
        Ok(Some(stats)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "username": stats.username,
                "tries": stats.tries,
                "successes": stats.successes,
                "attempts": stats.attempts,
                "success_rate": stats.success_rate,
                "rank": stats.rank,
            })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Stats not found"})),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Stats query failed: {}", e)})),
        ),
    }
}

// ── GET /api/stats/leaderboard ────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct LeaderboardQuery {
    #[serde(default)]
    limit: Option<i64>,
}

pub(super) async fn handler_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    match state.db.get_leaderboard(limit).await {
        Ok(entries) => {
            let result: Vec<serde_json::Value> = entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    serde_json::json!({
                        "rank": i + 1,
                        "username": e.username,
                        "tries": e.tries,
                        "successes": e.successes,
                        "attempts": e.attempts,
                        "success_rate": e.success_rate,
                    })
                })
                .collect();
            (StatusCode::OK, Json(serde_json::json!(result)))
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Leaderboard query failed: {}", e)})),
        ),
    }
}

// ── GET /api/stats/daily ──────────────────────────────────────────

pub(super) async fn handler_stats_daily(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mystery = match state
        .db
        .get_or_create_today(
            Utc::now(),
            state.settings.offset_secs(),
            state.settings.number_seed,
        )
        .await
    {
        Ok(m) => m,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Database error: {}", e)})),
            );
        }
    };

    match state.db.get_daily_stats(mystery.day_key).await {
        Ok(Some(stats)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "day_key": stats.day_key,
                "tries": stats.tries,
                "successes": stats.successes,
                "attempts": stats.attempts,
                "players": stats.players,
                "success_rate": stats.success_rate,
            })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No daily stats yet"})),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Daily stats query failed: {}", e)})),
        ),
    }
}
