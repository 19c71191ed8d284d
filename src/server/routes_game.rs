//! Game endpoints: today's attempt status, guess submission, and guess
//! history.
//!
//! Every handler resolves the current day through the get-or-create path,
//! so the first player of a day (or the first request after midnight)
//! creates the row everyone else reads. The target number itself never
//! appears in any response.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{AttemptRow, MysteryRow};
use crate::prom_metrics::OutcomeLabel;
use crate::score;

use super::auth::RequireAuth;
use super::AppState;

/// Resolve today's mystery row, creating it on first contact.
async fn today_mystery(
    state: &Arc<AppState>,
) -> Result<MysteryRow, (StatusCode, Json<serde_json::Value>)> {
    state
        .db
        .get_or_create_today(
            Utc::now(),
            state.settings.offset_secs(),
            state.settings.number_seed,
        )
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Database error: {}", e)})),
            )
        })
}

async fn user_attempt(
    state: &Arc<AppState>,
    user_id: uuid::Uuid,
    mystery_id: i64,
) -> Result<AttemptRow, (StatusCode, Json<serde_json::Value>)> {
    state
        .db
        .get_or_create_attempt(user_id, mystery_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Database error: {}", e)})),
            )
        })
}

// ── GET /api/game/today ───────────────────────────────────────────

pub(super) async fn handler_today(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let mystery = match today_mystery(&state).await {
        Ok(m) => m,
        Err(e) => return e,
    };
    let attempt = match user_attempt(&state, user.id, mystery.id).await {
        Ok(a) => a,
        Err(e) => return e,
    };

    let allowed = state.settings.allowed_tries;
    let finished = attempt.solved || attempt.tries_used >= allowed;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "day_key": mystery.day_key,
            "allowed_tries": allowed,
            "tries_used": attempt.tries_used,
            "solved": attempt.solved,
            "finished": finished,
            "guesses_remaining": (allowed - attempt.tries_used).max(0),
        })),
    )
}

// ── POST /api/game/guess ──────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct GuessPayload {
    number: serde_json::Value,
}

/// Accept the guess as either a JSON string ("0042") or a JSON integer
/// (42). Anything else, or anything outside four digits, is rejected.
fn parse_guess_value(value: &serde_json::Value) -> Option<u16> {
    match value {
        serde_json::Value::String(s) => score::parse_guess(s),
        serde_json::Value::Number(n) => {
            let i = n.as_i64()?;
            if (0..=i64::from(score::MAX_NUMBER)).contains(&i) {
                Some(i as u16)
            } else {
                None
            }
        }
        _ => None,
    }
}

pub(super) async fn handler_guess(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<GuessPayload>,
) -> impl IntoResponse {
    let number = match parse_guess_value(&payload.number) {
        Some(n) => n,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Guess must be a number of at most 4 digits"})),
            );
        }
    };

    let mystery = match today_mystery(&state).await {
        Ok(m) => m,
        Err(e) => return e,
    };
    if let Err(e) = user_attempt(&state, user.id, mystery.id).await {
        return e;
    }

    let allowed = state.settings.allowed_tries;
    let eval = match state
        .db
        .record_guess(
            user.id,
            mystery.id,
            number,
            allowed,
            state.settings.keep_history,
        )
        .await
    {
        Ok(ev) => ev,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Guess failed: {}", e)})),
            );
        }
    };

    state
        .prom_metrics
        .guesses
        .get_or_create(&OutcomeLabel {
            outcome: eval.outcome.as_str().to_string(),
        })
        .inc();
    if eval.completed_now && eval.state.solved {
        state.prom_metrics.solves.inc();
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "outcome": eval.outcome.as_str(),
            "message": eval.outcome.message(),
            "bulls": eval.bulls,
            "cows": eval.cows,
            "tries_used": eval.state.tries_used,
            "solved": eval.state.solved,
            "finished": eval.finished(allowed),
            "guesses_remaining": eval.guesses_remaining(allowed),
        })),
    )
}

// ── GET /api/game/history ─────────────────────────────────────────

pub(super) async fn handler_history(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    if !state.settings.keep_history {
        return (
            StatusCode::OK,
            Json(serde_json::json!({
                "history_enabled": false,
                "guesses": [],
            })),
        );
    }

    let mystery = match today_mystery(&state).await {
        Ok(m) => m,
        Err(e) => return e,
    };

    let attempt = match state.db.get_attempt(user.id, mystery.id).await {
        Ok(a) => a,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Database error: {}", e)})),
            );
        }
    };
    let Some(attempt) = attempt else {
        return (
            StatusCode::OK,
            Json(serde_json::json!({
                "history_enabled": true,
                "guesses": [],
            })),
        );
    };

    match state.db.get_guesses_for_attempt(attempt.id).await {
        Ok(rows) => {
            let guesses: Vec<serde_json::Value> = rows
                .iter()
                .map(|g| {
                    serde_json::json!({
                        "number": format!("{:04}", g.number),
                        "bulls": g.bulls,
                        "cows": g.cows,
                        "created_at": g.created_at,
                    })
                })
                .collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "history_enabled": true,
                    "guesses": guesses,
                })),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("History query failed: {}", e)})),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_value_accepts_strings_and_integers() {
        assert_eq!(parse_guess_value(&serde_json::json!("0042")), Some(42));
        assert_eq!(parse_guess_value(&serde_json::json!("9999")), Some(9999));
        assert_eq!(parse_guess_value(&serde_json::json!(7)), Some(7));
        assert_eq!(parse_guess_value(&serde_json::json!(0)), Some(0));
    }

    #[test]
    fn guess_value_rejects_out_of_range_and_junk() {
        assert_eq!(parse_guess_value(&serde_json::json!("12345")), None);
        assert_eq!(parse_guess_value(&serde_json::json!(10000)), None);
        assert_eq!(parse_guess_value(&serde_json::json!(-1)), None);
        assert_eq!(parse_guess_value(&serde_json::json!(12.5)), None);
        assert_eq!(parse_guess_value(&serde_json::json!(null)), None);
        assert_eq!(parse_guess_value(&serde_json::json!(["1234"])), None);
    }
}
