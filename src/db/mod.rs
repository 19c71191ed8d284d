//! # Database — PostgreSQL Storage Layer
//!
//! Async storage for accounts, daily numbers, and attempt tracking via
//! `sqlx::PgPool`.
//!
//! ## Schema
//!
//! - `users`: credentials plus the lifetime aggregates (tries, successes,
//!   attempts)
//! - `mystery_numbers`: one row per day-key with the target value and the
//!   same aggregates across all players of that day
//! - `attempts`: the (user, mystery) join row carrying tries_used/solved
//! - `guesses`: optional per-guess history (written only when retention is
//!   enabled)
//!
//! ## Module Structure
//!
//! Operations are split into submodules by domain:
//!
//! - [`users`] — registration, lookups, personal stats, leaderboard
//! - [`mystery`] — day-key math, number generation, get-or-create
//! - [`attempts`] — attempt rows and the transactional guess recorder
//!
//! ## Consistency
//!
//! Recording a guess touches four tables. The whole mutation runs in one
//! transaction with the attempt row locked `FOR UPDATE`, so concurrent
//! guesses by the same user serialize and a failure leaves no partial
//! update. Day-key creation races resolve through the unique index plus a
//! re-read of the winning row.

mod attempts;
mod mystery;
mod users;

use anyhow::Result;
use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};

// ── Row types ───────────────────────────────────────────────────

/// Account row from the `users` table. Carries the password digest, so this
/// type is never serialized; responses pick fields explicitly.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: uuid::Uuid,
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub tries: i64,
    pub successes: i64,
    pub attempts: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One day's target number and its aggregates. Not serialized as a whole:
/// `number` must never leave the server while the day is live.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MysteryRow {
    pub id: i64,
    pub day_key: i64,
    pub number: i32,
    pub tries: i64,
    pub successes: i64,
    pub attempts: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The (user, mystery) join row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttemptRow {
    pub id: i64,
    pub user_id: uuid::Uuid,
    pub mystery_id: i64,
    pub tries_used: i32,
    pub solved: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Per-guess history record.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GuessRow {
    pub id: i64,
    pub attempt_id: i64,
    pub user_id: uuid::Uuid,
    pub number: i32,
    pub bulls: i32,
    pub cows: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Personal stats with rank by success rate.
#[derive(Serialize, sqlx::FromRow)]
pub struct UserStatsRow {
    pub username: String,
    pub tries: i64,
    pub successes: i64,
    pub attempts: i64,
    pub success_rate: f64,
    pub rank: Option<i64>,
}

/// Leaderboard entry ordered by success rate.
#[derive(Serialize, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub username: String,
    pub tries: i64,
    pub successes: i64,
    pub attempts: i64,
    pub success_rate: f64,
}

/// Aggregates for one day across all players. Excludes the number itself.
#[derive(Serialize, sqlx::FromRow)]
pub struct DailyStatsRow {
    pub day_key: i64,
    pub tries: i64,
    pub successes: i64,
    pub attempts: i64,
    pub players: Option<i64>,
    pub success_rate: f64,
}

// ── Database struct and connection ──────────────────────────────

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL using the provided database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Database { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check: execute `SELECT 1` to verify database connectivity.
    ///
    /// Used by the `/readyz` readiness probe. Returns `Ok(())` if the
    /// database responds, or an error if the connection is broken.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    /// Apply the embedded schema. Idempotent; used by `init-db` and the test
    /// harness.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(include_str!("../../migrations/0001_init.sql"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
