//! Account operations: registration, lookups, personal stats, and the
//! success-rate leaderboard.
//!
//! Success rate is `successes / attempts` computed in SQL with a guard so
//! players who never finished a day report `0.0` instead of dividing by
//! zero. Rank counts players with a strictly greater rate; ties share a
//! rank and order by username where a list is returned.

use anyhow::Result;

use super::{Database, LeaderboardRow, UserRow, UserStatsRow};

impl Database {
    /// Insert a new account. The unique indexes on `username` and `email`
    /// surface duplicates as database errors for the caller to classify.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_digest: &str,
    ) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (username, email, password_digest)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(username)
        .bind(email)
        .bind(password_digest)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_user_by_id(&self, id: uuid::Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Personal aggregates plus rank among all players.
    pub async fn get_user_stats(&self, id: uuid::Uuid) -> Result<Option<UserStatsRow>> {
        let row = sqlx::query_as::<_, UserStatsRow>(
            "SELECT u.username,
                    u.tries,
                    u.successes,
                    u.attempts,
                    CASE WHEN u.attempts > 0
                         THEN u.successes::float8 / u.attempts
                         ELSE 0 END AS success_rate,
                    (SELECT COUNT(*) + 1 FROM users u2
                     WHERE CASE WHEN u2.attempts > 0
                                THEN u2.successes::float8 / u2.attempts
                                ELSE 0 END
                         > CASE WHEN u.attempts > 0
                                THEN u.successes::float8 / u.attempts
                                ELSE 0 END) AS rank
             FROM users u
             WHERE u.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Top players by success rate, ties broken by username.
    pub async fn get_leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardRow>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            "SELECT username,
                    tries,
                    successes,
                    attempts,
                    CASE WHEN attempts > 0
                         THEN successes::float8 / attempts
                         ELSE 0 END AS success_rate
             FROM users
             ORDER BY success_rate DESC, username ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a demo account if it does not already exist. Used by
    /// `init-db --seed-demo`; safe to run repeatedly.
    pub async fn seed_demo_user(
        &self,
        username: &str,
        email: &str,
        password_digest: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (username, email, password_digest)
             VALUES ($1, $2, $3)
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(username)
        .bind(email)
        .bind(password_digest)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
