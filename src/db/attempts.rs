//! Attempt rows and the transactional guess recorder.
//!
//! [`Database::record_guess`] is the only write path for game state. It
//! runs in a single transaction with the attempt row locked `FOR UPDATE`,
//! so two in-flight guesses from the same user serialize instead of both
//! reading `tries_used = 2` and sneaking past the limit. A rejected guess
//! drops the transaction without writing anything.

use anyhow::{anyhow, Result};

use crate::game::{self, AttemptState, GuessEvaluation};
use crate::score::Digits;

use super::{AttemptRow, Database, GuessRow};

impl Database {
    /// Fetch the user's attempt row for a mystery, creating it on first
    /// contact. Races on the unique (user_id, mystery_id) index resolve
    /// the same way day creation does: one insert wins, everyone re-reads.
    pub async fn get_or_create_attempt(
        &self,
        user_id: uuid::Uuid,
        mystery_id: i64,
    ) -> Result<AttemptRow> {
        sqlx::query(
            "INSERT INTO attempts (user_id, mystery_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, mystery_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(mystery_id)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, AttemptRow>(
            "SELECT * FROM attempts WHERE user_id = $1 AND mystery_id = $2",
        )
        .bind(user_id)
        .bind(mystery_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_attempt(
        &self,
        user_id: uuid::Uuid,
        mystery_id: i64,
    ) -> Result<Option<AttemptRow>> {
        let row = sqlx::query_as::<_, AttemptRow>(
            "SELECT * FROM attempts WHERE user_id = $1 AND mystery_id = $2",
        )
        .bind(user_id)
        .bind(mystery_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Evaluate and persist one guess.
    ///
    /// All effects of an accepted guess commit together: the attempt row,
    /// both aggregate rows, and (when retention is on) the history record.
    /// A guess against a finished attempt returns its evaluation without
    /// touching the database.
    pub async fn record_guess(
        &self,
        user_id: uuid::Uuid,
        mystery_id: i64,
        number: u16,
        allowed_tries: i32,
        keep_history: bool,
    ) -> Result<GuessEvaluation> {
        let mut tx = self.pool.begin().await?;

        let attempt = sqlx::query_as::<_, AttemptRow>(
            "SELECT * FROM attempts WHERE user_id = $1 AND mystery_id = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(mystery_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| anyhow!("no attempt row for user {} on mystery {}", user_id, mystery_id))?;

        let target: i32 = sqlx::query_scalar("SELECT number FROM mystery_numbers WHERE id = $1")
            .bind(mystery_id)
            .fetch_one(&mut *tx)
            .await?;

        let guess_digits = Digits::from_number(i64::from(number))
            .ok_or_else(|| anyhow!("guess {} is out of range", number))?;
        let target_digits = Digits::from_number(i64::from(target))
            .ok_or_else(|| anyhow!("stored number {} is out of range", target))?;

        let state = AttemptState {
            tries_used: attempt.tries_used,
            solved: attempt.solved,
        };
        let eval = game::evaluate_guess(state, guess_digits, target_digits, allowed_tries);

        if !eval.outcome.accepted() {
            // Dropping the transaction rolls back; nothing was written.
            return Ok(eval);
        }

        sqlx::query("UPDATE attempts SET tries_used = $1, solved = $2 WHERE id = $3")
            .bind(eval.state.tries_used)
            .bind(eval.state.solved)
            .bind(attempt.id)
            .execute(&mut *tx)
            .await?;

        // Lifetime aggregates move on every accepted guess; the attempt and
        // success columns only when this guess finished the day.
        let (inc_attempts, inc_successes) = if eval.completed_now {
            (1i64, if eval.state.solved { 1i64 } else { 0 })
        } else {
            (0, 0)
        };

        sqlx::query(
            "UPDATE users
             SET tries = tries + 1, attempts = attempts + $1, successes = successes + $2
             WHERE id = $3",
        )
        .bind(inc_attempts)
        .bind(inc_successes)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE mystery_numbers
             SET tries = tries + 1, attempts = attempts + $1, successes = successes + $2
             WHERE id = $3",
        )
        .bind(inc_attempts)
        .bind(inc_successes)
        .bind(mystery_id)
        .execute(&mut *tx)
        .await?;

        if keep_history {
            sqlx::query(
                "INSERT INTO guesses (attempt_id, user_id, number, bulls, cows)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(attempt.id)
            .bind(user_id)
            .bind(i32::from(number))
            .bind(eval.bulls.unwrap_or(0) as i32)
            .bind(eval.cows.unwrap_or(0) as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(eval)
    }

    /// Guess history for one attempt, oldest first. Empty when retention
    /// is off.
    pub async fn get_guesses_for_attempt(&self, attempt_id: i64) -> Result<Vec<GuessRow>> {
        let rows = sqlx::query_as::<_, GuessRow>(
            "SELECT * FROM guesses WHERE attempt_id = $1 ORDER BY id ASC",
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
