//! # Game — Attempt State Machine
//!
//! The transition logic for one user's daily attempt: an attempt starts
//! `Active`, accepts guesses while tries remain, and ends `Solved` (exact
//! match) or `Exhausted` (try limit reached without a match). Terminal
//! attempts reject every further guess without mutating anything.
//!
//! This module is pure: it computes what a guess does to an attempt and to
//! the aggregate counters, and the storage layer applies the result inside
//! one transaction. Keeping the rules out of SQL makes the limit/counter
//! semantics directly testable.

use crate::score::{self, Digits};

/// Default per-day guess limit. Overridable via `--allowed-tries`.
pub const DEFAULT_ALLOWED_TRIES: i32 = 3;

/// Mutable state of one (user, mystery) attempt as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptState {
    pub tries_used: i32,
    pub solved: bool,
}

impl AttemptState {
    /// A fresh attempt with no guesses recorded.
    pub fn new() -> Self {
        AttemptState {
            tries_used: 0,
            solved: false,
        }
    }

    /// Terminal check: solved, or out of tries.
    pub fn finished(&self, allowed_tries: i32) -> bool {
        self.solved || self.tries_used >= allowed_tries
    }
}

impl Default for AttemptState {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single guess did to the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Exact match; the attempt is now terminal.
    Solved,
    /// Accepted miss with tries remaining.
    Failed,
    /// Accepted miss that consumed the final try; the attempt is now terminal.
    ExhaustedOnThisGuess,
    /// Rejected: the attempt was already terminal. Nothing changed.
    AlreadyFinished,
}

impl GuessOutcome {
    /// Wire identifier for API responses and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            GuessOutcome::Solved => "solved",
            GuessOutcome::Failed => "failed",
            GuessOutcome::ExhaustedOnThisGuess => "exhausted",
            GuessOutcome::AlreadyFinished => "already_finished",
        }
    }

    /// User-facing message for this outcome.
    pub fn message(&self) -> &'static str {
        match self {
            GuessOutcome::Solved => "Daily number successfully guessed!",
            GuessOutcome::Failed | GuessOutcome::ExhaustedOnThisGuess => {
                "Daily number failed, try again"
            }
            GuessOutcome::AlreadyFinished => "Cannot Guess any more for the day",
        }
    }

    /// True when the guess consumed a try (everything except a rejection).
    pub fn accepted(&self) -> bool {
        !matches!(self, GuessOutcome::AlreadyFinished)
    }
}

/// Full evaluation of one guess, ready to persist.
///
/// For an accepted guess, `state` is the post-guess attempt state and
/// `completed_now` flags the terminal transition that must bump the
/// `attempts`/`successes` aggregates exactly once. For a rejected guess
/// (`AlreadyFinished`), `state` echoes the stored state unchanged and
/// `bulls`/`cows` are absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessEvaluation {
    pub outcome: GuessOutcome,
    pub bulls: Option<u32>,
    pub cows: Option<u32>,
    pub state: AttemptState,
    pub completed_now: bool,
}

impl GuessEvaluation {
    pub fn finished(&self, allowed_tries: i32) -> bool {
        self.state.finished(allowed_tries)
    }

    pub fn guesses_remaining(&self, allowed_tries: i32) -> i32 {
        if self.state.solved {
            0
        } else {
            (allowed_tries - self.state.tries_used).max(0)
        }
    }
}

/// Apply one guess to an attempt.
///
/// Rules, in order:
/// 1. A terminal attempt rejects the guess (`AlreadyFinished`, no change).
/// 2. Otherwise the guess is scored, `tries_used` increments, and the
///    per-guess `tries` aggregates on user and mystery increment.
/// 3. An exact match sets `solved`. Solving or using the final try is the
///    terminal transition (`completed_now`), the only point at which the
///    `attempts` aggregates increment, plus `successes` iff solved.
///
/// `solved` is never set on exhaustion alone.
pub fn evaluate_guess(
    current: AttemptState,
    guess: Digits,
    target: Digits,
    allowed_tries: i32,
) -> GuessEvaluation {
    if current.finished(allowed_tries) {
        return GuessEvaluation {
            outcome: GuessOutcome::AlreadyFinished,
            bulls: None,
            cows: None,
            state: current,
            completed_now: false,
        };
    }

    let (bulls, cows) = score::score(guess, target);
    let solved = guess == target;
    let next = AttemptState {
        tries_used: current.tries_used + 1,
        solved,
    };
    let completed_now = next.finished(allowed_tries);

    let outcome = if solved {
        GuessOutcome::Solved
    } else if completed_now {
        GuessOutcome::ExhaustedOnThisGuess
    } else {
        GuessOutcome::Failed
    };

    GuessEvaluation {
        outcome,
        bulls: Some(bulls),
        cows: Some(cows),
        state: next,
        completed_now,
    }
}

/// Success ratio for ranking: `successes / attempts`, defined as 0 when no
/// attempt has completed. Never divides by zero.
pub fn success_rate(successes: i64, attempts: i64) -> f64 {
    if attempts <= 0 {
        0.0
    } else {
        successes as f64 / attempts as f64
    }
}
