//! Runtime settings shared by the CLI and the HTTP server.

use anyhow::{bail, Result};

/// Session token lifetime: 15 hours, matching the cookie `Max-Age`.
pub const TOKEN_TTL_SECS: i64 = 15 * 60 * 60;

/// Fallback signing secret for local development. `serve` warns when it is
/// in effect; production deployments must set `JWT_SECRET`.
pub const DEV_JWT_SECRET: &str = "mysterd-dev-secret";

/// Game and auth knobs resolved from CLI flags and environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Guesses each user gets per day.
    pub allowed_tries: i32,
    /// Whether individual guess records are persisted.
    pub keep_history: bool,
    /// Reference time zone as whole hours east of UTC. Day boundaries are
    /// computed in this offset for every user.
    pub tz_offset_hours: i32,
    /// When set, daily numbers are drawn from a seeded generator
    /// (deterministic per day) instead of OS entropy.
    pub number_seed: Option<u64>,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
}

impl Settings {
    /// Reference offset in seconds east of UTC.
    pub fn offset_secs(&self) -> i32 {
        self.tz_offset_hours * 3600
    }

    /// Reject configurations the game cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.allowed_tries < 1 {
            bail!("--allowed-tries must be at least 1");
        }
        if !(-23..=23).contains(&self.tz_offset_hours) {
            bail!("--tz-offset-hours must be between -23 and 23");
        }
        if self.jwt_secret.is_empty() {
            bail!("JWT secret must not be empty");
        }
        Ok(())
    }
}
