//! Daily mystery numbers: day-key computation, target generation, and the
//! get-or-create path that gives every process the same row for a given
//! day.
//!
//! A day-key is the Unix timestamp of local midnight for the configured
//! UTC offset, so all instants within one local day collapse to one key.
//! The offset is fixed (no DST), which keeps the math pure integer
//! arithmetic.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::score::MAX_NUMBER;

use super::{DailyStatsRow, Database, MysteryRow};

/// Seconds per day.
const DAY_SECS: i64 = 86_400;

/// Unix timestamp of local midnight containing `now` at the given fixed
/// UTC offset.
pub fn day_key_at(now: DateTime<Utc>, offset_secs: i32) -> i64 {
    let off = offset_secs as i64;
    (now.timestamp() + off).div_euclid(DAY_SECS) * DAY_SECS - off
}

/// Draw the target for a day. With a seed the draw is a pure function of
/// (seed, day_key); without one it comes from the thread RNG.
pub fn draw_number(seed: Option<u64>, day_key: i64) -> u16 {
    match seed {
        Some(s) => StdRng::seed_from_u64(s ^ day_key as u64).gen_range(0..=MAX_NUMBER),
        None => rand::thread_rng().gen_range(0..=MAX_NUMBER),
    }
}

impl Database {
    /// Fetch the current day's mystery row, creating it if this is the
    /// first request of the day.
    ///
    /// Concurrent first requests race on the insert; `ON CONFLICT DO
    /// NOTHING` lets exactly one row win and every caller re-reads it, so
    /// all of them see the same number.
    pub async fn get_or_create_today(
        &self,
        now: DateTime<Utc>,
        offset_secs: i32,
        seed: Option<u64>,
    ) -> Result<MysteryRow> {
        let day_key = day_key_at(now, offset_secs);
        if let Some(row) = self.get_mystery_by_day_key(day_key).await? {
            return Ok(row);
        }

        let number = draw_number(seed, day_key);
        sqlx::query(
            "INSERT INTO mystery_numbers (day_key, number)
             VALUES ($1, $2)
             ON CONFLICT (day_key) DO NOTHING",
        )
        .bind(day_key)
        .bind(number as i32)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, MysteryRow>(
            "SELECT * FROM mystery_numbers WHERE day_key = $1",
        )
        .bind(day_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_mystery_by_day_key(&self, day_key: i64) -> Result<Option<MysteryRow>> {
        let row = sqlx::query_as::<_, MysteryRow>(
            "SELECT * FROM mystery_numbers WHERE day_key = $1",
        )
        .bind(day_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Aggregates for one day across all players. The target itself stays
    /// out of the projection.
    pub async fn get_daily_stats(&self, day_key: i64) -> Result<Option<DailyStatsRow>> {
        let row = sqlx::query_as::<_, DailyStatsRow>(
            "SELECT m.day_key,
                    m.tries,
                    m.successes,
                    m.attempts,
                    (SELECT COUNT(*) FROM attempts a WHERE a.mystery_id = m.id) AS players,
                    CASE WHEN m.attempts > 0
                         THEN m.successes::float8 / m.attempts
                         ELSE 0 END AS success_rate
             FROM mystery_numbers m
             WHERE m.day_key = $1",
        )
        .bind(day_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn day_key_is_midnight_utc_with_zero_offset() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 17, 42, 9).unwrap();
        let midnight = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(day_key_at(now, 0), midnight.timestamp());
    }

    #[test]
    fn day_key_is_stable_within_a_day() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 1).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap();
        assert_eq!(day_key_at(morning, 0), day_key_at(night, 0));
    }

    #[test]
    fn day_key_changes_at_midnight() {
        let before = Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap();
        assert_eq!(day_key_at(after, 0) - day_key_at(before, 0), DAY_SECS);
    }

    #[test]
    fn positive_offset_shifts_the_boundary() {
        // 23:30 UTC at +01:00 is already 00:30 the next local day.
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 23, 30, 0).unwrap();
        let key_utc = day_key_at(now, 0);
        let key_plus_one = day_key_at(now, 3600);
        assert_eq!(key_plus_one - key_utc, DAY_SECS - 3600);
    }

    #[test]
    fn negative_offset_shifts_the_boundary() {
        // 02:00 UTC at -05:00 is still 21:00 the previous local day.
        let now = Utc.with_ymd_and_hms(2024, 3, 16, 2, 0, 0).unwrap();
        let key_utc = day_key_at(now, 0);
        let key_minus_five = day_key_at(now, -5 * 3600);
        assert!(key_minus_five < key_utc);
        assert_eq!((key_utc - key_minus_five) % 3600, 0);
    }

    #[test]
    fn day_key_handles_pre_epoch_instants() {
        let now = Utc.with_ymd_and_hms(1969, 12, 31, 18, 0, 0).unwrap();
        let key = day_key_at(now, 0);
        assert_eq!(key, -DAY_SECS);
    }

    #[test]
    fn seeded_draw_is_deterministic() {
        let a = draw_number(Some(42), 1_700_000_000);
        let b = draw_number(Some(42), 1_700_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn seeded_draw_varies_by_day() {
        // Not guaranteed for every pair, but these differ for this seed.
        let a = draw_number(Some(42), 0);
        let b = draw_number(Some(42), DAY_SECS);
        assert_ne!(a, b);
    }

    #[test]
    fn draw_stays_in_range() {
        for day in 0..200 {
            let n = draw_number(Some(7), day * DAY_SECS);
            assert!(n <= MAX_NUMBER);
        }
        for _ in 0..200 {
            let n = draw_number(None, 0);
            assert!(n <= MAX_NUMBER);
        }
    }
}
