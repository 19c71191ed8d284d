//! # Scoring — Bulls and Cows Feedback
//!
//! Pure digit comparison between a guess and the day's target. A **bull** is a
//! digit matching both value and position. A **cow** is a non-bull digit that
//! occurs anywhere in the target (existence test: a digit appearing once in
//! the target can yield a cow for every non-bull occurrence of that digit in
//! the guess). The existence test is deliberate and load-bearing for the
//! recorded statistics; see the tests pinning `score(4111, 1123) == (1, 2)`.

/// Number of digits in every guess and target.
pub const GUESS_DIGITS: usize = 4;

/// Largest representable target/guess value.
pub const MAX_NUMBER: u16 = 9999;

/// A zero-padded 4-digit decomposition, most significant digit first.
///
/// `Digits` is the only type the scorer accepts, so out-of-range or malformed
/// input is rejected at construction and can never reach the comparison loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digits([u8; GUESS_DIGITS]);

impl Digits {
    /// Decompose a number in [0, 9999] into zero-padded digits.
    /// Returns `None` for out-of-range values.
    pub fn from_number(n: i64) -> Option<Self> {
        if !(0..=MAX_NUMBER as i64).contains(&n) {
            return None;
        }
        let n = n as u16;
        Some(Digits([
            (n / 1000 % 10) as u8,
            (n / 100 % 10) as u8,
            (n / 10 % 10) as u8,
            (n % 10) as u8,
        ]))
    }

    /// Recompose the numeric value.
    pub fn number(&self) -> u16 {
        self.0
            .iter()
            .fold(0u16, |acc, &d| acc * 10 + d as u16)
    }

    /// True if digit `d` occurs in any position.
    pub fn contains(&self, d: u8) -> bool {
        self.0.contains(&d)
    }

    /// The raw digit array, most significant first.
    pub fn as_array(&self) -> [u8; GUESS_DIGITS] {
        self.0
    }
}

impl std::fmt::Display for Digits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.number())
    }
}

/// Parse a submitted guess string into its numeric value.
///
/// Accepts 1 to 4 ASCII digits (shorter inputs are treated as zero-padded,
/// so `"123"` and `"0123"` are the same guess). Everything else is rejected:
/// empty input, signs, inner whitespace, inputs longer than 4 characters.
pub fn parse_guess(input: &str) -> Option<u16> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.len() > GUESS_DIGITS {
        return None;
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u16>().ok()
}

/// Compare a guess against the target, returning `(bulls, cows)`.
///
/// Position-by-position: an exact match counts as a bull; otherwise the
/// guessed digit counts as a cow if it occurs anywhere in the target. Cows
/// are not multiplicity-limited.
pub fn score(guess: Digits, target: Digits) -> (u32, u32) {
    let mut bulls = 0;
    let mut cows = 0;
    let g = guess.as_array();
    let t = target.as_array();
    for i in 0..GUESS_DIGITS {
        if g[i] == t[i] {
            bulls += 1;
        } else if target.contains(g[i]) {
            cows += 1;
        }
    }
    (bulls, cows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: i64) -> Digits {
        Digits::from_number(n).expect("in-range test value")
    }

    #[test]
    fn digits_from_number_zero_pads() {
        assert_eq!(d(7).as_array(), [0, 0, 0, 7]);
        assert_eq!(d(123).as_array(), [0, 1, 2, 3]);
        assert_eq!(d(9999).as_array(), [9, 9, 9, 9]);
        assert_eq!(d(0).as_array(), [0, 0, 0, 0]);
    }

    #[test]
    fn digits_from_number_rejects_out_of_range() {
        assert!(Digits::from_number(-1).is_none());
        assert!(Digits::from_number(10000).is_none());
        assert!(Digits::from_number(i64::MAX).is_none());
    }

    #[test]
    fn digits_number_roundtrip() {
        for n in [0, 1, 42, 999, 1000, 4271, 9999] {
            assert_eq!(d(n).number() as i64, n);
        }
    }

    #[test]
    fn digits_display_zero_pads() {
        assert_eq!(d(7).to_string(), "0007");
        assert_eq!(d(4271).to_string(), "4271");
    }

    #[test]
    fn parse_guess_accepts_plain_digits() {
        assert_eq!(parse_guess("4271"), Some(4271));
        assert_eq!(parse_guess("0042"), Some(42));
        assert_eq!(parse_guess("7"), Some(7));
        assert_eq!(parse_guess(" 123 "), Some(123));
    }

    #[test]
    fn parse_guess_rejects_malformed_input() {
        let bad = ["", "  ", "12345", "-123", "+123", "12a4", "1 23", "1.5", "٤٢٧١"];
        for input in bad {
            assert_eq!(parse_guess(input), None, "should reject {:?}", input);
        }
    }

    #[test]
    fn score_perfect_match_is_all_bulls() {
        for n in [0, 7, 1123, 4271, 9999] {
            assert_eq!(score(d(n), d(n)), (GUESS_DIGITS as u32, 0));
        }
    }

    #[test]
    fn score_no_shared_digits_is_zero() {
        assert_eq!(score(d(1111), d(2222)), (0, 0));
        assert_eq!(score(d(1234), d(5678)), (0, 0));
    }

    #[test]
    fn score_counts_cows_by_existence_not_multiplicity() {
        // Target 1123 holds one '1' at position 0 plus another at position 1.
        // Guess 4111: position 1 is a bull ('1' == '1'); the remaining two
        // '1's each count as cows because '1' exists in the target.
        assert_eq!(score(d(4111), d(1123)), (1, 2));

        // Guess 1111 vs target 1123: bulls at positions 0 and 1, and the two
        // non-bull '1's both still find a '1' in the target.
        assert_eq!(score(d(1111), d(1123)), (2, 2));
    }

    #[test]
    fn score_mixed_bulls_and_cows() {
        // Target 4271, guess 1234: position 1 digit '2' matches exactly (one
        // bull); '1' and '4' exist elsewhere in the target (two cows); '3'
        // appears nowhere.
        assert_eq!(score(d(1234), d(4271)), (1, 2));
    }

    #[test]
    fn score_handles_leading_zeros() {
        // 42 zero-pads to 0042, 40 to 0040: bulls at positions 0, 1, 2, and
        // the trailing '0' of the guess still exists in the target (cow).
        assert_eq!(score(d(40), d(42)), (3, 1));
        // 0042 vs 4200: no positions line up; '0','0','4','2' all exist.
        assert_eq!(score(d(42), d(4200)), (0, 4));
    }
}
