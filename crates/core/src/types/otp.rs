//! One-time delivery codes.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    /// The input is not exactly six characters long.
    #[error("otp must be exactly {expected} digits (got {actual})")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
        /// Number of characters supplied.
        actual: usize,
    },
    /// The input contains a character other than `0`-`9`.
    #[error("otp must contain only ASCII digits")]
    NonDigit,
}

/// A six-digit delivery confirmation code.
///
/// Leading zeros are significant: `"004521"` and `"4521"` are different codes.
/// Candidate codes are compared as opaque text with [`OtpCode::matches`]; no
/// trimming or numeric normalization is applied.
///
/// `Debug` output is redacted so codes do not leak into logs.
///
/// ```
/// use lastmile_core::OtpCode;
///
/// let otp = OtpCode::parse("048213").unwrap();
/// assert!(otp.matches("048213"));
/// assert!(!otp.matches("48213"));
/// assert!(!otp.matches(" 048213"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in every code.
    pub const LENGTH: usize = 6;

    /// Exclusive upper bound of the numeric code space.
    const SPACE: u32 = 1_000_000;

    /// Draw a uniformly distributed code from the given random source.
    #[must_use]
    pub fn generate<R: RandomSource + ?Sized>(rng: &R) -> Self {
        let value = rng.below(Self::SPACE);
        Self(format!("{value:06}"))
    }

    /// Parse an `OtpCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OtpError> {
        if s.len() != Self::LENGTH {
            return Err(OtpError::WrongLength {
                expected: Self::LENGTH,
                actual: s.chars().count(),
            });
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpError::NonDigit);
        }
        Ok(Self(s.to_owned()))
    }

    /// Check a candidate code against this one.
    ///
    /// Exact byte equality, evaluated in constant time for equal-length input.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq::constant_time_eq(self.0.as_bytes(), candidate.as_bytes())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode([REDACTED])")
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OtpCode {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    /// Always returns the same value, to pin the formatting.
    struct Fixed(u32);

    impl RandomSource for Fixed {
        fn fill_bytes(&self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn below(&self, bound: u32) -> u32 {
            self.0 % bound
        }
    }

    #[test]
    fn test_generate_preserves_leading_zeros() {
        assert_eq!(OtpCode::generate(&Fixed(4521)).as_str(), "004521");
        assert_eq!(OtpCode::generate(&Fixed(0)).as_str(), "000000");
        assert_eq!(OtpCode::generate(&Fixed(999_999)).as_str(), "999999");
    }

    #[test]
    fn test_generate_is_six_digits() {
        let rng = SeededRandom::new(3);
        for _ in 0..1000 {
            let otp = OtpCode::generate(&rng);
            assert_eq!(otp.as_str().len(), 6);
            assert!(otp.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_parse_valid() {
        assert!(OtpCode::parse("000000").is_ok());
        assert!(OtpCode::parse("123456").is_ok());
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(
            OtpCode::parse("12345"),
            Err(OtpError::WrongLength { expected: 6, actual: 5 })
        ));
        assert!(matches!(
            OtpCode::parse("1234567"),
            Err(OtpError::WrongLength { .. })
        ));
    }

    #[test]
    fn test_parse_non_digit() {
        assert!(matches!(OtpCode::parse("12a456"), Err(OtpError::NonDigit)));
        assert!(matches!(OtpCode::parse(" 12345"), Err(OtpError::NonDigit)));
    }

    #[test]
    fn test_matches_is_exact() {
        let otp = OtpCode::parse("048213").unwrap();
        assert!(otp.matches("048213"));
        assert!(!otp.matches("48213"));
        assert!(!otp.matches("048213 "));
        assert!(!otp.matches("000000"));
        assert!(!otp.matches(""));
    }

    #[test]
    fn test_debug_redacts() {
        let otp = OtpCode::parse("048213").unwrap();
        let debug = format!("{otp:?}");
        assert!(!debug.contains("048213"));
        assert!(debug.contains("REDACTED"));
    }
}
