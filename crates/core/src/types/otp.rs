//! One-time password code.

use core::fmt;

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpCodeError {
    /// The code does not have exactly six characters.
    #[error("verification code must be exactly {expected} digits (got {actual})")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
        /// Number of characters supplied.
        actual: usize,
    },
    /// The code contains a character that is not an ASCII digit.
    #[error("verification code must contain only digits")]
    NonDigit,
}

/// A six-digit verification code received by SMS.
///
/// `Debug` does not print the code.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 6;

    /// Parse an `OtpCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OtpCodeError> {
        let actual = s.chars().count();
        if actual != Self::LENGTH {
            return Err(OtpCodeError::WrongLength {
                expected: Self::LENGTH,
                actual,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpCodeError::NonDigit);
        }

        Ok(Self(s.to_owned()))
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

impl std::str::FromStr for OtpCode {
    type Err = OtpCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(OtpCode::parse("123456").is_ok());
        assert!(OtpCode::parse("000000").is_ok());
    }

    #[test]
    fn test_parse_wrong_length() {
        for code in ["", "12345", "1234567", "12 456"] {
            let result = OtpCode::parse(code);
            if code.len() == 6 {
                assert_eq!(result, Err(OtpCodeError::NonDigit));
            } else {
                assert!(matches!(result, Err(OtpCodeError::WrongLength { .. })));
            }
        }
    }

    #[test]
    fn test_parse_non_digit() {
        assert_eq!(OtpCode::parse("12a456"), Err(OtpCodeError::NonDigit));
    }

    #[test]
    fn test_debug_redacts_code() {
        let code = OtpCode::parse("654321").unwrap();
        assert!(!format!("{code:?}").contains("654321"));
    }
}
