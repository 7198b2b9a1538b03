//! Mobile number type used for OTP sign-in.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MobileNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MobileNumberError {
    /// The input string is empty.
    #[error("mobile number cannot be empty")]
    Empty,
    /// The input does not have exactly ten characters.
    #[error("mobile number must be exactly {expected} digits (got {actual})")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
        /// Number of characters supplied.
        actual: usize,
    },
    /// The input contains a character that is not an ASCII digit.
    #[error("mobile number must contain only digits")]
    NonDigit,
    /// The first digit is outside 6-9.
    #[error("mobile number must start with 6, 7, 8 or 9")]
    InvalidPrefix,
}

/// A ten-digit mobile number.
///
/// ## Constraints
///
/// - Exactly 10 ASCII digits, no separators or country code
/// - First digit is 6, 7, 8 or 9
///
/// ## Examples
///
/// ```
/// use mybn_core::MobileNumber;
///
/// assert!(MobileNumber::parse("9123456780").is_ok());
///
/// assert!(MobileNumber::parse("12345").is_err());      // too short
/// assert!(MobileNumber::parse("5123456789").is_err()); // bad prefix
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Number of digits in a mobile number.
    pub const LENGTH: usize = 10;

    /// Parse a `MobileNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not ten ASCII digits, or
    /// does not start with a digit between 6 and 9.
    pub fn parse(s: &str) -> Result<Self, MobileNumberError> {
        if s.is_empty() {
            return Err(MobileNumberError::Empty);
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MobileNumberError::NonDigit);
        }

        if s.len() != Self::LENGTH {
            return Err(MobileNumberError::WrongLength {
                expected: Self::LENGTH,
                actual: s.len(),
            });
        }

        if !matches!(s.as_bytes().first(), Some(b'6'..=b'9')) {
            return Err(MobileNumberError::InvalidPrefix);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the mobile number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number with all but the last four digits masked, for logs.
    #[must_use]
    pub fn masked(&self) -> String {
        let visible = self.0.get(Self::LENGTH - 4..).unwrap_or_default();
        format!("******{visible}")
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MobileNumber {
    type Err = MobileNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MobileNumber {
    type Error = MobileNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MobileNumber> for String {
    fn from(mobile: MobileNumber) -> Self {
        mobile.0
    }
}

impl AsRef<str> for MobileNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        assert!(MobileNumber::parse("9123456780").is_ok());
        assert!(MobileNumber::parse("9876543210").is_ok());
        assert!(MobileNumber::parse("6000000000").is_ok());
        assert!(MobileNumber::parse("7999999999").is_ok());
        assert!(MobileNumber::parse("8123456789").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(MobileNumber::parse(""), Err(MobileNumberError::Empty));
    }

    #[test]
    fn test_parse_too_short() {
        assert_eq!(
            MobileNumber::parse("12345"),
            Err(MobileNumberError::WrongLength {
                expected: 10,
                actual: 5
            })
        );
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            MobileNumber::parse("98765432101"),
            Err(MobileNumberError::WrongLength { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_prefix() {
        assert_eq!(
            MobileNumber::parse("5123456789"),
            Err(MobileNumberError::InvalidPrefix)
        );
        assert_eq!(
            MobileNumber::parse("0123456789"),
            Err(MobileNumberError::InvalidPrefix)
        );
    }

    #[test]
    fn test_parse_rejects_separators_and_whitespace() {
        assert_eq!(
            MobileNumber::parse("98765-43210"),
            Err(MobileNumberError::NonDigit)
        );
        assert_eq!(
            MobileNumber::parse(" 9876543210"),
            Err(MobileNumberError::NonDigit)
        );
        assert_eq!(
            MobileNumber::parse("+919876543210"),
            Err(MobileNumberError::NonDigit)
        );
    }

    #[test]
    fn test_parse_rejects_non_ascii_digits() {
        // Devanagari digits are numeric but not ASCII
        assert_eq!(
            MobileNumber::parse("९८७६५४३२१०"),
            Err(MobileNumberError::NonDigit)
        );
    }

    #[test]
    fn test_masked() {
        let mobile = MobileNumber::parse("9876543210").unwrap();
        assert_eq!(mobile.masked(), "******3210");
    }

    #[test]
    fn test_serde_rejects_invalid() {
        assert!(serde_json::from_str::<MobileNumber>("\"12345\"").is_err());
        let mobile: MobileNumber = serde_json::from_str("\"9876543210\"").unwrap();
        assert_eq!(mobile.as_str(), "9876543210");
    }
}
