//! Sign-in error types.

use thiserror::Error;

use mybn_core::{MobileNumberError, OtpCodeError};

use crate::api::ApiError;

/// Errors surfaced by the OTP sign-in flow.
///
/// Validation errors are raised before any network call. Provider
/// cancellations and storage failures are not errors; they degrade to `None`
/// or to an unpersisted session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Mobile number failed client-side validation.
    #[error("invalid mobile number: {0}")]
    InvalidMobile(#[from] MobileNumberError),

    /// Verification code failed client-side validation.
    #[error("invalid verification code: {0}")]
    InvalidOtp(#[from] OtpCodeError),

    /// The OTP service could not be reached or returned an error.
    #[error("OTP service error: {0}")]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Whether the error was raised by client-side validation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidMobile(_) | Self::InvalidOtp(_))
    }

    /// Message for inline display under the sign-in form.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::InvalidMobile(_) => "Enter a valid 10-digit mobile number".to_string(),
            Self::InvalidOtp(_) => "Enter the 6-digit code we sent you".to_string(),
            Self::Api(err) => err.display_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors() {
        let err = AuthError::from(MobileNumberError::InvalidPrefix);
        assert!(err.is_validation());
        assert_eq!(err.display_message(), "Enter a valid 10-digit mobile number");

        let err = AuthError::from(OtpCodeError::NonDigit);
        assert!(err.is_validation());
    }

    #[test]
    fn test_api_error_message_is_propagated() {
        let err = AuthError::from(ApiError::Api {
            status: 400,
            message: "OTP expired".to_string(),
        });
        assert!(!err.is_validation());
        assert_eq!(err.display_message(), "OTP expired");
    }
}
