//! Unified error handling.
//!
//! Provides a unified `Error` type for callers that drive several components
//! (the CLI, an app shell) and need one place to decide how a failure is shown.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::listing::ListingError;
use crate::session::{AuthError, ProviderError};
use crate::storage::StorageError;

/// Error type for the directory client.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog service request failed.
    #[error("Catalog error: {0}")]
    Api(#[from] ApiError),

    /// Secure storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// OTP sign-in failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Listing operation failed.
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// Identity provider failed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl Error {
    fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) | Self::Auth(AuthError::Api(e)) | Self::Listing(ListingError::Api(e)) => {
                Some(e)
            }
            _ => None,
        }
    }

    /// Whether the requested record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.api(), Some(ApiError::NotFound(_)))
    }

    /// Whether the failure is transient and a retry action should be offered.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.api().is_some_and(ApiError::is_retryable)
    }

    /// Whether the bearer token was rejected and the user must sign in again.
    #[must_use]
    pub fn requires_sign_in(&self) -> bool {
        matches!(self.api(), Some(ApiError::Unauthorized))
    }

    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(err) => err.display_message(),
            Self::Api(err) | Self::Listing(ListingError::Api(err)) => err.display_message(),
            Self::Listing(ListingError::OutOfOrder { .. }) | Self::Config(_) => {
                "Something went wrong".to_string()
            }
            Self::Storage(_) => "Your session could not be saved on this device".to_string(),
            Self::Provider(ProviderError::Cancelled) => "Sign-in was cancelled".to_string(),
            Self::Provider(_) => "Sign-in is not available right now".to_string(),
        }
    }
}

/// Result type alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::from(ApiError::NotFound("Business not found: 7".to_string()));
        assert_eq!(err.to_string(), "Catalog error: Not found: Business not found: 7");

        let err = Error::from(ConfigError::InvalidEnvVar(
            "MYBN_PAGE_SIZE".to_string(),
            "must be a positive integer".to_string(),
        ));
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_not_found_through_wrappers() {
        assert!(Error::from(ApiError::NotFound("x".to_string())).is_not_found());
        assert!(
            Error::from(ListingError::Api(ApiError::NotFound("x".to_string()))).is_not_found()
        );
        assert!(!Error::from(ApiError::Unauthorized).is_not_found());
    }

    #[test]
    fn test_retryable_classification() {
        let server = || ApiError::Api {
            status: 503,
            message: String::new(),
        };
        assert!(Error::from(server()).is_retryable());
        assert!(Error::from(ListingError::Api(server())).is_retryable());
        assert!(Error::from(AuthError::Api(server())).is_retryable());
        assert!(!Error::from(StorageError::Unavailable).is_retryable());
        assert!(
            !Error::from(ListingError::OutOfOrder {
                requested: 2,
                current: 3
            })
            .is_retryable()
        );
    }

    #[test]
    fn test_unauthorized_requires_sign_in() {
        assert!(Error::from(ApiError::Unauthorized).requires_sign_in());
        assert!(Error::from(ListingError::Api(ApiError::Unauthorized)).requires_sign_in());
        assert!(!Error::from(ProviderError::Cancelled).requires_sign_in());
    }

    #[test]
    fn test_user_messages_hide_internals() {
        let err = Error::from(StorageError::Io(std::io::Error::other("/home/x/.mybn: EACCES")));
        assert_eq!(
            err.user_message(),
            "Your session could not be saved on this device"
        );
        assert_eq!(
            Error::from(ApiError::Unauthorized).user_message(),
            "Your session has expired, please sign in again"
        );
        assert_eq!(
            Error::from(AuthError::from(mybn_core::OtpCodeError::NonDigit)).user_message(),
            "Enter the 6-digit code we sent you"
        );
        assert_eq!(
            Error::from(ProviderError::Failed("AKAuthenticationError 1000".to_string()))
                .user_message(),
            "Sign-in is not available right now"
        );
    }
}
