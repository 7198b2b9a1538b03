//! Identity provider results and their normalization into [`User`].
//!
//! Provider handshakes (native Apple sheet, Google browser flow, SMS) happen
//! outside this crate. What comes back is one of the [`AuthResult`] variants,
//! each with a single conversion into the common user record.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use mybn_core::{AuthType, User};

use crate::api::OtpUser;

/// Display name used when Apple does not share the user's name.
pub const APPLE_FALLBACK_NAME: &str = "Apple User";

/// Errors reported by a native identity provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The user dismissed the sign-in sheet.
    #[error("sign-in was cancelled")]
    Cancelled,

    /// The provider is not supported on this device.
    #[error("sign-in provider is not available")]
    Unavailable,

    /// Any other provider failure.
    #[error("sign-in failed: {0}")]
    Failed(String),
}

/// Native Sign in with Apple.
#[async_trait]
pub trait AppleSignIn: Send + Sync {
    /// Whether Sign in with Apple can be offered on this device.
    async fn is_available(&self) -> Result<bool, ProviderError>;

    /// Present the sign-in sheet requesting name and email scopes.
    async fn sign_in(&self) -> Result<AppleCredential, ProviderError>;
}

/// Name parts shared by Apple on first sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

/// Credential returned by Sign in with Apple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppleCredential {
    /// Stable Apple user identifier.
    pub user: String,
    /// Email, only shared on first sign-in.
    pub email: Option<String>,
    /// Full name, only shared on first sign-in.
    pub full_name: Option<PersonName>,
}

impl AppleCredential {
    /// Normalize into a [`User`]. A credential without a user ID yields `None`.
    #[must_use]
    pub fn into_user(self) -> Option<User> {
        if self.user.is_empty() {
            return None;
        }

        let name = self.full_name.map_or_else(
            || APPLE_FALLBACK_NAME.to_string(),
            |n| {
                format!(
                    "{} {}",
                    n.given_name.unwrap_or_default(),
                    n.family_name.unwrap_or_default()
                )
                .trim()
                .to_string()
            },
        );

        Some(User {
            id: self.user,
            email: self.email.unwrap_or_default(),
            name,
            photo: None,
            auth_type: AuthType::Apple,
        })
    }
}

/// OpenID profile returned by the Google OAuth flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GoogleProfile {
    /// Subject identifier.
    pub sub: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Full name.
    #[serde(default)]
    pub name: Option<String>,
    /// Profile picture URL.
    #[serde(default)]
    pub picture: Option<String>,
}

impl GoogleProfile {
    /// Normalize into a [`User`].
    #[must_use]
    pub fn into_user(self) -> User {
        User {
            id: self.sub,
            email: self.email.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            photo: self.picture.filter(|p| !p.is_empty()),
            auth_type: AuthType::Google,
        }
    }
}

impl OtpUser {
    /// Normalize into a [`User`].
    #[must_use]
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            photo: self.photo.filter(|p| !p.is_empty()),
            auth_type: AuthType::Otp,
        }
    }
}

/// Result of a completed sign-in with any provider.
#[derive(Debug, Clone)]
pub enum AuthResult {
    Apple(AppleCredential),
    Google(GoogleProfile),
    Otp(OtpUser),
}

impl AuthResult {
    /// Provider this result came from.
    #[must_use]
    pub const fn auth_type(&self) -> AuthType {
        match self {
            Self::Apple(_) => AuthType::Apple,
            Self::Google(_) => AuthType::Google,
            Self::Otp(_) => AuthType::Otp,
        }
    }

    /// Normalize into a [`User`], `None` if the provider gave no identity.
    #[must_use]
    pub fn into_user(self) -> Option<User> {
        match self {
            Self::Apple(credential) => credential.into_user(),
            Self::Google(profile) => Some(profile.into_user()),
            Self::Otp(user) => Some(user.into_user()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_apple_with_full_name() {
        let user = AppleCredential {
            user: "001234.abcd".to_string(),
            email: Some("asha@privaterelay.appleid.com".to_string()),
            full_name: Some(PersonName {
                given_name: Some("Asha".to_string()),
                family_name: Some("Rao".to_string()),
            }),
        }
        .into_user()
        .unwrap();

        assert_eq!(user.name, "Asha Rao");
        assert_eq!(user.email, "asha@privaterelay.appleid.com");
        assert_eq!(user.auth_type, AuthType::Apple);
        assert_eq!(user.photo, None);
    }

    #[test]
    fn test_apple_partial_name_is_trimmed() {
        let user = AppleCredential {
            user: "001234.abcd".to_string(),
            email: None,
            full_name: Some(PersonName {
                given_name: Some("Asha".to_string()),
                family_name: None,
            }),
        }
        .into_user()
        .unwrap();

        assert_eq!(user.name, "Asha");
        assert_eq!(user.email, "");
    }

    #[test]
    fn test_apple_without_name_uses_fallback() {
        let user = AppleCredential {
            user: "001234.abcd".to_string(),
            ..AppleCredential::default()
        }
        .into_user()
        .unwrap();

        assert_eq!(user.name, APPLE_FALLBACK_NAME);
    }

    #[test]
    fn test_apple_without_user_id() {
        assert!(AppleCredential::default().into_user().is_none());
    }

    #[test]
    fn test_google_profile_from_userinfo_json() {
        let profile: GoogleProfile = serde_json::from_str(
            r#"{"sub": "1087", "email": "asha@example.com", "name": "Asha Rao",
                "picture": "https://lh3.example/a.png", "email_verified": true}"#,
        )
        .unwrap();
        let user = AuthResult::Google(profile).into_user().unwrap();

        assert_eq!(user.id, "1087");
        assert_eq!(user.photo.as_deref(), Some("https://lh3.example/a.png"));
        assert_eq!(user.auth_type, AuthType::Google);
    }

    #[test]
    fn test_otp_user_defaults() {
        let otp_user: OtpUser = serde_json::from_str(r#"{"id": "u1", "name": "Asha"}"#).unwrap();
        let result = AuthResult::Otp(otp_user);
        assert_eq!(result.auth_type(), AuthType::Otp);

        let user = result.into_user().unwrap();
        assert_eq!(
            user,
            User {
                id: "u1".to_string(),
                email: String::new(),
                name: "Asha".to_string(),
                photo: None,
                auth_type: AuthType::Otp,
            }
        );
    }
}
