//! Signed-in user identity.
//!
//! Every identity provider (Apple, Google, OTP) is normalized into the same
//! [`User`] record before it is persisted.

use serde::{Deserialize, Serialize};

/// Identity provider that produced a [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// Sign in with Apple.
    Apple,
    /// Google OAuth.
    Google,
    /// SMS one-time password.
    Otp,
}

impl AuthType {
    /// Returns the tag stored alongside the persisted user.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Apple => "apple",
            Self::Google => "google",
            Self::Otp => "otp",
        }
    }
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an auth type tag is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid auth type: {0}")]
pub struct ParseAuthTypeError(pub String);

impl std::str::FromStr for AuthType {
    type Err = ParseAuthTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apple" => Ok(Self::Apple),
            "google" => Ok(Self::Google),
            "otp" => Ok(Self::Otp),
            _ => Err(ParseAuthTypeError(s.to_string())),
        }
    }
}

/// The signed-in user.
///
/// Only one user is persisted at a time. The JSON form is what gets written
/// to secure storage under `user_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Provider-scoped user identifier.
    pub id: String,
    /// Email address, empty when the provider did not share one.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Profile picture URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Provider that authenticated this user.
    pub auth_type: AuthType,
}

impl User {
    /// Name to greet the user with, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}
