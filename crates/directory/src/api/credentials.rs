//! Per-request credentials.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use super::ApiError;

/// Bearer token attached to catalog requests.
///
/// Credentials are passed explicitly to every [`CatalogApi`](super::CatalogApi)
/// call; no client holds a default `Authorization` header. `Debug` never
/// prints the token.
#[derive(Clone, Default)]
pub struct Credentials {
    token: Option<SecretString>,
}

impl Credentials {
    /// Credentials for unauthenticated requests.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { token: None }
    }

    /// Credentials carrying a bearer token. An empty token is anonymous.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.is_empty() {
            return Self::anonymous();
        }
        Self {
            token: Some(SecretString::from(token)),
        }
    }

    /// Whether a token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The bearer token, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// The `Authorization` header value these credentials produce.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }

    /// Header value marked sensitive so it is never logged by the HTTP stack.
    pub(crate) fn header_value(&self) -> Result<Option<HeaderValue>, ApiError> {
        self.authorization_header()
            .map(|value| {
                let mut header =
                    HeaderValue::from_str(&value).map_err(|_| ApiError::InvalidCredentials)?;
                header.set_sensitive(true);
                Ok(header)
            })
            .transpose()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Credentials slot shared between the session manager and its consumers.
///
/// Clones refer to the same slot: signing in or out through one handle is
/// seen by every request admitted afterwards through any other.
#[derive(Debug, Clone, Default)]
pub struct SharedCredentials {
    inner: Arc<RwLock<Credentials>>,
}

impl SharedCredentials {
    /// Snapshot of the current credentials.
    #[must_use]
    pub fn get(&self) -> Credentials {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the credentials for every holder of this slot.
    pub fn set(&self, credentials: Credentials) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = credentials;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_has_no_header() {
        let creds = Credentials::anonymous();
        assert!(!creds.is_authenticated());
        assert_eq!(creds.authorization_header(), None);
        assert!(creds.header_value().unwrap().is_none());
    }

    #[test]
    fn test_empty_token_is_anonymous() {
        assert!(!Credentials::bearer("").is_authenticated());
    }

    #[test]
    fn test_bearer_header() {
        let creds = Credentials::bearer("tok-abc");
        assert_eq!(creds.authorization_header().as_deref(), Some("Bearer tok-abc"));
        let header = creds.header_value().unwrap().unwrap();
        assert!(header.is_sensitive());
    }

    #[test]
    fn test_invalid_header_characters() {
        let creds = Credentials::bearer("bad\ntoken");
        assert!(matches!(
            creds.header_value(),
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug_output = format!("{:?}", Credentials::bearer("super_secret_token"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }

    #[test]
    fn test_shared_credentials_are_seen_by_every_clone() {
        let shared = SharedCredentials::default();
        let other = shared.clone();
        assert!(!other.get().is_authenticated());

        shared.set(Credentials::bearer("tok-abc"));
        assert_eq!(
            other.get().authorization_header().as_deref(),
            Some("Bearer tok-abc")
        );

        other.set(Credentials::anonymous());
        assert!(!shared.get().is_authenticated());
    }
}
