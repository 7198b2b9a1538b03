//! Session management.
//!
//! [`SessionManager`] is the single source of truth for whether a user is
//! signed in. It persists the bearer token and the normalized [`User`] in a
//! [`SecureStore`], owns the [`Credentials`] handed to catalog calls, and
//! drives the startup [`SessionState`] machine.
//!
//! # Failure policy
//!
//! - Storage failures are logged and swallowed. A missing secure store makes
//!   the app behave as permanently signed out.
//! - Provider cancellation returns `None` without logging an error.
//! - Mobile/OTP validation fails before any network call.
//! - OTP service errors are returned so the message can be shown inline.
//!
//! # Example
//!
//! ```rust,ignore
//! let session = SessionManager::new(store, api.clone());
//!
//! if session.send_otp("9876543210").await? {
//!     session.verify_otp("9876543210", "123456").await?;
//! }
//!
//! // Follows sign-in and sign-out from here on
//! let listing = ListingController::with_credentials(api, config, session.shared_credentials());
//! ```

mod error;
mod providers;
mod state;

pub use error::AuthError;
pub use providers::{
    APPLE_FALLBACK_NAME, AppleCredential, AppleSignIn, AuthResult, GoogleProfile, PersonName,
    ProviderError,
};
pub use state::SessionState;

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info, instrument, warn};

use mybn_core::{MobileNumber, OtpCode, User};

use crate::api::{AuthApi, Credentials, SharedCredentials};
use crate::storage::{SecureStore, StorageError, keys};

/// Keys that could not be deleted during sign-out.
#[derive(Debug, Default)]
pub struct SignOutReport {
    /// Each key whose deletion failed, with the failure.
    pub failures: Vec<(&'static str, StorageError)>,
}

impl SignOutReport {
    /// True when every key was deleted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Persisted session and credential owner.
pub struct SessionManager {
    store: Arc<dyn SecureStore>,
    auth_api: Arc<dyn AuthApi>,
    credentials: SharedCredentials,
    state: RwLock<SessionState>,
}

impl SessionManager {
    /// Create a session manager. The session starts in [`SessionState::Unknown`].
    #[must_use]
    pub fn new(store: Arc<dyn SecureStore>, auth_api: Arc<dyn AuthApi>) -> Self {
        Self {
            store,
            auth_api,
            credentials: SharedCredentials::default(),
            state: RwLock::new(SessionState::Unknown),
        }
    }

    // =========================================================================
    // Session State
    // =========================================================================

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        debug!(from = state.name(), to = next.name(), "Session state transition");
        *state = next;
    }

    /// Resolve the persisted session at startup.
    ///
    /// Installs the persisted token as the current credentials when one is
    /// found. A token without a readable user record resolves to
    /// [`SessionState::SignedOut`] and the credentials are cleared again.
    #[instrument(skip(self))]
    pub async fn resolve_session(&self) -> SessionState {
        self.set_state(SessionState::Unknown);

        let Some(token) = self.valid_token().await else {
            self.set_state(SessionState::SignedOut);
            return SessionState::SignedOut;
        };

        self.set_state(SessionState::CheckingUser);
        self.set_auth_token(Some(token.expose_secret()));

        let next = match self.get_current_user().await {
            Some(user) => SessionState::Authenticated(user),
            None => {
                info!("Token present but no user record, treating as signed out");
                self.set_auth_token(None);
                SessionState::SignedOut
            }
        };

        self.set_state(next.clone());
        next
    }

    /// Whether a non-empty token is persisted.
    ///
    /// Presence only: the token is not checked for expiry or signature. An
    /// expired token surfaces as `ApiError::Unauthorized` on the next call.
    pub async fn has_valid_session(&self) -> bool {
        self.valid_token().await.is_some()
    }

    async fn valid_token(&self) -> Option<SecretString> {
        self.get_token()
            .await
            .filter(|token| !token.expose_secret().is_empty())
    }

    // =========================================================================
    // Token Storage
    // =========================================================================

    /// Read the persisted bearer token.
    pub async fn get_token(&self) -> Option<SecretString> {
        match self.store.get(keys::AUTH_TOKEN).await {
            Ok(token) => token.map(SecretString::from),
            Err(e) => {
                log_storage_failure("read", keys::AUTH_TOKEN, &e);
                None
            }
        }
    }

    /// Persist the bearer token.
    pub async fn save_token(&self, token: &str) {
        if let Err(e) = self.store.set(keys::AUTH_TOKEN, token).await {
            log_storage_failure("write", keys::AUTH_TOKEN, &e);
        }
    }

    /// Delete the persisted bearer token.
    pub async fn clear_token(&self) {
        if let Err(e) = self.store.delete(keys::AUTH_TOKEN).await {
            log_storage_failure("delete", keys::AUTH_TOKEN, &e);
        }
    }

    /// Replace the credentials used for subsequent catalog calls.
    ///
    /// The change is visible through every handle returned by
    /// [`Self::shared_credentials`].
    pub fn set_auth_token(&self, token: Option<&str>) {
        let next = token.map_or_else(Credentials::anonymous, Credentials::bearer);
        self.credentials.set(next);
    }

    /// Snapshot of the current credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        self.credentials.get()
    }

    /// Handle that tracks this session's credentials across sign-in and
    /// sign-out. Give it to long-lived consumers such as a
    /// [`ListingController`](crate::ListingController).
    #[must_use]
    pub fn shared_credentials(&self) -> SharedCredentials {
        self.credentials.clone()
    }

    // =========================================================================
    // User Storage
    // =========================================================================

    /// Read the persisted user. Missing or corrupt data yields `None`.
    pub async fn get_current_user(&self) -> Option<User> {
        let raw = match self.store.get(keys::USER_DATA).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log_storage_failure("read", keys::USER_DATA, &e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Persisted user record is corrupt, ignoring");
                None
            }
        }
    }

    /// Persist the user and its provider tag.
    ///
    /// Failures are logged; the app continues with an unpersisted session.
    pub async fn save_user_data(&self, user: &User) {
        let json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Failed to encode user record");
                return;
            }
        };

        if let Err(e) = self.store.set(keys::USER_DATA, &json).await {
            log_storage_failure("write", keys::USER_DATA, &e);
        }
        if let Err(e) = self
            .store
            .set(keys::AUTH_TYPE, user.auth_type.as_str())
            .await
        {
            log_storage_failure("write", keys::AUTH_TYPE, &e);
        }
    }

    // =========================================================================
    // Identity Providers
    // =========================================================================

    /// Whether Sign in with Apple can be offered. Provider errors read as `false`.
    pub async fn is_apple_auth_available(&self, provider: &dyn AppleSignIn) -> bool {
        provider.is_available().await.unwrap_or(false)
    }

    /// Sign in with Apple, persisting the resulting user.
    ///
    /// Returns `None` when the user cancels or the provider fails.
    #[instrument(skip(self, provider))]
    pub async fn sign_in_with_apple(&self, provider: &dyn AppleSignIn) -> Option<User> {
        match provider.sign_in().await {
            Ok(credential) => self.complete_sign_in(AuthResult::Apple(credential)).await,
            Err(ProviderError::Cancelled) => {
                debug!("Apple sign-in cancelled by user");
                None
            }
            Err(e) => {
                error!(error = %e, "Apple sign-in failed");
                None
            }
        }
    }

    /// Normalize and persist a profile from a completed Google OAuth flow.
    #[instrument(skip(self, profile))]
    pub async fn handle_google_login(&self, profile: GoogleProfile) -> User {
        let user = profile.into_user();
        self.save_user_data(&user).await;
        user
    }

    /// Normalize and persist the result of any provider.
    pub async fn complete_sign_in(&self, result: AuthResult) -> Option<User> {
        let auth_type = result.auth_type();
        let Some(user) = result.into_user() else {
            warn!(%auth_type, "Provider returned no user identity");
            return None;
        };
        self.save_user_data(&user).await;
        info!(%auth_type, "User signed in");
        Some(user)
    }

    // =========================================================================
    // OTP Sign-In
    // =========================================================================

    /// Request an OTP for `mobile`.
    ///
    /// Returns the service's success flag; on `false` the user may resend.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidMobile` without calling the service if the
    /// number is not a valid 10-digit mobile number, or `AuthError::Api` if
    /// the request fails.
    #[instrument(skip(self, mobile))]
    pub async fn send_otp(&self, mobile: &str) -> Result<bool, AuthError> {
        let mobile = MobileNumber::parse(mobile)?;

        let response = self.auth_api.send_otp(&mobile).await.inspect_err(|e| {
            error!(error = %e, mobile = %mobile.masked(), "Failed to send OTP");
        })?;

        if !response.success {
            warn!(
                mobile = %mobile.masked(),
                message = response.message.as_deref().unwrap_or_default(),
                "OTP service declined to send a code"
            );
        }

        Ok(response.success)
    }

    /// Verify an OTP and establish a session.
    ///
    /// On success the user and token are persisted and the token becomes the
    /// current credentials. On rejection nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns a validation error without calling the service if the mobile
    /// number or code is malformed, or `AuthError::Api` if the request fails.
    #[instrument(skip(self, mobile, code))]
    pub async fn verify_otp(&self, mobile: &str, code: &str) -> Result<Option<User>, AuthError> {
        let mobile = MobileNumber::parse(mobile)?;
        let code = OtpCode::parse(code)?;

        let response = self.auth_api.verify_otp(&mobile, &code).await.inspect_err(|e| {
            error!(error = %e, mobile = %mobile.masked(), "Failed to verify OTP");
        })?;

        if !response.success {
            info!(
                mobile = %mobile.masked(),
                message = response.message.as_deref().unwrap_or_default(),
                "OTP rejected"
            );
            return Ok(None);
        }

        let token = response.token.filter(|t| !t.is_empty());
        let (Some(otp_user), Some(token)) = (response.user, token) else {
            warn!("OTP accepted but response lacks a user or token");
            return Ok(None);
        };

        let user = otp_user.into_user();
        self.save_user_data(&user).await;
        self.save_token(&token).await;
        self.set_auth_token(Some(&token));
        self.set_state(SessionState::Authenticated(user.clone()));

        info!(auth_type = %user.auth_type, "User signed in");
        Ok(Some(user))
    }

    // =========================================================================
    // Sign-Out
    // =========================================================================

    /// Delete the token, user record and provider tag.
    ///
    /// Every key is attempted even if an earlier deletion fails. Never fails;
    /// failures are logged and reported. The credentials revert to anonymous
    /// for every holder of [`Self::shared_credentials`]; snapshots taken
    /// earlier with [`Self::credentials`] keep the old token.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> SignOutReport {
        let mut report = SignOutReport::default();

        for key in keys::ALL {
            if let Err(e) = self.store.delete(key).await {
                log_storage_failure("delete", key, &e);
                report.failures.push((key, e));
            }
        }

        self.set_auth_token(None);
        self.set_state(SessionState::SignedOut);
        report
    }
}

/// Log a storage failure at a level matching its cause.
fn log_storage_failure(operation: &str, key: &str, err: &StorageError) {
    match err {
        StorageError::Unavailable => {
            warn!(operation, key, "Secure storage is not available, session will not persist");
        }
        other => error!(operation, key, error = %other, "Secure storage operation failed"),
    }
}
