//! Session lifecycle.
//!
//! ```text
//! Unknown ──(no token)──────────────────────────▶ SignedOut
//!    │
//!    └──(token)──▶ CheckingUser ──(user record)──▶ Authenticated
//!                        │
//!                        └──(missing/corrupt)───▶ SignedOut
//! ```

use mybn_core::User;

/// Where the app is in resolving the persisted session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Startup, before the persisted token has been checked.
    #[default]
    Unknown,
    /// A token was found; the persisted user record is being read.
    CheckingUser,
    /// No usable session.
    SignedOut,
    /// Token and user record are both present.
    Authenticated(User),
}

impl SessionState {
    /// Whether the state is final for this resolution.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::SignedOut | Self::Authenticated(_))
    }

    /// Whether authenticated screens may be shown.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The signed-in user, if authenticated.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::CheckingUser => "checking_user",
            Self::SignedOut => "signed_out",
            Self::Authenticated(_) => "authenticated",
        }
    }
}
