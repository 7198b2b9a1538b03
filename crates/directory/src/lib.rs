//! MYBN directory client.
//!
//! Session management and the paginated catalog listing for the MYBN
//! business directory.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`api`] - HTTP client for the catalog and OTP endpoints
//! - [`storage`] - Secure key-value storage backends
//! - [`session`] - Token persistence, sign-in providers and the session gate
//! - [`listing`] - Infinite-scroll listing with server-side filtering
//! - [`error`] - Unified error type

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod listing;
pub mod session;
pub mod storage;

pub use api::{ApiError, AuthApi, CatalogApi, Credentials, HttpApi, SharedCredentials};
pub use config::{ApiConfig, ConfigError, DirectoryConfig, ListingConfig};
pub use error::{Error, Result};
pub use listing::{FilterOutcome, ListingController, ListingError, ListingSnapshot, LoadOutcome};
pub use session::{AuthError, SessionManager, SessionState};
pub use storage::{FileStore, MemoryStore, SecureStore, StorageError};
