//! Secure key-value storage for session data.
//!
//! The session manager persists three keys (see [`keys`]). The backing store
//! is a collaborator: mobile builds use the platform keychain, the CLI uses
//! [`FileStore`], tests use [`MemoryStore`], and [`UnavailableStore`] stands
//! in for runtimes where no secure storage exists.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Storage keys used by the session manager.
pub mod keys {
    /// Bearer token for authenticated catalog requests.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// JSON-encoded signed-in user.
    pub const USER_DATA: &str = "user_data";

    /// Provider tag of the signed-in user (`apple`, `google`, `otp`).
    pub const AUTH_TYPE: &str = "auth_type";

    /// Every key written by the session manager.
    pub const ALL: [&str; 3] = [AUTH_TOKEN, USER_DATA, AUTH_TYPE];
}

/// Errors that can occur when accessing secure storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No secure storage backend exists in this runtime.
    #[error("secure storage is not available")]
    Unavailable,

    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not valid JSON.
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Async key-value store for small secrets.
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Store for runtimes without secure storage; every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

#[async_trait]
impl SecureStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    async fn delete(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}
