//! Command implementations.

pub mod catalog;
pub mod otp;
pub mod session;

use std::sync::Arc;

use mybn_directory::{DirectoryConfig, FileStore, HttpApi, SessionManager};

/// Everything a command needs, built once from the environment.
pub struct Context {
    pub config: DirectoryConfig,
    pub api: HttpApi,
    pub session: SessionManager,
}

impl Context {
    /// Load configuration and wire the client together.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the HTTP client fails
    /// to build.
    pub fn from_env() -> mybn_directory::Result<Self> {
        let config = DirectoryConfig::from_env()?;
        let api = HttpApi::new(&config.api)?;
        let store = Arc::new(FileStore::new(&config.storage_path));
        let session = SessionManager::new(store, Arc::new(api.clone()));

        tracing::debug!(
            base_url = %config.api.base_url,
            storage = %config.storage_path.display(),
            "Loaded configuration"
        );

        Ok(Self {
            config,
            api,
            session,
        })
    }
}
