//! OTP sign-in against the stub catalog service.
//!
//! Covers the whole path from validation through verification, persistence
//! in a file-backed store, a simulated app restart and sign-out.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use mybn_core::AuthType;
use mybn_directory::session::SessionState;
use mybn_directory::{
    AuthError, CatalogApi, Error, FileStore, HttpApi, ListingConfig, ListingController,
    SessionManager,
};
use mybn_integration_tests::{Hits, StubServer, TEST_CODE, TEST_MOBILE, TEST_TOKEN};
use secrecy::ExposeSecret;

fn session(api: &HttpApi, store: &Arc<FileStore>) -> SessionManager {
    SessionManager::new(store.clone(), Arc::new(api.clone()))
}

#[tokio::test]
async fn test_sign_in_persists_across_restart() {
    let stub = StubServer::start().await;
    let api = HttpApi::new(&stub.api_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("session.json")));

    let first = session(&api, &store);
    assert_eq!(first.resolve_session().await, SessionState::SignedOut);

    assert!(first.send_otp(TEST_MOBILE).await.unwrap());
    let user = first
        .verify_otp(TEST_MOBILE, TEST_CODE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.id, "41");
    assert_eq!(user.name, "Asha Rao");
    assert_eq!(user.auth_type, AuthType::Otp);
    assert_eq!(
        first.credentials().authorization_header(),
        Some(format!("Bearer {TEST_TOKEN}"))
    );

    // A fresh manager over the same file picks the session back up
    let restarted = session(&api, &store);
    assert_eq!(restarted.state(), SessionState::Unknown);
    assert_eq!(
        restarted.resolve_session().await,
        SessionState::Authenticated(user)
    );
    assert_eq!(
        restarted.get_token().await.unwrap().expose_secret(),
        TEST_TOKEN
    );

    api.list_categories(&restarted.credentials()).await.unwrap();
    assert_eq!(
        stub.hits().last_authorization(),
        Some(format!("Bearer {TEST_TOKEN}"))
    );
}

#[tokio::test]
async fn test_invalid_input_never_reaches_the_service() {
    let stub = StubServer::start().await;
    let api = HttpApi::new(&stub.api_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("session.json")));
    let manager = session(&api, &store);

    let err = manager.send_otp("12345").await.unwrap_err();
    assert!(err.is_validation());
    let err = manager.send_otp("5123456789").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidMobile(_)));
    let err = manager.verify_otp(TEST_MOBILE, "12345").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidOtp(_)));

    assert_eq!(Hits::count(&stub.hits().send_otp), 0);
    assert_eq!(Hits::count(&stub.hits().verify_otp), 0);
}

#[tokio::test]
async fn test_service_rejections() {
    let stub = StubServer::start().await;
    let api = HttpApi::new(&stub.api_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("session.json")));
    let manager = session(&api, &store);

    // Unregistered number: the service answers 422 with a message
    let err = manager.send_otp("9123456780").await.unwrap_err();
    assert_eq!(err.display_message(), "Mobile number is not registered");
    assert!(!Error::from(err).is_retryable());

    // Wrong code: success=false, nothing stored
    assert_eq!(manager.verify_otp(TEST_MOBILE, "000000").await.unwrap(), None);
    assert!(!manager.has_valid_session().await);
    assert!(manager.get_current_user().await.is_none());
    assert!(!manager.credentials().is_authenticated());
}

#[tokio::test]
async fn test_sign_out_clears_everything() {
    let stub = StubServer::start().await;
    let api = HttpApi::new(&stub.api_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("session.json")));
    let manager = session(&api, &store);

    manager.verify_otp(TEST_MOBILE, TEST_CODE).await.unwrap();
    assert!(manager.has_valid_session().await);

    assert!(manager.sign_out().await.is_clean());
    assert!(!manager.has_valid_session().await);
    assert!(manager.get_current_user().await.is_none());
    assert_eq!(manager.state(), SessionState::SignedOut);

    // Second sign-out is harmless
    assert!(manager.sign_out().await.is_clean());

    // Catalog calls go out anonymously again
    api.list_categories(&manager.credentials()).await.unwrap();
    assert_eq!(stub.hits().last_authorization(), None);

    let restarted = session(&api, &store);
    assert_eq!(restarted.resolve_session().await, SessionState::SignedOut);
    assert_eq!(restarted.credentials().authorization_header(), None);
}

#[tokio::test]
async fn test_listing_follows_sign_in_and_sign_out() {
    let stub = StubServer::start().await;
    let api = HttpApi::new(&stub.api_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("session.json")));
    let manager = session(&api, &store);
    let listing = ListingController::with_credentials(
        Arc::new(api.clone()),
        ListingConfig {
            page_size: 2,
            search_limit: 100,
        },
        manager.shared_credentials(),
    );

    listing.refresh().await.unwrap();
    assert_eq!(stub.hits().last_authorization(), None);

    manager.verify_otp(TEST_MOBILE, TEST_CODE).await.unwrap();
    listing.load_more().await.unwrap();
    assert_eq!(
        stub.hits().last_authorization(),
        Some(format!("Bearer {TEST_TOKEN}"))
    );

    manager.sign_out().await;
    listing.load_more().await.unwrap();
    assert_eq!(stub.hits().last_authorization(), None);
}

#[tokio::test]
async fn test_corrupt_session_file_recovers_on_sign_in() {
    let stub = StubServer::start().await;
    let api = HttpApi::new(&stub.api_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();
    let store = Arc::new(FileStore::new(&path));
    let manager = session(&api, &store);

    assert_eq!(manager.resolve_session().await, SessionState::SignedOut);

    let user = manager
        .verify_otp(TEST_MOBILE, TEST_CODE)
        .await
        .unwrap()
        .unwrap();
    let restarted = session(&api, &store);
    assert_eq!(
        restarted.resolve_session().await,
        SessionState::Authenticated(user)
    );

    assert!(restarted.sign_out().await.is_clean());
    assert!(!restarted.has_valid_session().await);
}
