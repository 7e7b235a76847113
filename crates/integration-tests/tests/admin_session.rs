//! Integration tests for the admin session lifecycle.
//!
//! Sessions here use short real-time lifetimes so expiry can be observed
//! against a live fake service.
//!
//! Run with: cargo test -p paperback-integration-tests --test admin_session

use std::time::Duration;

use paperback_core::{Category, NewBook, Price, SessionStatus};
use paperback_integration_tests::{ADMIN_PASSWORD, ADMIN_TOKEN, ADMIN_USERNAME, FakeBackend};
use paperback_storefront::{AuthError, StorefrontError, TokenStore};
use secrecy::{ExposeSecret, SecretString};

fn password(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn ledger() -> NewBook {
    NewBook {
        title: "Ledger Lines II".to_string(),
        description: "More bookkeeping".to_string(),
        category: Category::Business,
        trending: false,
        old_price: None,
        new_price: Price::parse("12.5").expect("valid price"),
        cover_image: None,
    }
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_grants_dashboard_and_add_book() {
    let backend = FakeBackend::start().await;
    let (state, store) = backend.app_state_with_session_ttl(Duration::from_secs(3600));
    let auth = state.auth();

    auth.login(ADMIN_USERNAME, &password(ADMIN_PASSWORD))
        .await
        .expect("Login should succeed");

    assert!(auth.can_access_dashboard());
    let stored = store.load().expect("store readable").expect("token stored");
    assert_eq!(stored.expose_secret(), ADMIN_TOKEN);

    let created = auth.add_book(&ledger()).await.expect("Book should be added");
    assert_eq!(created.title, "Ledger Lines II");
    assert_eq!(created.new_price.map(|p| p.to_string()).as_deref(), Some("12.50"));
    assert_eq!(backend.books().len(), 4);
}

#[tokio::test]
async fn test_invalid_credentials_leave_session_unauthenticated() {
    let backend = FakeBackend::start().await;
    let (state, store) = backend.app_state_with_session_ttl(Duration::from_secs(3600));

    let err = state
        .auth()
        .login(ADMIN_USERNAME, &password("wrong"))
        .await
        .expect_err("Login should fail");

    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(
        StorefrontError::from(err).notice(),
        "Invalid credentials. Please try again."
    );
    assert_eq!(state.auth().status(), SessionStatus::Unauthenticated);
    assert!(store.load().expect("store readable").is_none());
    assert_eq!(backend.login_requests(), 1);
}

#[tokio::test]
async fn test_second_login_while_in_flight_is_rejected() {
    let backend = FakeBackend::start().await;
    backend.delay_logins(Duration::from_millis(200));
    let (state, _store) = backend.app_state_with_session_ttl(Duration::from_secs(3600));
    let auth = state.auth();
    let secret = password(ADMIN_PASSWORD);

    let (first, second) = tokio::join!(
        auth.login(ADMIN_USERNAME, &secret),
        auth.login(ADMIN_USERNAME, &secret),
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(AuthError::AlreadyInFlight)));
    assert_eq!(backend.login_requests(), 1);
    assert!(auth.can_access_dashboard());

    auth.login(ADMIN_USERNAME, &secret)
        .await
        .expect("Login after the first completes should be accepted");
    assert_eq!(backend.login_requests(), 2);
}

#[tokio::test]
async fn test_add_book_without_login_sends_nothing() {
    let backend = FakeBackend::start().await;
    let state = backend.app_state();

    let err = state
        .auth()
        .add_book(&ledger())
        .await
        .expect_err("No session");

    assert!(matches!(err, AuthError::NotAuthenticated));
    assert_eq!(backend.books().len(), 3);
}

// ============================================================================
// Expiry and logout
// ============================================================================

#[tokio::test]
async fn test_session_expires_after_lifetime() {
    let backend = FakeBackend::start().await;
    let (state, store) = backend.app_state_with_session_ttl(Duration::from_millis(300));
    let auth = state.auth();

    auth.login(ADMIN_USERNAME, &password(ADMIN_PASSWORD))
        .await
        .expect("Login should succeed");
    assert!(auth.can_access_dashboard());

    let mut changes = auth.subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        changes.wait_for(SessionStatus::is_expired),
    )
    .await
    .expect("Session should expire")
    .expect("Status channel open");

    assert!(!auth.can_access_dashboard());
    assert!(store.load().expect("store readable").is_none());

    let err = auth.add_book(&ledger()).await.expect_err("Session expired");
    assert!(matches!(err, AuthError::SessionExpired));
    assert!(matches!(
        StorefrontError::from(err),
        StorefrontError::SessionExpired
    ));
    assert_eq!(backend.books().len(), 3);
}

#[tokio::test]
async fn test_logout_before_expiry_stays_logged_out() {
    let backend = FakeBackend::start().await;
    let (state, store) = backend.app_state_with_session_ttl(Duration::from_millis(200));
    let auth = state.auth();

    auth.login(ADMIN_USERNAME, &password(ADMIN_PASSWORD))
        .await
        .expect("Login should succeed");
    auth.logout().expect("Logout should succeed");

    assert_eq!(auth.status(), SessionStatus::Unauthenticated);
    assert!(store.load().expect("store readable").is_none());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(auth.status(), SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn test_relogin_after_expiry_starts_fresh_session() {
    let backend = FakeBackend::start().await;
    let (state, _store) = backend.app_state_with_session_ttl(Duration::from_millis(200));
    let auth = state.auth();

    auth.login(ADMIN_USERNAME, &password(ADMIN_PASSWORD))
        .await
        .expect("Login should succeed");
    let mut changes = auth.subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        changes.wait_for(SessionStatus::is_expired),
    )
    .await
    .expect("Session should expire")
    .expect("Status channel open");

    auth.login(ADMIN_USERNAME, &password(ADMIN_PASSWORD))
        .await
        .expect("Second login should succeed");

    assert!(auth.can_access_dashboard());
    auth.add_book(&ledger()).await.expect("Book should be added");
}
