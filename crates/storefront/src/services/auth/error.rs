//! Authentication error types.

use thiserror::Error;

use super::token_store::TokenStoreError;

/// Errors that can occur during admin authentication and dashboard calls.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The auth endpoint rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No admin session; log in first.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The session timer fired; log in again.
    #[error("session expired")]
    SessionExpired,

    /// A login request from this service is still outstanding.
    #[error("a login request is already in progress")]
    AlreadyInFlight,

    /// The service failed or could not be reached.
    #[error("remote error: {0}")]
    Remote(String),

    /// The token could not be persisted or purged.
    #[error("token store error: {0}")]
    Store(#[from] TokenStoreError),
}
