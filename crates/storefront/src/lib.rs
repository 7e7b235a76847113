//! Paperback Storefront library.
//!
//! Runtime side of the storefront: the REST client for the remote book
//! service, order submission, and the admin session with its expiry timer.
//! Everything hangs off [`state::AppState`], which the front end (the
//! `paperback` CLI, or a UI) creates once and injects into consumers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

pub use api::{ApiClient, ApiError};
pub use config::{ApiEnvironment, ClientConfig, ConfigError};
pub use error::StorefrontError;
pub use services::auth::{AdminAuthService, AuthError, FileTokenStore, MemoryTokenStore, TokenStore};
pub use services::orders::{Checkout, OrderService, SubmitError};
pub use state::{AppState, CartHandle};
