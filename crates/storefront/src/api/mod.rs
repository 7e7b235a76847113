//! REST client for the remote book service.
//!
//! # Endpoints
//!
//! - `GET /api/books`, `GET /api/books/:id` - catalog (single books cached for 5 minutes)
//! - `POST /api/books` - add a book (admin bearer token)
//! - `POST /api/orders`, `GET /api/orders?email=` - orders
//! - `POST /api/auth/admin` - admin credential exchange
//!
//! # Example
//!
//! ```rust,ignore
//! use paperback_storefront::ApiClient;
//!
//! let client = ApiClient::new(config.api_base_url.clone());
//! let book = client.get_book(&BookId::new("64f1c0ffee")).await?;
//! ```

mod client;

pub use client::ApiClient;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the book service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the status reason.
        message: String,
    },
}

impl ApiError {
    /// Short reason suitable for showing to a user.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Http(_) => "Could not reach the book service".to_string(),
            Self::Parse(_) => "Unexpected response from the book service".to_string(),
            Self::Url(_) => "Invalid book service address".to_string(),
            Self::NotFound(what) => what.clone(),
            Self::Status { message, .. } => message.clone(),
        }
    }

    /// Whether the service rejected the request itself (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound(_))
            || matches!(self, Self::Status { status, .. } if *status >= 400 && *status < 500)
    }
}

/// Error body shape used by the book service.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Pull a human-readable message out of an error response body.
fn remote_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(message) = parsed.message.or(parsed.error)
    {
        return message;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('<') {
        return trimmed.chars().take(200).collect();
    }

    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
