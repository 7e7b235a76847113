//! Book service API client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP. Single-book lookups are cached with `moka`
//! (5-minute TTL) since cart and order views resolve the same ids repeatedly.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use paperback_core::{Book, BookId, Email, NewBook, Order, OrderRequest};

use super::{ApiError, remote_message};

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
struct AdminLoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AdminLoginResponse {
    token: String,
}

/// `POST /api/books` answers with the book, bare or wrapped.
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedBook {
    Wrapped { book: Book },
    Bare(Book),
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the book service REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the book cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<BookId, Book>,
}

impl ApiClient {
    /// Create a client rooted at `base_url` (which should end in `/`).
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url,
                cache,
            }),
        }
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// `api/books/<id>` with the id percent-encoded as a single path segment.
    fn book_endpoint(&self, id: &BookId) -> Result<Url, ApiError> {
        if matches!(id.as_str(), "" | "." | "..") {
            return Err(ApiError::NotFound(format!("Book not found: {id}")));
        }

        let mut url = self.endpoint("api/books/")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }

    /// Read a response body, mapping non-success statuses to `ApiError::Status`.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Book service returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: remote_message(status, &response_text),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse book service response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Book Methods
    // =========================================================================

    /// Get a book by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the service has no such book, or
    /// another error if the request fails.
    #[instrument(skip(self), fields(book_id = %id))]
    pub async fn get_book(&self, id: &BookId) -> Result<Book, ApiError> {
        if let Some(book) = self.inner.cache.get(id).await {
            debug!("Cache hit for book");
            return Ok(book);
        }

        let url = self.book_endpoint(id)?;
        let response = self.inner.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("Book not found: {id}")));
        }

        let book: Book = Self::read_json(response).await?;

        self.inner.cache.insert(id.clone(), book.clone()).await;

        Ok(book)
    }

    /// List the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        let url = self.endpoint("api/books")?;
        let response = self.inner.client.get(url).send().await?;
        let books: Vec<Book> = Self::read_json(response).await?;
        debug!(count = books.len(), "Fetched catalog");
        Ok(books)
    }

    /// Add a book to the inventory using an admin token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` if the service rejects the token or the
    /// payload.
    #[instrument(skip(self, book, token), fields(title = %book.title))]
    pub async fn create_book(&self, book: &NewBook, token: &SecretString) -> Result<Book, ApiError> {
        let url = self.endpoint("api/books")?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(book)
            .send()
            .await?;

        let created = match Self::read_json::<CreatedBook>(response).await? {
            CreatedBook::Wrapped { book } | CreatedBook::Bare(book) => book,
        };

        self.inner
            .cache
            .insert(created.id.clone(), created.clone())
            .await;

        Ok(created)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    #[instrument(skip(self, order), fields(items = order.product_ids.len(), total = %order.total_price))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<Order, ApiError> {
        let url = self.endpoint("api/orders")?;
        let response = self.inner.client.post(url).json(order).send().await?;
        Self::read_json(response).await
    }

    /// Orders placed by `email`, in the order the service returns them.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn orders_by_email(&self, email: &Email) -> Result<Vec<Order>, ApiError> {
        let mut url = self.endpoint("api/orders")?;
        url.query_pairs_mut().append_pair("email", email.as_str());

        let response = self.inner.client.get(url).send().await?;
        Self::read_json(response).await
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Exchange admin credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with a 4xx status if the credentials are
    /// rejected, or another error if the service cannot be reached.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn admin_login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, ApiError> {
        let url = self.endpoint("api/auth/admin")?;
        let response = self
            .inner
            .client
            .post(url)
            .json(&AdminLoginRequest {
                username,
                password: password.expose_secret(),
            })
            .send()
            .await?;

        let body: AdminLoginResponse = Self::read_json(response).await?;
        Ok(SecretString::from(body.token))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_onto_base_path() {
        let client = ApiClient::new(Url::parse("https://api.example.com/v1/").unwrap());
        assert_eq!(
            client.endpoint("api/books/b1").unwrap().as_str(),
            "https://api.example.com/v1/api/books/b1"
        );
    }

    #[test]
    fn test_book_endpoint_escapes_reserved_characters() {
        let client = ApiClient::new(Url::parse("http://h/").unwrap());
        let url = |id: &str| client.book_endpoint(&BookId::new(id)).unwrap().to_string();

        assert_eq!(url("b1"), "http://h/api/books/b1");
        assert_eq!(url("../orders"), "http://h/api/books/..%2Forders");
        assert_eq!(url("x?email=a"), "http://h/api/books/x%3Femail=a");
        assert_eq!(url("x#frag"), "http://h/api/books/x%23frag");
    }

    #[test]
    fn test_book_endpoint_rejects_dot_segments() {
        let client = ApiClient::new(Url::parse("http://h/").unwrap());
        for id in ["", ".", ".."] {
            assert!(matches!(
                client.book_endpoint(&BookId::new(id)),
                Err(ApiError::NotFound(_))
            ));
        }
    }

    #[test]
    fn test_created_book_accepts_both_shapes() {
        let bare = r#"{"_id": "b1", "title": "T", "category": "fiction", "newPrice": 5}"#;
        let wrapped = format!(r#"{{"message": "ok", "book": {bare}}}"#);

        for body in [bare.to_string(), wrapped] {
            let (CreatedBook::Wrapped { book } | CreatedBook::Bare(book)) =
                serde_json::from_str::<CreatedBook>(&body).unwrap();
            assert_eq!(book.id.as_str(), "b1");
        }
    }
}
