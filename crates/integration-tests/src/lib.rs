//! Integration test support for Paperback.
//!
//! [`FakeBackend`] is an in-process `axum` stand-in for the remote book
//! service, bound to `127.0.0.1:0`. It implements the REST surface the
//! storefront talks to and records what it receives so tests can assert on
//! request counts and payloads.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p paperback-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Book listing, lookup and caching
//! - `checkout_flow` - Cart to order lifecycle
//! - `admin_session` - Login, expiry, logout, inventory writes

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

use paperback_core::CheckoutForm;
use paperback_storefront::{
    AdminAuthService, ApiClient, AppState, ClientConfig, MemoryTokenStore, TokenStore,
};

/// Username the fake auth endpoint accepts.
pub const ADMIN_USERNAME: &str = "admin";
/// Password the fake auth endpoint accepts.
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";
/// Token the fake auth endpoint issues.
pub const ADMIN_TOKEN: &str = "test-admin-token";

// =============================================================================
// Backend state
// =============================================================================

#[derive(Default)]
struct Backend {
    books: Mutex<Vec<Value>>,
    orders: Mutex<Vec<Value>>,
    order_requests: AtomicUsize,
    book_lookups: AtomicUsize,
    login_requests: AtomicUsize,
    fail_orders: AtomicBool,
    order_delay: Mutex<Duration>,
    login_delay: Mutex<Duration>,
}

type Shared = Arc<Backend>;

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn list_books(State(backend): State<Shared>) -> Json<Vec<Value>> {
    Json(backend.books.lock().expect("books lock").clone())
}

async fn get_book(State(backend): State<Shared>, Path(id): Path<String>) -> Response {
    backend.book_lookups.fetch_add(1, Ordering::SeqCst);
    let found = backend
        .books
        .lock()
        .expect("books lock")
        .iter()
        .find(|book| book["_id"] == id.as_str())
        .cloned();

    match found {
        Some(book) => Json(book).into_response(),
        None => message(StatusCode::NOT_FOUND, "Book not found"),
    }
}

async fn create_book(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(mut book): Json<Value>,
) -> Response {
    let expected = format!("Bearer {ADMIN_TOKEN}");
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        return message(StatusCode::UNAUTHORIZED, "Access Denied. No token provided");
    }

    let mut books = backend.books.lock().expect("books lock");
    book["_id"] = json!(format!("new-{}", books.len() + 1));
    book["createdAt"] = json!(chrono::Utc::now().to_rfc3339());
    books.push(book.clone());

    Json(json!({ "message": "Book posted successfully", "book": book })).into_response()
}

async fn create_order(State(backend): State<Shared>, Json(mut order): Json<Value>) -> Response {
    let count = backend.order_requests.fetch_add(1, Ordering::SeqCst) + 1;

    let delay = *backend.order_delay.lock().expect("delay lock");
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if backend.fail_orders.load(Ordering::SeqCst) {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create order");
    }

    order["_id"] = json!(format!("order-{count}"));
    order["createdAt"] = json!(chrono::Utc::now().to_rfc3339());
    backend
        .orders
        .lock()
        .expect("orders lock")
        .push(order.clone());

    Json(order).into_response()
}

async fn orders_by_email(
    State(backend): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let email = params.get("email").cloned().unwrap_or_default();
    let orders = backend
        .orders
        .lock()
        .expect("orders lock")
        .iter()
        .filter(|order| order["email"] == email.as_str())
        .cloned()
        .collect();
    Json(orders)
}

async fn admin_login(State(backend): State<Shared>, Json(body): Json<Value>) -> Response {
    backend.login_requests.fetch_add(1, Ordering::SeqCst);

    let delay = *backend.login_delay.lock().expect("delay lock");
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if body["username"] == ADMIN_USERNAME && body["password"] == ADMIN_PASSWORD {
        Json(json!({ "message": "Authentication successful", "token": ADMIN_TOKEN }))
            .into_response()
    } else {
        message(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

// =============================================================================
// FakeBackend
// =============================================================================

/// Running fake book service. The server stops when this is dropped.
pub struct FakeBackend {
    base_url: Url,
    backend: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a backend serving [`sample_books`].
    pub async fn start() -> Self {
        Self::with_books(sample_books()).await
    }

    /// Start a backend serving `books`.
    pub async fn with_books(books: Vec<Value>) -> Self {
        let backend: Shared = Arc::new(Backend {
            books: Mutex::new(books),
            ..Backend::default()
        });

        let app = Router::new()
            .route("/api/books", get(list_books).post(create_book))
            .route("/api/books/{id}", get(get_book))
            .route("/api/orders", get(orders_by_email).post(create_order))
            .route("/api/auth/admin", axum::routing::post(admin_login))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");

        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Fake backend crashed");
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}/")).expect("Invalid backend URL"),
            backend,
            server,
        }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Client configuration pointing at this backend.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_base_url(self.base_url.clone())
    }

    /// Application state with an in-memory token store.
    #[must_use]
    pub fn app_state(&self) -> AppState {
        AppState::with_token_store(self.config(), Arc::new(MemoryTokenStore::new()))
    }

    /// Application state whose admin sessions last `ttl`, plus its token store.
    #[must_use]
    pub fn app_state_with_session_ttl(&self, ttl: Duration) -> (AppState, Arc<MemoryTokenStore>) {
        let store = Arc::new(MemoryTokenStore::new());
        let config = self.config();
        let api = ApiClient::new(config.api_base_url.clone());
        let auth = AdminAuthService::with_session_ttl(
            api.clone(),
            Arc::clone(&store) as Arc<dyn TokenStore>,
            ttl,
        );
        (AppState::from_parts(config, api, auth), store)
    }

    /// Make `POST /api/orders` answer 500 until switched back.
    pub fn fail_orders(&self, fail: bool) {
        self.backend.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Hold every `POST /api/orders` response for `delay`.
    pub fn delay_orders(&self, delay: Duration) {
        *self.backend.order_delay.lock().expect("delay lock") = delay;
    }

    /// Hold every `POST /api/auth/admin` response for `delay`.
    pub fn delay_logins(&self, delay: Duration) {
        *self.backend.login_delay.lock().expect("delay lock") = delay;
    }

    /// Number of `POST /api/orders` requests received, failed ones included.
    #[must_use]
    pub fn order_requests(&self) -> usize {
        self.backend.order_requests.load(Ordering::SeqCst)
    }

    /// Number of `GET /api/books/:id` requests received.
    #[must_use]
    pub fn book_lookups(&self) -> usize {
        self.backend.book_lookups.load(Ordering::SeqCst)
    }

    /// Number of `POST /api/auth/admin` requests received.
    #[must_use]
    pub fn login_requests(&self) -> usize {
        self.backend.login_requests.load(Ordering::SeqCst)
    }

    /// Orders stored so far, as received plus `_id` and `createdAt`.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.backend.orders.lock().expect("orders lock").clone()
    }

    /// Current catalog, including books added through the API.
    #[must_use]
    pub fn books(&self) -> Vec<Value> {
        self.backend.books.lock().expect("books lock").clone()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Three books: two priced, one without a price.
#[must_use]
pub fn sample_books() -> Vec<Value> {
    vec![
        json!({
            "_id": "b1",
            "title": "The Long Night",
            "description": "A slow-burn horror novel",
            "category": "horror",
            "author": "M. Grey",
            "coverImage": "book-1.png",
            "oldPrice": 249.99,
            "newPrice": 199.5,
            "trending": true,
            "createdAt": "2024-03-01T10:00:00.000Z"
        }),
        json!({
            "_id": "b2",
            "title": "Ledger Lines",
            "description": "Bookkeeping for founders",
            "category": "business",
            "coverImage": "book-2.png",
            "oldPrice": 60,
            "newPrice": 50,
            "trending": false,
            "createdAt": "2024-03-02T10:00:00.000Z"
        }),
        json!({
            "_id": "b3",
            "title": "Free Sample",
            "category": "fiction",
            "trending": false
        }),
    ]
}

/// A checkout form with every field filled and consent given.
#[must_use]
pub fn complete_form() -> CheckoutForm {
    CheckoutForm {
        name: "Ada Reader".to_string(),
        phone: "5551234".to_string(),
        address: "1 Library Lane".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zipcode: "62701".to_string(),
        country: "USA".to_string(),
        consent: true,
    }
}
