//! Application state owned by the front end's root.
//!
//! The cart and the admin session are explicit containers created once and
//! handed to whoever needs them; nothing is global.

use std::sync::{Arc, Weak};

use tokio::sync::RwLock;

use paperback_core::{Book, BookId, Cart, Price};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::services::auth::{AdminAuthService, FileTokenStore, TokenStore};
use crate::services::orders::{Checkout, OrderService};

// =============================================================================
// CartHandle
// =============================================================================

/// Shared, mutable cart for the current session.
///
/// Clones point at the same cart. The cart is never persisted and is gone
/// when the last handle drops.
#[derive(Clone, Default)]
pub struct CartHandle {
    inner: Arc<RwLock<Cart>>,
}

impl CartHandle {
    /// A handle to a new, empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `book` unless it is already in the cart. Returns `true` if added.
    pub async fn add(&self, book: Book) -> bool {
        self.inner.write().await.add(book)
    }

    /// Remove the book with `id`. Returns `true` if it was present.
    pub async fn remove(&self, id: &BookId) -> bool {
        self.inner.write().await.remove(id)
    }

    /// Empty the cart. Returns `true` if anything was removed.
    pub async fn clear(&self) -> bool {
        self.inner.write().await.clear()
    }

    pub async fn subtotal(&self) -> Price {
        self.inner.read().await.subtotal()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Immutable copy of the cart as it is now.
    pub async fn snapshot(&self) -> Cart {
        self.inner.read().await.clone()
    }

    pub(crate) fn downgrade(&self) -> Weak<RwLock<Cart>> {
        Arc::downgrade(&self.inner)
    }
}

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across the front end.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// API client, the session's cart, and the services built on them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    api: ApiClient,
    cart: CartHandle,
    orders: OrderService,
    auth: AdminAuthService,
}

impl AppState {
    /// Create state persisting the admin token under `config.state_dir`.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let store = Arc::new(FileTokenStore::new(&config.state_dir));
        Self::with_token_store(config, store)
    }

    /// Create state with a caller-supplied token store.
    #[must_use]
    pub fn with_token_store(config: ClientConfig, store: Arc<dyn TokenStore>) -> Self {
        let api = ApiClient::new(config.api_base_url.clone());
        let auth = AdminAuthService::new(api.clone(), store);
        Self::from_parts(config, api, auth)
    }

    /// Assemble state from pre-built parts.
    #[must_use]
    pub fn from_parts(config: ClientConfig, api: ApiClient, auth: AdminAuthService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                orders: OrderService::new(api.clone()),
                api,
                cart: CartHandle::new(),
                auth,
            }),
        }
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the book service API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// The session's cart.
    #[must_use]
    pub fn cart(&self) -> &CartHandle {
        &self.inner.cart
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// Get a reference to the admin authentication service.
    #[must_use]
    pub fn auth(&self) -> &AdminAuthService {
        &self.inner.auth
    }

    /// Open a checkout against the session's cart.
    #[must_use]
    pub fn checkout(&self) -> Checkout {
        self.inner.orders.checkout(&self.inner.cart)
    }
}
