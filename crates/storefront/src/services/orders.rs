//! Order submission and order history.
//!
//! A [`Checkout`] is opened against the application's cart. It turns a
//! [`ValidatedCheckout`] into an order request, sends it once, and clears the
//! cart when the service accepts it. Failures leave the cart exactly as it
//! was. There is no retry and no idempotency key: if the success response is
//! lost, resubmitting creates a second order.

use std::sync::Weak;
use std::sync::atomic::AtomicBool;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use paperback_core::{Cart, CheckoutForm, Email, Order, OrderRequest, ValidatedCheckout};

use crate::api::{ApiClient, ApiError};
use crate::error::{StorefrontError, add_breadcrumb};
use crate::services::InFlightGuard;
use crate::state::CartHandle;

/// Errors from [`Checkout::submit`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// Another submission on this checkout has not finished yet.
    #[error("an order submission is already in progress")]
    AlreadyInFlight,

    /// The orders endpoint failed or could not be reached.
    #[error("order submission failed: {0}")]
    Remote(String),
}

// =============================================================================
// OrderService
// =============================================================================

/// Entry point for order operations.
#[derive(Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Open a checkout against `cart`.
    #[must_use]
    pub fn checkout(&self, cart: &CartHandle) -> Checkout {
        Checkout {
            api: self.api.clone(),
            cart: cart.downgrade(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Orders previously placed by `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn order_history(&self, email: &Email) -> Result<Vec<Order>, ApiError> {
        self.api.orders_by_email(email).await
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// One checkout page's worth of submission state.
///
/// Holds only a weak reference to the cart: if the application drops or
/// replaces its cart while a request is outstanding, a late success does not
/// resurrect or clear anything.
pub struct Checkout {
    api: ApiClient,
    cart: Weak<RwLock<Cart>>,
    in_flight: AtomicBool,
}

impl Checkout {
    /// Whether a submission is currently outstanding.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(std::sync::atomic::Ordering::Acquire)
    }

    /// Submit a validated checkout on behalf of `email`.
    ///
    /// On success the cart is cleared and the created order returned.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::AlreadyInFlight` without sending anything if a
    /// submission is outstanding, or `SubmitError::Remote` if the service
    /// fails. The cart is untouched on error.
    #[instrument(skip(self, checkout, email), fields(items = checkout.cart().len()))]
    pub async fn submit(
        &self,
        checkout: &ValidatedCheckout,
        email: Email,
    ) -> Result<Order, SubmitError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or_else(|| {
            warn!("Order submission already in flight");
            SubmitError::AlreadyInFlight
        })?;

        let request = OrderRequest::new(checkout, email);

        let order = match self.api.create_order(&request).await {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "Order submission failed");
                return Err(SubmitError::Remote(e.reason()));
            }
        };

        if let Some(cart) = self.cart.upgrade() {
            cart.write().await.clear();
        }

        info!(order_id = %order.id, total = %order.total_price, "Order placed");
        add_breadcrumb("order", "Order placed", &[("order_id", order.id.as_str())]);

        Ok(order)
    }

    /// Snapshot the cart, validate `form` against it and submit.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` with every failing field, or the
    /// submission error.
    pub async fn place_order(
        &self,
        form: &CheckoutForm,
        email: Email,
    ) -> Result<Order, StorefrontError> {
        let snapshot = match self.cart.upgrade() {
            Some(cart) => cart.read().await.clone(),
            None => Cart::new(),
        };

        let validated = form.validate(&snapshot)?;
        Ok(self.submit(&validated, email).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;

    fn unreachable_api() -> ApiClient {
        ApiClient::new(Url::parse("http://127.0.0.1:9/").unwrap())
    }

    #[tokio::test]
    async fn test_invalid_form_never_submits() {
        let cart = CartHandle::new();
        let checkout = OrderService::new(unreachable_api()).checkout(&cart);

        let err = checkout
            .place_order(&CheckoutForm::default(), Email::parse("a@b.c").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, StorefrontError::Validation(_)));
        assert!(!checkout.is_submitting());
    }

    #[tokio::test]
    async fn test_dropped_cart_validates_as_empty() {
        let cart = CartHandle::new();
        let checkout = OrderService::new(unreachable_api()).checkout(&cart);
        drop(cart);

        let form = CheckoutForm {
            name: "Ada".to_string(),
            phone: "1".to_string(),
            address: "x".to_string(),
            city: "x".to_string(),
            state: "x".to_string(),
            zipcode: "x".to_string(),
            country: "x".to_string(),
            consent: true,
        };
        let err = checkout
            .place_order(&form, Email::parse("a@b.c").unwrap())
            .await
            .unwrap_err();

        let StorefrontError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(paperback_core::CheckoutField::Cart));
    }
}
