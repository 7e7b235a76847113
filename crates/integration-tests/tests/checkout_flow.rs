//! Integration tests for the cart to order lifecycle.
//!
//! Each test starts its own fake book service on a random local port.
//!
//! Run with: cargo test -p paperback-integration-tests --test checkout_flow

use std::time::Duration;

use paperback_core::{BookId, CheckoutField, Email};
use paperback_integration_tests::{FakeBackend, complete_form};
use paperback_storefront::{AppState, StorefrontError, SubmitError};

fn email() -> Email {
    Email::parse("ada@example.com").expect("valid email")
}

async fn fill_cart(state: &AppState, ids: &[&str]) {
    for id in ids {
        let book = state
            .api()
            .get_book(&BookId::new(*id))
            .await
            .expect("Failed to fetch book");
        assert!(state.cart().add(book).await);
    }
}

// ============================================================================
// Successful checkout
// ============================================================================

#[tokio::test]
async fn test_order_carries_cart_total_and_clears_cart() {
    let backend = FakeBackend::start().await;
    let state = backend.app_state();
    fill_cart(&state, &["b1", "b2"]).await;

    let order = state
        .checkout()
        .place_order(&complete_form(), email())
        .await
        .expect("Order should be placed");

    assert_eq!(order.total_price.to_string(), "249.50");
    assert_eq!(order.product_ids, vec![BookId::new("b1"), BookId::new("b2")]);
    assert!(state.cart().is_empty().await);

    let received = backend.orders();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["totalPrice"], "249.50");
    assert_eq!(received[0]["email"], "ada@example.com");
    assert_eq!(received[0]["address"]["zipcode"], "62701");
    assert_eq!(received[0]["productIds"][1], "b2");
}

#[tokio::test]
async fn test_order_history_filters_by_email() {
    let backend = FakeBackend::start().await;
    let state = backend.app_state();

    fill_cart(&state, &["b1"]).await;
    state
        .checkout()
        .place_order(&complete_form(), email())
        .await
        .expect("First order should be placed");

    fill_cart(&state, &["b2"]).await;
    state
        .checkout()
        .place_order(
            &complete_form(),
            Email::parse("someone@else.org").expect("valid email"),
        )
        .await
        .expect("Second order should be placed");

    let history = state
        .orders()
        .order_history(&email())
        .await
        .expect("Failed to fetch history");

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].email, "ada@example.com");
    assert_eq!(history[0].total_price.to_string(), "199.50");
    assert!(history[0].created_at.is_some());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_missing_zipcode_sends_nothing() {
    let backend = FakeBackend::start().await;
    let state = backend.app_state();
    fill_cart(&state, &["b1"]).await;

    let mut form = complete_form();
    form.zipcode = "   ".to_string();

    let err = state
        .checkout()
        .place_order(&form, email())
        .await
        .expect_err("Validation should fail");

    let StorefrontError::Validation(errors) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(CheckoutField::Zipcode), Some("Zipcode is required"));
    assert_eq!(backend.order_requests(), 0);
    assert_eq!(state.cart().len().await, 1);
}

#[tokio::test]
async fn test_empty_cart_sends_nothing() {
    let backend = FakeBackend::start().await;
    let state = backend.app_state();

    let err = state
        .checkout()
        .place_order(&complete_form(), email())
        .await
        .expect_err("Empty cart should fail");

    let StorefrontError::Validation(errors) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.contains(CheckoutField::Cart));
    assert_eq!(backend.order_requests(), 0);
}

#[tokio::test]
async fn test_remote_failure_keeps_cart_and_allows_retry() {
    let backend = FakeBackend::start().await;
    let state = backend.app_state();
    fill_cart(&state, &["b2", "b1"]).await;
    let before = state.cart().snapshot().await;
    backend.fail_orders(true);

    let checkout = state.checkout();
    let err = checkout
        .place_order(&complete_form(), email())
        .await
        .expect_err("Submission should fail");

    assert!(matches!(
        err,
        StorefrontError::Submit(SubmitError::Remote(_))
    ));
    assert_eq!(
        err.notice(),
        "Failed to place your order. Please check your details and try again."
    );
    let after = state.cart().snapshot().await;
    assert_eq!(after.product_ids(), before.product_ids());
    assert_eq!(after.product_ids(), vec![BookId::new("b2"), BookId::new("b1")]);
    assert!(!checkout.is_submitting());

    backend.fail_orders(false);
    let order = checkout
        .place_order(&complete_form(), email())
        .await
        .expect("Retry should succeed");

    assert_eq!(order.total_price.to_string(), "249.50");
    assert_eq!(backend.order_requests(), 2);
    assert!(state.cart().is_empty().await);
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_rejected() {
    let backend = FakeBackend::start().await;
    let state = backend.app_state();
    fill_cart(&state, &["b1"]).await;
    backend.delay_orders(Duration::from_millis(200));

    let checkout = state.checkout();
    let form = complete_form();
    let (first, second) = tokio::join!(
        checkout.place_order(&form, email()),
        checkout.place_order(&form, email()),
    );

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(StorefrontError::Submit(SubmitError::AlreadyInFlight))
    ));
    assert_eq!(backend.order_requests(), 1);
    assert!(!checkout.is_submitting());
}
