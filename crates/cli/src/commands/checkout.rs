//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! paperback checkout --email ada@example.com --form shipping.yaml --book b1 --book b2
//! ```
//!
//! The form file holds the shipping details:
//!
//! ```yaml
//! name: Ada Reader
//! phone: "5551234"
//! address: 1 Library Lane
//! city: Springfield
//! state: IL
//! zipcode: "62701"
//! country: USA
//! consent: true
//! ```

use std::path::Path;

use paperback_core::{BookId, CheckoutForm, Email, Order};
use paperback_storefront::AppState;

use super::CliError;

/// Fill the cart with `book_ids`, validate the form file and submit.
pub async fn run(
    state: &AppState,
    email: &str,
    form_path: &Path,
    book_ids: &[String],
) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let form = read_form(form_path)?;

    for id in book_ids {
        let book = state.api().get_book(&BookId::new(id.as_str())).await?;
        if !state.cart().add(book).await {
            tracing::warn!(book_id = %id, "Book already in cart");
        }
    }

    tracing::info!(
        items = state.cart().len().await,
        subtotal = %state.cart().subtotal().await,
        "Cart ready"
    );

    let order = state.checkout().place_order(&form, email).await?;
    print_confirmation(&order);
    Ok(())
}

fn read_form(path: &Path) -> Result<CheckoutForm, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_form(&contents)
}

fn parse_form(contents: &str) -> Result<CheckoutForm, CliError> {
    Ok(serde_yaml::from_str(contents)?)
}

#[allow(clippy::print_stdout)]
fn print_confirmation(order: &Order) {
    println!("Order placed: {}", order.id);
    println!("  total: {}", order.total_price);
    println!("  books: {}", order.product_ids.len());
    println!("See your orders with: paperback orders list --email {}", order.email);
}
