//! Order history command.

use paperback_core::{Email, Order};
use paperback_storefront::AppState;

use super::CliError;

/// Print the orders placed by `email`.
pub async fn list(state: &AppState, email: &str) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let orders = state.orders().order_history(&email).await?;
    print_orders(&orders);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }

    for (index, order) in orders.iter().enumerate() {
        let placed = order
            .created_at
            .map_or_else(|| "unknown".to_string(), |at| at.format("%Y-%m-%d").to_string());
        println!("Order #{} ({})", index + 1, order.id);
        println!("  placed:  {placed}");
        println!("  name:    {}", order.name);
        println!("  email:   {}", order.email);
        println!("  phone:   {}", order.phone);
        println!(
            "  address: {}, {}, {}, {}",
            order.address.city, order.address.state, order.address.country, order.address.zipcode
        );
        println!("  books:   {}", order.product_ids.len());
        println!("  total:   {}", order.total_price);
    }
}
