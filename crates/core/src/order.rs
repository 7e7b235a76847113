//! Order request payload and created orders.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::checkout::ValidatedCheckout;
use crate::types::{BookId, Email, OrderId, Price};

/// Shipping destination as sent to and returned by the orders API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zipcode: String,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub name: String,
    pub email: Email,
    pub address: ShippingAddress,
    pub phone: String,
    /// Cart order, no dedup.
    pub product_ids: Vec<BookId>,
    /// Cart subtotal, serialized as a two-decimal string.
    pub total_price: Price,
}

impl OrderRequest {
    /// Build the payload for a validated checkout on behalf of `email`.
    #[must_use]
    pub fn new(checkout: &ValidatedCheckout, email: Email) -> Self {
        let form = checkout.form();
        let cart = checkout.cart();
        Self {
            name: form.name.trim().to_owned(),
            email,
            address: ShippingAddress {
                city: form.city.trim().to_owned(),
                country: form.country.trim().to_owned(),
                state: form.state.trim().to_owned(),
                zipcode: form.zipcode.trim().to_owned(),
            },
            phone: form.phone.trim().to_owned(),
            product_ids: cart.product_ids(),
            total_price: cart.subtotal(),
        }
    }
}

/// An order as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: ShippingAddress,
    /// Stored as a number by some backends; always surfaced as text.
    #[serde(default, deserialize_with = "phone_text")]
    pub phone: String,
    #[serde(default)]
    pub product_ids: Vec<BookId>,
    pub total_price: Price,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

struct PhoneVisitor;

impl Visitor<'_> for PhoneVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a phone number as text or digits")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}

fn phone_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(PhoneVisitor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::cart::tests::book;
    use crate::checkout::CheckoutForm;

    #[test]
    fn test_request_payload_shape() {
        let mut cart = Cart::new();
        cart.add(book("b1", Some("199.5")));
        cart.add(book("b2", Some("50")));
        let form = CheckoutForm {
            name: " Ada Reader ".to_owned(),
            phone: "5551234".to_owned(),
            address: "1 Library Lane".to_owned(),
            city: "Springfield".to_owned(),
            state: "IL".to_owned(),
            zipcode: "62701".to_owned(),
            country: "USA".to_owned(),
            consent: true,
        };
        let validated = form.validate(&cart).unwrap();
        let request = OrderRequest::new(&validated, Email::parse("ada@example.com").unwrap());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Ada Reader",
                "email": "ada@example.com",
                "address": {
                    "city": "Springfield",
                    "country": "USA",
                    "state": "IL",
                    "zipcode": "62701"
                },
                "phone": "5551234",
                "productIds": ["b1", "b2"],
                "totalPrice": "249.50"
            })
        );
    }

    #[test]
    fn test_order_with_numeric_phone() {
        let json = r#"{
            "_id": "o1",
            "name": "Ada",
            "email": "ada@example.com",
            "address": {"city": "Springfield", "country": "USA", "state": "IL", "zipcode": "62701"},
            "phone": 5551234,
            "productIds": ["b1", "b1"],
            "totalPrice": 20,
            "createdAt": "2024-05-01T12:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.phone, "5551234");
        assert_eq!(order.product_ids.len(), 2);
        assert_eq!(order.total_price.to_string(), "20.00");
    }
}
