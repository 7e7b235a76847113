//! Checkout form and its validator.
//!
//! Validation is pure and reports every violated field at once. A successful
//! validation yields a [`ValidatedCheckout`], the only input the order
//! submission service accepts.

use std::collections::BTreeMap;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::cart::Cart;

/// Buyer shipping and contact details as entered on the checkout page.
///
/// The buyer email is not part of the form; it comes from the signed-in
/// identity when the order request is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    /// Terms and conditions acknowledgement.
    pub consent: bool,
}

/// Keys of the field-level error map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutField {
    Name,
    Phone,
    Address,
    City,
    State,
    Zipcode,
    Country,
    Consent,
    Cart,
}

impl CheckoutField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::Zipcode => "zipcode",
            Self::Country => "country",
            Self::Consent => "consent",
            Self::Cart => "cart",
        }
    }

    const fn required_message(self) -> &'static str {
        match self {
            Self::Name => "Full name is required",
            Self::Phone => "Phone number is required",
            Self::Address => "Address is required",
            Self::City => "City is required",
            Self::State => "State is required",
            Self::Zipcode => "Zipcode is required",
            Self::Country => "Country is required",
            Self::Consent => "You must agree to the Terms & Conditions and Shopping Policy",
            Self::Cart => "Your cart is empty",
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation failures, keyed by field.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("checkout has {} invalid field(s): {}", .0.len(), field_list(.0))]
pub struct ValidationErrors(BTreeMap<CheckoutField, String>);

fn field_list(errors: &BTreeMap<CheckoutField, String>) -> String {
    errors
        .keys()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    fn require(&mut self, field: CheckoutField, ok: bool) {
        if !ok {
            self.0.insert(field, field.required_message().to_owned());
        }
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: CheckoutField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: CheckoutField) -> bool {
        self.0.contains_key(&field)
    }

    /// Failed fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = CheckoutField> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CheckoutField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A checkout form and cart snapshot that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    form: CheckoutForm,
    cart: Cart,
}

impl ValidatedCheckout {
    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// The cart as it was when the form was validated.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

impl CheckoutForm {
    /// Check every required field, the consent flag and the cart.
    ///
    /// # Errors
    ///
    /// Returns all violations together when any text field is blank, consent
    /// is not given, or the cart is empty.
    pub fn validate(&self, cart: &Cart) -> Result<ValidatedCheckout, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        errors.require(CheckoutField::Name, filled(&self.name));
        errors.require(CheckoutField::Phone, filled(&self.phone));
        errors.require(CheckoutField::Address, filled(&self.address));
        errors.require(CheckoutField::City, filled(&self.city));
        errors.require(CheckoutField::State, filled(&self.state));
        errors.require(CheckoutField::Zipcode, filled(&self.zipcode));
        errors.require(CheckoutField::Country, filled(&self.country));
        errors.require(CheckoutField::Consent, self.consent);
        errors.require(CheckoutField::Cart, !cart.is_empty());

        if errors.is_empty() {
            Ok(ValidatedCheckout {
                form: self.clone(),
                cart: cart.clone(),
            })
        } else {
            Err(errors)
        }
    }
}
