//! Paperback Core - Storefront domain types.
//!
//! This crate provides the types and state transitions shared by every
//! Paperback component:
//! - `storefront` - Runtime client (HTTP API, order submission, admin auth)
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure transitions - no I/O, no
//! timers, no HTTP clients. Everything here can be exercised synchronously
//! in unit tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices and emails
//! - [`book`] - Catalog entries as served by the remote API
//! - [`cart`] - The client-side cart and its subtotal
//! - [`checkout`] - Checkout form and its validator
//! - [`order`] - Order request payload and created orders
//! - [`session`] - Admin session state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod book;
pub mod cart;
pub mod checkout;
pub mod order;
pub mod session;
pub mod types;

pub use book::{Book, Category, NewBook};
pub use cart::Cart;
pub use checkout::{CheckoutField, CheckoutForm, ValidatedCheckout, ValidationErrors};
pub use order::{Order, OrderRequest, ShippingAddress};
pub use session::{ADMIN_SESSION_TTL_SECS, AdminSession, SessionEvent, SessionStatus};
pub use types::*;
