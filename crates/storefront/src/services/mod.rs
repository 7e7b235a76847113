//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `orders` - Checkout submission and order history
//! - `auth` - Admin credential exchange, session expiry, inventory writes

pub mod auth;
pub mod orders;

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds a service's "request in flight" flag for as long as it lives.
///
/// Dropping the guard clears the flag on every exit path, including when the
/// owning future is cancelled mid-request.
#[derive(Debug)]
pub(crate) struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    /// Set `flag`, or return `None` if it was already set.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
