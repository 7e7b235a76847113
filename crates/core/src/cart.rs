//! Client-side shopping cart.
//!
//! The cart is an insertion-ordered set of books keyed by [`BookId`]. Adding a
//! book that is already present does nothing, so quantity is always one.
//! Nothing here is persisted; the cart lives as long as the session that owns
//! it.

use crate::book::Book;
use crate::types::{BookId, Price};

/// Ordered collection of selected books.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<Book>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append `book` unless a book with the same id is already present.
    ///
    /// Returns `true` if the cart changed.
    pub fn add(&mut self, book: Book) -> bool {
        if self.contains(&book.id) {
            return false;
        }
        self.items.push(book);
        true
    }

    /// Remove the book with `id`. Returns `true` if the cart changed.
    pub fn remove(&mut self, id: &BookId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Empty the cart. Returns `true` if anything was removed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.items.is_empty();
        self.items.clear();
        changed
    }

    /// Sum of the current selling prices.
    ///
    /// Render with `to_string()` for the two-decimal form; an empty cart is
    /// `0.00`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(Book::selling_price).sum()
    }

    /// Books in the order they were added.
    #[must_use]
    pub fn items(&self) -> &[Book] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &BookId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    /// Ids of the books in cart order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<BookId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::book::Category;

    pub(crate) fn book(id: &str, price: Option<&str>) -> Book {
        Book {
            id: BookId::new(id),
            title: format!("Book {id}"),
            description: String::new(),
            category: Category::Fiction,
            author: None,
            cover_image: None,
            old_price: None,
            new_price: price.map(|p| p.parse().unwrap()),
            trending: false,
            created_at: None,
        }
    }

    #[test]
    fn test_empty_subtotal_is_zero() {
        assert_eq!(Cart::new().subtotal().to_string(), "0.00");
    }

    #[test]
    fn test_subtotal_of_two_books() {
        let mut cart = Cart::new();
        cart.add(book("b1", Some("199.5")));
        cart.add(book("b2", Some("50")));
        assert_eq!(cart.subtotal().to_string(), "249.50");
    }

    #[test]
    fn test_subtotal_ignores_add_order() {
        let mut forward = Cart::new();
        let mut backward = Cart::new();
        for (id, price) in [("a", "0.105"), ("b", "10.2"), ("c", "3.333")] {
            forward.add(book(id, Some(price)));
        }
        for (id, price) in [("c", "3.333"), ("b", "10.2"), ("a", "0.105")] {
            backward.add(book(id, Some(price)));
        }
        assert_eq!(forward.subtotal(), backward.subtotal());
        assert_eq!(forward.subtotal().to_string(), "13.64");
    }

    #[test]
    fn test_missing_price_counts_as_zero() {
        let mut cart = Cart::new();
        cart.add(book("b1", None));
        cart.add(book("b2", Some("7.25")));
        assert_eq!(cart.subtotal().to_string(), "7.25");
    }

    #[test]
    fn test_subtotal_of_huge_prices_saturates() {
        let mut cart = Cart::new();
        cart.add(book("b1", Some("50000000000000000000000000000")));
        cart.add(book("b2", Some("50000000000000000000000000000")));
        assert_eq!(
            cart.subtotal(),
            crate::Price::new(rust_decimal::Decimal::MAX)
        );
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut cart = Cart::new();
        assert!(cart.add(book("b1", Some("1"))));
        assert!(!cart.add(book("b1", Some("99"))));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.subtotal().to_string(), "1.00");
    }

    #[test]
    fn test_no_duplicates_across_mixed_sequence() {
        let mut cart = Cart::new();
        let ops = ["b1", "b2", "-b1", "b2", "b1", "b3", "-b9", "b3", "b1"];
        for op in ops {
            match op.strip_prefix('-') {
                Some(id) => {
                    cart.remove(&BookId::new(id));
                }
                None => {
                    cart.add(book(op, Some("1")));
                }
            }
            let mut ids = cart.product_ids();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), cart.len());
        }
        let ids: Vec<_> = cart.product_ids().into_iter().map(BookId::into_inner).collect();
        assert_eq!(ids, ["b2", "b1", "b3"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(book("b1", Some("1")));
        assert!(!cart.remove(&BookId::new("nope")));
        assert_eq!(cart.len(), 1);
        assert!(cart.contains(&BookId::new("b1")));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        assert!(!cart.clear());
        cart.add(book("b1", Some("1")));
        assert!(cart.clear());
        assert!(cart.is_empty());
    }
}
