//! Catalog entries.
//!
//! Books are owned by the remote service and read-only on the client. The one
//! exception is [`NewBook`], the payload the admin dashboard sends to add an
//! entry to the inventory.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BookId, Price};

// =============================================================================
// Category
// =============================================================================

/// Shelf a book is listed under.
///
/// Unknown values from the remote are kept verbatim in [`Category::Other`]
/// rather than failing the whole catalog response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Business,
    Technology,
    Fiction,
    Horror,
    Adventure,
    Other(String),
}

impl Category {
    /// Categories the dashboard offers when adding a book.
    pub const KNOWN: [Self; 5] = [
        Self::Business,
        Self::Technology,
        Self::Fiction,
        Self::Horror,
        Self::Adventure,
    ];

    /// Wire name of the category.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Business => "business",
            Self::Technology => "technology",
            Self::Fiction => "fiction",
            Self::Horror => "horror",
            Self::Adventure => "adventure",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Self::Business,
            "technology" => Self::Technology,
            "fiction" => Self::Fiction,
            "horror" => Self::Horror,
            "adventure" => Self::Adventure,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Book
// =============================================================================

/// A book as served by `GET /api/books` and `GET /api/books/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Remote document id.
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub author: Option<String>,
    /// Cover image reference (file name or URL).
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Price before discount, shown struck through.
    #[serde(default)]
    pub old_price: Option<Price>,
    /// Current selling price. Missing prices count as zero in the cart.
    #[serde(default)]
    pub new_price: Option<Price>,
    #[serde(default)]
    pub trending: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Price used for cart totals.
    #[must_use]
    pub fn selling_price(&self) -> Price {
        self.new_price.unwrap_or_default()
    }
}

/// Inventory entry submitted by the admin dashboard (`POST /api/books`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub trending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Price>,
    pub new_price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}
