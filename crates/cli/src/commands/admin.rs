//! Admin session and inventory commands.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password from --password or PAPERBACK_ADMIN_PASSWORD)
//! paperback admin login --username admin
//!
//! # Check for a stored session token
//! paperback admin status
//!
//! # Add a book to the inventory
//! paperback admin add-book --title "Ledger" --category business --new-price 12.50
//!
//! # Purge the session token
//! paperback admin logout
//! ```
//!
//! # Environment Variables
//!
//! - `PAPERBACK_ADMIN_PASSWORD` - Admin password when `--password` is omitted
//! - `PAPERBACK_STATE_DIR` - Where the session token is stored

use paperback_core::{Category, NewBook, Price, SessionStatus};
use paperback_storefront::AppState;
use secrecy::SecretString;

use super::CliError;

/// Notice shown after a successful login.
const LOGIN_SUCCESS_NOTICE: &str = "Admin Login successful!";

/// Arguments of `admin add-book`.
pub struct AddBookInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub new_price: String,
    pub old_price: Option<String>,
    pub trending: bool,
    pub cover_image: Option<String>,
}

impl AddBookInput {
    fn into_new_book(self) -> Result<NewBook, CliError> {
        Ok(NewBook {
            title: self.title,
            description: self.description,
            category: Category::from(self.category),
            trending: self.trending,
            old_price: self.old_price.as_deref().map(Price::parse).transpose()?,
            new_price: Price::parse(&self.new_price)?,
            cover_image: self.cover_image,
        })
    }
}

/// Exchange credentials for a session token and store it.
pub async fn login(
    state: &AppState,
    username: &str,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = password
        .map(SecretString::from)
        .or_else(|| state.config().admin_password.clone())
        .ok_or(CliError::MissingPassword)?;

    state.auth().login(username, &password).await?;
    print_line(LOGIN_SUCCESS_NOTICE);
    Ok(())
}

/// Purge the stored session token.
pub fn logout(state: &AppState) -> Result<(), CliError> {
    state.auth().logout()?;
    print_line("Logged out.");
    Ok(())
}

/// Report whether the dashboard is accessible.
pub fn status(state: &AppState) {
    let message = match state.auth().status() {
        SessionStatus::Authenticated(_) => "Admin session active.",
        SessionStatus::Expired => "Admin session expired.",
        SessionStatus::Unauthenticated => "Not logged in.",
    };
    print_line(message);
}

/// Add a book using the stored session token.
pub async fn add_book(state: &AppState, input: AddBookInput) -> Result<(), CliError> {
    let book = input.into_new_book()?;
    if let Category::Other(other) = &book.category {
        tracing::warn!(category = %other, "Unknown category, sending as-is");
    }

    let created = state.auth().add_book(&book).await?;
    print_line(&format!("Book added: {} ({})", created.title, created.id));
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_line(message: &str) {
    println!("{message}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(new_price: &str, old_price: Option<&str>) -> AddBookInput {
        AddBookInput {
            title: "Ledger".to_string(),
            description: String::new(),
            category: "Business".to_string(),
            new_price: new_price.to_string(),
            old_price: old_price.map(str::to_string),
            trending: true,
            cover_image: None,
        }
    }

    #[test]
    fn test_add_book_input_parses_prices() {
        let book = input("12.5", Some("20")).into_new_book().unwrap();
        assert_eq!(book.category, Category::Business);
        assert_eq!(book.new_price.to_string(), "12.50");
        assert_eq!(book.old_price.unwrap().to_string(), "20.00");
    }

    #[test]
    fn test_add_book_input_rejects_bad_price() {
        assert!(matches!(
            input("cheap", None).into_new_book(),
            Err(CliError::Price(_))
        ));
    }
}
