//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! paperback books list
//! paperback books show 64f1c0ffee
//! ```

use paperback_core::{Book, BookId};
use paperback_storefront::AppState;

use super::CliError;

/// Print every book, one per line.
pub async fn list(state: &AppState) -> Result<(), CliError> {
    let books = state.api().list_books().await?;
    tracing::info!("Fetched {} books", books.len());
    print_rows(&books);
    Ok(())
}

/// Print the details of one book.
pub async fn show(state: &AppState, id: &str) -> Result<(), CliError> {
    let book = state.api().get_book(&BookId::new(id)).await?;
    print_details(&book);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_rows(books: &[Book]) {
    for book in books {
        let marker = if book.trending { " *" } else { "" };
        println!(
            "{}\t{}\t{}\t{}{marker}",
            book.id,
            book.title,
            book.category,
            book.selling_price()
        );
    }
}

#[allow(clippy::print_stdout)]
fn print_details(book: &Book) {
    println!("{}", book.title);
    if let Some(author) = &book.author {
        println!("  by {author}");
    }
    println!("  id:       {}", book.id);
    println!("  category: {}", book.category);
    match book.old_price {
        Some(old) => println!("  price:    {} (was {old})", book.selling_price()),
        None => println!("  price:    {}", book.selling_price()),
    }
    if book.trending {
        println!("  trending");
    }
    if !book.description.is_empty() {
        println!();
        println!("{}", book.description);
    }
}
