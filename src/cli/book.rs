//! Book CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::session::Session;
use crate::domain::{validation, Book, CatalogError};

#[derive(Subcommand)]
pub enum BookCommands {
    /// Add a book to the catalog
    ///
    /// Example:
    ///   shelf book add "Dune" "Frank Herbert" 9780441013593
    Add {
        /// Book title
        title: String,

        /// Book author
        author: String,

        /// ISBN-13 (13 digits)
        isbn: String,
    },

    /// Remove a book from the catalog
    Remove {
        /// ISBN of the book
        isbn: String,
    },

    /// List books sorted by title and author
    List {
        /// Show only books that can be checked out
        #[arg(long)]
        available: bool,
    },

    /// Show book details
    Show {
        /// ISBN of the book
        isbn: String,
    },

    /// Search books by title (or author with --author)
    Search {
        /// Text to look for, case-insensitive
        query: String,

        /// Match against the author instead of the title
        #[arg(long)]
        author: bool,
    },
}

pub fn run(cmd: BookCommands, session: &mut Session, output: &Output) -> Result<()> {
    match cmd {
        BookCommands::Add {
            title,
            author,
            isbn,
        } => add_book(session, output, &title, &author, &isbn),
        BookCommands::Remove { isbn } => remove_book(session, output, &isbn),
        BookCommands::List { available } => list_books(session, output, available),
        BookCommands::Show { isbn } => show_book(session, output, &isbn),
        BookCommands::Search { query, author } => search_books(session, output, &query, author),
    }
}

/// JSON representation shared by book commands
pub(super) fn book_json(book: &Book) -> serde_json::Value {
    let borrower = (!book.is_available()).then(|| book.borrower_name());
    serde_json::json!({
        "isbn": book.isbn(),
        "title": book.title(),
        "author": book.author(),
        "available": book.is_available(),
        "borrower": borrower,
    })
}

/// Prints books as a table
pub(super) fn print_book_table(books: &[&Book]) {
    println!("{:<15} {:<20} {:<30} AUTHOR", "ISBN", "STATUS", "TITLE");
    println!("{}", "-".repeat(80));
    for book in books {
        let status = if book.is_available() {
            "available".to_string()
        } else {
            format!("out ({})", book.borrower_name())
        };
        println!(
            "{:<15} {:<20} {:<30} {}",
            book.isbn(),
            status,
            book.title(),
            book.author()
        );
    }
}

fn add_book(
    session: &mut Session,
    output: &Output,
    title: &str,
    author: &str,
    isbn: &str,
) -> Result<()> {
    let title = validation::text("Title", title)?;
    let author = validation::text("Author", author)?;
    let isbn = validation::isbn(isbn)?;

    if let Some(existing) = session.catalog().find_similar(title, author) {
        anyhow::bail!(
            "A book with the same title and author already exists: {} - {} ({})",
            existing.title(),
            existing.author(),
            existing.isbn()
        );
    }

    session
        .catalog_mut()
        .add_book(Book::new(title, author, isbn))?;
    session.save(output)?;

    if output.is_json() {
        if let Some(book) = session.catalog().find_book(isbn) {
            output.data(&book_json(book));
        }
    } else {
        output.success(&format!("Added book: {} - {} ({})", title, author, isbn));
    }

    Ok(())
}

fn remove_book(session: &mut Session, output: &Output, isbn: &str) -> Result<()> {
    let isbn = isbn.trim();
    let removed = session
        .catalog_mut()
        .remove_book(isbn)
        .ok_or_else(|| CatalogError::BookNotFound(isbn.to_string()))?;

    if !removed.is_available() {
        output.verbose_ctx(
            "remove",
            &format!("Book was checked out by {}", removed.borrower_name()),
        );
    }
    session.save(output)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "removed": book_json(&removed),
        }));
    } else {
        output.success(&format!("Removed book: {} ({})", removed.title(), removed.isbn()));
    }

    Ok(())
}

fn list_books(session: &Session, output: &Output, available_only: bool) -> Result<()> {
    let catalog = session.catalog();
    let books = if available_only {
        catalog.available_books()
    } else {
        catalog.all_books()
    };
    output.verbose_ctx("list", &format!("Found {} book(s)", books.len()));

    if output.is_json() {
        let items: Vec<_> = books.iter().map(|b| book_json(b)).collect();
        output.data(&items);
    } else if books.is_empty() {
        if available_only {
            println!("No books available for checkout.");
        } else {
            println!("No books in the catalog.");
        }
    } else {
        print_book_table(&books);
    }

    Ok(())
}

fn show_book(session: &Session, output: &Output, isbn: &str) -> Result<()> {
    let isbn = isbn.trim();
    let book = session
        .catalog()
        .find_book(isbn)
        .ok_or_else(|| CatalogError::BookNotFound(isbn.to_string()))?;

    if output.is_json() {
        output.data(&book_json(book));
    } else {
        println!("{}", book);
    }

    Ok(())
}

fn search_books(session: &Session, output: &Output, query: &str, by_author: bool) -> Result<()> {
    let catalog = session.catalog();
    let results = if by_author {
        catalog.search_books_by_author(query)
    } else {
        catalog.search_books_by_title(query)
    };
    let field = if by_author { "author" } else { "title" };
    output.verbose_ctx(
        "search",
        &format!("{} result(s) for {} '{}'", results.len(), field, query),
    );

    if output.is_json() {
        let items: Vec<_> = results.iter().map(|b| book_json(b)).collect();
        output.data(&items);
    } else if results.is_empty() {
        println!("No books found with {} matching '{}'", field, query);
    } else {
        println!("Books with {} matching '{}':", field, query);
        print_book_table(&results);
        println!();
        println!("Found {} result(s)", results.len());
    }

    Ok(())
}
