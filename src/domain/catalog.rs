//! The catalog aggregate
//!
//! The catalog owns every book and user, keyed by ISBN and user ID. It is the
//! only place where checkout and return happen, so the book's borrower and the
//! user's held ISBNs always change together.
//!
//! ## Ordering
//!
//! Both maps keep insertion order. Queries that present books or users sort
//! their results (title, then author; user name), while scans such as
//! "who holds this ISBN" walk in insertion order.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use super::book::{Availability, Book};
use super::user::User;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("A book with ISBN {0} already exists")]
    DuplicateIsbn(String),

    #[error("A user with ID {0} already exists")]
    DuplicateUserId(String),

    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Book {isbn} is already checked out by {borrower}")]
    NotAvailable { isbn: String, borrower: String },

    #[error("Book {0} is not checked out")]
    NotCheckedOut(String),

    #[error("User {0} has no name to check books out under")]
    UnnamedBorrower(String),
}

/// Aggregate counts, computed on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total_books: usize,
    pub available_books: usize,
    pub checked_out_books: usize,
    pub total_users: usize,
}

/// Records that were dropped while importing because their key was taken
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub skipped_isbns: Vec<String>,
    pub skipped_user_ids: Vec<String>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_isbns.is_empty() && self.skipped_user_ids.is_empty()
    }
}

/// In-memory catalog of books and users
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: IndexMap<String, Book>,
    users: IndexMap<String, User>,
}

impl Catalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from loaded records.
    ///
    /// The first record for a key wins; later duplicates are skipped and
    /// listed in the report rather than failing the whole import.
    pub fn from_records(
        books: impl IntoIterator<Item = Book>,
        users: impl IntoIterator<Item = User>,
    ) -> (Self, ImportReport) {
        let mut catalog = Self::new();
        let mut report = ImportReport::default();

        for book in books {
            if let Err(CatalogError::DuplicateIsbn(isbn)) = catalog.add_book(book) {
                report.skipped_isbns.push(isbn);
            }
        }

        for user in users {
            if let Err(CatalogError::DuplicateUserId(id)) = catalog.add_user(user) {
                report.skipped_user_ids.push(id);
            }
        }

        (catalog, report)
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// Adds a book, rejecting an ISBN that is already catalogued
    pub fn add_book(&mut self, book: Book) -> Result<(), CatalogError> {
        if self.books.contains_key(book.isbn()) {
            return Err(CatalogError::DuplicateIsbn(book.isbn().to_string()));
        }
        self.books.insert(book.isbn().to_string(), book);
        Ok(())
    }

    /// Removes a book, returning it if it was present.
    ///
    /// Removing a checked-out book also clears it from the holder's list.
    pub fn remove_book(&mut self, isbn: &str) -> Option<Book> {
        let book = self.books.shift_remove(isbn)?;
        if !book.is_available() {
            self.release_holder(isbn);
        }
        Some(book)
    }

    pub fn find_book(&self, isbn: &str) -> Option<&Book> {
        self.books.get(isbn)
    }

    /// Case-insensitive substring search on titles, sorted by title
    pub fn search_books_by_title(&self, query: &str) -> Vec<&Book> {
        let needle = query.to_lowercase();
        let mut results: Vec<&Book> = self
            .books
            .values()
            .filter(|book| book.title().to_lowercase().contains(&needle))
            .collect();
        results.sort_by(|a, b| a.title().cmp(b.title()));
        results
    }

    /// Case-insensitive substring search on authors, sorted by author
    pub fn search_books_by_author(&self, query: &str) -> Vec<&Book> {
        let needle = query.to_lowercase();
        let mut results: Vec<&Book> = self
            .books
            .values()
            .filter(|book| book.author().to_lowercase().contains(&needle))
            .collect();
        results.sort_by(|a, b| a.author().cmp(b.author()));
        results
    }

    /// Finds a book whose title contains `title` and whose author equals
    /// `author`, both ignoring case
    pub fn find_similar(&self, title: &str, author: &str) -> Option<&Book> {
        let author = author.to_lowercase();
        self.search_books_by_title(title)
            .into_iter()
            .find(|book| book.author().to_lowercase() == author)
    }

    /// All books, sorted by title then author
    pub fn all_books(&self) -> Vec<&Book> {
        sorted_by_title_author(self.books.values())
    }

    /// Books that can be checked out, sorted by title then author
    pub fn available_books(&self) -> Vec<&Book> {
        sorted_by_title_author(self.books.values().filter(|book| book.is_available()))
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Adds a user, rejecting a user ID that is already registered
    pub fn add_user(&mut self, user: User) -> Result<(), CatalogError> {
        if self.users.contains_key(user.user_id()) {
            return Err(CatalogError::DuplicateUserId(user.user_id().to_string()));
        }
        self.users.insert(user.user_id().to_string(), user);
        Ok(())
    }

    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    /// All users, sorted by name
    pub fn all_users(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by(|a, b| a.name().cmp(b.name()));
        users
    }

    // =========================================================================
    // Checkout and return
    // =========================================================================

    /// Checks a book out to a user.
    ///
    /// Every precondition is verified before anything changes: on error
    /// neither the book nor the user is touched.
    pub fn check_out_book(&mut self, isbn: &str, user_id: &str) -> Result<(), CatalogError> {
        let book = self
            .books
            .get_mut(isbn)
            .ok_or_else(|| CatalogError::BookNotFound(isbn.to_string()))?;
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| CatalogError::UserNotFound(user_id.to_string()))?;

        if let Availability::CheckedOut { borrower } = book.availability() {
            return Err(CatalogError::NotAvailable {
                isbn: isbn.to_string(),
                borrower: borrower.clone(),
            });
        }
        if user.name().is_empty() {
            return Err(CatalogError::UnnamedBorrower(user_id.to_string()));
        }

        book.check_out(user.name());
        user.borrow_book(isbn);
        Ok(())
    }

    /// Returns a checked-out book, returning the name it was checked out to.
    ///
    /// The first user (in registration order) holding the ISBN releases it.
    pub fn return_book(&mut self, isbn: &str) -> Result<String, CatalogError> {
        let book = self
            .books
            .get_mut(isbn)
            .ok_or_else(|| CatalogError::BookNotFound(isbn.to_string()))?;

        if book.is_available() {
            return Err(CatalogError::NotCheckedOut(isbn.to_string()));
        }

        let borrower = book.return_book().unwrap_or_default();
        self.release_holder(isbn);
        Ok(borrower)
    }

    fn release_holder(&mut self, isbn: &str) {
        if let Some(holder) = self.users.values_mut().find(|u| u.has_borrowed_book(isbn)) {
            holder.return_book(isbn);
        }
    }

    // =========================================================================
    // Counters
    // =========================================================================

    pub fn total_books(&self) -> usize {
        self.books.len()
    }

    pub fn available_count(&self) -> usize {
        self.books.values().filter(|book| book.is_available()).count()
    }

    pub fn checked_out_count(&self) -> usize {
        self.total_books() - self.available_count()
    }

    pub fn total_users(&self) -> usize {
        self.users.len()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            total_books: self.total_books(),
            available_books: self.available_count(),
            checked_out_books: self.checked_out_count(),
            total_users: self.total_users(),
        }
    }
}

fn sorted_by_title_author<'a>(books: impl Iterator<Item = &'a Book>) -> Vec<&'a Book> {
    let mut books: Vec<&Book> = books.collect();
    books.sort_by(|a, b| {
        a.title()
            .cmp(b.title())
            .then_with(|| a.author().cmp(b.author()))
    });
    books
}
