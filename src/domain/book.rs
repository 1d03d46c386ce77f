//! Book domain model
//!
//! A book is a single catalog item. Its checkout state is a tagged value, so
//! a book can never be available while still carrying a borrower.

use std::fmt;

use super::record::{split_fields, Record, FIELD_SEPARATOR};

const AVAILABLE_FLAG: &str = "1";
const CHECKED_OUT_FLAG: &str = "0";

/// Checkout state of a book
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Available,
    CheckedOut {
        /// Display name of the borrower (not their user ID)
        borrower: String,
    },
}

impl Availability {
    /// Returns true if the book can be checked out
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// A book in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    title: String,
    author: String,
    isbn: String,
    availability: Availability,
}

impl Book {
    /// Creates an available book
    pub fn new(title: impl Into<String>, author: impl Into<String>, isbn: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            availability: Availability::Available,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// The catalog key
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// Returns true if the book is on the shelf
    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }

    /// Returns the borrower's name, or an empty string when available
    pub fn borrower_name(&self) -> &str {
        match &self.availability {
            Availability::Available => "",
            Availability::CheckedOut { borrower } => borrower,
        }
    }

    /// Checks the book out to `borrower`.
    ///
    /// Only an available book transitions, and only to a non-empty borrower;
    /// otherwise the book is left untouched. Returns whether the transition
    /// happened.
    pub fn check_out(&mut self, borrower: impl Into<String>) -> bool {
        let borrower = borrower.into();
        if !self.is_available() || borrower.is_empty() {
            return false;
        }
        self.availability = Availability::CheckedOut { borrower };
        true
    }

    /// Marks the book available regardless of its prior state.
    ///
    /// Returns the borrower it was checked out to, if any.
    pub fn return_book(&mut self) -> Option<String> {
        match std::mem::take(&mut self.availability) {
            Availability::Available => None,
            Availability::CheckedOut { borrower } => Some(borrower),
        }
    }
}

impl Record for Book {
    fn to_record(&self) -> String {
        let flag = if self.is_available() {
            AVAILABLE_FLAG
        } else {
            CHECKED_OUT_FLAG
        };
        let separator = FIELD_SEPARATOR.to_string();
        [
            self.title.as_str(),
            self.author.as_str(),
            self.isbn.as_str(),
            flag,
            self.borrower_name(),
        ]
        .join(separator.as_str())
    }

    fn from_record(line: &str) -> Self {
        let [title, author, isbn, flag, borrower] = split_fields::<5>(line);

        // Anything other than an explicit "1" reads as checked out, even when
        // the borrower field is empty
        let availability = if flag == AVAILABLE_FLAG {
            Availability::Available
        } else {
            Availability::CheckedOut {
                borrower: borrower.to_string(),
            }
        };

        Self {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            availability,
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title:  {}", self.title)?;
        writeln!(f, "Author: {}", self.author)?;
        writeln!(f, "ISBN:   {}", self.isbn)?;
        match &self.availability {
            Availability::Available => write!(f, "Status: Available"),
            Availability::CheckedOut { borrower } => {
                write!(f, "Status: Checked out by {}", borrower)
            }
        }
    }
}
