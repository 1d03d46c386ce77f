//! User domain model
//!
//! A user is a registered patron. The set of borrowed ISBNs is a
//! back-reference kept in sync by the catalog.

use std::fmt;

use indexmap::IndexSet;

use super::record::{split_fields, Record, FIELD_SEPARATOR, LIST_SEPARATOR};

/// A registered library user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    name: String,
    user_id: String,
    borrowed_isbns: IndexSet<String>,
}

impl User {
    /// Creates a user holding no books
    pub fn new(name: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_id: user_id.into(),
            borrowed_isbns: IndexSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The catalog key
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// ISBNs currently held, in borrowing order
    pub fn borrowed_isbns(&self) -> impl Iterator<Item = &str> {
        self.borrowed_isbns.iter().map(String::as_str)
    }

    /// Number of books currently held
    pub fn borrowed_count(&self) -> usize {
        self.borrowed_isbns.len()
    }

    /// Records a borrowed ISBN. Borrowing the same ISBN twice keeps one entry.
    pub fn borrow_book(&mut self, isbn: impl Into<String>) {
        self.borrowed_isbns.insert(isbn.into());
    }

    /// Forgets a borrowed ISBN, returning whether it was held
    pub fn return_book(&mut self, isbn: &str) -> bool {
        self.borrowed_isbns.shift_remove(isbn)
    }

    pub fn has_borrowed_book(&self, isbn: &str) -> bool {
        self.borrowed_isbns.contains(isbn)
    }
}

impl Record for User {
    fn to_record(&self) -> String {
        let isbns: Vec<&str> = self.borrowed_isbns().collect();
        let list_separator = LIST_SEPARATOR.to_string();
        format!(
            "{}{sep}{}{sep}{}",
            self.name,
            self.user_id,
            isbns.join(list_separator.as_str()),
            sep = FIELD_SEPARATOR
        )
    }

    fn from_record(line: &str) -> Self {
        let [name, user_id, isbns] = split_fields::<3>(line);

        let mut user = Self::new(name, user_id);
        for isbn in isbns.split(LIST_SEPARATOR).filter(|s| !s.is_empty()) {
            user.borrow_book(isbn);
        }
        user
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name:     {}", self.name)?;
        writeln!(f, "User ID:  {}", self.user_id)?;
        if self.borrowed_isbns.is_empty() {
            write!(f, "Borrowed: none")
        } else {
            let isbns: Vec<&str> = self.borrowed_isbns().collect();
            write!(f, "Borrowed: {}", isbns.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_holds_nothing() {
        let user = User::new("Alice", "U1");
        assert_eq!(user.name(), "Alice");
        assert_eq!(user.user_id(), "U1");
        assert_eq!(user.borrowed_count(), 0);
    }

    #[test]
    fn borrow_is_idempotent() {
        let mut user = User::new("Alice", "U1");
        user.borrow_book("111");
        user.borrow_book("111");

        assert_eq!(user.borrowed_count(), 1);
        assert!(user.has_borrowed_book("111"));
    }

    #[test]
    fn return_unknown_isbn_is_noop() {
        let mut user = User::new("Alice", "U1");
        user.borrow_book("111");

        assert!(!user.return_book("222"));
        assert_eq!(user.borrowed_count(), 1);

        assert!(user.return_book("111"));
        assert!(!user.has_borrowed_book("111"));
    }

    #[test]
    fn return_preserves_borrow_order() {
        let mut user = User::new("Alice", "U1");
        user.borrow_book("111");
        user.borrow_book("222");
        user.borrow_book("333");
        user.return_book("222");

        assert_eq!(user.borrowed_isbns().collect::<Vec<_>>(), ["111", "333"]);
    }

    #[test]
    fn record_without_books() {
        assert_eq!(User::new("Alice", "U1").to_record(), "Alice|U1|");
    }

    #[test]
    fn record_with_books() {
        let mut user = User::new("Alice", "U1");
        user.borrow_book("111");
        user.borrow_book("222");

        assert_eq!(user.to_record(), "Alice|U1|111,222");
    }

    #[test]
    fn parse_record_with_books() {
        let user = User::from_record("Alice|U1|111,222");

        assert_eq!(user.name(), "Alice");
        assert_eq!(user.user_id(), "U1");
        assert_eq!(user.borrowed_isbns().collect::<Vec<_>>(), ["111", "222"]);
    }

    #[test]
    fn parse_skips_empty_and_repeated_entries() {
        let user = User::from_record("Alice|U1|111,,111,222,");
        assert_eq!(user.borrowed_isbns().collect::<Vec<_>>(), ["111", "222"]);
    }

    #[test]
    fn parse_short_record() {
        let user = User::from_record("Alice");
        assert_eq!(user.name(), "Alice");
        assert_eq!(user.user_id(), "");
        assert_eq!(user.borrowed_count(), 0);
    }
}
