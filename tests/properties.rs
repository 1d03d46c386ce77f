//! Property tests for the record format and the checkout state machine

use proptest::prelude::*;
use shelf_cli::domain::{Book, Catalog, Record, User};

/// Text that survives the record format: no field separator, no line breaks
fn field() -> impl Strategy<Value = String> {
    "[^|\r\n]{0,24}"
}

fn isbn() -> impl Strategy<Value = String> {
    "[0-9]{13}"
}

#[derive(Debug, Clone, Copy)]
enum Op {
    CheckOut { book: usize, user: usize },
    Return { book: usize },
    Remove { book: usize },
}

const BOOKS: usize = 4;
const USERS: usize = 3;

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..BOOKS, 0..USERS).prop_map(|(book, user)| Op::CheckOut { book, user }),
        2 => (0..BOOKS).prop_map(|book| Op::Return { book }),
        1 => (0..BOOKS).prop_map(|book| Op::Remove { book }),
    ]
}

fn isbn_for(index: usize) -> String {
    format!("{:013}", index)
}

fn user_id_for(index: usize) -> String {
    format!("U{}", index)
}

fn seeded_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    for i in 0..BOOKS {
        catalog
            .add_book(Book::new(format!("Title {}", i), "Author", isbn_for(i)))
            .unwrap();
    }
    for i in 0..USERS {
        catalog
            .add_user(User::new(format!("User {}", i), user_id_for(i)))
            .unwrap();
    }
    catalog
}

proptest! {
    #[test]
    fn prop_book_record_roundtrip(
        title in field(),
        author in field(),
        isbn in isbn(),
        borrower in prop::option::of(field()),
    ) {
        let mut book = Book::new(title, author, isbn);
        if let Some(borrower) = borrower {
            book.check_out(borrower);
        }

        prop_assert_eq!(Book::from_record(&book.to_record()), book);
    }

    #[test]
    fn prop_user_record_roundtrip(
        name in field(),
        id in "[^|,\r\n]{0,12}",
        isbns in prop::collection::vec(isbn(), 0..6),
    ) {
        let mut user = User::new(name, id);
        for isbn in isbns {
            user.borrow_book(isbn);
        }

        prop_assert_eq!(User::from_record(&user.to_record()), user);
    }

    #[test]
    fn prop_listing_is_sorted_by_title_then_author(
        entries in prop::collection::vec((field(), field()), 0..20),
    ) {
        let mut catalog = Catalog::new();
        for (i, (title, author)) in entries.iter().enumerate() {
            catalog
                .add_book(Book::new(title.as_str(), author.as_str(), isbn_for(i)))
                .unwrap();
        }

        let books = catalog.all_books();
        prop_assert_eq!(books.len(), entries.len());
        for pair in books.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!((a.title(), a.author()) <= (b.title(), b.author()));
        }
    }

    #[test]
    fn prop_title_search_matches_case_insensitively(
        titles in prop::collection::vec("[a-zA-Z ]{1,12}", 1..10),
        query in "[a-zA-Z]{1,3}",
    ) {
        let mut catalog = Catalog::new();
        for (i, title) in titles.iter().enumerate() {
            catalog
                .add_book(Book::new(title.as_str(), "Author", isbn_for(i)))
                .unwrap();
        }

        let needle = query.to_lowercase();
        let expected = titles
            .iter()
            .filter(|t| t.to_lowercase().contains(&needle))
            .count();
        prop_assert_eq!(catalog.search_books_by_title(&query).len(), expected);
    }

    #[test]
    fn prop_holders_stay_consistent(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut catalog = seeded_catalog();

        for op in ops {
            match op {
                Op::CheckOut { book, user } => {
                    let _ = catalog.check_out_book(&isbn_for(book), &user_id_for(user));
                }
                Op::Return { book } => {
                    let _ = catalog.return_book(&isbn_for(book));
                }
                Op::Remove { book } => {
                    catalog.remove_book(&isbn_for(book));
                }
            }

            let users: Vec<&User> = (0..USERS)
                .filter_map(|i| catalog.find_user(&user_id_for(i)))
                .collect();

            // A checked-out book has exactly one holder; an available or
            // removed book has none
            for i in 0..BOOKS {
                let isbn = isbn_for(i);
                let holders: Vec<&&User> = users
                    .iter()
                    .filter(|u| u.has_borrowed_book(&isbn))
                    .collect();

                match catalog.find_book(&isbn) {
                    Some(book) if !book.is_available() => {
                        prop_assert_eq!(holders.len(), 1);
                        prop_assert_eq!(book.borrower_name(), holders[0].name());
                    }
                    _ => prop_assert!(holders.is_empty()),
                }
            }

            let stats = catalog.stats();
            prop_assert_eq!(stats.available_books + stats.checked_out_books, stats.total_books);
            let held: usize = users.iter().map(|u| u.borrowed_count()).sum();
            prop_assert_eq!(held, stats.checked_out_books);
        }
    }
}
