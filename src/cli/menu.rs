//! Interactive numbered menu
//!
//! The menu works on an in-memory session and only writes the data files when
//! the user saves or quits. Input is trimmed and validated here; the catalog
//! never reads from the terminal itself.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};

use super::output::Output;
use super::session::Session;
use crate::domain::{validation, Book, User, ValidationError};
use crate::storage::MenuConfig;

/// Whether the loop keeps running after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Input ended; save and leave
    Exit,
}

const MENU_ENTRIES: &[&str] = &[
    "1.  Add a book",
    "2.  Remove a book",
    "3.  Search books by title",
    "4.  Search books by author",
    "5.  Show all books",
    "6.  Show available books",
    "7.  Add a user",
    "8.  Show all users",
    "9.  Check out a book",
    "10. Return a book",
    "11. Library statistics",
    "12. Save data",
    "13. Create a backup",
    "0.  Quit",
];

/// Runs the menu on the process's stdin and stdout
pub fn run(session: &mut Session, output: &Output) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();

    let mut settings = session.config().menu.clone();
    settings.clear_screen &= stdout.is_terminal();
    output.verbose_ctx(
        "menu",
        &format!(
            "clear_screen={}, pause={}",
            settings.clear_screen, settings.pause
        ),
    );

    let mut menu = Menu::new(stdin.lock(), stdout.lock(), session, output, settings);
    menu.run()
}

struct Menu<'a, R, W> {
    input: R,
    out: W,
    session: &'a mut Session,
    output: &'a Output,
    settings: MenuConfig,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    fn new(
        input: R,
        out: W,
        session: &'a mut Session,
        output: &'a Output,
        settings: MenuConfig,
    ) -> Self {
        Self {
            input,
            out,
            session,
            output,
            settings,
        }
    }

    /// Runs until the user quits or input ends, then saves. The catalog is
    /// saved even when the loop stops on an I/O error.
    fn run(&mut self) -> Result<()> {
        let outcome = self.interact();
        let saved = self.quit();
        outcome.and(saved)
    }

    fn interact(&mut self) -> Result<()> {
        self.announce_load()?;

        loop {
            self.clear_screen()?;
            self.print_menu()?;

            let Some(line) = self.read_line()? else {
                writeln!(self.out)?;
                return Ok(());
            };

            let flow = match line.parse::<i64>() {
                Ok(0) => return Ok(()),
                Ok(choice) => self.dispatch(choice)?,
                Err(_) => {
                    writeln!(self.out, "Invalid input. Please enter a number.")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Exit || self.pause()? == Flow::Exit {
                return Ok(());
            }
        }
    }

    fn dispatch(&mut self, choice: i64) -> Result<Flow> {
        self.output
            .verbose_ctx("menu", &format!("Selected option {}", choice));

        match choice {
            1 => self.add_book(),
            2 => self.remove_book(),
            3 => self.search(false),
            4 => self.search(true),
            5 => self.list_books(false),
            6 => self.list_books(true),
            7 => self.add_user(),
            8 => self.list_users(),
            9 => self.check_out(),
            10 => self.return_book(),
            11 => self.show_stats(),
            12 => self.save(),
            13 => self.backup(),
            _ => {
                writeln!(self.out, "Invalid choice. Please try again.")?;
                Ok(Flow::Continue)
            }
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    fn add_book(&mut self) -> Result<Flow> {
        let Some(title) = self.prompt_text("Book title", "Title")? else {
            return Ok(Flow::Exit);
        };
        let Some(author) = self.prompt_text("Book author", "Author")? else {
            return Ok(Flow::Exit);
        };

        let isbn = loop {
            let Some(isbn) =
                self.prompt_with("Book ISBN (13 digits)", |s| validation::isbn(s).map(String::from))?
            else {
                return Ok(Flow::Exit);
            };

            if self.session.catalog().find_book(&isbn).is_some() {
                writeln!(self.out, "Error: A book with ISBN {} already exists.", isbn)?;
                continue;
            }
            break isbn;
        };

        if self.session.catalog().find_similar(&title, &author).is_some() {
            writeln!(
                self.out,
                "Warning: a book with the same title and author already exists."
            )?;
            return Ok(Flow::Continue);
        }

        self.session
            .catalog_mut()
            .add_book(Book::new(title, author, isbn))?;
        writeln!(self.out, "Book added successfully!")?;
        Ok(Flow::Continue)
    }

    fn remove_book(&mut self) -> Result<Flow> {
        let Some(isbn) = self.prompt_required("ISBN of the book to remove", "ISBN")? else {
            return Ok(Flow::Exit);
        };

        match self.session.catalog_mut().remove_book(&isbn) {
            Some(_) => writeln!(self.out, "Book removed successfully!")?,
            None => writeln!(self.out, "Book not found.")?,
        }
        Ok(Flow::Continue)
    }

    fn search(&mut self, by_author: bool) -> Result<Flow> {
        let (label, field) = if by_author {
            ("Author to search for", "Author")
        } else {
            ("Title to search for", "Title")
        };
        let Some(query) = self.prompt_required(label, field)? else {
            return Ok(Flow::Exit);
        };

        let catalog = self.session.catalog();
        let results = if by_author {
            catalog.search_books_by_author(&query)
        } else {
            catalog.search_books_by_title(&query)
        };

        if results.is_empty() {
            let message = if by_author {
                "No books found by this author."
            } else {
                "No books found with this title."
            };
            writeln!(self.out, "{}", message)?;
        } else {
            write_books(&mut self.out, "SEARCH RESULTS", "Result", &results)?;
        }
        Ok(Flow::Continue)
    }

    fn list_books(&mut self, available_only: bool) -> Result<Flow> {
        let catalog = self.session.catalog();

        if available_only {
            let books = catalog.available_books();
            if books.is_empty() {
                writeln!(self.out, "No books available for checkout.")?;
            } else {
                write_books(&mut self.out, "AVAILABLE BOOKS (BY TITLE/AUTHOR)", "Book", &books)?;
            }
        } else {
            let books = catalog.all_books();
            if books.is_empty() {
                writeln!(self.out, "No books in the library.")?;
            } else {
                write_books(&mut self.out, "ALL BOOKS (BY TITLE/AUTHOR)", "Book", &books)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn add_user(&mut self) -> Result<Flow> {
        let Some(name) = self.prompt_text("User name", "Name")? else {
            return Ok(Flow::Exit);
        };
        let Some(id) = self.prompt_with("User ID", |s| validation::user_id(s).map(String::from))?
        else {
            return Ok(Flow::Exit);
        };

        if self.session.catalog().find_user(&id).is_some() {
            writeln!(self.out, "Error: A user with ID {} already exists.", id)?;
            return Ok(Flow::Continue);
        }

        self.session.catalog_mut().add_user(User::new(name, id))?;
        writeln!(self.out, "User added successfully!")?;
        Ok(Flow::Continue)
    }

    fn list_users(&mut self) -> Result<Flow> {
        let users = self.session.catalog().all_users();

        if users.is_empty() {
            writeln!(self.out, "No registered users.")?;
            return Ok(Flow::Continue);
        }

        writeln!(self.out, "\n=== ALL USERS (BY NAME) ===")?;
        for (i, user) in users.iter().enumerate() {
            writeln!(self.out, "\nUser {}:", i + 1)?;
            writeln!(self.out, "{}", user)?;
            writeln!(self.out, "------------------------------")?;
        }
        Ok(Flow::Continue)
    }

    fn check_out(&mut self) -> Result<Flow> {
        let Some(isbn) = self.prompt_required("ISBN of the book to check out", "ISBN")? else {
            return Ok(Flow::Exit);
        };
        let Some(user_id) = self.prompt_required("User ID", "User ID")? else {
            return Ok(Flow::Exit);
        };

        match self.session.catalog_mut().check_out_book(&isbn, &user_id) {
            Ok(()) => writeln!(self.out, "Book checked out successfully!")?,
            Err(e) => writeln!(self.out, "Error: Unable to check out the book. {}.", e)?,
        }
        Ok(Flow::Continue)
    }

    fn return_book(&mut self) -> Result<Flow> {
        let Some(isbn) = self.prompt_required("ISBN of the book to return", "ISBN")? else {
            return Ok(Flow::Exit);
        };

        match self.session.catalog_mut().return_book(&isbn) {
            Ok(_) => writeln!(self.out, "Book returned successfully!")?,
            Err(e) => writeln!(self.out, "Error: Unable to return the book. {}.", e)?,
        }
        Ok(Flow::Continue)
    }

    fn show_stats(&mut self) -> Result<Flow> {
        let stats = self.session.catalog().stats();

        writeln!(self.out, "\n=== LIBRARY STATISTICS ===")?;
        writeln!(self.out, "Total books:     {}", stats.total_books)?;
        writeln!(self.out, "Available books: {}", stats.available_books)?;
        writeln!(self.out, "Checked out:     {}", stats.checked_out_books)?;
        writeln!(self.out, "Total users:     {}", stats.total_users)?;
        Ok(Flow::Continue)
    }

    fn save(&mut self) -> Result<Flow> {
        match self.session.save(self.output) {
            Ok(()) => writeln!(self.out, "Library data saved successfully!")?,
            Err(e) => writeln!(self.out, "Error while saving library data: {:#}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn backup(&mut self) -> Result<Flow> {
        let report = self.session.backup(self.output);

        if !report.is_success() {
            writeln!(
                self.out,
                "Backup incomplete: {} file(s) could not be copied.",
                report.failed.len()
            )?;
        } else if report.copied.is_empty() {
            writeln!(self.out, "No data files to back up yet.")?;
        } else {
            writeln!(self.out, "Backup files created.")?;
        }
        Ok(Flow::Continue)
    }

    fn quit(&mut self) -> Result<()> {
        // Save before touching the terminal so a broken stdout cannot lose data
        let saved = self.session.save(self.output);

        writeln!(self.out, "Saving data before exit...")?;
        if let Err(e) = saved {
            writeln!(self.out, "Error while saving library data: {:#}", e)?;
        }
        writeln!(
            self.out,
            "Thank you for using the Personal Library Management System!"
        )?;
        self.out.flush()?;
        Ok(())
    }

    // =========================================================================
    // Terminal helpers
    // =========================================================================

    fn announce_load(&mut self) -> Result<()> {
        let status = self.session.load_status();
        let catalog = self.session.catalog();

        writeln!(self.out, "Loading library data...")?;
        if status.books_found {
            writeln!(self.out, "Loaded {} book(s) from file.", catalog.total_books())?;
        } else {
            writeln!(
                self.out,
                "No existing book file found. Starting with an empty library."
            )?;
        }
        if status.users_found {
            writeln!(self.out, "Loaded {} user(s) from file.", catalog.total_users())?;
        } else {
            writeln!(
                self.out,
                "No existing user file found. Starting without registered users."
            )?;
        }
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<()> {
        if self.settings.clear_screen {
            execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.out, "\n=== PERSONAL LIBRARY MANAGEMENT SYSTEM ===")?;
        for entry in MENU_ENTRIES {
            writeln!(self.out, "{}", entry)?;
        }
        writeln!(self.out, "==========================================")?;
        write!(self.out, "Enter your choice: ")?;
        Ok(())
    }

    fn pause(&mut self) -> Result<Flow> {
        if !self.settings.pause {
            return Ok(Flow::Continue);
        }

        write!(self.out, "\nPress Enter to continue...")?;
        match self.read_line()? {
            Some(_) => Ok(Flow::Continue),
            None => Ok(Flow::Exit),
        }
    }

    /// Reads one trimmed line, or `None` at end of input. Bytes that are not
    /// valid UTF-8 are replaced with U+FFFD.
    fn read_line(&mut self) -> Result<Option<String>> {
        self.out.flush()?;

        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).trim().to_string()))
    }

    /// Prompts until `validate` accepts the input
    fn prompt_with<T>(
        &mut self,
        label: &str,
        validate: impl Fn(&str) -> Result<T, ValidationError>,
    ) -> Result<Option<T>> {
        loop {
            write!(self.out, "{}: ", label)?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };

            match validate(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => writeln!(self.out, "Error: {}. Please try again.", e)?,
            }
        }
    }

    /// Prompts for a free-text field that will be stored in a record
    fn prompt_text(&mut self, label: &str, field: &'static str) -> Result<Option<String>> {
        self.prompt_with(label, |s| validation::text(field, s).map(String::from))
    }

    /// Prompts for any non-empty value
    fn prompt_required(&mut self, label: &str, field: &'static str) -> Result<Option<String>> {
        self.prompt_with(label, |s| {
            if s.is_empty() {
                Err(ValidationError::Empty(field))
            } else {
                Ok(s.to_string())
            }
        })
    }
}

fn write_books<W: Write>(out: &mut W, heading: &str, item: &str, books: &[&Book]) -> io::Result<()> {
    writeln!(out, "\n=== {} ===", heading)?;
    for (i, book) in books.iter().enumerate() {
        writeln!(out, "\n{} {}:", item, i + 1)?;
        writeln!(out, "{}", book)?;
        writeln!(out, "-----------------------------")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::storage::{Config, DataPaths};
    use std::fs;
    use tempfile::TempDir;

    fn quiet() -> Output {
        Output::new(OutputFormat::Text, false)
    }

    fn settings() -> MenuConfig {
        MenuConfig {
            clear_screen: false,
            pause: false,
        }
    }

    fn open(dir: &TempDir) -> Session {
        Session::open(Config::default(), DataPaths::in_dir(dir.path()), &quiet()).unwrap()
    }

    /// Runs the menu over `input` and returns everything it printed
    fn drive(session: &mut Session, input: &str) -> String {
        let output = quiet();
        let mut printed = Vec::new();
        Menu::new(input.as_bytes(), &mut printed, session, &output, settings())
            .run()
            .unwrap();
        String::from_utf8(printed).unwrap()
    }

    #[test]
    fn quit_saves_catalog() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);

        let printed = drive(
            &mut session,
            "1\nDune\nFrank Herbert\n9780441013593\n7\nAlice\nU1\n0\n",
        );

        assert!(printed.contains("Book added successfully!"));
        assert!(printed.contains("User added successfully!"));
        assert!(printed.contains("Thank you for using"));

        let books = fs::read_to_string(dir.path().join("books.txt")).unwrap();
        assert_eq!(books, "Dune|Frank Herbert|9780441013593|1|\n");
        let users = fs::read_to_string(dir.path().join("users.txt")).unwrap();
        assert_eq!(users, "Alice|U1|\n");
    }

    #[test]
    fn end_of_input_saves_and_exits() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);

        let printed = drive(&mut session, "7\nAlice\nU1\n");

        assert!(printed.contains("Saving data before exit..."));
        assert!(dir.path().join("users.txt").exists());
    }

    #[test]
    fn end_of_input_mid_prompt_exits() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);

        let printed = drive(&mut session, "1\nDune\n");

        assert!(!printed.contains("Book added"));
        assert!(printed.contains("Thank you for using"));
        assert_eq!(session.catalog().total_books(), 0);
    }

    #[test]
    fn empty_fields_are_reprompted() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);

        let printed = drive(&mut session, "7\n   \nAlice\nU1\n0\n");

        assert!(printed.contains("Error: Name cannot be empty. Please try again."));
        assert_eq!(session.catalog().find_user("U1").unwrap().name(), "Alice");
    }

    #[test]
    fn invalid_isbns_are_reprompted() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);

        let printed = drive(
            &mut session,
            "1\nDune\nHerbert\n123\n12345678901AB\n1111111111111\n0\n",
        );

        assert!(printed.contains("exactly 13 digits"));
        assert!(printed.contains("only digits"));
        assert!(session.catalog().find_book("1111111111111").is_some());
    }

    #[test]
    fn duplicate_isbn_is_reprompted() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);
        session
            .catalog_mut()
            .add_book(Book::new("Dune", "Herbert", "1111111111111"))
            .unwrap();

        let printed = drive(
            &mut session,
            "1\nEmma\nAusten\n1111111111111\n2222222222222\n0\n",
        );

        assert!(printed.contains("A book with ISBN 1111111111111 already exists"));
        assert_eq!(
            session.catalog().find_book("2222222222222").unwrap().title(),
            "Emma"
        );
    }

    #[test]
    fn same_title_and_author_is_refused() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);
        session
            .catalog_mut()
            .add_book(Book::new("Dune", "Herbert", "1111111111111"))
            .unwrap();

        let printed = drive(&mut session, "1\ndune\nHERBERT\n2222222222222\n0\n");

        assert!(printed.contains("same title and author already exists"));
        assert_eq!(session.catalog().total_books(), 1);
    }

    #[test]
    fn duplicate_user_is_refused() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);
        session.catalog_mut().add_user(User::new("Alice", "U1")).unwrap();

        let printed = drive(&mut session, "7\nBob\nU1\n0\n");

        assert!(printed.contains("A user with ID U1 already exists"));
        assert_eq!(session.catalog().find_user("U1").unwrap().name(), "Alice");
    }

    #[test]
    fn checkout_and_return_flow() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);
        session
            .catalog_mut()
            .add_book(Book::new("Dune", "Herbert", "1111111111111"))
            .unwrap();
        session.catalog_mut().add_user(User::new("Alice", "U1")).unwrap();

        let printed = drive(
            &mut session,
            "9\n1111111111111\nU1\n9\n1111111111111\nU1\n10\n1111111111111\n10\n1111111111111\n0\n",
        );

        assert!(printed.contains("Book checked out successfully!"));
        assert!(printed.contains("Unable to check out the book. Book 1111111111111 is already checked out by Alice."));
        assert!(printed.contains("Book returned successfully!"));
        assert!(printed.contains("Unable to return the book. Book 1111111111111 is not checked out."));
        assert!(session.catalog().find_book("1111111111111").unwrap().is_available());
    }

    #[test]
    fn search_and_listing() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);
        session
            .catalog_mut()
            .add_book(Book::new("Dune", "Herbert", "1111111111111"))
            .unwrap();

        let printed = drive(&mut session, "3\ndun\n4\nnobody\n5\n6\n8\n0\n");

        assert!(printed.contains("=== SEARCH RESULTS ==="));
        assert!(printed.contains("Result 1:"));
        assert!(printed.contains("No books found by this author."));
        assert!(printed.contains("=== ALL BOOKS (BY TITLE/AUTHOR) ==="));
        assert!(printed.contains("=== AVAILABLE BOOKS (BY TITLE/AUTHOR) ==="));
        assert!(printed.contains("No registered users."));
    }

    #[test]
    fn invalid_utf8_input_keeps_session_running() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);
        let output = quiet();
        let mut printed = Vec::new();

        Menu::new(
            &b"7\nAlice\nU1\n3\nCaf\xE9\n0\n"[..],
            &mut printed,
            &mut session,
            &output,
            settings(),
        )
        .run()
        .unwrap();

        let printed = String::from_utf8(printed).unwrap();
        assert!(printed.contains("No books found with this title."));
        let users = fs::read_to_string(dir.path().join("users.txt")).unwrap();
        assert_eq!(users, "Alice|U1|\n");
    }

    #[test]
    fn read_error_still_saves() {
        struct FailingInput(&'static [u8]);

        impl std::io::Read for FailingInput {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                unreachable!("menu reads through BufRead")
            }
        }

        impl BufRead for FailingInput {
            fn fill_buf(&mut self) -> io::Result<&[u8]> {
                if self.0.is_empty() {
                    Err(io::Error::other("terminal went away"))
                } else {
                    Ok(self.0)
                }
            }

            fn consume(&mut self, amount: usize) {
                self.0 = &self.0[amount..];
            }
        }

        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);
        let output = quiet();
        let mut printed = Vec::new();

        let result = Menu::new(
            FailingInput(b"7\nAlice\nU1\n"),
            &mut printed,
            &mut session,
            &output,
            settings(),
        )
        .run();

        assert!(result.is_err());
        let users = fs::read_to_string(dir.path().join("users.txt")).unwrap();
        assert_eq!(users, "Alice|U1|\n");
    }

    #[test]
    fn large_numbers_are_invalid_choices() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);

        let printed = drive(&mut session, "256\n-1\n0\n");

        assert_eq!(printed.matches("Invalid choice. Please try again.").count(), 2);
        assert!(!printed.contains("Please enter a number"));
    }

    #[test]
    fn statistics_and_invalid_choices() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);
        session
            .catalog_mut()
            .add_book(Book::new("Dune", "Herbert", "1111111111111"))
            .unwrap();

        let printed = drive(&mut session, "abc\n42\n11\n0\n");

        assert!(printed.contains("Invalid input. Please enter a number."));
        assert!(printed.contains("Invalid choice. Please try again."));
        assert!(printed.contains("Total books:     1"));
        assert!(printed.contains("Available books: 1"));
    }

    #[test]
    fn remove_and_backup() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);
        session
            .catalog_mut()
            .add_book(Book::new("Dune", "Herbert", "1111111111111"))
            .unwrap();

        let printed = drive(&mut session, "13\n12\n13\n2\n1111111111111\n2\n1111111111111\n0\n");

        assert!(printed.contains("No data files to back up yet."));
        assert!(printed.contains("Library data saved successfully!"));
        assert!(printed.contains("Backup files created."));
        assert!(printed.contains("Book removed successfully!"));
        assert!(printed.contains("Book not found."));
        assert!(dir.path().join("books.txt.backup").exists());
    }

    #[test]
    fn pause_waits_for_enter() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir);
        let output = quiet();
        let mut printed = Vec::new();
        let settings = MenuConfig {
            clear_screen: false,
            pause: true,
        };

        Menu::new("11\n\n0\n".as_bytes(), &mut printed, &mut session, &output, settings)
            .run()
            .unwrap();

        let printed = String::from_utf8(printed).unwrap();
        assert!(printed.contains("Press Enter to continue..."));
        assert_eq!(printed.matches("=== PERSONAL LIBRARY MANAGEMENT SYSTEM ===").count(), 2);
    }
}
