//! # Command-Line Interface
//!
//! User-facing CLI commands, output formatting and the interactive menu.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Book | Catalog management | `book add`, `book list`, `book search` |
//! | User | Borrower registry | `user add`, `user list`, `user show` |
//! | Loans | Checkout state | `checkout`, `return` |
//! | Maintenance | Reporting and safety copies | `stats`, `backup` |
//! | Menu | Interactive session | `menu`, or no command at all |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default can be changed with `default_format` in the config file.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! shelf --verbose book list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod book;
mod loan;
mod menu;
mod output;
mod session;
mod user;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
