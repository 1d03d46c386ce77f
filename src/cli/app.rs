//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::session::Session;
use super::{book, loan, menu, user};
use crate::storage::{Config, DataPaths};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(author, version, about = "Personal library catalog with checkout tracking")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Book records file
    #[arg(long, global = true, env = "SHELF_BOOKS_FILE")]
    pub books: Option<PathBuf>,

    /// User records file
    #[arg(long, global = true, env = "SHELF_USERS_FILE")]
    pub users: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true, env = "SHELF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run; starts the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage books
    #[command(subcommand)]
    Book(book::BookCommands),

    /// Manage users
    #[command(subcommand)]
    User(user::UserCommands),

    /// Check a book out to a user
    Checkout {
        /// ISBN of the book
        isbn: String,

        /// ID of the borrowing user
        user_id: String,
    },

    /// Return a checked-out book
    Return {
        /// ISBN of the book
        isbn: String,
    },

    /// Show catalog statistics
    Stats,

    /// Copy the data files to `.backup` files
    Backup,

    /// Start the interactive menu
    Menu,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let format = cli
        .format
        .unwrap_or_else(|| OutputFormat::from(config.default_format));
    let output = Output::new(format, cli.verbose);

    output.verbose("shelf starting");

    let base = std::env::current_dir().context("Failed to read the working directory")?;
    let paths = DataPaths::resolve(cli.books, cli.users, &config.data, &base);
    output.verbose_ctx(
        "paths",
        &format!(
            "books={}, users={}",
            paths.books.display(),
            paths.users.display()
        ),
    );

    let mut session = Session::open(config, paths, &output)?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Book(cmd) => book::run(cmd, &mut session, &output)?,
        Commands::User(cmd) => user::run(cmd, &mut session, &output)?,
        Commands::Checkout { isbn, user_id } => {
            loan::check_out(&mut session, &output, &isbn, &user_id)?
        }
        Commands::Return { isbn } => loan::return_book(&mut session, &output, &isbn)?,
        Commands::Stats => stats(&session, &output),
        Commands::Backup => backup(&session, &output)?,
        Commands::Menu => menu::run(&mut session, &output)?,
    }

    Ok(())
}

fn stats(session: &Session, output: &Output) {
    let stats = session.catalog().stats();

    if output.is_json() {
        output.data(&stats);
    } else {
        println!("Total books:     {}", stats.total_books);
        println!("Available books: {}", stats.available_books);
        println!("Checked out:     {}", stats.checked_out_books);
        println!("Total users:     {}", stats.total_users);
    }
}

fn backup(session: &Session, output: &Output) -> Result<()> {
    let report = session.backup(output);

    if output.is_json() {
        let failed: Vec<_> = report
            .failed
            .iter()
            .map(|(path, error)| {
                serde_json::json!({
                    "path": path,
                    "error": error,
                })
            })
            .collect();
        output.data(&serde_json::json!({
            "copied": report.copied,
            "missing": report.missing,
            "failed": failed,
        }));
    } else if report.copied.is_empty() && report.is_success() {
        let store = session.store();
        println!(
            "No data files to back up ({} and {} do not exist yet)",
            store.books_path().display(),
            store.users_path().display()
        );
    } else {
        for path in &report.copied {
            println!("Backed up to {}", path.display());
        }
    }

    if !report.is_success() {
        anyhow::bail!("Backup failed for {} file(s)", report.failed.len());
    }

    Ok(())
}
