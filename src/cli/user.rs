//! User CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::book::{book_json, print_book_table};
use super::output::Output;
use super::session::Session;
use crate::domain::{validation, CatalogError, User};

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user
    ///
    /// Example:
    ///   shelf user add "Alice Martin" U1
    Add {
        /// Display name
        name: String,

        /// Unique user ID
        id: String,
    },

    /// List users sorted by name
    List,

    /// Show a user and the books they hold
    Show {
        /// User ID
        id: String,
    },
}

pub fn run(cmd: UserCommands, session: &mut Session, output: &Output) -> Result<()> {
    match cmd {
        UserCommands::Add { name, id } => add_user(session, output, &name, &id),
        UserCommands::List => list_users(session, output),
        UserCommands::Show { id } => show_user(session, output, &id),
    }
}

pub(super) fn user_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.user_id(),
        "name": user.name(),
        "borrowed": user.borrowed_isbns().collect::<Vec<_>>(),
    })
}

fn add_user(session: &mut Session, output: &Output, name: &str, id: &str) -> Result<()> {
    let name = validation::text("Name", name)?;
    let id = validation::user_id(id)?;

    session.catalog_mut().add_user(User::new(name, id))?;
    session.save(output)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "name": name,
        }));
    } else {
        output.success(&format!("Registered user: {} ({})", name, id));
    }

    Ok(())
}

fn list_users(session: &Session, output: &Output) -> Result<()> {
    let users = session.catalog().all_users();

    if output.is_json() {
        let items: Vec<_> = users.iter().map(|u| user_json(u)).collect();
        output.data(&items);
    } else if users.is_empty() {
        println!("No registered users.");
    } else {
        println!("{:<12} {:<30} BORROWED", "ID", "NAME");
        println!("{}", "-".repeat(60));
        for user in users {
            println!(
                "{:<12} {:<30} {}",
                user.user_id(),
                user.name(),
                user.borrowed_count()
            );
        }
    }

    Ok(())
}

fn show_user(session: &Session, output: &Output, id: &str) -> Result<()> {
    let id = id.trim();
    let catalog = session.catalog();
    let user = catalog
        .find_user(id)
        .ok_or_else(|| CatalogError::UserNotFound(id.to_string()))?;

    let books: Vec<_> = user
        .borrowed_isbns()
        .filter_map(|isbn| catalog.find_book(isbn))
        .collect();

    if output.is_json() {
        let mut value = user_json(user);
        value["books"] = books.iter().map(|b| book_json(b)).collect();
        output.data(&value);
    } else {
        println!("{}", user);
        if !books.is_empty() {
            println!();
            print_book_table(&books);
        }
    }

    Ok(())
}
