//! Checkout and return commands

use anyhow::Result;

use super::output::Output;
use super::session::Session;

/// Checks a book out to a registered user
pub fn check_out(session: &mut Session, output: &Output, isbn: &str, user_id: &str) -> Result<()> {
    let (isbn, user_id) = (isbn.trim(), user_id.trim());
    output.verbose_ctx("checkout", &format!("Checking out {} to {}", isbn, user_id));

    session.catalog_mut().check_out_book(isbn, user_id)?;
    session.save(output)?;

    let borrower = session
        .catalog()
        .find_book(isbn)
        .map(|book| book.borrower_name().to_string())
        .unwrap_or_default();

    if output.is_json() {
        output.data(&serde_json::json!({
            "isbn": isbn,
            "user_id": user_id,
            "borrower": borrower,
        }));
    } else {
        output.success(&format!("Checked out {} to {}", isbn, borrower));
    }

    Ok(())
}

/// Returns a checked-out book
pub fn return_book(session: &mut Session, output: &Output, isbn: &str) -> Result<()> {
    let isbn = isbn.trim();

    let borrower = session.catalog_mut().return_book(isbn)?;
    session.save(output)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "isbn": isbn,
            "returned_by": borrower,
        }));
    } else {
        output.success(&format!("Returned {} (was checked out by {})", isbn, borrower));
    }

    Ok(())
}
