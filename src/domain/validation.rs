//! Input validation for catalog entries
//!
//! The catalog itself accepts any strings. These checks run in the
//! collaborator layer before a book or user is created, so that every
//! value can survive the record format.

use thiserror::Error;

use super::record::FIELD_SEPARATOR;

/// Number of digits in an ISBN-13
pub const ISBN_LENGTH: usize = 13;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("ISBN must contain exactly 13 digits, got {0} characters")]
    IsbnLength(usize),

    #[error("ISBN must contain only digits: '{0}'")]
    IsbnNotNumeric(String),

    #[error("{field} cannot contain '{character}'")]
    ReservedCharacter {
        field: &'static str,
        character: char,
    },
}

/// Validates an ISBN-13, returning it trimmed
pub fn isbn(input: &str) -> Result<&str, ValidationError> {
    let isbn = input.trim();

    if isbn.is_empty() {
        return Err(ValidationError::Empty("ISBN"));
    }

    let length = isbn.chars().count();
    if length != ISBN_LENGTH {
        return Err(ValidationError::IsbnLength(length));
    }

    if !isbn.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::IsbnNotNumeric(isbn.to_string()));
    }

    Ok(isbn)
}

/// Validates a free-text field (title, author, user name), returning it trimmed
pub fn text<'a>(field: &'static str, input: &'a str) -> Result<&'a str, ValidationError> {
    let value = input.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field));
    }

    reject_character(field, value, FIELD_SEPARATOR)?;
    Ok(value)
}

/// Validates a user ID, returning it trimmed
pub fn user_id(input: &str) -> Result<&str, ValidationError> {
    text("User ID", input)
}

fn reject_character(
    field: &'static str,
    value: &str,
    character: char,
) -> Result<(), ValidationError> {
    if value.contains(character) {
        Err(ValidationError::ReservedCharacter { field, character })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_isbn_is_trimmed() {
        assert_eq!(isbn("  9780441013593 "), Ok("9780441013593"));
    }

    #[test]
    fn empty_isbn() {
        assert_eq!(isbn("   "), Err(ValidationError::Empty("ISBN")));
    }

    #[test]
    fn isbn_wrong_length() {
        assert_eq!(isbn("978044101359"), Err(ValidationError::IsbnLength(12)));
        assert_eq!(isbn("97804410135930"), Err(ValidationError::IsbnLength(14)));
    }

    #[test]
    fn isbn_with_letters() {
        assert_eq!(
            isbn("978044101359X"),
            Err(ValidationError::IsbnNotNumeric("978044101359X".to_string()))
        );
    }

    #[test]
    fn text_rejects_separator() {
        assert_eq!(
            text("Title", "Left|Right"),
            Err(ValidationError::ReservedCharacter {
                field: "Title",
                character: '|'
            })
        );
    }

    #[test]
    fn text_must_not_be_blank() {
        assert_eq!(text("Author", " \t"), Err(ValidationError::Empty("Author")));
        assert_eq!(text("Author", " Herbert "), Ok("Herbert"));
    }

    #[test]
    fn user_id_accepts_commas() {
        assert_eq!(user_id(" U1,U2 "), Ok("U1,U2"));
        assert_eq!(
            user_id("U|1"),
            Err(ValidationError::ReservedCharacter {
                field: "User ID",
                character: '|'
            })
        );
    }

    #[test]
    fn error_messages_are_readable() {
        assert_eq!(
            ValidationError::IsbnLength(5).to_string(),
            "ISBN must contain exactly 13 digits, got 5 characters"
        );
    }
}
