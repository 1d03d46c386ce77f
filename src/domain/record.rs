//! Line-oriented record format
//!
//! Books and users are persisted one record per line with `|`-separated
//! positional fields:
//!
//! ```text
//! <title>|<author>|<isbn>|<0 or 1>|<borrower-or-empty>
//! <name>|<user-id>|<isbn1,isbn2,...-or-empty>
//! ```
//!
//! There is no escaping. A field that itself contains `|` (or `,` inside the
//! ISBN list) cannot be read back faithfully, which is why free-text input is
//! validated before it reaches the catalog.

/// Separates the positional fields of a record
pub const FIELD_SEPARATOR: char = '|';

/// Separates the entries of a list field
pub const LIST_SEPARATOR: char = ',';

/// A type that can be written to and read from a single record line
pub trait Record: Sized {
    /// Renders the record without a trailing newline
    fn to_record(&self) -> String;

    /// Parses a record line. Parsing is lenient: missing trailing fields
    /// read as empty strings and extra fields are ignored.
    fn from_record(line: &str) -> Self;
}

/// Splits a line into exactly `N` positional fields, padding with empty strings
pub(crate) fn split_fields<const N: usize>(line: &str) -> [&str; N] {
    let mut fields = [""; N];
    for (slot, value) in fields.iter_mut().zip(line.split(FIELD_SEPARATOR)) {
        *slot = value;
    }
    fields
}
