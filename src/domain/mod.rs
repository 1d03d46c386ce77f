//! Domain models for the library catalog
//!
//! Contains the core business logic without any I/O concerns.

mod book;
mod catalog;
pub mod record;
mod user;
pub mod validation;

pub use book::{Availability, Book};
pub use catalog::{Catalog, CatalogError, CatalogStats, ImportReport};
pub use record::Record;
pub use user::User;
pub use validation::ValidationError;
