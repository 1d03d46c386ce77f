//! Shelf - A personal library catalog
//!
//! Shelf keeps a catalog of books and registered users in two plain-text
//! record files and tracks which user holds which book. It can be driven
//! through subcommands or an interactive numbered menu.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Availability, Book, Catalog, CatalogError, User};
