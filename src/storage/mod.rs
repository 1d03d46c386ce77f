//! # Storage Layer
//!
//! Persistence layer for shelf with plain-text record files.
//!
//! ## Storage Formats
//!
//! | Data | Format | Default location |
//! |------|--------|------------------|
//! | Books | Pipe-delimited lines, 5 fields | `books.txt` |
//! | Users | Pipe-delimited lines, 3 fields | `users.txt` |
//! | Backups | byte copies | `books.txt.backup`, `users.txt.backup` |
//! | Config | TOML | `~/.config/shelf/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`CatalogStore`] uses file locking (`fs2`) while reading and writing
//! - All writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`DataPaths`] - Resolves which files back the catalog
//! - [`CatalogStore`] - Loads and saves the record files, creates backups
//! - [`Config`] - User configuration

mod config;
mod flatfile;
mod paths;

pub use config::{BackupConfig, Config, ConfigError, DataConfig, FormatPreference, MenuConfig};
pub use flatfile::{backup_path, BackupReport, CatalogStore, LoadedRecords};
pub use paths::{DataPaths, BOOKS_FILE_NAME, USERS_FILE_NAME};
