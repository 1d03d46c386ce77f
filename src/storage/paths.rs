//! Data file resolution
//!
//! Decides which two files hold the catalog. Explicit paths win over the
//! configuration, which wins over probing the working directory.

use std::path::{Path, PathBuf};

use super::config::DataConfig;
use super::CatalogStore;

pub const BOOKS_FILE_NAME: &str = "books.txt";
pub const USERS_FILE_NAME: &str = "users.txt";

/// Data directories probed, in order, relative to the working directory
const CANDIDATE_DIRS: &[&str] = &["../data", "data"];

/// The pair of files backing a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub books: PathBuf,
    pub users: PathBuf,
}

impl DataPaths {
    pub fn new(books: impl Into<PathBuf>, users: impl Into<PathBuf>) -> Self {
        Self {
            books: books.into(),
            users: users.into(),
        }
    }

    /// Default file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(BOOKS_FILE_NAME), dir.join(USERS_FILE_NAME))
    }

    /// Looks for an existing `books.txt` under the candidate data directories
    /// of `base`, falling back to `base` itself
    pub fn probe(base: &Path) -> Self {
        CANDIDATE_DIRS
            .iter()
            .map(|dir| base.join(dir))
            .find(|dir| dir.join(BOOKS_FILE_NAME).is_file())
            .map(|dir| Self::in_dir(&dir))
            .unwrap_or_else(|| Self::in_dir(base))
    }

    /// Resolves each file independently: override, then config, then probe
    pub fn resolve(
        books_override: Option<PathBuf>,
        users_override: Option<PathBuf>,
        config: &DataConfig,
        base: &Path,
    ) -> Self {
        let probed = Self::probe(base);

        Self {
            books: books_override
                .or_else(|| config.books_file.clone())
                .unwrap_or(probed.books),
            users: users_override
                .or_else(|| config.users_file.clone())
                .unwrap_or(probed.users),
        }
    }

    /// Returns the store for these files
    pub fn store(&self) -> CatalogStore {
        CatalogStore::for_paths(self)
    }
}
