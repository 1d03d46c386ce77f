//! A loaded catalog together with the files it came from
//!
//! Every command opens a session, works on the in-memory catalog, and saves
//! it back when something changed.

use anyhow::Result;

use super::output::Output;
use crate::domain::Catalog;
use crate::storage::{BackupReport, CatalogStore, Config, DataPaths};

/// Which data files existed when the session was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStatus {
    pub books_found: bool,
    pub users_found: bool,
}

pub struct Session {
    config: Config,
    store: CatalogStore,
    catalog: Catalog,
    load_status: LoadStatus,
}

impl Session {
    /// Loads the catalog from the resolved data files
    pub fn open(config: Config, paths: DataPaths, output: &Output) -> Result<Self> {
        let store = paths.store();
        output.verbose_ctx(
            "load",
            &format!(
                "Reading {} and {}",
                store.books_path().display(),
                store.users_path().display()
            ),
        );

        let loaded = store.load()?;
        if !loaded.any_found() {
            output.verbose_ctx("load", "No data files found, starting with an empty catalog");
        }

        let load_status = LoadStatus {
            books_found: loaded.books_found,
            users_found: loaded.users_found,
        };

        let (catalog, report) = Catalog::from_records(loaded.books, loaded.users);
        for isbn in &report.skipped_isbns {
            output.warn(&format!("Skipped duplicate book record with ISBN {}", isbn));
        }
        for id in &report.skipped_user_ids {
            output.warn(&format!("Skipped duplicate user record with ID {}", id));
        }

        output.verbose_ctx(
            "load",
            &format!(
                "Loaded {} book(s) and {} user(s)",
                catalog.total_books(),
                catalog.total_users()
            ),
        );

        Ok(Self {
            config,
            store,
            catalog,
            load_status,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn load_status(&self) -> LoadStatus {
        self.load_status
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Writes the catalog back, backing up the previous files first when
    /// configured to
    pub fn save(&self, output: &Output) -> Result<()> {
        if self.config.backup.on_save {
            self.backup(output);
        }

        self.store.save(&self.catalog)?;
        output.verbose_ctx(
            "save",
            &format!(
                "Wrote {} book(s) and {} user(s)",
                self.catalog.total_books(),
                self.catalog.total_users()
            ),
        );
        Ok(())
    }

    /// Copies the data files to `.backup`. Failures are logged, not returned.
    pub fn backup(&self, output: &Output) -> BackupReport {
        let report = self.store.backup();

        for path in &report.copied {
            output.verbose_ctx("backup", &format!("Created {}", path.display()));
        }
        for path in &report.missing {
            output.verbose_ctx("backup", &format!("Nothing to back up at {}", path.display()));
        }
        for (path, error) in &report.failed {
            output.warn(&format!("Failed to back up {}: {}", path.display(), error));
        }

        report
    }
}
