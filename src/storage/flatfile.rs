//! Flat-file storage for the catalog
//!
//! Books and users live in two line-oriented text files, one record per line
//! (see [`crate::domain::record`]). Uses file locking for concurrent access
//! safety and writes through a temp file so an interrupted save keeps the
//! previous contents.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::DataPaths;
use crate::domain::{Book, Catalog, Record, User};

/// Records read from disk, before they are imported into a catalog
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub books: Vec<Book>,
    pub users: Vec<User>,
    pub books_found: bool,
    pub users_found: bool,
}

impl LoadedRecords {
    /// True when at least one of the two files existed
    pub fn any_found(&self) -> bool {
        self.books_found || self.users_found
    }
}

/// Outcome of a backup run. Failures are collected, never raised.
#[derive(Debug, Default)]
pub struct BackupReport {
    pub copied: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BackupReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Store for catalog data in the pipe-delimited record format
#[derive(Debug, Clone)]
pub struct CatalogStore {
    books_path: PathBuf,
    users_path: PathBuf,
}

impl CatalogStore {
    /// Creates a store over the given book and user files
    pub fn new(books_path: impl Into<PathBuf>, users_path: impl Into<PathBuf>) -> Self {
        Self {
            books_path: books_path.into(),
            users_path: users_path.into(),
        }
    }

    /// Creates the store for resolved data paths
    pub fn for_paths(paths: &DataPaths) -> Self {
        Self::new(&paths.books, &paths.users)
    }

    pub fn books_path(&self) -> &Path {
        &self.books_path
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    /// Reads both files. A missing file yields no records, not an error.
    pub fn load(&self) -> Result<LoadedRecords> {
        let books = read_records::<Book>(&self.books_path)?;
        let users = read_records::<User>(&self.users_path)?;

        Ok(LoadedRecords {
            books_found: books.is_some(),
            users_found: users.is_some(),
            books: books.unwrap_or_default(),
            users: users.unwrap_or_default(),
        })
    }

    /// Writes the whole catalog, replacing both files.
    ///
    /// Books are written sorted by title and author, users by name.
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        write_records(&self.books_path, catalog.all_books())?;
        write_records(&self.users_path, catalog.all_users())?;
        Ok(())
    }

    /// Copies each existing data file to `<file>.backup`, overwriting older
    /// backups
    pub fn backup(&self) -> BackupReport {
        let mut report = BackupReport::default();

        for path in [&self.books_path, &self.users_path] {
            if !path.exists() {
                report.missing.push(path.clone());
                continue;
            }

            let target = backup_path(path);
            match fs::copy(path, &target) {
                Ok(_) => report.copied.push(target),
                Err(e) => report.failed.push((path.clone(), e.to_string())),
            }
        }

        report
    }
}

/// Returns the backup location for a data file
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, ".backup")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Reads every non-blank line of `path` as a record, or `None` if the file
/// does not exist.
///
/// Bytes that are not valid UTF-8 (files written in a legacy encoding) are
/// replaced with U+FFFD rather than failing the whole load.
fn read_records<T: Record>(path: &Path) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open data file: {}", path.display()))?;

    // Acquire shared lock for reading
    file.lock_shared()
        .with_context(|| format!("Failed to acquire read lock on {}", path.display()))?;

    let mut reader = BufReader::new(&file);
    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut line_num = 0;

    loop {
        buf.clear();
        line_num += 1;
        let read = reader.read_until(b'\n', &mut buf).with_context(|| {
            format!("Failed to read line {} of {}", line_num, path.display())
        })?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        if line.is_empty() {
            continue;
        }

        records.push(T::from_record(line));
    }

    // Lock is released when file is dropped
    Ok(Some(records))
}

/// Replaces `path` with one line per record (full rewrite)
fn write_records<'a, T, I>(path: &Path, records: I) -> Result<()>
where
    T: Record + 'a,
    I: IntoIterator<Item = &'a T>,
{
    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Write to temp file first
    let temp_path = with_suffix(path, ".tmp");

    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        // Acquire exclusive lock
        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on {}", path.display()))?;

        let mut writer = BufWriter::new(&file);
        for record in records {
            writeln!(writer, "{}", record.to_record())
                .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        }

        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", temp_path.display()))?;
    }

    // Atomic rename
    fs::rename(&temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
