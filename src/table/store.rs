//! File-backed table store
//!
//! Owns the parsed [`Table`] together with its source descriptor (path,
//! encoding, delimiter) and applies the active save policy after every
//! successful mutation. Saves are atomic: content goes to a temp file in
//! the target directory and is renamed over the original, so a failed
//! write never leaves a truncated file behind.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::model::{RowId, Table, TableError};
use crate::sniff::{detect_delimiter, Delimiter, DelimiterDetectionError, Encoding};

/// Maximum file size accepted for loading (50 MB)
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// When mutations reach the disk
///
/// Chosen once at open time and applied uniformly; there is no way to mix
/// persisted and unpersisted mutations within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePolicy {
    /// Persist after every successful insert/update/delete
    #[default]
    OnEdit,
    /// Persist only on an explicit `save()`
    OnDemand,
}

/// Where the table came from and how to write it back
///
/// Established on load, reused verbatim for save, replaced only by a new
/// load.
#[derive(Debug, Clone)]
pub struct Source {
    pub path: PathBuf,
    pub encoding: Encoding,
    pub delimiter: Delimiter,
}

/// Errors loading a table from disk
#[derive(Debug)]
pub enum LoadError {
    /// File does not exist
    NotFound,
    /// Permission denied to read the file
    PermissionDenied,
    /// Path is a directory, not a file
    IsDirectory,
    /// File exceeds the size limit
    TooLarge { size_mb: f64 },
    /// Content is not valid under the detected encoding
    Decode { encoding: Encoding },
    /// No field delimiter could be determined
    Delimiter(DelimiterDetectionError),
    /// A record could not be parsed (ragged row, stray quote)
    Malformed { record: usize, message: String },
    /// Other I/O error
    Io(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "file not found"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::IsDirectory => write!(f, "is a directory"),
            Self::TooLarge { size_mb } => {
                write!(
                    f,
                    "file too large ({:.1} MB, max {} MB)",
                    size_mb,
                    MAX_FILE_SIZE / (1024 * 1024)
                )
            }
            Self::Decode { encoding } => {
                write!(f, "content is not valid {}", encoding)
            }
            Self::Delimiter(err) => write!(f, "{}", err),
            Self::Malformed { record, message } => {
                write!(f, "record {}: {}", record, message)
            }
            Self::Io(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<DelimiterDetectionError> for LoadError {
    fn from(err: DelimiterDetectionError) -> Self {
        Self::Delimiter(err)
    }
}

/// Errors writing the table back to its source file
#[derive(Debug)]
pub struct PersistError {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to persist {}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for PersistError {}

/// A mutation can fail in the table or, under [`SavePolicy::OnEdit`],
/// while persisting the result
#[derive(Debug)]
pub enum StoreError {
    Table(TableError),
    Persist(PersistError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(err) => write!(f, "{}", err),
            Self::Persist(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<TableError> for StoreError {
    fn from(err: TableError) -> Self {
        Self::Table(err)
    }
}

impl From<PersistError> for StoreError {
    fn from(err: PersistError) -> Self {
        Self::Persist(err)
    }
}

/// The table plus the file it came from
#[derive(Debug)]
pub struct TableStore {
    table: Table,
    source: Source,
    policy: SavePolicy,
}

impl TableStore {
    /// Load a delimited text file into a fresh store
    ///
    /// Resolves encoding and delimiter via the sniffer, parses the full
    /// content (first record is the header row) and assigns a fresh
    /// identity to every row. Empty content yields an empty table — no
    /// headers, no rows — not an error.
    pub fn open(path: &Path, policy: SavePolicy) -> Result<Self, LoadError> {
        validate_for_open(path)?;

        let bytes = fs::read(path).map_err(|e| LoadError::Io(e.to_string()))?;
        let encoding = Encoding::detect(&bytes);
        let text = encoding
            .decode(&bytes)
            .map_err(|e| LoadError::Decode { encoding: e.encoding })?;

        let (table, delimiter) = if text.trim().is_empty() {
            (Table::new(), Delimiter::default())
        } else {
            let delimiter = detect_delimiter(&text)?;
            (parse_table(&text, delimiter)?, delimiter)
        };

        tracing::info!(
            "loaded {} ({} columns, {} rows, {}, {} delimiter)",
            path.display(),
            table.column_count(),
            table.len(),
            encoding,
            delimiter
        );

        Ok(Self {
            table,
            source: Source {
                path: path.to_path_buf(),
                encoding,
                delimiter,
            },
            policy,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn policy(&self) -> SavePolicy {
        self.policy
    }

    /// Serialize headers then rows back to the source path
    ///
    /// Uses the source encoding and delimiter with minimal quoting. The
    /// write is atomic from the caller's perspective: on any failure the
    /// prior file content is untouched.
    pub fn save(&self) -> Result<(), PersistError> {
        let text = serialize_table(&self.table, self.source.delimiter)
            .map_err(|message| self.persist_error(message))?;
        let bytes = self.source.encoding.encode(&text);

        let dir = self.source.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| self.persist_error(e.to_string()))?;
        temp.write_all(&bytes)
            .and_then(|_| temp.flush())
            .map_err(|e| self.persist_error(e.to_string()))?;
        temp.persist(&self.source.path)
            .map_err(|e| self.persist_error(e.to_string()))?;

        tracing::debug!(
            "saved {} rows to {}",
            self.table.len(),
            self.source.path.display()
        );
        Ok(())
    }

    /// Append a row, returning its identity so the caller can immediately
    /// target it for edit
    pub fn insert(&mut self, values: Vec<String>) -> Result<RowId, StoreError> {
        let id = self.table.insert(values)?;
        self.autosave()?;
        Ok(id)
    }

    /// Append a blank row (empty string per column)
    pub fn insert_blank(&mut self) -> Result<RowId, StoreError> {
        let id = self.table.insert_blank();
        self.autosave()?;
        Ok(id)
    }

    /// Replace a row's values wholesale
    pub fn update(&mut self, id: RowId, values: Vec<String>) -> Result<(), StoreError> {
        self.table.update(id, values)?;
        self.autosave()?;
        Ok(())
    }

    /// Remove a row
    pub fn delete(&mut self, id: RowId) -> Result<(), StoreError> {
        self.table.delete(id)?;
        self.autosave()?;
        Ok(())
    }

    fn autosave(&self) -> Result<(), PersistError> {
        match self.policy {
            SavePolicy::OnEdit => self.save(),
            SavePolicy::OnDemand => Ok(()),
        }
    }

    fn persist_error(&self, message: String) -> PersistError {
        PersistError {
            path: self.source.path.clone(),
            message,
        }
    }
}

fn validate_for_open(path: &Path) -> Result<(), LoadError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound,
        std::io::ErrorKind::PermissionDenied => LoadError::PermissionDenied,
        _ => LoadError::Io(e.to_string()),
    })?;

    if metadata.is_dir() {
        return Err(LoadError::IsDirectory);
    }

    if metadata.len() > MAX_FILE_SIZE {
        return Err(LoadError::TooLarge {
            size_mb: metadata.len() as f64 / (1024.0 * 1024.0),
        });
    }

    Ok(())
}

/// Parse decoded content into a table: first record is the header row,
/// every following record must match its arity exactly
fn parse_table(text: &str, delimiter: Delimiter) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .has_headers(false)
        .from_reader(text.as_bytes());

    let mut table = Table::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Malformed {
            record: index + 1,
            message: e.to_string(),
        })?;
        let values: Vec<String> = record.iter().map(str::to_string).collect();

        if index == 0 {
            table = Table::with_headers(values);
        } else {
            table.insert(values).map_err(|e| LoadError::Malformed {
                record: index + 1,
                message: e.to_string(),
            })?;
        }
    }

    Ok(table)
}

/// Serialize headers then rows with minimal quoting and a trailing newline
fn serialize_table(table: &Table, delimiter: Delimiter) -> Result<String, String> {
    // No headers means nothing was ever loaded; an empty file round-trips
    // to an empty file rather than a stray blank record
    if table.headers().is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter.byte())
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer
        .write_record(table.headers())
        .map_err(|e| e.to_string())?;
    for (_, row) in table.rows() {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }

    let buffer = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(buffer).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_open_parses_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "people.csv", b"name,age\nAlice,30\nBob,25\n");

        let store = TableStore::open(&path, SavePolicy::OnDemand).unwrap();
        assert_eq!(store.table().headers(), ["name", "age"]);
        assert_eq!(store.table().len(), 2);
        assert_eq!(store.source().delimiter, Delimiter::Comma);
        assert_eq!(store.source().encoding, Encoding::Utf8);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TableStore::open(&dir.path().join("gone.csv"), SavePolicy::OnDemand);
        assert!(matches!(result, Err(LoadError::NotFound)));
    }

    #[test]
    fn test_open_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = TableStore::open(dir.path(), SavePolicy::OnDemand);
        assert!(matches!(result, Err(LoadError::IsDirectory)));
    }

    #[test]
    fn test_open_empty_file_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "empty.csv", b"");

        let store = TableStore::open(&path, SavePolicy::OnDemand).unwrap();
        assert!(store.table().is_empty());
        assert!(store.table().headers().is_empty());
    }

    #[test]
    fn test_open_ragged_head_fails_delimiter_detection() {
        // Inconsistent field counts near the top read as "no consistent
        // delimiter" and are surfaced, never guessed around
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ragged.csv", b"a,b,c\n1,2\n");

        let result = TableStore::open(&path, SavePolicy::OnDemand);
        assert!(matches!(result, Err(LoadError::Delimiter(_))));
    }

    #[test]
    fn test_open_ragged_row_past_sample_is_malformed() {
        // A consistent head satisfies the sniffer; the short record beyond
        // the sample window still fails the parse
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::from("a,b,c\n");
        for i in 0..400 {
            content.push_str(&format!("{i},{i},{i}\n"));
        }
        content.push_str("1,2\n");
        let path = write_file(&dir, "ragged.csv", content.as_bytes());

        let result = TableStore::open(&path, SavePolicy::OnDemand);
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn test_open_undetectable_delimiter_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "plain.txt", b"one\ntwo\nthree\n");

        let result = TableStore::open(&path, SavePolicy::OnDemand);
        assert!(matches!(result, Err(LoadError::Delimiter(_))));
    }

    #[test]
    fn test_open_undecodable_content_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        // UTF-16LE BOM followed by an odd number of body bytes
        let path = write_file(&dir, "bad.csv", b"\xFF\xFEa\x00b");

        let result = TableStore::open(&path, SavePolicy::OnDemand);
        assert!(matches!(
            result,
            Err(LoadError::Decode { encoding: Encoding::Utf16Le })
        ));
    }

    #[test]
    fn test_save_preserves_delimiter_and_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let content = Encoding::Utf8Bom.encode("name;city\nAlice;Oslo\n");
        let path = write_file(&dir, "bom.csv", &content);

        let store = TableStore::open(&path, SavePolicy::OnDemand).unwrap();
        store.save().unwrap();

        let written = fs::read(&path).unwrap();
        assert_eq!(written, content);
    }

    #[test]
    fn test_on_edit_policy_persists_each_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.csv", b"name,age\nAlice,30\n");

        let mut store = TableStore::open(&path, SavePolicy::OnEdit).unwrap();
        store
            .insert(vec!["Bob".to_string(), "25".to_string()])
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "name,age\nAlice,30\nBob,25\n");
    }

    #[test]
    fn test_on_demand_policy_defers_until_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.csv", b"name,age\nAlice,30\n");

        let mut store = TableStore::open(&path, SavePolicy::OnDemand).unwrap();
        store
            .insert(vec!["Bob".to_string(), "25".to_string()])
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nAlice,30\n");

        store.save().unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name,age\nAlice,30\nBob,25\n"
        );
    }

    #[test]
    fn test_save_quotes_only_fields_that_need_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.csv", b"name,note\n");

        let mut store = TableStore::open(&path, SavePolicy::OnDemand).unwrap();
        store
            .insert(vec!["Ada".to_string(), "likes, commas".to_string()])
            .unwrap();
        store.save().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name,note\nAda,\"likes, commas\"\n"
        );
    }

    #[test]
    fn test_delete_persists_and_double_delete_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.csv", b"name\nAlice\nBob\n");

        let mut store = TableStore::open(&path, SavePolicy::OnEdit).unwrap();
        let id = store.table().rows().next().unwrap().0;

        store.delete(id).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "name\nBob\n");
        assert!(matches!(
            store.delete(id),
            Err(StoreError::Table(TableError::NotFound(_)))
        ));
    }
}
