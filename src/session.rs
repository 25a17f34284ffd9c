//! Persistent last-opened-file record
//!
//! A single path stored as plain text in the app config directory, read on
//! startup to reopen the last file and overwritten on every successful
//! manual open. A missing or stale record is silently skipped — failing to
//! restore a session is never an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Load the last opened path, if the record and the file both still exist
pub fn last_file() -> Option<PathBuf> {
    let record = crate::config_paths::session_file()?;
    read_record(&record)
}

/// Record `path` as the last opened file
///
/// Write failures are logged, not surfaced: losing the session record
/// must not break the open that just succeeded.
pub fn remember(path: &Path) {
    let Some(record) = crate::config_paths::session_file() else {
        return;
    };
    if let Err(e) = crate::config_paths::ensure_config_dir() {
        tracing::warn!("cannot record last file: {}", e);
        return;
    }
    if let Err(e) = write_record(&record, path) {
        tracing::warn!("failed to write last-file record: {}", e);
    }
}

fn read_record(record: &Path) -> Option<PathBuf> {
    let contents = fs::read_to_string(record).ok()?;
    let path = PathBuf::from(contents.trim());
    if path.as_os_str().is_empty() {
        return None;
    }
    if !path.exists() {
        tracing::debug!("last file {} no longer exists, skipping", path.display());
        return None;
    }
    Some(path)
}

fn write_record(record: &Path, path: &Path) -> io::Result<()> {
    // Canonicalize so the restored path survives cwd changes
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    fs::write(record, format!("{}\n", canonical.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("last_file.txt");
        let data = dir.path().join("data.csv");
        fs::write(&data, "a,b\n").unwrap();

        write_record(&record, &data).unwrap();
        let restored = read_record(&record).unwrap();
        assert_eq!(restored, data.canonicalize().unwrap());
    }

    #[test]
    fn test_missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_record(&dir.path().join("absent.txt")), None);
    }

    #[test]
    fn test_stale_record_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("last_file.txt");
        fs::write(&record, "/no/such/file.csv\n").unwrap();

        assert_eq!(read_record(&record), None);
    }

    #[test]
    fn test_blank_record_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("last_file.txt");
        fs::write(&record, "\n").unwrap();

        assert_eq!(read_record(&record), None);
    }

    #[test]
    fn test_rewrite_overwrites_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("last_file.txt");
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        fs::write(&first, "a\n").unwrap();
        fs::write(&second, "b\n").unwrap();

        write_record(&record, &first).unwrap();
        write_record(&record, &second).unwrap();

        assert_eq!(read_record(&record).unwrap(), second.canonicalize().unwrap());
    }
}
