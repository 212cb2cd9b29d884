//! Timestamped backup history for the managed artifact.
//!
//! Entries are append-only copies of the agent jar named
//! `splunk-otel-javaagent.jar.<YYYYMMDD_HHMMSS>`. The store never mutates
//! an existing entry; it only creates new ones or removes the whole
//! directory.

use chrono::Local;
use oam_common::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use crate::AGENT_JAR_NAME;

/// Timestamp suffix format for backup entries (second resolution).
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Append-only store of prior artifact copies under a backup directory.
pub struct BackupStore {
    backup_dir: PathBuf,
}

impl BackupStore {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        BackupStore {
            backup_dir: backup_dir.into(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Copy `source` into the store under a timestamped name and return
    /// the new entry's path.
    ///
    /// Two backups within the same second share a name and the later one
    /// overwrites the earlier; second-level resolution is an accepted
    /// limitation.
    pub fn create_backup(&self, source: &Path) -> Result<PathBuf> {
        if !source.exists() {
            return Err(Error::NotFound {
                path: source.to_path_buf(),
            });
        }

        fs::create_dir_all(&self.backup_dir).map_err(|e| Error::fs(&self.backup_dir, e))?;

        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT);
        let backup_path = self
            .backup_dir
            .join(format!("{AGENT_JAR_NAME}.{timestamp}"));

        fs::copy(source, &backup_path).map_err(|e| Error::fs(&backup_path, e))?;
        debug!(backup_path = %backup_path.display(), "created backup entry");

        Ok(backup_path)
    }

    /// Path of the entry with the newest filesystem modification time.
    ///
    /// Selection is by mtime, not by the name-embedded timestamp. A missing
    /// or unreadable backup directory and an empty history are both the
    /// normal "no history yet" condition, `Ok(None)`.
    pub fn latest_backup(&self) -> Result<Option<PathBuf>> {
        let entries = match fs::read_dir(&self.backup_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(None),
        };

        let mut latest: Option<(SystemTime, PathBuf)> = None;

        for entry in entries.flatten() {
            match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => continue,
                Ok(_) => {}
                Err(_) => continue,
            }

            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(AGENT_JAR_NAME) {
                continue;
            }

            let Ok(metadata) = entry.metadata() else { continue };
            let Ok(modified) = metadata.modified() else { continue };

            if latest.as_ref().map_or(true, |(newest, _)| modified > *newest) {
                latest = Some((modified, entry.path()));
            }
        }

        Ok(latest.map(|(_, path)| path))
    }

    /// Remove the backup directory and everything under it.
    pub fn purge_all(&self) -> Result<()> {
        if !self.backup_dir.exists() {
            return Ok(());
        }
        fs::remove_dir_all(&self.backup_dir).map_err(|e| Error::fs(&self.backup_dir, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn write_source(dir: &Path, content: &[u8]) -> PathBuf {
        let path = dir.join(AGENT_JAR_NAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_create_backup_copies_bytes() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), b"jar bytes");
        let store = BackupStore::new(temp.path().join("backup"));

        let backup = store.create_backup(&source).unwrap();

        assert!(backup.starts_with(store.backup_dir()));
        let name = backup.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(AGENT_JAR_NAME));
        assert_eq!(fs::read(&backup).unwrap(), b"jar bytes");
    }

    #[test]
    fn test_create_backup_missing_source() {
        let temp = TempDir::new().unwrap();
        let store = BackupStore::new(temp.path().join("backup"));

        let err = store
            .create_backup(&temp.path().join("absent.jar"))
            .unwrap_err();
        assert_eq!(err.category(), oam_common::ErrorCategory::NotFound);
        assert!(!store.backup_dir().exists());
    }

    #[test]
    fn test_latest_backup_empty_history() {
        let temp = TempDir::new().unwrap();
        let store = BackupStore::new(temp.path().join("backup"));

        // Missing directory entirely.
        assert!(store.latest_backup().unwrap().is_none());

        // Present but empty.
        fs::create_dir_all(store.backup_dir()).unwrap();
        assert!(store.latest_backup().unwrap().is_none());
    }

    #[test]
    fn test_latest_backup_ignores_foreign_entries() {
        let temp = TempDir::new().unwrap();
        let backup_dir = temp.path().join("backup");
        fs::create_dir_all(&backup_dir).unwrap();

        fs::write(backup_dir.join("unrelated.txt"), b"x").unwrap();
        fs::create_dir_all(backup_dir.join(format!("{AGENT_JAR_NAME}.dir"))).unwrap();

        let store = BackupStore::new(&backup_dir);
        assert!(store.latest_backup().unwrap().is_none());

        let entry = backup_dir.join(format!("{AGENT_JAR_NAME}.20240101_000000"));
        fs::write(&entry, b"old").unwrap();
        assert_eq!(store.latest_backup().unwrap(), Some(entry));
    }

    #[test]
    fn test_latest_backup_uses_mtime_not_name() {
        let temp = TempDir::new().unwrap();
        let backup_dir = temp.path().join("backup");
        fs::create_dir_all(&backup_dir).unwrap();

        // Name says newer, mtime says older, and vice versa. The lookup
        // contract is mtime.
        let named_newer = backup_dir.join(format!("{AGENT_JAR_NAME}.20990101_000000"));
        let named_older = backup_dir.join(format!("{AGENT_JAR_NAME}.20200101_000000"));
        fs::write(&named_newer, b"a").unwrap();
        fs::write(&named_older, b"b").unwrap();

        filetime::set_file_mtime(&named_newer, FileTime::from_unix_time(1_000_000, 0)).unwrap();
        filetime::set_file_mtime(&named_older, FileTime::from_unix_time(2_000_000, 0)).unwrap();

        let store = BackupStore::new(&backup_dir);
        assert_eq!(store.latest_backup().unwrap(), Some(named_older));
    }

    #[test]
    fn test_purge_all() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), b"jar bytes");
        let store = BackupStore::new(temp.path().join("backup"));

        store.create_backup(&source).unwrap();
        assert!(store.backup_dir().exists());

        store.purge_all().unwrap();
        assert!(!store.backup_dir().exists());

        // Purging an absent directory is fine.
        store.purge_all().unwrap();
    }
}
