// Key-value persistence backends

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

/// Durable string store the task collection is persisted into. The store
/// writes the whole serialized collection under one fixed key.
pub trait KvStore {
    /// Value stored under `key`, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<K: KvStore + ?Sized> KvStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Keys become file names and SQL values; keep them boring.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::Storage("key cannot be empty".to_string()));
    }
    if key.len() > 64 {
        return Err(Error::Storage(format!("key too long: {} (max 64 chars)", key.len())));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(Error::Storage(format!(
            "invalid key: {key} (must be alphanumeric with _/-)"
        )));
    }
    Ok(())
}

// ============================================================================
// Memory backend
// ============================================================================

/// In-memory backend for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// File backend
// ============================================================================

/// One file per key inside a data directory. Writes take an exclusive
/// lock and are synced to disk before returning.
pub struct FileKv {
    base_path: PathBuf,
}

impl FileKv {
    /// Open or create a file store rooted at the given directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        debug!(path = %base_path.display(), "opened file store");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.json"))
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.entry_path(key);

        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        // Exclusive lock before writing; released when the file is dropped
        file.lock_exclusive()?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;

        Ok(())
    }
}

// ============================================================================
// SQLite backend
// ============================================================================

/// Single-table SQLite backend.
pub struct SqliteKv {
    db: Connection,
}

impl SqliteKv {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let db = Connection::open(path)?;
        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;

        Ok(Self { db })
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise_round_trip<K: KvStore>(kv: &mut K) {
        assert_eq!(kv.get("tasks").unwrap(), None);

        kv.set("tasks", "[1]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[1]"));

        kv.set("tasks", "[1,2]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_memory_round_trip() {
        let mut kv = MemoryKv::new();
        exercise_round_trip(&mut kv);
    }

    #[test]
    fn test_file_round_trip() {
        let temp = TempDir::new().unwrap();
        let mut kv = FileKv::open(temp.path()).unwrap();
        exercise_round_trip(&mut kv);

        assert!(temp.path().join("tasks.json").exists());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let mut kv = FileKv::open(temp.path()).unwrap();
            kv.set("tasks", "persisted").unwrap();
        }

        let kv = FileKv::open(temp.path()).unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_sqlite_round_trip() {
        let temp = TempDir::new().unwrap();
        let mut kv = SqliteKv::open(temp.path().join("kv.db")).unwrap();
        exercise_round_trip(&mut kv);
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("kv.db");
        {
            let mut kv = SqliteKv::open(&db_path).unwrap();
            kv.set("tasks", "persisted").unwrap();
        }

        let kv = SqliteKv::open(&db_path).unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_sqlite_open_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("nested").join("dir").join("kv.db");
        let mut kv = SqliteKv::open(&db_path).unwrap();
        kv.set("tasks", "x").unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let mut kv = MemoryKv::new();

        assert!(kv.set("", "x").is_err());
        assert!(kv.set("../escape", "x").is_err());
        assert!(kv.set(&"a".repeat(65), "x").is_err());
        assert!(kv.get("bad/key").is_err());
    }

    #[test]
    fn test_boxed_store_forwards() {
        let mut kv: Box<dyn KvStore> = Box::new(MemoryKv::new());
        exercise_round_trip(&mut kv);
    }
}
