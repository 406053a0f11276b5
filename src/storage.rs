// Durable key-value storage backed by SQLite

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::task::now_ms;

const CURRENT_VERSION: u32 = 1;

/// Key holding the serialized task list
pub const TASKS_KEY: &str = "tasklist.tasks";
/// Key holding the persisted theme
pub const THEME_KEY: &str = "tasklist.theme";
/// Key holding the persisted UI mode
pub const MODE_KEY: &str = "tasklist.mode";

/// Minimal string key-value storage
///
/// Methods take `&self` so one backend can be shared by the task store and
/// the preferences manager.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: Storage + ?Sized> Storage for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// On-disk storage in a `.tasklist` directory
///
/// Holds an exclusive lock on `tasklist.lock` for its whole lifetime, so only
/// one process can mutate a given store at a time.
pub struct SqliteStorage {
    base_path: PathBuf,
    db: Connection,
    _lock: File,
}

impl SqliteStorage {
    /// Open or create storage at the given path
    ///
    /// The storage lives in a `.tasklist` subdirectory of the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().join(".tasklist");

        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        let lock = File::create(base_path.join("tasklist.lock")).context("Failed to create lock file")?;
        lock.try_lock_exclusive()
            .map_err(|e| eyre!("Store at {} is in use by another process: {}", base_path.display(), e))?;

        let db_path = base_path.join("tasklist.db");
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;

        let storage = Self {
            base_path,
            db,
            _lock: lock,
        };

        storage.create_schema()?;
        storage.create_gitignore()?;
        storage.write_version()?;

        info!(path = ?storage.base_path, "Opened store");
        Ok(storage)
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    fn create_gitignore(&self) -> Result<()> {
        let gitignore_path = self.base_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(
                gitignore_path,
                "tasklist.db\ntasklist.db-shm\ntasklist.db-wal\ntasklist.lock\n",
            )?;
        }
        Ok(())
    }

    fn write_version(&self) -> Result<()> {
        let version_path = self.base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string())?;
        }
        Ok(())
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(eyre!("Storage key cannot be empty or whitespace-only"));
        }
        if key.len() > 256 {
            return Err(eyre!("Storage key too long: {} chars (max 256)", key.len()));
        }
        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .context("Failed to read from storage")?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::validate_key(key)?;
        debug!(key, bytes = value.len(), "storage set");

        self.db
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, now_ms()],
            )
            .context("Failed to write to storage")?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .context("Failed to delete from storage")?;
        Ok(())
    }
}

/// Volatile storage, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a single entry
    pub fn with(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.entries.borrow_mut().insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
