// SQLite key-value backend stored at <data_dir>/leafeon.db
// One `kv` table holds every serialized blob. Each call opens a short-lived
// connection so the store can be shared across threads without holding a Connection.

use std::path::{Path, PathBuf};
use std::time::Duration;
use rusqlite::{params, Connection, OptionalExtension};

use super::KeyValueStore;
use crate::constants::DEFAULT_BUSY_TIMEOUT_MS;
use crate::error::{LeafeonError, Result};

/// All migrations in order. Versioned through PRAGMA user_version.
const KV_MIGRATIONS: &[&str] = &[
    // Migration 1: key-value table
    r#"
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    );
    "#,

    // Migration 2: write timestamps for diagnostics
    r#"
    ALTER TABLE kv ADD COLUMN updated_at TEXT NOT NULL DEFAULT '';
    "#,
];

#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteKvStore {
    /// Open (or create) the database at `db_path` and run pending migrations.
    pub fn open(db_path: &Path) -> Result<Self> {
        Self::open_with_timeout(db_path, Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))
    }

    pub fn open_with_timeout(db_path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LeafeonError::Persistence(format!(
                        "Cannot create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let store = Self {
            db_path: db_path.to_path_buf(),
            busy_timeout,
        };

        let conn = store.connect()?;
        run_migrations(&conn)?;

        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection with pragmas set. Does NOT run migrations.
    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        let updated_at = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, updated_at],
        )?;
        Ok(())
    }
}

fn get_schema_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Run all pending migrations
fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    let target_version = KV_MIGRATIONS.len() as u32;

    if current_version > target_version {
        return Err(LeafeonError::Persistence(format!(
            "Database schema version {} is newer than this build supports (max {}). Please upgrade Leafeon.",
            current_version, target_version
        )));
    }

    for (i, migration) in KV_MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as u32;
        if migration_version <= current_version {
            continue;
        }

        conn.execute_batch(migration)?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", migration_version))?;

        log::info!("Applied kv migration {}", migration_version);
    }

    Ok(())
}
