use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::schema;

/// Connection settings applied when a database is opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// How long a statement waits on a locked database before failing.
    /// SQLite takes this as an `i32`; larger values are rejected on open.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
        }
    }
}

/// Thread-safe SQLite connection wrapper.
/// Uses parking_lot::Mutex for synchronous access (rusqlite is not Sync).
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    /// Open or create a database at the given path with default settings.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with(path, &DatabaseConfig::default())
    }

    /// Open or create a database at the given path.
    pub fn open_with(path: &Path, config: &DatabaseConfig) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("create dir: {e}")))?;
        }

        let conn = Connection::open(path)?;
        init(&conn, config)?;

        info!(path = %path.display(), "database opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_owned(),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init(&conn, &DatabaseConfig::default())?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Execute a closure with the database connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Apply pragmas, create tables and record the schema version once.
fn init(conn: &Connection, config: &DatabaseConfig) -> Result<(), StoreError> {
    // rusqlite panics on timeouts that do not fit SQLite's i32 milliseconds.
    if i32::try_from(config.busy_timeout_ms).is_err() {
        return Err(StoreError::InvalidConfig(format!(
            "busy timeout {}ms exceeds {}ms",
            config.busy_timeout_ms,
            i32::MAX
        )));
    }
    conn.execute_batch(schema::PRAGMAS)?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    conn.execute_batch(schema::CREATE_TABLES)?;

    let version: Option<u32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    if version.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [schema::SCHEMA_VERSION],
        )?;
        debug!(version = schema::SCHEMA_VERSION, "schema version recorded");
    }
    Ok(())
}
