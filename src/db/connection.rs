use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use crate::errors::MetricsError;
use tracing::debug;

/// Project cache store, held open for the duration of a run.
pub struct Database {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(path: &str) -> Result<Self, MetricsError> {
        // Ensure parent directory exists
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| MetricsError::Cache(format!("Failed to open cache {}: {}", path, e)))?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| MetricsError::Cache(format!("Failed to set pragmas: {}", e)))?;

        let db = Self { conn: Arc::new(Mutex::new(conn)) };
        db.initialize()?;
        debug!(path, "Opened project cache");
        Ok(db)
    }

    pub fn in_memory() -> Result<Self, MetricsError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MetricsError::Cache(format!("Failed to open in-memory cache: {}", e)))?;
        let db = Self { conn: Arc::new(Mutex::new(conn)) };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<(), MetricsError> {
        let conn = self.lock()?;
        conn.execute_batch(super::schema::CREATE_TABLES)
            .map_err(|e| MetricsError::Cache(format!("Failed to create tables: {}", e)))?;
        Ok(())
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, MetricsError> {
        self.conn
            .lock()
            .map_err(|_| MetricsError::Cache("Cache connection lock poisoned".into()))
    }

    /// Releases the store. Dropping the last handle has the same effect but
    /// swallows close errors.
    pub fn close(self) -> Result<(), MetricsError> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex
                    .into_inner()
                    .map_err(|_| MetricsError::Cache("Cache connection lock poisoned".into()))?;
                conn.close()
                    .map_err(|(_, e)| MetricsError::Cache(format!("Failed to close cache: {}", e)))?;
                debug!("Closed project cache");
                Ok(())
            }
            // Other handles still open; the connection closes with the last one.
            Err(_) => Ok(()),
        }
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self { conn: self.conn.clone() }
    }
}
