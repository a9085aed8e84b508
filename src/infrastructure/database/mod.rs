//! SQLite-backed database service

use async_trait::async_trait;
use rusqlite::{Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use crate::application::client::Client;
use crate::application::errors::{Fatal, HandlerResult};
use crate::domain::traits::Service;

/// Value shipped in the default config; treated as "not configured"
pub const PLACEHOLDER_CONNECTION: &str = "Enter a connection string here";

/// Open database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(connection_string: &str) -> SqliteResult<Self> {
        let conn = Connection::open(connection_string)?;
        let db = Self { conn };
        db.init_tables()?;
        Ok(db)
    }

    fn init_tables(&self) -> SqliteResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS startups (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                bot_name TEXT NOT NULL,
                started_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;
        Ok(())
    }

    /// Record one process start; returns the row id
    pub fn record_startup(&self, bot_name: &str) -> SqliteResult<i64> {
        self.conn
            .execute("INSERT INTO startups (bot_name) VALUES (?1)", rusqlite::params![bot_name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn startup_count(&self) -> SqliteResult<i64> {
        self.conn.query_row("SELECT COUNT(*) FROM startups", [], |row| row.get(0))
    }
}

/// Connects the database at startup.
///
/// An unset connection string disables the service. A connection that
/// fails is fatal, since plugins relying on storage cannot run safely.
pub struct DatabaseService {
    connection_string: String,
    bot_name: String,
    database: Arc<Mutex<Option<Database>>>,
}

impl DatabaseService {
    pub fn new(connection_string: impl Into<String>, bot_name: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            bot_name: bot_name.into(),
            database: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_configured(&self) -> bool {
        let trimmed = self.connection_string.trim();
        !trimmed.is_empty() && trimmed != PLACEHOLDER_CONNECTION
    }

    /// Shared handle, `None` until `init` connected
    pub fn database(&self) -> Arc<Mutex<Option<Database>>> {
        self.database.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.database.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

#[async_trait]
impl Service for DatabaseService {
    async fn init(&self, _client: Arc<Client>) -> HandlerResult {
        if !self.is_configured() {
            tracing::warn!("No database connection string configured, skipping database");
            return Ok(());
        }
        if self.is_connected() {
            tracing::debug!("Database already connected, skipping");
            return Ok(());
        }

        let started = Instant::now();
        let connection_string = self.connection_string.clone();
        let bot_name = self.bot_name.clone();
        let opened = tokio::task::spawn_blocking(move || {
            let db = Database::open(&connection_string)?;
            db.record_startup(&bot_name)?;
            Ok::<Database, rusqlite::Error>(db)
        })
        .await;

        let db = match opened {
            Ok(Ok(db)) => db,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Failed to connect to the database");
                return Err(Box::new(Fatal(format!("database connection failed: {}", e))));
            }
            Err(e) => return Err(Box::new(Fatal(format!("database task failed: {}", e)))),
        };

        tracing::info!("Connected to the database in {}ms", started.elapsed().as_millis());
        *self.database.lock().unwrap_or_else(PoisonError::into_inner) = Some(db);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::memory::{MemoryGateway, RecordingResponder};

    fn client() -> Arc<Client> {
        Client::builder(Arc::new(MemoryGateway::new()), Arc::new(RecordingResponder::new())).build()
    }

    #[tokio::test]
    async fn test_placeholder_is_a_no_op() {
        for value in [PLACEHOLDER_CONNECTION, "", "   "] {
            let service = DatabaseService::new(value, "herald-bot");
            assert!(!service.is_configured());
            assert!(service.init(client()).await.is_ok());
            assert!(!service.is_connected());
        }
    }

    #[tokio::test]
    async fn test_connects_and_records_startup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");
        let service = DatabaseService::new(path.to_string_lossy(), "herald-bot");

        service.init(client()).await.unwrap();
        assert!(service.is_connected());

        let handle = service.database();
        let guard = handle.lock().unwrap();
        assert_eq!(guard.as_ref().unwrap().startup_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_second_init_keeps_the_first_connection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");
        let service = DatabaseService::new(path.to_string_lossy(), "herald-bot");

        service.init(client()).await.unwrap();
        service.init(client()).await.unwrap();

        let handle = service.database();
        let guard = handle.lock().unwrap();
        assert_eq!(guard.as_ref().unwrap().startup_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_database_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("bot.db");
        let service = DatabaseService::new(path.to_string_lossy(), "herald-bot");

        let err = service.init(client()).await.unwrap_err();
        assert!(err.is::<Fatal>());
        assert!(!service.is_connected());
    }
}
