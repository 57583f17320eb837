use crate::error::{PaperlotError, Result};
use rusqlite::Connection;
use std::path::Path;
use tokio::sync::Mutex;

/// SQLite-backed store shared by the catalog, registrar, ledger and report
/// engine. A single connection behind a mutex; multi-row writes additionally
/// run inside a rusqlite transaction.
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PaperlotError::internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        // Game types table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS game_types (
                game_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                tickets_per_batch INTEGER NOT NULL,
                price_per_ticket INTEGER NOT NULL
            )",
            [],
        )?;

        // Tickets table; the composite primary key is what makes duplicate
        // batch registration collide instead of double-inserting
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tickets (
                game_id TEXT NOT NULL,
                batch_id TEXT NOT NULL,
                ticket_id INTEGER NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                sold_at INTEGER,
                FOREIGN KEY (game_id) REFERENCES game_types(game_id),
                PRIMARY KEY (game_id, batch_id, ticket_id)
            )",
            [],
        )?;

        Ok(())
    }

    pub async fn get_connection(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
