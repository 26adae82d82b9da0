pub mod winner_store;

pub use winner_store::WinnerStore;

use crate::error::{RaffleError, Result};
use rusqlite::Connection;
use std::path::Path;
use tokio::sync::Mutex;

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RaffleError::internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS winners (
                id TEXT PRIMARY KEY,
                guide_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                supervisor TEXT NOT NULL,
                department TEXT NOT NULL,
                nps REAL NOT NULL,
                nrpc REAL NOT NULL,
                refund_percent REAL NOT NULL,
                total_tickets INTEGER NOT NULL,
                won_at INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub async fn get_connection(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
