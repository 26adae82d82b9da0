use crate::error::Result;
use crate::ledger::WinnerLedger;
use crate::storage::Storage;
use crate::types::Winner;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::params;
use std::sync::Arc;

/// SQLite-backed winner ledger.
pub struct WinnerStore {
    storage: Arc<Storage>,
}

impl WinnerStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn count(&self) -> Result<usize> {
        let conn = self.storage.get_connection().await;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM winners", [], |row| row.get(0))?;

        Ok(count as usize)
    }
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(|| {
        tracing::warn!(
            "Winner timestamp {} is out of range, using current time",
            millis
        );
        Utc::now()
    })
}

#[async_trait]
impl WinnerLedger for WinnerStore {
    async fn list(&self) -> Result<Vec<Winner>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare(
            "SELECT id, guide_id, name, supervisor, department, nps, nrpc,
                    refund_percent, total_tickets, won_at, created_at
             FROM winners ORDER BY won_at ASC, rowid ASC",
        )?;

        let winner_iter = stmt.query_map([], |row| {
            let guide_id: i64 = row.get(1)?;
            let total_tickets: i64 = row.get(8)?;

            Ok(Winner {
                id: row.get(0)?,
                entrant_id: guide_id as u64,
                name: row.get(2)?,
                supervisor: row.get(3)?,
                department: row.get(4)?,
                nps: row.get(5)?,
                nrpc: row.get(6)?,
                refund_percent: row.get(7)?,
                total_tickets: total_tickets as u64,
                won_at: from_millis(row.get(9)?),
                created_at: from_millis(row.get(10)?),
            })
        })?;

        let mut winners = Vec::new();
        for winner in winner_iter {
            winners.push(winner?);
        }

        Ok(winners)
    }

    async fn append(&self, winners: &[Winner]) -> Result<()> {
        let mut conn = self.storage.get_connection().await;

        // Dropping the transaction on error rolls back the whole batch
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO winners
                 (id, guide_id, name, supervisor, department, nps, nrpc,
                  refund_percent, total_tickets, won_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;

            for winner in winners {
                stmt.execute(params![
                    winner.id,
                    winner.entrant_id as i64,
                    winner.name,
                    winner.supervisor,
                    winner.department,
                    winner.nps,
                    winner.nrpc,
                    winner.refund_percent,
                    winner.total_tickets as i64,
                    winner.won_at.timestamp_millis(),
                    winner.created_at.timestamp_millis(),
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!("Recorded {} winners", winners.len());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.storage.get_connection().await;

        let removed = conn.execute("DELETE FROM winners", [])?;

        tracing::info!("Purged {} winners", removed);
        Ok(())
    }
}
