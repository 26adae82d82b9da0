//! Contest raffle core library
//!
//! Derives the eligible pool from a static entrant roster and a ledger of
//! past winners, draws winners without replacement, and records them
//! atomically through the [`WinnerLedger`] contract.

pub mod config;
pub mod draw;
pub mod error;
pub mod ledger;
pub mod pool;
pub mod roster;
pub mod session;
pub mod storage;
pub mod types;

pub use config::{DrawFrom, DrawMode, RaffleSettings, MAX_WINNERS, MIN_WINNERS};
pub use error::{RaffleError, Result};
pub use ledger::{MemoryLedger, WinnerLedger};
pub use roster::Roster;
pub use session::{RafflePhase, RaffleSession};
pub use storage::{Storage, WinnerStore};
pub use types::{DepartmentSummary, Entrant, PoolStats, Winner};

use std::path::Path;
use std::sync::Arc;

/// Open the SQLite winner ledger kept in `data_dir`.
pub async fn open_ledger(data_dir: &Path) -> Result<WinnerStore> {
    let db_path = data_dir.join("raffle.db");
    let storage = Arc::new(Storage::new(&db_path).await?);
    Ok(WinnerStore::new(storage))
}
