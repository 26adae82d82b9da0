//! The durable, append-only record of past winners.

use crate::error::{RaffleError, Result};
use crate::types::Winner;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Ledger contract consumed by the raffle session.
///
/// `append` must be atomic: either every winner in the batch is recorded or
/// none is.
#[async_trait]
pub trait WinnerLedger: Send + Sync {
    async fn list(&self) -> Result<Vec<Winner>>;

    async fn append(&self, winners: &[Winner]) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// In-process ledger, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    winners: RwLock<Vec<Winner>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_winners(winners: Vec<Winner>) -> Self {
        Self {
            winners: RwLock::new(winners),
        }
    }

    pub fn len(&self) -> usize {
        self.winners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.read().is_empty()
    }
}

#[async_trait]
impl WinnerLedger for MemoryLedger {
    async fn list(&self) -> Result<Vec<Winner>> {
        Ok(self.winners.read().clone())
    }

    async fn append(&self, winners: &[Winner]) -> Result<()> {
        let mut recorded = self.winners.write();

        if let Some(dup) = winners
            .iter()
            .find(|w| recorded.iter().any(|r| r.id == w.id))
        {
            return Err(RaffleError::invalid_state(format!(
                "Winner record {} already exists",
                dup.id
            )));
        }

        recorded.extend_from_slice(winners);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.winners.write().clear();
        Ok(())
    }
}
