use thiserror::Error;

pub type Result<T> = std::result::Result<T, RaffleError>;

#[derive(Error, Debug)]
pub enum RaffleError {
    #[error("No entrants available for the raffle with current settings")]
    EmptyPool,

    #[error("Invalid winner count: {0}")]
    InvalidCount(usize),

    #[error("Ticket total of the pool does not fit in 64 bits")]
    TicketOverflow,

    #[error("A draw is already in progress")]
    DrawInProgress,

    #[error("{count} drawn winners have not been recorded yet")]
    UnrecordedWinners { count: usize },

    #[error("Invalid raffle state: {0}")]
    InvalidState(String),

    #[error("Failed to record winners: {0}")]
    LedgerWrite(String),

    #[error("Failed to purge winners: {0}")]
    LedgerPurge(String),

    #[error("Duplicate entrant id: {id}")]
    DuplicateEntrant { id: u64 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RaffleError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
