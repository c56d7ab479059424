// error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Not enough active countries to draw a round: {available} available, 4 required")]
    InsufficientPool { available: usize },

    #[error("At least one continent must remain enabled")]
    InvalidFilterChange,

    #[error("Choice '{iso_code}' does not belong to the current round")]
    StaleChoice { iso_code: String },

    #[error("The session has expired; start a new one to keep playing")]
    SessionExpired,

    #[error("Session duration must be at least one second")]
    InvalidDuration,

    #[error("Unknown continent: {0}")]
    UnknownContinent(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuizError>;
