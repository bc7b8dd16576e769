use crate::model::NoteId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteError {
    /// Absent, expired and already consumed notes all collapse to this.
    #[error("Note not found")]
    NotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store operation timed out")]
    Timeout,

    #[error("Note id already in use: {0}")]
    DuplicateId(NoteId),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NoteError {
    /// True for transient infrastructure failures the caller may retry.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            NoteError::StoreUnavailable(_) | NoteError::Timeout | NoteError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NoteError>;
