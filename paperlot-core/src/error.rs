use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaperlotError>;

#[derive(Error, Debug)]
pub enum PaperlotError {
    #[error("Game type not found: {id}")]
    GameNotFound { id: String },

    #[error("Game type already registered: {id}")]
    GameExists { id: String },

    #[error("No batch {batch_id} registered for game {game_id}")]
    BatchNotFound { game_id: String, batch_id: String },

    #[error("No paper left to sell in batch {batch_id} of game {game_id}")]
    Exhausted { game_id: String, batch_id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dialog error: {0}")]
    Dialog(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaperlotError {
    pub fn game_not_found(id: impl Into<String>) -> Self {
        Self::GameNotFound { id: id.into() }
    }

    pub fn game_exists(id: impl Into<String>) -> Self {
        Self::GameExists { id: id.into() }
    }

    pub fn batch_not_found(game_id: impl Into<String>, batch_id: impl Into<String>) -> Self {
        Self::BatchNotFound {
            game_id: game_id.into(),
            batch_id: batch_id.into(),
        }
    }

    pub fn exhausted(game_id: impl Into<String>, batch_id: impl Into<String>) -> Self {
        Self::Exhausted {
            game_id: game_id.into(),
            batch_id: batch_id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn dialog(msg: impl Into<String>) -> Self {
        Self::Dialog(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True when the underlying failure is a unique/foreign-key constraint hit.
    /// Batch registration treats a primary-key collision as a duplicate batch,
    /// not a storage fault.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            PaperlotError::Storage(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}
