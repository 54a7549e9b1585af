// Leafeon Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeafeonError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Plant not found: {0}")]
    PlantNotFound(String),

    #[error("Identification error: {0}")]
    Identification(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl LeafeonError {
    /// True for failures reading or writing the key-value layer.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            LeafeonError::Database(_)
                | LeafeonError::Io(_)
                | LeafeonError::Json(_)
                | LeafeonError::Persistence(_)
        )
    }
}

impl From<anyhow::Error> for LeafeonError {
    fn from(err: anyhow::Error) -> Self {
        LeafeonError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LeafeonError>;
