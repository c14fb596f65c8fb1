use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Group already exists and is not overwritable: {0}")]
    GroupConflict(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Config not found: {group}/{id}")]
    ConfigNotFound { group: String, id: String },

    #[error("Invalid id: {0:?}")]
    InvalidId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
