use thiserror::Error;

/// Failures surfaced by the content and engagement services.
///
/// Unique-constraint hits on tag or like rows never show up here; they are
/// resolved inside the service that caused them.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("timestamp error: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl BoardError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
