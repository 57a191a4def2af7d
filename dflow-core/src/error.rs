use thiserror::Error;

#[derive(Error, Debug)]
pub enum DflowError {
    /// Inbound update lacks the fields required to route it (no originating user, unknown kind).
    #[error("Malformed update: {0}")]
    MalformedUpdate(String),

    #[error("Invalid attachment: {0}")]
    InvalidAttachment(String),

    #[error("Invalid keyboard: {0}")]
    InvalidKeyboard(String),

    /// Coordinates that are not finite or lie outside the valid latitude/longitude ranges.
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Unsupported response shape: {0}")]
    UnsupportedResponseShape(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DflowError {
    /// Validation failures are raised before any send operation is emitted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DflowError::InvalidAttachment(_)
                | DflowError::InvalidKeyboard(_)
                | DflowError::InvalidLocation(_)
                | DflowError::UnsupportedResponseShape(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DflowError>;
