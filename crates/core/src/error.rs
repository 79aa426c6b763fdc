#[derive(Debug, thiserror::Error)]
pub enum FilingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown template status code: {0}")]
    UnknownStatus(i32),
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to create session directory: {0}")]
    SessionDirCreation(std::io::Error),
    #[error("failed to read session file: {0}")]
    SessionRead(std::io::Error),
    #[error("failed to write session file: {0}")]
    SessionWrite(std::io::Error),
    #[error("failed to remove session file: {0}")]
    SessionRemove(std::io::Error),
    #[error("failed to serialize session: {0}")]
    SessionSerialization(serde_json::Error),
    #[error("failed to deserialize session: {0}")]
    SessionDeserialization(serde_json::Error),
}

pub type FilingResult<T> = std::result::Result<T, FilingError>;
