use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Missing credentials: {0}")]
    AuthMissing(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl DomainError {
    /// Validation failures happen before any I/O and must not be retried as-is.
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::InvalidWindow(_) | DomainError::InvalidInput(_))
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Persistence(e.to_string())
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}
