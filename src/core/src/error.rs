use thiserror::Error;

/// Domain failures raised by engine operations. The service layer maps these
/// onto its wire-level error codes.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    DomainRule(String),

    #[error("{0}")]
    StateConflict(String),
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        DomainError::InvalidInput(message.into())
    }

    pub fn rule(message: impl Into<String>) -> Self {
        DomainError::DomainRule(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::StateConflict(message.into())
    }
}
