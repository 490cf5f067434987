use game_core::DomainError;
use serde_json::{json, Value};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Wire-level error taxonomy. Every failure leaving the service layer is
/// one of these kinds, carrying a stable code for the CLI/UI.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    DomainRule(String),

    #[error("{0}")]
    StateConflict(String),

    /// A save file failed schema or invariant checks on load.
    #[error("{0}")]
    Corrupt(String),

    #[error("{0}")]
    Unexpected(String),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::InvalidInput(_) => "INVALID_INPUT",
            ServiceError::DomainRule(_) => "DOMAIN_RULE",
            ServiceError::StateConflict(_) => "STATE_CONFLICT",
            ServiceError::Corrupt(_) => "CORRUPT",
            ServiceError::Unexpected(_) => "UNEXPECTED_ERROR",
        }
    }

    /// Structured result shape for the CLI: `{ok: false, error: {...}}`.
    pub fn to_value(&self) -> Value {
        json!({
            "ok": false,
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        })
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ServiceError::InvalidInput(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::StateConflict(message.into())
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        ServiceError::Corrupt(message.into())
    }
}

impl From<DomainError> for ServiceError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::NotFound(message) => ServiceError::NotFound(message),
            DomainError::InvalidInput(message) => ServiceError::InvalidInput(message),
            DomainError::DomainRule(message) => ServiceError::DomainRule(message),
            DomainError::StateConflict(message) => ServiceError::StateConflict(message),
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(error: std::io::Error) -> Self {
        ServiceError::Unexpected(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ServiceError::not_found("x").code(), "NOT_FOUND");
        assert_eq!(ServiceError::corrupt("x").code(), "CORRUPT");
        assert_eq!(
            ServiceError::Unexpected("boom".to_string()).code(),
            "UNEXPECTED_ERROR"
        );
    }

    #[test]
    fn to_value_matches_the_wire_shape() {
        let value = ServiceError::DomainRule("för dyrt".to_string()).to_value();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["code"], "DOMAIN_RULE");
        assert_eq!(value["error"]["message"], "för dyrt");
    }

    #[test]
    fn domain_errors_map_by_kind() {
        let err: ServiceError = DomainError::rule("trupp full").into();
        assert_eq!(err.code(), "DOMAIN_RULE");
    }
}
