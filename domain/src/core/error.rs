//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown signal domain: {0}")]
    UnknownSignalDomain(String),

    #[error("Unknown investigation mode: {0}")]
    UnknownMode(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DomainError::UnknownSignalDomain("profiles".to_string());
        assert_eq!(error.to_string(), "Unknown signal domain: profiles");
    }
}
