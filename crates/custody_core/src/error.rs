use thiserror::Error;

use crate::model::EvidenceId;

#[derive(Debug, Error)]
pub enum CustodyError {
    #[error("evidence not found: {0}")]
    NotFound(EvidenceId),
    #[error("validation failed: {0}")]
    Validation(String),
    /// The stored ledger breaks an invariant that should hold for every persisted record.
    #[error("invalid custody state: {0}")]
    InvalidState(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, CustodyError>;

impl CustodyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}

impl From<std::io::Error> for CustodyError {
    fn from(e: std::io::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for CustodyError {
    fn from(e: serde_json::Error) -> Self {
        Self::Persistence(format!("serialization: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_become_persistence_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: CustodyError = io.into();
        assert!(matches!(err, CustodyError::Persistence(ref m) if m.contains("read-only")));
    }

    #[test]
    fn not_found_display_names_the_id() {
        assert_eq!(CustodyError::NotFound(999).to_string(), "evidence not found: 999");
    }
}
