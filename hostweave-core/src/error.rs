//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Entry not found
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// History snapshot not found
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// A refresh is already in flight for this entry
    #[error("Refresh already in progress for entry: {0}")]
    RefreshBusy(String),

    /// Remote fetch failed
    #[error("Fetch failed for {url}: {detail}")]
    FetchFailed { url: String, detail: String },

    /// Remote fetch timed out
    #[error("Fetch timed out for {url}")]
    FetchTimeout { url: String },

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CoreError {
    /// Whether this is expected behavior (user input, resource does not exist,
    /// etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error`
    /// when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::EntryNotFound(_)
                | Self::SnapshotNotFound(_)
                | Self::RefreshBusy(_)
                | Self::ValidationError(_)
        )
    }

    /// Stable machine-readable code for this error, matching the serde tag.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EntryNotFound(_) => "EntryNotFound",
            Self::SnapshotNotFound(_) => "SnapshotNotFound",
            Self::RefreshBusy(_) => "RefreshBusy",
            Self::FetchFailed { .. } => "FetchFailed",
            Self::FetchTimeout { .. } => "FetchTimeout",
            Self::ValidationError(_) => "ValidationError",
            Self::StorageError(_) => "StorageError",
            Self::SerializationError(_) => "SerializationError",
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_errors_are_warn_level() {
        assert!(CoreError::EntryNotFound("x".into()).is_expected());
        assert!(CoreError::SnapshotNotFound("x".into()).is_expected());
        assert!(CoreError::RefreshBusy("x".into()).is_expected());
        assert!(CoreError::ValidationError("bad".into()).is_expected());
    }

    #[test]
    fn unexpected_errors_are_error_level() {
        assert!(!CoreError::StorageError("disk".into()).is_expected());
        assert!(!CoreError::FetchFailed {
            url: "http://example.com/hosts".into(),
            detail: "connection refused".into(),
        }
        .is_expected());
        assert!(!CoreError::FetchTimeout {
            url: "http://example.com/hosts".into(),
        }
        .is_expected());
        assert!(!CoreError::SerializationError("eof".into()).is_expected());
    }

    #[test]
    fn code_matches_serde_tag() {
        let err = CoreError::EntryNotFound("abc".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], err.code());
    }
}
