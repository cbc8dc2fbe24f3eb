//! Error types for pollbox.

use thiserror::Error;

/// Result type used across the crate.
pub type PollResult<T> = Result<T, PollError>;

/// Everything that can reject a poll operation.
///
/// A missing poll is not an error: lookups and mutations on an unknown id
/// return `None` or `false` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Comments are disabled for this poll")]
    CommentsDisabled,

    #[error("Poll is closed")]
    Closed,

    #[error("Already voted on poll {0}")]
    AlreadyVoted(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PollError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the caller caused the error, as opposed to the store.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::CommentsDisabled | Self::Closed | Self::AlreadyVoted(_)
        )
    }
}

impl From<serde_json::Error> for PollError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

impl From<std::io::Error> for PollError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_are_distinguished_from_storage_failures() {
        assert!(PollError::validation("empty title").is_rejection());
        assert!(PollError::CommentsDisabled.is_rejection());
        assert!(PollError::AlreadyVoted("1".into()).is_rejection());
        assert!(!PollError::Storage("disk".into()).is_rejection());
        assert!(!PollError::Serde("eof".into()).is_rejection());
    }

    #[test]
    fn display_includes_detail() {
        let err = PollError::validation("Poll must have at least 2 options");
        assert_eq!(
            err.to_string(),
            "Validation error: Poll must have at least 2 options"
        );
    }
}
