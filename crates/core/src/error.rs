//! Error types for folio text extraction.

use thiserror::Error;

use crate::engine::EngineError;

/// Primary error type for text session, aggregation and search operations.
#[derive(Error, Debug)]
pub enum TextError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown detail level: {0}")]
    UnknownDetailLevel(String),

    #[error("character index {index} out of range (page has {count} characters)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("text engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("{0} has already been released")]
    Disposed(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TextError {
    /// True for errors caused by the caller's arguments rather than the engine.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::UnknownDetailLevel(_) | Self::IndexOutOfRange { .. }
        )
    }
}

/// Convenience Result type alias for TextError.
pub type Result<T> = std::result::Result<T, TextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_classification() {
        assert!(TextError::UnknownDetailLevel("7".into()).is_invalid_argument());
        assert!(TextError::IndexOutOfRange { index: 3, count: 2 }.is_invalid_argument());
        assert!(!TextError::Disposed("text page").is_invalid_argument());
        assert!(!TextError::Engine(EngineError::Page).is_invalid_argument());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            TextError::Disposed("search cursor").to_string(),
            "search cursor has already been released"
        );
        assert_eq!(
            TextError::Engine(EngineError::Password).to_string(),
            "text engine error: password required or incorrect password"
        );
    }
}
