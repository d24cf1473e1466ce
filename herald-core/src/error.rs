//! Error types for Herald operations

/// Result type for Herald operations
pub type Result<T> = std::result::Result<T, HeraldError>;

/// Rejection of an envelope that is missing a required attribute.
///
/// Returned by envelope construction only. The message is part of the
/// contract and is stable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `source` was unset or blank
    #[error("source is required")]
    MissingSource,

    /// `type` was unset or blank
    #[error("type is required")]
    MissingType,

    /// An extension used the name of a standard attribute
    #[error("extension name is reserved: {0}")]
    ReservedExtension(String),
}

/// Error types for the Herald core
#[derive(Debug, thiserror::Error)]
pub enum HeraldError {
    /// Envelope validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl HeraldError {
    /// The validation failure, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            HeraldError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<String> for HeraldError {
    fn from(s: String) -> Self {
        HeraldError::Other(s)
    }
}

impl From<&str> for HeraldError {
    fn from(s: &str) -> Self {
        HeraldError::Other(s.to_string())
    }
}
