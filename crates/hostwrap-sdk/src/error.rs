//! Error types raised by host member bodies and value conversions

/// Result type for host calls and conversions
pub type HostResult<T> = Result<T, HostError>;

/// Host-side error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// Type mismatch during conversion
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Invalid argument
    #[error("Argument error: {0}")]
    ArgumentError(String),

    /// Member body panicked
    #[error("Member panicked: {0}")]
    Panic(String),

    /// Member body reported a failure
    #[error("{0}")]
    Failed(String),
}

impl HostError {
    /// Shorthand for a [`HostError::TypeMismatch`]
    pub fn mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        HostError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        HostError::Failed(s)
    }
}

impl From<&str> for HostError {
    fn from(s: &str) -> Self {
        HostError::Failed(s.to_string())
    }
}
