use std::fmt;

/// Errors raised while talking to the evaluation providers.
///
/// None of these escape the public facade: every entry point of
/// [`crate::PositionAnalyzer`] converts them into a safe default.
#[derive(Debug, Clone)]
pub enum EvaluationError {
    /// FEN could not be parsed into a position
    InvalidPosition(String),
    /// Search engine failed to produce an evaluation
    Engine(String),
    /// Tablebase backend failed (distinct from "position not covered")
    Tablebase(String),
    /// Transport failure talking to a remote provider
    Network(String),
    /// Provider answered with something we could not understand
    Protocol(String),
    /// Operation did not finish in time
    Timeout {
        operation: String,
        duration_ms: u64,
    },
    /// Configuration error
    Configuration(String),
    /// Validation error with context
    Validation {
        field: String,
        value: String,
        expected: String,
    },
    /// File or process I/O failed
    Io(String),
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::InvalidPosition(msg) => write!(f, "Invalid position: {}", msg),
            EvaluationError::Engine(msg) => write!(f, "Engine error: {}", msg),
            EvaluationError::Tablebase(msg) => write!(f, "Tablebase error: {}", msg),
            EvaluationError::Network(msg) => write!(f, "Network error: {}", msg),
            EvaluationError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            EvaluationError::Timeout {
                operation,
                duration_ms,
            } => {
                write!(f, "Operation '{}' timed out after {}ms", operation, duration_ms)
            }
            EvaluationError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            EvaluationError::Validation {
                field,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Validation failed for field '{}': got '{}', expected '{}'",
                    field, value, expected
                )
            }
            EvaluationError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for EvaluationError {}

// Convenience type alias
pub type Result<T> = std::result::Result<T, EvaluationError>;

impl From<std::io::Error> for EvaluationError {
    fn from(error: std::io::Error) -> Self {
        EvaluationError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for EvaluationError {
    fn from(error: serde_json::Error) -> Self {
        EvaluationError::Protocol(format!("JSON error: {}", error))
    }
}

impl From<reqwest::Error> for EvaluationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            EvaluationError::Network(format!("Request timed out: {}", error))
        } else if error.is_decode() {
            EvaluationError::Protocol(format!("Undecodable response: {}", error))
        } else {
            EvaluationError::Network(error.to_string())
        }
    }
}

impl From<chess::Error> for EvaluationError {
    fn from(error: chess::Error) -> Self {
        EvaluationError::InvalidPosition(error.to_string())
    }
}

// Helper macros for error creation
#[macro_export]
macro_rules! engine_error {
    ($msg:expr) => {
        $crate::errors::EvaluationError::Engine($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::errors::EvaluationError::Engine(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! tablebase_error {
    ($msg:expr) => {
        $crate::errors::EvaluationError::Tablebase($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::errors::EvaluationError::Tablebase(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! validation_error {
    ($field:expr, $value:expr, $expected:expr) => {
        $crate::errors::EvaluationError::Validation {
            field: $field.to_string(),
            value: $value.to_string(),
            expected: $expected.to_string(),
        }
    };
}
