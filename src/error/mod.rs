//! Centralized error handling for Weft
//! Defines common error types, severity levels, and error codes

use std::fmt;

use crate::constants::errors;

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational message (not really an error)
    Info,
    /// Warning - something might be wrong but operation can continue
    Warning,
    /// Standard error - operation failed but the session stays usable
    Error,
    /// Critical error - the host and the engine disagree about state
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Category of the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Host integration bug: out-of-range line index and similar misuse
    Programming,
    /// Malformed or unsupported protocol message
    Protocol,
    /// Failure reported by the external task runner
    Collaborator,
    /// Configuration or settings errors
    Config,
    /// File system or I/O errors
    Io,
    /// Internal logic or invariant violations
    Internal,
    /// Errors that don't fit other categories
    Other,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Programming => write!(f, "Programming"),
            Self::Protocol => write!(f, "Protocol"),
            Self::Collaborator => write!(f, "Collaborator"),
            Self::Config => write!(f, "Config"),
            Self::Io => write!(f, "IO"),
            Self::Internal => write!(f, "Internal"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A structured error in Weft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeftError {
    /// How serious the error is
    pub severity: ErrorSeverity,
    /// What kind of error occurred
    pub kind: ErrorType,
    /// Machine-readable error code (e.g., "LINE_OUT_OF_RANGE")
    pub code: String,
    /// Human-readable description
    pub message: String,
}

impl WeftError {
    /// Create a new standard error (Severity: Error)
    pub fn new(kind: ErrorType, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Error,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new critical error (Severity: Critical)
    pub fn critical(kind: ErrorType, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Critical,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new warning (Severity: Warning)
    pub fn warning(kind: ErrorType, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Warning,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// A line index the host passed does not exist in the document
    pub fn line_out_of_range(index: usize, line_count: usize) -> Self {
        Self::critical(
            ErrorType::Programming,
            errors::LINE_OUT_OF_RANGE,
            format!("Line {index} out of range (line count: {line_count})"),
        )
    }

    /// Protocol errors are recoverable; the session stays usable
    pub fn protocol(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorType::Protocol, code, message)
    }

    /// Whether this error indicates a host integration bug
    #[must_use]
    pub fn is_programming(&self) -> bool {
        self.kind == ErrorType::Programming
    }

    /// Check if the message contains a substring (useful for tests)
    pub fn contains_msg(&self, sub: &str) -> bool {
        self.message.contains(sub)
    }
}

impl fmt::Display for WeftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}({}): {}",
            self.severity, self.kind, self.code, self.message
        )
    }
}

impl std::error::Error for WeftError {}

impl From<String> for WeftError {
    fn from(msg: String) -> Self {
        Self::new(ErrorType::Other, errors::GENERIC_ERROR, msg)
    }
}

impl From<&str> for WeftError {
    fn from(msg: &str) -> Self {
        Self::new(ErrorType::Other, errors::GENERIC_ERROR, msg)
    }
}

impl From<std::io::Error> for WeftError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorType::Io, errors::IO_ERROR, err.to_string())
    }
}

impl From<serde_json::Error> for WeftError {
    fn from(err: serde_json::Error) -> Self {
        Self::protocol(errors::MALFORMED_MESSAGE, err.to_string())
    }
}

/// Result alias for Weft operations
pub type Result<T> = std::result::Result<T, WeftError>;
