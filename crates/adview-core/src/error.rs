//! Error types module
//!
//! `ParserError` covers failures inside the external parser backends;
//! `WorkerError` is what a single classification invocation can fail with.
//! Both self-describe through [`ErrorMetadata`] so callers can log and report
//! them uniformly.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like bad input
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be reported
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FILE_READ_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the caller may reasonably retry the same request
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the caller
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("Parser transport error: {0}")]
    Transport(String),

    #[error("Parser returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid parser response: {0}")]
    InvalidResponse(String),

    #[error("Parser process failed: {0}")]
    Process(String),

    #[error("Parser configuration error: {0}")]
    Config(String),

    #[error("Parser IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Failed to read file '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Parser setup failed: {0}")]
    Setup(#[source] ParserError),

    #[error("Parser failed: {0}")]
    Parse(#[source] ParserError),

    #[error("Unknown banner category: '{label}'")]
    UnknownCategory { label: String },

    #[error("Worker is no longer accepting jobs")]
    WorkerClosed,
}

/// (error_code, recoverable, suggested_action, log_level)
fn parser_error_static_metadata(
    err: &ParserError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        ParserError::Transport(_) => (
            "PARSER_UNAVAILABLE",
            true,
            Some("Check that the parse service is reachable"),
            LogLevel::Error,
        ),
        ParserError::Status { status, .. } if *status >= 500 => (
            "PARSER_STATUS",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        ParserError::Status { .. } => (
            "PARSER_REJECTED",
            false,
            Some("Check that the file is a supported banner archive"),
            LogLevel::Warn,
        ),
        ParserError::InvalidResponse(_) => ("PARSER_INVALID_RESPONSE", false, None, LogLevel::Error),
        ParserError::Process(_) => (
            "PARSER_PROCESS_FAILED",
            false,
            Some("Inspect the parser executable's stderr"),
            LogLevel::Error,
        ),
        ParserError::Config(_) => (
            "PARSER_CONFIG",
            false,
            Some("Check ADVIEW_PARSER_* settings"),
            LogLevel::Error,
        ),
        ParserError::Io(_) => ("PARSER_IO", true, None, LogLevel::Error),
    }
}

impl ErrorMetadata for ParserError {
    fn error_code(&self) -> &'static str {
        parser_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        parser_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        parser_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        parser_error_static_metadata(self).3
    }
}

impl ErrorMetadata for WorkerError {
    fn error_code(&self) -> &'static str {
        match self {
            WorkerError::Io { .. } => "FILE_READ_ERROR",
            WorkerError::Setup(_) => "PARSER_SETUP_FAILED",
            WorkerError::Parse(inner) => inner.error_code(),
            WorkerError::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            WorkerError::WorkerClosed => "WORKER_CLOSED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            WorkerError::Io { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            WorkerError::Setup(inner) | WorkerError::Parse(inner) => inner.is_recoverable(),
            WorkerError::UnknownCategory { .. } => false,
            WorkerError::WorkerClosed => false,
        }
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            WorkerError::Io { .. } => Some("Check that the file exists and is readable"),
            WorkerError::Setup(inner) | WorkerError::Parse(inner) => inner.suggested_action(),
            WorkerError::UnknownCategory { .. } => {
                Some("Upgrade the worker to a version that knows this category")
            }
            WorkerError::WorkerClosed => None,
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            WorkerError::Io { .. } => LogLevel::Warn,
            WorkerError::Setup(_) => LogLevel::Error,
            WorkerError::Parse(inner) => inner.log_level(),
            WorkerError::UnknownCategory { .. } => LogLevel::Error,
            WorkerError::WorkerClosed => LogLevel::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_io() {
        let err = WorkerError::Io {
            name: "banner.zip".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.error_code(), "FILE_READ_ERROR");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert!(err.to_string().contains("banner.zip"));
    }

    #[test]
    fn test_error_metadata_parse_delegates_to_parser() {
        let err = WorkerError::Parse(ParserError::Status {
            status: 503,
            body: "busy".to_string(),
        });
        assert_eq!(err.error_code(), "PARSER_STATUS");
        assert!(err.is_recoverable());
        assert_eq!(err.suggested_action(), Some("Retry after a short delay"));

        let err = WorkerError::Parse(ParserError::Status {
            status: 422,
            body: "not a banner".to_string(),
        });
        assert_eq!(err.error_code(), "PARSER_REJECTED");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_setup_has_own_code() {
        let err = WorkerError::Setup(ParserError::Transport("connection refused".to_string()));
        assert_eq!(err.error_code(), "PARSER_SETUP_FAILED");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_unknown_category() {
        let err = WorkerError::UnknownCategory {
            label: "flash".to_string(),
        };
        assert_eq!(err.error_code(), "UNKNOWN_CATEGORY");
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "Unknown banner category: 'flash'");
    }

    #[test]
    fn test_parser_io_from() {
        let err: ParserError = io::Error::new(io::ErrorKind::Other, "pipe closed").into();
        assert_eq!(err.error_code(), "PARSER_IO");
    }
}
