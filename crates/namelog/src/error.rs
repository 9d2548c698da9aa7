//! crates/namelog/src/error.rs
//!
//! Error types for registry, logger and configuration operations.
//!
//! Filtering outcomes never produce errors. The explicit variants below are
//! returned only by the `try_*`/`require` entry points; their silent
//! counterparts keep the non-failing behavior.

use thiserror::Error;

use crate::logger::LoggerId;

/// Result type for logging operations.
pub type LogResult<T> = Result<T, LogError>;

/// Errors surfaced by the named-logger facility.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LogError {
    /// No logger is registered under the name.
    #[error("no logger named '{0}'")]
    NotFound(String),
    /// Another logger already holds exclusivity.
    #[error("logger '{requested}' cannot claim exclusivity: held by '{holder}' ({holder_id})")]
    ExclusivityDenied {
        /// Logger that attempted the claim.
        requested: String,
        /// Logger currently holding exclusivity.
        holder: String,
        /// Identifier of the holder.
        holder_id: LoggerId,
    },
    /// A write was attempted on a logger with no attached sink.
    #[error("logger '{0}' has no sink attached")]
    SinkUnavailable(String),
    /// A level name is unknown or a level set is malformed.
    #[error("invalid level: {0}")]
    InvalidLevel(String),
    /// A configuration directive could not be parsed.
    #[error("invalid directive: {0}")]
    InvalidDirective(String),
    /// The process-wide registry was already initialized.
    #[error("process-wide registry already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_logger() {
        let err = LogError::NotFound("svc".to_owned());
        assert_eq!(err.to_string(), "no logger named 'svc'");
    }

    #[test]
    fn exclusivity_denied_names_both_loggers() {
        let err = LogError::ExclusivityDenied {
            requested: "b".to_owned(),
            holder: "a".to_owned(),
            holder_id: LoggerId::from_raw(3),
        };
        let text = err.to_string();
        assert!(text.contains("'b'"));
        assert!(text.contains("'a'"));
        assert!(text.contains("#3"));
    }

    #[test]
    fn invalid_level_format() {
        let err = LogError::InvalidLevel("unknown level: fatal".to_owned());
        assert!(err.to_string().starts_with("invalid level"));
        assert!(format!("{err:?}").contains("InvalidLevel"));
    }

    #[test]
    fn errors_are_std_errors() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
        assert_error(&LogError::AlreadyInitialized);
    }
}
