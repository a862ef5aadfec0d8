use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoggerError {
    #[error("unknown log format `{0}`; expected one of: text, json, journald")]
    UnknownFormat(String),
    #[error("journald output requires Linux and the `journald` feature")]
    JournaldUnavailable,
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
    #[error("journald layer setup failed: {0}")]
    Journald(String),
    #[error("invalid log filter `{filter}`: {reason}")]
    InvalidFilter { filter: String, reason: String },
}
