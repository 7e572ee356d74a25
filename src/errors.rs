//! The error taxonomy (spec §7).
//!
//! [`ConfigError`] is the single fatal class the orchestrator can return from
//! `RunAssessment`. Everything else — runner failures, parse failures,
//! scoping failures, cancellation — is recorded in the report as a
//! [`CoreError`] and never propagated out of the call.

use thiserror::Error;

/// Fatal configuration errors: an invalid priority string or an
/// unrecognized `assess.yaml` key (spec §7).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid priority token '{0}': expected 'category=N', 'category=name', or 'category=default'")]
    InvalidPriorityToken(String),

    #[error("unknown category in priority string: {0}")]
    UnknownCategory(#[from] crate::core::types::UnknownCategory),

    #[error("unrecognized key(s) in assess.yaml: {0:?}")]
    UnrecognizedConfigKeys(Vec<String>),

    #[error("failed to parse assess.yaml: {0}")]
    MalformedYaml(String),
}

/// Non-fatal failures recorded on a [`crate::core::types::CategoryResult`] or
/// surfaced from a security tool adapter (spec §7).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{category} runner '{tool}' failed: {message}")]
    RunnerFailed {
        category: String,
        tool: String,
        message: String,
    },

    #[error("{tool} produced malformed output after {attempts} attempt(s): {message}")]
    ParseExhausted {
        tool: String,
        attempts: u32,
        message: String,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl CoreError {
    pub fn other(message: impl Into<String>) -> Self {
        CoreError::Other(message.into())
    }
}
