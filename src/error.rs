use thiserror::Error;

use crate::types::SuffixKind;

/// Classifies the last failed fetch attempt for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Server answered with a status other than 200
    Status,
    /// Connection refused, timeout, DNS failure or body read error
    Transport,
}

/// Suffix engine error types
#[derive(Error, Debug)]
pub enum SuffixError {
    #[error("Fetch of {url} failed after {attempts} attempts: {message}")]
    FetchExhausted {
        kind: FetchErrorKind,
        url: String,
        /// HTTP status of the last attempt, if the server answered at all
        status: Option<u16>,
        attempts: u32,
        message: String,
    },

    #[error("No {0} source available")]
    LoaderUnavailable(SuffixKind),

    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SuffixError {
    /// Kind of the final fetch failure, if this is a fetch error.
    pub fn fetch_kind(&self) -> Option<FetchErrorKind> {
        match self {
            SuffixError::FetchExhausted { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SuffixError>;
