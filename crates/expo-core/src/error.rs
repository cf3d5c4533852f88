//! Engine-wide base error type.
//!
//! Sub-crates define their own error enums and convert them upward via
//! `From` impls; `ExpoError` covers the few failures that can happen in the
//! core types themselves (timestamp parsing, clock configuration).

use thiserror::Error;

/// The base error type for `expo-core`.
#[derive(Debug, Error)]
pub enum ExpoError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("timestamp {0} lies before the agenda clock start")]
    BeforeClockStart(chrono::NaiveDateTime),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `expo-core`.
pub type ExpoResult<T> = Result<T, ExpoError>;
