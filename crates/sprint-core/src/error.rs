//! Error type for configuration and core primitives.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `sprint-core`.
pub type CoreResult<T> = Result<T, CoreError>;
