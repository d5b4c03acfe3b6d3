//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `AplError` as one variant
//! via `#[from]`.

use thiserror::Error;

/// The top-level error type for `apl-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum AplError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for all `apl-*` crates.
pub type AplResult<T> = Result<T, AplError>;
