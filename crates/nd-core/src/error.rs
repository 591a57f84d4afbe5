//! Framework error type.
//!
//! Sub-crates define their own error enums and either convert into `NdError`
//! via `From` impls or wrap it as one variant.  Both patterns are acceptable;
//! prefer whichever keeps error sites clean.

use thiserror::Error;

use crate::{InfoId, UserId};

/// The top-level error type for `nd-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum NdError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("information piece {0} not found")]
    InfoNotFound(InfoId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `nd-*` crates.
pub type NdResult<T> = Result<T, NdError>;
