//! Error types for the driver crate.
//!
//! The driver recovers from transport and response failures locally (log and
//! return `None`); the only fatal path is configuration bootstrap, which has
//! its own error type in [`crate::config`].

use thiserror::Error;

/// Failure raised by a [`crate::transport::Transport`] implementation.
///
/// Never escalates past the API wrapper: callers of the storage driver see
/// an absent result, not an error.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport failure: {0}")]
    Other(String),
}
