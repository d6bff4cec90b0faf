/// Longeron Error Types
///
/// Error handling for the transport kernel.
use std::io;
use thiserror::Error;

/// Main error type for kernel operations
#[derive(Error, Debug)]
pub enum LongeronError {
    /// IO error during socket operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A connection attempt already exists on this connector
    #[error("Connection attempt already in progress")]
    ConnectInProgress,

    /// Operation requires an established or pending connection
    #[error("Not connected")]
    NotConnected,
}

/// Result type alias for kernel operations
pub type Result<T> = std::result::Result<T, LongeronError>;

impl LongeronError {
    /// Check if this error is a synchronous setup failure (socket
    /// creation, immediate refusal) as opposed to an asynchronously
    /// surfaced connection failure.
    #[must_use]
    pub const fn is_setup_failure(&self) -> bool {
        matches!(self, Self::Io(_) | Self::ConnectInProgress)
    }
}
