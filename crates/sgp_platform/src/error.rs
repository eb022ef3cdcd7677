//! # Platform Error Types

use thiserror::Error;

/// Errors raised while talking to the platform.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The platform thread could not be started.
    #[error("failed to spawn platform thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The platform thread stopped and no longer accepts requests.
    #[error("platform thread is gone")]
    Disconnected,
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
