//! Error types for the platform boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error("platform io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{feature} is not supported on this platform")]
    Unsupported { feature: &'static str },
}
