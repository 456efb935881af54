//! Error types for the client-side SSE transport.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The stream URL for a channel could not be built or parsed.
    InvalidUrl(String),

    /// The transport could not start a stream (for example, no async runtime is running).
    Transport(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidUrl(msg) => write!(f, "Invalid stream URL: {}", msg),
            Error::Transport(msg) => write!(f, "Stream transport error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
