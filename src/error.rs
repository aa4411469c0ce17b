//! Startup failures.
//!
//! Everything that can go wrong before the event loop starts is fatal and
//! ends the process with a cause-specific exit code. Per-connection problems
//! never show up here; they are resolved by closing the connection.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    /// Bad command line, unreadable or invalid configuration file.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A redirect rule pattern failed to compile.
    #[error("error compiling pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The bind address or port could not be resolved.
    #[error("could not resolve {addr}:{port}: {reason}")]
    Resolve {
        addr: String,
        port: String,
        reason: String,
    },

    /// None of the resolved addresses could be bound.
    #[error("could not bind to {addr}:{port}")]
    Bind {
        addr: String,
        port: String,
        #[source]
        source: Option<io::Error>,
    },

    #[error("can't listen for incoming connections: {0}")]
    Listen(#[source] io::Error),
}

impl SetupError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            SetupError::Config(_) => 1,
            SetupError::Pattern { .. } => 2,
            SetupError::Resolve { .. } => 3,
            SetupError::Bind { .. } => 4,
            SetupError::Listen(_) => 5,
        }
    }
}
