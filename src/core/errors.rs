// src/core/errors.rs

//! Defines the error types shared by the session engine.

use std::sync::Arc;
use thiserror::Error;

use super::grammar::GrammarError;

/// Everything that can go wrong while driving a robot session.
///
/// `std::io::Error` is not cloneable, so I/O causes are kept behind an `Arc`
/// to let callers store and re-report errors freely.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        source: Arc<std::io::Error>,
    },

    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        source: Arc<std::io::Error>,
    },

    #[error("session is already connected to {0}")]
    AlreadyConnected(String),

    #[error("not connected to the server")]
    NotConnected,

    #[error("invalid command: {0}")]
    InvalidCommand(#[from] GrammarError),

    #[error("failed to send command: {0}")]
    SendFailed(Arc<std::io::Error>),

    #[error("invalid frame: {0}")]
    Frame(String),
}

impl SessionError {
    /// True for failures that ended (or never started) the connection.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::Resolve { .. } | SessionError::Connect { .. } | SessionError::SendFailed(_)
        )
    }
}

/// Failures produced by the newline frame codec.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line exceeds the maximum length of {0} bytes")]
    LineTooLong(usize),

    #[error("frame contains an embedded line terminator")]
    EmbeddedTerminator,
}

impl From<FrameError> for SessionError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Io(io) => SessionError::SendFailed(Arc::new(io)),
            other => SessionError::Frame(other.to_string()),
        }
    }
}
