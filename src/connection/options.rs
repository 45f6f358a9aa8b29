// src/connection/options.rs

//! Tunables for a [`Session`](super::Session).

use crate::config::Config;
use crate::core::protocol::DEFAULT_MAX_LINE_LENGTH;
use std::time::Duration;

/// Size of each read the listener performs on the socket.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// How long `disconnect` waits for the listener before aborting it.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// `None` leaves connect attempts to the operating system's own timeout.
    pub connect_timeout: Option<Duration>,
    pub shutdown_grace: Duration,
    pub read_buffer_size: usize,
    pub max_line_length: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            shutdown_grace: config.shutdown_grace,
            read_buffer_size: config.read_buffer_size,
            max_line_length: config.max_line_length,
        }
    }
}
