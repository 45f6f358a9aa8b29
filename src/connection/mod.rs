// src/connection/mod.rs

//! Manages the lifecycle of the client's TCP connection: opening it, the
//! background listener for server lines, and the session façade that sends
//! commands.

// Declare the sub-modules of the `connection` module.
pub mod listener;
pub mod manager;
mod options;
mod session;
pub mod state;

// Re-export the primary types so callers don't need to know the file layout.
pub use listener::{InboundListener, ListenerExit, MessageSink};
pub use options::{DEFAULT_READ_BUFFER_SIZE, DEFAULT_SHUTDOWN_GRACE, SessionOptions};
pub use session::Session;
pub use state::{ConnectionState, StateCell};
