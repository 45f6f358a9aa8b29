// src/core/protocol/mod.rs

//! The newline-delimited text protocol spoken with the robot server.

pub mod line_frame;
pub mod server_message;
pub use line_frame::{DEFAULT_MAX_LINE_LENGTH, LINE_TERMINATOR, LineCodec};
pub use server_message::{MessageKind, ServerMessage};
