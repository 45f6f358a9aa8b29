// src/core/mod.rs

//! The transport-independent pieces of botlink: the command grammar, the
//! wire protocol and the error types.

pub mod errors;
pub mod grammar;
pub mod protocol;

pub use errors::{FrameError, SessionError};
pub use grammar::{Command, Direction, GrammarError, SpecialCommand, Step};
pub use protocol::ServerMessage;
