// src/lib.rs

pub mod config;
pub mod connection;
pub mod console;
pub mod core;

// Re-export
pub use crate::connection::{ConnectionState, Session, SessionOptions};
pub use crate::core::grammar::{parse, validate};
