// src/core/protocol/server_message.rs

//! Lines received from the server.

use std::fmt;

/// A best-effort classification of a server line based on the prefixes the
/// simulator conventionally uses. The client never relies on it for
/// protocol decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// `OK: ...`
    Ok,
    /// `ERROR: ...`
    Error,
    /// `INFO: ...`
    Info,
    /// `STATUS: ...`
    Status,
    Other,
}

/// One complete, trimmed, non-empty line sent by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerMessage {
    kind: MessageKind,
    text: String,
}

impl ServerMessage {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind: classify(&text),
            text,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// The line exactly as the server sent it, minus the terminator and
    /// surrounding whitespace.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<str> for ServerMessage {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for ServerMessage {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

fn classify(text: &str) -> MessageKind {
    const PREFIXES: [(&str, MessageKind); 4] = [
        ("OK:", MessageKind::Ok),
        ("ERROR:", MessageKind::Error),
        ("INFO:", MessageKind::Info),
        ("STATUS:", MessageKind::Status),
    ];

    PREFIXES
        .iter()
        .find(|(prefix, _)| {
            text.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .map(|(_, kind)| *kind)
        .unwrap_or(MessageKind::Other)
}
