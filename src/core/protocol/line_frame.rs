// src/core/protocol/line_frame.rs

//! Implements the newline-terminated frame format and the corresponding
//! `Encoder` and `Decoder` for network communication.

use crate::core::FrameError;
use crate::core::protocol::ServerMessage;
use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// The single byte that terminates every frame in both directions.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Upper bound on a buffered inbound line, so a peer that never sends a
/// terminator cannot grow the read buffer without limit.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// A `tokio_util::codec` implementation for newline-delimited UTF-8 text.
///
/// Decoding yields one [`ServerMessage`] per complete, non-blank line. Bytes
/// that are not valid UTF-8 are replaced rather than rejected. A partial line
/// stays in the buffer until its terminator arrives.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Offset up to which the buffer has already been searched for a
    /// terminator, so each byte is scanned once however the line is split
    /// across reads.
    next_index: usize,
    max_length: usize,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            next_index: 0,
            max_length,
        }
    }

    /// Splits one terminated line off `src` and decodes it. Returns `None` if
    /// it was blank after trimming.
    fn take_line(&mut self, src: &mut BytesMut, len: usize) -> Option<ServerMessage> {
        let line = src.split_to(len);
        self.next_index = 0;
        decode_text(&line)
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: AsRef<str>> Encoder<T> for LineCodec {
    type Error = FrameError;

    /// Writes `item` followed by the terminator. A terminator already present
    /// at the end is not doubled; one anywhere else would split the frame in
    /// two and is rejected.
    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let text = item.as_ref();
        let body = text
            .strip_suffix(LINE_TERMINATOR as char)
            .unwrap_or(text);
        if body.as_bytes().contains(&LINE_TERMINATOR) {
            return Err(FrameError::EmbeddedTerminator);
        }

        dst.reserve(body.len() + 1);
        dst.extend_from_slice(body.as_bytes());
        dst.extend_from_slice(&[LINE_TERMINATOR]);
        Ok(())
    }
}

impl Decoder for LineCodec {
    type Item = ServerMessage;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let search_from = self.next_index.min(src.len());
            let Some(offset) = src[search_from..]
                .iter()
                .position(|b| *b == LINE_TERMINATOR)
            else {
                if src.len() > self.max_length {
                    return Err(FrameError::LineTooLong(self.max_length));
                }
                self.next_index = src.len();
                return Ok(None);
            };

            let line_end = search_from + offset + 1;
            if line_end - 1 > self.max_length {
                return Err(FrameError::LineTooLong(self.max_length));
            }
            // Blank lines are consumed silently; keep looking for the next one.
            if let Some(message) = self.take_line(src, line_end) {
                return Ok(Some(message));
            }
        }
    }

    /// At end of stream any complete lines are drained first, then a final
    /// unterminated remainder is emitted as one last line.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let remainder = src.len();
        let message = decode_text(&src[..remainder]);
        src.advance(remainder);
        self.next_index = 0;
        Ok(message)
    }
}

fn decode_text(raw: &[u8]) -> Option<ServerMessage> {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(ServerMessage::new(trimmed))
    }
}
