// src/connection/listener.rs

//! The background task that surfaces everything the server sends.

use super::state::StateCell;
use crate::core::FrameError;
use crate::core::protocol::{LineCodec, ServerMessage};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

/// The caller-registered channel that receives server lines.
pub type MessageSink = mpsc::UnboundedSender<ServerMessage>;

/// Why a listener loop ended. Both outcomes are normal termination.
#[derive(Debug)]
pub enum ListenerExit {
    /// The stream reached end-of-file: the peer closed it, or the session
    /// shut the socket down.
    Eof,
    /// A read or framing error ended the stream.
    Failed(FrameError),
}

impl fmt::Display for ListenerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerExit::Eof => f.write_str("end of stream"),
            ListenerExit::Failed(e) => write!(f, "{e}"),
        }
    }
}

/// Reads lines from one connection and forwards them, in arrival order, to
/// the session's sink until the stream ends.
pub struct InboundListener<R> {
    framed: FramedRead<R, LineCodec>,
    sink: MessageSink,
    state: Arc<StateCell>,
    generation: u64,
    peer: String,
}

impl<R> InboundListener<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(
        reader: R,
        codec: LineCodec,
        read_buffer_size: usize,
        sink: MessageSink,
        state: Arc<StateCell>,
        generation: u64,
        peer: impl Into<String>,
    ) -> Self {
        Self {
            framed: FramedRead::with_capacity(reader, codec, read_buffer_size),
            sink,
            state,
            generation,
            peer: peer.into(),
        }
    }

    pub fn spawn(self) -> JoinHandle<ListenerExit> {
        tokio::spawn(self.run())
    }

    /// The listener loop. Once it ends, the connection generation it was
    /// started for is marked disconnected.
    pub async fn run(mut self) -> ListenerExit {
        let mut sink_open = true;
        let exit = loop {
            match self.framed.next().await {
                Some(Ok(message)) => {
                    debug!("Received from {}: {}", self.peer, message);
                    // A dropped receiver only means nobody is watching; the
                    // connection itself stays usable for sending.
                    if sink_open && self.sink.send(message).is_err() {
                        debug!("Message sink for {} closed; discarding further lines", self.peer);
                        sink_open = false;
                    }
                }
                Some(Err(e)) => {
                    warn!("Read from {} failed: {}", self.peer, e);
                    break ListenerExit::Failed(e);
                }
                None => break ListenerExit::Eof,
            }
        };

        if self.state.mark_disconnected(self.generation) {
            info!("Connection to {} closed ({})", self.peer, exit);
        }
        exit
    }
}
