// src/connection/manager.rs

//! Opens, writes to and closes the TCP stream behind a session.

use crate::core::protocol::LineCodec;
use crate::core::{FrameError, SessionError};
use futures::SinkExt;
use socket2::SockRef;
use std::io;
use std::net::{Shutdown, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::FramedWrite;
use tracing::debug;

/// The write side of a connection, framing outbound text as lines.
pub type FrameWriter = FramedWrite<OwnedWriteHalf, LineCodec>;

/// A freshly opened stream, split so reads and writes never contend.
#[derive(Debug)]
pub struct Connection {
    pub peer: SocketAddr,
    pub reader: OwnedReadHalf,
    pub writer: FrameWriter,
}

impl Connection {
    fn from_stream(stream: TcpStream, peer: SocketAddr) -> io::Result<Self> {
        // Command frames are tiny; don't let Nagle hold them back.
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            peer,
            reader,
            writer: FramedWrite::new(writer, LineCodec::new()),
        })
    }
}

/// Resolves `host:port` and connects to the first address that accepts.
///
/// There is no timeout unless `timeout` is given; the attempt otherwise
/// lasts as long as the operating system lets it.
pub async fn connect(
    host: &str,
    port: u16,
    timeout: Option<Duration>,
) -> Result<Connection, SessionError> {
    let endpoint = format!("{host}:{port}");
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| SessionError::Resolve {
            endpoint: endpoint.clone(),
            source: Arc::new(e),
        })?
        .collect();
    if addrs.is_empty() {
        return Err(SessionError::Resolve {
            endpoint,
            source: Arc::new(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no resolved addresses",
            )),
        });
    }

    let mut last_error = None;
    for addr in addrs {
        match open_stream(addr, timeout).await {
            Ok(stream) => {
                return Connection::from_stream(stream, addr).map_err(|e| SessionError::Connect {
                    endpoint,
                    source: Arc::new(e),
                });
            }
            Err(e) => {
                debug!("Connect attempt to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(SessionError::Connect {
        endpoint,
        source: Arc::new(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "no address accepted the connection")
        })),
    })
}

async fn open_stream(addr: SocketAddr, timeout: Option<Duration>) -> io::Result<TcpStream> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, TcpStream::connect(addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))?,
        None => TcpStream::connect(addr).await,
    }
}

/// Writes one frame and flushes it. The terminator is appended if missing.
pub async fn write_frame(writer: &mut FrameWriter, frame: &str) -> Result<(), FrameError> {
    writer.send(frame).await
}

/// Shuts the socket down in both directions.
///
/// This is what stops the listener: its pending read returns end-of-stream
/// as soon as the read side is shut. Calling it on a socket the peer already
/// closed may report `NotConnected`, which callers treat as harmless.
pub fn shutdown(writer: &FrameWriter) -> io::Result<()> {
    let stream: &TcpStream = writer.get_ref().as_ref();
    SockRef::from(stream).shutdown(Shutdown::Both)
}
