// src/connection/session.rs

//! Defines `Session`, the entry point for driving a robot over one
//! connection: connect, send commands, disconnect.

use super::listener::{InboundListener, ListenerExit, MessageSink};
use super::manager::{self, FrameWriter};
use super::options::SessionOptions;
use super::state::{ConnectionState, StateCell};
use crate::core::grammar::{self, Command};
use crate::core::protocol::LineCodec;
use crate::core::{FrameError, SessionError};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Everything that exists only while a connection is open.
struct Link {
    peer: SocketAddr,
    generation: u64,
    writer: FrameWriter,
    listener: JoinHandle<ListenerExit>,
}

/// A remote-control session with a robot server.
///
/// All methods take `&self`, so a session can be shared between the task
/// issuing commands and one that eventually tears it down. Server lines are
/// delivered to the sink given at construction, from a background listener
/// that runs for as long as the connection is open.
pub struct Session {
    state: Arc<StateCell>,
    /// Serialises writers, so frames are never interleaved on the wire.
    link: Mutex<Option<Link>>,
    sink: MessageSink,
    options: SessionOptions,
}

impl Session {
    /// Creates a disconnected session that will deliver server lines to `sink`.
    pub fn new(sink: MessageSink) -> Self {
        Self::with_options(sink, SessionOptions::default())
    }

    pub fn with_options(sink: MessageSink, options: SessionOptions) -> Self {
        Self {
            state: Arc::new(StateCell::new()),
            link: Mutex::new(None),
            sink,
            options,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// The server address, while a connection is held.
    pub async fn peer_addr(&self) -> Option<SocketAddr> {
        self.link.lock().await.as_ref().map(|link| link.peer)
    }

    /// Opens the connection and starts the listener.
    ///
    /// A session holds at most one connection. Connecting while connected
    /// fails with [`SessionError::AlreadyConnected`]; a connection that was
    /// lost since the last call is cleaned up first.
    pub async fn connect(&self, host: &str, port: u16) -> Result<SocketAddr, SessionError> {
        let mut guard = self.link.lock().await;
        if let Some(link) = guard.as_ref()
            && self.state.get_for(link.generation) == ConnectionState::Connected
        {
            return Err(SessionError::AlreadyConnected(link.peer.to_string()));
        }
        if let Some(stale) = guard.take() {
            self.teardown(stale).await;
        }

        let generation = self.state.begin_connect();
        info!("Connecting to {}:{}", host, port);
        let connection = match manager::connect(host, port, self.options.connect_timeout).await {
            Ok(connection) => connection,
            Err(e) => {
                self.state.mark_disconnected(generation);
                warn!("{}", e);
                return Err(e);
            }
        };

        // Connected must be visible before the listener can observe EOF,
        // otherwise an immediately closing peer would leave us "Connected".
        if !self.state.mark_connected(generation) {
            warn!("Connection to {} superseded before it was established", connection.peer);
            if let Err(e) = manager::shutdown(&connection.writer) {
                debug!("Shutdown of {} reported: {}", connection.peer, e);
            }
            return Err(SessionError::NotConnected);
        }
        let peer = connection.peer;
        let listener = InboundListener::new(
            connection.reader,
            LineCodec::with_max_length(self.options.max_line_length),
            self.options.read_buffer_size,
            self.sink.clone(),
            self.state.clone(),
            generation,
            peer.to_string(),
        )
        .spawn();

        *guard = Some(Link {
            peer,
            generation,
            writer: connection.writer,
            listener,
        });
        info!("Connected to {}", peer);
        Ok(peer)
    }

    /// Validates `text` and sends it as one frame.
    ///
    /// Fails with [`SessionError::NotConnected`] before looking at the text
    /// when there is no live connection, and with
    /// [`SessionError::InvalidCommand`] without touching the session when the
    /// text does not parse.
    pub async fn send(&self, text: &str) -> Result<(), SessionError> {
        self.ensure_connected()?;
        let command = grammar::parse(text)?;
        self.send_command(&command).await
    }

    /// Sends an already parsed command in its canonical wire form.
    ///
    /// A write error is terminal for the connection: the session becomes
    /// `Disconnected` and the error is returned as
    /// [`SessionError::SendFailed`]. Nothing is retried.
    pub async fn send_command(&self, command: &Command) -> Result<(), SessionError> {
        self.ensure_connected()?;
        let frame = command.to_frame();

        let mut guard = self.link.lock().await;
        let Some(link) = guard.as_mut() else {
            return Err(SessionError::NotConnected);
        };
        // The listener may have seen EOF while we waited for the lock.
        if self.state.get_for(link.generation) != ConnectionState::Connected {
            return Err(SessionError::NotConnected);
        }

        match manager::write_frame(&mut link.writer, &frame).await {
            Ok(()) => {
                debug!("Sent to {}: {}", link.peer, frame);
                Ok(())
            }
            Err(FrameError::Io(e)) => {
                warn!("Send to {} failed: {}", link.peer, e);
                self.state.mark_disconnected(link.generation);
                if let Some(dead) = guard.take() {
                    self.teardown(dead).await;
                }
                Err(SessionError::SendFailed(Arc::new(e)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Closes the connection and stops the listener.
    ///
    /// Idempotent: with no connection (or one the server already closed)
    /// this just leaves the session `Disconnected`.
    pub async fn disconnect(&self) {
        // Reset under the lock so an in-flight connect cannot slip in between.
        let mut guard = self.link.lock().await;
        let link = guard.take();
        self.state.reset();
        drop(guard);
        match link {
            Some(link) => {
                let peer = link.peer;
                self.teardown(link).await;
                info!("Disconnected from {}", peer);
            }
            None => debug!("disconnect called without an open connection"),
        }
    }

    fn ensure_connected(&self) -> Result<(), SessionError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(SessionError::NotConnected)
        }
    }

    /// Shuts the socket down, then gives the listener `shutdown_grace` to
    /// notice before aborting it.
    async fn teardown(&self, link: Link) {
        let Link {
            peer,
            writer,
            mut listener,
            ..
        } = link;

        if let Err(e) = manager::shutdown(&writer) {
            debug!("Shutdown of {} reported: {}", peer, e);
        }

        match tokio::time::timeout(self.options.shutdown_grace, &mut listener).await {
            Ok(Ok(exit)) => debug!("Listener for {} stopped: {}", peer, exit),
            Ok(Err(e)) => warn!("Listener for {} ended abnormally: {}", peer, e),
            Err(_) => {
                warn!(
                    "Listener for {} did not stop within {:?}; aborting it",
                    peer, self.options.shutdown_grace
                );
                listener.abort();
            }
        }
        drop(writer);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(link) = self.link.get_mut().take() {
            link.listener.abort();
        }
    }
}
