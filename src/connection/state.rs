// src/connection/state.rs

//! The connection state shared between the foreground flow and the
//! background listener.

use parking_lot::Mutex;
use strum_macros::Display;

/// The lifecycle state of a session's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug)]
struct StateInner {
    state: ConnectionState,
    /// Bumped on every connect attempt. A listener only ever acts on the
    /// generation it was started for.
    generation: u64,
}

/// A mutex-guarded cell holding the current [`ConnectionState`].
///
/// Both the listener (on EOF or read failure) and the session (on connect,
/// failed send and disconnect) write to it, so every access goes through the
/// lock.
#[derive(Debug)]
pub struct StateCell {
    inner: Mutex<StateInner>,
}

impl StateCell {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StateInner {
                state: ConnectionState::Disconnected,
                generation: 0,
            }),
        }
    }

    pub fn get(&self) -> ConnectionState {
        self.inner.lock().state
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Returns the state only if it still belongs to `generation`.
    pub fn get_for(&self, generation: u64) -> ConnectionState {
        let inner = self.inner.lock();
        if inner.generation == generation {
            inner.state
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Starts a new connect attempt and returns its generation.
    pub fn begin_connect(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = ConnectionState::Connecting;
        inner.generation
    }

    /// Moves `generation` from `Connecting` to `Connected`. Returns false if
    /// the attempt was superseded or already abandoned.
    pub fn mark_connected(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation || inner.state != ConnectionState::Connecting {
            return false;
        }
        inner.state = ConnectionState::Connected;
        true
    }

    /// Moves `generation` to `Disconnected`. Returns true only for the call
    /// that actually performed the transition.
    pub fn mark_disconnected(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation || inner.state == ConnectionState::Disconnected {
            return false;
        }
        inner.state = ConnectionState::Disconnected;
        true
    }

    /// Forces `Disconnected` regardless of generation and returns the
    /// previous state.
    pub fn reset(&self) -> ConnectionState {
        let mut inner = self.inner.lock();
        std::mem::replace(&mut inner.state, ConnectionState::Disconnected)
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
