// tests/integration/listener_test.rs

//! Tests for `InboundListener` over scripted in-memory streams.

use botlink::connection::{ConnectionState, InboundListener, ListenerExit, StateCell};
use botlink::core::protocol::LineCodec;
use botlink::core::{FrameError, ServerMessage};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_test::io::Builder;

fn connected_state() -> (Arc<StateCell>, u64) {
    let state = Arc::new(StateCell::new());
    let generation = state.begin_connect();
    assert!(state.mark_connected(generation));
    (state, generation)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Ok(message) = rx.try_recv() {
        lines.push(message.into_text());
    }
    lines
}

#[tokio::test]
async fn test_partial_line_is_emitted_once() {
    let reader = Builder::new().read(b"po").read(b"sition: 5\n").build();
    let (state, generation) = connected_state();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let listener =
        InboundListener::new(reader, LineCodec::new(), 1024, tx, state.clone(), generation, "mock");
    let exit = listener.run().await;

    assert!(matches!(exit, ListenerExit::Eof));
    assert_eq!(drain(&mut rx), vec!["position: 5"]);
    assert_eq!(state.get(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_lines_are_delivered_in_order_across_reads() {
    let reader = Builder::new()
        .read(b"one\ntw")
        .read(b"o\r\n\n   \nthree\nfo")
        .read(b"ur\n")
        .build();
    let (state, generation) = connected_state();
    let (tx, mut rx) = mpsc::unbounded_channel();

    InboundListener::new(reader, LineCodec::new(), 4, tx, state, generation, "mock")
        .run()
        .await;

    assert_eq!(drain(&mut rx), vec!["one", "two", "three", "four"]);
}

#[tokio::test]
async fn test_invalid_utf8_is_replaced_not_fatal() {
    let reader = Builder::new().read(b"temp \xff\xfe ok\nnext\n").build();
    let (state, generation) = connected_state();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let exit = InboundListener::new(reader, LineCodec::new(), 1024, tx, state, generation, "mock")
        .run()
        .await;

    assert!(matches!(exit, ListenerExit::Eof));
    assert_eq!(drain(&mut rx), vec!["temp \u{fffd}\u{fffd} ok", "next"]);
}

#[tokio::test]
async fn test_read_error_ends_loop_and_disconnects() {
    let reader = Builder::new()
        .read(b"OK: moving\n")
        .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        .build();
    let (state, generation) = connected_state();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let exit = InboundListener::new(reader, LineCodec::new(), 1024, tx, state.clone(), generation, "mock")
        .run()
        .await;

    assert!(matches!(exit, ListenerExit::Failed(FrameError::Io(_))));
    assert_eq!(drain(&mut rx), vec!["OK: moving"]);
    assert_eq!(state.get(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_unterminated_tail_is_flushed_at_eof() {
    let reader = Builder::new().read(b"first\nlast words").build();
    let (state, generation) = connected_state();
    let (tx, mut rx) = mpsc::unbounded_channel();

    InboundListener::new(reader, LineCodec::new(), 1024, tx, state, generation, "mock")
        .run()
        .await;

    assert_eq!(drain(&mut rx), vec!["first", "last words"]);
}

#[tokio::test]
async fn test_overlong_line_ends_loop() {
    let reader = Builder::new().read(&[b'x'; 64]).build();
    let (state, generation) = connected_state();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let exit = InboundListener::new(
        reader,
        LineCodec::with_max_length(16),
        1024,
        tx,
        state.clone(),
        generation,
        "mock",
    )
    .run()
    .await;

    assert!(matches!(exit, ListenerExit::Failed(FrameError::LineTooLong(16))));
    assert!(drain(&mut rx).is_empty());
    assert_eq!(state.get(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_dropped_sink_does_not_stop_reading() {
    let reader = Builder::new().read(b"a\n").read(b"b\n").read(b"c\n").build();
    let (state, generation) = connected_state();
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);

    // The mock panics on drop if any scripted read is left unconsumed.
    let exit = InboundListener::new(reader, LineCodec::new(), 1024, tx, state.clone(), generation, "mock")
        .run()
        .await;

    assert!(matches!(exit, ListenerExit::Eof));
    assert_eq!(state.get(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_stale_listener_leaves_newer_connection_alone() {
    let reader = Builder::new().read(b"late\n").build();
    let state = Arc::new(StateCell::new());
    let old_generation = state.begin_connect();
    state.mark_connected(old_generation);

    let new_generation = state.begin_connect();
    state.mark_connected(new_generation);

    let (tx, _rx) = mpsc::unbounded_channel();
    InboundListener::new(reader, LineCodec::new(), 1024, tx, state.clone(), old_generation, "mock")
        .run()
        .await;

    assert_eq!(state.get(), ConnectionState::Connected);
    assert_eq!(state.generation(), new_generation);
}
