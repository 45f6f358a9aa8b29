// tests/property/line_frame_test.rs

//! Property-based tests for line reassembly.

use botlink::core::protocol::LineCodec;
use bytes::BytesMut;
use proptest::prelude::*;
use tokio_util::codec::Decoder;

proptest! {
    #[test]
    fn test_lines_survive_any_chunking(
        lines in proptest::collection::vec("[a-zA-Z0-9:=(), ]{0,40}", 1..20),
        cuts in proptest::collection::vec(1usize..16, 0..40),
    ) {
        let stream: Vec<u8> = lines.iter().flat_map(|l| format!("{l}\n").into_bytes()).collect();
        let expected: Vec<String> = lines
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        let mut decoded = Vec::new();
        let mut rest = &stream[..];
        let mut cuts = cuts.into_iter();
        while !rest.is_empty() {
            let take = cuts.next().unwrap_or(rest.len()).min(rest.len());
            let (chunk, tail) = rest.split_at(take);
            rest = tail;
            buf.extend_from_slice(chunk);
            while let Some(message) = codec.decode(&mut buf).unwrap() {
                decoded.push(message.into_text());
            }
        }

        prop_assert!(buf.is_empty());
        prop_assert_eq!(decoded, expected);
    }
}
