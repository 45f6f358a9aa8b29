// tests/property/grammar_test.rs

//! Property-based tests for the command grammar.

use botlink::core::grammar::{Command, parse, validate};
use proptest::prelude::*;

/// One well-formed movement segment, in any letter case.
fn segment() -> impl Strategy<Value = String> {
    ("[0-9]{1,6}", proptest::option::of("[0-9]{1,4}"), "[FBLRfblr]").prop_map(
        |(int, frac, dir)| match frac {
            Some(frac) => format!("{int}.{frac}{dir}"),
            None => format!("{int}{dir}"),
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_well_formed_sequences_validate(
        segments in proptest::collection::vec(segment(), 1..8),
        trailing in proptest::bool::ANY,
    ) {
        let mut text = segments.join(";");
        if trailing {
            text.push(';');
        }
        prop_assert!(validate(&text));

        let Command::Movement(steps) = parse(&text).unwrap() else {
            return Err(TestCaseError::fail("expected a movement"));
        };
        prop_assert_eq!(steps.len(), segments.len());
    }

    #[test]
    fn test_canonical_frame_is_stable(segments in proptest::collection::vec(segment(), 1..8)) {
        let command = parse(&segments.join(" ; ")).unwrap();
        let frame = command.to_frame();
        prop_assert!(!frame.contains(' '));
        prop_assert_eq!(frame.to_uppercase(), frame.clone());
        prop_assert_eq!(parse(&frame).unwrap(), command);
    }

    #[test]
    fn test_negative_magnitudes_are_rejected(segment in segment()) {
        let negative = format!("-{}", segment);
        prop_assert!(!validate(&negative));
    }

    #[test]
    fn test_other_letters_are_rejected(
        int in "[0-9]{1,6}",
        letter in "[A-Za-z]".prop_filter("not a direction", |l| !"FBLRfblr".contains(l.as_str())),
    ) {
        let text = format!("{int}{letter}");
        prop_assert!(!validate(&text));
    }

    #[test]
    fn test_parse_never_panics(text in "\\PC{0,64}") {
        let _ = parse(&text);
    }

    #[test]
    fn test_validate_agrees_with_parse(text in "[0-9FBLRfblr;. -]{0,24}") {
        prop_assert_eq!(validate(&text), parse(&text).is_ok());
    }
}
