//! Property tests for the core data structures.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32
//! targets.

#![cfg(not(target_os = "espidf"))]

use proptest::prelude::*;

use scanlink::blink::{parse_pattern, BlinkColor, BlinkSequence, ChannelMask};
use scanlink::config::DeviceConfig;
use scanlink::registry::objects::{self, BIG_PAYLOAD};
use scanlink::transfer::{BlockAssembler, BlockError, BlockMessage, FeedOutcome, OutboundSlicer};

// ── Blink pattern parsing ─────────────────────────────────────

proptest! {
    /// k colons always yield exactly k + 1 durations.
    #[test]
    fn colon_count_yields_token_count(
        tokens in proptest::collection::vec("[0-9a-z]{0,6}", 1..20),
    ) {
        let pattern = tokens.join(":");
        // The empty string is the one exception: zero durations, not one.
        prop_assume!(!pattern.is_empty());
        let durations = parse_pattern(&pattern);
        prop_assert_eq!(durations.len(), tokens.len());
    }

    /// Numeric patterns round-trip exactly.
    #[test]
    fn numeric_patterns_round_trip(values in proptest::collection::vec(0u32..100_000, 1..20)) {
        let pattern = values
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(":");
        prop_assert_eq!(parse_pattern(&pattern), values);
    }

    /// The cursor increases by exactly one per step and the sequence
    /// terminates permanently at the end.
    #[test]
    fn cursor_is_strictly_monotonic(values in proptest::collection::vec(0u32..1000, 0..20)) {
        let pattern = values
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(":");
        let mut seq = BlinkSequence::from_values(pattern.as_bytes(), b"green");

        let mut steps = 0usize;
        let mut last_cursor = seq.cursor();
        while let Some(step) = seq.step() {
            steps += 1;
            prop_assert_eq!(seq.cursor(), last_cursor + 1);
            prop_assert_eq!(step.mask, ChannelMask::B);
            last_cursor = seq.cursor();
        }

        prop_assert_eq!(steps, seq.len());
        prop_assert!(seq.is_finished());
        prop_assert_eq!(seq.step(), None);
    }

    /// Unknown color tokens never toggle any channel.
    #[test]
    fn unknown_colors_are_pure_noops(token in "[a-z]{1,12}") {
        let known = [
            "red", "green", "blue", "cyan", "yellow", "magenta", "white",
        ];
        prop_assume!(!known.contains(&token.as_str()));
        prop_assert!(BlinkColor::parse(token.as_bytes()).channels().is_empty());
    }
}

// ── Block transfer ────────────────────────────────────────────

proptest! {
    /// Any payload delivered in order with a correct size declaration
    /// reassembles byte-exactly.
    #[test]
    fn in_order_blocks_reassemble_exactly(
        payload in proptest::collection::vec(any::<u8>(), 1..2000),
        chunk in 1usize..256,
    ) {
        let mut asm = BlockAssembler::new();
        let chunks: Vec<&[u8]> = payload.chunks(chunk).collect();
        let last = chunks.len() - 1;

        let mut outcome = FeedOutcome::Pending;
        for (i, part) in chunks.iter().enumerate() {
            let message = BlockMessage {
                total_size: payload.len(),
                number: i as u32,
                is_last: i == last,
                error: BlockError::None,
            };
            outcome = asm.feed(&message, part);
            if i != last {
                prop_assert_eq!(&outcome, &FeedOutcome::Pending);
            }
        }
        prop_assert_eq!(outcome, FeedOutcome::Complete(payload));
    }

    /// An error code at any position discards the transfer, and a fresh
    /// transfer afterwards is unaffected.
    #[test]
    fn error_block_always_discards(
        prefix in proptest::collection::vec(any::<u8>(), 0..500),
        error_at in 0u32..8,
    ) {
        let mut asm = BlockAssembler::new();

        // Feed some in-order prefix blocks.
        for i in 0..error_at {
            let message = BlockMessage {
                total_size: 10_000,
                number: i,
                is_last: false,
                error: BlockError::None,
            };
            asm.feed(&message, &prefix);
        }

        let failing = BlockMessage {
            total_size: 10_000,
            number: error_at,
            is_last: false,
            error: BlockError::EntityTooLarge,
        };
        let outcome = asm.feed(&failing, &prefix);
        prop_assert!(matches!(outcome, FeedOutcome::Failed(_)));
        prop_assert!(!asm.is_receiving());

        // Discarded state must not leak into the next transfer.
        let fresh = BlockMessage {
            total_size: 2,
            number: 0,
            is_last: true,
            error: BlockError::None,
        };
        prop_assert_eq!(
            asm.feed(&fresh, b"ok"),
            FeedOutcome::Complete(b"ok".to_vec())
        );
    }

    /// Slicer chunks always concatenate back to the original value.
    #[test]
    fn slicer_chunks_concatenate_to_value(
        value in proptest::collection::vec(any::<u8>(), 0..3000),
        chunk in 16usize..512,
    ) {
        let mut slicer = OutboundSlicer::new(value.clone(), chunk);
        let mut rebuilt = Vec::new();
        let mut number = 0u32;
        loop {
            let (data, more) = slicer.chunk(number).unwrap();
            prop_assert!(data.len() <= chunk);
            rebuilt.extend_from_slice(&data);
            if !more {
                break;
            }
            number += 1;
        }
        prop_assert_eq!(rebuilt, value);
    }
}

// ── Resource registry ─────────────────────────────────────────

proptest! {
    /// getValue(setValue(b)) == b for arbitrary byte sequences.
    #[test]
    fn registry_value_round_trip(value in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut registry = objects::build_registry(&DeviceConfig::default()).unwrap();
        registry.set_value(BIG_PAYLOAD, &value).unwrap();
        prop_assert_eq!(registry.value(BIG_PAYLOAD).unwrap(), &value[..]);
    }
}
