//! Fuzz target: blink pattern parsing + sequence stepping.
//!
//! Feeds arbitrary bytes through `BlinkSequence::from_values` and steps
//! the sequence dry, asserting the cursor invariant holds and stepping
//! never panics on malformed patterns or color tokens.
//!
//! cargo fuzz run fuzz_pattern_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use scanlink::blink::BlinkSequence;

fuzz_target!(|data: &[u8]| {
    // Split the input into a pattern half and a color half.
    let mid = data.len() / 2;
    let (pattern, color) = data.split_at(mid);

    let mut seq = BlinkSequence::from_values(pattern, color);
    let len = seq.len();

    let mut steps = 0usize;
    while seq.step().is_some() {
        steps += 1;
        assert!(seq.cursor() <= len, "cursor overran the sequence");
    }

    assert_eq!(steps, len, "sequence must yield exactly len steps");
    assert!(seq.is_finished());
});
