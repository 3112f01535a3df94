//! Fuzz target: block assembler state machine.
//!
//! Feeds arbitrary block sequences (numbers, flags, error codes, payloads)
//! into `BlockAssembler::feed` and asserts it never panics and never
//! surfaces a completed payload whose length disagrees with the declared
//! total size.
//!
//! cargo fuzz run fuzz_block_assembler

#![no_main]

use libfuzzer_sys::fuzz_target;
use scanlink::transfer::{BlockAssembler, BlockError, BlockMessage, FeedOutcome};

fuzz_target!(|data: &[u8]| {
    let mut asm = BlockAssembler::new();

    // Interpret the input as a sequence of (header, payload) records.
    let mut rest = data;
    while rest.len() >= 4 {
        let (header, tail) = rest.split_at(4);
        let payload_len = (header[3] as usize).min(tail.len());
        let (payload, tail) = tail.split_at(payload_len);
        rest = tail;

        let message = BlockMessage {
            total_size: header[0] as usize,
            number: u32::from(header[1] & 0x07),
            is_last: header[2] & 1 != 0,
            error: match header[2] >> 1 & 0x03 {
                0 => BlockError::None,
                1 => BlockError::EntityTooLarge,
                _ => BlockError::Other,
            },
        };

        if let FeedOutcome::Complete(done) = asm.feed(&message, payload) {
            assert_eq!(
                done.len(),
                message.total_size,
                "completed payload must match the declared size"
            );
        }
    }
});
