//! Block transfer engine for oversized resource values.
//!
//! Payloads too large for a single message arrive as an ordered sequence of
//! bounded-size blocks, each tagged with a block number, a last-block flag,
//! an error code, and the declared total message size:
//!
//! ```text
//! Block 0: [num=0,            size=N]  payload part 1   IDLE → RECEIVING
//! Block 1: [num=1,            size=N]  payload part 2   RECEIVING
//! Block k: [num=k, last=true, size=N]  payload part k+1 RECEIVING → COMPLETE
//! ```
//!
//! The [`BlockAssembler`] reassembles inbound sequences and verifies the
//! declared size; the [`OutboundSlicer`] serves a stored value back out in
//! chunks.  Any error code, out-of-order block, or size mismatch discards
//! the accumulated state — a partial payload is never surfaced as complete.

use log::warn;

use crate::error::TransferError;

// ── Wire-level block metadata ─────────────────────────────────

/// Error code carried by an inbound block message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockError {
    #[default]
    None,
    /// The peer rejected the transfer as exceeding its limits.
    EntityTooLarge,
    /// Any other collaborator-reported failure.
    Other,
}

/// Metadata of one inbound block.  One instance per chunk event, consumed
/// synchronously by [`BlockAssembler::feed`] and not retained.
#[derive(Debug, Clone, Copy)]
pub struct BlockMessage {
    /// Declared size of the complete logical payload, in bytes.
    pub total_size: usize,
    /// 0-based block number, monotonically increasing within one transfer.
    pub number: u32,
    /// True on the final block of the transfer.
    pub is_last: bool,
    pub error: BlockError,
}

// ── Inbound reassembly ────────────────────────────────────────

/// Result of feeding one block into the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// More blocks expected.
    Pending,
    /// Transfer finished; the reassembled payload matches the declared size.
    Complete(Vec<u8>),
    /// Transfer failed; all accumulated bytes were discarded.
    Failed(TransferError),
}

#[derive(Debug)]
enum Phase {
    Idle,
    Receiving { next: u32, buffer: Vec<u8> },
}

/// Reassembly state machine: `IDLE → RECEIVING → {COMPLETE, FAILED}`.
///
/// `COMPLETE`/`FAILED` are momentary — the assembler returns to `IDLE`
/// after reporting either, ready for the next transfer.
pub struct BlockAssembler {
    phase: Phase,
}

impl BlockAssembler {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Feed one block.  Block number 0 starts a transfer; a block 0 while
    /// receiving restarts it, discarding the partial buffer.
    pub fn feed(&mut self, message: &BlockMessage, payload: &[u8]) -> FeedOutcome {
        if message.error != BlockError::None {
            self.reset();
            return FeedOutcome::Failed(TransferError::PeerError);
        }

        if message.number == 0 {
            if let Phase::Receiving { buffer, .. } = &self.phase {
                warn!(
                    "block 0 during active transfer — discarding {} buffered bytes",
                    buffer.len()
                );
            }
            self.phase = Phase::Receiving {
                next: 0,
                buffer: Vec::with_capacity(message.total_size),
            };
        }

        let (next, buffer) = match &mut self.phase {
            Phase::Idle => {
                // Non-initial block with no transfer in progress.
                return FeedOutcome::Failed(TransferError::NoTransferActive);
            }
            Phase::Receiving { next, buffer } => (next, buffer),
        };

        if message.number != *next {
            let expected = *next;
            self.reset();
            return FeedOutcome::Failed(TransferError::OutOfOrder {
                expected,
                got: message.number,
            });
        }

        buffer.extend_from_slice(payload);
        *next += 1;

        if !message.is_last {
            return FeedOutcome::Pending;
        }

        let buffer = match core::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Receiving { buffer, .. } => buffer,
            Phase::Idle => unreachable!("last block handled while receiving"),
        };

        if buffer.len() != message.total_size {
            return FeedOutcome::Failed(TransferError::SizeMismatch {
                declared: message.total_size,
                actual: buffer.len(),
            });
        }

        FeedOutcome::Complete(buffer)
    }

    /// Whether a transfer is in progress.
    pub fn is_receiving(&self) -> bool {
        matches!(self.phase, Phase::Receiving { .. })
    }

    /// Discard any partial transfer.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }
}

impl Default for BlockAssembler {
    fn default() -> Self {
        Self::new()
    }
}

// ── Outbound slicing ──────────────────────────────────────────

/// Serves a snapshot of a resource value in `chunk_bytes` slices.
///
/// Created on the first (number 0) outbound block request; chunk requests
/// must arrive in order.  An empty value is answered with a single
/// zero-length chunk — the response is always populated.
pub struct OutboundSlicer {
    data: Vec<u8>,
    chunk_bytes: usize,
    next: u32,
}

impl OutboundSlicer {
    pub fn new(data: Vec<u8>, chunk_bytes: usize) -> Self {
        Self {
            data,
            chunk_bytes: chunk_bytes.max(1),
            next: 0,
        }
    }

    /// Total number of chunks this value will produce (at least one).
    pub fn total_chunks(&self) -> usize {
        if self.data.is_empty() {
            1
        } else {
            self.data.len().div_ceil(self.chunk_bytes)
        }
    }

    /// Produce chunk `number`.  Returns the chunk bytes and whether more
    /// chunks follow.
    pub fn chunk(&mut self, number: u32) -> Result<(Vec<u8>, bool), TransferError> {
        if number != self.next {
            return Err(TransferError::BadChunkRequest);
        }
        self.next += 1;

        let start = number as usize * self.chunk_bytes;
        let end = (start + self.chunk_bytes).min(self.data.len());
        let slice = if start >= self.data.len() {
            // Empty value: a zero-length final chunk rather than an
            // unpopulated response.
            Vec::new()
        } else {
            self.data[start..end].to_vec()
        };
        let more = end < self.data.len();
        Ok((slice, more))
    }
}

// ── Tests ────────────────────────────────────────────────────
