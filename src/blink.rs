//! Blink sequencer: pattern parsing and channel mapping.
//!
//! The server writes a colon-delimited duration string into the pattern
//! resource and a color token into the color resource, then POSTs to the
//! blink resource.  The service builds a [`BlinkSequence`] from the two
//! values and steps it to completion; each step toggles the mapped channel
//! subset and then suspends for the duration under the cursor.
//!
//! ## Channel mapping
//!
//! | Token     | Channels | Token     | Channels |
//! |-----------|----------|-----------|----------|
//! | `red`     | A        | `cyan`    | B + C    |
//! | `green`   | B        | `yellow`  | A + B    |
//! | `blue`    | C        | `magenta` | A + C    |
//! | `white`   | A + B + C| *other*   | none     |
//!
//! An unrecognized token degrades to a no-op mask: the delays still run,
//! but no channel is toggled.  Non-numeric duration tokens convert to 0
//! (a zero-delay step) — the lenient-conversion quirk is part of the
//! pattern contract, not corrected here.

// ── Channel mask ──────────────────────────────────────────────

/// Subset of the three blink output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const NONE: Self = Self(0);
    pub const A: Self = Self(0b001);
    pub const B: Self = Self(0b010);
    pub const C: Self = Self(0b100);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, channel: Self) -> bool {
        self.0 & channel.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

// ── Color tokens ──────────────────────────────────────────────

/// Color selector parsed from the color resource value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkColor {
    Red,
    Green,
    Blue,
    Cyan,
    Yellow,
    Magenta,
    White,
    /// Unrecognized token — all steps are pure no-ops.
    NoOp,
}

impl BlinkColor {
    /// Parse a color token.  Anything outside the fixed set is `NoOp`.
    pub fn parse(token: &[u8]) -> Self {
        match token {
            b"red" => Self::Red,
            b"green" => Self::Green,
            b"blue" => Self::Blue,
            b"cyan" => Self::Cyan,
            b"yellow" => Self::Yellow,
            b"magenta" => Self::Magenta,
            b"white" => Self::White,
            _ => Self::NoOp,
        }
    }

    /// The channel subset this color toggles.
    pub const fn channels(self) -> ChannelMask {
        match self {
            Self::Red => ChannelMask::A,
            Self::Green => ChannelMask::B,
            Self::Blue => ChannelMask::C,
            Self::Cyan => ChannelMask::B.union(ChannelMask::C),
            Self::Yellow => ChannelMask::A.union(ChannelMask::B),
            Self::Magenta => ChannelMask::A.union(ChannelMask::C),
            Self::White => ChannelMask::A.union(ChannelMask::B).union(ChannelMask::C),
            Self::NoOp => ChannelMask::NONE,
        }
    }
}

// ── Pattern parsing ───────────────────────────────────────────

/// Parse a colon-delimited duration string into milliseconds.
///
/// `k` colons yield exactly `k + 1` durations; the empty string yields an
/// empty sequence.  Malformed tokens convert to 0.
pub fn parse_pattern(pattern: &str) -> Vec<u32> {
    if pattern.is_empty() {
        return Vec::new();
    }
    pattern
        .split(':')
        .map(|token| token.parse::<u32>().unwrap_or(0))
        .collect()
}

// ── Sequence state ────────────────────────────────────────────

/// One toggle-and-wait step of a blink sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkStep {
    pub mask: ChannelMask,
    pub delay_ms: u32,
}

/// Explicit blink state: durations, position cursor, color mask.
///
/// Built fresh on every execute request and advanced iteratively by the
/// caller; the sequence owns its buffer and is simply dropped when the
/// cursor reaches the end.  Invariant: `cursor <= len` at all times.
#[derive(Debug, Clone)]
pub struct BlinkSequence {
    durations: Vec<u32>,
    cursor: usize,
    color: BlinkColor,
}

impl BlinkSequence {
    /// Build a sequence from the pattern and color resource values.
    pub fn from_values(pattern: &[u8], color_token: &[u8]) -> Self {
        let pattern = core::str::from_utf8(pattern).unwrap_or("");
        Self {
            durations: parse_pattern(pattern),
            cursor: 0,
            color: BlinkColor::parse(color_token),
        }
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn color(&self) -> BlinkColor {
        self.color
    }

    /// Whether the cursor has reached the end of the sequence.
    pub fn is_finished(&self) -> bool {
        self.cursor == self.durations.len()
    }

    /// Advance by one step.  Returns the toggle mask and the delay to
    /// suspend for, or `None` once the sequence has terminated.
    pub fn step(&mut self) -> Option<BlinkStep> {
        let delay_ms = *self.durations.get(self.cursor)?;
        self.cursor += 1;
        Some(BlinkStep {
            mask: self.color.channels(),
            delay_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colon_count_determines_duration_count() {
        assert_eq!(parse_pattern("500"), vec![500]);
        assert_eq!(parse_pattern("500:200:500"), vec![500, 200, 500]);
        assert_eq!(parse_pattern("1:2:3:4:5").len(), 5);
    }

    #[test]
    fn empty_pattern_is_empty_sequence() {
        assert!(parse_pattern("").is_empty());
        let mut seq = BlinkSequence::from_values(b"", b"red");
        assert!(seq.is_finished());
        assert_eq!(seq.step(), None);
    }

    #[test]
    fn malformed_tokens_convert_to_zero() {
        assert_eq!(parse_pattern("500:abc:200"), vec![500, 0, 200]);
        assert_eq!(parse_pattern(":"), vec![0, 0]);
        assert_eq!(parse_pattern("500ms"), vec![0]);
    }

    #[test]
    fn color_channel_mapping() {
        assert_eq!(BlinkColor::parse(b"red").channels(), ChannelMask::A);
        assert_eq!(BlinkColor::parse(b"green").channels(), ChannelMask::B);
        assert_eq!(BlinkColor::parse(b"blue").channels(), ChannelMask::C);
        assert_eq!(
            BlinkColor::parse(b"cyan").channels(),
            ChannelMask::B.union(ChannelMask::C)
        );
        assert_eq!(
            BlinkColor::parse(b"yellow").channels(),
            ChannelMask::A.union(ChannelMask::B)
        );
        assert_eq!(
            BlinkColor::parse(b"magenta").channels(),
            ChannelMask::A.union(ChannelMask::C)
        );
        let white = BlinkColor::parse(b"white").channels();
        assert!(white.contains(ChannelMask::A));
        assert!(white.contains(ChannelMask::B));
        assert!(white.contains(ChannelMask::C));
    }

    #[test]
    fn unknown_color_is_noop() {
        assert_eq!(BlinkColor::parse(b"purple"), BlinkColor::NoOp);
        assert!(BlinkColor::parse(b"purple").channels().is_empty());
        assert_eq!(BlinkColor::parse(b""), BlinkColor::NoOp);
    }

    #[test]
    fn cursor_advances_once_per_step_until_end() {
        let mut seq = BlinkSequence::from_values(b"500:500:500", b"red");
        assert_eq!(seq.len(), 3);

        for expected_cursor in 1..=3 {
            let step = seq.step().unwrap();
            assert_eq!(step.mask, ChannelMask::A);
            assert_eq!(step.delay_ms, 500);
            assert_eq!(seq.cursor(), expected_cursor);
        }

        assert!(seq.is_finished());
        assert_eq!(seq.step(), None);
        // Terminated permanently for this invocation.
        assert_eq!(seq.step(), None);
        assert_eq!(seq.cursor(), seq.len());
    }

    #[test]
    fn noop_color_still_runs_delays() {
        let mut seq = BlinkSequence::from_values(b"100:200", b"chartreuse");
        let s0 = seq.step().unwrap();
        let s1 = seq.step().unwrap();
        assert!(s0.mask.is_empty() && s1.mask.is_empty());
        assert_eq!((s0.delay_ms, s1.delay_ms), (100, 200));
        assert_eq!(seq.step(), None);
    }
}
