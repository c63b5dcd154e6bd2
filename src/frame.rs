//! Decoded frame signature types.
//!
//! - `FrameVector`: the fixed 380-element ternary feature vector of one frame.
//! - `MediaTime`: exact elapsed time as the raw per-frame counter over the
//!   stream's declared time unit.
//! - `FrameRecord`: one decoded frame signature.
//!
//! Records are created once per decode call and never mutated afterwards.

use std::cmp::Ordering;

/// Number of ternary elements in one frame signature vector. Fixed by the
/// format; any other length signals corruption.
pub const SIG_ELEMENTS: usize = 380;

/// One frame's feature vector. Every element is a ternary digit in `0..=2`.
pub type FrameVector = [u8; SIG_ELEMENTS];

/// Exact media timestamp: an integer counter over a fixed per-stream
/// denominator (counter ticks per second).
///
/// Segment boundary comparisons are order sensitive when a frame's elapsed
/// time exactly equals a cut point, so the counter and unit are carried as
/// decoded and only rendered to seconds at the caller-facing edge.
#[derive(Clone, Copy, Debug)]
pub struct MediaTime {
    raw: u32,
    /// Nonzero; the decoder rejects a zero time unit.
    unit: u16,
}

impl MediaTime {
    pub(crate) fn new(raw: u32, unit: u16) -> Self {
        debug_assert!(unit != 0);
        Self { raw, unit }
    }

    /// Raw per-frame counter as decoded.
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// Declared time unit (counter ticks per second).
    pub fn unit(&self) -> u16 {
        self.unit
    }

    /// Seconds since asset start, for rendering and cut-point comparison.
    pub fn as_secs_f64(&self) -> f64 {
        f64::from(self.raw) / f64::from(self.unit)
    }

    /// True when this timestamp lies at or past `secs`.
    pub fn at_or_after(&self, secs: f64) -> bool {
        self.as_secs_f64() >= secs
    }
}

impl PartialEq for MediaTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MediaTime {}

impl PartialOrd for MediaTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MediaTime {
    /// Exact comparison by cross multiplication; no rounding even across
    /// streams with different time units.
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u64::from(self.raw) * u64::from(other.unit);
        let rhs = u64::from(other.raw) * u64::from(self.unit);
        lhs.cmp(&rhs)
    }
}

/// One decoded frame signature.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRecord {
    /// 380 ternary digits describing the frame.
    pub vector: FrameVector,
    /// Exact time elapsed since the start of the asset.
    pub elapsed: MediaTime,
    /// Signature confidence, `0..=255`. Decoded but not consumed downstream.
    pub confidence: u8,
}
