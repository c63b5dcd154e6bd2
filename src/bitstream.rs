//! Binary MPEG-7 video signature decoder.
//!
//! The blob layout is externally mandated, big-endian bit order:
//!
//! - 129-bit fixed preamble, skipped
//! - u32 frame count, u16 media time unit, 65 reserved bits
//! - u32 segment count, then that many segment-table entries which are skipped
//!   in bulk (their content is unused; only the width keeps the cursor aligned)
//! - 1 reserved bit
//! - per frame: 1 reserved bit, u32 raw media time, u8 confidence, 40 reserved
//!   bits, then 76 packed bytes each expanding to five ternary digits
//!
//! Decoding is a strict linear scan with a single bit cursor; any field read
//! past the end of the blob fails with [`SigError::Format`] and no partial
//! frame list is ever returned.

use once_cell::sync::Lazy;

use crate::error::SigError;
use crate::frame::{FrameRecord, FrameVector, MediaTime, SIG_ELEMENTS};

/// Bits in the fixed preamble before the header fields.
const PREAMBLE_BITS: usize = 129;

/// Reserved bits between the media time unit and the segment count.
const HEADER_RESERVED_BITS: usize = 1 + 32 + 32;

/// Width of one segment-table entry.
const SEGMENT_ENTRY_BITS: usize = 4 * 32 + 1 + 5 * 243;

/// Reserved bits trailing each frame header before the packed vector.
const FRAME_RESERVED_BITS: usize = 5 * 8;

/// Packed bytes per frame vector, five ternary digits each.
const PACKED_BYTES: usize = SIG_ELEMENTS / 5;

/// Total width of one frame entry.
const FRAME_BITS: usize = 1 + 32 + 8 + FRAME_RESERVED_BITS + PACKED_BYTES * 8;

/// Lookup table expanding a byte into five ternary digits, most significant
/// digit first. Built once per process and read-only afterwards, so it is
/// shared freely across concurrently decoded assets.
///
/// Since 3^5 = 243, byte values 243..=255 are never emitted by a conformant
/// encoder; they decode as their value mod 243 rather than being rejected.
static BYTE_TO_TERNARY: Lazy<[[u8; 5]; 256]> = Lazy::new(|| {
    let mut table = [[0u8; 5]; 256];
    for (byte, digits) in table.iter_mut().enumerate() {
        let mut div = 81;
        for digit in digits.iter_mut() {
            *digit = ((byte / div) % 3) as u8;
            div /= 3;
        }
    }
    table
});

/// Bit cursor over an immutable byte buffer. Every read or skip advances the
/// cursor by the declared width; anything past the end fails with
/// [`SigError::Format`] naming the field.
pub(crate) struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Check that `bits` more bits exist without advancing.
    pub(crate) fn require(&self, bits: usize, field: &str) -> Result<(), SigError> {
        let total = self.data.len() * 8;
        if bits > total - self.pos {
            return Err(SigError::Format(format!(
                "{} needs {} bits at offset {} but only {} remain",
                field,
                bits,
                self.pos,
                total - self.pos
            )));
        }
        Ok(())
    }

    pub(crate) fn skip(&mut self, bits: usize, field: &str) -> Result<(), SigError> {
        self.require(bits, field)?;
        self.pos += bits;
        Ok(())
    }

    /// Read up to 32 bits, most significant bit first.
    pub(crate) fn read(&mut self, bits: usize, field: &str) -> Result<u32, SigError> {
        debug_assert!(bits <= 32);
        self.require(bits, field)?;
        let mut value = 0u32;
        for _ in 0..bits {
            let bit = (self.data[self.pos >> 3] >> (7 - (self.pos & 7))) & 1;
            value = (value << 1) | u32::from(bit);
            self.pos += 1;
        }
        Ok(value)
    }
}

/// Decode a binary MPEG-7 video signature blob into its frame records.
///
/// The returned list length always equals the frame count declared in the
/// header; truncated input fails instead of yielding a short list. Output
/// order matches encoded order.
pub fn decode_signature(blob: &[u8]) -> Result<Vec<FrameRecord>, SigError> {
    let table = &*BYTE_TO_TERNARY;
    let mut bits = BitReader::new(blob);

    bits.skip(PREAMBLE_BITS, "preamble")?;
    let frame_count = bits.read(32, "frame count")? as usize;
    let media_time_unit = bits.read(16, "media time unit")? as u16;
    bits.skip(HEADER_RESERVED_BITS, "header reserved")?;
    let segment_count = bits.read(32, "segment count")? as usize;
    bits.skip(segment_count * SEGMENT_ENTRY_BITS, "segment table")?;
    bits.skip(1, "segment table terminator")?;

    if frame_count > 0 && media_time_unit == 0 {
        return Err(SigError::Format("media time unit is zero".to_string()));
    }
    // The declared count must fit in the remaining payload before the output
    // is sized from it.
    bits.require(frame_count * FRAME_BITS, "frame entries")?;

    let mut frames = Vec::with_capacity(frame_count);
    for _ in 0..frame_count {
        bits.skip(1, "frame reserved")?;
        let raw_time = bits.read(32, "frame media time")?;
        let confidence = bits.read(8, "frame confidence")? as u8;
        bits.skip(FRAME_RESERVED_BITS, "frame reserved")?;

        let mut vector: FrameVector = [0u8; SIG_ELEMENTS];
        for group in vector.chunks_exact_mut(5) {
            let byte = bits.read(8, "frame vector")? as usize;
            group.copy_from_slice(&table[byte]);
        }
        frames.push(FrameRecord {
            vector,
            elapsed: MediaTime::new(raw_time, media_time_unit),
            confidence,
        });
    }

    log::debug!(
        "decoded {} frame signatures (time unit 1/{})",
        frames.len(),
        media_time_unit
    );
    Ok(frames)
}
