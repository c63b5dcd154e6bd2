//! End-to-end pipeline tests over synthetic signature blobs: encode a blob
//! bit for bit the way the external extractor does, then run
//! decode -> detect -> fingerprint and check the spec-level properties.

use vidsig::{
    decode_signature, fingerprint_segments, granular_features, parse_scene_cuts, FrameVector,
    SegmentDigest, SigError, DEFAULT_SCENE_LIMIT, SIG_ELEMENTS,
};

/// Big-endian bit writer matching the decoder's cursor layout.
struct BitWriter {
    bits: Vec<u8>,
}

impl BitWriter {
    fn new() -> Self {
        Self { bits: Vec::new() }
    }

    fn write(&mut self, value: u64, width: usize) {
        for i in (0..width).rev() {
            self.bits.push(((value >> i) & 1) as u8);
        }
    }

    fn zeros(&mut self, width: usize) {
        self.bits.resize(self.bits.len() + width, 0);
    }

    fn finish(self) -> Vec<u8> {
        let mut bytes = vec![0u8; (self.bits.len() + 7) / 8];
        for (i, bit) in self.bits.iter().enumerate() {
            bytes[i / 8] |= bit << (7 - (i % 8));
        }
        bytes
    }
}

/// Encode a signature blob with the declared time unit, segment-table entry
/// count, and per-frame (raw time, confidence, vector) triples.
fn make_blob(time_unit: u16, segments: usize, frames: &[(u32, u8, FrameVector)]) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.zeros(129); // preamble
    w.write(frames.len() as u64, 32);
    w.write(time_unit as u64, 16);
    w.zeros(1 + 32 + 32);
    w.write(segments as u64, 32);
    w.zeros(segments * (4 * 32 + 1 + 5 * 243));
    w.zeros(1);
    for (raw_time, confidence, vector) in frames {
        w.zeros(1);
        w.write(*raw_time as u64, 32);
        w.write(*confidence as u64, 8);
        w.zeros(5 * 8);
        for group in vector.chunks(5) {
            let byte = group.iter().fold(0u64, |acc, &d| acc * 3 + u64::from(d));
            w.write(byte, 8);
        }
    }
    w.finish()
}

fn patterned_vector(seed: u8) -> FrameVector {
    let mut vector = [0u8; SIG_ELEMENTS];
    for (i, v) in vector.iter_mut().enumerate() {
        *v = ((i + seed as usize) % 3) as u8;
    }
    vector
}

/// Digest stub encoding segment length, so partitioning is observable.
struct LenDigest;

impl SegmentDigest for LenDigest {
    fn digest(&self, vectors: &[FrameVector], _bits: u32) -> String {
        format!("seg:{}", vectors.len())
    }
}

#[test]
fn decoder_recovers_the_encoded_frames() {
    let frames = [
        (0u32, 7u8, patterned_vector(0)),
        (24, 128, patterned_vector(1)),
        (48, 255, patterned_vector(2)),
    ];
    let blob = make_blob(24, 0, &frames);
    let decoded = decode_signature(&blob).expect("decode");

    assert_eq!(decoded.len(), 3);
    for (record, (raw_time, confidence, vector)) in decoded.iter().zip(frames.iter()) {
        assert_eq!(record.vector, *vector);
        assert_eq!(record.confidence, *confidence);
        assert_eq!(record.elapsed.raw(), *raw_time);
        assert_eq!(record.elapsed.unit(), 24);
    }
    assert_eq!(decoded[0].elapsed.as_secs_f64(), 0.0);
    assert_eq!(decoded[1].elapsed.as_secs_f64(), 1.0);
    assert_eq!(decoded[2].elapsed.as_secs_f64(), 2.0);
}

#[test]
fn decoding_is_deterministic() {
    let blob = make_blob(24, 0, &[(0, 1, patterned_vector(3)), (12, 2, patterned_vector(4))]);
    assert_eq!(decode_signature(&blob).unwrap(), decode_signature(&blob).unwrap());
}

#[test]
fn segment_table_is_skipped_without_misaligning_the_cursor() {
    let frames = [(0u32, 9u8, patterned_vector(5)), (24, 9, patterned_vector(6))];
    for segments in [0usize, 1, 3] {
        let blob = make_blob(24, segments, &frames);
        let decoded = decode_signature(&blob).expect("decode");
        assert_eq!(decoded.len(), 2, "segment table entries: {}", segments);
        assert_eq!(decoded[1].vector, frames[1].2);
    }
}

#[test]
fn any_truncation_fails_instead_of_short_reads() {
    let blob = make_blob(24, 1, &[(0, 1, patterned_vector(0)), (24, 2, patterned_vector(1))]);
    // Drop trailing bytes at several depths: inside the last frame vector,
    // inside the frame header, inside the segment table, inside the header.
    for keep in [blob.len() - 1, blob.len() - 40, 300, 30, 10, 0] {
        let truncated = &blob[..keep];
        match decode_signature(truncated) {
            Err(SigError::Format(_)) => {}
            other => panic!("truncated to {} bytes: expected FormatError, got {:?}", keep, other),
        }
    }
}

#[test]
fn pipeline_runs_decode_detect_fingerprint() {
    // Frames at 0.0, 0.5 ... 2.5 seconds, time unit 10.
    let frames: Vec<(u32, u8, FrameVector)> =
        (0..6).map(|i| (i * 5, 200, patterned_vector(i as u8))).collect();
    let blob = make_blob(10, 2, &frames);
    let decoded = decode_signature(&blob).expect("decode");

    let scene_text = "\
frame:0 pts:0 pts_time:0.0\n\
lavfi.scene_score=1.0\n\
frame:1 pts:5 pts_time:0.5\n\
lavfi.scene_score=0.02\n\
frame:2 pts:10 pts_time:1.0\n\
lavfi.scene_score=0.73\n\
frame:3 pts:15 pts_time:1.5\n\
lavfi.scene_score=0.11\n\
frame:4 pts:20 pts_time:2.0\n\
lavfi.scene_score=0.05\n\
frame:5 pts:25 pts_time:2.5\n\
lavfi.scene_score=0.2\n";
    let cuts = parse_scene_cuts(scene_text, DEFAULT_SCENE_LIMIT);
    assert_eq!(cuts, vec![1.0, 2.5]);

    let features = fingerprint_segments(&decoded, &cuts, &LenDigest, 64).expect("fingerprint");
    assert_eq!(features.len(), 2);
    // Cut 1.0 closes at the 1.0s frame: frames 0.0, 0.5, 1.0.
    assert_eq!(features[0].simprint, "seg:3");
    assert_eq!(features[0].duration, 1.0);
    // Cut 2.5 closes at the last frame: frames 1.5, 2.0, 2.5.
    assert_eq!(features[1].simprint, "seg:3");
    assert_eq!(features[1].duration, 1.5);
    let total: f64 = features.iter().map(|f| f.duration).sum();
    assert_eq!(total, *cuts.last().unwrap());
}

#[test]
fn flat_scene_text_falls_back_to_one_whole_asset_segment() {
    let frames: Vec<(u32, u8, FrameVector)> =
        (0..4).map(|i| (i * 10, 50, patterned_vector(i as u8))).collect();
    let blob = make_blob(10, 0, &frames);
    let decoded = decode_signature(&blob).expect("decode");

    let cuts = parse_scene_cuts("", DEFAULT_SCENE_LIMIT);
    assert!(cuts.is_empty());

    let features = fingerprint_segments(&decoded, &cuts, &LenDigest, 64).expect("fingerprint");
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].simprint, "seg:4");
    assert_eq!(features[0].duration, 3.0);
}

#[test]
fn granular_record_serializes_for_the_orchestrator() {
    let frames: Vec<(u32, u8, FrameVector)> =
        (0..3).map(|i| (i * 24, 10, patterned_vector(i as u8))).collect();
    let blob = make_blob(24, 0, &frames);
    let decoded = decode_signature(&blob).expect("decode");

    let record = granular_features(&decoded, &[1.0, 2.0], &LenDigest, 64).expect("granular");
    let json: serde_json::Value = serde_json::to_value(&record).expect("serialize");
    assert_eq!(json["maintype"], "content");
    assert_eq!(json["subtype"], "video");
    assert_eq!(json["version"], 0);
    assert_eq!(json["simprints"].as_array().unwrap().len(), 2);
    assert_eq!(json["sizes"], serde_json::json!([1.0, 1.0]));
}
