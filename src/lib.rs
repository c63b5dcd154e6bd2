//! Video signature decoding and scene-level similarity fingerprinting.
//!
//! Three components, consumed in sequence by an orchestrator composing a
//! larger content identifier:
//!
//! 1. [`decode_signature`]: parses the compact binary signature blob produced
//!    by the external per-frame video-signature extractor into an ordered
//!    list of [`FrameRecord`]s (380-element ternary vector, exact elapsed
//!    time, confidence).
//! 2. [`parse_scene_cuts`]: turns the extractor's textual per-frame scene
//!    score stream into a sorted cut-point list using a configurable
//!    threshold.
//! 3. [`fingerprint_segments`]: partitions the frames into contiguous scene
//!    segments aligned to the cut points and invokes a [`SegmentDigest`]
//!    once per segment, falling back to one whole-asset segment when no cut
//!    points exist.
//!
//! All three are synchronous pure functions over their inputs; the only
//! shared state is a read-only lookup table built once per process, so
//! separate assets can be processed concurrently without coordination.
//! The `extract` module is the caller side of the boundary: it runs the
//! external tool (two invocations per asset) and optionally caches the raw
//! blob in a sidecar file.
//!
//! # Module structure
//!
//! - `bitstream`: bit cursor and binary signature decoder
//! - `scene`: scene-cut detection over the score text
//! - `fingerprint`: segment partitioning and digest seam
//! - `frame`: decoded frame record types
//! - `extract`: external ffmpeg invocation and sidecar cache
//! - `config`: runtime options (file + environment)

pub mod bitstream;
pub mod config;
pub mod error;
pub mod extract;
pub mod fingerprint;
pub mod frame;
pub mod scene;

pub use bitstream::decode_signature;
pub use config::SigConfig;
pub use error::SigError;
pub use extract::{extract_scene_scores, extract_signature, sidecar_path, SIDECAR_EXTENSION};
pub use fingerprint::{
    fingerprint_segments, granular_features, GranularFeatures, SegmentDigest, SegmentFeature,
    Sha256Digest,
};
pub use frame::{FrameRecord, FrameVector, MediaTime, SIG_ELEMENTS};
pub use scene::{parse_scene_cuts, DEFAULT_SCENE_LIMIT};
