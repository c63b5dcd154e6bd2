use thiserror::Error;

/// Errors raised by the signature decoding and fingerprinting core.
///
/// The scene-cut detector never raises: malformed score lines are skipped with
/// a warning, since the whole-asset fallback is always a valid result.
#[derive(Debug, Error)]
pub enum SigError {
    /// The binary signature blob is truncated or otherwise malformed.
    /// Not recoverable; the asset cannot be fingerprinted at scene granularity.
    #[error("malformed signature bitstream: {0}")]
    Format(String),

    /// The fingerprinter was handed zero decoded frames. A valid asset must
    /// always yield at least one segment fingerprint.
    #[error("signature stream contains no frames")]
    EmptyStream,
}
