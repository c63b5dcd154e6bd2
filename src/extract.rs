//! External signature extraction via ffmpeg.
//!
//! The decoder, detector, and fingerprinter are pure functions over bytes the
//! caller supplies; this module is that caller side. Each asset takes two
//! invocations of the external tool: one writing the binary signature blob,
//! one printing the textual per-frame scene scores. Timeout, retry, and
//! cancellation policy belong to whoever drives these functions.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::SigConfig;

/// Extension of the optional sidecar file caching the raw signature blob next
/// to the source asset.
pub const SIDECAR_EXTENSION: &str = "mp7sig";

/// Extract the binary video signature for `asset`.
///
/// With `store_sig` enabled the blob is cached verbatim in a sidecar file,
/// and an existing sidecar is read back instead of re-invoking ffmpeg.
pub fn extract_signature(asset: &Path, cfg: &SigConfig) -> Result<Vec<u8>> {
    let sidecar = sidecar_path(asset);
    if cfg.store_sig && sidecar.is_file() {
        log::debug!("reusing cached signature {}", sidecar.display());
        return std::fs::read(&sidecar)
            .with_context(|| format!("read cached signature {}", sidecar.display()));
    }

    let workdir = tempfile::tempdir().context("create temp dir for signature output")?;
    let sig_path = workdir.path().join("signature.bin");
    let filter = format!(
        "fps=fps={},signature=format=binary:filename={}",
        cfg.fps,
        escape_filter_path(&sig_path),
    );
    run_ffmpeg(cfg, asset, &filter)?;
    let blob = std::fs::read(&sig_path)
        .with_context(|| format!("read signature output for {}", asset.display()))?;

    if cfg.store_sig {
        std::fs::write(&sidecar, &blob)
            .with_context(|| format!("write signature sidecar {}", sidecar.display()))?;
        log::info!("stored signature sidecar {}", sidecar.display());
    }
    Ok(blob)
}

/// Extract the per-frame scene score text for `asset`.
pub fn extract_scene_scores(asset: &Path, cfg: &SigConfig) -> Result<String> {
    let workdir = tempfile::tempdir().context("create temp dir for scene score output")?;
    let scores_path = workdir.path().join("scenes.txt");
    let filter = format!(
        "fps=fps={},select='gte(scene,0)',metadata=print:file={}",
        cfg.fps,
        escape_filter_path(&scores_path),
    );
    run_ffmpeg(cfg, asset, &filter)?;
    std::fs::read_to_string(&scores_path)
        .with_context(|| format!("read scene score output for {}", asset.display()))
}

fn run_ffmpeg(cfg: &SigConfig, asset: &Path, filter: &str) -> Result<()> {
    log::info!("ffmpeg signature pass for {}", asset.display());
    let output = Command::new(&cfg.ffmpeg_path)
        .arg("-hide_banner")
        .arg("-nostdin")
        .arg("-i")
        .arg(asset)
        .arg("-vf")
        .arg(filter)
        .arg("-f")
        .arg("null")
        .arg("-")
        .output()
        .with_context(|| format!("spawn {} for {}", cfg.ffmpeg_path, asset.display()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "ffmpeg failed on {} ({}): {}",
            asset.display(),
            output.status,
            stderr.trim()
        ));
    }
    Ok(())
}

/// Sidecar path for `asset`: same location, `.mp7sig` extension.
pub fn sidecar_path(asset: &Path) -> PathBuf {
    asset.with_extension(SIDECAR_EXTENSION)
}

/// `:` separates filter options, so it must be escaped inside embedded paths
/// (Windows drive letters in particular).
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy().replace(':', r"\:")
}
