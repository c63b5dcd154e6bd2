use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::scene::DEFAULT_SCENE_LIMIT;

const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
const DEFAULT_FPS: u32 = 5;
const DEFAULT_DIGEST_BITS: u32 = 64;

#[derive(Debug, Deserialize, Default)]
struct SigConfigFile {
    ffmpeg_path: Option<String>,
    fps: Option<u32>,
    scene_limit: Option<f64>,
    digest_bits: Option<u32>,
    store_sig: Option<bool>,
}

/// Runtime options for signature extraction and fingerprinting.
///
/// Loaded from an optional JSON file named by `VIDSIG_CONFIG`, overridden by
/// `VIDSIG_*` environment variables, then validated.
#[derive(Debug, Clone)]
pub struct SigConfig {
    /// Path or name of the external ffmpeg binary.
    pub ffmpeg_path: String,
    /// Frames per second the extractor analyzes.
    pub fps: u32,
    /// Scene score threshold above which a cut point is created.
    pub scene_limit: f64,
    /// Requested output bit length of the segment digest.
    pub digest_bits: u32,
    /// Cache the raw signature blob in a sidecar file next to the asset.
    pub store_sig: bool,
}

impl Default for SigConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: DEFAULT_FFMPEG_PATH.to_string(),
            fps: DEFAULT_FPS,
            scene_limit: DEFAULT_SCENE_LIMIT,
            digest_bits: DEFAULT_DIGEST_BITS,
            store_sig: false,
        }
    }
}

impl SigConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("VIDSIG_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: SigConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            ffmpeg_path: file.ffmpeg_path.unwrap_or(defaults.ffmpeg_path),
            fps: file.fps.unwrap_or(defaults.fps),
            scene_limit: file.scene_limit.unwrap_or(defaults.scene_limit),
            digest_bits: file.digest_bits.unwrap_or(defaults.digest_bits),
            store_sig: file.store_sig.unwrap_or(defaults.store_sig),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("VIDSIG_FFMPEG") {
            if !path.trim().is_empty() {
                self.ffmpeg_path = path;
            }
        }
        if let Ok(fps) = std::env::var("VIDSIG_FPS") {
            self.fps = fps
                .parse()
                .map_err(|_| anyhow!("VIDSIG_FPS must be an integer frame rate"))?;
        }
        if let Ok(limit) = std::env::var("VIDSIG_SCENE_LIMIT") {
            self.scene_limit = limit
                .parse()
                .map_err(|_| anyhow!("VIDSIG_SCENE_LIMIT must be a scene score threshold"))?;
        }
        if let Ok(bits) = std::env::var("VIDSIG_DIGEST_BITS") {
            self.digest_bits = bits
                .parse()
                .map_err(|_| anyhow!("VIDSIG_DIGEST_BITS must be an integer bit length"))?;
        }
        if let Ok(store) = std::env::var("VIDSIG_STORE_SIG") {
            self.store_sig = match store.trim() {
                "1" | "true" => true,
                "0" | "false" => false,
                other => return Err(anyhow!("VIDSIG_STORE_SIG must be a boolean, got {:?}", other)),
            };
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(anyhow!("fps must be at least 1"));
        }
        if !(self.scene_limit > 0.0 && self.scene_limit <= 1.0) {
            return Err(anyhow!(
                "scene_limit must lie in (0, 1], got {}",
                self.scene_limit
            ));
        }
        if self.digest_bits == 0 || self.digest_bits % 32 != 0 || self.digest_bits > 256 {
            return Err(anyhow!(
                "digest_bits must be a multiple of 32 in 32..=256, got {}",
                self.digest_bits
            ));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<SigConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let cfg = serde_json::from_str(&raw)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(cfg)
}
