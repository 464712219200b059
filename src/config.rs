//! Runtime configuration shared by the CLI, the interpreter and the render service.
//!
//! Sources, lowest precedence first: built-in defaults, a JSON file, `VISION_*` environment
//! variables, then command-line flags (applied by the binary).

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::canvas::observer::FrameExporter;
use crate::canvas::raster::{RasterCanvas, RasterCanvasOpts};
use crate::foundation::core::Color;
use crate::foundation::error::{VisionError, VisionResult};
use crate::service::wire::DEFAULT_MAX_MESSAGE_BYTES;

/// Environment variable overriding [`ServiceConfig::addr`].
pub const ENV_ADDR: &str = "VISION_ADDR";
/// Environment variable overriding [`ServiceConfig::max_workers`].
pub const ENV_MAX_WORKERS: &str = "VISION_MAX_WORKERS";
/// Environment variable overriding [`ServiceConfig::max_message_bytes`].
pub const ENV_MAX_MESSAGE_BYTES: &str = "VISION_MAX_MESSAGE_BYTES";

/// Top-level configuration document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisionConfig {
    /// Canvas defaults.
    pub canvas: CanvasConfig,
    /// Render service settings.
    pub service: ServiceConfig,
}

/// Canvas defaults used until a refresh overrides them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// Initial width in pixels.
    pub width: u32,
    /// Initial height in pixels.
    pub height: u32,
    /// Background for refreshes without a color.
    pub background: Color,
    /// Largest frame, in pixels, a refresh may allocate.
    pub max_pixels: u64,
    /// When set, every completed frame is written to `<export_dir>/<index>.png`.
    pub export_dir: Option<PathBuf>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        let opts = RasterCanvasOpts::default();
        Self {
            width: opts.width,
            height: opts.height,
            background: opts.background,
            max_pixels: opts.max_pixels,
            export_dir: None,
        }
    }
}

impl CanvasConfig {
    /// Construct the raster canvas described by this configuration.
    pub fn build(&self) -> VisionResult<RasterCanvas> {
        let canvas = RasterCanvas::new(RasterCanvasOpts {
            width: self.width,
            height: self.height,
            background: self.background,
            max_pixels: self.max_pixels,
        });
        Ok(match &self.export_dir {
            Some(dir) => canvas.with_observer(FrameExporter::new(dir)?),
            None => canvas,
        })
    }
}

/// Render service settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Listen address.
    pub addr: String,
    /// Maximum concurrently served connections.
    pub max_workers: usize,
    /// Largest accepted message payload in bytes.
    pub max_message_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:50051".to_owned(),
            max_workers: 20,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl VisionConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(text: &str) -> VisionResult<Self> {
        serde_json::from_str(text).map_err(|e| VisionError::decode(format!("config: {e}")))
    }

    /// Read a JSON configuration file.
    pub fn load(path: &Path) -> VisionResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Apply `VISION_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> VisionResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> VisionResult<()> {
        if let Some(addr) = lookup(ENV_ADDR) {
            self.service.addr = addr;
        }
        if let Some(v) = lookup(ENV_MAX_WORKERS) {
            self.service.max_workers = parse_env(ENV_MAX_WORKERS, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_MESSAGE_BYTES) {
            self.service.max_message_bytes = parse_env(ENV_MAX_MESSAGE_BYTES, &v)?;
        }
        Ok(())
    }

    /// Reject settings no component can run with.
    pub fn validate(&self) -> VisionResult<()> {
        let max_dim = u32::from(u16::MAX);
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(anyhow!("canvas dimensions must be non-zero").into());
        }
        if self.canvas.width > max_dim || self.canvas.height > max_dim {
            return Err(anyhow!("canvas dimensions must not exceed {max_dim}").into());
        }
        let pixels = u64::from(self.canvas.width) * u64::from(self.canvas.height);
        if pixels > self.canvas.max_pixels {
            return Err(anyhow!(
                "canvas {}x{} exceeds canvas.max_pixels ({})",
                self.canvas.width,
                self.canvas.height,
                self.canvas.max_pixels
            )
            .into());
        }
        if self.service.max_workers == 0 {
            return Err(anyhow!("service.max_workers must be at least 1").into());
        }
        if self.service.max_message_bytes == 0
            || self.service.max_message_bytes > u32::MAX as usize
        {
            return Err(anyhow!(
                "service.max_message_bytes must be in 1..={}",
                u32::MAX
            )
            .into());
        }
        Ok(())
    }
}

fn parse_env(key: &str, value: &str) -> VisionResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| anyhow!("{key}={value:?}: {e}").into())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
