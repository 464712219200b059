use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{VisionError, VisionResult};

/// Hook invoked with a completed frame right before a refresh replaces it.
///
/// `index` is the frame counter value of the outgoing frame (1 for the frame produced by the
/// first refresh). Calls arrive in strictly increasing `index` order. An error aborts the refresh
/// that triggered it.
pub trait FrameObserver: Send {
    /// Receive one completed frame.
    fn frame_complete(&mut self, index: u64, frame: &FrameRGBA) -> VisionResult<()>;
}

/// Writes every completed frame to `<dir>/<index>.png`.
#[derive(Debug, Clone)]
pub struct FrameExporter {
    dir: PathBuf,
}

impl FrameExporter {
    /// Create an exporter, creating `dir` if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> VisionResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the frame with `index` is written to.
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{index}.png"))
    }
}

impl FrameObserver for FrameExporter {
    fn frame_complete(&mut self, index: u64, frame: &FrameRGBA) -> VisionResult<()> {
        let path = self.frame_path(index);
        write_png(&path, frame)?;
        tracing::debug!(frame = index, path = %path.display(), "exported frame");
        Ok(())
    }
}

/// In-memory observer for tests and debugging.
///
/// Clones share one buffer, so a clone kept by the caller sees every frame captured by the
/// copy attached to a canvas.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFrames {
    frames: Arc<Mutex<Vec<(u64, FrameRGBA)>>>,
}

impl InMemoryFrames {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the captured frames in arrival order.
    pub fn frames(&self) -> Vec<(u64, FrameRGBA)> {
        self.lock().clone()
    }

    /// Indices of the captured frames in arrival order.
    pub fn indices(&self) -> Vec<u64> {
        self.lock().iter().map(|(index, _)| *index).collect()
    }

    /// Number of captured frames.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no frame has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned buffer still holds every frame pushed before the panic.
    fn lock(&self) -> MutexGuard<'_, Vec<(u64, FrameRGBA)>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameObserver for InMemoryFrames {
    fn frame_complete(&mut self, index: u64, frame: &FrameRGBA) -> VisionResult<()> {
        self.lock().push((index, frame.clone()));
        Ok(())
    }
}

/// Any `Send` closure can observe frames.
impl<F> FrameObserver for F
where
    F: FnMut(u64, &FrameRGBA) -> VisionResult<()> + Send,
{
    fn frame_complete(&mut self, index: u64, frame: &FrameRGBA) -> VisionResult<()> {
        self(index, frame)
    }
}

/// Write a frame as an RGB8 PNG, creating parent directories as needed.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> VisionResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    image::save_buffer_with_format(
        path,
        &frame.to_rgb8(),
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .map_err(|e| VisionError::backend(format!("write png '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/observer.rs"]
mod tests;
