use crate::foundation::error::{StickgridError, StickgridResult};
use crate::render::compositor::PixelBuffer;

/// Stream parameters handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Output frames per second.
    pub fps: u32,
}

/// Consumer of an exported frame stream.
///
/// Ordering contract: `begin` once, then `push_frame` with strictly increasing output indices
/// (repeats included), then `end` once.
pub trait FrameSink: Send {
    /// Called once before any frame is pushed.
    fn begin(&mut self, cfg: SinkConfig) -> StickgridResult<()>;
    /// Push one output frame.
    fn push_frame(&mut self, idx: u64, frame: &PixelBuffer) -> StickgridResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> StickgridResult<()>;
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<PixelBuffer>,
    ended: bool,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured by `begin`.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames in output order.
    pub fn frames(&self) -> &[PixelBuffer] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StickgridResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &PixelBuffer) -> StickgridResult<()> {
        if idx != self.frames.len() as u64 {
            return Err(StickgridError::invalid_argument(format!(
                "in-memory sink expected frame {}, got {idx}",
                self.frames.len()
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> StickgridResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
