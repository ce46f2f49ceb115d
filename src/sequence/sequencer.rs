use std::sync::{Arc, Mutex};

use crate::foundation::core::{DEFAULT_GRID_DIMENSIONS, GridDimensions, Viewport};
use crate::foundation::error::{StickgridError, StickgridResult};
use crate::frame::model::{Background, Frame};
use crate::render::compositor::{PixelBuffer, RenderSettings, render_frame};
use crate::sequence::playback::Playback;
use crate::viewport::resolver::{ViewportPolicy, resolve_union_viewport, resolve_viewport};

/// Duration used when a document or caller does not supply one.
pub const DEFAULT_DURATION_MS: u32 = 200;

/// A sequencer shared between an interactive editor and a playback driver.
///
/// One mutex guards every edit and every playback tick.
pub type SharedSequencer = Arc<Mutex<Sequencer>>;

#[derive(Clone, Debug, PartialEq, Eq)]
/// One step of the animation.
pub struct SequenceEntry {
    /// Foreground frame.
    pub frame: Arc<Frame>,
    /// Optional background layered beneath the frame.
    pub background: Option<Arc<Background>>,
    /// Time the frame stays on screen (> 0).
    pub duration_ms: u32,
    /// Display label (usually the source file name).
    pub label: String,
    /// Label of the background source; empty without a background.
    pub background_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Lightweight listing of an entry for UIs.
pub struct FrameSummary {
    /// Position in the sequence.
    pub index: usize,
    /// Entry label.
    pub name: String,
    /// Display duration.
    pub duration_ms: u32,
    /// Grid width of the frame.
    pub grid_width: u32,
    /// Grid height of the frame.
    pub grid_height: u32,
    /// Whether a background is attached.
    pub has_background: bool,
}

#[derive(Debug, Default)]
/// Ordered frames with timings, backgrounds and the viewport policy.
///
/// Frames are shared read-only once appended; [`Sequencer::edit_frame`] copies a frame before
/// changing it if anything else still holds it.
pub struct Sequencer {
    entries: Vec<SequenceEntry>,
    policy: ViewportPolicy,
    pub(crate) playback: Playback,
}

impl Sequencer {
    /// Empty sequence with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty sequence with `policy`.
    pub fn with_policy(policy: ViewportPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Wrap in the single-mutex form used by multi-threaded hosts.
    pub fn into_shared(self) -> SharedSequencer {
        Arc::new(Mutex::new(self))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the sequence has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in order.
    pub fn entries(&self) -> &[SequenceEntry] {
        &self.entries
    }

    /// Entry at `index`.
    pub fn entry(&self, index: usize) -> StickgridResult<&SequenceEntry> {
        self.entries.get(index).ok_or_else(|| self.out_of_range(index))
    }

    /// Current viewport policy.
    pub fn policy(&self) -> &ViewportPolicy {
        &self.policy
    }

    /// Replace the viewport policy.
    pub fn set_policy(&mut self, policy: ViewportPolicy) {
        self.policy = policy;
    }

    /// Grid size of the first frame, or the editor default for an empty sequence.
    pub fn grid_dimensions(&self) -> GridDimensions {
        self.entries
            .first()
            .map(|e| e.frame.dimensions)
            .unwrap_or(DEFAULT_GRID_DIMENSIONS)
    }

    /// Append an entry and return its index.
    pub fn append(
        &mut self,
        frame: impl Into<Arc<Frame>>,
        background: Option<Arc<Background>>,
        duration_ms: u32,
        label: impl Into<String>,
    ) -> StickgridResult<usize> {
        check_duration(duration_ms)?;
        self.entries.push(SequenceEntry {
            frame: frame.into(),
            background,
            duration_ms,
            label: label.into(),
            background_label: String::new(),
        });
        Ok(self.entries.len() - 1)
    }

    /// Append a fully built entry.
    pub fn push_entry(&mut self, entry: SequenceEntry) -> StickgridResult<usize> {
        check_duration(entry.duration_ms)?;
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }

    /// Attach, replace or remove the background of one entry.
    pub fn replace_background(
        &mut self,
        index: usize,
        background: Option<Arc<Background>>,
        label: impl Into<String>,
    ) -> StickgridResult<()> {
        let entry = self.entry_mut(index)?;
        entry.background_label = if background.is_some() {
            label.into()
        } else {
            String::new()
        };
        entry.background = background;
        Ok(())
    }

    /// Change one entry's display duration.
    pub fn set_duration(&mut self, index: usize, duration_ms: u32) -> StickgridResult<()> {
        check_duration(duration_ms)?;
        self.entry_mut(index)?.duration_ms = duration_ms;
        Ok(())
    }

    /// Apply an explicit edit to one frame.
    pub fn edit_frame<R>(
        &mut self,
        index: usize,
        edit: impl FnOnce(&mut Frame) -> R,
    ) -> StickgridResult<R> {
        let entry = self.entry_mut(index)?;
        Ok(edit(Arc::make_mut(&mut entry.frame)))
    }

    /// Drop every entry and stop playback. The policy is kept.
    pub fn clear(&mut self) {
        self.stop();
        self.entries.clear();
    }

    /// Replace entries and policy in one step (used by loaders).
    pub fn replace_all(&mut self, entries: Vec<SequenceEntry>, policy: ViewportPolicy) {
        self.stop();
        self.entries = entries;
        self.policy = policy;
    }

    /// One summary per entry.
    pub fn summaries(&self) -> Vec<FrameSummary> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, e)| FrameSummary {
                index,
                name: e.label.clone(),
                duration_ms: e.duration_ms,
                grid_width: e.frame.dimensions.width,
                grid_height: e.frame.dimensions.height,
                has_background: e.background.is_some(),
            })
            .collect()
    }

    /// The union viewport when the policy locks to it, `None` when each frame gets its own.
    pub fn locked_viewport(&self) -> Option<Viewport> {
        if !self.policy.uses_union() {
            return None;
        }
        let frames: Vec<&Frame> = self.entries.iter().map(|e| e.frame.as_ref()).collect();
        Some(resolve_union_viewport(
            &frames,
            &self.policy,
            self.grid_dimensions(),
        ))
    }

    /// Viewport used to show entry `index` under the current policy.
    pub fn viewport_for(&self, index: usize) -> StickgridResult<Viewport> {
        self.viewport_with(index, self.locked_viewport())
    }

    /// Entry `index` seen through an already resolved union viewport, or through its own
    /// viewport when `locked` is `None`.
    ///
    /// The union is clamped into the entry's grid, so a frame smaller than the first one still
    /// renders.
    pub(crate) fn viewport_with(
        &self,
        index: usize,
        locked: Option<Viewport>,
    ) -> StickgridResult<Viewport> {
        let entry = self.entry(index)?;
        Ok(match locked {
            Some(vp) => vp.clamp_to(entry.frame.dimensions),
            None => resolve_viewport(&entry.frame, &self.policy),
        })
    }

    /// Render entry `index`. With `viewport == None` the policy decides.
    pub fn render_entry(
        &self,
        index: usize,
        settings: &RenderSettings,
        viewport: Option<Viewport>,
    ) -> StickgridResult<PixelBuffer> {
        let entry = self.entry(index)?;
        let vp = match viewport {
            Some(vp) => vp,
            None => self.viewport_for(index)?,
        };
        render_frame(&entry.frame, entry.background.as_deref(), settings, vp)
    }

    fn entry_mut(&mut self, index: usize) -> StickgridResult<&mut SequenceEntry> {
        let len = self.entries.len();
        self.entries.get_mut(index).ok_or_else(|| {
            StickgridError::index_out_of_range(format!(
                "frame index {index} out of range for {len} frames"
            ))
        })
    }

    fn out_of_range(&self, index: usize) -> StickgridError {
        StickgridError::index_out_of_range(format!(
            "frame index {index} out of range for {} frames",
            self.entries.len()
        ))
    }
}

fn check_duration(duration_ms: u32) -> StickgridResult<()> {
    if duration_ms == 0 {
        return Err(StickgridError::invalid_argument(
            "frame duration must be > 0 ms",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/sequencer.rs"]
mod tests;
