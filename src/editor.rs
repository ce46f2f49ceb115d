use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{StickgridError, StickgridResult};
use crate::frame::model::Frame;
use crate::grid::sparse::{MoveOutcome, SelectionRect};
use crate::persist::codec::{load_animation, load_frame, save_animation};
use crate::persist::templates::TemplateDir;
use crate::render::compositor::RenderSettings;
use crate::sequence::export::{ExportOpts, ExportStats, export_to_mp4};
use crate::sequence::sequencer::{FrameSummary, SequenceEntry, Sequencer};

/// Programmatic surface used by front ends (GUI, HTTP layer, CLI).
///
/// Every operation either succeeds or leaves the editor as it was.
#[derive(Debug, Default)]
pub struct Editor {
    sequencer: Sequencer,
    templates: Option<TemplateDir>,
    settings: RenderSettings,
}

impl Editor {
    /// Empty editor without a template directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty editor resolving template names in `templates`.
    pub fn with_templates(templates: TemplateDir) -> Self {
        Self {
            templates: Some(templates),
            ..Self::default()
        }
    }

    /// The underlying sequence.
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Mutable access for policy changes, durations and playback.
    pub fn sequencer_mut(&mut self) -> &mut Sequencer {
        &mut self.sequencer
    }

    /// Template directory, if one is attached.
    pub fn templates(&self) -> Option<&TemplateDir> {
        self.templates.as_ref()
    }

    /// Raster settings used by [`Editor::export_video`].
    pub fn render_settings(&self) -> RenderSettings {
        self.settings
    }

    /// Replace the raster settings used by [`Editor::export_video`].
    pub fn set_render_settings(&mut self, settings: RenderSettings) -> StickgridResult<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Append a frame given by template name or file path, with an optional background
    /// reference resolved the same way.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn add_frame(
        &mut self,
        template_ref: &str,
        duration_ms: u32,
        background_ref: Option<&str>,
    ) -> StickgridResult<usize> {
        let (frame, label) = self.resolve_ref(template_ref)?;
        let background = background_ref.map(|r| self.resolve_ref(r)).transpose()?;
        self.append_loaded(frame, label, duration_ms, background)
    }

    /// Append a frame read from `path`, with an optional background file.
    pub fn add_frame_from_path(
        &mut self,
        path: &Path,
        duration_ms: u32,
        background: Option<&Path>,
    ) -> StickgridResult<usize> {
        let frame = load_frame(path)?;
        let background = background
            .map(|p| load_frame(p).map(|f| (f, file_label(p, ""))))
            .transpose()?;
        self.append_loaded(frame, file_label(path, "frame"), duration_ms, background)
    }

    /// Move the painted cells inside `rect` of frame `frame_index` by `(dr, dc)`.
    pub fn move_selection(
        &mut self,
        frame_index: usize,
        rect: SelectionRect,
        dr: i64,
        dc: i64,
    ) -> StickgridResult<MoveOutcome> {
        let outcome = self
            .sequencer
            .edit_frame(frame_index, |f| f.move_selection(rect, dr, dc))??;
        tracing::debug!(
            frame_index,
            moved = outcome.moved.len(),
            dropped = outcome.dropped.len(),
            "moved selection"
        );
        Ok(outcome)
    }

    /// Move the listed cells of frame `frame_index` by `(dr, dc)`.
    pub fn translate_cells(
        &mut self,
        frame_index: usize,
        coords: &[(i64, i64)],
        dr: i64,
        dc: i64,
    ) -> StickgridResult<MoveOutcome> {
        self.sequencer
            .edit_frame(frame_index, |f| f.translate_cells(coords, dr, dc))
    }

    /// One summary per frame.
    pub fn get_summaries(&self) -> Vec<FrameSummary> {
        self.sequencer.summaries()
    }

    /// Save the animation document.
    pub fn save(&self, path: &Path) -> StickgridResult<()> {
        save_animation(&self.sequencer, path)
    }

    /// Replace the whole animation with the document at `path`.
    ///
    /// Nothing changes unless the document decodes completely.
    pub fn load(&mut self, path: &Path) -> StickgridResult<()> {
        let doc = load_animation(path)?;
        tracing::debug!(frames = doc.entries.len(), path = %path.display(), "loaded animation");
        self.sequencer.replace_all(doc.entries, doc.policy);
        Ok(())
    }

    /// Render frame `index` under the current viewport policy and write it as PNG.
    pub fn render_frame_png(
        &self,
        index: usize,
        path: &Path,
        settings: &RenderSettings,
    ) -> StickgridResult<()> {
        let pixels = self.sequencer.render_entry(index, settings, None)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StickgridError::from_fs(e, parent))?;
        }
        pixels.save_png(path)
    }

    /// Export the animation to an MP4 at `fps` with the editor's raster settings.
    pub fn export_video(&self, path: &Path, fps: u32) -> StickgridResult<ExportStats> {
        self.export_video_with(
            path,
            &ExportOpts {
                fps,
                settings: self.settings,
                ..ExportOpts::default()
            },
        )
    }

    /// Export with explicit options.
    pub fn export_video_with(&self, path: &Path, opts: &ExportOpts) -> StickgridResult<ExportStats> {
        export_to_mp4(&self.sequencer, path, opts)
    }

    fn append_loaded(
        &mut self,
        frame: Frame,
        label: String,
        duration_ms: u32,
        background: Option<(Frame, String)>,
    ) -> StickgridResult<usize> {
        let (background, background_label) = match background {
            Some((bg, bg_label)) => (Some(Arc::new(bg)), bg_label),
            None => (None, String::new()),
        };
        self.sequencer.push_entry(SequenceEntry {
            frame: Arc::new(frame),
            background,
            duration_ms,
            label,
            background_label,
        })
    }

    /// Template name first (when a directory is attached), then filesystem path.
    fn resolve_ref(&self, reference: &str) -> StickgridResult<(Frame, String)> {
        if let Some(templates) = &self.templates {
            match templates.resolve(reference) {
                Ok(path) => return Ok((load_frame(&path)?, file_label(&path, reference))),
                Err(StickgridError::NotFound(_) | StickgridError::InvalidArgument(_)) => {}
                Err(e) => return Err(e),
            }
        }
        let path = Path::new(reference);
        Ok((load_frame(path)?, file_label(path, reference)))
    }
}

fn file_label(path: &Path, fallback: &str) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
#[path = "../tests/unit/editor.rs"]
mod tests;
