//! Stickgrid is the core of a grid-based stick-figure animation editor.
//!
//! Frames are sparse snapshots of painted cells on a fixed grid. A [`Sequencer`] holds them in
//! order with per-frame durations and optional backgrounds, and turns them into pixels for
//! playback or video export.
//!
//! # Pipeline overview
//!
//! 1. **Paint**: [`GridModel`] edits (cells, Bresenham lines, midpoint circles) -> [`Frame`]
//! 2. **Sequence**: `Frame + Background + duration` entries in a [`Sequencer`]
//! 3. **Resolve**: [`ViewportPolicy`] -> one [`Viewport`] per frame, or one union viewport shared
//!    by the whole sequence so the camera does not jitter
//! 4. **Composite**: background, then foreground, cropped to the viewport -> [`PixelBuffer`]
//! 5. **Play or export**: token-driven [`Sequencer::tick`] steps, or a duration-weighted frame
//!    stream into a [`FrameSink`] such as the system `ffmpeg` ([`FfmpegSink`])
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: viewport resolution and compositing are pure functions of their inputs.
//! - **No IO in the renderer**: files are read by [`persist`] and written by sinks.
//! - **Presentation-free**: windows, canvases and timers belong to the host; playback hands the
//!   host pixels plus a hold duration and never blocks.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Programmatic editing surface.
pub mod editor;
pub mod encode;
/// Shared value types and errors.
pub mod foundation;
/// Frames and backgrounds.
pub mod frame;
pub mod grid;
pub mod persist;
/// Compositing.
pub mod render;
pub mod sequence;
/// Viewport selection.
pub mod viewport;

pub use editor::Editor;
pub use encode::ffmpeg::{
    FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path, padded_size,
};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{
    Cell, CellCoord, ColorSpec, DEFAULT_GRID_DIMENSIONS, GridDimensions, Rgb8, Viewport,
    contrast_color,
};
pub use foundation::error::{StickgridError, StickgridResult};
pub use frame::model::{Background, Frame};
pub use grid::model::{GridModel, circle_cells, line_cells};
pub use grid::sparse::{CellBounds, MoveOutcome, SelectionRect, SparseGrid};
pub use persist::codec::{
    AnimationDocument, animation_from_json, animation_to_json, frame_from_json, frame_to_json,
    load_animation, load_frame, parse_box_key, save_animation, save_frame,
};
pub use persist::templates::{TemplateDir, normalize_template_name};
pub use render::compositor::{LayerPalette, PixelBuffer, RenderSettings, render_frame};
pub use sequence::export::{
    ExportOpts, ExportPlan, ExportStats, PlannedFrame, export_to_mp4, export_to_sink,
    plan_export, repeat_count,
};
pub use sequence::playback::{PlaybackStatus, PlaybackStep, PlaybackToken};
pub use sequence::sequencer::{
    DEFAULT_DURATION_MS, FrameSummary, SequenceEntry, Sequencer, SharedSequencer,
};
pub use viewport::resolver::{
    ViewportMode, ViewportPolicy, resolve_union_viewport, resolve_viewport,
};
