//! Ordered frames with timings, driven by playback and export.

/// Batch export into a frame sink.
pub mod export;
/// Token-driven playback stepping.
pub mod playback;
/// Frame list, edits and viewport selection.
pub mod sequencer;
