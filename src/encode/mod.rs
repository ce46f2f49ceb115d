//! Encoding sinks.
//!
//! Sinks consume exported frames in output order.

/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Sink trait and the in-memory sink.
pub mod sink;
