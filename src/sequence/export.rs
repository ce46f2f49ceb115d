use std::path::PathBuf;

use rayon::prelude::*;

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::Viewport;
use crate::foundation::error::{StickgridError, StickgridResult};
use crate::render::compositor::{PixelBuffer, RenderSettings};
use crate::sequence::sequencer::Sequencer;

/// Options for [`plan_export`] and [`export_to_mp4`].
#[derive(Clone, Debug)]
pub struct ExportOpts {
    /// Output frame rate (> 0).
    pub fps: u32,
    /// Raster settings applied to every frame.
    pub settings: RenderSettings,
    /// Render entries on a rayon pool.
    pub parallel: bool,
    /// Pool size when `parallel` is set; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Whether an existing output file may be replaced.
    pub overwrite: bool,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            fps: 5,
            settings: RenderSettings::default(),
            parallel: false,
            threads: None,
            overwrite: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Counters returned by an export.
pub struct ExportStats {
    /// Distinct renders (one per entry).
    pub frames_rendered: u64,
    /// Frames handed to the sink, repeats included.
    pub frames_written: u64,
}

/// Number of output frames one entry occupies: `max(1, round(fps * duration_ms / 1000))`.
pub fn repeat_count(fps: u32, duration_ms: u32) -> u64 {
    let scaled = u64::from(fps) * u64::from(duration_ms);
    ((scaled + 500) / 1000).max(1)
}

#[derive(Clone, Debug)]
/// One rendered entry with its repeat count.
pub struct PlannedFrame {
    /// Entry index in the sequence.
    pub index: usize,
    /// Viewport the entry was rendered with.
    pub viewport: Viewport,
    /// Rendered pixels.
    pub pixels: PixelBuffer,
    /// How many times the pixels are written.
    pub repeats: u64,
}

#[derive(Clone, Debug)]
/// Fully rendered export, ready to stream.
///
/// Building the plan does all the fallible rendering work up front, so a sink never receives a
/// partial stream because of a bad entry.
pub struct ExportPlan {
    /// Pixel width shared by every frame.
    pub width: u32,
    /// Pixel height shared by every frame.
    pub height: u32,
    /// Output frame rate.
    pub fps: u32,
    /// Entries in order.
    pub frames: Vec<PlannedFrame>,
}

impl ExportPlan {
    /// Total frames the stream will contain.
    pub fn total_frames(&self) -> u64 {
        self.frames.iter().map(|f| f.repeats).sum()
    }

    /// Stream every frame into `sink`: `begin`, every repeat in order, then `end`.
    pub fn write_to(&self, sink: &mut dyn FrameSink) -> StickgridResult<ExportStats> {
        sink.begin(SinkConfig {
            width: self.width,
            height: self.height,
            fps: self.fps,
        })?;

        let mut stats = ExportStats {
            frames_rendered: self.frames.len() as u64,
            frames_written: 0,
        };
        for planned in &self.frames {
            for _ in 0..planned.repeats {
                sink.push_frame(stats.frames_written, &planned.pixels)?;
                stats.frames_written += 1;
            }
            tracing::debug!(
                index = planned.index,
                repeats = planned.repeats,
                "exported entry"
            );
        }
        sink.end()?;
        Ok(stats)
    }
}

/// Resolve viewports and render every entry of `seq`.
#[tracing::instrument(level = "debug", skip(seq), fields(entries = seq.len()))]
pub fn plan_export(seq: &Sequencer, opts: &ExportOpts) -> StickgridResult<ExportPlan> {
    if opts.fps == 0 {
        return Err(StickgridError::invalid_argument("export fps must be > 0"));
    }
    if seq.is_empty() {
        return Err(StickgridError::invalid_argument(
            "cannot export an empty sequence",
        ));
    }
    opts.settings.validate()?;

    let locked = seq.locked_viewport();
    let viewports = (0..seq.len())
        .map(|i| seq.viewport_with(i, locked))
        .collect::<StickgridResult<Vec<_>>>()?;

    let render = |i: usize| seq.render_entry(i, &opts.settings, Some(viewports[i]));
    let rendered: Vec<StickgridResult<PixelBuffer>> = if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        pool.install(|| (0..seq.len()).into_par_iter().map(render).collect())
    } else {
        (0..seq.len()).map(render).collect()
    };

    let mut frames = Vec::with_capacity(rendered.len());
    for (index, pixels) in rendered.into_iter().enumerate() {
        frames.push(PlannedFrame {
            index,
            viewport: viewports[index],
            pixels: pixels?,
            repeats: repeat_count(opts.fps, seq.entries()[index].duration_ms),
        });
    }

    let (width, height) = (frames[0].pixels.width, frames[0].pixels.height);
    if let Some(odd) = frames
        .iter()
        .find(|f| f.pixels.width != width || f.pixels.height != height)
    {
        return Err(StickgridError::invalid_argument(format!(
            "frame {} renders at {}x{} but frame 0 renders at {width}x{height}; \
             lock the viewport or use a fixed mode to export",
            odd.index, odd.pixels.width, odd.pixels.height
        )));
    }

    Ok(ExportPlan {
        width,
        height,
        fps: opts.fps,
        frames,
    })
}

/// Render `seq` and stream it into `sink`.
pub fn export_to_sink(
    seq: &Sequencer,
    opts: &ExportOpts,
    sink: &mut dyn FrameSink,
) -> StickgridResult<ExportStats> {
    plan_export(seq, opts)?.write_to(sink)
}

/// Render `seq` to an MP4 file through the system `ffmpeg` binary.
///
/// Rendering happens before ffmpeg is spawned, so a bad entry never leaves a half-written file.
pub fn export_to_mp4(
    seq: &Sequencer,
    out_path: impl Into<PathBuf>,
    opts: &ExportOpts,
) -> StickgridResult<ExportStats> {
    let plan = plan_export(seq, opts)?;
    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        out_path: out_path.into(),
        overwrite: opts.overwrite,
    });
    let stats = plan.write_to(&mut sink)?;
    tracing::debug!(frames = stats.frames_written, "mp4 export finished");
    Ok(stats)
}

fn build_thread_pool(threads: Option<usize>) -> StickgridResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StickgridError::invalid_argument(
            "export 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        StickgridError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/export.rs"]
mod tests;
