use crate::foundation::core::{GridDimensions, Viewport};
use crate::frame::model::Frame;
use crate::grid::sparse::CellBounds;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// How a viewport is chosen for a frame.
pub enum ViewportMode {
    /// Entire grid.
    #[default]
    Full,
    /// Centred half-size window.
    Half,
    /// Crop to painted content (persisted as `"stick-figure"`).
    ContentBoundingBox,
}

impl ViewportMode {
    /// Persisted name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Half => "half",
            Self::ContentBoundingBox => "stick-figure",
        }
    }

    /// Parse a persisted name; unknown names fall back to [`ViewportMode::Full`].
    pub fn from_name_lossy(name: &str) -> Self {
        match name.parse() {
            Ok(mode) => mode,
            Err(()) => {
                tracing::warn!(mode = name, "unknown viewport mode, using full grid");
                Self::Full
            }
        }
    }
}

impl std::str::FromStr for ViewportMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "half" => Ok(Self::Half),
            "stick-figure" | "content" | "bbox" => Ok(Self::ContentBoundingBox),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ViewportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Viewport selection settings shared by display, playback and export.
pub struct ViewportPolicy {
    /// Selection mode.
    pub mode: ViewportMode,
    /// Cells added around content on every side.
    pub padding: u32,
    /// Minimum viewport width in cells (values below 1 are treated as 1).
    pub min_width: u32,
    /// Minimum viewport height in cells (values below 1 are treated as 1).
    pub min_height: u32,
    /// Use one viewport covering all frames instead of one per frame.
    pub lock_to_union: bool,
}

impl Default for ViewportPolicy {
    fn default() -> Self {
        Self {
            mode: ViewportMode::Full,
            padding: 2,
            min_width: 16,
            min_height: 16,
            lock_to_union: true,
        }
    }
}

impl ViewportPolicy {
    /// Whether playback/export should share a single union viewport.
    ///
    /// The lock wins over `mode`: a locked policy always crops to the padded content union.
    pub fn uses_union(&self) -> bool {
        self.lock_to_union
    }
}

/// Viewport for one frame.
#[tracing::instrument(level = "trace", skip(frame), fields(boxes = frame.boxes.len()))]
pub fn resolve_viewport(frame: &Frame, policy: &ViewportPolicy) -> Viewport {
    let dims = frame.dimensions;
    match policy.mode {
        ViewportMode::Full => Viewport::full(dims),
        ViewportMode::Half => half_viewport(dims),
        ViewportMode::ContentBoundingBox => match frame.content_bounds() {
            Some(b) => fit_bounds(clamp_bounds(b, dims), dims, policy),
            None => centered_minimum(dims, policy),
        },
    }
}

/// One viewport covering the painted content of every frame.
///
/// Grid size comes from the first frame; `fallback_dims` is used for an empty list, which
/// resolves to the full grid. A list without any painted cell resolves to the centred minimum
/// window.
#[tracing::instrument(level = "debug", skip(frames))]
pub fn resolve_union_viewport(
    frames: &[&Frame],
    policy: &ViewportPolicy,
    fallback_dims: GridDimensions,
) -> Viewport {
    let Some(first) = frames.first() else {
        return Viewport::full(fallback_dims);
    };
    let dims = first.dimensions;

    let union = frames
        .iter()
        .filter_map(|f| f.content_bounds())
        .map(|b| clamp_bounds(b, dims))
        .reduce(CellBounds::union);

    let vp = match union {
        Some(b) => fit_bounds(b, dims, policy),
        None => centered_minimum(dims, policy),
    };
    tracing::debug!(?vp, frames = frames.len(), "resolved union viewport");
    vp
}

fn half_viewport(dims: GridDimensions) -> Viewport {
    let width = (dims.width / 2).max(1);
    let height = (dims.height / 2).max(1);
    Viewport {
        x0: (dims.width - width) / 2,
        y0: (dims.height - height) / 2,
        width,
        height,
    }
}

fn centered_minimum(dims: GridDimensions, policy: &ViewportPolicy) -> Viewport {
    let width = dims.width.min(policy.min_width.max(1));
    let height = dims.height.min(policy.min_height.max(1));
    Viewport {
        x0: (dims.width - width) / 2,
        y0: (dims.height - height) / 2,
        width,
        height,
    }
}

fn clamp_bounds(b: CellBounds, dims: GridDimensions) -> CellBounds {
    let max_row = dims.height - 1;
    let max_col = dims.width - 1;
    CellBounds {
        min_row: b.min_row.min(max_row),
        max_row: b.max_row.min(max_row),
        min_col: b.min_col.min(max_col),
        max_col: b.max_col.min(max_col),
    }
}

/// Pad, enforce the minimum size, and clamp content bounds into a viewport.
fn fit_bounds(b: CellBounds, dims: GridDimensions, policy: &ViewportPolicy) -> Viewport {
    let (x0, x1) = fit_axis(
        b.min_col,
        b.max_col,
        policy.padding,
        policy.min_width.max(1),
        dims.width,
    );
    let (y0, y1) = fit_axis(
        b.min_row,
        b.max_row,
        policy.padding,
        policy.min_height.max(1),
        dims.height,
    );

    let width = (x1 - x0 + 1).min(i64::from(dims.width));
    let height = (y1 - y0 + 1).min(i64::from(dims.height));
    let x0 = x0.min(i64::from(dims.width) - width).max(0);
    let y0 = y0.min(i64::from(dims.height) - height).max(0);

    Viewport {
        x0: x0 as u32,
        y0: y0 as u32,
        width: width as u32,
        height: height as u32,
    }
}

/// Inclusive `[lo, hi]` span along one axis of length `extent`.
///
/// Padding is clamped at both edges. Growth to `min_len` is split evenly (remainder on the
/// high side); whatever one side cannot take because it hit the edge goes to the other side.
/// The span only stays below `min_len` when the whole axis is shorter.
fn fit_axis(lo: u32, hi: u32, padding: u32, min_len: u32, extent: u32) -> (i64, i64) {
    let last = i64::from(extent) - 1;
    let pad = i64::from(padding);
    let mut lo = (i64::from(lo) - pad).max(0);
    let mut hi = (i64::from(hi) + pad).min(last);

    let target = i64::from(min_len.min(extent));
    let len = hi - lo + 1;
    if len < target {
        let extra = target - len;
        let before = extra / 2;
        let after = extra - before;
        lo = (lo - before).max(0);
        hi = (hi + after).min(last);

        let short = target - (hi - lo + 1);
        if short > 0 {
            let up = short.min(last - hi);
            hi += up;
            lo = (lo - (short - up)).max(0);
        }
    }
    (lo, hi)
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/resolver.rs"]
mod tests;
