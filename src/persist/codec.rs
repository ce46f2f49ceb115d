//! JSON documents for frames and animations.
//!
//! Decoding is tolerant: anything that can be recovered with a documented default is recovered
//! (with a `warn!`), including fields of the wrong JSON type. Only a missing `frames` array or
//! invalid JSON fails the load.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use serde::ser::{SerializeMap as _, Serializer};
use serde_json::Value;

use crate::foundation::core::{
    Cell, CellCoord, ColorSpec, DEFAULT_GRID_DIMENSIONS, GridDimensions,
};
use crate::foundation::error::{StickgridError, StickgridResult};
use crate::frame::model::Frame;
use crate::grid::sparse::SparseGrid;
use crate::sequence::sequencer::{DEFAULT_DURATION_MS, SequenceEntry, Sequencer};
use crate::viewport::resolver::{ViewportMode, ViewportPolicy};

// Every field is read as a raw value so one mistyped field degrades to its default instead of
// failing the whole document. `null` and absent fields read the same.
#[derive(Debug, Default, serde::Deserialize)]
struct FrameDef {
    #[serde(default)]
    name: Value,
    #[serde(default)]
    boxes: Value,
    #[serde(default)]
    default_color: Value,
    #[serde(default)]
    grid_width: Value,
    #[serde(default)]
    grid_height: Value,
    #[serde(default)]
    joints: Value,
    #[serde(default)]
    stick_figure_color: Value,
}

#[derive(Debug, serde::Deserialize)]
struct AnimationDef {
    #[serde(default)]
    frames: Value,
    #[serde(default)]
    timings: Value,
    #[serde(default)]
    backgrounds: Value,
    #[serde(default)]
    frame_names: Value,
    #[serde(default)]
    background_names: Value,
    #[serde(default)]
    viewport_mode: Value,
    #[serde(default)]
    viewport_padding: Value,
    #[serde(default)]
    viewport_min_w: Value,
    #[serde(default)]
    viewport_min_h: Value,
    #[serde(default)]
    lock_viewport: Value,
}

#[derive(serde::Serialize)]
struct FrameOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    boxes: RowMajorBoxes<'a>,
    default_color: Cell,
    grid_width: u32,
    grid_height: u32,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    joints: BTreeMap<&'a str, [u32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stick_figure_color: Option<&'a str>,
}

impl<'a> FrameOut<'a> {
    fn new(frame: &'a Frame) -> Self {
        Self {
            name: frame.name.as_deref(),
            boxes: RowMajorBoxes(&frame.boxes),
            default_color: frame.default_color,
            grid_width: frame.dimensions.width,
            grid_height: frame.dimensions.height,
            joints: frame
                .joints
                .iter()
                .map(|(k, c)| (k.as_str(), [c.row, c.col]))
                .collect(),
            stick_figure_color: frame.style_override.as_ref().map(ColorSpec::as_str),
        }
    }
}

/// `"row,col"` keys written in row-major order rather than string order.
struct RowMajorBoxes<'a>(&'a SparseGrid);

impl serde::Serialize for RowMajorBoxes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (c, v) in self.0.iter() {
            map.serialize_entry(&format!("{},{}", c.row, c.col), &v)?;
        }
        map.end()
    }
}

#[derive(serde::Serialize)]
struct AnimationOut<'a> {
    frames: Vec<FrameOut<'a>>,
    timings: Vec<u32>,
    backgrounds: Vec<Option<FrameOut<'a>>>,
    frame_names: Vec<&'a str>,
    background_names: Vec<&'a str>,
    viewport_mode: &'static str,
    viewport_padding: u32,
    viewport_min_w: u32,
    viewport_min_h: u32,
    lock_viewport: bool,
}

#[derive(Clone, Debug)]
/// Decoded animation file, ready to install into a [`Sequencer`].
pub struct AnimationDocument {
    /// Entries in order, every default already synthesised.
    pub entries: Vec<SequenceEntry>,
    /// Persisted viewport policy.
    pub policy: ViewportPolicy,
}

impl AnimationDocument {
    /// Build a sequencer holding this document.
    pub fn into_sequencer(self) -> Sequencer {
        let mut seq = Sequencer::new();
        seq.replace_all(self.entries, self.policy);
        seq
    }
}

/// Serialize one frame as pretty JSON.
pub fn frame_to_json(frame: &Frame) -> StickgridResult<String> {
    Ok(serde_json::to_string_pretty(&FrameOut::new(frame)).context("serialize frame json")?)
}

/// Parse one frame document.
#[tracing::instrument(level = "debug", skip(json), fields(bytes = json.len()))]
pub fn frame_from_json(json: &str) -> StickgridResult<Frame> {
    let def: FrameDef = serde_json::from_str(json)
        .map_err(|e| StickgridError::malformed(format!("parse frame JSON: {e}")))?;
    Ok(frame_from_def(def, "frame"))
}

/// Read a frame file.
pub fn load_frame(path: &Path) -> StickgridResult<Frame> {
    let json = std::fs::read_to_string(path).map_err(|e| StickgridError::from_fs(e, path))?;
    frame_from_json(&json).map_err(|e| with_path(e, path))
}

/// Write a frame file.
pub fn save_frame(frame: &Frame, path: &Path) -> StickgridResult<()> {
    write_document(path, &frame_to_json(frame)?)
}

/// Serialize a whole sequence, including its viewport policy.
pub fn animation_to_json(seq: &Sequencer) -> StickgridResult<String> {
    let entries = seq.entries();
    let policy = seq.policy();
    let out = AnimationOut {
        frames: entries.iter().map(|e| FrameOut::new(&e.frame)).collect(),
        timings: entries.iter().map(|e| e.duration_ms).collect(),
        backgrounds: entries
            .iter()
            .map(|e| e.background.as_deref().map(FrameOut::new))
            .collect(),
        frame_names: entries.iter().map(|e| e.label.as_str()).collect(),
        background_names: entries.iter().map(|e| e.background_label.as_str()).collect(),
        viewport_mode: policy.mode.as_str(),
        viewport_padding: policy.padding,
        viewport_min_w: policy.min_width,
        viewport_min_h: policy.min_height,
        lock_viewport: policy.lock_to_union,
    };
    Ok(serde_json::to_string_pretty(&out).context("serialize animation json")?)
}

/// Parse an animation document.
#[tracing::instrument(level = "debug", skip(json), fields(bytes = json.len()))]
pub fn animation_from_json(json: &str) -> StickgridResult<AnimationDocument> {
    let def: AnimationDef = serde_json::from_str(json)
        .map_err(|e| StickgridError::malformed(format!("parse animation JSON: {e}")))?;
    let policy = decode_policy(&def);
    let Value::Array(frames) = def.frames else {
        return Err(StickgridError::malformed(
            "animation document has no 'frames' array",
        ));
    };

    let n = frames.len();
    let mut timings = array_field(def.timings, "timings").into_iter();
    let mut backgrounds = array_field(def.backgrounds, "backgrounds").into_iter();
    let mut frame_names = array_field(def.frame_names, "frame_names").into_iter();
    let mut background_names = array_field(def.background_names, "background_names").into_iter();

    let mut entries = Vec::with_capacity(n);
    for (i, frame_value) in frames.into_iter().enumerate() {
        let frame = frame_from_value(frame_value, &format!("frame {i}"))?;
        let duration_ms = decode_timing(timings.next(), i);
        let background = match backgrounds.next() {
            None | Some(Value::Null) => None,
            Some(bg @ Value::Object(_)) => Some(Arc::new(frame_from_value(
                bg,
                &format!("background {i}"),
            )?)),
            Some(other) => {
                tracing::warn!(index = i, value = %other, "background is not an object; ignoring it");
                None
            }
        };
        let label = decode_label(frame_names.next(), i, "frame_names")
            .unwrap_or_else(|| format!("Frame_{}.json", i + 1));
        let background_label = match background {
            Some(_) => decode_label(background_names.next(), i, "background_names")
                .unwrap_or_default(),
            None => {
                background_names.next();
                String::new()
            }
        };

        entries.push(SequenceEntry {
            frame: Arc::new(frame),
            background,
            duration_ms,
            label,
            background_label,
        });
    }
    if timings.next().is_some() || backgrounds.next().is_some() {
        tracing::warn!(frames = n, "animation arrays longer than 'frames'; extra items ignored");
    }

    tracing::debug!(frames = n, ?policy, "decoded animation");
    Ok(AnimationDocument { entries, policy })
}

/// Read an animation file.
pub fn load_animation(path: &Path) -> StickgridResult<AnimationDocument> {
    let json = std::fs::read_to_string(path).map_err(|e| StickgridError::from_fs(e, path))?;
    animation_from_json(&json).map_err(|e| with_path(e, path))
}

/// Write an animation file.
pub fn save_animation(seq: &Sequencer, path: &Path) -> StickgridResult<()> {
    write_document(path, &animation_to_json(seq)?)
}

fn write_document(path: &Path, json: &str) -> StickgridResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| StickgridError::from_fs(e, parent))?;
    }
    std::fs::write(path, json).map_err(|e| StickgridError::from_fs(e, path))
}

fn with_path(err: StickgridError, path: &Path) -> StickgridError {
    match err {
        StickgridError::MalformedData(msg) => {
            StickgridError::malformed(format!("'{}': {msg}", path.display()))
        }
        other => other,
    }
}

fn frame_from_value(value: Value, what: &str) -> StickgridResult<Frame> {
    let def = match value {
        Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| StickgridError::malformed(format!("{what}: {e}")))?,
        other => {
            tracing::warn!(%what, value = %other, "frame is not an object; using an empty grid");
            FrameDef::default()
        }
    };
    Ok(frame_from_def(def, what))
}

fn frame_from_def(def: FrameDef, what: &str) -> Frame {
    let width = field(def.grid_width, what, "grid_width", grid_extent)
        .unwrap_or(DEFAULT_GRID_DIMENSIONS.width);
    let height = field(def.grid_height, what, "grid_height", grid_extent)
        .unwrap_or(DEFAULT_GRID_DIMENSIONS.height);
    let dimensions = GridDimensions { width, height };

    let default_color = field(def.default_color, what, "default_color", integer).unwrap_or(0);
    let mut frame = Frame::new(dimensions, default_color);
    frame.name = field(def.name, what, "name", owned_str);

    for (key, value) in object_field(def.boxes, what, "boxes") {
        let Some(coord) = parse_box_key(&key, dimensions) else {
            tracing::warn!(%what, key = %key, "skipping malformed or off-grid box key");
            continue;
        };
        let Some(cell) = cell_value(&value) else {
            tracing::warn!(%what, key = %key, %value, "skipping non-integer box value");
            continue;
        };
        frame.boxes.insert(coord, cell);
    }

    for (name, value) in object_field(def.joints, what, "joints") {
        match joint_coord(&value, dimensions) {
            Some(at) => {
                frame.joints.insert(name, at);
            }
            None => tracing::warn!(%what, joint = %name, %value, "skipping invalid joint"),
        }
    }

    if let Some(raw) = field(def.stick_figure_color, what, "stick_figure_color", owned_str) {
        match ColorSpec::parse(&raw) {
            Ok(spec) => frame.style_override = Some(spec),
            Err(e) => tracing::warn!(%what, error = %e, "ignoring stick_figure_color"),
        }
    }
    frame
}

/// Typed read of one loosely typed field. `null` is absent; a value of the wrong shape is
/// logged and treated as absent.
fn field<T>(
    value: Value,
    what: &str,
    key: &str,
    read: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    if value.is_null() {
        return None;
    }
    let out = read(&value);
    if out.is_none() {
        tracing::warn!(%what, field = key, %value, "ignoring field with an unusable value");
    }
    out
}

fn object_field(value: Value, what: &str, key: &str) -> serde_json::Map<String, Value> {
    match value {
        Value::Null => serde_json::Map::new(),
        Value::Object(map) => map,
        other => {
            tracing::warn!(%what, field = key, value = %other, "expected an object; ignoring it");
            serde_json::Map::new()
        }
    }
}

fn array_field(value: Value, key: &str) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => {
            tracing::warn!(field = key, value = %other, "expected an array; using defaults");
            Vec::new()
        }
    }
}

fn owned_str(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn grid_extent(value: &Value) -> Option<u32> {
    integer(value)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n > 0)
}

fn decode_label(value: Option<Value>, index: usize, key: &str) -> Option<String> {
    field(value?, &format!("entry {index}"), key, owned_str)
}

/// Parse a `"row,col"` key that lies on the grid.
pub fn parse_box_key(key: &str, dims: GridDimensions) -> Option<CellCoord> {
    let (r, c) = key.split_once(',')?;
    let row: i64 = r.trim().parse().ok()?;
    let col: i64 = c.trim().parse().ok()?;
    dims.coord(row, col)
}

/// Integer, also accepting integral floats such as `3.0`.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        _ => None,
    }
}

fn cell_value(value: &Value) -> Option<Cell> {
    match value {
        Value::Bool(b) => Some(Cell::from(*b)),
        other => integer(other),
    }
}

fn joint_coord(value: &Value, dims: GridDimensions) -> Option<CellCoord> {
    let pair = value.as_array()?;
    if pair.len() != 2 {
        return None;
    }
    dims.coord(pair[0].as_i64()?, pair[1].as_i64()?)
}

fn decode_timing(value: Option<Value>, index: usize) -> u32 {
    let Some(value) = value else {
        return DEFAULT_DURATION_MS;
    };
    let ms = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64));
    match ms {
        Some(ms) if ms > 0 => u32::try_from(ms).unwrap_or(u32::MAX),
        _ => {
            tracing::warn!(index, %value, "invalid timing, using the default duration");
            DEFAULT_DURATION_MS
        }
    }
}

fn decode_policy(def: &AnimationDef) -> ViewportPolicy {
    let defaults = ViewportPolicy::default();
    let what = "animation";
    let clamped = |v: &Value, key: &str, floor: u32, fallback: u32| -> u32 {
        field(v.clone(), what, key, integer)
            .map(|v| v.clamp(i64::from(floor), i64::from(u32::MAX)) as u32)
            .unwrap_or(fallback)
    };
    ViewportPolicy {
        mode: field(def.viewport_mode.clone(), what, "viewport_mode", |v| {
            v.as_str().map(ViewportMode::from_name_lossy)
        })
        .unwrap_or(defaults.mode),
        padding: clamped(&def.viewport_padding, "viewport_padding", 0, defaults.padding),
        min_width: clamped(&def.viewport_min_w, "viewport_min_w", 1, defaults.min_width),
        min_height: clamped(&def.viewport_min_h, "viewport_min_h", 1, defaults.min_height),
        lock_to_union: field(def.lock_viewport.clone(), what, "lock_viewport", Value::as_bool)
            .unwrap_or(defaults.lock_to_union),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/persist/codec.rs"]
mod tests;
