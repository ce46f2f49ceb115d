use std::collections::BTreeMap;

use crate::foundation::core::{Cell, CellCoord, ColorSpec, GridDimensions};
use crate::foundation::error::StickgridResult;
use crate::grid::sparse::{CellBounds, MoveOutcome, SelectionRect, SparseGrid};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Snapshot of painted cells plus grid metadata; the atomic unit of an animation.
///
/// Frames are plain data. Renderers only read them; edits go through the explicit move
/// operations below.
pub struct Frame {
    /// Optional display name.
    pub name: Option<String>,
    /// Grid size this frame was painted on.
    pub dimensions: GridDimensions,
    /// Fill value of the grid; entries equal to it are not painted.
    pub default_color: Cell,
    /// Cells that differ from `default_color`.
    pub boxes: SparseGrid,
    /// Tint for every ink cell of this frame when used as the foreground.
    pub style_override: Option<ColorSpec>,
    /// Named joint markers.
    pub joints: BTreeMap<String, CellCoord>,
}

/// Background layer; same shape as a frame.
pub type Background = Frame;

impl Frame {
    /// Empty frame.
    pub fn new(dimensions: GridDimensions, default_color: Cell) -> Self {
        Self {
            name: None,
            dimensions,
            default_color,
            boxes: SparseGrid::new(),
            style_override: None,
            joints: BTreeMap::new(),
        }
    }

    /// Builder-style name setter.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder-style cell setter; coordinates off the grid are ignored.
    pub fn with_cell(mut self, row: u32, col: u32, value: Cell) -> Self {
        if self.dimensions.contains(i64::from(row), i64::from(col)) {
            self.boxes.insert(CellCoord::new(row, col), value);
        }
        self
    }

    /// Entries whose value differs from this frame's default.
    pub fn painted(&self) -> impl Iterator<Item = (CellCoord, Cell)> + '_ {
        self.boxes.painted(self.default_color)
    }

    /// Bounding box of painted cells.
    pub fn content_bounds(&self) -> Option<CellBounds> {
        self.boxes.bounds(self.default_color)
    }

    /// Move every entry inside `rect` by `(dr, dc)` as one batch.
    pub fn move_selection(
        &mut self,
        rect: SelectionRect,
        dr: i64,
        dc: i64,
    ) -> StickgridResult<MoveOutcome> {
        let bounds = rect.clip_to(self.dimensions)?;
        let sources = self.boxes.coords_within(bounds);
        Ok(self.apply_move(&sources, dr, dc))
    }

    /// Move the listed coordinates by `(dr, dc)` as one batch. Off-grid or unpainted coordinates
    /// are ignored.
    pub fn translate_cells(&mut self, coords: &[(i64, i64)], dr: i64, dc: i64) -> MoveOutcome {
        let sources: Vec<CellCoord> = coords
            .iter()
            .filter_map(|&(r, c)| self.dimensions.coord(r, c))
            .collect();
        self.apply_move(&sources, dr, dc)
    }

    fn apply_move(&mut self, sources: &[CellCoord], dr: i64, dc: i64) -> MoveOutcome {
        let outcome = self.boxes.move_cells(sources, dr, dc, self.dimensions);
        if self.joints.is_empty() {
            return outcome;
        }

        let moved: BTreeMap<CellCoord, CellCoord> = outcome.moved.iter().copied().collect();
        self.joints.retain(|_, at| !outcome.dropped.contains(at));
        for at in self.joints.values_mut() {
            if let Some(dst) = moved.get(at) {
                *at = *dst;
            }
        }
        outcome
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/model.rs"]
mod tests;
