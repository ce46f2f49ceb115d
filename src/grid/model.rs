use std::collections::BTreeMap;

use crate::foundation::core::{Cell, CellCoord, GridDimensions, contrast_color};
use crate::foundation::error::{StickgridError, StickgridResult};
use crate::frame::model::Frame;
use crate::grid::sparse::SparseGrid;

/// Dense edit buffer with shape-drawing primitives.
///
/// Drawing never fails because a target cell is off the grid; such cells are clipped. The one
/// exception is [`GridModel::draw_line`], whose endpoints must both be on the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridModel {
    dims: GridDimensions,
    default_color: Cell,
    cells: Vec<Cell>,
}

impl GridModel {
    /// Grid filled with `default_color`.
    pub fn new(dims: GridDimensions, default_color: Cell) -> Self {
        Self {
            dims,
            default_color,
            cells: vec![default_color; dims.cell_count()],
        }
    }

    /// Grid initialised from a frame's painted boxes. Boxes outside the grid are skipped.
    pub fn from_frame(frame: &Frame) -> Self {
        let mut g = Self::new(frame.dimensions, frame.default_color);
        g.apply_boxes(&frame.boxes);
        g
    }

    /// Grid size.
    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    /// Fill value.
    pub fn default_color(&self) -> Cell {
        self.default_color
    }

    /// Reset every cell to the default.
    pub fn clear(&mut self) {
        self.cells.fill(self.default_color);
    }

    /// Clear, then write every entry of `boxes` that lands on the grid.
    pub fn apply_boxes(&mut self, boxes: &SparseGrid) {
        self.clear();
        for (c, v) in boxes.iter() {
            self.set_cell(i64::from(c.row), i64::from(c.col), v);
        }
    }

    fn index(&self, row: i64, col: i64) -> Option<usize> {
        if self.dims.contains(row, col) {
            Some(row as usize * self.dims.width as usize + col as usize)
        } else {
            None
        }
    }

    /// Value at `(row, col)`, or `None` off the grid.
    pub fn get(&self, row: i64, col: i64) -> Option<Cell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Write `value` at `(row, col)`. Returns `false` (and does nothing) off the grid.
    pub fn set_cell(&mut self, row: i64, col: i64, value: Cell) -> bool {
        match self.index(row, col) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Flip a cell between the default and its contrast value.
    pub fn toggle(&mut self, row: i64, col: i64) -> bool {
        let Some(i) = self.index(row, col) else {
            return false;
        };
        self.cells[i] = if self.cells[i] == self.default_color {
            contrast_color(self.default_color)
        } else {
            self.default_color
        };
        true
    }

    /// Integer Bresenham line from `(r0, c0)` to `(r1, c1)`, both endpoints inclusive.
    ///
    /// The major axis is whichever of `|dx|`, `|dy|` is larger (ties step along rows). Both
    /// endpoints must be on the grid; otherwise nothing is drawn and `IndexOutOfRange` is
    /// returned.
    pub fn draw_line(
        &mut self,
        r0: i64,
        c0: i64,
        r1: i64,
        c1: i64,
        color: Cell,
    ) -> StickgridResult<()> {
        if !self.dims.contains(r0, c0) || !self.dims.contains(r1, c1) {
            return Err(StickgridError::index_out_of_range(format!(
                "line endpoints ({r0},{c0})-({r1},{c1}) must lie within {}x{} grid",
                self.dims.width, self.dims.height
            )));
        }

        for (r, c) in line_cells(r0, c0, r1, c1) {
            self.set_cell(r, c, color);
        }
        Ok(())
    }

    /// Midpoint circle centred on column `cx`, row `cy`; off-grid points are clipped.
    pub fn draw_circle(&mut self, cx: i64, cy: i64, radius: i64, color: Cell) -> StickgridResult<()> {
        if radius < 1 {
            return Err(StickgridError::invalid_argument(format!(
                "circle radius must be >= 1, got {radius}"
            )));
        }

        for (r, c) in circle_cells(cx, cy, radius) {
            self.set_cell(r, c, color);
        }
        Ok(())
    }

    /// Smallest drawable circle (radius 1, three cells across).
    pub fn draw_minimum_circle(&mut self, cx: i64, cy: i64, color: Cell) -> StickgridResult<()> {
        self.draw_circle(cx, cy, 1, color)
    }

    /// Every cell whose value differs from the default.
    pub fn diff_from_default(&self) -> SparseGrid {
        let w = self.dims.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != self.default_color)
            .map(|(i, v)| (CellCoord::new((i / w) as u32, (i % w) as u32), *v))
            .collect()
    }

    /// Snapshot the painted cells as a frame.
    pub fn to_frame(&self, name: Option<String>) -> Frame {
        Frame {
            name,
            dimensions: self.dims,
            default_color: self.default_color,
            boxes: self.diff_from_default(),
            style_override: None,
            joints: BTreeMap::new(),
        }
    }
}

/// Cells visited by the Bresenham line from `(r0, c0)` to `(r1, c1)`, in drawing order.
pub fn line_cells(r0: i64, c0: i64, r1: i64, c1: i64) -> Vec<(i64, i64)> {
    let dx = (c1 - c0).abs();
    let dy = (r1 - r0).abs();
    let sx = if c0 < c1 { 1 } else { -1 };
    let sy = if r0 < r1 { 1 } else { -1 };
    let (mut x, mut y) = (c0, r0);
    let mut out = Vec::with_capacity((dx.max(dy) + 1) as usize);

    // Error terms are doubled so the half-step start stays integral.
    if dx > dy {
        let mut err = dx;
        while x != c1 {
            out.push((y, x));
            err -= 2 * dy;
            if err < 0 {
                y += sy;
                err += 2 * dx;
            }
            x += sx;
        }
    } else {
        let mut err = dy;
        while y != r1 {
            out.push((y, x));
            err -= 2 * dx;
            if err < 0 {
                x += sx;
                err += 2 * dy;
            }
            y += sy;
        }
    }
    out.push((y, x));
    out
}

/// `(row, col)` points of the midpoint circle, 8-way symmetric per step. May repeat points.
pub fn circle_cells(cx: i64, cy: i64, radius: i64) -> Vec<(i64, i64)> {
    let mut out = Vec::new();
    let (mut x, mut y) = (radius, 0i64);
    let mut d = 1 - radius;
    while x >= y {
        for (px, py) in [
            (cx + x, cy + y),
            (cx + y, cy + x),
            (cx - y, cy + x),
            (cx - x, cy + y),
            (cx - x, cy - y),
            (cx - y, cy - x),
            (cx + y, cy - x),
            (cx + x, cy - y),
        ] {
            out.push((py, px));
        }
        y += 1;
        if d <= 0 {
            d += 2 * y + 1;
        } else {
            x -= 1;
            d += 2 * (y - x) + 1;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/grid/model.rs"]
mod tests;
