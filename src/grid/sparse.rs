use std::collections::BTreeMap;

use crate::foundation::core::{Cell, CellCoord, GridDimensions};
use crate::foundation::error::{StickgridError, StickgridResult};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Cells that differ from a layer default, keyed by coordinate.
///
/// Entries holding the default value are tolerated; callers that need "painted" cells go through
/// [`SparseGrid::painted`].
pub struct SparseGrid {
    cells: BTreeMap<CellCoord, Cell>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Inclusive bounding box over cell coordinates.
pub struct CellBounds {
    /// Smallest row.
    pub min_row: u32,
    /// Largest row.
    pub max_row: u32,
    /// Smallest column.
    pub min_col: u32,
    /// Largest column.
    pub max_col: u32,
}

impl CellBounds {
    /// Bounds covering one cell.
    pub fn point(c: CellCoord) -> Self {
        Self {
            min_row: c.row,
            max_row: c.row,
            min_col: c.col,
            max_col: c.col,
        }
    }

    /// Grow to include `c`.
    pub fn include(&mut self, c: CellCoord) {
        self.min_row = self.min_row.min(c.row);
        self.max_row = self.max_row.max(c.row);
        self.min_col = self.min_col.min(c.col);
        self.max_col = self.max_col.max(c.col);
    }

    /// Smallest bounds covering both.
    pub fn union(self, other: CellBounds) -> Self {
        Self {
            min_row: self.min_row.min(other.min_row),
            max_row: self.max_row.max(other.max_row),
            min_col: self.min_col.min(other.min_col),
            max_col: self.max_col.max(other.max_col),
        }
    }

    /// Whether `c` lies inside the bounds.
    pub fn contains(self, c: CellCoord) -> bool {
        (self.min_row..=self.max_row).contains(&c.row)
            && (self.min_col..=self.max_col).contains(&c.col)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Inclusive rectangular selection `[r0..=r1] x [c0..=c1]` in signed grid units.
pub struct SelectionRect {
    /// First row.
    pub r0: i64,
    /// First column.
    pub c0: i64,
    /// Last row (inclusive).
    pub r1: i64,
    /// Last column (inclusive).
    pub c1: i64,
}

impl SelectionRect {
    /// Intersect with the grid, swapping reversed corners first.
    ///
    /// A selection that misses the grid entirely is `IndexOutOfRange`.
    pub fn clip_to(self, dims: GridDimensions) -> StickgridResult<CellBounds> {
        let (r0, r1) = (self.r0.min(self.r1), self.r0.max(self.r1));
        let (c0, c1) = (self.c0.min(self.c1), self.c0.max(self.c1));
        let max_row = i64::from(dims.height) - 1;
        let max_col = i64::from(dims.width) - 1;

        if r1 < 0 || c1 < 0 || r0 > max_row || c0 > max_col {
            return Err(StickgridError::index_out_of_range(format!(
                "selection rows {r0}..={r1}, cols {c0}..={c1} lies outside {}x{} grid",
                dims.width, dims.height
            )));
        }

        Ok(CellBounds {
            min_row: r0.max(0) as u32,
            max_row: r1.min(max_row) as u32,
            min_col: c0.max(0) as u32,
            max_col: c1.min(max_col) as u32,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Result of a batch move: where each surviving cell went, and which sources were dropped.
pub struct MoveOutcome {
    /// `(from, to)` pairs for cells written at their destination.
    pub moved: Vec<(CellCoord, CellCoord)>,
    /// Sources whose destination fell outside the grid.
    pub dropped: Vec<CellCoord>,
}

impl SparseGrid {
    /// Empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` at `c`, returning the previous entry.
    pub fn insert(&mut self, c: CellCoord, value: Cell) -> Option<Cell> {
        self.cells.insert(c, value)
    }

    /// Remove the entry at `c`.
    pub fn remove(&mut self, c: CellCoord) -> Option<Cell> {
        self.cells.remove(&c)
    }

    /// Entry at `c`, if any.
    pub fn get(&self, c: CellCoord) -> Option<Cell> {
        self.cells.get(&c).copied()
    }

    /// Whether an entry exists at `c`.
    pub fn contains(&self, c: CellCoord) -> bool {
        self.cells.contains_key(&c)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + '_ {
        self.cells.iter().map(|(c, v)| (*c, *v))
    }

    /// Entries whose value differs from `default_color`.
    pub fn painted(&self, default_color: Cell) -> impl Iterator<Item = (CellCoord, Cell)> + '_ {
        self.iter().filter(move |(_, v)| *v != default_color)
    }

    /// Bounding box of painted entries.
    pub fn bounds(&self, default_color: Cell) -> Option<CellBounds> {
        let mut it = self.painted(default_color).map(|(c, _)| c);
        let first = it.next()?;
        let mut b = CellBounds::point(first);
        for c in it {
            b.include(c);
        }
        Some(b)
    }

    /// Coordinates of entries inside `bounds`.
    pub fn coords_within(&self, bounds: CellBounds) -> Vec<CellCoord> {
        self.cells
            .keys()
            .copied()
            .filter(|c| bounds.contains(*c))
            .collect()
    }

    /// Move the entries at `sources` by `(dr, dc)` as one batch.
    ///
    /// Sources without an entry are ignored. All sources are removed before any destination is
    /// written, so a moved cell never overwrites another moved cell mid-operation. Destinations
    /// outside `dims` are dropped, not wrapped.
    pub fn move_cells(
        &mut self,
        sources: &[CellCoord],
        dr: i64,
        dc: i64,
        dims: GridDimensions,
    ) -> MoveOutcome {
        let mut lifted = Vec::with_capacity(sources.len());
        for &src in sources {
            if let Some(v) = self.cells.remove(&src) {
                lifted.push((src, v));
            }
        }

        let mut outcome = MoveOutcome::default();
        for (src, v) in lifted {
            match src.offset(dr, dc, dims) {
                Some(dst) => {
                    self.cells.insert(dst, v);
                    outcome.moved.push((src, dst));
                }
                None => outcome.dropped.push(src),
            }
        }
        outcome
    }
}

impl FromIterator<(CellCoord, Cell)> for SparseGrid {
    fn from_iter<T: IntoIterator<Item = (CellCoord, Cell)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/sparse.rs"]
mod tests;
