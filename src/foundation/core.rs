use crate::foundation::error::{StickgridError, StickgridResult};

/// Paint value stored in a grid cell.
///
/// Values are only ever compared by equality against a layer's default colour.
pub type Cell = i64;

/// Grid size used by the editor when a document does not carry one.
pub const DEFAULT_GRID_DIMENSIONS: GridDimensions = GridDimensions {
    width: 120,
    height: 72,
};

/// Contrast value for a layer default: `1` on a `0` default, `0` otherwise.
pub fn contrast_color(default_color: Cell) -> Cell {
    if default_color == 0 { 1 } else { 0 }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Fixed grid size in cells.
pub struct GridDimensions {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl GridDimensions {
    /// Build dimensions, rejecting empty grids.
    pub fn new(width: u32, height: u32) -> StickgridResult<Self> {
        if width == 0 || height == 0 {
            return Err(StickgridError::invalid_argument(format!(
                "grid dimensions must be > 0, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Whether a signed `(row, col)` pair addresses a cell of this grid.
    pub fn contains(self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && row < i64::from(self.height) && col < i64::from(self.width)
    }

    /// Checked conversion of a signed pair into an in-bounds coordinate.
    pub fn coord(self, row: i64, col: i64) -> Option<CellCoord> {
        if self.contains(row, col) {
            Some(CellCoord::new(row as u32, col as u32))
        } else {
            None
        }
    }

    /// Total number of cells.
    pub fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// In-bounds cell address. Ordering is row-major.
pub struct CellCoord {
    /// Row index (y).
    pub row: u32,
    /// Column index (x).
    pub col: u32,
}

impl CellCoord {
    /// Build a coordinate.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Offset by a signed delta, returning `None` when the result leaves `dims`.
    pub fn offset(self, dr: i64, dc: i64, dims: GridDimensions) -> Option<Self> {
        dims.coord(i64::from(self.row) + dr, i64::from(self.col) + dc)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Rectangular crop window in grid-cell units.
pub struct Viewport {
    /// First column shown.
    pub x0: u32,
    /// First row shown.
    pub y0: u32,
    /// Number of columns shown (> 0).
    pub width: u32,
    /// Number of rows shown (> 0).
    pub height: u32,
}

impl Viewport {
    /// The whole grid.
    pub fn full(dims: GridDimensions) -> Self {
        Self {
            x0: 0,
            y0: 0,
            width: dims.width,
            height: dims.height,
        }
    }

    /// Whether `(row, col)` is inside the window.
    pub fn contains(self, row: u32, col: u32) -> bool {
        col >= self.x0
            && row >= self.y0
            && u64::from(col) < u64::from(self.x0) + u64::from(self.width)
            && u64::from(row) < u64::from(self.y0) + u64::from(self.height)
    }

    /// Whether the window is non-empty and fully inside `dims`.
    pub fn is_within(self, dims: GridDimensions) -> bool {
        self.width > 0
            && self.height > 0
            && u64::from(self.x0) + u64::from(self.width) <= u64::from(dims.width)
            && u64::from(self.y0) + u64::from(self.height) <= u64::from(dims.height)
    }

    /// Whether `other` lies entirely inside this window.
    pub fn covers(self, other: Viewport) -> bool {
        other.x0 >= self.x0
            && other.y0 >= self.y0
            && u64::from(other.x0) + u64::from(other.width)
                <= u64::from(self.x0) + u64::from(self.width)
            && u64::from(other.y0) + u64::from(other.height)
                <= u64::from(self.y0) + u64::from(self.height)
    }

    /// Shrink and shift the window until it lies inside `dims`.
    pub fn clamp_to(self, dims: GridDimensions) -> Viewport {
        let width = self.width.clamp(1, dims.width);
        let height = self.height.clamp(1, dims.height);
        Viewport {
            x0: self.x0.min(dims.width - width),
            y0: self.y0.min(dims.height - height),
            width,
            height,
        }
    }

    /// Pixel size of the rendered window for a given cell size.
    pub fn pixel_size(self, cell_size: u32) -> StickgridResult<(u32, u32)> {
        let w = self.width.checked_mul(cell_size);
        let h = self.height.checked_mul(cell_size);
        match (w, h) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(StickgridError::invalid_argument(format!(
                "viewport {}x{} at cell size {cell_size} overflows pixel dimensions",
                self.width, self.height
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Opaque RGB8 colour.
pub struct Rgb8(pub [u8; 3]);

impl Rgb8 {
    /// Pure black.
    pub const BLACK: Rgb8 = Rgb8([0, 0, 0]);
    /// Pure white.
    pub const WHITE: Rgb8 = Rgb8([255, 255, 255]);
    /// Light gray used for cell outlines.
    pub const OUTLINE_GRAY: Rgb8 = Rgb8([180, 180, 180]);
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Colour written as a string (`#rgb`, `#rrggbb` or a basic colour name).
///
/// The source string is kept so documents round-trip unchanged.
pub struct ColorSpec {
    raw: String,
    rgb: Rgb8,
}

impl ColorSpec {
    /// Parse a colour string.
    pub fn parse(s: &str) -> StickgridResult<Self> {
        let trimmed = s.trim();
        let rgb = if let Some(hex) = trimmed.strip_prefix('#') {
            parse_hex(hex)
        } else {
            named_color(trimmed)
        }
        .ok_or_else(|| StickgridError::invalid_argument(format!("unrecognized colour '{s}'")))?;

        Ok(Self {
            raw: s.to_string(),
            rgb,
        })
    }

    /// Resolved colour.
    pub fn rgb(&self) -> Rgb8 {
        self.rgb
    }

    /// Source string as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::str::FromStr for ColorSpec {
    type Err = StickgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_hex(hex: &str) -> Option<Rgb8> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, slot) in out.iter_mut().enumerate() {
                let v = channel(&hex[i..i + 1])?;
                *slot = v * 17;
            }
            Some(Rgb8(out))
        }
        6 => Some(Rgb8([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ])),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Rgb8> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        _ => return None,
    };
    Some(Rgb8(rgb))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
