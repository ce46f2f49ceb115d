use std::path::Path;

use crate::foundation::core::{Cell, Rgb8, Viewport};
use crate::foundation::error::{StickgridError, StickgridResult};
use crate::frame::model::{Background, Frame};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Tightly packed RGB8 raster produced by one render call.
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` bytes, row-major.
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Buffer filled with one colour.
    pub fn filled(width: u32, height: u32, color: Rgb8) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&color.0);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Colour at pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(Rgb8([self.data[i], self.data[i + 1], self.data[i + 2]]))
    }

    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb8) {
        let stride = self.width as usize * 3;
        let x_end = (x + w).min(self.width) as usize;
        for row in y..(y + h).min(self.height) {
            let start = row as usize * stride;
            for px in self.data[start + x as usize * 3..start + x_end * 3].chunks_exact_mut(3) {
                px.copy_from_slice(&color.0);
            }
        }
    }

    /// Write the buffer as a PNG file.
    pub fn save_png(&self, path: &Path) -> StickgridResult<()> {
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ExtendedColorType::Rgb8,
            image::ImageFormat::Png,
        )
        .map_err(|e| StickgridError::io(format!("write png '{}': {e}", path.display())))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Raster settings shared by display and export.
pub struct RenderSettings {
    /// Side length of one cell in pixels (> 0).
    pub cell_size: u32,
    /// 1-pixel border drawn around every cell a layer paints.
    pub outline: Option<Rgb8>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            cell_size: 10,
            outline: None,
        }
    }
}

impl RenderSettings {
    /// Reject a zero cell size.
    pub fn validate(&self) -> StickgridResult<()> {
        if self.cell_size == 0 {
            return Err(StickgridError::invalid_argument("cell_size must be > 0"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Two-colour mapping of one layer.
///
/// A `0` default draws black ink on white paper. Any other default inverts both the paper and
/// which stored values count as ink.
pub struct LayerPalette {
    /// Colour of unpainted cells.
    pub paper: Rgb8,
    /// Colour of painted cells.
    pub ink: Rgb8,
    inverted: bool,
}

impl LayerPalette {
    /// Palette for a layer with the given default colour.
    pub fn for_default(default_color: Cell) -> Self {
        let inverted = default_color != 0;
        if inverted {
            Self {
                paper: Rgb8::BLACK,
                ink: Rgb8::WHITE,
                inverted,
            }
        } else {
            Self {
                paper: Rgb8::WHITE,
                ink: Rgb8::BLACK,
                inverted,
            }
        }
    }

    /// Whether a stored value renders as ink.
    pub fn is_ink(&self, value: Cell) -> bool {
        (value != 0) != self.inverted
    }

    /// Colour of a stored value.
    pub fn resolve(&self, value: Cell) -> Rgb8 {
        if self.is_ink(value) {
            self.ink
        } else {
            self.paper
        }
    }
}

/// Composite `background` (if any) and `frame` over `viewport` into pixels.
///
/// Each grid cell becomes a `cell_size` square. Background cells without an entry show the
/// background's paper colour; with no background, the frame's paper colour is the blank fill.
/// Foreground entries overwrite whatever is underneath; cells the frame does not store let the
/// lower layer show through. The frame's style override recolours its ink cells only.
#[tracing::instrument(level = "trace", skip(frame, background))]
pub fn render_frame(
    frame: &Frame,
    background: Option<&Background>,
    settings: &RenderSettings,
    viewport: Viewport,
) -> StickgridResult<PixelBuffer> {
    settings.validate()?;
    if !viewport.is_within(frame.dimensions) {
        return Err(StickgridError::index_out_of_range(format!(
            "viewport {viewport:?} is not inside {}x{} grid",
            frame.dimensions.width, frame.dimensions.height
        )));
    }

    let (width, height) = viewport.pixel_size(settings.cell_size)?;
    let fg = LayerPalette::for_default(frame.default_color);
    let blank = background
        .map(|bg| LayerPalette::for_default(bg.default_color).paper)
        .unwrap_or(fg.paper);
    let mut canvas = CellCanvas {
        buf: PixelBuffer::filled(width, height, blank),
        viewport,
        settings: *settings,
    };

    if let Some(bg) = background {
        let palette = LayerPalette::for_default(bg.default_color);
        if settings.outline.is_some() {
            for row in viewport.y0..viewport.y0 + viewport.height {
                for col in viewport.x0..viewport.x0 + viewport.width {
                    canvas.paint(row, col, palette.paper);
                }
            }
        }
        for (c, v) in bg.boxes.iter() {
            if viewport.contains(c.row, c.col) {
                canvas.paint(c.row, c.col, palette.resolve(v));
            }
        }
    }

    let tint = frame.style_override.as_ref().map(|s| s.rgb());
    for (c, v) in frame.boxes.iter() {
        if !viewport.contains(c.row, c.col) {
            continue;
        }
        let color = match tint {
            Some(t) if fg.is_ink(v) => t,
            _ => fg.resolve(v),
        };
        canvas.paint(c.row, c.col, color);
    }

    Ok(canvas.buf)
}

struct CellCanvas {
    buf: PixelBuffer,
    viewport: Viewport,
    settings: RenderSettings,
}

impl CellCanvas {
    fn paint(&mut self, row: u32, col: u32, color: Rgb8) {
        let cs = self.settings.cell_size;
        let x = (col - self.viewport.x0) * cs;
        let y = (row - self.viewport.y0) * cs;
        self.buf.fill_rect(x, y, cs, cs, color);

        if let Some(line) = self.settings.outline {
            self.buf.fill_rect(x, y, cs, 1, line);
            self.buf.fill_rect(x, y + cs - 1, cs, 1, line);
            self.buf.fill_rect(x, y, 1, cs, line);
            self.buf.fill_rect(x + cs - 1, y, 1, cs, line);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
