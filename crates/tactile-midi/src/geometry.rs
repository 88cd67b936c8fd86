//! Display-space geometry of the note grid
//!
//! Observations arrive in display coordinates: the sensor image scaled up to
//! `width` x `height` with a `padding` border on every side. The grid fills
//! the padded interior in equal whole-unit cells.

use serde::{Deserialize, Serialize};

/// Default display width
pub const DEFAULT_WIDTH: f64 = 600.0;

/// Default display height
pub const DEFAULT_HEIGHT: f64 = 300.0;

/// Default border around the grid, so blobs at the sensor edge stay detectable
pub const DEFAULT_PADDING: f64 = 30.0;

/// Grid placement in display space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridGeometry {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            padding: DEFAULT_PADDING,
        }
    }
}

impl GridGeometry {
    pub fn new(width: f64, height: f64, padding: f64) -> Self {
        Self { width, height, padding }
    }

    /// Width and height of the area inside the padding
    pub fn effective_size(&self) -> (f64, f64) {
        (
            self.width - 2.0 * self.padding,
            self.height - 2.0 * self.padding,
        )
    }

    /// Cell width and height, floored to whole display units
    pub fn cell_size(&self, rows: usize, cols: usize) -> (f64, f64) {
        let (width, height) = self.effective_size();
        ((width / cols as f64).floor(), (height / rows as f64).floor())
    }

    /// Quantize a display position to a grid cell
    ///
    /// Cells are half-open: a point exactly on a border belongs to the cell
    /// that starts there (the right or lower neighbour). Positions in the
    /// padding, past the last whole cell, or non-finite resolve to `None`.
    pub fn cell_at(&self, x: f64, y: f64, rows: usize, cols: usize) -> Option<(usize, usize)> {
        if rows == 0 || cols == 0 || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (cell_width, cell_height) = self.cell_size(rows, cols);
        if cell_width <= 0.0 || cell_height <= 0.0 {
            return None;
        }

        let col = ((x - self.padding) / cell_width).floor();
        let row = ((y - self.padding) / cell_height).floor();
        if row < 0.0 || col < 0.0 || row >= rows as f64 || col >= cols as f64 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    /// Display-space centre of a cell
    pub fn cell_center(&self, row: usize, col: usize, rows: usize, cols: usize) -> (f64, f64) {
        let (cell_width, cell_height) = self.cell_size(rows, cols);
        (
            self.padding + (col as f64 + 0.5) * cell_width,
            self.padding + (row as f64 + 0.5) * cell_height,
        )
    }
}
