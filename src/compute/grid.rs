//! Binary cell grid and the per-cell evidence accumulator.
//!
//! Both are stored as flat row-major arrays indexed by `y * width + x`.

use super::NoiseSource;

/// Binary cell matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Grid with every cell set to `value` (0 or 1).
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        debug_assert!(value <= 1);
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }

    /// Grid seeded cell by cell from a noise source.
    pub fn seeded(width: usize, height: usize, noise: &mut NoiseSource) -> Self {
        let mut grid = Self::filled(width, height, 0);
        grid.reseed(noise);
        grid
    }

    /// Create from raw row-major cell data.
    ///
    /// # Panics
    /// Panics if the data length does not match the dimensions or a cell is not 0/1.
    pub fn from_cells(width: usize, height: usize, cells: Vec<u8>) -> Self {
        assert_eq!(
            cells.len(),
            width * height,
            "Cell data length mismatch: expected {}, got {}",
            width * height,
            cells.len()
        );
        assert!(cells.iter().all(|&c| c <= 1), "Cells must be 0 or 1");
        Self {
            width,
            height,
            cells,
        }
    }

    /// Overwrite every cell with a fresh sample.
    pub fn reseed(&mut self, noise: &mut NoiseSource) {
        let width = self.width;
        for (i, cell) in self.cells.iter_mut().enumerate() {
            *cell = noise.sample(i % width, i / width);
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total cell count (width * height).
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Convert (x, y) coordinates to flat index.
    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        debug_assert!(value <= 1);
        let idx = self.idx(x, y);
        self.cells[idx] = value;
    }

    /// Read-only row-major view of the cells.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    /// Copy the `size`×`size` window anchored at (x, y) into `out`, row by row.
    ///
    /// `out` is cleared first. The window must lie fully inside the grid.
    pub fn window_into(&self, x: usize, y: usize, size: usize, out: &mut Vec<u8>) {
        debug_assert!(x + size <= self.width && y + size <= self.height);
        out.clear();
        for dy in 0..size {
            let start = self.idx(x, y + dy);
            out.extend_from_slice(&self.cells[start..start + size]);
        }
    }

    /// Number of cells set to 1.
    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c == 1).count()
    }
}

/// Per-cell sum of match evidence, same shape as the grid it was scanned from.
///
/// Entries are `i64`: a cell is covered by up to `size²` windows, each adding
/// an `i32` score, so the per-cell total cannot overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator {
    width: usize,
    height: usize,
    values: Vec<i64>,
}

impl Accumulator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0; width * height],
        }
    }

    /// Zero every entry.
    pub fn reset(&mut self) {
        self.values.fill(0);
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> i64 {
        self.values[y * self.width + x]
    }

    /// Read-only row-major view of the values.
    #[inline]
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Add `score` to every cell of the `size`×`size` window anchored at (x, y).
    pub fn add_window(&mut self, x: usize, y: usize, size: usize, score: i32) {
        debug_assert!(x + size <= self.width && y + size <= self.height);
        let score = i64::from(score);
        for dy in 0..size {
            let start = (y + dy) * self.width + x;
            for v in &mut self.values[start..start + size] {
                *v += score;
            }
        }
    }

    /// Largest entry, 0 for an empty accumulator.
    pub fn max(&self) -> i64 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all entries, saturating at the `i64` bounds.
    pub fn sum(&self) -> i64 {
        self.values.iter().fold(0i64, |acc, &v| acc.saturating_add(v))
    }
}
