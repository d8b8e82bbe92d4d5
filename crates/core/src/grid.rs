//! Double-buffered boolean cell grid.
//!
//! `current` is the generation everyone reads; `next` is scratch space that
//! rule engines write into before [`CellGrid::swap`]. Actor engines reuse
//! `next` to hold the previous generation so fade can diff the two.
//! Coordinates are `(row, col)`; the grid does not wrap.

use crate::error::EngineError;
use crate::prng::Xorshift64;

/// Grid dimensions derived from a pixel surface and a cell size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub rows: usize,
    pub cols: usize,
}

impl GridDims {
    /// `rows = floor(height / cell_size)`, `cols = floor(width / cell_size)`,
    /// each at least 1. A zero `cell_size` is treated as 1.
    pub fn from_surface(width: usize, height: usize, cell_size: usize) -> Self {
        let cell = cell_size.max(1);
        Self {
            rows: (height / cell).max(1),
            cols: (width / cell).max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maps a pixel coordinate to the `(row, col)` of the cell containing it,
/// clamped into the grid. Negative and NaN coordinates map to 0.
pub fn screen_to_grid(px: f64, py: f64, cell_size: usize, dims: GridDims) -> (usize, usize) {
    let cell = cell_size.max(1) as f64;
    let axis = |p: f64, len: usize| -> usize {
        let i = (p / cell).floor();
        if i.is_nan() || i < 0.0 {
            0
        } else {
            (i as usize).min(len - 1)
        }
    };
    (axis(py, dims.rows), axis(px, dims.cols))
}

/// Counts live cells among the 8 Moore neighbours of `(row, col)`.
///
/// Out-of-bounds neighbours count as dead.
pub fn count_neighbours(cells: &[bool], row: usize, col: usize, rows: usize, cols: usize) -> u8 {
    let r0 = row.saturating_sub(1);
    let r1 = (row + 1).min(rows - 1);
    let c0 = col.saturating_sub(1);
    let c1 = (col + 1).min(cols - 1);
    let mut count = 0u8;
    for r in r0..=r1 {
        let base = r * cols;
        for c in c0..=c1 {
            if (r != row || c != col) && cells[base + c] {
                count += 1;
            }
        }
    }
    count
}

/// Number of live cells in `cells`.
pub fn count_live(cells: &[bool]) -> usize {
    cells.iter().filter(|&&alive| alive).count()
}

/// A `rows × cols` boolean grid with two generations.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    dims: GridDims,
    current: Vec<bool>,
    next: Vec<bool>,
}

impl CellGrid {
    /// Allocates an all-dead grid.
    pub fn new(rows: usize, cols: usize) -> Result<Self, EngineError> {
        if rows == 0 || cols == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = rows.checked_mul(cols).ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            dims: GridDims { rows, cols },
            current: vec![false; len],
            next: vec![false; len],
        })
    }

    pub fn with_dims(dims: GridDims) -> Result<Self, EngineError> {
        Self::new(dims.rows, dims.cols)
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn rows(&self) -> usize {
        self.dims.rows
    }

    pub fn cols(&self) -> usize {
        self.dims.cols
    }

    /// Flat index of `(row, col)`. Caller guarantees bounds.
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.dims.cols + col
    }

    /// Liveness at `(row, col)`; anything outside the grid is dead.
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.dims.rows && col < self.dims.cols && self.current[self.index(row, col)]
    }

    /// Sets liveness at `(row, col)`. Writes outside the grid are ignored.
    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        if row < self.dims.rows && col < self.dims.cols {
            let idx = self.index(row, col);
            self.current[idx] = alive;
        }
    }

    /// Flips `(row, col)` and returns its new state.
    pub fn toggle(&mut self, row: usize, col: usize) -> bool {
        let alive = !self.get(row, col);
        self.set(row, col, alive);
        alive
    }

    /// The generation everyone reads.
    pub fn cells(&self) -> &[bool] {
        &self.current
    }

    /// The scratch generation.
    pub fn previous(&self) -> &[bool] {
        &self.next
    }

    /// Splits into `(current, next)` so a rule can read one and write the other.
    pub fn buffers_mut(&mut self) -> (&[bool], &mut [bool]) {
        (&self.current, &mut self.next)
    }

    /// Makes `next` the current generation; the old one becomes scratch.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Copies `current` into `next`, so in-place mutation of `current` can be
    /// diffed against the generation it started from.
    pub fn snapshot(&mut self) {
        self.next.copy_from_slice(&self.current);
    }

    /// Kills every cell in both generations.
    pub fn clear(&mut self) {
        self.current.fill(false);
        self.next.fill(false);
    }

    /// Makes each cell live independently with probability `coverage`.
    pub fn randomize(&mut self, coverage: f64, rng: &mut Xorshift64) {
        self.current
            .iter_mut()
            .for_each(|cell| *cell = rng.chance(coverage));
        self.next.copy_from_slice(&self.current);
    }

    pub fn count_live(&self) -> usize {
        count_live(&self.current)
    }

    /// Returns a grid of `dims` holding the overlapping top-left region of the
    /// current generation. Cells outside the new bounds are dropped.
    pub fn remap(&self, dims: GridDims) -> Result<CellGrid, EngineError> {
        let mut out = CellGrid::with_dims(dims)?;
        let copy_cols = self.dims.cols.min(dims.cols);
        for row in 0..self.dims.rows.min(dims.rows) {
            let src = row * self.dims.cols;
            let dst = row * dims.cols;
            out.current[dst..dst + copy_cols]
                .copy_from_slice(&self.current[src..src + copy_cols]);
        }
        out.next.copy_from_slice(&out.current);
        Ok(out)
    }
}
