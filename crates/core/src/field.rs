//! Two-dimensional scalar field with edge-clamped addressing.
//!
//! A `Field` stores `width * height` f64 values in row-major order. Signed
//! coordinates outside the field resolve to the nearest edge cell, which gives
//! finite-difference stencils a zero-flux boundary.

use crate::error::EngineError;

/// A 2D scalar field with clamped (non-wrapping) coordinate access.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Field {
    /// Creates a zero-filled field.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Self::filled(width, height, 0.0)
    }

    /// Creates a field with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major data. Engine hot loops write through this directly.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    fn index(&self, x: isize, y: isize) -> usize {
        let xi = x.clamp(0, self.width as isize - 1) as usize;
        let yi = y.clamp(0, self.height as isize - 1) as usize;
        yi * self.width + xi
    }

    /// Value at `(x, y)`; out-of-range coordinates read the nearest edge cell.
    pub fn get(&self, x: isize, y: isize) -> f64 {
        self.data[self.index(x, y)]
    }

    /// Writes `value` at `(x, y)`. Coordinates outside the field are ignored.
    pub fn set(&mut self, x: isize, y: isize, value: f64) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.data[idx] = value;
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Number of cells strictly greater than `threshold`.
    pub fn count_above(&self, threshold: f64) -> usize {
        self.data.iter().filter(|&&v| v > threshold).count()
    }

    /// Returns a field of the new size holding the overlapping top-left region
    /// of `self`; cells beyond the old bounds are set to `fill`.
    pub fn remap(&self, width: usize, height: usize, fill: f64) -> Result<Field, EngineError> {
        let mut out = Field::filled(width, height, fill)?;
        let copy_w = self.width.min(width);
        for y in 0..self.height.min(height) {
            let src = y * self.width;
            let dst = y * width;
            out.data[dst..dst + copy_w].copy_from_slice(&self.data[src..src + copy_w]);
        }
        Ok(out)
    }

    /// Iterates `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let w = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i % w, i / w, v))
    }
}
