//! The drawing surface a simulation paints onto.
//!
//! The core only needs a pixel size and a "fill rectangle with colour"
//! primitive. [`RgbaSurface`] is the in-memory implementation used by the CLI
//! and by tests; hosts with a real canvas implement [`Surface`] themselves.

use crate::color::Srgb;
use crate::error::EngineError;

/// A 2-D drawing target measured in pixels.
pub trait Surface {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Fills the axis-aligned rectangle at `(x, y)` of size `w × h`.
    ///
    /// Implementations clip to their bounds; painting outside is a no-op.
    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Srgb);
}

/// Rejects surfaces that have no drawable area.
pub fn validate_surface(surface: &dyn Surface) -> Result<(), EngineError> {
    let (width, height) = (surface.width(), surface.height());
    if width == 0 || height == 0 || width.checked_mul(height).is_none() {
        return Err(EngineError::InvalidSurface { width, height });
    }
    Ok(())
}

/// Row-major RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaSurface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RgbaSurface {
    /// Creates an opaque black surface.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or the buffer size overflows.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        let len = Self::buffer_len(width, height)?;
        let mut pixels = vec![0u8; len];
        pixels.chunks_exact_mut(4).for_each(|px| px[3] = 255);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    fn buffer_len(width: usize, height: usize) -> Result<usize, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)
    }

    /// Reallocates to a new size, clearing to opaque black.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    /// RGBA bytes of the pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Raw row-major RGBA8 bytes, `width * height * 4` long.
    pub fn data(&self) -> &[u8] {
        &self.pixels
    }
}

impl Surface for RgbaSurface {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Srgb) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        if x >= x_end || y >= y_end {
            return;
        }
        let rgba = color.to_rgba8();
        for row in y..y_end {
            let start = (row * self.width + x) * 4;
            let end = (row * self.width + x_end) * 4;
            self.pixels[start..end]
                .chunks_exact_mut(4)
                .for_each(|px| px.copy_from_slice(&rgba));
        }
    }
}
