//! PNG export of a drawn [`RgbaSurface`].
//!
//! Feature-gated behind `png` (default on) so hosts that only draw to their
//! own canvas do not pull in the `image` crate.

use std::path::Path;

use cellsim_core::error::EngineError;
use cellsim_core::surface::RgbaSurface;
use cellsim_core::Surface;

/// Writes the surface's pixels as an RGBA PNG.
///
/// Returns `EngineError::InvalidDimensions` if the surface dimensions
/// overflow `u32`, or `EngineError::Io` on write failure.
pub fn write_png(surface: &RgbaSurface, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(surface.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(surface.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, surface.data().to_vec())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    tracing::debug!(path = %path.display(), width = w, height = h, "snapshot written");
    Ok(())
}
