//! Error types for the cellsim core.

use thiserror::Error;

/// Errors produced by simulation operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero when allocating a grid, field, or surface.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A drawing surface handed to a simulation constructor cannot be drawn on.
    #[error("invalid drawing surface: {width}x{height} pixels")]
    InvalidSurface { width: usize, height: usize },

    /// A simulation identifier did not match any registered simulation.
    #[error("unknown simulation type: {0}")]
    UnknownSimulation(String),

    /// A tunable parameter name is not understood by this simulation.
    #[error("parameter not found: {0}")]
    ParamNotFound(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed from the given colors.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// Writing a snapshot or reading a scenario failed.
    #[error("i/o error: {0}")]
    Io(String),
}
