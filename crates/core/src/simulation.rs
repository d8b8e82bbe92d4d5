//! The lifecycle contract every simulation implements.
//!
//! A driver calls [`Simulation::init`] once, then alternates
//! [`Simulation::update`] and [`Simulation::draw`]. Resizes go through
//! [`Simulation::resize_preserve_state`]; pointer input through
//! [`Simulation::toggle_cell`]. The trait is object-safe so hosts can hold a
//! `Box<dyn Simulation>`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actor::ActorView;
use crate::error::EngineError;
use crate::surface::Surface;

/// Read-only snapshot returned by [`Simulation::state`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub name: String,
    pub generation: u64,
    pub cell_count: usize,
    pub rows: usize,
    pub cols: usize,
    pub speed: u32,
    /// `None` for simulations without fade trails.
    pub fade_out_cycles: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<ActorView>,
}

pub trait Simulation {
    /// Registry identifier, e.g. `"conway"`.
    fn name(&self) -> &'static str;

    /// Allocates grids and actors at the current surface size and resets the
    /// generation counter to 0.
    fn init(&mut self) -> Result<(), EngineError>;

    /// Advances exactly one tick.
    fn update(&mut self) -> Result<(), EngineError>;

    /// Paints the current state. Never mutates simulation state.
    fn draw(&self, surface: &mut dyn Surface) -> Result<(), EngineError>;

    /// Flips the cell under pixel `(px, py)`, bypassing the rule.
    /// Coordinates outside the surface are clamped to the nearest cell.
    fn toggle_cell(&mut self, px: f64, py: f64);

    /// Reseeds the grid; `coverage` is clamped to [0, 1].
    fn randomize(&mut self, coverage: f64);

    fn state(&self) -> SimState;

    /// Re-lays out for the surface's current size, keeping what fits.
    ///
    /// The generation counter is preserved exactly; a zero-sized surface
    /// degrades to a 1×1 grid instead of failing.
    fn resize_preserve_state(&mut self, surface: &dyn Surface) -> Result<(), EngineError>;

    /// Ticks per second the driver should run this simulation at.
    fn speed(&self) -> u32;

    /// Clamped to `[SPEED_MIN, SPEED_MAX]`.
    fn set_speed(&mut self, speed: u32);

    /// Clamped to `[FADE_CYCLES_MIN, FADE_CYCLES_MAX]`. No-op for simulations
    /// without trails.
    fn set_fade_out_cycles(&mut self, _cycles: u32) {}

    /// Sets an engine-specific tunable. Values are clamped, never rejected;
    /// only an unrecognised `name` is an error.
    fn set_param(&mut self, name: &str, _value: f64) -> Result<(), EngineError> {
        Err(EngineError::ParamNotFound(name.to_string()))
    }

    /// Current tunable values as a JSON object.
    fn params(&self) -> Value;

    /// Parameter names, types, ranges and defaults.
    fn param_schema(&self) -> Value;
}
