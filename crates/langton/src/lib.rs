#![deny(unsafe_code)]
//! Langton's Ant.
//!
//! A single ant walks the grid. On an inactive cell it turns right, on an
//! active cell it turns left; either way it flips the cell and steps forward.
//! The grid is finite and the ant is clamped at the edges: a step that would
//! leave the grid keeps the ant on its current cell, which it flips again on
//! the next tick and so turns back inward.

use cellsim_core::actor::{Actor, Heading};
use cellsim_core::board::Board;
use cellsim_core::error::EngineError;
use cellsim_core::palette::CellColors;
use cellsim_core::params::{
    clamp_unit, param_f64, param_u32, param_usize, CELL_SIZE_DEFAULT, FADE_CYCLES_DEFAULT,
    FADE_CYCLES_MAX, FADE_CYCLES_MIN, SPEED_DEFAULT, SPEED_MAX, SPEED_MIN, TRAIL_LENGTH_MAX,
};
use cellsim_core::prng::Xorshift64;
use cellsim_core::simulation::{SimState, Simulation};
use cellsim_core::surface::Surface;
use serde_json::{json, Value};

/// Positions kept in the ant's trail.
const DEFAULT_TRAIL_LENGTH: usize = 32;

/// Tunables for [`Langton`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LangtonParams {
    pub cell_size: usize,
    pub fade_out_cycles: u32,
    pub speed: u32,
    /// Recent positions drawn behind the ant.
    pub trail_length: usize,
    /// Fraction of cells active after `init()`. The classic ant starts on an
    /// empty grid.
    pub coverage: f64,
}

impl Default for LangtonParams {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE_DEFAULT,
            fade_out_cycles: FADE_CYCLES_DEFAULT,
            speed: SPEED_DEFAULT,
            trail_length: DEFAULT_TRAIL_LENGTH,
            coverage: 0.0,
        }
    }
}

impl LangtonParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            cell_size: param_usize(params, "cell_size", CELL_SIZE_DEFAULT),
            fade_out_cycles: param_u32(params, "fade_out_cycles", FADE_CYCLES_DEFAULT),
            speed: param_u32(params, "speed", SPEED_DEFAULT),
            trail_length: param_usize(params, "trail_length", DEFAULT_TRAIL_LENGTH),
            coverage: param_f64(params, "coverage", 0.0),
        }
    }
}

pub struct Langton {
    board: Board,
    ant: Actor,
    trail_length: usize,
    coverage: f64,
    rng: Xorshift64,
}

impl Langton {
    /// Lays out a grid over `surface` with the ant at its centre, facing up.
    ///
    /// Returns `EngineError::InvalidSurface` if the surface has no area.
    pub fn new(
        surface: &dyn Surface,
        params: LangtonParams,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let mut board = Board::new(surface, params.cell_size, params.fade_out_cycles)?;
        board.set_speed(params.speed);
        let trail_length = params.trail_length.min(TRAIL_LENGTH_MAX);
        let ant = centred_ant(&board, trail_length);
        let mut langton = Self {
            board,
            ant,
            trail_length,
            coverage: clamp_unit(params.coverage),
            rng: Xorshift64::new(seed),
        };
        langton.init()?;
        Ok(langton)
    }

    /// Like [`Langton::new`], with tunables and the optional `"colors"` object
    /// read from `params`.
    ///
    /// Returns `EngineError::InvalidColor` if `"colors"` is malformed.
    pub fn from_json(
        surface: &dyn Surface,
        params: &Value,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let colors = CellColors::from_params(params)?;
        let mut langton = Self::new(surface, LangtonParams::from_json(params), seed)?;
        langton.set_colors(colors);
        Ok(langton)
    }

    pub fn set_colors(&mut self, colors: CellColors) {
        self.board.set_colors(colors);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ant(&self) -> &Actor {
        &self.ant
    }

    /// Moves the ant to `(row, col)` (clamped into the grid) facing `heading`.
    pub fn place_ant(&mut self, row: usize, col: usize, heading: Heading) {
        self.ant = Actor::new(row, col, heading, self.trail_length);
        self.ant.clamp_into(self.board.dims());
    }

    /// Sets `(row, col)` directly.
    pub fn set_cell(&mut self, row: usize, col: usize, alive: bool) {
        self.board.set_cell(row, col, alive);
    }
}

fn centred_ant(board: &Board, trail_length: usize) -> Actor {
    let dims = board.dims();
    Actor::new(dims.rows / 2, dims.cols / 2, Heading::Up, trail_length)
}

impl Simulation for Langton {
    fn name(&self) -> &'static str {
        "langton"
    }

    fn init(&mut self) -> Result<(), EngineError> {
        self.board.init()?;
        if self.coverage > 0.0 {
            self.board.randomize(self.coverage, &mut self.rng);
        }
        self.ant = centred_ant(&self.board, self.trail_length);
        tracing::debug!(
            rows = self.board.dims().rows,
            cols = self.board.dims().cols,
            "langton initialised"
        );
        Ok(())
    }

    fn update(&mut self) -> Result<(), EngineError> {
        self.board.begin_tick();
        let (row, col) = (self.ant.row(), self.ant.col());
        let grid = self.board.grid_mut();
        if grid.get(row, col) {
            self.ant.heading = self.ant.heading.turn_left();
            grid.set(row, col, false);
        } else {
            self.ant.heading = self.ant.heading.turn_right();
            grid.set(row, col, true);
        }
        self.ant.advance(1, self.board.dims());
        self.board.finish_tick();
        Ok(())
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        self.board.draw(surface);
        let colors = self.board.colors();
        for (row, col) in self.ant.trail() {
            self.board.paint_cell(surface, row, col, colors.trail);
        }
        self.board
            .paint_cell(surface, self.ant.row(), self.ant.col(), colors.actor);
        Ok(())
    }

    fn toggle_cell(&mut self, px: f64, py: f64) {
        self.board.toggle(px, py);
    }

    fn randomize(&mut self, coverage: f64) {
        self.board.randomize(coverage, &mut self.rng);
        tracing::debug!(coverage, cell_count = self.board.cell_count(), "langton randomized");
    }

    fn state(&self) -> SimState {
        let mut state = self.board.state(self.name());
        state.actors.push(self.ant.view());
        state
    }

    fn resize_preserve_state(&mut self, surface: &dyn Surface) -> Result<(), EngineError> {
        self.board.resize(surface)?;
        self.ant.clamp_into(self.board.dims());
        Ok(())
    }

    fn speed(&self) -> u32 {
        self.board.speed()
    }

    fn set_speed(&mut self, speed: u32) {
        self.board.set_speed(speed);
    }

    fn set_fade_out_cycles(&mut self, cycles: u32) {
        self.board.set_fade_out_cycles(cycles);
    }

    fn set_param(&mut self, name: &str, value: f64) -> Result<(), EngineError> {
        match name {
            "trail_length" => {
                let len = if value.is_finite() && value > 0.0 {
                    (value as usize).min(TRAIL_LENGTH_MAX)
                } else {
                    0
                };
                self.trail_length = len;
                self.ant.set_trail_len(len);
                Ok(())
            }
            _ => Err(EngineError::ParamNotFound(name.to_string())),
        }
    }

    fn params(&self) -> Value {
        json!({
            "cell_size": self.board.cell_size(),
            "fade_out_cycles": self.board.fade().fade_out_cycles(),
            "speed": self.board.speed(),
            "colors": self.board.colors(),
            "trail_length": self.trail_length,
            "coverage": self.coverage,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "colors": {
                "type": "object",
                "default": CellColors::default(),
                "keys": ["background", "alive", "actor", "actor_loaded", "trail"],
                "description": "Hex colours for cells, actors and trails"
            },
            "cell_size": {
                "type": "integer",
                "default": CELL_SIZE_DEFAULT,
                "min": 1,
                "description": "Cell edge in pixels"
            },
            "fade_out_cycles": {
                "type": "integer",
                "default": FADE_CYCLES_DEFAULT,
                "min": FADE_CYCLES_MIN,
                "max": FADE_CYCLES_MAX,
                "description": "Updates a cleared cell's trail takes to fade out"
            },
            "speed": {
                "type": "integer",
                "default": SPEED_DEFAULT,
                "min": SPEED_MIN,
                "max": SPEED_MAX,
                "description": "Ticks per second"
            },
            "trail_length": {
                "type": "integer",
                "default": DEFAULT_TRAIL_LENGTH,
                "min": 0,
                "max": TRAIL_LENGTH_MAX,
                "description": "Recent ant positions drawn as a trail"
            },
            "coverage": {
                "type": "number",
                "default": 0.0,
                "min": 0.0,
                "max": 1.0,
                "description": "Fraction of cells active after init"
            }
        })
    }
}
