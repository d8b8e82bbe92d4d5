//! State shared by the boolean-grid simulations (Conway, Langton, Termite).
//!
//! A [`Board`] owns the grid, its fade trails, the generation counter, the
//! tick speed and the surface size the grid was laid out for. Engines hold
//! one and add their own rule and actors on top.

use crate::color::Srgb;
use crate::error::EngineError;
use crate::fade::FadeTracker;
use crate::grid::{screen_to_grid, CellGrid, GridDims};
use crate::palette::CellColors;
use crate::params::{clamp_cell_size, clamp_speed, clamp_unit, SPEED_DEFAULT};
use crate::prng::Xorshift64;
use crate::simulation::SimState;
use crate::surface::{validate_surface, Surface};

#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    cell_size: usize,
    grid: CellGrid,
    fade: FadeTracker,
    generation: u64,
    cell_count: usize,
    speed: u32,
    colors: CellColors,
}

impl Board {
    /// Lays out an empty grid over `surface`.
    ///
    /// Fails with `EngineError::InvalidSurface` if the surface has no area.
    pub fn new(
        surface: &dyn Surface,
        cell_size: usize,
        fade_out_cycles: u32,
    ) -> Result<Self, EngineError> {
        validate_surface(surface)?;
        let (width, height) = (surface.width(), surface.height());
        let cell_size = clamp_cell_size(cell_size);
        let grid = CellGrid::with_dims(GridDims::from_surface(width, height, cell_size))?;
        let fade = FadeTracker::new(grid.dims().len(), fade_out_cycles);
        Ok(Self {
            width,
            height,
            cell_size,
            grid,
            fade,
            generation: 0,
            cell_count: 0,
            speed: SPEED_DEFAULT,
            colors: CellColors::default(),
        })
    }

    /// Reallocates an empty grid at the current surface size and resets the
    /// generation counter. Speed and fade length are kept.
    pub fn init(&mut self) -> Result<(), EngineError> {
        let dims = GridDims::from_surface(self.width, self.height, self.cell_size);
        self.grid = CellGrid::with_dims(dims)?;
        self.fade = FadeTracker::new(dims.len(), self.fade.fade_out_cycles());
        self.generation = 0;
        self.cell_count = 0;
        Ok(())
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Direct grid access for rule code. Callers that change cells outside a
    /// `begin_tick`/`finish_tick` pair must call [`Board::recount`].
    pub fn grid_mut(&mut self) -> &mut CellGrid {
        &mut self.grid
    }

    pub fn dims(&self) -> GridDims {
        self.grid.dims()
    }

    pub fn fade(&self) -> &FadeTracker {
        &self.fade
    }

    pub fn cell_size(&self) -> usize {
        self.cell_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: u32) {
        self.speed = clamp_speed(speed);
    }

    pub fn set_fade_out_cycles(&mut self, cycles: u32) {
        self.fade.set_fade_out_cycles(cycles);
    }

    pub fn colors(&self) -> &CellColors {
        &self.colors
    }

    pub fn set_colors(&mut self, colors: CellColors) {
        self.colors = colors;
    }

    /// Grid cell under pixel `(px, py)`, clamped into the grid.
    pub fn cell_at(&self, px: f64, py: f64) -> (usize, usize) {
        screen_to_grid(px, py, self.cell_size, self.grid.dims())
    }

    /// Flips the cell under `(px, py)` and returns its new state.
    ///
    /// `cell_count` moves by exactly one and the cell's fade restarts at full
    /// brightness.
    pub fn toggle(&mut self, px: f64, py: f64) -> bool {
        let (row, col) = self.cell_at(px, py);
        self.set_cell(row, col, !self.grid.get(row, col));
        self.grid.get(row, col)
    }

    /// Sets one cell outside of a tick, keeping `cell_count` and fade in step.
    pub fn set_cell(&mut self, row: usize, col: usize, alive: bool) {
        let dims = self.grid.dims();
        if row >= dims.rows || col >= dims.cols || self.grid.get(row, col) == alive {
            return;
        }
        self.grid.set(row, col, alive);
        self.fade.touch(self.grid.index(row, col));
        if alive {
            self.cell_count += 1;
        } else {
            self.cell_count -= 1;
        }
    }

    /// Each cell live with probability `coverage`; existing trails are dropped.
    pub fn randomize(&mut self, coverage: f64, rng: &mut Xorshift64) {
        self.grid.randomize(clamp_unit(coverage), rng);
        self.fade.reset(self.grid.cells());
        self.recount();
    }

    /// Kills every cell and drops all trails.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.fade.reset(self.grid.cells());
        self.cell_count = 0;
    }

    /// Recomputes `cell_count` with a full scan.
    pub fn recount(&mut self) {
        self.cell_count = self.grid.count_live();
    }

    /// Remembers the current generation so in-place edits can be diffed.
    pub fn begin_tick(&mut self) {
        self.grid.snapshot();
    }

    /// Closes a tick: fade diffs the previous generation against the current
    /// one, the generation counter advances and `cell_count` is refreshed.
    pub fn finish_tick(&mut self) {
        self.fade.advance(self.grid.previous(), self.grid.cells());
        self.generation += 1;
        self.recount();
    }

    /// Re-lays out the grid for a new surface size.
    ///
    /// Live cells inside the new bounds survive, the rest are dropped. The
    /// generation counter is untouched. A zero-sized surface gives a 1×1 grid.
    pub fn resize(&mut self, surface: &dyn Surface) -> Result<(), EngineError> {
        let (width, height) = (surface.width(), surface.height());
        let dims = GridDims::from_surface(width, height, self.cell_size);
        self.grid = self.grid.remap(dims)?;
        self.fade.reset(self.grid.cells());
        self.width = width;
        self.height = height;
        self.recount();
        tracing::debug!(
            rows = dims.rows,
            cols = dims.cols,
            cell_count = self.cell_count,
            "board resized"
        );
        Ok(())
    }

    /// Paints the background, then every lit cell tinted by its fade factor.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let (w, h) = (surface.width(), surface.height());
        surface.fill_rect(0, 0, w, h, self.colors.background);
        let cs = self.cell_size;
        let cols = self.grid.cols();
        for (idx, &alive) in self.grid.cells().iter().enumerate() {
            let brightness = if alive { 1.0 } else { self.fade.brightness(idx) };
            if brightness > 0.0 {
                let (row, col) = (idx / cols, idx % cols);
                surface.fill_rect(col * cs, row * cs, cs, cs, self.colors.cell(brightness));
            }
        }
    }

    /// Paints a single cell in `color`; used for actors and their trails.
    pub fn paint_cell(&self, surface: &mut dyn Surface, row: usize, col: usize, color: Srgb) {
        let cs = self.cell_size;
        surface.fill_rect(col * cs, row * cs, cs, cs, color);
    }

    /// Snapshot with the shared fields filled in.
    pub fn state(&self, name: &str) -> SimState {
        SimState {
            name: name.to_string(),
            generation: self.generation,
            cell_count: self.cell_count,
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            speed: self.speed,
            fade_out_cycles: Some(self.fade.fade_out_cycles()),
            actors: Vec::new(),
        }
    }
}
