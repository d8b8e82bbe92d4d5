#![deny(unsafe_code)]
//! Termite wood-chip swarm.
//!
//! Active cells are wood chips. Each termite wanders: with a small
//! probability it picks a new random heading, then it moves a fixed number
//! of cells, stopping at the grid edge. An empty-handed termite that lands on
//! a chip picks it up; a loaded termite that lands on an empty cell drops its
//! chip there. Chips are never created or destroyed by the rule, only moved,
//! so chips on the grid plus chips being carried stays constant.

use cellsim_core::actor::{Actor, ActorView, Heading};
use cellsim_core::board::Board;
use cellsim_core::error::EngineError;
use cellsim_core::palette::CellColors;
use cellsim_core::params::{
    clamp_unit, param_f64, param_u32, param_usize, CELL_SIZE_DEFAULT, COVERAGE_DEFAULT,
    FADE_CYCLES_DEFAULT, FADE_CYCLES_MAX, FADE_CYCLES_MIN, SPEED_DEFAULT, SPEED_MAX, SPEED_MIN,
    TRAIL_LENGTH_MAX,
};
use cellsim_core::prng::Xorshift64;
use cellsim_core::simulation::{SimState, Simulation};
use cellsim_core::surface::Surface;
use serde_json::{json, Value};

/// Default population.
const DEFAULT_TERMITE_COUNT: usize = 50;
/// Population cap.
pub const MAX_TERMITES_DEFAULT: usize = 1000;
/// Chance per tick that a termite picks a new random heading.
const RANDOM_TURN_PROBABILITY: f64 = 0.1;
/// Cells moved per tick.
const MOVE_SPEED: usize = 2;
/// Upper bound on `move_speed`.
const MAX_MOVE_SPEED: usize = 16;
/// Positions kept in each termite's trail.
const DEFAULT_TRAIL_LENGTH: usize = 6;

/// Tunables for [`Termites`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermiteParams {
    pub cell_size: usize,
    pub fade_out_cycles: u32,
    pub speed: u32,
    /// Termites placed by `init()`, clamped to `max_termites`.
    pub termite_count: usize,
    pub max_termites: usize,
    pub random_turn_probability: f64,
    pub move_speed: usize,
    /// Fraction of cells holding a chip after `init()`.
    pub chip_density: f64,
    pub trail_length: usize,
}

impl Default for TermiteParams {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE_DEFAULT,
            fade_out_cycles: FADE_CYCLES_DEFAULT,
            speed: SPEED_DEFAULT,
            termite_count: DEFAULT_TERMITE_COUNT,
            max_termites: MAX_TERMITES_DEFAULT,
            random_turn_probability: RANDOM_TURN_PROBABILITY,
            move_speed: MOVE_SPEED,
            chip_density: COVERAGE_DEFAULT,
            trail_length: DEFAULT_TRAIL_LENGTH,
        }
    }
}

impl TermiteParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            cell_size: param_usize(params, "cell_size", CELL_SIZE_DEFAULT),
            fade_out_cycles: param_u32(params, "fade_out_cycles", FADE_CYCLES_DEFAULT),
            speed: param_u32(params, "speed", SPEED_DEFAULT),
            termite_count: param_usize(params, "termite_count", DEFAULT_TERMITE_COUNT),
            max_termites: param_usize(params, "max_termites", MAX_TERMITES_DEFAULT),
            random_turn_probability: param_f64(
                params,
                "random_turn_probability",
                RANDOM_TURN_PROBABILITY,
            ),
            move_speed: param_usize(params, "move_speed", MOVE_SPEED),
            chip_density: param_f64(params, "chip_density", COVERAGE_DEFAULT),
            trail_length: param_usize(params, "trail_length", DEFAULT_TRAIL_LENGTH),
        }
    }

    /// Pulls every field into its valid range.
    fn clamped(self) -> Self {
        let max_termites = self.max_termites.min(MAX_TERMITES_DEFAULT);
        Self {
            termite_count: self.termite_count.min(max_termites),
            max_termites,
            random_turn_probability: clamp_unit(self.random_turn_probability),
            move_speed: self.move_speed.clamp(1, MAX_MOVE_SPEED),
            chip_density: clamp_unit(self.chip_density),
            trail_length: self.trail_length.min(TRAIL_LENGTH_MAX),
            ..self
        }
    }
}

pub struct Termites {
    board: Board,
    termites: Vec<Actor>,
    params: TermiteParams,
    rng: Xorshift64,
}

impl Termites {
    /// Lays out a grid over `surface`, scatters chips and termites.
    ///
    /// Returns `EngineError::InvalidSurface` if the surface has no area.
    pub fn new(
        surface: &dyn Surface,
        params: TermiteParams,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let params = params.clamped();
        let mut board = Board::new(surface, params.cell_size, params.fade_out_cycles)?;
        board.set_speed(params.speed);
        let mut termites = Self {
            board,
            termites: Vec::with_capacity(params.termite_count),
            params,
            rng: Xorshift64::new(seed),
        };
        termites.init()?;
        Ok(termites)
    }

    /// Like [`Termites::new`], with tunables and the optional `"colors"` object
    /// read from `params`.
    ///
    /// Returns `EngineError::InvalidColor` if `"colors"` is malformed.
    pub fn from_json(
        surface: &dyn Surface,
        params: &Value,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let colors = CellColors::from_params(params)?;
        let mut termites = Self::new(surface, TermiteParams::from_json(params), seed)?;
        termites.set_colors(colors);
        Ok(termites)
    }

    pub fn set_colors(&mut self, colors: CellColors) {
        self.board.set_colors(colors);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn termites(&self) -> &[Actor] {
        &self.termites
    }

    /// Chips on the grid plus chips being carried.
    pub fn total_chips(&self) -> usize {
        self.board.cell_count() + self.termites.iter().filter(|t| t.carrying).count()
    }

    /// Replaces the population with termites at the given cells.
    pub fn place_termites(&mut self, positions: &[(usize, usize, Heading)]) {
        let dims = self.board.dims();
        self.termites = positions
            .iter()
            .take(self.params.max_termites)
            .map(|&(row, col, heading)| {
                let mut t = Actor::new(row, col, heading, self.params.trail_length);
                t.clamp_into(dims);
                t
            })
            .collect();
    }

    /// Sets `(row, col)` directly.
    pub fn set_cell(&mut self, row: usize, col: usize, chip: bool) {
        self.board.set_cell(row, col, chip);
    }

    fn scatter(&mut self, count: usize) {
        let dims = self.board.dims();
        let trail = self.params.trail_length;
        let rng = &mut self.rng;
        self.termites = (0..count)
            .map(|_| Actor::scattered(dims, trail, rng))
            .collect();
    }

    fn set_population(&mut self, count: usize) {
        let count = count.min(self.params.max_termites);
        let dims = self.board.dims();
        let trail = self.params.trail_length;
        if count < self.termites.len() {
            self.termites.truncate(count);
        } else {
            let rng = &mut self.rng;
            let missing = count - self.termites.len();
            self.termites
                .extend((0..missing).map(|_| Actor::scattered(dims, trail, rng)));
        }
        self.params.termite_count = count;
    }
}

impl Simulation for Termites {
    fn name(&self) -> &'static str {
        "termite"
    }

    fn init(&mut self) -> Result<(), EngineError> {
        self.board.init()?;
        if self.params.chip_density > 0.0 {
            self.board.randomize(self.params.chip_density, &mut self.rng);
        }
        self.scatter(self.params.termite_count);
        tracing::debug!(
            rows = self.board.dims().rows,
            cols = self.board.dims().cols,
            termites = self.termites.len(),
            chips = self.board.cell_count(),
            "termites initialised"
        );
        Ok(())
    }

    fn update(&mut self) -> Result<(), EngineError> {
        self.board.begin_tick();
        let dims = self.board.dims();
        let turn_p = self.params.random_turn_probability;
        let step = self.params.move_speed;
        let grid = self.board.grid_mut();
        for termite in &mut self.termites {
            if self.rng.chance(turn_p) {
                termite.heading = Heading::random(&mut self.rng);
            }
            termite.advance(step, dims);
            let (row, col) = (termite.row(), termite.col());
            let chip = grid.get(row, col);
            if !termite.carrying && chip {
                grid.set(row, col, false);
                termite.carrying = true;
            } else if termite.carrying && !chip {
                grid.set(row, col, true);
                termite.carrying = false;
            }
        }
        self.board.finish_tick();
        Ok(())
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        self.board.draw(surface);
        let colors = self.board.colors();
        for termite in &self.termites {
            for (row, col) in termite.trail() {
                self.board.paint_cell(surface, row, col, colors.trail);
            }
        }
        for termite in &self.termites {
            let color = if termite.carrying {
                colors.actor_loaded
            } else {
                colors.actor
            };
            self.board
                .paint_cell(surface, termite.row(), termite.col(), color);
        }
        Ok(())
    }

    fn toggle_cell(&mut self, px: f64, py: f64) {
        self.board.toggle(px, py);
    }

    fn randomize(&mut self, coverage: f64) {
        self.board.randomize(coverage, &mut self.rng);
        tracing::debug!(coverage, chips = self.board.cell_count(), "termite chips reseeded");
    }

    fn state(&self) -> SimState {
        let mut state = self.board.state(self.name());
        state.actors = self.termites.iter().map(Actor::view).collect::<Vec<ActorView>>();
        state
    }

    fn resize_preserve_state(&mut self, surface: &dyn Surface) -> Result<(), EngineError> {
        self.board.resize(surface)?;
        let dims = self.board.dims();
        for termite in &mut self.termites {
            termite.clamp_into(dims);
        }
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
        let count = |v: f64| if v.is_finite() && v > 0.0 { v as usize } else { 0 };
        match name {
            "termite_count" => self.set_population(count(value)),
            "random_turn_probability" => {
                self.params.random_turn_probability = clamp_unit(value);
            }
            "move_speed" => {
                self.params.move_speed = count(value).clamp(1, MAX_MOVE_SPEED);
            }
            "chip_density" => self.params.chip_density = clamp_unit(value),
            _ => return Err(EngineError::ParamNotFound(name.to_string())),
        }
        Ok(())
    }

    fn params(&self) -> Value {
        json!({
            "cell_size": self.board.cell_size(),
            "fade_out_cycles": self.board.fade().fade_out_cycles(),
            "speed": self.board.speed(),
            "colors": self.board.colors(),
            "termite_count": self.termites.len(),
            "max_termites": self.params.max_termites,
            "random_turn_probability": self.params.random_turn_probability,
            "move_speed": self.params.move_speed,
            "chip_density": self.params.chip_density,
            "trail_length": self.params.trail_length,
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
                "description": "Updates a picked-up chip's trail takes to fade out"
            },
            "speed": {
                "type": "integer",
                "default": SPEED_DEFAULT,
                "min": SPEED_MIN,
                "max": SPEED_MAX,
                "description": "Ticks per second"
            },
            "termite_count": {
                "type": "integer",
                "default": DEFAULT_TERMITE_COUNT,
                "min": 0,
                "max": MAX_TERMITES_DEFAULT,
                "description": "Number of termites"
            },
            "max_termites": {
                "type": "integer",
                "default": MAX_TERMITES_DEFAULT,
                "min": 0,
                "max": MAX_TERMITES_DEFAULT,
                "description": "Population cap"
            },
            "random_turn_probability": {
                "type": "number",
                "default": RANDOM_TURN_PROBABILITY,
                "min": 0.0,
                "max": 1.0,
                "description": "Chance per tick of picking a new random heading"
            },
            "move_speed": {
                "type": "integer",
                "default": MOVE_SPEED,
                "min": 1,
                "max": MAX_MOVE_SPEED,
                "description": "Cells moved per tick"
            },
            "chip_density": {
                "type": "number",
                "default": COVERAGE_DEFAULT,
                "min": 0.0,
                "max": 1.0,
                "description": "Fraction of cells holding a chip after init"
            },
            "trail_length": {
                "type": "integer",
                "default": DEFAULT_TRAIL_LENGTH,
                "min": 0,
                "max": TRAIL_LENGTH_MAX,
                "description": "Recent positions drawn behind each termite"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellsim_core::surface::RgbaSurface;

    fn surface(w: usize, h: usize) -> RgbaSurface {
        RgbaSurface::new(w, h).unwrap()
    }

    fn swarm(params: TermiteParams) -> Termites {
        Termites::new(&surface(300, 200), params, 17).unwrap()
    }

    /// Grid with no chips and no random turns, for hand-placed scenarios.
    fn quiet(rows: usize, cols: usize) -> Termites {
        let params = TermiteParams {
            chip_density: 0.0,
            termite_count: 0,
            random_turn_probability: 0.0,
            ..TermiteParams::default()
        };
        Termites::new(&surface(cols * 10, rows * 10), params, 1).unwrap()
    }

    #[test]
    fn default_population_and_chips() {
        let t = swarm(TermiteParams::default());
        assert_eq!(t.termites().len(), 50);
        let ratio = t.state().cell_count as f64 / 600.0;
        assert!((0.2..0.4).contains(&ratio), "chip ratio {ratio}");
        assert_eq!(t.state().actors.len(), 50);
    }

    #[test]
    fn population_is_capped() {
        let t = swarm(TermiteParams {
            termite_count: 5_000,
            ..TermiteParams::default()
        });
        assert_eq!(t.termites().len(), MAX_TERMITES_DEFAULT);
        let t = swarm(TermiteParams {
            termite_count: 20,
            max_termites: 10,
            ..TermiteParams::default()
        });
        assert_eq!(t.termites().len(), 10);
    }

    #[test]
    fn moves_two_cells_per_tick() {
        let mut t = quiet(10, 10);
        t.place_termites(&[(5, 2, Heading::Right)]);
        t.update().unwrap();
        assert_eq!((t.termites()[0].row(), t.termites()[0].col()), (5, 4));
    }

    #[test]
    fn movement_clamps_at_edge() {
        let mut t = quiet(10, 10);
        t.place_termites(&[(0, 9, Heading::Right)]);
        t.update().unwrap();
        assert_eq!((t.termites()[0].row(), t.termites()[0].col()), (0, 9));
    }

    #[test]
    fn picks_up_chip_at_destination() {
        let mut t = quiet(10, 10);
        t.set_cell(5, 4, true);
        t.place_termites(&[(5, 2, Heading::Right)]);
        t.update().unwrap();
        assert!(t.termites()[0].carrying);
        assert!(!t.board().grid().get(5, 4));
        assert_eq!(t.state().cell_count, 0);
    }

    #[test]
    fn drops_chip_on_empty_cell() {
        let mut t = quiet(10, 10);
        t.set_cell(5, 4, true);
        t.place_termites(&[(5, 2, Heading::Right)]);
        t.update().unwrap();
        t.update().unwrap();
        assert!(!t.termites()[0].carrying);
        assert!(t.board().grid().get(5, 6));
        assert_eq!(t.state().cell_count, 1);
    }

    #[test]
    fn loaded_termite_passes_over_chips() {
        let mut t = quiet(10, 10);
        t.set_cell(5, 4, true);
        t.set_cell(5, 6, true);
        t.place_termites(&[(5, 2, Heading::Right)]);
        t.update().unwrap();
        t.update().unwrap();
        assert!(t.termites()[0].carrying);
        assert!(t.board().grid().get(5, 6));
    }

    #[test]
    fn empty_handed_termite_ignores_empty_cells() {
        let mut t = quiet(10, 10);
        t.place_termites(&[(5, 2, Heading::Right)]);
        t.update().unwrap();
        assert!(!t.termites()[0].carrying);
        assert_eq!(t.state().cell_count, 0);
    }

    #[test]
    fn toggle_places_and_removes_chips_regardless_of_carrying() {
        let mut t = quiet(10, 10);
        t.set_cell(5, 4, true);
        t.place_termites(&[(5, 2, Heading::Right)]);
        t.update().unwrap();
        assert!(t.termites()[0].carrying);
        t.toggle_cell(55.0, 55.0);
        assert_eq!(t.state().cell_count, 1);
        assert!(t.termites()[0].carrying);
        t.toggle_cell(55.0, 55.0);
        assert_eq!(t.state().cell_count, 0);
    }

    #[test]
    fn chips_are_conserved_by_the_rule() {
        let mut t = swarm(TermiteParams::default());
        let total = t.total_chips();
        for _ in 0..500 {
            t.update().unwrap();
            assert_eq!(t.total_chips(), total);
        }
    }

    #[test]
    fn termites_stay_in_bounds() {
        let mut t = swarm(TermiteParams {
            random_turn_probability: 0.5,
            move_speed: 5,
            ..TermiteParams::default()
        });
        let dims = t.board().dims();
        for _ in 0..300 {
            t.update().unwrap();
            for termite in t.termites() {
                assert!(termite.row() < dims.rows && termite.col() < dims.cols);
            }
        }
    }

    #[test]
    fn set_param_adjusts_population_and_clamps() {
        let mut t = swarm(TermiteParams::default());
        t.set_param("termite_count", 75.0).unwrap();
        assert_eq!(t.termites().len(), 75);
        t.set_param("termite_count", 10.0).unwrap();
        assert_eq!(t.termites().len(), 10);
        t.set_param("termite_count", 1e9).unwrap();
        assert_eq!(t.termites().len(), MAX_TERMITES_DEFAULT);
        t.set_param("random_turn_probability", 7.0).unwrap();
        assert_eq!(t.params()["random_turn_probability"], 1.0);
        t.set_param("move_speed", -3.0).unwrap();
        assert_eq!(t.params()["move_speed"], 1);
        assert!(t.set_param("feed", 0.05).is_err());
    }

    #[test]
    fn randomize_reseeds_chips_only() {
        let mut t = swarm(TermiteParams::default());
        t.randomize(0.0);
        assert_eq!(t.state().cell_count, 0);
        assert_eq!(t.termites().len(), 50);
        t.randomize(1.0);
        assert_eq!(t.state().cell_count, 600);
    }

    #[test]
    fn resize_preserves_generation_and_clamps_termites() {
        let mut t = swarm(TermiteParams::default());
        for _ in 0..10 {
            t.update().unwrap();
        }
        let before = t.state();
        t.resize_preserve_state(&surface(305, 209)).unwrap();
        let after = t.state();
        assert_eq!(after.generation, before.generation);
        assert_eq!(after.cell_count, before.cell_count);

        t.resize_preserve_state(&surface(50, 50)).unwrap();
        for termite in t.termites() {
            assert!(termite.row() < 5 && termite.col() < 5);
        }
    }

    #[test]
    fn draw_marks_loaded_termites() {
        let mut t = quiet(10, 10);
        t.set_cell(5, 4, true);
        t.place_termites(&[(5, 2, Heading::Right)]);
        t.update().unwrap();
        let mut s = surface(100, 100);
        t.draw(&mut s).unwrap();
        assert_eq!(
            s.pixel(45, 55).unwrap(),
            t.board().colors().actor_loaded.to_rgba8()
        );
    }

    #[test]
    fn huge_trail_length_is_capped() {
        let params = json!({"trail_length": 1_u64 << 62, "termite_count": 3});
        let mut t = Termites::from_json(&surface(100, 100), &params, 1).unwrap();
        assert_eq!(t.params()["trail_length"], TRAIL_LENGTH_MAX);
        for _ in 0..20 {
            t.update().unwrap();
        }
        assert!(t.termites().iter().all(|a| a.trail().count() <= TRAIL_LENGTH_MAX));
    }

    #[test]
    fn loaded_color_comes_from_params() {
        let params = json!({
            "chip_density": 0.0,
            "termite_count": 0,
            "random_turn_probability": 0.0,
            "colors": {"actor_loaded": "#00ff00"}
        });
        let mut t = Termites::from_json(&surface(100, 100), &params, 1).unwrap();
        t.set_cell(5, 4, true);
        t.place_termites(&[(5, 2, Heading::Right)]);
        t.update().unwrap();
        let mut s = surface(100, 100);
        t.draw(&mut s).unwrap();
        assert_eq!(s.pixel(45, 55).unwrap(), [0, 255, 0, 255]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn same_seed_same_swarm(seed: u64, steps in 0_usize..100) {
                let params = TermiteParams::default();
                let mut a = Termites::new(&surface(200, 150), params, seed).unwrap();
                let mut b = Termites::new(&surface(200, 150), params, seed).unwrap();
                for _ in 0..steps {
                    a.update().unwrap();
                    b.update().unwrap();
                }
                prop_assert_eq!(a.state(), b.state());
                prop_assert_eq!(a.board().grid().cells(), b.board().grid().cells());
            }
        }
    }
}
