#![deny(unsafe_code)]
//! Conway's Game of Life.
//!
//! Live cells survive with two or three live Moore neighbours, dead cells
//! with exactly three are born, everything else dies. The grid is finite:
//! cells beyond the edge count as dead. Cells that die leave a fading trail.

use cellsim_core::board::Board;
use cellsim_core::error::EngineError;
use cellsim_core::grid::count_neighbours;
use cellsim_core::palette::CellColors;
use cellsim_core::params::{
    clamp_unit, param_f64, param_u32, param_usize, CELL_SIZE_DEFAULT, COVERAGE_DEFAULT,
    FADE_CYCLES_DEFAULT, FADE_CYCLES_MAX, FADE_CYCLES_MIN, SPEED_DEFAULT, SPEED_MAX, SPEED_MIN,
};
use cellsim_core::prng::Xorshift64;
use cellsim_core::simulation::{SimState, Simulation};
use cellsim_core::surface::Surface;
use serde_json::{json, Value};

/// Tunables for [`Conway`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConwayParams {
    /// Cell edge in pixels.
    pub cell_size: usize,
    /// Updates a dead cell takes to fade out.
    pub fade_out_cycles: u32,
    /// Fraction of cells alive after `init()`.
    pub coverage: f64,
    /// Ticks per second.
    pub speed: u32,
}

impl Default for ConwayParams {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE_DEFAULT,
            fade_out_cycles: FADE_CYCLES_DEFAULT,
            coverage: COVERAGE_DEFAULT,
            speed: SPEED_DEFAULT,
        }
    }
}

impl ConwayParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            cell_size: param_usize(params, "cell_size", CELL_SIZE_DEFAULT),
            fade_out_cycles: param_u32(params, "fade_out_cycles", FADE_CYCLES_DEFAULT),
            coverage: param_f64(params, "coverage", COVERAGE_DEFAULT),
            speed: param_u32(params, "speed", SPEED_DEFAULT),
        }
    }
}

/// Applies the B3/S23 rule to one cell.
pub fn next_state(alive: bool, neighbours: u8) -> bool {
    matches!((alive, neighbours), (true, 2) | (true, 3) | (false, 3))
}

pub struct Conway {
    board: Board,
    coverage: f64,
    rng: Xorshift64,
}

impl Conway {
    /// Lays out a grid over `surface` and seeds it with `params.coverage`.
    ///
    /// Returns `EngineError::InvalidSurface` if the surface has no area.
    pub fn new(
        surface: &dyn Surface,
        params: ConwayParams,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let mut board = Board::new(surface, params.cell_size, params.fade_out_cycles)?;
        board.set_speed(params.speed);
        let mut conway = Self {
            board,
            coverage: clamp_unit(params.coverage),
            rng: Xorshift64::new(seed),
        };
        conway.init()?;
        Ok(conway)
    }

    /// Like [`Conway::new`], with tunables and the optional `"colors"` object
    /// read from `params`.
    ///
    /// Returns `EngineError::InvalidColor` if `"colors"` is malformed.
    pub fn from_json(
        surface: &dyn Surface,
        params: &Value,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let colors = CellColors::from_params(params)?;
        let mut conway = Self::new(surface, ConwayParams::from_json(params), seed)?;
        conway.set_colors(colors);
        Ok(conway)
    }

    pub fn set_colors(&mut self, colors: CellColors) {
        self.board.set_colors(colors);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Sets `(row, col)` directly; used to place known patterns.
    pub fn set_cell(&mut self, row: usize, col: usize, alive: bool) {
        self.board.set_cell(row, col, alive);
    }

    /// Kills every cell without touching the generation counter.
    pub fn clear(&mut self) {
        self.board.clear();
    }

    /// Fade factor of `(row, col)` in [0, 1].
    pub fn fade_factor(&self, row: usize, col: usize) -> f64 {
        let grid = self.board.grid();
        if grid.get(row, col) {
            1.0
        } else {
            self.board.fade().brightness(grid.index(row, col))
        }
    }
}

impl Simulation for Conway {
    fn name(&self) -> &'static str {
        "conway"
    }

    fn init(&mut self) -> Result<(), EngineError> {
        self.board.init()?;
        if self.coverage > 0.0 {
            self.board.randomize(self.coverage, &mut self.rng);
        }
        tracing::debug!(
            rows = self.board.dims().rows,
            cols = self.board.dims().cols,
            cell_count = self.board.cell_count(),
            "conway initialised"
        );
        Ok(())
    }

    fn update(&mut self) -> Result<(), EngineError> {
        let grid = self.board.grid_mut();
        let (rows, cols) = (grid.rows(), grid.cols());
        let (current, next) = grid.buffers_mut();
        for row in 0..rows {
            for col in 0..cols {
                let idx = row * cols + col;
                let n = count_neighbours(current, row, col, rows, cols);
                next[idx] = next_state(current[idx], n);
            }
        }
        grid.swap();
        self.board.finish_tick();
        Ok(())
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        self.board.draw(surface);
        Ok(())
    }

    fn toggle_cell(&mut self, px: f64, py: f64) {
        self.board.toggle(px, py);
    }

    fn randomize(&mut self, coverage: f64) {
        self.board.randomize(coverage, &mut self.rng);
        tracing::debug!(coverage, cell_count = self.board.cell_count(), "conway randomized");
    }

    fn state(&self) -> SimState {
        self.board.state(self.name())
    }

    fn resize_preserve_state(&mut self, surface: &dyn Surface) -> Result<(), EngineError> {
        self.board.resize(surface)
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

    fn params(&self) -> Value {
        json!({
            "cell_size": self.board.cell_size(),
            "fade_out_cycles": self.board.fade().fade_out_cycles(),
            "coverage": self.coverage,
            "speed": self.board.speed(),
            "colors": self.board.colors(),
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
                "description": "Updates a dead cell's trail takes to fade out"
            },
            "coverage": {
                "type": "number",
                "default": COVERAGE_DEFAULT,
                "min": 0.0,
                "max": 1.0,
                "description": "Fraction of cells alive after init"
            },
            "speed": {
                "type": "integer",
                "default": SPEED_DEFAULT,
                "min": SPEED_MIN,
                "max": SPEED_MAX,
                "description": "Ticks per second"
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

    /// Empty 10-px grid of `rows × cols`.
    fn empty(rows: usize, cols: usize) -> Conway {
        let params = ConwayParams {
            coverage: 0.0,
            ..ConwayParams::default()
        };
        Conway::new(&surface(cols * 10, rows * 10), params, 42).unwrap()
    }

    fn live_cells(c: &Conway) -> Vec<(usize, usize)> {
        let grid = c.board().grid();
        (0..grid.rows())
            .flat_map(|r| (0..grid.cols()).map(move |col| (r, col)))
            .filter(|&(r, col)| grid.get(r, col))
            .collect()
    }

    // ---- Construction ----

    #[test]
    fn new_lays_out_grid_from_surface() {
        let c = Conway::new(&surface(805, 403), ConwayParams::default(), 1).unwrap();
        let s = c.state();
        assert_eq!((s.rows, s.cols), (40, 80));
        assert_eq!(s.generation, 0);
        assert_eq!(s.name, "conway");
    }

    #[test]
    fn new_seeds_with_default_coverage() {
        let c = Conway::new(&surface(400, 400), ConwayParams::default(), 1).unwrap();
        let ratio = c.state().cell_count as f64 / 1600.0;
        assert!((0.2..0.4).contains(&ratio), "coverage ratio {ratio}");
    }

    #[test]
    fn from_json_reads_overrides() {
        let c = Conway::from_json(
            &surface(100, 100),
            &json!({"cell_size": 5, "coverage": 0.0, "speed": 12}),
            1,
        )
        .unwrap();
        assert_eq!(c.state().cols, 20);
        assert_eq!(c.state().cell_count, 0);
        assert_eq!(c.speed(), 12);
    }

    #[test]
    fn from_json_applies_colors() {
        let params = json!({"coverage": 0.0, "colors": {"background": "#0000ff"}});
        let c = Conway::from_json(&surface(50, 50), &params, 1).unwrap();
        assert_eq!(c.params()["colors"]["background"], "#0000ff");
        assert_eq!(c.params()["colors"]["alive"], CellColors::default().alive.to_hex());
        let mut s = surface(50, 50);
        c.draw(&mut s).unwrap();
        assert_eq!(s.pixel(20, 20).unwrap(), [0, 0, 255, 255]);
    }

    #[test]
    fn from_json_rejects_malformed_colors() {
        let params = json!({"colors": {"alive": "green"}});
        assert!(matches!(
            Conway::from_json(&surface(50, 50), &params, 1),
            Err(EngineError::InvalidColor(_))
        ));
    }

    // ---- Rule ----

    #[test]
    fn rule_table() {
        for n in 0..=8u8 {
            assert_eq!(next_state(true, n), n == 2 || n == 3, "live with {n}");
            assert_eq!(next_state(false, n), n == 3, "dead with {n}");
        }
    }

    #[test]
    fn block_is_still_life() {
        let mut c = empty(4, 4);
        for (r, col) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            c.set_cell(r, col, true);
        }
        let before = live_cells(&c);
        c.update().unwrap();
        assert_eq!(live_cells(&c), before);
    }

    #[test]
    fn blinker_oscillates() {
        let mut c = empty(5, 5);
        for col in 1..4 {
            c.set_cell(2, col, true);
        }
        c.update().unwrap();
        assert_eq!(live_cells(&c), vec![(1, 2), (2, 2), (3, 2)]);
        c.update().unwrap();
        assert_eq!(live_cells(&c), vec![(2, 1), (2, 2), (2, 3)]);
        assert_eq!(c.state().generation, 2);
    }

    #[test]
    fn glider_translates_diagonally() {
        let mut c = empty(10, 10);
        let glider = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];
        for (r, col) in glider {
            c.set_cell(r, col, true);
        }
        for _ in 0..4 {
            c.update().unwrap();
        }
        let expected: Vec<_> = glider.iter().map(|&(r, col)| (r + 1, col + 1)).collect();
        let mut got = live_cells(&c);
        got.sort();
        let mut want = expected;
        want.sort();
        assert_eq!(got, want);
    }

    #[test]
    fn edge_does_not_wrap() {
        // A vertical blinker on the left edge would gain a wrapped neighbour
        // on the right edge if the grid were toroidal.
        let mut c = empty(5, 5);
        for r in 1..4 {
            c.set_cell(r, 0, true);
        }
        c.update().unwrap();
        assert_eq!(live_cells(&c), vec![(2, 0), (2, 1)]);
    }

    // ---- Toggle and fade ----

    #[test]
    fn toggle_changes_count_by_exactly_one() {
        let mut c = Conway::new(&surface(200, 200), ConwayParams::default(), 9).unwrap();
        let before = c.state().cell_count;
        c.toggle_cell(55.0, 77.0);
        let after = c.state().cell_count;
        assert_eq!(before.abs_diff(after), 1);
        c.toggle_cell(55.0, 77.0);
        assert_eq!(c.state().cell_count, before);
    }

    #[test]
    fn toggle_outside_surface_clamps() {
        let mut c = empty(3, 3);
        c.toggle_cell(-50.0, 1e6);
        assert!(c.board().grid().get(2, 0));
    }

    #[test]
    fn fade_follows_decrement_then_floors_at_zero() {
        let mut c = empty(5, 5);
        c.toggle_cell(25.0, 25.0);
        assert_eq!(c.fade_factor(2, 2), 1.0);
        c.toggle_cell(25.0, 25.0);
        assert_eq!(c.fade_factor(2, 2), 1.0);

        c.update().unwrap();
        assert!((c.fade_factor(2, 2) - 0.8).abs() < 1e-6);

        for _ in 1..FADE_CYCLES_DEFAULT {
            c.update().unwrap();
        }
        assert!(c.fade_factor(2, 2).abs() < 1e-6);
        for _ in 0..3 {
            c.update().unwrap();
            assert!(c.fade_factor(2, 2).abs() < 1e-6);
        }
    }

    #[test]
    fn cell_dying_by_rule_starts_fade_at_one() {
        let mut c = empty(5, 5);
        c.set_cell(2, 2, true);
        c.update().unwrap();
        assert!(!c.board().grid().get(2, 2));
        assert_eq!(c.fade_factor(2, 2), 1.0);
        c.update().unwrap();
        assert!((c.fade_factor(2, 2) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn set_fade_out_cycles_changes_decrement() {
        let mut c = empty(5, 5);
        c.set_fade_out_cycles(4);
        c.set_cell(2, 2, true);
        c.update().unwrap();
        c.update().unwrap();
        assert!((c.fade_factor(2, 2) - 0.75).abs() < 1e-6);
        c.set_fade_out_cycles(0);
        assert_eq!(c.params()["fade_out_cycles"], 1);
    }

    // ---- Tunables ----

    #[test]
    fn set_speed_clamps_to_max() {
        let mut c = empty(3, 3);
        c.set_speed(10_000);
        assert_eq!(c.speed(), 60);
        c.set_speed(0);
        assert_eq!(c.speed(), 1);
    }

    #[test]
    fn reaction_params_are_not_understood() {
        let mut c = empty(3, 3);
        assert!(matches!(
            c.set_param("feed", 0.05),
            Err(EngineError::ParamNotFound(_))
        ));
    }

    #[test]
    fn randomize_is_rerunnable() {
        let mut c = empty(20, 20);
        c.randomize(1.0);
        assert_eq!(c.state().cell_count, 400);
        c.randomize(0.0);
        assert_eq!(c.state().cell_count, 0);
        c.randomize(0.5);
        let n = c.state().cell_count;
        assert!(n > 120 && n < 280, "half coverage gave {n}");
    }

    // ---- Lifecycle ----

    #[test]
    fn init_resets_generation() {
        let mut c = Conway::new(&surface(100, 100), ConwayParams::default(), 3).unwrap();
        c.update().unwrap();
        c.update().unwrap();
        c.init().unwrap();
        assert_eq!(c.state().generation, 0);
    }

    #[test]
    fn resize_preserves_generation_and_count() {
        let mut c = Conway::new(&surface(300, 300), ConwayParams::default(), 5).unwrap();
        for _ in 0..3 {
            c.update().unwrap();
        }
        let before = c.state();
        c.resize_preserve_state(&surface(310, 320)).unwrap();
        let after = c.state();
        assert_eq!(after.generation, before.generation);
        let tolerance = 5.max(before.cell_count / 10);
        assert!(
            after.cell_count.abs_diff(before.cell_count) <= tolerance,
            "{} -> {}",
            before.cell_count,
            after.cell_count
        );
        assert_eq!((after.rows, after.cols), (32, 31));
    }

    #[test]
    fn invalid_surface_fails_fast() {
        struct Detached;
        impl Surface for Detached {
            fn width(&self) -> usize {
                0
            }
            fn height(&self) -> usize {
                0
            }
            fn fill_rect(
                &mut self,
                _: usize,
                _: usize,
                _: usize,
                _: usize,
                _: cellsim_core::Srgb,
            ) {
            }
        }
        assert!(matches!(
            Conway::new(&Detached, ConwayParams::default(), 1),
            Err(EngineError::InvalidSurface { .. })
        ));
    }

    #[test]
    fn draw_does_not_change_state() {
        let c = Conway::new(&surface(50, 50), ConwayParams::default(), 5).unwrap();
        let before = c.state();
        let mut s = surface(50, 50);
        c.draw(&mut s).unwrap();
        assert_eq!(c.state(), before);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn same_seed_same_history(w in 10_usize..200, h in 10_usize..200, seed: u64) {
                let mut a = Conway::new(&surface(w, h), ConwayParams::default(), seed).unwrap();
                let mut b = Conway::new(&surface(w, h), ConwayParams::default(), seed).unwrap();
                for _ in 0..5 {
                    a.update().unwrap();
                    b.update().unwrap();
                }
                prop_assert_eq!(a.board().grid().cells(), b.board().grid().cells());
            }

            #[test]
            fn cell_count_matches_scan(w in 10_usize..200, h in 10_usize..200, seed: u64) {
                let mut c = Conway::new(&surface(w, h), ConwayParams::default(), seed).unwrap();
                c.update().unwrap();
                c.toggle_cell(3.0, 3.0);
                prop_assert_eq!(c.state().cell_count, c.board().grid().count_live());
            }
        }
    }
}
