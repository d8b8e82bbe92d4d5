#![deny(unsafe_code)]
//! Gray-Scott reaction-diffusion engine.
//!
//! Two chemicals react and diffuse on a bounded grid: U is the substrate, V
//! the catalyst. U is fed at rate F and consumed by the reaction U + 2V → 3V;
//! V is produced by the reaction and removed at rate F + k. The interplay of
//! F, k and the two diffusion constants produces spots, stripes and coral.
//!
//! The grid edge is zero-flux: the Laplacian replicates edge cells instead of
//! wrapping. A cell counts as active while its V concentration exceeds 0.5.

use cellsim_core::error::EngineError;
use cellsim_core::field::Field;
use cellsim_core::grid::{screen_to_grid, GridDims};
use cellsim_core::palette::Palette;
use cellsim_core::params::{
    clamp_cell_size, clamp_speed, clamp_unit, param_f64, param_u32, param_usize, SPEED_DEFAULT,
    SPEED_MAX, SPEED_MIN,
};
use cellsim_core::prng::Xorshift64;
use cellsim_core::simulation::{SimState, Simulation};
use cellsim_core::surface::{validate_surface, Surface};
use serde_json::{json, Value};

/// Default feed rate (F).
const DEFAULT_FEED: f64 = 0.055;
/// Default kill rate (k).
const DEFAULT_KILL: f64 = 0.062;
/// Upper bound for both F and k.
const RATE_MAX: f64 = 0.1;
/// Diffusion rate of U.
pub const DIFFUSION_U: f64 = 0.2097;
/// Diffusion rate of V.
pub const DIFFUSION_V: f64 = 0.105;
/// Euler time step per update.
pub const DT: f64 = 1.0;
/// V concentration above which a cell counts as active.
pub const ACTIVE_THRESHOLD: f64 = 0.5;
/// Cell edge in pixels.
const DEFAULT_CELL_SIZE: usize = 6;
/// Radius in cells of seeded discs.
const SPOT_RADIUS: isize = 3;
/// Seed discs per grid cell at `init()`.
const SPOT_DENSITY: f64 = 0.0005;
/// Concentrations written into a seeded cell.
const SEED_U: f64 = 0.5;
const SEED_V: f64 = 1.0;
const DEFAULT_PALETTE: &str = "ocean";

/// Tunables for [`GrayScott`].
#[derive(Debug, Clone, PartialEq)]
pub struct GrayScottParams {
    /// Feed rate (F), clamped to [0, 0.1].
    pub feed: f64,
    /// Kill rate (k), clamped to [0, 0.1].
    pub kill: f64,
    pub cell_size: usize,
    pub speed: u32,
    /// Built-in palette the V field is drawn with.
    pub palette: String,
}

impl Default for GrayScottParams {
    fn default() -> Self {
        Self {
            feed: DEFAULT_FEED,
            kill: DEFAULT_KILL,
            cell_size: DEFAULT_CELL_SIZE,
            speed: SPEED_DEFAULT,
            palette: DEFAULT_PALETTE.to_string(),
        }
    }
}

impl GrayScottParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            feed: param_f64(params, "feed", DEFAULT_FEED),
            kill: param_f64(params, "kill", DEFAULT_KILL),
            cell_size: param_usize(params, "cell_size", DEFAULT_CELL_SIZE),
            speed: param_u32(params, "speed", SPEED_DEFAULT),
            palette: params
                .get("palette")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PALETTE)
                .to_string(),
        }
    }
}

/// Clamps a rate into [0, 0.1]; `None` for non-finite input.
fn clamp_rate(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, RATE_MAX))
}

pub struct GrayScott {
    u: Field,
    v: Field,
    u_next: Field,
    v_next: Field,
    feed: f64,
    kill: f64,
    cell_size: usize,
    width: usize,
    height: usize,
    generation: u64,
    speed: u32,
    palette: Palette,
    palette_name: String,
    rng: Xorshift64,
}

impl GrayScott {
    /// Lays out fields over `surface` and seeds random discs of V.
    ///
    /// Returns `EngineError::InvalidSurface` if the surface has no area, or
    /// `EngineError::InvalidPalette` for an unknown palette name.
    pub fn new(
        surface: &dyn Surface,
        params: GrayScottParams,
        seed: u64,
    ) -> Result<Self, EngineError> {
        validate_surface(surface)?;
        let palette = Palette::from_name(&params.palette)?;
        let cell_size = clamp_cell_size(params.cell_size);
        let (width, height) = (surface.width(), surface.height());
        let dims = GridDims::from_surface(width, height, cell_size);
        let mut engine = Self {
            u: Field::filled(dims.cols, dims.rows, 1.0)?,
            v: Field::new(dims.cols, dims.rows)?,
            u_next: Field::new(dims.cols, dims.rows)?,
            v_next: Field::new(dims.cols, dims.rows)?,
            feed: clamp_rate(params.feed).unwrap_or(DEFAULT_FEED),
            kill: clamp_rate(params.kill).unwrap_or(DEFAULT_KILL),
            cell_size,
            width,
            height,
            generation: 0,
            speed: clamp_speed(params.speed),
            palette,
            palette_name: params.palette,
            rng: Xorshift64::new(seed),
        };
        engine.init()?;
        Ok(engine)
    }

    pub fn from_json(
        surface: &dyn Surface,
        params: &Value,
        seed: u64,
    ) -> Result<Self, EngineError> {
        Self::new(surface, GrayScottParams::from_json(params), seed)
    }

    pub fn u_field(&self) -> &Field {
        &self.u
    }

    pub fn v_field(&self) -> &Field {
        &self.v
    }

    pub fn feed(&self) -> f64 {
        self.feed
    }

    pub fn kill(&self) -> f64 {
        self.kill
    }

    fn dims(&self) -> GridDims {
        GridDims {
            rows: self.u.height(),
            cols: self.u.width(),
        }
    }

    /// Writes a filled disc of seed concentration centred on `(row, col)`.
    /// Parts falling outside the grid are dropped.
    pub fn seed_disc(&mut self, row: usize, col: usize) {
        let (cx, cy) = (col as isize, row as isize);
        let r = SPOT_RADIUS;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.u.set(cx + dx, cy + dy, SEED_U);
                    self.v.set(cx + dx, cy + dy, SEED_V);
                }
            }
        }
    }

    fn reset_fields(&mut self) {
        self.u.fill(1.0);
        self.v.fill(0.0);
    }
}

impl Simulation for GrayScott {
    fn name(&self) -> &'static str {
        "reaction"
    }

    fn init(&mut self) -> Result<(), EngineError> {
        let dims = GridDims::from_surface(self.width, self.height, self.cell_size);
        self.u = Field::filled(dims.cols, dims.rows, 1.0)?;
        self.v = Field::new(dims.cols, dims.rows)?;
        self.u_next = Field::new(dims.cols, dims.rows)?;
        self.v_next = Field::new(dims.cols, dims.rows)?;
        self.generation = 0;

        let spots = (dims.len() as f64 * SPOT_DENSITY).ceil().max(1.0) as usize;
        for _ in 0..spots {
            let row = self.rng.next_usize(dims.rows);
            let col = self.rng.next_usize(dims.cols);
            self.seed_disc(row, col);
        }
        tracing::debug!(
            rows = dims.rows,
            cols = dims.cols,
            spots,
            feed = self.feed,
            kill = self.kill,
            "reaction initialised"
        );
        Ok(())
    }

    fn update(&mut self) -> Result<(), EngineError> {
        let (w, h) = (self.u.width(), self.u.height());
        let (f, k) = (self.feed, self.kill);
        let u = self.u.data();
        let v = self.v.data();
        let u_next = self.u_next.data_mut();
        let v_next = self.v_next.data_mut();

        for y in 0..h {
            for x in 0..w {
                let idx = y * w + x;
                let (uc, vc) = (u[idx], v[idx]);
                let reaction = uc * vc * vc;
                let lap_u = laplacian_5pt(u, x, y, w, h);
                let lap_v = laplacian_5pt(v, x, y, w, h);
                u_next[idx] = uc + DT * (DIFFUSION_U * lap_u - reaction + f * (1.0 - uc));
                v_next[idx] = vc + DT * (DIFFUSION_V * lap_v + reaction - (f + k) * vc);
            }
        }

        std::mem::swap(&mut self.u, &mut self.u_next);
        std::mem::swap(&mut self.v, &mut self.v_next);
        self.generation += 1;
        Ok(())
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        let (w, h) = (surface.width(), surface.height());
        surface.fill_rect(0, 0, w, h, self.palette.sample(0.0));
        let cs = self.cell_size;
        for (x, y, v) in self.v.iter() {
            surface.fill_rect(x * cs, y * cs, cs, cs, self.palette.sample(v));
        }
        Ok(())
    }

    fn toggle_cell(&mut self, px: f64, py: f64) {
        let (row, col) = screen_to_grid(px, py, self.cell_size, self.dims());
        self.seed_disc(row, col);
    }

    fn randomize(&mut self, likelihood: f64) {
        let likelihood = clamp_unit(likelihood);
        self.reset_fields();
        let len = self.u.data().len();
        for idx in 0..len {
            if self.rng.chance(likelihood) {
                self.u.data_mut()[idx] = SEED_U;
                self.v.data_mut()[idx] = SEED_V;
            }
        }
        tracing::debug!(
            likelihood,
            cell_count = self.v.count_above(ACTIVE_THRESHOLD),
            "reaction randomized"
        );
    }

    fn state(&self) -> SimState {
        SimState {
            name: self.name().to_string(),
            generation: self.generation,
            cell_count: self.v.count_above(ACTIVE_THRESHOLD),
            rows: self.u.height(),
            cols: self.u.width(),
            speed: self.speed,
            fade_out_cycles: None,
            actors: Vec::new(),
        }
    }

    fn resize_preserve_state(&mut self, surface: &dyn Surface) -> Result<(), EngineError> {
        let (width, height) = (surface.width(), surface.height());
        let dims = GridDims::from_surface(width, height, self.cell_size);
        self.u = self.u.remap(dims.cols, dims.rows, 1.0)?;
        self.v = self.v.remap(dims.cols, dims.rows, 0.0)?;
        self.u_next = Field::new(dims.cols, dims.rows)?;
        self.v_next = Field::new(dims.cols, dims.rows)?;
        self.width = width;
        self.height = height;
        tracing::debug!(rows = dims.rows, cols = dims.cols, "reaction resized");
        Ok(())
    }

    fn speed(&self) -> u32 {
        self.speed
    }

    fn set_speed(&mut self, speed: u32) {
        self.speed = clamp_speed(speed);
    }

    fn set_param(&mut self, name: &str, value: f64) -> Result<(), EngineError> {
        let slot = match name {
            "feed" => &mut self.feed,
            "kill" => &mut self.kill,
            _ => return Err(EngineError::ParamNotFound(name.to_string())),
        };
        if let Some(rate) = clamp_rate(value) {
            *slot = rate;
        }
        Ok(())
    }

    fn params(&self) -> Value {
        json!({
            "feed": self.feed,
            "kill": self.kill,
            "cell_size": self.cell_size,
            "speed": self.speed,
            "palette": self.palette_name,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "feed": {
                "type": "number",
                "default": DEFAULT_FEED,
                "min": 0.0,
                "max": RATE_MAX,
                "description": "Feed rate (F): how fast substrate U is replenished"
            },
            "kill": {
                "type": "number",
                "default": DEFAULT_KILL,
                "min": 0.0,
                "max": RATE_MAX,
                "description": "Kill rate (k): how fast catalyst V is removed"
            },
            "cell_size": {
                "type": "integer",
                "default": DEFAULT_CELL_SIZE,
                "min": 1,
                "description": "Cell edge in pixels"
            },
            "speed": {
                "type": "integer",
                "default": SPEED_DEFAULT,
                "min": SPEED_MIN,
                "max": SPEED_MAX,
                "description": "Ticks per second"
            },
            "palette": {
                "type": "string",
                "default": DEFAULT_PALETTE,
                "options": Palette::list_names(),
                "description": "Colour scheme the V concentration is drawn with"
            }
        })
    }
}

/// 5-point Laplacian with replicated edges:
///
/// ```text
///        1
///    1  -4   1
///        1
/// ```
fn laplacian_5pt(data: &[f64], x: usize, y: usize, w: usize, h: usize) -> f64 {
    let xm = x.saturating_sub(1);
    let xp = (x + 1).min(w - 1);
    let ym = y.saturating_sub(1);
    let yp = (y + 1).min(h - 1);
    data[ym * w + x] + data[yp * w + x] + data[y * w + xm] + data[y * w + xp]
        - 4.0 * data[y * w + x]
}
