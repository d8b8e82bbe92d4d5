//! Fixed-rate frame loop.
//!
//! The host calls [`FrameDriver::frame`] once per display frame with the
//! wall-clock time elapsed since the previous frame. Elapsed time accumulates
//! and is converted into whole `update()` calls at the simulation's own
//! speed, then the simulation is drawn once.

use std::time::Duration;

use cellsim_core::error::EngineError;
use cellsim_core::simulation::Simulation;
use cellsim_core::surface::Surface;

pub const FPS_DEFAULT: u32 = 60;
pub const FPS_MIN: u32 = 1;
pub const FPS_MAX: u32 = 240;
/// Catch-up limit; a frame never runs more updates than this.
pub const MAX_UPDATES_PER_FRAME: u32 = 8;

/// What one call to [`FrameDriver::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    pub updates: u32,
    pub drawn: bool,
}

/// Totals from [`FrameDriver::run_headless`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeadlessRun {
    pub frames: u64,
    pub updates: u64,
}

impl HeadlessRun {
    /// Simulated wall-clock time at the driver's frame rate.
    pub fn simulated(&self, fps: u32) -> Duration {
        Duration::from_secs_f64(self.frames as f64 / f64::from(fps.max(FPS_MIN)))
    }
}

#[derive(Debug, Clone)]
pub struct FrameDriver {
    fps: u32,
    /// Seconds of simulation time owed but not yet run.
    backlog: f64,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(FPS_DEFAULT)
    }
}

impl FrameDriver {
    /// `fps` is clamped to [`FPS_MIN`, `FPS_MAX`].
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.clamp(FPS_MIN, FPS_MAX),
            backlog: 0.0,
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.clamp(FPS_MIN, FPS_MAX);
    }

    /// Target time between frames, `1 / fps`.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps))
    }

    /// Adds `elapsed` to the backlog and returns how many updates are due at
    /// `speed` ticks per second, at most [`MAX_UPDATES_PER_FRAME`].
    ///
    /// Hitting the cap drops the rest of the backlog instead of carrying it
    /// into later frames.
    pub fn updates_due(&mut self, elapsed: Duration, speed: u32) -> u32 {
        let tick = 1.0 / f64::from(speed.max(1));
        self.backlog += elapsed.as_secs_f64();
        let due = (self.backlog / tick).floor();
        if due >= f64::from(MAX_UPDATES_PER_FRAME) {
            self.backlog %= tick;
            return MAX_UPDATES_PER_FRAME;
        }
        self.backlog -= due * tick;
        due as u32
    }

    /// Forgets any accumulated time, e.g. after the host was paused.
    pub fn reset(&mut self) {
        self.backlog = 0.0;
    }

    /// Runs the updates due for `elapsed`, then draws once.
    ///
    /// An error from `update()` or `draw()` is logged and the rest of the
    /// frame is skipped; the next frame starts fresh.
    pub fn frame(
        &mut self,
        sim: &mut dyn Simulation,
        surface: &mut dyn Surface,
        elapsed: Duration,
    ) -> FrameReport {
        let due = self.updates_due(elapsed, sim.speed());
        let mut report = FrameReport::default();
        for _ in 0..due {
            if let Err(err) = sim.update() {
                tracing::warn!(simulation = sim.name(), %err, "update failed, skipping frame");
                return report;
            }
            report.updates += 1;
        }
        match sim.draw(surface) {
            Ok(()) => report.drawn = true,
            Err(err) => {
                tracing::warn!(simulation = sim.name(), %err, "draw failed, skipping frame");
            }
        }
        report
    }

    /// Drives `sim` frame by frame on a simulated clock until exactly `steps`
    /// updates have run, then draws the final state.
    ///
    /// Unlike [`FrameDriver::frame`], errors are returned rather than logged.
    pub fn run_headless(
        &mut self,
        sim: &mut dyn Simulation,
        surface: &mut dyn Surface,
        steps: u64,
    ) -> Result<HeadlessRun, EngineError> {
        let interval = self.frame_interval();
        let mut run = HeadlessRun::default();
        while run.updates < steps {
            let due = u64::from(self.updates_due(interval, sim.speed()));
            for _ in 0..due.min(steps - run.updates) {
                sim.update()?;
                run.updates += 1;
            }
            run.frames += 1;
        }
        sim.draw(surface)?;
        tracing::debug!(
            simulation = sim.name(),
            frames = run.frames,
            updates = run.updates,
            "headless run finished"
        );
        Ok(run)
    }
}
