//! Per-cell trail brightness for recently deactivated cells.
//!
//! Each cell keeps a cycles-remaining counter. Active cells and cells that
//! just died sit at `fade_out_cycles` (brightness 1); every update a cell
//! stays dead takes one cycle off, so brightness falls by
//! `1 / fade_out_cycles` per update until it reaches 0.

use crate::params::clamp_fade_cycles;

#[derive(Debug, Clone, PartialEq)]
pub struct FadeTracker {
    cycles: u32,
    remaining: Vec<u32>,
}

impl FadeTracker {
    /// Tracker for `len` cells, all dark. `cycles` is clamped to the valid range.
    pub fn new(len: usize, cycles: u32) -> Self {
        Self {
            cycles: clamp_fade_cycles(cycles),
            remaining: vec![0; len],
        }
    }

    /// Tracker whose active cells start at full brightness.
    pub fn from_cells(cells: &[bool], cycles: u32) -> Self {
        let mut tracker = Self::new(cells.len(), cycles);
        tracker.reset(cells);
        tracker
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn fade_out_cycles(&self) -> u32 {
        self.cycles
    }

    /// Brightness lost per update while a cell stays dead.
    pub fn decrement(&self) -> f64 {
        1.0 / self.cycles as f64
    }

    /// Changes the fade length. Counters above the new length are cut down to it.
    pub fn set_fade_out_cycles(&mut self, cycles: u32) {
        let cycles = clamp_fade_cycles(cycles);
        let old = self.cycles;
        self.cycles = cycles;
        for r in &mut self.remaining {
            // Cells at full brightness stay at full brightness.
            *r = if *r == old { cycles } else { (*r).min(cycles) };
        }
    }

    /// Brightness factor of cell `idx` in [0, 1].
    pub fn brightness(&self, idx: usize) -> f64 {
        self.remaining[idx] as f64 / self.cycles as f64
    }

    /// Records that the user just flipped cell `idx` to `alive`.
    ///
    /// Either way the cell is at full brightness; a cell switched off starts
    /// decaying on the next update.
    pub fn touch(&mut self, idx: usize) {
        self.remaining[idx] = self.cycles;
    }

    /// Advances one update given the generation before and after it.
    pub fn advance(&mut self, before: &[bool], after: &[bool]) {
        let full = self.cycles;
        for ((r, &was), &is) in self.remaining.iter_mut().zip(before).zip(after) {
            *r = match (was, is) {
                (_, true) => full,
                (true, false) => full,
                (false, false) => r.saturating_sub(1),
            };
        }
    }

    /// Discards all trails; active cells go to full brightness.
    pub fn reset(&mut self, cells: &[bool]) {
        self.remaining.resize(cells.len(), 0);
        let full = self.cycles;
        for (r, &alive) in self.remaining.iter_mut().zip(cells) {
            *r = if alive { full } else { 0 };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tracker_is_dark() {
        let t = FadeTracker::new(4, 5);
        assert!((0..4).all(|i| t.brightness(i) == 0.0));
        assert!((t.decrement() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn cycles_are_clamped() {
        assert_eq!(FadeTracker::new(1, 0).fade_out_cycles(), 1);
        assert_eq!(FadeTracker::new(1, 10_000).fade_out_cycles(), 100);
    }

    #[test]
    fn active_cell_is_full_brightness() {
        let mut t = FadeTracker::from_cells(&[true, false], 5);
        assert_eq!(t.brightness(0), 1.0);
        t.advance(&[true, false], &[true, false]);
        assert_eq!(t.brightness(0), 1.0);
        assert_eq!(t.brightness(1), 0.0);
    }

    #[test]
    fn dying_cell_decays_linearly_to_zero() {
        let mut t = FadeTracker::from_cells(&[true], 5);
        t.advance(&[true], &[false]);
        assert_eq!(t.brightness(0), 1.0);
        let expected = [0.8, 0.6, 0.4, 0.2, 0.0, 0.0, 0.0];
        for want in expected {
            t.advance(&[false], &[false]);
            assert!((t.brightness(0) - want).abs() < 1e-6);
        }
    }

    #[test]
    fn touch_restarts_decay() {
        let mut t = FadeTracker::new(1, 4);
        t.touch(0);
        assert_eq!(t.brightness(0), 1.0);
        t.advance(&[false], &[false]);
        assert!((t.brightness(0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn reborn_cell_resets_to_full() {
        let mut t = FadeTracker::from_cells(&[false], 5);
        t.touch(0);
        t.advance(&[false], &[false]);
        t.advance(&[false], &[true]);
        assert_eq!(t.brightness(0), 1.0);
    }

    #[test]
    fn shortening_fade_caps_counters() {
        let mut t = FadeTracker::from_cells(&[true, false], 10);
        t.advance(&[true, false], &[false, false]);
        t.advance(&[false, false], &[false, false]);
        t.set_fade_out_cycles(3);
        assert_eq!(t.brightness(0), 1.0);
        t.advance(&[false, false], &[false, false]);
        assert!((t.brightness(0) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn full_cells_stay_full_when_lengthening() {
        let mut t = FadeTracker::from_cells(&[true], 5);
        t.set_fade_out_cycles(8);
        assert_eq!(t.brightness(0), 1.0);
    }

    #[test]
    fn reset_resizes_to_new_grid() {
        let mut t = FadeTracker::new(2, 5);
        t.reset(&[true, false, true]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.brightness(2), 1.0);
    }
}
