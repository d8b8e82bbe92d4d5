//! Never-failing extraction of tunables from a `serde_json::Value` params object,
//! plus the clamping bounds shared by every simulation.
//!
//! A missing key or a value of the wrong JSON type falls back to the default.
//! Out-of-range values are clamped by the caller, never rejected.

use serde_json::Value;

/// Slowest accepted simulation speed, in ticks per second.
pub const SPEED_MIN: u32 = 1;
/// Fastest accepted simulation speed, in ticks per second.
pub const SPEED_MAX: u32 = 60;
/// Speed a freshly constructed simulation runs at.
pub const SPEED_DEFAULT: u32 = 30;

/// Fewest updates a deactivated cell may take to fade out.
pub const FADE_CYCLES_MIN: u32 = 1;
/// Most updates a deactivated cell may take to fade out.
pub const FADE_CYCLES_MAX: u32 = 100;
/// Default fade length; gives a per-update decrement of 0.2.
pub const FADE_CYCLES_DEFAULT: u32 = 5;

/// Default cell edge in pixels for boolean grids.
pub const CELL_SIZE_DEFAULT: usize = 10;
/// Default fraction of live cells produced by `randomize`.
pub const COVERAGE_DEFAULT: f64 = 0.3;
/// Upper bound on positions kept in an actor's trail.
pub const TRAIL_LENGTH_MAX: usize = 4096;

/// Extracts an `f64` from `params[name]`; integers are accepted and widened.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a non-negative integer from `params[name]` as `usize`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Extracts a non-negative integer from `params[name]` as `u32`, saturating.
pub fn param_u32(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v.min(u32::MAX as u64) as u32)
        .unwrap_or(default)
}

/// Clamps a requested speed into `[SPEED_MIN, SPEED_MAX]`.
pub fn clamp_speed(value: u32) -> u32 {
    value.clamp(SPEED_MIN, SPEED_MAX)
}

/// Clamps a requested fade length into `[FADE_CYCLES_MIN, FADE_CYCLES_MAX]`.
pub fn clamp_fade_cycles(value: u32) -> u32 {
    value.clamp(FADE_CYCLES_MIN, FADE_CYCLES_MAX)
}

/// Clamps a probability into [0, 1]. NaN becomes 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Cell size of at least one pixel.
pub fn clamp_cell_size(value: usize) -> usize {
    value.max(1)
}
