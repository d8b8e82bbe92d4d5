//! Reproducible description of a headless run.
//!
//! A [`Scenario`] names the simulation, the surface size, parameter
//! overrides, the PRNG seed and how many updates to run. The same scenario
//! replayed by the same binary produces the same final grid.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub simulation: String,
    /// Surface width in pixels.
    pub width: usize,
    /// Surface height in pixels.
    pub height: usize,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub steps: usize,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Scenario {
    /// Scenario with no parameter overrides and zero steps.
    pub fn new(simulation: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            simulation: simulation.to_string(),
            width,
            height,
            params: empty_params(),
            seed,
            steps: 0,
        }
    }

    /// Checks for a drawable, non-overflowing surface size.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(())
    }
}
