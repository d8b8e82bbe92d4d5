#![deny(unsafe_code)]
//! Simulation registry: maps identifiers to engines, plus the frame driver
//! and PNG snapshots.
//!
//! This crate sits between `cellsim-core` (which defines the `Simulation`
//! trait) and the individual engine crates. The CLI and any other host
//! depend on this crate instead of on each engine directly.

pub mod driver;

#[cfg(feature = "png")]
pub mod snapshot;

use std::fmt;
use std::str::FromStr;

use cellsim_conway::Conway;
use cellsim_core::error::EngineError;
use cellsim_core::simulation::{SimState, Simulation};
use cellsim_core::surface::Surface;
use cellsim_gray_scott::GrayScott;
use cellsim_langton::Langton;
use cellsim_termite::Termites;
use serde::Serialize;
use serde_json::Value;

pub use driver::{FrameDriver, FrameReport, HeadlessRun};

/// The closed set of simulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    Conway,
    Langton,
    Termite,
    Reaction,
}

/// What a simulation exposes beyond the lifecycle contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Boolean cell grid with fade trails.
    pub grid_based: bool,
    /// Has walking actors reported in `SimState::actors`.
    pub actor_based: bool,
}

impl SimulationKind {
    pub const ALL: [SimulationKind; 4] = [
        SimulationKind::Conway,
        SimulationKind::Langton,
        SimulationKind::Termite,
        SimulationKind::Reaction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SimulationKind::Conway => "conway",
            SimulationKind::Langton => "langton",
            SimulationKind::Termite => "termite",
            SimulationKind::Reaction => "reaction",
        }
    }

    /// Parses an external identifier.
    ///
    /// Returns `EngineError::UnknownSimulation` if the name is not recognised.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| EngineError::UnknownSimulation(name.to_string()))
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            SimulationKind::Conway => Capabilities {
                grid_based: true,
                actor_based: false,
            },
            SimulationKind::Langton | SimulationKind::Termite => Capabilities {
                grid_based: true,
                actor_based: true,
            },
            SimulationKind::Reaction => Capabilities {
                grid_based: false,
                actor_based: false,
            },
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SimulationKind::Conway => "Conway's Game of Life (B3/S23) with fading trails",
            SimulationKind::Langton => "Langton's Ant on a bounded grid",
            SimulationKind::Termite => "Termites gathering wood chips into piles",
            SimulationKind::Reaction => "Gray-Scott reaction-diffusion",
        }
    }

    /// Builds the engine for this kind.
    pub fn create(
        self,
        surface: &dyn Surface,
        params: &Value,
        seed: u64,
    ) -> Result<AnySimulation, EngineError> {
        let sim = match self {
            SimulationKind::Conway => {
                AnySimulation::Conway(Conway::from_json(surface, params, seed)?)
            }
            SimulationKind::Langton => {
                AnySimulation::Langton(Langton::from_json(surface, params, seed)?)
            }
            SimulationKind::Termite => {
                AnySimulation::Termite(Termites::from_json(surface, params, seed)?)
            }
            SimulationKind::Reaction => {
                AnySimulation::Reaction(GrayScott::from_json(surface, params, seed)?)
            }
        };
        Ok(sim)
    }
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimulationKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// One row of the registry, as printed by `cellsim list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub kind: SimulationKind,
    pub capabilities: Capabilities,
    pub description: &'static str,
}

/// Identifier → engine factory table, built once by the host.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    /// Registry holding every built-in simulation.
    pub fn standard() -> Self {
        let entries = SimulationKind::ALL
            .into_iter()
            .map(|kind| RegistryEntry {
                kind,
                capabilities: kind.capabilities(),
                description: kind.description(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.kind.name() == id)
    }

    /// Constructs the simulation registered under `id`.
    ///
    /// Returns `EngineError::UnknownSimulation` if nothing is registered
    /// under `id`, or the engine's own construction error.
    pub fn create(
        &self,
        id: &str,
        surface: &dyn Surface,
        params: &Value,
        seed: u64,
    ) -> Result<AnySimulation, EngineError> {
        let entry = self
            .get(id)
            .ok_or_else(|| EngineError::UnknownSimulation(id.to_string()))?;
        let sim = entry.kind.create(surface, params, seed)?;
        tracing::debug!(simulation = id, seed, "simulation created");
        Ok(sim)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Any built-in simulation; delegates the `Simulation` trait to its variant.
pub enum AnySimulation {
    Conway(Conway),
    Langton(Langton),
    Termite(Termites),
    Reaction(GrayScott),
}

impl AnySimulation {
    pub fn kind(&self) -> SimulationKind {
        match self {
            AnySimulation::Conway(_) => SimulationKind::Conway,
            AnySimulation::Langton(_) => SimulationKind::Langton,
            AnySimulation::Termite(_) => SimulationKind::Termite,
            AnySimulation::Reaction(_) => SimulationKind::Reaction,
        }
    }
}

macro_rules! delegate {
    ($self:ident, $sim:ident => $call:expr) => {
        match $self {
            AnySimulation::Conway($sim) => $call,
            AnySimulation::Langton($sim) => $call,
            AnySimulation::Termite($sim) => $call,
            AnySimulation::Reaction($sim) => $call,
        }
    };
}

impl Simulation for AnySimulation {
    fn name(&self) -> &'static str {
        delegate!(self, s => s.name())
    }

    fn init(&mut self) -> Result<(), EngineError> {
        delegate!(self, s => s.init())
    }

    fn update(&mut self) -> Result<(), EngineError> {
        delegate!(self, s => s.update())
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        delegate!(self, s => s.draw(surface))
    }

    fn toggle_cell(&mut self, px: f64, py: f64) {
        delegate!(self, s => s.toggle_cell(px, py))
    }

    fn randomize(&mut self, coverage: f64) {
        delegate!(self, s => s.randomize(coverage))
    }

    fn state(&self) -> SimState {
        delegate!(self, s => s.state())
    }

    fn resize_preserve_state(&mut self, surface: &dyn Surface) -> Result<(), EngineError> {
        delegate!(self, s => s.resize_preserve_state(surface))
    }

    fn speed(&self) -> u32 {
        delegate!(self, s => s.speed())
    }

    fn set_speed(&mut self, speed: u32) {
        delegate!(self, s => s.set_speed(speed))
    }

    fn set_fade_out_cycles(&mut self, cycles: u32) {
        delegate!(self, s => s.set_fade_out_cycles(cycles))
    }

    fn set_param(&mut self, name: &str, value: f64) -> Result<(), EngineError> {
        delegate!(self, s => s.set_param(name, value))
    }

    fn params(&self) -> Value {
        delegate!(self, s => s.params())
    }

    fn param_schema(&self) -> Value {
        delegate!(self, s => s.param_schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellsim_core::surface::RgbaSurface;
    use serde_json::json;

    fn surface() -> RgbaSurface {
        RgbaSurface::new(200, 120).unwrap()
    }

    fn create(id: &str) -> Result<AnySimulation, EngineError> {
        Registry::standard().create(id, &surface(), &json!({}), 42)
    }

    #[test]
    fn each_identifier_yields_its_own_variant() {
        assert!(matches!(create("conway"), Ok(AnySimulation::Conway(_))));
        assert!(matches!(create("langton"), Ok(AnySimulation::Langton(_))));
        assert!(matches!(create("termite"), Ok(AnySimulation::Termite(_))));
        assert!(matches!(create("reaction"), Ok(AnySimulation::Reaction(_))));
    }

    #[test]
    fn unknown_identifier_is_reported() {
        let err = create("wireworld").err().unwrap();
        assert!(matches!(&err, EngineError::UnknownSimulation(id) if id == "wireworld"));
        assert_eq!(err.to_string(), "unknown simulation type: wireworld");
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in SimulationKind::ALL {
            assert_eq!(kind.name().parse::<SimulationKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert!("Conway".parse::<SimulationKind>().is_err());
    }

    #[test]
    fn created_simulation_reports_matching_name_and_kind() {
        for kind in SimulationKind::ALL {
            let sim = create(kind.name()).unwrap();
            assert_eq!(sim.name(), kind.name());
            assert_eq!(sim.kind(), kind);
        }
    }

    #[test]
    fn capabilities_match_state() {
        for kind in SimulationKind::ALL {
            let sim = create(kind.name()).unwrap();
            let state = sim.state();
            let caps = kind.capabilities();
            assert_eq!(caps.actor_based, !state.actors.is_empty(), "{kind}");
            assert_eq!(caps.grid_based, state.fade_out_cycles.is_some(), "{kind}");
        }
    }

    #[test]
    fn registry_lists_every_kind_once() {
        let registry = Registry::standard();
        assert_eq!(registry.entries().len(), 4);
        for kind in SimulationKind::ALL {
            assert_eq!(registry.get(kind.name()).unwrap().kind, kind);
        }
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn registry_entry_serializes() {
        let entry = Registry::standard().get("langton").copied().unwrap();
        let v = serde_json::to_value(entry).unwrap();
        assert_eq!(v["kind"], "langton");
        assert_eq!(v["capabilities"]["actor_based"], true);
    }

    #[test]
    fn invalid_surface_propagates() {
        struct Collapsed;
        impl Surface for Collapsed {
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
                _: cellsim_core::color::Srgb,
            ) {
            }
        }
        for kind in SimulationKind::ALL {
            let result = Registry::standard().create(kind.name(), &Collapsed, &json!({}), 1);
            assert!(
                matches!(result, Err(EngineError::InvalidSurface { .. })),
                "{kind}"
            );
        }
    }

    #[test]
    fn delegation_covers_lifecycle() {
        for kind in SimulationKind::ALL {
            let mut sim = create(kind.name()).unwrap();
            sim.update().unwrap();
            assert_eq!(sim.state().generation, 1);
            sim.set_speed(10_000);
            assert_eq!(sim.speed(), 60);
            sim.set_fade_out_cycles(3);
            sim.randomize(0.25);
            sim.toggle_cell(15.0, 15.0);
            let mut s = surface();
            sim.draw(&mut s).unwrap();
            sim.resize_preserve_state(&RgbaSurface::new(100, 100).unwrap())
                .unwrap();
            assert_eq!(sim.state().generation, 1);
            sim.init().unwrap();
            assert_eq!(sim.state().generation, 0);
            assert!(sim.params().is_object());
            assert!(sim.param_schema().is_object());
            assert!(matches!(
                sim.set_param("no_such_param", 1.0),
                Err(EngineError::ParamNotFound(_))
            ));
        }
    }

    #[test]
    fn reaction_params_through_registry() {
        let mut sim = Registry::standard()
            .create("reaction", &surface(), &json!({"feed": 0.03}), 1)
            .unwrap();
        assert!((sim.params()["feed"].as_f64().unwrap() - 0.03).abs() < 1e-12);
        sim.set_param("kill", 0.07).unwrap();
        assert!((sim.params()["kill"].as_f64().unwrap() - 0.07).abs() < 1e-6);
    }

    #[test]
    fn colors_through_registry() {
        let registry = Registry::standard();
        let params = json!({"colors": {"trail": "#102030"}});
        for name in ["conway", "langton", "termite"] {
            let sim = registry.create(name, &surface(), &params, 1).unwrap();
            assert_eq!(sim.params()["colors"]["trail"], "#102030");
        }
        let bad = json!({"colors": {"alive": 3}});
        assert!(matches!(
            registry.create("termite", &surface(), &bad, 1),
            Err(EngineError::InvalidColor(_))
        ));
    }

    #[test]
    fn object_safety() {
        let sim = create("conway").unwrap();
        let boxed: Box<dyn Simulation> = Box::new(sim);
        assert_eq!(boxed.name(), "conway");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn same_seed_same_state(kind_idx in 0_usize..4, seed: u64, steps in 0_usize..20) {
                let kind = SimulationKind::ALL[kind_idx];
                let mut a = kind.create(&surface(), &json!({}), seed).unwrap();
                let mut b = kind.create(&surface(), &json!({}), seed).unwrap();
                for _ in 0..steps {
                    a.update().unwrap();
                    b.update().unwrap();
                }
                prop_assert_eq!(a.state(), b.state());
            }
        }
    }
}
