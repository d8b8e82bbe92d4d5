#![deny(unsafe_code)]
//! Core types and traits for cellsim.
//!
//! Provides the `Simulation` lifecycle trait, the double-buffered `CellGrid`,
//! `FadeTracker` trails, the shared `Board`, walking `Actor`s, the scalar
//! `Field`, the `Surface` drawing contract, colours, the `Xorshift64` PRNG,
//! parameter helpers and the `Scenario` run description.

pub mod actor;
pub mod board;
pub mod color;
pub mod error;
pub mod fade;
pub mod field;
pub mod grid;
pub mod palette;
pub mod params;
pub mod prng;
pub mod scenario;
pub mod simulation;
pub mod surface;

pub use actor::{Actor, ActorView, Heading};
pub use board::Board;
pub use color::Srgb;
pub use error::EngineError;
pub use fade::FadeTracker;
pub use field::Field;
pub use grid::{count_live, count_neighbours, screen_to_grid, CellGrid, GridDims};
pub use palette::{CellColors, Palette};
pub use prng::Xorshift64;
pub use scenario::Scenario;
pub use simulation::{SimState, Simulation};
pub use surface::{RgbaSurface, Surface};
