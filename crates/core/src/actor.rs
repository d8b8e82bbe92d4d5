//! Discrete agents that walk the grid: headings, movement and trails.

use std::collections::VecDeque;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::grid::GridDims;
use crate::params::TRAIL_LENGTH_MAX;
use crate::prng::Xorshift64;

/// Orthogonal heading. Discriminants match the `0=up, 1=right, 2=down, 3=left`
/// numbering used in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heading {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    /// Heading for `index mod 4`.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Clockwise quarter turn.
    pub fn turn_right(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Counter-clockwise quarter turn.
    pub fn turn_left(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Uniformly random heading.
    pub fn random(rng: &mut Xorshift64) -> Self {
        Self::from_index(rng.next_usize(4))
    }

    /// Unit step as `(dx, dy)` = `(col, row)` delta. Up decreases the row.
    pub fn offset(self) -> IVec2 {
        match self {
            Heading::Up => IVec2::new(0, -1),
            Heading::Right => IVec2::new(1, 0),
            Heading::Down => IVec2::new(0, 1),
            Heading::Left => IVec2::new(-1, 0),
        }
    }
}

/// An ant or termite.
///
/// Position is stored as `IVec2 { x: col, y: row }`. The trail is for
/// rendering only; no rule reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pos: IVec2,
    pub heading: Heading,
    pub carrying: bool,
    trail: VecDeque<IVec2>,
    trail_len: usize,
}

impl Actor {
    /// `trail_len` is capped at [`TRAIL_LENGTH_MAX`].
    pub fn new(row: usize, col: usize, heading: Heading, trail_len: usize) -> Self {
        let trail_len = trail_len.min(TRAIL_LENGTH_MAX);
        Self {
            pos: IVec2::new(col as i32, row as i32),
            heading,
            carrying: false,
            trail: VecDeque::with_capacity(trail_len),
            trail_len,
        }
    }

    /// Actor at a uniformly random cell with a random heading.
    pub fn scattered(dims: GridDims, trail_len: usize, rng: &mut Xorshift64) -> Self {
        let row = rng.next_usize(dims.rows);
        let col = rng.next_usize(dims.cols);
        Self::new(row, col, Heading::random(rng), trail_len)
    }

    pub fn row(&self) -> usize {
        self.pos.y as usize
    }

    pub fn col(&self) -> usize {
        self.pos.x as usize
    }

    /// Most recent positions as `(row, col)`, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.trail.iter().map(|p| (p.y as usize, p.x as usize))
    }

    /// Moves `distance` cells along the heading, stopping at the grid edge.
    ///
    /// The departed cell is pushed onto the trail.
    pub fn advance(&mut self, distance: usize, dims: GridDims) {
        if self.trail_len > 0 {
            if self.trail.len() == self.trail_len {
                self.trail.pop_front();
            }
            self.trail.push_back(self.pos);
        }
        let step = self.heading.offset() * distance.min(i32::MAX as usize) as i32;
        self.pos = clamp_to(self.pos.saturating_add(step), dims);
    }

    /// Pulls the actor (and its trail) inside `dims` after a resize.
    pub fn clamp_into(&mut self, dims: GridDims) {
        self.pos = clamp_to(self.pos, dims);
        self.trail.retain(|p| (p.x as usize) < dims.cols && (p.y as usize) < dims.rows);
    }

    /// Changes the trail capacity, dropping the oldest entries if needed.
    pub fn set_trail_len(&mut self, trail_len: usize) {
        let trail_len = trail_len.min(TRAIL_LENGTH_MAX);
        self.trail_len = trail_len;
        while self.trail.len() > trail_len {
            self.trail.pop_front();
        }
    }

    pub fn view(&self) -> ActorView {
        ActorView {
            row: self.row(),
            col: self.col(),
            heading: self.heading,
            carrying: self.carrying,
        }
    }
}

fn clamp_to(pos: IVec2, dims: GridDims) -> IVec2 {
    let max = IVec2::new(
        dims.cols.min(i32::MAX as usize) as i32 - 1,
        dims.rows.min(i32::MAX as usize) as i32 - 1,
    );
    pos.clamp(IVec2::ZERO, max)
}

/// Serializable snapshot of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorView {
    pub row: usize,
    pub col: usize,
    pub heading: Heading,
    pub carrying: bool,
}
