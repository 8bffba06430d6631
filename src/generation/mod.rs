//! # Generation Module
//!
//! Procedural room-and-corridor planning: rejection-sampled room packing,
//! L-shaped corridor connections, and the carve pipeline that writes both
//! into the tile grid.
//!
//! The planner is deliberately forgiving. Placement that runs out of its
//! attempt budget falls back to a single guaranteed room; carving is
//! idempotent and never fails on overlap. Randomness failures degrade
//! gracefully, they never abort generation.

pub mod planner;

pub use planner::DungeonPlanner;

use crate::grid::GridRect;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for dungeon planning.
///
/// Controls room sizing, spacing and the placement attempt budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Minimum room edge length (inclusive)
    pub min_room_size: u32,
    /// Maximum room edge length (inclusive)
    pub max_room_size: u32,
    /// Accepted-room cap; placement stops early once reached
    pub max_rooms: u32,
    /// Total placement attempts before giving up
    pub placement_attempts: u32,
    /// Margin added around each room when testing for overlap, which
    /// enforces a minimum wall thickness between neighbors
    pub room_padding: u32,
    /// Minimum distance between a room and the map edge
    pub border_margin: u32,
    /// Corridor width in cells
    pub corridor_width: u32,
}

impl PlannerConfig {
    /// Creates the default planning configuration.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            min_room_size: 4,
            max_room_size: 10,
            max_rooms: 8,
            placement_attempts: 50,
            room_padding: 2,
            border_margin: 2,
            corridor_width: 3,
        }
    }

    /// Creates a configuration for testing with smaller, simpler layouts.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            min_room_size: 3,
            max_room_size: 5,
            max_rooms: 4,
            placement_attempts: 50,
            room_padding: 2,
            border_margin: 2,
            corridor_width: 3,
        }
    }

    /// Creates a seeded random number generator from this configuration.
    pub fn create_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// A planned room: an axis-aligned rectangle of floor space.
///
/// Geometry is immutable once the room is accepted; rooms are retained for
/// spawn-point and element-placement queries after generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique identifier within one planning run
    pub id: u32,
    /// Floor-space rectangle in grid coordinates
    pub bounds: GridRect,
    /// Ids of rooms this one has a corridor to
    pub connections: Vec<u32>,
}

impl Room {
    /// Creates a new unconnected room.
    pub fn new(id: u32, bounds: GridRect) -> Self {
        Self {
            id,
            bounds,
            connections: Vec::new(),
        }
    }

    /// Records a corridor connection to another room.
    pub fn add_connection(&mut self, room_id: u32) {
        if !self.connections.contains(&room_id) {
            self.connections.push(room_id);
        }
    }
}

/// One corridor segment: a single axis-aligned rectangle.
///
/// An L-shaped connection contributes two segments; segments may overlap
/// rooms and each other freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corridor {
    /// Covered rectangle in grid coordinates
    pub bounds: GridRect,
}

impl Corridor {
    /// Creates a corridor segment.
    pub fn new(bounds: GridRect) -> Self {
        Self { bounds }
    }
}
