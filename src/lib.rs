//! # Warren
//!
//! A procedural dungeon generation and autotile mapping engine.
//!
//! ## Architecture Overview
//!
//! Warren turns a seeded random-number stream into a connected, grid-based
//! level and dresses it for rendering. The subsystem is built from a few
//! cooperating pieces:
//!
//! - **Tile Grid**: a 2D array of tile ids, each cell scoped to one of two
//!   tileset references (wall or floor)
//! - **Autotile Mapper**: neighbor-bitmask driven tile selection so wall
//!   runs join seamlessly, loaded from a declarative pattern table
//! - **Room/Corridor Planner**: rejection-sampled room packing connected
//!   by L-shaped corridors
//! - **Dungeon Element Graph**: switches, doors, traps, puzzles,
//!   encounters and loot wired together by an activator → target table
//! - **Dungeon Manager**: facade that owns the level, drives per-frame
//!   updates, and hydrates levels from declarative JSON documents
//!
//! Rendering, input, and AI are external collaborators: the engine exposes
//! read-only grid access and typed element lookups and nothing more.

pub mod autotile;
pub mod elements;
pub mod generation;
pub mod grid;

pub use autotile::{AutotileMapper, PatternTable, CARDINAL_MASK};
pub use elements::{
    Door, DungeonElement, DungeonManager, ElementKind, ElementRegistry, Encounter, Loot, Puzzle,
    PuzzleKind, Switch, Trap, TrapKind, WiringEdge,
};
pub use generation::{Corridor, DungeonPlanner, PlannerConfig, Room};
pub use grid::{Cell, GridRect, Position, TileGrid, TileSet};

/// Core error type for the Warren engine.
#[derive(thiserror::Error, Debug)]
pub enum WarrenError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The autotile mapper was queried before being initialized
    #[error("Autotile mapper not initialized")]
    NotInitialized,

    /// A declarative document is structurally invalid
    #[error("Load failed: {0}")]
    LoadFailed(String),

    /// Generation broke an internal invariant
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Warren codebase.
pub type WarrenResult<T> = Result<T, WarrenError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_DUNGEON_COLUMNS: u32 = 80;

    /// Default dungeon height in tiles
    pub const DEFAULT_DUNGEON_ROWS: u32 = 40;

    /// Tile edge length in pixels, used for pixel-space spawn coordinates
    pub const TILE_SIZE: f32 = 32.0;

    /// Tile id the planner fills the grid with before carving
    pub const RAW_WALL_TILE: u32 = 0;

    /// Default tile ids for procedurally placed switches
    pub const SWITCH_INACTIVE_TILE: u32 = 200;

    /// Tile shown once a procedurally placed switch has been thrown
    pub const SWITCH_ACTIVE_TILE: u32 = 201;

    /// Default tile id for a locked procedurally placed door
    pub const DOOR_LOCKED_TILE: u32 = 210;

    /// Default tile id for an unlocked procedurally placed door
    pub const DOOR_UNLOCKED_TILE: u32 = 211;
}
