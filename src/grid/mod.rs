//! # Tile Grid Module
//!
//! The 2D tile storage the rest of the engine operates on, plus the small
//! geometric types (positions, rectangles) shared by the planner and the
//! element graph.
//!
//! A grid cell holds a single tile id scoped to exactly one of two tileset
//! references: the wall set or the floor set. Which set a cell belongs to
//! is authored by the carve pipeline; autotiling only ever rewrites ids of
//! cells that are already wall-identified and never flips the tileset.

use serde::{Deserialize, Serialize};

/// Which of the level's two tileset references a cell's tile id is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileSet {
    /// The wall tileset reference
    Wall,
    /// The floor tileset reference
    Floor,
}

/// A single grid cell: one tile id, one owning tileset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Tile index within the owning tileset's atlas
    pub tile_id: u32,
    /// Tileset the id resolves against at draw time
    pub tileset: TileSet,
}

/// A position in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in grid coordinates.
///
/// Used for both rooms and corridor segments. The origin may be negative
/// while a rectangle is being padded for intersection tests; carving clamps
/// to grid bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl GridRect {
    /// Creates a new rectangle from its top-left corner and extent.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Center position, rounded toward the top-left.
    pub fn center(&self) -> Position {
        Position::new(
            self.x + self.width as i32 / 2,
            self.y + self.height as i32 / 2,
        )
    }

    /// Checks whether a position lies inside this rectangle.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x && pos.y >= self.y && pos.x < self.right() && pos.y < self.bottom()
    }

    /// Checks whether this rectangle and another share any cell.
    pub fn intersects(&self, other: &GridRect) -> bool {
        !(self.x >= other.right()
            || other.x >= self.right()
            || self.y >= other.bottom()
            || other.y >= self.bottom())
    }

    /// Returns this rectangle expanded by `margin` cells on every side.
    ///
    /// Padded bounds are what the planner tests for intersection, which is
    /// how a minimum wall thickness between accepted rooms is enforced.
    pub fn padded(&self, margin: u32) -> GridRect {
        GridRect::new(
            self.x - margin as i32,
            self.y - margin as i32,
            self.width + margin * 2,
            self.height + margin * 2,
        )
    }

    /// Iterates every position covered by this rectangle.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let (x, y) = (self.x, self.y);
        let (right, bottom) = (self.right(), self.bottom());
        (y..bottom).flat_map(move |py| (x..right).map(move |px| Position::new(px, py)))
    }
}

/// The level's tile storage: a `columns x rows` matrix of [`Cell`]s.
///
/// Row-major. The rendering consumer reads tile ids and tileset membership
/// through [`TileGrid::get`] and [`TileGrid::cells`]; only this subsystem
/// writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl TileGrid {
    /// Creates a grid with every cell set to `wall_id` in the wall tileset.
    pub fn filled_with_wall(columns: u32, rows: u32, wall_id: u32) -> Self {
        Self {
            columns,
            rows,
            cells: vec![
                Cell {
                    tile_id: wall_id,
                    tileset: TileSet::Wall,
                };
                (columns * rows) as usize
            ],
        }
    }

    /// Grid width in cells.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Grid height in cells.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Checks whether a column/row pair lies inside the grid.
    pub fn in_bounds(&self, column: i32, row: i32) -> bool {
        column >= 0 && row >= 0 && (column as u32) < self.columns && (row as u32) < self.rows
    }

    fn index(&self, column: i32, row: i32) -> Option<usize> {
        if self.in_bounds(column, row) {
            Some((row as u32 * self.columns + column as u32) as usize)
        } else {
            None
        }
    }

    /// Returns the cell at the given coordinates, or `None` out of bounds.
    pub fn get(&self, column: i32, row: i32) -> Option<&Cell> {
        self.index(column, row).map(|i| &self.cells[i])
    }

    /// Writes a tile id and its owning tileset. Out-of-bounds writes are
    /// ignored, which is what makes corridor carving idempotent at the map
    /// edge.
    pub fn set_tile(&mut self, column: i32, row: i32, tile_id: u32, tileset: TileSet) {
        if let Some(i) = self.index(column, row) {
            self.cells[i] = Cell { tile_id, tileset };
        }
    }

    /// Resets every cell to `wall_id` in the wall tileset.
    pub fn fill_with_wall(&mut self, wall_id: u32) {
        for cell in &mut self.cells {
            *cell = Cell {
                tile_id: wall_id,
                tileset: TileSet::Wall,
            };
        }
    }

    /// Read-only view of all cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Snapshot of every cell's tile id, row-major.
    ///
    /// Autotiling computes neighbor masks against this snapshot rather than
    /// the live grid, so results never depend on scan order.
    pub fn snapshot_tile_ids(&self) -> Vec<u32> {
        self.cells.iter().map(|c| c.tile_id).collect()
    }
}
