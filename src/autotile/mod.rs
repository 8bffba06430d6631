//! # Autotile Module
//!
//! Neighbor-aware tile selection: given which of a wall cell's neighbors
//! are also walls, pick the tile graphic that joins the run seamlessly.
//!
//! The full 8-bit neighbor mask (N, NE, E, SE, S, SW, W, NW in bits 0..7)
//! is reduced to its 4 cardinal bits before lookup, so the pattern table
//! only needs the 16 representative cardinal combinations. Out-of-bounds
//! neighbors count as walls, which keeps map edges rendering as enclosed.

pub mod table;

pub use table::{PatternTable, PatternTableDoc, TileEntry, ATLAS_ROWS, DEFAULT_ATLAS_COLUMNS};

use crate::{TileGrid, TileSet, WarrenError, WarrenResult};
use log::debug;
use std::io::Read;

/// Neighbor mask bit: cell directly above.
pub const NORTH: u8 = 1;
/// Neighbor mask bit: upper-right diagonal.
pub const NORTH_EAST: u8 = 2;
/// Neighbor mask bit: cell to the right.
pub const EAST: u8 = 4;
/// Neighbor mask bit: lower-right diagonal.
pub const SOUTH_EAST: u8 = 8;
/// Neighbor mask bit: cell directly below.
pub const SOUTH: u8 = 16;
/// Neighbor mask bit: lower-left diagonal.
pub const SOUTH_WEST: u8 = 32;
/// Neighbor mask bit: cell to the left.
pub const WEST: u8 = 64;
/// Neighbor mask bit: upper-left diagonal.
pub const NORTH_WEST: u8 = 128;

/// The 4 cardinal bits used for final tile selection.
pub const CARDINAL_MASK: u8 = NORTH | EAST | SOUTH | WEST;

/// Neighbor offsets in bit order, `(dx, dy, bit)`.
const NEIGHBOR_OFFSETS: [(i32, i32, u8); 8] = [
    (0, -1, NORTH),
    (1, -1, NORTH_EAST),
    (1, 0, EAST),
    (1, 1, SOUTH_EAST),
    (0, 1, SOUTH),
    (-1, 1, SOUTH_WEST),
    (-1, 0, WEST),
    (-1, -1, NORTH_WEST),
];

/// Tile lookup service backed by a [`PatternTable`].
///
/// The mapper follows a one-time initialization contract: construct it
/// uninitialized, install a table exactly once via [`initialize`] or
/// [`initialize_fallback`], then query. Any query before initialization
/// fails with [`WarrenError::NotInitialized`]; installing a second table
/// is rejected.
///
/// [`initialize`]: AutotileMapper::initialize
/// [`initialize_fallback`]: AutotileMapper::initialize_fallback
#[derive(Debug, Default)]
pub struct AutotileMapper {
    table: Option<PatternTable>,
}

impl AutotileMapper {
    /// Creates an uninitialized mapper.
    pub fn new() -> Self {
        Self { table: None }
    }

    /// Installs a resolved pattern table.
    pub fn initialize(&mut self, table: PatternTable) -> WarrenResult<()> {
        if self.table.is_some() {
            return Err(WarrenError::LoadFailed(
                "autotile mapper already initialized".to_string(),
            ));
        }
        debug!(
            "autotile mapper initialized ({} floor variants, atlas width {})",
            table.floor_indices().len(),
            table.atlas_columns()
        );
        self.table = Some(table);
        Ok(())
    }

    /// Parses a pattern table document from a JSON reader and installs it.
    pub fn initialize_from_reader(&mut self, reader: impl Read) -> WarrenResult<()> {
        let table = PatternTable::from_reader(reader)?;
        self.initialize(table)
    }

    /// Installs the built-in fallback table, for when no external pattern
    /// source is available.
    pub fn initialize_fallback(&mut self) -> WarrenResult<()> {
        self.initialize(PatternTable::fallback())
    }

    /// Whether a table has been installed.
    pub fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    fn table(&self) -> WarrenResult<&PatternTable> {
        self.table.as_ref().ok_or(WarrenError::NotInitialized)
    }

    /// Whether the tile id belongs to the wall-index set.
    pub fn is_wall_tile(&self, tile_id: u32) -> WarrenResult<bool> {
        Ok(self.table()?.is_wall_index(tile_id))
    }

    /// Whether the tile id carries a `floor_`-prefixed symbolic name.
    pub fn is_floor_tile(&self, tile_id: u32) -> WarrenResult<bool> {
        Ok(self.table()?.is_floor_index(tile_id))
    }

    /// Symbolic wall tile lookup; absent names silently resolve to the
    /// "isolated" tile at index 0.
    pub fn wall_tile_index(&self, name: &str) -> WarrenResult<u32> {
        Ok(self.table()?.index_for_name(name))
    }

    /// All floor tile indices, sorted ascending.
    pub fn floor_tile_ids(&self) -> WarrenResult<Vec<u32>> {
        Ok(self.table()?.floor_indices())
    }

    /// Tile index for an 8-bit neighbor mask, reduced to its cardinal bits.
    pub fn tile_for_pattern(&self, mask: u8) -> WarrenResult<u32> {
        Ok(self.table()?.index_for_pattern(mask))
    }

    /// Rewrites every wall cell's tile id according to its neighbor pattern.
    ///
    /// The pass works off a snapshot of the grid taken before any write: a
    /// cell's mask is always computed from the original neighbor identity,
    /// never from ids already rewritten earlier in the same pass. A naive
    /// in-place rewrite would make results depend on scan order.
    ///
    /// A cell participates when its snapshot id equals `original_wall_id`
    /// or is already wall-classified; out-of-bounds neighbors count as
    /// walls so map edges render as enclosed.
    pub fn apply_autotiling(&self, grid: &mut TileGrid, original_wall_id: u32) -> WarrenResult<()> {
        let table = self.table()?;
        let snapshot = grid.snapshot_tile_ids();
        let columns = grid.columns() as i32;
        let rows = grid.rows() as i32;

        let is_wall_at = |column: i32, row: i32| -> bool {
            if column < 0 || row < 0 || column >= columns || row >= rows {
                return true;
            }
            let id = snapshot[(row * columns + column) as usize];
            id == original_wall_id || table.is_wall_index(id)
        };

        let mut rewritten = 0usize;
        for row in 0..rows {
            for column in 0..columns {
                let id = snapshot[(row * columns + column) as usize];
                let wall_authored = grid
                    .get(column, row)
                    .map(|cell| cell.tileset == TileSet::Wall)
                    .unwrap_or(false);
                if !wall_authored || (id != original_wall_id && !table.is_wall_index(id)) {
                    continue;
                }

                let mut mask = 0u8;
                for (dx, dy, bit) in NEIGHBOR_OFFSETS {
                    if is_wall_at(column + dx, row + dy) {
                        mask |= bit;
                    }
                }

                grid.set_tile(column, row, table.index_for_pattern(mask), TileSet::Wall);
                rewritten += 1;
            }
        }
        debug!("autotiling rewrote {rewritten} wall cells");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized_mapper() -> AutotileMapper {
        let mut mapper = AutotileMapper::new();
        mapper.initialize_fallback().unwrap();
        mapper
    }

    #[test]
    fn test_queries_before_initialization_fail() {
        let mapper = AutotileMapper::new();
        assert!(matches!(
            mapper.is_wall_tile(0),
            Err(WarrenError::NotInitialized)
        ));
        assert!(matches!(
            mapper.wall_tile_index("isolated"),
            Err(WarrenError::NotInitialized)
        ));
        assert!(matches!(
            mapper.tile_for_pattern(0),
            Err(WarrenError::NotInitialized)
        ));

        let mut grid = TileGrid::filled_with_wall(3, 3, 0);
        assert!(matches!(
            mapper.apply_autotiling(&mut grid, 0),
            Err(WarrenError::NotInitialized)
        ));
    }

    #[test]
    fn test_double_initialization_rejected() {
        let mut mapper = initialized_mapper();
        assert!(mapper.initialize_fallback().is_err());
    }

    #[test]
    fn test_cardinal_reduction() {
        let mapper = initialized_mapper();
        // Diagonal bits never change the selected tile.
        let with_diagonals = NORTH | NORTH_EAST | SOUTH_EAST | SOUTH;
        assert_eq!(
            mapper.tile_for_pattern(with_diagonals).unwrap(),
            mapper.tile_for_pattern(NORTH | SOUTH).unwrap()
        );
    }

    /// Builds a 5x5 grid whose center 3x3 block is authored from a glyph
    /// fixture (`#` wall, `.` floor), with a floor ring outside so the
    /// center cell's neighborhood is exactly the fixture.
    fn grid_from_fixture(rows3: [&str; 3]) -> TileGrid {
        let mut grid = TileGrid::filled_with_wall(5, 5, 0);
        for cell in 0..25 {
            grid.set_tile(cell % 5, cell / 5, 16, TileSet::Floor);
        }
        for (dy, line) in rows3.iter().enumerate() {
            for (dx, glyph) in line.chars().enumerate() {
                if glyph == '#' {
                    grid.set_tile(1 + dx as i32, 1 + dy as i32, 0, TileSet::Wall);
                }
            }
        }
        grid
    }

    #[test]
    fn test_sixteen_cardinal_fixtures() {
        // Each fixture is the 3x3 neighborhood of the center cell; the
        // expected value is the fallback-table index of the tile the
        // center must resolve to.
        let fixtures: [([&str; 3], u32); 16] = [
            (["...", ".#.", "..."], 0),  // isolated
            ([".#.", ".#.", "..."], 1),  // end_bottom
            (["...", ".##", "..."], 2),  // end_left
            (["...", ".#.", ".#."], 3),  // end_top
            (["...", "##.", "..."], 4),  // end_right
            ([".#.", ".#.", ".#."], 5),  // vertical
            (["...", "###", "..."], 6),  // horizontal
            ([".#.", ".##", "..."], 7),  // corner_bl
            ([".#.", "##.", "..."], 8),  // corner_br
            (["...", ".##", ".#."], 9),  // corner_tl
            (["...", "##.", ".#."], 10), // corner_tr
            ([".#.", ".##", ".#."], 11), // tee_e
            ([".#.", "##.", ".#."], 12), // tee_w
            ([".#.", "###", "..."], 13), // tee_n
            (["...", "###", ".#."], 14), // tee_s
            ([".#.", "###", ".#."], 15), // cross
        ];

        let mapper = initialized_mapper();
        for (fixture, expected) in fixtures {
            let mut grid = grid_from_fixture(fixture);
            mapper.apply_autotiling(&mut grid, 0).unwrap();
            assert_eq!(
                grid.get(2, 2).unwrap().tile_id,
                expected,
                "fixture {fixture:?}"
            );
        }
    }

    #[test]
    fn test_snapshot_prevents_order_dependence() {
        // A horizontal run of three walls surrounded by floor. In-place
        // rewriting would see the left neighbor's new id while processing
        // the middle cell; the snapshot keeps every mask original.
        let mut grid = grid_from_fixture(["...", "###", "..."]);
        let mapper = initialized_mapper();
        mapper.apply_autotiling(&mut grid, 0).unwrap();

        assert_eq!(grid.get(1, 2).unwrap().tile_id, 2); // end_left
        assert_eq!(grid.get(2, 2).unwrap().tile_id, 6); // horizontal
        assert_eq!(grid.get(3, 2).unwrap().tile_id, 4); // end_right
    }

    #[test]
    fn test_grid_edge_counts_as_wall() {
        // A single wall at the grid corner: both out-of-bounds cardinal
        // directions read as walls, so it resolves as a corner piece, not
        // isolated.
        let mut grid = TileGrid::filled_with_wall(3, 3, 0);
        for cell in 0..9 {
            grid.set_tile(cell % 3, cell / 3, 16, TileSet::Floor);
        }
        grid.set_tile(0, 0, 0, TileSet::Wall);

        let mapper = initialized_mapper();
        mapper.apply_autotiling(&mut grid, 0).unwrap();

        // Walls to the north (off-map) and west (off-map): corner_br.
        assert_eq!(grid.get(0, 0).unwrap().tile_id, 8);
    }

    #[test]
    fn test_floor_cells_untouched() {
        let mut grid = grid_from_fixture([".#.", "###", ".#."]);
        let mapper = initialized_mapper();
        mapper.apply_autotiling(&mut grid, 0).unwrap();

        let corner = grid.get(1, 1).unwrap();
        assert_eq!(corner.tile_id, 16);
        assert_eq!(corner.tileset, TileSet::Floor);
    }
}
