//! Room placement, corridor routing, carving and element placement.

use crate::config::{
    DOOR_LOCKED_TILE, DOOR_UNLOCKED_TILE, RAW_WALL_TILE, SWITCH_ACTIVE_TILE, SWITCH_INACTIVE_TILE,
    TILE_SIZE,
};
use crate::elements::{Door, DungeonElement, ElementRegistry, Switch};
use crate::generation::{Corridor, PlannerConfig, Room};
use crate::grid::{GridRect, Position, TileGrid, TileSet};
use crate::{AutotileMapper, WarrenError, WarrenResult};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;

/// Plans rooms and corridors and carves them into a tile grid.
///
/// Rooms are placed by rejection sampling: candidates whose padded bounds
/// would touch an accepted room's padded bounds are discarded. Accepted
/// rooms are chained with L-shaped corridors sorted by `(x + y)` so the
/// dungeon is always connected, with a couple of extra links thrown in on
/// larger layouts for cycle redundancy.
#[derive(Debug, Clone)]
pub struct DungeonPlanner {
    config: PlannerConfig,
    rooms: Vec<Room>,
    corridors: Vec<Corridor>,
}

impl DungeonPlanner {
    /// Creates a planner with the given configuration.
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            rooms: Vec::new(),
            corridors: Vec::new(),
        }
    }

    /// Accepted rooms, in acceptance order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Corridor segments, two per L-shaped connection.
    pub fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }

    /// The planner's configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Runs the full layout pipeline: room placement, corridor routing and
    /// carving. The caller applies autotiling and element placement after.
    pub fn plan(
        &mut self,
        grid: &mut TileGrid,
        mapper: &AutotileMapper,
        rng: &mut StdRng,
    ) -> WarrenResult<()> {
        self.generate_rooms(grid.columns(), grid.rows(), rng);
        self.connect_rooms(rng);
        self.carve(grid, mapper, rng)
    }

    /// Places non-overlapping rooms by rejection sampling.
    ///
    /// Spends up to the configured attempt budget drawing random rectangles
    /// inside the border margin, rejecting any whose padded bounds touch an
    /// accepted room's padded bounds, and stopping early at the room cap.
    /// If nothing is ever accepted a fixed fallback room is synthesized:
    /// the planner never produces an empty dungeon.
    pub fn generate_rooms(&mut self, columns: u32, rows: u32, rng: &mut StdRng) {
        self.rooms.clear();
        self.corridors.clear();

        let margin = self.config.border_margin as i32;
        let padding = self.config.room_padding;

        for _ in 0..self.config.placement_attempts {
            if self.rooms.len() as u32 >= self.config.max_rooms {
                break;
            }

            let width = rng.gen_range(self.config.min_room_size..=self.config.max_room_size);
            let height = rng.gen_range(self.config.min_room_size..=self.config.max_room_size);
            let max_x = columns as i32 - margin - width as i32;
            let max_y = rows as i32 - margin - height as i32;
            if max_x < margin || max_y < margin {
                continue; // map too small for a room of this size
            }

            let candidate = GridRect::new(
                rng.gen_range(margin..=max_x),
                rng.gen_range(margin..=max_y),
                width,
                height,
            );
            let rejected = self
                .rooms
                .iter()
                .any(|room| room.bounds.padded(padding).intersects(&candidate.padded(padding)));
            if rejected {
                continue;
            }

            let id = self.rooms.len() as u32;
            self.rooms.push(Room::new(id, candidate));
        }

        if self.rooms.is_empty() {
            let room = self.fallback_room(columns, rows);
            warn!(
                "no rooms accepted after {} attempts, synthesizing fallback at ({}, {})",
                self.config.placement_attempts, room.bounds.x, room.bounds.y
            );
            self.rooms.push(room);
        }

        debug!("accepted {} rooms", self.rooms.len());
    }

    /// The guaranteed single room used when placement exhausts its budget:
    /// up to 4x4 cells, centered on the grid.
    fn fallback_room(&self, columns: u32, rows: u32) -> Room {
        let width = 4.min(columns.max(1));
        let height = 4.min(rows.max(1));
        let x = (columns.saturating_sub(width) / 2) as i32;
        let y = (rows.saturating_sub(height) / 2) as i32;
        Room::new(0, GridRect::new(x, y, width, height))
    }

    /// Connects accepted rooms into a spanning chain, plus extra links.
    ///
    /// Rooms are sorted by `(x + y)` of their origin and each consecutive
    /// pair gets a corridor, which guarantees connectivity without a full
    /// spanning-tree computation. Layouts with more than 3 rooms also get
    /// `min(2, room_count / 3)` random extra pairwise links so not every
    /// path is a dead end.
    pub fn connect_rooms(&mut self, rng: &mut StdRng) {
        if self.rooms.len() < 2 {
            return;
        }

        let mut order: Vec<usize> = (0..self.rooms.len()).collect();
        order.sort_by_key(|&i| self.rooms[i].bounds.x + self.rooms[i].bounds.y);

        for pair in order.windows(2) {
            self.link_rooms(pair[0], pair[1], rng);
        }

        if self.rooms.len() > 3 {
            let extra = 2.min(self.rooms.len() / 3);
            for _ in 0..extra {
                let a = rng.gen_range(0..self.rooms.len());
                // Draw b from the remaining indices so every extra link
                // lands between two distinct rooms.
                let mut b = rng.gen_range(0..self.rooms.len() - 1);
                if b >= a {
                    b += 1;
                }
                self.link_rooms(a, b, rng);
            }
        }
    }

    fn link_rooms(&mut self, a: usize, b: usize, rng: &mut StdRng) {
        let start = self.rooms[a].bounds.center();
        let end = self.rooms[b].bounds.center();
        self.create_corridor(start, end, rng);

        let (id_a, id_b) = (self.rooms[a].id, self.rooms[b].id);
        self.rooms[a].add_connection(id_b);
        self.rooms[b].add_connection(id_a);
    }

    /// Builds an L-shaped corridor between two points out of two
    /// fixed-width rectangles, bending horizontal-first or vertical-first
    /// at random. Both segments are appended as-is, never merged.
    pub fn create_corridor(&mut self, start: Position, end: Position, rng: &mut StdRng) {
        let width = self.config.corridor_width;
        let horizontal_first = rng.gen_bool(0.5);

        let horizontal = |y: i32| {
            let min_x = start.x.min(end.x);
            let max_x = start.x.max(end.x);
            GridRect::new(min_x, y, (max_x - min_x) as u32 + width, width)
        };
        let vertical = |x: i32| {
            let min_y = start.y.min(end.y);
            let max_y = start.y.max(end.y);
            GridRect::new(x, min_y, width, (max_y - min_y) as u32 + width)
        };

        if horizontal_first {
            self.corridors.push(Corridor::new(horizontal(start.y)));
            self.corridors.push(Corridor::new(vertical(end.x)));
        } else {
            self.corridors.push(Corridor::new(vertical(start.x)));
            self.corridors.push(Corridor::new(horizontal(end.y)));
        }
    }

    /// Carves the planned layout into the grid.
    ///
    /// Fills the whole grid with the raw wall id, then writes floor ids
    /// into every room and corridor rectangle. Room cells draw a random
    /// member of the floor-id set for visual variety; corridors use one
    /// representative floor id. Carving is last-write-wins and never
    /// checks whether a cell is already floor.
    pub fn carve(
        &self,
        grid: &mut TileGrid,
        mapper: &AutotileMapper,
        rng: &mut StdRng,
    ) -> WarrenResult<()> {
        let floor_ids = mapper.floor_tile_ids()?;
        if floor_ids.is_empty() {
            return Err(WarrenError::GenerationFailed(
                "pattern table defines no floor tiles".to_string(),
            ));
        }

        grid.fill_with_wall(RAW_WALL_TILE);

        for room in &self.rooms {
            for pos in room.bounds.positions() {
                let id = floor_ids[rng.gen_range(0..floor_ids.len())];
                grid.set_tile(pos.x, pos.y, id, TileSet::Floor);
            }
        }

        let corridor_floor = floor_ids[0];
        for corridor in &self.corridors {
            for pos in corridor.bounds.positions() {
                grid.set_tile(pos.x, pos.y, corridor_floor, TileSet::Floor);
            }
        }

        Ok(())
    }

    /// Places two door+switch pairs on carved floor and wires each switch
    /// to its door.
    ///
    /// Candidate cells are interior floor-tileset cells (a 2-cell border is
    /// excluded), grouped by room membership; one cell is drawn per room
    /// first, and any remaining slots are filled from leftover floor cells
    /// when rooms are scarce.
    pub fn place_elements(
        &self,
        grid: &TileGrid,
        registry: &mut ElementRegistry,
        rng: &mut StdRng,
    ) {
        let cells = self.pick_element_cells(grid, rng, 4);
        if cells.len() < 2 {
            warn!("not enough floor cells to place any door/switch pair");
            return;
        }

        let pairs = (cells.len() / 2).min(2);
        for pair in 0..pairs {
            let switch_cell = cells[pair * 2];
            let door_cell = cells[pair * 2 + 1];
            let switch_id = format!("switch_{}", pair + 1);
            let door_id = format!("door_{}", pair + 1);

            registry.add(DungeonElement::Switch(Switch {
                id: switch_id.clone(),
                column: switch_cell.x,
                row: switch_cell.y,
                inactive_tile: SWITCH_INACTIVE_TILE,
                active_tile: SWITCH_ACTIVE_TILE,
                active: false,
            }));
            registry.add(DungeonElement::Door(Door {
                id: door_id.clone(),
                column: door_cell.x,
                row: door_cell.y,
                locked_tile: DOOR_LOCKED_TILE,
                unlocked_tile: DOOR_UNLOCKED_TILE,
                locked: true,
            }));
            registry.wire_up(&switch_id, &door_id);
        }

        debug!("placed {pairs} door/switch pairs");
    }

    /// Selects up to `limit` interior floor cells, preferring one per room.
    fn pick_element_cells(&self, grid: &TileGrid, rng: &mut StdRng, limit: usize) -> Vec<Position> {
        let border = 2i32;
        let mut by_room: Vec<Vec<Position>> = vec![Vec::new(); self.rooms.len()];
        let mut unowned: Vec<Position> = Vec::new();

        for row in border..grid.rows() as i32 - border {
            for column in border..grid.columns() as i32 - border {
                let is_floor = grid
                    .get(column, row)
                    .map(|cell| cell.tileset == TileSet::Floor)
                    .unwrap_or(false);
                if !is_floor {
                    continue;
                }
                let pos = Position::new(column, row);
                match self.rooms.iter().position(|r| r.bounds.contains(pos)) {
                    Some(i) => by_room[i].push(pos),
                    None => unowned.push(pos),
                }
            }
        }

        let mut picks = Vec::new();
        for cells in by_room.iter_mut() {
            if picks.len() >= limit || cells.is_empty() {
                continue;
            }
            picks.push(cells.swap_remove(rng.gen_range(0..cells.len())));
        }

        // Rooms were scarce; top up from whatever floor is left.
        let mut leftovers: Vec<Position> = by_room.into_iter().flatten().chain(unowned).collect();
        while picks.len() < limit && !leftovers.is_empty() {
            picks.push(leftovers.swap_remove(rng.gen_range(0..leftovers.len())));
        }

        picks
    }

    /// Pixel-space spawn point: the center of the first accepted room.
    ///
    /// With no rooms at all this falls back to the exact pixel center of
    /// the grid. The room planner's own fallback room makes that path
    /// unreachable for generated levels; it exists for hydrated or empty
    /// ones.
    pub fn player_start(&self, grid: &TileGrid) -> (f32, f32) {
        player_start(&self.rooms, grid)
    }
}

/// Shared spawn-point computation, also used by the dungeon manager.
pub(crate) fn player_start(rooms: &[Room], grid: &TileGrid) -> (f32, f32) {
    match rooms.first() {
        Some(room) => {
            let center = room.bounds.center();
            (
                (center.x as f32 + 0.5) * TILE_SIZE,
                (center.y as f32 + 0.5) * TILE_SIZE,
            )
        }
        None => (
            grid.columns() as f32 * TILE_SIZE / 2.0,
            grid.rows() as f32 * TILE_SIZE / 2.0,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner_with_rooms(seed: u64, columns: u32, rows: u32) -> DungeonPlanner {
        let config = PlannerConfig::new(seed);
        let mut rng = config.create_rng();
        let mut planner = DungeonPlanner::new(config);
        planner.generate_rooms(columns, rows, &mut rng);
        planner
    }

    #[test]
    fn test_rooms_respect_padding() {
        let planner = planner_with_rooms(12345, 80, 40);
        let padding = planner.config().room_padding;
        for (i, a) in planner.rooms().iter().enumerate() {
            for b in &planner.rooms()[i + 1..] {
                assert!(
                    !a.bounds.padded(padding).intersects(&b.bounds.padded(padding)),
                    "rooms {} and {} violate padding",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn test_rooms_respect_border_margin() {
        let planner = planner_with_rooms(99, 80, 40);
        for room in planner.rooms() {
            assert!(room.bounds.x >= 2);
            assert!(room.bounds.y >= 2);
            assert!(room.bounds.right() <= 78);
            assert!(room.bounds.bottom() <= 38);
        }
    }

    #[test]
    fn test_tiny_map_gets_fallback_room() {
        // Far too small for any sampled room, so the fixed fallback kicks in.
        let planner = planner_with_rooms(1, 5, 5);
        assert_eq!(planner.rooms().len(), 1);
        let room = &planner.rooms()[0];
        assert_eq!(room.bounds.width, 4);
        assert_eq!(room.bounds.height, 4);
    }

    #[test]
    fn test_connect_rooms_chains_all() {
        let config = PlannerConfig::new(4242);
        let mut rng = config.create_rng();
        let mut planner = DungeonPlanner::new(config);
        planner.generate_rooms(80, 40, &mut rng);
        planner.connect_rooms(&mut rng);

        if planner.rooms().len() < 2 {
            return;
        }
        // Every room ends up with at least one connection, and every
        // connection contributed two corridor segments.
        for room in planner.rooms() {
            assert!(!room.connections.is_empty(), "room {} unconnected", room.id);
        }
        assert!(planner.corridors().len() >= (planner.rooms().len() - 1) * 2);
        assert_eq!(planner.corridors().len() % 2, 0);
    }

    #[test]
    fn test_extra_link_count_is_exact() {
        // Chain links plus extras, two corridor segments per link. The
        // extra-link draw must never collapse onto a single room, so the
        // count holds for every seed.
        for seed in 0..200 {
            let config = PlannerConfig::new(seed);
            let mut rng = config.create_rng();
            let mut planner = DungeonPlanner::new(config);
            planner.generate_rooms(80, 40, &mut rng);
            planner.connect_rooms(&mut rng);

            let rooms = planner.rooms().len();
            let extras = if rooms > 3 { 2.min(rooms / 3) } else { 0 };
            let links = rooms.saturating_sub(1) + extras;
            assert_eq!(
                planner.corridors().len(),
                links * 2,
                "seed {seed}: {rooms} rooms"
            );
        }
    }

    #[test]
    fn test_corridor_spans_both_endpoints() {
        let config = PlannerConfig::new(7);
        let mut rng = config.create_rng();
        let mut planner = DungeonPlanner::new(config);
        planner.create_corridor(Position::new(5, 5), Position::new(20, 15), &mut rng);

        assert_eq!(planner.corridors().len(), 2);
        let covers = |pos: Position| {
            planner
                .corridors()
                .iter()
                .any(|c| c.bounds.contains(pos))
        };
        assert!(covers(Position::new(5, 5)));
        assert!(covers(Position::new(20, 15)));
    }

    #[test]
    fn test_carve_writes_floor_into_rooms() {
        let config = PlannerConfig::new(31337);
        let mut rng = config.create_rng();
        let mut planner = DungeonPlanner::new(config);
        let mut mapper = AutotileMapper::new();
        mapper.initialize_fallback().unwrap();

        let mut grid = TileGrid::filled_with_wall(80, 40, RAW_WALL_TILE);
        planner.plan(&mut grid, &mapper, &mut rng).unwrap();

        let floor_ids = mapper.floor_tile_ids().unwrap();
        for room in planner.rooms() {
            for pos in room.bounds.positions() {
                let cell = grid.get(pos.x, pos.y).unwrap();
                assert_eq!(cell.tileset, TileSet::Floor);
                assert!(floor_ids.contains(&cell.tile_id));
            }
        }
    }

    #[test]
    fn test_place_elements_wires_two_pairs() {
        let config = PlannerConfig::new(808);
        let mut rng = config.create_rng();
        let mut planner = DungeonPlanner::new(config);
        let mut mapper = AutotileMapper::new();
        mapper.initialize_fallback().unwrap();

        let mut grid = TileGrid::filled_with_wall(80, 40, RAW_WALL_TILE);
        planner.plan(&mut grid, &mapper, &mut rng).unwrap();
        mapper.apply_autotiling(&mut grid, RAW_WALL_TILE).unwrap();

        let mut registry = ElementRegistry::new();
        planner.place_elements(&grid, &mut registry, &mut rng);

        assert_eq!(registry.elements().len(), 4);
        assert_eq!(registry.wiring().len(), 2);
        assert!(registry.get_element::<Switch>("switch_1").is_some());
        assert!(registry.get_element::<Door>("door_2").is_some());

        // Every element sits on a floor cell.
        for element in registry.elements() {
            let (column, row) = element.cell();
            assert_eq!(grid.get(column, row).unwrap().tileset, TileSet::Floor);
        }
    }

    #[test]
    fn test_player_start_uses_first_room_center() {
        let planner = planner_with_rooms(5150, 80, 40);
        let grid = TileGrid::filled_with_wall(80, 40, RAW_WALL_TILE);
        let center = planner.rooms()[0].bounds.center();

        let (px, py) = planner.player_start(&grid);
        assert_eq!(px, (center.x as f32 + 0.5) * TILE_SIZE);
        assert_eq!(py, (center.y as f32 + 0.5) * TILE_SIZE);
    }

    #[test]
    fn test_player_start_grid_center_fallback() {
        let planner = DungeonPlanner::new(PlannerConfig::new(0));
        let grid = TileGrid::filled_with_wall(80, 40, RAW_WALL_TILE);

        let (px, py) = planner.player_start(&grid);
        assert_eq!(px, 80.0 * TILE_SIZE / 2.0);
        assert_eq!(py, 40.0 * TILE_SIZE / 2.0);
    }
}
