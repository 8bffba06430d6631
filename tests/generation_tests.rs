//! Integration tests for the full generation pipeline: room packing,
//! corridor connectivity, carving and autotiling working together.

use proptest::prelude::*;
use warren::config::RAW_WALL_TILE;
use warren::{
    AutotileMapper, Door, DungeonManager, DungeonPlanner, PlannerConfig, Switch, TileSet,
    CARDINAL_MASK,
};

fn fallback_mapper() -> AutotileMapper {
    let mut mapper = AutotileMapper::new();
    mapper.initialize_fallback().unwrap();
    mapper
}

fn generated_manager(seed: u64, columns: u32, rows: u32) -> DungeonManager {
    let mapper = fallback_mapper();
    let config = PlannerConfig::new(seed);
    let mut rng = config.create_rng();
    let mut manager = DungeonManager::new();
    manager
        .generate_basic_dungeon(columns, rows, &config, &mapper, &mut rng)
        .expect("generation failed");
    manager
}

#[test]
fn test_generated_dungeon_has_rooms_and_elements() {
    let manager = generated_manager(98765, 80, 40);

    assert!(!manager.rooms().is_empty());
    assert!(!manager.corridors().is_empty());
    assert_eq!(manager.registry().len(), 4);
    assert_eq!(manager.registry().wiring().len(), 2);
    assert!(manager.get_element::<Switch>("switch_1").is_some());
    assert!(manager.get_element::<Door>("door_1").is_some());
}

#[test]
fn test_autotiled_walls_match_neighbor_patterns() {
    // Every wall cell's final tile id must equal the cardinal-pattern
    // lookup for its neighborhood. Tileset membership never changes during
    // autotiling, so the post-pass wall layout is the pre-pass snapshot.
    let manager = generated_manager(424242, 60, 30);
    let mapper = fallback_mapper();
    let grid = manager.grid().unwrap();

    let wall_at = |column: i32, row: i32| -> bool {
        match grid.get(column, row) {
            Some(cell) => cell.tileset == TileSet::Wall,
            None => true, // map edges count as enclosed
        }
    };

    for row in 0..grid.rows() as i32 {
        for column in 0..grid.columns() as i32 {
            let cell = grid.get(column, row).unwrap();
            if cell.tileset != TileSet::Wall {
                continue;
            }
            let mut mask = 0u8;
            if wall_at(column, row - 1) {
                mask |= 1; // N
            }
            if wall_at(column + 1, row) {
                mask |= 4; // E
            }
            if wall_at(column, row + 1) {
                mask |= 16; // S
            }
            if wall_at(column - 1, row) {
                mask |= 64; // W
            }
            assert_eq!(
                cell.tile_id,
                mapper.tile_for_pattern(mask & CARDINAL_MASK).unwrap(),
                "wall at ({column}, {row}) does not match its neighborhood"
            );
        }
    }
}

#[test]
fn test_switch_toggles_only_its_door() {
    let mut manager = generated_manager(31337, 80, 40);

    let door_2_locked_before = manager.get_element::<Door>("door_2").unwrap().locked;
    manager.fire_activation("switch_1");

    assert!(!manager.get_element::<Door>("door_1").unwrap().locked);
    assert_eq!(
        manager.get_element::<Door>("door_2").unwrap().locked,
        door_2_locked_before
    );
}

#[test]
fn test_throwing_a_switch_updates_its_own_tile() {
    let mut manager = generated_manager(2024, 80, 40);

    let inactive_tile = {
        let switch = manager.get_element::<Switch>("switch_1").unwrap();
        assert!(!switch.active);
        switch.inactive_tile
    };

    manager.activate_element("switch_1");

    let switch = manager.get_element::<Switch>("switch_1").unwrap();
    assert!(switch.active);
    assert_ne!(switch.active_tile, inactive_tile);
    assert!(!manager.get_element::<Door>("door_1").unwrap().locked);
}

#[test]
fn test_generation_is_seed_deterministic() {
    let a = generated_manager(777, 80, 40);
    let b = generated_manager(777, 80, 40);

    assert_eq!(a.grid().unwrap(), b.grid().unwrap());
    assert_eq!(a.rooms(), b.rooms());
    assert_eq!(a.registry().elements(), b.registry().elements());
}

proptest! {
    /// Room placement never yields an empty dungeon and never violates the
    /// padded-bounds spacing invariant, for any seed and map extremes.
    #[test]
    fn prop_rooms_always_exist_and_never_touch(
        seed in any::<u64>(),
        columns in 4u32..100,
        rows in 4u32..100,
    ) {
        let config = PlannerConfig::new(seed);
        let mut rng = config.create_rng();
        let mut planner = DungeonPlanner::new(config);
        planner.generate_rooms(columns, rows, &mut rng);

        prop_assert!(!planner.rooms().is_empty());

        let padding = planner.config().room_padding;
        for (i, a) in planner.rooms().iter().enumerate() {
            for b in &planner.rooms()[i + 1..] {
                prop_assert!(
                    !a.bounds.padded(padding).intersects(&b.bounds.padded(padding))
                );
            }
        }
    }

    /// The carve pipeline leaves every room cell floor-authored regardless
    /// of seed.
    #[test]
    fn prop_rooms_are_carved_as_floor(seed in any::<u64>()) {
        let mapper = fallback_mapper();
        let config = PlannerConfig::for_testing(seed);
        let mut rng = config.create_rng();
        let mut planner = DungeonPlanner::new(config);
        let mut grid = warren::TileGrid::filled_with_wall(48, 32, RAW_WALL_TILE);
        planner.plan(&mut grid, &mapper, &mut rng).unwrap();

        for room in planner.rooms() {
            for pos in room.bounds.positions() {
                let cell = grid.get(pos.x, pos.y).unwrap();
                prop_assert_eq!(cell.tileset, TileSet::Floor);
            }
        }
    }
}
