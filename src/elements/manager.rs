//! The dungeon manager facade.
//!
//! Owns one level's tile grid, planned geometry and element registry,
//! drives per-frame updates, and moves levels between memory and their
//! declarative on-disk form.

use crate::config::RAW_WALL_TILE;
use crate::elements::{
    Door, DungeonElement, ElementKind, ElementRegistry, Encounter, Loot, Puzzle, Switch, Trap,
    WiringEdge,
};
use crate::generation::planner::player_start;
use crate::generation::{Corridor, DungeonPlanner, PlannerConfig, Room};
use crate::grid::TileGrid;
use crate::{AutotileMapper, WarrenError, WarrenResult};
use log::{info, warn};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// On-disk shape of a level declaration document.
#[derive(Debug, Serialize, Deserialize)]
struct LevelDoc {
    /// Path of the tile-grid resource, relative to the document
    tilemap: String,
    /// Typed element declarations; the `type` tag picks the variant
    elements: Vec<Value>,
    /// Activation edges, applied in order
    wiring: Vec<WiringEdge>,
}

/// Facade over one dungeon level: grid, rooms, corridors and elements.
///
/// Levels arrive two ways: procedurally through
/// [`generate_basic_dungeon`](DungeonManager::generate_basic_dungeon), or
/// hydrated from a declarative document through
/// [`load_level`](DungeonManager::load_level). Both paths feed the same
/// registry and wiring primitives.
#[derive(Debug, Default)]
pub struct DungeonManager {
    grid: Option<TileGrid>,
    rooms: Vec<Room>,
    corridors: Vec<Corridor>,
    registry: ElementRegistry,
}

impl DungeonManager {
    /// Creates a manager with no active level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the full procedural pipeline into a fresh level.
    ///
    /// Fills a wall grid, plans and carves rooms and corridors, autotiles
    /// every wall cell, then places and wires two door/switch pairs. Any
    /// previously active level is replaced wholesale.
    pub fn generate_basic_dungeon(
        &mut self,
        columns: u32,
        rows: u32,
        config: &PlannerConfig,
        mapper: &AutotileMapper,
        rng: &mut StdRng,
    ) -> WarrenResult<()> {
        let mut grid = TileGrid::filled_with_wall(columns, rows, RAW_WALL_TILE);
        let mut planner = DungeonPlanner::new(config.clone());
        planner.plan(&mut grid, mapper, rng)?;
        mapper.apply_autotiling(&mut grid, RAW_WALL_TILE)?;

        let mut registry = ElementRegistry::new();
        planner.place_elements(&grid, &mut registry, rng);

        info!(
            "generated {}x{} dungeon: {} rooms, {} corridor segments, {} elements",
            columns,
            rows,
            planner.rooms().len(),
            planner.corridors().len(),
            registry.len()
        );

        self.grid = Some(grid);
        self.rooms = planner.rooms().to_vec();
        self.corridors = planner.corridors().to_vec();
        self.registry = registry;
        Ok(())
    }

    /// The active tile grid, if a level is loaded.
    pub fn grid(&self) -> Option<&TileGrid> {
        self.grid.as_ref()
    }

    /// Rooms of the active level; empty for hydrated levels.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Corridor segments of the active level; empty for hydrated levels.
    pub fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }

    /// The element registry of the active level.
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Typed first-match element lookup, forwarded to the registry.
    pub fn get_element<T: ElementKind>(&self, id: &str) -> Option<&T> {
        self.registry.get_element(id)
    }

    /// Mutable typed lookup, forwarded to the registry.
    pub fn get_element_mut<T: ElementKind>(&mut self, id: &str) -> Option<&mut T> {
        self.registry.get_element_mut(id)
    }

    /// Subscribes `target` to `activator`; silently ignores unresolved ids.
    pub fn wire_up(&mut self, activator: &str, target: &str) {
        self.registry.wire_up(activator, target);
    }

    /// Interacts with an element: toggles its own state and fires its
    /// activation event in one call. Use this for player interaction;
    /// [`fire_activation`](DungeonManager::fire_activation) alone drives
    /// only the wired targets.
    pub fn activate_element(&mut self, id: &str) {
        self.registry.activate_element(id);
    }

    /// Fires an activator's event through the wiring table.
    pub fn fire_activation(&mut self, activator: &str) {
        self.registry.fire_activation(activator);
    }

    /// Forwards the frame tick to every element.
    pub fn update(&mut self, delta_time: f32) {
        self.registry.update(delta_time);
    }

    /// Pixel-space player spawn point: first room's center, or the exact
    /// grid center when the level has no rooms (hydrated levels).
    pub fn player_start(&self) -> Option<(f32, f32)> {
        self.grid.as_ref().map(|grid| player_start(&self.rooms, grid))
    }

    /// Hydrates a level from a declarative document.
    ///
    /// Reads the level document, loads the tile-grid resource it
    /// references (relative to the document's directory), dispatches every
    /// element declaration to its variant, and applies the wiring list.
    /// Unrecognized element type tags are skipped with a diagnostic;
    /// missing or malformed attributes abort the load. A failed load
    /// leaves the previously active level untouched.
    pub fn load_level(&mut self, level_path: &Path) -> WarrenResult<()> {
        let doc: LevelDoc = serde_json::from_reader(BufReader::new(File::open(level_path)?))?;

        let tilemap_path = resolve_sibling(level_path, &doc.tilemap);
        let grid: TileGrid = serde_json::from_reader(BufReader::new(File::open(&tilemap_path)?))?;

        let mut registry = ElementRegistry::new();
        for value in &doc.elements {
            if let Some(element) = parse_element(value)? {
                registry.add(element);
            }
        }
        for edge in &doc.wiring {
            registry.wire_up(&edge.activator, &edge.target);
        }

        info!(
            "hydrated level from {}: {} elements, {} wires",
            level_path.display(),
            registry.len(),
            registry.wiring().len()
        );

        self.grid = Some(grid);
        self.rooms.clear();
        self.corridors.clear();
        self.registry = registry;
        Ok(())
    }

    /// Writes the active level back to its declarative form: the level
    /// document at `level_path` and the tile-grid resource as a sibling
    /// file named `tilemap_name`. Reloading the pair reproduces the same
    /// grid, elements and wiring.
    pub fn save_level(&self, level_path: &Path, tilemap_name: &str) -> WarrenResult<()> {
        let grid = self.grid.as_ref().ok_or_else(|| {
            WarrenError::LoadFailed("no active level to save".to_string())
        })?;

        let tilemap_path = resolve_sibling(level_path, tilemap_name);
        serde_json::to_writer_pretty(BufWriter::new(File::create(&tilemap_path)?), grid)?;

        let elements = self
            .registry
            .elements()
            .iter()
            .map(element_to_declaration)
            .collect::<WarrenResult<Vec<Value>>>()?;
        let doc = LevelDoc {
            tilemap: tilemap_name.to_string(),
            elements,
            wiring: self.registry.wiring().to_vec(),
        };
        serde_json::to_writer_pretty(BufWriter::new(File::create(level_path)?), &doc)?;
        Ok(())
    }
}

/// Resolves a resource referenced by a document, relative to the document.
fn resolve_sibling(doc_path: &Path, resource: &str) -> PathBuf {
    match doc_path.parent() {
        Some(parent) => parent.join(resource),
        None => PathBuf::from(resource),
    }
}

/// Dispatches one element declaration by its `type` tag.
///
/// Returns `Ok(None)` for unrecognized tags (skipped, not fatal) and an
/// error for declarations whose attributes fail to parse: level data is
/// author-controlled, so structural gaps surface instead of defaulting.
fn parse_element(value: &Value) -> WarrenResult<Option<DungeonElement>> {
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| WarrenError::LoadFailed("element declaration missing type tag".to_string()))?
        .to_string();

    let parsed = match tag.as_str() {
        "switch" => DungeonElement::Switch(decode::<Switch>(value, &tag)?),
        "door" => DungeonElement::Door(decode::<Door>(value, &tag)?),
        "trap" => DungeonElement::Trap(decode::<Trap>(value, &tag)?),
        "puzzle" => DungeonElement::Puzzle(decode::<Puzzle>(value, &tag)?),
        "encounter" => DungeonElement::Encounter(decode::<Encounter>(value, &tag)?),
        "loot" => DungeonElement::Loot(decode::<Loot>(value, &tag)?),
        other => {
            warn!("unrecognized element type '{other}', skipping");
            return Ok(None);
        }
    };
    Ok(Some(parsed))
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value, tag: &str) -> WarrenResult<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| WarrenError::LoadFailed(format!("bad {tag} declaration: {e}")))
}

/// Serializes an element back to its tagged declarative form.
fn element_to_declaration(element: &DungeonElement) -> WarrenResult<Value> {
    let mut value = match element {
        DungeonElement::Switch(e) => serde_json::to_value(e)?,
        DungeonElement::Door(e) => serde_json::to_value(e)?,
        DungeonElement::Trap(e) => serde_json::to_value(e)?,
        DungeonElement::Puzzle(e) => serde_json::to_value(e)?,
        DungeonElement::Encounter(e) => serde_json::to_value(e)?,
        DungeonElement::Loot(e) => serde_json::to_value(e)?,
    };
    if let Value::Object(map) = &mut value {
        map.insert("type".to_string(), Value::String(element.type_tag().to_string()));
    }
    Ok(value)
}
