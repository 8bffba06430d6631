//! # Elements Module
//!
//! Interactive level elements and the graph that wires them together.
//!
//! The six element kinds form a closed tagged set rather than an open
//! class hierarchy: file-driven dispatch over them stays exhaustive and
//! machine-checked. Every element has an author-supplied string id and a
//! grid cell; the variant payload carries whatever that kind needs.
//!
//! Activation is explicit message passing. An activator holds no callback
//! list of its own; instead the registry keeps a directed wiring table of
//! activator → target edges and firing walks it in subscription order,
//! which keeps the fan-in/fan-out graph inspectable and serializable.

pub mod manager;
pub mod registry;

pub use manager::DungeonManager;
pub use registry::{ElementRegistry, WiringEdge};

use serde::{Deserialize, Serialize};

/// Seconds a triggered trap stays disarmed before re-arming.
pub const TRAP_REARM_SECONDS: f32 = 3.0;

fn default_true() -> bool {
    true
}

/// A switch: flips between its inactive and active tile on activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub id: String,
    pub column: i32,
    pub row: i32,
    #[serde(rename = "inactiveTileId")]
    pub inactive_tile: u32,
    #[serde(rename = "activeTileId")]
    pub active_tile: u32,
    #[serde(default)]
    pub active: bool,
}

/// A door: toggles between locked and unlocked tiles on activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub id: String,
    pub column: i32,
    pub row: i32,
    #[serde(rename = "lockedTileId")]
    pub locked_tile: u32,
    #[serde(rename = "unlockedTileId")]
    pub unlocked_tile: u32,
    #[serde(default = "default_true")]
    pub locked: bool,
}

/// Trap effect categories. The effect itself fires externally on trigger;
/// the engine only tracks armed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrapKind {
    Spikes,
    Fire,
    Poison,
    Pitfall,
}

/// A trap: disarms when triggered and re-arms after a countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trap {
    pub id: String,
    pub column: i32,
    pub row: i32,
    #[serde(rename = "trapType")]
    pub kind: TrapKind,
    #[serde(default = "default_true")]
    pub armed: bool,
    #[serde(default)]
    pub rearm_timer: f32,
}

impl Trap {
    /// Fires the trap: disarms it and starts the re-arm countdown. The
    /// actual effect (damage, status) is the caller's business.
    pub fn trigger(&mut self) {
        if self.armed {
            self.armed = false;
            self.rearm_timer = TRAP_REARM_SECONDS;
        }
    }
}

/// Puzzle mechanism categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleKind {
    Lever,
    PressurePlate,
    Riddle,
    Sequence,
}

/// A puzzle: marked solved when activated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: String,
    pub column: i32,
    pub row: i32,
    #[serde(rename = "puzzleType")]
    pub kind: PuzzleKind,
    #[serde(default)]
    pub solved: bool,
}

/// An encounter marker: identity and cell only, spawn logic is external.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: String,
    pub column: i32,
    pub row: i32,
}

/// A loot placement bound to an external loot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loot {
    pub id: String,
    pub column: i32,
    pub row: i32,
    #[serde(rename = "lootTableId")]
    pub loot_table: String,
    #[serde(default)]
    pub collected: bool,
}

/// The closed set of dungeon element variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DungeonElement {
    Switch(Switch),
    Door(Door),
    Trap(Trap),
    Puzzle(Puzzle),
    Encounter(Encounter),
    Loot(Loot),
}

impl DungeonElement {
    /// The element's author-supplied identifier.
    pub fn id(&self) -> &str {
        match self {
            DungeonElement::Switch(e) => &e.id,
            DungeonElement::Door(e) => &e.id,
            DungeonElement::Trap(e) => &e.id,
            DungeonElement::Puzzle(e) => &e.id,
            DungeonElement::Encounter(e) => &e.id,
            DungeonElement::Loot(e) => &e.id,
        }
    }

    /// The grid cell the element is bound to, `(column, row)`.
    pub fn cell(&self) -> (i32, i32) {
        match self {
            DungeonElement::Switch(e) => (e.column, e.row),
            DungeonElement::Door(e) => (e.column, e.row),
            DungeonElement::Trap(e) => (e.column, e.row),
            DungeonElement::Puzzle(e) => (e.column, e.row),
            DungeonElement::Encounter(e) => (e.column, e.row),
            DungeonElement::Loot(e) => (e.column, e.row),
        }
    }

    /// The declarative type tag for this variant.
    pub fn type_tag(&self) -> &'static str {
        match self {
            DungeonElement::Switch(_) => "switch",
            DungeonElement::Door(_) => "door",
            DungeonElement::Trap(_) => "trap",
            DungeonElement::Puzzle(_) => "puzzle",
            DungeonElement::Encounter(_) => "encounter",
            DungeonElement::Loot(_) => "loot",
        }
    }

    /// Reacts to an activation event from a wired activator.
    pub fn activate(&mut self) {
        match self {
            DungeonElement::Switch(e) => e.active = !e.active,
            DungeonElement::Door(e) => e.locked = !e.locked,
            // A wired activation toggles a trap's armed state, letting a
            // switch disable it.
            DungeonElement::Trap(e) => e.armed = !e.armed,
            DungeonElement::Puzzle(e) => e.solved = true,
            DungeonElement::Encounter(_) => {}
            DungeonElement::Loot(_) => {}
        }
    }

    /// Per-frame update. Only traps have time-based behavior.
    pub fn update(&mut self, delta_time: f32) {
        if let DungeonElement::Trap(trap) = self {
            if !trap.armed && trap.rearm_timer > 0.0 {
                trap.rearm_timer -= delta_time;
                if trap.rearm_timer <= 0.0 {
                    trap.rearm_timer = 0.0;
                    trap.armed = true;
                }
            }
        }
    }

    /// The tile the renderer should currently draw for this element, for
    /// variants that swap tiles with state.
    pub fn current_tile(&self) -> Option<u32> {
        match self {
            DungeonElement::Switch(e) => Some(if e.active {
                e.active_tile
            } else {
                e.inactive_tile
            }),
            DungeonElement::Door(e) => Some(if e.locked {
                e.locked_tile
            } else {
                e.unlocked_tile
            }),
            _ => None,
        }
    }
}

/// Typed access into a [`DungeonElement`], the closed-set counterpart of a
/// downcast. Lets the registry offer `get_element::<Door>(id)` style
/// lookups without an open trait-object hierarchy.
pub trait ElementKind: Sized {
    /// The variant's reference, if the element is of this kind.
    fn from_element(element: &DungeonElement) -> Option<&Self>;
    /// Mutable counterpart of [`from_element`](ElementKind::from_element).
    fn from_element_mut(element: &mut DungeonElement) -> Option<&mut Self>;
}

macro_rules! impl_element_kind {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(impl ElementKind for $ty {
            fn from_element(element: &DungeonElement) -> Option<&Self> {
                match element {
                    DungeonElement::$variant(e) => Some(e),
                    _ => None,
                }
            }

            fn from_element_mut(element: &mut DungeonElement) -> Option<&mut Self> {
                match element {
                    DungeonElement::$variant(e) => Some(e),
                    _ => None,
                }
            }
        })*
    };
}

impl_element_kind! {
    Switch => Switch,
    Door => Door,
    Trap => Trap,
    Puzzle => Puzzle,
    Encounter => Encounter,
    Loot => Loot,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_door() -> DungeonElement {
        DungeonElement::Door(Door {
            id: "door_1".to_string(),
            column: 4,
            row: 7,
            locked_tile: 210,
            unlocked_tile: 211,
            locked: true,
        })
    }

    #[test]
    fn test_door_activation_toggles_tile() {
        let mut door = sample_door();
        assert_eq!(door.current_tile(), Some(210));
        door.activate();
        assert_eq!(door.current_tile(), Some(211));
        door.activate();
        assert_eq!(door.current_tile(), Some(210));
    }

    #[test]
    fn test_trap_rearms_after_countdown() {
        let mut element = DungeonElement::Trap(Trap {
            id: "trap_1".to_string(),
            column: 1,
            row: 1,
            kind: TrapKind::Spikes,
            armed: true,
            rearm_timer: 0.0,
        });

        if let DungeonElement::Trap(trap) = &mut element {
            trap.trigger();
            assert!(!trap.armed);
        }

        element.update(TRAP_REARM_SECONDS / 2.0);
        if let DungeonElement::Trap(trap) = &element {
            assert!(!trap.armed);
        }
        element.update(TRAP_REARM_SECONDS);
        if let DungeonElement::Trap(trap) = &element {
            assert!(trap.armed);
            assert_eq!(trap.rearm_timer, 0.0);
        }
    }

    #[test]
    fn test_element_kind_downcast() {
        let door = sample_door();
        assert!(Door::from_element(&door).is_some());
        assert!(Switch::from_element(&door).is_none());
    }

    #[test]
    fn test_kind_enums_parse_from_declarative_strings() {
        let kind: TrapKind = serde_json::from_str("\"spikes\"").unwrap();
        assert_eq!(kind, TrapKind::Spikes);
        let kind: PuzzleKind = serde_json::from_str("\"pressureplate\"").unwrap();
        assert_eq!(kind, PuzzleKind::PressurePlate);
        assert!(serde_json::from_str::<TrapKind>("\"lava\"").is_err());
    }
}
