//! Pattern table loading and the built-in fallback table.
//!
//! The table arrives as a declarative JSON document: a `wallTiles` list of
//! entries carrying a symbolic `type` name, either a direct atlas `index`
//! or a `(col,row)` pair, and for wall types a cardinal `pattern` bitmask.
//! Entries whose name is not prefixed `floor_` also feed the wall-index
//! set used for tile classification.

use crate::autotile::{CARDINAL_MASK, EAST, NORTH, SOUTH, WEST};
use log::warn;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;

/// Rows assumed in the tile atlas; together with the column count this
/// bounds the valid index range.
pub const ATLAS_ROWS: u32 = 30;

/// Default atlas width in columns when the document does not override it.
pub const DEFAULT_ATLAS_COLUMNS: u32 = 40;

/// Prefix that marks a symbolic tile name as a floor variant.
pub const FLOOR_PREFIX: &str = "floor_";

fn default_atlas_columns() -> u32 {
    DEFAULT_ATLAS_COLUMNS
}

/// On-disk shape of the pattern table document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternTableDoc {
    /// Atlas width used to convert `(col,row)` pairs to flat indices
    #[serde(default = "default_atlas_columns")]
    pub atlas_columns: u32,
    /// Tile entries, wall patterns and floor variants alike
    pub wall_tiles: Vec<TileEntry>,
}

/// One entry of the `wallTiles` section.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileEntry {
    /// Symbolic type name, e.g. `"corner_tl"` or `"floor_basic"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Direct atlas index
    pub index: Option<u32>,
    /// Atlas column, paired with `row`
    pub col: Option<u32>,
    /// Atlas row, paired with `col`
    pub row: Option<u32>,
    /// Cardinal neighbor bitmask this tile answers for
    pub pattern: Option<u8>,
}

/// Resolved pattern table: the two lookup maps plus the wall-index set.
#[derive(Debug, Clone)]
pub struct PatternTable {
    atlas_columns: u32,
    name_to_index: HashMap<String, u32>,
    pattern_to_index: HashMap<u8, u32>,
    wall_indices: HashSet<u32>,
}

impl PatternTable {
    /// Builds a table from a parsed document.
    ///
    /// Entries with an index outside `[0, atlas_columns * ATLAS_ROWS)` or
    /// with neither an `index` nor a complete `(col,row)` pair are skipped
    /// with a diagnostic; the table favors loading what it can over
    /// rejecting the whole document.
    pub fn from_document(doc: &PatternTableDoc) -> Self {
        let mut table = Self {
            atlas_columns: doc.atlas_columns,
            name_to_index: HashMap::new(),
            pattern_to_index: HashMap::new(),
            wall_indices: HashSet::new(),
        };
        let index_limit = doc.atlas_columns * ATLAS_ROWS;

        for entry in &doc.wall_tiles {
            let index = match (entry.index, entry.col, entry.row) {
                (Some(index), _, _) => index,
                (None, Some(col), Some(row)) => row * doc.atlas_columns + col,
                _ => {
                    warn!(
                        "pattern table entry '{}' has neither index nor col/row, skipping",
                        entry.kind
                    );
                    continue;
                }
            };
            if index >= index_limit {
                warn!(
                    "pattern table entry '{}' index {} outside [0, {}), skipping",
                    entry.kind, index, index_limit
                );
                continue;
            }
            table.insert(&entry.kind, index, entry.pattern);
        }

        table
    }

    /// Parses and builds a table from a JSON reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, serde_json::Error> {
        let doc: PatternTableDoc = serde_json::from_reader(reader)?;
        Ok(Self::from_document(&doc))
    }

    /// The built-in table installed when no external source is available:
    /// all 16 cardinal patterns plus three floor variants.
    pub fn fallback() -> Self {
        let mut table = Self {
            atlas_columns: DEFAULT_ATLAS_COLUMNS,
            name_to_index: HashMap::new(),
            pattern_to_index: HashMap::new(),
            wall_indices: HashSet::new(),
        };
        for (index, (name, pattern)) in FALLBACK_WALL_PATTERNS.iter().enumerate() {
            table.insert(name, index as u32, Some(*pattern));
        }
        let floor_base = FALLBACK_WALL_PATTERNS.len() as u32;
        for (offset, name) in FALLBACK_FLOOR_NAMES.iter().enumerate() {
            table.insert(name, floor_base + offset as u32, None);
        }
        table
    }

    fn insert(&mut self, name: &str, index: u32, pattern: Option<u8>) {
        self.name_to_index.insert(name.to_string(), index);
        if let Some(pattern) = pattern {
            self.pattern_to_index.insert(pattern & CARDINAL_MASK, index);
        }
        if !name.starts_with(FLOOR_PREFIX) {
            self.wall_indices.insert(index);
        }
    }

    /// Atlas width this table was resolved against.
    pub fn atlas_columns(&self) -> u32 {
        self.atlas_columns
    }

    /// Whether the index belongs to the wall-index set.
    pub fn is_wall_index(&self, index: u32) -> bool {
        self.wall_indices.contains(&index)
    }

    /// Whether the index carries a `floor_`-prefixed symbolic name.
    pub fn is_floor_index(&self, index: u32) -> bool {
        self.name_to_index
            .iter()
            .any(|(name, &i)| i == index && name.starts_with(FLOOR_PREFIX))
    }

    /// Symbolic name lookup. Absent names silently resolve to 0, the
    /// "isolated" tile; callers rely on this permissiveness.
    pub fn index_for_name(&self, name: &str) -> u32 {
        self.name_to_index.get(name).copied().unwrap_or(0)
    }

    /// All indices whose symbolic name is `floor_`-prefixed, sorted.
    pub fn floor_indices(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .name_to_index
            .iter()
            .filter(|(name, _)| name.starts_with(FLOOR_PREFIX))
            .map(|(_, &index)| index)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Tile index answering for the given neighbor mask. The full 8-bit
    /// mask is reduced to its cardinal subset; unmapped combinations fall
    /// back to the "isolated" tile.
    pub fn index_for_pattern(&self, mask: u8) -> u32 {
        match self.pattern_to_index.get(&(mask & CARDINAL_MASK)) {
            Some(&index) => index,
            None => {
                warn!(
                    "no tile mapped for cardinal pattern {:#04x}, using isolated",
                    mask & CARDINAL_MASK
                );
                self.index_for_name("isolated")
            }
        }
    }
}

/// The 16 cardinal wall patterns of the fallback table, in index order.
const FALLBACK_WALL_PATTERNS: [(&str, u8); 16] = [
    ("isolated", 0),
    ("end_bottom", NORTH),
    ("end_left", EAST),
    ("end_top", SOUTH),
    ("end_right", WEST),
    ("vertical", NORTH | SOUTH),
    ("horizontal", EAST | WEST),
    ("corner_bl", NORTH | EAST),
    ("corner_br", NORTH | WEST),
    ("corner_tl", SOUTH | EAST),
    ("corner_tr", SOUTH | WEST),
    ("tee_e", NORTH | EAST | SOUTH),
    ("tee_w", NORTH | SOUTH | WEST),
    ("tee_n", NORTH | EAST | WEST),
    ("tee_s", EAST | SOUTH | WEST),
    ("cross", NORTH | EAST | SOUTH | WEST),
];

/// Floor variants of the fallback table, appended after the wall patterns.
const FALLBACK_FLOOR_NAMES: [&str; 3] = ["floor_basic", "floor_cracked", "floor_mossy"];
