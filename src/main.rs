//! # Warren CLI
//!
//! Generates a dungeon from a seed, prints an ASCII preview, and can save
//! the result as a declarative level document plus tile-grid resource.

use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use warren::config::{DEFAULT_DUNGEON_COLUMNS, DEFAULT_DUNGEON_ROWS};
use warren::{
    AutotileMapper, DungeonManager, PlannerConfig, TileGrid, TileSet, WarrenResult,
};

/// Command line arguments for the Warren dungeon generator.
#[derive(Parser, Debug)]
#[command(name = "warren")]
#[command(about = "Procedural dungeon generation and autotile mapping engine")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Dungeon width in tiles
    #[arg(long, default_value_t = DEFAULT_DUNGEON_COLUMNS)]
    columns: u32,

    /// Dungeon height in tiles
    #[arg(long, default_value_t = DEFAULT_DUNGEON_ROWS)]
    rows: u32,

    /// Autotile pattern table document (falls back to the built-in table)
    #[arg(long)]
    pattern_table: Option<PathBuf>,

    /// Save the generated level document to this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Tile-grid resource name written next to the level document
    #[arg(long, default_value = "tilemap.json")]
    tilemap_name: String,
}

fn main() -> WarrenResult<()> {
    env_logger::init();
    let args = Args::parse();

    info!("Warren v{} starting, seed {}", warren::VERSION, args.seed);

    let mut mapper = AutotileMapper::new();
    match &args.pattern_table {
        Some(path) => {
            info!("loading pattern table from {}", path.display());
            mapper.initialize_from_reader(BufReader::new(File::open(path)?))?;
        }
        None => mapper.initialize_fallback()?,
    }

    let config = PlannerConfig::new(args.seed);
    let mut rng = config.create_rng();
    let mut manager = DungeonManager::new();
    manager.generate_basic_dungeon(args.columns, args.rows, &config, &mapper, &mut rng)?;

    if let Some(grid) = manager.grid() {
        print_preview(grid, &manager);
    }

    if let Some((x, y)) = manager.player_start() {
        println!("player start: ({x:.0}, {y:.0}) px");
    }
    println!(
        "{} rooms, {} corridor segments, {} elements",
        manager.rooms().len(),
        manager.corridors().len(),
        manager.registry().len()
    );

    if let Some(output) = &args.output {
        manager.save_level(output, &args.tilemap_name)?;
        info!("level saved to {}", output.display());
    }

    Ok(())
}

/// Prints a glyph-per-cell preview: walls `#`, floors `.`, elements by
/// their type tag's first letter.
fn print_preview(grid: &TileGrid, manager: &DungeonManager) {
    let mut glyphs: Vec<Vec<char>> = (0..grid.rows())
        .map(|row| {
            (0..grid.columns())
                .map(|column| {
                    match grid.get(column as i32, row as i32).map(|c| c.tileset) {
                        Some(TileSet::Floor) => '.',
                        _ => '#',
                    }
                })
                .collect()
        })
        .collect();

    for element in manager.registry().elements() {
        let (column, row) = element.cell();
        if grid.in_bounds(column, row) {
            let glyph = element
                .type_tag()
                .chars()
                .next()
                .unwrap_or('?')
                .to_ascii_uppercase();
            glyphs[row as usize][column as usize] = glyph;
        }
    }

    for line in glyphs {
        println!("{}", line.into_iter().collect::<String>());
    }
}
