//! The level: a fixed 15x11 grid of tiles the bomber walks around in.
//!
//! Layouts are plain text, one character per cell:
//!
//! | char | tile  | notes                               |
//! |------|-------|-------------------------------------|
//! | `.`  | empty |                                     |
//! | `#`  | block | impassable, survives blasts         |
//! | `%`  | crate | impassable, destroyed by a blast    |
//! | `1`  | start | where the bomber spawns (exactly 1) |
//! | `X`  | exit  | the goal (exactly 1)                |

use bevy::{prelude::*, sprite::Anchor};
use std::fs;

use super::geometry::{Rect, draw_depth, to_world};
use crate::{config::GameConfig, screens::Screen, theme::palette};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CurrentLevel>();
    app.add_message::<CrateDestroyed>();

    app.add_systems(
        Update,
        despawn_destroyed_crates.run_if(in_state(Screen::Gameplay)),
    );
}

/// Number of columns in a level.
pub const LEVEL_WIDTH: usize = 15;

/// Number of rows in a level.
pub const LEVEL_HEIGHT: usize = 11;

/// Longest ray a blast can have: it crosses the whole grid.
pub const MAX_BLAST_RANGE: u32 = LEVEL_WIDTH as u32;

/// Width of one cell in pixels.
pub const CELL_WIDTH: i32 = 40;

/// Height of one cell in pixels.
pub const CELL_HEIGHT: i32 = 36;

/// Screen position of the top-left corner of cell (0, 0).
pub const GRID_ORIGIN: IVec2 = IVec2::new(20, 40);

/// The layout used when no level file is configured.
pub const DEFAULT_LAYOUT: &str = "\
1.............%
.######.######.
.#.....%.....#.
.#...........#.
.#############.
...%.......%...
.....#...#.....
...............
..#....%...#...
..%.........%..
..............X
";

/// What occupies a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum Tile {
    #[default]
    Empty,
    Block,
    Crate,
    Start,
    Exit,
}

impl Tile {
    fn from_char(tile: char) -> Option<Self> {
        match tile {
            '.' => Some(Tile::Empty),
            '#' => Some(Tile::Block),
            '%' => Some(Tile::Crate),
            '1' => Some(Tile::Start),
            'X' => Some(Tile::Exit),
            _ => None,
        }
    }

    fn to_char(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Block => '#',
            Tile::Crate => '%',
            Tile::Start => '1',
            Tile::Exit => 'X',
        }
    }

    /// Whether the bomber is kept out of this tile.
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Block | Tile::Crate)
    }
}

/// Why a layout could not be turned into a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// A line is not as long as the first one.
    LineLength {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// The layout is not 15x11.
    Dimensions { width: usize, height: usize },
    UnknownTile { tile: char, x: usize, y: usize },
    MissingStart,
    DuplicateStart { x: usize, y: usize },
    MissingExit,
    DuplicateExit { x: usize, y: usize },
    /// The level file could not be read.
    Io(String),
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::LineLength {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {} is {} characters long, expected {}",
                line, found, expected
            ),
            LevelError::Dimensions { width, height } => write!(
                f,
                "level is {}x{}, expected {}x{}",
                width, height, LEVEL_WIDTH, LEVEL_HEIGHT
            ),
            LevelError::UnknownTile { tile, x, y } => {
                write!(f, "unsupported tile '{}' at ({}, {})", tile, x, y)
            }
            LevelError::MissingStart => write!(f, "a level must have a starting point"),
            LevelError::DuplicateStart { x, y } => {
                write!(f, "second starting point at ({}, {})", x, y)
            }
            LevelError::MissingExit => write!(f, "a level must have an exit"),
            LevelError::DuplicateExit { x, y } => write!(f, "second exit at ({}, {})", x, y),
            LevelError::Io(msg) => write!(f, "could not read level: {}", msg),
        }
    }
}

impl std::error::Error for LevelError {}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::Io(e.to_string())
    }
}

/// The cells reached by one explosion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blast {
    /// Every cell the blast covers, origin first.
    pub cells: Vec<UVec2>,
    /// Crates hit by the blast (also listed in `cells`).
    pub crates: Vec<UVec2>,
}

/// A parsed level grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    tiles: Vec<Tile>,
    start: UVec2,
    exit: UVec2,
}

impl Default for Level {
    fn default() -> Self {
        Level::parse(DEFAULT_LAYOUT).expect("built-in level layout is valid")
    }
}

impl Level {
    /// Parse a text layout.
    pub fn parse(layout: &str) -> Result<Self, LevelError> {
        let lines: Vec<&str> = layout
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        let lines = match lines.iter().rposition(|line| !line.is_empty()) {
            Some(last) => &lines[..=last],
            None => &[][..],
        };

        let width = lines.first().map(|line| line.chars().count()).unwrap_or(0);
        for (index, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(LevelError::LineLength {
                    line: index + 1,
                    expected: width,
                    found,
                });
            }
        }

        if width != LEVEL_WIDTH || lines.len() != LEVEL_HEIGHT {
            return Err(LevelError::Dimensions {
                width,
                height: lines.len(),
            });
        }

        let mut tiles = Vec::with_capacity(LEVEL_WIDTH * LEVEL_HEIGHT);
        let mut start = None;
        let mut exit = None;

        for (y, line) in lines.iter().enumerate() {
            for (x, tile) in line.chars().enumerate() {
                let parsed = Tile::from_char(tile).ok_or(LevelError::UnknownTile { tile, x, y })?;
                let cell = UVec2::new(x as u32, y as u32);
                match parsed {
                    Tile::Start if start.is_some() => {
                        return Err(LevelError::DuplicateStart { x, y });
                    }
                    Tile::Start => start = Some(cell),
                    Tile::Exit if exit.is_some() => {
                        return Err(LevelError::DuplicateExit { x, y });
                    }
                    Tile::Exit => exit = Some(cell),
                    _ => {}
                }
                tiles.push(parsed);
            }
        }

        Ok(Self {
            tiles,
            start: start.ok_or(LevelError::MissingStart)?,
            exit: exit.ok_or(LevelError::MissingExit)?,
        })
    }

    /// Read and parse a layout file.
    pub fn load(path: &str) -> Result<Self, LevelError> {
        let layout = fs::read_to_string(path)?;
        Self::parse(&layout)
    }

    fn index(cell: UVec2) -> Option<usize> {
        let (x, y) = (cell.x as usize, cell.y as usize);
        (x < LEVEL_WIDTH && y < LEVEL_HEIGHT).then_some(y * LEVEL_WIDTH + x)
    }

    /// The tile at a cell, `None` outside the grid.
    pub fn tile(&self, cell: UVec2) -> Option<Tile> {
        Self::index(cell).map(|i| self.tiles[i])
    }

    pub fn start(&self) -> UVec2 {
        self.start
    }

    pub fn exit(&self) -> UVec2 {
        self.exit
    }

    /// Screen rectangle covered by a cell.
    pub fn cell_bounds(cell: UVec2) -> Rect {
        Rect::new(
            GRID_ORIGIN.x + CELL_WIDTH * cell.x as i32,
            GRID_ORIGIN.y + CELL_HEIGHT * cell.y as i32,
            CELL_WIDTH,
            CELL_HEIGHT,
        )
    }

    /// The cell under a screen point, if the point is on the grid.
    pub fn cell_at(point: Vec2) -> Option<UVec2> {
        let x = ((point.x - GRID_ORIGIN.x as f32) / CELL_WIDTH as f32).floor();
        let y = ((point.y - GRID_ORIGIN.y as f32) / CELL_HEIGHT as f32).floor();
        if x < 0.0 || y < 0.0 || x >= LEVEL_WIDTH as f32 || y >= LEVEL_HEIGHT as f32 {
            return None;
        }
        Some(UVec2::new(x as u32, y as u32))
    }

    /// Screen rectangle covered by the whole grid.
    pub fn pixel_bounds() -> Rect {
        Rect::new(
            GRID_ORIGIN.x,
            GRID_ORIGIN.y,
            CELL_WIDTH * LEVEL_WIDTH as i32,
            CELL_HEIGHT * LEVEL_HEIGHT as i32,
        )
    }

    /// Iterate over every cell with its tile, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (UVec2, Tile)> + '_ {
        self.tiles.iter().enumerate().map(|(i, &tile)| {
            let cell = UVec2::new((i % LEVEL_WIDTH) as u32, (i / LEVEL_WIDTH) as u32);
            (cell, tile)
        })
    }

    /// Cells holding an impassable tile.
    pub fn solid_cells(&self) -> impl Iterator<Item = UVec2> + '_ {
        self.cells()
            .filter(|(_, tile)| tile.is_solid())
            .map(|(cell, _)| cell)
    }

    /// Bounds of every impassable tile.
    pub fn solid_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.solid_cells().map(Self::cell_bounds)
    }

    /// Whether a rectangle overlaps any impassable tile.
    pub fn collides(&self, rect: &Rect) -> bool {
        self.solid_rects().any(|solid| solid.intersects(rect))
    }

    /// Cells reached by a blast of the given range centred on `origin`.
    ///
    /// Each of the four rays stops before a block and stops on a crate.
    pub fn blast_cells(&self, origin: UVec2, range: u32) -> Blast {
        let range = range.min(MAX_BLAST_RANGE) as i32;
        let mut blast = Blast::default();
        let Some(origin_tile) = self.tile(origin) else {
            return blast;
        };
        blast.cells.push(origin);
        if origin_tile == Tile::Crate {
            blast.crates.push(origin);
        }

        for step in [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y] {
            for distance in 1..=range {
                let reached = origin.as_ivec2() + step * distance;
                if reached.x < 0 || reached.y < 0 {
                    break;
                }
                let cell = reached.as_uvec2();
                match self.tile(cell) {
                    None | Some(Tile::Block) => break,
                    Some(Tile::Crate) => {
                        blast.cells.push(cell);
                        blast.crates.push(cell);
                        break;
                    }
                    Some(_) => blast.cells.push(cell),
                }
            }
        }

        blast
    }

    /// Clear a crate. Returns false when the cell holds no crate.
    pub fn destroy_crate(&mut self, cell: UVec2) -> bool {
        match Self::index(cell) {
            Some(i) if self.tiles[i] == Tile::Crate => {
                self.tiles[i] = Tile::Empty;
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.tiles.chunks(LEVEL_WIDTH) {
            let line: String = row.iter().map(|tile| tile.to_char()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// The level being played.
#[derive(Resource, Debug, Default)]
pub struct CurrentLevel(pub Level);

/// Message sent when a blast clears a crate.
#[derive(Message, Debug, Clone)]
pub struct CrateDestroyed {
    pub cell: UVec2,
}

/// Sprite marker for a drawn tile.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct TileSprite {
    pub cell: UVec2,
    pub tile: Tile,
}

/// Build a fresh level for a new round, from the configured file if any.
pub fn load_level(mut level: ResMut<CurrentLevel>, config: Res<GameConfig>) {
    level.0 = match config.level_file.as_deref() {
        Some(path) => match Level::load(path) {
            Ok(loaded) => {
                info!("Loaded level from {}", path);
                loaded
            }
            Err(e) => {
                warn!("Failed to load level {}: {}, using the built-in level", path, e);
                Level::default()
            }
        },
        None => Level::default(),
    };

    debug!("Level layout:\n{}", level.0);
}

/// Spawn the floor and a sprite for every non-empty tile.
pub fn spawn_tiles(mut commands: Commands, level: Res<CurrentLevel>) {
    let floor = Level::pixel_bounds();
    commands.spawn((
        Name::new("Floor"),
        Sprite {
            color: palette::FLOOR,
            custom_size: Some(floor.size()),
            ..default()
        },
        Anchor::TOP_LEFT,
        Transform::from_translation(to_world(floor.position(), -1.0)),
        DespawnOnExit(Screen::Gameplay),
    ));

    let mut count = 0;
    for (cell, tile) in level.0.cells() {
        let color = match tile {
            Tile::Block => palette::BLOCK,
            Tile::Crate => palette::CRATE,
            Tile::Exit => palette::EXIT,
            Tile::Empty | Tile::Start => continue,
        };
        let bounds = Level::cell_bounds(cell);
        // The exit is floor decoration, so it sits below everything else.
        let z = if tile == Tile::Exit {
            -0.5
        } else {
            draw_depth(bounds.top())
        };

        commands.spawn((
            Name::new(format!("{:?} at ({}, {})", tile, cell.x, cell.y)),
            TileSprite { cell, tile },
            Sprite {
                color,
                custom_size: Some(bounds.size()),
                ..default()
            },
            Anchor::TOP_LEFT,
            Transform::from_translation(to_world(bounds.position(), z)),
            DespawnOnExit(Screen::Gameplay),
        ));
        count += 1;
    }

    info!("Spawned {} tiles", count);
}

fn despawn_destroyed_crates(
    mut commands: Commands,
    mut destroyed: MessageReader<CrateDestroyed>,
    tiles: Query<(Entity, &TileSprite)>,
) {
    for event in destroyed.read() {
        for (entity, sprite) in &tiles {
            if sprite.cell == event.cell && sprite.tile == Tile::Crate {
                commands.entity(entity).despawn();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_with(row: usize, line: &str) -> String {
        let mut rows: Vec<String> = DEFAULT_LAYOUT.lines().map(str::to_string).collect();
        rows[row] = line.to_string();
        rows.join("\n")
    }

    #[test]
    fn test_default_layout_parses() {
        let level = Level::default();
        assert_eq!(level.start(), UVec2::new(0, 0));
        assert_eq!(level.exit(), UVec2::new(14, 10));
        assert_eq!(level.tile(UVec2::new(1, 1)), Some(Tile::Block));
        assert_eq!(level.tile(UVec2::new(14, 0)), Some(Tile::Crate));
        assert_eq!(level.tile(UVec2::new(15, 0)), None);
    }

    #[test]
    fn test_display_roundtrips_layout() {
        let level = Level::default();
        assert_eq!(level.to_string(), DEFAULT_LAYOUT);
    }

    #[test]
    fn test_windows_line_endings_accepted() {
        let layout = DEFAULT_LAYOUT.replace('\n', "\r\n");
        assert_eq!(Level::parse(&layout), Ok(Level::default()));
    }

    #[test]
    fn test_ragged_line_rejected() {
        let layout = layout_with(3, ".#..");
        assert_eq!(
            Level::parse(&layout),
            Err(LevelError::LineLength {
                line: 4,
                expected: 15,
                found: 4
            })
        );
    }

    #[test]
    fn test_wrong_dimensions_rejected() {
        let layout: String = DEFAULT_LAYOUT.lines().take(10).collect::<Vec<_>>().join("\n");
        assert_eq!(
            Level::parse(&layout),
            Err(LevelError::Dimensions {
                width: 15,
                height: 10
            })
        );
    }

    #[test]
    fn test_unknown_tile_reports_position() {
        let layout = layout_with(7, ".......?.......");
        assert_eq!(
            Level::parse(&layout),
            Err(LevelError::UnknownTile {
                tile: '?',
                x: 7,
                y: 7
            })
        );
    }

    #[test]
    fn test_start_and_exit_must_be_unique() {
        let layout = layout_with(7, "......1........");
        assert_eq!(
            Level::parse(&layout),
            Err(LevelError::DuplicateStart { x: 6, y: 7 })
        );

        let layout = layout_with(0, "...............");
        assert_eq!(Level::parse(&layout), Err(LevelError::MissingStart));

        let layout = layout_with(10, "...............");
        assert_eq!(Level::parse(&layout), Err(LevelError::MissingExit));
    }

    #[test]
    fn test_cell_mapping() {
        assert_eq!(Level::cell_bounds(UVec2::new(1, 2)), Rect::new(60, 112, 40, 36));
        assert_eq!(Level::cell_at(Vec2::new(60.0, 112.0)), Some(UVec2::new(1, 2)));
        assert_eq!(Level::cell_at(Vec2::new(99.9, 147.9)), Some(UVec2::new(1, 2)));
        assert_eq!(Level::cell_at(Vec2::new(19.0, 50.0)), None);
        assert_eq!(Level::cell_at(Vec2::new(620.0, 50.0)), None);
        assert_eq!(Level::pixel_bounds(), Rect::new(20, 40, 600, 396));
    }

    #[test]
    fn test_collides_with_solid_tiles_only() {
        let level = Level::default();
        // Inside the start cell.
        assert!(!level.collides(&Rect::new(23, 46, 33, 23)));
        // Overlapping the block at (1, 1).
        assert!(level.collides(&Rect::new(50, 80, 33, 23)));
        // Touching the block's left edge is not a collision.
        assert!(!level.collides(&Rect::new(27, 76, 33, 23)));
        // The exit is passable.
        assert!(!level.collides(&Level::cell_bounds(level.exit())));
    }

    #[test]
    fn test_blast_stops_at_blocks_and_crates() {
        let level = Level::default();
        // (7, 1) has blocks left and right, a crate below and open floor above.
        let blast = level.blast_cells(UVec2::new(7, 1), 2);
        assert_eq!(
            blast.cells,
            vec![UVec2::new(7, 1), UVec2::new(7, 2), UVec2::new(7, 0)]
        );
        assert_eq!(blast.crates, vec![UVec2::new(7, 2)]);
    }

    #[test]
    fn test_blast_clipped_at_grid_edge() {
        let level = Level::default();
        let blast = level.blast_cells(UVec2::new(0, 0), 1);
        assert_eq!(
            blast.cells,
            vec![UVec2::new(0, 0), UVec2::new(1, 0), UVec2::new(0, 1)]
        );
        assert!(blast.crates.is_empty());
    }

    #[test]
    fn test_huge_blast_range_reaches_like_full_range() {
        let level = Level::default();
        let blast = level.blast_cells(UVec2::new(0, 0), u32::MAX);
        assert_eq!(blast, level.blast_cells(UVec2::new(0, 0), MAX_BLAST_RANGE));
        assert!(blast.cells.contains(&UVec2::new(1, 0)));
        assert!(blast.cells.contains(&UVec2::new(0, 1)));
    }

    #[test]
    fn test_destroy_crate() {
        let mut level = Level::default();
        let solid_before = level.solid_cells().count();
        assert!(level.destroy_crate(UVec2::new(14, 0)));
        assert_eq!(level.tile(UVec2::new(14, 0)), Some(Tile::Empty));
        assert_eq!(level.solid_cells().count(), solid_before - 1);
        assert!(!level.destroy_crate(UVec2::new(14, 0)));
        assert!(!level.destroy_crate(UVec2::new(1, 1)));
    }
}
