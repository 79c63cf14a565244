#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Torchlit dungeon simulation.
//!
//! This crate defines the leaf vocabulary used by every other workspace
//! member: grid coordinates, terrain kinds with their passability and hazard
//! rules, monster identity and movement modes, and the discrete intents the
//! input adapter translates into world operations. It deliberately owns no
//! mutable state; the authoritative world lives in `torchlit-world`.

use serde::{Deserialize, Serialize};

/// Fixed damage applied to any actor occupying a hazardous cell.
pub const HAZARD_DAMAGE: i32 = 2;

/// Fixed increment applied by a single torch adjustment.
pub const TORCH_DELTA: f64 = 0.5;

/// Lower bound the torch radius never drops below.
pub const TORCH_FLOOR: f64 = 2.0;

/// Number of cells covered by a dash move in the facing direction.
pub const DASH_CELLS: i64 = 4;

/// Terrain kind occupying a single grid cell, fixed at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Cleared walkway.
    Path,
    /// Molten ground; walkable but harmful.
    Lava,
    /// Open water.
    Water,
    /// Dense shrubbery.
    Bush,
    /// Grave marker.
    Tombstone,
    /// Plain grassland.
    Grass,
    /// Boulder.
    Rock,
    /// Stone wall seen from above.
    StoneWall,
    /// Stone wall facing the viewer.
    StoneWallFront,
    /// Wooden crate.
    Crate,
}

impl TerrainKind {
    /// Decodes a one-letter level code into a terrain kind.
    ///
    /// Unrecognized codes deliberately fall back to [`TerrainKind::Grass`]
    /// rather than failing the load.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "P" => Self::Path,
            "L" => Self::Lava,
            "W" => Self::Water,
            "B" => Self::Bush,
            "G" => Self::Grass,
            "R" => Self::Rock,
            "S" => Self::StoneWall,
            "F" => Self::StoneWallFront,
            "T" => Self::Tombstone,
            "C" => Self::Crate,
            _ => Self::Grass,
        }
    }

    /// Reports whether an actor may occupy a cell of this kind.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        matches!(self, Self::Path | Self::Grass | Self::Lava)
    }

    /// Damage dealt to an actor occupying a cell of this kind.
    #[must_use]
    pub const fn hazard_damage(self) -> i32 {
        match self {
            Self::Lava => HAZARD_DAMAGE,
            _ => 0,
        }
    }
}

/// Location of a single grid cell expressed as x and y coordinates.
///
/// The y axis grows upward: row zero sits at the bottom of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    x: u32,
    y: u32,
}

impl GridPos {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell, counted from the bottom.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance_to(self, other: GridPos) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Applies a signed offset, yielding `None` when either coordinate
    /// would drop below zero. Upper bounds are the grid's concern.
    #[must_use]
    pub fn offset_by(self, dx: i64, dy: i64) -> Option<GridPos> {
        let x = i64::from(self.x).checked_add(dx)?;
        let y = i64::from(self.y).checked_add(dy)?;
        if x < 0 || y < 0 {
            return None;
        }
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        Some(GridPos::new(x, y))
    }
}

/// Cardinal directions an actor may face or move toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward increasing row indices.
    Up,
    /// Toward decreasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Direction {
    /// Unit offset of the direction as `(dx, dy)`.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// All four directions in a fixed order.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];
}

/// Unique identifier assigned to a monster at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Species of a monster, fixed at spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Animated bones.
    Skeleton,
    /// Shambling corpse.
    Zombie,
    /// Cave bat.
    Bat,
    /// Hulking brute.
    Gork,
    /// Whirling hazard.
    Tornado,
    /// Silent assassin.
    Ninja,
    /// Fallback for unrecognized spawn codes.
    Invalid,
}

impl MonsterKind {
    /// Decodes a two-letter spawn code, case-insensitively.
    ///
    /// Unrecognized codes fall back to [`MonsterKind::Invalid`] rather than
    /// failing the load.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "SK" => Self::Skeleton,
            "ZB" => Self::Zombie,
            "BT" => Self::Bat,
            "GK" => Self::Gork,
            "TO" => Self::Tornado,
            "NJ" => Self::Ninja,
            _ => Self::Invalid,
        }
    }
}

/// Movement strategy a monster currently follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveMode {
    /// Undirected walk: one uniformly random direction per tick.
    Random,
    /// Never proposes a move.
    Still,
    /// Shortest-path pursuit of the avatar.
    Aggro,
    /// Alternate pursuit ruleset selected by the `N` move code.
    N,
}

impl MoveMode {
    /// Decodes a move-mode code, case-insensitively.
    ///
    /// Unrecognized codes fall back to [`MoveMode::Still`] rather than
    /// failing the load.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "AGGRO" => Self::Aggro,
            "RANDOM" => Self::Random,
            "STILL" => Self::Still,
            "N" => Self::N,
            _ => Self::Still,
        }
    }

    /// Reports whether the mode pursues the avatar via pathfinding.
    #[must_use]
    pub const fn is_pursuit(self) -> bool {
        matches!(self, Self::Aggro | Self::N)
    }
}

/// Discrete action requested by the input adapter on the avatar's behalf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerIntent {
    /// Step one cell upward.
    MoveUp,
    /// Step one cell downward.
    MoveDown,
    /// Step one cell to the left.
    MoveLeft,
    /// Step one cell to the right.
    MoveRight,
    /// Widen the torch radius by one increment.
    IncreaseTorch,
    /// Narrow the torch radius by one increment.
    DecreaseTorch,
    /// Leap several cells in the current facing direction.
    Dash,
}
