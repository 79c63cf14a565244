//! Text level parsing.
//!
//! A level source is a whitespace-separated token stream: grid dimensions,
//! the avatar record, `height` rows of one-letter terrain codes (first row
//! topmost), then any number of monster spawn records. Truncated or
//! non-numeric input is a fatal load error; unrecognized terrain, monster,
//! and move-mode codes are permissive defaults instead.

use std::str::SplitWhitespace;
use std::time::Duration;

use thiserror::Error;
use torchlit_core::{GridPos, MonsterKind, MoveMode, TerrainKind};

/// Avatar starting record read from a level source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvatarSpawn {
    /// Starting position.
    pub pos: GridPos,
    /// Starting hit points.
    pub hit_points: i32,
    /// Damage dealt per attack.
    pub attack_damage: i32,
    /// Starting torch radius.
    pub torch_radius: f64,
}

/// Monster spawn record read from a level source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterSpawn {
    /// Species decoded from the spawn code.
    pub kind: MonsterKind,
    /// Starting position.
    pub pos: GridPos,
    /// Starting hit points.
    pub hit_points: i32,
    /// Damage dealt per attack.
    pub attack_damage: i32,
    /// Delay between successive movement ticks.
    pub move_interval: Duration,
    /// Initial movement strategy.
    pub move_mode: MoveMode,
    /// Distance at which a passive monster turns pursuer.
    pub aggro_radius: f64,
}

/// Parsed level ready to construct a world.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    width: u32,
    height: u32,
    avatar: AvatarSpawn,
    terrain: Vec<TerrainKind>,
    monsters: Vec<MonsterSpawn>,
}

impl Level {
    /// Parses a level from its textual source.
    ///
    /// # Errors
    ///
    /// Returns a [`LevelError`] when the source is truncated, holds a
    /// non-numeric value, describes an empty grid, or places an actor
    /// outside the grid.
    pub fn parse(source: &str) -> Result<Self, LevelError> {
        let mut tokens = Tokens::new(source);

        let width = tokens.next_u32("grid width")?;
        let height = tokens.next_u32("grid height")?;
        if width == 0 || height == 0 {
            return Err(LevelError::EmptyGrid { width, height });
        }

        let avatar = AvatarSpawn {
            pos: GridPos::new(tokens.next_u32("avatar x")?, tokens.next_u32("avatar y")?),
            hit_points: tokens.next_i32("avatar hit points")?,
            attack_damage: tokens.next_i32("avatar attack damage")?,
            torch_radius: tokens.next_f64("avatar torch radius")?,
        };
        if avatar.pos.x() >= width || avatar.pos.y() >= height {
            return Err(LevelError::SpawnOutOfBounds {
                actor: "avatar",
                x: avatar.pos.x(),
                y: avatar.pos.y(),
                width,
                height,
            });
        }

        // The first file row describes the top of the grid, so rows land
        // at y = height - 1 downward.
        let cell_count = width as usize * height as usize;
        let mut terrain = vec![TerrainKind::Grass; cell_count];
        for row in 0..height {
            let y = height - 1 - row;
            for x in 0..width {
                let code = tokens.next("terrain code")?;
                terrain[y as usize * width as usize + x as usize] = TerrainKind::from_code(code);
            }
        }

        let mut monsters = Vec::new();
        while !tokens.is_empty() {
            let kind = MonsterKind::from_code(tokens.next("monster code")?);
            let pos = GridPos::new(tokens.next_u32("monster x")?, tokens.next_u32("monster y")?);
            if pos.x() >= width || pos.y() >= height {
                return Err(LevelError::SpawnOutOfBounds {
                    actor: "monster",
                    x: pos.x(),
                    y: pos.y(),
                    width,
                    height,
                });
            }
            monsters.push(MonsterSpawn {
                kind,
                pos,
                hit_points: tokens.next_i32("monster hit points")?,
                attack_damage: tokens.next_i32("monster attack damage")?,
                move_interval: Duration::from_millis(tokens.next_u64("monster move interval")?),
                move_mode: MoveMode::from_code(tokens.next("monster move mode")?),
                aggro_radius: tokens.next_f64("monster aggro radius")?,
            });
        }

        Ok(Self {
            width,
            height,
            avatar,
            terrain,
            monsters,
        })
    }

    /// Width of the described grid in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the described grid in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Avatar starting record.
    #[must_use]
    pub const fn avatar(&self) -> AvatarSpawn {
        self.avatar
    }

    /// Terrain kinds laid out row-major, row zero first.
    #[must_use]
    pub fn terrain(&self) -> &[TerrainKind] {
        &self.terrain
    }

    /// Monster spawn records in file order.
    #[must_use]
    pub fn monsters(&self) -> &[MonsterSpawn] {
        &self.monsters
    }
}

/// Errors raised while parsing a level source.
#[derive(Debug, PartialEq, Error)]
pub enum LevelError {
    /// The token stream ended before the named field was read.
    #[error("level source ended while reading {0}")]
    UnexpectedEnd(&'static str),
    /// A field held a value that does not parse as the expected number.
    #[error("invalid value {value:?} for {field}")]
    InvalidValue {
        /// Field being read when the failure occurred.
        field: &'static str,
        /// Offending token.
        value: String,
    },
    /// The grid dimensions describe zero cells.
    #[error("grid dimensions {width}x{height} describe an empty level")]
    EmptyGrid {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
    /// An actor spawn lies outside the declared grid.
    #[error("{actor} spawn at ({x}, {y}) lies outside the {width}x{height} grid")]
    SpawnOutOfBounds {
        /// Which actor record was out of range.
        actor: &'static str,
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
}

struct Tokens<'a> {
    iter: std::iter::Peekable<SplitWhitespace<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            iter: source.split_whitespace().peekable(),
        }
    }

    fn is_empty(&mut self) -> bool {
        self.iter.peek().is_none()
    }

    fn next(&mut self, field: &'static str) -> Result<&'a str, LevelError> {
        self.iter.next().ok_or(LevelError::UnexpectedEnd(field))
    }

    fn next_u32(&mut self, field: &'static str) -> Result<u32, LevelError> {
        let token = self.next(field)?;
        token.parse().map_err(|_| LevelError::InvalidValue {
            field,
            value: token.to_owned(),
        })
    }

    fn next_u64(&mut self, field: &'static str) -> Result<u64, LevelError> {
        let token = self.next(field)?;
        token.parse().map_err(|_| LevelError::InvalidValue {
            field,
            value: token.to_owned(),
        })
    }

    fn next_i32(&mut self, field: &'static str) -> Result<i32, LevelError> {
        let token = self.next(field)?;
        token.parse().map_err(|_| LevelError::InvalidValue {
            field,
            value: token.to_owned(),
        })
    }

    fn next_f64(&mut self, field: &'static str) -> Result<f64, LevelError> {
        let token = self.next(field)?;
        token.parse().map_err(|_| LevelError::InvalidValue {
            field,
            value: token.to_owned(),
        })
    }
}
