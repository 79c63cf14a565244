//! Dense tile storage for the dungeon floor.

use thiserror::Error;
use torchlit_core::{GridPos, TerrainKind};

/// Single tile of the dungeon floor.
///
/// The terrain kind never changes after construction; the lit flag is
/// rewritten by every lighting pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    kind: TerrainKind,
    lit: bool,
}

impl Cell {
    pub(crate) const fn new(kind: TerrainKind) -> Self {
        Self { kind, lit: false }
    }

    /// Terrain kind occupying the cell.
    #[must_use]
    pub const fn kind(&self) -> TerrainKind {
        self.kind
    }

    /// Reports whether the cell is currently illuminated.
    #[must_use]
    pub const fn is_lit(&self) -> bool {
        self.lit
    }
}

/// Error raised when a coordinate pair lies outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("coordinates ({x}, {y}) lie outside the {width}x{height} grid")]
pub struct OutOfBounds {
    /// Requested column.
    pub x: u32,
    /// Requested row.
    pub y: u32,
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
}

/// Rectangular dungeon floor owning every cell, indexed bottom-up in
/// row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid from terrain kinds laid out row-major, row zero first.
    ///
    /// # Panics
    ///
    /// Panics when `kinds` does not hold exactly `width * height` entries.
    #[must_use]
    pub fn from_kinds(width: u32, height: u32, kinds: Vec<TerrainKind>) -> Self {
        let expected = width as usize * height as usize;
        assert_eq!(
            kinds.len(),
            expected,
            "terrain data must cover the full {width}x{height} grid"
        );
        Self {
            width,
            height,
            cells: kinds.into_iter().map(Cell::new).collect(),
        }
    }

    /// Width of the grid in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the position names a cell inside the grid.
    #[must_use]
    pub const fn contains(&self, pos: GridPos) -> bool {
        pos.x() < self.width && pos.y() < self.height
    }

    /// Borrows the cell at the provided position.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] when the position lies outside the grid;
    /// callers on the movement path bounds-check first and never hit this.
    pub fn cell_at(&self, pos: GridPos) -> Result<&Cell, OutOfBounds> {
        self.index(pos)
            .and_then(|index| self.cells.get(index))
            .ok_or(OutOfBounds {
                x: pos.x(),
                y: pos.y(),
                width: self.width,
                height: self.height,
            })
    }

    /// Reports whether an actor may occupy the cell. Out-of-range
    /// positions are never passable.
    #[must_use]
    pub fn is_passable(&self, pos: GridPos) -> bool {
        self.index(pos)
            .and_then(|index| self.cells.get(index))
            .is_some_and(|cell| cell.kind().is_passable())
    }

    /// Damage dealt to an actor occupying the cell; zero out of range.
    #[must_use]
    pub fn hazard_damage(&self, pos: GridPos) -> i32 {
        self.index(pos)
            .and_then(|index| self.cells.get(index))
            .map_or(0, |cell| cell.kind().hazard_damage())
    }

    /// Reports whether the cell is currently illuminated; unlit out of
    /// range.
    #[must_use]
    pub fn is_lit(&self, pos: GridPos) -> bool {
        self.index(pos)
            .and_then(|index| self.cells.get(index))
            .is_some_and(Cell::is_lit)
    }

    pub(crate) fn set_lit(&mut self, pos: GridPos, value: bool) {
        if let Some(index) = self.index(pos) {
            if let Some(cell) = self.cells.get_mut(index) {
                cell.lit = value;
            }
        }
    }

    pub(crate) fn clear_lit(&mut self) {
        for cell in &mut self.cells {
            cell.lit = false;
        }
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let x = usize::try_from(pos.x()).ok()?;
        let y = usize::try_from(pos.y()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }
}
