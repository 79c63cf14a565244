//! Torch lighting over the dungeon floor.

use torchlit_core::{Direction, GridPos};

use crate::grid::Grid;

/// Relights the grid from `center`.
///
/// Every lit flag is first cleared, then a flood fill expands outward over
/// 4-neighbors, lighting exactly the cells whose Euclidean distance from
/// `center` is strictly less than `radius`. The fill never steps across a
/// cell at or beyond the radius, so light does not wrap around the torch
/// boundary.
///
/// The traversal runs on an explicit stack with the lit flags doubling as
/// the visited set; each cell is lit at most once regardless of grid size,
/// keeping stack usage bounded on large floors. Returns the number of lit
/// cells.
pub fn illuminate(grid: &mut Grid, center: GridPos, radius: f64) -> usize {
    grid.clear_lit();

    if !grid.contains(center) {
        return 0;
    }

    let mut lit = 0;
    let mut frontier = vec![center];

    while let Some(pos) = frontier.pop() {
        if grid.is_lit(pos) {
            continue;
        }
        if center.distance_to(pos) >= radius {
            continue;
        }

        grid.set_lit(pos, true);
        lit += 1;

        for direction in Direction::ALL {
            let (dx, dy) = direction.delta();
            let Some(neighbor) = pos.offset_by(dx, dy) else {
                continue;
            };
            if grid.contains(neighbor) && !grid.is_lit(neighbor) {
                frontier.push(neighbor);
            }
        }
    }

    lit
}
