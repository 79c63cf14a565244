#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-monster movement policy.
//!
//! The policy is a pure decision function: it reads a consistent world
//! snapshot and proposes at most one target cell for the tick. It never
//! moves anything itself; committing the proposal (and resolving conflicts
//! with other actors) is the world's job. The scheduler calls [`propose`]
//! once per monster tick inside the world's read closure.

use rand::seq::SliceRandom;
use rand::Rng;
use torchlit_core::{Direction, GridPos, MonsterId, MoveMode};
use torchlit_world::{next_step, query, World};

/// Outcome of one policy tick for a live monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proposal {
    /// Cell the monster wants to occupy, or `None` to hold position.
    pub target: Option<GridPos>,
    /// Movement mode in effect after this tick. Differs from the
    /// monster's current mode only when a passive monster upgraded to
    /// pursuit; the caller commits the change through the world.
    pub mode: MoveMode,
}

/// Decides the monster's move for one tick.
///
/// Returns `None` once the monster has left play, signalling its driver
/// to stop. Otherwise the proposal reflects the monster's mode:
///
/// - `Still` holds position every tick.
/// - `Random` picks one of the four directions uniformly and proposes
///   the neighbor only when it is passable; there is no retry within the
///   tick. When the picked cell lies at or beyond the monster's aggro
///   radius from the avatar, the monster upgrades to `Aggro` permanently
///   and pursues immediately.
/// - `Aggro` and `N` propose the next step of a shortest path toward the
///   avatar, or hold position when no route exists.
#[must_use]
pub fn propose<R: Rng + ?Sized>(world: &World, id: MonsterId, rng: &mut R) -> Option<Proposal> {
    let monster = query::monster_snapshot(world, id)?;
    let avatar = world.avatar().pos();

    let proposal = match monster.move_mode {
        MoveMode::Still => Proposal {
            target: None,
            mode: MoveMode::Still,
        },
        MoveMode::Aggro | MoveMode::N => Proposal {
            target: next_step(world.grid(), monster.pos, avatar, rng),
            mode: monster.move_mode,
        },
        MoveMode::Random => {
            let candidate = random_neighbor(monster.pos, rng);
            match candidate {
                Some(cell) if cell.distance_to(avatar) >= monster.aggro_radius => {
                    // Permanent upgrade; the first pursuit step happens
                    // this very tick.
                    Proposal {
                        target: next_step(world.grid(), monster.pos, avatar, rng),
                        mode: MoveMode::Aggro,
                    }
                }
                Some(cell) if world.grid().is_passable(cell) => Proposal {
                    target: Some(cell),
                    mode: MoveMode::Random,
                },
                _ => Proposal {
                    target: None,
                    mode: MoveMode::Random,
                },
            }
        }
    };
    Some(proposal)
}

fn random_neighbor<R: Rng + ?Sized>(pos: GridPos, rng: &mut R) -> Option<GridPos> {
    let direction = Direction::ALL.choose(rng)?;
    let (dx, dy) = direction.delta();
    pos.offset_by(dx, dy)
}
