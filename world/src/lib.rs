#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Torchlit dungeon simulation.
//!
//! The [`World`] owns the grid, the avatar, and the monster roster, and
//! every cross-entity invariant is enforced inside its operations: no other
//! component mutates an actor position or a lit flag. [`SharedWorld`] wraps
//! the world in the single coarse lock that serializes those operations
//! across the per-monster movement threads and the externally driven
//! avatar. Combat is not a separate verb: it is the resolution of a move
//! into an occupied cell, so every conflict funnels through the same two
//! entry points.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use torchlit_core::{
    Direction, GridPos, MonsterId, MonsterKind, MoveMode, PlayerIntent, DASH_CELLS, TORCH_DELTA,
    TORCH_FLOOR,
};

mod grid;
mod level;
mod pathfinding;
mod visibility;

pub use grid::{Cell, Grid, OutOfBounds};
pub use level::{AvatarSpawn, Level, LevelError, MonsterSpawn};
pub use pathfinding::next_step;
pub use visibility::illuminate;

/// The player-controlled actor.
#[derive(Clone, Debug, PartialEq)]
pub struct Avatar {
    pos: GridPos,
    hit_points: i32,
    attack_damage: i32,
    torch_radius: f64,
    facing: Direction,
}

impl Avatar {
    /// Creates a new avatar facing downward.
    #[must_use]
    pub const fn new(pos: GridPos, hit_points: i32, attack_damage: i32, torch_radius: f64) -> Self {
        Self {
            pos,
            hit_points,
            attack_damage,
            torch_radius,
            facing: Direction::Down,
        }
    }

    /// Current position.
    #[must_use]
    pub const fn pos(&self) -> GridPos {
        self.pos
    }

    /// Remaining hit points; zero or below means dead.
    #[must_use]
    pub const fn hit_points(&self) -> i32 {
        self.hit_points
    }

    /// Damage dealt per attack.
    #[must_use]
    pub const fn attack_damage(&self) -> i32 {
        self.attack_damage
    }

    /// Current torch radius.
    #[must_use]
    pub const fn torch_radius(&self) -> f64 {
        self.torch_radius
    }

    /// Direction the avatar currently faces.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    fn incur_damage(&mut self, points: i32) {
        self.hit_points -= points;
    }

    fn increase_torch(&mut self) {
        self.torch_radius += TORCH_DELTA;
    }

    fn decrease_torch(&mut self) {
        self.torch_radius -= TORCH_DELTA;
        if self.torch_radius < TORCH_FLOOR {
            self.torch_radius = TORCH_FLOOR;
        }
    }
}

/// A single autonomous monster.
///
/// `pos == None` is the off-board sentinel: the monster has been removed
/// from play and never returns.
#[derive(Clone, Debug, PartialEq)]
pub struct Monster {
    id: MonsterId,
    kind: MonsterKind,
    pos: Option<GridPos>,
    hit_points: i32,
    attack_damage: i32,
    move_interval: Duration,
    move_mode: MoveMode,
    aggro_radius: f64,
}

impl Monster {
    /// Creates a new monster placed on the board.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        id: MonsterId,
        kind: MonsterKind,
        pos: GridPos,
        hit_points: i32,
        attack_damage: i32,
        move_interval: Duration,
        move_mode: MoveMode,
        aggro_radius: f64,
    ) -> Self {
        Self {
            id,
            kind,
            pos: Some(pos),
            hit_points,
            attack_damage,
            move_interval,
            move_mode,
            aggro_radius,
        }
    }

    /// Identifier assigned at load time.
    #[must_use]
    pub const fn id(&self) -> MonsterId {
        self.id
    }

    /// Species of the monster.
    #[must_use]
    pub const fn kind(&self) -> MonsterKind {
        self.kind
    }

    /// Current position, or `None` once removed from play.
    #[must_use]
    pub const fn pos(&self) -> Option<GridPos> {
        self.pos
    }

    /// Remaining hit points; zero or below means dead.
    #[must_use]
    pub const fn hit_points(&self) -> i32 {
        self.hit_points
    }

    /// Damage dealt per attack.
    #[must_use]
    pub const fn attack_damage(&self) -> i32 {
        self.attack_damage
    }

    /// Delay between successive movement ticks.
    #[must_use]
    pub const fn move_interval(&self) -> Duration {
        self.move_interval
    }

    /// Movement strategy currently in effect.
    #[must_use]
    pub const fn move_mode(&self) -> MoveMode {
        self.move_mode
    }

    /// Distance at which a passive monster turns pursuer.
    #[must_use]
    pub const fn aggro_radius(&self) -> f64 {
        self.aggro_radius
    }

    /// Reports whether the monster still participates in the simulation.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hit_points > 0
    }

    fn incur_damage(&mut self, points: i32) {
        self.hit_points -= points;
    }

    fn retire(&mut self) {
        self.pos = None;
    }
}

/// Aggregate root owning the grid, the avatar, and the monster roster.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    grid: Grid,
    avatar: Avatar,
    monsters: Vec<Monster>,
}

impl World {
    /// Creates a world from its parts and performs the initial lighting
    /// pass from the avatar's position.
    #[must_use]
    pub fn new(grid: Grid, avatar: Avatar, monsters: Vec<Monster>) -> Self {
        let mut world = Self {
            grid,
            avatar,
            monsters,
        };
        let _ = world.relight();
        world
    }

    /// Builds a world from a parsed level.
    #[must_use]
    pub fn from_level(level: &Level) -> Self {
        let grid = Grid::from_kinds(level.width(), level.height(), level.terrain().to_vec());
        let spawn = level.avatar();
        let avatar = Avatar::new(
            spawn.pos,
            spawn.hit_points,
            spawn.attack_damage,
            spawn.torch_radius,
        );
        let monsters = level
            .monsters()
            .iter()
            .enumerate()
            .map(|(index, spawn)| {
                Monster::new(
                    MonsterId::new(index as u32),
                    spawn.kind,
                    spawn.pos,
                    spawn.hit_points,
                    spawn.attack_damage,
                    spawn.move_interval,
                    spawn.move_mode,
                    spawn.aggro_radius,
                )
            })
            .collect();
        Self::new(grid, avatar, monsters)
    }

    /// Read-only access to the dungeon floor.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Read-only access to the avatar.
    #[must_use]
    pub const fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    /// Reports whether the avatar still has hit points left.
    #[must_use]
    pub const fn is_avatar_alive(&self) -> bool {
        self.avatar.hit_points() > 0
    }

    /// Number of monsters still participating in the simulation.
    #[must_use]
    pub fn alive_monster_count(&self) -> usize {
        self.monsters.iter().filter(|m| m.is_alive()).count()
    }

    /// Attempts to relocate a monster to `target`.
    ///
    /// Invalid targets (off-board, impassable, occupied by a live peer)
    /// are rejected silently. A dead monster is relocated to the off-board
    /// sentinel instead of moving. A target holding the avatar resolves as
    /// an attack: the avatar takes the monster's damage, the monster takes
    /// hazard damage from the cell it is standing on, and it stays put.
    /// A completed relocation applies the destination's hazard damage.
    pub fn move_monster(&mut self, id: MonsterId, target: GridPos) {
        if !self.grid.contains(target) {
            return;
        }

        let Some(index) = self.monsters.iter().position(|m| m.id() == id) else {
            return;
        };

        if self.monsters[index].hit_points() <= 0 {
            self.monsters[index].retire();
            return;
        }

        if !self.grid.is_passable(target) {
            return;
        }

        if self.avatar.pos() == target {
            let attack = self.monsters[index].attack_damage();
            self.avatar.incur_damage(attack);
            if let Some(current) = self.monsters[index].pos() {
                let hazard = self.grid.hazard_damage(current);
                if hazard > 0 {
                    self.monsters[index].incur_damage(hazard);
                }
            }
            return;
        }

        let contested = self
            .monsters
            .iter()
            .any(|m| m.id() != id && m.is_alive() && m.pos() == Some(target));
        if contested {
            return;
        }

        self.monsters[index].pos = Some(target);
        let hazard = self.grid.hazard_damage(target);
        if hazard > 0 {
            self.monsters[index].incur_damage(hazard);
        }
    }

    /// Attempts to relocate the avatar to `target`.
    ///
    /// Off-board and impassable targets are rejected silently. A target
    /// holding a live monster resolves as an attack: the monster takes the
    /// avatar's damage and the avatar stays put, taking no hazard damage
    /// that tick. A completed relocation applies the destination's hazard
    /// damage first.
    pub fn move_avatar(&mut self, target: GridPos) {
        if !self.grid.contains(target) {
            return;
        }
        if !self.grid.is_passable(target) {
            return;
        }

        if let Some(index) = self
            .monsters
            .iter()
            .position(|m| m.is_alive() && m.pos() == Some(target))
        {
            let attack = self.avatar.attack_damage();
            self.monsters[index].incur_damage(attack);
            return;
        }

        let hazard = self.grid.hazard_damage(target);
        if hazard > 0 {
            self.avatar.incur_damage(hazard);
        }
        self.avatar.pos = target;
    }

    /// Applies a discrete player intent and relights from the avatar.
    ///
    /// Directional intents update the facing even when the move itself is
    /// rejected. A dash is a single move attempt several cells out, not a
    /// sequence of steps; if the landing cell is invalid nothing happens.
    pub fn apply_intent(&mut self, intent: PlayerIntent) {
        match intent {
            PlayerIntent::MoveUp => self.step_avatar(Direction::Up, 1),
            PlayerIntent::MoveDown => self.step_avatar(Direction::Down, 1),
            PlayerIntent::MoveLeft => self.step_avatar(Direction::Left, 1),
            PlayerIntent::MoveRight => self.step_avatar(Direction::Right, 1),
            PlayerIntent::Dash => {
                let facing = self.avatar.facing();
                self.step_avatar(facing, DASH_CELLS);
            }
            PlayerIntent::IncreaseTorch => self.avatar.increase_torch(),
            PlayerIntent::DecreaseTorch => self.avatar.decrease_torch(),
        }
        let _ = self.relight();
    }

    /// Rewrites the lit set from the avatar's position and torch radius,
    /// returning the number of lit cells.
    pub fn relight(&mut self) -> usize {
        illuminate(&mut self.grid, self.avatar.pos(), self.avatar.torch_radius())
    }

    /// Replaces a monster's movement strategy. Used by the movement policy
    /// to commit the one-way upgrade from passive to pursuing.
    pub fn set_monster_mode(&mut self, id: MonsterId, mode: MoveMode) {
        if let Some(monster) = self.monsters.iter_mut().find(|m| m.id() == id) {
            monster.move_mode = mode;
        }
    }

    fn step_avatar(&mut self, direction: Direction, cells: i64) {
        self.avatar.facing = direction;
        let (dx, dy) = direction.delta();
        if let Some(target) = self.avatar.pos().offset_by(dx * cells, dy * cells) {
            self.move_avatar(target);
        }
    }

    fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.id() == id)
    }
}

/// Handle to the world behind the single coarse lock.
///
/// Every clone refers to the same world. Operations lock, mutate, and
/// release; none of them blocks on anything but the lock itself, so the
/// critical sections stay short. Per-cell or per-actor locking is
/// deliberately avoided: contention is low and one boundary is easier to
/// reason about.
#[derive(Clone, Debug)]
pub struct SharedWorld {
    inner: Arc<Mutex<World>>,
}

impl SharedWorld {
    /// Wraps a world in the shared lock.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// Serialized monster relocation; see [`World::move_monster`].
    pub fn move_monster(&self, id: MonsterId, target: GridPos) {
        self.lock().move_monster(id, target);
    }

    /// Serialized avatar relocation; see [`World::move_avatar`].
    pub fn move_avatar(&self, target: GridPos) {
        self.lock().move_avatar(target);
    }

    /// Serialized intent application, including the relight pass.
    pub fn apply_intent(&self, intent: PlayerIntent) {
        self.lock().apply_intent(intent);
    }

    /// Serialized movement-mode replacement.
    pub fn set_monster_mode(&self, id: MonsterId, mode: MoveMode) {
        self.lock().set_monster_mode(id, mode);
    }

    /// Reports whether the avatar still has hit points left.
    #[must_use]
    pub fn is_avatar_alive(&self) -> bool {
        self.lock().is_avatar_alive()
    }

    /// Number of monsters still participating in the simulation.
    #[must_use]
    pub fn alive_monster_count(&self) -> usize {
        self.lock().alive_monster_count()
    }

    /// Runs a read-only closure inside the critical section. Renderers
    /// and movement policies use this to observe a consistent world.
    pub fn with<T>(&self, f: impl FnOnce(&World) -> T) -> T {
        f(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, World> {
        // A thread that panicked mid-operation leaves the world in a state
        // that is still safe to read and reject moves against.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read-only snapshot queries consumed by renderers and systems.
pub mod query {
    use std::time::Duration;

    use torchlit_core::{Direction, GridPos, MonsterId, MonsterKind, MoveMode, TerrainKind};

    use super::World;

    /// Preferred viewport edge length in cells, clamped to the grid.
    pub const PREFERRED_WINDOW: u32 = 20;

    /// Rectangular window onto the grid, clamped to stay on-board and
    /// centered on the avatar as far as the edges allow.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Viewport {
        origin: GridPos,
        width: u32,
        height: u32,
    }

    impl Viewport {
        /// Bottom-left cell of the window.
        #[must_use]
        pub const fn origin(&self) -> GridPos {
            self.origin
        }

        /// Window width in cells.
        #[must_use]
        pub const fn width(&self) -> u32 {
            self.width
        }

        /// Window height in cells.
        #[must_use]
        pub const fn height(&self) -> u32 {
            self.height
        }
    }

    /// Immutable cell state captured for rendering.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CellSnapshot {
        /// Position of the cell on the grid.
        pub pos: GridPos,
        /// Terrain kind occupying the cell.
        pub kind: TerrainKind,
        /// Whether the torch currently reaches the cell.
        pub lit: bool,
    }

    /// Immutable avatar state captured for rendering.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct AvatarSnapshot {
        /// Current position.
        pub pos: GridPos,
        /// Remaining hit points.
        pub hit_points: i32,
        /// Current torch radius.
        pub torch_radius: f64,
        /// Direction the avatar faces.
        pub facing: Direction,
    }

    /// Immutable state of a single live monster.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct MonsterSnapshot {
        /// Identifier assigned at load time.
        pub id: MonsterId,
        /// Species of the monster.
        pub kind: MonsterKind,
        /// Current position.
        pub pos: GridPos,
        /// Remaining hit points.
        pub hit_points: i32,
        /// Delay between successive movement ticks.
        pub move_interval: Duration,
        /// Movement strategy currently in effect.
        pub move_mode: MoveMode,
        /// Distance at which a passive monster turns pursuer.
        pub aggro_radius: f64,
    }

    /// Everything a renderer needs for one frame.
    #[derive(Clone, Debug, PartialEq)]
    pub struct Frame {
        /// Window the cells were captured from.
        pub viewport: Viewport,
        /// Viewport cells in row-major order, top row first.
        pub cells: Vec<CellSnapshot>,
        /// Avatar state.
        pub avatar: AvatarSnapshot,
        /// Live monsters in identifier order.
        pub monsters: Vec<MonsterSnapshot>,
    }

    /// Computes the viewport for the provided preferred window size.
    #[must_use]
    pub fn viewport(world: &World, preferred_width: u32, preferred_height: u32) -> Viewport {
        let grid = world.grid();
        let width = preferred_width.min(grid.width());
        let height = preferred_height.min(grid.height());
        let avatar = world.avatar().pos();

        let origin_x = clamp_origin(avatar.x(), width, grid.width());
        let origin_y = clamp_origin(avatar.y(), height, grid.height());
        Viewport {
            origin: GridPos::new(origin_x, origin_y),
            width,
            height,
        }
    }

    /// Captures a full frame snapshot for rendering.
    #[must_use]
    pub fn frame(world: &World, preferred_width: u32, preferred_height: u32) -> Frame {
        let viewport = self::viewport(world, preferred_width, preferred_height);
        let grid = world.grid();

        let mut cells = Vec::with_capacity(viewport.width as usize * viewport.height as usize);
        for row in 0..viewport.height {
            let y = viewport.origin.y() + viewport.height - 1 - row;
            for x in viewport.origin.x()..viewport.origin.x() + viewport.width {
                let pos = GridPos::new(x, y);
                if let Ok(cell) = grid.cell_at(pos) {
                    cells.push(CellSnapshot {
                        pos,
                        kind: cell.kind(),
                        lit: cell.is_lit(),
                    });
                }
            }
        }

        Frame {
            viewport,
            cells,
            avatar: avatar(world),
            monsters: monsters(world),
        }
    }

    /// Captures the avatar's current state.
    #[must_use]
    pub fn avatar(world: &World) -> AvatarSnapshot {
        let avatar = world.avatar();
        AvatarSnapshot {
            pos: avatar.pos(),
            hit_points: avatar.hit_points(),
            torch_radius: avatar.torch_radius(),
            facing: avatar.facing(),
        }
    }

    /// Captures every live monster in identifier order.
    #[must_use]
    pub fn monsters(world: &World) -> Vec<MonsterSnapshot> {
        let mut snapshots: Vec<MonsterSnapshot> = world
            .monsters
            .iter()
            .filter(|m| m.is_alive())
            .filter_map(|m| {
                m.pos().map(|pos| MonsterSnapshot {
                    id: m.id(),
                    kind: m.kind(),
                    pos,
                    hit_points: m.hit_points(),
                    move_interval: m.move_interval(),
                    move_mode: m.move_mode(),
                    aggro_radius: m.aggro_radius(),
                })
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Captures a single live monster, or `None` once it left play.
    #[must_use]
    pub fn monster_snapshot(world: &World, id: MonsterId) -> Option<MonsterSnapshot> {
        world
            .monster(id)
            .filter(|m| m.is_alive())
            .and_then(|m| {
                m.pos().map(|pos| MonsterSnapshot {
                    id: m.id(),
                    kind: m.kind(),
                    pos,
                    hit_points: m.hit_points(),
                    move_interval: m.move_interval(),
                    move_mode: m.move_mode(),
                    aggro_radius: m.aggro_radius(),
                })
            })
    }

    /// Number of cells currently lit by the torch.
    #[must_use]
    pub fn lit_cell_count(world: &World) -> usize {
        let grid = world.grid();
        let mut count = 0;
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.is_lit(GridPos::new(x, y)) {
                    count += 1;
                }
            }
        }
        count
    }

    fn clamp_origin(center: u32, window: u32, extent: u32) -> u32 {
        let half = i64::from(window) / 2;
        let max_origin = i64::from(extent - window);
        let origin = (i64::from(center) - half).clamp(0, max_origin);
        u32::try_from(origin).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use torchlit_core::TerrainKind;

    fn open_world(width: u32, height: u32, avatar_pos: GridPos) -> World {
        let kinds = vec![TerrainKind::Grass; width as usize * height as usize];
        let grid = Grid::from_kinds(width, height, kinds);
        World::new(grid, Avatar::new(avatar_pos, 20, 4, 4.0), Vec::new())
    }

    #[test]
    fn construction_performs_the_initial_lighting_pass() {
        let world = open_world(10, 10, GridPos::new(5, 5));
        assert!(world.grid().is_lit(GridPos::new(5, 5)));
        assert!(query::lit_cell_count(&world) > 0);
    }

    #[test]
    fn directional_intents_update_facing_even_when_rejected() {
        let mut world = open_world(3, 3, GridPos::new(0, 0));
        world.apply_intent(PlayerIntent::MoveLeft);
        assert_eq!(world.avatar().facing(), Direction::Left);
        assert_eq!(world.avatar().pos(), GridPos::new(0, 0));
    }

    #[test]
    fn dash_is_a_single_attempt_in_the_facing_direction() {
        let mut world = open_world(10, 10, GridPos::new(2, 5));
        world.apply_intent(PlayerIntent::MoveRight);
        world.apply_intent(PlayerIntent::Dash);
        assert_eq!(world.avatar().pos(), GridPos::new(7, 5));

        // A dash that would land off-board moves nothing.
        world.apply_intent(PlayerIntent::Dash);
        assert_eq!(world.avatar().pos(), GridPos::new(7, 5));
    }

    #[test]
    fn torch_floor_holds_across_repeated_decreases() {
        let mut world = open_world(5, 5, GridPos::new(2, 2));
        for _ in 0..6 {
            world.apply_intent(PlayerIntent::DecreaseTorch);
        }
        assert!((world.avatar().torch_radius() - TORCH_FLOOR).abs() < f64::EPSILON);
    }

    #[test]
    fn torch_changes_relight_immediately() {
        let mut world = open_world(15, 15, GridPos::new(7, 7));
        let before = query::lit_cell_count(&world);
        world.apply_intent(PlayerIntent::IncreaseTorch);
        assert!(query::lit_cell_count(&world) > before);
    }

    #[test]
    fn viewport_clamps_to_the_grid_edges() {
        let world = open_world(30, 30, GridPos::new(0, 0));
        let viewport = query::viewport(&world, 20, 20);
        assert_eq!(viewport.origin(), GridPos::new(0, 0));
        assert_eq!((viewport.width(), viewport.height()), (20, 20));

        let world = open_world(30, 30, GridPos::new(29, 29));
        let viewport = query::viewport(&world, 20, 20);
        assert_eq!(viewport.origin(), GridPos::new(10, 10));
    }

    #[test]
    fn viewport_shrinks_to_small_grids() {
        let world = open_world(8, 6, GridPos::new(4, 3));
        let viewport = query::viewport(&world, 20, 20);
        assert_eq!(viewport.origin(), GridPos::new(0, 0));
        assert_eq!((viewport.width(), viewport.height()), (8, 6));
    }

    #[test]
    fn frame_cells_cover_the_viewport_top_row_first() {
        let world = open_world(4, 3, GridPos::new(1, 1));
        let frame = query::frame(&world, 20, 20);
        assert_eq!(frame.cells.len(), 12);
        assert_eq!(frame.cells[0].pos, GridPos::new(0, 2));
        assert_eq!(frame.cells[11].pos, GridPos::new(3, 0));
    }
}
