#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-monster thread scheduling.
//!
//! Every live monster gets one OS thread running a fixed loop: decide a
//! move against a consistent world snapshot, submit it to the world, sleep
//! for the monster's own interval. Threads never wait on each other; the
//! only shared resource is the world lock, held briefly per operation. A
//! thread retires itself the first time it observes its monster gone from
//! play, so no external signal is needed for the normal lifecycle. The
//! shutdown flag exists for the driver and for tests that must not wait
//! out sleep intervals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use torchlit_core::MonsterId;
use torchlit_system_movement::propose;
use torchlit_world::{query, SharedWorld};

/// Owns the monster threads for one simulation run.
#[derive(Debug)]
pub struct Scheduler {
    handles: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl Scheduler {
    /// Spawns one thread per monster currently alive in the world.
    #[must_use]
    pub fn spawn(world: &SharedWorld) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let ids: Vec<MonsterId> =
            world.with(|w| query::monsters(w).iter().map(|m| m.id).collect());

        let handles = ids
            .into_iter()
            .map(|id| {
                let world = world.clone();
                let shutdown = Arc::clone(&shutdown);
                thread::spawn(move || run_monster(&world, id, &shutdown))
            })
            .collect();

        Self { handles, shutdown }
    }

    /// Number of monster threads spawned.
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }

    /// Asks every monster thread to stop after its current sleep.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Requests shutdown and waits for every thread to exit.
    pub fn shutdown(self) {
        self.request_shutdown();
        self.join();
    }

    /// Waits for every thread to exit on its own. A panicked monster
    /// thread does not abort the join of the others.
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

fn run_monster(world: &SharedWorld, id: MonsterId, shutdown: &AtomicBool) {
    let mut rng = rand::thread_rng();
    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        // Snapshot and decision happen inside one critical section so the
        // proposal cannot be based on a half-applied peer move.
        let decision = world.with(|w| {
            query::monster_snapshot(w, id)
                .and_then(|m| propose(w, id, &mut rng).map(|p| (m.move_interval, p)))
        });
        let Some((interval, proposal)) = decision else {
            break;
        };

        let current_mode = world.with(|w| query::monster_snapshot(w, id).map(|m| m.move_mode));
        if current_mode.is_some_and(|mode| mode != proposal.mode) {
            world.set_monster_mode(id, proposal.mode);
        }
        if let Some(target) = proposal.target {
            world.move_monster(id, target);
        }

        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use torchlit_core::{GridPos, MonsterKind, MoveMode, TerrainKind};
    use torchlit_world::{Avatar, Grid, Monster, World};

    fn open_world(monsters: Vec<Monster>) -> SharedWorld {
        let kinds = vec![TerrainKind::Grass; 100];
        let grid = Grid::from_kinds(10, 10, kinds);
        let avatar = Avatar::new(GridPos::new(5, 5), 20, 4, 4.0);
        SharedWorld::new(World::new(grid, avatar, monsters))
    }

    fn pursuer(id: u32, pos: GridPos) -> Monster {
        Monster::new(
            MonsterId::new(id),
            MonsterKind::Skeleton,
            pos,
            10,
            3,
            Duration::from_millis(5),
            MoveMode::Aggro,
            100.0,
        )
    }

    #[test]
    fn pursuing_monster_reaches_the_avatar_and_attacks() {
        let world = open_world(vec![pursuer(0, GridPos::new(0, 0))]);
        let scheduler = Scheduler::spawn(&world);
        assert_eq!(scheduler.thread_count(), 1);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut hit_points = 20;
        while Instant::now() < deadline {
            hit_points = world.with(|w| w.avatar().hit_points());
            if hit_points < 20 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        scheduler.shutdown();

        assert!(hit_points < 20, "monster never landed an attack");
        assert_eq!(
            (20 - hit_points) % 3,
            0,
            "damage must arrive in whole attacks"
        );
        // The attacker stays put when it strikes, so it ends adjacent.
        let pos = world
            .with(|w| query::monster_snapshot(w, MonsterId::new(0)))
            .expect("monster survives the run")
            .pos;
        assert!(pos.manhattan_distance(GridPos::new(5, 5)) <= 2);
    }

    #[test]
    fn shutdown_stops_threads_without_killing_monsters() {
        let world = open_world(vec![
            pursuer(0, GridPos::new(0, 0)),
            pursuer(1, GridPos::new(9, 9)),
        ]);
        let scheduler = Scheduler::spawn(&world);
        thread::sleep(Duration::from_millis(20));
        scheduler.shutdown();

        assert_eq!(world.alive_monster_count(), 2);
    }

    #[test]
    fn thread_retires_once_its_monster_leaves_play() {
        let world = open_world(vec![pursuer(0, GridPos::new(5, 4))]);
        let scheduler = Scheduler::spawn(&world);
        assert_eq!(scheduler.thread_count(), 1);

        // Three avatar attacks drop 10 hp at 4 damage each. The pursuer
        // stays on its cell while attacking, so the target cell is stable.
        while world.alive_monster_count() > 0 {
            world.move_avatar(GridPos::new(5, 4));
        }

        // Join without requesting shutdown; the thread must exit by
        // observing the dead monster.
        scheduler.join();
    }
}
