#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line driver for the Torchlit dungeon simulation.
//!
//! Loads a level, spawns the monster scheduler, and runs a fixed-cadence
//! frame loop until the avatar dies, the last monster falls, or an
//! optional frame limit is reached. Avatar input arrives as a scripted
//! intent string so runs are reproducible from the command line.

mod ascii;

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use torchlit_core::PlayerIntent;
use torchlit_system_scheduler::Scheduler;
use torchlit_world::{query, Level, SharedWorld, World};

/// Wall-clock delay between rendered frames.
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(name = "torchlit", about = "Concurrent tile-dungeon simulation")]
struct Args {
    /// Level file to load.
    level: PathBuf,

    /// Scripted avatar intents, one code per frame: `u`, `d`, `l`, `r`
    /// to step, `+`/`-` to adjust the torch, `x` to dash.
    #[arg(long, default_value = "")]
    intents: String,

    /// Stop after this many frames even without a win or loss.
    #[arg(long)]
    frames: Option<u64>,

    /// Suppress per-frame rendering.
    #[arg(long)]
    quiet: bool,

    /// Print a machine-readable run summary on exit.
    #[arg(long)]
    summary_json: bool,
}

/// How a run ended.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    /// Every monster was defeated.
    Won,
    /// The avatar ran out of hit points.
    Lost,
    /// The frame limit expired before either side prevailed.
    FrameLimit,
}

/// Final state reported when `--summary-json` is set.
#[derive(Debug, Serialize)]
struct RunSummary {
    outcome: Outcome,
    frames: u64,
    avatar_hit_points: i32,
    monsters_alive: usize,
    lit_cells: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let source = fs::read_to_string(&args.level)
        .with_context(|| format!("could not read level file {}", args.level.display()))?;
    let level = Level::parse(&source)
        .with_context(|| format!("could not parse level file {}", args.level.display()))?;
    let script = parse_intents(&args.intents)?;

    let world = SharedWorld::new(World::from_level(&level));
    let scheduler = Scheduler::spawn(&world);

    let mut script = script.into_iter();
    let mut frames = 0;
    let outcome = loop {
        if let Some(intent) = script.next() {
            world.apply_intent(intent);
        }
        if !args.quiet {
            let text = world.with(|w| {
                ascii::render(&query::frame(
                    w,
                    query::PREFERRED_WINDOW,
                    query::PREFERRED_WINDOW,
                ))
            });
            println!("{text}\n");
        }
        frames += 1;

        if !world.is_avatar_alive() {
            break Outcome::Lost;
        }
        if world.alive_monster_count() == 0 {
            break Outcome::Won;
        }
        if args.frames.is_some_and(|limit| frames >= limit) {
            break Outcome::FrameLimit;
        }
        thread::sleep(FRAME_INTERVAL);
    };
    scheduler.shutdown();

    match outcome {
        Outcome::Won => println!("You win!"),
        Outcome::Lost => println!("You lost!"),
        Outcome::FrameLimit => println!("Frame limit reached."),
    }

    if args.summary_json {
        let summary = world.with(|w| RunSummary {
            outcome,
            frames,
            avatar_hit_points: w.avatar().hit_points(),
            monsters_alive: w.alive_monster_count(),
            lit_cells: query::lit_cell_count(w),
        });
        println!("{}", serde_json::to_string(&summary)?);
    }

    Ok(())
}

fn parse_intents(script: &str) -> Result<Vec<PlayerIntent>> {
    let mut intents = Vec::with_capacity(script.len());
    for code in script.chars() {
        let intent = match code.to_ascii_lowercase() {
            'u' => PlayerIntent::MoveUp,
            'd' => PlayerIntent::MoveDown,
            'l' => PlayerIntent::MoveLeft,
            'r' => PlayerIntent::MoveRight,
            '+' => PlayerIntent::IncreaseTorch,
            '-' => PlayerIntent::DecreaseTorch,
            'x' => PlayerIntent::Dash,
            c if c.is_whitespace() => continue,
            c => bail!("unrecognized intent code {c:?}"),
        };
        intents.push(intent);
    }
    Ok(intents)
}
