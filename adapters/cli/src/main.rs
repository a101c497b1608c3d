#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a full Forager match locally.
//!
//! Generates a deterministic resource field from the seed, then runs the
//! decision engine against the local world harness turn by turn and reports
//! the banked budget at the end.

use anyhow::{ensure, Result};
use clap::Parser;
use forager_bot::{Bot, BotConfig};
use forager_core::match_length;
use forager_world::{apply, end_turn, query, World, WorldConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "forager", about = "Runs a local Forager match")]
struct Args {
    /// Number of grid columns.
    #[arg(long, default_value_t = 32)]
    width: u32,

    /// Number of grid rows.
    #[arg(long, default_value_t = 32)]
    height: u32,

    /// Seed for the resource field and every navigator draw.
    #[arg(long, default_value_t = 2_718_281_828)]
    seed: u64,

    /// Number of turns to play; defaults to the full match for the width.
    #[arg(long)]
    turns: Option<u32>,

    /// Tracing filter directive, for example `info` or `forager_bot=debug`.
    #[arg(long, default_value = "info")]
    log: String,
}

/// Entry point for the Forager command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    ensure!(
        args.width > 0 && args.height > 0,
        "grid dimensions must be non-zero"
    );
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log)?)
        .init();

    let turns = args.turns.unwrap_or_else(|| match_length(args.width));
    let mut world = World::new(WorldConfig {
        width: args.width,
        height: args.height,
        seed: args.seed,
        starting_budget: 5000,
    });
    let mut bot = Bot::new(BotConfig {
        rng_seed: args.seed,
        ..BotConfig::default()
    });

    let field_at_start = query::field_total(&world);
    let mut events = Vec::new();
    for _ in 0..turns {
        let snapshot = query::snapshot(&world);
        let commands = bot.plan_turn(&snapshot);
        for command in commands {
            apply(&mut world, command, &mut events);
        }
        events.clear();
        end_turn(&mut world);
    }

    info!(
        turns,
        banked = query::budget(&world),
        fleet = query::unit_count(&world),
        field_remaining = query::field_total(&world),
        field_at_start,
        "match finished"
    );
    println!(
        "match over after {turns} turns: banked {} with {} units afloat",
        query::budget(&world),
        query::unit_count(&world)
    );
    Ok(())
}
