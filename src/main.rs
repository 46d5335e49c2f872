//! Skyward headless runner
//!
//! Flies the autopilot through the level table at fixed timestep and logs
//! what happens. Handy for balancing level files and for replaying a seed.
//!
//! Usage:
//!   RUST_LOG=info cargo run --release -- --seed 42 --minutes 3
//!   cargo run --release -- --levels levels.json --settings settings.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use skyward::consts::SIM_DT_MS;
use skyward::sim::{GameEvent, Mode};
use skyward::{LevelTable, Session, Settings};

#[derive(Parser)]
#[command(name = "skyward")]
#[command(about = "Run the arcade shooter simulation headless under autopilot")]
struct Args {
    /// Settings JSON (defaults are used when absent or unreadable)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Level table JSON (the built-in levels when omitted)
    #[arg(long)]
    levels: Option<PathBuf>,

    /// Override the RNG seed from the settings
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated minutes before giving up
    #[arg(long, default_value_t = 5.0)]
    minutes: f64,

    /// Print the final run state as JSON
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    let levels = match &args.levels {
        Some(path) => LevelTable::load(path)
            .with_context(|| format!("failed to load level table {}", path.display()))?,
        None => LevelTable::builtin(),
    };
    log::info!(
        "Skyward starting: {} levels, seed {}",
        levels.len(),
        settings.seed
    );

    let mut session = Session::new(&settings, levels).context("failed to initialize run")?;
    session.set_autopilot(true);

    let max_ticks = (args.minutes * 60_000.0 / SIM_DT_MS).ceil() as u64;
    let mut kills = 0u32;
    let mut escapes = 0u32;
    let mut ticks = 0u64;
    let mut finished = false;

    while ticks < max_ticks && !finished {
        session.step();
        ticks += 1;

        for event in session.drain_events() {
            match event {
                GameEvent::EnemyHit { .. } => kills += 1,
                GameEvent::EnemyEscaped { id, edge, penalty } => {
                    escapes += 1;
                    log::debug!("Enemy {} escaped via {:?} (-{})", id, edge, penalty);
                }
                GameEvent::PlayerHit { lives } => log::info!("Ship hit, {} lives left", lives),
                GameEvent::LevelAdvanced { level } => log::info!("Entering level {}", level),
                GameEvent::GameOver { .. } | GameEvent::Victory { .. } => finished = true,
                _ => {}
            }
        }
    }

    let state = session.state();
    let outcome = match state.mode {
        Mode::Victory => "victory",
        Mode::GameOver => "game over",
        _ => "time limit",
    };
    println!("=== RUN SUMMARY ===");
    println!("  Outcome:  {}", outcome);
    println!("  Seed:     {}", state.seed);
    println!("  Level:    {}", state.level);
    println!("  Score:    {}", state.score);
    println!("  Lives:    {}", state.lives);
    println!("  Kills:    {}", kills);
    println!("  Escapes:  {}", escapes);
    println!("  Time:     {:.1}s ({} ticks)", state.elapsed_secs(), ticks);

    if args.dump {
        let json = serde_json::to_string_pretty(state).context("failed to serialize run state")?;
        println!("{}", json);
    }
    Ok(())
}
