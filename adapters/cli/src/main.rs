#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Pokémon Defence waves without a renderer.

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use pokemon_defence_catalog::Catalog;
use pokemon_defence_core::{Difficulty, Item, PendingChoice, Position, SpeciesId};
use pokemon_defence_session::{EvolveOutcome, Session, SessionConfig};
use pokemon_defence_world::query;
use tracing_subscriber::EnvFilter;

const TOWER_COST: u32 = 100;
const REVIVE_PRICE: u32 = 150;
const MAX_FRAMES_PER_WAVE: u32 = 500_000;

/// Starting roster placed beside the default path.
const ROSTER: [(u32, f32, f32); 4] = [
    (4, 224.0, 160.0),
    (7, 384.0, 224.0),
    (1, 256.0, 416.0),
    (25, 160.0, 480.0),
];

/// Headless Pokémon Defence driver.
#[derive(Debug, Parser)]
#[command(name = "pokemon-defence", about = "Plays Pokémon Defence waves headlessly")]
struct Args {
    /// Session configuration file in TOML format.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of waves to play.
    #[arg(long, default_value_t = 5)]
    waves: u32,
    /// Seed overriding the configured one.
    #[arg(long)]
    seed: Option<u64>,
    /// Difficulty overriding the configured one.
    #[arg(long, value_enum)]
    difficulty: Option<DifficultyArg>,
    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Game speed overriding the configured one.
    #[arg(long)]
    speed: Option<f32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
    Expert,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Normal => Self::Normal,
            DifficultyArg::Hard => Self::Hard,
            DifficultyArg::Expert => Self::Expert,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WaveOutcome {
    Cleared,
    MajorClear,
    GameOver,
}

/// Entry point for the Pokémon Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;
    let catalog = Catalog::embedded().context("failed to load the embedded species catalog")?;

    let mut session = Session::new(config, Box::new(catalog));
    place_roster(&mut session);

    let frame = Duration::from_millis(args.frame_ms.max(1));
    for _ in 0..args.waves {
        let Some(wave) = session.start_next_wave() else {
            break;
        };
        match play_wave(&mut session, frame, wave)? {
            WaveOutcome::Cleared => spend_rewards(&mut session),
            WaveOutcome::MajorClear | WaveOutcome::GameOver => break,
        }
    }

    print_summary(&session);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load session config from {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty.into();
    }
    if let Some(speed) = args.speed {
        config.game_speed = speed;
    }
    Ok(config)
}

fn place_roster(session: &mut Session) {
    for (species, x, y) in ROSTER {
        let species = SpeciesId::new(species);
        if let Err(error) = session.place_tower(species, Position::new(x, y), TOWER_COST) {
            tracing::warn!(species = %species, %error, "cli.placement.failed");
        }
    }
}

fn play_wave(session: &mut Session, frame: Duration, wave: u32) -> Result<WaveOutcome> {
    for _ in 0..MAX_FRAMES_PER_WAVE {
        let _ = session.frame(frame);
        settle_choices(session);

        let world = session.world();
        if query::is_game_over(world) {
            return Ok(WaveOutcome::GameOver);
        }
        if !query::wave_active(world) {
            return Ok(if query::major_clear(world) {
                WaveOutcome::MajorClear
            } else {
                WaveOutcome::Cleared
            });
        }
    }
    bail!("wave {wave} did not finish within {MAX_FRAMES_PER_WAVE} frames")
}

/// Learns offered moves into free slots and takes the first evolution candidate.
fn settle_choices(session: &mut Session) {
    let pending: Vec<PendingChoice> = query::choices(session.world()).cloned().collect();
    for choice in pending {
        match choice {
            PendingChoice::MoveOffer { tower, moves } => {
                for offered in moves {
                    if !session.learn_move(tower, &offered.name, None) {
                        let _ = session.decline_move(tower, &offered.name);
                    }
                }
            }
            PendingChoice::Evolution {
                tower,
                candidates,
                item,
            } => match session.evolve(tower, item, candidates.first().copied()) {
                Ok(EvolveOutcome::Evolved(_)) => {}
                Ok(_) => session.decline_evolution(tower),
                Err(error) => {
                    tracing::warn!(tower = tower.get(), %error, "cli.evolution.failed");
                    session.decline_evolution(tower);
                }
            },
        }
    }
}

fn spend_rewards(session: &mut Session) {
    let _ = session.claim_reward(0);

    let towers = query::tower_view(session.world());
    let fainted: Vec<_> = towers
        .iter()
        .filter(|tower| tower.fainted)
        .map(|tower| tower.id)
        .collect();
    let strongest = towers
        .iter()
        .filter(|tower| tower.is_active())
        .max_by_key(|tower| tower.damage_dealt)
        .map(|tower| tower.id);

    if let Some(tower) = strongest {
        let _ = session.use_item(Item::RareCandy, tower);
    }
    for tower in fainted {
        if !session.purchase_and_use(Item::Revive, REVIVE_PRICE, tower) {
            break;
        }
    }
    settle_choices(session);
}

fn print_summary(session: &Session) {
    let world = session.world();
    let stats = session.stats();
    println!("waves cleared: {}", stats.waves_cleared);
    println!("highest wave: {}", stats.highest_wave);
    println!("game over: {}", query::is_game_over(world));
    println!("lives: {}", query::lives(world));
    println!("money: {}", query::money(world));
    println!("kills: {} escapes: {}", stats.kills, stats.escapes);
    println!("evolutions: {}", stats.evolutions);
    for tower in query::tower_view(world).iter() {
        println!(
            "  {} #{} lv{} hp {}/{} damage {} kills {}{}",
            tower.name,
            tower.id.get(),
            tower.level,
            tower.current_hp,
            tower.max_hp,
            tower.damage_dealt,
            tower.kills,
            if tower.fainted { " (fainted)" } else { "" }
        );
    }
}
