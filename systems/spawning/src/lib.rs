#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave spawner responsible for emitting enemy spawn commands.
//!
//! Starting a wave fixes its whole schedule up front: spawn times, lanes and
//! species are drawn from a generator seeded with a SHA-256 digest of the
//! session seed and the wave number. Combat randomness therefore never
//! changes which enemies a wave contains.

use std::{collections::VecDeque, ops::RangeInclusive, time::Duration};

use pokemon_defence_core::{
    Command, Debuff, Difficulty, ElementType, EnemyBlueprint, Event, MapLayout, SpeciesId,
    SpeciesProvider, Stats,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const LOG_TARGET: &str = "pokemon_defence::spawning";

/// Delay between consecutive regular spawns.
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_millis(800);

/// Delay between the last regular spawn and the wave boss.
pub const DEFAULT_BOSS_DELAY: Duration = Duration::from_millis(2000);

/// Every wave divisible by this number ends with a boss.
pub const BOSS_WAVE_INTERVAL: u32 = 5;

/// Species regular spawns are drawn from.
pub const REGULAR_SPECIES: RangeInclusive<u32> = 1..=151;

/// Species bosses are drawn from.
pub const BOSS_SPECIES: [u32; 5] = [144, 145, 146, 149, 150];

const RNG_STREAM_EXTRA_BOSS: &str = "extra-boss";

/// Enemy attack range in world units.
const ENEMY_RANGE: f32 = 60.0;
const BOSS_RANGE: f32 = 80.0;

/// Multipliers applied on top of wave scaling for a difficulty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyScaling {
    /// Hit point multiplier.
    pub hp: f64,
    /// Attack and special attack multiplier.
    pub attack: f64,
    /// Reward multiplier.
    pub reward: f64,
}

/// Multipliers used for the given difficulty.
#[must_use]
pub const fn scaling_for(difficulty: Difficulty) -> DifficultyScaling {
    match difficulty {
        Difficulty::Easy => DifficultyScaling {
            hp: 0.7,
            attack: 0.7,
            reward: 0.8,
        },
        Difficulty::Normal => DifficultyScaling {
            hp: 1.0,
            attack: 1.0,
            reward: 1.0,
        },
        Difficulty::Hard => DifficultyScaling {
            hp: 1.5,
            attack: 1.3,
            reward: 1.5,
        },
        Difficulty::Expert => DifficultyScaling {
            hp: 2.0,
            attack: 1.7,
            reward: 2.0,
        },
    }
}

/// Number of regular enemies in a wave, `floor(5 + 1.5 * wave)`.
#[must_use]
pub const fn regular_count(wave: u32) -> u32 {
    5 + wave.saturating_mul(3) / 2
}

/// Reports whether the wave ends with a boss.
#[must_use]
pub const fn has_boss(wave: u32) -> bool {
    wave > 0 && wave % BOSS_WAVE_INTERVAL == 0
}

/// Configuration parameters required to construct the spawner.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    boss_delay: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, boss_delay: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            boss_delay,
            rng_seed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SPAWN_INTERVAL, DEFAULT_BOSS_DELAY, 0)
    }
}

/// Spawn fixed by a wave schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledSpawn {
    /// Time after wave start at which the enemy appears.
    pub at: Duration,
    /// Species requested from the provider.
    pub species: SpeciesId,
    /// Whether the spawn is a boss.
    pub boss: bool,
    /// Index used to pick the map path.
    pub lane: usize,
}

/// Pure system that schedules waves and emits spawn commands when they fall due.
#[derive(Debug)]
pub struct WaveSpawner {
    config: Config,
    wave: u32,
    elapsed: Duration,
    schedule: VecDeque<ScheduledSpawn>,
    extra_bosses: u32,
}

impl WaveSpawner {
    /// Creates a new spawner using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            wave: 0,
            elapsed: Duration::ZERO,
            schedule: VecDeque::new(),
            extra_bosses: 0,
        }
    }

    /// Number of spawns that have not fallen due yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.schedule.len()
    }

    /// Spawns still waiting, in the order they will appear.
    pub fn schedule(&self) -> impl Iterator<Item = &ScheduledSpawn> {
        self.schedule.iter()
    }

    /// Replaces the schedule with the spawns of `wave`.
    pub fn start_wave(&mut self, wave: u32) {
        let mut rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.config.rng_seed, wave));
        let count = regular_count(wave);

        self.wave = wave;
        self.elapsed = Duration::ZERO;
        self.extra_bosses = 0;
        self.schedule.clear();
        for index in 0..count {
            self.schedule.push_back(ScheduledSpawn {
                at: self.config.spawn_interval * index,
                species: SpeciesId::new(rng.gen_range(REGULAR_SPECIES)),
                boss: false,
                lane: index as usize,
            });
        }

        let boss = has_boss(wave);
        if boss {
            let last = self.config.spawn_interval * count.saturating_sub(1);
            self.schedule.push_back(ScheduledSpawn {
                at: last + self.config.boss_delay,
                species: draw_boss(&mut rng),
                boss: true,
                lane: count as usize,
            });
        }

        tracing::info!(
            target: LOG_TARGET,
            wave,
            regular = count,
            boss,
            "spawning.wave.scheduled"
        );
    }

    /// Schedules an extra boss that appears immediately.
    pub fn schedule_boss(&mut self) {
        let seed = derive_labeled_seed(
            derive_wave_seed(self.config.rng_seed, self.wave),
            RNG_STREAM_EXTRA_BOSS,
            self.extra_bosses,
        );
        self.extra_bosses = self.extra_bosses.saturating_add(1);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.schedule.push_front(ScheduledSpawn {
            at: self.elapsed,
            species: draw_boss(&mut rng),
            boss: true,
            lane: 0,
        });
    }

    /// Consumes world events and emits spawn commands for every spawn that fell due.
    pub fn handle(
        &mut self,
        events: &[Event],
        provider: &dyn SpeciesProvider,
        difficulty: Difficulty,
        map: &MapLayout,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::WaveStarted { wave } => self.start_wave(*wave),
                Event::DebuffApplied {
                    debuff: Debuff::SpawnBoss,
                } => self.schedule_boss(),
                Event::WorldReset => {
                    self.schedule.clear();
                    self.elapsed = Duration::ZERO;
                    self.wave = 0;
                }
                Event::TimeAdvanced { dt } if !self.schedule.is_empty() => {
                    self.elapsed = self.elapsed.saturating_add(*dt);
                }
                _ => {}
            }
        }

        while let Some(next) = self.schedule.front().copied() {
            if next.at > self.elapsed {
                break;
            }
            let _ = self.schedule.pop_front();
            if let Some(blueprint) = build_blueprint(provider, next, self.wave, difficulty, map) {
                out.push(Command::SpawnEnemy {
                    blueprint: Box::new(blueprint),
                });
            }
        }
    }
}

/// Stats of a provider species scaled for the wave, difficulty and boss status.
#[must_use]
pub fn scale_stats(base: Stats, wave: u32, difficulty: Difficulty, boss: bool) -> Stats {
    let wave = f64::from(wave);
    let scaling = scaling_for(difficulty);
    let attack = (1.0 + wave * 0.15) * scaling.attack;
    let defense = 1.0 + wave * 0.1;
    let scaled = Stats {
        hp: scale(base.hp, (1.0 + wave * 0.3) * scaling.hp),
        attack: scale(base.attack, attack),
        defense: scale(base.defense, defense),
        special_attack: scale(base.special_attack, attack),
        special_defense: scale(base.special_defense, defense),
        speed: base.speed,
    };
    promote(scaled, boss)
}

/// Formulaic stats used when the provider cannot supply a species.
///
/// The formula already grows with the wave, so only the difficulty and boss
/// multipliers are applied on top.
#[must_use]
pub fn synthetic_stats(wave: u32, difficulty: Difficulty, boss: bool) -> Stats {
    let scaling = scaling_for(difficulty);
    let offense = 20 + 3 * wave;
    let guard = 15 + 2 * wave;
    let stats = Stats {
        hp: scale(50 + 12 * wave, scaling.hp),
        attack: scale(offense, scaling.attack),
        defense: guard,
        special_attack: scale(offense, scaling.attack),
        special_defense: guard,
        speed: 40 + wave,
    };
    promote(stats, boss)
}

/// Currency awarded for defeating an enemy of the wave.
#[must_use]
pub fn reward_for(wave: u32, difficulty: Difficulty, boss: bool) -> u32 {
    let reward = scale(10 + 2 * wave, scaling_for(difficulty).reward);
    if boss {
        reward.saturating_mul(5)
    } else {
        reward
    }
}

/// Experience awarded for defeating an enemy of the wave.
#[must_use]
pub fn experience_for(wave: u32, boss: bool) -> u64 {
    let experience = 20 + 5 * u64::from(wave);
    if boss {
        experience * 3
    } else {
        experience
    }
}

/// Walking speed in units per second derived from the speed stat.
#[must_use]
pub fn move_speed_for(speed: u32, boss: bool) -> f32 {
    let base = 40.0 + speed as f32 * 0.4;
    if boss {
        base * 0.75
    } else {
        base
    }
}

fn promote(stats: Stats, boss: bool) -> Stats {
    if !boss {
        return stats;
    }
    Stats {
        hp: stats.hp.saturating_mul(3),
        attack: stats.attack.saturating_mul(2),
        special_attack: stats.special_attack.saturating_mul(2),
        ..stats
    }
}

fn scale(value: u32, factor: f64) -> u32 {
    let scaled = (f64::from(value) * factor).floor();
    if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

fn draw_boss(rng: &mut ChaCha8Rng) -> SpeciesId {
    SpeciesId::new(BOSS_SPECIES[rng.gen_range(0..BOSS_SPECIES.len())])
}

fn build_blueprint(
    provider: &dyn SpeciesProvider,
    spawn: ScheduledSpawn,
    wave: u32,
    difficulty: Difficulty,
    map: &MapLayout,
) -> Option<EnemyBlueprint> {
    let Some(path) = map.path_for(spawn.lane) else {
        tracing::warn!(target: LOG_TARGET, wave, "spawning.path.missing");
        return None;
    };

    let (name, stats, types, sprite) = match provider.species(spawn.species) {
        Ok(record) => (
            record.name,
            scale_stats(record.stats, wave, difficulty, spawn.boss),
            record.types,
            record.sprite,
        ),
        Err(error) => {
            tracing::warn!(
                target: LOG_TARGET,
                wave,
                species = spawn.species.get(),
                %error,
                "spawning.species.fallback"
            );
            (
                format!("wild-{}", spawn.species.get()),
                synthetic_stats(wave, difficulty, spawn.boss),
                vec![ElementType::Normal],
                String::new(),
            )
        }
    };

    Some(EnemyBlueprint {
        species: spawn.species,
        name,
        move_speed: move_speed_for(stats.speed, spawn.boss),
        stats,
        types,
        path: path.to_vec(),
        named: spawn.boss,
        boss: spawn.boss,
        reward: reward_for(wave, difficulty, spawn.boss),
        experience: experience_for(wave, spawn.boss),
        sprite,
        range: if spawn.boss { BOSS_RANGE } else { ENEMY_RANGE },
    })
}

fn derive_wave_seed(global_seed: u64, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(wave.to_le_bytes());
    finalize_seed(hasher)
}

fn derive_labeled_seed(base: u64, label: &str, index: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    hasher.update(index.to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
