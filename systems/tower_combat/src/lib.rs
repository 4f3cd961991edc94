#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that rolls accuracy and emits move firing commands from targeting data.

use std::time::Duration;

use pokemon_defence_core::{Command, EnemyId, FireOutcome, Tower, TowerTarget, TowerView};
use pokemon_defence_system_abilities::attack_speed_multiplier;
use rand::Rng;

/// Lower bound of the cooldown multiplier, reached by very fast towers.
pub const MIN_COOLDOWN_MULTIPLIER: f32 = 0.2;

/// Speed stat at which the unclamped cooldown multiplier reaches zero.
pub const SPEED_DIVISOR: f32 = 200.0;

/// Cooldown multiplier applied while the slow-attacks debuff is active.
pub const SLOWED_COOLDOWN_FACTOR: u32 = 2;

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireMove` entries for targeted towers with a ready move.
    ///
    /// Each tower fires at most once per tick, using its first automatic
    /// move that is off cooldown.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        tower_targets: &[TowerTarget],
        towers: &TowerView,
        slowed: bool,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            let Some(tower) = towers.get(target.tower) else {
                continue;
            };
            if !tower.is_active() {
                continue;
            }
            let ready = tower
                .moves
                .iter()
                .position(|equipped| equipped.fires_automatically());
            if let Some(slot) = ready {
                if let Some(command) = fire(tower, slot, target.enemy, slowed, rng) {
                    self.scratch.push(command);
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

/// Rolls accuracy for the move in `slot` and builds the firing command.
///
/// A miss consumes the cooldown exactly like a hit. Returns `None` when the
/// slot is empty.
pub fn fire<R: Rng + ?Sized>(
    tower: &Tower,
    slot: usize,
    target: EnemyId,
    slowed: bool,
    rng: &mut R,
) -> Option<Command> {
    let fired = tower.moves.get(slot)?;
    let outcome = roll_accuracy(fired.accuracy, rng);
    Some(Command::FireMove {
        tower: tower.id,
        slot,
        target,
        outcome,
        cooldown: scaled_cooldown(fired.cooldown, tower, slowed),
    })
}

/// Rolls a percentage accuracy check.
pub fn roll_accuracy<R: Rng + ?Sized>(accuracy: u8, rng: &mut R) -> FireOutcome {
    if rng.gen_range(0..100) < u32::from(accuracy) {
        FireOutcome::Hit
    } else {
        FireOutcome::Miss
    }
}

/// Multiplier applied to a move's cooldown for the tower's speed and ability.
#[must_use]
pub fn cooldown_multiplier(tower: &Tower) -> f32 {
    let from_speed = 1.0 - tower.speed as f32 / SPEED_DIVISOR;
    let ability = attack_speed_multiplier(tower.ability.as_ref()).max(f32::EPSILON);
    (from_speed / ability).max(MIN_COOLDOWN_MULTIPLIER)
}

/// Cooldown assigned to a move after it fires.
#[must_use]
pub fn scaled_cooldown(base: Duration, tower: &Tower, slowed: bool) -> Duration {
    let nanos = base.as_nanos() as f64 * f64::from(cooldown_multiplier(tower));
    let scaled = Duration::from_nanos(nanos.round() as u64);
    if slowed {
        scaled * SLOWED_COOLDOWN_FACTOR
    } else {
        scaled
    }
}
