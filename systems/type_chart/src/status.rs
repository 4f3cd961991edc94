//! Application, ticking and expiry rules for status effects.

use std::time::Duration;

use pokemon_defence_core::{StatusEffect, StatusKind};

/// Duration of statuses that do not lock the unit out.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

/// Shorter duration of freeze and sleep, which skip the unit's turn entirely.
pub const LOCKOUT_DURATION: Duration = Duration::from_secs(2);

/// Movement multiplier while paralysed.
pub const PARALYSIS_SPEED_MULTIPLIER: f32 = 0.5;

/// Divisor of maximum hit points used for periodic damage.
const TICK_DAMAGE_DIVISOR: u32 = 16;

/// Outcome of advancing a status by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusTick {
    /// Whole hit points lost this tick.
    pub damage: u32,
    /// Whether the status ran out.
    pub expired: bool,
}

/// Default duration of a status kind.
#[must_use]
pub fn default_duration(kind: StatusKind) -> Duration {
    match kind {
        StatusKind::Freeze | StatusKind::Sleep => LOCKOUT_DURATION,
        StatusKind::Burn | StatusKind::Poison | StatusKind::Paralysis | StatusKind::Confusion => {
            DEFAULT_DURATION
        }
    }
}

/// Builds a fresh status for a unit with the given maximum hit points.
#[must_use]
pub fn inflict(kind: StatusKind, max_hp: u32) -> StatusEffect {
    let tick_damage = match kind {
        StatusKind::Burn | StatusKind::Poison => Some((max_hp / TICK_DAMAGE_DIVISOR).max(1)),
        _ => None,
    };
    StatusEffect {
        kind,
        remaining: default_duration(kind),
        tick_damage,
        carry: 0.0,
    }
}

/// Live attack while `kind` is active, given the stored baseline.
///
/// Expiry never inverts this value; callers restore the baseline instead.
#[must_use]
pub fn modified_attack(kind: StatusKind, base_attack: u32) -> u32 {
    match kind {
        StatusKind::Burn => (base_attack / 2).max(1),
        _ => base_attack,
    }
}

/// Reports whether the status skips the unit's turn.
#[must_use]
pub fn prevents_action(status: Option<&StatusEffect>) -> bool {
    matches!(
        status.map(|status| status.kind),
        Some(StatusKind::Freeze | StatusKind::Sleep)
    )
}

/// Movement multiplier imposed by the status.
#[must_use]
pub fn speed_multiplier(status: Option<&StatusEffect>) -> f32 {
    match status.map(|status| status.kind) {
        Some(StatusKind::Paralysis) => PARALYSIS_SPEED_MULTIPLIER,
        _ => 1.0,
    }
}

/// Advances a status by `dt`, accumulating periodic damage.
///
/// Damage accrues only for the time the status was still active, and
/// fractional points carry over to the next tick.
pub fn advance(status: &mut StatusEffect, dt: Duration) -> StatusTick {
    let active = dt.min(status.remaining);
    status.remaining = status.remaining.saturating_sub(dt);

    let mut damage = 0;
    if let Some(per_second) = status.tick_damage {
        status.carry += per_second as f32 * active.as_secs_f32();
        let whole = status.carry.floor();
        status.carry -= whole;
        damage = whole as u32;
    }

    StatusTick {
        damage,
        expired: status.remaining.is_zero(),
    }
}
