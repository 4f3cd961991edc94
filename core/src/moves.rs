//! Move and ability value objects carried by towers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ElementType, StatusKind};

/// Maximum number of moves a tower can have equipped.
pub const MAX_EQUIPPED_MOVES: usize = 4;

/// Damage class of a move; selects which attacker and defender stats apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageClass {
    /// Uses attack against defense.
    Physical,
    /// Uses special attack against special defense.
    Special,
    /// Deals no damage; only applies effects.
    Status,
}

/// Chance to inflict a status on the struck enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StatusInfliction {
    /// Status inflicted.
    pub kind: StatusKind,
    /// Chance in percent, `0..=100`.
    pub chance: u8,
}

/// Structured effect derived from a move's description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveEffect {
    /// Status the move may inflict.
    pub inflicts: Option<StatusInfliction>,
    /// Percentage of damage dealt returned to the attacker.
    pub drain_percent: u8,
    /// Description text not captured by the structured fields.
    pub additional: Option<String>,
}

/// Move equipped by a tower.
#[derive(Clone, Debug, PartialEq)]
pub struct Move {
    /// Provider name, e.g. `"thunder-shock"`.
    pub name: String,
    /// Elemental type.
    pub element: ElementType,
    /// Nominal power; zero for status moves.
    pub power: u32,
    /// Accuracy in percent, `0..=100`.
    pub accuracy: u8,
    /// Damage class.
    pub damage_class: DamageClass,
    /// Structured effect payload.
    pub effect: MoveEffect,
    /// Cooldown assigned before speed scaling.
    pub cooldown: Duration,
    /// Cooldown remaining before the move can fire again.
    pub current_cooldown: Duration,
    /// Whether the move damages every enemy around the impact point.
    pub aoe: bool,
    /// Radius of the area of effect in world units.
    pub aoe_radius: f32,
    /// Whether the move only fires when cast by the player.
    pub manual: bool,
}

impl Move {
    /// Reports whether the cooldown has fully elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.current_cooldown.is_zero()
    }

    /// Reports whether the move fires on its own when ready.
    #[must_use]
    pub fn fires_automatically(&self) -> bool {
        !self.manual && self.is_ready()
    }
}

/// Effect bucket an ability maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKind {
    /// Multiplies critical-hit chance.
    Crit,
    /// Heals the attacker by a fraction of damage dealt.
    Lifesteal,
    /// Multiplies area-of-effect damage.
    Aoe,
    /// Shortens move cooldowns.
    Speed,
    /// Hardens defense against enemy strikes.
    Tank,
}

impl AbilityKind {
    /// Every bucket in canonical order.
    pub const ALL: [AbilityKind; 5] = [
        Self::Crit,
        Self::Lifesteal,
        Self::Aoe,
        Self::Speed,
        Self::Tank,
    ];
}

/// Innate ability assigned when a tower is acquired.
#[derive(Clone, Debug, PartialEq)]
pub struct Ability {
    /// Provider ability name.
    pub name: String,
    /// Effect bucket.
    pub kind: AbilityKind,
    /// Numeric strength of the effect.
    pub value: f32,
}
