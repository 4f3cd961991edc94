#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Maps provider ability names onto effect buckets and exposes their modifiers.

use pokemon_defence_core::{Ability, AbilityKind};
use rand::Rng;

/// Critical-hit chance without any ability bonus.
pub const BASE_CRITICAL_CHANCE: f32 = 1.0 / 24.0;

const CRIT_KEYWORDS: &[&str] = &["sniper", "super-luck", "keen-eye", "scope", "sharp", "merciless"];
const LIFESTEAL_KEYWORDS: &[&str] = &[
    "drain",
    "absorb",
    "leech",
    "regenerator",
    "poison-heal",
    "rain-dish",
];
const AOE_KEYWORDS: &[&str] = &[
    "storm", "drought", "drizzle", "sand", "snow", "aura", "blaze", "torrent", "overgrow",
];
const SPEED_KEYWORDS: &[&str] = &["speed", "swift", "quick", "chlorophyll", "unburden", "rush"];
const TANK_KEYWORDS: &[&str] = &[
    "sturdy",
    "armor",
    "shell",
    "thick",
    "guard",
    "intimidate",
    "multiscale",
];

/// Strength assigned to a bucket when an ability is acquired.
#[must_use]
pub const fn default_value(kind: AbilityKind) -> f32 {
    match kind {
        AbilityKind::Crit => 2.0,
        AbilityKind::Lifesteal => 0.15,
        AbilityKind::Aoe | AbilityKind::Speed | AbilityKind::Tank => 1.3,
    }
}

/// Finds the bucket whose keyword family matches the ability name.
#[must_use]
pub fn classify(name: &str) -> Option<AbilityKind> {
    let name = name.trim().to_ascii_lowercase().replace(' ', "-");
    let families = [
        (AbilityKind::Crit, CRIT_KEYWORDS),
        (AbilityKind::Lifesteal, LIFESTEAL_KEYWORDS),
        (AbilityKind::Aoe, AOE_KEYWORDS),
        (AbilityKind::Speed, SPEED_KEYWORDS),
        (AbilityKind::Tank, TANK_KEYWORDS),
    ];
    families
        .into_iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| name.contains(keyword)))
        .map(|(kind, _)| kind)
}

/// Builds the ability a tower acquires, falling back to a random bucket.
pub fn assign<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Ability {
    let kind = classify(name).unwrap_or_else(|| {
        let index = rng.gen_range(0..AbilityKind::ALL.len());
        AbilityKind::ALL[index]
    });
    Ability {
        name: name.to_owned(),
        kind,
        value: default_value(kind),
    }
}

fn value_of(ability: Option<&Ability>, kind: AbilityKind) -> Option<f32> {
    ability
        .filter(|ability| ability.kind == kind)
        .map(|ability| ability.value)
}

/// Chance of a critical hit, boosted by crit abilities.
#[must_use]
pub fn critical_chance(ability: Option<&Ability>) -> f32 {
    BASE_CRITICAL_CHANCE * value_of(ability, AbilityKind::Crit).unwrap_or(1.0)
}

/// Fraction of damage dealt returned to the attacker.
#[must_use]
pub fn lifesteal_ratio(ability: Option<&Ability>) -> f32 {
    value_of(ability, AbilityKind::Lifesteal).unwrap_or(0.0)
}

/// Damage multiplier for area-of-effect moves.
#[must_use]
pub fn aoe_damage_multiplier(ability: Option<&Ability>) -> f32 {
    value_of(ability, AbilityKind::Aoe).unwrap_or(1.0)
}

/// Divisor applied to move cooldowns.
#[must_use]
pub fn attack_speed_multiplier(ability: Option<&Ability>) -> f32 {
    value_of(ability, AbilityKind::Speed).unwrap_or(1.0)
}

/// Multiplier applied to defense against enemy strikes.
#[must_use]
pub fn tank_multiplier(ability: Option<&Ability>) -> f32 {
    value_of(ability, AbilityKind::Tank).unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ability(kind: AbilityKind) -> Ability {
        Ability {
            name: "test".to_owned(),
            kind,
            value: default_value(kind),
        }
    }

    #[test]
    fn keywords_select_buckets() {
        assert_eq!(classify("super-luck"), Some(AbilityKind::Crit));
        assert_eq!(classify("Keen Eye"), Some(AbilityKind::Crit));
        assert_eq!(classify("rain-dish"), Some(AbilityKind::Lifesteal));
        assert_eq!(classify("sand-stream"), Some(AbilityKind::Aoe));
        assert_eq!(classify("blaze"), Some(AbilityKind::Aoe));
        assert_eq!(classify("chlorophyll"), Some(AbilityKind::Speed));
        assert_eq!(classify("battle-armor"), Some(AbilityKind::Tank));
        assert_eq!(classify("static"), None);
    }

    #[test]
    fn modifiers_default_without_matching_ability() {
        let tank = ability(AbilityKind::Tank);
        assert_eq!(critical_chance(None), BASE_CRITICAL_CHANCE);
        assert_eq!(critical_chance(Some(&tank)), BASE_CRITICAL_CHANCE);
        assert_eq!(lifesteal_ratio(Some(&tank)), 0.0);
        assert_eq!(aoe_damage_multiplier(None), 1.0);
        assert_eq!(attack_speed_multiplier(None), 1.0);
        assert_eq!(tank_multiplier(Some(&tank)), 1.3);
    }

    #[test]
    fn crit_ability_multiplies_base_chance() {
        let crit = ability(AbilityKind::Crit);
        assert!((critical_chance(Some(&crit)) - 2.0 / 24.0).abs() < f32::EPSILON);
    }

    #[test]
    fn matched_names_ignore_rng() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let assigned = assign("overgrow", &mut rng);
        assert_eq!(assigned.kind, AbilityKind::Aoe);
        assert_eq!(assigned.value, 1.3);
        assert_eq!(assigned.name, "overgrow");
    }

    #[test]
    fn fallback_is_roughly_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
        let samples = 10_000;
        let mut counts = [0usize; 5];
        for _ in 0..samples {
            let assigned = assign("static", &mut rng);
            let index = AbilityKind::ALL
                .iter()
                .position(|kind| *kind == assigned.kind)
                .expect("known bucket");
            counts[index] += 1;
        }
        for count in counts {
            let share = count as f32 / samples as f32;
            assert!((share - 0.2).abs() < 0.03, "share {share} outside tolerance");
        }
    }
}
