#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Translates provider move records into equipped moves.
//!
//! Effect descriptions are free text. The keyword table below is the only
//! place where that text is interpreted; anything it does not recognise is
//! kept verbatim in [`MoveEffect::additional`].

use std::time::Duration;

use pokemon_defence_core::{
    DamageClass, ElementType, Move, MoveEffect, MoveRecord, StatusInfliction, StatusKind,
};

/// Radius of area-of-effect moves in world units.
pub const AOE_RADIUS: f32 = 80.0;

/// Power at or above which a move is reserved for manual casting.
pub const MANUAL_POWER_THRESHOLD: u32 = 150;

/// Cooldown of status-class moves.
pub const STATUS_MOVE_COOLDOWN: Duration = Duration::from_secs(3);

/// Status chance used when a damaging move mentions a status without a chance.
const DEFAULT_SECONDARY_CHANCE: u32 = 10;

/// Keyword fragments recognised in effect text, checked in order.
const STATUS_KEYWORDS: &[(&str, StatusKind)] = &[
    ("burn", StatusKind::Burn),
    ("poison", StatusKind::Poison),
    ("paraly", StatusKind::Paralysis),
    ("freez", StatusKind::Freeze),
    ("asleep", StatusKind::Sleep),
    ("sleep", StatusKind::Sleep),
    ("confus", StatusKind::Confusion),
];

/// Target scopes that hit every enemy around the impact point.
const AOE_SCOPES: &[&str] = &[
    "all-opponents",
    "all-other-pokemon",
    "all-pokemon",
    "entire-field",
    "opponents-field",
];

/// Converts a provider move record into an equipped move.
#[must_use]
pub fn translate(record: &MoveRecord) -> Move {
    let power = match record.damage_class {
        DamageClass::Status => 0,
        DamageClass::Physical | DamageClass::Special => record.power.unwrap_or(0),
    };
    let accuracy = record.accuracy.unwrap_or(100).min(100) as u8;
    let aoe = AOE_SCOPES.contains(&record.target.as_str());

    Move {
        name: record.name.clone(),
        element: record.element,
        power,
        accuracy,
        damage_class: record.damage_class,
        effect: parse_effect(record),
        cooldown: cooldown_for(record.damage_class, power),
        current_cooldown: Duration::ZERO,
        aoe,
        aoe_radius: if aoe { AOE_RADIUS } else { 0.0 },
        manual: power >= MANUAL_POWER_THRESHOLD,
    }
}

/// Structured effect extracted from a move's description.
#[must_use]
pub fn parse_effect(record: &MoveRecord) -> MoveEffect {
    let text = record.effect.to_ascii_lowercase();

    let inflicts = STATUS_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, kind)| {
            let chance = record.effect_chance.unwrap_or(match record.damage_class {
                DamageClass::Status => 100,
                DamageClass::Physical | DamageClass::Special => DEFAULT_SECONDARY_CHANCE,
            });
            StatusInfliction {
                kind: *kind,
                chance: chance.min(100) as u8,
            }
        });

    let restores = ["drain", "recover", "heal"]
        .iter()
        .any(|keyword| text.contains(keyword));
    let drain_percent = if text.contains("three quarters") || text.contains("75%") {
        75
    } else if restores && text.contains("half") {
        50
    } else {
        0
    };

    let trimmed = record.effect.trim();
    MoveEffect {
        inflicts,
        drain_percent,
        additional: (!trimmed.is_empty()).then(|| trimmed.to_owned()),
    }
}

/// Cooldown assigned to a move before speed scaling.
#[must_use]
pub fn cooldown_for(class: DamageClass, power: u32) -> Duration {
    match class {
        DamageClass::Status => STATUS_MOVE_COOLDOWN,
        DamageClass::Physical | DamageClass::Special => {
            Duration::from_secs_f32(1.0 + power as f32 / 100.0)
        }
    }
}

/// Generic move handed out when move data cannot be fetched.
#[must_use]
pub fn fallback_move() -> Move {
    translate(&MoveRecord {
        name: "tackle".to_owned(),
        element: ElementType::Normal,
        power: Some(40),
        accuracy: Some(100),
        damage_class: DamageClass::Physical,
        target: "selected-pokemon".to_owned(),
        effect: String::new(),
        effect_chance: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        name: &str,
        power: Option<u32>,
        class: DamageClass,
        target: &str,
        effect: &str,
        chance: Option<u32>,
    ) -> MoveRecord {
        MoveRecord {
            name: name.to_owned(),
            element: ElementType::Normal,
            power,
            accuracy: Some(100),
            damage_class: class,
            target: target.to_owned(),
            effect: effect.to_owned(),
            effect_chance: chance,
        }
    }

    #[test]
    fn secondary_burn_uses_reported_chance() {
        let flamethrower = record(
            "flamethrower",
            Some(90),
            DamageClass::Special,
            "selected-pokemon",
            "Inflicts regular damage. Has a $effect_chance% chance to burn the target.",
            Some(10),
        );
        let translated = translate(&flamethrower);
        assert_eq!(
            translated.effect.inflicts,
            Some(StatusInfliction {
                kind: StatusKind::Burn,
                chance: 10
            })
        );
        assert!((translated.cooldown.as_secs_f32() - 1.9).abs() < 1e-3);
        assert!(!translated.aoe);
        assert!(!translated.manual);
    }

    #[test]
    fn status_moves_inflict_with_certainty() {
        let hypnosis = record(
            "hypnosis",
            None,
            DamageClass::Status,
            "selected-pokemon",
            "Puts the target to sleep.",
            None,
        );
        let translated = translate(&hypnosis);
        assert_eq!(translated.power, 0);
        assert_eq!(
            translated.effect.inflicts,
            Some(StatusInfliction {
                kind: StatusKind::Sleep,
                chance: 100
            })
        );
        assert_eq!(translated.cooldown, STATUS_MOVE_COOLDOWN);
    }

    #[test]
    fn drain_percentages_follow_wording() {
        let giga_drain = record(
            "giga-drain",
            Some(75),
            DamageClass::Special,
            "selected-pokemon",
            "Drains half the damage inflicted to heal the user.",
            None,
        );
        let draining_kiss = record(
            "draining-kiss",
            Some(50),
            DamageClass::Special,
            "selected-pokemon",
            "Drains 75% of the damage inflicted to heal the user.",
            None,
        );
        assert_eq!(parse_effect(&giga_drain).drain_percent, 50);
        assert_eq!(parse_effect(&draining_kiss).drain_percent, 75);
        assert_eq!(parse_effect(&giga_drain).inflicts, None);
    }

    #[test]
    fn spread_scopes_become_area_moves() {
        let earthquake = record(
            "earthquake",
            Some(100),
            DamageClass::Physical,
            "all-other-pokemon",
            "Inflicts regular damage.",
            None,
        );
        let translated = translate(&earthquake);
        assert!(translated.aoe);
        assert_eq!(translated.aoe_radius, AOE_RADIUS);
        assert_eq!(translated.cooldown, Duration::from_secs(2));
        assert_eq!(
            translated.effect.additional.as_deref(),
            Some("Inflicts regular damage.")
        );
    }

    #[test]
    fn heavy_moves_are_manual() {
        let hyper_beam = record(
            "hyper-beam",
            Some(150),
            DamageClass::Special,
            "selected-pokemon",
            "",
            None,
        );
        let translated = translate(&hyper_beam);
        assert!(translated.manual);
        assert!(!translated.fires_automatically());
        assert_eq!(translated.effect.additional, None);
    }

    #[test]
    fn missing_accuracy_never_misses() {
        let mut swift = record(
            "swift",
            Some(60),
            DamageClass::Special,
            "all-opponents",
            "",
            None,
        );
        swift.accuracy = None;
        assert_eq!(translate(&swift).accuracy, 100);
    }

    #[test]
    fn fallback_is_a_plain_tackle() {
        let tackle = fallback_move();
        assert_eq!(tackle.name, "tackle");
        assert_eq!(tackle.power, 40);
        assert_eq!(tackle.accuracy, 100);
        assert_eq!(tackle.damage_class, DamageClass::Physical);
        assert_eq!(tackle.effect, MoveEffect::default());
    }
}
