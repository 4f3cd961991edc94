#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Type effectiveness lookups, same-type attack bonus, and status-effect rules.

use pokemon_defence_core::ElementType;

pub mod status;

/// Multiplier granted to moves sharing a type with their user.
pub const STAB_MULTIPLIER: f32 = 1.5;

/// Single-type matchup factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Matchup {
    /// The defender takes no damage.
    Immune,
    /// Half damage.
    NotVeryEffective,
    /// Regular damage.
    Neutral,
    /// Double damage.
    SuperEffective,
}

impl Matchup {
    /// Numeric multiplier of the matchup.
    #[must_use]
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::Immune => 0.0,
            Self::NotVeryEffective => 0.5,
            Self::Neutral => 1.0,
            Self::SuperEffective => 2.0,
        }
    }
}

/// Looks up how `attack` fares against a single defending type.
#[must_use]
pub fn matchup(attack: ElementType, defender: ElementType) -> Matchup {
    use ElementType::*;

    let (strong, weak, immune): (&[ElementType], &[ElementType], &[ElementType]) = match attack {
        Normal => (&[], &[Rock, Steel], &[Ghost]),
        Fire => (&[Grass, Ice, Bug, Steel], &[Fire, Water, Rock, Dragon], &[]),
        Water => (&[Fire, Ground, Rock], &[Water, Grass, Dragon], &[]),
        Electric => (&[Water, Flying], &[Electric, Grass, Dragon], &[Ground]),
        Grass => (
            &[Water, Ground, Rock],
            &[Fire, Grass, Poison, Flying, Bug, Dragon, Steel],
            &[],
        ),
        Ice => (&[Grass, Ground, Flying, Dragon], &[Fire, Water, Ice, Steel], &[]),
        Fighting => (
            &[Normal, Ice, Rock, Dark, Steel],
            &[Poison, Flying, Psychic, Bug, Fairy],
            &[Ghost],
        ),
        Poison => (&[Grass, Fairy], &[Poison, Ground, Rock, Ghost], &[Steel]),
        Ground => (
            &[Fire, Electric, Poison, Rock, Steel],
            &[Grass, Bug],
            &[Flying],
        ),
        Flying => (&[Grass, Fighting, Bug], &[Electric, Rock, Steel], &[]),
        Psychic => (&[Fighting, Poison], &[Psychic, Steel], &[Dark]),
        Bug => (
            &[Grass, Psychic, Dark],
            &[Fire, Fighting, Poison, Flying, Ghost, Steel, Fairy],
            &[],
        ),
        Rock => (&[Fire, Ice, Flying, Bug], &[Fighting, Ground, Steel], &[]),
        Ghost => (&[Psychic, Ghost], &[Dark], &[Normal]),
        Dragon => (&[Dragon], &[Steel], &[Fairy]),
        Dark => (&[Psychic, Ghost], &[Fighting, Dark, Fairy], &[]),
        Steel => (&[Ice, Rock, Fairy], &[Fire, Water, Electric, Steel], &[]),
        Fairy => (&[Fighting, Dragon, Dark], &[Fire, Poison, Steel], &[]),
    };

    if immune.contains(&defender) {
        Matchup::Immune
    } else if strong.contains(&defender) {
        Matchup::SuperEffective
    } else if weak.contains(&defender) {
        Matchup::NotVeryEffective
    } else {
        Matchup::Neutral
    }
}

/// Combined multiplier of `attack` against every defending type.
///
/// Factors multiply, so a double weakness yields 4 and a single immunity
/// yields 0. A defender without types takes neutral damage.
#[must_use]
pub fn effectiveness(attack: ElementType, defenders: &[ElementType]) -> f32 {
    defenders
        .iter()
        .map(|defender| matchup(attack, *defender).multiplier())
        .product()
}

/// Reports whether the move's type is one of the attacker's own types.
#[must_use]
pub fn has_stab(attacker: &[ElementType], move_type: ElementType) -> bool {
    attacker.contains(&move_type)
}
