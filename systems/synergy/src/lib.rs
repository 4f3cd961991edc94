#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Team-composition synergies and the stat buffs they grant.

use std::collections::BTreeMap;

use pokemon_defence_core::{CombatStats, ElementType, SpeciesId, Synergy, SynergyBucket, Tower};

/// Last dex number of each generation, in order.
const GENERATION_BOUNDS: [u32; 9] = [151, 251, 386, 493, 649, 721, 809, 905, 1025];

/// Alternate-form ids mapped to the generation that introduced them.
const FORM_GENERATIONS: &[(u32, u32, u8)] = &[
    (10033, 10079, 6),
    (10089, 10090, 5),
    (10155, 10156, 7),
    (10193, 10194, 8),
    (10195, 10228, 8),
];

const TYPE_MULTIPLIERS: [f64; 3] = [1.1, 1.3, 1.3];
const GENERATION_MULTIPLIERS: [f64; 3] = [1.1, 1.2, 1.3];

/// Generation of a species, or `None` for ids outside every known range.
#[must_use]
pub fn generation_of(species: SpeciesId) -> Option<u8> {
    let id = species.get();
    if id == 0 {
        return None;
    }
    if let Some(position) = GENERATION_BOUNDS.iter().position(|bound| id <= *bound) {
        return u8::try_from(position + 1).ok();
    }
    FORM_GENERATIONS
        .iter()
        .find(|(first, last, _)| (*first..=*last).contains(&id))
        .map(|(_, _, generation)| *generation)
}

/// Tier reached by a bucket of `count` active towers.
#[must_use]
pub const fn tier_for(count: usize) -> Option<u8> {
    match count {
        0 | 1 => None,
        2 | 3 => Some(1),
        4 | 5 => Some(2),
        _ => Some(3),
    }
}

/// Derives the active synergies of the team.
///
/// Fainted towers are ignored. Type synergies come first in canonical type
/// order, followed by generation synergies in ascending generation order.
#[must_use]
pub fn compute_synergies<'a>(towers: impl IntoIterator<Item = &'a Tower>) -> Vec<Synergy> {
    let mut counts: BTreeMap<SynergyBucket, usize> = BTreeMap::new();
    for tower in towers.into_iter().filter(|tower| tower.is_active()) {
        let mut seen: Vec<ElementType> = Vec::with_capacity(2);
        for element in &tower.types {
            if !seen.contains(element) {
                seen.push(*element);
                *counts.entry(SynergyBucket::Type(*element)).or_default() += 1;
            }
        }
        if let Some(generation) = generation_of(tower.species) {
            *counts
                .entry(SynergyBucket::Generation(generation))
                .or_default() += 1;
        }
    }

    counts
        .into_iter()
        .filter_map(|(bucket, count)| {
            tier_for(count).map(|tier| Synergy {
                bucket,
                count,
                tier,
                description: describe(bucket, tier),
            })
        })
        .collect()
}

fn multiplier(bucket: SynergyBucket, tier: u8) -> f64 {
    let index = usize::from(tier.clamp(1, 3) - 1);
    match bucket {
        SynergyBucket::Type(_) => TYPE_MULTIPLIERS[index],
        SynergyBucket::Generation(_) => GENERATION_MULTIPLIERS[index],
    }
}

fn describe(bucket: SynergyBucket, tier: u8) -> String {
    let percent = ((multiplier(bucket, tier) - 1.0) * 100.0).round();
    match bucket {
        SynergyBucket::Type(element) => {
            format!("{element} tier {tier}: +{percent}% attack and defense")
        }
        SynergyBucket::Generation(generation) => {
            format!("generation {generation} tier {tier}: +{percent}% attack and defense")
        }
    }
}

/// Offensive and defensive stats of a tower after synergy buffs.
///
/// The strongest type synergy and the strongest generation synergy the tower
/// belongs to multiply independently. Fainted towers receive no buff.
#[must_use]
pub fn buffed_stats(tower: &Tower, synergies: &[Synergy]) -> CombatStats {
    let live = CombatStats {
        attack: tower.attack,
        defense: tower.defense,
        special_attack: tower.special_attack,
        special_defense: tower.special_defense,
    };
    if !tower.is_active() {
        return live;
    }

    let generation = generation_of(tower.species);
    let mut type_factor = 1.0_f64;
    let mut generation_factor = 1.0_f64;
    for synergy in synergies {
        let factor = multiplier(synergy.bucket, synergy.tier);
        match synergy.bucket {
            SynergyBucket::Type(element) if tower.types.contains(&element) => {
                type_factor = type_factor.max(factor);
            }
            SynergyBucket::Generation(value) if generation == Some(value) => {
                generation_factor = generation_factor.max(factor);
            }
            _ => {}
        }
    }

    let factor = type_factor * generation_factor;
    let scale = |stat: u32| (f64::from(stat) * factor).floor() as u32;
    CombatStats {
        attack: scale(live.attack),
        defense: scale(live.defense),
        special_attack: scale(live.special_attack),
        special_defense: scale(live.special_defense),
    }
}
