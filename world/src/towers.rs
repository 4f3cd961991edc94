//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use pokemon_defence_core::{
    StatusKind, Tower, TowerBlueprint, TowerId, Transformation, MAX_EQUIPPED_MOVES,
};
use pokemon_defence_system_type_chart::status;

/// Experience needed per level.
pub(crate) const EXPERIENCE_PER_LEVEL: u64 = 100;

/// Highest reachable level.
pub(crate) const MAX_LEVEL: u32 = 100;

/// Experience total at which the level cap is reached.
pub(crate) const MAX_EXPERIENCE: u64 = (MAX_LEVEL as u64 - 1) * EXPERIENCE_PER_LEVEL;

/// Compound growth per level used when adopting new base stats.
const EVOLUTION_GROWTH: f64 = 1.05;

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Drops every tower while keeping the identifier counter monotonic.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Builds a tower from the blueprint and stores it under a fresh id.
    pub(crate) fn insert(&mut self, blueprint: TowerBlueprint, sell_value: u32) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, build_tower(id, blueprint, sell_value));
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<Tower> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&Tower> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tower> {
        self.entries.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

fn build_tower(id: TowerId, blueprint: TowerBlueprint, sell_value: u32) -> Tower {
    let level = blueprint.level.clamp(1, MAX_LEVEL);
    let scale = evolution_scale(level);
    let stats = blueprint.stats;
    let max_hp = scale_stat(stats.hp, scale).max(1);
    let attack = scale_stat(stats.attack, scale);
    let mut moves = blueprint.moves;
    moves.truncate(MAX_EQUIPPED_MOVES);

    Tower {
        id,
        species: blueprint.species,
        name: blueprint.name,
        level,
        experience: u64::from(level - 1) * EXPERIENCE_PER_LEVEL,
        current_hp: max_hp,
        max_hp,
        attack,
        base_attack: attack,
        defense: scale_stat(stats.defense, scale),
        special_attack: scale_stat(stats.special_attack, scale),
        special_defense: scale_stat(stats.special_defense, scale),
        speed: scale_stat(stats.speed, scale),
        types: blueprint.types,
        position: blueprint.position,
        moves,
        rejected_moves: Vec::new(),
        ability: blueprint.ability,
        status: None,
        fainted: false,
        sprite: blueprint.sprite,
        range: blueprint.range,
        sell_value,
        kills: 0,
        damage_dealt: 0,
        gender: blueprint.gender,
    }
}

/// Level reached with the given experience total.
pub(crate) fn level_for_experience(experience: u64) -> u32 {
    let level = experience / EXPERIENCE_PER_LEVEL + 1;
    u32::try_from(level).map_or(MAX_LEVEL, |level| level.min(MAX_LEVEL))
}

/// Experience still needed to reach the next level, or zero at the cap.
pub(crate) fn experience_to_next_level(tower: &Tower) -> u64 {
    if tower.level >= MAX_LEVEL {
        return 0;
    }
    (u64::from(tower.level) * EXPERIENCE_PER_LEVEL).saturating_sub(tower.experience)
}

/// Applies the flat five percent growth of a single level-up.
pub(crate) fn grow_one_level(tower: &mut Tower) {
    let grow = |value: u32| u32::try_from(u64::from(value) * 105 / 100).unwrap_or(u32::MAX);
    tower.max_hp = grow(tower.max_hp);
    tower.current_hp = grow(tower.current_hp);
    tower.attack = grow(tower.attack);
    tower.base_attack = grow(tower.base_attack);
    tower.defense = grow(tower.defense);
    tower.special_attack = grow(tower.special_attack);
    tower.special_defense = grow(tower.special_defense);
}

/// Compound growth factor applied to base stats at `level`.
pub(crate) fn evolution_scale(level: u32) -> f64 {
    let exponent = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
    EVOLUTION_GROWTH.powi(exponent)
}

fn scale_stat(base: u32, scale: f64) -> u32 {
    let scaled = (f64::from(base) * scale).floor();
    if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

/// Replaces the tower's species identity, keeping its health ratio.
pub(crate) fn transform(tower: &mut Tower, into: Transformation) {
    let ratio = if tower.max_hp == 0 {
        1.0
    } else {
        f64::from(tower.current_hp) / f64::from(tower.max_hp)
    };
    let scale = evolution_scale(tower.level);
    let stats = into.base_stats;

    tower.species = into.species;
    tower.name = into.name;
    tower.sprite = into.sprite;
    tower.types = into.types;

    tower.max_hp = scale_stat(stats.hp, scale).max(1);
    tower.current_hp = (f64::from(tower.max_hp) * ratio).floor() as u32;
    if !tower.fainted {
        tower.current_hp = tower.current_hp.clamp(1, tower.max_hp);
    }
    tower.base_attack = scale_stat(stats.attack, scale);
    tower.attack = match tower.status {
        Some(effect) if effect.kind == StatusKind::Burn => {
            status::modified_attack(effect.kind, tower.base_attack)
        }
        _ => tower.base_attack,
    };
    tower.defense = scale_stat(stats.defense, scale);
    tower.special_attack = scale_stat(stats.special_attack, scale);
    tower.special_defense = scale_stat(stats.special_defense, scale);
    tower.speed = scale_stat(stats.speed, scale);
}
