//! Towers, enemies, projectiles and floating damage numbers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Ability, ElementType, EnemyId, Gender, Move, MoveEffect, Position, ProjectileId, SpeciesId,
    Stats, TowerId,
};

/// Status ailments that can afflict towers and enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Periodic damage; halves attack while active.
    Burn,
    /// Periodic damage.
    Poison,
    /// Halves movement speed.
    Paralysis,
    /// Skips the unit's turn.
    Freeze,
    /// Skips the unit's turn.
    Sleep,
    /// Confuses the unit.
    Confusion,
}

/// Status effect attached to a tower or enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusEffect {
    /// Ailment.
    pub kind: StatusKind,
    /// Time left before the status expires.
    pub remaining: Duration,
    /// Hit points lost per simulated second.
    pub tick_damage: Option<u32>,
    /// Fractional damage carried between ticks.
    pub carry: f32,
}

/// Everything the world needs to construct a tower.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerBlueprint {
    /// Species.
    pub species: SpeciesId,
    /// Display name.
    pub name: String,
    /// Starting level.
    pub level: u32,
    /// Base stats before level scaling.
    pub stats: Stats,
    /// Elemental types.
    pub types: Vec<ElementType>,
    /// Placement position.
    pub position: Position,
    /// Starting moves.
    pub moves: Vec<Move>,
    /// Innate ability.
    pub ability: Option<Ability>,
    /// Sprite reference.
    pub sprite: String,
    /// Gender tag.
    pub gender: Gender,
    /// Attack range in tiles.
    pub range: f32,
}

/// Placed player creature.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    /// Instance identifier.
    pub id: TowerId,
    /// Species.
    pub species: SpeciesId,
    /// Display name.
    pub name: String,
    /// Current level, `1..=100`.
    pub level: u32,
    /// Total experience; only grows.
    pub experience: u64,
    /// Hit points remaining, `0..=max_hp`.
    pub current_hp: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Live attack, halved while burned.
    pub attack: u32,
    /// Attack baseline restored when buffs or burns end.
    pub base_attack: u32,
    /// Defense.
    pub defense: u32,
    /// Special attack.
    pub special_attack: u32,
    /// Special defense.
    pub special_defense: u32,
    /// Speed.
    pub speed: u32,
    /// One or two elemental types.
    pub types: Vec<ElementType>,
    /// World position.
    pub position: Position,
    /// Equipped moves, at most [`crate::MAX_EQUIPPED_MOVES`].
    pub moves: Vec<Move>,
    /// Names of moves the player declined.
    pub rejected_moves: Vec<String>,
    /// Innate ability.
    pub ability: Option<Ability>,
    /// Active status effect.
    pub status: Option<StatusEffect>,
    /// True iff `current_hp == 0`.
    pub fainted: bool,
    /// Sprite reference.
    pub sprite: String,
    /// Attack range in tiles.
    pub range: f32,
    /// Currency paid on placement.
    pub sell_value: u32,
    /// Enemies defeated.
    pub kills: u32,
    /// Cumulative damage dealt.
    pub damage_dealt: u64,
    /// Gender tag.
    pub gender: Gender,
}

impl Tower {
    /// Reports whether the tower can act.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.fainted
    }

    /// Reduces hit points, fainting at zero. Returns the damage applied.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        let applied = damage.min(self.current_hp);
        self.current_hp -= applied;
        if self.current_hp == 0 {
            self.fainted = true;
        }
        applied
    }

    /// Restores hit points up to the maximum. Fainted towers are not healed.
    pub fn heal(&mut self, amount: u32) {
        if self.fainted {
            return;
        }
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
    }
}

/// Everything the world needs to construct an enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyBlueprint {
    /// Species.
    pub species: SpeciesId,
    /// Display name.
    pub name: String,
    /// Scaled stats.
    pub stats: Stats,
    /// Elemental types.
    pub types: Vec<ElementType>,
    /// Waypoints to follow; the first one is the spawn point.
    pub path: Vec<Position>,
    /// Whether the enemy is a legendary or otherwise named spawn.
    pub named: bool,
    /// Whether the enemy is the wave boss.
    pub boss: bool,
    /// Currency awarded on defeat.
    pub reward: u32,
    /// Experience awarded to the tower that lands the final hit.
    pub experience: u64,
    /// Movement speed in units per second.
    pub move_speed: f32,
    /// Sprite reference.
    pub sprite: String,
    /// Attack range in world units.
    pub range: f32,
}

/// Wave spawn walking toward the end of its path.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Instance identifier.
    pub id: EnemyId,
    /// Species.
    pub species: SpeciesId,
    /// Display name.
    pub name: String,
    /// Hit points remaining.
    pub hp: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Live attack, halved while burned.
    pub attack: u32,
    /// Attack baseline restored when a burn ends.
    pub base_attack: u32,
    /// Defense.
    pub defense: u32,
    /// Special attack.
    pub special_attack: u32,
    /// Special defense.
    pub special_defense: u32,
    /// Speed.
    pub speed: u32,
    /// One or two elemental types.
    pub types: Vec<ElementType>,
    /// World position.
    pub position: Position,
    /// Waypoints to follow.
    pub path: Vec<Position>,
    /// Index of the next waypoint; only ever increases.
    pub path_index: usize,
    /// Active status effect.
    pub status: Option<StatusEffect>,
    /// Whether the enemy is a legendary or otherwise named spawn.
    pub named: bool,
    /// Whether the enemy is the wave boss.
    pub boss: bool,
    /// Currency awarded on defeat.
    pub reward: u32,
    /// Experience awarded on defeat.
    pub experience: u64,
    /// Movement speed in units per second.
    pub move_speed: f32,
    /// Sprite reference.
    pub sprite: String,
    /// Attack range in world units.
    pub range: f32,
    /// Time left before the next strike.
    pub attack_cooldown: Duration,
    /// Tower the enemy has locked on to.
    pub target: Option<TowerId>,
}

/// In-flight attack.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Instance identifier.
    pub id: ProjectileId,
    /// Launch position.
    pub origin: Position,
    /// Target position at launch.
    pub destination: Position,
    /// Current interpolated position.
    pub position: Position,
    /// Move power.
    pub power: u32,
    /// Move type.
    pub element: ElementType,
    /// Move effect payload.
    pub effect: MoveEffect,
    /// Travel speed in units per second.
    pub speed: f32,
    /// Enemy the projectile homes in on.
    pub target: EnemyId,
    /// Whether the impact damages every enemy in the radius.
    pub aoe: bool,
    /// Area-of-effect radius.
    pub aoe_radius: f32,
    /// Attacker stat chosen at launch from the damage class.
    pub attack_power: u32,
    /// Damage class of the move.
    pub damage_class: crate::DamageClass,
    /// Attacker types, for same-type attack bonus.
    pub attacker_types: Vec<ElementType>,
    /// Attacker, for ability-driven bonuses.
    pub attacker: TowerId,
}

/// Floating combat text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageNumber {
    /// Damage shown.
    pub value: u32,
    /// Current position.
    pub position: Position,
    /// Whether the hit was critical.
    pub critical: bool,
    /// Whether the number marks a miss.
    pub miss: bool,
    /// Lifetime left.
    pub remaining: Duration,
}

/// Read-only snapshot describing all towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<Tower>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<Tower>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured towers in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.snapshots.iter()
    }

    /// Looks up a tower by id.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&Tower> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured towers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Read-only snapshot describing all enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<Enemy>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<Enemy>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemies in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.snapshots.iter()
    }

    /// Looks up an enemy by id.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Read-only snapshot describing all projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<Projectile>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<Projectile>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectiles in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.snapshots.iter()
    }

    /// Number of captured projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tower(id: u32) -> Tower {
        Tower {
            id: TowerId::new(id),
            species: SpeciesId::new(25),
            name: "pikachu".to_owned(),
            level: 1,
            experience: 0,
            current_hp: 35,
            max_hp: 35,
            attack: 55,
            base_attack: 55,
            defense: 40,
            special_attack: 50,
            special_defense: 50,
            speed: 90,
            types: vec![ElementType::Electric],
            position: Position::ZERO,
            moves: Vec::new(),
            rejected_moves: Vec::new(),
            ability: None,
            status: None,
            fainted: false,
            sprite: String::new(),
            range: 3.0,
            sell_value: 100,
            kills: 0,
            damage_dealt: 0,
            gender: Gender::Male,
        }
    }

    #[test]
    fn damage_faints_at_zero_and_clamps() {
        let mut tower = tower(1);
        assert_eq!(tower.take_damage(10), 10);
        assert_eq!(tower.current_hp, 25);
        assert!(!tower.fainted);

        assert_eq!(tower.take_damage(100), 25);
        assert_eq!(tower.current_hp, 0);
        assert!(tower.fainted);
    }

    #[test]
    fn heal_caps_at_max_and_skips_fainted() {
        let mut tower = tower(1);
        let _ = tower.take_damage(20);
        tower.heal(100);
        assert_eq!(tower.current_hp, tower.max_hp);

        let _ = tower.take_damage(tower.max_hp);
        tower.heal(10);
        assert_eq!(tower.current_hp, 0);
    }

    #[test]
    fn views_sort_and_look_up_by_id() {
        let view = TowerView::from_snapshots(vec![tower(7), tower(2), tower(4)]);
        let ids: Vec<u32> = view.iter().map(|tower| tower.id.get()).collect();
        assert_eq!(ids, vec![2, 4, 7]);
        assert!(view.get(TowerId::new(4)).is_some());
        assert!(view.get(TowerId::new(5)).is_none());
    }
}
