#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy phase of the simulation tick: target acquisition, strikes and path walking.

use std::time::Duration;

use pokemon_defence_core::{
    Command, Enemy, EnemyView, Event, Position, Synergy, Tower, TowerId, TowerView,
};
use pokemon_defence_system_type_chart::status;

/// Move power plugged into the damage formula for enemy strikes.
pub const STRIKE_POWER: u32 = 40;

/// Delay between two strikes of the same enemy.
pub const STRIKE_COOLDOWN: Duration = Duration::from_secs(2);

/// Distance at which a waypoint counts as reached.
pub const ARRIVAL_RADIUS: f32 = 5.0;

/// Multiple of the enemy range within which towers are acquired as targets.
pub const ACQUISITION_FACTOR: f32 = 2.0;

/// Pure system that steers enemies and resolves their strikes against towers.
#[derive(Debug, Default)]
pub struct EnemyBehaviour;

impl EnemyBehaviour {
    /// Creates the enemy phase.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes tick events and emits steering, strike and escape commands.
    ///
    /// Enemies are visited in id order. Frozen or sleeping enemies are skipped
    /// entirely, including their attack cooldown.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        towers: &TowerView,
        synergies: &[Synergy],
        out: &mut Vec<Command>,
    ) {
        let dt = elapsed(events);
        if dt.is_zero() {
            return;
        }

        for enemy in enemies.iter() {
            if status::prevents_action(enemy.status.as_ref()) {
                continue;
            }
            step(enemy, towers, synergies, dt, out);
        }
    }
}

fn elapsed(events: &[Event]) -> Duration {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .sum()
}

fn step(
    enemy: &Enemy,
    towers: &TowerView,
    synergies: &[Synergy],
    dt: Duration,
    out: &mut Vec<Command>,
) {
    let mut cooldown = enemy.attack_cooldown.saturating_sub(dt);
    let target = live_target(enemy, towers)
        .and_then(|id| towers.get(id))
        .or_else(|| nearest_tower(enemy.position, enemy.range * ACQUISITION_FACTOR, towers));

    let travel =
        enemy.move_speed * status::speed_multiplier(enemy.status.as_ref()) * dt.as_secs_f32();
    let mut position = enemy.position;
    let mut path_index = enemy.path_index;
    let mut strike = None;

    match target {
        Some(tower) if position.distance(tower.position) <= enemy.range => {
            if cooldown.is_zero() {
                strike = Some(strike_damage(enemy, tower, synergies));
                cooldown = STRIKE_COOLDOWN;
            }
        }
        Some(tower) => position = step_toward(position, tower.position, travel),
        None => {
            let Some(waypoint) = enemy.path.get(path_index).copied() else {
                out.push(Command::EnemyEscaped { enemy: enemy.id });
                return;
            };
            position = step_toward(position, waypoint, travel);
            if position.distance(waypoint) <= ARRIVAL_RADIUS {
                position = waypoint;
                path_index += 1;
                if path_index >= enemy.path.len() {
                    out.push(Command::EnemyEscaped { enemy: enemy.id });
                    return;
                }
            }
        }
    }

    out.push(Command::SteerEnemy {
        enemy: enemy.id,
        position,
        path_index,
        target: target.map(|tower| tower.id),
        attack_cooldown: cooldown,
    });
    if let (Some(damage), Some(tower)) = (strike, target) {
        out.push(Command::EnemyStrike {
            enemy: enemy.id,
            tower: tower.id,
            damage,
        });
    }
}

/// Nearest active tower within `radius` of `position`; the lowest id wins exact ties.
#[must_use]
pub fn nearest_tower<'a>(
    position: Position,
    radius: f32,
    towers: &'a TowerView,
) -> Option<&'a Tower> {
    let mut best: Option<(&Tower, f32)> = None;
    for tower in towers.iter().filter(|tower| tower.is_active()) {
        let distance = position.distance(tower.position);
        if distance > radius {
            continue;
        }
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((tower, distance));
        }
    }
    best.map(|(tower, _)| tower)
}

/// Damage an enemy strike deals to the tower.
///
/// Type effectiveness does not apply on this side. The tower defends with its
/// synergy-buffed defense hardened by a tank ability.
#[must_use]
pub fn strike_damage(enemy: &Enemy, tower: &Tower, synergies: &[Synergy]) -> u32 {
    let buffed = pokemon_defence_system_synergy::buffed_stats(tower, synergies);
    let tank = pokemon_defence_system_abilities::tank_multiplier(tower.ability.as_ref());
    let defense = (buffed.defense as f32 * tank).floor() as u32;
    pokemon_defence_system_damage::damage(enemy.attack, defense, STRIKE_POWER, 1.0, false, false)
}

fn step_toward(from: Position, to: Position, distance: f32) -> Position {
    let delta = to - from;
    let length = delta.length();
    if length <= distance {
        return to;
    }
    from + delta / length * distance
}

/// Identifier of the tower an enemy is locked on to, if it still stands.
#[must_use]
pub fn live_target(enemy: &Enemy, towers: &TowerView) -> Option<TowerId> {
    enemy
        .target
        .filter(|id| towers.get(*id).is_some_and(Tower::is_active))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokemon_defence_core::{
        Ability, AbilityKind, ElementType, EnemyId, Gender, SpeciesId, StatusEffect, StatusKind,
    };

    fn tower(id: u32, position: Position) -> Tower {
        Tower {
            id: TowerId::new(id),
            species: SpeciesId::new(1),
            name: "bulbasaur".to_owned(),
            level: 1,
            experience: 0,
            current_hp: 100,
            max_hp: 100,
            attack: 50,
            base_attack: 50,
            defense: 50,
            special_attack: 50,
            special_defense: 50,
            speed: 50,
            types: vec![ElementType::Grass],
            position,
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

    fn enemy(position: Position, path: Vec<Position>) -> Enemy {
        Enemy {
            id: EnemyId::new(0),
            species: SpeciesId::new(19),
            name: "rattata".to_owned(),
            hp: 60,
            max_hp: 60,
            attack: 50,
            base_attack: 50,
            defense: 40,
            special_attack: 30,
            special_defense: 30,
            speed: 70,
            types: vec![ElementType::Normal],
            position,
            path,
            path_index: 1,
            status: None,
            named: false,
            boss: false,
            reward: 10,
            experience: 20,
            move_speed: 100.0,
            sprite: String::new(),
            range: 60.0,
            attack_cooldown: Duration::ZERO,
            target: None,
        }
    }

    fn tick(dt: Duration) -> Vec<Event> {
        vec![Event::TimeAdvanced { dt }]
    }

    fn run(enemies: Vec<Enemy>, towers: Vec<Tower>, dt: Duration) -> Vec<Command> {
        let mut commands = Vec::new();
        EnemyBehaviour::new().handle(
            &tick(dt),
            &EnemyView::from_snapshots(enemies),
            &TowerView::from_snapshots(towers),
            &[],
            &mut commands,
        );
        commands
    }

    #[test]
    fn walks_along_path_without_towers() {
        let path = vec![Position::new(0.0, 0.0), Position::new(500.0, 0.0)];
        let commands = run(
            vec![enemy(Position::new(0.0, 0.0), path)],
            Vec::new(),
            Duration::from_millis(500),
        );
        assert_eq!(
            commands,
            vec![Command::SteerEnemy {
                enemy: EnemyId::new(0),
                position: Position::new(50.0, 0.0),
                path_index: 1,
                target: None,
                attack_cooldown: Duration::ZERO,
            }]
        );
    }

    #[test]
    fn paralysis_halves_walking_speed() {
        let path = vec![Position::new(0.0, 0.0), Position::new(500.0, 0.0)];
        let mut slowed = enemy(Position::new(0.0, 0.0), path);
        slowed.status = Some(StatusEffect {
            kind: StatusKind::Paralysis,
            remaining: Duration::from_secs(5),
            tick_damage: None,
            carry: 0.0,
        });
        let commands = run(vec![slowed], Vec::new(), Duration::from_secs(1));
        assert!(matches!(
            commands.as_slice(),
            [Command::SteerEnemy { position, .. }] if *position == Position::new(50.0, 0.0)
        ));
    }

    #[test]
    fn frozen_enemies_do_nothing() {
        let path = vec![Position::new(0.0, 0.0), Position::new(500.0, 0.0)];
        let mut frozen = enemy(Position::new(0.0, 0.0), path);
        frozen.status = Some(StatusEffect {
            kind: StatusKind::Freeze,
            remaining: Duration::from_secs(2),
            tick_damage: None,
            carry: 0.0,
        });
        frozen.attack_cooldown = Duration::from_secs(1);
        assert!(run(vec![frozen], Vec::new(), Duration::from_millis(100)).is_empty());
    }

    #[test]
    fn snapping_to_last_waypoint_escapes() {
        let path = vec![Position::new(0.0, 0.0), Position::new(10.0, 0.0)];
        let commands = run(
            vec![enemy(Position::new(6.0, 0.0), path)],
            Vec::new(),
            Duration::from_millis(10),
        );
        assert_eq!(
            commands,
            vec![Command::EnemyEscaped {
                enemy: EnemyId::new(0)
            }]
        );
    }

    #[test]
    fn strikes_tower_in_range_and_resets_cooldown() {
        let path = vec![Position::new(0.0, 0.0), Position::new(500.0, 0.0)];
        let commands = run(
            vec![enemy(Position::new(0.0, 0.0), path)],
            vec![tower(0, Position::new(40.0, 0.0))],
            Duration::from_millis(16),
        );
        let expected =
            pokemon_defence_system_damage::damage(50, 50, STRIKE_POWER, 1.0, false, false);
        assert_eq!(
            commands,
            vec![
                Command::SteerEnemy {
                    enemy: EnemyId::new(0),
                    position: Position::new(0.0, 0.0),
                    path_index: 1,
                    target: Some(TowerId::new(0)),
                    attack_cooldown: STRIKE_COOLDOWN,
                },
                Command::EnemyStrike {
                    enemy: EnemyId::new(0),
                    tower: TowerId::new(0),
                    damage: expected,
                },
            ]
        );
    }

    #[test]
    fn closes_distance_to_acquired_tower() {
        let path = vec![Position::new(0.0, 0.0), Position::new(0.0, 500.0)];
        let commands = run(
            vec![enemy(Position::new(0.0, 0.0), path)],
            vec![tower(0, Position::new(100.0, 0.0))],
            Duration::from_millis(300),
        );
        assert!(matches!(
            commands.as_slice(),
            [Command::SteerEnemy { position, target: Some(_), .. }]
                if (*position - Position::new(30.0, 0.0)).length() < 1e-3
        ));
    }

    #[test]
    fn fainted_target_is_dropped_for_the_nearest_standing_tower() {
        let mut fainted = tower(0, Position::new(20.0, 0.0));
        fainted.fainted = true;
        fainted.current_hp = 0;
        let standing = tower(1, Position::new(50.0, 0.0));
        let mut locked = enemy(
            Position::new(0.0, 0.0),
            vec![Position::new(0.0, 0.0), Position::new(0.0, 500.0)],
        );
        locked.target = Some(TowerId::new(0));

        let towers = TowerView::from_snapshots(vec![fainted, standing]);
        assert_eq!(live_target(&locked, &towers), None);
        let mut commands = Vec::new();
        EnemyBehaviour::new().handle(
            &tick(Duration::from_millis(16)),
            &EnemyView::from_snapshots(vec![locked]),
            &towers,
            &[],
            &mut commands,
        );
        assert!(matches!(
            commands.first(),
            Some(Command::SteerEnemy { target: Some(id), .. }) if *id == TowerId::new(1)
        ));
    }

    #[test]
    fn ties_go_to_the_lowest_tower_id() {
        let towers = TowerView::from_snapshots(vec![
            tower(3, Position::new(0.0, 30.0)),
            tower(1, Position::new(30.0, 0.0)),
        ]);
        let nearest = nearest_tower(Position::ZERO, 120.0, &towers).map(|tower| tower.id);
        assert_eq!(nearest, Some(TowerId::new(1)));
        assert!(nearest_tower(Position::ZERO, 10.0, &towers).is_none());
    }

    #[test]
    fn tank_ability_hardens_defense() {
        let attacker = enemy(Position::ZERO, Vec::new());
        let plain = tower(0, Position::ZERO);
        let mut tank = tower(1, Position::ZERO);
        tank.ability = Some(Ability {
            name: "sturdy".to_owned(),
            kind: AbilityKind::Tank,
            value: 2.0,
        });
        assert!(strike_damage(&attacker, &tank, &[]) < strike_damage(&attacker, &plain, &[]));
    }

    #[test]
    fn no_time_no_commands() {
        let path = vec![Position::new(0.0, 0.0), Position::new(500.0, 0.0)];
        assert!(run(vec![enemy(Position::ZERO, path)], Vec::new(), Duration::ZERO).is_empty());
    }
}
