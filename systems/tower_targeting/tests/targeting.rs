use std::time::Duration;

use pokemon_defence_core::{
    Command, DamageClass, ElementType, EnemyBlueprint, EnemyId, Gender, Move, MoveEffect,
    Position, SpeciesId, Stats, TowerBlueprint, TowerId,
};
use pokemon_defence_system_tower_targeting::{nearest_enemy, TowerTargeting};
use pokemon_defence_world::{self as world, query, World};

fn tackle(manual: bool) -> Move {
    Move {
        name: "tackle".to_owned(),
        element: ElementType::Normal,
        power: 40,
        accuracy: 100,
        damage_class: DamageClass::Physical,
        effect: MoveEffect::default(),
        cooldown: Duration::from_millis(1400),
        current_cooldown: Duration::ZERO,
        aoe: false,
        aoe_radius: 0.0,
        manual,
    }
}

fn stats() -> Stats {
    Stats {
        hp: 40,
        attack: 40,
        defense: 40,
        special_attack: 40,
        special_defense: 40,
        speed: 40,
    }
}

fn place(world: &mut World, position: Position, moves: Vec<Move>) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::PlaceTower {
            blueprint: Box::new(TowerBlueprint {
                species: SpeciesId::new(25),
                name: "pikachu".to_owned(),
                level: 1,
                stats: stats(),
                types: vec![ElementType::Electric],
                position,
                moves,
                ability: None,
                sprite: String::new(),
                gender: Gender::Male,
                range: 3.0,
            }),
            cost: 10,
        },
        &mut events,
    );
}

fn spawn(world: &mut World, position: Position) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            blueprint: Box::new(EnemyBlueprint {
                species: SpeciesId::new(16),
                name: "pidgey".to_owned(),
                stats: stats(),
                types: vec![ElementType::Normal, ElementType::Flying],
                path: vec![position, Position::new(1000.0, 1000.0)],
                named: false,
                boss: false,
                reward: 10,
                experience: 20,
                move_speed: 50.0,
                sprite: String::new(),
                range: 60.0,
            }),
        },
        &mut events,
    );
}

#[test]
fn nearest_enemy_in_range_is_targeted_with_id_tie_break() {
    let mut world = World::new();
    place(&mut world, Position::new(0.0, 0.0), vec![tackle(false)]);
    spawn(&mut world, Position::new(100.0, 0.0));
    spawn(&mut world, Position::new(0.0, 100.0));
    spawn(&mut world, Position::new(150.0, 0.0));

    let mut targeting = TowerTargeting::new();
    let mut targets = Vec::new();
    targeting.handle(
        &query::tower_view(&world),
        &query::enemy_view(&world),
        &mut targets,
    );

    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].tower, TowerId::new(0));
    assert_eq!(targets[0].enemy, EnemyId::new(0));
    assert!((targets[0].distance - 100.0).abs() < 1e-3);
}

#[test]
fn out_of_range_enemies_are_ignored() {
    let mut world = World::new();
    place(&mut world, Position::new(0.0, 0.0), vec![tackle(false)]);
    spawn(&mut world, Position::new(193.0, 0.0));

    let mut targets = Vec::new();
    TowerTargeting::new().handle(
        &query::tower_view(&world),
        &query::enemy_view(&world),
        &mut targets,
    );
    assert!(targets.is_empty(), "range is three tiles of 64 units");
}

#[test]
fn towers_without_automatic_ready_moves_do_not_target() {
    let mut world = World::new();
    let mut cooling = tackle(false);
    cooling.current_cooldown = Duration::from_millis(300);
    place(&mut world, Position::new(0.0, 0.0), vec![cooling]);
    place(&mut world, Position::new(10.0, 0.0), vec![tackle(true)]);
    spawn(&mut world, Position::new(50.0, 0.0));

    let mut targets = vec![];
    TowerTargeting::new().handle(
        &query::tower_view(&world),
        &query::enemy_view(&world),
        &mut targets,
    );
    assert!(targets.is_empty());

    let manual = nearest_enemy(
        Position::new(10.0, 0.0),
        192.0,
        &query::enemy_view(&world),
    );
    assert_eq!(manual, Some(EnemyId::new(0)));
}
