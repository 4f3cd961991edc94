use std::time::Duration;

use pokemon_defence_core::{
    Command, DamageClass, ElementType, EnemyBlueprint, Event, FireOutcome, Gender, Move,
    MoveEffect, Position, SpeciesId, Stats, TowerBlueprint, TowerId,
};
use pokemon_defence_system_projectiles::Projectiles;
use pokemon_defence_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn stats(hp: u32) -> Stats {
    Stats {
        hp,
        attack: 50,
        defense: 50,
        special_attack: 50,
        special_defense: 50,
        speed: 50,
    }
}

fn setup(enemy_position: Position) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceTower {
            blueprint: Box::new(TowerBlueprint {
                species: SpeciesId::new(25),
                name: "pikachu".to_owned(),
                level: 1,
                stats: stats(35),
                types: vec![ElementType::Electric],
                position: Position::ZERO,
                moves: vec![Move {
                    name: "thunder-shock".to_owned(),
                    element: ElementType::Electric,
                    power: 40,
                    accuracy: 100,
                    damage_class: DamageClass::Special,
                    effect: MoveEffect::default(),
                    cooldown: Duration::from_millis(1400),
                    current_cooldown: Duration::ZERO,
                    aoe: false,
                    aoe_radius: 0.0,
                    manual: false,
                }],
                ability: None,
                sprite: String::new(),
                gender: Gender::Male,
                range: 3.0,
            }),
            cost: 50,
        },
        &mut events,
    );
    world::apply(&mut world, Command::StartWave { wave: 1 }, &mut events);
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            blueprint: Box::new(EnemyBlueprint {
                species: SpeciesId::new(7),
                name: "squirtle".to_owned(),
                stats: stats(500),
                types: vec![ElementType::Water],
                path: vec![enemy_position, Position::new(2000.0, 0.0)],
                named: false,
                boss: false,
                reward: 10,
                experience: 20,
                move_speed: 0.0,
                sprite: String::new(),
                range: 60.0,
            }),
        },
        &mut events,
    );
    world
}

fn fire(world: &mut World) {
    let enemy = query::enemy_view(world)
        .iter()
        .next()
        .map(|enemy| enemy.id)
        .expect("enemy");
    let mut events = Vec::new();
    world::apply(
        world,
        Command::FireMove {
            tower: TowerId::new(0),
            slot: 0,
            target: enemy,
            outcome: FireOutcome::Hit,
            cooldown: Duration::from_millis(1400),
        },
        &mut events,
    );
}

#[test]
fn projectile_lands_and_damages_its_target() {
    let mut world = setup(Position::new(150.0, 0.0));
    fire(&mut world);
    assert_eq!(query::projectile_view(&world).len(), 1);

    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mut system = Projectiles::new();
    let mut resolved = false;
    for _ in 0..20 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        let mut commands = Vec::new();
        system.handle(
            &events,
            &query::projectile_view(&world),
            &query::enemy_view(&world),
            &query::tower_view(&world),
            &mut rng,
            &mut commands,
        );
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        if events
            .iter()
            .any(|event| matches!(event, Event::ProjectileResolved { hits: 1, .. }))
        {
            resolved = true;
            break;
        }
    }

    assert!(resolved, "projectile should reach a stationary enemy");
    assert!(query::projectile_view(&world).is_empty());
    let enemy = query::enemy_view(&world)
        .iter()
        .next()
        .cloned()
        .expect("enemy survives");
    assert!(enemy.hp < enemy.max_hp);
    let tower = query::tower(&world, TowerId::new(0)).expect("tower");
    assert_eq!(tower.damage_dealt, u64::from(enemy.max_hp - enemy.hp));
}

#[test]
fn projectile_is_discarded_when_its_target_escapes() {
    let mut world = setup(Position::new(150.0, 0.0));
    fire(&mut world);
    let enemy = query::enemy_view(&world)
        .iter()
        .next()
        .map(|enemy| enemy.id)
        .expect("enemy");

    let mut events = Vec::new();
    world::apply(&mut world, Command::EnemyEscaped { enemy }, &mut events);
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    let mut commands = Vec::new();
    Projectiles::new().handle(
        &events,
        &query::projectile_view(&world),
        &query::enemy_view(&world),
        &query::tower_view(&world),
        &mut ChaCha8Rng::seed_from_u64(1),
        &mut commands,
    );
    events.clear();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    assert!(query::projectile_view(&world).is_empty());
    assert!(events.contains(&Event::ProjectileResolved {
        projectile: pokemon_defence_core::ProjectileId::new(0),
        hits: 0,
    }));
}
