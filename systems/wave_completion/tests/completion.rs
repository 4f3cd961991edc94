use pokemon_defence_core::{Command, Event, Item};
use pokemon_defence_system_wave_completion::{WaveCompletion, WaveStatus};
use pokemon_defence_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn check(world: &World, system: &mut WaveCompletion, rng: &mut ChaCha8Rng) -> Vec<Command> {
    let mut commands = Vec::new();
    system.handle(
        WaveStatus {
            active: query::wave_active(world),
            pending_spawns: 0,
        },
        &query::enemy_view(world),
        &query::tower_view(world),
        rng,
        &mut commands,
    );
    commands
}

#[test]
fn cleared_wave_pauses_and_offers_rewards_once() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartWave { wave: 3 }, &mut events);

    let mut system = WaveCompletion::default();
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let commands = check(&world, &mut system, &mut rng);
    assert_eq!(commands.len(), 1);

    events.clear();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert!(events.contains(&Event::WaveCleared { wave: 3 }));
    assert!(query::is_paused(&world));
    assert!(!query::wave_active(&world));
    assert_eq!(
        query::reward_offer(&world),
        Some(&[Item::RareCandy, Item::Revive][..])
    );
    assert!(check(&world, &mut system, &mut rng).is_empty());

    events.clear();
    world::apply(&mut world, Command::ClaimReward { index: 1 }, &mut events);
    assert_eq!(query::item_count(&world, &Item::Revive), 1);
    assert_eq!(query::reward_offer(&world), None);
}

#[test]
fn milestone_wave_signals_major_clear_instead_of_rewards() {
    let mut world = World::new();
    let mut events = Vec::new();
    let milestone = query::settings(&world).milestone_wave;
    world::apply(&mut world, Command::StartWave { wave: milestone }, &mut events);

    let mut system = WaveCompletion::default();
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    for command in check(&world, &mut system, &mut rng) {
        world::apply(&mut world, command, &mut events);
    }

    assert!(query::major_clear(&world));
    assert_eq!(query::reward_offer(&world), None);
    assert!(events.contains(&Event::MajorClear { wave: milestone }));
}
