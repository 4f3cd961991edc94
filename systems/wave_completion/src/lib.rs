#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave-completion check and end-of-wave reward pool.

use pokemon_defence_core::{Command, EnemyView, Item, ItemKey, TowerView};
use pokemon_defence_system_progression::TransformTables;
use rand::Rng;

/// Bonus-item chance contributed by each eligible tower.
pub const BONUS_CHANCE_PER_TOWER: f64 = 0.1;

/// Snapshot of the wave state the completion check needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveStatus {
    /// Whether a wave is running.
    pub active: bool,
    /// Spawns the spawner still has scheduled.
    pub pending_spawns: usize,
}

/// Pure system that ends a wave once it is fully spawned and cleared.
#[derive(Debug)]
pub struct WaveCompletion {
    tables: TransformTables,
}

impl WaveCompletion {
    /// Creates the system around the transformation tables used for bonus items.
    #[must_use]
    pub fn new(tables: TransformTables) -> Self {
        Self { tables }
    }

    /// Emits `Command::CompleteWave` when the active wave has nothing left to spawn or defeat.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        status: WaveStatus,
        enemies: &EnemyView,
        towers: &TowerView,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        if !status.active || status.pending_spawns > 0 || !enemies.is_empty() {
            return;
        }
        out.push(Command::CompleteWave {
            rewards: reward_pool(&self.tables, towers, rng),
        });
    }
}

impl Default for WaveCompletion {
    fn default() -> Self {
        Self::new(TransformTables::standard())
    }
}

/// Builds the end-of-wave reward pool.
///
/// A rare candy and a revive are always offered. Each may bring along a
/// transformation item for a random tower whose species has a special form,
/// with a chance of ten percent per such tower.
pub fn reward_pool<R: Rng + ?Sized>(
    tables: &TransformTables,
    towers: &TowerView,
    rng: &mut R,
) -> Vec<Item> {
    let base = [Item::RareCandy, Item::Revive];
    let eligible: Vec<ItemKey> = towers
        .iter()
        .filter_map(|tower| tables.special_item_for(tower.species))
        .collect();
    let chance = (BONUS_CHANCE_PER_TOWER * eligible.len() as f64).min(1.0);

    let mut rewards = base.to_vec();
    for _ in 0..base.len() {
        if eligible.is_empty() || rng.gen::<f64>() >= chance {
            continue;
        }
        let bonus = Item::Key(eligible[rng.gen_range(0..eligible.len())].clone());
        if !rewards.contains(&bonus) {
            rewards.push(bonus);
        }
    }
    rewards
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokemon_defence_core::{ElementType, Gender, Position, SpeciesId, Tower, TowerId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn tower(id: u32, species: u32) -> Tower {
        Tower {
            id: TowerId::new(id),
            species: SpeciesId::new(species),
            name: format!("species-{species}"),
            level: 30,
            experience: 2900,
            current_hp: 100,
            max_hp: 100,
            attack: 80,
            base_attack: 80,
            defense: 80,
            special_attack: 80,
            special_defense: 80,
            speed: 80,
            types: vec![ElementType::Fire],
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
    fn base_rewards_are_always_offered() {
        let tables = TransformTables::standard();
        let towers = TowerView::from_snapshots(vec![tower(0, 19)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..50 {
            assert_eq!(
                reward_pool(&tables, &towers, &mut rng),
                vec![Item::RareCandy, Item::Revive]
            );
        }
    }

    #[test]
    fn ten_eligible_towers_guarantee_a_bonus() {
        let tables = TransformTables::standard();
        let towers =
            TowerView::from_snapshots((0..10).map(|id| tower(id, 6)).collect::<Vec<_>>());
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let rewards = reward_pool(&tables, &towers, &mut rng);
        assert_eq!(
            rewards,
            vec![
                Item::RareCandy,
                Item::Revive,
                Item::Key(ItemKey::new("charizardite-x")),
            ]
        );
    }

    #[test]
    fn single_eligible_tower_earns_bonus_about_one_wave_in_five() {
        let tables = TransformTables::standard();
        let towers = TowerView::from_snapshots(vec![tower(0, 25)]);
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let trials = 4000;
        let with_bonus = (0..trials)
            .filter(|_| reward_pool(&tables, &towers, &mut rng).len() == 3)
            .count();
        let rate = with_bonus as f64 / f64::from(trials);
        assert!((0.15..0.23).contains(&rate), "bonus rate {rate}");
    }

    #[test]
    fn completes_only_when_spawned_and_cleared() {
        let mut system = WaveCompletion::default();
        let towers = TowerView::from_snapshots(Vec::new());
        let enemies = EnemyView::from_snapshots(Vec::new());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut out = Vec::new();

        let running = WaveStatus {
            active: true,
            pending_spawns: 3,
        };
        system.handle(running, &enemies, &towers, &mut rng, &mut out);
        let idle = WaveStatus {
            active: false,
            pending_spawns: 0,
        };
        system.handle(idle, &enemies, &towers, &mut rng, &mut out);
        assert!(out.is_empty());

        let done = WaveStatus {
            active: true,
            pending_spawns: 0,
        };
        system.handle(done, &enemies, &towers, &mut rng, &mut out);
        assert_eq!(
            out,
            vec![Command::CompleteWave {
                rewards: vec![Item::RareCandy, Item::Revive],
            }]
        );
    }
}
