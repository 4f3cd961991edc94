#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use pokemon_defence_core::{
    EnemyId, EnemyView, Position, TowerId, TowerTarget, TowerView, TILE_LENGTH,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Only standing towers holding a move that fires on its own this tick
    /// take part. The output buffer is cleared before populating it with the
    /// latest assignments, ordered by tower id.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(towers);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for tower in &self.tower_workspace {
            if let Some(best) = nearest(&self.enemy_workspace, tower.position, tower.radius) {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best.enemy,
                    distance: best.distance_sq.sqrt(),
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        self.tower_workspace.reserve(towers.len());

        for snapshot in towers.iter() {
            let armed = snapshot.moves.iter().any(|equipped| equipped.fires_automatically());
            if !snapshot.is_active() || !armed {
                continue;
            }
            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                radius: range_in_units(snapshot.range),
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());
        self.enemy_workspace
            .extend(enemies.iter().map(|snapshot| EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
            }));
    }
}

/// Converts a tower range in tiles into world units.
#[must_use]
pub fn range_in_units(range: f32) -> f32 {
    range * TILE_LENGTH
}

/// Nearest enemy within `radius` of `position`, used for manual casts.
#[must_use]
pub fn nearest_enemy(position: Position, radius: f32, enemies: &EnemyView) -> Option<EnemyId> {
    let candidates: Vec<EnemyCandidate> = enemies
        .iter()
        .map(|snapshot| EnemyCandidate {
            id: snapshot.id,
            position: snapshot.position,
        })
        .collect();
    nearest(&candidates, position, radius).map(|best| best.enemy)
}

fn nearest(
    candidates: &[EnemyCandidate],
    position: Position,
    radius: f32,
) -> Option<BestCandidate> {
    let max_distance = radius * radius;
    let mut best: Option<BestCandidate> = None;

    for candidate in candidates {
        let distance_sq = candidate.position.distance_squared(position);
        if distance_sq > max_distance {
            continue;
        }

        let current = BestCandidate {
            distance_sq,
            enemy: candidate.id,
        };
        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    best
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Position,
    radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Position,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }
        self.enemy < other.enemy
    }
}
