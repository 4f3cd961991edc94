#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level-up follow-ups, evolution resolution and fusion planning.
//!
//! Level-ups are reported by the world as events. The system queues one
//! lookup per level crossed and resolves the queue between frames against the
//! species provider, emitting move offers and transformations as commands.
//! Every emitted command names the species the tower had when the lookup was
//! queued so that the world can discard results that arrive too late.

use std::collections::VecDeque;

use pokemon_defence_core::{
    Command, Event, ItemKey, Move, ProviderError, SpeciesId, SpeciesProvider, TimeOfDay, Tower,
    TowerId, TowerView, Transformation,
};
use pokemon_defence_system_move_effects as move_effects;

mod evolution;
mod tables;

pub use evolution::{level_candidates, resolve, EvolutionContext, EvolutionResolution};
pub use tables::{FusionRecipe, TransformTables, MAX_MUSHROOMS};

const LOG_TARGET: &str = "pokemon_defence::progression";

/// Result of planning a player-requested evolution.
#[derive(Clone, Debug, PartialEq)]
pub enum EvolutionPlan {
    /// The tower adopts this identity.
    Transform(Box<Transformation>),
    /// Several targets qualify; the player has to pick one.
    Choose(Vec<SpeciesId>),
    /// Nothing qualifies.
    NoMatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LevelUpLookup {
    tower: TowerId,
    species: SpeciesId,
    level: u32,
}

/// Pure system that turns level-ups into move offers and evolutions.
#[derive(Debug)]
pub struct Progression {
    tables: TransformTables,
    pending: VecDeque<LevelUpLookup>,
}

impl Progression {
    /// Creates a progression system backed by the given transformation tables.
    #[must_use]
    pub fn new(tables: TransformTables) -> Self {
        Self {
            tables,
            pending: VecDeque::new(),
        }
    }

    /// Number of lookups waiting to be resolved.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Queues a lookup for every level-up reported by the world.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TowerLeveledUp {
                    tower,
                    species,
                    level,
                } => self.pending.push_back(LevelUpLookup {
                    tower: *tower,
                    species: *species,
                    level: *level,
                }),
                Event::WorldReset => self.pending.clear(),
                _ => {}
            }
        }
    }

    /// Resolves every queued lookup, emitting move offers and evolutions.
    ///
    /// Lookups for towers that are no longer present are dropped.
    pub fn resolve(
        &mut self,
        provider: &dyn SpeciesProvider,
        towers: &TowerView,
        out: &mut Vec<Command>,
    ) {
        while let Some(lookup) = self.pending.pop_front() {
            if towers.get(lookup.tower).is_none() {
                tracing::debug!(
                    target: LOG_TARGET,
                    tower = lookup.tower.get(),
                    "progression.lookup.stale"
                );
                continue;
            }
            offer_moves(provider, lookup, out);
            check_level_evolution(provider, lookup, out);
        }
    }

    /// Plans an evolution requested by the player.
    pub fn plan_evolution(
        &self,
        provider: &dyn SpeciesProvider,
        tower: &Tower,
        item: Option<&ItemKey>,
        explicit: Option<SpeciesId>,
        time_of_day: TimeOfDay,
    ) -> Result<EvolutionPlan, ProviderError> {
        let context = EvolutionContext {
            level: tower.level,
            gender: tower.gender,
            time_of_day,
            item,
        };
        let needs_chain = explicit.is_none()
            && item.map_or(true, |item| {
                self.tables.mega(tower.species, item).is_none()
                    && self.tables.max(tower.species, item).is_none()
            });
        let edges = if needs_chain {
            provider.evolutions(tower.species)?
        } else {
            Vec::new()
        };

        match resolve(&self.tables, tower.species, &edges, context, explicit) {
            EvolutionResolution::NoMatch => Ok(EvolutionPlan::NoMatch),
            EvolutionResolution::Single(target) => Ok(EvolutionPlan::Transform(Box::new(
                transformation_for(provider, target)?,
            ))),
            EvolutionResolution::Choice(candidates) => Ok(EvolutionPlan::Choose(candidates)),
        }
    }

    /// Plans fusing `material` into `base` with `item`, or `None` without a recipe.
    pub fn plan_fusion(
        &self,
        provider: &dyn SpeciesProvider,
        base: &Tower,
        material: &Tower,
        item: &ItemKey,
    ) -> Result<Option<Box<Transformation>>, ProviderError> {
        let Some(result) = self.tables.fusion(base.species, material.species, item) else {
            return Ok(None);
        };
        transformation_for(provider, result).map(|into| Some(Box::new(into)))
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::new(TransformTables::standard())
    }
}

/// Builds the identity a tower adopts when it becomes `species`.
pub fn transformation_for(
    provider: &dyn SpeciesProvider,
    species: SpeciesId,
) -> Result<Transformation, ProviderError> {
    let record = provider.species(species)?;
    Ok(Transformation {
        species: record.id,
        name: record.name,
        sprite: record.sprite,
        types: record.types,
        base_stats: record.stats,
    })
}

/// Translates a move by name, falling back to a plain tackle.
pub fn learnable_move(provider: &dyn SpeciesProvider, name: &str) -> Move {
    match provider.move_record(name) {
        Ok(record) => move_effects::translate(&record),
        Err(error) => {
            tracing::warn!(
                target: LOG_TARGET,
                move_name = name,
                %error,
                "progression.move.fallback"
            );
            move_effects::fallback_move()
        }
    }
}

fn offer_moves(provider: &dyn SpeciesProvider, lookup: LevelUpLookup, out: &mut Vec<Command>) {
    let names = match provider.moves_learned_at(lookup.species, lookup.level) {
        Ok(names) => names,
        Err(error) => {
            tracing::warn!(
                target: LOG_TARGET,
                species = lookup.species.get(),
                level = lookup.level,
                %error,
                "progression.learnset.skipped"
            );
            return;
        }
    };
    if names.is_empty() {
        return;
    }
    let moves = names
        .iter()
        .map(|name| learnable_move(provider, name))
        .collect();
    out.push(Command::OfferMoves {
        tower: lookup.tower,
        moves,
    });
}

fn check_level_evolution(
    provider: &dyn SpeciesProvider,
    lookup: LevelUpLookup,
    out: &mut Vec<Command>,
) {
    let edges = match provider.evolutions(lookup.species) {
        Ok(edges) => edges,
        Err(error) => {
            tracing::warn!(
                target: LOG_TARGET,
                species = lookup.species.get(),
                %error,
                "progression.evolution.skipped"
            );
            return;
        }
    };

    match level_candidates(&edges, lookup.level) {
        EvolutionResolution::NoMatch => {}
        EvolutionResolution::Single(target) => match transformation_for(provider, target) {
            Ok(into) => {
                tracing::info!(
                    target: LOG_TARGET,
                    tower = lookup.tower.get(),
                    from = lookup.species.get(),
                    to = target.get(),
                    "progression.evolution.ready"
                );
                out.push(Command::TransformTower {
                    tower: lookup.tower,
                    from: lookup.species,
                    into: Box::new(into),
                });
            }
            Err(error) => tracing::warn!(
                target: LOG_TARGET,
                species = target.get(),
                %error,
                "progression.evolution.skipped"
            ),
        },
        EvolutionResolution::Choice(candidates) => out.push(Command::QueueEvolutionChoice {
            tower: lookup.tower,
            candidates,
            item: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use pokemon_defence_core::{
        DamageClass, ElementType, EvolutionCondition, EvolutionEdge, Gender, MoveRecord,
        Position, SpeciesRecord, Stats,
    };

    #[derive(Default)]
    struct FakeProvider {
        species: BTreeMap<u32, SpeciesRecord>,
        learnsets: BTreeMap<(u32, u32), Vec<String>>,
        edges: BTreeMap<u32, Vec<EvolutionEdge>>,
        moves: BTreeMap<String, MoveRecord>,
    }

    impl FakeProvider {
        fn with_species(mut self, id: u32, name: &str) -> Self {
            let _ = self.species.insert(
                id,
                SpeciesRecord {
                    id: SpeciesId::new(id),
                    name: name.to_owned(),
                    stats: Stats {
                        hp: 60,
                        attack: 60,
                        defense: 60,
                        special_attack: 60,
                        special_defense: 60,
                        speed: 60,
                    },
                    types: vec![ElementType::Fire],
                    sprite: String::new(),
                    abilities: Vec::new(),
                    moves: Vec::new(),
                },
            );
            self
        }

        fn with_level_edge(mut self, from: u32, to: u32, level: u32) -> Self {
            self.edges.entry(from).or_default().push(EvolutionEdge {
                target: SpeciesId::new(to),
                condition: EvolutionCondition {
                    min_level: Some(level),
                    ..EvolutionCondition::default()
                },
            });
            self
        }
    }

    impl SpeciesProvider for FakeProvider {
        fn species(&self, id: SpeciesId) -> Result<SpeciesRecord, ProviderError> {
            self.species
                .get(&id.get())
                .cloned()
                .ok_or(ProviderError::UnknownSpecies(id))
        }

        fn move_record(&self, name: &str) -> Result<MoveRecord, ProviderError> {
            self.moves
                .get(name)
                .cloned()
                .ok_or_else(|| ProviderError::UnknownMove(name.to_owned()))
        }

        fn moves_learned_at(
            &self,
            species: SpeciesId,
            level: u32,
        ) -> Result<Vec<String>, ProviderError> {
            Ok(self
                .learnsets
                .get(&(species.get(), level))
                .cloned()
                .unwrap_or_default())
        }

        fn moves_learned_up_to(
            &self,
            _species: SpeciesId,
            _level: u32,
        ) -> Result<Vec<String>, ProviderError> {
            Ok(Vec::new())
        }

        fn evolutions(&self, species: SpeciesId) -> Result<Vec<EvolutionEdge>, ProviderError> {
            Ok(self.edges.get(&species.get()).cloned().unwrap_or_default())
        }
    }

    fn tower(id: u32, species: u32, level: u32) -> Tower {
        Tower {
            id: TowerId::new(id),
            species: SpeciesId::new(species),
            name: String::new(),
            level,
            experience: u64::from(level - 1) * 100,
            current_hp: 50,
            max_hp: 50,
            attack: 50,
            base_attack: 50,
            defense: 50,
            special_attack: 50,
            special_defense: 50,
            speed: 50,
            types: vec![ElementType::Fire],
            position: Position::ZERO,
            moves: Vec::new(),
            rejected_moves: Vec::new(),
            ability: None,
            status: None,
            fainted: false,
            sprite: String::new(),
            range: 3.0,
            sell_value: 0,
            kills: 0,
            damage_dealt: 0,
            gender: Gender::Male,
        }
    }

    fn level_up(tower: u32, species: u32, level: u32) -> Event {
        Event::TowerLeveledUp {
            tower: TowerId::new(tower),
            species: SpeciesId::new(species),
            level,
        }
    }

    #[test]
    fn level_threshold_emits_transformation() {
        let provider = FakeProvider::default()
            .with_species(5, "charmeleon")
            .with_level_edge(4, 5, 16);
        let mut progression = Progression::default();
        let towers = TowerView::from_snapshots(vec![tower(1, 4, 16)]);
        let mut out = Vec::new();

        progression.handle(&[level_up(1, 4, 15), level_up(1, 4, 16)]);
        assert_eq!(progression.pending(), 2);
        progression.resolve(&provider, &towers, &mut out);

        assert_eq!(progression.pending(), 0);
        match out.as_slice() {
            [Command::TransformTower { tower, from, into }] => {
                assert_eq!(*tower, TowerId::new(1));
                assert_eq!(*from, SpeciesId::new(4));
                assert_eq!(into.name, "charmeleon");
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn lookups_for_removed_towers_are_dropped() {
        let provider = FakeProvider::default()
            .with_species(5, "charmeleon")
            .with_level_edge(4, 5, 16);
        let mut progression = Progression::default();
        let mut out = Vec::new();

        progression.handle(&[level_up(9, 4, 16)]);
        progression.resolve(&provider, &TowerView::default(), &mut out);
        assert!(out.is_empty());
        assert_eq!(progression.pending(), 0);
    }

    #[test]
    fn unknown_moves_fall_back_to_tackle() {
        let mut provider = FakeProvider::default();
        let _ = provider
            .learnsets
            .insert((25, 5), vec!["thunder-wave".to_owned()]);
        let _ = provider.moves.insert(
            "thunder-wave".to_owned(),
            MoveRecord {
                name: "thunder-wave".to_owned(),
                element: ElementType::Electric,
                power: None,
                accuracy: Some(90),
                damage_class: DamageClass::Status,
                target: "selected-pokemon".to_owned(),
                effect: "Paralyzes the target.".to_owned(),
                effect_chance: None,
            },
        );
        let _ = provider
            .learnsets
            .insert((25, 6), vec!["volt-tackle".to_owned()]);

        let mut progression = Progression::default();
        let towers = TowerView::from_snapshots(vec![tower(1, 25, 6)]);
        let mut out = Vec::new();
        progression.handle(&[level_up(1, 25, 5), level_up(1, 25, 6)]);
        progression.resolve(&provider, &towers, &mut out);

        let offered: Vec<&str> = out
            .iter()
            .flat_map(|command| match command {
                Command::OfferMoves { moves, .. } => moves.iter().map(|m| m.name.as_str()).collect(),
                _ => Vec::new(),
            })
            .collect();
        assert_eq!(offered, vec!["thunder-wave", "tackle"]);
    }

    #[test]
    fn explicit_evolution_fetches_target_identity() {
        let provider = FakeProvider::default().with_species(136, "flareon");
        let progression = Progression::default();
        let plan = progression
            .plan_evolution(
                &provider,
                &tower(1, 133, 10),
                None,
                Some(SpeciesId::new(136)),
                TimeOfDay::Day,
            )
            .expect("plan");
        match plan {
            EvolutionPlan::Transform(into) => assert_eq!(into.species, SpeciesId::new(136)),
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn evolution_without_matching_edge_reports_no_match() {
        let provider = FakeProvider::default().with_level_edge(4, 5, 16);
        let progression = Progression::default();
        let plan = progression
            .plan_evolution(&provider, &tower(1, 4, 10), None, None, TimeOfDay::Day)
            .expect("plan");
        assert_eq!(plan, EvolutionPlan::NoMatch);
    }

    #[test]
    fn fusion_without_recipe_is_none() {
        let provider = FakeProvider::default().with_species(10089, "kyurem-white");
        let progression = Progression::default();
        let splicers = ItemKey::new("dna-splicers");

        let fused = progression
            .plan_fusion(&provider, &tower(1, 646, 50), &tower(2, 643, 50), &splicers)
            .expect("fusion");
        assert_eq!(fused.map(|into| into.species), Some(SpeciesId::new(10089)));

        let none = progression
            .plan_fusion(&provider, &tower(1, 646, 50), &tower(2, 25, 50), &splicers)
            .expect("fusion");
        assert!(none.is_none());
    }
}
