#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session that owns the world and drives every system once per frame.
//!
//! Player actions and frame updates become [`Command`] batches applied to the
//! world. The resulting events are fed to the event-driven systems, and their
//! follow-up commands are applied in turn until the cascade settles. Observers
//! see every event in the order it was produced.
//!
//! Within a frame the stages run in a fixed order: the clock tick (cooldowns,
//! debuffs and statuses), the enemy phase, tower targeting and firing,
//! projectiles, damage-number ageing and finally the wave-completion check.

use std::{collections::VecDeque, time::Duration};

use chrono::Timelike;
use pokemon_defence_core::{
    Command, Debuff, Event, Gender, Item, ItemKey, Move, PlacementError, Position, ProviderError,
    SpeciesId, SpeciesProvider, TimeOfDay, TowerBlueprint, TowerId, TowerTarget,
    MAX_EQUIPPED_MOVES,
};
use pokemon_defence_system_abilities as abilities;
use pokemon_defence_system_enemy_behaviour::EnemyBehaviour;
use pokemon_defence_system_move_effects as move_effects;
use pokemon_defence_system_progression::{self as progression, EvolutionPlan, Progression};
use pokemon_defence_system_projectiles::Projectiles;
use pokemon_defence_system_spawning::WaveSpawner;
use pokemon_defence_system_tower_combat::{self as tower_combat, TowerCombat};
use pokemon_defence_system_tower_targeting::{self as tower_targeting, TowerTargeting};
use pokemon_defence_system_wave_completion::{WaveCompletion, WaveStatus};
use pokemon_defence_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

mod config;
mod stats;

pub use config::{ConfigError, SessionConfig};
pub use stats::SessionStats;

const LOG_TARGET: &str = "pokemon_defence::session";

/// Range in tiles of a freshly placed tower.
pub const DEFAULT_TOWER_RANGE: f32 = 3.0;

/// Receives every event the world emits, in order.
pub trait SessionObserver {
    /// Called once per event.
    fn on_event(&mut self, event: &Event);
}

/// Reasons a tower could not be placed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlaceError {
    /// The species could not be looked up.
    #[error("species data unavailable: {0}")]
    Provider(#[from] ProviderError),
    /// The world refused the placement.
    #[error("placement rejected: {0:?}")]
    Rejected(PlacementError),
}

/// Result of a player-requested evolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvolveOutcome {
    /// The tower became the given species.
    Evolved(SpeciesId),
    /// Several targets qualify; a choice was queued.
    ChoiceQueued(Vec<SpeciesId>),
    /// No transformation matches.
    NoMatch,
    /// The tower does not exist.
    UnknownTower,
    /// The named item is not in the inventory.
    MissingItem,
}

/// Result of a fusion request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FuseOutcome {
    /// The base tower became the given species and the material was consumed.
    Fused(SpeciesId),
    /// No recipe matches the pair and item.
    NoRecipe,
    /// One of the towers does not exist.
    UnknownTower,
    /// The named item is not in the inventory.
    MissingItem,
}

/// Top-level game session.
pub struct Session {
    config: SessionConfig,
    world: World,
    provider: Box<dyn SpeciesProvider>,
    rng: ChaCha8Rng,
    spawner: WaveSpawner,
    progression: Progression,
    enemy_behaviour: EnemyBehaviour,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
    wave_completion: WaveCompletion,
    observers: Vec<Box<dyn SessionObserver>>,
    stats: SessionStats,
    targets: Vec<TowerTarget>,
    events: Vec<Event>,
}

impl Session {
    /// Creates a session configured from `config` and backed by `provider`.
    #[must_use]
    pub fn new(config: SessionConfig, provider: Box<dyn SpeciesProvider>) -> Self {
        let mut session = Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            spawner: WaveSpawner::new(config.spawner_config()),
            world: World::new(),
            provider,
            progression: Progression::default(),
            enemy_behaviour: EnemyBehaviour::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            projectiles: Projectiles::new(),
            wave_completion: WaveCompletion::default(),
            observers: Vec::new(),
            stats: SessionStats::default(),
            targets: Vec::new(),
            events: Vec::new(),
            config,
        };
        let settings = session.config.world_settings();
        let _ = session.submit(Command::Configure { settings });
        tracing::info!(
            target: LOG_TARGET,
            seed = session.config.seed,
            difficulty = ?session.config.difficulty,
            "session.created"
        );
        session
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Running statistics.
    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Events produced by the most recent frame or action.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Registers an observer that sees every subsequent event.
    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Applies a raw command together with every follow-up it triggers.
    pub fn submit(&mut self, command: Command) -> &[Event] {
        self.events.clear();
        self.dispatch([command]);
        &self.events
    }

    /// Advances the simulation by `elapsed` real time.
    ///
    /// Provider lookups queued since the previous frame are resolved first,
    /// even while paused. Nothing else happens while paused or after game over.
    pub fn frame(&mut self, elapsed: Duration) -> &[Event] {
        self.events.clear();
        self.resolve_lookups();
        if query::is_paused(&self.world) || query::is_game_over(&self.world) {
            return &self.events;
        }

        let speed = f64::from(query::game_speed(&self.world));
        let dt = Duration::try_from_secs_f64(elapsed.as_secs_f64() * speed)
            .unwrap_or(Duration::MAX);
        if dt.is_zero() {
            return &self.events;
        }

        self.dispatch([Command::Tick { dt }]);
        let clock = [Event::TimeAdvanced { dt }];
        self.enemy_phase(&clock);
        self.tower_phase();
        self.projectile_phase(&clock);
        self.dispatch([Command::AgeDamageNumbers { dt }]);
        self.completion_check();
        &self.events
    }

    /// Places a level-one tower of `species`, paying `cost`.
    pub fn place_tower(
        &mut self,
        species: SpeciesId,
        position: Position,
        cost: u32,
    ) -> Result<TowerId, PlaceError> {
        self.events.clear();
        let blueprint = self.tower_blueprint(species, position)?;
        self.dispatch([Command::PlaceTower {
            blueprint: Box::new(blueprint),
            cost,
        }]);
        self.events
            .iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
                Event::PlacementRejected { reason, .. } => Some(Err(PlaceError::Rejected(*reason))),
                _ => None,
            })
            .unwrap_or(Err(PlaceError::Rejected(PlacementError::GameOver)))
    }

    /// Sells a tower for its refund. Returns `false` for unknown ids.
    pub fn sell_tower(&mut self, tower: TowerId) -> bool {
        self.act(Command::SellTower { tower }, |event| {
            matches!(event, Event::TowerSold { .. })
        })
    }

    /// Deducts `amount` if the balance covers it; never spends partially.
    pub fn spend_money(&mut self, amount: u32) -> bool {
        self.act(Command::SpendMoney { amount }, |event| {
            matches!(event, Event::MoneySpent { .. })
        })
    }

    /// Credits `amount`.
    pub fn add_money(&mut self, amount: u32) {
        let _ = self.submit(Command::AddMoney { amount });
    }

    /// Starts `wave`, unpausing the game.
    pub fn start_wave(&mut self, wave: u32) -> bool {
        self.act(Command::StartWave { wave }, |event| {
            matches!(event, Event::WaveStarted { .. })
        })
    }

    /// Starts the wave after the most recent one.
    pub fn start_next_wave(&mut self) -> Option<u32> {
        let next = query::wave(&self.world).saturating_add(1);
        self.start_wave(next).then_some(next)
    }

    /// Pauses or resumes the simulation.
    pub fn set_paused(&mut self, paused: bool) {
        let _ = self.submit(Command::SetPaused { paused });
    }

    /// Changes the time multiplier applied to every frame.
    pub fn set_game_speed(&mut self, speed: f32) {
        let _ = self.submit(Command::SetGameSpeed { speed });
    }

    /// Buys an item into the inventory.
    pub fn buy_item(&mut self, item: Item, price: u32) -> bool {
        self.act(Command::BuyItem { item, price }, |event| {
            matches!(event, Event::ItemAcquired { .. })
        })
    }

    /// Uses an inventory item on a tower.
    pub fn use_item(&mut self, item: Item, tower: TowerId) -> bool {
        self.act(Command::UseItem { item, tower }, |event| {
            matches!(event, Event::ItemUsed { .. })
        })
    }

    /// Buys and immediately uses an item, refunding it on an invalid target.
    pub fn purchase_and_use(&mut self, item: Item, price: u32, tower: TowerId) -> bool {
        self.act(Command::PurchaseAndUse { item, price, tower }, |event| {
            matches!(event, Event::ItemUsed { .. })
        })
    }

    /// Takes the end-of-wave reward at `index`.
    pub fn claim_reward(&mut self, index: usize) -> bool {
        self.act(Command::ClaimReward { index }, |event| {
            matches!(event, Event::ItemAcquired { .. })
        })
    }

    /// Learns an offered move, replacing `replace` when four are equipped.
    pub fn learn_move(&mut self, tower: TowerId, name: &str, replace: Option<usize>) -> bool {
        let command = Command::LearnMove {
            tower,
            name: name.to_owned(),
            replace,
        };
        self.act(command, |event| matches!(event, Event::MoveLearned { .. }))
    }

    /// Declines an offered move so it is never offered again.
    pub fn decline_move(&mut self, tower: TowerId, name: &str) -> bool {
        let command = Command::DeclineMove {
            tower,
            name: name.to_owned(),
        };
        self.act(command, |event| matches!(event, Event::MoveDeclined { .. }))
    }

    /// Dismisses a pending evolution choice.
    pub fn decline_evolution(&mut self, tower: TowerId) {
        let _ = self.submit(Command::DeclineEvolution { tower });
    }

    /// Evolves a tower, optionally with an item or towards an explicit target.
    ///
    /// An explicit target wins outright. Otherwise the item is matched against
    /// the mega and gigantamax tables before the evolution chain. An item that
    /// drives a transformation is consumed.
    pub fn evolve(
        &mut self,
        tower: TowerId,
        item: Option<ItemKey>,
        explicit: Option<SpeciesId>,
    ) -> Result<EvolveOutcome, ProviderError> {
        self.events.clear();
        let Some(current) = query::tower(&self.world, tower).cloned() else {
            return Ok(EvolveOutcome::UnknownTower);
        };
        if let Some(key) = &item {
            if query::item_count(&self.world, &Item::Key(key.clone())) == 0 {
                return Ok(EvolveOutcome::MissingItem);
            }
        }

        let time_of_day = self.time_of_day();
        let plan = self.progression.plan_evolution(
            self.provider.as_ref(),
            &current,
            item.as_ref(),
            explicit,
            time_of_day,
        )?;
        match plan {
            EvolutionPlan::Transform(into) => {
                let to = into.species;
                let mut commands = vec![Command::TransformTower {
                    tower,
                    from: current.species,
                    into,
                }];
                if let Some(key) = item {
                    commands.push(Command::ConsumeItem {
                        item: Item::Key(key),
                    });
                }
                self.dispatch(commands);
                tracing::info!(
                    target: LOG_TARGET,
                    tower = tower.get(),
                    from = %current.species,
                    to = %to,
                    "session.tower.evolved"
                );
                Ok(EvolveOutcome::Evolved(to))
            }
            EvolutionPlan::Choose(candidates) => {
                self.dispatch([Command::QueueEvolutionChoice {
                    tower,
                    candidates: candidates.clone(),
                    item,
                }]);
                Ok(EvolveOutcome::ChoiceQueued(candidates))
            }
            EvolutionPlan::NoMatch => Ok(EvolveOutcome::NoMatch),
        }
    }

    /// Fuses `material` into `base` using `item`.
    ///
    /// Any fee is charged by the caller beforehand.
    pub fn fuse(
        &mut self,
        base: TowerId,
        material: TowerId,
        item: ItemKey,
    ) -> Result<FuseOutcome, ProviderError> {
        self.events.clear();
        if base == material {
            return Ok(FuseOutcome::NoRecipe);
        }
        let (Some(base_tower), Some(material_tower)) = (
            query::tower(&self.world, base).cloned(),
            query::tower(&self.world, material).cloned(),
        ) else {
            return Ok(FuseOutcome::UnknownTower);
        };
        if query::item_count(&self.world, &Item::Key(item.clone())) == 0 {
            return Ok(FuseOutcome::MissingItem);
        }

        let Some(into) = self.progression.plan_fusion(
            self.provider.as_ref(),
            &base_tower,
            &material_tower,
            &item,
        )?
        else {
            return Ok(FuseOutcome::NoRecipe);
        };
        let species = into.species;
        self.dispatch([
            Command::FuseTowers {
                base,
                material,
                into,
            },
            Command::ConsumeItem {
                item: Item::Key(item),
            },
        ]);
        tracing::info!(
            target: LOG_TARGET,
            base = base.get(),
            material = material.get(),
            into = %species,
            "session.towers.fused"
        );
        Ok(FuseOutcome::Fused(species))
    }

    /// Casts the move in `slot` at the nearest enemy in range.
    ///
    /// Manual moves only fire this way. The cast shares the accuracy roll,
    /// cooldown and projectile path of automatic fire.
    pub fn cast_manual(&mut self, tower: TowerId, slot: usize) -> bool {
        self.events.clear();
        if query::is_paused(&self.world) || query::is_game_over(&self.world) {
            return false;
        }
        let Some(caster) = query::tower(&self.world, tower) else {
            return false;
        };
        if !caster.is_active() || !caster.moves.get(slot).is_some_and(Move::is_ready) {
            return false;
        }
        let radius = tower_targeting::range_in_units(caster.range);
        let enemies = query::enemy_view(&self.world);
        let Some(target) = tower_targeting::nearest_enemy(caster.position, radius, &enemies) else {
            return false;
        };
        let slowed = !query::attacks_slowed(&self.world).is_zero();
        let Some(command) = tower_combat::fire(caster, slot, target, slowed, &mut self.rng) else {
            return false;
        };
        self.dispatch([command]);
        true
    }

    /// Applies a debuff sent by an opponent.
    pub fn inject_debuff(&mut self, debuff: Debuff) -> &[Event] {
        self.submit(Command::ApplyDebuff { debuff })
    }

    /// Faints a random active tower, as the "instant kill" debuff does.
    pub fn faint_random_tower(&mut self) -> Option<TowerId> {
        let candidates: Vec<TowerId> = query::tower_view(&self.world)
            .iter()
            .filter(|tower| tower.is_active())
            .map(|tower| tower.id)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let tower = candidates[self.rng.gen_range(0..candidates.len())];
        let _ = self.inject_debuff(Debuff::FaintTower { tower });
        Some(tower)
    }

    /// Restores the configured starting state, leaving game over.
    pub fn reset(&mut self) {
        self.targets.clear();
        let _ = self.submit(Command::Reset);
    }

    /// Time of day used for evolution conditions.
    #[must_use]
    pub fn time_of_day(&self) -> TimeOfDay {
        self.config.time_of_day.unwrap_or_else(|| {
            if (6..18).contains(&chrono::Local::now().hour()) {
                TimeOfDay::Day
            } else {
                TimeOfDay::Night
            }
        })
    }

    fn act(&mut self, command: Command, succeeded: impl Fn(&Event) -> bool) -> bool {
        self.submit(command).iter().any(succeeded)
    }

    fn dispatch(&mut self, commands: impl IntoIterator<Item = Command>) {
        let mut queue: VecDeque<Command> = commands.into_iter().collect();
        let mut events = Vec::new();
        let mut follow_ups = Vec::new();

        while let Some(command) = queue.pop_front() {
            world::apply(&mut self.world, command, &mut events);
            if events.is_empty() {
                continue;
            }

            self.spawner.handle(
                &events,
                self.provider.as_ref(),
                query::difficulty(&self.world),
                query::map(&self.world),
                &mut follow_ups,
            );
            self.progression.handle(&events);
            for event in &events {
                log_event(&self.world, event);
                self.stats.record(event);
                for observer in &mut self.observers {
                    observer.on_event(event);
                }
            }

            self.events.append(&mut events);
            queue.extend(follow_ups.drain(..));
        }
    }

    fn resolve_lookups(&mut self) {
        if self.progression.pending() == 0 {
            return;
        }
        let mut commands = Vec::new();
        self.progression.resolve(
            self.provider.as_ref(),
            &query::tower_view(&self.world),
            &mut commands,
        );
        self.dispatch(commands);
    }

    fn enemy_phase(&mut self, clock: &[Event]) {
        let mut commands = Vec::new();
        self.enemy_behaviour.handle(
            clock,
            &query::enemy_view(&self.world),
            &query::tower_view(&self.world),
            query::synergies(&self.world),
            &mut commands,
        );
        self.dispatch(commands);
    }

    fn tower_phase(&mut self) {
        let towers = query::tower_view(&self.world);
        self.targeting
            .handle(&towers, &query::enemy_view(&self.world), &mut self.targets);
        let slowed = !query::attacks_slowed(&self.world).is_zero();
        let mut commands = Vec::new();
        self.combat
            .handle(&self.targets, &towers, slowed, &mut self.rng, &mut commands);
        self.dispatch(commands);
    }

    fn projectile_phase(&mut self, clock: &[Event]) {
        let mut commands = Vec::new();
        self.projectiles.handle(
            clock,
            &query::projectile_view(&self.world),
            &query::enemy_view(&self.world),
            &query::tower_view(&self.world),
            &mut self.rng,
            &mut commands,
        );
        self.dispatch(commands);
    }

    fn completion_check(&mut self) {
        let status = WaveStatus {
            active: query::wave_active(&self.world),
            pending_spawns: self.spawner.pending(),
        };
        let mut commands = Vec::new();
        self.wave_completion.handle(
            status,
            &query::enemy_view(&self.world),
            &query::tower_view(&self.world),
            &mut self.rng,
            &mut commands,
        );
        self.dispatch(commands);
    }

    fn tower_blueprint(
        &mut self,
        species: SpeciesId,
        position: Position,
    ) -> Result<TowerBlueprint, ProviderError> {
        let record = self.provider.species(species)?;
        let moves = self.starting_moves(record.id);
        let ability = record
            .abilities
            .first()
            .map(|name| abilities::assign(name, &mut self.rng));
        let gender = if self.rng.gen_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        };

        Ok(TowerBlueprint {
            species: record.id,
            name: record.name,
            level: 1,
            stats: record.stats,
            types: record.types,
            position,
            moves,
            ability,
            sprite: record.sprite,
            gender,
            range: DEFAULT_TOWER_RANGE,
        })
    }

    fn starting_moves(&self, species: SpeciesId) -> Vec<Move> {
        let names = match self.provider.moves_learned_up_to(species, 1) {
            Ok(names) => names,
            Err(error) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    species = %species,
                    %error,
                    "session.learnset.fallback"
                );
                Vec::new()
            }
        };
        let skip = names.len().saturating_sub(MAX_EQUIPPED_MOVES);
        let mut moves: Vec<Move> = names
            .iter()
            .skip(skip)
            .map(|name| progression::learnable_move(self.provider.as_ref(), name))
            .collect();
        if moves.is_empty() {
            moves.push(move_effects::fallback_move());
        }
        moves
    }
}

fn log_event(world: &World, event: &Event) {
    match event {
        Event::WaveStarted { wave } => {
            tracing::info!(target: LOG_TARGET, wave, "session.wave.started");
        }
        Event::WaveCleared { wave } => {
            tracing::info!(
                target: LOG_TARGET,
                wave,
                money = query::money(world),
                lives = query::lives(world),
                "session.wave.cleared"
            );
        }
        Event::MajorClear { wave } => {
            tracing::info!(target: LOG_TARGET, wave, "session.major_clear");
        }
        Event::GameOver => {
            tracing::warn!(
                target: LOG_TARGET,
                wave = query::wave(world),
                "session.game_over"
            );
        }
        _ => {}
    }
}
