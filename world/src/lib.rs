#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Pokémon Defence.
//!
//! The world is the single owner of every tower, enemy, projectile, counter
//! and flag. It only changes through [`apply`], and every change is reported
//! through [`Event`] values. Commands naming ids that no longer exist are
//! silently ignored so that late results of provider lookups never fail.

use std::{
    collections::{BTreeMap, VecDeque},
    time::Duration,
};

use pokemon_defence_core::{
    Command, DamageClass, DamageNumber, Debuff, Enemy, EnemyBlueprint, EnemyId, Event, FireOutcome,
    Impact, Item, ItemError, Move, PendingChoice, PlacementError, Position, Projectile,
    ProjectileId, StatusKind, Synergy, TowerId, UnitRef, WorldSettings, MAX_EQUIPPED_MOVES,
};
use pokemon_defence_system_synergy as synergy;
use pokemon_defence_system_type_chart::status;

mod towers;

use towers::{TowerRegistry, MAX_EXPERIENCE, MAX_LEVEL};

/// Travel speed of tower projectiles in world units per second.
pub const PROJECTILE_SPEED: f32 = 400.0;

/// Lifetime of floating damage numbers.
pub const DAMAGE_NUMBER_LIFETIME: Duration = Duration::from_secs(1);

/// Upward drift of floating damage numbers in world units per second.
pub const DAMAGE_NUMBER_DRIFT: f32 = 30.0;

/// Currency refunded per tower level on sale.
pub const SELL_REFUND_PER_LEVEL: u32 = 20;

/// Remaining durations of the timed multiplayer debuffs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct DebuffTimers {
    slow_attacks: Duration,
    freeze_cooldowns: Duration,
    shop_disabled: Duration,
}

impl DebuffTimers {
    fn decay(&mut self, dt: Duration) {
        self.slow_attacks = self.slow_attacks.saturating_sub(dt);
        self.freeze_cooldowns = self.freeze_cooldowns.saturating_sub(dt);
        self.shop_disabled = self.shop_disabled.saturating_sub(dt);
    }
}

/// Represents the authoritative Pokémon Defence world state.
#[derive(Debug)]
pub struct World {
    settings: WorldSettings,
    towers: TowerRegistry,
    enemies: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: ProjectileId,
    damage_numbers: Vec<DamageNumber>,
    synergies: Vec<Synergy>,
    money: u32,
    lives: u32,
    wave: u32,
    wave_active: bool,
    paused: bool,
    game_over: bool,
    game_speed: f32,
    combo: u32,
    tick_index: u64,
    inventory: BTreeMap<Item, u32>,
    reward_offer: Option<Vec<Item>>,
    choices: VecDeque<PendingChoice>,
    major_clear: bool,
    debuffs: DebuffTimers,
}

impl World {
    /// Creates a world using the default settings.
    #[must_use]
    pub fn new() -> Self {
        let settings = WorldSettings::default();
        let mut world = Self {
            money: settings.starting_money,
            lives: settings.starting_lives,
            game_speed: settings.game_speed,
            settings,
            towers: TowerRegistry::new(),
            enemies: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
            projectiles: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
            damage_numbers: Vec::new(),
            synergies: Vec::new(),
            wave: 0,
            wave_active: false,
            paused: false,
            game_over: false,
            combo: 0,
            tick_index: 0,
            inventory: BTreeMap::new(),
            reward_offer: None,
            choices: VecDeque::new(),
            major_clear: false,
            debuffs: DebuffTimers::default(),
        };
        world.reset_state();
        world
    }

    fn reset_state(&mut self) {
        self.money = self.settings.starting_money;
        self.lives = self.settings.starting_lives;
        self.game_speed = sanitize_speed(self.settings.game_speed);
        self.towers.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.damage_numbers.clear();
        self.synergies.clear();
        self.wave = 0;
        self.wave_active = false;
        self.paused = false;
        self.game_over = false;
        self.combo = 0;
        self.tick_index = 0;
        self.inventory.clear();
        self.reward_offer = None;
        self.choices.clear();
        self.major_clear = false;
        self.debuffs = DebuffTimers::default();
    }

    fn refresh_synergies(&mut self, out_events: &mut Vec<Event>) {
        self.synergies = synergy::compute_synergies(self.towers.iter());
        out_events.push(Event::SynergiesUpdated {
            synergies: self.synergies.clone(),
        });
    }

    fn spend(&mut self, amount: u32, out_events: &mut Vec<Event>) -> bool {
        if self.money < amount {
            out_events.push(Event::SpendRejected {
                amount,
                balance: self.money,
            });
            return false;
        }
        self.money -= amount;
        out_events.push(Event::MoneySpent {
            amount,
            balance: self.money,
        });
        true
    }

    fn credit(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        self.money = self.money.saturating_add(amount);
        out_events.push(Event::MoneyEarned {
            amount,
            balance: self.money,
        });
    }

    fn add_item(&mut self, item: Item, out_events: &mut Vec<Event>) {
        *self.inventory.entry(item.clone()).or_default() += 1;
        out_events.push(Event::ItemAcquired { item });
    }

    fn take_item(&mut self, item: &Item) -> bool {
        let Some(count) = self.inventory.get_mut(item) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            let _ = self.inventory.remove(item);
        }
        true
    }

    fn shop_open(&self) -> bool {
        self.debuffs.shop_disabled.is_zero()
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        id
    }

    fn drop_choices(&mut self, tower: TowerId, evolution_only: bool) {
        self.choices.retain(|choice| {
            choice.tower() != tower
                || (evolution_only && matches!(choice, PendingChoice::MoveOffer { .. }))
        });
    }

    fn faint_tower(&mut self, id: TowerId, out_events: &mut Vec<Event>) {
        let Some(tower) = self.towers.get_mut(id) else {
            return;
        };
        if tower.fainted {
            return;
        }
        let _ = tower.take_damage(tower.current_hp);
        restore_after_status(tower.status.take(), &mut tower.attack, tower.base_attack);
        out_events.push(Event::TowerFainted { tower: id });
        self.refresh_synergies(out_events);
    }

    fn strike_tower(&mut self, id: TowerId, damage: u32, out_events: &mut Vec<Event>) {
        let Some(tower) = self.towers.get_mut(id) else {
            return;
        };
        if !tower.is_active() {
            return;
        }
        let applied = tower.take_damage(damage);
        push_number(&mut self.damage_numbers, applied, tower.position, false, false);
        out_events.push(Event::TowerDamaged {
            tower: id,
            damage: applied,
        });
        if tower.fainted {
            restore_after_status(tower.status.take(), &mut tower.attack, tower.base_attack);
            out_events.push(Event::TowerFainted { tower: id });
            self.refresh_synergies(out_events);
        }
    }

    fn grant_experience(&mut self, id: TowerId, amount: u64, out_events: &mut Vec<Event>) {
        let Some(tower) = self.towers.get_mut(id) else {
            return;
        };
        if amount == 0 || tower.experience >= MAX_EXPERIENCE {
            return;
        }

        let before = tower.experience;
        tower.experience = before.saturating_add(amount).min(MAX_EXPERIENCE);
        out_events.push(Event::ExperienceGained {
            tower: id,
            amount: tower.experience - before,
        });

        let reached = towers::level_for_experience(tower.experience);
        while tower.level < reached {
            tower.level += 1;
            towers::grow_one_level(tower);
            out_events.push(Event::TowerLeveledUp {
                tower: id,
                species: tower.species,
                level: tower.level,
            });
        }
    }

    fn defeat_enemy(&mut self, id: EnemyId, killer: Option<TowerId>, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemies.remove(&id) else {
            return;
        };
        self.combo = self.combo.saturating_add(1);
        out_events.push(Event::EnemyDefeated {
            enemy: id,
            tower: killer,
            reward: enemy.reward,
        });
        self.credit(enemy.reward, out_events);

        if let Some(killer) = killer {
            if let Some(tower) = self.towers.get_mut(killer) {
                tower.kills = tower.kills.saturating_add(1);
            }
            self.grant_experience(killer, enemy.experience, out_events);
        }
    }

    fn use_item_on(
        &mut self,
        item: &Item,
        id: TowerId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ItemError> {
        match item {
            Item::RareCandy => {
                let needed = match self.towers.get(id) {
                    Some(tower) if tower.level < MAX_LEVEL => towers::experience_to_next_level(tower),
                    _ => return Err(ItemError::InvalidTarget),
                };
                self.grant_experience(id, needed, out_events);
                Ok(())
            }
            Item::Revive => {
                let Some(tower) = self.towers.get_mut(id) else {
                    return Err(ItemError::InvalidTarget);
                };
                if !tower.fainted {
                    return Err(ItemError::InvalidTarget);
                }
                tower.fainted = false;
                // A one-hp tower halves to zero; floor at one so the revive sticks.
                tower.current_hp = (tower.max_hp / 2).max(1);
                out_events.push(Event::TowerRevived {
                    tower: id,
                    hp: tower.current_hp,
                });
                self.refresh_synergies(out_events);
                Ok(())
            }
            Item::Key(_) => Err(ItemError::InvalidTarget),
        }
    }

    fn tick_statuses(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut fainted = false;
        for tower in self.towers.iter_mut() {
            let Some(mut effect) = tower.status else {
                continue;
            };
            let tick = status::advance(&mut effect, dt);
            if tick.damage > 0 && tower.is_active() {
                let applied = tower.take_damage(tick.damage);
                out_events.push(Event::TowerDamaged {
                    tower: tower.id,
                    damage: applied,
                });
                if tower.fainted {
                    out_events.push(Event::TowerFainted { tower: tower.id });
                    fainted = true;
                }
            }
            if tick.expired || tower.fainted {
                restore_after_status(Some(effect), &mut tower.attack, tower.base_attack);
                tower.status = None;
                out_events.push(Event::StatusExpired {
                    unit: UnitRef::Tower(tower.id),
                    kind: effect.kind,
                });
            } else {
                tower.status = Some(effect);
            }
        }
        if fainted {
            self.refresh_synergies(out_events);
        }

        let mut defeated = Vec::new();
        for enemy in self.enemies.values_mut() {
            let Some(mut effect) = enemy.status else {
                continue;
            };
            let tick = status::advance(&mut effect, dt);
            if tick.damage > 0 {
                enemy.hp = enemy.hp.saturating_sub(tick.damage);
                if enemy.hp == 0 {
                    defeated.push(enemy.id);
                }
            }
            if tick.expired {
                restore_after_status(Some(effect), &mut enemy.attack, enemy.base_attack);
                enemy.status = None;
                out_events.push(Event::StatusExpired {
                    unit: UnitRef::Enemy(enemy.id),
                    kind: effect.kind,
                });
            } else {
                enemy.status = Some(effect);
            }
        }
        for enemy in defeated {
            self.defeat_enemy(enemy, None, out_events);
        }
    }

    fn offer_index(&self, tower: TowerId, name: &str) -> Option<usize> {
        self.choices.iter().position(|choice| match choice {
            PendingChoice::MoveOffer {
                tower: offered_to,
                moves,
            } => *offered_to == tower && moves.iter().any(|offered| offered.name == name),
            PendingChoice::Evolution { .. } => false,
        })
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn sanitize_speed(speed: f32) -> f32 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        1.0
    }
}

fn restore_after_status(
    effect: Option<pokemon_defence_core::StatusEffect>,
    attack: &mut u32,
    base_attack: u32,
) {
    if matches!(effect, Some(effect) if effect.kind == StatusKind::Burn) {
        *attack = base_attack;
    }
}

fn push_number(
    numbers: &mut Vec<DamageNumber>,
    value: u32,
    position: Position,
    critical: bool,
    miss: bool,
) {
    numbers.push(DamageNumber {
        value,
        position,
        critical,
        miss,
        remaining: DAMAGE_NUMBER_LIFETIME,
    });
}

fn take_offered_move(
    choices: &mut VecDeque<PendingChoice>,
    index: usize,
    name: &str,
) -> Option<Move> {
    let PendingChoice::MoveOffer { moves, .. } = choices.get_mut(index)? else {
        return None;
    };
    let position = moves.iter().position(|offered| offered.name == name)?;
    let taken = moves.remove(position);
    if moves.is_empty() {
        let _ = choices.remove(index);
    }
    Some(taken)
}

fn spawn_enemy(id: EnemyId, blueprint: EnemyBlueprint) -> Enemy {
    let position = blueprint.path.first().copied().unwrap_or(Position::ZERO);
    let stats = blueprint.stats;
    let max_hp = stats.hp.max(1);
    Enemy {
        id,
        species: blueprint.species,
        name: blueprint.name,
        hp: max_hp,
        max_hp,
        attack: stats.attack,
        base_attack: stats.attack,
        defense: stats.defense,
        special_attack: stats.special_attack,
        special_defense: stats.special_defense,
        speed: stats.speed,
        types: blueprint.types,
        position,
        path: blueprint.path,
        path_index: 1,
        status: None,
        named: blueprint.named,
        boss: blueprint.boss,
        reward: blueprint.reward,
        experience: blueprint.experience,
        move_speed: blueprint.move_speed,
        sprite: blueprint.sprite,
        range: blueprint.range,
        attack_cooldown: Duration::ZERO,
        target: None,
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Configure { settings } => {
            world.settings = settings;
            world.reset_state();
            out_events.push(Event::WorldReset);
        }
        Command::Reset => {
            world.reset_state();
            out_events.push(Event::WorldReset);
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            let cooldowns_frozen = !world.debuffs.freeze_cooldowns.is_zero();
            world.debuffs.decay(dt);
            if !cooldowns_frozen {
                for tower in world.towers.iter_mut().filter(|tower| tower.is_active()) {
                    for equipped in &mut tower.moves {
                        equipped.current_cooldown = equipped.current_cooldown.saturating_sub(dt);
                    }
                }
            }
            world.tick_statuses(dt, out_events);
        }
        Command::AgeDamageNumbers { dt } => {
            let drift = DAMAGE_NUMBER_DRIFT * dt.as_secs_f32();
            world.damage_numbers.retain_mut(|number| {
                number.remaining = number.remaining.saturating_sub(dt);
                number.position.y -= drift;
                !number.remaining.is_zero()
            });
        }
        Command::SetPaused { paused } => {
            if world.paused != paused {
                world.paused = paused;
                out_events.push(Event::PauseChanged { paused });
            }
        }
        Command::SetGameSpeed { speed } => {
            world.game_speed = sanitize_speed(speed);
            out_events.push(Event::GameSpeedChanged {
                speed: world.game_speed,
            });
        }
        Command::SpendMoney { amount } => {
            let _ = world.spend(amount, out_events);
        }
        Command::AddMoney { amount } => world.credit(amount, out_events),
        Command::PlaceTower { blueprint, cost } => {
            let species = blueprint.species;
            if world.game_over {
                out_events.push(Event::PlacementRejected {
                    species,
                    reason: PlacementError::GameOver,
                });
                return;
            }
            if world.money < cost {
                out_events.push(Event::PlacementRejected {
                    species,
                    reason: PlacementError::InsufficientFunds,
                });
                return;
            }
            let _ = world.spend(cost, out_events);
            let tower = world.towers.insert(*blueprint, cost);
            out_events.push(Event::TowerPlaced { tower, species });
            world.refresh_synergies(out_events);
        }
        Command::SellTower { tower } => {
            let Some(sold) = world.towers.remove(tower) else {
                out_events.push(Event::TowerSaleRejected { tower });
                return;
            };
            let refund = sold.level.saturating_mul(SELL_REFUND_PER_LEVEL);
            world.drop_choices(tower, false);
            out_events.push(Event::TowerSold { tower, refund });
            world.credit(refund, out_events);
            world.refresh_synergies(out_events);
        }
        Command::StartWave { wave } => {
            if world.game_over {
                return;
            }
            world.wave = wave;
            world.wave_active = true;
            world.major_clear = false;
            if world.paused {
                world.paused = false;
                out_events.push(Event::PauseChanged { paused: false });
            }
            out_events.push(Event::WaveStarted { wave });
        }
        Command::SpawnEnemy { blueprint } => {
            let id = world.allocate_enemy_id();
            let enemy = spawn_enemy(id, *blueprint);
            out_events.push(Event::EnemySpawned {
                enemy: id,
                species: enemy.species,
                boss: enemy.boss,
            });
            let _ = world.enemies.insert(id, enemy);
        }
        Command::SteerEnemy {
            enemy,
            position,
            path_index,
            target,
            attack_cooldown,
        } => {
            if let Some(steered) = world.enemies.get_mut(&enemy) {
                steered.position = position;
                steered.path_index = steered.path_index.max(path_index);
                steered.target = target;
                steered.attack_cooldown = attack_cooldown;
            }
        }
        Command::EnemyStrike {
            enemy,
            tower,
            damage,
        } => {
            if world.enemies.contains_key(&enemy) {
                world.strike_tower(tower, damage, out_events);
            }
        }
        Command::EnemyEscaped { enemy } => {
            if world.enemies.remove(&enemy).is_none() {
                return;
            }
            world.lives = world.lives.saturating_sub(1);
            out_events.push(Event::EnemyEscaped {
                enemy,
                lives: world.lives,
            });
            if world.lives == 0 && !world.game_over {
                world.game_over = true;
                out_events.push(Event::GameOver);
            }
        }
        Command::FireMove {
            tower,
            slot,
            target,
            outcome,
            cooldown,
        } => {
            let Some(attacker) = world.towers.get_mut(tower) else {
                return;
            };
            if !attacker.is_active() {
                return;
            }
            let Some(fired) = attacker.moves.get_mut(slot) else {
                return;
            };
            fired.current_cooldown = cooldown;

            let Some(attacker) = world.towers.get(tower) else {
                return;
            };
            let target_position = world.enemies.get(&target).map(|enemy| enemy.position);
            match outcome {
                FireOutcome::Miss => {
                    let position = target_position.unwrap_or(attacker.position);
                    push_number(&mut world.damage_numbers, 0, position, false, true);
                    out_events.push(Event::MoveMissed { tower, target });
                }
                FireOutcome::Hit => {
                    let Some(destination) = target_position else {
                        return;
                    };
                    let fired = &attacker.moves[slot];
                    let buffed = synergy::buffed_stats(attacker, &world.synergies);
                    let attack_power = match fired.damage_class {
                        DamageClass::Physical => buffed.attack,
                        DamageClass::Special | DamageClass::Status => buffed.special_attack,
                    };
                    let projectile = Projectile {
                        id: ProjectileId::new(0),
                        origin: attacker.position,
                        destination,
                        position: attacker.position,
                        power: fired.power,
                        element: fired.element,
                        effect: fired.effect.clone(),
                        speed: PROJECTILE_SPEED,
                        target,
                        aoe: fired.aoe,
                        aoe_radius: fired.aoe_radius,
                        attack_power,
                        damage_class: fired.damage_class,
                        attacker_types: attacker.types.clone(),
                        attacker: tower,
                    };
                    let id = world.allocate_projectile_id();
                    let _ = world
                        .projectiles
                        .insert(id, Projectile { id, ..projectile });
                    out_events.push(Event::ProjectileFired {
                        projectile: id,
                        tower,
                        target,
                    });
                }
            }
        }
        Command::AdvanceProjectile {
            projectile,
            position,
        } => {
            if let Some(moving) = world.projectiles.get_mut(&projectile) {
                moving.position = position;
            }
        }
        Command::ResolveProjectile { projectile, impact } => {
            resolve_projectile(world, projectile, impact, out_events);
        }
        Command::CompleteWave { rewards } => {
            if !world.wave_active {
                return;
            }
            world.wave_active = false;
            world.combo = 0;
            if !world.paused {
                world.paused = true;
                out_events.push(Event::PauseChanged { paused: true });
            }
            for tower in world.towers.iter_mut().filter(|tower| tower.is_active()) {
                tower.current_hp = tower.max_hp;
            }
            out_events.push(Event::WaveCleared { wave: world.wave });

            if world.wave == world.settings.milestone_wave {
                world.major_clear = true;
                out_events.push(Event::MajorClear { wave: world.wave });
            } else {
                world.reward_offer = Some(rewards.clone());
                out_events.push(Event::RewardOffered {
                    wave: world.wave,
                    choices: rewards,
                });
            }
        }
        Command::ClaimReward { index } => {
            let claimed = world
                .reward_offer
                .as_ref()
                .and_then(|offer| offer.get(index))
                .cloned();
            match claimed {
                Some(item) => {
                    world.reward_offer = None;
                    world.add_item(item, out_events);
                }
                None => out_events.push(Event::RewardClaimRejected { index }),
            }
        }
        Command::BuyItem { item, price } => {
            if !world.shop_open() {
                out_events.push(Event::ItemRejected {
                    item,
                    reason: ItemError::ShopDisabled,
                });
                return;
            }
            if !world.spend(price, out_events) {
                out_events.push(Event::ItemRejected {
                    item,
                    reason: ItemError::InsufficientFunds,
                });
                return;
            }
            world.add_item(item, out_events);
        }
        Command::UseItem { item, tower } => {
            if !world.inventory.contains_key(&item) {
                out_events.push(Event::ItemRejected {
                    item,
                    reason: ItemError::NotInInventory,
                });
                return;
            }
            match world.use_item_on(&item, tower, out_events) {
                Ok(()) => {
                    let _ = world.take_item(&item);
                    out_events.push(Event::ItemUsed { item, tower });
                }
                Err(reason) => out_events.push(Event::ItemRejected { item, reason }),
            }
        }
        Command::PurchaseAndUse { item, price, tower } => {
            if !world.shop_open() {
                out_events.push(Event::ItemRejected {
                    item,
                    reason: ItemError::ShopDisabled,
                });
                return;
            }
            if !world.spend(price, out_events) {
                out_events.push(Event::ItemRejected {
                    item,
                    reason: ItemError::InsufficientFunds,
                });
                return;
            }
            match world.use_item_on(&item, tower, out_events) {
                Ok(()) => out_events.push(Event::ItemUsed { item, tower }),
                Err(reason) => {
                    world.credit(price, out_events);
                    out_events.push(Event::ItemRejected { item, reason });
                }
            }
        }
        Command::ConsumeItem { item } => {
            if !world.take_item(&item) {
                out_events.push(Event::ItemRejected {
                    item,
                    reason: ItemError::NotInInventory,
                });
            }
        }
        Command::GrantExperience { tower, amount } => {
            world.grant_experience(tower, amount, out_events);
        }
        Command::OfferMoves { tower, moves } => {
            let Some(learner) = world.towers.get(tower) else {
                return;
            };
            let mut fresh: Vec<Move> = Vec::with_capacity(moves.len());
            for offered in moves {
                let known = learner
                    .moves
                    .iter()
                    .any(|equipped| equipped.name == offered.name)
                    || learner.rejected_moves.contains(&offered.name)
                    || fresh.iter().any(|kept| kept.name == offered.name);
                if !known {
                    fresh.push(offered);
                }
            }
            if fresh.is_empty() {
                return;
            }
            out_events.push(Event::MovesOffered {
                tower,
                moves: fresh.iter().map(|offered| offered.name.clone()).collect(),
            });
            world
                .choices
                .push_back(PendingChoice::MoveOffer { tower, moves: fresh });
        }
        Command::LearnMove {
            tower,
            name,
            replace,
        } => {
            let Some(index) = world.offer_index(tower, &name) else {
                return;
            };
            let Some(learner) = world.towers.get_mut(tower) else {
                return;
            };
            let slot = if learner.moves.len() < MAX_EQUIPPED_MOVES {
                None
            } else {
                match replace {
                    Some(slot) if slot < learner.moves.len() => Some(slot),
                    _ => return,
                }
            };
            let Some(learned) = take_offered_move(&mut world.choices, index, &name) else {
                return;
            };
            match slot {
                Some(slot) => learner.moves[slot] = learned,
                None => learner.moves.push(learned),
            }
            out_events.push(Event::MoveLearned { tower, name });
        }
        Command::DeclineMove { tower, name } => {
            let Some(index) = world.offer_index(tower, &name) else {
                return;
            };
            if take_offered_move(&mut world.choices, index, &name).is_none() {
                return;
            }
            if let Some(learner) = world.towers.get_mut(tower) {
                learner.rejected_moves.push(name.clone());
            }
            out_events.push(Event::MoveDeclined { tower, name });
        }
        Command::QueueEvolutionChoice {
            tower,
            candidates,
            item,
        } => {
            if candidates.is_empty() || world.towers.get(tower).is_none() {
                return;
            }
            world.drop_choices(tower, true);
            out_events.push(Event::EvolutionChoiceQueued {
                tower,
                candidates: candidates.clone(),
            });
            world.choices.push_back(PendingChoice::Evolution {
                tower,
                candidates,
                item,
            });
        }
        Command::DeclineEvolution { tower } => world.drop_choices(tower, true),
        Command::TransformTower { tower, from, into } => {
            let Some(evolving) = world.towers.get_mut(tower) else {
                return;
            };
            if evolving.species != from {
                return;
            }
            let to = into.species;
            towers::transform(evolving, *into);
            world.drop_choices(tower, true);
            out_events.push(Event::TowerEvolved { tower, from, to });
            world.refresh_synergies(out_events);
        }
        Command::FuseTowers {
            base,
            material,
            into,
        } => {
            if base == material
                || world.towers.get(base).is_none()
                || world.towers.get(material).is_none()
            {
                return;
            }
            let _ = world.towers.remove(material);
            world.drop_choices(material, false);
            let species = into.species;
            if let Some(fused) = world.towers.get_mut(base) {
                towers::transform(fused, *into);
            }
            world.drop_choices(base, true);
            out_events.push(Event::TowersFused {
                base,
                material,
                into: species,
            });
            world.refresh_synergies(out_events);
        }
        Command::ApplyDebuff { debuff } => {
            match debuff {
                Debuff::FaintTower { tower } => world.faint_tower(tower, out_events),
                Debuff::SlowAttacks { duration } => {
                    world.debuffs.slow_attacks = world.debuffs.slow_attacks.max(duration);
                }
                Debuff::FreezeCooldowns { duration } => {
                    world.debuffs.freeze_cooldowns = world.debuffs.freeze_cooldowns.max(duration);
                }
                Debuff::DisableShop { duration } => {
                    world.debuffs.shop_disabled = world.debuffs.shop_disabled.max(duration);
                }
                Debuff::SpawnBoss => {}
            }
            out_events.push(Event::DebuffApplied { debuff });
        }
    }
}

fn resolve_projectile(
    world: &mut World,
    projectile: ProjectileId,
    impact: Impact,
    out_events: &mut Vec<Event>,
) {
    let Some(resolved) = world.projectiles.remove(&projectile) else {
        return;
    };

    let mut hits = 0;
    let mut applied_total: u64 = 0;
    let mut defeated = Vec::new();
    for hit in impact.hits {
        let Some(enemy) = world.enemies.get_mut(&hit.enemy) else {
            continue;
        };
        hits += 1;

        let applied = hit.damage.min(enemy.hp);
        enemy.hp -= applied;
        applied_total += u64::from(applied);
        if hit.damage > 0 {
            push_number(
                &mut world.damage_numbers,
                hit.damage,
                enemy.position,
                hit.critical,
                false,
            );
        }
        if let Some(kind) = hit.status {
            if enemy.status.is_none() && enemy.hp > 0 {
                enemy.status = Some(status::inflict(kind, enemy.max_hp));
                enemy.attack = status::modified_attack(kind, enemy.base_attack);
                out_events.push(Event::StatusApplied {
                    unit: UnitRef::Enemy(enemy.id),
                    kind,
                });
            }
        }
        if enemy.hp == 0 {
            defeated.push(enemy.id);
        }
        if let Some(attacker) = world.towers.get_mut(resolved.attacker) {
            attacker.damage_dealt = attacker.damage_dealt.saturating_add(u64::from(applied));
        }
    }

    let lifesteal = (applied_total as f64 * f64::from(impact.lifesteal.max(0.0))).floor() as u64;
    let drain = applied_total * u64::from(resolved.effect.drain_percent) / 100;
    let heal = u32::try_from(lifesteal + drain).unwrap_or(u32::MAX);
    if heal > 0 {
        if let Some(attacker) = world.towers.get_mut(resolved.attacker) {
            attacker.heal(heal);
        }
    }
    out_events.push(Event::ProjectileResolved { projectile, hits });

    for enemy in defeated {
        world.defeat_enemy(enemy, Some(resolved.attacker), out_events);
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::{collections::BTreeMap, time::Duration};

    use super::World;
    use pokemon_defence_core::{
        DamageNumber, Difficulty, Enemy, EnemyId, EnemyView, Item, MapLayout, PendingChoice,
        ProjectileView, Synergy, Tower, TowerId, TowerView, WorldSettings,
    };

    /// Settings the world was configured with.
    #[must_use]
    pub fn settings(world: &World) -> &WorldSettings {
        &world.settings
    }

    /// Difficulty read by the spawner.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.settings.difficulty
    }

    /// Map read by the spawner.
    #[must_use]
    pub fn map(world: &World) -> &MapLayout {
        &world.settings.map
    }

    /// Current currency balance.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.money
    }

    /// Lives remaining.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Most recently started wave.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Reports whether a wave is in progress.
    #[must_use]
    pub fn wave_active(world: &World) -> bool {
        world.wave_active
    }

    /// Reports whether the simulation is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Reports whether lives ran out.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Scalar applied to frame time.
    #[must_use]
    pub fn game_speed(world: &World) -> f32 {
        world.game_speed
    }

    /// Consecutive defeats since the last wave completion.
    #[must_use]
    pub fn combo(world: &World) -> u32 {
        world.combo
    }

    /// Number of ticks processed since the last reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether the milestone wave was cleared.
    #[must_use]
    pub fn major_clear(world: &World) -> bool {
        world.major_clear
    }

    /// Looks up a single tower.
    #[must_use]
    pub fn tower(world: &World, id: TowerId) -> Option<&Tower> {
        world.towers.get(id)
    }

    /// Number of towers on the field.
    #[must_use]
    pub fn tower_count(world: &World) -> usize {
        world.towers.len()
    }

    /// Captures a read-only view of every tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().cloned().collect())
    }

    /// Looks up a single enemy.
    #[must_use]
    pub fn enemy(world: &World, id: EnemyId) -> Option<&Enemy> {
        world.enemies.get(&id)
    }

    /// Number of enemies on the field.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures a read-only view of every enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.values().cloned().collect())
    }

    /// Captures a read-only view of every in-flight projectile.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(world.projectiles.values().cloned().collect())
    }

    /// Floating damage numbers currently shown.
    #[must_use]
    pub fn damage_numbers(world: &World) -> &[DamageNumber] {
        &world.damage_numbers
    }

    /// Active synergies after the latest recomputation.
    #[must_use]
    pub fn synergies(world: &World) -> &[Synergy] {
        &world.synergies
    }

    /// Inventory contents with their counts.
    #[must_use]
    pub fn inventory(world: &World) -> &BTreeMap<Item, u32> {
        &world.inventory
    }

    /// Number of units of `item` held.
    #[must_use]
    pub fn item_count(world: &World, item: &Item) -> u32 {
        world.inventory.get(item).copied().unwrap_or(0)
    }

    /// Rewards offered after the last cleared wave, if unclaimed.
    #[must_use]
    pub fn reward_offer(world: &World) -> Option<&[Item]> {
        world.reward_offer.as_deref()
    }

    /// Pending player decisions in arrival order.
    pub fn choices(world: &World) -> impl Iterator<Item = &PendingChoice> {
        world.choices.iter()
    }

    /// Time left on the attack-slowing debuff.
    #[must_use]
    pub fn attacks_slowed(world: &World) -> Duration {
        world.debuffs.slow_attacks
    }

    /// Time left on the cooldown-freezing debuff.
    #[must_use]
    pub fn cooldowns_frozen(world: &World) -> Duration {
        world.debuffs.freeze_cooldowns
    }

    /// Reports whether purchases are currently rejected.
    #[must_use]
    pub fn shop_disabled(world: &World) -> bool {
        !world.shop_open()
    }
}
