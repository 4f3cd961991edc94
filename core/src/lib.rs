#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pokémon Defence engine.
//!
//! This crate defines the message surface that connects the session, the
//! authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems
//! and observers to react to. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

mod moves;
mod provider;
mod units;

pub use moves::{
    Ability, AbilityKind, DamageClass, Move, MoveEffect, StatusInfliction, MAX_EQUIPPED_MOVES,
};
pub use provider::{MoveRecord, ProviderError, SpeciesProvider, SpeciesRecord};
pub use units::{
    DamageNumber, Enemy, EnemyBlueprint, EnemyView, Projectile, ProjectileView, StatusEffect,
    StatusKind, Tower, TowerBlueprint, TowerView,
};

/// Position in world units. The y axis grows downward, matching screen space.
pub type Position = glam::Vec2;

/// Number of world units covered by one tile of tower range.
pub const TILE_LENGTH: f32 = 64.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the world settings and resets every counter and collection.
    Configure {
        /// Settings that the world adopts.
        settings: WorldSettings,
    },
    /// Restores the configured starting state, clearing game-over.
    Reset,
    /// Advances the simulation clock, decaying tower cooldowns, debuffs and statuses.
    Tick {
        /// Simulated time that elapsed, already scaled by game speed.
        dt: Duration,
    },
    /// Ages floating damage numbers and removes expired ones.
    AgeDamageNumbers {
        /// Simulated time that elapsed.
        dt: Duration,
    },
    /// Pauses or resumes the simulation.
    SetPaused {
        /// Whether the simulation should be paused.
        paused: bool,
    },
    /// Changes the scalar applied to frame time before simulation work.
    SetGameSpeed {
        /// New game-speed multiplier.
        speed: f32,
    },
    /// Deducts currency only when the balance covers the full amount.
    SpendMoney {
        /// Amount to deduct.
        amount: u32,
    },
    /// Credits currency to the player.
    AddMoney {
        /// Amount to credit.
        amount: u32,
    },
    /// Places a tower, charging its cost atomically.
    PlaceTower {
        /// Fully resolved tower description.
        blueprint: Box<TowerBlueprint>,
        /// Currency charged for the placement.
        cost: u32,
    },
    /// Sells a tower for `level * 20` currency.
    SellTower {
        /// Tower to sell.
        tower: TowerId,
    },
    /// Marks a wave as active.
    StartWave {
        /// Wave number that started.
        wave: u32,
    },
    /// Inserts a spawned enemy into the world.
    SpawnEnemy {
        /// Fully resolved enemy description.
        blueprint: Box<EnemyBlueprint>,
    },
    /// Updates an enemy's movement, target and attack cooldown for this tick.
    SteerEnemy {
        /// Enemy being updated.
        enemy: EnemyId,
        /// Position after movement.
        position: Position,
        /// Path cursor after movement.
        path_index: usize,
        /// Locked target after re-acquisition.
        target: Option<TowerId>,
        /// Attack cooldown remaining after decay.
        attack_cooldown: Duration,
    },
    /// Applies an enemy attack against a tower.
    EnemyStrike {
        /// Attacking enemy.
        enemy: EnemyId,
        /// Tower struck by the attack.
        tower: TowerId,
        /// Damage dealt.
        damage: u32,
    },
    /// Removes an enemy that reached the end of its path, costing a life.
    EnemyEscaped {
        /// Enemy that escaped.
        enemy: EnemyId,
    },
    /// Fires a tower move, consuming its cooldown.
    FireMove {
        /// Tower firing the move.
        tower: TowerId,
        /// Equipped move slot that fired.
        slot: usize,
        /// Enemy aimed at.
        target: EnemyId,
        /// Result of the accuracy roll.
        outcome: FireOutcome,
        /// Cooldown assigned to the move after firing.
        cooldown: Duration,
    },
    /// Moves an in-flight projectile.
    AdvanceProjectile {
        /// Projectile being moved.
        projectile: ProjectileId,
        /// Interpolated position after travel.
        position: Position,
    },
    /// Resolves and destroys a projectile.
    ResolveProjectile {
        /// Projectile being resolved.
        projectile: ProjectileId,
        /// Damage, lifesteal and status outcome of the impact.
        impact: Impact,
    },
    /// Ends the active wave and presents its rewards.
    CompleteWave {
        /// Reward pool offered to the player.
        rewards: Vec<Item>,
    },
    /// Moves an offered reward into the inventory.
    ClaimReward {
        /// Index into the offered reward list.
        index: usize,
    },
    /// Purchases an item into the inventory.
    BuyItem {
        /// Item to purchase.
        item: Item,
        /// Price charged.
        price: u32,
    },
    /// Uses an inventory item on a tower.
    UseItem {
        /// Item to use.
        item: Item,
        /// Tower receiving the item.
        tower: TowerId,
    },
    /// Purchases an item and uses it immediately, refunding on an invalid target.
    PurchaseAndUse {
        /// Item to purchase and use.
        item: Item,
        /// Price charged.
        price: u32,
        /// Tower receiving the item.
        tower: TowerId,
    },
    /// Removes one unit of an item from the inventory.
    ConsumeItem {
        /// Item to consume.
        item: Item,
    },
    /// Grants experience to a tower, triggering level-ups.
    GrantExperience {
        /// Tower receiving experience.
        tower: TowerId,
        /// Amount of experience granted.
        amount: u64,
    },
    /// Queues newly learnable moves for the player to accept or decline.
    OfferMoves {
        /// Tower that can learn the moves.
        tower: TowerId,
        /// Moves offered.
        moves: Vec<Move>,
    },
    /// Equips an offered move.
    LearnMove {
        /// Tower learning the move.
        tower: TowerId,
        /// Name of the offered move.
        name: String,
        /// Slot replaced when the equipped list is full.
        replace: Option<usize>,
    },
    /// Declines an offered move so that it is never offered again.
    DeclineMove {
        /// Tower declining the move.
        tower: TowerId,
        /// Name of the declined move.
        name: String,
    },
    /// Queues an evolution prompt when several targets qualify.
    QueueEvolutionChoice {
        /// Tower that can evolve.
        tower: TowerId,
        /// Candidate species.
        candidates: Vec<SpeciesId>,
        /// Item that triggered the check, if any.
        item: Option<ItemKey>,
    },
    /// Drops a pending evolution prompt.
    DeclineEvolution {
        /// Tower whose prompt is dropped.
        tower: TowerId,
    },
    /// Replaces a tower's species identity (evolution, mega, max).
    TransformTower {
        /// Tower being transformed.
        tower: TowerId,
        /// Species the tower had when the transformation was resolved.
        from: SpeciesId,
        /// Identity and base stats the tower adopts.
        into: Box<Transformation>,
    },
    /// Fuses a material tower into a base tower.
    FuseTowers {
        /// Tower that keeps its id and adopts the fused identity.
        base: TowerId,
        /// Tower consumed by the fusion.
        material: TowerId,
        /// Identity and base stats the base tower adopts.
        into: Box<Transformation>,
    },
    /// Applies an externally injected multiplayer debuff.
    ApplyDebuff {
        /// Debuff to apply.
        debuff: Debuff,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the world adopted new settings or was reset.
    WorldReset,
    /// Reports a pause state change.
    PauseChanged {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Reports a game-speed change.
    GameSpeedChanged {
        /// New game-speed multiplier.
        speed: f32,
    },
    /// Confirms that currency was deducted.
    MoneySpent {
        /// Amount deducted.
        amount: u32,
        /// Balance after the deduction.
        balance: u32,
    },
    /// Reports that a spend request exceeded the balance.
    SpendRejected {
        /// Amount requested.
        amount: u32,
        /// Balance that was left untouched.
        balance: u32,
    },
    /// Confirms that currency was credited.
    MoneyEarned {
        /// Amount credited.
        amount: u32,
        /// Balance after the credit.
        balance: u32,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Species of the tower.
        species: SpeciesId,
    },
    /// Reports that a placement was rejected.
    PlacementRejected {
        /// Species requested for placement.
        species: SpeciesId,
        /// Reason for the rejection.
        reason: PlacementError,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Tower that was removed.
        tower: TowerId,
        /// Currency refunded.
        refund: u32,
    },
    /// Reports that a sale targeted an unknown tower.
    TowerSaleRejected {
        /// Identifier that was not found.
        tower: TowerId,
    },
    /// Reports the recomputed team synergies.
    SynergiesUpdated {
        /// Active synergies after recomputation.
        synergies: Vec<Synergy>,
    },
    /// Confirms that a wave started.
    WaveStarted {
        /// Wave number.
        wave: u32,
    },
    /// Confirms that an enemy entered the world.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Species of the enemy.
        species: SpeciesId,
        /// Whether the enemy is a wave boss.
        boss: bool,
    },
    /// Reports that an enemy was defeated.
    EnemyDefeated {
        /// Enemy that was removed.
        enemy: EnemyId,
        /// Tower credited with the kill; `None` when a status finished it.
        tower: Option<TowerId>,
        /// Currency awarded.
        reward: u32,
    },
    /// Reports that an enemy escaped, costing a life.
    EnemyEscaped {
        /// Enemy that was removed.
        enemy: EnemyId,
        /// Lives remaining afterwards.
        lives: u32,
    },
    /// Announces that lives reached zero.
    GameOver,
    /// Reports that a tower took damage.
    TowerDamaged {
        /// Tower that was struck.
        tower: TowerId,
        /// Damage applied.
        damage: u32,
    },
    /// Reports that a tower fainted.
    TowerFainted {
        /// Tower that fainted.
        tower: TowerId,
    },
    /// Reports that a fainted tower was revived.
    TowerRevived {
        /// Tower that was revived.
        tower: TowerId,
        /// Hit points after the revive.
        hp: u32,
    },
    /// Reports that a projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy targeted.
        target: EnemyId,
    },
    /// Reports that a tower move missed.
    MoveMissed {
        /// Tower whose move missed.
        tower: TowerId,
        /// Enemy that was aimed at.
        target: EnemyId,
    },
    /// Reports that a projectile reached its destination or lost its target.
    ProjectileResolved {
        /// Projectile that was destroyed.
        projectile: ProjectileId,
        /// Number of enemies damaged.
        hits: usize,
    },
    /// Reports that a status effect attached to a unit.
    StatusApplied {
        /// Afflicted unit.
        unit: UnitRef,
        /// Status applied.
        kind: StatusKind,
    },
    /// Reports that a status effect expired.
    StatusExpired {
        /// Unit that recovered.
        unit: UnitRef,
        /// Status that expired.
        kind: StatusKind,
    },
    /// Reports that a tower gained experience.
    ExperienceGained {
        /// Tower receiving experience.
        tower: TowerId,
        /// Amount gained after clamping at the level cap.
        amount: u64,
    },
    /// Reports that a tower crossed one or more level boundaries.
    TowerLeveledUp {
        /// Tower that leveled up.
        tower: TowerId,
        /// Species at the time of the level-up.
        species: SpeciesId,
        /// Level reached.
        level: u32,
    },
    /// Reports that moves were offered to a tower.
    MovesOffered {
        /// Tower receiving the offer.
        tower: TowerId,
        /// Names of the offered moves.
        moves: Vec<String>,
    },
    /// Reports that a tower equipped a move.
    MoveLearned {
        /// Tower learning the move.
        tower: TowerId,
        /// Name of the move.
        name: String,
    },
    /// Reports that a tower declined a move.
    MoveDeclined {
        /// Tower declining the move.
        tower: TowerId,
        /// Name of the move.
        name: String,
    },
    /// Reports that an evolution prompt was queued.
    EvolutionChoiceQueued {
        /// Tower that can evolve.
        tower: TowerId,
        /// Candidate species.
        candidates: Vec<SpeciesId>,
    },
    /// Reports that a tower adopted a new species identity.
    TowerEvolved {
        /// Tower that transformed.
        tower: TowerId,
        /// Previous species.
        from: SpeciesId,
        /// New species.
        to: SpeciesId,
    },
    /// Reports that two towers fused.
    TowersFused {
        /// Tower that adopted the fused identity.
        base: TowerId,
        /// Tower that was consumed.
        material: TowerId,
        /// Resulting species.
        into: SpeciesId,
    },
    /// Reports that a wave ended with every enemy cleared.
    WaveCleared {
        /// Wave number.
        wave: u32,
    },
    /// Reports the reward choices offered after a wave.
    RewardOffered {
        /// Wave number.
        wave: u32,
        /// Offered items.
        choices: Vec<Item>,
    },
    /// Reports that the milestone wave was cleared.
    MajorClear {
        /// Wave number.
        wave: u32,
    },
    /// Reports that a reward claim named no offered reward.
    RewardClaimRejected {
        /// Index that was requested.
        index: usize,
    },
    /// Reports that an item entered the inventory.
    ItemAcquired {
        /// Item acquired.
        item: Item,
    },
    /// Reports that an item was used on a tower.
    ItemUsed {
        /// Item used.
        item: Item,
        /// Tower receiving the item.
        tower: TowerId,
    },
    /// Reports that an item action was rejected.
    ItemRejected {
        /// Item involved.
        item: Item,
        /// Reason for the rejection.
        reason: ItemError,
    },
    /// Reports that a multiplayer debuff took effect.
    DebuffApplied {
        /// Debuff applied.
        debuff: Debuff,
    },
}

/// Reasons a tower placement may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The balance does not cover the placement cost.
    InsufficientFunds,
    /// The game is over and requires a reset.
    GameOver,
}

/// Reasons an item action may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemError {
    /// The balance does not cover the price.
    InsufficientFunds,
    /// The shop is disabled by a debuff.
    ShopDisabled,
    /// The inventory does not hold the item.
    NotInInventory,
    /// The tower is missing or the item has no effect on it.
    InvalidTarget,
}

/// Result of a tower move's accuracy roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FireOutcome {
    /// The move connects and launches a projectile.
    Hit,
    /// The move misses and only emits a miss marker.
    Miss,
}

/// Damage, lifesteal and status outcome of a projectile impact.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Impact {
    /// Where the projectile resolved.
    pub position: Position,
    /// Per-enemy results.
    pub hits: Vec<Hit>,
    /// Share of the damage applied that the attacker's ability returns as health.
    pub lifesteal: f32,
}

/// Result of a projectile against a single enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Enemy struck.
    pub enemy: EnemyId,
    /// Damage dealt.
    pub damage: u32,
    /// Whether the hit was critical.
    pub critical: bool,
    /// Type effectiveness multiplier applied.
    pub effectiveness: f32,
    /// Status inflicted by the hit, if any.
    pub status: Option<StatusKind>,
}

/// Enemy chosen by a tower during the targeting phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected as the nearest one in range.
    pub enemy: EnemyId,
    /// Distance between tower and enemy in world units.
    pub distance: f32,
}

/// Reference to a unit that can carry a status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitRef {
    /// A player tower.
    Tower(TowerId),
    /// A wave enemy.
    Enemy(EnemyId),
}

/// Multiplayer debuffs injected by an opponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Debuff {
    /// Instantly faints the given tower.
    FaintTower {
        /// Tower to faint.
        tower: TowerId,
    },
    /// Doubles tower move cooldowns for a while.
    SlowAttacks {
        /// How long the slow lasts.
        duration: Duration,
    },
    /// Stops tower cooldowns from decaying for a while.
    FreezeCooldowns {
        /// How long the freeze lasts.
        duration: Duration,
    },
    /// Spawns an extra boss immediately.
    SpawnBoss,
    /// Closes the shop for a while.
    DisableShop {
        /// How long the shop stays closed.
        duration: Duration,
    },
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// National dex number of a species, including alternate-form ids above 10000.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeciesId(u32);

impl SpeciesId {
    /// Creates a new species identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric dex number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The eighteen elemental types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Normal type.
    Normal,
    /// Fire type.
    Fire,
    /// Water type.
    Water,
    /// Electric type.
    Electric,
    /// Grass type.
    Grass,
    /// Ice type.
    Ice,
    /// Fighting type.
    Fighting,
    /// Poison type.
    Poison,
    /// Ground type.
    Ground,
    /// Flying type.
    Flying,
    /// Psychic type.
    Psychic,
    /// Bug type.
    Bug,
    /// Rock type.
    Rock,
    /// Ghost type.
    Ghost,
    /// Dragon type.
    Dragon,
    /// Dark type.
    Dark,
    /// Steel type.
    Steel,
    /// Fairy type.
    Fairy,
}

impl ElementType {
    /// Every type in canonical order.
    pub const ALL: [ElementType; 18] = [
        Self::Normal,
        Self::Fire,
        Self::Water,
        Self::Electric,
        Self::Grass,
        Self::Ice,
        Self::Fighting,
        Self::Poison,
        Self::Ground,
        Self::Flying,
        Self::Psychic,
        Self::Bug,
        Self::Rock,
        Self::Ghost,
        Self::Dragon,
        Self::Dark,
        Self::Steel,
        Self::Fairy,
    ];

    /// Lowercase name used by the species-data provider.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Electric => "electric",
            Self::Grass => "grass",
            Self::Ice => "ice",
            Self::Fighting => "fighting",
            Self::Poison => "poison",
            Self::Ground => "ground",
            Self::Flying => "flying",
            Self::Psychic => "psychic",
            Self::Bug => "bug",
            Self::Rock => "rock",
            Self::Ghost => "ghost",
            Self::Dragon => "dragon",
            Self::Dark => "dark",
            Self::Steel => "steel",
            Self::Fairy => "fairy",
        }
    }

    /// Parses a provider type name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|element| element.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Six base stats reported by the species-data provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stats {
    /// Hit points.
    pub hp: u32,
    /// Physical attack.
    pub attack: u32,
    /// Physical defense.
    pub defense: u32,
    /// Special attack.
    pub special_attack: u32,
    /// Special defense.
    pub special_defense: u32,
    /// Speed.
    pub speed: u32,
}

/// Offensive and defensive stats after synergy buffs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CombatStats {
    /// Physical attack.
    pub attack: u32,
    /// Physical defense.
    pub defense: u32,
    /// Special attack.
    pub special_attack: u32,
    /// Special defense.
    pub special_defense: u32,
}

/// Gender tag carried by towers; some evolutions depend on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// No gender.
    Genderless,
}

/// Coarse time of day consulted by some evolutions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 06:00 to 17:59.
    Day,
    /// 18:00 to 05:59.
    Night,
}

/// Difficulty selected for the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Weaker enemies with smaller rewards.
    Easy,
    /// Baseline tuning.
    #[default]
    Normal,
    /// Tougher enemies with larger rewards.
    Hard,
    /// The toughest enemies with the largest rewards.
    Expert,
}

/// Name of a transformation item such as an evolution stone or mega stone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey(String);

impl ItemKey {
    /// Creates a new item key from its provider name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Provider name of the item.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Items that can be held in the inventory.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Item {
    /// Grants exactly enough experience to reach the next level.
    RareCandy,
    /// Revives a fainted tower at half health.
    Revive,
    /// Transformation item consumed by evolution, mega or max resolution.
    Key(ItemKey),
}

/// Team-composition bucket shared by several towers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SynergyBucket {
    /// Towers sharing an elemental type.
    Type(ElementType),
    /// Towers from the same generation.
    Generation(u8),
}

/// Active team-wide bonus derived from composition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Synergy {
    /// Bucket the bonus belongs to.
    pub bucket: SynergyBucket,
    /// Number of active towers in the bucket.
    pub count: usize,
    /// Tier reached: 1, 2 or 3.
    pub tier: u8,
    /// Human-readable description.
    pub description: String,
}

/// Species identity adopted by a tower through evolution or fusion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transformation {
    /// Target species.
    pub species: SpeciesId,
    /// Display name.
    pub name: String,
    /// Sprite reference.
    pub sprite: String,
    /// Elemental types.
    pub types: Vec<ElementType>,
    /// Unscaled base stats of the target species.
    pub base_stats: Stats,
}

/// Condition attached to an evolution edge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionCondition {
    /// Minimum level, if the evolution is level-triggered.
    #[serde(default)]
    pub min_level: Option<u32>,
    /// Required item, if any.
    #[serde(default)]
    pub item: Option<ItemKey>,
    /// Required gender, if any.
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Required time of day, if any.
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
}

impl EvolutionCondition {
    /// Reports whether only a level threshold gates the evolution.
    #[must_use]
    pub fn is_level_only(&self) -> bool {
        self.min_level.is_some()
            && self.item.is_none()
            && self.gender.is_none()
            && self.time_of_day.is_none()
    }
}

/// Edge of an evolution chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionEdge {
    /// Species evolved into.
    pub target: SpeciesId,
    /// Condition gating the evolution.
    #[serde(default)]
    pub condition: EvolutionCondition,
}

/// Pending player decision.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingChoice {
    /// Moves the tower may learn.
    MoveOffer {
        /// Tower that can learn the moves.
        tower: TowerId,
        /// Offered moves.
        moves: Vec<Move>,
    },
    /// Several evolution targets qualify simultaneously.
    Evolution {
        /// Tower that can evolve.
        tower: TowerId,
        /// Candidate species.
        candidates: Vec<SpeciesId>,
        /// Item that triggered the check, if any.
        item: Option<ItemKey>,
    },
}

impl PendingChoice {
    /// Tower the choice concerns.
    #[must_use]
    pub fn tower(&self) -> TowerId {
        match self {
            Self::MoveOffer { tower, .. } | Self::Evolution { tower, .. } => *tower,
        }
    }
}

/// Ordered waypoint lists enemies follow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapLayout {
    paths: Vec<Vec<Position>>,
}

impl MapLayout {
    /// Creates a layout from waypoint lists; empty paths are discarded.
    #[must_use]
    pub fn new(paths: Vec<Vec<Position>>) -> Self {
        Self {
            paths: paths.into_iter().filter(|path| !path.is_empty()).collect(),
        }
    }

    /// All paths of the layout.
    #[must_use]
    pub fn paths(&self) -> &[Vec<Position>] {
        &self.paths
    }

    /// Selects the path assigned to the `index`-th spawn of a wave.
    #[must_use]
    pub fn path_for(&self, index: usize) -> Option<&[Position]> {
        if self.paths.is_empty() {
            return None;
        }
        self.paths.get(index % self.paths.len()).map(Vec::as_slice)
    }
}

impl Default for MapLayout {
    fn default() -> Self {
        Self::new(vec![vec![
            Position::new(0.0, 96.0),
            Position::new(448.0, 96.0),
            Position::new(448.0, 352.0),
            Position::new(96.0, 352.0),
            Position::new(96.0, 544.0),
            Position::new(800.0, 544.0),
        ]])
    }
}

/// World-relevant subset of the session configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSettings {
    /// Currency available at the start.
    pub starting_money: u32,
    /// Lives available at the start.
    pub starting_lives: u32,
    /// Difficulty read by the spawner.
    pub difficulty: Difficulty,
    /// Map read by the spawner.
    pub map: MapLayout,
    /// Wave whose completion signals a major clear instead of rewards.
    pub milestone_wave: u32,
    /// Initial game-speed multiplier.
    pub game_speed: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            starting_money: 500,
            starting_lives: 20,
            difficulty: Difficulty::Normal,
            map: MapLayout::default(),
            milestone_wave: 50,
            game_speed: 1.0,
        }
    }
}
