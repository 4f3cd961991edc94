//! Contract of the external species and move data provider.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DamageClass, ElementType, EvolutionEdge, SpeciesId, Stats};

/// Species data as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    /// Dex number.
    pub id: SpeciesId,
    /// Display name.
    pub name: String,
    /// Base stats.
    pub stats: Stats,
    /// One or two elemental types.
    pub types: Vec<ElementType>,
    /// Sprite reference.
    #[serde(default)]
    pub sprite: String,
    /// Ability names.
    #[serde(default)]
    pub abilities: Vec<String>,
    /// Names of moves the species can know.
    #[serde(default)]
    pub moves: Vec<String>,
}

/// Move data as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Provider name.
    pub name: String,
    /// Elemental type.
    pub element: ElementType,
    /// Nominal power; absent for status moves.
    #[serde(default)]
    pub power: Option<u32>,
    /// Accuracy in percent; absent for moves that never miss.
    #[serde(default)]
    pub accuracy: Option<u32>,
    /// Damage class.
    pub damage_class: DamageClass,
    /// Target scope, e.g. `"selected-pokemon"` or `"all-opponents"`.
    #[serde(default)]
    pub target: String,
    /// Free-text effect description.
    #[serde(default)]
    pub effect: String,
    /// Chance in percent for the described secondary effect.
    #[serde(default)]
    pub effect_chance: Option<u32>,
}

/// Failures reported by a species data provider.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider could not be reached.
    #[error("species provider unavailable: {0}")]
    Unavailable(String),
    /// The provider has no record of the species.
    #[error("unknown species {0}")]
    UnknownSpecies(SpeciesId),
    /// The provider has no record of the move.
    #[error("unknown move '{0}'")]
    UnknownMove(String),
    /// The provider answered with data that could not be interpreted.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Source of species, move, learnset and evolution data.
///
/// The engine never awaits the provider inside a tick. Lookups are queued and
/// resolved between frames, and their results are applied through commands
/// that tolerate the target having disappeared in the meantime.
pub trait SpeciesProvider {
    /// Base stats, types, sprite, abilities and move names of a species.
    fn species(&self, id: SpeciesId) -> Result<SpeciesRecord, ProviderError>;

    /// Type, power, accuracy, class, scope and effect text of a move.
    fn move_record(&self, name: &str) -> Result<MoveRecord, ProviderError>;

    /// Names of moves the species learns exactly at `level`.
    fn moves_learned_at(&self, species: SpeciesId, level: u32)
        -> Result<Vec<String>, ProviderError>;

    /// Names of moves the species learns at or below `level`, in learn order.
    fn moves_learned_up_to(
        &self,
        species: SpeciesId,
        level: u32,
    ) -> Result<Vec<String>, ProviderError>;

    /// Outgoing evolution edges of a species.
    fn evolutions(&self, species: SpeciesId) -> Result<Vec<EvolutionEdge>, ProviderError>;
}
