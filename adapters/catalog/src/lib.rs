#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Offline species and move catalog implementing the provider contract.
//!
//! The catalog ships the first-generation species together with the mega,
//! gigantamax and fusion forms the transformation tables reference. It is
//! parsed once from embedded JSON and answers every provider query from
//! memory, so it never reports the provider as unavailable.

use std::collections::{btree_map::Entry, BTreeMap};

use pokemon_defence_core::{
    ElementType, EvolutionEdge, MoveRecord, ProviderError, SpeciesId, SpeciesProvider,
    SpeciesRecord, Stats,
};
use serde::Deserialize;
use thiserror::Error;

const EMBEDDED: &str = include_str!("../data/catalog.json");
const LOG_TARGET: &str = "pokemon_defence::catalog";

/// Failures raised while loading a catalog document.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document is not valid catalog JSON.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two species entries share a dex number.
    #[error("species {0} is listed twice")]
    DuplicateSpecies(SpeciesId),
    /// Two move entries share a name.
    #[error("move '{0}' is listed twice")]
    DuplicateMove(String),
    /// A learnset names a move the catalog does not define.
    #[error("species {species} learns unknown move '{name}'")]
    UnknownLearnsetMove {
        /// Species whose learnset is broken.
        species: SpeciesId,
        /// Move name that has no entry.
        name: String,
    },
}

#[derive(Debug, Deserialize)]
struct Document {
    moves: Vec<MoveRecord>,
    species: Vec<SpeciesEntry>,
}

#[derive(Debug, Deserialize)]
struct SpeciesEntry {
    id: SpeciesId,
    name: String,
    types: Vec<ElementType>,
    stats: [u32; 6],
    #[serde(default)]
    sprite: Option<String>,
    #[serde(default)]
    abilities: Vec<String>,
    #[serde(default)]
    learnset: Vec<(u32, String)>,
    #[serde(default)]
    evolutions: Vec<EvolutionEdge>,
}

#[derive(Clone, Debug)]
struct SpeciesData {
    record: SpeciesRecord,
    learnset: Vec<(u32, String)>,
    evolutions: Vec<EvolutionEdge>,
}

/// In-memory species provider.
#[derive(Clone, Debug)]
pub struct Catalog {
    species: BTreeMap<SpeciesId, SpeciesData>,
    moves: BTreeMap<String, MoveRecord>,
}

impl Catalog {
    /// Loads the catalog bundled with the crate.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json_str(EMBEDDED)
    }

    /// Parses a catalog document.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let document: Document = serde_json::from_str(json)?;

        let mut moves = BTreeMap::new();
        for record in document.moves {
            match moves.entry(record.name.clone()) {
                Entry::Occupied(entry) => {
                    return Err(CatalogError::DuplicateMove(entry.key().clone()))
                }
                Entry::Vacant(entry) => {
                    let _ = entry.insert(record);
                }
            }
        }

        let mut species = BTreeMap::new();
        for entry in document.species {
            let id = entry.id;
            if let Some((_, name)) = entry
                .learnset
                .iter()
                .find(|(_, name)| !moves.contains_key(name))
            {
                return Err(CatalogError::UnknownLearnsetMove {
                    species: id,
                    name: name.clone(),
                });
            }
            match species.entry(id) {
                Entry::Occupied(_) => return Err(CatalogError::DuplicateSpecies(id)),
                Entry::Vacant(slot) => {
                    let _ = slot.insert(SpeciesData::from(entry));
                }
            }
        }

        tracing::debug!(
            target: LOG_TARGET,
            species = species.len(),
            moves = moves.len(),
            "catalog.loaded"
        );
        Ok(Self { species, moves })
    }

    /// Number of species in the catalog.
    #[must_use]
    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// Iterates over every species id in ascending order.
    pub fn species_ids(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        self.species.keys().copied()
    }

    fn entry(&self, id: SpeciesId) -> Result<&SpeciesData, ProviderError> {
        self.species
            .get(&id)
            .ok_or(ProviderError::UnknownSpecies(id))
    }

    fn learned(
        &self,
        id: SpeciesId,
        include: impl Fn(u32) -> bool,
    ) -> Result<Vec<String>, ProviderError> {
        Ok(self
            .entry(id)?
            .learnset
            .iter()
            .filter(|(level, _)| include(*level))
            .map(|(_, name)| name.clone())
            .collect())
    }
}

impl From<SpeciesEntry> for SpeciesData {
    fn from(entry: SpeciesEntry) -> Self {
        let [hp, attack, defense, special_attack, special_defense, speed] = entry.stats;
        let mut learnset = entry.learnset;
        learnset.sort_by_key(|(level, _)| *level);
        let sprite = entry
            .sprite
            .unwrap_or_else(|| format!("sprites/{}.png", entry.id.get()));

        Self {
            record: SpeciesRecord {
                id: entry.id,
                name: entry.name,
                stats: Stats {
                    hp,
                    attack,
                    defense,
                    special_attack,
                    special_defense,
                    speed,
                },
                types: entry.types,
                sprite,
                abilities: entry.abilities,
                moves: learnset.iter().map(|(_, name)| name.clone()).collect(),
            },
            learnset,
            evolutions: entry.evolutions,
        }
    }
}

impl SpeciesProvider for Catalog {
    fn species(&self, id: SpeciesId) -> Result<SpeciesRecord, ProviderError> {
        Ok(self.entry(id)?.record.clone())
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
        self.learned(species, |learned| learned == level)
    }

    fn moves_learned_up_to(
        &self,
        species: SpeciesId,
        level: u32,
    ) -> Result<Vec<String>, ProviderError> {
        self.learned(species, |learned| learned <= level)
    }

    fn evolutions(&self, species: SpeciesId) -> Result<Vec<EvolutionEdge>, ProviderError> {
        Ok(self.entry(species)?.evolutions.clone())
    }
}
