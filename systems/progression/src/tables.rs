//! Item-driven transformation tables: mega evolutions, gigantamax forms and fusions.

use std::collections::BTreeMap;

use pokemon_defence_core::{ItemKey, SpeciesId};

/// Item that unlocks every gigantamax form.
pub const MAX_MUSHROOMS: &str = "max-mushrooms";

const MEGA_STONES: &[(u32, &str, u32)] = &[
    (3, "venusaurite", 10033),
    (6, "charizardite-x", 10034),
    (6, "charizardite-y", 10035),
    (9, "blastoisinite", 10036),
    (65, "alakazite", 10037),
    (94, "gengarite", 10038),
    (115, "kangaskhanite", 10039),
    (127, "pinsirite", 10040),
    (130, "gyaradosite", 10041),
    (142, "aerodactylite", 10042),
    (150, "mewtwonite-x", 10043),
    (150, "mewtwonite-y", 10044),
];

const GIGANTAMAX_FORMS: &[(u32, u32)] = &[
    (3, 10195),
    (6, 10196),
    (9, 10197),
    (12, 10198),
    (25, 10199),
    (52, 10200),
    (68, 10201),
    (94, 10202),
    (99, 10203),
    (131, 10204),
    (133, 10205),
    (143, 10206),
];

const FUSIONS: &[(u32, u32, &str, u32)] = &[
    (646, 643, "dna-splicers", 10089),
    (646, 644, "dna-splicers", 10090),
    (800, 791, "n-solarizer", 10155),
    (800, 792, "n-lunarizer", 10156),
    (898, 896, "reins-of-unity", 10193),
    (898, 897, "reins-of-unity", 10194),
];

/// Base species, material species and item that fuse into a new form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FusionRecipe {
    /// Species of the tower that survives the fusion.
    pub base: SpeciesId,
    /// Species of the tower consumed by the fusion.
    pub material: SpeciesId,
    /// Item required.
    pub item: ItemKey,
    /// Fused species.
    pub result: SpeciesId,
}

/// Lookup tables consulted before the general evolution chain.
#[derive(Clone, Debug, Default)]
pub struct TransformTables {
    mega: BTreeMap<(SpeciesId, ItemKey), SpeciesId>,
    max: BTreeMap<SpeciesId, SpeciesId>,
    fusions: Vec<FusionRecipe>,
}

impl TransformTables {
    /// Tables for the mega stones, gigantamax forms and fusions of the core series.
    #[must_use]
    pub fn standard() -> Self {
        let mut tables = Self::default();
        for (species, stone, form) in MEGA_STONES {
            let _ = tables.mega.insert(
                (SpeciesId::new(*species), ItemKey::new(*stone)),
                SpeciesId::new(*form),
            );
        }
        for (species, form) in GIGANTAMAX_FORMS {
            let _ = tables
                .max
                .insert(SpeciesId::new(*species), SpeciesId::new(*form));
        }
        tables.fusions = FUSIONS
            .iter()
            .map(|(base, material, item, result)| FusionRecipe {
                base: SpeciesId::new(*base),
                material: SpeciesId::new(*material),
                item: ItemKey::new(*item),
                result: SpeciesId::new(*result),
            })
            .collect();
        tables
    }

    /// Mega form unlocked by holding `item`.
    #[must_use]
    pub fn mega(&self, species: SpeciesId, item: &ItemKey) -> Option<SpeciesId> {
        self.mega.get(&(species, item.clone())).copied()
    }

    /// Gigantamax form unlocked by `item`.
    #[must_use]
    pub fn max(&self, species: SpeciesId, item: &ItemKey) -> Option<SpeciesId> {
        if item.as_str() != MAX_MUSHROOMS {
            return None;
        }
        self.max.get(&species).copied()
    }

    /// Species produced by fusing `material` into `base` with `item`.
    #[must_use]
    pub fn fusion(
        &self,
        base: SpeciesId,
        material: SpeciesId,
        item: &ItemKey,
    ) -> Option<SpeciesId> {
        self.fusions
            .iter()
            .find(|recipe| {
                recipe.base == base && recipe.material == material && &recipe.item == item
            })
            .map(|recipe| recipe.result)
    }

    /// Reports whether the species has a mega or gigantamax form.
    #[must_use]
    pub fn has_special_form(&self, species: SpeciesId) -> bool {
        self.special_item_for(species).is_some()
    }

    /// Item unlocking the species' special form, preferring mega stones.
    #[must_use]
    pub fn special_item_for(&self, species: SpeciesId) -> Option<ItemKey> {
        self.mega
            .keys()
            .find(|(owner, _)| *owner == species)
            .map(|(_, stone)| stone.clone())
            .or_else(|| {
                self.max
                    .contains_key(&species)
                    .then(|| ItemKey::new(MAX_MUSHROOMS))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charizard_has_two_mega_stones_and_a_gigantamax_form() {
        let tables = TransformTables::standard();
        let charizard = SpeciesId::new(6);
        assert_eq!(
            tables.mega(charizard, &ItemKey::new("charizardite-x")),
            Some(SpeciesId::new(10034))
        );
        assert_eq!(
            tables.mega(charizard, &ItemKey::new("charizardite-y")),
            Some(SpeciesId::new(10035))
        );
        assert_eq!(
            tables.max(charizard, &ItemKey::new(MAX_MUSHROOMS)),
            Some(SpeciesId::new(10196))
        );
        assert_eq!(tables.max(charizard, &ItemKey::new("fire-stone")), None);
        assert_eq!(
            tables.special_item_for(charizard),
            Some(ItemKey::new("charizardite-x"))
        );
    }

    #[test]
    fn gigantamax_only_species_offer_mushrooms() {
        let tables = TransformTables::standard();
        assert_eq!(
            tables.special_item_for(SpeciesId::new(25)),
            Some(ItemKey::new(MAX_MUSHROOMS))
        );
        assert!(!tables.has_special_form(SpeciesId::new(19)));
    }

    #[test]
    fn fusion_requires_exact_triple() {
        let tables = TransformTables::standard();
        let splicers = ItemKey::new("dna-splicers");
        assert_eq!(
            tables.fusion(SpeciesId::new(646), SpeciesId::new(643), &splicers),
            Some(SpeciesId::new(10089))
        );
        assert_eq!(
            tables.fusion(SpeciesId::new(643), SpeciesId::new(646), &splicers),
            None
        );
        assert_eq!(
            tables.fusion(
                SpeciesId::new(646),
                SpeciesId::new(643),
                &ItemKey::new("n-solarizer")
            ),
            None
        );
    }
}
