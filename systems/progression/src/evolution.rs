//! Evolution eligibility against chain edges and transformation tables.

use std::collections::BTreeSet;

use pokemon_defence_core::{EvolutionEdge, Gender, ItemKey, SpeciesId, TimeOfDay};

use crate::tables::TransformTables;

/// Live tower state that evolution conditions are checked against.
#[derive(Clone, Copy, Debug)]
pub struct EvolutionContext<'a> {
    /// Current level.
    pub level: u32,
    /// Gender tag of the tower.
    pub gender: Gender,
    /// Time of day at the moment of the check.
    pub time_of_day: TimeOfDay,
    /// Item offered for the evolution, if any.
    pub item: Option<&'a ItemKey>,
}

/// Outcome of resolving an evolution request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvolutionResolution {
    /// Nothing qualifies.
    NoMatch,
    /// Exactly one target qualifies.
    Single(SpeciesId),
    /// Several targets qualify and the player has to pick.
    Choice(Vec<SpeciesId>),
}

impl EvolutionResolution {
    fn from_candidates(mut candidates: Vec<SpeciesId>) -> Self {
        let mut seen = BTreeSet::new();
        candidates.retain(|target| seen.insert(*target));
        match candidates.len() {
            0 => Self::NoMatch,
            1 => Self::Single(candidates[0]),
            _ => Self::Choice(candidates),
        }
    }
}

/// Resolves an evolution request.
///
/// An explicit target wins outright. Otherwise an item is tried against the
/// mega table and then the gigantamax table before the chain edges are
/// filtered against the live state.
#[must_use]
pub fn resolve(
    tables: &TransformTables,
    species: SpeciesId,
    edges: &[EvolutionEdge],
    context: EvolutionContext<'_>,
    explicit: Option<SpeciesId>,
) -> EvolutionResolution {
    if let Some(target) = explicit {
        return EvolutionResolution::Single(target);
    }
    if let Some(item) = context.item {
        if let Some(form) = tables.mega(species, item) {
            return EvolutionResolution::Single(form);
        }
        if let Some(form) = tables.max(species, item) {
            return EvolutionResolution::Single(form);
        }
    }

    let candidates = edges
        .iter()
        .filter(|edge| edge_matches(edge, &context))
        .map(|edge| edge.target)
        .collect();
    EvolutionResolution::from_candidates(candidates)
}

/// Targets reachable purely by level at `level`.
///
/// Edges gated on items, gender or time of day are left to explicit requests.
#[must_use]
pub fn level_candidates(edges: &[EvolutionEdge], level: u32) -> EvolutionResolution {
    let candidates = edges
        .iter()
        .filter(|edge| edge.condition.is_level_only())
        .filter(|edge| edge.condition.min_level.is_some_and(|min| min <= level))
        .map(|edge| edge.target)
        .collect();
    EvolutionResolution::from_candidates(candidates)
}

fn edge_matches(edge: &EvolutionEdge, context: &EvolutionContext<'_>) -> bool {
    let condition = &edge.condition;
    let unconditioned = condition.min_level.is_none()
        && condition.item.is_none()
        && condition.gender.is_none()
        && condition.time_of_day.is_none();
    if unconditioned {
        return false;
    }

    condition.item.as_ref() == context.item
        && condition
            .gender
            .map_or(true, |gender| gender == context.gender)
        && condition
            .time_of_day
            .map_or(true, |time| time == context.time_of_day)
        && condition.min_level.map_or(true, |min| min <= context.level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokemon_defence_core::EvolutionCondition;

    fn edge(target: u32, condition: EvolutionCondition) -> EvolutionEdge {
        EvolutionEdge {
            target: SpeciesId::new(target),
            condition,
        }
    }

    fn context(level: u32, item: Option<&ItemKey>) -> EvolutionContext<'_> {
        EvolutionContext {
            level,
            gender: Gender::Female,
            time_of_day: TimeOfDay::Day,
            item,
        }
    }

    fn eevee_edges() -> Vec<EvolutionEdge> {
        let stone = |name: &str| EvolutionCondition {
            item: Some(ItemKey::new(name)),
            ..EvolutionCondition::default()
        };
        vec![
            edge(134, stone("water-stone")),
            edge(135, stone("thunder-stone")),
            edge(136, stone("fire-stone")),
            edge(
                197,
                EvolutionCondition {
                    min_level: Some(2),
                    time_of_day: Some(TimeOfDay::Night),
                    ..EvolutionCondition::default()
                },
            ),
        ]
    }

    #[test]
    fn explicit_target_wins() {
        let tables = TransformTables::standard();
        let resolution = resolve(
            &tables,
            SpeciesId::new(133),
            &eevee_edges(),
            context(5, None),
            Some(SpeciesId::new(196)),
        );
        assert_eq!(resolution, EvolutionResolution::Single(SpeciesId::new(196)));
    }

    #[test]
    fn items_select_matching_chain_edges() {
        let tables = TransformTables::standard();
        let thunder = ItemKey::new("thunder-stone");
        let resolution = resolve(
            &tables,
            SpeciesId::new(133),
            &eevee_edges(),
            context(5, Some(&thunder)),
            None,
        );
        assert_eq!(resolution, EvolutionResolution::Single(SpeciesId::new(135)));

        let leaf = ItemKey::new("leaf-stone");
        let resolution = resolve(
            &tables,
            SpeciesId::new(133),
            &eevee_edges(),
            context(5, Some(&leaf)),
            None,
        );
        assert_eq!(resolution, EvolutionResolution::NoMatch);
    }

    #[test]
    fn mega_table_precedes_chain() {
        let tables = TransformTables::standard();
        let stone = ItemKey::new("charizardite-y");
        let resolution = resolve(
            &tables,
            SpeciesId::new(6),
            &[],
            context(40, Some(&stone)),
            None,
        );
        assert_eq!(resolution, EvolutionResolution::Single(SpeciesId::new(10035)));
    }

    #[test]
    fn time_of_day_gates_edges() {
        let tables = TransformTables::standard();
        let mut night = context(5, None);
        night.time_of_day = TimeOfDay::Night;
        assert_eq!(
            resolve(&tables, SpeciesId::new(133), &eevee_edges(), night, None),
            EvolutionResolution::Single(SpeciesId::new(197))
        );
        assert_eq!(
            resolve(
                &tables,
                SpeciesId::new(133),
                &eevee_edges(),
                context(5, None),
                None
            ),
            EvolutionResolution::NoMatch
        );
    }

    #[test]
    fn several_qualifying_edges_become_a_choice() {
        let level = |min: u32| EvolutionCondition {
            min_level: Some(min),
            ..EvolutionCondition::default()
        };
        let edges = vec![edge(267, level(7)), edge(269, level(7))];
        assert_eq!(
            level_candidates(&edges, 7),
            EvolutionResolution::Choice(vec![SpeciesId::new(267), SpeciesId::new(269)])
        );
        assert_eq!(level_candidates(&edges, 6), EvolutionResolution::NoMatch);
    }

    #[test]
    fn targets_reached_by_several_edges_are_offered_once() {
        let level = |min: u32| EvolutionCondition {
            min_level: Some(min),
            ..EvolutionCondition::default()
        };
        let edges = vec![
            edge(267, level(7)),
            edge(269, level(7)),
            edge(267, level(5)),
        ];
        assert_eq!(
            level_candidates(&edges, 7),
            EvolutionResolution::Choice(vec![SpeciesId::new(267), SpeciesId::new(269)])
        );

        let edges = vec![edge(267, level(7)), edge(267, level(3))];
        assert_eq!(
            level_candidates(&edges, 7),
            EvolutionResolution::Single(SpeciesId::new(267))
        );
    }

    #[test]
    fn gated_edges_never_trigger_on_level_up() {
        assert_eq!(level_candidates(&eevee_edges(), 50), EvolutionResolution::NoMatch);
    }
}
