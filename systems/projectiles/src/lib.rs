#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile phase: homing travel and impact resolution.
//!
//! Damage is computed at impact, never at launch. A single-target projectile
//! whose enemy disappeared in flight resolves with no hits, while an
//! area-of-effect projectile still detonates where it is.

use std::time::Duration;

use pokemon_defence_core::{
    Ability, Command, DamageClass, Enemy, EnemyView, Event, Hit, Impact, Position, Projectile,
    ProjectileView, Tower, TowerView,
};
use pokemon_defence_system_abilities as abilities;
use pokemon_defence_system_damage::damage;
use pokemon_defence_system_type_chart::{effectiveness, has_stab};
use rand::Rng;

/// Distance to the target at which a projectile resolves.
pub const IMPACT_RADIUS: f32 = 10.0;

/// Pure system that moves projectiles and resolves their impacts.
#[derive(Debug, Default)]
pub struct Projectiles;

impl Projectiles {
    /// Creates the projectile phase.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes tick events and emits advance and resolve commands, in projectile id order.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        events: &[Event],
        projectiles: &ProjectileView,
        enemies: &EnemyView,
        towers: &TowerView,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        let dt: Duration = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .sum();
        if dt.is_zero() {
            return;
        }

        for projectile in projectiles.iter() {
            let attacker = towers.get(projectile.attacker);
            let Some(target) = enemies.get(projectile.target) else {
                let impact = if projectile.aoe {
                    compute_impact(projectile, projectile.position, enemies, attacker, rng)
                } else {
                    Impact {
                        position: projectile.position,
                        ..Impact::default()
                    }
                };
                out.push(Command::ResolveProjectile {
                    projectile: projectile.id,
                    impact,
                });
                continue;
            };

            let travel = projectile.speed * dt.as_secs_f32();
            let position = advance(projectile.position, target.position, travel);
            if position.distance(target.position) <= IMPACT_RADIUS {
                out.push(Command::ResolveProjectile {
                    projectile: projectile.id,
                    impact: compute_impact(projectile, position, enemies, attacker, rng),
                });
            } else {
                out.push(Command::AdvanceProjectile {
                    projectile: projectile.id,
                    position,
                });
            }
        }
    }
}

fn advance(from: Position, to: Position, travel: f32) -> Position {
    let delta = to - from;
    let distance = delta.length();
    if distance <= travel {
        return to;
    }
    from + delta / distance * travel
}

/// Computes damage, statuses and the lifesteal share for an impact at `position`.
///
/// Healing is settled by the world against the damage each enemy actually took.
///
/// Area moves strike every enemy within their radius of the impact point,
/// single-target moves strike only their locked target.
pub fn compute_impact<R: Rng + ?Sized>(
    projectile: &Projectile,
    position: Position,
    enemies: &EnemyView,
    attacker: Option<&Tower>,
    rng: &mut R,
) -> Impact {
    let ability = attacker.and_then(|tower| tower.ability.as_ref());
    let victims: Vec<&Enemy> = if projectile.aoe {
        enemies
            .iter()
            .filter(|enemy| enemy.position.distance(position) <= projectile.aoe_radius)
            .collect()
    } else {
        enemies.get(projectile.target).into_iter().collect()
    };

    let hits = victims
        .into_iter()
        .map(|enemy| strike(projectile, enemy, ability, rng))
        .collect();
    Impact {
        position,
        hits,
        lifesteal: abilities::lifesteal_ratio(ability),
    }
}

fn strike<R: Rng + ?Sized>(
    projectile: &Projectile,
    enemy: &Enemy,
    ability: Option<&Ability>,
    rng: &mut R,
) -> Hit {
    let multiplier = effectiveness(projectile.element, &enemy.types);
    let mut critical = false;
    let dealt = match projectile.damage_class {
        DamageClass::Status => 0,
        class => {
            critical = rng.gen::<f32>() < abilities::critical_chance(ability);
            let defense = if class == DamageClass::Physical {
                enemy.defense
            } else {
                enemy.special_defense
            };
            let raw = damage(
                projectile.attack_power,
                defense,
                projectile.power,
                multiplier,
                critical,
                has_stab(&projectile.attacker_types, projectile.element),
            );
            if projectile.aoe {
                let scaled = raw as f32 * abilities::aoe_damage_multiplier(ability);
                (scaled.floor() as u32).max(1)
            } else {
                raw
            }
        }
    };

    let status = projectile.effect.inflicts.and_then(|infliction| {
        (rng.gen_range(0..100) < u32::from(infliction.chance)).then_some(infliction.kind)
    });

    Hit {
        enemy: enemy.id,
        damage: dealt,
        critical,
        effectiveness: multiplier,
        status,
    }
}
