#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Damage formula shared by tower projectiles and enemy strikes.

/// Fixed level plugged into the damage formula.
pub const VIRTUAL_LEVEL: f32 = 50.0;

/// Multiplier applied to critical hits.
pub const CRITICAL_MULTIPLIER: f32 = 1.5;

/// Multiplier applied when the move shares a type with its user.
pub const STAB_MULTIPLIER: f32 = 1.5;

/// Computes the damage of one hit.
///
/// The result is never below one, even for immune matchups or zero power.
/// A zero defense stat is treated as one.
#[must_use]
pub fn damage(
    attack: u32,
    defense: u32,
    power: u32,
    effectiveness: f32,
    critical: bool,
    stab: bool,
) -> u32 {
    let level_factor = 2.0 * VIRTUAL_LEVEL / 5.0 + 2.0;
    let defense = defense.max(1) as f32;
    let base = level_factor * power as f32 * attack as f32 / defense / VIRTUAL_LEVEL + 2.0;

    let mut scaled = base * effectiveness.max(0.0);
    if critical {
        scaled *= CRITICAL_MULTIPLIER;
    }
    if stab {
        scaled *= STAB_MULTIPLIER;
    }

    scaled.max(1.0).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_values() {
        // 22 * 40 * 50 / 50 / 50 + 2 = 19.6
        assert_eq!(damage(50, 50, 40, 1.0, false, false), 19);
        assert_eq!(damage(50, 50, 40, 2.0, false, false), 39);
        assert_eq!(damage(50, 50, 40, 0.5, false, false), 9);
    }

    #[test]
    fn never_drops_below_one() {
        assert_eq!(damage(1, 500, 1, 0.25, false, false), 1);
        assert_eq!(damage(100, 10, 120, 0.0, true, true), 1);
        assert_eq!(damage(0, 0, 0, 1.0, false, false), 2);
        for attack in [0, 1, 5, 50, 500] {
            for defense in [0, 1, 5, 50, 500] {
                for power in [0, 10, 90, 250] {
                    for effectiveness in [0.0, 0.25, 0.5, 1.0, 2.0, 4.0] {
                        assert!(damage(attack, defense, power, effectiveness, false, false) >= 1);
                    }
                }
            }
        }
    }

    #[test]
    fn crit_and_stab_stack_multiplicatively() {
        let base = 22.0 * 90.0 * 120.0 / 80.0 / 50.0 + 2.0;
        let both = damage(120, 80, 90, 1.0, true, true);

        assert_eq!(both, (base * 1.5 * 1.5_f32).floor() as u32);
        assert_ne!(both, (base * 2.5_f32).floor() as u32);
        assert_eq!(
            damage(120, 80, 90, 1.0, true, false),
            damage(120, 80, 90, 1.0, false, true)
        );
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let first = damage(77, 63, 75, 2.0, true, false);
        let second = damage(77, 63, 75, 2.0, true, false);
        assert_eq!(first, second);
    }
}
