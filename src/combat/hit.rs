//! Accuracy, critical and instant-kill checks.

use serde::{Deserialize, Serialize};

use super::affinity::resolve_affinity;
use crate::core::{Affinity, BattleRng, BuffAxis, Combatant, Element, Stat};

/// Hit chance bounds, in percent.
pub const HIT_CHANCE_MIN: u32 = 5;
pub const HIT_CHANCE_MAX: u32 = 99;

/// Critical chance bounds, in percent.
pub const CRIT_CHANCE_MIN: f64 = 2.0;
pub const CRIT_CHANCE_MAX: f64 = 40.0;

/// Instant-kill chance bounds, in percent.
pub const INSTANT_KILL_MIN: u32 = 5;
pub const INSTANT_KILL_MAX: u32 = 95;

fn luck_diff(attacker: &Combatant, target: &Combatant) -> f64 {
    f64::from(attacker.stat(Stat::Luk) - target.stat(Stat::Luk))
}

/// Chance in percent that `attacker` hits `target` with `element`.
///
/// `base + (AGI diff)×2 + LUK diff`, with AGI scaled by agility stages,
/// divided by the target's evasion against the element and its ailment's
/// evasion multiplier, clamped to `[5, 99]`.
#[must_use]
pub fn hit_chance(attacker: &Combatant, target: &Combatant, element: Element, base_accuracy: u32) -> u32 {
    let agility_diff = attacker.buffed_stat(Stat::Agi) - target.buffed_stat(Stat::Agi);
    let raw = f64::from(base_accuracy) + agility_diff * 2.0 + luck_diff(attacker, target);

    let ailment_evasion = target.ailment().map_or(1.0, |a| a.definition.evasion_mult);
    let evasion = target.passives().evasion(element) * ailment_evasion;
    let scaled = raw / evasion.max(f64::EPSILON);

    scaled.round().clamp(f64::from(HIT_CHANCE_MIN), f64::from(HIT_CHANCE_MAX)) as u32
}

/// Roll a hit. Rigid-body targets are always hit without a roll.
pub fn roll_hit(
    attacker: &Combatant,
    target: &Combatant,
    element: Element,
    base_accuracy: u32,
    rng: &mut BattleRng,
) -> bool {
    if target.is_rigid_body() {
        return true;
    }
    let chance = hit_chance(attacker, target, element, base_accuracy);
    let hit = rng.check_percent(chance);
    tracing::debug!(attacker = %attacker.name, target = %target.name, chance, hit, "hit check");
    hit
}

/// Chance in percent of a critical hit.
///
/// `((LUK diff)/2 + 5) × agility stage × crit passives + ailment bonus`,
/// clamped to `[2, 40]`.
#[must_use]
pub fn critical_chance(attacker: &Combatant, target: &Combatant) -> f64 {
    let base = luck_diff(attacker, target) / 2.0 + 5.0;
    let passives = attacker.passives().crit_mult * target.passives().crit_against_mult;
    let bonus = target.ailment().map_or(0.0, |a| a.definition.crit_bonus_chance);
    let chance = base * attacker.buffs.multiplier(BuffAxis::Agility) * passives + bonus;
    chance.clamp(CRIT_CHANCE_MIN, CRIT_CHANCE_MAX)
}

/// Chance in percent that an instant-kill skill lands.
#[must_use]
pub fn instant_kill_chance(attacker: &Combatant, target: &Combatant, base_accuracy: u32) -> u32 {
    let raw = (f64::from(base_accuracy) + luck_diff(attacker, target))
        * attacker.buffs.multiplier(BuffAxis::Agility);
    raw.round()
        .clamp(f64::from(INSTANT_KILL_MIN), f64::from(INSTANT_KILL_MAX)) as u32
}

/// Result of an instant-kill attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstantKillResult {
    /// Target killed; `weak` if it was weak to the element.
    Killed { weak: bool },
    Missed,
    /// Null, Repel or Absorb denied the attempt outright.
    Blocked(Affinity),
}

/// Attempt an instant kill.
pub fn roll_instant_kill(
    attacker: &Combatant,
    target: &Combatant,
    element: Element,
    base_accuracy: u32,
    rng: &mut BattleRng,
) -> InstantKillResult {
    let resolution = resolve_affinity(target, element);
    if resolution.affinity.blocks() {
        return InstantKillResult::Blocked(resolution.affinity);
    }
    let chance = instant_kill_chance(attacker, target, base_accuracy);
    if rng.check_percent(chance) {
        InstantKillResult::Killed {
            weak: resolution.affinity == Affinity::Weak,
        }
    } else {
        InstantKillResult::Missed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AffinityTable, ClassType, CombatantId, Persona, Side, StatBlock};
    use crate::data::{ActionRestriction, AilmentDefinition};

    fn fighter(agi: i32, luk: i32) -> Combatant {
        Combatant::new(CombatantId(0), "F", ClassType::Human, Side::Player)
            .with_stats(StatBlock::combat(10, 10, agi, 10, luk))
            .with_resources(100, 50)
    }

    #[test]
    fn test_hit_chance_formula() {
        let a = fighter(15, 12);
        let t = fighter(10, 10);
        // 90 + 5*2 + 2 = 102 -> 99
        assert_eq!(hit_chance(&a, &t, Element::Slash, 90), 99);
        // 50 + 10 + 2
        assert_eq!(hit_chance(&a, &t, Element::Slash, 50), 62);
        // 20 - 10 - 2 = 8
        assert_eq!(hit_chance(&t, &a, Element::Slash, 20), 8);
        assert_eq!(hit_chance(&t, &a, Element::Slash, 0), HIT_CHANCE_MIN);
    }

    #[test]
    fn test_evasion_passive_divides() {
        let a = fighter(10, 10);
        let t = fighter(10, 10).with_skills(["Evade Fire"]);
        assert_eq!(hit_chance(&a, &t, Element::Fire, 90), 60);
        assert_eq!(hit_chance(&a, &t, Element::Ice, 90), 90);
    }

    #[test]
    fn test_rigid_body_auto_hit() {
        let a = fighter(0, 0);
        let mut t = fighter(40, 40);
        t.inflict(&AilmentDefinition::new("Shock", ActionRestriction::SkipTurn), 3);
        let mut rng = BattleRng::new(1);
        for _ in 0..50 {
            assert!(roll_hit(&a, &t, Element::Strike, 0, &mut rng));
        }
    }

    #[test]
    fn test_critical_chance_bounds() {
        let lucky = fighter(10, 40);
        let unlucky = fighter(10, 0);
        assert!((critical_chance(&lucky, &unlucky) - 25.0).abs() < f64::EPSILON);
        assert!((critical_chance(&unlucky, &lucky) - CRIT_CHANCE_MIN).abs() < f64::EPSILON);

        let pupil = fighter(10, 40).with_skills(["Apt Pupil"]);
        assert!((critical_chance(&pupil, &unlucky) - CRIT_CHANCE_MAX).abs() < f64::EPSILON);
    }

    #[test]
    fn test_critical_agility_stage() {
        let mut a = fighter(10, 10);
        let t = fighter(10, 10);
        a.buffs.shift(BuffAxis::Agility, 4, 3);
        assert!((critical_chance(&a, &t) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_instant_kill_blocked_by_null() {
        let a = fighter(10, 10);
        let t = Combatant::new(CombatantId(1), "Angel", ClassType::Demon, Side::Enemy)
            .with_persona(Persona {
                name: "Angel".into(),
                level: 5,
                stats: StatBlock::new(),
                affinities: AffinityTable::new().with(Element::Light, Affinity::Null),
                skills: vec![],
            })
            .with_resources(50, 0);
        let mut rng = BattleRng::new(3);
        assert_eq!(
            roll_instant_kill(&a, &t, Element::Light, 100, &mut rng),
            InstantKillResult::Blocked(Affinity::Null)
        );
    }

    #[test]
    fn test_instant_kill_chance_clamp() {
        let a = fighter(10, 40);
        let t = fighter(10, 0);
        assert_eq!(instant_kill_chance(&a, &t, 90), INSTANT_KILL_MAX);
        assert_eq!(instant_kill_chance(&t, &a, 30), INSTANT_KILL_MIN);
        assert_eq!(instant_kill_chance(&fighter(10, 10), &fighter(10, 10), 40), 40);
    }
}
