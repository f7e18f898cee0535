//! Damage formula.
//!
//! ## Pipeline
//!
//! 1. `5 × sqrt(power × attack / defense)`, where attack and defense are
//!    already scaled by stages, passives, charge and ailments
//! 2. Critical ×1.5 (physical only, never against a guarding target;
//!    rigid-body targets always take a critical)
//! 3. Affinity: Weak ×1.5, Resist ×0.5, Null/Repel 0, Absorb negative
//! 4. Guarding ×0.5
//! 5. Variance in `[0.95, 1.05]`, floored, at least 1 when it connects
//!
//! Everything here is a pure function of borrowed combatants plus the RNG;
//! the caller applies the result.

use serde::{Deserialize, Serialize};

use super::affinity::{resolve_affinity, AffinityResolution};
use super::hit::critical_chance;
use crate::core::{Affinity, BattleRng, Combatant, Element, Stat};

/// Scale of the square-root formula.
pub const DAMAGE_SCALE: f64 = 5.0;

/// Critical hit multiplier.
pub const CRITICAL_MULTIPLIER: f64 = 1.5;

/// Multiplier for a charged hit of the matching kind.
pub const CHARGE_MULTIPLIER: f64 = 1.9;

/// Damage multiplier against a guarding target.
pub const GUARD_MULTIPLIER: f64 = 0.5;

/// Variance bounds.
pub const VARIANCE_MIN: f64 = 0.95;
pub const VARIANCE_MAX: f64 = 1.05;

/// A computed hit, not yet applied.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageRoll {
    /// HP to remove; negative means the target heals (Absorb).
    pub amount: i32,
    pub resolution: AffinityResolution,
    pub critical: bool,
}

impl DamageRoll {
    /// The resolved affinity.
    #[must_use]
    pub fn affinity(&self) -> Affinity {
        self.resolution.affinity
    }
}

/// Whether a charge flag applies to this element.
#[must_use]
pub fn charge_applies(attacker: &Combatant, element: Element) -> bool {
    if element.is_physical() {
        attacker.flags.charged
    } else {
        attacker.flags.mind_charged
    }
}

/// Attack value: STR or MAG with attack stage, boost passives, charge and
/// the attacker's ailment damage multiplier.
#[must_use]
pub fn effective_attack(attacker: &Combatant, element: Element) -> f64 {
    let stat = if element.is_physical() { Stat::Str } else { Stat::Mag };
    let charge = if charge_applies(attacker, element) {
        CHARGE_MULTIPLIER
    } else {
        1.0
    };
    let ailment = attacker.ailment().map_or(1.0, |a| a.definition.damage_deal_mult);
    attacker.buffed_stat(stat) * attacker.passives().boost(element) * charge * ailment
}

/// Defense value: END with defense stage plus armor, divided by the
/// target's ailment damage-taken multiplier. Never below 1.
#[must_use]
pub fn effective_defense(target: &Combatant) -> f64 {
    let taken = target.ailment().map_or(1.0, |a| a.definition.damage_taken_mult);
    let defense = target.buffed_stat(Stat::End) + f64::from(target.armor_defense());
    (defense / taken.max(f64::EPSILON)).max(1.0)
}

/// `5 × sqrt(power × attack / max(1, defense))`.
#[must_use]
pub fn base_damage(power: u32, attack: f64, defense: f64) -> f64 {
    DAMAGE_SCALE * (f64::from(power) * attack.max(0.0) / defense.max(1.0)).sqrt()
}

fn apply_affinity(raw: f64, affinity: Affinity) -> f64 {
    raw * affinity.multiplier()
}

fn finish(scaled: f64, affinity: Affinity) -> i32 {
    match affinity {
        Affinity::Null | Affinity::Repel => 0,
        Affinity::Absorb => -((-scaled).floor() as i32).max(1),
        _ => (scaled.floor() as i32).max(1),
    }
}

/// Compute a hit of `power` from `attacker` to `target`.
pub fn compute_damage(
    attacker: &Combatant,
    target: &Combatant,
    power: u32,
    element: Element,
    rng: &mut BattleRng,
) -> DamageRoll {
    let resolution = resolve_affinity(target, element);
    let mut raw = base_damage(power, effective_attack(attacker, element), effective_defense(target));

    let mut critical = false;
    if element.is_physical() && !target.flags.guarding {
        critical = target.is_rigid_body() || {
            let chance = critical_chance(attacker, target);
            rng.gen_f64_range(0.0..100.0) < chance
        };
        if critical {
            raw *= CRITICAL_MULTIPLIER;
        }
    }

    let mut scaled = apply_affinity(raw, resolution.affinity);
    if target.flags.guarding {
        scaled *= GUARD_MULTIPLIER;
    }
    scaled *= rng.gen_f64_range(VARIANCE_MIN..VARIANCE_MAX);

    let amount = finish(scaled, resolution.affinity);
    tracing::debug!(
        attacker = %attacker.name,
        target = %target.name,
        %element,
        affinity = %resolution.affinity,
        critical,
        amount,
        "damage"
    );
    DamageRoll {
        amount,
        resolution,
        critical,
    }
}

/// Expected damage without crits or variance, assuming `affinity`.
///
/// Used by the AI, which may only know (or guess) the target's affinity.
#[must_use]
pub fn projected_damage(
    attacker: &Combatant,
    target: &Combatant,
    power: u32,
    element: Element,
    affinity: Affinity,
) -> i32 {
    let raw = base_damage(power, effective_attack(attacker, element), effective_defense(target));
    let mut scaled = apply_affinity(raw, affinity);
    if target.flags.guarding {
        scaled *= GUARD_MULTIPLIER;
    }
    finish(scaled, affinity)
}

/// Damage bounced back onto an attacker by a Repel.
///
/// The attacker's own attack is measured against its own defense, with no
/// critical, and the attacker's own affinity to the element applies.
pub fn reflected_damage(attacker: &Combatant, power: u32, element: Element, rng: &mut BattleRng) -> DamageRoll {
    let resolution = resolve_affinity(attacker, element);
    let raw = base_damage(power, effective_attack(attacker, element), effective_defense(attacker));
    let mut scaled = apply_affinity(raw, resolution.affinity);
    if attacker.flags.guarding {
        scaled *= GUARD_MULTIPLIER;
    }
    scaled *= rng.gen_f64_range(VARIANCE_MIN..VARIANCE_MAX);

    DamageRoll {
        amount: finish(scaled, resolution.affinity),
        resolution,
        critical: false,
    }
}
