//! Support skill effects: stage shifts, clears, charges, shields and breaks.
//!
//! Support skills are recognized by name. A single skill may carry several
//! effects (Heat Riser shifts all three axes), so parsing yields a small
//! list.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{BuffAxis, Combatant, CombatantId, Element};

/// Effects parsed from one support skill. Most skills carry one.
pub type SupportEffects = SmallVec<[SupportEffect; 3]>;

/// One effect of a support skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportEffect {
    /// Shift a buff axis by `delta` stages.
    Stage { axis: BuffAxis, delta: i8 },
    /// Drop positive stages (Dekaja).
    ClearPositive,
    /// Drop negative stages (Dekunda).
    ClearNegative,
    /// Next physical hit ×1.9.
    Charge,
    /// Next magical hit ×1.9.
    MindCharge,
    /// Reflect the next physical hit (Tetrakarn).
    PhysicalShield,
    /// Reflect the next magical hit (Makarakarn).
    MagicShield,
    /// Force an element's affinity to Normal.
    Break(Element),
}

impl SupportEffect {
    /// Parse a support skill by name. Unknown names yield nothing.
    #[must_use]
    pub fn parse(skill_name: &str) -> SupportEffects {
        let name = skill_name.trim().to_ascii_lowercase();
        let mut effects = SupportEffects::new();

        match name.as_str() {
            "heat riser" => {
                effects.extend(BuffAxis::ALL.map(|axis| SupportEffect::Stage { axis, delta: 1 }));
                return effects;
            }
            "debilitate" => {
                effects.extend(BuffAxis::ALL.map(|axis| SupportEffect::Stage { axis, delta: -1 }));
                return effects;
            }
            "dekaja" => {
                effects.push(SupportEffect::ClearPositive);
                return effects;
            }
            "dekunda" => {
                effects.push(SupportEffect::ClearNegative);
                return effects;
            }
            "charge" | "power charge" => {
                effects.push(SupportEffect::Charge);
                return effects;
            }
            "mind charge" | "concentrate" => {
                effects.push(SupportEffect::MindCharge);
                return effects;
            }
            "tetrakarn" => {
                effects.push(SupportEffect::PhysicalShield);
                return effects;
            }
            "makarakarn" => {
                effects.push(SupportEffect::MagicShield);
                return effects;
            }
            _ => {}
        }

        if let Some(element) = name.strip_suffix(" break") {
            if let Ok(element) = element.parse::<Element>() {
                effects.push(SupportEffect::Break(element));
            }
            return effects;
        }

        let delta = if name.ends_with("kaja") {
            1
        } else if name.ends_with("nda") {
            -1
        } else {
            return effects;
        };
        for (root, axis) in [
            ("taru", BuffAxis::Attack),
            ("raku", BuffAxis::Defense),
            ("suku", BuffAxis::Agility),
        ] {
            if name.contains(root) {
                effects.push(SupportEffect::Stage { axis, delta });
            }
        }
        effects
    }

    /// Lowers the target's position; aimed at foes.
    #[must_use]
    pub fn is_hostile(self) -> bool {
        match self {
            SupportEffect::Stage { delta, .. } => delta < 0,
            SupportEffect::ClearPositive | SupportEffect::Break(_) => true,
            _ => false,
        }
    }

    /// Whether applying this to `target` would change anything.
    #[must_use]
    pub fn would_change(self, target: &Combatant) -> bool {
        match self {
            SupportEffect::Stage { axis, delta } => target.buffs.can_shift(axis, delta),
            SupportEffect::ClearPositive => BuffAxis::ALL.iter().any(|&a| target.buffs.level(a) > 0),
            SupportEffect::ClearNegative => BuffAxis::ALL.iter().any(|&a| target.buffs.level(a) < 0),
            SupportEffect::Charge => !target.flags.charged,
            SupportEffect::MindCharge => !target.flags.mind_charged,
            SupportEffect::PhysicalShield => !target.flags.physical_shield,
            SupportEffect::MagicShield => !target.flags.magic_shield,
            SupportEffect::Break(element) => !target.is_broken(element),
        }
    }
}

/// A support effect that took hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffChange {
    pub target: CombatantId,
    pub effect: SupportEffect,
    /// Resulting stage for stage shifts.
    pub stage: Option<i8>,
}
