//! Affinity resolution with transient overrides.
//!
//! ## Override Order
//!
//! Applied before the declared affinity, first match wins:
//!
//! 1. Reflect shield: Tetrakarn repels physical hits, Makarakarn repels
//!    magical hits except Almighty
//! 2. Broken affinity: Normal
//! 3. Guarding: a Weak affinity becomes Normal
//! 4. Rigid body: Resist/Null/Repel become Normal for physical hits
//!
//! Almighty ignores declared affinities entirely.

use serde::{Deserialize, Serialize};

use crate::core::{Affinity, Combatant, Element};

/// What decided the resolved affinity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffinitySource {
    /// The declared affinity applied unchanged.
    Declared,
    /// A reflect shield forced Repel.
    Shield,
    /// A break forced Normal.
    Broken,
    /// Guarding cancelled a weakness.
    Guard,
    /// Rigid body cancelled a resistance.
    RigidBody,
}

/// Resolved affinity of one target against one element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityResolution {
    pub affinity: Affinity,
    /// The declared affinity before overrides.
    pub declared: Affinity,
    pub source: AffinitySource,
}

impl AffinityResolution {
    fn declared(affinity: Affinity) -> Self {
        Self {
            affinity,
            declared: affinity,
            source: AffinitySource::Declared,
        }
    }

    fn overridden(affinity: Affinity, declared: Affinity, source: AffinitySource) -> Self {
        Self {
            affinity,
            declared,
            source,
        }
    }

    /// Whether the result reflects the target's permanent affinity, and so
    /// may be recorded as knowledge.
    #[must_use]
    pub fn is_observable(&self) -> bool {
        self.source == AffinitySource::Declared
    }
}

/// Resolve `target`'s affinity to `element`, applying overrides in order.
#[must_use]
pub fn resolve_affinity(target: &Combatant, element: Element) -> AffinityResolution {
    let declared = target.base_affinity(element);

    let shielded = if element.is_physical() {
        target.flags.physical_shield
    } else {
        target.flags.magic_shield && element != Element::Almighty
    };
    if shielded {
        return AffinityResolution::overridden(Affinity::Repel, declared, AffinitySource::Shield);
    }

    if element == Element::Almighty {
        return AffinityResolution::declared(Affinity::Normal);
    }

    if target.is_broken(element) && declared != Affinity::Normal {
        return AffinityResolution::overridden(Affinity::Normal, declared, AffinitySource::Broken);
    }

    if target.flags.guarding && declared == Affinity::Weak {
        return AffinityResolution::overridden(Affinity::Normal, declared, AffinitySource::Guard);
    }

    if target.is_rigid_body()
        && element.is_physical()
        && matches!(declared, Affinity::Resist | Affinity::Null | Affinity::Repel)
    {
        return AffinityResolution::overridden(Affinity::Normal, declared, AffinitySource::RigidBody);
    }

    AffinityResolution::declared(declared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AffinityTable, ClassType, CombatantId, Persona, Side, StatBlock};
    use crate::data::{ActionRestriction, AilmentDefinition};

    fn target(affinities: AffinityTable) -> Combatant {
        Combatant::new(CombatantId(1), "Target", ClassType::Demon, Side::Enemy)
            .with_persona(Persona {
                name: "Target".into(),
                level: 1,
                stats: StatBlock::new(),
                affinities,
                skills: vec![],
            })
            .with_resources(100, 0)
    }

    #[test]
    fn test_declared_passthrough() {
        let t = target(AffinityTable::new().with(Element::Fire, Affinity::Weak));
        let r = resolve_affinity(&t, Element::Fire);
        assert_eq!(r.affinity, Affinity::Weak);
        assert!(r.is_observable());
    }

    #[test]
    fn test_shield_beats_weakness() {
        let mut t = target(AffinityTable::new().with(Element::Slash, Affinity::Weak));
        t.flags.physical_shield = true;
        let r = resolve_affinity(&t, Element::Slash);
        assert_eq!(r.affinity, Affinity::Repel);
        assert_eq!(r.declared, Affinity::Weak);
        assert!(!r.is_observable());

        // Physical shield does not cover magic.
        assert_eq!(resolve_affinity(&t, Element::Fire).affinity, Affinity::Normal);
    }

    #[test]
    fn test_magic_shield_skips_almighty() {
        let mut t = target(AffinityTable::new().with(Element::Almighty, Affinity::Null));
        t.flags.magic_shield = true;
        assert_eq!(resolve_affinity(&t, Element::Ice).affinity, Affinity::Repel);
        assert_eq!(resolve_affinity(&t, Element::Almighty).affinity, Affinity::Normal);
    }

    #[test]
    fn test_broken_forces_normal() {
        let mut t = target(AffinityTable::new().with(Element::Ice, Affinity::Absorb));
        t.break_affinity(Element::Ice, 3);
        let r = resolve_affinity(&t, Element::Ice);
        assert_eq!(r.affinity, Affinity::Normal);
        assert_eq!(r.source, AffinitySource::Broken);
    }

    #[test]
    fn test_guard_cancels_weakness_only() {
        let mut t = target(
            AffinityTable::new()
                .with(Element::Wind, Affinity::Weak)
                .with(Element::Elec, Affinity::Resist),
        );
        t.flags.guarding = true;
        assert_eq!(resolve_affinity(&t, Element::Wind).affinity, Affinity::Normal);
        assert_eq!(resolve_affinity(&t, Element::Elec).affinity, Affinity::Resist);
    }

    #[test]
    fn test_rigid_body_physical_only() {
        let mut t = target(
            AffinityTable::new()
                .with(Element::Strike, Affinity::Null)
                .with(Element::Pierce, Affinity::Weak)
                .with(Element::Fire, Affinity::Resist),
        );
        t.inflict(&AilmentDefinition::new("Freeze", ActionRestriction::SkipTurn), 3);

        assert_eq!(resolve_affinity(&t, Element::Strike).affinity, Affinity::Normal);
        assert_eq!(resolve_affinity(&t, Element::Pierce).affinity, Affinity::Weak);
        assert_eq!(resolve_affinity(&t, Element::Fire).affinity, Affinity::Resist);
    }
}
