//! Per-side record of discovered affinities.
//!
//! Each side keeps its own store so the AI only exploits what its side has
//! actually seen. Keys are `(source id, element)`: every demon of a species
//! shares what was learned about any one of them.

use rustc_hash::FxHashMap;

use crate::combat::AffinityResolution;
use crate::core::{Affinity, Combatant, Element};

/// Discovered affinities, keyed by source id and element.
#[derive(Clone, Debug, Default)]
pub struct BattleKnowledge {
    known: FxHashMap<(String, Element), Affinity>,
}

impl BattleKnowledge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed affinity; the latest observation wins.
    pub fn learn(&mut self, source_id: &str, element: Element, affinity: Affinity) {
        let previous = self.known.insert((source_id.to_string(), element), affinity);
        if previous != Some(affinity) {
            tracing::debug!(source_id, %element, %affinity, "affinity learned");
        }
    }

    /// Record a resolved hit if it showed the target's own affinity.
    ///
    /// Shields, breaks, guarding and rigid bodies hide the real affinity, so
    /// those resolutions teach nothing.
    pub fn observe(&mut self, source_id: &str, element: Element, resolution: &AffinityResolution) -> bool {
        if !resolution.is_observable() {
            return false;
        }
        self.learn(source_id, element, resolution.declared);
        true
    }

    /// Record every affinity of `target` (Analyze).
    pub fn learn_all(&mut self, target: &Combatant) {
        for (element, affinity) in target.affinities().iter() {
            self.learn(&target.source_id, element, affinity);
        }
    }

    /// The known affinity, if any.
    #[must_use]
    pub fn known(&self, source_id: &str, element: Element) -> Option<Affinity> {
        self.known.get(&(source_id.to_string(), element)).copied()
    }

    #[must_use]
    pub fn is_weakness_known(&self, source_id: &str, element: Element) -> bool {
        self.known(source_id, element) == Some(Affinity::Weak)
    }

    /// Known Resist, Null, Repel or Absorb.
    #[must_use]
    pub fn is_resistance_known(&self, source_id: &str, element: Element) -> bool {
        self.known(source_id, element).is_some_and(Affinity::resists)
    }

    /// Known Null, Repel or Absorb: a hit that costs icons.
    #[must_use]
    pub fn is_risk_known(&self, source_id: &str, element: Element) -> bool {
        self.known(source_id, element).is_some_and(Affinity::blocks)
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
