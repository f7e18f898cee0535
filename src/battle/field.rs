//! Combatants on the battlefield.
//!
//! Every combatant that ever enters the battle gets a slot; its
//! [`CombatantId`] is the slot index and never changes. Leaving the field
//! (fleeing, returning to stock) empties the slot, so ids stay stable for
//! the events that reference them.

use crate::combat::{escape_chance, side_average_agility};
use crate::core::{Combatant, CombatantId, Side, Stat};

/// Maximum party members on the field at once.
pub const MAX_ACTIVE_PARTY: usize = 4;

/// Slots of combatants, indexed by id.
#[derive(Clone, Debug, Default)]
pub struct Field {
    slots: Vec<Option<Combatant>>,
}

impl Field {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a combatant on `side`, assigning it the next id.
    pub fn deploy(&mut self, mut combatant: Combatant, side: Side) -> CombatantId {
        let id = CombatantId(self.slots.len() as u32);
        combatant.id = id;
        combatant.side = side;
        self.slots.push(Some(combatant));
        id
    }

    /// Take a combatant off the field.
    pub fn withdraw(&mut self, id: CombatantId) -> Option<Combatant> {
        self.slots.get_mut(id.index())?.take()
    }

    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Whether `id` is still on the field.
    #[must_use]
    pub fn is_present(&self, id: CombatantId) -> bool {
        self.get(id).is_some()
    }

    /// Display name, or "?" for an id no longer on the field.
    #[must_use]
    pub fn name(&self, id: CombatantId) -> &str {
        self.get(id).map_or("?", |c| c.name.as_str())
    }

    /// Everyone on the field, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.slots.iter().flatten()
    }

    /// Members of `side` on the field, fallen included.
    #[must_use]
    pub fn members(&self, side: Side) -> Vec<&Combatant> {
        self.iter().filter(|c| c.side == side).collect()
    }

    /// Ids of the living members of `side`, in id order.
    #[must_use]
    pub fn living(&self, side: Side) -> Vec<CombatantId> {
        self.iter()
            .filter(|c| c.side == side && c.is_alive())
            .map(|c| c.id)
            .collect()
    }

    /// No living member of `side` remains on the field.
    #[must_use]
    pub fn is_wiped(&self, side: Side) -> bool {
        !self.iter().any(|c| c.side == side && c.is_alive())
    }

    /// Number of `side` members on the field, fallen included.
    #[must_use]
    pub fn count(&self, side: Side) -> usize {
        self.iter().filter(|c| c.side == side).count()
    }

    /// Average agility of the living members of `side`.
    #[must_use]
    pub fn average_agility(&self, side: Side) -> f64 {
        side_average_agility(self.iter().filter(|c| c.side == side))
    }

    /// Percent chance that `actor` escapes, from its buffed agility against
    /// the opposing side's average.
    #[must_use]
    pub fn escape_chance_for(&self, actor: CombatantId) -> Option<u32> {
        let member = self.get(actor)?;
        Some(escape_chance(
            member.buffed_stat(Stat::Agi),
            self.average_agility(member.side.opponent()),
        ))
    }

    /// Consume the field, returning the members of `side` still on it.
    #[must_use]
    pub fn into_members(self, side: Side) -> Vec<Combatant> {
        self.slots
            .into_iter()
            .flatten()
            .filter(|c| c.side == side)
            .collect()
    }
}
