//! Victory rewards.

use serde::{Deserialize, Serialize};

use crate::core::Combatant;
use crate::data::DataRegistry;

/// EXP and currency earned from a won battle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRewards {
    pub exp: u32,
    pub currency: u32,
    /// Names of the defeated enemies that paid out.
    pub defeated: Vec<String>,
}

impl BattleRewards {
    /// Sum the species yields of `defeated` enemies.
    ///
    /// Enemies whose species is unknown pay nothing.
    pub fn from_defeated<'c>(registry: &DataRegistry, defeated: impl IntoIterator<Item = &'c Combatant>) -> Self {
        let mut rewards = Self::default();
        for enemy in defeated {
            let Some(species) = registry.species(&enemy.source_id) else {
                tracing::warn!(enemy = %enemy.name, source = %enemy.source_id, "no species data, no reward");
                continue;
            };
            rewards.exp = rewards.exp.saturating_add(species.exp_yield);
            rewards.currency = rewards.currency.saturating_add(species.currency_yield);
            rewards.defeated.push(enemy.name.clone());
        }
        rewards
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exp == 0 && self.currency == 0
    }
}
