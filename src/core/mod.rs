//! Core battle types: combatants, stats, elements, RNG, configuration.
//!
//! Everything else in the crate reads and writes these types; nothing here
//! depends on the battle loop.

pub mod combatant;
pub mod config;
pub mod element;
pub mod rng;
pub mod stats;

pub use combatant::{
    ActiveAilment, ClassType, CombatFlags, Combatant, CombatantId, Controller, Loadout, Persona,
    Side, Weapon, HP_CAP, SP_CAP,
};
pub use config::BattleConfig;
pub use element::{Affinity, AffinityTable, Element};
pub use rng::{BattleRng, BattleRngState};
pub use stats::{stage_multiplier, BuffAxis, BuffStage, BuffStages, Stat, StatBlock, MAX_STAGE, STAT_CAP};
