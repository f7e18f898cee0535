//! # press-turn
//!
//! A Press-Turn combat core: turn icons, affinity math, status ailments and
//! a tactical AI for a turn-based party battle.
//!
//! ## Design Principles
//!
//! 1. **Outcome-Driven Turns**: Every action resolves to a closed
//!    [`HitKind`]; the icon ledger spends or transforms icons from that
//!    alone. Weaknesses and criticals buy extra actions, misses and blocks
//!    cost them.
//!
//! 2. **Pure Math Kernel**: Hit, critical, damage and initiative formulas
//!    are free functions over borrowed combatants. Only the executor
//!    mutates.
//!
//! 3. **Deterministic**: All randomness flows through a seeded
//!    [`BattleRng`]. The same seed, data and inputs replay the same battle.
//!
//! 4. **Collaborators Behind Traits**: Terminal, inventory and demon stock
//!    are [`BattleIo`], [`Inventory`] and [`Roster`] implementations owned
//!    by the caller.
//!
//! ## Modules
//!
//! - `core`: Combatants, stats, elements, RNG, configuration
//! - `data`: Skill, ailment, species and item definitions; the registry
//! - `combat`: Affinity resolution, hit/crit/damage math, outcomes
//! - `status`: Ailments, support effects and turn boundaries
//! - `turns`: The press-turn icon ledger
//! - `ai`: Affinity knowledge, targeting and the tactical ladder
//! - `battle`: Action execution and the battle loop

pub mod ai;
pub mod battle;
pub mod combat;
pub mod core;
pub mod data;
pub mod error;
pub mod status;
pub mod turns;

// Re-export commonly used types
pub use crate::core::{
    Affinity, AffinityTable, BattleConfig, BattleRng, BattleRngState, BuffAxis, ClassType, Combatant,
    CombatantId, Controller, Element, Loadout, Persona, Side, Stat, StatBlock, Weapon,
};

pub use crate::data::{
    ActionRestriction, AilmentDefinition, DataRegistry, ItemDefinition, ItemKind, SkillCost,
    SkillDefinition, SkillKind, SpeciesDefinition,
};

pub use crate::combat::{aggregate_outcomes, ActionOutcome, HitKind};

pub use crate::status::{StatusEngine, TurnDirective};

pub use crate::turns::TurnIconLedger;

pub use crate::ai::{AiDecision, BattleKnowledge, TacticalAi, TargetScope};

pub use crate::battle::{
    ActionExecutor, Battle, BattleEvent, BattleIo, BattleOutcome, BattleReport, BattleRewards, Inventory,
    PlayerCommand, Roster,
};

pub use crate::error::{ActionError, ConfigError, DataError};
