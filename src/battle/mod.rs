//! Battle orchestration.
//!
//! The [`Battle`] drives one encounter from initiative to report. It owns
//! the [`Field`] of combatants, runs the icon ledger, and calls into the
//! [`ActionExecutor`] for every action a player menu or the AI chooses.
//!
//! Collaborators outside the core (terminal, inventory, demon stock) plug
//! in through the [`BattleIo`], [`Inventory`] and [`Roster`] traits.

pub mod event;
pub mod executor;
pub mod field;
pub mod input;
pub mod interfaces;
pub mod orchestrator;
pub mod rewards;

pub use event::BattleEvent;
pub use executor::{heal_amount, ActionExecutor, Resolution, FULL_REVIVE_VALUE};
pub use field::{Field, MAX_ACTIVE_PARTY};
pub use input::{item_scope, CommandMenu, PlayerCommand};
pub use interfaces::{
    BattleIo, Color, DemonStock, HeadlessIo, HighlightFn, Inventory, ItemBag, MenuOption, Roster, ScriptedIo,
};
pub use orchestrator::{Battle, BattleOutcome, BattleReport};
pub use rewards::BattleRewards;
