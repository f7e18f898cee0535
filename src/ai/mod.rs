//! Tactical AI: knowledge, targeting and the decision ladder.
//!
//! - `knowledge`: per-side record of affinities seen in battle
//! - `targeting`: who a skill may be aimed at
//! - `ladder`: the priority ladder that picks an action

pub mod knowledge;
pub mod ladder;
pub mod targeting;

pub use knowledge::BattleKnowledge;
pub use ladder::{AiAction, AiContext, AiDecision, AiTier, TacticalAi, CHARM_AID_CHANCE};
pub use targeting::{candidates, expand, scope_for, TargetList, TargetScope};
