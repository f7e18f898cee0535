//! Combat math kernel.
//!
//! Pure functions over borrowed combatants: affinity resolution, hit and
//! critical checks, damage, initiative, and outcome classification. Nothing
//! here mutates a combatant; the battle executor applies results.

pub mod affinity;
pub mod damage;
pub mod hit;
pub mod initiative;
pub mod outcome;

pub use crate::core::stage_multiplier;

pub use affinity::{resolve_affinity, AffinityResolution, AffinitySource};
pub use damage::{
    base_damage, compute_damage, effective_attack, effective_defense, projected_damage,
    reflected_damage, DamageRoll,
};
pub use hit::{
    critical_chance, hit_chance, instant_kill_chance, roll_hit, roll_instant_kill,
    InstantKillResult,
};
pub use initiative::{escape_chance, roll_initiative, side_average_agility};
pub use outcome::{aggregate_outcomes, ActionOutcome, HitKind};
