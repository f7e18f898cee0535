//! Static battle data: skills, ailments, species, items and passives.
//!
//! Everything here is read-only during a battle. The [`DataRegistry`] is
//! built up front and passed by reference to the engine.

pub mod ailment;
pub mod item;
pub mod passive;
pub mod registry;
pub mod skill;
pub mod species;

pub use ailment::{ActionRestriction, AilmentDefinition, RemovalTrigger};
pub use item::{ItemDefinition, ItemKind, FULL_HEAL_VALUE};
pub use passive::PassiveSet;
pub use registry::DataRegistry;
pub use skill::{SkillCost, SkillDefinition, SkillKind};
pub use species::SpeciesDefinition;
