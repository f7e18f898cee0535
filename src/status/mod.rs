//! Status effect engine: ailments, support effects and turn boundaries.

pub mod engine;
pub mod support;

pub use engine::{Infliction, StatusEngine, StatusEvent, TurnDirective, TurnStart};
pub use support::{BuffChange, SupportEffect, SupportEffects};
