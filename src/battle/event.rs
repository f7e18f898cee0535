//! Battle events.
//!
//! Everything that happens during a battle is recorded as a [`BattleEvent`].
//! The log is returned in the battle report; each event is also narrated
//! through [`BattleIo`](super::BattleIo) as it happens.

use serde::{Deserialize, Serialize};

use super::field::Field;
use super::interfaces::Color;
use super::orchestrator::BattleOutcome;
use crate::combat::ActionOutcome;
use crate::core::{Affinity, CombatantId, Controller, Side};
use crate::status::{BuffChange, StatusEvent, SupportEffect};

/// Something that happened during a battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    Initiative { side: Side },
    PhaseStarted { side: Side, icons: u32 },

    /// An actor announced an action; `action` is "Attack", a skill or an item.
    ActionDeclared { actor: CombatantId, action: String },
    Damage {
        target: CombatantId,
        amount: i32,
        affinity: Affinity,
        critical: bool,
    },
    /// An Absorb turned the hit into healing.
    Drained { target: CombatantId, amount: i32 },
    Missed { target: CombatantId },
    /// Null, or an instant kill that could not take.
    Blocked { target: CombatantId },
    /// A Repel bounced damage onto `target`, the original attacker.
    Reflected { target: CombatantId, amount: i32 },
    KnockedDown { target: CombatantId },
    Dizzy { target: CombatantId },
    InstantKill { target: CombatantId },
    Defeated { target: CombatantId },

    Healed { target: CombatantId, amount: i32 },
    SpRestored { target: CombatantId, amount: i32 },
    Revived { target: CombatantId, hp: i32 },
    Cured { target: CombatantId, ailment: String },
    Inflicted { target: CombatantId, ailment: String },
    Support(BuffChange),
    Status(StatusEvent),

    TurnSkipped { actor: CombatantId },
    Guarded { actor: CombatantId },
    Analyzed { target: CombatantId },
    Passed { actor: CombatantId },
    Summoned { demon: CombatantId, name: String },
    Returned { name: String },
    Fled { name: String },
    EscapeFailed { actor: CombatantId },
    ControlChanged { member: CombatantId, controller: Controller },

    /// Icons after an action resolved.
    Icons {
        outcome: ActionOutcome,
        full: u32,
        blinking: u32,
    },
    Ended { outcome: BattleOutcome },
}

impl BattleEvent {
    /// Player-facing line for the event, or `None` for bookkeeping events.
    #[must_use]
    pub fn narrate(&self, field: &Field) -> Option<(String, Color)> {
        let name = |id: CombatantId| field.name(id).to_string();
        let line = match self {
            BattleEvent::Initiative { side: Side::Player } => {
                ("Player party attacks first!".into(), Color::Cyan)
            }
            BattleEvent::Initiative { side: Side::Enemy } => {
                ("Enemy party attacks first!".into(), Color::Red)
            }
            BattleEvent::PhaseStarted { side, icons } => {
                let label = match side {
                    Side::Player => "PLAYER PHASE",
                    Side::Enemy => "ENEMY PHASE",
                };
                (format!("=== {label} ({icons} icons) ==="), Color::Yellow)
            }
            BattleEvent::ActionDeclared { actor, action } if action == "Attack" => {
                (format!("{} attacks!", name(*actor)), Color::Default)
            }
            BattleEvent::ActionDeclared { actor, action } => {
                (format!("{} uses {action}!", name(*actor)), Color::Default)
            }
            BattleEvent::Damage {
                target,
                amount,
                affinity,
                critical,
            } => {
                let mut line = format!("{} takes {amount} damage", name(*target));
                match affinity {
                    Affinity::Weak => line.push_str(" (WEAK)"),
                    Affinity::Resist => line.push_str(" (resist)"),
                    _ => {}
                }
                if *critical {
                    line.push_str(" CRITICAL!");
                }
                let color = if *critical || *affinity == Affinity::Weak {
                    Color::Yellow
                } else {
                    Color::Default
                };
                (line, color)
            }
            BattleEvent::Drained { target, amount } => {
                (format!("{} absorbs {amount} HP!", name(*target)), Color::Red)
            }
            BattleEvent::Missed { target } => (format!("Missed {}!", name(*target)), Color::Gray),
            BattleEvent::Blocked { target } => (format!("{} blocks it!", name(*target)), Color::Gray),
            BattleEvent::Reflected { target, amount } => (
                format!("{} is hit by the reflection for {amount}!", name(*target)),
                Color::Red,
            ),
            BattleEvent::KnockedDown { target } => (format!("{} is knocked down!", name(*target)), Color::Yellow),
            BattleEvent::Dizzy { target } => (format!("{} is dizzy!", name(*target)), Color::Yellow),
            BattleEvent::InstantKill { target } => (format!("{} is struck down!", name(*target)), Color::Magenta),
            BattleEvent::Defeated { target } => (format!("{} is defeated!", name(*target)), Color::Red),
            BattleEvent::Healed { target, amount } => {
                (format!("{} recovers {amount} HP.", name(*target)), Color::Green)
            }
            BattleEvent::SpRestored { target, amount } => {
                (format!("{} recovers {amount} SP.", name(*target)), Color::Green)
            }
            BattleEvent::Revived { target, .. } => (format!("{} is revived!", name(*target)), Color::Green),
            BattleEvent::Cured { target, ailment } => {
                (format!("{} is cured of {ailment}.", name(*target)), Color::Green)
            }
            BattleEvent::Inflicted { target, ailment } => {
                (format!("{} is afflicted with {ailment}!", name(*target)), Color::Magenta)
            }
            BattleEvent::Support(change) => (describe_support(change, field), Color::Cyan),
            BattleEvent::Status(status) => return describe_status(status, field),
            BattleEvent::TurnSkipped { actor } => {
                (format!("{} is unable to move!", name(*actor)), Color::Magenta)
            }
            BattleEvent::Guarded { actor } => (format!("{} is guarding.", name(*actor)), Color::Default),
            BattleEvent::Analyzed { target } => (format!("Analyzed {}.", name(*target)), Color::Yellow),
            BattleEvent::Passed { actor } => (format!("{} passes.", name(*actor)), Color::Default),
            BattleEvent::Summoned { name: demon, .. } => (format!("{demon} is summoned!"), Color::Cyan),
            BattleEvent::Returned { name: demon } => (format!("{demon} returns to stock."), Color::Default),
            BattleEvent::Fled { name: who } => (format!("{who} has fled!"), Color::Red),
            BattleEvent::EscapeFailed { .. } => ("Failed to escape!".into(), Color::Red),
            BattleEvent::ControlChanged { member, controller } => {
                let mode = match controller {
                    Controller::Local => "direct control",
                    _ => "act freely",
                };
                (format!("{} is now set to {mode}.", name(*member)), Color::Default)
            }
            BattleEvent::Icons { .. } => return None,
            BattleEvent::Ended { outcome } => match outcome {
                BattleOutcome::PlayerWon => ("VICTORY!".into(), Color::Green),
                BattleOutcome::Defeated => ("DEFEAT...".into(), Color::Red),
                BattleOutcome::Escaped => ("Escaped safely!".into(), Color::Cyan),
                BattleOutcome::SpecialItemUsed => ("Warped out of battle!".into(), Color::Cyan),
                BattleOutcome::Stalemate => ("The battle drags to a standstill.".into(), Color::Gray),
            },
        };
        Some(line)
    }
}

fn describe_support(change: &BuffChange, field: &Field) -> String {
    let who = field.name(change.target);
    match change.effect {
        SupportEffect::Stage { axis, delta } => {
            let dir = if delta > 0 { "rises" } else { "falls" };
            format!("{who}'s {axis:?} {dir} (stage {}).", change.stage.unwrap_or(0))
        }
        SupportEffect::ClearPositive => format!("{who}'s buffs are nullified."),
        SupportEffect::ClearNegative => format!("{who}'s debuffs are nullified."),
        SupportEffect::Charge => format!("{who} is focusing power."),
        SupportEffect::MindCharge => format!("{who} is focusing the mind."),
        SupportEffect::PhysicalShield => format!("{who} is shielded from physical attacks."),
        SupportEffect::MagicShield => format!("{who} is shielded from magic."),
        SupportEffect::Break(element) => format!("{who}'s {element} resistance is broken!"),
    }
}

fn describe_status(status: &StatusEvent, field: &Field) -> Option<(String, Color)> {
    let line = match status {
        StatusEvent::Regenerated { target, hp, sp } => {
            (format!("{} regenerates {hp} HP and {sp} SP.", field.name(*target)), Color::Green)
        }
        StatusEvent::DamageOverTime { target, ailment, amount } => (
            format!("{} suffers {amount} damage from {ailment}.", field.name(*target)),
            Color::Magenta,
        ),
        StatusEvent::Recovered { target, ailment } | StatusEvent::WoreOff { target, ailment } => {
            (format!("{} recovered from {ailment}.", field.name(*target)), Color::Gray)
        }
        StatusEvent::BuffExpired { target, axis } => {
            (format!("{}'s {axis:?} returns to normal.", field.name(*target)), Color::Gray)
        }
        StatusEvent::BreakRestored { target, element } => {
            (format!("{}'s {element} affinity is restored.", field.name(*target)), Color::Gray)
        }
        StatusEvent::StoodUp { .. } => return None,
        StatusEvent::DizzyRecovered { target } => {
            (format!("{} shakes off the dizziness.", field.name(*target)), Color::Gray)
        }
    };
    Some(line)
}
