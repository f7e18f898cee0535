//! Ailment infliction, cures, and turn-start/turn-end processing.
//!
//! ## Turn Start
//!
//! 1. Guarding and down-immunity drop
//! 2. A dizzy combatant loses the turn, recovers, and cannot be knocked
//!    down again until its next turn start
//! 3. A downed combatant stands up
//! 4. The ailment's restriction decides the [`TurnDirective`]
//!
//! ## Turn End
//!
//! 1. Passive HP/SP regeneration
//! 2. Damage over time, never lethal
//! 3. Ailment removal: one-turn ailments drop, natural-roll ailments may
//!    shake off on a luck roll, everything else counts down
//! 4. Buff stages and broken affinities count down

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::support::{BuffChange, SupportEffect};
use crate::core::{BattleConfig, BattleRng, BuffAxis, Combatant, CombatantId, Element, Stat};
use crate::data::{ActionRestriction, AilmentDefinition, DataRegistry, RemovalTrigger};

/// Infliction chance bounds, in percent.
pub const INFLICT_CHANCE_MIN: i32 = 5;
pub const INFLICT_CHANCE_MAX: i32 = 95;

/// Base chance when the effect text gives none.
pub const DEFAULT_INFLICT_CHANCE: i32 = 100;

/// Panic: chance in percent to lose the turn.
pub const PANIC_SKIP_CHANCE: u32 = 50;

/// Fear: rolls below this flee.
pub const FEAR_FLEE_CHANCE: u32 = 15;

/// Fear: rolls below this (and not fleeing) lose the turn.
pub const FEAR_SKIP_THRESHOLD: u32 = 55;

/// Natural recovery base chance; LUK/2 is added.
pub const NATURAL_RECOVERY_BASE: i32 = 20;

/// What a combatant may do this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnDirective {
    CanAct,
    /// Lose the turn.
    Skip,
    /// Basic-attack a random opponent.
    ForcedPhysical,
    /// Aid the foe or attack an ally.
    ForcedConfusion,
    /// Run from the battle.
    FleeBattle,
    /// Demon retreats to stock.
    ReturnToComp,
}

impl TurnDirective {
    /// Whether the turn's action is chosen by the ailment rather than the controller.
    #[must_use]
    pub const fn is_forced(self) -> bool {
        matches!(self, TurnDirective::ForcedPhysical | TurnDirective::ForcedConfusion)
    }
}

/// Result of an infliction attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Infliction {
    Inflicted { ailment: String, chance: u32 },
    Resisted { ailment: String, chance: u32 },
    /// A passive made the target immune.
    Immune { ailment: String },
    /// Already afflicted, guarding, or fallen.
    Blocked { ailment: String },
    /// The effect text names no known ailment.
    NoAilment,
}

impl Infliction {
    #[must_use]
    pub fn landed(&self) -> bool {
        matches!(self, Infliction::Inflicted { .. })
    }
}

/// Something that happened while processing a turn boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatusEvent {
    Regenerated { target: CombatantId, hp: i32, sp: i32 },
    DamageOverTime { target: CombatantId, ailment: String, amount: i32 },
    /// Shook the ailment off early.
    Recovered { target: CombatantId, ailment: String },
    /// The ailment ran its course.
    WoreOff { target: CombatantId, ailment: String },
    BuffExpired { target: CombatantId, axis: BuffAxis },
    BreakRestored { target: CombatantId, element: Element },
    StoodUp { target: CombatantId },
    DizzyRecovered { target: CombatantId },
}

/// Outcome of turn-start processing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnStart {
    pub directive: TurnDirective,
    pub events: SmallVec<[StatusEvent; 2]>,
}

/// Applies ailments, cures, support effects and turn boundaries.
///
/// Holds only shared references; every method takes the combatant to
/// mutate explicitly.
#[derive(Clone, Copy, Debug)]
pub struct StatusEngine<'a> {
    registry: &'a DataRegistry,
    config: &'a BattleConfig,
}

impl<'a> StatusEngine<'a> {
    #[must_use]
    pub fn new(registry: &'a DataRegistry, config: &'a BattleConfig) -> Self {
        Self { registry, config }
    }

    // === Ailments ===

    /// First registered ailment whose name appears in `effect`.
    #[must_use]
    pub fn find_ailment(&self, effect: &str) -> Option<&'a AilmentDefinition> {
        let lower = effect.to_ascii_lowercase();
        self.registry
            .ailments()
            .find(|a| lower.contains(&a.name.to_ascii_lowercase()))
    }

    /// `clamp(base + LUK diff, 5, 95)`, where the base is the first "N%" in
    /// `effect` or 100.
    #[must_use]
    pub fn infliction_chance(effect: &str, attacker_luck: i32, target_luck: i32) -> u32 {
        let base = crate::data::skill::percent_in(effect).map_or(DEFAULT_INFLICT_CHANCE, |p| p as i32);
        (base + attacker_luck - target_luck).clamp(INFLICT_CHANCE_MIN, INFLICT_CHANCE_MAX) as u32
    }

    /// Try to inflict the ailment `effect` names.
    ///
    /// The attacker is given by its luck so the caller may hold a mutable
    /// borrow of the target alone.
    pub fn try_inflict(
        &self,
        attacker_luck: i32,
        target: &mut Combatant,
        effect: &str,
        rng: &mut BattleRng,
    ) -> Infliction {
        let Some(definition) = self.find_ailment(effect) else {
            return Infliction::NoAilment;
        };
        let ailment = definition.name.clone();

        if target.passives().is_immune_to(&ailment) {
            return Infliction::Immune { ailment };
        }
        if target.is_dead() || target.ailment().is_some() || target.flags.guarding {
            return Infliction::Blocked { ailment };
        }

        let chance = Self::infliction_chance(effect, attacker_luck, target.stat(Stat::Luk));
        if rng.check_percent(chance) && target.inflict(definition, self.config.ailment_duration) {
            tracing::debug!(target = %target.name, %ailment, chance, "ailment inflicted");
            Infliction::Inflicted { ailment, chance }
        } else {
            Infliction::Resisted { ailment, chance }
        }
    }

    /// Cure the target's ailment if `text` names it or cures all.
    ///
    /// Returns the cured ailment's name.
    pub fn try_cure(&self, target: &mut Combatant, text: &str) -> Option<String> {
        let active = target.ailment()?;
        if Self::cures(text, &active.definition) {
            target.clear_ailment()
        } else {
            None
        }
    }

    /// Whether `text` cures `ailment`: it names the ailment or cures all.
    #[must_use]
    pub fn cures(text: &str, ailment: &AilmentDefinition) -> bool {
        let lower = text.to_ascii_lowercase();
        lower.contains("cure all") || lower.contains("cures all") || ailment.named_in(text)
    }

    // === Support ===

    /// Apply one support effect. Returns `None` when nothing changed.
    pub fn apply_support(&self, effect: SupportEffect, target: &mut Combatant) -> Option<BuffChange> {
        if !effect.would_change(target) {
            return None;
        }
        let mut stage = None;
        match effect {
            SupportEffect::Stage { axis, delta } => {
                stage = Some(target.buffs.shift(axis, delta, self.config.buff_duration));
            }
            SupportEffect::ClearPositive => {
                target.buffs.clear_positive();
            }
            SupportEffect::ClearNegative => {
                target.buffs.clear_negative();
            }
            SupportEffect::Charge => target.flags.charged = true,
            SupportEffect::MindCharge => target.flags.mind_charged = true,
            SupportEffect::PhysicalShield => target.flags.physical_shield = true,
            SupportEffect::MagicShield => target.flags.magic_shield = true,
            SupportEffect::Break(element) => target.break_affinity(element, self.config.break_duration),
        }
        Some(BuffChange {
            target: target.id,
            effect,
            stage,
        })
    }

    // === Turn Boundaries ===

    /// Reflect shields last until their owner's side starts a new phase.
    pub fn phase_start(&self, member: &mut Combatant) {
        member.flags.physical_shield = false;
        member.flags.magic_shield = false;
    }

    /// Process the start of `actor`'s turn.
    pub fn turn_start(&self, actor: &mut Combatant, rng: &mut BattleRng) -> TurnStart {
        let mut events = SmallVec::new();
        actor.flags.guarding = false;
        actor.flags.immune_to_down = false;

        if actor.flags.dizzy {
            actor.flags.dizzy = false;
            actor.flags.down = false;
            actor.flags.immune_to_down = true;
            events.push(StatusEvent::DizzyRecovered { target: actor.id });
            return TurnStart {
                directive: TurnDirective::Skip,
                events,
            };
        }
        if actor.flags.down {
            actor.flags.down = false;
            events.push(StatusEvent::StoodUp { target: actor.id });
        }

        let directive = match actor.restriction() {
            ActionRestriction::None => TurnDirective::CanAct,
            ActionRestriction::SkipTurn => TurnDirective::Skip,
            ActionRestriction::ChanceSkip => {
                if rng.check_percent(PANIC_SKIP_CHANCE) {
                    TurnDirective::Skip
                } else {
                    TurnDirective::CanAct
                }
            }
            ActionRestriction::ChanceSkipOrFlee => {
                let roll = rng.roll_percent();
                if roll < FEAR_FLEE_CHANCE {
                    self.flee_directive(actor)
                } else if roll < FEAR_SKIP_THRESHOLD {
                    TurnDirective::Skip
                } else {
                    TurnDirective::CanAct
                }
            }
            ActionRestriction::ConfusedAction => TurnDirective::ForcedConfusion,
            ActionRestriction::ForceAttack => TurnDirective::ForcedPhysical,
        };

        if directive != TurnDirective::CanAct {
            tracing::debug!(actor = %actor.name, ailment = ?actor.ailment_name(), ?directive, "turn start");
        }
        TurnStart { directive, events }
    }

    fn flee_directive(&self, actor: &Combatant) -> TurnDirective {
        if !actor.class.is_human_like() {
            TurnDirective::ReturnToComp
        } else if self.config.is_boss_battle {
            TurnDirective::Skip
        } else {
            TurnDirective::FleeBattle
        }
    }

    /// Process the end of `actor`'s turn.
    pub fn turn_end(&self, actor: &mut Combatant, rng: &mut BattleRng) -> Vec<StatusEvent> {
        let mut events = Vec::new();
        if actor.is_dead() {
            return events;
        }
        let id = actor.id;

        let regen_percent = actor.passives().hp_regen_percent as i32;
        let sp_regen = actor.passives().sp_regen as i32;
        if regen_percent > 0 || sp_regen > 0 {
            let hp_amount = if regen_percent > 0 {
                (actor.max_hp() * regen_percent / 100).max(1)
            } else {
                0
            };
            let hp = actor.heal(hp_amount);
            let sp = actor.restore_sp(sp_regen);
            if hp > 0 || sp > 0 {
                events.push(StatusEvent::Regenerated { target: id, hp, sp });
            }
        }

        if let Some(active) = actor.ailment() {
            let definition = active.definition.clone();

            if definition.dot_percent > 0.0 {
                let raw = (f64::from(actor.max_hp()) * definition.dot_percent / 100.0).floor() as i32;
                let amount = actor.take_nonlethal_damage(raw.max(1));
                events.push(StatusEvent::DamageOverTime {
                    target: id,
                    ailment: definition.name.clone(),
                    amount,
                });
            }

            if definition.has_trigger(RemovalTrigger::OneTurn) {
                actor.clear_ailment();
                events.push(StatusEvent::WoreOff { target: id, ailment: definition.name });
            } else if definition.has_trigger(RemovalTrigger::NaturalRoll)
                && rng.check_percent((NATURAL_RECOVERY_BASE + actor.stat(Stat::Luk) / 2) as u32)
            {
                actor.clear_ailment();
                events.push(StatusEvent::Recovered { target: id, ailment: definition.name });
            } else if actor.decay_ailment() {
                events.push(StatusEvent::WoreOff { target: id, ailment: definition.name });
            }
        }

        for axis in actor.buffs.tick() {
            events.push(StatusEvent::BuffExpired { target: id, axis });
        }
        for element in actor.tick_breaks() {
            events.push(StatusEvent::BreakRestored { target: id, element });
        }
        events
    }
}
