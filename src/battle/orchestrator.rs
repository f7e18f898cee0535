//! The battle loop.
//!
//! [`Battle`] owns both sides for the length of one encounter and drives
//! the phase loop:
//!
//! 1. Roll initiative to pick the first side
//! 2. Each phase: dissolve the side's shields, fill the icon ledger with
//!    one icon per living member, then hand out turns round-robin until
//!    the icons run out or the battle is decided
//! 3. Each turn: turn-start status processing, the action (menu for local
//!    players, [`TacticalAi`] otherwise), the ledger update, turn-end
//!    status processing
//! 4. On completion: rewards (victory only), battle-state cleanup, and a
//!    [`BattleReport`]
//!
//! The loop is strictly sequential; the only suspension points are the
//! blocking [`BattleIo`] calls.

use serde::{Deserialize, Serialize};

use super::event::BattleEvent;
use super::executor::{ActionExecutor, Resolution};
use super::field::{Field, MAX_ACTIVE_PARTY};
use super::input::{CommandMenu, PlayerCommand};
use super::interfaces::{BattleIo, Color, Inventory, Roster};
use super::rewards::BattleRewards;
use crate::ai::{AiAction, AiContext, AiDecision, BattleKnowledge, TacticalAi};
use crate::combat::{roll_initiative, ActionOutcome};
use crate::core::{BattleConfig, BattleRng, ClassType, Combatant, CombatantId, Controller, Side};
use crate::data::{DataRegistry, ItemKind};
use crate::error::ActionError;
use crate::status::{StatusEngine, TurnDirective};
use crate::turns::TurnIconLedger;

/// How a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    PlayerWon,
    Defeated,
    Escaped,
    /// An escape item (Traesto Gem) was used.
    SpecialItemUsed,
    /// The phase limit was reached.
    Stalemate,
}

/// Everything a caller needs after a battle.
#[derive(Clone, Debug)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    /// Party members still on the field, battle-only state cleared.
    pub party: Vec<Combatant>,
    pub rewards: BattleRewards,
    pub events: Vec<BattleEvent>,
    /// Player-side affinity knowledge, to carry into the next battle.
    pub knowledge: BattleKnowledge,
    pub phases: u32,
}

/// What a command did to the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Spent {
    Outcome(ActionOutcome),
    Pass,
    /// No turn spent; prompt again.
    Free,
    BattleOver,
}

/// One encounter.
pub struct Battle<'a> {
    registry: &'a DataRegistry,
    config: &'a BattleConfig,
    io: &'a mut dyn BattleIo,
    inventory: &'a mut dyn Inventory,
    roster: &'a mut dyn Roster,

    field: Field,
    ledger: TurnIconLedger,
    player_knowledge: BattleKnowledge,
    enemy_knowledge: BattleKnowledge,
    combat_rng: BattleRng,
    ai_rng: BattleRng,

    events: Vec<BattleEvent>,
    outcome: Option<BattleOutcome>,
    phases: u32,
}

impl<'a> Battle<'a> {
    pub fn new(
        registry: &'a DataRegistry,
        config: &'a BattleConfig,
        io: &'a mut dyn BattleIo,
        inventory: &'a mut dyn Inventory,
        roster: &'a mut dyn Roster,
    ) -> Self {
        let rng = BattleRng::new(config.seed);
        Self {
            registry,
            config,
            io,
            inventory,
            roster,
            field: Field::new(),
            ledger: TurnIconLedger::new(),
            player_knowledge: BattleKnowledge::new(),
            enemy_knowledge: BattleKnowledge::new(),
            combat_rng: rng.for_context("combat"),
            ai_rng: rng.for_context("ai"),
            events: Vec::new(),
            outcome: None,
            phases: 0,
        }
    }

    /// Deploy the player party (builder pattern).
    #[must_use]
    pub fn with_party(mut self, party: impl IntoIterator<Item = Combatant>) -> Self {
        for member in party {
            self.field.deploy(member, Side::Player);
        }
        self
    }

    /// Deploy the enemy party (builder pattern).
    #[must_use]
    pub fn with_enemies(mut self, enemies: impl IntoIterator<Item = Combatant>) -> Self {
        for enemy in enemies {
            self.field.deploy(enemy, Side::Enemy);
        }
        self
    }

    /// Start from what the player side learned in earlier battles.
    #[must_use]
    pub fn with_knowledge(mut self, knowledge: BattleKnowledge) -> Self {
        self.player_knowledge = knowledge;
        self
    }

    #[must_use]
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Run the battle to completion.
    pub fn start_battle(mut self) -> BattleReport {
        self.io.write_line("=== ENEMY ENCOUNTER ===", Color::Default);
        let appeared: Vec<String> = self
            .field
            .members(Side::Enemy)
            .iter()
            .map(|e| format!("Appeared: {} (Lv.{})", e.name, e.level))
            .collect();
        for line in appeared {
            self.io.write_line(&line, Color::Default);
        }

        let first = roll_initiative(
            self.field.average_agility(Side::Player),
            self.field.average_agility(Side::Enemy),
            &mut self.combat_rng,
        );
        tracing::info!(?first, seed = self.config.seed, "battle started");
        self.record(BattleEvent::Initiative { side: first });

        let mut side = first;
        while !self.check_completion() {
            if self.config.phase_limit.is_some_and(|limit| self.phases >= limit) {
                tracing::warn!(phases = self.phases, "phase limit reached");
                self.outcome = Some(BattleOutcome::Stalemate);
                break;
            }
            self.run_phase(side);
            side = side.opponent();
        }
        self.finish()
    }

    // === Phases and Turns ===

    fn run_phase(&mut self, side: Side) {
        self.phases += 1;
        let status = StatusEngine::new(self.registry, self.config);
        for id in self.field.living(side) {
            if let Some(member) = self.field.get_mut(id) {
                status.phase_start(member);
            }
        }

        let living = self.field.living(side).len() as u32;
        if living == 0 {
            return;
        }
        self.ledger.start_phase(living);
        self.record(BattleEvent::PhaseStarted { side, icons: living });

        let mut last = None;
        while self.ledger.has_turns() && self.outcome.is_none() {
            let Some(actor) = self.next_actor(side, last) else { break };
            last = Some(actor);
            self.take_turn(actor);
            if self.check_completion() {
                break;
            }
        }
    }

    /// Next living member after `last` in id order, wrapping around.
    fn next_actor(&self, side: Side, last: Option<CombatantId>) -> Option<CombatantId> {
        let living = self.field.living(side);
        last.and_then(|l| living.iter().copied().find(|id| *id > l))
            .or_else(|| living.first().copied())
    }

    fn take_turn(&mut self, actor: CombatantId) {
        let status = StatusEngine::new(self.registry, self.config);
        let Some(member) = self.field.get_mut(actor) else { return };
        let side = member.side;
        let start = status.turn_start(member, &mut self.combat_rng);
        for event in start.events {
            self.record(BattleEvent::Status(event));
        }

        match start.directive {
            TurnDirective::Skip => {
                self.record(BattleEvent::TurnSkipped { actor });
                self.spend(ActionOutcome::NORMAL);
            }
            TurnDirective::FleeBattle if side == Side::Player => {
                let name = self.field.name(actor).to_string();
                self.record(BattleEvent::Fled { name });
                self.outcome = Some(BattleOutcome::Escaped);
                return;
            }
            TurnDirective::FleeBattle => {
                if let Some(fled) = self.field.withdraw(actor) {
                    self.record(BattleEvent::Fled { name: fled.name });
                }
                self.spend(ActionOutcome::NORMAL);
            }
            TurnDirective::ReturnToComp => {
                if let Some(mut demon) = self.field.withdraw(actor) {
                    if side == Side::Player {
                        demon.clear_battle_state();
                        self.record(BattleEvent::Returned { name: demon.name.clone() });
                        self.roster.stow(demon);
                    } else {
                        self.record(BattleEvent::Fled { name: demon.name });
                    }
                }
                self.spend(ActionOutcome::NORMAL);
            }
            directive @ (TurnDirective::CanAct
            | TurnDirective::ForcedPhysical
            | TurnDirective::ForcedConfusion) => self.act(actor, directive),
        }

        if self.outcome.is_some() {
            return;
        }
        if let Some(member) = self.field.get_mut(actor) {
            let events = status.turn_end(member, &mut self.combat_rng);
            for event in events {
                self.record(BattleEvent::Status(event));
            }
        }
    }

    fn act(&mut self, actor: CombatantId, directive: TurnDirective) {
        let Some(member) = self.field.get(actor) else { return };
        let local = member.side == Side::Player && member.controller == Controller::Local;

        if local && directive == TurnDirective::CanAct {
            loop {
                let menu = CommandMenu {
                    registry: self.registry,
                    field: &self.field,
                    inventory: &*self.inventory,
                    roster: &*self.roster,
                    is_boss_battle: self.config.is_boss_battle,
                };
                let Some(command) = menu.prompt(&mut *self.io, actor) else {
                    tracing::warn!(%actor, "no command given, acting automatically");
                    break;
                };
                match self.execute_command(actor, command) {
                    Ok(Spent::Free) => continue,
                    Ok(spent) => {
                        self.settle(spent);
                        return;
                    }
                    Err(err) => {
                        tracing::debug!(%actor, %err, "command rejected");
                        self.io.write_line(&err.to_string(), Color::Red);
                    }
                }
            }
        }

        let spent = self.ai_turn(actor, directive);
        self.settle(spent);
    }

    fn settle(&mut self, spent: Spent) {
        match spent {
            Spent::Outcome(outcome) => self.spend(outcome),
            Spent::Pass => {
                self.ledger.pass();
                self.record_icons(ActionOutcome::NORMAL);
            }
            Spent::Free | Spent::BattleOver => {}
        }
        self.io.wait(self.config.message_delay_ms);
    }

    fn spend(&mut self, outcome: ActionOutcome) {
        self.ledger.consume(outcome);
        self.record_icons(outcome);
    }

    fn record_icons(&mut self, outcome: ActionOutcome) {
        self.events.push(BattleEvent::Icons {
            outcome,
            full: self.ledger.full(),
            blinking: self.ledger.blinking(),
        });
    }

    // === Actions ===

    fn ai_turn(&mut self, actor: CombatantId, directive: TurnDirective) -> Spent {
        let Some(decision) = self.ai_decision(actor, directive, false) else {
            return Spent::BattleOver;
        };
        let err = match self.perform_ai(actor, &decision) {
            Ok(spent) => return spent,
            Err(err) => err,
        };

        // Rejected actions leave the field untouched; drop to the last tier.
        tracing::warn!(%actor, ?decision, %err, "AI action rejected, falling back");
        let Some(fallback) = self.ai_decision(actor, directive, true) else {
            return Spent::BattleOver;
        };
        match self.perform_ai(actor, &fallback) {
            Ok(spent) => spent,
            Err(err) => {
                tracing::warn!(%actor, ?fallback, %err, "AI fallback rejected, passing");
                self.record(BattleEvent::Passed { actor });
                Spent::Pass
            }
        }
    }

    fn ai_decision(&mut self, actor: CombatantId, directive: TurnDirective, fallback: bool) -> Option<AiDecision> {
        let member = self.field.get(actor)?;
        let side = member.side;
        let allies = self.field.members(side);
        let opponents = self.field.members(side.opponent());
        let ctx = AiContext {
            actor: member,
            allies: &allies,
            opponents: &opponents,
            knowledge: match side {
                Side::Player => &self.player_knowledge,
                Side::Enemy => &self.enemy_knowledge,
            },
            icons: self.ledger.total(),
            directive,
        };
        let ai = TacticalAi::new(self.registry, self.config);
        Some(if fallback {
            ai.fallback(&ctx, &mut self.ai_rng)
        } else {
            ai.decide(&ctx, &mut self.ai_rng)
        })
    }

    fn perform_ai(&mut self, actor: CombatantId, decision: &AiDecision) -> Result<Spent, ActionError> {
        let side = self.field.get(actor).map_or(Side::Enemy, |m| m.side);
        let outcome = match &decision.action {
            AiAction::Pass => {
                self.record(BattleEvent::Passed { actor });
                return Ok(Spent::Pass);
            }
            AiAction::BasicAttack => {
                let &target = decision.targets.first().ok_or(ActionError::NoValidTarget)?;
                self.run(side, |exec, field, knowledge, rng| {
                    exec.basic_attack(field, actor, target, knowledge, rng)
                })?
            }
            AiAction::Skill(name) => self.run(side, |exec, field, knowledge, rng| {
                exec.use_skill(field, actor, name, &decision.targets, knowledge, rng)
            })?,
        };
        Ok(Spent::Outcome(outcome))
    }

    fn execute_command(&mut self, actor: CombatantId, command: PlayerCommand) -> Result<Spent, ActionError> {
        let side = Side::Player;
        let exec = ActionExecutor::new(self.registry, self.config);
        let outcome = match command {
            PlayerCommand::Attack { target } => self.run(side, |exec, field, knowledge, rng| {
                exec.basic_attack(field, actor, target, knowledge, rng)
            })?,
            PlayerCommand::Skill { skill, targets } => self.run(side, |exec, field, knowledge, rng| {
                exec.use_skill(field, actor, &skill, &targets, knowledge, rng)
            })?,
            PlayerCommand::Item { item, targets } => return self.use_item(actor, &item, &targets),
            PlayerCommand::Guard => {
                let resolution = exec.guard(&mut self.field, actor)?;
                self.apply(resolution)
            }
            PlayerCommand::Analyze { target } => {
                let resolution = exec.analyze(&self.field, actor, target, &mut self.player_knowledge)?;
                self.apply(resolution)
            }
            PlayerCommand::Summon { stock_index } => {
                if self.field.count(side) >= MAX_ACTIVE_PARTY {
                    return Err(ActionError::PartyFull);
                }
                let demon = self.roster.summon(stock_index).ok_or(ActionError::NoDemon)?;
                let name = demon.name.clone();
                let id = self.field.deploy(demon, side);
                self.record(BattleEvent::Summoned { demon: id, name });
                ActionOutcome::NORMAL
            }
            PlayerCommand::Return { demon } => {
                let valid = self
                    .field
                    .get(demon)
                    .is_some_and(|d| d.side == side && d.class == ClassType::Demon && d.id != actor);
                if !valid {
                    return Err(ActionError::NoValidTarget);
                }
                let Some(mut returned) = self.field.withdraw(demon) else {
                    return Err(ActionError::NoValidTarget);
                };
                returned.clear_battle_state();
                self.record(BattleEvent::Returned { name: returned.name.clone() });
                self.roster.stow(returned);
                ActionOutcome::NORMAL
            }
            PlayerCommand::Pass => {
                self.record(BattleEvent::Passed { actor });
                return Ok(Spent::Pass);
            }
            PlayerCommand::Escape => return self.try_escape(actor),
            PlayerCommand::Strategy { member } => {
                let target = self
                    .field
                    .get_mut(member)
                    .filter(|m| m.side == side && m.class == ClassType::Demon)
                    .ok_or(ActionError::NoValidTarget)?;
                target.controller = match target.controller {
                    Controller::Local => Controller::Ai,
                    _ => Controller::Local,
                };
                let controller = target.controller;
                self.record(BattleEvent::ControlChanged { member, controller });
                return Ok(Spent::Free);
            }
        };
        Ok(Spent::Outcome(outcome))
    }

    fn use_item(&mut self, actor: CombatantId, item_id: &str, targets: &[CombatantId]) -> Result<Spent, ActionError> {
        let registry = self.registry;
        let item = registry
            .item(item_id)
            .ok_or_else(|| ActionError::UnknownItem(item_id.to_string()))?;
        if self.inventory.count(item_id) == 0 {
            return Err(ActionError::UnknownItem(item_id.to_string()));
        }

        if item.kind == ItemKind::Escape {
            self.inventory.consume(item_id);
            self.record(BattleEvent::ActionDeclared {
                actor,
                action: item.name.clone(),
            });
            self.outcome = Some(BattleOutcome::SpecialItemUsed);
            return Ok(Spent::BattleOver);
        }

        let outcome = self.run(Side::Player, |exec, field, knowledge, rng| {
            exec.use_item(field, actor, item, targets, knowledge, rng)
        })?;
        self.inventory.consume(item_id);
        Ok(Spent::Outcome(outcome))
    }

    fn try_escape(&mut self, actor: CombatantId) -> Result<Spent, ActionError> {
        if self.config.is_boss_battle {
            return Err(ActionError::EscapeBlocked);
        }
        let chance = self.field.escape_chance_for(actor).ok_or(ActionError::ActorUnavailable {
            actor: actor.to_string(),
        })?;
        if self.combat_rng.check_percent(chance) {
            tracing::info!(chance, "escaped");
            self.outcome = Some(BattleOutcome::Escaped);
            return Ok(Spent::BattleOver);
        }
        self.record(BattleEvent::EscapeFailed { actor });
        Ok(Spent::Outcome(ActionOutcome::NORMAL))
    }

    /// Run an executor call for `side` and record its events.
    fn run<F>(&mut self, side: Side, call: F) -> Result<ActionOutcome, ActionError>
    where
        F: FnOnce(
            &ActionExecutor<'a>,
            &mut Field,
            &mut BattleKnowledge,
            &mut BattleRng,
        ) -> Result<Resolution, ActionError>,
    {
        let exec = ActionExecutor::new(self.registry, self.config);
        let knowledge = match side {
            Side::Player => &mut self.player_knowledge,
            Side::Enemy => &mut self.enemy_knowledge,
        };
        let resolution = call(&exec, &mut self.field, knowledge, &mut self.combat_rng)?;
        Ok(self.apply(resolution))
    }

    fn apply(&mut self, resolution: Resolution) -> ActionOutcome {
        for event in resolution.events {
            self.record(event);
        }
        resolution.outcome
    }

    // === Completion ===

    /// Decide the battle if a side is wiped. Returns whether it is over.
    fn check_completion(&mut self) -> bool {
        if self.outcome.is_none() {
            if self.field.is_wiped(Side::Enemy) {
                self.outcome = Some(BattleOutcome::PlayerWon);
            } else if self.field.is_wiped(Side::Player) {
                self.outcome = Some(BattleOutcome::Defeated);
            }
        }
        self.outcome.is_some()
    }

    fn finish(mut self) -> BattleReport {
        let outcome = self.outcome.unwrap_or(BattleOutcome::Stalemate);
        self.record(BattleEvent::Ended { outcome });

        let rewards = if outcome == BattleOutcome::PlayerWon {
            let fallen: Vec<&Combatant> = self
                .field
                .members(Side::Enemy)
                .into_iter()
                .filter(|e| e.is_dead())
                .collect();
            BattleRewards::from_defeated(self.registry, fallen)
        } else {
            BattleRewards::default()
        };
        if outcome == BattleOutcome::PlayerWon {
            let line = format!("Gained {} EXP and {} Macca.", rewards.exp, rewards.currency);
            self.io.write_line(&line, Color::Default);
        }
        tracing::info!(?outcome, phases = self.phases, exp = rewards.exp, "battle ended");

        self.io.write_line("Press any key to exit battle...", Color::Gray);
        self.io.read_key();

        let mut party = self.field.into_members(Side::Player);
        for member in &mut party {
            member.clear_battle_state();
        }
        BattleReport {
            outcome,
            party,
            rewards,
            events: self.events,
            knowledge: self.player_knowledge,
            phases: self.phases,
        }
    }

    /// Log an event and narrate it.
    fn record(&mut self, event: BattleEvent) {
        if let Some((line, color)) = event.narrate(&self.field) {
            self.io.write_line(&line, color);
        }
        tracing::trace!(?event, "battle event");
        self.events.push(event);
    }
}
