//! Human command input.
//!
//! Walks a local player through the command menus and returns a
//! [`PlayerCommand`]. Cancelling a submenu returns to the main menu;
//! cancelling the main menu returns `None` and the caller decides what to
//! do with the turn.
//!
//! ## Menu Tree
//!
//! ```text
//! Command: <actor>
//! ├── Attack ──── target
//! ├── Skill ───── skill ── target(s)      (Persona for persona users)
//! ├── Item ────── item ─── target(s)
//! ├── Guard
//! ├── Analyze ─── target
//! ├── COMP ────── Summon / Return          (operators only)
//! ├── Tactics ─── Escape / Strategy
//! └── Pass
//! ```

use serde::{Deserialize, Serialize};

use super::field::{Field, MAX_ACTIVE_PARTY};
use super::interfaces::{BattleIo, Color, Inventory, MenuOption, Roster};
use crate::ai::{candidates, scope_for, TargetList, TargetScope};
use crate::core::{ClassType, Combatant, CombatantId, Controller};
use crate::data::{ActionRestriction, DataRegistry, ItemKind, SkillKind};

/// A command chosen by a local player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    Attack { target: CombatantId },
    Skill { skill: String, targets: TargetList },
    Item { item: String, targets: TargetList },
    Guard,
    Analyze { target: CombatantId },
    /// Summon the demon at this stock position.
    Summon { stock_index: usize },
    Return { demon: CombatantId },
    Pass,
    Escape,
    /// Toggle a demon between direct control and acting freely. Costs no turn.
    Strategy { member: CombatantId },
}

impl PlayerCommand {
    /// Whether carrying out the command spends the actor's turn.
    #[must_use]
    pub fn spends_turn(&self) -> bool {
        !matches!(self, PlayerCommand::Strategy { .. })
    }
}

/// Who an item is aimed at.
#[must_use]
pub fn item_scope(kind: ItemKind) -> TargetScope {
    match kind {
        ItemKind::Healing { all: true } => TargetScope::AllAllies,
        ItemKind::Healing { all: false } | ItemKind::Spirit | ItemKind::Cure => TargetScope::Ally,
        ItemKind::Revive => TargetScope::FallenAlly,
        ItemKind::Offensive(_) => TargetScope::Foe,
        ItemKind::Escape | ItemKind::Other => TargetScope::User,
    }
}

/// Everything the menus read. Nothing here is mutated.
#[derive(Clone, Copy)]
pub struct CommandMenu<'m> {
    pub registry: &'m DataRegistry,
    pub field: &'m Field,
    pub inventory: &'m dyn Inventory,
    pub roster: &'m dyn Roster,
    pub is_boss_battle: bool,
}

impl<'m> CommandMenu<'m> {
    /// Prompt `actor` for a command. `None` when the main menu is cancelled.
    pub fn prompt(&self, io: &mut dyn BattleIo, actor: CombatantId) -> Option<PlayerCommand> {
        let member = self.field.get(actor)?;
        let panicked = member.restriction() == ActionRestriction::ChanceSkip;
        let skill_label = match member.class {
            ClassType::PersonaUser | ClassType::WildCard => "Persona",
            _ => "Skill",
        };

        let mut entries = vec![
            (Entry::Attack, MenuOption::new("Attack")),
            (Entry::Skill, MenuOption::new(skill_label).disabled_if(panicked)),
            (Entry::Item, MenuOption::new("Item")),
            (Entry::Guard, MenuOption::new("Guard")),
            (Entry::Analyze, MenuOption::new("Analyze")),
        ];
        if member.class == ClassType::Operator {
            entries.push((Entry::Comp, MenuOption::new("COMP").disabled_if(panicked)));
        }
        entries.push((Entry::Tactics, MenuOption::new("Tactics")));
        entries.push((Entry::Pass, MenuOption::new("Pass")));
        let options: Vec<MenuOption> = entries.iter().map(|(_, o)| o.clone()).collect();

        let header = format!("Command: {}", member.name);
        loop {
            let choice = io.render_menu(&header, &options, None)?;
            let Some((entry, _)) = entries.get(choice) else {
                continue;
            };
            let command = match entry {
                Entry::Attack => self
                    .select_targets(io, member, TargetScope::Foe)
                    .and_then(|t| t.first().copied())
                    .map(|target| PlayerCommand::Attack { target }),
                Entry::Skill => self.select_skill(io, member),
                Entry::Item => self.select_item(io, member),
                Entry::Guard => Some(PlayerCommand::Guard),
                Entry::Analyze => self
                    .select_targets(io, member, TargetScope::Foe)
                    .and_then(|t| t.first().copied())
                    .map(|target| PlayerCommand::Analyze { target }),
                Entry::Comp => self.comp(io, member),
                Entry::Tactics => self.tactics(io),
                Entry::Pass => Some(PlayerCommand::Pass),
            };
            if command.is_some() {
                return command;
            }
        }
    }

    fn select_skill(&self, io: &mut dyn BattleIo, actor: &Combatant) -> Option<PlayerCommand> {
        let skills: Vec<_> = actor
            .skills()
            .iter()
            .filter_map(|name| self.registry.skill(name))
            .collect();
        if skills.is_empty() {
            notice(io, "No skills available.");
            return None;
        }

        let mut options: Vec<MenuOption> = skills
            .iter()
            .map(|s| {
                let (hp, sp) = s.cost.amounts(actor.max_hp());
                let usable = s.kind != SkillKind::Passive && actor.can_pay(hp, sp);
                MenuOption::new(format!("{} ({})", s.name, cost_label(hp, sp))).disabled_if(!usable)
            })
            .collect();
        options.push(MenuOption::new("Back"));

        let detail = |i: usize| {
            skills
                .get(i)
                .map(|s| format!("Effect: {}  Power: {}", s.effect, s.power))
        };
        let choice = io.render_menu("Select Skill:", &options, Some(&detail))?;
        let skill = skills.get(choice)?;

        let targets = self.select_targets(io, actor, scope_for(skill))?;
        Some(PlayerCommand::Skill {
            skill: skill.name.clone(),
            targets,
        })
    }

    fn select_item(&self, io: &mut dyn BattleIo, actor: &Combatant) -> Option<PlayerCommand> {
        let items: Vec<_> = self
            .inventory
            .battle_items()
            .into_iter()
            .filter_map(|(id, count)| self.registry.item(&id).map(|def| (def, count)))
            .collect();
        if items.is_empty() {
            notice(io, "No usable items.");
            return None;
        }

        let mut options: Vec<MenuOption> = items
            .iter()
            .map(|(def, count)| {
                MenuOption::new(format!("{} x{count}", def.name)).disabled_if(def.kind == ItemKind::Other)
            })
            .collect();
        options.push(MenuOption::new("Back"));

        let detail = |i: usize| items.get(i).map(|(def, _)| def.effect_text());
        let choice = io.render_menu("Items", &options, Some(&detail))?;
        let (item, _) = items.get(choice)?;

        let targets = match item.kind {
            ItemKind::Escape => TargetList::new(),
            kind => self.select_targets(io, actor, item_scope(kind))?,
        };
        Some(PlayerCommand::Item {
            item: item.id.clone(),
            targets,
        })
    }

    fn comp(&self, io: &mut dyn BattleIo, actor: &Combatant) -> Option<PlayerCommand> {
        let options = [MenuOption::new("Summon"), MenuOption::new("Return"), MenuOption::new("Back")];
        match io.render_menu("COMP SYSTEM", &options, None)? {
            0 => {
                let stock = self.roster.stock();
                if stock.is_empty() {
                    notice(io, "No demons available in COMP stock.");
                    return None;
                }
                if self.field.count(actor.side) >= MAX_ACTIVE_PARTY {
                    notice(io, "The party is full.");
                    return None;
                }
                let mut options: Vec<MenuOption> = stock.into_iter().map(MenuOption::new).collect();
                options.push(MenuOption::new("Back"));
                let choice = io.render_menu("Summon Demon:", &options, None)?;
                (choice + 1 < options.len()).then_some(PlayerCommand::Summon { stock_index: choice })
            }
            1 => {
                let demons = self.active_demons(actor);
                if demons.is_empty() {
                    notice(io, "No active demons to return.");
                    return None;
                }
                let mut options: Vec<MenuOption> = demons.iter().map(|d| MenuOption::new(d.name.clone())).collect();
                options.push(MenuOption::new("Back"));
                let choice = io.render_menu("Return Demon:", &options, None)?;
                demons.get(choice).map(|d| PlayerCommand::Return { demon: d.id })
            }
            _ => None,
        }
    }

    fn tactics(&self, io: &mut dyn BattleIo) -> Option<PlayerCommand> {
        let demons: Vec<&Combatant> = self
            .field
            .members(crate::core::Side::Player)
            .into_iter()
            .filter(|c| c.class == ClassType::Demon && c.is_alive())
            .collect();
        let options = [
            MenuOption::new("Escape").disabled_if(self.is_boss_battle),
            MenuOption::new("Strategy").disabled_if(demons.is_empty()),
            MenuOption::new("Back"),
        ];
        match io.render_menu("TACTICS", &options, None)? {
            0 => Some(PlayerCommand::Escape),
            1 => {
                let mut options: Vec<MenuOption> = demons
                    .iter()
                    .map(|d| {
                        let mode = match d.controller {
                            Controller::Local => "Direct",
                            _ => "Act Freely",
                        };
                        MenuOption::new(format!("{} [{mode}]", d.name))
                    })
                    .collect();
                options.push(MenuOption::new("Back"));
                let choice = io.render_menu("SELECT DEMON TO COMMAND", &options, None)?;
                demons.get(choice).map(|d| PlayerCommand::Strategy { member: d.id })
            }
            _ => None,
        }
    }

    fn active_demons(&self, actor: &Combatant) -> Vec<&'m Combatant> {
        self.field
            .members(actor.side)
            .into_iter()
            .filter(|c| c.class == ClassType::Demon && c.id != actor.id)
            .collect()
    }

    /// Pick targets for `scope`. Multi-target and self scopes need no menu.
    fn select_targets(&self, io: &mut dyn BattleIo, actor: &Combatant, scope: TargetScope) -> Option<TargetList> {
        if scope == TargetScope::User {
            return Some(TargetList::from_slice(&[actor.id]));
        }
        let pool = candidates(scope, actor, self.field.iter());
        if pool.is_empty() {
            notice(io, "No valid targets.");
            return None;
        }
        if scope.is_multi() {
            return Some(pool);
        }

        let mut options: Vec<MenuOption> = pool
            .iter()
            .filter_map(|id| self.field.get(*id))
            .map(|c| MenuOption::new(format!("{} (HP: {}/{})", c.name, c.hp(), c.max_hp())))
            .collect();
        options.push(MenuOption::new("Back"));
        let choice = io.render_menu("Select Target:", &options, None)?;
        pool.get(choice).map(|id| TargetList::from_slice(&[*id]))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Entry {
    Attack,
    Skill,
    Item,
    Guard,
    Analyze,
    Comp,
    Tactics,
    Pass,
}

fn notice(io: &mut dyn BattleIo, text: &str) {
    io.write_line(text, Color::Gray);
    io.wait(800);
}

fn cost_label(hp: i32, sp: i32) -> String {
    match (hp, sp) {
        (0, 0) => "free".to_string(),
        (hp, 0) => format!("{hp} HP"),
        (_, sp) => format!("{sp} SP"),
    }
}
