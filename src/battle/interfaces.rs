//! Collaborator traits the battle talks to.
//!
//! The battle core owns no terminal, item store or demon stock. Callers
//! plug those in through three traits:
//!
//! - [`BattleIo`]: colored narration, pauses, key presses and menus
//! - [`Inventory`]: items carried into battle
//! - [`Roster`]: demons held in stock, summoned and returned mid-battle
//!
//! Simple in-memory implementations are provided for headless battles and
//! tests: [`HeadlessIo`], [`ScriptedIo`], [`ItemBag`] and [`DemonStock`].

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::Combatant;

/// Narration color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[default]
    Default,
    Gray,
    Red,
    Green,
    Yellow,
    Cyan,
    Magenta,
}

/// One labeled entry of a menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    /// Shown but not selectable.
    pub disabled: bool,
}

impl MenuOption {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
        }
    }

    /// Set the disabled flag (builder pattern).
    #[must_use]
    pub fn disabled_if(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Detail text for the highlighted option of a menu.
pub type HighlightFn<'f> = &'f dyn Fn(usize) -> Option<String>;

/// Input and output for a battle.
///
/// Every call blocks until the user (or script) answers; the battle has no
/// other suspension point.
pub trait BattleIo {
    /// Print one narrated line.
    fn write_line(&mut self, text: &str, color: Color);

    /// Pause for `ms` milliseconds.
    fn wait(&mut self, ms: u64);

    /// Block until a key is pressed.
    fn read_key(&mut self);

    /// Show a menu and return the chosen index, or `None` on cancel.
    ///
    /// Implementations must not return the index of a disabled option.
    /// `on_highlight` supplies detail text for the highlighted option.
    fn render_menu(
        &mut self,
        header: &str,
        options: &[MenuOption],
        on_highlight: Option<HighlightFn<'_>>,
    ) -> Option<usize>;
}

/// Items carried into battle.
pub trait Inventory {
    /// Item ids with a positive count, in display order.
    fn battle_items(&self) -> Vec<(String, u32)>;

    /// Units held of `item_id`.
    fn count(&self, item_id: &str) -> u32;

    /// Remove one unit. Returns false when none were held.
    fn consume(&mut self, item_id: &str) -> bool;
}

/// Demons held in stock.
pub trait Roster {
    /// Display names of stocked demons, in summon order.
    fn stock(&self) -> Vec<String>;

    /// Take the demon at `index` out of stock.
    fn summon(&mut self, index: usize) -> Option<Combatant>;

    /// Put a demon back into stock.
    fn stow(&mut self, demon: Combatant);
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// IO that records narration and cancels every menu.
///
/// Local-controlled members fall back to the AI under this IO, so a battle
/// runs to completion without input.
#[derive(Clone, Debug, Default)]
pub struct HeadlessIo {
    lines: Vec<(String, Color)>,
}

impl HeadlessIo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrated lines so far.
    #[must_use]
    pub fn lines(&self) -> &[(String, Color)] {
        &self.lines
    }

    /// Whether any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|(line, _)| line.contains(needle))
    }
}

impl BattleIo for HeadlessIo {
    fn write_line(&mut self, text: &str, color: Color) {
        self.lines.push((text.to_string(), color));
    }

    fn wait(&mut self, _ms: u64) {}

    fn read_key(&mut self) {}

    fn render_menu(
        &mut self,
        _header: &str,
        _options: &[MenuOption],
        _on_highlight: Option<HighlightFn<'_>>,
    ) -> Option<usize> {
        None
    }
}

/// IO that answers menus from a queue of choices.
///
/// Choices are consumed in order; once the queue runs dry every menu is
/// cancelled. A scripted choice naming a disabled or missing option is
/// treated as a cancel.
#[derive(Clone, Debug, Default)]
pub struct ScriptedIo {
    choices: VecDeque<usize>,
    lines: Vec<(String, Color)>,
    menus: Vec<String>,
}

impl ScriptedIo {
    pub fn new(choices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Narrated lines so far.
    #[must_use]
    pub fn lines(&self) -> &[(String, Color)] {
        &self.lines
    }

    /// Headers of the menus shown so far.
    #[must_use]
    pub fn menus(&self) -> &[String] {
        &self.menus
    }

    /// Choices not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.choices.len()
    }
}

impl BattleIo for ScriptedIo {
    fn write_line(&mut self, text: &str, color: Color) {
        self.lines.push((text.to_string(), color));
    }

    fn wait(&mut self, _ms: u64) {}

    fn read_key(&mut self) {}

    fn render_menu(
        &mut self,
        header: &str,
        options: &[MenuOption],
        on_highlight: Option<HighlightFn<'_>>,
    ) -> Option<usize> {
        self.menus.push(header.to_string());
        let choice = self.choices.pop_front()?;
        let option = options.get(choice)?;
        if option.disabled {
            return None;
        }
        if let Some(detail) = on_highlight.and_then(|f| f(choice)) {
            self.lines.push((detail, Color::Gray));
        }
        Some(choice)
    }
}

/// Item counts keyed by item id.
#[derive(Clone, Debug, Default)]
pub struct ItemBag {
    counts: FxHashMap<String, u32>,
    order: Vec<String>,
}

impl ItemBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` units (builder pattern).
    #[must_use]
    pub fn with(mut self, item_id: impl Into<String>, count: u32) -> Self {
        self.add(item_id, count);
        self
    }

    pub fn add(&mut self, item_id: impl Into<String>, count: u32) {
        let item_id = item_id.into();
        if !self.counts.contains_key(&item_id) {
            self.order.push(item_id.clone());
        }
        *self.counts.entry(item_id).or_insert(0) += count;
    }
}

impl Inventory for ItemBag {
    fn battle_items(&self) -> Vec<(String, u32)> {
        self.order
            .iter()
            .filter_map(|id| {
                let count = self.count(id);
                (count > 0).then(|| (id.clone(), count))
            })
            .collect()
    }

    fn count(&self, item_id: &str) -> u32 {
        self.counts.get(item_id).copied().unwrap_or(0)
    }

    fn consume(&mut self, item_id: &str) -> bool {
        match self.counts.get_mut(item_id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Demons in stock, in order.
#[derive(Clone, Debug, Default)]
pub struct DemonStock {
    demons: Vec<Combatant>,
}

impl DemonStock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a demon to stock (builder pattern).
    #[must_use]
    pub fn with(mut self, demon: Combatant) -> Self {
        self.demons.push(demon);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.demons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.demons.is_empty()
    }

    /// Stocked demons.
    #[must_use]
    pub fn demons(&self) -> &[Combatant] {
        &self.demons
    }
}

impl Roster for DemonStock {
    fn stock(&self) -> Vec<String> {
        self.demons.iter().map(|d| d.name.clone()).collect()
    }

    fn summon(&mut self, index: usize) -> Option<Combatant> {
        (index < self.demons.len()).then(|| self.demons.remove(index))
    }

    fn stow(&mut self, demon: Combatant) {
        self.demons.push(demon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassType, CombatantId, Side};

    #[test]
    fn test_item_bag() {
        let mut bag = ItemBag::new().with("medicine", 2).with("bead", 0);
        assert_eq!(bag.battle_items(), vec![("medicine".to_string(), 2)]);
        assert!(bag.consume("medicine"));
        assert!(bag.consume("medicine"));
        assert!(!bag.consume("medicine"));
        assert!(!bag.consume("missing"));
        assert!(bag.battle_items().is_empty());
    }

    #[test]
    fn test_demon_stock() {
        let pixie = Combatant::new(CombatantId(0), "Pixie", ClassType::Demon, Side::Player);
        let mut stock = DemonStock::new().with(pixie);
        assert_eq!(stock.stock(), vec!["Pixie".to_string()]);
        assert!(stock.summon(1).is_none());

        let pixie = stock.summon(0).unwrap();
        assert!(stock.is_empty());
        stock.stow(pixie);
        assert_eq!(stock.len(), 1);
    }

    #[test]
    fn test_headless_io_cancels() {
        let mut io = HeadlessIo::new();
        io.write_line("hello", Color::Cyan);
        assert!(io.contains("hell"));
        assert_eq!(io.render_menu("Menu", &[MenuOption::new("Attack")], None), None);
    }

    #[test]
    fn test_scripted_io_refuses_disabled() {
        let options = [MenuOption::new("Attack"), MenuOption::new("Skill").disabled_if(true)];
        let mut io = ScriptedIo::new([1, 0]);
        assert_eq!(io.render_menu("Command", &options, None), None);
        assert_eq!(io.render_menu("Command", &options, None), Some(0));
        assert_eq!(io.render_menu("Command", &options, None), None);
        assert_eq!(io.menus().len(), 3);
    }
}
