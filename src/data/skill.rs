//! Skill definitions.
//!
//! Skills are authored as loosely formatted records (power and cost as
//! strings, behavior described in effect text). They are parsed once into
//! typed fields on load; the helper predicates below encode the naming
//! conventions the battle rules depend on.

use serde::{Deserialize, Serialize};

use crate::core::Element;

/// Resource a skill spends on use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillCost {
    #[default]
    Free,
    /// Flat SP.
    Sp(i32),
    /// Flat HP.
    Hp(i32),
    /// Percentage of max HP.
    HpPercent(i32),
}

impl SkillCost {
    /// Parse "6 SP", "12 HP", "15% HP". Anything unparseable is free.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return SkillCost::Free;
        }
        let is_hp = text.to_ascii_uppercase().contains("HP");
        let is_percent = text.contains('%');
        let value = leading_number(text).unwrap_or(0) as i32;
        match (value, is_hp, is_percent) {
            (0, _, _) => SkillCost::Free,
            (v, true, true) => SkillCost::HpPercent(v),
            (v, true, false) => SkillCost::Hp(v),
            (v, false, _) => SkillCost::Sp(v),
        }
    }

    /// Concrete HP and SP amounts for a user with the given max HP.
    #[must_use]
    pub fn amounts(self, max_hp: i32) -> (i32, i32) {
        match self {
            SkillCost::Free => (0, 0),
            SkillCost::Sp(sp) => (0, sp),
            SkillCost::Hp(hp) => (hp, 0),
            SkillCost::HpPercent(pct) => ((max_hp * pct / 100).max(1), 0),
        }
    }
}

impl std::fmt::Display for SkillCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillCost::Free => f.write_str("-"),
            SkillCost::Sp(v) => write!(f, "{v} SP"),
            SkillCost::Hp(v) => write!(f, "{v} HP"),
            SkillCost::HpPercent(v) => write!(f, "{v}% HP"),
        }
    }
}

/// Broad behavior class, derived from the category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    /// Deals elemental damage (may also carry an ailment rider).
    Attack,
    /// Inflicts an ailment without damage.
    Ailment,
    /// Heals, cures or revives.
    Recovery,
    /// Buffs, debuffs, charges, shields and breaks.
    Support,
    /// Always-on effect; never used as an action.
    Passive,
}

impl SkillKind {
    /// Derive the kind from a category string.
    #[must_use]
    pub fn from_category(category: &str) -> Self {
        let lower = category.to_ascii_lowercase();
        if lower.contains("passive") {
            SkillKind::Passive
        } else if lower.contains("recovery") || lower.contains("heal") {
            SkillKind::Recovery
        } else if lower.contains("support") || lower.contains("enhance") {
            SkillKind::Support
        } else if lower.contains("ailment") {
            SkillKind::Ailment
        } else {
            SkillKind::Attack
        }
    }
}

/// Raw record as authored in the skill JSON.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct RawSkill {
    #[serde(rename = "Skill", alias = "Name")]
    pub name: String,
    #[serde(rename = "Effect", default)]
    pub effect: String,
    #[serde(rename = "Power", default)]
    pub power: Option<serde_json::Value>,
    #[serde(rename = "Accuracy", default)]
    pub accuracy: Option<serde_json::Value>,
    #[serde(rename = "Cost", default)]
    pub cost: String,
    #[serde(rename = "Category", default)]
    pub category: String,
}

/// A parsed skill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub name: String,
    pub effect: String,
    pub category: String,
    pub element: Element,
    pub kind: SkillKind,
    pub power: u32,
    /// Declared accuracy in percent; `None` uses the physical/magic default.
    pub accuracy: Option<u32>,
    pub cost: SkillCost,
}

impl SkillDefinition {
    /// Create a skill; element and kind are derived from the category.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        let category = category.into();
        Self {
            name: name.into(),
            effect: String::new(),
            element: Element::from_category(&category),
            kind: SkillKind::from_category(&category),
            category,
            power: 0,
            accuracy: None,
            cost: SkillCost::Free,
        }
    }

    pub(crate) fn from_raw(raw: RawSkill, fallback_category: &str) -> Self {
        let category = if raw.category.trim().is_empty() {
            fallback_category.to_string()
        } else {
            raw.category
        };
        let mut skill = Self::new(raw.name.trim(), category);
        skill.effect = raw.effect;
        skill.power = raw.power.as_ref().and_then(json_number).unwrap_or(0);
        skill.accuracy = raw.accuracy.as_ref().and_then(json_number);
        skill.cost = SkillCost::parse(&raw.cost);
        skill
    }

    /// Set effect text (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = effect.into();
        self
    }

    /// Set power (builder pattern).
    #[must_use]
    pub fn with_power(mut self, power: u32) -> Self {
        self.power = power;
        self
    }

    /// Set accuracy (builder pattern).
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: u32) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Set cost (builder pattern).
    #[must_use]
    pub fn with_cost(mut self, cost: SkillCost) -> Self {
        self.cost = cost;
        self
    }

    fn effect_has(&self, needle: &str) -> bool {
        self.effect.to_ascii_lowercase().contains(needle)
    }

    /// Hits every live member of the target side.
    ///
    /// Names beginning with "ma"/"me" are area spells by convention; effect
    /// text may also declare the whole side.
    #[must_use]
    pub fn is_multi_target(&self) -> bool {
        let name = self.name.to_ascii_lowercase();
        name.starts_with("ma")
            || name.starts_with("me")
            || name == "amrita"
            || name == "salvation"
            || ["all foes", "all allies", "all enemies", "party"]
                .iter()
                .any(|k| self.effect_has(k))
    }

    /// Aimed at the user's own side.
    #[must_use]
    pub fn targets_allies(&self) -> bool {
        match self.kind {
            SkillKind::Recovery => true,
            SkillKind::Support => {
                let name = self.name.to_ascii_lowercase();
                let debuff = (name.ends_with("nda") && name != "dekunda")
                    || name == "debilitate"
                    || name == "dekaja"
                    || name.ends_with(" break");
                !debuff
            }
            _ => self.effect_has("ally") || self.effect_has("party"),
        }
    }

    /// Affects only the user.
    #[must_use]
    pub fn targets_self(&self) -> bool {
        let name = self.name.to_ascii_lowercase();
        self.kind == SkillKind::Support
            && (name.contains("charge") || name == "concentrate" || self.effect_has("self"))
    }

    /// Deals damage when used.
    #[must_use]
    pub fn is_offensive(&self) -> bool {
        self.kind == SkillKind::Attack
    }

    /// Light/Dark skills that kill outright instead of dealing damage.
    #[must_use]
    pub fn is_instant_kill(&self) -> bool {
        matches!(self.element, Element::Light | Element::Dark) && self.effect_has("instant kill")
    }

    /// Recovery skill that brings back fallen allies.
    #[must_use]
    pub fn is_revive(&self) -> bool {
        self.kind == SkillKind::Recovery && self.effect_has("revive")
    }

    /// Fraction of max HP a revive restores.
    #[must_use]
    pub fn revive_fraction(&self) -> f64 {
        if self.effect_has("full") || self.effect_has("100%") {
            1.0
        } else {
            0.5
        }
    }

    /// Recovery skill that restores HP.
    #[must_use]
    pub fn heals(&self) -> bool {
        self.kind == SkillKind::Recovery
            && !self.is_revive()
            && (self.power > 0 || self.effect_has("restore") || self.effect_has("heal"))
    }

    /// Fully restores HP.
    #[must_use]
    pub fn heals_fully(&self) -> bool {
        self.heals() && (self.effect_has("fully") || self.effect_has("full hp"))
    }

    /// Mentions curing in its effect.
    #[must_use]
    pub fn cures(&self) -> bool {
        self.effect_has("cure")
    }

    /// Default accuracy when none is declared.
    #[must_use]
    pub fn accuracy_or(&self, physical: u32, magic: u32) -> u32 {
        self.accuracy.unwrap_or(if self.element.is_physical() {
            physical
        } else {
            magic
        })
    }
}

/// First run of digits in `text`.
pub(crate) fn leading_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..].chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Percentage written as "N%" anywhere in `text`.
pub(crate) fn percent_in(text: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    let pos = text.find('%')?;
    let mut start = pos;
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    text[start..pos].parse().ok()
}

fn json_number(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().map(|v| v as u32),
        serde_json::Value::String(s) => leading_number(s),
        _ => None,
    }
}
