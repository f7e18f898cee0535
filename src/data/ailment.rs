//! Ailment definitions.

use serde::{Deserialize, Serialize};

/// What an ailment does to its victim's turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionRestriction {
    #[default]
    None,
    /// Always lose the turn (Freeze, Shock, Sleep).
    SkipTurn,
    /// 50% chance to lose the turn (Panic).
    ChanceSkip,
    /// Flee, lose the turn, or act (Fear).
    ChanceSkipOrFlee,
    /// Attack allies or aid foes (Charm).
    ConfusedAction,
    /// Basic-attack a random foe (Rage).
    ForceAttack,
}

impl ActionRestriction {
    /// Parse the authored tag. Unknown tags impose no restriction.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "SkipTurn" => ActionRestriction::SkipTurn,
            "ChanceSkip" => ActionRestriction::ChanceSkip,
            "ChanceSkipOrFlee" => ActionRestriction::ChanceSkipOrFlee,
            "ConfusedAction" => ActionRestriction::ConfusedAction,
            "ForceAttack" => ActionRestriction::ForceAttack,
            _ => ActionRestriction::None,
        }
    }
}

/// How an ailment ends besides wearing off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalTrigger {
    /// Removed at the end of the victim's next turn.
    OneTurn,
    /// Luck roll each turn end.
    NaturalRoll,
}

impl RemovalTrigger {
    fn parse(tag: &str) -> Option<Self> {
        match tag.trim() {
            "OneTurn" => Some(RemovalTrigger::OneTurn),
            "NaturalRoll" => Some(RemovalTrigger::NaturalRoll),
            _ => None,
        }
    }
}

/// Raw record as authored in the ailment JSON.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawAilment {
    pub name: String,
    #[serde(default)]
    pub action_restriction: String,
    #[serde(default)]
    pub evasion_mult: f64,
    #[serde(default)]
    pub crit_bonus_chance: f64,
    #[serde(default)]
    pub damage_taken_mult: f64,
    #[serde(default = "one")]
    pub damage_deal_mult: f64,
    #[serde(default)]
    pub dot_percent: f64,
    #[serde(default)]
    pub removal_triggers: Vec<String>,
    #[serde(default)]
    pub cure_keyword: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rigid_body: Option<bool>,
}

fn one() -> f64 {
    1.0
}

/// A parsed ailment.
///
/// Multipliers authored as zero mean "no change" and are stored as 1.0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AilmentDefinition {
    pub name: String,
    pub restriction: ActionRestriction,
    /// Multiplies the victim's evasion; hit chance against it is divided by this.
    pub evasion_mult: f64,
    /// Added to crit chance against the victim.
    pub crit_bonus_chance: f64,
    pub damage_taken_mult: f64,
    pub damage_deal_mult: f64,
    /// Percent of max HP lost at turn end.
    pub dot_percent: f64,
    pub removal_triggers: Vec<RemovalTrigger>,
    pub cure_keyword: Option<String>,
    pub description: String,
    /// Frozen/shocked: always hit, always crit, resistances suspended.
    pub rigid_body: bool,
}

impl AilmentDefinition {
    /// Create an ailment with no modifiers.
    pub fn new(name: impl Into<String>, restriction: ActionRestriction) -> Self {
        let name = name.into();
        let rigid_body = is_rigid_name(&name);
        Self {
            name,
            restriction,
            evasion_mult: 1.0,
            crit_bonus_chance: 0.0,
            damage_taken_mult: 1.0,
            damage_deal_mult: 1.0,
            dot_percent: 0.0,
            removal_triggers: Vec::new(),
            cure_keyword: None,
            description: String::new(),
            rigid_body,
        }
    }

    pub(crate) fn from_raw(raw: RawAilment) -> Self {
        let mut ailment = Self::new(raw.name.trim(), ActionRestriction::parse(&raw.action_restriction));
        ailment.evasion_mult = non_zero_or_one(raw.evasion_mult);
        ailment.crit_bonus_chance = raw.crit_bonus_chance.max(0.0);
        ailment.damage_taken_mult = non_zero_or_one(raw.damage_taken_mult);
        ailment.damage_deal_mult = non_zero_or_one(raw.damage_deal_mult);
        ailment.dot_percent = raw.dot_percent.max(0.0);
        ailment.removal_triggers = raw
            .removal_triggers
            .iter()
            .filter_map(|t| RemovalTrigger::parse(t))
            .collect();
        ailment.cure_keyword = raw.cure_keyword.filter(|k| !k.trim().is_empty());
        ailment.description = raw.description;
        if let Some(rigid) = raw.rigid_body {
            ailment.rigid_body = rigid;
        }
        ailment
    }

    /// Set damage-over-time percent (builder pattern).
    #[must_use]
    pub fn with_dot(mut self, percent: f64) -> Self {
        self.dot_percent = percent;
        self
    }

    /// Add a removal trigger (builder pattern).
    #[must_use]
    pub fn with_trigger(mut self, trigger: RemovalTrigger) -> Self {
        self.removal_triggers.push(trigger);
        self
    }

    /// Set the damage multipliers (builder pattern).
    #[must_use]
    pub fn with_damage_mults(mut self, dealt: f64, taken: f64) -> Self {
        self.damage_deal_mult = non_zero_or_one(dealt);
        self.damage_taken_mult = non_zero_or_one(taken);
        self
    }

    /// Set evasion multiplier (builder pattern).
    #[must_use]
    pub fn with_evasion_mult(mut self, mult: f64) -> Self {
        self.evasion_mult = non_zero_or_one(mult);
        self
    }

    /// Set crit bonus (builder pattern).
    #[must_use]
    pub fn with_crit_bonus(mut self, bonus: f64) -> Self {
        self.crit_bonus_chance = bonus;
        self
    }

    /// Set cure keyword (builder pattern).
    #[must_use]
    pub fn with_cure_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.cure_keyword = Some(keyword.into());
        self
    }

    /// Check a removal trigger.
    #[must_use]
    pub fn has_trigger(&self, trigger: RemovalTrigger) -> bool {
        self.removal_triggers.contains(&trigger)
    }

    /// Whether `text` names this ailment or its cure keyword.
    #[must_use]
    pub fn named_in(&self, text: &str) -> bool {
        let lower = text.to_ascii_lowercase();
        lower.contains(&self.name.to_ascii_lowercase())
            || self
                .cure_keyword
                .as_ref()
                .is_some_and(|k| lower.contains(&k.to_ascii_lowercase()))
    }
}

fn non_zero_or_one(value: f64) -> f64 {
    if value <= 0.0 {
        1.0
    } else {
        value
    }
}

fn is_rigid_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    ["freeze", "frozen", "shock"].iter().any(|k| lower.starts_with(k))
}
