//! Passive skills, recognized by name.
//!
//! A combatant's passive skills are folded into a [`PassiveSet`] once, when
//! the combatant is built, so the combat kernel reads plain multipliers.

use serde::{Deserialize, Serialize};

use crate::core::Element;

/// HP regenerated per turn by "Regenerate 1/2/3", as percent of max HP.
pub const REGENERATE_TIERS: [u32; 3] = [2, 4, 6];

/// SP regenerated per turn by "Invigorate 1/2/3".
pub const INVIGORATE_TIERS: [u32; 3] = [3, 5, 7];

/// Folded passive modifiers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassiveSet {
    /// Outgoing damage multiplier per element (Boost/Amp/Driver).
    boosts: [f64; Element::COUNT],
    /// Evasion multiplier per element (Dodge/Evade).
    evasion: [f64; Element::COUNT],
    /// Own crit chance multiplier (Apt Pupil).
    pub crit_mult: f64,
    /// Crit chance multiplier for attacks against this combatant (Sharp Student).
    pub crit_against_mult: f64,
    /// Percent of max HP regained at turn end.
    pub hp_regen_percent: u32,
    /// SP regained at turn end.
    pub sp_regen: u32,
    /// Ailment names this combatant is immune to, lowercase.
    ailment_immunities: Vec<String>,
    /// Immune to every ailment.
    pub immune_all_ailments: bool,
}

impl Default for PassiveSet {
    fn default() -> Self {
        Self {
            boosts: [1.0; Element::COUNT],
            evasion: [1.0; Element::COUNT],
            crit_mult: 1.0,
            crit_against_mult: 1.0,
            hp_regen_percent: 0,
            sp_regen: 0,
            ailment_immunities: Vec::new(),
            immune_all_ailments: false,
        }
    }
}

impl PassiveSet {
    /// Fold every recognized passive among `names`. Unrecognized names are
    /// ignored, so active skills can be passed in freely.
    pub fn from_skill_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = Self::default();
        for name in names {
            set.absorb(name);
        }
        set
    }

    fn absorb(&mut self, name: &str) {
        let lower = name.trim().to_ascii_lowercase();
        let mut words = lower.split_whitespace();
        let (Some(first), second) = (words.next(), words.next()) else {
            return;
        };

        match (first, second) {
            ("apt", Some("pupil")) => self.crit_mult *= 2.0,
            ("sharp", Some("student")) => self.crit_against_mult *= 0.5,
            ("unshaken", Some("will")) => self.immune_all_ailments = true,
            ("regenerate", Some(tier)) => {
                if let Some(v) = tier_value(tier, &REGENERATE_TIERS) {
                    self.hp_regen_percent = self.hp_regen_percent.max(v);
                }
            }
            ("invigorate", Some(tier)) => {
                if let Some(v) = tier_value(tier, &INVIGORATE_TIERS) {
                    self.sp_regen = self.sp_regen.max(v);
                }
            }
            ("dodge" | "evade", Some(elem)) => {
                if let Ok(element) = elem.parse::<Element>() {
                    let mult = if first == "evade" { 1.5 } else { 1.25 };
                    let slot = &mut self.evasion[element.index()];
                    *slot = slot.max(mult);
                }
            }
            ("null", Some(_)) => {
                let ailment = lower["null".len()..].trim().to_string();
                if ailment.parse::<Element>().is_err() && !self.ailment_immunities.contains(&ailment) {
                    self.ailment_immunities.push(ailment);
                }
            }
            (elem, Some(grade)) => {
                let mult = match grade {
                    "boost" => 1.25,
                    "amp" => 1.5,
                    "driver" => 1.75,
                    _ => return,
                };
                if let Ok(element) = elem.parse::<Element>() {
                    self.boosts[element.index()] *= mult;
                }
            }
            _ => {}
        }
    }

    /// Outgoing damage multiplier for an element.
    #[must_use]
    pub fn boost(&self, element: Element) -> f64 {
        self.boosts[element.index()]
    }

    /// Evasion multiplier against an element.
    #[must_use]
    pub fn evasion(&self, element: Element) -> f64 {
        self.evasion[element.index()]
    }

    /// Whether this combatant shrugs off the named ailment.
    #[must_use]
    pub fn is_immune_to(&self, ailment: &str) -> bool {
        self.immune_all_ailments
            || self
                .ailment_immunities
                .iter()
                .any(|a| a.eq_ignore_ascii_case(ailment))
    }
}

fn tier_value(tier: &str, table: &[u32; 3]) -> Option<u32> {
    let index: usize = tier.parse().ok()?;
    table.get(index.checked_sub(1)?).copied()
}
