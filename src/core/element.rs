//! Elements and affinities.
//!
//! Every damaging action carries an [`Element`]. Every combatant carries an
//! [`AffinityTable`] mapping each element to an [`Affinity`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Damage element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    Slash,
    Strike,
    Pierce,
    Fire,
    Ice,
    Elec,
    Wind,
    Light,
    Dark,
    Almighty,
}

impl Element {
    /// Number of elements.
    pub const COUNT: usize = 10;

    /// All elements in table order.
    pub const ALL: [Element; Element::COUNT] = [
        Element::Slash,
        Element::Strike,
        Element::Pierce,
        Element::Fire,
        Element::Ice,
        Element::Elec,
        Element::Wind,
        Element::Light,
        Element::Dark,
        Element::Almighty,
    ];

    /// Slash, Strike and Pierce are physical; they scale with STR.
    #[must_use]
    pub const fn is_physical(self) -> bool {
        matches!(self, Element::Slash | Element::Strike | Element::Pierce)
    }

    /// Everything that is not physical scales with MAG.
    #[must_use]
    pub const fn is_magical(self) -> bool {
        !self.is_physical()
    }

    /// Table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Map a skill category string to an element.
    ///
    /// Categories without an element (recovery, ailment, support) map to
    /// Almighty.
    #[must_use]
    pub fn from_category(category: &str) -> Self {
        let category = category.to_ascii_lowercase();
        const KEYS: [(&str, Element); 9] = [
            ("slash", Element::Slash),
            ("strike", Element::Strike),
            ("pierce", Element::Pierce),
            ("fire", Element::Fire),
            ("ice", Element::Ice),
            ("elec", Element::Elec),
            ("wind", Element::Wind),
            ("light", Element::Light),
            ("dark", Element::Dark),
        ];
        KEYS.iter()
            .find(|(key, _)| category.contains(key))
            .map_or(Element::Almighty, |&(_, element)| element)
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Element::Slash => "Slash",
            Element::Strike => "Strike",
            Element::Pierce => "Pierce",
            Element::Fire => "Fire",
            Element::Ice => "Ice",
            Element::Elec => "Elec",
            Element::Wind => "Wind",
            Element::Light => "Light",
            Element::Dark => "Dark",
            Element::Almighty => "Almighty",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Element {
    type Err = DataError;

    /// Case-insensitive; accepts "Electric" and "Darkness".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "electric" => return Ok(Element::Elec),
            "darkness" => return Ok(Element::Dark),
            _ => {}
        }
        Element::ALL
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(&lower))
            .ok_or_else(|| DataError::UnknownElement(s.to_string()))
    }
}

/// Elemental resistance classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Affinity {
    #[default]
    Normal,
    Weak,
    Resist,
    Null,
    Repel,
    Absorb,
}

impl Affinity {
    /// Null, Repel and Absorb deny all damage (and instant kills).
    #[must_use]
    pub const fn blocks(self) -> bool {
        matches!(self, Affinity::Null | Affinity::Repel | Affinity::Absorb)
    }

    /// Any affinity that reduces or denies damage.
    #[must_use]
    pub const fn resists(self) -> bool {
        matches!(self, Affinity::Resist) || self.blocks()
    }

    /// Damage multiplier. Absorb is negative: the target heals.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Affinity::Normal => 1.0,
            Affinity::Weak => 1.5,
            Affinity::Resist => 0.5,
            Affinity::Null | Affinity::Repel => 0.0,
            Affinity::Absorb => -1.0,
        }
    }
}

impl fmt::Display for Affinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Affinity::Normal => "Normal",
            Affinity::Weak => "Weak",
            Affinity::Resist => "Resist",
            Affinity::Null => "Null",
            Affinity::Repel => "Repel",
            Affinity::Absorb => "Absorb",
        };
        f.write_str(name)
    }
}

impl FromStr for Affinity {
    type Err = DataError;

    /// Case-insensitive; accepts "Reflect" for Repel and "Block" for Null.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "-" | "" => Ok(Affinity::Normal),
            "weak" => Ok(Affinity::Weak),
            "resist" => Ok(Affinity::Resist),
            "null" | "block" => Ok(Affinity::Null),
            "repel" | "reflect" => Ok(Affinity::Repel),
            "absorb" | "drain" => Ok(Affinity::Absorb),
            _ => Err(DataError::UnknownAffinity(s.to_string())),
        }
    }
}

/// Per-element affinity table. Unlisted elements are Normal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityTable([Affinity; Element::COUNT]);

impl AffinityTable {
    /// All-Normal table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an affinity (builder pattern).
    #[must_use]
    pub fn with(mut self, element: Element, affinity: Affinity) -> Self {
        self.set(element, affinity);
        self
    }

    /// Get the affinity for an element.
    #[must_use]
    pub fn get(&self, element: Element) -> Affinity {
        self.0[element.index()]
    }

    /// Set the affinity for an element.
    pub fn set(&mut self, element: Element, affinity: Affinity) {
        self.0[element.index()] = affinity;
    }

    /// Iterate over `(element, affinity)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Element, Affinity)> + '_ {
        Element::ALL.iter().map(move |&e| (e, self.get(e)))
    }

    /// Elements this table is weak to.
    pub fn weaknesses(&self) -> impl Iterator<Item = Element> + '_ {
        self.iter().filter(|(_, a)| *a == Affinity::Weak).map(|(e, _)| e)
    }
}
