//! Species (persona and demon templates).
//!
//! One record type covers both personas worn by persona users and demons
//! fought or recruited: identity, level, base stats, affinities, skills,
//! and the rewards granted when one is defeated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{Affinity, AffinityTable, Element, Persona, Stat, StatBlock};
use crate::error::DataError;

/// Raw record as authored in persona/enemy JSON.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawSpecies {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Level", default)]
    pub level: i32,
    #[serde(rename = "Arcana", default)]
    pub arcana: Option<String>,
    #[serde(rename = "Stats", default)]
    pub stats: BTreeMap<String, i32>,
    #[serde(rename = "Affinities", default)]
    pub affinities: BTreeMap<String, String>,
    #[serde(rename = "Skills", alias = "BaseSkills", default)]
    pub skills: Vec<String>,
    #[serde(rename = "ExpYield", default)]
    pub exp_yield: u32,
    #[serde(rename = "MaccaYield", default)]
    pub currency_yield: u32,
}

/// A parsed species template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDefinition {
    pub id: String,
    pub name: String,
    pub level: i32,
    pub arcana: Option<String>,
    pub stats: StatBlock,
    pub affinities: AffinityTable,
    pub skills: Vec<String>,
    pub exp_yield: u32,
    pub currency_yield: u32,
}

impl SpeciesDefinition {
    /// Create a species with zeroed stats and no skills.
    pub fn new(id: impl Into<String>, name: impl Into<String>, level: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level: level.max(1),
            arcana: None,
            stats: StatBlock::new(),
            affinities: AffinityTable::new(),
            skills: Vec::new(),
            exp_yield: 0,
            currency_yield: 0,
        }
    }

    pub(crate) fn from_raw(raw: RawSpecies) -> Result<Self, DataError> {
        let mut species = Self::new(raw.id.trim(), raw.name.trim(), raw.level);
        species.arcana = raw.arcana;
        for (key, value) in &raw.stats {
            let stat: Stat = key.parse()?;
            species.stats.set(stat, *value);
        }
        for (key, value) in &raw.affinities {
            let element: Element = key.parse()?;
            let affinity: Affinity = value.parse()?;
            species.affinities.set(element, affinity);
        }
        species.skills = raw.skills.into_iter().map(|s| s.trim().to_string()).collect();
        species.exp_yield = raw.exp_yield;
        species.currency_yield = raw.currency_yield;
        Ok(species)
    }

    /// Set stats (builder pattern).
    #[must_use]
    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.stats = stats;
        self
    }

    /// Set one affinity (builder pattern).
    #[must_use]
    pub fn with_affinity(mut self, element: Element, affinity: Affinity) -> Self {
        self.affinities.set(element, affinity);
        self
    }

    /// Add a skill (builder pattern).
    #[must_use]
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    /// Set reward yields (builder pattern).
    #[must_use]
    pub fn with_yield(mut self, exp: u32, currency: u32) -> Self {
        self.exp_yield = exp;
        self.currency_yield = currency;
        self
    }

    /// Build the persona this species grants.
    #[must_use]
    pub fn to_persona(&self) -> Persona {
        Persona {
            name: self.name.clone(),
            level: self.level,
            stats: self.stats,
            affinities: self.affinities,
            skills: self.skills.clone(),
        }
    }
}
