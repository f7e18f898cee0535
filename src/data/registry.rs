//! Static battle data registry.
//!
//! The `DataRegistry` stores every skill, ailment, species and item the
//! battle core can reference. It is built once (in code or from JSON),
//! validated, and then passed by shared reference to everything that needs
//! a lookup.

use rustc_hash::FxHashMap;
use serde::Deserialize;

use super::ailment::{AilmentDefinition, RawAilment};
use super::item::{ItemDefinition, RawItem};
use super::skill::{RawSkill, SkillDefinition};
use super::species::{RawSpecies, SpeciesDefinition};
use crate::error::DataError;

/// Registry of static battle data.
///
/// Skills and ailments are keyed by lowercase name, species and items by id.
///
/// ## Example
///
/// ```
/// use press_turn::data::{DataRegistry, SkillDefinition};
///
/// let mut registry = DataRegistry::new();
/// registry.register_skill(SkillDefinition::new("Agi", "Fire").with_power(40));
///
/// let agi = registry.skill("agi").unwrap();
/// assert_eq!(agi.power, 40);
/// ```
#[derive(Clone, Debug, Default)]
pub struct DataRegistry {
    skills: FxHashMap<String, SkillDefinition>,
    ailments: FxHashMap<String, AilmentDefinition>,
    /// Ailment keys in registration order; effect text matching is first-hit.
    ailment_order: Vec<String>,
    species: FxHashMap<String, SpeciesDefinition>,
    items: FxHashMap<String, ItemDefinition>,
}

fn key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SkillFile {
    ByCategory(std::collections::BTreeMap<String, Vec<RawSkill>>),
    Flat(Vec<RawSkill>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AilmentFile {
    Wrapped { ailments: Vec<RawAilment> },
    Flat(Vec<RawAilment>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemFile {
    Wrapped { items: Vec<RawItem> },
    Flat(Vec<RawItem>),
}

impl DataRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Registration ===

    /// Register a skill.
    ///
    /// Panics if a skill with the same name already exists.
    pub fn register_skill(&mut self, skill: SkillDefinition) {
        let k = key(&skill.name);
        if self.skills.contains_key(&k) {
            panic!("Skill {:?} already registered", skill.name);
        }
        self.skills.insert(k, skill);
    }

    /// Register an ailment.
    ///
    /// Panics if an ailment with the same name already exists.
    pub fn register_ailment(&mut self, ailment: AilmentDefinition) {
        let k = key(&ailment.name);
        if self.ailments.contains_key(&k) {
            panic!("Ailment {:?} already registered", ailment.name);
        }
        self.ailment_order.push(k.clone());
        self.ailments.insert(k, ailment);
    }

    /// Register a species.
    ///
    /// Panics if a species with the same id already exists.
    pub fn register_species(&mut self, species: SpeciesDefinition) {
        if self.species.contains_key(&species.id) {
            panic!("Species {:?} already registered", species.id);
        }
        self.species.insert(species.id.clone(), species);
    }

    /// Register an item.
    ///
    /// Panics if an item with the same id already exists.
    pub fn register_item(&mut self, item: ItemDefinition) {
        if self.items.contains_key(&item.id) {
            panic!("Item {:?} already registered", item.id);
        }
        self.items.insert(item.id.clone(), item);
    }

    // === JSON Loading ===

    /// Load skills from JSON, either a category → list map or a flat list.
    ///
    /// A name already registered is a [`DataError::Duplicate`]. Returns how
    /// many were added.
    pub fn load_skills_json(&mut self, json: &str) -> Result<usize, DataError> {
        let file: SkillFile =
            serde_json::from_str(json).map_err(|source| DataError::Json { kind: "skill", source })?;
        let parsed: Vec<SkillDefinition> = match file {
            SkillFile::ByCategory(map) => map
                .into_iter()
                .flat_map(|(category, raws)| {
                    raws.into_iter()
                        .map(move |raw| SkillDefinition::from_raw(raw, &category))
                })
                .collect(),
            SkillFile::Flat(raws) => raws
                .into_iter()
                .map(|raw| SkillDefinition::from_raw(raw, ""))
                .collect(),
        };

        let mut added = 0;
        for skill in parsed {
            if self.contains_skill(&skill.name) {
                return Err(DataError::Duplicate { kind: "skill", id: skill.name });
            }
            self.register_skill(skill);
            added += 1;
        }
        Ok(added)
    }

    /// Load ailments from JSON (`{"ailments": [...]}` or a flat list).
    pub fn load_ailments_json(&mut self, json: &str) -> Result<usize, DataError> {
        let file: AilmentFile =
            serde_json::from_str(json).map_err(|source| DataError::Json { kind: "ailment", source })?;
        let raws = match file {
            AilmentFile::Wrapped { ailments } => ailments,
            AilmentFile::Flat(list) => list,
        };

        let mut added = 0;
        for raw in raws {
            let ailment = AilmentDefinition::from_raw(raw);
            if self.ailments.contains_key(&key(&ailment.name)) {
                return Err(DataError::Duplicate { kind: "ailment", id: ailment.name });
            }
            self.register_ailment(ailment);
            added += 1;
        }
        Ok(added)
    }

    /// Load species from a JSON list of persona or enemy records.
    pub fn load_species_json(&mut self, json: &str) -> Result<usize, DataError> {
        let raws: Vec<RawSpecies> =
            serde_json::from_str(json).map_err(|source| DataError::Json { kind: "species", source })?;

        let mut added = 0;
        for raw in raws {
            let species = SpeciesDefinition::from_raw(raw)?;
            if self.species.contains_key(&species.id) {
                return Err(DataError::Duplicate { kind: "species", id: species.id });
            }
            self.register_species(species);
            added += 1;
        }
        Ok(added)
    }

    /// Load items from JSON (`{"items": [...]}` or a flat list).
    pub fn load_items_json(&mut self, json: &str) -> Result<usize, DataError> {
        let file: ItemFile =
            serde_json::from_str(json).map_err(|source| DataError::Json { kind: "item", source })?;
        let raws = match file {
            ItemFile::Wrapped { items } => items,
            ItemFile::Flat(list) => list,
        };

        let mut added = 0;
        for raw in raws {
            let item = ItemDefinition::from_raw(raw);
            if self.items.contains_key(&item.id) {
                return Err(DataError::Duplicate { kind: "item", id: item.id });
            }
            self.register_item(item);
            added += 1;
        }
        Ok(added)
    }

    /// Check cross references: every skill a species lists must exist.
    ///
    /// Returns every problem found rather than stopping at the first.
    #[must_use]
    pub fn validate(&self) -> Vec<DataError> {
        let mut ids: Vec<&String> = self.species.keys().collect();
        ids.sort();

        let mut problems = Vec::new();
        for id in ids {
            let species = &self.species[id];
            for skill in &species.skills {
                if !self.contains_skill(skill) {
                    problems.push(DataError::DanglingReference {
                        kind: "species",
                        id: species.id.clone(),
                        missing_kind: "skill",
                        missing: skill.clone(),
                    });
                }
            }
        }
        problems
    }

    // === Lookup ===

    /// Get a skill by name (case-insensitive).
    #[must_use]
    pub fn skill(&self, name: &str) -> Option<&SkillDefinition> {
        self.skills.get(&key(name))
    }

    /// Check if a skill is registered.
    #[must_use]
    pub fn contains_skill(&self, name: &str) -> bool {
        self.skills.contains_key(&key(name))
    }

    /// Get an ailment by name (case-insensitive).
    #[must_use]
    pub fn ailment(&self, name: &str) -> Option<&AilmentDefinition> {
        self.ailments.get(&key(name))
    }

    /// Iterate over ailments in registration order.
    pub fn ailments(&self) -> impl Iterator<Item = &AilmentDefinition> {
        self.ailment_order.iter().filter_map(|k| self.ailments.get(k))
    }

    /// Get a species by id.
    #[must_use]
    pub fn species(&self, id: &str) -> Option<&SpeciesDefinition> {
        self.species.get(id)
    }

    /// Get an item by id.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    /// Find skills matching a predicate.
    pub fn find_skills<F>(&self, predicate: F) -> impl Iterator<Item = &SkillDefinition>
    where
        F: Fn(&SkillDefinition) -> bool,
    {
        self.skills.values().filter(move |s| predicate(s))
    }

    /// Number of registered skills.
    #[must_use]
    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    /// Number of registered species.
    #[must_use]
    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// Check if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.ailments.is_empty()
            && self.species.is_empty()
            && self.items.is_empty()
    }
}
