//! Battle item definitions.

use serde::{Deserialize, Serialize};

use crate::core::Element;

/// Effect class of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Restore HP to one ally (`all` for the whole party).
    Healing { all: bool },
    /// Restore SP.
    Spirit,
    /// Revive a fallen ally.
    Revive,
    /// Remove the ailments its text names.
    Cure,
    /// Elemental damage to one foe.
    Offensive(Element),
    /// End the battle at once (Traesto Gem).
    Escape,
    /// Not usable in battle.
    Other,
}

impl ItemKind {
    /// Derive the kind from the authored type tag and name.
    #[must_use]
    pub fn classify(tag: &str, name: &str, element: Option<&str>) -> Self {
        if name.eq_ignore_ascii_case("Traesto Gem") || tag.eq_ignore_ascii_case("Escape") {
            return ItemKind::Escape;
        }
        match tag.trim() {
            "Healing" => ItemKind::Healing { all: false },
            "Healing_All" => ItemKind::Healing { all: true },
            "Spirit" => ItemKind::Spirit,
            "Revive" => ItemKind::Revive,
            "Cure" => ItemKind::Cure,
            "Offensive" | "Attack" => {
                let element = element
                    .and_then(|e| e.parse().ok())
                    .unwrap_or(Element::Almighty);
                ItemKind::Offensive(element)
            }
            _ => ItemKind::Other,
        }
    }

    /// Aimed at the user's side.
    #[must_use]
    pub fn targets_allies(self) -> bool {
        !matches!(self, ItemKind::Offensive(_) | ItemKind::Escape | ItemKind::Other)
    }
}

/// Raw record as authored in the item JSON.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub effect_value: i32,
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// A parsed item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    /// HP/SP restored, revive strength, or damage power depending on kind.
    pub effect_value: i32,
    pub description: String,
}

/// Healing values at or above this restore HP fully.
pub const FULL_HEAL_VALUE: i32 = 9999;

impl ItemDefinition {
    /// Create an item.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind, effect_value: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            effect_value,
            description: String::new(),
        }
    }

    pub(crate) fn from_raw(raw: RawItem) -> Self {
        let kind = ItemKind::classify(&raw.kind, &raw.name, raw.element.as_deref());
        let mut item = Self::new(raw.id.trim(), raw.name.trim(), kind, raw.effect_value);
        item.description = raw.description;
        item
    }

    /// Set description (builder pattern).
    #[must_use]
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Name and description, the text cure checks read.
    #[must_use]
    pub fn effect_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }
}
