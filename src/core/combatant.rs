//! Battle participants.
//!
//! A `Combatant` is the mutable entity every other component reads and
//! writes: stats, HP/SP, buff stages, the single active ailment, and the
//! transient battle flags.
//!
//! ## Invariants
//!
//! - `0 <= hp <= max_hp` and `0 <= sp <= max_sp` after every mutation
//! - At most one ailment; [`Combatant::inflict`] refuses a second one
//! - Buff stages stay within `[-4, 4]` (enforced by [`BuffStages`])

use std::fmt;

use serde::{Deserialize, Serialize};

use super::element::{Affinity, AffinityTable, Element};
use super::stats::{BuffAxis, BuffStages, Stat, StatBlock, STAT_CAP};
use crate::data::{ActionRestriction, AilmentDefinition, PassiveSet, SpeciesDefinition};

/// Highest max HP any combatant may have.
pub const HP_CAP: i32 = 666;

/// Highest max SP any combatant may have.
pub const SP_CAP: i32 = 333;

// =============================================================================
// Identity
// =============================================================================

/// Unique identifier of a combatant within one battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub u32);

impl CombatantId {
    /// Create a new combatant ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the battle's combatant list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Combatant({})", self.0)
    }
}

/// Which side of the battle a combatant fights on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// Character class. Decides how persona stats combine and how fear resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassType {
    Human,
    PersonaUser,
    WildCard,
    Operator,
    Demon,
    Avatar,
}

impl ClassType {
    /// Classes that flee the battle (rather than return to the COMP) when afraid.
    #[must_use]
    pub const fn is_human_like(self) -> bool {
        !matches!(self, ClassType::Demon)
    }
}

/// Who chooses this combatant's actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    /// Menu input through the IO adapter.
    Local,
    /// The tactical AI.
    #[default]
    Ai,
    /// Remote player; driven by the AI locally.
    Network,
}

// =============================================================================
// Equipment and Persona
// =============================================================================

/// Equipped weapon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub power: u32,
    pub element: Element,
    pub accuracy: Option<u32>,
}

impl Weapon {
    /// Create a weapon.
    pub fn new(name: impl Into<String>, power: u32, element: Element) -> Self {
        Self {
            name: name.into(),
            power,
            element,
            accuracy: None,
        }
    }
}

/// Weapon, armor and accessory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub weapon: Option<Weapon>,
    pub armor_defense: i32,
    pub accessory: Option<(Stat, i32)>,
}

/// A persona: stat modifiers, affinities and skills a combatant channels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub level: i32,
    pub stats: StatBlock,
    pub affinities: AffinityTable,
    pub skills: Vec<String>,
}

/// An active ailment and its remaining turns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveAilment {
    pub definition: AilmentDefinition,
    pub turns_remaining: u8,
}

/// Transient battle flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatFlags {
    pub guarding: bool,
    pub down: bool,
    pub dizzy: bool,
    pub immune_to_down: bool,
    pub physical_shield: bool,
    pub magic_shield: bool,
    pub charged: bool,
    pub mind_charged: bool,
}

// =============================================================================
// Combatant
// =============================================================================

/// A battle participant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    /// Species id used as the knowledge key; the name for unique characters.
    pub source_id: String,
    pub class: ClassType,
    pub controller: Controller,
    pub side: Side,
    pub level: i32,

    base_stats: StatBlock,
    persona: Option<Persona>,
    pub loadout: Loadout,
    extra_skills: Vec<String>,
    passives: PassiveSet,

    hp: i32,
    max_hp: i32,
    sp: i32,
    max_sp: i32,

    pub buffs: BuffStages,
    ailment: Option<ActiveAilment>,
    pub flags: CombatFlags,
    /// Turns left on each broken affinity.
    broken: [u8; Element::COUNT],
}

impl Combatant {
    /// Create a level-1 combatant with zero stats and 1 HP.
    ///
    /// Use the `with_*` builders to fill it in; call
    /// [`with_base_pools`](Self::with_base_pools) after stats are set.
    pub fn new(id: CombatantId, name: impl Into<String>, class: ClassType, side: Side) -> Self {
        let name = name.into();
        Self {
            id,
            source_id: name.clone(),
            name,
            class,
            controller: Controller::Ai,
            side,
            level: 1,
            base_stats: StatBlock::new(),
            persona: None,
            loadout: Loadout::default(),
            extra_skills: Vec::new(),
            passives: PassiveSet::default(),
            hp: 1,
            max_hp: 1,
            sp: 0,
            max_sp: 0,
            buffs: BuffStages::new(),
            ailment: None,
            flags: CombatFlags::default(),
            broken: [0; Element::COUNT],
        }
    }

    /// Build a demon from its species template, at full HP/SP.
    pub fn from_species(id: CombatantId, side: Side, species: &SpeciesDefinition) -> Self {
        let mut demon = Self::new(id, species.name.clone(), ClassType::Demon, side)
            .with_level(species.level)
            .with_stats(species.stats)
            .with_persona(species.to_persona());
        demon.source_id = species.id.clone();

        let end = demon.stat(Stat::End);
        let mag = demon.stat(Stat::Mag);
        let base_hp = species.level * 4 + end * 2;
        let base_sp = (f64::from(species.level) * 1.5 + f64::from(mag) * 1.5) as i32;
        demon.with_base_pools(base_hp, base_sp)
    }

    /// Set level (builder pattern).
    #[must_use]
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level.max(1);
        self
    }

    /// Set base stats (builder pattern).
    #[must_use]
    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.base_stats = stats;
        self
    }

    /// Equip a persona (builder pattern). Refreshes passives.
    #[must_use]
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self.refresh_passives();
        self
    }

    /// Set loadout (builder pattern).
    #[must_use]
    pub fn with_loadout(mut self, loadout: Loadout) -> Self {
        self.loadout = loadout;
        self
    }

    /// Set controller (builder pattern).
    #[must_use]
    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    /// Set the knowledge key (builder pattern).
    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = source_id.into();
        self
    }

    /// Add skills known outside any persona (builder pattern).
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_skills.extend(skills.into_iter().map(Into::into));
        self.refresh_passives();
        self
    }

    /// Derive max HP/SP from base pools and current stats, then fill both.
    ///
    /// `MaxHP = min(666, base_hp + END×5)`, `MaxSP = min(333, base_sp + MAG×3)`.
    #[must_use]
    pub fn with_base_pools(mut self, base_hp: i32, base_sp: i32) -> Self {
        let max_hp = (base_hp + self.stat(Stat::End) * 5).clamp(1, HP_CAP);
        let max_sp = (base_sp + self.stat(Stat::Mag) * 3).clamp(0, SP_CAP);
        self.max_hp = max_hp;
        self.max_sp = max_sp;
        self.hp = max_hp;
        self.sp = max_sp;
        self
    }

    /// Set max HP/SP directly and fill both (builder pattern).
    #[must_use]
    pub fn with_resources(mut self, max_hp: i32, max_sp: i32) -> Self {
        self.max_hp = max_hp.clamp(1, HP_CAP);
        self.max_sp = max_sp.clamp(0, SP_CAP);
        self.hp = self.max_hp;
        self.sp = self.max_sp;
        self
    }

    fn refresh_passives(&mut self) {
        let names: Vec<String> = self.skills();
        self.passives = PassiveSet::from_skill_names(names.iter().map(String::as_str));
    }

    // === Stats ===

    /// Base stats before persona and equipment.
    #[must_use]
    pub fn base_stats(&self) -> &StatBlock {
        &self.base_stats
    }

    /// Equipped persona.
    #[must_use]
    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    /// Effective stat, without buff stages, capped at 40.
    ///
    /// Demons use their persona's stats alone and operators their own;
    /// everyone else adds a class-weighted share of the persona's stat.
    #[must_use]
    pub fn stat(&self, stat: Stat) -> i32 {
        let own = self.base_stats.get(stat);
        let persona = self.persona.as_ref().map(|p| p.stats.get(stat));
        let value = match (self.class, persona) {
            (ClassType::Demon, Some(p)) => p,
            (ClassType::Operator, _) | (_, None) => own,
            (_, Some(p)) => own + (f64::from(p) * stat.persona_factor()).floor() as i32,
        };
        let accessory = match self.loadout.accessory {
            Some((s, bonus)) if s == stat => bonus,
            _ => 0,
        };
        (value + accessory).clamp(0, STAT_CAP)
    }

    /// Effective stat scaled by its buff axis.
    #[must_use]
    pub fn buffed_stat(&self, stat: Stat) -> f64 {
        let value = f64::from(self.stat(stat));
        match stat.buff_axis() {
            Some(axis) => value * self.buffs.multiplier(axis),
            None => value,
        }
    }

    /// Buff stage on an axis.
    #[must_use]
    pub fn stage(&self, axis: BuffAxis) -> i8 {
        self.buffs.level(axis)
    }

    /// Folded passive modifiers.
    #[must_use]
    pub fn passives(&self) -> &PassiveSet {
        &self.passives
    }

    /// Every skill name available: persona skills, then innate ones.
    #[must_use]
    pub fn skills(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .persona
            .as_ref()
            .map(|p| p.skills.clone())
            .unwrap_or_default();
        for extra in &self.extra_skills {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(extra)) {
                names.push(extra.clone());
            }
        }
        names
    }

    // === Affinities ===

    /// Declared affinity for an element, before any override.
    #[must_use]
    pub fn base_affinity(&self, element: Element) -> Affinity {
        self.persona
            .as_ref()
            .map_or(Affinity::Normal, |p| p.affinities.get(element))
    }

    /// The full declared affinity table.
    #[must_use]
    pub fn affinities(&self) -> AffinityTable {
        self.persona.as_ref().map(|p| p.affinities).unwrap_or_default()
    }

    /// Whether an element's affinity is currently broken.
    #[must_use]
    pub fn is_broken(&self, element: Element) -> bool {
        self.broken[element.index()] > 0
    }

    /// Break an element's affinity for `turns` turns.
    pub fn break_affinity(&mut self, element: Element, turns: u8) {
        let slot = &mut self.broken[element.index()];
        *slot = (*slot).max(turns);
    }

    /// Count down broken affinities. Returns the elements restored.
    pub fn tick_breaks(&mut self) -> Vec<Element> {
        let mut restored = Vec::new();
        for element in Element::ALL {
            let slot = &mut self.broken[element.index()];
            if *slot > 0 {
                *slot -= 1;
                if *slot == 0 {
                    restored.push(element);
                }
            }
        }
        restored
    }

    // === Resources ===

    #[must_use]
    pub fn hp(&self) -> i32 {
        self.hp
    }

    #[must_use]
    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    #[must_use]
    pub fn sp(&self) -> i32 {
        self.sp
    }

    #[must_use]
    pub fn max_sp(&self) -> i32 {
        self.max_sp
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Current HP as a fraction of max.
    #[must_use]
    pub fn hp_ratio(&self) -> f64 {
        f64::from(self.hp) / f64::from(self.max_hp.max(1))
    }

    /// Lose HP. Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).clamp(0, self.max_hp);
        before - self.hp
    }

    /// Lose HP but never drop below 1. Returns the HP actually lost.
    pub fn take_nonlethal_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        let floor = self.hp.min(1);
        self.hp = (self.hp - amount.max(0)).clamp(floor, self.max_hp);
        before - self.hp
    }

    /// Regain HP. The dead are not healed. Returns the HP actually gained.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.is_dead() {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).clamp(0, self.max_hp);
        self.hp - before
    }

    /// Bring a fallen combatant back with `hp` HP. Returns false if alive.
    pub fn revive(&mut self, hp: i32) -> bool {
        if self.is_alive() {
            return false;
        }
        self.hp = hp.clamp(1, self.max_hp);
        self.ailment = None;
        self.flags.down = false;
        self.flags.dizzy = false;
        true
    }

    /// Regain SP. Returns the SP actually gained.
    pub fn restore_sp(&mut self, amount: i32) -> i32 {
        let before = self.sp;
        self.sp = (self.sp + amount.max(0)).clamp(0, self.max_sp);
        self.sp - before
    }

    /// Spend HP and SP together, all or nothing.
    ///
    /// HP costs can never be fatal: the user must keep at least 1 HP.
    pub fn pay(&mut self, hp: i32, sp: i32) -> bool {
        if !self.can_pay(hp, sp) {
            return false;
        }
        self.hp -= hp.max(0);
        self.sp -= sp.max(0);
        true
    }

    /// Whether [`pay`](Self::pay) would succeed.
    #[must_use]
    pub fn can_pay(&self, hp: i32, sp: i32) -> bool {
        self.sp >= sp && (hp <= 0 || self.hp > hp)
    }

    // === Ailments ===

    /// The active ailment.
    #[must_use]
    pub fn ailment(&self) -> Option<&ActiveAilment> {
        self.ailment.as_ref()
    }

    /// Name of the active ailment.
    #[must_use]
    pub fn ailment_name(&self) -> Option<&str> {
        self.ailment.as_ref().map(|a| a.definition.name.as_str())
    }

    /// Turn restriction from the active ailment.
    #[must_use]
    pub fn restriction(&self) -> ActionRestriction {
        self.ailment
            .as_ref()
            .map_or(ActionRestriction::None, |a| a.definition.restriction)
    }

    /// Frozen or shocked.
    #[must_use]
    pub fn is_rigid_body(&self) -> bool {
        self.ailment.as_ref().is_some_and(|a| a.definition.rigid_body)
    }

    /// Apply an ailment. Fails if dead or already afflicted.
    pub fn inflict(&mut self, definition: &AilmentDefinition, turns: u8) -> bool {
        if self.is_dead() || self.ailment.is_some() {
            return false;
        }
        self.ailment = Some(ActiveAilment {
            definition: definition.clone(),
            turns_remaining: turns.max(1),
        });
        true
    }

    /// Remove the active ailment, returning its name.
    pub fn clear_ailment(&mut self) -> Option<String> {
        self.ailment.take().map(|a| a.definition.name)
    }

    /// Count down the ailment. Returns true when it ran out and was removed.
    pub(crate) fn decay_ailment(&mut self) -> bool {
        let Some(active) = self.ailment.as_mut() else {
            return false;
        };
        active.turns_remaining = active.turns_remaining.saturating_sub(1);
        if active.turns_remaining == 0 {
            self.ailment = None;
            return true;
        }
        false
    }

    // === Attacks ===

    /// Basic attack power: weapon power, else `level + STR×2`.
    #[must_use]
    pub fn basic_attack_power(&self) -> u32 {
        match &self.loadout.weapon {
            Some(weapon) => weapon.power,
            None => (self.level + self.stat(Stat::Str) * 2).max(1) as u32,
        }
    }

    /// Basic attack element: the weapon's, else Strike.
    #[must_use]
    pub fn basic_attack_element(&self) -> Element {
        self.loadout.weapon.as_ref().map_or(Element::Strike, |w| w.element)
    }

    /// Armor defense added to END.
    #[must_use]
    pub fn armor_defense(&self) -> i32 {
        self.loadout.armor_defense
    }

    /// Clear everything that only lasts for one battle.
    pub fn clear_battle_state(&mut self) {
        self.buffs = BuffStages::new();
        self.flags = CombatFlags::default();
        self.broken = [0; Element::COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(stats: StatBlock) -> Persona {
        Persona {
            name: "Arsene".into(),
            level: 5,
            stats,
            affinities: AffinityTable::new().with(Element::Ice, Affinity::Weak),
            skills: vec!["Eiha".into(), "Regenerate 1".into()],
        }
    }

    #[test]
    fn test_persona_user_stat_blend() {
        let c = Combatant::new(CombatantId(0), "Ren", ClassType::PersonaUser, Side::Player)
            .with_stats(StatBlock::combat(10, 10, 10, 10, 10))
            .with_persona(persona(StatBlock::combat(10, 10, 10, 10, 10)));

        assert_eq!(c.stat(Stat::Str), 14);
        assert_eq!(c.stat(Stat::End), 12);
        assert_eq!(c.stat(Stat::Luk), 15);
        assert_eq!(c.stat(Stat::Int), 0);
    }

    #[test]
    fn test_demon_and_operator_stats() {
        let p = persona(StatBlock::combat(20, 0, 0, 0, 0));
        let demon = Combatant::new(CombatantId(0), "Arsene", ClassType::Demon, Side::Enemy)
            .with_stats(StatBlock::combat(5, 0, 0, 0, 0))
            .with_persona(p.clone());
        assert_eq!(demon.stat(Stat::Str), 20);

        let op = Combatant::new(CombatantId(1), "Oracle", ClassType::Operator, Side::Player)
            .with_stats(StatBlock::combat(5, 0, 0, 0, 0))
            .with_persona(p);
        assert_eq!(op.stat(Stat::Str), 5);
    }

    #[test]
    fn test_stat_cap_with_accessory() {
        let c = Combatant::new(CombatantId(0), "X", ClassType::Human, Side::Player)
            .with_stats(StatBlock::combat(38, 0, 0, 0, 0))
            .with_loadout(Loadout {
                accessory: Some((Stat::Str, 5)),
                ..Loadout::default()
            });
        assert_eq!(c.stat(Stat::Str), STAT_CAP);
    }

    #[test]
    fn test_base_pools_caps() {
        let c = Combatant::new(CombatantId(0), "Tank", ClassType::Human, Side::Player)
            .with_stats(StatBlock::combat(0, 40, 0, 40, 0))
            .with_base_pools(600, 300);
        assert_eq!(c.max_hp(), HP_CAP);
        assert_eq!(c.max_sp(), SP_CAP);
        assert_eq!(c.hp(), HP_CAP);
    }

    #[test]
    fn test_from_species_pools() {
        let species = SpeciesDefinition::new("pixie", "Pixie", 4)
            .with_stats(StatBlock::combat(2, 6, 5, 3, 4));
        let pixie = Combatant::from_species(CombatantId(3), Side::Enemy, &species);

        // base_hp = 4*4 + 3*2 = 22; max = 22 + 15
        assert_eq!(pixie.max_hp(), 37);
        // base_sp = 6 + 9 = 15; max = 15 + 18
        assert_eq!(pixie.max_sp(), 33);
        assert_eq!(pixie.source_id, "pixie");
        assert_eq!(pixie.class, ClassType::Demon);
    }

    #[test]
    fn test_damage_and_heal_clamp() {
        let mut c = Combatant::new(CombatantId(0), "X", ClassType::Human, Side::Player)
            .with_resources(50, 10);

        assert_eq!(c.take_damage(30), 30);
        assert_eq!(c.heal(100), 30);
        assert_eq!(c.take_damage(80), 50);
        assert!(c.is_dead());
        assert_eq!(c.heal(10), 0);
        assert!(c.revive(25));
        assert_eq!(c.hp(), 25);
        assert!(!c.revive(25));
    }

    #[test]
    fn test_nonlethal_damage_floor() {
        let mut c = Combatant::new(CombatantId(0), "X", ClassType::Human, Side::Player)
            .with_resources(20, 0);
        c.take_damage(15);
        assert_eq!(c.take_nonlethal_damage(50), 4);
        assert_eq!(c.hp(), 1);
    }

    #[test]
    fn test_pay_all_or_nothing() {
        let mut c = Combatant::new(CombatantId(0), "X", ClassType::Human, Side::Player)
            .with_resources(20, 5);
        assert!(!c.pay(0, 6));
        assert!(!c.pay(20, 0));
        assert!(c.pay(19, 5));
        assert_eq!((c.hp(), c.sp()), (1, 0));
    }

    #[test]
    fn test_ailment_exclusive() {
        let poison = AilmentDefinition::new("Poison", ActionRestriction::None);
        let charm = AilmentDefinition::new("Charm", ActionRestriction::ConfusedAction);
        let mut c = Combatant::new(CombatantId(0), "X", ClassType::Human, Side::Player)
            .with_resources(20, 0);

        assert!(c.inflict(&poison, 3));
        assert!(!c.inflict(&charm, 3));
        assert_eq!(c.ailment_name(), Some("Poison"));
        assert_eq!(c.ailment().unwrap().turns_remaining, 3);
        assert_eq!(c.clear_ailment().as_deref(), Some("Poison"));
        assert!(c.inflict(&charm, 3));
        assert_eq!(c.restriction(), ActionRestriction::ConfusedAction);
    }

    #[test]
    fn test_breaks_tick() {
        let mut c = Combatant::new(CombatantId(0), "X", ClassType::Demon, Side::Enemy);
        c.break_affinity(Element::Fire, 2);
        assert!(c.is_broken(Element::Fire));
        assert!(c.tick_breaks().is_empty());
        assert_eq!(c.tick_breaks(), vec![Element::Fire]);
        assert!(!c.is_broken(Element::Fire));
    }

    #[test]
    fn test_basic_attack_defaults() {
        let c = Combatant::new(CombatantId(0), "X", ClassType::Human, Side::Player)
            .with_level(5)
            .with_stats(StatBlock::combat(7, 0, 0, 0, 0));
        assert_eq!(c.basic_attack_power(), 19);
        assert_eq!(c.basic_attack_element(), Element::Strike);

        let armed = c.with_loadout(Loadout {
            weapon: Some(Weapon::new("Rapier", 60, Element::Pierce)),
            ..Loadout::default()
        });
        assert_eq!(armed.basic_attack_power(), 60);
        assert_eq!(armed.basic_attack_element(), Element::Pierce);
    }

    #[test]
    fn test_skills_and_passives_merge() {
        let c = Combatant::new(CombatantId(0), "Ren", ClassType::WildCard, Side::Player)
            .with_persona(persona(StatBlock::new()))
            .with_skills(["eiha", "Apt Pupil"]);
        assert_eq!(c.skills(), vec!["Eiha", "Regenerate 1", "Apt Pupil"]);
        assert_eq!(c.passives().hp_regen_percent, 2);
        assert!((c.passives().crit_mult - 2.0).abs() < f64::EPSILON);
        assert_eq!(c.base_affinity(Element::Ice), Affinity::Weak);
    }
}
