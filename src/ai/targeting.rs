//! Skill targeting.
//!
//! Defines who a skill may be aimed at:
//! - `TargetScope`: which side, how many, living or fallen
//! - `scope_for`: derive the scope from a skill's naming conventions
//! - `candidates`: the combatants a scope admits

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Combatant, CombatantId};
use crate::data::SkillDefinition;

/// A resolved list of targets.
pub type TargetList = SmallVec<[CombatantId; 4]>;

/// Who a skill is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetScope {
    /// One living opponent.
    Foe,
    /// Every living opponent.
    AllFoes,
    /// One living ally, the user included.
    Ally,
    /// Every living ally.
    AllAllies,
    /// One fallen ally.
    FallenAlly,
    /// The user alone.
    User,
}

impl TargetScope {
    /// Hits a whole side.
    #[must_use]
    pub const fn is_multi(self) -> bool {
        matches!(self, TargetScope::AllFoes | TargetScope::AllAllies)
    }

    /// Aimed at the user's own side.
    #[must_use]
    pub const fn is_friendly(self) -> bool {
        !matches!(self, TargetScope::Foe | TargetScope::AllFoes)
    }

    /// Whether `target` fits this scope for `actor`.
    #[must_use]
    pub fn admits(self, actor: &Combatant, target: &Combatant) -> bool {
        let same_side = actor.side == target.side;
        match self {
            TargetScope::Foe | TargetScope::AllFoes => !same_side && target.is_alive(),
            TargetScope::Ally | TargetScope::AllAllies => same_side && target.is_alive(),
            TargetScope::FallenAlly => same_side && target.is_dead(),
            TargetScope::User => actor.id == target.id,
        }
    }
}

/// Derive a skill's target scope.
///
/// Revives aim at the fallen; charges and "self" effects at the user;
/// heals and buffs at allies; everything else at foes. Multi-target naming
/// widens single scopes to the whole side.
#[must_use]
pub fn scope_for(skill: &SkillDefinition) -> TargetScope {
    if skill.is_revive() {
        return TargetScope::FallenAlly;
    }
    if skill.targets_self() {
        return TargetScope::User;
    }
    match (skill.targets_allies(), skill.is_multi_target()) {
        (true, true) => TargetScope::AllAllies,
        (true, false) => TargetScope::Ally,
        (false, true) => TargetScope::AllFoes,
        (false, false) => TargetScope::Foe,
    }
}

/// Every combatant in `pool` that `scope` admits for `actor`.
pub fn candidates<'c>(
    scope: TargetScope,
    actor: &Combatant,
    pool: impl IntoIterator<Item = &'c Combatant>,
) -> TargetList {
    pool.into_iter()
        .filter(|c| scope.admits(actor, c))
        .map(|c| c.id)
        .collect()
}

/// Expand a chosen primary target to the full hit set for `scope`.
///
/// Multi-target scopes take every admitted combatant; single scopes keep
/// the primary if admitted.
pub fn expand<'c>(
    scope: TargetScope,
    actor: &Combatant,
    primary: Option<CombatantId>,
    pool: impl IntoIterator<Item = &'c Combatant>,
) -> TargetList {
    let admitted = candidates(scope, actor, pool);
    if scope.is_multi() {
        return admitted;
    }
    if scope == TargetScope::User {
        return smallvec::smallvec![actor.id];
    }
    primary
        .filter(|p| admitted.contains(p))
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassType, Side};

    fn unit(id: u32, side: Side, alive: bool) -> Combatant {
        let mut c = Combatant::new(CombatantId(id), format!("U{id}"), ClassType::Human, side)
            .with_resources(10, 0);
        if !alive {
            c.take_damage(10);
        }
        c
    }

    #[test]
    fn test_scope_for() {
        let agi = SkillDefinition::new("Agi", "Fire").with_power(40);
        let maragi = SkillDefinition::new("Maragi", "Fire").with_power(40);
        let dia = SkillDefinition::new("Dia", "Recovery").with_power(40);
        let mediarama = SkillDefinition::new("Mediarama", "Recovery").with_power(80);
        let recarm = SkillDefinition::new("Recarm", "Recovery").with_effect("Revive one ally");
        let charge = SkillDefinition::new("Charge", "Support");
        let tarunda = SkillDefinition::new("Tarunda", "Support");
        let tarukaja = SkillDefinition::new("Tarukaja", "Support");

        assert_eq!(scope_for(&agi), TargetScope::Foe);
        assert_eq!(scope_for(&maragi), TargetScope::AllFoes);
        assert_eq!(scope_for(&dia), TargetScope::Ally);
        assert_eq!(scope_for(&mediarama), TargetScope::AllAllies);
        assert_eq!(scope_for(&recarm), TargetScope::FallenAlly);
        assert_eq!(scope_for(&charge), TargetScope::User);
        assert_eq!(scope_for(&tarunda), TargetScope::Foe);
        assert_eq!(scope_for(&tarukaja), TargetScope::Ally);
    }

    #[test]
    fn test_scope_for_stage_clears() {
        let dekunda = SkillDefinition::new("Dekunda", "Support").with_effect("Removes stat penalties from all allies");
        let dekaja = SkillDefinition::new("Dekaja", "Support").with_effect("Removes stat bonuses from all foes");

        assert_eq!(scope_for(&dekunda), TargetScope::AllAllies);
        assert_eq!(scope_for(&dekaja), TargetScope::AllFoes);
    }

    #[test]
    fn test_candidates_filter() {
        let actor = unit(0, Side::Player, true);
        let pool = [
            actor.clone(),
            unit(1, Side::Player, false),
            unit(2, Side::Enemy, true),
            unit(3, Side::Enemy, false),
        ];

        assert_eq!(candidates(TargetScope::Foe, &actor, &pool).as_slice(), &[CombatantId(2)]);
        assert_eq!(candidates(TargetScope::Ally, &actor, &pool).as_slice(), &[CombatantId(0)]);
        assert_eq!(candidates(TargetScope::FallenAlly, &actor, &pool).as_slice(), &[CombatantId(1)]);
        assert_eq!(candidates(TargetScope::User, &actor, &pool).as_slice(), &[CombatantId(0)]);
    }

    #[test]
    fn test_expand() {
        let actor = unit(0, Side::Player, true);
        let pool = [actor.clone(), unit(2, Side::Enemy, true), unit(3, Side::Enemy, true)];

        assert_eq!(expand(TargetScope::AllFoes, &actor, None, &pool).len(), 2);
        assert_eq!(
            expand(TargetScope::Foe, &actor, Some(CombatantId(3)), &pool).as_slice(),
            &[CombatantId(3)]
        );
        assert!(expand(TargetScope::Foe, &actor, Some(CombatantId(0)), &pool).is_empty());
        assert_eq!(expand(TargetScope::User, &actor, None, &pool).as_slice(), &[CombatantId(0)]);
    }
}
