//! Priority-ladder tactical AI.
//!
//! ## Tiers
//!
//! Evaluated in order; the first tier that produces a choice wins.
//!
//! 1. **Forced**: rage and charm choose the action
//! 2. **Kill-shot**: anything projected to finish a foe
//! 3. **Weakness**: hit a known weakness with no known block in the hit set
//! 4. **Crisis**: heal an ally under the crisis threshold
//! 5. **Rigid body**: physical hit on a frozen or shocked foe
//! 6. **Informed pass**: hand the turn to a teammate holding a known weakness
//! 7. **Standard**: strongest safe offensive skill, else a useful utility skill
//! 8. **Desperation**: basic attack on a random foe
//!
//! Before ranking, skills the actor cannot afford or that would do nothing
//! useful are dropped (the effectiveness gate).
//!
//! The AI only reads the field: it never mutates a combatant.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::knowledge::BattleKnowledge;
use super::targeting::{scope_for, TargetList, TargetScope};
use crate::combat::projected_damage;
use crate::core::{Affinity, BattleConfig, BattleRng, Combatant, Element};
use crate::data::{ActionRestriction, DataRegistry, SkillDefinition, SkillKind};
use crate::status::{StatusEngine, SupportEffect, TurnDirective};

/// Chance that a charmed actor aids the opposing side.
pub const CHARM_AID_CHANCE: f64 = 0.5;

/// The action the AI settled on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiAction {
    BasicAttack,
    Skill(String),
    Pass,
}

/// Which tier of the ladder produced a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiTier {
    Forced,
    KillShot,
    Weakness,
    Crisis,
    RigidBody,
    InformedPass,
    Standard,
    Desperation,
}

/// An action with its resolved targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiDecision {
    pub action: AiAction,
    /// Empty for a pass.
    pub targets: TargetList,
    pub tier: AiTier,
}

impl AiDecision {
    fn basic(target: &Combatant, tier: AiTier) -> Self {
        Self {
            action: AiAction::BasicAttack,
            targets: smallvec::smallvec![target.id],
            tier,
        }
    }

    fn skill(skill: &SkillDefinition, targets: TargetList, tier: AiTier) -> Self {
        Self {
            action: AiAction::Skill(skill.name.clone()),
            targets,
            tier,
        }
    }

    fn pass(tier: AiTier) -> Self {
        Self {
            action: AiAction::Pass,
            targets: TargetList::new(),
            tier,
        }
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.action == AiAction::Pass
    }
}

/// Read-only view of the field for one decision.
///
/// `allies` holds the actor's on-field side, fallen members and the actor
/// included; `opponents` the other side's on-field members.
#[derive(Clone, Copy, Debug)]
pub struct AiContext<'b> {
    pub actor: &'b Combatant,
    pub allies: &'b [&'b Combatant],
    pub opponents: &'b [&'b Combatant],
    /// What the actor's side has learned.
    pub knowledge: &'b BattleKnowledge,
    /// Icons the side holds, full plus blinking.
    pub icons: u32,
    pub directive: TurnDirective,
}

impl<'b> AiContext<'b> {
    fn live_opponents(&self) -> impl Iterator<Item = &'b Combatant> + '_ {
        self.opponents.iter().copied().filter(|c| c.is_alive())
    }

    fn live_allies(&self) -> impl Iterator<Item = &'b Combatant> + '_ {
        self.allies.iter().copied().filter(|c| c.is_alive())
    }

    fn pool(&self, scope: TargetScope) -> &'b [&'b Combatant] {
        if scope.is_friendly() {
            self.allies
        } else {
            self.opponents
        }
    }

    /// Every combatant a skill with `scope` hits when aimed at `primary`.
    fn hit_set(&self, scope: TargetScope, primary: &'b Combatant) -> SmallVec<[&'b Combatant; 4]> {
        if scope.is_multi() {
            self.pool(scope)
                .iter()
                .copied()
                .filter(|c| scope.admits(self.actor, c))
                .collect()
        } else {
            smallvec::smallvec![primary]
        }
    }

    /// Any member of `set` known to block `element`.
    fn is_risky(&self, set: &[&Combatant], element: Element) -> bool {
        set.iter()
            .any(|c| self.knowledge.is_risk_known(&c.source_id, element))
    }

    /// The known affinity, or Normal when unknown.
    fn assumed(&self, target: &Combatant, element: Element) -> Affinity {
        self.knowledge
            .known(&target.source_id, element)
            .unwrap_or(Affinity::Normal)
    }
}

/// A skill that passed the effectiveness gate.
#[derive(Clone, Copy, Debug)]
struct Usable<'r> {
    skill: &'r SkillDefinition,
    scope: TargetScope,
}

fn ids(set: &[&Combatant]) -> TargetList {
    set.iter().map(|c| c.id).collect()
}

fn pick<'c>(pool: &[&'c Combatant], rng: &mut BattleRng) -> Option<&'c Combatant> {
    rng.choose(pool).copied()
}

/// Chooses actions for AI-controlled combatants.
#[derive(Clone, Copy, Debug)]
pub struct TacticalAi<'a> {
    registry: &'a DataRegistry,
    config: &'a BattleConfig,
}

impl<'a> TacticalAi<'a> {
    #[must_use]
    pub fn new(registry: &'a DataRegistry, config: &'a BattleConfig) -> Self {
        Self { registry, config }
    }

    /// Walk the ladder and return the first satisfied choice.
    pub fn decide(&self, ctx: &AiContext<'_>, rng: &mut BattleRng) -> AiDecision {
        let decision = match self.forced(ctx, rng) {
            Some(forced) => forced,
            None => {
                let usable = self.usable_skills(ctx);
                self.kill_shot(ctx, &usable)
                    .or_else(|| self.exploit_weakness(ctx, &usable))
                    .or_else(|| self.crisis_recovery(ctx, &usable))
                    .or_else(|| self.rigid_body(ctx, &usable))
                    .or_else(|| self.informed_pass(ctx))
                    .or_else(|| self.standard(ctx, &usable, rng))
                    .unwrap_or_else(|| self.desperation(ctx, rng))
            }
        };

        tracing::debug!(
            actor = %ctx.actor.name,
            tier = ?decision.tier,
            action = ?decision.action,
            targets = decision.targets.len(),
            "ai decision"
        );
        decision
    }

    /// The last-resort choice: a basic attack on a foe not known to be risky,
    /// or a pass when no foe stands. Used when a ranked decision is rejected.
    pub fn fallback(&self, ctx: &AiContext<'_>, rng: &mut BattleRng) -> AiDecision {
        self.desperation(ctx, rng)
    }

    // === Forced ===

    fn forced(&self, ctx: &AiContext<'_>, rng: &mut BattleRng) -> Option<AiDecision> {
        match ctx.directive {
            TurnDirective::ForcedPhysical => {
                let foes: Vec<&Combatant> = ctx.live_opponents().collect();
                Some(pick(&foes, rng).map_or_else(
                    || AiDecision::pass(AiTier::Forced),
                    |t| AiDecision::basic(t, AiTier::Forced),
                ))
            }
            TurnDirective::ForcedConfusion => Some(self.confused(ctx, rng)),
            _ => None,
        }
    }

    /// Charmed: half the time heal a foe, otherwise strike an ally.
    fn confused(&self, ctx: &AiContext<'_>, rng: &mut BattleRng) -> AiDecision {
        if rng.gen_bool(CHARM_AID_CHANCE) {
            let heal = ctx.actor.skills().iter().find_map(|name| {
                self.registry
                    .skill(name)
                    .filter(|s| s.heals() && self.affordable(ctx.actor, s))
            });
            let foes: Vec<&Combatant> = ctx.live_opponents().collect();
            if let (Some(heal), Some(foe)) = (heal, pick(&foes, rng)) {
                return AiDecision::skill(heal, smallvec::smallvec![foe.id], AiTier::Forced);
            }
        }

        let friends: Vec<&Combatant> = ctx
            .live_allies()
            .filter(|c| c.id != ctx.actor.id)
            .collect();
        pick(&friends, rng).map_or_else(
            || AiDecision::pass(AiTier::Forced),
            |t| AiDecision::basic(t, AiTier::Forced),
        )
    }

    // === Effectiveness gate ===

    fn affordable(&self, actor: &Combatant, skill: &SkillDefinition) -> bool {
        let (hp, sp) = skill.cost.amounts(actor.max_hp());
        actor.can_pay(hp, sp)
    }

    fn usable_skills(&self, ctx: &AiContext<'_>) -> Vec<Usable<'a>> {
        let mut usable = Vec::new();
        for name in ctx.actor.skills() {
            let Some(skill) = self.registry.skill(&name) else {
                tracing::warn!(actor = %ctx.actor.name, skill = %name, "unknown skill, skipped");
                continue;
            };
            if skill.kind == SkillKind::Passive || !self.affordable(ctx.actor, skill) {
                continue;
            }
            let scope = scope_for(skill);
            if self.is_effective(ctx, skill, scope) {
                usable.push(Usable { skill, scope });
            }
        }
        usable
    }

    /// Whether using `skill` now could change anything.
    fn is_effective(&self, ctx: &AiContext<'_>, skill: &SkillDefinition, scope: TargetScope) -> bool {
        match skill.kind {
            SkillKind::Passive => false,
            SkillKind::Recovery => {
                if skill.is_revive() {
                    return ctx.allies.iter().any(|c| c.is_dead());
                }
                ctx.live_allies().any(|c| {
                    (skill.heals() && c.hp() < c.max_hp())
                        || (skill.cures()
                            && c.ailment()
                                .is_some_and(|a| StatusEngine::cures(&skill.effect, &a.definition)))
                })
            }
            SkillKind::Support => {
                let effects = SupportEffect::parse(&skill.name);
                ctx.pool(scope)
                    .iter()
                    .filter(|c| scope.admits(ctx.actor, c))
                    .any(|c| effects.iter().any(|e| e.would_change(c)))
            }
            SkillKind::Attack | SkillKind::Ailment => {
                let foes: SmallVec<[&Combatant; 4]> = ctx.live_opponents().collect();
                if foes.is_empty() {
                    return false;
                }
                let all_resist = foes
                    .iter()
                    .all(|f| ctx.knowledge.is_resistance_known(&f.source_id, skill.element));
                if all_resist {
                    return false;
                }
                skill.kind == SkillKind::Attack || foes.iter().any(|f| f.ailment().is_none())
            }
        }
    }

    // === Ranking tiers ===

    fn kills(&self, ctx: &AiContext<'_>, target: &Combatant, power: u32, element: Element) -> bool {
        !ctx.knowledge.is_risk_known(&target.source_id, element)
            && projected_damage(ctx.actor, target, power, element, ctx.assumed(target, element)) >= target.hp()
    }

    fn kill_shot(&self, ctx: &AiContext<'_>, usable: &[Usable<'_>]) -> Option<AiDecision> {
        let power = ctx.actor.basic_attack_power();
        let element = ctx.actor.basic_attack_element();
        if let Some(target) = ctx.live_opponents().find(|t| self.kills(ctx, t, power, element)) {
            return Some(AiDecision::basic(target, AiTier::KillShot));
        }

        for u in usable.iter().filter(|u| damaging(u.skill)) {
            for target in ctx.live_opponents() {
                let set = ctx.hit_set(u.scope, target);
                if ctx.is_risky(&set, u.skill.element) {
                    continue;
                }
                if self.kills(ctx, target, u.skill.power, u.skill.element) {
                    return Some(AiDecision::skill(u.skill, ids(&set), AiTier::KillShot));
                }
            }
        }
        None
    }

    /// A known weakness reachable with one of `skills`, the hit set free of
    /// known blocks.
    fn weakness_for(&self, ctx: &AiContext<'_>, skills: &[Usable<'_>]) -> Option<AiDecision> {
        for u in skills.iter().filter(|u| u.skill.is_offensive()) {
            let element = u.skill.element;
            for target in ctx.live_opponents() {
                if !ctx.knowledge.is_weakness_known(&target.source_id, element) {
                    continue;
                }
                let set = ctx.hit_set(u.scope, target);
                if !ctx.is_risky(&set, element) {
                    return Some(AiDecision::skill(u.skill, ids(&set), AiTier::Weakness));
                }
            }
        }
        None
    }

    fn exploit_weakness(&self, ctx: &AiContext<'_>, usable: &[Usable<'_>]) -> Option<AiDecision> {
        if let Some(decision) = self.weakness_for(ctx, usable) {
            return Some(decision);
        }
        let element = ctx.actor.basic_attack_element();
        ctx.live_opponents()
            .find(|t| ctx.knowledge.is_weakness_known(&t.source_id, element))
            .map(|t| AiDecision::basic(t, AiTier::Weakness))
    }

    fn crisis_recovery(&self, ctx: &AiContext<'_>, usable: &[Usable<'_>]) -> Option<AiDecision> {
        let patient = ctx
            .live_allies()
            .filter(|c| c.hp_ratio() < self.config.crisis_hp_ratio)
            .min_by(|a, b| a.hp_ratio().total_cmp(&b.hp_ratio()))?;
        let heal = usable.iter().find(|u| u.skill.heals())?;

        let targets: TargetList = if heal.scope.is_multi() {
            ctx.live_allies().map(|c| c.id).collect()
        } else {
            smallvec::smallvec![patient.id]
        };
        Some(AiDecision::skill(heal.skill, targets, AiTier::Crisis))
    }

    fn rigid_body(&self, ctx: &AiContext<'_>, usable: &[Usable<'_>]) -> Option<AiDecision> {
        let target = ctx.live_opponents().find(|t| t.is_rigid_body())?;

        let physical = usable
            .iter()
            .find(|u| damaging(u.skill) && u.skill.element.is_physical());
        if let Some(u) = physical {
            let set = ctx.hit_set(u.scope, target);
            return Some(AiDecision::skill(u.skill, ids(&set), AiTier::RigidBody));
        }
        ctx.actor
            .basic_attack_element()
            .is_physical()
            .then(|| AiDecision::basic(target, AiTier::RigidBody))
    }

    /// Affordable offensive skills of a teammate, ungated.
    fn offensive_skills(&self, member: &Combatant) -> Vec<Usable<'a>> {
        member
            .skills()
            .iter()
            .filter_map(|name| self.registry.skill(name))
            .filter(|s| s.is_offensive() && self.affordable(member, s))
            .map(|skill| Usable {
                skill,
                scope: scope_for(skill),
            })
            .collect()
    }

    fn informed_pass(&self, ctx: &AiContext<'_>) -> Option<AiDecision> {
        if ctx.icons <= 1 {
            return None;
        }
        let mate_has_opening = ctx
            .live_allies()
            .filter(|c| c.id != ctx.actor.id && can_act(c))
            .any(|mate| self.weakness_for(ctx, &self.offensive_skills(mate)).is_some());
        mate_has_opening.then(|| AiDecision::pass(AiTier::InformedPass))
    }

    fn standard(&self, ctx: &AiContext<'_>, usable: &[Usable<'_>], rng: &mut BattleRng) -> Option<AiDecision> {
        let mut offensive: Vec<&Usable<'_>> = usable.iter().filter(|u| u.skill.is_offensive()).collect();
        offensive.sort_by(|a, b| b.skill.power.cmp(&a.skill.power));

        for u in offensive {
            let element = u.skill.element;
            let foes: Vec<&Combatant> = ctx.live_opponents().collect();
            let safe: Vec<&Combatant> = foes
                .iter()
                .copied()
                .filter(|t| !ctx.knowledge.is_risk_known(&t.source_id, element))
                .collect();
            if u.scope.is_multi() {
                if !safe.is_empty() && safe.len() == foes.len() {
                    return Some(AiDecision::skill(u.skill, ids(&foes), AiTier::Standard));
                }
            } else if let Some(target) = pick(&safe, rng) {
                return Some(AiDecision::skill(u.skill, smallvec::smallvec![target.id], AiTier::Standard));
            }
        }

        usable
            .iter()
            .filter(|u| !u.skill.is_offensive())
            .find_map(|u| self.utility_targets(ctx, u, rng).map(|t| AiDecision::skill(u.skill, t, AiTier::Standard)))
    }

    /// Targets for a support, ailment, cure or revive skill, picked where it
    /// has an effect.
    fn utility_targets(&self, ctx: &AiContext<'_>, u: &Usable<'_>, rng: &mut BattleRng) -> Option<TargetList> {
        let skill = u.skill;
        let admitted: Vec<&Combatant> = ctx
            .pool(u.scope)
            .iter()
            .copied()
            .filter(|c| u.scope.admits(ctx.actor, c))
            .collect();
        if admitted.is_empty() {
            return None;
        }
        if u.scope.is_multi() || u.scope == TargetScope::User {
            return Some(ids(&admitted));
        }

        let fitting: Vec<&Combatant> = match skill.kind {
            SkillKind::Support => {
                let effects = SupportEffect::parse(&skill.name);
                admitted
                    .into_iter()
                    .filter(|c| effects.iter().any(|e| e.would_change(c)))
                    .collect()
            }
            SkillKind::Ailment => admitted
                .into_iter()
                .filter(|c| c.ailment().is_none())
                .collect(),
            SkillKind::Recovery if !skill.is_revive() => admitted
                .into_iter()
                .filter(|c| {
                    c.ailment()
                        .is_some_and(|a| StatusEngine::cures(&skill.effect, &a.definition))
                        || (skill.heals() && c.hp() < c.max_hp())
                })
                .collect(),
            _ => admitted,
        };
        pick(&fitting, rng).map(|c| smallvec::smallvec![c.id])
    }

    fn desperation(&self, ctx: &AiContext<'_>, rng: &mut BattleRng) -> AiDecision {
        let element = ctx.actor.basic_attack_element();
        let foes: Vec<&Combatant> = ctx.live_opponents().collect();
        let safe: Vec<&Combatant> = foes
            .iter()
            .copied()
            .filter(|t| !ctx.knowledge.is_risk_known(&t.source_id, element))
            .collect();
        let pool = if safe.is_empty() { &foes } else { &safe };
        pick(pool, rng).map_or_else(
            || AiDecision::pass(AiTier::Desperation),
            |t| AiDecision::basic(t, AiTier::Desperation),
        )
    }
}

/// Deals damage, as opposed to rolling an instant kill.
fn damaging(skill: &SkillDefinition) -> bool {
    skill.is_offensive() && !skill.is_instant_kill() && skill.power > 0
}

/// Free to choose its next action.
fn can_act(member: &Combatant) -> bool {
    member.is_alive() && !member.flags.dizzy && member.restriction() == ActionRestriction::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AffinityTable, ClassType, CombatantId, Persona, Side, StatBlock};
    use crate::data::{AilmentDefinition, SkillCost};

    fn registry() -> DataRegistry {
        let mut r = DataRegistry::new();
        r.register_skill(SkillDefinition::new("Agi", "Fire").with_power(40).with_cost(SkillCost::Sp(3)));
        r.register_skill(SkillDefinition::new("Bufu", "Ice").with_power(40).with_cost(SkillCost::Sp(3)));
        r.register_skill(SkillDefinition::new("Maragion", "Fire").with_power(60).with_cost(SkillCost::Sp(8)));
        r.register_skill(SkillDefinition::new("Lunge", "Strike").with_power(50).with_cost(SkillCost::Hp(5)));
        r.register_skill(SkillDefinition::new("Dia", "Recovery").with_power(40).with_cost(SkillCost::Sp(3)));
        r.register_skill(SkillDefinition::new("Tarukaja", "Support").with_cost(SkillCost::Sp(4)));
        r.register_ailment(AilmentDefinition::new("Freeze", ActionRestriction::SkipTurn));
        r.register_ailment(AilmentDefinition::new("Rage", ActionRestriction::ForceAttack));
        r
    }

    fn unit(id: u32, side: Side, skills: &[&str]) -> Combatant {
        Combatant::new(CombatantId(id), format!("U{id}"), ClassType::Demon, side)
            .with_source_id(format!("species{id}"))
            .with_stats(StatBlock::combat(10, 10, 10, 10, 10))
            .with_persona(Persona {
                name: format!("U{id}"),
                level: 5,
                stats: StatBlock::combat(10, 10, 10, 10, 10),
                affinities: AffinityTable::new(),
                skills: skills.iter().map(|s| (*s).to_string()).collect(),
            })
            .with_resources(200, 50)
    }

    struct Scene {
        allies: Vec<Combatant>,
        foes: Vec<Combatant>,
        knowledge: BattleKnowledge,
    }

    impl Scene {
        fn new(actor_skills: &[&str]) -> Self {
            Self {
                allies: vec![unit(0, Side::Enemy, actor_skills)],
                foes: vec![unit(1, Side::Player, &[]), unit(2, Side::Player, &[])],
                knowledge: BattleKnowledge::new(),
            }
        }

        fn decide(&self, icons: u32, directive: TurnDirective) -> AiDecision {
            let registry = registry();
            let config = BattleConfig::default();
            let allies: Vec<&Combatant> = self.allies.iter().collect();
            let foes: Vec<&Combatant> = self.foes.iter().collect();
            let ctx = AiContext {
                actor: &self.allies[0],
                allies: &allies,
                opponents: &foes,
                knowledge: &self.knowledge,
                icons,
                directive,
            };
            let mut rng = BattleRng::new(11);
            TacticalAi::new(&registry, &config).decide(&ctx, &mut rng)
        }
    }

    #[test]
    fn test_fallback_is_basic_attack() {
        let mut scene = Scene::new(&["Agi", "Tarukaja"]);
        let registry = registry();
        let config = BattleConfig::default();
        let mut rng = BattleRng::new(12);
        {
            let allies: Vec<&Combatant> = scene.allies.iter().collect();
            let foes: Vec<&Combatant> = scene.foes.iter().collect();
            let ctx = AiContext {
                actor: &scene.allies[0],
                allies: &allies,
                opponents: &foes,
                knowledge: &scene.knowledge,
                icons: 3,
                directive: TurnDirective::CanAct,
            };
            let d = TacticalAi::new(&registry, &config).fallback(&ctx, &mut rng);
            assert_eq!(d.tier, AiTier::Desperation);
            assert_eq!(d.action, AiAction::BasicAttack);
            assert_eq!(d.targets.len(), 1);
        }

        for foe in &mut scene.foes {
            let hp = foe.hp();
            foe.take_damage(hp);
        }
        let allies: Vec<&Combatant> = scene.allies.iter().collect();
        let foes: Vec<&Combatant> = scene.foes.iter().collect();
        let ctx = AiContext {
            actor: &scene.allies[0],
            allies: &allies,
            opponents: &foes,
            knowledge: &scene.knowledge,
            icons: 3,
            directive: TurnDirective::CanAct,
        };
        assert!(TacticalAi::new(&registry, &config).fallback(&ctx, &mut rng).is_pass());
    }

    #[test]
    fn test_kill_shot_prefers_basic_attack() {
        let mut scene = Scene::new(&["Agi"]);
        scene.foes[1].take_damage(199);
        let d = scene.decide(3, TurnDirective::CanAct);
        assert_eq!(d.tier, AiTier::KillShot);
        assert_eq!(d.action, AiAction::BasicAttack);
        assert_eq!(d.targets.as_slice(), &[CombatantId(2)]);
    }

    #[test]
    fn test_kill_shot_skips_known_block() {
        let mut scene = Scene::new(&[]);
        scene.foes[0].take_damage(199);
        scene.knowledge.learn("species1", Element::Strike, Affinity::Repel);
        let d = scene.decide(3, TurnDirective::CanAct);
        assert_ne!(d.tier, AiTier::KillShot);
        assert_eq!(d.targets.as_slice(), &[CombatantId(2)]);
    }

    #[test]
    fn test_weakness_exploited() {
        let mut scene = Scene::new(&["Agi", "Bufu"]);
        scene.knowledge.learn("species2", Element::Ice, Affinity::Weak);
        let d = scene.decide(3, TurnDirective::CanAct);
        assert_eq!(d.tier, AiTier::Weakness);
        assert_eq!(d.action, AiAction::Skill("Bufu".into()));
        assert_eq!(d.targets.as_slice(), &[CombatantId(2)]);
    }

    #[test]
    fn test_weakness_blocked_by_risky_hit_set() {
        let mut scene = Scene::new(&["Maragion"]);
        scene.knowledge.learn("species1", Element::Fire, Affinity::Weak);
        scene.knowledge.learn("species2", Element::Fire, Affinity::Absorb);
        let d = scene.decide(3, TurnDirective::CanAct);
        assert_ne!(d.tier, AiTier::Weakness);
        assert_ne!(d.action, AiAction::Skill("Maragion".into()));
    }

    #[test]
    fn test_crisis_heals_most_hurt_ally() {
        let mut scene = Scene::new(&["Dia"]);
        scene.allies.push(unit(3, Side::Enemy, &[]));
        scene.allies.push(unit(4, Side::Enemy, &[]));
        scene.allies[1].take_damage(150);
        scene.allies[2].take_damage(180);
        let d = scene.decide(3, TurnDirective::CanAct);
        assert_eq!(d.tier, AiTier::Crisis);
        assert_eq!(d.targets.as_slice(), &[CombatantId(4)]);
    }

    #[test]
    fn test_rigid_body_fishing() {
        let registry = registry();
        let mut scene = Scene::new(&["Lunge"]);
        let freeze = registry.ailment("Freeze").cloned().unwrap();
        assert!(scene.foes[1].inflict(&freeze, 2));
        let d = scene.decide(3, TurnDirective::CanAct);
        assert_eq!(d.tier, AiTier::RigidBody);
        assert_eq!(d.action, AiAction::Skill("Lunge".into()));
        assert_eq!(d.targets.as_slice(), &[CombatantId(2)]);
    }

    #[test]
    fn test_informed_pass_needs_icons() {
        let mut scene = Scene::new(&[]);
        scene.allies.push(unit(3, Side::Enemy, &["Bufu"]));
        scene.knowledge.learn("species1", Element::Ice, Affinity::Weak);

        let d = scene.decide(3, TurnDirective::CanAct);
        assert_eq!(d.tier, AiTier::InformedPass);
        assert!(d.is_pass());

        let d = scene.decide(1, TurnDirective::CanAct);
        assert_ne!(d.tier, AiTier::InformedPass);
    }

    #[test]
    fn test_standard_picks_strongest() {
        let scene = Scene::new(&["Agi", "Maragion"]);
        let d = scene.decide(3, TurnDirective::CanAct);
        assert_eq!(d.tier, AiTier::Standard);
        assert_eq!(d.action, AiAction::Skill("Maragion".into()));
        assert_eq!(d.targets.len(), 2);
    }

    #[test]
    fn test_gate_drops_unaffordable_and_useless() {
        let mut scene = Scene::new(&["Maragion", "Dia", "Ghost Skill"]);
        scene.allies[0] = scene.allies[0].clone().with_resources(200, 5);
        let d = scene.decide(3, TurnDirective::CanAct);
        // Maragion costs 8 SP; Dia has nobody to heal.
        assert_eq!(d.tier, AiTier::Desperation);
        assert_eq!(d.action, AiAction::BasicAttack);
    }

    #[test]
    fn test_gate_drops_known_resisted() {
        let mut scene = Scene::new(&["Agi"]);
        scene.knowledge.learn("species1", Element::Fire, Affinity::Resist);
        scene.knowledge.learn("species2", Element::Fire, Affinity::Null);
        let d = scene.decide(3, TurnDirective::CanAct);
        assert_eq!(d.action, AiAction::BasicAttack);
    }

    #[test]
    fn test_support_used_when_useful() {
        let scene = Scene::new(&["Tarukaja"]);
        let d = scene.decide(3, TurnDirective::CanAct);
        assert_eq!(d.action, AiAction::Skill("Tarukaja".into()));
        assert_eq!(d.targets.as_slice(), &[CombatantId(0)]);
    }

    #[test]
    fn test_forced_physical() {
        let scene = Scene::new(&["Maragion"]);
        let d = scene.decide(3, TurnDirective::ForcedPhysical);
        assert_eq!(d.tier, AiTier::Forced);
        assert_eq!(d.action, AiAction::BasicAttack);
        assert!(d.targets[0] == CombatantId(1) || d.targets[0] == CombatantId(2));
    }

    #[test]
    fn test_forced_confusion_alone_passes_or_heals_foe() {
        let scene = Scene::new(&[]);
        let d = scene.decide(3, TurnDirective::ForcedConfusion);
        assert_eq!(d.tier, AiTier::Forced);
        assert!(d.is_pass());
    }

    #[test]
    fn test_forced_confusion_never_targets_self() {
        let mut scene = Scene::new(&[]);
        scene.allies.push(unit(3, Side::Enemy, &[]));
        for seed in 0..20 {
            let registry = registry();
            let config = BattleConfig::default();
            let allies: Vec<&Combatant> = scene.allies.iter().collect();
            let foes: Vec<&Combatant> = scene.foes.iter().collect();
            let ctx = AiContext {
                actor: &scene.allies[0],
                allies: &allies,
                opponents: &foes,
                knowledge: &scene.knowledge,
                icons: 2,
                directive: TurnDirective::ForcedConfusion,
            };
            let d = TacticalAi::new(&registry, &config).decide(&ctx, &mut BattleRng::new(seed));
            assert_eq!(d.action, AiAction::BasicAttack);
            assert_eq!(d.targets.as_slice(), &[CombatantId(3)]);
        }
    }
}
