//! Status engine integration tests.
//!
//! These tests load ailments from JSON and drive combatants through turn
//! boundaries: damage over time, wear-off, buff stacking and expiry, breaks,
//! shields and fear.

use press_turn::core::{BattleConfig, BattleRng, BuffAxis, ClassType, Combatant, CombatantId, Element, Side, StatBlock};
use press_turn::data::DataRegistry;
use press_turn::status::{Infliction, StatusEngine, StatusEvent, SupportEffect, TurnDirective};

const AILMENTS: &str = r#"{
    "ailments": [
        { "name": "Poison", "action_restriction": "None", "dot_percent": 40.0 },
        { "name": "Shock", "action_restriction": "SkipTurn", "removal_triggers": ["OneTurn"], "rigid_body": true },
        { "name": "Fear", "action_restriction": "ChanceSkipOrFlee" },
        { "name": "Panic", "action_restriction": "ChanceSkip", "cure_keyword": "Nerves" }
    ]
}"#;

fn registry() -> DataRegistry {
    let mut registry = DataRegistry::new();
    let added = registry.load_ailments_json(AILMENTS).unwrap();
    assert_eq!(added, 4);
    registry
}

fn unit(class: ClassType) -> Combatant {
    Combatant::new(CombatantId(1), "Unit", class, Side::Player)
        .with_stats(StatBlock::combat(10, 10, 10, 10, 10))
        .with_resources(100, 30)
}

fn afflict(registry: &DataRegistry, target: &mut Combatant, name: &str, turns: u8) {
    let definition = registry.ailment(name).unwrap();
    assert!(target.inflict(definition, turns));
}

// =============================================================================
// Ailments
// =============================================================================

/// Poison drains a share of max HP each turn end but never kills.
#[test]
fn test_poison_is_nonlethal() {
    let registry = registry();
    let config = BattleConfig::new(1).with_ailment_duration(5);
    let engine = StatusEngine::new(&registry, &config);
    let mut rng = BattleRng::new(1);

    let mut target = unit(ClassType::Human);
    target.take_damage(50);
    afflict(&registry, &mut target, "Poison", 5);

    let events = engine.turn_end(&mut target, &mut rng);
    assert!(events.contains(&StatusEvent::DamageOverTime {
        target: CombatantId(1),
        ailment: "Poison".into(),
        amount: 40,
    }));
    assert_eq!(target.hp(), 10);

    engine.turn_end(&mut target, &mut rng);
    engine.turn_end(&mut target, &mut rng);
    assert_eq!(target.hp(), 1);
    assert!(target.is_alive());
}

/// Timed ailments wear off after their duration.
#[test]
fn test_ailment_wears_off_after_duration() {
    let registry = registry();
    let config = BattleConfig::default();
    let engine = StatusEngine::new(&registry, &config);
    let mut rng = BattleRng::new(2);

    let mut target = unit(ClassType::Human);
    afflict(&registry, &mut target, "Fear", 2);

    assert!(engine.turn_end(&mut target, &mut rng).is_empty());
    assert_eq!(target.ailment_name(), Some("Fear"));

    let events = engine.turn_end(&mut target, &mut rng);
    assert_eq!(
        events,
        vec![StatusEvent::WoreOff {
            target: CombatantId(1),
            ailment: "Fear".into()
        }]
    );
    assert!(target.ailment().is_none());
}

/// Shock skips the turn, makes the body rigid, and lifts after one turn.
#[test]
fn test_one_turn_ailment() {
    let registry = registry();
    let config = BattleConfig::default();
    let engine = StatusEngine::new(&registry, &config);
    let mut rng = BattleRng::new(3);

    let mut target = unit(ClassType::Human);
    afflict(&registry, &mut target, "Shock", 3);
    assert!(target.is_rigid_body());

    assert_eq!(engine.turn_start(&mut target, &mut rng).directive, TurnDirective::Skip);
    engine.turn_end(&mut target, &mut rng);
    assert!(target.ailment().is_none());
    assert!(!target.is_rigid_body());
}

/// A guarding or already afflicted target cannot be inflicted.
#[test]
fn test_infliction_blocked() {
    let registry = registry();
    let config = BattleConfig::default();
    let engine = StatusEngine::new(&registry, &config);
    let mut rng = BattleRng::new(4);

    let mut guarded = unit(ClassType::Human);
    guarded.flags.guarding = true;
    assert_eq!(
        engine.try_inflict(20, &mut guarded, "Poisons one foe", &mut rng),
        Infliction::Blocked {
            ailment: "Poison".into()
        }
    );

    let mut afflicted = unit(ClassType::Human);
    afflict(&registry, &mut afflicted, "Fear", 3);
    assert!(!engine.try_inflict(40, &mut afflicted, "Poisons one foe", &mut rng).landed());
    assert_eq!(afflicted.ailment_name(), Some("Fear"));

    assert_eq!(
        engine.try_inflict(40, &mut afflicted, "Heals one ally", &mut rng),
        Infliction::NoAilment
    );
}

/// Cures match the ailment name, its keyword, or "cure all".
#[test]
fn test_cure_matching() {
    let registry = registry();
    let config = BattleConfig::default();
    let engine = StatusEngine::new(&registry, &config);

    let mut target = unit(ClassType::Human);
    afflict(&registry, &mut target, "Panic", 3);
    assert_eq!(engine.try_cure(&mut target, "Cures Poison"), None);
    assert_eq!(engine.try_cure(&mut target, "Calms the nerves"), Some("Panic".into()));

    afflict(&registry, &mut target, "Poison", 3);
    assert_eq!(engine.try_cure(&mut target, "Cure all ailments"), Some("Poison".into()));
    assert!(target.ailment().is_none());
}

// =============================================================================
// Fear
// =============================================================================

fn fear_directives(class: ClassType, config: &BattleConfig) -> Vec<TurnDirective> {
    let registry = registry();
    let engine = StatusEngine::new(&registry, config);
    let mut rng = BattleRng::new(5);
    let mut target = unit(class);
    afflict(&registry, &mut target, "Fear", 3);
    (0..300).map(|_| engine.turn_start(&mut target, &mut rng).directive).collect()
}

/// A frightened human flees, except in a boss battle.
#[test]
fn test_fear_flee_respects_boss_battles() {
    let open = fear_directives(ClassType::Human, &BattleConfig::default());
    assert!(open.contains(&TurnDirective::FleeBattle));
    assert!(open.contains(&TurnDirective::CanAct));

    let boss = fear_directives(ClassType::Human, &BattleConfig::default().boss());
    assert!(!boss.contains(&TurnDirective::FleeBattle));
    assert!(boss.contains(&TurnDirective::Skip));
}

/// A frightened demon returns to the COMP instead of fleeing.
#[test]
fn test_frightened_demon_returns() {
    let directives = fear_directives(ClassType::Demon, &BattleConfig::default());
    assert!(directives.contains(&TurnDirective::ReturnToComp));
    assert!(!directives.contains(&TurnDirective::FleeBattle));
}

// =============================================================================
// Support Effects
// =============================================================================

/// Tarukaja stacks to +4, then has no further effect.
#[test]
fn test_buff_stacking_caps() {
    let registry = registry();
    let config = BattleConfig::default();
    let engine = StatusEngine::new(&registry, &config);
    let mut target = unit(ClassType::Human);

    let effects = SupportEffect::parse("Tarukaja");
    assert_eq!(effects.len(), 1);
    for expected in 1..=4 {
        let change = engine.apply_support(effects[0], &mut target).unwrap();
        assert_eq!(change.stage, Some(expected));
    }
    assert_eq!(engine.apply_support(effects[0], &mut target), None);
    assert_eq!(target.stage(BuffAxis::Attack), 4);
}

/// Stages expire after the configured number of turn ends.
#[test]
fn test_buff_expiry() {
    let registry = registry();
    let config = BattleConfig::default().with_buff_duration(2);
    let engine = StatusEngine::new(&registry, &config);
    let mut rng = BattleRng::new(6);
    let mut target = unit(ClassType::Human);

    for effect in SupportEffect::parse("Heat Riser") {
        engine.apply_support(effect, &mut target).unwrap();
    }
    assert!(BuffAxis::ALL.iter().all(|&axis| target.stage(axis) == 1));

    assert!(engine.turn_end(&mut target, &mut rng).is_empty());
    let events = engine.turn_end(&mut target, &mut rng);
    assert_eq!(events.len(), 3);
    assert!(target.buffs.is_neutral());
}

/// Dekaja strips only positive stages.
#[test]
fn test_dekaja_clears_positive() {
    let registry = registry();
    let config = BattleConfig::default();
    let engine = StatusEngine::new(&registry, &config);
    let mut target = unit(ClassType::Human);

    for name in ["Tarukaja", "Rakunda"] {
        for effect in SupportEffect::parse(name) {
            engine.apply_support(effect, &mut target).unwrap();
        }
    }
    engine.apply_support(SupportEffect::ClearPositive, &mut target).unwrap();
    assert_eq!(target.stage(BuffAxis::Attack), 0);
    assert_eq!(target.stage(BuffAxis::Defense), -1);
    assert_eq!(engine.apply_support(SupportEffect::ClearPositive, &mut target), None);
}

/// A broken affinity is restored after the configured duration.
#[test]
fn test_break_restored() {
    let registry = registry();
    let config = BattleConfig::default();
    let engine = StatusEngine::new(&registry, &config);
    let mut rng = BattleRng::new(7);
    let mut target = unit(ClassType::Demon);

    let effects = SupportEffect::parse("Fire Break");
    assert_eq!(effects.as_slice(), &[SupportEffect::Break(Element::Fire)]);
    engine.apply_support(effects[0], &mut target).unwrap();
    assert!(target.is_broken(Element::Fire));
    assert_eq!(engine.apply_support(effects[0], &mut target), None);

    engine.turn_end(&mut target, &mut rng);
    engine.turn_end(&mut target, &mut rng);
    let events = engine.turn_end(&mut target, &mut rng);
    assert!(events.contains(&StatusEvent::BreakRestored {
        target: CombatantId(1),
        element: Element::Fire
    }));
    assert!(!target.is_broken(Element::Fire));
}

/// Reflect shields drop when their owner's side starts a phase.
#[test]
fn test_shields_cleared_at_phase_start() {
    let registry = registry();
    let config = BattleConfig::default();
    let engine = StatusEngine::new(&registry, &config);
    let mut target = unit(ClassType::Human);

    for name in ["Tetrakarn", "Makarakarn"] {
        for effect in SupportEffect::parse(name) {
            engine.apply_support(effect, &mut target).unwrap();
        }
    }
    assert!(target.flags.physical_shield && target.flags.magic_shield);

    engine.phase_start(&mut target);
    assert!(!target.flags.physical_shield);
    assert!(!target.flags.magic_shield);
}

// =============================================================================
// Turn Start
// =============================================================================

/// A dizzy combatant loses one turn, then cannot be knocked down again.
#[test]
fn test_dizzy_skips_one_turn() {
    let registry = registry();
    let config = BattleConfig::default();
    let engine = StatusEngine::new(&registry, &config);
    let mut rng = BattleRng::new(8);
    let mut target = unit(ClassType::Human);
    target.flags.down = true;
    target.flags.dizzy = true;

    let start = engine.turn_start(&mut target, &mut rng);
    assert_eq!(start.directive, TurnDirective::Skip);
    assert!(start.events.contains(&StatusEvent::DizzyRecovered { target: CombatantId(1) }));
    assert!(!target.flags.down);
    assert!(target.flags.immune_to_down);

    let next = engine.turn_start(&mut target, &mut rng);
    assert_eq!(next.directive, TurnDirective::CanAct);
    assert!(!target.flags.immune_to_down);
}

/// Guard lasts until the guarding combatant's next turn.
#[test]
fn test_guard_cleared_at_turn_start() {
    let registry = registry();
    let config = BattleConfig::default();
    let engine = StatusEngine::new(&registry, &config);
    let mut rng = BattleRng::new(9);
    let mut target = unit(ClassType::Human);
    target.flags.guarding = true;

    engine.turn_start(&mut target, &mut rng);
    assert!(!target.flags.guarding);
}
