//! Initiative and escape rolls.

use crate::core::{BattleRng, Combatant, Side, Stat};

/// Escape chance bounds, in percent.
pub const ESCAPE_CHANCE_MIN: f64 = 5.0;
pub const ESCAPE_CHANCE_MAX: f64 = 95.0;

/// Average effective AGI of the living members of a group; 0 if none live.
#[must_use]
pub fn side_average_agility<'a, I>(members: I) -> f64
where
    I: IntoIterator<Item = &'a Combatant>,
{
    let (sum, count) = members
        .into_iter()
        .filter(|c| c.is_alive())
        .fold((0.0, 0u32), |(sum, count), c| (sum + c.buffed_stat(Stat::Agi), count + 1));
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

/// Decide which side acts first.
///
/// Each side's average AGI is scaled by a factor in `[0.9, 1.1)`; the player
/// side wins ties.
pub fn roll_initiative(player_agility: f64, enemy_agility: f64, rng: &mut BattleRng) -> Side {
    let player = player_agility * rng.gen_f64_range(0.9..1.1);
    let enemy = enemy_agility * rng.gen_f64_range(0.9..1.1);
    let first = if player >= enemy { Side::Player } else { Side::Enemy };
    tracing::debug!(player, enemy, ?first, "initiative");
    first
}

/// Escape chance in percent: `10 + 40 × actor AGI / enemy average AGI`,
/// clamped to `[5, 95]`.
#[must_use]
pub fn escape_chance(actor_agility: f64, enemy_average_agility: f64) -> u32 {
    let raw = 10.0 + 40.0 * actor_agility / enemy_average_agility.max(1.0);
    raw.clamp(ESCAPE_CHANCE_MIN, ESCAPE_CHANCE_MAX).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassType, CombatantId, StatBlock};

    fn runner(agi: i32, hp: i32) -> Combatant {
        let mut c = Combatant::new(CombatantId(0), "R", ClassType::Human, Side::Player)
            .with_stats(StatBlock::combat(0, 0, agi, 0, 0))
            .with_resources(10, 0);
        c.take_damage(10 - hp);
        c
    }

    #[test]
    fn test_average_skips_fallen() {
        let group = [runner(10, 10), runner(20, 10), runner(40, 0)];
        assert!((side_average_agility(&group) - 15.0).abs() < f64::EPSILON);
        assert!(side_average_agility(&[] as &[Combatant]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_initiative_lopsided() {
        let mut rng = BattleRng::new(8);
        for _ in 0..50 {
            assert_eq!(roll_initiative(40.0, 5.0, &mut rng), Side::Player);
            assert_eq!(roll_initiative(5.0, 40.0, &mut rng), Side::Enemy);
        }
    }

    #[test]
    fn test_initiative_tie_goes_to_player() {
        let mut rng = BattleRng::new(1);
        for _ in 0..20 {
            assert_eq!(roll_initiative(0.0, 0.0, &mut rng), Side::Player);
        }
    }

    #[test]
    fn test_escape_chance() {
        assert_eq!(escape_chance(10.0, 10.0), 50);
        assert_eq!(escape_chance(40.0, 5.0), 95);
        assert_eq!(escape_chance(0.0, 20.0), 10);
        assert_eq!(escape_chance(10.0, 0.0), 95);
    }
}
