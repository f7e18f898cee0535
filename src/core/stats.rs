//! Stats and buff stages.
//!
//! ## Stat Model
//!
//! Seven base stats, each clamped to `[0, STAT_CAP]`. Buff stages live on
//! three axes (Attack, Defense, Agility), each clamped to `[-4, 4]` and
//! carrying a turn counter that refreshes on every change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Highest value a single stat may reach.
pub const STAT_CAP: i32 = 40;

/// Highest or lowest buff stage.
pub const MAX_STAGE: i8 = 4;

/// Base stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Str,
    Mag,
    Agi,
    End,
    Luk,
    Int,
    Cha,
}

impl Stat {
    /// Number of stats.
    pub const COUNT: usize = 7;

    /// All stats in block order.
    pub const ALL: [Stat; Stat::COUNT] = [
        Stat::Str,
        Stat::Mag,
        Stat::Agi,
        Stat::End,
        Stat::Luk,
        Stat::Int,
        Stat::Cha,
    ];

    /// Short uppercase label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Stat::Str => "STR",
            Stat::Mag => "MAG",
            Stat::Agi => "AGI",
            Stat::End => "END",
            Stat::Luk => "LUK",
            Stat::Int => "INT",
            Stat::Cha => "CHA",
        }
    }

    /// Share of a persona's stat a persona user gains.
    #[must_use]
    pub const fn persona_factor(self) -> f64 {
        match self {
            Stat::Str | Stat::Mag => 0.4,
            Stat::End | Stat::Agi => 0.25,
            Stat::Luk => 0.5,
            Stat::Int | Stat::Cha => 0.0,
        }
    }

    /// Buff axis that scales this stat, if any.
    #[must_use]
    pub const fn buff_axis(self) -> Option<BuffAxis> {
        match self {
            Stat::Str | Stat::Mag => Some(BuffAxis::Attack),
            Stat::End => Some(BuffAxis::Defense),
            Stat::Agi => Some(BuffAxis::Agility),
            _ => None,
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stat {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stat::ALL
            .iter()
            .copied()
            .find(|stat| stat.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DataError::UnknownStat(s.to_string()))
    }
}

/// A full set of stat values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock([i32; Stat::COUNT]);

impl StatBlock {
    /// All-zero block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block with the five combat stats set, INT/CHA zero.
    #[must_use]
    pub fn combat(str_: i32, mag: i32, agi: i32, end: i32, luk: i32) -> Self {
        Self::new()
            .with(Stat::Str, str_)
            .with(Stat::Mag, mag)
            .with(Stat::Agi, agi)
            .with(Stat::End, end)
            .with(Stat::Luk, luk)
    }

    /// Set a stat, clamped to `[0, STAT_CAP]` (builder pattern).
    #[must_use]
    pub fn with(mut self, stat: Stat, value: i32) -> Self {
        self.set(stat, value);
        self
    }

    /// Get a stat.
    #[must_use]
    pub fn get(&self, stat: Stat) -> i32 {
        self.0[stat as usize]
    }

    /// Set a stat, clamped to `[0, STAT_CAP]`.
    pub fn set(&mut self, stat: Stat, value: i32) {
        self.0[stat as usize] = value.clamp(0, STAT_CAP);
    }

    /// Iterate over `(stat, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Stat, i32)> + '_ {
        Stat::ALL.iter().map(move |&s| (s, self.get(s)))
    }
}

/// Buff axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffAxis {
    Attack,
    Defense,
    Agility,
}

impl BuffAxis {
    /// All axes.
    pub const ALL: [BuffAxis; 3] = [BuffAxis::Attack, BuffAxis::Defense, BuffAxis::Agility];

    #[must_use]
    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BuffAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuffAxis::Attack => "Attack",
            BuffAxis::Defense => "Defense",
            BuffAxis::Agility => "Agility",
        };
        f.write_str(name)
    }
}

/// Multiplier for a buff stage.
///
/// Positive stages add 25% each (2.0 at +4); negative stages remove 12.5%
/// each (0.5 at -4).
#[must_use]
pub fn stage_multiplier(stage: i8) -> f64 {
    let stage = stage.clamp(-MAX_STAGE, MAX_STAGE);
    if stage >= 0 {
        1.0 + 0.25 * f64::from(stage)
    } else {
        1.0 + 0.125 * f64::from(stage)
    }
}

/// A single axis: stage level and turns until it resets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffStage {
    pub level: i8,
    pub turns: u8,
}

/// Buff stages on all three axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffStages([BuffStage; 3]);

impl BuffStages {
    /// No buffs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage on an axis.
    #[must_use]
    pub fn level(&self, axis: BuffAxis) -> i8 {
        self.0[axis.index()].level
    }

    /// Turns left on an axis.
    #[must_use]
    pub fn turns(&self, axis: BuffAxis) -> u8 {
        self.0[axis.index()].turns
    }

    /// Stage multiplier for an axis.
    #[must_use]
    pub fn multiplier(&self, axis: BuffAxis) -> f64 {
        stage_multiplier(self.level(axis))
    }

    /// Shift a stage by `delta`, clamped to `[-4, 4]`, refreshing its timer.
    ///
    /// Returns the new level.
    pub fn shift(&mut self, axis: BuffAxis, delta: i8, duration: u8) -> i8 {
        let stage = &mut self.0[axis.index()];
        stage.level = stage.level.saturating_add(delta).clamp(-MAX_STAGE, MAX_STAGE);
        stage.turns = if stage.level == 0 { 0 } else { duration };
        stage.level
    }

    /// Whether a further shift by `delta` would change anything.
    #[must_use]
    pub fn can_shift(&self, axis: BuffAxis, delta: i8) -> bool {
        let level = self.level(axis);
        (delta > 0 && level < MAX_STAGE) || (delta < 0 && level > -MAX_STAGE)
    }

    /// Drop every positive stage.
    pub fn clear_positive(&mut self) -> bool {
        self.clear_where(|level| level > 0)
    }

    /// Drop every negative stage.
    pub fn clear_negative(&mut self) -> bool {
        self.clear_where(|level| level < 0)
    }

    fn clear_where(&mut self, predicate: impl Fn(i8) -> bool) -> bool {
        let mut changed = false;
        for stage in &mut self.0 {
            if predicate(stage.level) {
                *stage = BuffStage::default();
                changed = true;
            }
        }
        changed
    }

    /// Count down one turn. Returns the axes that expired this tick.
    pub fn tick(&mut self) -> Vec<BuffAxis> {
        let mut expired = Vec::new();
        for axis in BuffAxis::ALL {
            let stage = &mut self.0[axis.index()];
            if stage.level == 0 {
                continue;
            }
            stage.turns = stage.turns.saturating_sub(1);
            if stage.turns == 0 {
                stage.level = 0;
                expired.push(axis);
            }
        }
        expired
    }

    /// True when every axis is at zero.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.0.iter().all(|s| s.level == 0)
    }
}
