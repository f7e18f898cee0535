//! Hit outcomes and their aggregation.
//!
//! Every resolved target produces an [`ActionOutcome`]. A multi-target
//! action folds its per-target outcomes into the single worst one, which is
//! what the turn ledger consumes.

use serde::{Deserialize, Serialize};

use crate::core::Affinity;

/// How a single hit landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitKind {
    Normal,
    Weakness,
    Miss,
    Null,
    Repel,
    Absorb,
}

impl HitKind {
    /// Classify a landed hit by its resolved affinity.
    #[must_use]
    pub const fn from_affinity(affinity: Affinity) -> Self {
        match affinity {
            Affinity::Normal | Affinity::Resist => HitKind::Normal,
            Affinity::Weak => HitKind::Weakness,
            Affinity::Null => HitKind::Null,
            Affinity::Repel => HitKind::Repel,
            Affinity::Absorb => HitKind::Absorb,
        }
    }

    /// Severity rank for aggregation; higher is worse for the attacker.
    const fn severity(self) -> u8 {
        match self {
            HitKind::Weakness | HitKind::Normal => 0,
            HitKind::Null => 1,
            HitKind::Miss => 2,
            HitKind::Absorb => 3,
            HitKind::Repel => 4,
        }
    }
}

/// Outcome of one hit or one whole action, as fed to the turn ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub kind: HitKind,
    pub critical: bool,
}

impl ActionOutcome {
    /// A plain outcome that consumes one icon.
    pub const NORMAL: ActionOutcome = ActionOutcome::new(HitKind::Normal);

    /// A miss.
    pub const MISS: ActionOutcome = ActionOutcome::new(HitKind::Miss);

    #[must_use]
    pub const fn new(kind: HitKind) -> Self {
        Self { kind, critical: false }
    }

    #[must_use]
    pub const fn critical(kind: HitKind) -> Self {
        Self { kind, critical: true }
    }

    /// Ends the phase: Repel or Absorb.
    #[must_use]
    pub const fn terminates(self) -> bool {
        matches!(self.kind, HitKind::Repel | HitKind::Absorb)
    }

    /// Costs two icons: Miss or Null.
    #[must_use]
    pub const fn penalizes(self) -> bool {
        matches!(self.kind, HitKind::Miss | HitKind::Null)
    }

    /// Chains a bonus action: Weakness or a critical that was not blocked.
    #[must_use]
    pub const fn chains(self) -> bool {
        !self.terminates()
            && !self.penalizes()
            && (matches!(self.kind, HitKind::Weakness) || self.critical)
    }
}

impl Default for ActionOutcome {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Fold per-target outcomes into the single worst one.
///
/// Any Repel/Absorb wins, then any Miss/Null, then any Weakness or critical,
/// then Normal. An empty action counts as Normal.
#[must_use]
pub fn aggregate_outcomes<I>(outcomes: I) -> ActionOutcome
where
    I: IntoIterator<Item = ActionOutcome>,
{
    let mut worst: Option<HitKind> = None;
    let mut weakness = false;
    let mut critical = false;

    for outcome in outcomes {
        if outcome.terminates() || outcome.penalizes() {
            worst = match worst {
                Some(w) if w.severity() >= outcome.kind.severity() => Some(w),
                _ => Some(outcome.kind),
            };
        } else {
            weakness |= outcome.kind == HitKind::Weakness;
            critical |= outcome.critical;
        }
    }

    match worst {
        Some(kind) => ActionOutcome::new(kind),
        None if weakness => ActionOutcome {
            kind: HitKind::Weakness,
            critical,
        },
        None => ActionOutcome {
            kind: HitKind::Normal,
            critical,
        },
    }
}
