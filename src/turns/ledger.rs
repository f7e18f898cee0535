//! Press-turn icon ledger.
//!
//! The acting side holds a pool of icons, one full icon per living active
//! member at phase start. Every action spends or transforms icons according
//! to its aggregated outcome:
//!
//! | Outcome | Effect |
//! |---|---|
//! | Repel / Absorb | Pool emptied |
//! | Miss / Null | Two icons spent, blinking first |
//! | Weakness / critical | A full icon turns blinking; with none left, a blinking icon is spent |
//! | Normal | One icon spent, blinking first |
//! | Pass | A blinking icon is spent; with none, a full icon turns blinking |
//!
//! Neither counter ever goes negative, and the total never rises above the
//! phase's starting count.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::ActionOutcome;

/// Icon pool for the acting side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnIconLedger {
    full: u32,
    blinking: u32,
    initial: u32,
}

impl TurnIconLedger {
    /// An empty ledger; call [`start_phase`](Self::start_phase) before use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to `members` full icons.
    pub fn start_phase(&mut self, members: u32) {
        self.full = members;
        self.blinking = 0;
        self.initial = members;
        tracing::debug!(members, "phase icons");
    }

    /// Spend or transform icons for an action's outcome.
    pub fn consume(&mut self, outcome: ActionOutcome) {
        if !self.has_turns() {
            return;
        }
        let before = (self.full, self.blinking);

        if outcome.terminates() {
            self.terminate();
        } else if outcome.penalizes() {
            self.spend(2);
        } else if outcome.chains() {
            if self.full > 0 {
                self.full -= 1;
                self.blinking += 1;
            } else {
                self.blinking -= 1;
            }
        } else {
            self.spend(1);
        }

        tracing::debug!(?outcome, ?before, after = ?(self.full, self.blinking), "icons consumed");
    }

    /// Voluntary pass. Never chains.
    pub fn pass(&mut self) {
        if self.blinking > 0 {
            self.blinking -= 1;
        } else if self.full > 0 {
            self.full -= 1;
            self.blinking += 1;
        }
    }

    /// Empty the pool.
    pub fn terminate(&mut self) {
        self.full = 0;
        self.blinking = 0;
    }

    fn spend(&mut self, count: u32) {
        for _ in 0..count {
            if self.blinking > 0 {
                self.blinking -= 1;
            } else if self.full > 0 {
                self.full -= 1;
            }
        }
    }

    /// Any icons left.
    #[must_use]
    pub fn has_turns(&self) -> bool {
        self.total() > 0
    }

    #[must_use]
    pub fn full(&self) -> u32 {
        self.full
    }

    #[must_use]
    pub fn blinking(&self) -> u32 {
        self.blinking
    }

    /// Full plus blinking.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.full + self.blinking
    }

    /// Icon count the phase started with.
    #[must_use]
    pub fn initial(&self) -> u32 {
        self.initial
    }
}

impl fmt::Display for TurnIconLedger {
    /// Renders as e.g. `[OO*]`: `O` full, `*` blinking.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for _ in 0..self.full {
            f.write_str("O")?;
        }
        for _ in 0..self.blinking {
            f.write_str("*")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::HitKind;

    fn ledger(full: u32, blinking: u32) -> TurnIconLedger {
        TurnIconLedger {
            full,
            blinking,
            initial: full + blinking,
        }
    }

    #[test]
    fn test_start_phase() {
        let mut l = ledger(0, 2);
        l.start_phase(4);
        assert_eq!((l.full(), l.blinking(), l.initial()), (4, 0, 4));
    }

    #[test]
    fn test_normal_spends_blinking_first() {
        let mut l = ledger(2, 1);
        l.consume(ActionOutcome::NORMAL);
        assert_eq!((l.full(), l.blinking()), (2, 0));
        l.consume(ActionOutcome::NORMAL);
        assert_eq!((l.full(), l.blinking()), (1, 0));
    }

    #[test]
    fn test_chaining() {
        let weak = ActionOutcome::new(HitKind::Weakness);
        let mut l = ledger(2, 0);
        l.consume(weak);
        assert_eq!((l.full(), l.blinking()), (1, 1));

        let mut l = ledger(0, 1);
        l.consume(weak);
        assert_eq!((l.full(), l.blinking()), (0, 0));

        let mut l = ledger(1, 1);
        l.consume(ActionOutcome::critical(HitKind::Normal));
        assert_eq!((l.full(), l.blinking()), (0, 2));
    }

    #[test]
    fn test_penalty_floors_at_zero() {
        let mut l = ledger(0, 1);
        l.consume(ActionOutcome::new(HitKind::Null));
        assert_eq!(l.total(), 0);

        let mut l = ledger(3, 1);
        l.consume(ActionOutcome::MISS);
        assert_eq!((l.full(), l.blinking()), (2, 0));
    }

    #[test]
    fn test_terminators() {
        for kind in [HitKind::Repel, HitKind::Absorb] {
            let mut l = ledger(5, 3);
            l.consume(ActionOutcome::new(kind));
            assert!(!l.has_turns());
        }
    }

    #[test]
    fn test_pass() {
        let mut l = ledger(2, 0);
        l.pass();
        assert_eq!((l.full(), l.blinking()), (1, 1));
        l.pass();
        assert_eq!((l.full(), l.blinking()), (1, 0));

        let mut empty = ledger(0, 0);
        empty.pass();
        assert_eq!(empty.total(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(ledger(2, 1).to_string(), "[OO*]");
        assert_eq!(ledger(0, 0).to_string(), "[]");
    }
}
