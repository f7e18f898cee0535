//! Turn economy.

pub mod ledger;

pub use ledger::TurnIconLedger;
