//! Error types for data loading, configuration and action requests.
//!
//! Battle-time data absence is not an error: it is logged with
//! `tracing::warn!` and the engine falls back to a benign action.

use thiserror::Error;

/// Errors raised while loading or validating static battle data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to parse {kind} data: {source}")]
    Json {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown element `{0}`")]
    UnknownElement(String),

    #[error("unknown affinity `{0}`")]
    UnknownAffinity(String),

    #[error("unknown stat `{0}`")]
    UnknownStat(String),

    #[error("duplicate {kind} `{id}`")]
    Duplicate { kind: &'static str, id: String },

    #[error("{kind} `{id}` references missing {missing_kind} `{missing}`")]
    DanglingReference {
        kind: &'static str,
        id: String,
        missing_kind: &'static str,
        missing: String,
    },
}

/// Errors raised while loading a [`BattleConfig`](crate::core::BattleConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse battle config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Reasons an action request is rejected before any state changes.
///
/// Human requests are re-prompted; AI requests fall through to the next tier.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{actor} cannot act")]
    ActorUnavailable { actor: String },

    #[error("not enough {resource} (needs {required}, has {available})")]
    InsufficientResource {
        resource: &'static str,
        required: i32,
        available: i32,
    },

    #[error("no valid target")]
    NoValidTarget,

    #[error("unknown skill `{0}`")]
    UnknownSkill(String),

    #[error("unknown item `{0}`")]
    UnknownItem(String),

    #[error("{0} would have no effect")]
    NoEffect(String),

    #[error("escape is not possible here")]
    EscapeBlocked,

    #[error("no demon available")]
    NoDemon,

    #[error("the party is full")]
    PartyFull,
}
