//! Error types
//!
//! Only misconfiguration and sequencer misuse are errors. Gameplay misses,
//! mismatches and the cracker's attempt exhaustion are ordinary state
//! transitions reported through `PuzzleEvent`.

use thiserror::Error;

use crate::tables::PuzzleKind;

/// Invalid content or settings, detected when data is loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("difficulty level {0} is outside 1..={max}", max = crate::consts::MAX_DIFFICULTY_LEVEL)]
    LevelOutOfRange(u8),

    #[error("unknown puzzle type `{0}`")]
    UnknownPuzzleKind(String),

    #[error("{kind:?} level {level}: {reason}")]
    InvalidParams {
        kind: PuzzleKind,
        level: u8,
        reason: &'static str,
    },

    #[error("mission `{0}` has no puzzle layers")]
    EmptyMission(String),

    #[error("mission `{id}` reward range invalid (min {min} > max {max})")]
    RewardRange { id: String, min: u32, max: u32 },

    #[error("mission `{mission}` requires unknown mission `{required}`")]
    UnknownRequirement { mission: String, required: String },

    #[error("duplicate mission id `{0}`")]
    DuplicateMission(String),

    #[error("setting `{field}` must be at least {min} (got {value})")]
    SettingTooSmall {
        field: &'static str,
        min: u32,
        value: u32,
    },

    #[error("countdown for {layers} layers does not fit in u32 seconds")]
    CountdownOverflow { layers: usize },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Sequencer calls that do not apply to the run's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeistError {
    #[error("no puzzle layer is active")]
    NoActiveLayer,

    #[error("the heist has already finished")]
    Finished,
}

/// Shop and inventory operations that cannot be applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("not enough money: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },

    #[error("tool `{0}` is already owned")]
    AlreadyOwned(&'static str),

    #[error("tool `{0}` is not owned")]
    NotOwned(&'static str),

    #[error("tool `{0}` is already at max level")]
    MaxLevel(&'static str),

    #[error("tool `{0}` cannot be upgraded")]
    NotUpgradable(&'static str),

    #[error("no `{0}` charges left")]
    NoCharges(&'static str),
}
