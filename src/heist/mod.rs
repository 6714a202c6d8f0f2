//! Heist sequencing
//!
//! A heist chains a mission's puzzle layers under one countdown. Exactly one
//! puzzle is live at a time; the run owns it, the countdown and the RNG that
//! seeds every layer.

pub mod run;
pub mod timer;

pub use run::HeistRun;
pub use timer::Countdown;

use serde::{Deserialize, Serialize};

use crate::puzzle::PuzzleEvent;
use crate::tables::PuzzleKind;

/// Current phase of a heist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeistPhase {
    /// Built but not started
    Idle,
    /// A puzzle layer is live
    LayerRunning,
    /// Every layer cleared
    Success,
    /// Countdown hit zero
    Failure,
}

impl HeistPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, HeistPhase::Success | HeistPhase::Failure)
    }
}

/// Something that happened during a heist
#[derive(Debug, Clone, PartialEq)]
pub enum HeistEvent {
    LayerStarted { index: usize, kind: PuzzleKind },
    /// Forwarded from the live puzzle
    Puzzle { layer: usize, event: PuzzleEvent },
    /// Layer cleared, either solved or blown open with a consumable
    LayerSolved { index: usize, skipped: bool },
    LayerFailed { index: usize },
    /// One whole second elapsed
    TimerTick { remaining: u32 },
    MissionComplete { mission: String },
    MissionFailed {
        mission: String,
        layers_completed: usize,
        total_layers: usize,
    },
}
