//! Lock puzzle engines
//!
//! Each engine is a self-contained state machine:
//! - Built with its difficulty parameters, the heist's tool bonuses and a seeded RNG
//! - Driven by `tick(dt)` from the heist's scheduler and by pointer input
//! - Reports everything that happened as `PuzzleEvent`s
//! - Ends in `Solved` (or `Failed` when aborted by the heist); after `stop()`
//!   it ignores all input and ticks

pub mod cracker;
pub mod memory;
pub mod pattern;
pub mod rotation;
pub mod slider;

pub use cracker::{CrackerPuzzle, GuessScore, score_guess};
pub use memory::MemoryPuzzle;
pub use pattern::PatternPuzzle;
pub use rotation::RotationPuzzle;
pub use slider::SliderPuzzle;

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::feedback::Feedback;
use crate::layout::Viewport;
use crate::settings::HeistSettings;
use crate::tables::{PuzzleKind, PuzzleParams, ToolBonusSet};

/// Tri-state result of a puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleOutcome {
    Running,
    Solved,
    /// Only reached when the heist aborts the puzzle
    Failed,
}

/// Pointer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Pointer input in the puzzle canvas' coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub pos: Vec2,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Down, pos: Vec2::new(x, y) }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Move, pos: Vec2::new(x, y) }
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Up, pos: Vec2::new(x, y) }
    }
}

/// Something that happened inside a puzzle
#[derive(Debug, Clone, PartialEq)]
pub enum PuzzleEvent {
    // Slider
    ZoneHit { zone: usize },
    /// The zone's sweet spot moved elsewhere
    ZoneMissed { zone: usize },

    // Rotation
    PinSet { pin: usize },
    PinMissed { pin: usize },

    // Memory / pattern memorization phase is over
    RevealEnded,

    // Memory
    TileFlipped { tile: usize },
    PairMatched { first: usize, second: usize },
    /// Both tiles flipped back face down
    PairMismatched { first: usize, second: usize },

    // Pattern
    NodeRevealed { node: usize, step: usize },
    NodeTraced { node: usize, progress: usize },
    /// A wrong node cleared the traced path
    PatternReset,

    // Cracker
    DigitEntered { digit: u8 },
    DigitDeleted,
    GuessScored(GuessScore),
    /// Out of attempts; the secret is shown until the code resets
    AttemptsExhausted { secret: Vec<u8> },
    /// A fresh secret was generated and attempts reset
    CodeReset,

    /// The whole puzzle is solved
    Solved,
}

/// Behaviour shared by every engine
pub trait Puzzle {
    fn kind(&self) -> PuzzleKind;

    /// Advance timers and animation by `dt` seconds
    fn tick(&mut self, dt: f32) -> Vec<PuzzleEvent>;

    /// Route a pointer event through the puzzle's layout
    fn pointer(&mut self, event: PointerEvent) -> Vec<PuzzleEvent>;

    /// Recompute layout for a new canvas size
    fn resize(&mut self, viewport: Viewport);

    fn outcome(&self) -> PuzzleOutcome;

    /// Stop listening to input and ticks
    fn stop(&mut self);

    /// Stop, marking an unsolved puzzle as failed
    fn abort(&mut self);

    fn is_active(&self) -> bool;
}

/// Everything an engine needs at construction besides its parameters
#[derive(Debug, Clone)]
pub struct PuzzleContext {
    pub bonuses: ToolBonusSet,
    pub settings: HeistSettings,
    pub viewport: Viewport,
    pub feedback: Feedback,
}

impl Default for PuzzleContext {
    fn default() -> Self {
        Self {
            bonuses: ToolBonusSet::default(),
            settings: HeistSettings::default(),
            viewport: Viewport::default(),
            feedback: Feedback::silent(),
        }
    }
}

/// The single active puzzle of a heist layer
#[derive(Debug)]
pub enum PuzzleInstance {
    Slider(SliderPuzzle),
    Rotation(RotationPuzzle),
    Memory(MemoryPuzzle),
    Pattern(PatternPuzzle),
    Cracker(CrackerPuzzle),
}

impl PuzzleInstance {
    pub fn new(params: PuzzleParams, ctx: &PuzzleContext, rng: Pcg32) -> Self {
        match params {
            PuzzleParams::Slider(p) => PuzzleInstance::Slider(SliderPuzzle::new(p, ctx, rng)),
            PuzzleParams::Rotation(p) => PuzzleInstance::Rotation(RotationPuzzle::new(p, ctx, rng)),
            PuzzleParams::Memory(p) => PuzzleInstance::Memory(MemoryPuzzle::new(p, ctx, rng)),
            PuzzleParams::Pattern(p) => PuzzleInstance::Pattern(PatternPuzzle::new(p, ctx, rng)),
            PuzzleParams::Cracker(p) => PuzzleInstance::Cracker(CrackerPuzzle::new(p, ctx, rng)),
        }
    }

    pub fn as_puzzle(&self) -> &dyn Puzzle {
        match self {
            PuzzleInstance::Slider(p) => p,
            PuzzleInstance::Rotation(p) => p,
            PuzzleInstance::Memory(p) => p,
            PuzzleInstance::Pattern(p) => p,
            PuzzleInstance::Cracker(p) => p,
        }
    }

    pub fn as_puzzle_mut(&mut self) -> &mut dyn Puzzle {
        match self {
            PuzzleInstance::Slider(p) => p,
            PuzzleInstance::Rotation(p) => p,
            PuzzleInstance::Memory(p) => p,
            PuzzleInstance::Pattern(p) => p,
            PuzzleInstance::Cracker(p) => p,
        }
    }

    pub fn kind(&self) -> PuzzleKind {
        self.as_puzzle().kind()
    }

    pub fn outcome(&self) -> PuzzleOutcome {
        self.as_puzzle().outcome()
    }

    pub fn tick(&mut self, dt: f32) -> Vec<PuzzleEvent> {
        self.as_puzzle_mut().tick(dt)
    }

    pub fn pointer(&mut self, event: PointerEvent) -> Vec<PuzzleEvent> {
        self.as_puzzle_mut().pointer(event)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.as_puzzle_mut().resize(viewport);
    }

    pub fn stop(&mut self) {
        self.as_puzzle_mut().stop();
    }

    pub fn abort(&mut self) {
        self.as_puzzle_mut().abort();
    }

    pub fn is_active(&self) -> bool {
        self.as_puzzle().is_active()
    }
}

/// Lifecycle flags shared by the engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lifecycle {
    pub outcome: PuzzleOutcome,
    pub active: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self { outcome: PuzzleOutcome::Running, active: true }
    }

    pub fn solve(&mut self) {
        self.outcome = PuzzleOutcome::Solved;
        self.active = false;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn abort(&mut self) {
        if self.outcome == PuzzleOutcome::Running {
            self.outcome = PuzzleOutcome::Failed;
        }
        self.active = false;
    }
}

/// Milliseconds to seconds
#[inline]
pub(crate) fn ms(ms: u32) -> f32 {
    ms as f32 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{DifficultyLevel, DifficultyTable};
    use rand::SeedableRng;

    #[test]
    fn test_instance_matches_params_kind() {
        let table = DifficultyTable::standard();
        let ctx = PuzzleContext::default();
        for kind in PuzzleKind::ALL {
            let params = table.params_for(kind, DifficultyLevel::new(1).unwrap());
            let puzzle = PuzzleInstance::new(params, &ctx, Pcg32::seed_from_u64(7));
            assert_eq!(puzzle.kind(), kind);
            assert_eq!(puzzle.outcome(), PuzzleOutcome::Running);
            assert!(puzzle.is_active());
        }
    }

    #[test]
    fn test_stopped_puzzle_ignores_input() {
        let table = DifficultyTable::standard();
        let ctx = PuzzleContext::default();
        for kind in PuzzleKind::ALL {
            let params = table.params_for(kind, DifficultyLevel::new(1).unwrap());
            let mut puzzle = PuzzleInstance::new(params, &ctx, Pcg32::seed_from_u64(3));
            puzzle.stop();
            assert!(!puzzle.is_active());
            assert!(puzzle.tick(10.0).is_empty());
            let center = ctx.viewport.center();
            assert!(puzzle.pointer(PointerEvent::down(center.x, center.y)).is_empty());
            assert!(puzzle.pointer(PointerEvent::up(center.x, center.y)).is_empty());
        }
    }

    #[test]
    fn test_abort_marks_failed() {
        let table = DifficultyTable::standard();
        let params = table.params_for(PuzzleKind::Rotation, DifficultyLevel::new(1).unwrap());
        let mut puzzle = PuzzleInstance::new(params, &PuzzleContext::default(), Pcg32::seed_from_u64(1));
        puzzle.abort();
        assert_eq!(puzzle.outcome(), PuzzleOutcome::Failed);
        assert!(!puzzle.is_active());
    }

    #[test]
    fn test_lifecycle_abort_keeps_solved() {
        let mut life = Lifecycle::new();
        life.solve();
        life.abort();
        assert_eq!(life.outcome, PuzzleOutcome::Solved);
    }
}
