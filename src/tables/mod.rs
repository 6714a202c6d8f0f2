//! Static balance data: difficulty parameters and tool bonuses

pub mod difficulty;
pub mod tools;

pub use difficulty::{
    CrackerParams, DifficultyLevel, DifficultyTable, MemoryParams, PatternParams, PuzzleKind,
    PuzzleParams, RotationParams, SliderParams,
};
pub use tools::{PlayerTools, ToolBonusSet, ToolKind, ToolSpec, ToolState, compute_bonuses};
