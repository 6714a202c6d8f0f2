//! Lockpicker - puzzle-engine core for a lock-picking heist game
//!
//! Core modules:
//! - `puzzle`: The five lock mini-games (slider, rotation, memory, pattern, cracker)
//! - `heist`: Sequencer chaining puzzle layers under a shared countdown
//! - `tables`: Difficulty parameters and tool bonuses
//! - `mission`: Mission descriptors and the built-in catalog
//! - `progress`: Player tools, money and stats
//! - `layout`: Shared geometry for hit-testing and drawing
//! - `feedback`: Injected sound/haptic/effects capabilities

pub mod error;
pub mod feedback;
pub mod heist;
pub mod layout;
pub mod mission;
pub mod progress;
pub mod puzzle;
pub mod settings;
pub mod tables;

pub use error::{ConfigError, HeistError, ProgressError};
pub use feedback::Feedback;
pub use heist::{HeistEvent, HeistPhase, HeistRun};
pub use mission::{Mission, MissionCatalog};
pub use progress::PlayerProgress;
pub use puzzle::{PointerEvent, PuzzleEvent, PuzzleInstance, PuzzleOutcome};
pub use settings::HeistSettings;
pub use tables::{DifficultyLevel, DifficultyTable, PuzzleKind, PuzzleParams, ToolBonusSet};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Slider sweet spots are placed between these track fractions
    pub const SLIDER_ZONE_MIN: f32 = 0.2;
    pub const SLIDER_ZONE_MAX: f32 = 0.8;

    /// Slider track geometry
    pub const SLIDER_TRACK_MARGIN: f32 = 40.0;
    pub const SLIDER_TRACK_HEIGHT: f32 = 50.0;

    /// Rotation dial radius as a fraction of the smaller viewport side
    pub const DIAL_RADIUS_FRACTION: f32 = 0.32;

    /// Memory grid geometry
    pub const TILE_MAX_SIZE: f32 = 80.0;
    pub const TILE_GAP: f32 = 10.0;
    pub const GRID_PADDING: f32 = 15.0;
    /// Symbols available to the memory game (one per pair)
    pub const MEMORY_SYMBOLS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

    /// Pattern grid is always 3x3
    pub const PATTERN_GRID_SIDE: usize = 3;
    pub const PATTERN_NODE_COUNT: usize = PATTERN_GRID_SIDE * PATTERN_GRID_SIDE;
    /// Node hit radius is this multiple of the drawn radius
    pub const PATTERN_HIT_SCALE: f32 = 1.5;

    /// Cracker keypad geometry
    pub const KEYPAD_MAX_WIDTH: f32 = 300.0;
    pub const KEYPAD_BOTTOM_OFFSET: f32 = 180.0;
    pub const KEYPAD_BUTTON_HEIGHT: f32 = 45.0;
    pub const KEYPAD_ROW_GAP: f32 = 8.0;
    pub const KEYPAD_ACTION_HEIGHT: f32 = 38.0;

    /// Highest difficulty level in the tables
    pub const MAX_DIFFICULTY_LEVEL: u8 = 5;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Wrap a signed angle delta in degrees into (-180, 180]
#[inline]
pub fn wrap_delta_degrees(mut delta: f32) -> f32 {
    while delta > 180.0 {
        delta -= 360.0;
    }
    while delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

/// Shortest distance between two angles on the circle, in degrees [0, 180]
#[inline]
pub fn circular_distance_degrees(a: f32, b: f32) -> f32 {
    let diff = (normalize_degrees(a) - normalize_degrees(b)).abs();
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Angle of `pos` around `center` in degrees (-180, 180], screen coordinates
#[inline]
pub fn pointer_angle_degrees(center: Vec2, pos: Vec2) -> f32 {
    let d = pos - center;
    d.y.atan2(d.x).to_degrees()
}
