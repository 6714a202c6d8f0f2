//! Difficulty scaling for the five lock puzzles
//!
//! Pure lookup from `(PuzzleKind, DifficultyLevel)` to parameters. The table
//! is built once (built-in or from JSON), validated, and never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_DIFFICULTY_LEVEL, MEMORY_SYMBOLS, PATTERN_NODE_COUNT};
use crate::error::ConfigError;

/// The five lock mini-games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleKind {
    Slider,
    Rotation,
    Memory,
    Pattern,
    Cracker,
}

impl PuzzleKind {
    pub const ALL: [PuzzleKind; 5] = [
        PuzzleKind::Slider,
        PuzzleKind::Rotation,
        PuzzleKind::Memory,
        PuzzleKind::Pattern,
        PuzzleKind::Cracker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PuzzleKind::Slider => "slider",
            PuzzleKind::Rotation => "rotation",
            PuzzleKind::Memory => "memory",
            PuzzleKind::Pattern => "pattern",
            PuzzleKind::Cracker => "cracker",
        }
    }

    /// Player-facing lock name
    pub fn display_name(&self) -> &'static str {
        match self {
            PuzzleKind::Slider => "Pin Tumbler",
            PuzzleKind::Rotation => "Dial Lock",
            PuzzleKind::Memory => "Tumbler Match",
            PuzzleKind::Pattern => "Circuit Trace",
            PuzzleKind::Cracker => "Code Breaker",
        }
    }
}

impl FromStr for PuzzleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slider" => Ok(PuzzleKind::Slider),
            "rotation" => Ok(PuzzleKind::Rotation),
            "memory" => Ok(PuzzleKind::Memory),
            "pattern" => Ok(PuzzleKind::Pattern),
            "cracker" => Ok(PuzzleKind::Cracker),
            _ => Err(ConfigError::UnknownPuzzleKind(s.to_string())),
        }
    }
}

impl fmt::Display for PuzzleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A difficulty level in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DifficultyLevel(u8);

impl DifficultyLevel {
    pub fn new(level: u8) -> Result<Self, ConfigError> {
        if (1..=MAX_DIFFICULTY_LEVEL).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ConfigError::LevelOutOfRange(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based row in the tables
    fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for DifficultyLevel {
    type Error = ConfigError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<DifficultyLevel> for u8 {
    fn from(level: DifficultyLevel) -> u8 {
        level.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderParams {
    /// Indicator speed in track widths per second
    pub speed: f32,
    pub zone_count: u8,
    /// Half-width of each sweet spot, as a percentage of the track
    pub tolerance_percent: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationParams {
    pub pin_count: u8,
    pub tolerance_degrees: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryParams {
    pub pair_count: u8,
    pub show_time_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternParams {
    pub node_count: u8,
    pub show_time_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrackerParams {
    pub digit_count: u8,
    pub max_attempts: u8,
}

/// Parameters for one puzzle at one level
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PuzzleParams {
    Slider(SliderParams),
    Rotation(RotationParams),
    Memory(MemoryParams),
    Pattern(PatternParams),
    Cracker(CrackerParams),
}

impl PuzzleParams {
    pub fn kind(&self) -> PuzzleKind {
        match self {
            PuzzleParams::Slider(_) => PuzzleKind::Slider,
            PuzzleParams::Rotation(_) => PuzzleKind::Rotation,
            PuzzleParams::Memory(_) => PuzzleKind::Memory,
            PuzzleParams::Pattern(_) => PuzzleKind::Pattern,
            PuzzleParams::Cracker(_) => PuzzleKind::Cracker,
        }
    }
}

const LEVELS: usize = MAX_DIFFICULTY_LEVEL as usize;

/// Per-kind parameter rows, indexed by level - 1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub slider: [SliderParams; LEVELS],
    pub rotation: [RotationParams; LEVELS],
    pub memory: [MemoryParams; LEVELS],
    pub pattern: [PatternParams; LEVELS],
    pub cracker: [CrackerParams; LEVELS],
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl DifficultyTable {
    /// Built-in balance: levels 1-3 are the launch tuning, 4-5 continue the curve
    pub fn standard() -> Self {
        const fn slider(speed: f32, zone_count: u8, tolerance_percent: f32) -> SliderParams {
            SliderParams { speed, zone_count, tolerance_percent }
        }
        const fn rotation(pin_count: u8, tolerance_degrees: f32) -> RotationParams {
            RotationParams { pin_count, tolerance_degrees }
        }
        const fn memory(pair_count: u8, show_time_ms: u32) -> MemoryParams {
            MemoryParams { pair_count, show_time_ms }
        }
        const fn pattern(node_count: u8, show_time_ms: u32) -> PatternParams {
            PatternParams { node_count, show_time_ms }
        }
        const fn cracker(digit_count: u8, max_attempts: u8) -> CrackerParams {
            CrackerParams { digit_count, max_attempts }
        }

        Self {
            slider: [
                slider(0.96, 1, 30.0),
                slider(1.44, 2, 25.0),
                slider(2.16, 2, 18.0),
                slider(2.64, 3, 14.0),
                slider(3.12, 3, 10.0),
            ],
            rotation: [
                rotation(3, 15.0),
                rotation(4, 10.0),
                rotation(5, 7.0),
                rotation(6, 5.0),
                rotation(7, 4.0),
            ],
            memory: [
                memory(3, 2000),
                memory(5, 1500),
                memory(6, 1000),
                memory(8, 900),
                memory(10, 800),
            ],
            pattern: [
                pattern(4, 2000),
                pattern(6, 1500),
                pattern(8, 1200),
                pattern(9, 1000),
                pattern(9, 800),
            ],
            cracker: [
                cracker(3, 8),
                cracker(4, 8),
                cracker(5, 7),
                cracker(6, 7),
                cracker(6, 6),
            ],
        }
    }

    /// Parse and validate a table from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Check every entry is playable
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, level) in (1..=MAX_DIFFICULTY_LEVEL).enumerate() {
            let fail = |kind, reason| ConfigError::InvalidParams { kind, level, reason };

            let s = &self.slider[i];
            if !(s.speed > 0.0) {
                return Err(fail(PuzzleKind::Slider, "speed must be positive"));
            }
            if s.zone_count == 0 {
                return Err(fail(PuzzleKind::Slider, "needs at least one zone"));
            }
            if !(s.tolerance_percent > 0.0 && s.tolerance_percent < 50.0) {
                return Err(fail(PuzzleKind::Slider, "tolerance must be in (0, 50) percent"));
            }

            let r = &self.rotation[i];
            if r.pin_count == 0 {
                return Err(fail(PuzzleKind::Rotation, "needs at least one pin"));
            }
            if !(r.tolerance_degrees > 0.0 && r.tolerance_degrees < 180.0) {
                return Err(fail(PuzzleKind::Rotation, "tolerance must be in (0, 180) degrees"));
            }

            let m = &self.memory[i];
            if m.pair_count == 0 || usize::from(m.pair_count) > MEMORY_SYMBOLS.len() {
                return Err(fail(PuzzleKind::Memory, "pair count must be in 1..=10"));
            }

            let p = &self.pattern[i];
            if p.node_count < 2 || usize::from(p.node_count) > PATTERN_NODE_COUNT {
                return Err(fail(PuzzleKind::Pattern, "node count must be in 2..=9"));
            }

            let c = &self.cracker[i];
            if c.digit_count == 0 {
                return Err(fail(PuzzleKind::Cracker, "needs at least one digit"));
            }
            if c.max_attempts == 0 {
                return Err(fail(PuzzleKind::Cracker, "needs at least one attempt"));
            }
        }
        Ok(())
    }

    /// Look up parameters for a puzzle at a level
    pub fn params_for(&self, kind: PuzzleKind, level: DifficultyLevel) -> PuzzleParams {
        let i = level.index();
        match kind {
            PuzzleKind::Slider => PuzzleParams::Slider(self.slider[i]),
            PuzzleKind::Rotation => PuzzleParams::Rotation(self.rotation[i]),
            PuzzleKind::Memory => PuzzleParams::Memory(self.memory[i]),
            PuzzleKind::Pattern => PuzzleParams::Pattern(self.pattern[i]),
            PuzzleKind::Cracker => PuzzleParams::Cracker(self.cracker[i]),
        }
    }

    /// Look up parameters from raw content values (type name and numeric level)
    pub fn params_for_raw(&self, kind: &str, level: u8) -> Result<PuzzleParams, ConfigError> {
        let kind: PuzzleKind = kind.parse()?;
        let level = DifficultyLevel::new(level)?;
        Ok(self.params_for(kind, level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_valid() {
        DifficultyTable::standard().validate().unwrap();
    }

    #[test]
    fn test_table_total_over_domain() {
        let table = DifficultyTable::standard();
        for kind in PuzzleKind::ALL {
            for level in 1..=MAX_DIFFICULTY_LEVEL {
                let params = table.params_for(kind, DifficultyLevel::new(level).unwrap());
                assert_eq!(params.kind(), kind);
            }
        }
    }

    #[test]
    fn test_level_out_of_range_is_rejected() {
        assert!(matches!(DifficultyLevel::new(0), Err(ConfigError::LevelOutOfRange(0))));
        assert!(matches!(DifficultyLevel::new(6), Err(ConfigError::LevelOutOfRange(6))));
        let table = DifficultyTable::standard();
        assert!(table.params_for_raw("slider", 9).is_err());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let table = DifficultyTable::standard();
        let err = table.params_for_raw("laser_grid", 1).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPuzzleKind(ref s) if s == "laser_grid"));
    }

    #[test]
    fn test_launch_values() {
        let table = DifficultyTable::standard();
        let lvl2 = DifficultyLevel::new(2).unwrap();
        assert_eq!(
            table.params_for(PuzzleKind::Rotation, lvl2),
            PuzzleParams::Rotation(RotationParams { pin_count: 4, tolerance_degrees: 10.0 })
        );
        assert_eq!(
            table.params_for(PuzzleKind::Cracker, DifficultyLevel::new(3).unwrap()),
            PuzzleParams::Cracker(CrackerParams { digit_count: 5, max_attempts: 7 })
        );
    }

    #[test]
    fn test_json_round_trip_validates() {
        let json = serde_json::to_string(&DifficultyTable::standard()).unwrap();
        let table = DifficultyTable::from_json(&json).unwrap();
        assert_eq!(table.memory[0].pair_count, 3);

        let mut broken = DifficultyTable::standard();
        broken.pattern[4].node_count = 12;
        let json = serde_json::to_string(&broken).unwrap();
        assert!(matches!(
            DifficultyTable::from_json(&json),
            Err(ConfigError::InvalidParams { kind: PuzzleKind::Pattern, level: 5, .. })
        ));
    }

    #[test]
    fn test_level_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<DifficultyLevel>("3").is_ok());
        assert!(serde_json::from_str::<DifficultyLevel>("0").is_err());
    }
}
