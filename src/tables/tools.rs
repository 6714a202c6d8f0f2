//! Player tools and the bonuses they grant to puzzle engines

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Every tool the player can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    BasicPick,
    TensionWrench,
    Decoder,
    Stethoscope,
    Blueprint,
    /// Consumable: skips one puzzle layer
    Dynamite,
}

/// Which bonus field a tool feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusField {
    Slowdown,
    ExtraTolerance,
    RevealDigits,
    ExtraShowTime,
}

/// Static shop data for a tool
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub price: u32,
    /// Cost to go from level n+1 to n+2 (index 0 upgrades level 1 -> 2)
    pub upgrade_costs: &'static [u32],
    /// Effect per level (index 0 = level 1). Empty for consumables.
    pub effect_values: &'static [f32],
    pub bonus: Option<BonusField>,
}

impl ToolSpec {
    pub fn max_level(&self) -> u8 {
        self.effect_values.len() as u8
    }

    pub fn is_consumable(&self) -> bool {
        self.bonus.is_none()
    }

    /// Effect at a level, clamped to the highest defined level
    pub fn effect_at(&self, level: u8) -> f32 {
        if level == 0 || self.effect_values.is_empty() {
            return 0.0;
        }
        let i = usize::from(level.min(self.max_level())) - 1;
        self.effect_values[i]
    }
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::BasicPick,
        ToolKind::TensionWrench,
        ToolKind::Decoder,
        ToolKind::Stethoscope,
        ToolKind::Blueprint,
        ToolKind::Dynamite,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ToolKind::BasicPick => "basic_pick",
            ToolKind::TensionWrench => "tension_wrench",
            ToolKind::Decoder => "decoder",
            ToolKind::Stethoscope => "stethoscope",
            ToolKind::Blueprint => "blueprint",
            ToolKind::Dynamite => "dynamite",
        }
    }

    pub fn spec(&self) -> ToolSpec {
        match self {
            ToolKind::BasicPick => ToolSpec {
                name: "Basic Lock Pick",
                price: 0,
                upgrade_costs: &[200, 500],
                effect_values: &[0.1, 0.2, 0.3],
                bonus: Some(BonusField::Slowdown),
            },
            ToolKind::TensionWrench => ToolSpec {
                name: "Tension Wrench Set",
                price: 150,
                upgrade_costs: &[300, 600],
                effect_values: &[5.0, 10.0, 15.0],
                bonus: Some(BonusField::ExtraTolerance),
            },
            ToolKind::Decoder => ToolSpec {
                name: "Electronic Decoder",
                price: 300,
                upgrade_costs: &[500, 1000],
                effect_values: &[1.0, 2.0, 3.0],
                bonus: Some(BonusField::RevealDigits),
            },
            // Show-time effects are in seconds
            ToolKind::Stethoscope => ToolSpec {
                name: "Safe Stethoscope",
                price: 250,
                upgrade_costs: &[400, 800],
                effect_values: &[0.5, 1.0, 1.5],
                bonus: Some(BonusField::ExtraShowTime),
            },
            ToolKind::Blueprint => ToolSpec {
                name: "Blueprint Scanner",
                price: 350,
                upgrade_costs: &[600, 1200],
                effect_values: &[1.0, 2.0, 3.0],
                bonus: Some(BonusField::ExtraShowTime),
            },
            ToolKind::Dynamite => ToolSpec {
                name: "Micro Charge",
                price: 500,
                upgrade_costs: &[],
                effect_values: &[],
                bonus: None,
            },
        }
    }
}

/// Ownership state of one tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolState {
    pub owned: bool,
    #[serde(default)]
    pub level: u8,
    /// Remaining charges for consumables
    #[serde(default)]
    pub quantity: u32,
}

impl ToolState {
    pub fn owned_at(level: u8) -> Self {
        Self { owned: true, level, quantity: 0 }
    }
}

/// The player's tool inventory. Missing entries read as unowned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerTools {
    tools: BTreeMap<ToolKind, ToolState>,
}

impl Default for PlayerTools {
    /// New players start with a level-1 basic pick
    fn default() -> Self {
        let mut tools = Self::empty();
        tools.set(ToolKind::BasicPick, ToolState::owned_at(1));
        tools
    }
}

impl PlayerTools {
    pub fn empty() -> Self {
        Self { tools: BTreeMap::new() }
    }

    pub fn get(&self, kind: ToolKind) -> ToolState {
        self.tools.get(&kind).copied().unwrap_or_default()
    }

    pub fn set(&mut self, kind: ToolKind, state: ToolState) {
        self.tools.insert(kind, state);
    }

    pub fn get_mut(&mut self, kind: ToolKind) -> &mut ToolState {
        self.tools.entry(kind).or_default()
    }

    /// Active level of a passive tool (0 when unowned)
    pub fn active_level(&self, kind: ToolKind) -> u8 {
        let state = self.get(kind);
        if state.owned { state.level } else { 0 }
    }

    pub fn charges(&self, kind: ToolKind) -> u32 {
        let state = self.get(kind);
        if state.owned { state.quantity } else { 0 }
    }
}

/// Modifiers handed to every puzzle engine for one heist.
/// All zero means no bonus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolBonusSet {
    /// Fraction of slider speed removed, in [0, 1)
    pub slowdown_fraction: f32,
    /// Added to the rotation acceptance window
    pub extra_tolerance_degrees: f32,
    /// Cracker digits shown as hints
    pub revealed_digit_count: u8,
    /// Added to memory/pattern reveal duration
    pub extra_show_time_ms: u32,
}

/// Compute the bonus set for a heist from the player's tools
pub fn compute_bonuses(tools: &PlayerTools) -> ToolBonusSet {
    let mut bonuses = ToolBonusSet::default();

    for kind in ToolKind::ALL {
        let level = tools.active_level(kind);
        if level == 0 {
            continue;
        }
        let spec = kind.spec();
        let value = spec.effect_at(level);
        match spec.bonus {
            Some(BonusField::Slowdown) => {
                bonuses.slowdown_fraction = value.clamp(0.0, 0.95);
            }
            Some(BonusField::ExtraTolerance) => {
                bonuses.extra_tolerance_degrees = value.max(0.0);
            }
            Some(BonusField::RevealDigits) => {
                bonuses.revealed_digit_count = value.max(0.0) as u8;
            }
            Some(BonusField::ExtraShowTime) => {
                // Stethoscope and blueprint stack
                let ms = (value.max(0.0) * 1000.0).round() as u32;
                bonuses.extra_show_time_ms = bonuses.extra_show_time_ms.saturating_add(ms);
            }
            None => {}
        }
    }

    log::debug!("Tool bonuses: {:?}", bonuses);
    bonuses
}
