//! Player progress: money, tools, perks, loot and lifetime stats
//!
//! Persisted as JSON. Missing fields fall back to a fresh save, so older
//! saves keep loading as fields are added.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ProgressError};
use crate::mission::{Mission, SideQuest};
use crate::tables::{PlayerTools, ToolKind, ToolState};

/// Save format version
pub const SAVE_VERSION: u32 = 1;

/// Share of a collected reward the loot sells for
const SELL_FRACTION: f64 = 0.5;

/// Percent off the next purchase while `GoodKarma` is held
const GOOD_KARMA_DISCOUNT_PERCENT: u32 = 10;

/// Side-quest rewards beyond money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perk {
    /// Next shop purchase is 10% cheaper
    GoodKarma,
    /// One dynamite charge, granted immediately
    FreeDynamite,
}

/// Loot carried home from a mission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootItem {
    pub name: String,
    pub icon: String,
    /// Mission it came from
    pub source: String,
    /// What the shop pays for it
    pub value: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub puzzles_solved: u32,
    pub missions_completed: u32,
    pub total_earnings: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProgress {
    pub version: u32,
    pub money: u32,
    pub completed_missions: Vec<String>,
    pub completed_side_quests: Vec<String>,
    pub tools: PlayerTools,
    pub perks: BTreeSet<Perk>,
    pub inventory: Vec<LootItem>,
    pub stats: Stats,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            money: 0,
            completed_missions: Vec::new(),
            completed_side_quests: Vec::new(),
            tools: PlayerTools::default(),
            perks: BTreeSet::new(),
            inventory: Vec::new(),
            stats: Stats::default(),
        }
    }
}

impl PlayerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut progress: Self = serde_json::from_str(json)?;
        if progress.version < SAVE_VERSION {
            log::info!("Migrating save from version {}", progress.version);
            progress.version = SAVE_VERSION;
        }
        Ok(progress)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a save, starting fresh when the file does not exist yet
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No save at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let progress = Self::from_json(&json)?;
        log::info!(
            "Loaded save: ${}, {} missions done",
            progress.money,
            progress.completed_missions.len()
        );
        Ok(progress)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn has_completed(&self, mission_id: &str) -> bool {
        self.completed_missions.iter().any(|id| id == mission_id)
    }

    pub fn has_perk(&self, perk: Perk) -> bool {
        self.perks.contains(&perk)
    }

    /// Count layers solved during a heist
    pub fn record_puzzles_solved(&mut self, count: u32) {
        self.stats.puzzles_solved += count;
    }

    /// Mark a mission done. Replays count toward stats but are not listed twice.
    pub fn record_mission_complete(&mut self, mission: &Mission) {
        if !self.has_completed(&mission.id) {
            self.completed_missions.push(mission.id.clone());
        }
        self.stats.missions_completed += 1;
    }

    /// Bank a rolled payout (doubled on request) and file the loot, which
    /// sells for half of what was collected. Returns the amount collected.
    pub fn collect_reward(&mut self, mission: &Mission, amount: u32, doubled: bool) -> u32 {
        let amount = if doubled { amount.saturating_mul(2) } else { amount };
        self.money = self.money.saturating_add(amount);
        self.stats.total_earnings += u64::from(amount);

        if let Some(loot) = &mission.loot {
            self.inventory.push(LootItem {
                name: loot.name.clone(),
                icon: loot.icon.clone(),
                source: mission.name.clone(),
                value: (f64::from(amount) * SELL_FRACTION).floor() as u32,
            });
        }
        log::info!("Collected ${} from {}", amount, mission.name);
        amount
    }

    /// Sell one inventory item, returning what it fetched
    pub fn sell_loot(&mut self, index: usize) -> Option<u32> {
        if index >= self.inventory.len() {
            return None;
        }
        let item = self.inventory.remove(index);
        self.money = self.money.saturating_add(item.value);
        Some(item.value)
    }

    /// Pay out a finished side quest and apply its perk
    pub fn complete_side_quest(&mut self, quest: &SideQuest) {
        self.money = self.money.saturating_add(quest.reward_money);
        match quest.perk {
            Perk::GoodKarma => {
                self.perks.insert(Perk::GoodKarma);
            }
            Perk::FreeDynamite => {
                let dynamite = self.tools.get_mut(ToolKind::Dynamite);
                dynamite.owned = true;
                dynamite.quantity += 1;
            }
        }
        if !self.completed_side_quests.iter().any(|id| *id == quest.id) {
            self.completed_side_quests.push(quest.id.clone());
        }
        log::info!("Side quest {} done, perk {:?}", quest.id, quest.perk);
    }

    /// Spend one dynamite charge to blow a layer open
    pub fn use_skip_charge(&mut self) -> Result<u32, ProgressError> {
        let tool = ToolKind::Dynamite;
        let dynamite = self.tools.get_mut(tool);
        if !dynamite.owned || dynamite.quantity == 0 {
            return Err(ProgressError::NoCharges(tool.id()));
        }
        dynamite.quantity -= 1;
        Ok(dynamite.quantity)
    }

    // === Shop ===

    /// Shop price after any held discount
    pub fn price_of(&self, base: u32) -> u32 {
        if self.has_perk(Perk::GoodKarma) {
            base * (100 - GOOD_KARMA_DISCOUNT_PERCENT) / 100
        } else {
            base
        }
    }

    fn charge(&mut self, base: u32) -> Result<u32, ProgressError> {
        let price = self.price_of(base);
        if self.money < price {
            return Err(ProgressError::InsufficientFunds { needed: price, available: self.money });
        }
        self.money -= price;
        // The discount covers a single purchase
        self.perks.remove(&Perk::GoodKarma);
        Ok(price)
    }

    /// Buy a tool at level 1, or one more charge of a consumable.
    /// Returns the price paid.
    pub fn buy_tool(&mut self, tool: ToolKind) -> Result<u32, ProgressError> {
        let spec = tool.spec();
        let state = self.tools.get(tool);
        if !spec.is_consumable() && state.owned {
            return Err(ProgressError::AlreadyOwned(tool.id()));
        }
        let price = self.charge(spec.price)?;

        if spec.is_consumable() {
            let entry = self.tools.get_mut(tool);
            entry.owned = true;
            entry.quantity += 1;
        } else {
            self.tools.set(tool, ToolState::owned_at(1));
        }
        log::info!("Bought {} for ${}", spec.name, price);
        Ok(price)
    }

    /// Raise an owned tool one level. Returns the cost paid.
    pub fn upgrade_tool(&mut self, tool: ToolKind) -> Result<u32, ProgressError> {
        let spec = tool.spec();
        if spec.is_consumable() {
            return Err(ProgressError::NotUpgradable(tool.id()));
        }
        let state = self.tools.get(tool);
        if !state.owned {
            return Err(ProgressError::NotOwned(tool.id()));
        }
        if state.level >= spec.max_level() {
            return Err(ProgressError::MaxLevel(tool.id()));
        }
        let cost = spec
            .upgrade_costs
            .get(usize::from(state.level.max(1) - 1))
            .copied()
            .ok_or(ProgressError::MaxLevel(tool.id()))?;
        if self.money < cost {
            return Err(ProgressError::InsufficientFunds { needed: cost, available: self.money });
        }
        self.money -= cost;
        self.tools.get_mut(tool).level = state.level + 1;
        log::info!("Upgraded {} to level {}", spec.name, state.level + 1);
        Ok(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::MissionCatalog;

    fn rich(money: u32) -> PlayerProgress {
        PlayerProgress { money, ..PlayerProgress::new() }
    }

    #[test]
    fn test_fresh_save_defaults() {
        let p = PlayerProgress::new();
        assert_eq!(p.money, 0);
        assert_eq!(p.tools.get(ToolKind::BasicPick), ToolState::owned_at(1));
        assert!(!p.tools.get(ToolKind::Dynamite).owned);
        assert_eq!(p.stats, Stats::default());
    }

    #[test]
    fn test_mission_completion_and_reward() {
        let catalog = MissionCatalog::london().unwrap();
        let museum = catalog.get("museum_storage").unwrap();
        let mut p = PlayerProgress::new();

        p.record_mission_complete(museum);
        p.record_mission_complete(museum);
        assert_eq!(p.completed_missions, vec!["museum_storage".to_string()]);
        assert_eq!(p.stats.missions_completed, 2);

        assert_eq!(p.collect_reward(museum, 151, true), 302);
        assert_eq!(p.money, 302);
        assert_eq!(p.stats.total_earnings, 302);
        assert_eq!(p.inventory[0].value, 151);
        assert_eq!(p.inventory[0].source, "Hargrove Museum");

        assert_eq!(p.sell_loot(0), Some(151));
        assert_eq!(p.money, 453);
        assert!(p.inventory.is_empty());
        assert_eq!(p.sell_loot(0), None);
    }

    #[test]
    fn test_side_quest_perks() {
        let catalog = MissionCatalog::london().unwrap();
        let mut p = PlayerProgress::new();

        p.complete_side_quest(catalog.side_quest("shady_merchant").unwrap());
        assert_eq!(p.money, 100);
        assert_eq!(p.tools.charges(ToolKind::Dynamite), 1);

        p.complete_side_quest(catalog.side_quest("crying_lady").unwrap());
        assert!(p.has_perk(Perk::GoodKarma));
        assert_eq!(p.completed_side_quests.len(), 2);
    }

    #[test]
    fn test_good_karma_discounts_one_purchase() {
        let mut p = rich(1000);
        p.perks.insert(Perk::GoodKarma);
        assert_eq!(p.buy_tool(ToolKind::Decoder), Ok(270));
        assert!(!p.has_perk(Perk::GoodKarma));
        assert_eq!(p.buy_tool(ToolKind::Stethoscope), Ok(250));
        assert_eq!(p.money, 480);
    }

    #[test]
    fn test_buy_and_upgrade_rules() {
        let mut p = rich(200);
        assert_eq!(p.buy_tool(ToolKind::BasicPick), Err(ProgressError::AlreadyOwned("basic_pick")));
        assert_eq!(
            p.buy_tool(ToolKind::Decoder),
            Err(ProgressError::InsufficientFunds { needed: 300, available: 200 })
        );
        assert_eq!(p.upgrade_tool(ToolKind::Decoder), Err(ProgressError::NotOwned("decoder")));
        assert_eq!(p.upgrade_tool(ToolKind::Dynamite), Err(ProgressError::NotUpgradable("dynamite")));

        p.money = 700;
        assert_eq!(p.upgrade_tool(ToolKind::BasicPick), Ok(200));
        assert_eq!(p.upgrade_tool(ToolKind::BasicPick), Ok(500));
        assert_eq!(p.tools.get(ToolKind::BasicPick).level, 3);
        assert_eq!(p.upgrade_tool(ToolKind::BasicPick), Err(ProgressError::MaxLevel("basic_pick")));
        assert_eq!(p.money, 0);
    }

    #[test]
    fn test_dynamite_charges() {
        let mut p = rich(1000);
        assert_eq!(p.use_skip_charge(), Err(ProgressError::NoCharges("dynamite")));
        p.buy_tool(ToolKind::Dynamite).unwrap();
        p.buy_tool(ToolKind::Dynamite).unwrap();
        assert_eq!(p.use_skip_charge(), Ok(1));
        assert_eq!(p.use_skip_charge(), Ok(0));
        assert!(p.use_skip_charge().is_err());
    }

    #[test]
    fn test_partial_save_fills_defaults() {
        let p = PlayerProgress::from_json(r#"{ "money": 75, "completed_missions": ["museum_storage"] }"#).unwrap();
        assert_eq!(p.money, 75);
        assert!(p.has_completed("museum_storage"));
        assert_eq!(p.tools.active_level(ToolKind::BasicPick), 1);

        let back = PlayerProgress::from_json(&p.to_json().unwrap()).unwrap();
        assert_eq!(back, p);
    }
}
