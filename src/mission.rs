//! Mission descriptors and the built-in London catalog
//!
//! A mission is a building to break into: an ordered list of puzzle layers,
//! a reward range and the loot recovered. Missions unlock in a chain via
//! `requires_complete`; side quests are single-layer jobs that appear once a
//! given mission is done.

use std::collections::HashSet;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::progress::Perk;
use crate::tables::{DifficultyLevel, PuzzleKind};

/// One puzzle layer of a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    #[serde(rename = "type")]
    pub kind: PuzzleKind,
    pub difficulty: DifficultyLevel,
}

impl LayerSpec {
    pub fn new(kind: PuzzleKind, level: u8) -> Result<Self, ConfigError> {
        Ok(Self { kind, difficulty: DifficultyLevel::new(level)? })
    }
}

/// Inclusive-exclusive money range `[min, max)`; `min == max` pays exactly `min`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub min: u32,
    pub max: u32,
}

impl Reward {
    /// `min + floor(u * (max - min))` for a uniform `u` in [0, 1)
    pub fn roll<R: Rng>(&self, rng: &mut R) -> u32 {
        if self.max <= self.min {
            return self.min;
        }
        let u: f64 = rng.random();
        self.min + (u * f64::from(self.max - self.min)).floor() as u32
    }
}

/// What gets carried out of the building
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loot {
    pub name: String,
    pub icon: String,
}

/// Market value of a loot icon, when it has one
pub fn loot_value(icon: &str) -> Option<Reward> {
    let (min, max) = match icon {
        "artifact" => (100, 200),
        "ring" => (150, 300),
        "document" => (200, 500),
        "files" => (250, 600),
        "painting" => (500, 800),
        "drive" => (600, 1000),
        "list" => (800, 1500),
        "masterfiles" => (2000, 3000),
        _ => return None,
    };
    Some(Reward { min, max })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub puzzle_layers: Vec<LayerSpec>,
    pub reward: Reward,
    #[serde(default)]
    pub loot: Option<Loot>,
    /// Mission that must be completed before this one unlocks
    #[serde(default)]
    pub requires_complete: Option<String>,
}

impl Mission {
    pub fn new(id: &str, name: &str, puzzle_layers: Vec<LayerSpec>, reward: Reward) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            puzzle_layers,
            reward,
            loot: None,
            requires_complete: None,
        }
    }

    /// Range the payout is rolled from: the loot's market value, else the
    /// mission's own reward range
    pub fn payout_range(&self) -> Reward {
        self.loot
            .as_ref()
            .and_then(|loot| loot_value(&loot.icon))
            .unwrap_or(self.reward)
    }

    pub fn roll_payout<R: Rng>(&self, rng: &mut R) -> u32 {
        self.payout_range().roll(rng)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.puzzle_layers.is_empty() {
            return Err(ConfigError::EmptyMission(self.id.clone()));
        }
        if self.reward.min > self.reward.max {
            return Err(ConfigError::RewardRange {
                id: self.id.clone(),
                min: self.reward.min,
                max: self.reward.max,
            });
        }
        Ok(())
    }
}

/// A single-puzzle favour that grants money and a perk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideQuest {
    pub id: String,
    pub name: String,
    /// Mission whose completion makes this quest appear
    pub appears_after: String,
    pub puzzle: LayerSpec,
    pub reward_money: u32,
    pub perk: Perk,
}

impl SideQuest {
    /// The quest as a one-layer mission for `HeistRun`
    pub fn as_mission(&self) -> Mission {
        Mission {
            loot: Some(Loot { name: "Gratitude".into(), icon: "karma".into() }),
            ..Mission::new(
                &self.id,
                &self.name,
                vec![self.puzzle],
                Reward { min: self.reward_money, max: self.reward_money },
            )
        }
    }
}

/// Every mission and side quest of a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionCatalog {
    pub city: String,
    pub missions: Vec<Mission>,
    #[serde(default)]
    pub side_quests: Vec<SideQuest>,
}

impl MissionCatalog {
    /// Load and validate a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        log::info!(
            "Loaded catalog {}: {} missions, {} side quests",
            catalog.city,
            catalog.missions.len(),
            catalog.side_quests.len()
        );
        Ok(catalog)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Ids are unique across missions and side quests, and every unlock
    /// reference points at a known mission
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::new();
        for mission in &self.missions {
            mission.validate()?;
            if !ids.insert(mission.id.as_str()) {
                return Err(ConfigError::DuplicateMission(mission.id.clone()));
            }
        }
        for quest in &self.side_quests {
            if !ids.insert(quest.id.as_str()) {
                return Err(ConfigError::DuplicateMission(quest.id.clone()));
            }
        }

        let known = |id: &str| self.missions.iter().any(|m| m.id == id);
        for mission in &self.missions {
            if let Some(required) = &mission.requires_complete {
                if !known(required) {
                    return Err(ConfigError::UnknownRequirement {
                        mission: mission.id.clone(),
                        required: required.clone(),
                    });
                }
            }
        }
        for quest in &self.side_quests {
            if !known(&quest.appears_after) {
                return Err(ConfigError::UnknownRequirement {
                    mission: quest.id.clone(),
                    required: quest.appears_after.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.id == id)
    }

    pub fn side_quest(&self, id: &str) -> Option<&SideQuest> {
        self.side_quests.iter().find(|q| q.id == id)
    }

    /// Whether a mission can be played given the completed mission ids
    pub fn is_unlocked(&self, id: &str, completed: &[String]) -> bool {
        match self.get(id) {
            Some(mission) => match &mission.requires_complete {
                Some(required) => completed.iter().any(|c| c == required),
                None => true,
            },
            None => false,
        }
    }

    /// Unlocked missions not yet completed, in catalog order
    pub fn available_missions<'a>(&'a self, completed: &'a [String]) -> impl Iterator<Item = &'a Mission> + 'a {
        self.missions
            .iter()
            .filter(move |m| !completed.contains(&m.id) && self.is_unlocked(&m.id, completed))
    }

    /// Side quests that have appeared and are not yet done
    pub fn visible_side_quests<'a>(
        &'a self,
        completed_missions: &'a [String],
        completed_quests: &'a [String],
    ) -> impl Iterator<Item = &'a SideQuest> + 'a {
        self.side_quests.iter().filter(move |q| {
            completed_missions.contains(&q.appears_after) && !completed_quests.contains(&q.id)
        })
    }

    /// London: ten buildings and two side quests
    pub fn london() -> Result<Self, ConfigError> {
        use PuzzleKind::*;

        let building = |id: &str,
                        name: &str,
                        description: &str,
                        (min, max): (u32, u32),
                        (loot, icon): (&str, &str),
                        layers: &[(PuzzleKind, u8)],
                        requires: Option<&str>|
         -> Result<Mission, ConfigError> {
            let layers = layers
                .iter()
                .map(|&(kind, level)| LayerSpec::new(kind, level))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Mission {
                description: description.to_string(),
                loot: Some(Loot { name: loot.to_string(), icon: icon.to_string() }),
                requires_complete: requires.map(str::to_string),
                ..Mission::new(id, name, layers, Reward { min, max })
            })
        };

        let missions = vec![
            building(
                "museum_storage",
                "Hargrove Museum",
                "Recover stolen colonial artifacts",
                (100, 200),
                ("Ancient Artifacts", "artifact"),
                &[(Slider, 1)],
                None,
            )?,
            building(
                "jeweler_safe",
                "Finch's Jewelry",
                "Return Mrs. Whitmore's stolen ring",
                (150, 300),
                ("Wedding Ring", "ring"),
                &[(Rotation, 1)],
                Some("museum_storage"),
            )?,
            building(
                "bank_vault",
                "Meridian Bank",
                "Expose the bank's laundering ledgers",
                (300, 500),
                ("Financial Ledgers", "document"),
                &[(Slider, 2), (Rotation, 1)],
                Some("jeweler_safe"),
            )?,
            building(
                "mansion_study",
                "Ashcroft Manor",
                "Take back the blackmail files",
                (350, 600),
                ("Blackmail Files", "files"),
                &[(Memory, 1), (Slider, 2)],
                Some("bank_vault"),
            )?,
            building(
                "warehouse_office",
                "Greystone Warehouse",
                "Find the buried environmental reports",
                (300, 550),
                ("Environmental Reports", "document"),
                &[(Pattern, 1), (Rotation, 2)],
                Some("mansion_study"),
            )?,
            building(
                "gallery_vault",
                "Pemberton Gallery",
                "Recover the looted Rosenberg paintings",
                (500, 800),
                ("Rosenberg Paintings", "painting"),
                &[(Slider, 2), (Memory, 2), (Cracker, 1)],
                Some("warehouse_office"),
            )?,
            building(
                "hotel_penthouse",
                "Grand Regent Hotel",
                "Lift the encrypted drive from the penthouse safe",
                (600, 1000),
                ("Encrypted Hard Drive", "drive"),
                &[(Rotation, 2), (Pattern, 2), (Cracker, 1)],
                Some("gallery_vault"),
            )?,
            building(
                "courthouse_records",
                "Fleet St. Courthouse",
                "Copy the sealed bribery records",
                (800, 1200),
                ("Bribery Records", "document"),
                &[(Cracker, 2), (Memory, 2), (Slider, 3)],
                Some("hotel_penthouse"),
            )?,
            building(
                "embassy_safe",
                "Karovian Embassy",
                "Save the whistleblowers before the list is sold",
                (1000, 1500),
                ("Whistleblower List", "list"),
                &[(Pattern, 3), (Rotation, 3), (Cracker, 2), (Memory, 2)],
                Some("courthouse_records"),
            )?,
            building(
                "tower_vault",
                "Blackmore Tower",
                "Bring down the man behind it all",
                (2000, 3000),
                ("Master Network Files", "masterfiles"),
                &[(Slider, 3), (Rotation, 3), (Memory, 3), (Pattern, 3), (Cracker, 3)],
                Some("embassy_safe"),
            )?,
        ];

        let side_quests = vec![
            SideQuest {
                id: "crying_lady".into(),
                name: "Lady Pemberton".into(),
                appears_after: "jeweler_safe".into(),
                puzzle: LayerSpec::new(Rotation, 1)?,
                reward_money: 50,
                perk: Perk::GoodKarma,
            },
            SideQuest {
                id: "shady_merchant".into(),
                name: "The Broker".into(),
                appears_after: "warehouse_office".into(),
                puzzle: LayerSpec::new(Slider, 2)?,
                reward_money: 100,
                perk: Perk::FreeDynamite,
            },
        ];

        let catalog = Self { city: "London".into(), missions, side_quests };
        catalog.validate()?;
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn done(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_london_catalog_is_valid() {
        let catalog = MissionCatalog::london().unwrap();
        catalog.validate().unwrap();
        assert_eq!(catalog.missions.len(), 10);
        assert_eq!(catalog.side_quests.len(), 2);
        assert_eq!(catalog.get("tower_vault").unwrap().puzzle_layers.len(), 5);
    }

    #[test]
    fn test_unlock_chain() {
        let catalog = MissionCatalog::london().unwrap();
        let none = done(&[]);
        let ids: Vec<_> = catalog.available_missions(&none).map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["museum_storage"]);

        let some = done(&["museum_storage"]);
        assert!(catalog.is_unlocked("jeweler_safe", &some));
        assert!(!catalog.is_unlocked("bank_vault", &some));
        let ids: Vec<_> = catalog.available_missions(&some).map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["jeweler_safe"]);

        assert!(!catalog.is_unlocked("nowhere", &some));
    }

    #[test]
    fn test_side_quests_appear_after_mission() {
        let catalog = MissionCatalog::london().unwrap();
        let missions = done(&["museum_storage", "jeweler_safe"]);
        let quests = done(&[]);
        let visible: Vec<_> = catalog.visible_side_quests(&missions, &quests).map(|q| q.id.as_str()).collect();
        assert_eq!(visible, vec!["crying_lady"]);

        let quests = done(&["crying_lady"]);
        assert_eq!(catalog.visible_side_quests(&missions, &quests).count(), 0);
    }

    #[test]
    fn test_side_quest_runs_as_single_layer() {
        let catalog = MissionCatalog::london().unwrap();
        let mission = catalog.side_quest("shady_merchant").unwrap().as_mission();
        assert_eq!(mission.puzzle_layers, vec![LayerSpec::new(PuzzleKind::Slider, 2).unwrap()]);
        assert_eq!(mission.payout_range(), Reward { min: 100, max: 100 });
    }

    #[test]
    fn test_reward_roll_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(3);
        let reward = Reward { min: 100, max: 200 };
        for _ in 0..200 {
            let value = reward.roll(&mut rng);
            assert!((100..200).contains(&value));
        }
        assert_eq!(Reward { min: 50, max: 50 }.roll(&mut rng), 50);
    }

    #[test]
    fn test_payout_uses_loot_value() {
        let catalog = MissionCatalog::london().unwrap();
        let embassy = catalog.get("embassy_safe").unwrap();
        assert_eq!(embassy.payout_range(), Reward { min: 800, max: 1500 });

        let mut plain = embassy.clone();
        plain.loot = Some(Loot { name: "Mystery".into(), icon: "unknown".into() });
        assert_eq!(plain.payout_range(), plain.reward);
    }

    #[test]
    fn test_json_catalog_round_trip_and_validation() {
        let json = r#"{
            "city": "Test",
            "missions": [
                { "id": "a", "name": "A", "puzzle_layers": [{ "type": "slider", "difficulty": 1 }],
                  "reward": { "min": 10, "max": 20 } },
                { "id": "b", "name": "B", "puzzle_layers": [{ "type": "cracker", "difficulty": 2 }],
                  "reward": { "min": 10, "max": 20 }, "requires_complete": "a" }
            ]
        }"#;
        let catalog = MissionCatalog::from_json(json).unwrap();
        assert_eq!(catalog.get("b").unwrap().puzzle_layers[0].kind, PuzzleKind::Cracker);

        let bad_level = json.replace(r#""difficulty": 2"#, r#""difficulty": 9"#);
        assert!(matches!(MissionCatalog::from_json(&bad_level), Err(ConfigError::Json(_))));

        let bad_ref = json.replace(r#""requires_complete": "a""#, r#""requires_complete": "zz""#);
        assert!(matches!(
            MissionCatalog::from_json(&bad_ref),
            Err(ConfigError::UnknownRequirement { .. })
        ));

        let empty = json.replace(r#"[{ "type": "slider", "difficulty": 1 }]"#, "[]");
        assert!(matches!(MissionCatalog::from_json(&empty), Err(ConfigError::EmptyMission(_))));
    }

    #[test]
    fn test_layer_level_out_of_range_is_an_error() {
        assert!(matches!(
            LayerSpec::new(PuzzleKind::Slider, 6),
            Err(ConfigError::LevelOutOfRange(6))
        ));
        assert!(matches!(LayerSpec::new(PuzzleKind::Memory, 0), Err(ConfigError::LevelOutOfRange(0))));
        assert_eq!(LayerSpec::new(PuzzleKind::Memory, 5).unwrap().difficulty.get(), 5);
    }

    #[test]
    fn test_london_layers_match_catalog_levels() {
        let catalog = MissionCatalog::london().unwrap();
        let tower = catalog.get("tower_vault").unwrap();
        assert!(tower.puzzle_layers.iter().all(|l| l.difficulty.get() == 3));
        let levels: Vec<u8> = catalog
            .missions
            .iter()
            .flat_map(|m| m.puzzle_layers.iter().map(|l| l.difficulty.get()))
            .collect();
        assert_eq!(levels.iter().copied().max(), Some(3));
        assert_eq!(levels.iter().copied().min(), Some(1));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut catalog = MissionCatalog::london().unwrap();
        let copy = catalog.missions[0].clone();
        catalog.missions.push(copy);
        assert!(matches!(catalog.validate(), Err(ConfigError::DuplicateMission(_))));
    }
}
