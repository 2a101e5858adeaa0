//! Engine configuration
//!
//! Every rule parameter has a default equal to the constant that existing
//! user data was produced with, so an empty TOML document (or
//! `EngineConfig::default()`) yields the compatible rule set.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hearts::economy::default_refill_interval;
use crate::hearts::HeartEconomy;
use crate::mastery::MasterySchedule;
use crate::streaks::StreakTracker;
use crate::xp::{LevelLadder, XpRules};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Longest accepted heart refill interval (one year)
pub const MAX_REFILL_INTERVAL_MINUTES: i64 = 365 * 24 * 60;

/// Longest accepted review interval (ten years)
pub const MAX_REVIEW_DAYS: i64 = 3650;

/// Highest accepted mastery level
pub const MAX_MASTERY_LEVEL: u8 = u8::MAX - 1;

/// Heart economy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartsConfig {
    pub max_hearts: u32,
    /// Minutes between two regenerated hearts
    pub refill_interval_minutes: i64,
}

impl Default for HeartsConfig {
    fn default() -> Self {
        Self {
            max_hearts: 5,
            refill_interval_minutes: 4 * 60,
        }
    }
}

/// XP bonus parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XpConfig {
    pub perfect_bonus: u32,
    pub daily_goal_bonus: u32,
    pub streak_bonus: u32,
    /// Streak bonus is paid on every multiple of this many days
    pub streak_bonus_every: u32,
    pub review_flat: u32,
    pub legendary_flat: u32,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            perfect_bonus: 5,
            daily_goal_bonus: 5,
            streak_bonus: 2,
            streak_bonus_every: 7,
            review_flat: 5,
            legendary_flat: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelsConfig {
    pub thresholds: Vec<u64>,
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            thresholds: crate::xp::ladder::DEFAULT_THRESHOLDS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MasteryConfig {
    pub max_level: u8,
    /// Review interval in days, indexed by mastery level (last entry repeats)
    pub review_days: Vec<i64>,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            max_level: 5,
            review_days: crate::mastery::scheduler::DEFAULT_REVIEW_DAYS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreaksConfig {
    pub milestones: Vec<u32>,
}

impl Default for StreaksConfig {
    fn default() -> Self {
        Self {
            milestones: crate::streaks::tracker::DEFAULT_MILESTONES.to_vec(),
        }
    }
}

fn default_daily_goal_xp() -> u32 {
    20
}

/// Full rule set of the progression engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub hearts: HeartsConfig,
    #[serde(default)]
    pub xp: XpConfig,
    #[serde(default)]
    pub levels: LevelsConfig,
    #[serde(default)]
    pub mastery: MasteryConfig,
    #[serde(default)]
    pub streaks: StreaksConfig,
    /// XP that has to be earned within one calendar day to reach the daily goal
    #[serde(default = "default_daily_goal_xp")]
    pub daily_goal_xp: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hearts: HeartsConfig::default(),
            xp: XpConfig::default(),
            levels: LevelsConfig::default(),
            mastery: MasteryConfig::default(),
            streaks: StreaksConfig::default(),
            daily_goal_xp: default_daily_goal_xp(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hearts.max_hearts == 0 {
            return Err(ConfigError::Invalid("hearts.maxHearts must be at least 1".into()));
        }
        if !(1..=MAX_REFILL_INTERVAL_MINUTES).contains(&self.hearts.refill_interval_minutes) {
            return Err(ConfigError::Invalid(format!(
                "hearts.refillIntervalMinutes must be between 1 and {}",
                MAX_REFILL_INTERVAL_MINUTES
            )));
        }
        if self.xp.streak_bonus_every == 0 {
            return Err(ConfigError::Invalid("xp.streakBonusEvery must be positive".into()));
        }

        let thresholds = &self.levels.thresholds;
        if thresholds.first() != Some(&0) {
            return Err(ConfigError::Invalid("levels.thresholds must start at 0".into()));
        }
        if thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(
                "levels.thresholds must be strictly ascending".into(),
            ));
        }

        if self.mastery.review_days.is_empty() {
            return Err(ConfigError::Invalid("mastery.reviewDays must not be empty".into()));
        }
        if self
            .mastery
            .review_days
            .iter()
            .any(|d| !(1..=MAX_REVIEW_DAYS).contains(d))
        {
            return Err(ConfigError::Invalid(format!(
                "mastery.reviewDays must be between 1 and {}",
                MAX_REVIEW_DAYS
            )));
        }
        if !(1..=MAX_MASTERY_LEVEL).contains(&self.mastery.max_level) {
            return Err(ConfigError::Invalid(format!(
                "mastery.maxLevel must be between 1 and {}",
                MAX_MASTERY_LEVEL
            )));
        }

        Ok(())
    }

    pub fn heart_economy(&self) -> HeartEconomy {
        // Unvalidated values fall back to the default interval
        let refill_interval = Duration::try_minutes(self.hearts.refill_interval_minutes)
            .filter(|d| *d > Duration::zero() && d.num_minutes() <= MAX_REFILL_INTERVAL_MINUTES)
            .unwrap_or_else(default_refill_interval);
        HeartEconomy::new(self.hearts.max_hearts, refill_interval)
    }

    pub fn xp_rules(&self) -> XpRules {
        XpRules::from(&self.xp)
    }

    pub fn level_ladder(&self) -> LevelLadder {
        LevelLadder::new(self.levels.thresholds.clone())
    }

    pub fn mastery_schedule(&self) -> MasterySchedule {
        MasterySchedule::new(self.mastery.max_level, self.mastery.review_days.clone())
    }

    pub fn streak_tracker(&self) -> StreakTracker {
        StreakTracker::new(self.streaks.milestones.clone())
    }
}
