//! Streak data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tracker::StreakTracker;

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Persisted streak state of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Instant of the last qualifying activity; the calendar day is derived
    /// from it in `timezone` at comparison time
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    /// IANA timezone name (e.g. "Europe/Oslo")
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for StreakState {
    fn default() -> Self {
        Self::new(default_timezone())
    }
}

impl StreakState {
    pub fn new(timezone: String) -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            last_active_at: None,
            timezone,
        }
    }

    /// Register activity at `now`, keeping `longest_streak >= current_streak`
    pub fn apply(&mut self, tracker: &StreakTracker, now: DateTime<Utc>) -> StreakUpdate {
        let update = tracker.update(self.last_active_at, self.current_streak, &self.timezone, now);

        self.current_streak = update.current_streak;
        self.last_active_at = update.last_active_at;
        self.longest_streak = self.longest_streak.max(self.current_streak);

        update
    }
}

/// Result of a streak update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakUpdate {
    pub current_streak: u32,
    pub should_increment: bool,
    pub should_reset: bool,
    pub last_active_at: Option<DateTime<Utc>>,
    /// Set when this update moved the streak onto a milestone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u32>,
}
