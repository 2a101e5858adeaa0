//! Persisted per-user progression state

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hearts::HeartState;
use crate::mastery::ProgressRecord;
use crate::streaks::{DailyGoalState, StreakState};

/// Everything the engine needs to know about one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: Uuid,
    pub hearts: HeartState,
    pub streak: StreakState,
    /// Never decreases; the level is derived from it
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default)]
    pub daily_goal: DailyGoalState,
    /// Keyed by lesson id
    #[serde(default)]
    pub progress: BTreeMap<Uuid, ProgressRecord>,
    /// Incremented on every save
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: Uuid, max_hearts: u32, timezone: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            hearts: HeartState::full(max_hearts),
            streak: StreakState::new(timezone),
            total_xp: 0,
            daily_goal: DailyGoalState::default(),
            progress: BTreeMap::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Progress record for a lesson, created as not started if missing
    pub fn progress_mut(&mut self, lesson_id: Uuid) -> &mut ProgressRecord {
        let user_id = self.user_id;
        self.progress
            .entry(lesson_id)
            .or_insert_with(|| ProgressRecord::new(user_id, lesson_id))
    }

    pub fn progress_records(&self) -> Vec<ProgressRecord> {
        self.progress.values().cloned().collect()
    }

    /// Lessons due for review at `now`, most overdue first
    pub fn due_reviews(&self, now: DateTime<Utc>) -> Vec<&ProgressRecord> {
        let mut due: Vec<&ProgressRecord> = self
            .progress
            .values()
            .filter(|p| p.is_due_for_review(now))
            .collect();
        due.sort_by_key(|p| p.next_review_at);
        due
    }
}
