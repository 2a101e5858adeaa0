//! Data models for lesson progress

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scheduler::MasterySchedule;

/// Status of a lesson for a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Progress of one user on one lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    #[serde(default)]
    pub status: LessonStatus,
    /// Highest score ever reached (0-100), never decreases
    #[serde(default)]
    pub best_score: u8,
    /// 0-5
    #[serde(default)]
    pub mastery_level: u8,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_review_at: Option<DateTime<Utc>>,
}

/// Mastery before and after an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryChange {
    pub previous: u8,
    pub level: u8,
    pub next_review_at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn new(user_id: Uuid, lesson_id: Uuid) -> Self {
        Self {
            user_id,
            lesson_id,
            status: LessonStatus::NotStarted,
            best_score: 0,
            mastery_level: 0,
            attempts: 0,
            last_attempt_at: None,
            completed_at: None,
            next_review_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == LessonStatus::Completed
    }

    /// Mark the lesson as started; completed lessons stay completed
    pub fn start(&mut self) {
        if self.status == LessonStatus::NotStarted {
            self.status = LessonStatus::InProgress;
        }
    }

    /// Apply a finished attempt
    pub fn record_attempt(
        &mut self,
        schedule: &MasterySchedule,
        score: u8,
        legendary: bool,
        now: DateTime<Utc>,
    ) -> MasteryChange {
        let score = score.min(100);
        let previous = self.mastery_level;
        let level = if legendary {
            schedule.next_level_legendary(score, previous)
        } else {
            schedule.next_level(score, previous)
        };

        self.mastery_level = level;
        self.best_score = self.best_score.max(score);
        self.attempts += 1;
        self.last_attempt_at = Some(now);
        if self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        self.status = LessonStatus::Completed;

        let next_review_at = schedule.next_review_date(level, Some(now), now);
        self.next_review_at = Some(next_review_at);

        if level != previous {
            log::debug!(
                "Mastery of lesson {} for user {}: {} -> {}",
                self.lesson_id,
                self.user_id,
                previous,
                level
            );
        }

        MasteryChange {
            previous,
            level,
            next_review_at,
        }
    }

    /// Check if the lesson is due for review
    pub fn is_due_for_review(&self, now: DateTime<Utc>) -> bool {
        match self.next_review_at {
            Some(due) => self.is_completed() && now >= due,
            None => false,
        }
    }

    /// Mastery after applying decay for the time since the last attempt
    pub fn effective_mastery(&self, schedule: &MasterySchedule, now: DateTime<Utc>) -> u8 {
        match self.last_attempt_at {
            Some(last) => schedule.decay(self.mastery_level, (now - last).num_days().max(0)),
            None => self.mastery_level,
        }
    }
}
