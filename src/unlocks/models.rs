//! Data models for card unlocking

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::Lesson;
use crate::mastery::ProgressRecord;

/// Condition type tags understood by the engine
pub const KNOWN_CONDITION_TYPES: [&str; 8] = [
    "first_lesson",
    "chapter_complete",
    "perfect_quiz",
    "streak",
    "xp_threshold",
    "level_up",
    "daily_goal",
    "lesson_count",
];

fn default_streak_days() -> u32 {
    7
}

fn default_xp_threshold() -> u64 {
    1000
}

fn default_level() -> u32 {
    5
}

fn default_consecutive_days() -> u32 {
    7
}

fn default_lesson_count() -> u32 {
    10
}

/// A declarative unlock rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnlockCondition {
    /// At least one lesson completed
    FirstLesson,
    /// Every active lesson of a chapter completed
    ChapterComplete {
        #[serde(
            rename = "chapterId",
            alias = "chapter_id",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        chapter_id: Option<Uuid>,
    },
    /// A perfect score now or in the past
    PerfectQuiz,
    Streak {
        #[serde(default = "default_streak_days")]
        days: u32,
    },
    XpThreshold {
        #[serde(default = "default_xp_threshold")]
        xp: u64,
    },
    LevelUp {
        #[serde(default = "default_level")]
        level: u32,
    },
    DailyGoal {
        #[serde(
            rename = "consecutiveDays",
            alias = "consecutive_days",
            default = "default_consecutive_days"
        )]
        consecutive_days: u32,
    },
    LessonCount {
        #[serde(default = "default_lesson_count")]
        count: u32,
    },
}

/// An unlock condition as read from reward data.
///
/// Data written by newer or older versions may carry a type tag this build
/// does not know, or parameters it cannot read. Those are kept verbatim so
/// they survive a round trip, and evaluate to "locked".
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionSpec {
    Known(UnlockCondition),
    Unrecognized {
        type_name: String,
        raw: Value,
    },
    Malformed {
        type_name: String,
        reason: String,
        raw: Value,
    },
}

impl ConditionSpec {
    pub fn from_value(raw: Value) -> Self {
        let Some(type_name) = raw.get("type").and_then(Value::as_str).map(str::to_owned) else {
            return Self::Malformed {
                type_name: String::new(),
                reason: "missing \"type\" tag".to_string(),
                raw,
            };
        };

        if !KNOWN_CONDITION_TYPES.contains(&type_name.as_str()) {
            return Self::Unrecognized { type_name, raw };
        }

        match serde_json::from_value::<UnlockCondition>(raw.clone()) {
            Ok(condition) => Self::Known(condition),
            Err(e) => Self::Malformed {
                type_name,
                reason: e.to_string(),
                raw,
            },
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Known(condition) => condition.type_name(),
            Self::Unrecognized { type_name, .. } | Self::Malformed { type_name, .. } => type_name,
        }
    }
}

impl From<UnlockCondition> for ConditionSpec {
    fn from(condition: UnlockCondition) -> Self {
        Self::Known(condition)
    }
}

impl Serialize for ConditionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(condition) => condition.serialize(serializer),
            Self::Unrecognized { raw, .. } | Self::Malformed { raw, .. } => {
                raw.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for ConditionSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_value(raw))
    }
}

impl UnlockCondition {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::FirstLesson => "first_lesson",
            Self::ChapterComplete { .. } => "chapter_complete",
            Self::PerfectQuiz => "perfect_quiz",
            Self::Streak { .. } => "streak",
            Self::XpThreshold { .. } => "xp_threshold",
            Self::LevelUp { .. } => "level_up",
            Self::DailyGoal { .. } => "daily_goal",
            Self::LessonCount { .. } => "lesson_count",
        }
    }
}

/// Ownership of a card by a user; at most one per (user, card)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCardUnlock {
    pub user_id: Uuid,
    pub card_id: Uuid,
    pub unlocked_at: DateTime<Utc>,
}

impl UserCardUnlock {
    pub fn new(user_id: Uuid, card_id: Uuid, unlocked_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            card_id,
            unlocked_at,
        }
    }
}

/// Completion counts for one chapter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgress {
    pub completed_lessons: u32,
    pub active_lessons: u32,
}

impl ChapterProgress {
    pub fn is_complete(&self) -> bool {
        self.active_lessons > 0 && self.completed_lessons >= self.active_lessons
    }
}

/// Aggregate progression of a user that unlock rules are evaluated against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockContext {
    pub streak_days: u32,
    pub total_xp: u64,
    pub level: u32,
    pub consecutive_daily_goals: u32,
    /// Score of the attempt that triggered the evaluation
    #[serde(default)]
    pub current_score: Option<u8>,
    pub completed_lessons: u32,
    /// Any lesson has a best score of 100
    pub has_perfect_score: bool,
    #[serde(default)]
    pub chapters: HashMap<Uuid, ChapterProgress>,
    /// Chapter of the lesson that triggered the evaluation
    #[serde(default)]
    pub current_chapter_id: Option<Uuid>,
}

impl UnlockContext {
    /// Derive lesson and chapter aggregates from a user's progress records
    pub fn from_progress(records: &[ProgressRecord], lessons: &[Lesson]) -> Self {
        let mut chapters: HashMap<Uuid, ChapterProgress> = HashMap::new();
        for lesson in lessons.iter().filter(|l| l.active) {
            chapters.entry(lesson.chapter_id).or_default().active_lessons += 1;
        }

        let mut completed_lessons = 0;
        let mut has_perfect_score = false;
        for record in records {
            if record.best_score == 100 {
                has_perfect_score = true;
            }
            if !record.is_completed() {
                continue;
            }
            completed_lessons += 1;

            if let Some(lesson) = lessons
                .iter()
                .find(|l| l.id == record.lesson_id && l.active)
            {
                chapters.entry(lesson.chapter_id).or_default().completed_lessons += 1;
            }
        }

        Self {
            completed_lessons,
            has_perfect_score,
            chapters,
            ..Self::default()
        }
    }
}
