//! Lesson session orchestration
//!
//! Runs the engines in order for one lesson attempt:
//! hearts, XP, level, streak, mastery, daily goal, then unlocks.
//! All computation happens on a `UserProfile` passed in by the caller;
//! `complete_lesson_and_unlock` adds the storage round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{Catalog, Lesson};
use crate::config::EngineConfig;
use crate::hearts::{HeartEconomy, RegenResult};
use crate::mastery::{MasteryChange, MasterySchedule};
use crate::storage::{ProfileStorage, StorageError, UserProfile};
use crate::streaks::daily_goal::DailyGoalProgress;
use crate::streaks::{local_day, StreakTracker, StreakUpdate};
use crate::unlocks::{unlock_all, UnlockContext, UnlockReport};
use crate::xp::{AttemptMode, LevelLadder, LevelProgress, XpBreakdown, XpRules};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Not enough hearts: have {hearts}, need {required}")]
    NotEnoughHearts {
        hearts: u32,
        required: u32,
        next_refill_at: Option<DateTime<Utc>>,
    },

    #[error("Lesson not found: {0}")]
    LessonNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Hearts required to start a lesson
pub const HEARTS_TO_START: u32 = 1;

/// A finished lesson attempt as reported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonAttempt {
    /// 0-100, already validated upstream
    pub score: u8,
    #[serde(default)]
    pub hearts_lost: u32,
    #[serde(default)]
    pub review: bool,
    #[serde(default)]
    pub legendary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOutcome {
    pub hearts: RegenResult,
    pub lesson_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub lesson_id: Uuid,
    pub mode: AttemptMode,
    pub hearts: u32,
    pub next_refill_at: Option<DateTime<Utc>>,
    pub xp: XpBreakdown,
    pub total_xp: u64,
    pub level_before: u32,
    pub level: LevelProgress,
    pub leveled_up: bool,
    pub streak: StreakUpdate,
    pub mastery: MasteryChange,
    pub daily_goal: DailyGoalProgress,
    pub context: UnlockContext,
}

/// The engines configured from one `EngineConfig`
#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    daily_goal_xp: u32,
    hearts: HeartEconomy,
    xp: XpRules,
    ladder: LevelLadder,
    mastery: MasterySchedule,
    streaks: StreakTracker,
}

impl Default for ProgressionEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ProgressionEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            daily_goal_xp: config.daily_goal_xp,
            hearts: config.heart_economy(),
            xp: config.xp_rules(),
            ladder: config.level_ladder(),
            mastery: config.mastery_schedule(),
            streaks: config.streak_tracker(),
        }
    }

    pub fn heart_economy(&self) -> &HeartEconomy {
        &self.hearts
    }

    pub fn level_ladder(&self) -> &LevelLadder {
        &self.ladder
    }

    pub fn mastery_schedule(&self) -> &MasterySchedule {
        &self.mastery
    }

    /// Gate a lesson start on the heart balance
    pub fn start_lesson(
        &self,
        profile: &mut UserProfile,
        lesson: &Lesson,
        now: DateTime<Utc>,
    ) -> Result<StartOutcome> {
        let hearts = profile.hearts.refresh(&self.hearts, now);

        if !HeartEconomy::has_enough(hearts.hearts, HEARTS_TO_START) {
            return Err(SessionError::NotEnoughHearts {
                hearts: hearts.hearts,
                required: HEARTS_TO_START,
                next_refill_at: hearts.next_refill_at,
            });
        }

        profile.progress_mut(lesson.id).start();

        Ok(StartOutcome {
            hearts,
            lesson_id: lesson.id,
        })
    }

    /// Apply a finished attempt to the profile
    pub fn complete_lesson(
        &self,
        profile: &mut UserProfile,
        lesson: &Lesson,
        lessons: &[Lesson],
        attempt: &LessonAttempt,
        now: DateTime<Utc>,
    ) -> CompletionOutcome {
        let score = attempt.score.min(100);

        // Hearts
        profile.hearts.refresh(&self.hearts, now);
        if attempt.hearts_lost > 0 {
            profile.hearts.spend(attempt.hearts_lost, now);
        }
        let hearts = self.hearts.regenerate(
            profile.hearts.hearts,
            profile.hearts.max_hearts,
            profile.hearts.last_refill_at,
            now,
        );

        // XP is paid on the streak length including today's activity
        let streak_preview = self.streaks.update(
            profile.streak.last_active_at,
            profile.streak.current_streak,
            &profile.streak.timezone,
            now,
        );
        let today = local_day(&profile.streak.timezone, now);

        let already_completed = profile
            .progress
            .get(&lesson.id)
            .map(|p| p.is_completed())
            .unwrap_or(false);
        let mode = AttemptMode::classify(already_completed, attempt.review, attempt.legendary);

        let before_bonus = self.xp.award(mode, lesson.base_xp, score, false, 0).total;
        let daily_goal_reached = profile
            .daily_goal
            .would_reach(today, before_bonus, self.daily_goal_xp);
        let xp = self.xp.award(
            mode,
            lesson.base_xp,
            score,
            daily_goal_reached,
            streak_preview.current_streak,
        );

        // Level
        let xp_before = profile.total_xp;
        let level_before = self.ladder.calculate_level(xp_before);
        profile.total_xp += u64::from(xp.total);
        let level = self.ladder.progress(profile.total_xp);
        let leveled_up = self.ladder.leveled_up(xp_before, profile.total_xp);
        if leveled_up {
            log::info!("User {} reached level {}", profile.user_id, level.current_level);
        }

        // Streak
        let streak = profile.streak.apply(&self.streaks, now);

        // Mastery
        let mastery = profile.progress_mut(lesson.id).record_attempt(
            &self.mastery,
            score,
            mode == AttemptMode::Legendary,
            now,
        );

        // Daily goal
        let daily_goal = profile
            .daily_goal
            .record_xp(today, xp.total, self.daily_goal_xp);

        let mut context = UnlockContext::from_progress(&profile.progress_records(), lessons);
        context.streak_days = profile.streak.current_streak;
        context.total_xp = profile.total_xp;
        context.level = level.current_level;
        context.consecutive_daily_goals = profile.daily_goal.consecutive_days(today);
        context.current_score = Some(score);
        context.current_chapter_id = Some(lesson.chapter_id);

        CompletionOutcome {
            lesson_id: lesson.id,
            mode,
            hearts: hearts.hearts,
            next_refill_at: hearts.next_refill_at,
            xp,
            total_xp: profile.total_xp,
            level_before,
            level,
            leveled_up,
            streak,
            mastery,
            daily_goal,
            context,
        }
    }

    /// Load, gate and save a lesson start
    pub fn start_lesson_stored(
        &self,
        storage: &ProfileStorage,
        catalog: &Catalog,
        user_id: Uuid,
        lesson_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<StartOutcome> {
        let lesson = find_lesson(catalog, lesson_id)?;
        storage.update_profile(user_id, |profile| self.start_lesson(profile, lesson, now))
    }

    /// Complete a lesson under the user's lock, then grant cards
    pub fn complete_lesson_and_unlock(
        &self,
        storage: &ProfileStorage,
        catalog: &Catalog,
        user_id: Uuid,
        lesson_id: Uuid,
        attempt: &LessonAttempt,
        now: DateTime<Utc>,
    ) -> Result<(CompletionOutcome, UnlockReport)> {
        let lesson = find_lesson(catalog, lesson_id)?;
        let outcome = storage.update_profile(user_id, |profile| -> Result<CompletionOutcome> {
            Ok(self.complete_lesson(profile, lesson, &catalog.lessons, attempt, now))
        })?;

        let report = unlock_all(storage, &catalog.cards, user_id, &outcome.context, now)?;
        Ok((outcome, report))
    }
}

fn find_lesson(catalog: &Catalog, lesson_id: Uuid) -> Result<&Lesson> {
    catalog
        .lesson(lesson_id)
        .ok_or(SessionError::LessonNotFound(lesson_id))
}
