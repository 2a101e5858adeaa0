//! Unlock rule evaluation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{ConditionSpec, UnlockCondition, UnlockContext};
use crate::catalog::Card;

/// Non-fatal problem found while evaluating a condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnlockDiagnostic {
    UnrecognizedType { type_name: String },
    MalformedCondition { type_name: String, reason: String },
    /// `chapter_complete` with no chapter on the condition, card or context
    MissingChapter,
}

impl std::fmt::Display for UnlockDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnrecognizedType { type_name } => {
                write!(f, "unrecognized unlock condition type '{}'", type_name)
            }
            Self::MalformedCondition { type_name, reason } => {
                write!(f, "malformed '{}' condition: {}", type_name, reason)
            }
            Self::MissingChapter => write!(f, "chapter_complete condition has no target chapter"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub satisfied: bool,
    pub diagnostic: Option<UnlockDiagnostic>,
}

impl RuleOutcome {
    fn decided(satisfied: bool) -> Self {
        Self {
            satisfied,
            diagnostic: None,
        }
    }

    fn locked(diagnostic: UnlockDiagnostic) -> Self {
        Self {
            satisfied: false,
            diagnostic: Some(diagnostic),
        }
    }
}

/// Evaluate a condition for a user
pub fn evaluate(spec: &ConditionSpec, user_id: Uuid, context: &UnlockContext) -> RuleOutcome {
    let outcome = match spec {
        ConditionSpec::Known(condition) => evaluate_condition(condition, context),
        ConditionSpec::Unrecognized { type_name, .. } => {
            RuleOutcome::locked(UnlockDiagnostic::UnrecognizedType {
                type_name: type_name.clone(),
            })
        }
        ConditionSpec::Malformed {
            type_name, reason, ..
        } => RuleOutcome::locked(UnlockDiagnostic::MalformedCondition {
            type_name: type_name.clone(),
            reason: reason.clone(),
        }),
    };

    if let Some(ref diagnostic) = outcome.diagnostic {
        log::warn!("Unlock evaluation for user {}: {}", user_id, diagnostic);
    }

    outcome
}

/// Evaluate a card's condition; a `chapter_complete` without its own
/// chapter targets the card's chapter
pub fn evaluate_card(card: &Card, user_id: Uuid, context: &UnlockContext) -> RuleOutcome {
    if let ConditionSpec::Known(UnlockCondition::ChapterComplete { chapter_id: None }) =
        card.condition
    {
        if let Some(chapter_id) = card.chapter_id {
            let resolved = ConditionSpec::Known(UnlockCondition::ChapterComplete {
                chapter_id: Some(chapter_id),
            });
            return evaluate(&resolved, user_id, context);
        }
    }

    evaluate(&card.condition, user_id, context)
}

fn evaluate_condition(condition: &UnlockCondition, context: &UnlockContext) -> RuleOutcome {
    match condition {
        UnlockCondition::FirstLesson => RuleOutcome::decided(context.completed_lessons >= 1),
        UnlockCondition::ChapterComplete { chapter_id } => {
            let Some(chapter_id) = chapter_id.or(context.current_chapter_id) else {
                return RuleOutcome::locked(UnlockDiagnostic::MissingChapter);
            };
            let complete = context
                .chapters
                .get(&chapter_id)
                .map(|chapter| chapter.is_complete())
                .unwrap_or(false);
            RuleOutcome::decided(complete)
        }
        UnlockCondition::PerfectQuiz => {
            RuleOutcome::decided(context.current_score == Some(100) || context.has_perfect_score)
        }
        UnlockCondition::Streak { days } => RuleOutcome::decided(context.streak_days >= *days),
        UnlockCondition::XpThreshold { xp } => RuleOutcome::decided(context.total_xp >= *xp),
        UnlockCondition::LevelUp { level } => RuleOutcome::decided(context.level >= *level),
        UnlockCondition::DailyGoal { consecutive_days } => {
            RuleOutcome::decided(context.consecutive_daily_goals >= *consecutive_days)
        }
        UnlockCondition::LessonCount { count } => {
            RuleOutcome::decided(context.completed_lessons >= *count)
        }
    }
}
