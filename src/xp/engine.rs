//! XP awarded for a lesson attempt
//!
//! A first completion earns the lesson's base XP plus stacked bonuses:
//! - perfect score
//! - daily goal reached
//! - streak on a multiple of seven days
//!
//! Reviews and legendary runs pay a flat amount, and repeating an already
//! completed lesson pays nothing so XP is never counted twice.

use serde::{Deserialize, Serialize};

use crate::config::XpConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpRules {
    pub perfect_bonus: u32,
    pub daily_goal_bonus: u32,
    pub streak_bonus: u32,
    pub streak_bonus_every: u32,
    pub review_flat: u32,
    pub legendary_flat: u32,
}

impl Default for XpRules {
    fn default() -> Self {
        Self::from(&XpConfig::default())
    }
}

impl From<&XpConfig> for XpRules {
    fn from(config: &XpConfig) -> Self {
        Self {
            perfect_bonus: config.perfect_bonus,
            daily_goal_bonus: config.daily_goal_bonus,
            streak_bonus: config.streak_bonus,
            streak_bonus_every: config.streak_bonus_every,
            review_flat: config.review_flat,
            legendary_flat: config.legendary_flat,
        }
    }
}

/// How an attempt is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptMode {
    /// First time the lesson is completed: base XP plus bonuses
    FirstCompletion,
    /// Spaced-repetition review of a completed lesson
    Review,
    /// Hard-mode run of a completed lesson
    Legendary,
    /// Completing an already completed lesson again
    Repeat,
}

impl AttemptMode {
    pub fn classify(already_completed: bool, is_review: bool, is_legendary: bool) -> Self {
        if is_legendary {
            Self::Legendary
        } else if !already_completed {
            Self::FirstCompletion
        } else if is_review {
            Self::Review
        } else {
            Self::Repeat
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpBonuses {
    pub perfect: u32,
    pub daily_goal: u32,
    pub streak_bonus: u32,
}

impl XpBonuses {
    pub fn sum(&self) -> u32 {
        self.perfect
            .saturating_add(self.daily_goal)
            .saturating_add(self.streak_bonus)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpBreakdown {
    pub base_xp: u32,
    pub bonuses: XpBonuses,
    pub total: u32,
}

impl XpBreakdown {
    fn flat(amount: u32) -> Self {
        Self {
            base_xp: amount,
            bonuses: XpBonuses::default(),
            total: amount,
        }
    }
}

impl XpRules {
    /// Full calculation for a first completion
    pub fn compute(
        &self,
        base_xp: u32,
        score: u8,
        daily_goal_reached: bool,
        streak_days: u32,
    ) -> XpBreakdown {
        let bonuses = XpBonuses {
            perfect: if score == 100 { self.perfect_bonus } else { 0 },
            daily_goal: if daily_goal_reached {
                self.daily_goal_bonus
            } else {
                0
            },
            streak_bonus: if streak_days > 0
                && self.streak_bonus_every > 0
                && streak_days % self.streak_bonus_every == 0
            {
                self.streak_bonus
            } else {
                0
            },
        };

        XpBreakdown {
            base_xp,
            bonuses,
            total: base_xp.saturating_add(bonuses.sum()),
        }
    }

    /// XP for an attempt in the given mode
    pub fn award(
        &self,
        mode: AttemptMode,
        base_xp: u32,
        score: u8,
        daily_goal_reached: bool,
        streak_days: u32,
    ) -> XpBreakdown {
        match mode {
            AttemptMode::FirstCompletion => {
                self.compute(base_xp, score, daily_goal_reached, streak_days)
            }
            AttemptMode::Review => XpBreakdown::flat(self.review_flat),
            AttemptMode::Legendary => XpBreakdown::flat(self.legendary_flat),
            AttemptMode::Repeat => XpBreakdown::flat(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_score_bonus() {
        let result = XpRules::default().compute(10, 100, false, 0);
        assert_eq!(result.base_xp, 10);
        assert_eq!(result.bonuses.perfect, 5);
        assert_eq!(result.total, 15);
    }

    #[test]
    fn test_all_bonuses_stack() {
        let result = XpRules::default().compute(10, 100, true, 7);
        assert_eq!(result.base_xp, 10);
        assert_eq!(
            result.bonuses,
            XpBonuses {
                perfect: 5,
                daily_goal: 5,
                streak_bonus: 2
            }
        );
        assert_eq!(result.total, 22);
    }

    #[test]
    fn test_streak_bonus_only_on_multiples_of_seven() {
        let rules = XpRules::default();
        assert_eq!(rules.compute(10, 80, false, 0).bonuses.streak_bonus, 0);
        assert_eq!(rules.compute(10, 80, false, 6).bonuses.streak_bonus, 0);
        assert_eq!(rules.compute(10, 80, false, 14).bonuses.streak_bonus, 2);
        assert_eq!(rules.compute(10, 80, false, 15).bonuses.streak_bonus, 0);
    }

    #[test]
    fn test_no_bonus_for_imperfect_score() {
        let result = XpRules::default().compute(12, 99, false, 3);
        assert_eq!(result.total, 12);
    }

    #[test]
    fn test_huge_base_xp_saturates() {
        let result = XpRules::default().compute(u32::MAX - 3, 100, true, 7);
        assert_eq!(result.base_xp, u32::MAX - 3);
        assert_eq!(result.total, u32::MAX);
    }

    #[test]
    fn test_flat_modes() {
        let rules = XpRules::default();
        assert_eq!(rules.award(AttemptMode::Review, 10, 40, true, 7).total, 5);
        assert_eq!(rules.award(AttemptMode::Legendary, 10, 100, true, 7).total, 40);
        assert_eq!(rules.award(AttemptMode::Repeat, 10, 100, true, 7).total, 0);
        assert_eq!(rules.award(AttemptMode::FirstCompletion, 10, 100, true, 7).total, 22);
    }

    #[test]
    fn test_classify() {
        assert_eq!(AttemptMode::classify(false, false, false), AttemptMode::FirstCompletion);
        assert_eq!(AttemptMode::classify(false, true, false), AttemptMode::FirstCompletion);
        assert_eq!(AttemptMode::classify(true, true, false), AttemptMode::Review);
        assert_eq!(AttemptMode::classify(true, false, false), AttemptMode::Repeat);
        assert_eq!(AttemptMode::classify(true, false, true), AttemptMode::Legendary);
    }
}
