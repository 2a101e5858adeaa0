//! Mastery transitions and review scheduling
//!
//! Score tiers (0-100):
//! - 100: perfect, mastery +1
//! - 80-99: strong, mastery +1
//! - 60-79: passing, mastery unchanged
//! - below 60: weak, mastery -1
//!
//! Legendary runs only advance on a perfect score and never lower mastery.

use chrono::{DateTime, Duration, Utc};

/// Days until the next review, indexed by mastery level
pub const DEFAULT_REVIEW_DAYS: [i64; 5] = [1, 3, 7, 14, 30];

/// Highest mastery level
pub const DEFAULT_MAX_LEVEL: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterySchedule {
    max_level: u8,
    review_days: Vec<i64>,
}

impl Default for MasterySchedule {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEVEL, DEFAULT_REVIEW_DAYS.to_vec())
    }
}

impl MasterySchedule {
    pub fn new(max_level: u8, review_days: Vec<i64>) -> Self {
        Self {
            max_level,
            review_days,
        }
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    /// Mastery after a normal or review attempt
    pub fn next_level(&self, score: u8, previous: u8) -> u8 {
        let previous = previous.min(self.max_level);

        match score {
            // TODO: decide whether 80-99 should advance like a perfect score;
            // existing progress data was produced with this rule
            80.. => previous.saturating_add(1).min(self.max_level),
            60..=79 => previous,
            _ => previous.saturating_sub(1),
        }
    }

    /// Mastery after a legendary attempt
    pub fn next_level_legendary(&self, score: u8, previous: u8) -> u8 {
        let previous = previous.min(self.max_level);
        if score == 100 {
            previous.saturating_add(1).min(self.max_level)
        } else {
            previous
        }
    }

    /// Review interval in days for a mastery level
    pub fn review_days_for(&self, mastery_level: u8) -> i64 {
        let last = self.review_days.len().saturating_sub(1);
        let index = (mastery_level as usize).min(last);
        self.review_days.get(index).copied().unwrap_or(1)
    }

    /// When a lesson should next be reviewed; never in the past
    pub fn next_review_date(
        &self,
        mastery_level: u8,
        last_attempt_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let Some(last_attempt_at) = last_attempt_at else {
            return now + Duration::days(1);
        };

        let scheduled = last_attempt_at + Duration::days(self.review_days_for(mastery_level));
        scheduled.max(now)
    }

    /// Mastery after `days_since_last_review` days without practice.
    ///
    /// Tiers are scanned from `mastery_level - 1` down to 0 and the first
    /// tier whose review interval has been exceeded is returned.
    pub fn decay(&self, mastery_level: u8, days_since_last_review: i64) -> u8 {
        for tier in (0..mastery_level).rev() {
            if days_since_last_review > self.review_days_for(tier) {
                return tier;
            }
        }
        mastery_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_perfect_score_advances() {
        let schedule = MasterySchedule::default();
        assert_eq!(schedule.next_level(100, 3), 4);
        assert_eq!(schedule.next_level(100, 5), 5);
        assert_eq!(schedule.next_level(100, 0), 1);
    }

    #[test]
    fn test_strong_score_advances_and_caps() {
        let schedule = MasterySchedule::default();
        assert_eq!(schedule.next_level(90, 2), 3);
        assert_eq!(schedule.next_level(90, 5), 5);
        assert_eq!(schedule.next_level(80, 4), 5);
    }

    #[test]
    fn test_top_of_u8_range_does_not_overflow() {
        let schedule = MasterySchedule::new(u8::MAX, DEFAULT_REVIEW_DAYS.to_vec());
        assert_eq!(schedule.next_level(100, u8::MAX), u8::MAX);
        assert_eq!(schedule.next_level_legendary(100, u8::MAX), u8::MAX);
    }

    #[test]
    fn test_passing_score_holds() {
        let schedule = MasterySchedule::default();
        assert_eq!(schedule.next_level(60, 3), 3);
        assert_eq!(schedule.next_level(79, 3), 3);
    }

    #[test]
    fn test_weak_score_drops() {
        let schedule = MasterySchedule::default();
        assert_eq!(schedule.next_level(40, 3), 2);
        assert_eq!(schedule.next_level(59, 1), 0);
        assert_eq!(schedule.next_level(0, 0), 0);
    }

    #[test]
    fn test_legendary_transition() {
        let schedule = MasterySchedule::default();
        assert_eq!(schedule.next_level_legendary(100, 2), 3);
        assert_eq!(schedule.next_level_legendary(100, 5), 5);
        assert_eq!(schedule.next_level_legendary(95, 2), 2);
        assert_eq!(schedule.next_level_legendary(10, 2), 2);
    }

    #[test]
    fn test_review_days_index_saturates() {
        let schedule = MasterySchedule::default();
        assert_eq!(schedule.review_days_for(0), 1);
        assert_eq!(schedule.review_days_for(3), 14);
        assert_eq!(schedule.review_days_for(4), 30);
        assert_eq!(schedule.review_days_for(5), 30);
    }

    #[test]
    fn test_next_review_without_attempt() {
        let schedule = MasterySchedule::default();
        assert_eq!(schedule.next_review_date(3, None, now()), now() + Duration::days(1));
    }

    #[test]
    fn test_next_review_from_last_attempt() {
        let schedule = MasterySchedule::default();
        let last = now() - Duration::days(2);
        assert_eq!(schedule.next_review_date(2, Some(last), now()), last + Duration::days(7));
    }

    #[test]
    fn test_overdue_review_clamps_to_now() {
        let schedule = MasterySchedule::default();
        let last = now() - Duration::days(40);
        assert_eq!(schedule.next_review_date(4, Some(last), now()), now());
    }

    #[test]
    fn test_decay() {
        let schedule = MasterySchedule::default();
        // Nothing exceeded: unchanged
        assert_eq!(schedule.decay(3, 0), 3);
        assert_eq!(schedule.decay(3, 1), 3);
        // Tier 2 interval (7 days) exceeded
        assert_eq!(schedule.decay(3, 8), 2);
        // Only the tier 0 interval (1 day) exceeded
        assert_eq!(schedule.decay(3, 2), 0);
        assert_eq!(schedule.decay(5, 31), 4);
        assert_eq!(schedule.decay(0, 100), 0);
    }
}
