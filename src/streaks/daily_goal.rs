//! Daily XP goal tracking
//!
//! Records the calendar days on which a user met their XP goal and counts
//! how many of those days are consecutive.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Per-user daily goal bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoalState {
    /// Day `xp_today` belongs to
    #[serde(default)]
    pub xp_day: Option<NaiveDate>,
    #[serde(default)]
    pub xp_today: u32,
    /// Days the goal was met, ascending and unique
    #[serde(default)]
    pub met_days: Vec<NaiveDate>,
}

/// Effect of adding XP on the daily goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoalProgress {
    pub xp_today: u32,
    /// The goal was crossed by this addition
    pub reached_now: bool,
}

impl DailyGoalState {
    /// XP earned on `day` so far
    pub fn xp_on(&self, day: NaiveDate) -> u32 {
        if self.xp_day == Some(day) {
            self.xp_today
        } else {
            0
        }
    }

    /// Add XP earned on `day`; a new day starts from zero
    pub fn record_xp(&mut self, day: NaiveDate, xp: u32, goal_xp: u32) -> DailyGoalProgress {
        let before = self.xp_on(day);
        let after = before.saturating_add(xp);

        self.xp_day = Some(day);
        self.xp_today = after;

        let reached_now = before < goal_xp && after >= goal_xp;
        if reached_now {
            self.mark_met(day);
        }

        DailyGoalProgress {
            xp_today: after,
            reached_now,
        }
    }

    /// Whether adding `xp` on `day` would cross the goal
    pub fn would_reach(&self, day: NaiveDate, xp: u32, goal_xp: u32) -> bool {
        let before = self.xp_on(day);
        before < goal_xp && before.saturating_add(xp) >= goal_xp
    }

    pub fn mark_met(&mut self, day: NaiveDate) {
        if let Err(pos) = self.met_days.binary_search(&day) {
            self.met_days.insert(pos, day);
        }
    }

    /// Consecutive met days ending today, or ending yesterday when today's
    /// goal is not met yet (the day is not over)
    pub fn consecutive_days(&self, today: NaiveDate) -> u32 {
        let met = |day: &NaiveDate| self.met_days.binary_search(day).is_ok();

        let mut check_date = if met(&today) {
            today
        } else {
            today - Duration::days(1)
        };

        let mut streak = 0;
        while met(&check_date) {
            streak += 1;
            check_date = check_date - Duration::days(1);
        }

        streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_record_xp_crosses_goal_once() {
        let mut state = DailyGoalState::default();

        let first = state.record_xp(day(1), 15, 20);
        assert_eq!(first.xp_today, 15);
        assert!(!first.reached_now);

        let second = state.record_xp(day(1), 10, 20);
        assert_eq!(second.xp_today, 25);
        assert!(second.reached_now);

        let third = state.record_xp(day(1), 10, 20);
        assert!(!third.reached_now);
        assert_eq!(state.met_days, vec![day(1)]);
    }

    #[test]
    fn test_new_day_resets_counter() {
        let mut state = DailyGoalState::default();
        state.record_xp(day(1), 30, 20);

        assert_eq!(state.xp_on(day(2)), 0);
        assert!(state.would_reach(day(2), 20, 20));

        let progress = state.record_xp(day(2), 5, 20);
        assert_eq!(progress.xp_today, 5);
    }

    #[test]
    fn test_consecutive_days() {
        let mut state = DailyGoalState::default();
        for d in [1, 3, 4, 5] {
            state.mark_met(day(d));
        }

        assert_eq!(state.consecutive_days(day(5)), 3);
        // Today not met yet: count up to yesterday
        assert_eq!(state.consecutive_days(day(6)), 3);
        // Two days without the goal breaks the chain
        assert_eq!(state.consecutive_days(day(7)), 0);
        assert_eq!(state.consecutive_days(day(1)), 1);
    }

    #[test]
    fn test_mark_met_keeps_days_sorted_and_unique() {
        let mut state = DailyGoalState::default();
        for d in [4, 2, 4, 3] {
            state.mark_met(day(d));
        }
        assert_eq!(state.met_days, vec![day(2), day(3), day(4)]);
    }
}
