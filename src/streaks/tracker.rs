//! Calendar-day streak state machine
//!
//! Days are compared as calendar dates in the user's timezone, computed
//! directly from the stored instants. An unknown timezone falls back to UTC.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use super::models::StreakUpdate;

/// Streak lengths that are celebrated
pub const DEFAULT_MILESTONES: [u32; 4] = [7, 30, 100, 365];

/// Parse an IANA timezone name, falling back to UTC
pub fn resolve_timezone(name: &str) -> Tz {
    match name.trim().parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            if !name.trim().is_empty() {
                log::warn!("Unknown timezone '{}', using UTC calendar days", name);
            }
            Tz::UTC
        }
    }
}

/// Calendar day of `instant` in the named timezone
pub fn local_day(timezone: &str, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&resolve_timezone(timezone)).date_naive()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakTracker {
    milestones: Vec<u32>,
}

impl Default for StreakTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MILESTONES.to_vec())
    }
}

impl StreakTracker {
    pub fn new(milestones: Vec<u32>) -> Self {
        Self { milestones }
    }

    /// Advance, keep or reset a streak for activity at `now`
    pub fn update(
        &self,
        last_active_at: Option<DateTime<Utc>>,
        current_streak: u32,
        timezone: &str,
        now: DateTime<Utc>,
    ) -> StreakUpdate {
        let Some(last_active_at) = last_active_at else {
            return self.started(1, false, now);
        };

        let tz = resolve_timezone(timezone);
        let today = now.with_timezone(&tz).date_naive();
        let last_day = last_active_at.with_timezone(&tz).date_naive();
        let days_since = (today - last_day).num_days();

        match days_since {
            // Same day (or a stored instant ahead of `now`)
            d if d <= 0 => StreakUpdate {
                current_streak,
                should_increment: false,
                should_reset: false,
                last_active_at: Some(last_active_at),
                milestone: None,
            },
            1 => self.started(current_streak.saturating_add(1), false, now),
            _ => {
                log::debug!(
                    "Streak of {} reset after {} day gap",
                    current_streak,
                    days_since
                );
                self.started(1, true, now)
            }
        }
    }

    fn started(&self, current_streak: u32, should_reset: bool, now: DateTime<Utc>) -> StreakUpdate {
        StreakUpdate {
            current_streak,
            should_increment: true,
            should_reset,
            last_active_at: Some(now),
            milestone: self.is_milestone(current_streak).then_some(current_streak),
        }
    }

    pub fn is_milestone(&self, days: u32) -> bool {
        self.milestones.contains(&days)
    }
}
