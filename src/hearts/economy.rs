//! Heart regeneration and consumption arithmetic

use chrono::{DateTime, Duration, Utc};

use super::models::{RegenResult, SpendResult};

/// Default number of hearts a user can hold
pub const DEFAULT_MAX_HEARTS: u32 = 5;

/// Default time to regenerate one heart
pub fn default_refill_interval() -> Duration {
    Duration::hours(4)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartEconomy {
    /// Configured maximum; `HeartState::refresh` moves stored balances onto it
    pub max_hearts: u32,
    pub refill_interval: Duration,
}

impl Default for HeartEconomy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEARTS, default_refill_interval())
    }
}

impl HeartEconomy {
    pub fn new(max_hearts: u32, refill_interval: Duration) -> Self {
        Self {
            max_hearts,
            refill_interval,
        }
    }

    /// Compute how many hearts have regenerated since `last_refill_at`.
    ///
    /// A missing baseline is lazily initialized: the first heart is due one
    /// full interval after `now`.
    pub fn regenerate(
        &self,
        hearts: u32,
        max_hearts: u32,
        last_refill_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> RegenResult {
        if hearts >= max_hearts {
            return RegenResult {
                hearts: max_hearts,
                next_refill_at: None,
                hearts_to_refill: 0,
            };
        }

        let Some(last_refill_at) = last_refill_at else {
            return RegenResult {
                hearts,
                next_refill_at: Some(now + self.refill_interval),
                hearts_to_refill: 0,
            };
        };

        let interval_ms = self.refill_interval.num_milliseconds().max(1);
        // A baseline in the future (clock skew) counts as no elapsed time
        let elapsed_ms = (now - last_refill_at).num_milliseconds().max(0);
        let gained = elapsed_ms / interval_ms;
        let until_next = Duration::milliseconds(interval_ms - elapsed_ms % interval_ms);

        if gained == 0 {
            return RegenResult {
                hearts,
                next_refill_at: Some(now + until_next),
                hearts_to_refill: 0,
            };
        }

        let gained = u32::try_from(gained).unwrap_or(u32::MAX);
        let new_hearts = hearts.saturating_add(gained).min(max_hearts);
        let next_refill_at = if new_hearts >= max_hearts {
            None
        } else {
            Some(now + until_next)
        };

        log::debug!(
            "Regenerated {} heart(s): {} -> {}",
            new_hearts - hearts,
            hearts,
            new_hearts
        );

        RegenResult {
            hearts: new_hearts,
            next_refill_at,
            hearts_to_refill: new_hearts - hearts,
        }
    }

    /// Spend `n` hearts.
    ///
    /// The existing regeneration baseline is kept so spending never resets
    /// progress toward the next heart; a balance still at the maximum
    /// restarts the clock at `now`.
    pub fn spend(
        hearts: u32,
        n: u32,
        max_hearts: u32,
        last_refill_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> SpendResult {
        let remaining = hearts.saturating_sub(n);
        let last_refill_at = if remaining >= max_hearts {
            now
        } else {
            last_refill_at.unwrap_or(now)
        };

        SpendResult {
            hearts: remaining,
            last_refill_at,
        }
    }

    pub fn has_enough(hearts: u32, required: u32) -> bool {
        hearts >= required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hearts::HeartState;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_full_balance_has_no_timer() {
        let economy = HeartEconomy::default();
        let result = economy.regenerate(5, 5, Some(now() - Duration::hours(9)), now());
        assert_eq!(result.hearts, 5);
        assert_eq!(result.next_refill_at, None);
        assert_eq!(result.hearts_to_refill, 0);

        // Overfull input is clamped
        let result = economy.regenerate(7, 5, None, now());
        assert_eq!(result.hearts, 5);
    }

    #[test]
    fn test_missing_baseline_is_lazily_initialized() {
        let economy = HeartEconomy::default();
        let result = economy.regenerate(3, 5, None, now());
        assert_eq!(result.hearts, 3);
        assert_eq!(result.next_refill_at, Some(now() + Duration::hours(4)));
        assert_eq!(result.hearts_to_refill, 0);
    }

    #[test]
    fn test_partial_interval_reports_next_refill() {
        let economy = HeartEconomy::default();
        let last = now() - Duration::hours(3);
        let result = economy.regenerate(2, 5, Some(last), now());

        assert_eq!(result.hearts, 2);
        assert_eq!(result.next_refill_at, Some(last + Duration::hours(4)));
        assert_eq!(result.next_refill_at, Some(now() + Duration::hours(1)));
        assert_eq!(result.hearts_to_refill, 0);
    }

    #[test]
    fn test_multiple_intervals_regenerate() {
        let economy = HeartEconomy::default();
        let result = economy.regenerate(1, 5, Some(now() - Duration::hours(9)), now());

        // 9h / 4h = 2 hearts, 1h into the next one
        assert_eq!(result.hearts, 3);
        assert_eq!(result.hearts_to_refill, 2);
        assert_eq!(result.next_refill_at, Some(now() + Duration::hours(3)));
    }

    #[test]
    fn test_regeneration_caps_at_max() {
        let economy = HeartEconomy::default();
        let result = economy.regenerate(4, 5, Some(now() - Duration::days(3)), now());

        assert_eq!(result.hearts, 5);
        assert_eq!(result.hearts_to_refill, 1);
        assert_eq!(result.next_refill_at, None);
    }

    #[test]
    fn test_regenerate_stays_in_bounds() {
        let economy = HeartEconomy::default();
        for hearts in 0..=6 {
            for hours in [0, 1, 4, 7, 16, 20, 100] {
                let last = Some(now() - Duration::hours(hours));
                let result = economy.regenerate(hearts, 5, last, now());
                assert!(result.hearts <= 5, "hearts={} hours={}", hearts, hours);
            }
        }
    }

    #[test]
    fn test_future_baseline_gains_nothing() {
        let economy = HeartEconomy::default();
        let result = economy.regenerate(2, 5, Some(now() + Duration::hours(1)), now());
        assert_eq!(result.hearts, 2);
        assert_eq!(result.hearts_to_refill, 0);
    }

    #[test]
    fn test_spend_preserves_existing_baseline() {
        let baseline = now() - Duration::hours(2);
        let result = HeartEconomy::spend(3, 1, 5, Some(baseline), now());
        assert_eq!(result.hearts, 2);
        assert_eq!(result.last_refill_at, baseline);
    }

    #[test]
    fn test_spend_starts_clock_when_missing() {
        let result = HeartEconomy::spend(5, 1, 5, None, now());
        assert_eq!(result.hearts, 4);
        assert_eq!(result.last_refill_at, now());
    }

    #[test]
    fn test_spend_saturates_at_zero() {
        let result = HeartEconomy::spend(1, 3, 5, None, now());
        assert_eq!(result.hearts, 0);
    }

    #[test]
    fn test_spend_nothing_at_max_resets_clock() {
        let result = HeartEconomy::spend(5, 0, 5, Some(now() - Duration::days(1)), now());
        assert_eq!(result.hearts, 5);
        assert_eq!(result.last_refill_at, now());
    }

    #[test]
    fn test_has_enough() {
        assert!(HeartEconomy::has_enough(1, 1));
        assert!(!HeartEconomy::has_enough(0, 1));
        assert!(HeartEconomy::has_enough(3, 2));
    }

    #[test]
    fn test_state_refresh_keeps_partial_progress() {
        let economy = HeartEconomy::default();
        let baseline = now() - Duration::hours(9);
        let mut state = HeartState {
            hearts: 1,
            max_hearts: 5,
            last_refill_at: Some(baseline),
        };

        let result = state.refresh(&economy, now());
        assert_eq!(result.hearts_to_refill, 2);
        assert_eq!(state.hearts, 3);
        assert_eq!(state.last_refill_at, Some(baseline + Duration::hours(8)));

        // Refreshing again at the same instant is a no-op
        let again = state.refresh(&economy, now());
        assert_eq!(again.hearts_to_refill, 0);
        assert_eq!(state.hearts, 3);
    }

    #[test]
    fn test_state_spend_then_refill_to_full() {
        let economy = HeartEconomy::default();
        let mut state = HeartState::full(5);
        state.spend(2, now());
        assert_eq!(state.hearts, 3);
        assert_eq!(state.last_refill_at, Some(now()));

        state.refresh(&economy, now() + Duration::hours(8));
        assert!(state.is_full());
        assert_eq!(state.last_refill_at, Some(now() + Duration::hours(8)));
    }

    #[test]
    fn test_state_spend_from_full_restarts_clock() {
        let economy = HeartEconomy::default();
        let mut state = HeartState {
            hearts: 5,
            max_hearts: 5,
            last_refill_at: Some(now() - Duration::days(2)),
        };

        state.spend(1, now());
        assert_eq!(state.last_refill_at, Some(now()));
        assert_eq!(state.refresh(&economy, now()).hearts, 4);
    }

    #[test]
    fn test_state_follows_lowered_maximum() {
        let economy = HeartEconomy::new(3, default_refill_interval());
        let mut state = HeartState::full(5);

        let result = state.refresh(&economy, now());
        assert_eq!(result.hearts, 3);
        assert_eq!(state.hearts, 3);
        assert_eq!(state.max_hearts, 3);
        assert!(state.is_full());
    }

    #[test]
    fn test_state_follows_raised_maximum() {
        let economy = HeartEconomy::new(6, default_refill_interval());
        let mut state = HeartState {
            hearts: 5,
            max_hearts: 5,
            last_refill_at: Some(now() - Duration::days(3)),
        };

        // The stale refill instant must not pay out the new slot at once
        let result = state.refresh(&economy, now());
        assert_eq!(result.hearts, 5);
        assert_eq!(state.max_hearts, 6);
        assert_eq!(state.last_refill_at, Some(now()));
        assert_eq!(result.next_refill_at, Some(now() + Duration::hours(4)));

        let later = state.refresh(&economy, now() + Duration::hours(4));
        assert_eq!(later.hearts, 6);
    }
}
