//! Data models for the heart economy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::economy::HeartEconomy;

/// Persisted heart balance of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartState {
    pub hearts: u32,
    pub max_hearts: u32,
    /// Baseline of the regeneration clock.
    /// `None` only while the balance has never dropped below the maximum.
    #[serde(default)]
    pub last_refill_at: Option<DateTime<Utc>>,
}

impl HeartState {
    /// A full balance that has never been spent
    pub fn full(max_hearts: u32) -> Self {
        Self {
            hearts: max_hearts,
            max_hearts,
            last_refill_at: None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.hearts >= self.max_hearts
    }

    /// Apply regeneration up to `now` and move the clock baseline forward.
    ///
    /// Only whole intervals are consumed from the baseline, so progress
    /// toward the next heart survives the refresh. The maximum follows the
    /// economy's configured `max_hearts`.
    pub fn refresh(&mut self, economy: &HeartEconomy, now: DateTime<Utc>) -> RegenResult {
        self.adopt_max(economy.max_hearts);

        let result = economy.regenerate(self.hearts, self.max_hearts, self.last_refill_at, now);

        if self.hearts < self.max_hearts {
            match self.last_refill_at {
                None => self.last_refill_at = Some(now),
                Some(baseline) if result.hearts_to_refill > 0 => {
                    self.last_refill_at = if result.hearts >= self.max_hearts {
                        Some(now)
                    } else {
                        Some(baseline + economy.refill_interval * result.hearts_to_refill as i32)
                    };
                }
                Some(_) => {}
            }
        }

        self.hearts = result.hearts;
        result
    }

    fn adopt_max(&mut self, max_hearts: u32) {
        if self.max_hearts == max_hearts {
            return;
        }
        log::debug!("Heart maximum changed: {} -> {}", self.max_hearts, max_hearts);

        // A balance that was full starts its clock fresh under a raised maximum
        if self.is_full() {
            self.last_refill_at = None;
        }
        self.max_hearts = max_hearts;
        self.hearts = self.hearts.min(max_hearts);
    }

    /// Spend `n` hearts, saturating at zero.
    ///
    /// Spending from a full balance starts a fresh regeneration clock; a
    /// baseline left over from the last refill would otherwise pay out
    /// immediately.
    pub fn spend(&mut self, n: u32, now: DateTime<Utc>) {
        let baseline = if self.is_full() {
            None
        } else {
            self.last_refill_at
        };
        let result = HeartEconomy::spend(self.hearts, n, self.max_hearts, baseline, now);
        self.hearts = result.hearts;
        self.last_refill_at = Some(result.last_refill_at);
    }
}

/// Outcome of a regeneration check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenResult {
    pub hearts: u32,
    /// When the next heart arrives; `None` once the balance is full
    pub next_refill_at: Option<DateTime<Utc>>,
    /// Hearts gained by this check
    pub hearts_to_refill: u32,
}

/// Outcome of spending hearts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendResult {
    pub hearts: u32,
    pub last_refill_at: DateTime<Utc>,
}
