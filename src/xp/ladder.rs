//! Level ladder: cumulative XP to level

use serde::{Deserialize, Serialize};

/// Minimum total XP for each level, level 1 first
pub const DEFAULT_THRESHOLDS: [u64; 15] = [
    0, 100, 250, 500, 1000, 2000, 3500, 5500, 8000, 12000, 17000, 25000, 35000, 50000, 70000,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelLadder {
    thresholds: Vec<u64>,
}

impl Default for LevelLadder {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLDS.to_vec())
    }
}

/// Position of a user within their current level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub current_level: u32,
    pub xp_in_level: u64,
    /// XP span of the current level; `None` at the top level
    pub xp_for_next_level: Option<u64>,
    /// 0-100, always 100 at the top level
    pub progress_percent: f64,
}

impl LevelLadder {
    /// `thresholds` must be ascending and start at 0 (checked by config validation)
    pub fn new(thresholds: Vec<u64>) -> Self {
        Self { thresholds }
    }

    pub fn max_level(&self) -> u32 {
        self.thresholds.len().max(1) as u32
    }

    pub fn calculate_level(&self, xp: u64) -> u32 {
        let reached = self.thresholds.partition_point(|threshold| *threshold <= xp);
        reached.max(1) as u32
    }

    pub fn progress(&self, xp: u64) -> LevelProgress {
        let current_level = self.calculate_level(xp);
        let index = (current_level - 1) as usize;
        let floor = self.thresholds.get(index).copied().unwrap_or(0);
        let xp_in_level = xp.saturating_sub(floor);

        match self.thresholds.get(index + 1) {
            Some(next) => {
                let span = next - floor;
                let percent = (xp_in_level as f64 / span as f64 * 100.0).clamp(0.0, 100.0);
                LevelProgress {
                    current_level,
                    xp_in_level,
                    xp_for_next_level: Some(span),
                    progress_percent: percent,
                }
            }
            None => LevelProgress {
                current_level,
                xp_in_level,
                xp_for_next_level: None,
                progress_percent: 100.0,
            },
        }
    }

    pub fn leveled_up(&self, old_xp: u64, new_xp: u64) -> bool {
        self.calculate_level(new_xp) > self.calculate_level(old_xp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_xp_is_level_one() {
        assert_eq!(LevelLadder::default().calculate_level(0), 1);
    }

    #[test]
    fn test_threshold_boundaries() {
        let ladder = LevelLadder::default();
        assert_eq!(ladder.calculate_level(99), 1);
        assert_eq!(ladder.calculate_level(100), 2);
        assert_eq!(ladder.calculate_level(249), 2);
        assert_eq!(ladder.calculate_level(250), 3);
        assert_eq!(ladder.calculate_level(1000), 5);
        assert_eq!(ladder.calculate_level(69_999), 14);
        assert_eq!(ladder.calculate_level(70_000), 15);
        assert_eq!(ladder.calculate_level(1_000_000), 15);
    }

    #[test]
    fn test_level_is_monotonic() {
        let ladder = LevelLadder::default();
        let mut previous = ladder.calculate_level(0);
        for xp in (0..80_000).step_by(37) {
            let level = ladder.calculate_level(xp);
            assert!(level >= previous, "level dropped at {} xp", xp);
            previous = level;
        }
    }

    #[test]
    fn test_progress_mid_level() {
        let progress = LevelLadder::default().progress(175);
        assert_eq!(progress.current_level, 2);
        assert_eq!(progress.xp_in_level, 75);
        assert_eq!(progress.xp_for_next_level, Some(150));
        assert!((progress.progress_percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_at_max_level() {
        let progress = LevelLadder::default().progress(80_000);
        assert_eq!(progress.current_level, 15);
        assert_eq!(progress.xp_in_level, 10_000);
        assert_eq!(progress.xp_for_next_level, None);
        assert_eq!(progress.progress_percent, 100.0);
    }

    #[test]
    fn test_leveled_up() {
        let ladder = LevelLadder::default();
        assert!(ladder.leveled_up(95, 105));
        assert!(!ladder.leveled_up(105, 200));
        assert_eq!(ladder.max_level(), 15);
    }
}
