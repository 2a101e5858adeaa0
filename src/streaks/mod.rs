//! Daily streak and daily goal tracking

pub mod daily_goal;
pub mod models;
pub mod tracker;

pub use daily_goal::DailyGoalState;
pub use models::*;
pub use tracker::{local_day, resolve_timezone, StreakTracker};
