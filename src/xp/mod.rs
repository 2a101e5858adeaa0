//! Experience points and levels

pub mod engine;
pub mod ladder;

pub use engine::{AttemptMode, XpBonuses, XpBreakdown, XpRules};
pub use ladder::{LevelLadder, LevelProgress};
