//! Gamified learning progression engine
//!
//! Hearts gate lesson attempts, XP and levels reward them, streaks and the
//! daily goal track regular activity, mastery schedules reviews, and
//! collectible cards unlock as the user progresses. The engines are pure
//! functions of their inputs and an explicit `now`; `storage` and `session`
//! wire them to JSON files for the CLI.

pub mod catalog;
pub mod config;
pub mod hearts;
pub mod mastery;
pub mod session;
pub mod storage;
pub mod streaks;
pub mod unlocks;
pub mod xp;

pub use catalog::{Card, Catalog, Lesson};
pub use config::{ConfigError, EngineConfig};
pub use session::{CompletionOutcome, LessonAttempt, ProgressionEngine, SessionError};
pub use storage::{ProfileStorage, StorageError, UserProfile};
