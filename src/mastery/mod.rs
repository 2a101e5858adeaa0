//! Lesson mastery and spaced repetition
//!
//! This module provides:
//! - Per-lesson progress records
//! - The 0-5 mastery state machine
//! - Review scheduling and mastery decay

pub mod models;
pub mod scheduler;

pub use models::*;
pub use scheduler::MasterySchedule;
