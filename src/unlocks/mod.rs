//! Collectible card unlocking
//!
//! This module provides:
//! - The closed vocabulary of unlock conditions, parsed once from their
//!   persisted JSON form
//! - Rule evaluation against a user's progression context
//! - Idempotent granting through the `UnlockStore` seam

pub mod engine;
pub mod models;
pub mod rules;

pub use engine::{unlock_all, MemoryUnlockStore, UnlockReport, UnlockStore};
pub use models::*;
pub use rules::{evaluate, evaluate_card, RuleOutcome, UnlockDiagnostic};
