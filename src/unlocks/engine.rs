//! Idempotent card granting

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{UnlockContext, UserCardUnlock};
use super::rules::{evaluate_card, UnlockDiagnostic};
use crate::catalog::Card;
use crate::storage::StorageError;

type Result<T> = std::result::Result<T, StorageError>;

/// Persistence seam for card ownership.
///
/// Implementations must enforce uniqueness of (user, card): creating an
/// existing pair is a no-op that returns `Ok(false)`, never a second record.
pub trait UnlockStore {
    fn owned_cards(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;

    /// Returns `true` if the record was created by this call
    fn create_unlock(&self, unlock: &UserCardUnlock) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDiagnostic {
    pub card_id: Uuid,
    pub diagnostic: UnlockDiagnostic,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockReport {
    /// Cards granted by this call
    pub unlocked: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<CardDiagnostic>,
}

/// Grant every card whose condition is now satisfied and that the user
/// does not own yet
pub fn unlock_all<S: UnlockStore + ?Sized>(
    store: &S,
    cards: &[Card],
    user_id: Uuid,
    context: &UnlockContext,
    now: DateTime<Utc>,
) -> Result<UnlockReport> {
    let owned = store.owned_cards(user_id)?;
    let mut report = UnlockReport::default();

    for card in cards.iter().filter(|c| !owned.contains(&c.id)) {
        let outcome = evaluate_card(card, user_id, context);
        if let Some(diagnostic) = outcome.diagnostic {
            report.diagnostics.push(CardDiagnostic {
                card_id: card.id,
                diagnostic,
            });
        }
        if !outcome.satisfied {
            continue;
        }

        // A concurrent call may have granted the card since `owned` was read
        if store.create_unlock(&UserCardUnlock::new(user_id, card.id, now))? {
            log::info!("User {} unlocked card '{}' ({})", user_id, card.name, card.id);
            report.unlocked.push(card.id);
        } else {
            log::debug!("Card {} already owned by user {}", card.id, user_id);
        }
    }

    Ok(report)
}

/// In-process unlock store
#[derive(Debug, Default)]
pub struct MemoryUnlockStore {
    unlocks: Mutex<HashMap<Uuid, HashMap<Uuid, UserCardUnlock>>>,
}

impl MemoryUnlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unlocks_for(&self, user_id: Uuid) -> Result<Vec<UserCardUnlock>> {
        let unlocks = self.unlocks.lock().map_err(|e| {
            StorageError::InvalidOperation(format!("Failed to lock unlock store: {}", e))
        })?;
        Ok(unlocks
            .get(&user_id)
            .map(|cards| cards.values().cloned().collect())
            .unwrap_or_default())
    }
}

impl UnlockStore for MemoryUnlockStore {
    fn owned_cards(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let unlocks = self.unlocks.lock().map_err(|e| {
            StorageError::InvalidOperation(format!("Failed to lock unlock store: {}", e))
        })?;
        Ok(unlocks
            .get(&user_id)
            .map(|cards| cards.keys().copied().collect())
            .unwrap_or_default())
    }

    fn create_unlock(&self, unlock: &UserCardUnlock) -> Result<bool> {
        let mut unlocks = self.unlocks.lock().map_err(|e| {
            StorageError::InvalidOperation(format!("Failed to lock unlock store: {}", e))
        })?;
        let cards = unlocks.entry(unlock.user_id).or_default();
        if cards.contains_key(&unlock.card_id) {
            return Ok(false);
        }
        cards.insert(unlock.card_id, unlock.clone());
        Ok(true)
    }
}
