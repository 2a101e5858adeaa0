//! JSON file storage for user profiles and card unlocks
//!
//! Directory structure:
//! ```text
//! {data-dir}/
//! ├── profiles/
//! │   └── {user-id}.json   # UserProfile
//! └── unlocks/
//!     └── {user-id}.json   # Array of UserCardUnlock
//! ```
//!
//! Writers of the same profile are serialized through a per-user lock so
//! concurrent lesson completions cannot drop each other's updates.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::profile::UserProfile;
use crate::catalog::Catalog;
use crate::unlocks::{UnlockStore, UserCardUnlock};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Profile not found: {0}")]
    ProfileNotFound(Uuid),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub struct ProfileStorage {
    base_path: PathBuf,
    /// Writer locks of users with an operation in flight; an entry is
    /// removed when its last holder finishes
    user_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    unlock_lock: Mutex<()>,
}

impl ProfileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            user_locks: Mutex::new(HashMap::new()),
            unlock_lock: Mutex::new(()),
        }
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("kaizen"))
            .ok_or(StorageError::DataDirNotFound)
    }

    /// Initialize storage directories
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.profiles_dir())?;
        fs::create_dir_all(self.unlocks_dir())?;
        Ok(())
    }

    fn profiles_dir(&self) -> PathBuf {
        self.base_path.join("profiles")
    }

    fn unlocks_dir(&self) -> PathBuf {
        self.base_path.join("unlocks")
    }

    fn profile_path(&self, user_id: Uuid) -> PathBuf {
        self.profiles_dir().join(format!("{}.json", user_id))
    }

    fn unlocks_path(&self, user_id: Uuid) -> PathBuf {
        self.unlocks_dir().join(format!("{}.json", user_id))
    }

    fn user_lock(&self, user_id: Uuid) -> Result<Arc<Mutex<()>>> {
        let mut locks = self.user_locks.lock().map_err(|e| {
            StorageError::InvalidOperation(format!("Failed to lock user table: {}", e))
        })?;
        Ok(Arc::clone(locks.entry(user_id).or_default()))
    }

    /// Run `f` while holding the user's writer lock
    fn with_user_lock<T, E, F>(&self, user_id: Uuid, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: From<StorageError>,
    {
        let lock = self.user_lock(user_id)?;
        let result = {
            let _guard = lock.lock().map_err(|e| {
                StorageError::InvalidOperation(format!("Failed to lock profile: {}", e))
            })?;
            f()
        };

        drop(lock);
        self.release_user_lock(user_id);
        result
    }

    /// Forget the user's lock once no other operation holds it.
    ///
    /// New clones are only handed out under the table lock, so a count of 1
    /// seen here cannot grow before the entry is removed.
    fn release_user_lock(&self, user_id: Uuid) {
        let Ok(mut locks) = self.user_locks.lock() else {
            return;
        };
        if locks
            .get(&user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&user_id);
        }
    }

    // ===== Profile Operations =====

    pub fn profile_exists(&self, user_id: Uuid) -> bool {
        self.profile_path(user_id).exists()
    }

    pub fn load_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        let path = self.profile_path(user_id);
        if !path.exists() {
            return Err(StorageError::ProfileNotFound(user_id));
        }

        let content = fs::read_to_string(path)?;
        let profile: UserProfile = serde_json::from_str(&content)?;
        Ok(profile)
    }

    /// Create a profile with full hearts; an existing profile is returned as is
    pub fn create_profile(
        &self,
        user_id: Uuid,
        max_hearts: u32,
        timezone: &str,
    ) -> Result<UserProfile> {
        self.with_user_lock(user_id, || {
            if self.profile_exists(user_id) {
                return self.load_profile(user_id);
            }

            let mut profile = UserProfile::new(user_id, max_hearts, timezone.to_string());
            self.write_profile(&mut profile)?;
            log::info!("Created profile for user {}", user_id);
            Ok(profile)
        })
    }

    pub fn save_profile(&self, profile: &mut UserProfile) -> Result<()> {
        self.with_user_lock(profile.user_id, || self.write_profile(profile))
    }

    /// Read-modify-write a profile while holding the user's lock.
    ///
    /// The profile is only written back when `f` succeeds.
    pub fn update_profile<T, E, F>(&self, user_id: Uuid, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut UserProfile) -> std::result::Result<T, E>,
        E: From<StorageError>,
    {
        self.with_user_lock(user_id, || {
            let mut profile = self.load_profile(user_id)?;
            let result = f(&mut profile)?;
            self.write_profile(&mut profile)?;
            Ok(result)
        })
    }

    fn write_profile(&self, profile: &mut UserProfile) -> Result<()> {
        fs::create_dir_all(self.profiles_dir())?;
        profile.version += 1;
        profile.updated_at = Utc::now();

        let json = serde_json::to_string_pretty(profile)?;
        write_atomic(&self.profile_path(profile.user_id), &json)
    }

    pub fn list_profiles(&self) -> Result<Vec<Uuid>> {
        let dir = self.profiles_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| Uuid::parse_str(s).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    // ===== Unlock Operations =====

    pub fn list_unlocks(&self, user_id: Uuid) -> Result<Vec<UserCardUnlock>> {
        let path = self.unlocks_path(user_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)?;
        let unlocks: Vec<UserCardUnlock> = serde_json::from_str(&content)?;
        Ok(unlocks)
    }

    // ===== Catalog =====

    pub fn load_catalog(path: &Path) -> Result<Catalog> {
        let content = fs::read_to_string(path)?;
        let catalog = Catalog::from_json_str(&content)?;
        log::debug!(
            "Loaded catalog with {} lessons and {} cards",
            catalog.lessons.len(),
            catalog.cards.len()
        );
        Ok(catalog)
    }
}

impl UnlockStore for ProfileStorage {
    fn owned_cards(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self
            .list_unlocks(user_id)?
            .into_iter()
            .map(|u| u.card_id)
            .collect())
    }

    fn create_unlock(&self, unlock: &UserCardUnlock) -> Result<bool> {
        let _guard = self.unlock_lock.lock().map_err(|e| {
            StorageError::InvalidOperation(format!("Failed to lock unlocks: {}", e))
        })?;

        let mut unlocks = self.list_unlocks(unlock.user_id)?;
        if unlocks.iter().any(|u| u.card_id == unlock.card_id) {
            return Ok(false);
        }
        unlocks.push(unlock.clone());

        fs::create_dir_all(self.unlocks_dir())?;
        let json = serde_json::to_string_pretty(&unlocks)?;
        write_atomic(&self.unlocks_path(unlock.user_id), &json)?;
        Ok(true)
    }
}

/// Write through a temporary file so readers never see a partial document
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Card;
    use crate::unlocks::{unlock_all, UnlockCondition, UnlockContext};
    use tempfile::TempDir;

    fn create_test_storage() -> (ProfileStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = ProfileStorage::new(temp_dir.path().to_path_buf());
        storage.init().unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_create_and_load_profile() {
        let (storage, _temp) = create_test_storage();
        let user = Uuid::new_v4();

        let created = storage.create_profile(user, 5, "Europe/Madrid").unwrap();
        assert_eq!(created.hearts.hearts, 5);
        assert_eq!(created.version, 1);

        let loaded = storage.load_profile(user).unwrap();
        assert_eq!(loaded, created);
        assert_eq!(storage.list_profiles().unwrap(), vec![user]);

        // Creating again keeps the existing profile
        let again = storage.create_profile(user, 3, "UTC").unwrap();
        assert_eq!(again.hearts.max_hearts, 5);
    }

    #[test]
    fn test_missing_profile() {
        let (storage, _temp) = create_test_storage();
        let err = storage.load_profile(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StorageError::ProfileNotFound(_)));
    }

    #[test]
    fn test_update_profile_writes_on_success_only() {
        let (storage, _temp) = create_test_storage();
        let user = Uuid::new_v4();
        storage.create_profile(user, 5, "UTC").unwrap();

        storage
            .update_profile(user, |p| -> Result<()> {
                p.total_xp += 15;
                Ok(())
            })
            .unwrap();

        let failed: Result<()> = storage.update_profile(user, |p| {
            p.total_xp += 1000;
            Err(StorageError::InvalidOperation("rejected".to_string()))
        });
        assert!(failed.is_err());

        let profile = storage.load_profile(user).unwrap();
        assert_eq!(profile.total_xp, 15);
        assert_eq!(profile.version, 2);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let (storage, _temp) = create_test_storage();
        let user = Uuid::new_v4();
        storage.create_profile(user, 5, "UTC").unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    storage
                        .update_profile(user, |p| -> Result<()> {
                            p.total_xp += 10;
                            Ok(())
                        })
                        .unwrap();
                });
            }
        });

        let profile = storage.load_profile(user).unwrap();
        assert_eq!(profile.total_xp, 80);
        assert_eq!(profile.version, 9);

        // Finished writers leave no lock behind
        assert!(storage.user_locks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_user_locks_are_released() {
        let (storage, _temp) = create_test_storage();
        let users: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

        for user in &users {
            let mut profile = storage.create_profile(*user, 5, "UTC").unwrap();
            storage.save_profile(&mut profile).unwrap();
            storage
                .update_profile(*user, |p| -> Result<()> {
                    p.total_xp += 1;
                    Ok(())
                })
                .unwrap();
        }

        let failed: Result<()> = storage.update_profile(Uuid::new_v4(), |_| Ok(()));
        assert!(matches!(failed, Err(StorageError::ProfileNotFound(_))));

        assert!(storage.user_locks.lock().unwrap().is_empty());
        assert_eq!(storage.list_profiles().unwrap().len(), users.len());
    }

    #[test]
    fn test_file_unlocks_are_unique() {
        let (storage, _temp) = create_test_storage();
        let user = Uuid::new_v4();
        let cards = vec![Card {
            id: Uuid::new_v4(),
            name: "First steps".to_string(),
            description: None,
            chapter_id: None,
            condition: UnlockCondition::FirstLesson.into(),
        }];
        let context = UnlockContext {
            completed_lessons: 1,
            ..UnlockContext::default()
        };

        let reports: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        unlock_all(&storage, &cards, user, &context, Utc::now()).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let granted: usize = reports.iter().map(|r| r.unlocked.len()).sum();
        assert_eq!(granted, 1);
        assert_eq!(storage.list_unlocks(user).unwrap().len(), 1);
    }

    #[test]
    fn test_load_catalog() {
        let (_storage, temp) = create_test_storage();
        let path = temp.path().join("catalog.json");
        fs::write(&path, r#"{"lessons": [], "cards": []}"#).unwrap();

        let catalog = ProfileStorage::load_catalog(&path).unwrap();
        assert!(catalog.lessons.is_empty());
    }
}
