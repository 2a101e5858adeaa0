use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

use kaizen_lib::catalog::Catalog;
use kaizen_lib::config::EngineConfig;
use kaizen_lib::session::ProgressionEngine;
use kaizen_lib::storage::{ProfileStorage, UserProfile};

/// Shared application state for CLI commands
pub struct App {
    pub config: EngineConfig,
    pub engine: ProgressionEngine,
    pub storage: ProfileStorage,
    pub catalog: Catalog,
}

impl App {
    /// Initialize from the given paths, falling back to the default data directory
    pub fn new(
        data_dir: Option<&Path>,
        config_path: Option<&Path>,
        catalog_path: Option<&Path>,
    ) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => ProfileStorage::default_data_dir().context("Failed to get data directory")?,
        };

        let storage = ProfileStorage::new(data_dir.clone());
        storage
            .init()
            .context("Failed to initialize profile storage")?;

        let config = match config_path {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };

        // An explicit catalog must exist; the default one is optional
        let catalog = match catalog_path {
            Some(path) => ProfileStorage::load_catalog(path)
                .with_context(|| format!("Failed to load catalog {}", path.display()))?,
            None => {
                let default_path = data_dir.join("catalog.json");
                if default_path.exists() {
                    ProfileStorage::load_catalog(&default_path).with_context(|| {
                        format!("Failed to load catalog {}", default_path.display())
                    })?
                } else {
                    Catalog::default()
                }
            }
        };

        Ok(Self {
            engine: ProgressionEngine::new(&config),
            config,
            storage,
            catalog,
        })
    }

    pub fn load_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        self.storage
            .load_profile(user_id)
            .with_context(|| format!("No profile for user {}", user_id))
    }

    /// Create the profile with full hearts unless it exists
    pub fn ensure_profile(&self, user_id: Uuid, timezone: &str) -> Result<UserProfile> {
        self.storage
            .create_profile(user_id, self.config.hearts.max_hearts, timezone)
            .context("Failed to create profile")
    }

    pub fn lesson_title(&self, lesson_id: Uuid) -> String {
        self.catalog
            .lesson(lesson_id)
            .map(|l| l.title.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| lesson_id.to_string())
    }
}
