//! Learner settings: API key and model identifier
//!
//! Loaded once at startup, replaced only by an explicit save.

use crate::db::DbResult;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// Model used when none has been saved
pub const DEFAULT_MODEL: &str = "local-llama";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
}

impl Settings {
    /// Build settings, falling back to [`DEFAULT_MODEL`] for a blank model
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        let model = if model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model
        };
        Self {
            api_key: api_key.into(),
            model,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new("", DEFAULT_MODEL)
    }
}

/// Persistence backend for settings
pub trait SettingsStore: Send + Sync {
    /// Saved settings, or defaults if nothing was saved
    fn load(&self) -> DbResult<Settings>;

    /// Persist both values as one unit
    fn save(&self, settings: &Settings) -> DbResult<()>;
}

/// Store that lives only as long as the process
#[cfg(test)]
#[derive(Default)]
pub struct MemorySettingsStore {
    saved: std::sync::Mutex<Option<Settings>>,
}

#[cfg(test)]
impl MemorySettingsStore {
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            saved: std::sync::Mutex::new(Some(settings)),
        }
    }
}

#[cfg(test)]
impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> DbResult<Settings> {
        let saved = self.saved.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(saved.clone().unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> DbResult<()> {
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(settings.clone());
        Ok(())
    }
}

/// Process-wide settings with a cached copy in front of the store
pub struct SettingsService {
    store: Box<dyn SettingsStore>,
    current: RwLock<Settings>,
}

impl SettingsService {
    /// Load settings from `store` once
    pub fn load(store: impl SettingsStore + 'static) -> DbResult<Self> {
        let current = store.load()?;
        Ok(Self {
            store: Box::new(store),
            current: RwLock::new(current),
        })
    }

    pub fn get(&self) -> Settings {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Persist, then make the new values visible to `get`
    pub fn save(&self, api_key: &str, model: &str) -> DbResult<Settings> {
        let settings = Settings::new(api_key, model);
        self.store.save(&settings)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = settings.clone();
        tracing::info!(model = %settings.model, has_api_key = settings.has_api_key(), "Settings saved");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_defaults_when_never_saved() {
        let service = SettingsService::load(MemorySettingsStore::default()).unwrap();
        assert_eq!(service.get(), Settings::new("", "local-llama"));
        assert!(!service.get().has_api_key());
    }

    #[test]
    fn test_save_is_visible_to_get() {
        let service = SettingsService::load(MemorySettingsStore::default()).unwrap();
        service.save("sk-abc", "llama-3-8b").unwrap();
        assert_eq!(service.get(), Settings::new("sk-abc", "llama-3-8b"));
    }

    #[test]
    fn test_blank_model_normalizes_to_default() {
        let service = SettingsService::load(MemorySettingsStore::default()).unwrap();
        let saved = service.save("sk-abc", "   ").unwrap();
        assert_eq!(saved.model, DEFAULT_MODEL);
        assert_eq!(service.get().model, DEFAULT_MODEL);
    }

    #[test]
    fn test_whitespace_key_is_stored_but_not_usable() {
        let service = SettingsService::load(MemorySettingsStore::default()).unwrap();
        service.save("  ", "m").unwrap();
        assert_eq!(service.get().api_key, "  ");
        assert!(!service.get().has_api_key());
    }

    #[test]
    fn test_loads_existing_values_from_database() {
        let db = Database::open_in_memory().unwrap();
        db.save(&Settings::new("sk-db", "phi-3")).unwrap();

        let service = SettingsService::load(db.clone()).unwrap();
        assert_eq!(service.get(), Settings::new("sk-db", "phi-3"));

        service.save("sk-new", "phi-3").unwrap();
        assert_eq!(db.load().unwrap().api_key, "sk-new");
    }
}
