//! Settings and whitelist collaborators
//!
//! Storage failures never reach the caller: reads fall back to defaults and
//! writes report `false`, both logged at warn level.

mod settings;
mod store;
mod whitelist;

pub use settings::{Settings, SettingsPatch};
pub use store::{KeyValueStore, MemoryStore, StorageError};
pub use whitelist::normalize_domain;

use serde::de::DeserializeOwned;

pub const SETTINGS_KEY: &str = "settings";
pub const WHITELIST_KEY: &str = "whitelist";

/// Settings and whitelist over a key-value store
#[derive(Debug, Clone, Default)]
pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Stored settings, or the defaults when missing or unreadable
    pub fn get_settings(&self) -> Settings {
        self.load(SETTINGS_KEY).unwrap_or_default()
    }

    /// Merge `patch` into the stored settings
    pub fn update_settings(&mut self, patch: SettingsPatch) -> bool {
        let mut settings = self.get_settings();
        settings.merge(patch);
        self.save(SETTINGS_KEY, &settings)
    }

    pub fn is_whitelisted(&self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        !domain.is_empty() && self.get_whitelist().contains(&domain)
    }

    /// Add a domain; false if it was already present or could not be saved
    pub fn add_to_whitelist(&mut self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return false;
        }
        let mut whitelist = self.get_whitelist();
        if whitelist.contains(&domain) {
            return false;
        }
        whitelist.push(domain);
        self.save(WHITELIST_KEY, &whitelist)
    }

    /// Remove a domain; false if it was absent or could not be saved
    pub fn remove_from_whitelist(&mut self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        let mut whitelist = self.get_whitelist();
        let Some(position) = whitelist.iter().position(|d| *d == domain) else {
            return false;
        };
        whitelist.remove(position);
        self.save(WHITELIST_KEY, &whitelist)
    }

    /// Normalized domains in insertion order; empty on failure
    pub fn get_whitelist(&self) -> Vec<String> {
        self.load(WHITELIST_KEY).unwrap_or_default()
    }

    pub fn clear_whitelist(&mut self) -> bool {
        self.save(WHITELIST_KEY, &Vec::<String>::new())
    }

    /// Whether the engine should run on `url`
    pub fn should_run(&self, url: &str) -> bool {
        self.get_settings().enabled && !self.is_whitelisted(url)
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read(key).unwrap_or_else(|err| {
            tracing::warn!("failed to read {}: {}", key, err);
            None
        })
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(value) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| StorageError::Malformed {
                key: key.to_string(),
                reason: err.to_string(),
            })
    }

    fn save<T: serde::Serialize>(&mut self, key: &str, value: &T) -> bool {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("failed to encode {}: {}", key, err);
                return false;
            }
        };
        match self.store.set(key, value) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("failed to write {}: {}", key, err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::DisplayMode;

    fn prefs() -> Preferences<MemoryStore> {
        Preferences::new(MemoryStore::new())
    }

    #[test]
    fn test_settings_default_and_update() {
        let mut prefs = prefs();
        assert_eq!(prefs.get_settings(), Settings::default());
        assert!(prefs.update_settings(SettingsPatch::mode(DisplayMode::Blur)));
        assert!(prefs.update_settings(SettingsPatch::enabled(false)));
        assert_eq!(
            prefs.get_settings(),
            Settings {
                mode: DisplayMode::Blur,
                enabled: false
            }
        );
        assert_eq!(
            prefs.store().raw(SETTINGS_KEY),
            Some(&serde_json::json!({"mode": "blur", "enabled": false}))
        );
    }

    #[test]
    fn test_storage_failure_yields_defaults() {
        let mut prefs = prefs();
        prefs.add_to_whitelist("example.com");
        prefs.store_mut().set_offline(true);
        assert_eq!(prefs.get_settings(), Settings::default());
        assert!(prefs.get_whitelist().is_empty());
        assert!(!prefs.update_settings(SettingsPatch::enabled(false)));
        assert!(!prefs.add_to_whitelist("other.org"));
        assert!(!prefs.is_whitelisted("example.com"));
    }

    #[test]
    fn test_malformed_values_yield_defaults() {
        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, serde_json::json!("not an object")).unwrap();
        store.set(WHITELIST_KEY, serde_json::json!({"a": 1})).unwrap();
        let prefs = Preferences::new(store);
        assert_eq!(prefs.get_settings(), Settings::default());
        assert!(prefs.get_whitelist().is_empty());
    }

    #[test]
    fn test_malformed_value_reported_with_key() {
        let mut store = MemoryStore::new();
        store.set(WHITELIST_KEY, serde_json::json!({"oops": true})).unwrap();
        let prefs = Preferences::new(store);

        let err = prefs.read::<Vec<String>>(WHITELIST_KEY).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { ref key, .. } if key == WHITELIST_KEY));
        assert!(prefs.get_whitelist().is_empty());
    }

    #[test]
    fn test_whitelist_normalizes() {
        let mut prefs = prefs();
        assert!(prefs.add_to_whitelist("https://www.Example.com/page"));
        assert!(prefs.is_whitelisted("example.com"));
        assert!(prefs.is_whitelisted("http://example.com/other"));
        assert!(!prefs.add_to_whitelist("example.com"));
        assert!(prefs.add_to_whitelist("news.site"));
        assert_eq!(prefs.get_whitelist(), vec!["example.com", "news.site"]);

        assert!(prefs.remove_from_whitelist("WWW.example.com"));
        assert!(!prefs.remove_from_whitelist("example.com"));
        assert!(prefs.clear_whitelist());
        assert!(prefs.get_whitelist().is_empty());
    }

    #[test]
    fn test_should_run() {
        let mut prefs = prefs();
        assert!(prefs.should_run("https://example.com/"));
        prefs.add_to_whitelist("example.com");
        assert!(!prefs.should_run("https://www.example.com/a"));
        assert!(prefs.should_run("https://other.com/"));
        prefs.update_settings(SettingsPatch::enabled(false));
        assert!(!prefs.should_run("https://other.com/"));
    }
}
