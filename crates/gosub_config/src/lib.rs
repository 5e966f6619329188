//! Configuration store for the gosub DOM crates.
//!
//! All known settings, their types and defaults are declared in `settings.json`, which is compiled
//! into the binary. Values can be read from anywhere through [`config_store`] or the [`config!`]
//! macro. Writes are checked against the declared type of the setting.

pub mod errors;
pub mod settings;
pub mod storage;

use crate::errors::Error;
use crate::settings::{Setting, SettingInfo};
use crate::storage::MemoryStorageAdapter;
use gosub_shared::types::Result;
use lazy_static::lazy_static;
use log::warn;
use serde_derive::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::mem;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use wildmatch::WildMatch;

/// Settings are declared in a json file that is included in the binary.
const SETTINGS_JSON: &str = include_str!("./settings.json");

/// `StorageAdapter` is the interface for storing and retrieving settings.
pub trait StorageAdapter: Send + Sync {
    /// Retrieves a setting from the storage
    fn get(&self, key: &str) -> Option<Setting>;

    /// Stores a given setting. Adapters use interior mutability so the store can write through a
    /// shared reference.
    fn set(&self, key: &str, value: Setting);

    /// Retrieves all the settings in the storage in one go, used for preloading the store.
    fn all(&self) -> Result<HashMap<String, Setting>>;
}

lazy_static! {
    static ref CONFIG_STORE: RwLock<ConfigStore> = RwLock::new(ConfigStore::default());
}

/// Returns read access to the global config store
pub fn config_store() -> RwLockReadGuard<'static, ConfigStore> {
    CONFIG_STORE.read().unwrap_or_else(PoisonError::into_inner)
}

/// Returns write access to the global config store
pub fn config_store_write() -> RwLockWriteGuard<'static, ConfigStore> {
    CONFIG_STORE.write().unwrap_or_else(PoisonError::into_inner)
}

/// Reads a setting from the global store:
///
/// ```
/// use gosub_config::config;
/// let signal = config!(bool "dom.slots.signal_slotchange");
/// assert!(signal);
/// ```
///
/// Unknown keys read as the zero value of the requested type.
#[macro_export]
macro_rules! config {
    (string $key:expr) => {
        $crate::config_store()
            .get($key)
            .map_or_else(String::new, |setting| setting.to_string())
    };
    (bool $key:expr) => {
        $crate::config_store()
            .get($key)
            .is_some_and(|setting| setting.to_bool())
    };
    (uint $key:expr) => {
        $crate::config_store()
            .get($key)
            .map_or(0, |setting| setting.to_uint())
    };
    (sint $key:expr) => {
        $crate::config_store()
            .get($key)
            .map_or(0, |setting| setting.to_sint())
    };
    (map $key:expr) => {
        $crate::config_store()
            .get($key)
            .map_or_else(Vec::new, |setting| setting.to_map())
    };
}

/// Writes a setting to the global store. The write is rejected with a warning when the key is
/// unknown or the type does not match its declaration.
#[macro_export]
macro_rules! config_set {
    (string $key:expr, $val:expr) => {
        $crate::config_store().set($key, $crate::settings::Setting::String($val))
    };
    (bool $key:expr, $val:expr) => {
        $crate::config_store().set($key, $crate::settings::Setting::Bool($val))
    };
    (uint $key:expr, $val:expr) => {
        $crate::config_store().set($key, $crate::settings::Setting::UInt($val))
    };
    (sint $key:expr, $val:expr) => {
        $crate::config_store().set($key, $crate::settings::Setting::SInt($val))
    };
    (map $key:expr, $val:expr) => {
        $crate::config_store().set($key, $crate::settings::Setting::Map($val))
    };
}

/// `JsonEntry` is used for parsing the settings.json file
#[derive(Debug, Deserialize)]
struct JsonEntry {
    key: String,
    #[serde(rename = "type")]
    _entry_type: String,
    default: String,
    description: String,
}

/// Configuration storage is the place where the DOM crates find all configurable options
pub struct ConfigStore {
    /// Current values, writable through a shared reference
    settings: Mutex<HashMap<String, Setting>>,
    /// Descriptions, default values and type information per key
    settings_info: HashMap<String, SettingInfo>,
    /// Keys in declaration order
    setting_keys: Vec<String>,
    /// The storage adapter used for persisting and loading keys
    storage: Box<dyn StorageAdapter>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        let mut store = Self {
            settings: Mutex::new(HashMap::new()),
            settings_info: HashMap::new(),
            setting_keys: Vec::new(),
            storage: Box::new(MemoryStorageAdapter::new()),
        };

        if let Err(err) = store.populate_default_settings() {
            warn!("config: cannot load default settings: {err}");
        }
        store
    }
}

impl ConfigStore {
    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, Setting>> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets a new storage engine. Every setting found in the storage overwrites the current value.
    pub fn set_storage(&mut self, storage: Box<dyn StorageAdapter>) {
        self.storage = storage;

        match self.storage.all() {
            Ok(all_settings) => self.values().extend(all_settings),
            Err(err) => warn!("config: cannot read settings from storage: {err}"),
        }
    }

    /// Returns true when the store knows about the given key
    pub fn has(&self, key: &str) -> bool {
        self.values().contains_key(key)
    }

    /// Returns the keys that match the given search string (`?` and `*` are wildcards)
    pub fn find(&self, search: &str) -> Vec<String> {
        let search = WildMatch::new(search);

        self.setting_keys
            .iter()
            .filter(|key| search.matches(key))
            .cloned()
            .collect()
    }

    /// Retrieves information about the given key, or returns None when key is unknown
    pub fn get_info(&self, key: &str) -> Option<SettingInfo> {
        self.settings_info.get(key).cloned()
    }

    /// Returns the setting with the given key. Lookup order: current values, the storage adapter,
    /// the declared default. Unknown keys return `None`.
    pub fn get(&self, key: &str) -> Option<Setting> {
        if let Some(setting) = self.values().get(key) {
            return Some(setting.clone());
        }

        if let Some(setting) = self.storage.get(key) {
            self.values().insert(key.to_string(), setting.clone());
            return Some(setting);
        }

        if let Some(info) = self.settings_info.get(key) {
            return Some(info.default.clone());
        }

        warn!("config: setting {key} is not known");
        None
    }

    /// Sets the given setting to the given value and persists it in the storage. Only declared
    /// keys with a value of the declared type are accepted.
    pub fn set(&self, key: &str, value: Setting) {
        let Some(info) = self.settings_info.get(key) else {
            warn!("config: setting {key} is not known");
            return;
        };

        if mem::discriminant(&info.default) != mem::discriminant(&value) {
            warn!("config: setting {key} is of different type than setting expects");
            return;
        }

        self.values().insert(key.to_owned(), value.clone());
        self.storage.set(key, value);
    }

    /// Restores the declared default of a key
    pub fn reset(&self, key: &str) {
        if let Some(info) = self.settings_info.get(key) {
            self.set(key, info.default.clone());
        }
    }

    /// Populates the store from the settings.json file
    fn populate_default_settings(&mut self) -> Result<()> {
        let json_data: Value = serde_json::from_str(SETTINGS_JSON).map_err(Error::from)?;

        let Value::Object(data) = json_data else {
            return Err(Error::Config("settings.json must contain an object".into()).into());
        };

        for (section_prefix, section_entries) in data {
            let section_entries: Vec<JsonEntry> =
                serde_json::from_value(section_entries).map_err(Error::from)?;

            for entry in section_entries {
                let key = format!("{}.{}", section_prefix, entry.key);

                let info = SettingInfo {
                    key: key.clone(),
                    description: entry.description,
                    default: Setting::from_str(&entry.default)?,
                };

                self.setting_keys.push(key.clone());
                self.values().insert(key.clone(), info.default.clone());
                self.settings_info.insert(key, info);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_loaded() {
        let store = ConfigStore::default();
        assert_eq!(
            store.get("dom.slots.signal_slotchange"),
            Some(Setting::Bool(true))
        );
        assert_eq!(
            store.get("css3.selectors.max_nesting"),
            Some(Setting::UInt(32))
        );
        assert!(store.get_info("dom.traversal.log_adjustments").is_some());
    }

    #[test]
    fn set_and_get() {
        let store = ConfigStore::default();
        store.set("dom.traversal.log_adjustments", Setting::Bool(true));
        assert_eq!(
            store.get("dom.traversal.log_adjustments"),
            Some(Setting::Bool(true))
        );

        store.reset("dom.traversal.log_adjustments");
        assert_eq!(
            store.get("dom.traversal.log_adjustments"),
            Some(Setting::Bool(false))
        );
    }

    #[test]
    fn invalid_setting() {
        testing_logger::setup();

        let store = ConfigStore::default();
        store.set(
            "dom.slots.signal_slotchange",
            Setting::String("wont accept strings".into()),
        );

        testing_logger::validate(|captured_logs| {
            assert_eq!(captured_logs.len(), 1);
            assert_eq!(captured_logs[0].level, log::Level::Warn);
        });
        assert_eq!(
            store.get("dom.slots.signal_slotchange"),
            Some(Setting::Bool(true))
        );
    }

    #[test]
    fn unknown_key() {
        testing_logger::setup();

        let store = ConfigStore::default();
        assert!(store.get("this.key.doesnt.exist").is_none());
        store.set("this.key.doesnt.exist", Setting::Bool(true));
        assert!(!store.has("this.key.doesnt.exist"));

        testing_logger::validate(|captured_logs| {
            assert_eq!(captured_logs.len(), 2);
        });
    }

    #[test]
    fn find_with_wildcards() {
        let store = ConfigStore::default();
        let keys = store.find("dom.*");
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&"dom.slots.signal_slotchange".to_string()));
        assert_eq!(store.find("css3.selectors.max_?esting").len(), 1);
    }

    #[test]
    fn storage_overrides_defaults() {
        let storage = MemoryStorageAdapter::new();
        storage.set("css3.selectors.max_nesting", Setting::UInt(4));

        let mut store = ConfigStore::default();
        store.set_storage(Box::new(storage));
        assert_eq!(store.get("css3.selectors.max_nesting"), Some(Setting::UInt(4)));
    }

    #[test]
    fn macro_usage() {
        let max = config!(uint "css3.selectors.max_nesting");
        assert!(max > 0);
        assert_eq!(config!(string "this.key.doesnt.exist"), "");
        assert!(!config!(bool "this.key.doesnt.exist"));
    }
}
