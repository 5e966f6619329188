use crate::settings::Setting;
use crate::StorageAdapter;
use gosub_shared::types::Result;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Keeps settings for the lifetime of the process only
#[derive(Default)]
pub struct MemoryStorageAdapter {
    settings: Mutex<HashMap<String, Setting>>,
}

impl MemoryStorageAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: Mutex::new(HashMap::new()),
        }
    }
}

impl StorageAdapter for MemoryStorageAdapter {
    fn get(&self, key: &str) -> Option<Setting> {
        let lock = self.settings.lock().unwrap_or_else(PoisonError::into_inner);
        lock.get(key).cloned()
    }

    fn set(&self, key: &str, value: Setting) {
        let mut lock = self.settings.lock().unwrap_or_else(PoisonError::into_inner);
        lock.insert(key.to_owned(), value);
    }

    fn all(&self) -> Result<HashMap<String, Setting>> {
        let lock = self.settings.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(lock.clone())
    }
}
