use async_trait::async_trait;
use etherea_core::{PreferenceStore, StoreError};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local preference store for hosts without a database.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferences {
    async fn set_preference(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_preference(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }
}
