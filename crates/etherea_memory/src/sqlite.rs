use anyhow::{Context, Result};
use async_trait::async_trait;
use etherea_core::{PreferenceStore, StoreError};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::collections::BTreeMap;
use std::path::Path;

/// SQLite-backed `user_profile` key-value table.
#[derive(Clone)]
pub struct SqlitePreferences {
    pool: Pool<Sqlite>,
}

impl SqlitePreferences {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display());
        // single connection: keeps `:memory:` databases coherent and writes ordered
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_profile (
                key TEXT PRIMARY KEY,
                value TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create user_profile table")?;
        Ok(())
    }

    /// All stored preferences, ordered by key
    pub async fn profile(&self) -> Result<BTreeMap<String, String>> {
        let rows = sqlx::query("SELECT key, value FROM user_profile")
            .fetch_all(&self.pool)
            .await
            .context("Failed to query user_profile")?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let key: String = row.get("key");
                let value: Option<String> = row.get("value");
                (key, value.unwrap_or_default())
            })
            .collect())
    }
}

#[async_trait]
impl PreferenceStore for SqlitePreferences {
    async fn set_preference(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT OR REPLACE INTO user_profile (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        tracing::trace!("Preference '{}' saved", key);
        Ok(())
    }

    async fn get_preference(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM user_profile WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Read {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(row.and_then(|row| row.get::<Option<String>, _>("value")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherea_core::LAST_EMOTION_KEY;

    #[tokio::test]
    async fn test_set_and_get_preference() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqlitePreferences::new(dir.path().join("prefs.db"))
            .await
            .expect("Failed to open store");

        assert_eq!(store.get_preference("theme").await.unwrap(), None);

        store.set_preference("theme", "aurora").await.unwrap();
        assert_eq!(
            store.get_preference("theme").await.unwrap().as_deref(),
            Some("aurora")
        );

        // INSERT OR REPLACE overwrites
        store.set_preference("theme", "dusk").await.unwrap();
        assert_eq!(
            store.get_preference("theme").await.unwrap().as_deref(),
            Some("dusk")
        );
    }

    #[tokio::test]
    async fn test_profile_lists_all_pairs() {
        let store = SqlitePreferences::new(":memory:").await.unwrap();
        store.set_preference(LAST_EMOTION_KEY, "{}").await.unwrap();
        store.set_preference("name", "Ada").await.unwrap();

        let profile = store.profile().await.unwrap();
        assert_eq!(profile.len(), 2);
        assert_eq!(profile["name"], "Ada");
        assert_eq!(profile[LAST_EMOTION_KEY], "{}");
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");
        {
            let store = SqlitePreferences::new(&path).await.unwrap();
            store.set_preference("k", "v").await.unwrap();
            store.pool.close().await;
        }
        let store = SqlitePreferences::new(&path).await.unwrap();
        assert_eq!(store.get_preference("k").await.unwrap().as_deref(), Some("v"));
    }
}
