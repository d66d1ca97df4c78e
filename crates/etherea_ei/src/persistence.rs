//! Rate-limited persistence of the emotion vector
//!
//! Writes are best-effort telemetry. The throttle bounds write volume to the
//! external store; it plays no part in the emotion model itself.

use etherea_core::{EmotionVector, PreferenceStore, StoreError, LAST_EMOTION_KEY};

/// Decides when the next `last_emotion` write is due.
#[derive(Debug, Clone)]
pub struct SaveThrottle {
    /// Engine seconds between unconditional writes
    pub interval: f64,
    /// Stress movement that forces an early write
    pub stress_delta: f64,
    last_save: Option<f64>,
    last_saved_stress: f64,
}

impl Default for SaveThrottle {
    fn default() -> Self {
        Self::new(30.0, 0.15)
    }
}

impl SaveThrottle {
    pub fn new(interval: f64, stress_delta: f64) -> Self {
        Self {
            interval,
            stress_delta,
            last_save: None,
            last_saved_stress: 0.0,
        }
    }

    pub fn is_due(&self, now: f64, stress: f64) -> bool {
        let interval_elapsed = match self.last_save {
            None => true,
            Some(t) => now - t >= self.interval,
        };
        interval_elapsed || (stress - self.last_saved_stress).abs() > self.stress_delta
    }

    /// Record a successful write. Failed writes leave the throttle untouched
    /// so the next tick retries.
    pub fn mark_saved(&mut self, now: f64, stress: f64) {
        self.last_save = Some(now);
        self.last_saved_stress = stress;
    }
}

/// Serialize and write one vector under [`LAST_EMOTION_KEY`].
pub async fn save_emotion(
    store: &dyn PreferenceStore,
    vector: &EmotionVector,
) -> Result<(), StoreError> {
    let value = serde_json::to_string(vector)?;
    store.set_preference(LAST_EMOTION_KEY, &value).await
}

/// Read back the last persisted vector.
///
/// Missing, unreadable or unparsable values yield `None`; the caller starts
/// from defaults in that case.
pub async fn load_last_emotion(store: &dyn PreferenceStore) -> Option<EmotionVector> {
    let raw = match store.get_preference(LAST_EMOTION_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Could not read last emotion: {}", e);
            return None;
        }
    };

    match serde_json::from_str::<EmotionVector>(&raw) {
        Ok(v) => Some(v.normalized()),
        Err(e) => {
            tracing::warn!("Ignoring unparsable last emotion {:?}: {}", raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<String, String>>);

    #[async_trait]
    impl PreferenceStore for MapStore {
        async fn set_preference(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get_preference(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }
    }

    #[test]
    fn first_check_is_due() {
        let throttle = SaveThrottle::default();
        assert!(throttle.is_due(0.0, 0.0));
    }

    #[test]
    fn interval_gates_writes() {
        let mut throttle = SaveThrottle::default();
        throttle.mark_saved(1.0, 0.2);
        assert!(!throttle.is_due(10.0, 0.2));
        assert!(!throttle.is_due(30.9, 0.2));
        assert!(throttle.is_due(31.0, 0.2));
    }

    #[test]
    fn stress_jump_forces_write() {
        let mut throttle = SaveThrottle::default();
        throttle.mark_saved(1.0, 0.2);
        assert!(!throttle.is_due(2.0, 0.3));
        assert!(throttle.is_due(2.0, 0.4));
        assert!(throttle.is_due(2.0, 0.0));
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = MapStore::default();
        let v = EmotionVector {
            stress: 0.7,
            ..Default::default()
        };
        save_emotion(&store, &v).await.unwrap();
        assert_eq!(load_last_emotion(&store).await, Some(v));
    }

    #[tokio::test]
    async fn load_missing_or_garbage_is_none() {
        let store = MapStore::default();
        assert_eq!(load_last_emotion(&store).await, None);

        store
            .set_preference(LAST_EMOTION_KEY, "{'focus': 0.5}")
            .await
            .unwrap();
        assert_eq!(load_last_emotion(&store).await, None);
    }

    #[tokio::test]
    async fn loaded_vector_is_clamped() {
        let store = MapStore::default();
        store
            .set_preference(
                LAST_EMOTION_KEY,
                r#"{"focus":1.5,"stress":-0.2,"energy":0.5,"curiosity":0.5,"flow":0.0}"#,
            )
            .await
            .unwrap();
        let v = load_last_emotion(&store).await.unwrap();
        assert_eq!(v.focus, 1.0);
        assert_eq!(v.stress, 0.0);
    }
}
