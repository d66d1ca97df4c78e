//! # Etherea Core
//!
//! Shared vocabulary of the Emotional-Intelligence signal engine: the emotion
//! state model, the activity/pattern inputs, the dynamics that move the state,
//! configuration, and the seams through which the engine talks to its host.

pub mod config;
pub mod dynamics;
pub mod signal;
pub mod state;

pub use config::{EngineConfig, EthereaConfig, StorageConfig};
pub use dynamics::EiDynamics;
pub use signal::{ActivityEvent, PatternSignal, ProactiveTrigger};
pub use state::{clamp_unit, sanitize, EmotionState, EmotionVector, SubState, NEUTRAL};

use async_trait::async_trait;

/// Preference key under which the engine persists its latest vector.
pub const LAST_EMOTION_KEY: &str = "last_emotion";

/// Failure of a persistence sink. Never fatal to the engine.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("preference store unavailable: {0}")]
    Unavailable(String),
    #[error("failed to write preference '{key}': {reason}")]
    Write { key: String, reason: String },
    #[error("failed to read preference '{key}': {reason}")]
    Read { key: String, reason: String },
    #[error("failed to encode emotion vector: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key-value store the engine writes its rate-limited snapshots to.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn set_preference(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn get_preference(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Optional host-side signal bus.
///
/// Called after the state lock is released, from the tick path. Implementations
/// must return quickly; queue the value if real work is needed.
pub trait SignalSink: Send + Sync {
    fn emotion_updated(&self, vector: EmotionVector);
    fn proactive_trigger(&self, trigger: ProactiveTrigger);
}
