use crate::dynamics::EiDynamics;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EthereaConfig {
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    pub dynamics: EiDynamics,
}

impl EthereaConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse TOML config")
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ETHEREA_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Ok(v) = std::env::var("ETHEREA_TICK_MS") {
            if let Ok(n) = v.parse() {
                self.engine.tick_interval_ms = n;
            }
        }
        if let Ok(v) = std::env::var("ETHEREA_TRIGGER_COOLDOWN") {
            if let Ok(n) = v.parse() {
                self.engine.trigger_cooldown_secs = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Background tick period
    pub tick_interval_ms: u64,
    /// Minimum simulated seconds between two proactive triggers
    pub trigger_cooldown_secs: f64,
    /// Simulated seconds between unconditional persistence writes
    pub save_interval_secs: f64,
    /// Stress movement since the last write that forces an early write
    pub stress_save_delta: f64,
    /// Upper bound on a single tick's dt, absorbs scheduler jitter and suspension
    pub max_dt_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            trigger_cooldown_secs: 120.0,
            save_interval_secs: 30.0,
            stress_save_delta: 0.15,
            max_dt_secs: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    /// When false the engine runs without a persistence sink
    pub enabled: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "etherea.db".to_string(),
            enabled: true,
        }
    }
}
