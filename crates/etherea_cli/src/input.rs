//! JSON-lines activity feed
//!
//! One object per line. Keys name the event kind:
//! `{"typing": {"intensity": 0.8, "variance": 0.1}}`,
//! `{"mouse": {"intensity": 0.4, "jitter": 0.7}}`,
//! `{"pattern": {"deletions": 4, "late_night": true}}`.

use anyhow::{Context, Result};
use etherea_core::PatternSignal;
use etherea_ei::EiEngine;
use serde_json::Value;

pub fn apply_line(engine: &EiEngine, line: &str) -> Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    let value: Value = serde_json::from_str(line).context("Input line is not valid JSON")?;
    let events = value
        .as_object()
        .context("Input line must be a JSON object")?;

    for (kind, payload) in events {
        if kind == "pattern" {
            let signal: PatternSignal = serde_json::from_value(payload.clone())
                .with_context(|| format!("Invalid pattern signal: {}", payload))?;
            engine.on_pattern(signal);
        } else {
            engine.on_activity_payload(kind, payload);
        }
    }
    Ok(())
}
