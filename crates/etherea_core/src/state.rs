//! Emotion state model
//!
//! The published [`EmotionVector`] and the internal [`SubState`] that feeds it.
//! Every scalar lives in `[0.0, 1.0]` and is finite; anything else is
//! normalized before it can reach arithmetic.

use serde::{Deserialize, Serialize};

/// Value substituted for NaN/Infinity at every input boundary.
pub const NEUTRAL: f64 = 0.5;

/// Guard against NaN and Infinity.
/// Non-finite values are replaced by [`NEUTRAL`].
#[inline]
pub fn sanitize(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        tracing::warn!("NaN/Inf detected in emotion input, resetting to {}", NEUTRAL);
        NEUTRAL
    }
}

/// Sanitize then clamp into the unit interval.
#[inline]
pub fn clamp_unit(v: f64) -> f64 {
    sanitize(v).clamp(0.0, 1.0)
}

/// The published emotion estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionVector {
    pub focus: f64,
    pub stress: f64,
    pub energy: f64,
    pub curiosity: f64,
    /// Mirrors `SubState::flow_intensity`
    pub flow: f64,
}

impl Default for EmotionVector {
    fn default() -> Self {
        Self {
            focus: 0.5,
            stress: 0.2,
            energy: 0.5,
            curiosity: 0.5,
            flow: 0.0,
        }
    }
}

impl EmotionVector {
    /// Clamp all values to valid ranges
    pub fn normalize(&mut self) {
        self.focus = clamp_unit(self.focus);
        self.stress = clamp_unit(self.stress);
        self.energy = clamp_unit(self.energy);
        self.curiosity = clamp_unit(self.curiosity);
        self.flow = clamp_unit(self.flow);
    }

    /// Copy with every field normalized.
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Field values in declaration order.
    pub fn fields(&self) -> [f64; 5] {
        [self.focus, self.stress, self.energy, self.curiosity, self.flow]
    }

    /// True when every field is finite and inside `[0, 1]`.
    pub fn is_bounded(&self) -> bool {
        self.fields()
            .iter()
            .all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }
}

/// Internal quantities that feed the published vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubState {
    /// Accumulates while typing is steady and stress is low
    pub flow_intensity: f64,
    /// Inverse of recent typing variance
    pub typing_rhythm: f64,
    /// High-water mark of mouse jitter, never averaged
    pub physical_jitter: f64,
}

impl Default for SubState {
    fn default() -> Self {
        Self {
            flow_intensity: 0.0,
            typing_rhythm: 0.5,
            physical_jitter: 0.0,
        }
    }
}

impl SubState {
    pub fn normalize(&mut self) {
        self.flow_intensity = clamp_unit(self.flow_intensity);
        self.typing_rhythm = clamp_unit(self.typing_rhythm);
        self.physical_jitter = clamp_unit(self.physical_jitter);
    }
}

/// Vector and sub-state, always mutated together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionState {
    pub vector: EmotionVector,
    pub sub: SubState,
}

impl EmotionState {
    /// Re-derive `flow` and clamp everything.
    pub fn normalize(&mut self) {
        self.sub.normalize();
        self.vector.flow = self.sub.flow_intensity;
        self.vector.normalize();
    }
}
