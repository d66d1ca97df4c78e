//! State Dynamics: how activity, patterns and time move the emotion state
//!
//! Three entry points mutate an [`EmotionState`] in place:
//! - [`EiDynamics::apply_activity`]: event-driven partial update
//! - [`EiDynamics::apply_pattern`]: behavioural pattern normalization
//! - [`EiDynamics::decay`]: time-driven relaxation with the stabilization rule
//!
//! All coefficients are tunable constants. The defaults are the values the
//! engine has always shipped with; they are heuristics, not measurements.

use crate::signal::{ActivityEvent, PatternSignal};
use crate::state::{clamp_unit, EmotionState};
use serde::{Deserialize, Serialize};

/// Coefficients of the EI dynamics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EiDynamics {
    // === Typing ===
    pub typing_focus_gain: f64,
    pub typing_energy_cost: f64,
    /// Intensity above which typing adds stress
    pub typing_stress_threshold: f64,
    pub typing_stress_gain: f64,

    // === Mouse ===
    pub mouse_curiosity_gain: f64,
    /// Intensity above which mouse movement counts as a spike
    pub mouse_spike_threshold: f64,
    pub mouse_spike_stress: f64,
    pub mouse_spike_focus_cost: f64,
    pub jitter_stress_threshold: f64,
    pub jitter_stress_gain: f64,

    // === Flow ===
    pub flow_rhythm_threshold: f64,
    pub flow_stress_ceiling: f64,
    pub flow_gain: f64,

    // === Patterns ===
    pub deletion_threshold: u32,
    pub deletion_stress_gain: f64,
    pub deletion_curiosity_gain: f64,
    pub repetition_stress_gain: f64,
    pub repetition_energy_factor: f64,
    pub hesitation_focus_threshold: f64,
    pub hesitation_curiosity_gain: f64,
    pub hesitation_energy_factor: f64,
    pub late_night_energy_factor: f64,
    pub late_night_stress_factor: f64,

    // === Decay (per second) ===
    pub stress_decay_rate: f64,
    pub focus_decay_rate: f64,
    pub energy_recovery_rate: f64,
    pub flow_decay_rate: f64,

    // === Stabilization ===
    /// Focus above which stress is damped every tick
    pub calm_focus_threshold: f64,
    pub calm_stress_factor: f64,
    /// Damped stress below this snaps to zero
    pub stress_snap_floor: f64,
}

impl Default for EiDynamics {
    fn default() -> Self {
        Self {
            typing_focus_gain: 0.05,
            typing_energy_cost: 0.01,
            typing_stress_threshold: 0.8,
            typing_stress_gain: 0.02,

            mouse_curiosity_gain: 0.02,
            mouse_spike_threshold: 0.9,
            mouse_spike_stress: 0.05,
            mouse_spike_focus_cost: 0.02,
            jitter_stress_threshold: 0.5,
            jitter_stress_gain: 0.03,

            flow_rhythm_threshold: 0.7,
            flow_stress_ceiling: 0.5,
            flow_gain: 0.02,

            deletion_threshold: 2,
            deletion_stress_gain: 0.03,
            deletion_curiosity_gain: 0.05,
            repetition_stress_gain: 0.05,
            repetition_energy_factor: 0.8,
            hesitation_focus_threshold: 0.6,
            hesitation_curiosity_gain: 0.1,
            hesitation_energy_factor: 0.9,
            late_night_energy_factor: 0.8,
            late_night_stress_factor: 0.7,

            stress_decay_rate: 0.05,
            focus_decay_rate: 0.02,
            energy_recovery_rate: 0.01,
            flow_decay_rate: 0.01,

            calm_focus_threshold: 0.8,
            calm_stress_factor: 0.9,
            stress_snap_floor: 0.1,
        }
    }
}

impl EiDynamics {
    /// Apply one activity sample. Input fields are sanitized first.
    pub fn apply_activity(&self, state: &mut EmotionState, event: ActivityEvent) {
        let event = event.sanitized();
        let v = &mut state.vector;
        let sub = &mut state.sub;

        match event {
            ActivityEvent::Typing { intensity, variance } => {
                v.focus += self.typing_focus_gain * intensity;
                v.energy -= self.typing_energy_cost * intensity;
                if intensity > self.typing_stress_threshold {
                    v.stress += self.typing_stress_gain;
                }
                sub.typing_rhythm = clamp_unit(1.0 - variance);
            }
            ActivityEvent::Mouse { intensity, jitter } => {
                v.curiosity += self.mouse_curiosity_gain * intensity;
                if intensity > self.mouse_spike_threshold {
                    v.stress += self.mouse_spike_stress;
                    v.focus -= self.mouse_spike_focus_cost;
                }
                if jitter > 0.0 {
                    sub.physical_jitter = sub.physical_jitter.max(jitter);
                    if jitter > self.jitter_stress_threshold {
                        v.stress += self.jitter_stress_gain * jitter;
                    }
                }
            }
        }

        if sub.typing_rhythm > self.flow_rhythm_threshold && v.stress < self.flow_stress_ceiling {
            sub.flow_intensity =
                clamp_unit(sub.flow_intensity + self.flow_gain * event.intensity());
            v.flow = sub.flow_intensity;
        }

        state.normalize();
    }

    /// Fold detected behaviour patterns into the state.
    ///
    /// Branches are independent and run in a fixed order. Additive steps
    /// saturate immediately so later multiplicative steps act on a bounded
    /// value. Produces no advice, only state.
    pub fn apply_pattern(&self, state: &mut EmotionState, signal: PatternSignal) {
        let v = &mut state.vector;

        if signal.deletions > self.deletion_threshold {
            let gain = self.deletion_stress_gain * f64::from(signal.deletions);
            v.stress = clamp_unit(v.stress + gain);
            v.curiosity = clamp_unit(v.curiosity + self.deletion_curiosity_gain);
        }

        if signal.repetition {
            v.stress = clamp_unit(v.stress + self.repetition_stress_gain);
            v.energy *= self.repetition_energy_factor;
        }

        if signal.hesitation && v.focus > self.hesitation_focus_threshold {
            v.curiosity = clamp_unit(v.curiosity + self.hesitation_curiosity_gain);
            v.energy *= self.hesitation_energy_factor;
        }

        if signal.late_night {
            v.energy *= self.late_night_energy_factor;
            v.stress *= self.late_night_stress_factor;
        }

        state.normalize();
    }

    /// Advance the state by `dt` seconds without input.
    ///
    /// `dt` must already be bounded by the caller.
    pub fn decay(&self, state: &mut EmotionState, dt: f64) {
        let v = &mut state.vector;
        let sub = &mut state.sub;

        v.stress -= self.stress_decay_rate * dt;
        v.focus -= self.focus_decay_rate * dt;
        v.energy += self.energy_recovery_rate * dt;
        sub.flow_intensity = clamp_unit(sub.flow_intensity - self.flow_decay_rate * dt);
        v.flow = sub.flow_intensity;

        if v.focus > self.calm_focus_threshold {
            v.stress *= self.calm_stress_factor;
            if v.stress < self.stress_snap_floor {
                v.stress = 0.0;
            }
        }

        state.normalize();
    }
}
