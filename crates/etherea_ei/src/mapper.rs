//! Visual mapping of the emotion vector
//!
//! Consumer-side helper that turns published snapshots into avatar display
//! parameters. Targets are eased towards with a frame-rate independent lerp,
//! so the avatar drifts between moods instead of snapping.

use etherea_core::{clamp_unit, EmotionVector};
use serde::{Deserialize, Serialize};

/// Nominal frame time the lerp factor is expressed against (60 fps).
const REFERENCE_FRAME_SECS: f64 = 0.016;

/// Avatar display parameters, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvatarParams {
    pub eye_openness: f64,
    pub blink_rate: f64,
    pub gaze_jitter: f64,
    pub breathing_intensity: f64,
    pub glow_intensity: f64,
    pub color_temp: f64,
    pub pulse_speed: f64,
    pub particle_density: f64,
}

impl Default for AvatarParams {
    fn default() -> Self {
        Self {
            eye_openness: 0.5,
            blink_rate: 0.1,
            gaze_jitter: 0.0,
            breathing_intensity: 0.5,
            glow_intensity: 0.5,
            color_temp: 0.5,
            pulse_speed: 0.5,
            particle_density: 0.5,
        }
    }
}

impl AvatarParams {
    /// Raw targets for a vector, before easing.
    pub fn target_for(v: &EmotionVector) -> Self {
        let focus = clamp_unit(v.focus);
        let stress = clamp_unit(v.stress);
        let energy = clamp_unit(v.energy);
        let curiosity = clamp_unit(v.curiosity);

        Self {
            eye_openness: clamp_unit(0.4 + focus * 0.4),
            blink_rate: clamp_unit(0.05 + stress * 0.2),
            gaze_jitter: clamp_unit(stress * 0.3),
            breathing_intensity: clamp_unit(0.3 + energy * 0.7),
            glow_intensity: clamp_unit(0.3 + 0.6 * focus + 0.1 * curiosity - 0.25 * stress),
            color_temp: clamp_unit(0.3 + 0.4 * focus + 0.3 * energy - 0.3 * stress),
            pulse_speed: clamp_unit(0.2 + stress * 0.8),
            particle_density: clamp_unit(0.2 + 0.6 * curiosity + 0.2 * energy),
        }
    }

    fn lerp(&self, target: &Self, t: f64) -> Self {
        Self {
            eye_openness: lerp(self.eye_openness, target.eye_openness, t),
            blink_rate: lerp(self.blink_rate, target.blink_rate, t),
            gaze_jitter: lerp(self.gaze_jitter, target.gaze_jitter, t),
            breathing_intensity: lerp(self.breathing_intensity, target.breathing_intensity, t),
            glow_intensity: lerp(self.glow_intensity, target.glow_intensity, t),
            color_temp: lerp(self.color_temp, target.color_temp, t),
            pulse_speed: lerp(self.pulse_speed, target.pulse_speed, t),
            particle_density: lerp(self.particle_density, target.particle_density, t),
        }
    }
}

/// Eases [`AvatarParams`] towards the targets implied by each snapshot.
#[derive(Debug, Clone)]
pub struct VisualMapper {
    params: AvatarParams,
    /// Per reference frame responsiveness. Smaller is slower.
    lerp_factor: f64,
}

impl Default for VisualMapper {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl VisualMapper {
    pub fn new(lerp_factor: f64) -> Self {
        Self {
            params: AvatarParams::default(),
            lerp_factor: clamp_unit(lerp_factor),
        }
    }

    pub fn params(&self) -> AvatarParams {
        self.params
    }

    /// Step the easing by `dt` seconds towards `vector`'s targets.
    pub fn update(&mut self, vector: &EmotionVector, dt: f64) -> AvatarParams {
        let target = AvatarParams::target_for(vector);
        self.params = self.params.lerp(&target, self.alpha(dt));
        self.params
    }

    fn alpha(&self, dt: f64) -> f64 {
        if !dt.is_finite() {
            return self.lerp_factor;
        }
        if dt <= 0.0 {
            return 0.0;
        }
        (self.lerp_factor * dt / REFERENCE_FRAME_SECS).min(1.0)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    clamp_unit(a + (b - a) * t.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn params_close(p: &AvatarParams, q: &AvatarParams) -> bool {
        approx(p.eye_openness, q.eye_openness)
            && approx(p.blink_rate, q.blink_rate)
            && approx(p.gaze_jitter, q.gaze_jitter)
            && approx(p.breathing_intensity, q.breathing_intensity)
            && approx(p.glow_intensity, q.glow_intensity)
            && approx(p.color_temp, q.color_temp)
            && approx(p.pulse_speed, q.pulse_speed)
            && approx(p.particle_density, q.particle_density)
    }

    #[test]
    fn targets_for_default_vector() {
        let t = AvatarParams::target_for(&EmotionVector::default());
        assert!(approx(t.eye_openness, 0.6));
        assert!(approx(t.blink_rate, 0.09));
        assert!(approx(t.gaze_jitter, 0.06));
        assert!(approx(t.pulse_speed, 0.36));
        assert!(approx(t.breathing_intensity, 0.65));
        assert!(approx(t.glow_intensity, 0.3 + 0.3 + 0.05 - 0.05));
        assert!(approx(t.color_temp, 0.3 + 0.2 + 0.15 - 0.06));
        assert!(approx(t.particle_density, 0.2 + 0.3 + 0.1));
    }

    #[test]
    fn zero_dt_freezes_params() {
        let mut mapper = VisualMapper::default();
        let before = mapper.params();
        let hot = EmotionVector {
            stress: 1.0,
            ..Default::default()
        };
        assert_eq!(mapper.update(&hot, 0.0), before);
        assert_eq!(mapper.update(&hot, -1.0), before);
    }

    #[test]
    fn one_reference_frame_moves_by_lerp_factor() {
        let mut mapper = VisualMapper::new(0.5);
        let v = EmotionVector {
            focus: 1.0,
            ..Default::default()
        };
        let p = mapper.update(&v, REFERENCE_FRAME_SECS);
        // 0.5 -> target 0.8, half way
        assert!(approx(p.eye_openness, 0.65));
    }

    #[test]
    fn long_frame_snaps_to_target() {
        let mut mapper = VisualMapper::default();
        let v = EmotionVector {
            stress: 0.9,
            focus: 0.1,
            ..Default::default()
        };
        let p = mapper.update(&v, 10.0);
        assert!(params_close(&p, &AvatarParams::target_for(&v)));
    }

    #[test]
    fn lerp_factor_is_clamped() {
        let mut mapper = VisualMapper::new(7.0);
        let v = EmotionVector::default();
        let p = mapper.update(&v, REFERENCE_FRAME_SECS);
        assert!(params_close(&p, &AvatarParams::target_for(&v)));
    }
}
