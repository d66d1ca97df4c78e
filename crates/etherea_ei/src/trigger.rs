//! Proactive trigger evaluation with a cooldown gate.

use etherea_core::{EmotionVector, ProactiveTrigger};

/// Decides when the engine suggests an intervention.
///
/// At most one trigger fires per cooldown window. Stress is checked before
/// focus, so stress wins when both thresholds are exceeded.
#[derive(Debug, Clone)]
pub struct TriggerGate {
    /// Minimum engine seconds between two triggers
    pub cooldown: f64,
    pub stress_threshold: f64,
    pub focus_threshold: f64,
    last_fired: Option<f64>,
}

impl Default for TriggerGate {
    fn default() -> Self {
        Self::new(120.0)
    }
}

impl TriggerGate {
    pub fn new(cooldown: f64) -> Self {
        Self {
            cooldown,
            stress_threshold: 0.85,
            focus_threshold: 0.9,
            last_fired: None,
        }
    }

    /// Engine time of the last trigger, if any fired yet.
    pub fn last_fired(&self) -> Option<f64> {
        self.last_fired
    }

    pub fn evaluate(&mut self, vector: &EmotionVector, now: f64) -> Option<ProactiveTrigger> {
        if let Some(last) = self.last_fired {
            // a `now` behind the last trigger means the timeline was reset
            if now >= last && now - last < self.cooldown {
                return None;
            }
        }

        let trigger = if vector.stress > self.stress_threshold {
            ProactiveTrigger::StressRelief
        } else if vector.focus > self.focus_threshold {
            ProactiveTrigger::FocusShieldActive
        } else {
            return None;
        };

        self.last_fired = Some(now);
        Some(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(stress: f64, focus: f64) -> EmotionVector {
        EmotionVector {
            stress,
            focus,
            ..Default::default()
        }
    }

    #[test]
    fn calm_vector_never_fires() {
        let mut gate = TriggerGate::default();
        assert_eq!(gate.evaluate(&EmotionVector::default(), 0.0), None);
        assert_eq!(gate.last_fired(), None);
    }

    #[test]
    fn first_trigger_has_no_cooldown() {
        let mut gate = TriggerGate::default();
        assert_eq!(
            gate.evaluate(&vector(0.9, 0.5), 0.0),
            Some(ProactiveTrigger::StressRelief)
        );
        assert_eq!(gate.last_fired(), Some(0.0));
    }

    #[test]
    fn stress_wins_tie() {
        let mut gate = TriggerGate::default();
        assert_eq!(
            gate.evaluate(&vector(0.95, 0.95), 10.0),
            Some(ProactiveTrigger::StressRelief)
        );
    }

    #[test]
    fn focus_shield_when_calm_and_focused() {
        let mut gate = TriggerGate::default();
        assert_eq!(
            gate.evaluate(&vector(0.1, 0.95), 10.0),
            Some(ProactiveTrigger::FocusShieldActive)
        );
    }

    #[test]
    fn cooldown_blocks_until_window_passes() {
        let mut gate = TriggerGate::default();
        let hot = vector(0.9, 0.95);
        assert!(gate.evaluate(&hot, 5.0).is_some());
        assert!(gate.evaluate(&hot, 5.0 + 60.0).is_none());
        assert!(gate.evaluate(&hot, 5.0 + 119.9).is_none());
        assert!(gate.evaluate(&hot, 5.0 + 120.0).is_some());
        assert_eq!(gate.last_fired(), Some(125.0));
    }

    #[test]
    fn earlier_now_opens_a_new_window() {
        let mut gate = TriggerGate::default();
        let hot = vector(0.9, 0.5);
        assert!(gate.evaluate(&hot, 500.0).is_some());
        assert_eq!(gate.evaluate(&hot, 3.0), Some(ProactiveTrigger::StressRelief));
        assert_eq!(gate.last_fired(), Some(3.0));
        assert!(gate.evaluate(&hot, 60.0).is_none());
    }

    #[test]
    fn thresholds_are_strict() {
        let mut gate = TriggerGate::default();
        assert_eq!(gate.evaluate(&vector(0.85, 0.9), 0.0), None);
    }
}
