//! Inputs and outputs of the EI engine
//!
//! Activity samples and pattern signals arrive from the host's input hooks;
//! proactive triggers leave towards the presentation layer.

use crate::state::{clamp_unit, NEUTRAL};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One privacy-preserving input-activity sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityEvent {
    Typing { intensity: f64, variance: f64 },
    Mouse { intensity: f64, jitter: f64 },
}

impl ActivityEvent {
    /// Build an event from a loosely typed payload.
    ///
    /// `payload` is either an object with optional `intensity`, `variance`
    /// and `jitter` keys, or a bare value taken as the intensity. Absent keys
    /// read as `0.0`; values of the wrong type read as `0.5`.
    /// Returns `None` for kinds other than `"typing"` and `"mouse"`.
    pub fn from_payload(kind: &str, payload: &Value) -> Option<Self> {
        let (intensity, variance, jitter) = match payload {
            Value::Object(_) => (
                payload_field(payload, "intensity"),
                payload_field(payload, "variance"),
                payload_field(payload, "jitter"),
            ),
            other => (loose_number(other), 0.0, 0.0),
        };

        match kind {
            "typing" => Some(Self::Typing { intensity, variance }),
            "mouse" => Some(Self::Mouse { intensity, jitter }),
            _ => None,
        }
    }

    pub fn intensity(&self) -> f64 {
        match *self {
            Self::Typing { intensity, .. } | Self::Mouse { intensity, .. } => intensity,
        }
    }

    /// Copy with every numeric field sanitized and clamped to `[0, 1]`.
    pub fn sanitized(self) -> Self {
        match self {
            Self::Typing { intensity, variance } => Self::Typing {
                intensity: clamp_unit(intensity),
                variance: clamp_unit(variance),
            },
            Self::Mouse { intensity, jitter } => Self::Mouse {
                intensity: clamp_unit(intensity),
                jitter: clamp_unit(jitter),
            },
        }
    }
}

fn payload_field(payload: &Value, key: &str) -> f64 {
    match payload.get(key) {
        None => 0.0,
        Some(v) => loose_number(v),
    }
}

fn loose_number(v: &Value) -> f64 {
    v.as_f64().unwrap_or(NEUTRAL)
}

/// Higher-level behaviour patterns detected upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSignal {
    pub hesitation: bool,
    pub repetition: bool,
    pub late_night: bool,
    pub deletions: u32,
}

/// Engine-initiated suggestion that the host offer an intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProactiveTrigger {
    StressRelief,
    FocusShieldActive,
}

impl ProactiveTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StressRelief => "stress_relief",
            Self::FocusShieldActive => "focus_shield_active",
        }
    }
}

impl fmt::Display for ProactiveTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_payload_defaults_missing_fields_to_zero() {
        let ev = ActivityEvent::from_payload("typing", &json!({"intensity": 0.7})).unwrap();
        assert_eq!(
            ev,
            ActivityEvent::Typing {
                intensity: 0.7,
                variance: 0.0
            }
        );
    }

    #[test]
    fn bare_number_is_intensity() {
        let ev = ActivityEvent::from_payload("mouse", &json!(1.0)).unwrap();
        assert_eq!(
            ev,
            ActivityEvent::Mouse {
                intensity: 1.0,
                jitter: 0.0
            }
        );
    }

    #[test]
    fn wrong_types_read_as_neutral() {
        let ev =
            ActivityEvent::from_payload("mouse", &json!({"intensity": "fast", "jitter": null}))
                .unwrap();
        assert_eq!(
            ev,
            ActivityEvent::Mouse {
                intensity: 0.5,
                jitter: 0.5
            }
        );

        let ev = ActivityEvent::from_payload("typing", &json!("loud")).unwrap();
        assert_eq!(ev.intensity(), 0.5);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(ActivityEvent::from_payload("scroll", &json!({"intensity": 1.0})).is_none());
    }

    #[test]
    fn sanitized_clamps_and_neutralizes() {
        let ev = ActivityEvent::Typing {
            intensity: f64::NAN,
            variance: 4.0,
        }
        .sanitized();
        assert_eq!(
            ev,
            ActivityEvent::Typing {
                intensity: 0.5,
                variance: 1.0
            }
        );
    }

    #[test]
    fn pattern_signal_fields_are_optional() {
        let p: PatternSignal = serde_json::from_value(json!({"repetition": true})).unwrap();
        assert!(p.repetition);
        assert!(!p.hesitation);
        assert_eq!(p.deletions, 0);
    }

    #[test]
    fn trigger_wire_names() {
        assert_eq!(ProactiveTrigger::StressRelief.to_string(), "stress_relief");
        assert_eq!(
            serde_json::to_value(ProactiveTrigger::FocusShieldActive).unwrap(),
            json!("focus_shield_active")
        );
    }
}
