//! # Etherea EI Signal Engine
//!
//! Turns privacy-preserving input-activity samples (typing cadence, mouse
//! movement, detected behaviour patterns) into a bounded, decaying emotion
//! vector for the presentation layer.
//!
//! ## Architecture
//!
//! The engine keeps one locked [`EmotionState`](etherea_core::EmotionState):
//! 1. Activity and pattern calls mutate it synchronously, from any thread
//! 2. A background heartbeat decays it, persists it (rate-limited), publishes
//!    a snapshot and evaluates proactive triggers
//! 3. Consumers read snapshots from a watch channel or an injected sink
//!
//! Nothing here returns an error to the host. Bad numbers become neutral,
//! failed writes are logged and retried.

mod engine;
mod heartbeat;
pub mod mapper;
mod persistence;
mod trigger;

pub use engine::{EiEngine, EiEngineBuilder, Lifecycle};
pub use heartbeat::HeartbeatConfig;
pub use mapper::{AvatarParams, VisualMapper};
pub use persistence::{load_last_emotion, save_emotion, SaveThrottle};
pub use trigger::TriggerGate;
