//! Core EI engine implementation
//!
//! The EiEngine owns the emotion state. It:
//! - Applies activity samples and pattern signals synchronously
//! - Runs a background heartbeat that decays, persists and publishes the vector
//! - Raises rate-limited proactive triggers
//!
//! All mutation goes through one mutex. Persistence and notification happen on
//! copies after the lock is released.

use crate::heartbeat::HeartbeatConfig;
use crate::persistence::{save_emotion, SaveThrottle};
use crate::trigger::TriggerGate;
use etherea_core::{
    ActivityEvent, EiDynamics, EmotionState, EmotionVector, EngineConfig, PatternSignal,
    PreferenceStore, ProactiveTrigger, SignalSink, SubState,
};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Capacity of the trigger broadcast. Triggers are rare, so lagging here
/// means a receiver stopped polling.
const TRIGGER_CHANNEL_CAPACITY: usize = 16;

/// Lifecycle of the background decay loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Stopped,
    Running,
}

/// Everything guarded by the state lock.
struct Shared {
    state: EmotionState,
    /// Sum of clamped tick dt, in seconds
    clock: f64,
    triggers: TriggerGate,
    throttle: SaveThrottle,
}

struct Inner {
    shared: Mutex<Shared>,
    dynamics: EiDynamics,
    max_dt: f64,
    store: Option<Arc<dyn PreferenceStore>>,
    sink: Option<Arc<dyn SignalSink>>,
    emotion_tx: watch::Sender<EmotionVector>,
    trigger_tx: broadcast::Sender<ProactiveTrigger>,
}

struct Worker {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// The Emotional-Intelligence signal engine
pub struct EiEngine {
    inner: Arc<Inner>,
    heartbeat: HeartbeatConfig,
    worker: Mutex<Option<Worker>>,
    /// Held across the join so overlapping `stop` calls all wait for it.
    stop_lock: tokio::sync::Mutex<()>,
}

/// Builder for [`EiEngine`]; collaborators are injected here.
pub struct EiEngineBuilder {
    config: EngineConfig,
    dynamics: EiDynamics,
    store: Option<Arc<dyn PreferenceStore>>,
    sink: Option<Arc<dyn SignalSink>>,
}

impl EiEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dynamics(mut self, dynamics: EiDynamics) -> Self {
        self.dynamics = dynamics;
        self
    }

    /// Persistence sink for rate-limited `last_emotion` writes
    pub fn store(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Host signal bus notified on every publish and trigger
    pub fn sink(mut self, sink: Arc<dyn SignalSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> EiEngine {
        let (emotion_tx, _) = watch::channel(EmotionVector::default());
        let (trigger_tx, _) = broadcast::channel(TRIGGER_CHANNEL_CAPACITY);

        let shared = Shared {
            state: EmotionState::default(),
            clock: 0.0,
            triggers: TriggerGate::new(self.config.trigger_cooldown_secs),
            throttle: SaveThrottle::new(
                self.config.save_interval_secs,
                self.config.stress_save_delta,
            ),
        };

        EiEngine {
            inner: Arc::new(Inner {
                shared: Mutex::new(shared),
                dynamics: self.dynamics,
                max_dt: self.config.max_dt_secs.max(0.0),
                store: self.store,
                sink: self.sink,
                emotion_tx,
                trigger_tx,
            }),
            heartbeat: HeartbeatConfig::from_millis(self.config.tick_interval_ms),
            worker: Mutex::new(None),
            stop_lock: tokio::sync::Mutex::new(()),
        }
    }
}

impl EiEngine {
    /// Create an engine with default configuration and no collaborators
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EiEngineBuilder {
        EiEngineBuilder {
            config: EngineConfig::default(),
            dynamics: EiDynamics::default(),
            store: None,
            sink: None,
        }
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Apply one activity sample. Never publishes; the next tick does.
    pub fn on_activity(&self, event: ActivityEvent) {
        let mut shared = self.inner.lock();
        self.inner.dynamics.apply_activity(&mut shared.state, event);
        tracing::trace!(
            "Applied activity {:?}: focus={:.3}, stress={:.3}, flow={:.3}",
            event,
            shared.state.vector.focus,
            shared.state.vector.stress,
            shared.state.vector.flow
        );
    }

    /// Apply an activity sample given as `kind` plus a loosely typed payload.
    /// Unknown kinds are dropped.
    pub fn on_activity_payload(&self, kind: &str, payload: &Value) {
        match ActivityEvent::from_payload(kind, payload) {
            Some(event) => self.on_activity(event),
            None => tracing::debug!("Ignoring activity of unknown kind '{}'", kind),
        }
    }

    /// Fold a detected behaviour pattern into the state.
    pub fn on_pattern(&self, signal: PatternSignal) {
        let mut shared = self.inner.lock();
        self.inner.dynamics.apply_pattern(&mut shared.state, signal);
        tracing::trace!(
            "Applied pattern {:?}: stress={:.3}, energy={:.3}, curiosity={:.3}",
            signal,
            shared.state.vector.stress,
            shared.state.vector.energy,
            shared.state.vector.curiosity
        );
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Run one decay / persist / publish / trigger cycle.
    ///
    /// `dt` is clamped to `[0, max_dt]`; non-finite values count as zero.
    /// Returns the trigger raised by this tick, if any.
    pub async fn tick(&self, dt: f64) -> Option<ProactiveTrigger> {
        self.inner.tick(dt).await
    }

    /// Check the trigger thresholds against the current vector at engine
    /// time `now`, emitting at most one trigger.
    ///
    /// `now` is on the [`clock`](Self::clock) timeline, which the tick path
    /// also uses for the cooldown. A `now` earlier than the last trigger
    /// starts a fresh window.
    pub fn evaluate_triggers(&self, now: f64) -> Option<ProactiveTrigger> {
        let trigger = {
            let mut shared = self.inner.lock();
            let vector = shared.state.vector;
            shared.triggers.evaluate(&vector, now)
        };
        if let Some(t) = trigger {
            self.inner.emit_trigger(t);
        }
        trigger
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start the background heartbeat. No-op when already running.
    ///
    /// Needs a Tokio runtime; without one the engine logs and stays stopped.
    pub fn start(&self) {
        let mut worker = self.lock_worker();
        if worker.is_some() {
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(h) => h,
            Err(e) => {
                tracing::error!("Cannot start EI heartbeat outside a Tokio runtime: {}", e);
                return;
            }
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let period = self.heartbeat.interval;
        let handle = runtime.spawn(heartbeat_loop(inner, period, shutdown_rx));

        *worker = Some(Worker {
            shutdown: shutdown_tx,
            handle,
        });
        tracing::info!("EI engine started (heartbeat every {:?})", period);
    }

    /// Stop the heartbeat and wait for any in-flight tick to finish.
    ///
    /// Idempotent. Once this returns no further tick runs until `start`,
    /// including for a caller that overlapped another `stop`. State is kept.
    pub async fn stop(&self) {
        let _stopping = self.stop_lock.lock().await;
        let Some(worker) = self.lock_worker().take() else {
            return;
        };

        let _ = worker.shutdown.send(());
        if let Err(e) = worker.handle.await {
            tracing::warn!("EI heartbeat ended abnormally: {}", e);
        }
        tracing::info!("EI engine stopped");
    }

    pub fn lifecycle(&self) -> Lifecycle {
        if self.lock_worker().is_some() {
            Lifecycle::Running
        } else {
            Lifecycle::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle() == Lifecycle::Running
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Subscribe to published vectors. Holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<EmotionVector> {
        self.inner.emotion_tx.subscribe()
    }

    /// Subscribe to proactive triggers.
    pub fn subscribe_triggers(&self) -> broadcast::Receiver<ProactiveTrigger> {
        self.inner.trigger_tx.subscribe()
    }

    /// Copy of the current vector
    pub fn snapshot(&self) -> EmotionVector {
        self.inner.lock().state.vector
    }

    pub fn sub_state(&self) -> SubState {
        self.inner.lock().state.sub
    }

    /// Engine time in seconds: the sum of every clamped tick dt so far
    pub fn clock(&self) -> f64 {
        self.inner.lock().clock
    }

    /// Replace the vector, e.g. with the last persisted one at startup.
    /// Sub-states other than flow are kept. Publishes the result.
    pub fn restore(&self, vector: EmotionVector) {
        let snapshot = {
            let mut shared = self.inner.lock();
            shared.state.vector = vector;
            shared.state.sub.flow_intensity = vector.flow;
            shared.state.normalize();
            shared.state.vector
        };
        tracing::debug!("Restored emotion vector {:?}", snapshot);
        self.inner.publish(snapshot);
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EiEngine {
    fn drop(&mut self) {
        if let Some(worker) = self.lock_worker().take() {
            worker.handle.abort();
        }
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn tick(&self, dt: f64) -> Option<ProactiveTrigger> {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.max_dt)
        } else {
            0.0
        };

        let (snapshot, now, save_due, trigger) = {
            let mut shared = self.lock();
            shared.clock += dt;
            let now = shared.clock;
            self.dynamics.decay(&mut shared.state, dt);
            let snapshot = shared.state.vector;
            let save_due = self.store.is_some() && shared.throttle.is_due(now, snapshot.stress);
            let trigger = shared.triggers.evaluate(&snapshot, now);
            (snapshot, now, save_due, trigger)
        };

        if save_due {
            self.persist(&snapshot, now).await;
        }
        self.publish(snapshot);
        if let Some(t) = trigger {
            self.emit_trigger(t);
        }
        trigger
    }

    async fn persist(&self, snapshot: &EmotionVector, now: f64) {
        let Some(store) = &self.store else {
            return;
        };
        match save_emotion(store.as_ref(), snapshot).await {
            Ok(()) => {
                self.lock().throttle.mark_saved(now, snapshot.stress);
                tracing::debug!("Persisted emotion vector at t={:.2}s", now);
            }
            Err(e) => tracing::warn!("Skipping emotion persistence: {}", e),
        }
    }

    fn publish(&self, snapshot: EmotionVector) {
        self.emotion_tx.send_replace(snapshot);
        if let Some(sink) = &self.sink {
            sink.emotion_updated(snapshot);
        }
    }

    fn emit_trigger(&self, trigger: ProactiveTrigger) {
        tracing::debug!("Proactive trigger: {}", trigger);
        // no receivers is not an error
        let _ = self.trigger_tx.send(trigger);
        if let Some(sink) = &self.sink {
            sink.proactive_trigger(trigger);
        }
    }
}

async fn heartbeat_loop(
    inner: Arc<Inner>,
    period: std::time::Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,

            _ = interval.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last_tick).as_secs_f64();
                last_tick = now;
                inner.tick(dt).await;
            }
        }
    }
}
