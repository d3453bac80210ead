//! Readiness gating and adaptive poll scheduling
//!
//! The scheduler owns the `since` cursor and drives the relay client's
//! incremental `listen` call:
//!
//! - **Idle**: client absent or not ready yet; nothing happens.
//! - **Armed**: ready with cursor 0; one poll fires after a short delay
//!   using "since now" (no historical backfill), then the cursor is set.
//! - **Steady**: ready with cursor set; polls fire on the long delay using
//!   the cursor, advancing it at every dispatch.
//!
//! The pending timer is cancelable: whenever a governing input changes
//! (readiness, channel-id set, relay-client instance, cursor) the pending
//! task is aborted and a new one scheduled from the new state, so at most
//! one `listen` timer is ever outstanding. A generation counter backs the
//! abort so a task that loses the abort race still cannot fire stale
//! input.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::relay::RelayClient;

/// Delay tiers for the poll loop
///
/// The first poll after becoming ready resolves quickly for a snappy
/// initial sync; steady-state polling trades latency for relay load.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Delay before the first poll once ready (cursor still 0)
    pub initial_delay: Duration,
    /// Delay between steady-state polls
    pub steady_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            steady_delay: Duration::from_secs(10),
        }
    }
}

/// Tracks whether the relay client has completed its initial handshake
///
/// Transitions false→true exactly once per relay-client instance; a
/// replacement client gets a fresh gate. Only the scheduler reads it.
#[derive(Debug, Default)]
pub struct ReadinessGate {
    ready: bool,
}

impl ReadinessGate {
    /// Fresh gate, not ready
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the handshake has completed
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Record the handshake; returns `true` only on the false→true
    /// transition so repeated Ready events stay idempotent
    pub fn mark_ready(&mut self) -> bool {
        if self.ready {
            return false;
        }
        self.ready = true;
        true
    }
}

struct Inner {
    config: SchedulerConfig,
    gate: ReadinessGate,
    /// Cursor in milliseconds; 0 means "no lower bound yet, poll from now"
    since_ms: i64,
    channel_ids: Vec<String>,
    client: Option<Arc<dyn RelayClient>>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

/// Adaptive-cadence poll scheduler over a relay client
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct PollScheduler {
    inner: Arc<Mutex<Inner>>,
}

impl PollScheduler {
    /// Create an idle scheduler with no client attached
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                config,
                gate: ReadinessGate::new(),
                since_ms: 0,
                channel_ids: Vec::new(),
                client: None,
                pending: None,
                generation: 0,
            })),
        }
    }

    /// Replace the relay client; `None` detaches
    ///
    /// The readiness gate is reset (a fresh client must hand-shake again)
    /// while the cursor survives: it is process-wide and monotonic.
    pub fn set_client(&self, client: Option<Arc<dyn RelayClient>>) {
        {
            let mut inner = self.inner.lock();
            inner.client = client;
            inner.gate = ReadinessGate::new();
        }
        self.reschedule();
    }

    /// Record the relay client's Ready event; idempotent
    pub fn mark_ready(&self) {
        {
            let mut inner = self.inner.lock();
            if !inner.gate.mark_ready() {
                return;
            }
            debug!("Relay client ready, arming poll loop");
        }
        self.reschedule();
    }

    /// Replace the channel-id set passed to `listen`
    ///
    /// An unchanged set leaves the pending timer alone; a changed one
    /// cancels and reschedules so the next poll reflects it.
    pub fn set_channels(&self, channel_ids: Vec<String>) {
        {
            let mut inner = self.inner.lock();
            if inner.channel_ids == channel_ids {
                return;
            }
            inner.channel_ids = channel_ids;
        }
        self.reschedule();
    }

    /// Current cursor in milliseconds (0 until the first poll fires)
    pub fn since_ms(&self) -> i64 {
        self.inner.lock().since_ms
    }

    /// Whether the attached client has completed its handshake
    pub fn is_ready(&self) -> bool {
        self.inner.lock().gate.is_ready()
    }

    /// Cancel any pending poll
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        inner.generation = inner.generation.wrapping_add(1);
        if let Some(pending) = inner.pending.take() {
            pending.abort();
        }
    }

    /// Cancel the pending poll (if any) and schedule from current state
    fn reschedule(&self) {
        let mut inner = self.inner.lock();
        inner.generation = inner.generation.wrapping_add(1);
        if let Some(pending) = inner.pending.take() {
            pending.abort();
        }
        if !inner.gate.is_ready() || inner.client.is_none() {
            return;
        }

        let generation = inner.generation;
        let delay = if inner.since_ms == 0 {
            inner.config.initial_delay
        } else {
            inner.config.steady_delay
        };

        // The timer task holds a weak reference so a dropped scheduler
        // does not keep state alive for the length of a steady delay.
        let weak = Arc::downgrade(&self.inner);
        debug!(?delay, "Poll scheduled");
        inner.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            Self::fire(weak, generation);
        }));
    }

    /// Dispatch one poll and advance the cursor
    fn fire(weak: Weak<Mutex<Inner>>, generation: u64) {
        let Some(shared) = weak.upgrade() else {
            return;
        };

        let client;
        let channel_ids;
        let since_secs;
        {
            let mut inner = shared.lock();
            if inner.generation != generation {
                // Lost the abort race against a reschedule; stale input.
                return;
            }
            let Some(attached) = inner.client.clone() else {
                return;
            };
            client = attached;

            let now_ms = Utc::now().timestamp_millis();
            let base_ms = if inner.since_ms == 0 { now_ms } else { inner.since_ms };
            since_secs = base_ms / 1000;
            channel_ids = inner.channel_ids.clone();
            inner.since_ms = now_ms;
            inner.pending = None;
        }

        debug!(channels = channel_ids.len(), since_secs, "Polling relay");
        client.listen(&channel_ids, since_secs);

        // The cursor changed at dispatch, which schedules the next round.
        PollScheduler { inner: shared }.reschedule();
    }
}
