//! Idempotent per-kind subscription registry
//!
//! Wraps the relay client's event bus with one subscription token per
//! event kind. Subscribing a kind that already has a token replaces it:
//! the previous dispatch task is aborted before the new one starts, so a
//! stale handler is never left running alongside its replacement and no
//! kind ever delivers an event twice.
//!
//! Tokens are `JoinHandle`s of dispatch tasks, one per kind, each with its
//! own broadcast receiver. Different kinds therefore stay independent and
//! unordered with respect to each other, while batches of one kind are
//! handled strictly in arrival order.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::relay::{RelayClient, RelayEvent, RelayEventKind};

/// Handler invoked with every event of the subscribed kind
pub type Handler = Box<dyn Fn(RelayEvent) + Send + Sync>;

/// Registry of per-kind subscriptions against one relay client
#[derive(Default)]
pub struct ListenerRegistry {
    client: Option<Arc<dyn RelayClient>>,
    tokens: HashMap<RelayEventKind, JoinHandle<()>>,
}

impl ListenerRegistry {
    /// Create an empty registry with no client attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a relay client, tearing down all subscriptions first
    ///
    /// Passing `None` detaches: subscriptions are torn down and later
    /// `subscribe` calls become no-ops until a client is attached again.
    pub fn attach(&mut self, client: Option<Arc<dyn RelayClient>>) {
        self.unsubscribe_all();
        self.client = client;
    }

    /// Subscribe `handler` to events of `kind`, replacing any previous
    /// subscription for that kind
    ///
    /// No-op when no relay client is attached.
    pub fn subscribe(&mut self, kind: RelayEventKind, handler: Handler) {
        self.unsubscribe(kind);

        let Some(client) = &self.client else {
            debug!(%kind, "Subscribe without relay client, ignoring");
            return;
        };

        // The receiver must exist before the task is spawned so no event
        // published after this call can be missed.
        let mut rx = client.events();
        let token = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) if event.kind() == kind => {
                        trace!(%kind, len = event.len(), "Dispatching event");
                        handler(event);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%kind, skipped, "Event bus lagged, batches dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        self.tokens.insert(kind, token);
    }

    /// Unsubscribe `kind`; no-op if it has no subscription
    pub fn unsubscribe(&mut self, kind: RelayEventKind) {
        if let Some(token) = self.tokens.remove(&kind) {
            token.abort();
            debug!(%kind, "Unsubscribed");
        }
    }

    /// Tear down all subscriptions
    ///
    /// Safe to call at any time, including with no client attached.
    pub fn unsubscribe_all(&mut self) {
        for kind in RelayEventKind::ALL {
            self.unsubscribe(kind);
        }
    }

    /// Whether `kind` currently has a subscription
    pub fn is_subscribed(&self, kind: RelayEventKind) -> bool {
        self.tokens.contains_key(&kind)
    }

    /// Number of active subscriptions
    pub fn subscription_count(&self) -> usize {
        self.tokens.len()
    }
}

impl Drop for ListenerRegistry {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::broadcast;

    struct BusOnlyRelay {
        tx: broadcast::Sender<RelayEvent>,
    }

    impl BusOnlyRelay {
        fn new() -> Arc<Self> {
            let (tx, _) = broadcast::channel(64);
            Arc::new(Self { tx })
        }
    }

    impl RelayClient for BusOnlyRelay {
        fn listen(&self, _channel_ids: &[String], _since_secs: i64) {}
        fn load_profiles(&self, _public_keys: &[String]) {}
        fn events(&self) -> broadcast::Receiver<RelayEvent> {
            self.tx.subscribe()
        }
    }

    fn counting_handler(counter: Arc<AtomicUsize>) -> Handler {
        Box::new(move |_event| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_subscribed_kind_receives_only_its_events() {
        let relay = BusOnlyRelay::new();
        let mut registry = ListenerRegistry::new();
        registry.attach(Some(relay.clone()));

        let hits = Arc::new(AtomicUsize::new(0));
        registry.subscribe(RelayEventKind::Ready, counting_handler(hits.clone()));

        relay.tx.send(RelayEvent::Ready).unwrap();
        relay.tx.send(RelayEvent::ProfileUpdate(vec![])).unwrap();
        settle().await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resubscribe_replaces_previous_handler() {
        let relay = BusOnlyRelay::new();
        let mut registry = ListenerRegistry::new();
        registry.attach(Some(relay.clone()));

        let old_hits = Arc::new(AtomicUsize::new(0));
        let new_hits = Arc::new(AtomicUsize::new(0));
        registry.subscribe(RelayEventKind::Ready, counting_handler(old_hits.clone()));
        registry.subscribe(RelayEventKind::Ready, counting_handler(new_hits.clone()));
        assert_eq!(registry.subscription_count(), 1);

        relay.tx.send(RelayEvent::Ready).unwrap();
        settle().await;

        assert_eq!(old_hits.load(Ordering::SeqCst), 0);
        assert_eq!(new_hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_all_stops_delivery() {
        let relay = BusOnlyRelay::new();
        let mut registry = ListenerRegistry::new();
        registry.attach(Some(relay.clone()));

        let hits = Arc::new(AtomicUsize::new(0));
        registry.subscribe(RelayEventKind::DirectMessage, counting_handler(hits.clone()));
        registry.unsubscribe_all();
        assert_eq!(registry.subscription_count(), 0);

        // No receivers are left on the bus, so send may report zero subscribers.
        relay.tx.send(RelayEvent::DirectMessage(vec![])).ok();
        settle().await;

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_subscribe_without_client_is_noop() {
        let mut registry = ListenerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        registry.subscribe(RelayEventKind::Ready, counting_handler(hits.clone()));
        assert!(!registry.is_subscribed(RelayEventKind::Ready));
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_kind_is_noop() {
        let mut registry = ListenerRegistry::new();
        registry.unsubscribe(RelayEventKind::EventDeletion);
        registry.unsubscribe_all();
    }

    #[tokio::test]
    async fn test_attach_tears_down_previous_client_subscriptions() {
        let old_relay = BusOnlyRelay::new();
        let new_relay = BusOnlyRelay::new();
        let mut registry = ListenerRegistry::new();
        registry.attach(Some(old_relay.clone()));

        let hits = Arc::new(AtomicUsize::new(0));
        registry.subscribe(RelayEventKind::Ready, counting_handler(hits.clone()));

        registry.attach(Some(new_relay.clone()));
        assert_eq!(registry.subscription_count(), 0);

        // Events from the old client's bus no longer reach anything.
        old_relay.tx.send(RelayEvent::Ready).ok();
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
