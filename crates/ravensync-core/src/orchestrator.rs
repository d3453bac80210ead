//! Top-level sync coordination
//!
//! `SyncOrchestrator` wires the listener registry, the poll scheduler, and
//! the merge algorithms against a live relay client:
//!
//! - On every client (re)attachment, the previous client's subscriptions
//!   are torn down and all seven handlers re-registered.
//! - Each handler is a synchronous reducer: read the latest published
//!   collection, merge the incoming batch, publish the result, then run
//!   its side effects (profile loading, contact recomputation, channel-set
//!   rescheduling).
//! - Collection changes are broadcast as [`SyncEvent`]s for consumers.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::contacts::derive_contacts;
use crate::events::SyncEvent;
use crate::listener::ListenerRegistry;
use crate::merge::{merge_append, merge_replace};
use crate::relay::{RelayClient, RelayEvent, RelayEventKind};
use crate::scheduler::{PollScheduler, SchedulerConfig};
use crate::state::SyncState;

/// Default capacity for the notification broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Coordinates merging, polling, and listener lifecycle for one local user
pub struct SyncOrchestrator {
    /// The local user's public key (hex), for own-profile detection
    own_pubkey: String,
    state: Arc<SyncState>,
    registry: ListenerRegistry,
    scheduler: PollScheduler,
    client: Option<Arc<dyn RelayClient>>,
    event_tx: broadcast::Sender<SyncEvent>,
}

impl SyncOrchestrator {
    /// Create an orchestrator with empty state and no client attached
    pub fn new(own_pubkey: impl Into<String>, config: SchedulerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            own_pubkey: own_pubkey.into(),
            state: Arc::new(SyncState::new()),
            registry: ListenerRegistry::new(),
            scheduler: PollScheduler::new(config),
            client: None,
            event_tx,
        }
    }

    /// The published state container
    pub fn state(&self) -> Arc<SyncState> {
        self.state.clone()
    }

    /// Subscribe to collection-change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }

    /// Whether a relay client is currently attached
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Whether the attached client has completed its handshake
    pub fn is_ready(&self) -> bool {
        self.scheduler.is_ready()
    }

    /// Attach a relay client, replacing any previous one
    ///
    /// Tears down the previous client's subscriptions, hands the client to
    /// the scheduler (which starts with a fresh readiness gate), seeds the
    /// poll channel set from the current Channel collection, and registers
    /// all seven handlers.
    pub fn attach_client(&mut self, client: Arc<dyn RelayClient>) {
        info!("Attaching relay client");

        self.registry.attach(Some(client.clone()));
        self.scheduler.set_client(Some(client.clone()));
        self.scheduler.set_channels(self.state.channel_ids());
        self.client = Some(client.clone());

        self.register_ready_handler();
        self.register_profile_handler();
        self.register_channel_creation_handler();
        self.register_channel_update_handler();
        self.register_deletion_handler();
        self.register_public_message_handler(client.clone());
        self.register_direct_message_handler(client);
    }

    /// Detach the current relay client, if any
    ///
    /// All subscriptions are torn down and the pending poll canceled. Safe
    /// to call with no client attached.
    pub fn detach_client(&mut self) {
        if self.client.take().is_some() {
            info!("Detaching relay client");
        }
        self.registry.attach(None);
        self.scheduler.set_client(None);
    }

    fn register_ready_handler(&mut self) {
        let scheduler = self.scheduler.clone();
        let event_tx = self.event_tx.clone();
        self.registry.subscribe(
            RelayEventKind::Ready,
            Box::new(move |_event| {
                info!("Relay client handshake complete");
                scheduler.mark_ready();
                let _ = event_tx.send(SyncEvent::Ready);
            }),
        );
    }

    fn register_profile_handler(&mut self) {
        let state = self.state.clone();
        let event_tx = self.event_tx.clone();
        let own_pubkey = self.own_pubkey.clone();
        self.registry.subscribe(
            RelayEventKind::ProfileUpdate,
            Box::new(move |event| {
                let RelayEvent::ProfileUpdate(batch) = event else {
                    return;
                };
                debug!(batch = batch.len(), "Handling profile update");
                let out = merge_replace(&state.profiles(), &batch, &own_pubkey);
                let total = out.collection.len();
                state.publish_profiles(out.collection);
                let _ = event_tx.send(SyncEvent::ProfilesChanged { total });

                if let Some(own) = out.own {
                    state.publish_own_profile(own);
                    let _ = event_tx.send(SyncEvent::OwnProfileChanged);
                }
            }),
        );
    }

    fn register_channel_creation_handler(&mut self) {
        let state = self.state.clone();
        let scheduler = self.scheduler.clone();
        let event_tx = self.event_tx.clone();
        self.registry.subscribe(
            RelayEventKind::ChannelCreation,
            Box::new(move |event| {
                let RelayEvent::ChannelCreation(batch) = event else {
                    return;
                };
                debug!(batch = batch.len(), "Handling channel creation");
                let out = merge_append(&state.channels(), &batch);
                let appended = out.appended.len();
                state.publish_channels(out.collection);
                // Newly discovered channels join the next poll without any
                // separate subscription management.
                scheduler.set_channels(state.channel_ids());
                let _ = event_tx.send(SyncEvent::ChannelsChanged { appended });
            }),
        );
    }

    fn register_channel_update_handler(&mut self) {
        let state = self.state.clone();
        let event_tx = self.event_tx.clone();
        self.registry.subscribe(
            RelayEventKind::ChannelUpdate,
            Box::new(move |event| {
                let RelayEvent::ChannelUpdate(batch) = event else {
                    return;
                };
                debug!(batch = batch.len(), "Handling channel update");
                let out = merge_append(&state.channel_updates(), &batch);
                let appended = out.appended.len();
                state.publish_channel_updates(out.collection);
                let _ = event_tx.send(SyncEvent::ChannelUpdatesChanged { appended });
            }),
        );
    }

    fn register_deletion_handler(&mut self) {
        let state = self.state.clone();
        let event_tx = self.event_tx.clone();
        self.registry.subscribe(
            RelayEventKind::EventDeletion,
            Box::new(move |event| {
                let RelayEvent::EventDeletion(batch) = event else {
                    return;
                };
                debug!(batch = batch.len(), "Handling event deletion");
                let out = merge_append(&state.deletions(), &batch);
                let appended = out.appended.len();
                state.publish_deletions(out.collection);
                let _ = event_tx.send(SyncEvent::DeletionsChanged { appended });
            }),
        );
    }

    fn register_public_message_handler(&mut self, client: Arc<dyn RelayClient>) {
        let state = self.state.clone();
        let event_tx = self.event_tx.clone();
        self.registry.subscribe(
            RelayEventKind::PublicMessage,
            Box::new(move |event| {
                let RelayEvent::PublicMessage(batch) = event else {
                    return;
                };
                debug!(batch = batch.len(), "Handling public message");
                let out = merge_append(&state.public_messages(), &batch);
                if !out.appended.is_empty() {
                    // Fetch author profiles for genuinely new messages only.
                    let authors = distinct(out.appended.iter().map(|m| m.creator.as_str()));
                    client.load_profiles(&authors);
                }
                let appended = out.appended.len();
                state.publish_public_messages(out.collection);
                let _ = event_tx.send(SyncEvent::PublicMessagesChanged { appended });
            }),
        );
    }

    fn register_direct_message_handler(&mut self, client: Arc<dyn RelayClient>) {
        let state = self.state.clone();
        let event_tx = self.event_tx.clone();
        self.registry.subscribe(
            RelayEventKind::DirectMessage,
            Box::new(move |event| {
                let RelayEvent::DirectMessage(batch) = event else {
                    return;
                };
                debug!(batch = batch.len(), "Handling direct message");
                let out = merge_append(&state.direct_messages(), &batch);
                if !out.appended.is_empty() {
                    let peers = distinct(out.appended.iter().map(|m| m.peer.as_str()));
                    client.load_profiles(&peers);
                }
                let appended = out.appended.len();
                state.publish_direct_messages(out.collection);
                let _ = event_tx.send(SyncEvent::DirectMessagesChanged { appended });

                // The contact list is a wholesale projection of the
                // direct-message collection.
                let contacts = derive_contacts(&state.direct_messages());
                let total = contacts.len();
                state.publish_contacts(contacts);
                let _ = event_tx.send(SyncEvent::ContactsChanged { total });
            }),
        );
    }
}

impl Drop for SyncOrchestrator {
    fn drop(&mut self) {
        self.registry.unsubscribe_all();
        self.scheduler.shutdown();
    }
}

/// Distinct values in first-appearance order
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(|v| v.to_string())
        .collect()
}
