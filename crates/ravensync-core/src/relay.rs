//! Relay client capability and event bus types
//!
//! The relay transport (connection management, signing, event fetching,
//! payload validation) lives outside this crate. The core consumes it
//! through [`RelayClient`]: two fire-and-forget requests plus a typed
//! broadcast bus delivering batches for the seven event kinds.

use std::fmt;

use tokio::sync::broadcast;

use crate::types::{Channel, ChannelUpdate, DirectMessage, EventDeletion, Profile, PublicMessage};

/// The closed set of event kinds delivered by a relay client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayEventKind {
    /// Initial handshake with the relays completed; safe to poll
    Ready,
    /// Profile metadata batch
    ProfileUpdate,
    /// Channel creation batch
    ChannelCreation,
    /// Channel metadata update batch
    ChannelUpdate,
    /// Event deletion batch
    EventDeletion,
    /// Public channel message batch
    PublicMessage,
    /// Direct message batch
    DirectMessage,
}

impl RelayEventKind {
    /// All seven kinds, for registry teardown loops
    pub const ALL: [RelayEventKind; 7] = [
        RelayEventKind::Ready,
        RelayEventKind::ProfileUpdate,
        RelayEventKind::ChannelCreation,
        RelayEventKind::ChannelUpdate,
        RelayEventKind::EventDeletion,
        RelayEventKind::PublicMessage,
        RelayEventKind::DirectMessage,
    ];
}

impl fmt::Display for RelayEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelayEventKind::Ready => "ready",
            RelayEventKind::ProfileUpdate => "profile_update",
            RelayEventKind::ChannelCreation => "channel_creation",
            RelayEventKind::ChannelUpdate => "channel_update",
            RelayEventKind::EventDeletion => "event_deletion",
            RelayEventKind::PublicMessage => "public_message",
            RelayEventKind::DirectMessage => "direct_message",
        };
        write!(f, "{}", name)
    }
}

/// An event delivered by the relay client, payload included
#[derive(Debug, Clone)]
pub enum RelayEvent {
    /// Initial handshake completed
    Ready,
    /// Profile metadata batch
    ProfileUpdate(Vec<Profile>),
    /// Channel creation batch
    ChannelCreation(Vec<Channel>),
    /// Channel metadata update batch
    ChannelUpdate(Vec<ChannelUpdate>),
    /// Event deletion batch
    EventDeletion(Vec<EventDeletion>),
    /// Public channel message batch
    PublicMessage(Vec<PublicMessage>),
    /// Direct message batch
    DirectMessage(Vec<DirectMessage>),
}

impl RelayEvent {
    /// The kind of this event
    pub fn kind(&self) -> RelayEventKind {
        match self {
            RelayEvent::Ready => RelayEventKind::Ready,
            RelayEvent::ProfileUpdate(_) => RelayEventKind::ProfileUpdate,
            RelayEvent::ChannelCreation(_) => RelayEventKind::ChannelCreation,
            RelayEvent::ChannelUpdate(_) => RelayEventKind::ChannelUpdate,
            RelayEvent::EventDeletion(_) => RelayEventKind::EventDeletion,
            RelayEvent::PublicMessage(_) => RelayEventKind::PublicMessage,
            RelayEvent::DirectMessage(_) => RelayEventKind::DirectMessage,
        }
    }

    /// Payload size, for observability logging
    pub fn len(&self) -> usize {
        match self {
            RelayEvent::Ready => 0,
            RelayEvent::ProfileUpdate(v) => v.len(),
            RelayEvent::ChannelCreation(v) => v.len(),
            RelayEvent::ChannelUpdate(v) => v.len(),
            RelayEvent::EventDeletion(v) => v.len(),
            RelayEvent::PublicMessage(v) => v.len(),
            RelayEvent::DirectMessage(v) => v.len(),
        }
    }

    /// Whether the payload is empty (`Ready` counts as empty)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Capability exposed by the external relay client
///
/// All methods are fire-and-forget: retries, backoff, and validation are
/// the transport's concern. Implementations must tolerate being called at
/// any point of their lifecycle.
pub trait RelayClient: Send + Sync {
    /// Request events for the given channels newer than `since_secs`
    fn listen(&self, channel_ids: &[String], since_secs: i64);

    /// Request profile metadata for the given public keys
    fn load_profiles(&self, public_keys: &[String]);

    /// Subscribe to the client's event stream
    ///
    /// Every call returns a fresh receiver positioned at the current tail
    /// of the stream.
    fn events(&self) -> broadcast::Receiver<RelayEvent>;
}
