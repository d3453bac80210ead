//! Published state container for the synchronized collections
//!
//! `SyncState` owns the six entity collections plus the derived contact
//! list and the singleton current-user profile. Every collection is a
//! read-current / publish-new pair: readers get a cloned snapshot,
//! writers replace the whole collection atomically. Handlers always merge
//! from the latest published snapshot, never from a captured copy, which
//! is what keeps a single-writer discipline sufficient.

use parking_lot::RwLock;

use crate::types::{
    Channel, ChannelUpdate, Contact, DirectMessage, EventDeletion, Profile, PublicMessage,
};

/// Shared container for all synchronized collections
#[derive(Default)]
pub struct SyncState {
    profiles: RwLock<Vec<Profile>>,
    own_profile: RwLock<Option<Profile>>,
    channels: RwLock<Vec<Channel>>,
    channel_updates: RwLock<Vec<ChannelUpdate>>,
    deletions: RwLock<Vec<EventDeletion>>,
    public_messages: RwLock<Vec<PublicMessage>>,
    direct_messages: RwLock<Vec<DirectMessage>>,
    contacts: RwLock<Vec<Contact>>,
}

impl SyncState {
    /// Empty state: all collections start empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Current profile collection
    pub fn profiles(&self) -> Vec<Profile> {
        self.profiles.read().clone()
    }

    /// Publish a new profile collection
    pub fn publish_profiles(&self, profiles: Vec<Profile>) {
        *self.profiles.write() = profiles;
    }

    /// The local user's own profile, if one has been received
    pub fn own_profile(&self) -> Option<Profile> {
        self.own_profile.read().clone()
    }

    /// Publish the local user's own profile
    pub fn publish_own_profile(&self, profile: Profile) {
        *self.own_profile.write() = Some(profile);
    }

    /// Current channel collection
    pub fn channels(&self) -> Vec<Channel> {
        self.channels.read().clone()
    }

    /// Ids of all known channels, in insertion order
    pub fn channel_ids(&self) -> Vec<String> {
        self.channels.read().iter().map(|c| c.id.clone()).collect()
    }

    /// Publish a new channel collection
    pub fn publish_channels(&self, channels: Vec<Channel>) {
        *self.channels.write() = channels;
    }

    /// Current channel-update collection
    pub fn channel_updates(&self) -> Vec<ChannelUpdate> {
        self.channel_updates.read().clone()
    }

    /// Publish a new channel-update collection
    pub fn publish_channel_updates(&self, updates: Vec<ChannelUpdate>) {
        *self.channel_updates.write() = updates;
    }

    /// Current event-deletion collection
    pub fn deletions(&self) -> Vec<EventDeletion> {
        self.deletions.read().clone()
    }

    /// Publish a new event-deletion collection
    pub fn publish_deletions(&self, deletions: Vec<EventDeletion>) {
        *self.deletions.write() = deletions;
    }

    /// Current public-message collection
    pub fn public_messages(&self) -> Vec<PublicMessage> {
        self.public_messages.read().clone()
    }

    /// Publish a new public-message collection
    pub fn publish_public_messages(&self, messages: Vec<PublicMessage>) {
        *self.public_messages.write() = messages;
    }

    /// Current direct-message collection
    pub fn direct_messages(&self) -> Vec<DirectMessage> {
        self.direct_messages.read().clone()
    }

    /// Publish a new direct-message collection
    pub fn publish_direct_messages(&self, messages: Vec<DirectMessage>) {
        *self.direct_messages.write() = messages;
    }

    /// Current derived contact list
    pub fn contacts(&self) -> Vec<Contact> {
        self.contacts.read().clone()
    }

    /// Publish a new contact list
    pub fn publish_contacts(&self, contacts: Vec<Contact>) {
        *self.contacts.write() = contacts;
    }
}
