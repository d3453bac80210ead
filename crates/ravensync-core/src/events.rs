//! Notifications emitted to consumers of the sync core
//!
//! Embedding applications subscribe via
//! [`crate::orchestrator::SyncOrchestrator::subscribe`] to hear about
//! collection changes (typically to refresh a view). Notifications are
//! best-effort and carry sizes only; the data itself is read from
//! [`crate::state::SyncState`].

/// Events broadcast after each published state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The relay client completed its handshake
    Ready,
    /// The profile collection was replaced
    ProfilesChanged {
        /// New collection size
        total: usize,
    },
    /// The local user's own profile was updated
    OwnProfileChanged,
    /// New channels were appended
    ChannelsChanged {
        /// Number of genuinely new channels
        appended: usize,
    },
    /// New channel updates were appended
    ChannelUpdatesChanged {
        /// Number of genuinely new updates
        appended: usize,
    },
    /// New deletion records were appended
    DeletionsChanged {
        /// Number of genuinely new deletions
        appended: usize,
    },
    /// New public messages were appended
    PublicMessagesChanged {
        /// Number of genuinely new messages
        appended: usize,
    },
    /// New direct messages were appended
    DirectMessagesChanged {
        /// Number of genuinely new messages
        appended: usize,
    },
    /// The derived contact list was recomputed
    ContactsChanged {
        /// New contact list size
        total: usize,
    },
}
