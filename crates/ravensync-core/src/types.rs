//! Entity records for the six synchronized event streams
//!
//! All records are immutable value types once merged: a collection is never
//! mutated in place, it is replaced wholesale by a new one (see
//! [`crate::state::SyncState`]). Each record exposes its identity key via
//! [`Keyed`] so the merge layer can deduplicate uniformly.

use serde::{Deserialize, Serialize};

/// Identity key access for deduplicating records of one entity kind.
///
/// The key is what "the same event" means for that kind: `creator` for
/// profiles, `id` for channels and messages, `event_id` for deletions.
pub trait Keyed {
    /// The identity key used for deduplication
    fn key(&self) -> &str;
}

/// User profile metadata (kind 0 in the underlying protocol)
///
/// Unique per `creator`; an incoming profile for a known creator replaces
/// the stored one (last-write-wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Author public key (hex)
    pub creator: String,
    /// Display name
    pub name: String,
    /// Free-form description
    pub about: String,
    /// Avatar URL
    pub picture: String,
    /// Unix timestamp (seconds) of the profile event
    pub created: i64,
}

impl Keyed for Profile {
    fn key(&self) -> &str {
        &self.creator
    }
}

/// Public channel metadata (channel creation event)
///
/// Append-only by `id`: a channel is never re-added or overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel id (the creation event id, hex)
    pub id: String,
    /// Creator public key (hex)
    pub creator: String,
    /// Channel name
    pub name: String,
    /// Channel description
    pub about: String,
    /// Channel picture URL
    pub picture: String,
    /// Unix timestamp (seconds)
    pub created: i64,
}

impl Keyed for Channel {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Update to an existing channel's metadata
///
/// Lives in its own id-space (the update event's id), append-only by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelUpdate {
    /// Update event id (hex)
    pub id: String,
    /// Id of the channel being updated
    pub channel_id: String,
    /// Author public key (hex)
    pub creator: String,
    /// New channel name
    pub name: String,
    /// New channel description
    pub about: String,
    /// New channel picture URL
    pub picture: String,
    /// Unix timestamp (seconds)
    pub created: i64,
}

impl Keyed for ChannelUpdate {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Record of a deleted event
///
/// Append-only by `event_id`; a deletion is never retracted once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDeletion {
    /// Id of the deleted event (hex)
    pub event_id: String,
    /// Reason given by the author, if any
    pub why: String,
}

impl Keyed for EventDeletion {
    fn key(&self) -> &str {
        &self.event_id
    }
}

/// Message posted to a public channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicMessage {
    /// Message event id (hex)
    pub id: String,
    /// Channel the message belongs to
    pub channel_id: String,
    /// Author public key (hex)
    pub creator: String,
    /// Message body
    pub content: String,
    /// Unix timestamp (seconds)
    pub created: i64,
}

impl Keyed for PublicMessage {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Encrypted direct message with a single counterparty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectMessage {
    /// Message event id (hex)
    pub id: String,
    /// Counterparty public key (hex) - the other end of the conversation
    pub peer: String,
    /// Author public key (hex)
    pub creator: String,
    /// Message body (decrypted by the relay client before delivery)
    pub content: String,
    /// Unix timestamp (seconds)
    pub created: i64,
}

impl Keyed for DirectMessage {
    fn key(&self) -> &str {
        &self.id
    }
}

/// A direct-message counterparty, derived from the DirectMessage collection
///
/// Never stored independently: the contact list is recomputed wholesale
/// whenever the DirectMessage collection changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Counterparty public key (hex)
    pub public_key: String,
    /// Bech32 npub encoding for display
    pub npub: String,
}

impl std::fmt::Display for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.npub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_keys() {
        let profile = Profile {
            creator: "abc".to_string(),
            name: "Alice".to_string(),
            about: String::new(),
            picture: String::new(),
            created: 1,
        };
        assert_eq!(profile.key(), "abc");

        let deletion = EventDeletion {
            event_id: "ev1".to_string(),
            why: String::new(),
        };
        assert_eq!(deletion.key(), "ev1");
    }

    #[test]
    fn test_record_serde_round_trip() {
        let msg = PublicMessage {
            id: "m1".to_string(),
            channel_id: "c1".to_string(),
            creator: "abc".to_string(),
            content: "hello".to_string(),
            created: 1700000000,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: PublicMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn test_contact_display_is_npub() {
        let contact = Contact {
            public_key: "abc".to_string(),
            npub: "npub1xyz".to_string(),
        };
        assert_eq!(contact.to_string(), "npub1xyz");
    }
}
