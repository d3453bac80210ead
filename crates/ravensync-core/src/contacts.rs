//! Contact derivation from the direct-message collection
//!
//! The contact list is never patched incrementally: it is recomputed
//! wholesale from the distinct set of `peer` values every time the
//! DirectMessage collection changes, so it can never drift out of sync
//! with the messages it is derived from.

use std::collections::HashSet;

use nostr::{PublicKey, ToBech32};
use tracing::warn;

use crate::error::{SyncError, SyncResult};
use crate::types::{Contact, DirectMessage};

/// Encode a hex public key as a bech32 npub.
///
/// Strict variant: callers that require a valid npub get the failure.
pub fn npub_encode(public_key: &str) -> SyncResult<String> {
    let pk = PublicKey::from_hex(public_key)
        .map_err(|_| SyncError::InvalidPublicKey(public_key.to_string()))?;
    pk.to_bech32()
        .map_err(|_| SyncError::InvalidPublicKey(public_key.to_string()))
}

/// Derive the contact list from a DirectMessage collection.
///
/// Contacts are the distinct `peer` values in first-appearance order. A
/// peer that fails npub encoding keeps its raw key as the display
/// identifier rather than dropping out of the list: the contact set must
/// stay exactly the projection of distinct peers.
pub fn derive_contacts(messages: &[DirectMessage]) -> Vec<Contact> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut contacts = Vec::new();

    for msg in messages {
        if !seen.insert(msg.peer.as_str()) {
            continue;
        }
        let npub = match npub_encode(&msg.peer) {
            Ok(npub) => npub,
            Err(_) => {
                warn!(peer = %msg.peer, "Peer key is not npub-encodable, using raw key");
                msg.peer.clone()
            }
        };
        contacts.push(Contact {
            public_key: msg.peer.clone(),
            npub,
        });
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostr::nips::nip19::FromBech32;

    // A well-formed x-only public key (hex).
    const PUBKEY_HEX: &str = "82341f882b6eabcd2ba7f1ef90aad961cf074af15b9ef44a09f9d2a8fbfbe6a2";

    fn dm(id: &str, peer: &str) -> DirectMessage {
        DirectMessage {
            id: id.to_string(),
            peer: peer.to_string(),
            creator: "me".to_string(),
            content: String::new(),
            created: 0,
        }
    }

    #[test]
    fn test_npub_encode_round_trip() {
        let npub = npub_encode(PUBKEY_HEX).unwrap();
        assert!(npub.starts_with("npub1"));

        let decoded = PublicKey::from_bech32(&npub).unwrap();
        assert_eq!(decoded.to_hex(), PUBKEY_HEX);
    }

    #[test]
    fn test_npub_encode_rejects_garbage() {
        let err = npub_encode("p1").unwrap_err();
        assert!(matches!(err, SyncError::InvalidPublicKey(_)));
    }

    #[test]
    fn test_distinct_peers_regardless_of_order() {
        let messages = vec![dm("1", "p1"), dm("2", "p2"), dm("3", "p1")];
        let contacts = derive_contacts(&messages);

        let peers: Vec<&str> = contacts.iter().map(|c| c.public_key.as_str()).collect();
        assert_eq!(peers, vec!["p1", "p2"]);

        let reversed: Vec<DirectMessage> = messages.into_iter().rev().collect();
        let contacts_rev = derive_contacts(&reversed);
        let mut a: Vec<String> = contacts.iter().map(|c| c.public_key.clone()).collect();
        let mut b: Vec<String> = contacts_rev.iter().map(|c| c.public_key.clone()).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_valid_peer_gets_npub() {
        let contacts = derive_contacts(&[dm("1", PUBKEY_HEX)]);
        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].npub.starts_with("npub1"));
    }

    #[test]
    fn test_unencodable_peer_keeps_raw_key() {
        let contacts = derive_contacts(&[dm("1", "p1")]);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].npub, "p1");
    }

    #[test]
    fn test_empty_collection_derives_no_contacts() {
        assert!(derive_contacts(&[]).is_empty());
    }
}
