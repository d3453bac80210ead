//! Dedup/append merge algorithms for entity collections
//!
//! Two policies cover all six event streams:
//!
//! - **Append-only by identity** (channels, channel updates, deletions,
//!   public and direct messages): batch elements whose key already exists
//!   are silently dropped; first-write wins.
//! - **Replace by identity** (profiles): existing elements colliding with a
//!   batch key are removed, then the batch is appended; last-write wins.
//!
//! Both are pure functions over slices: no error paths, no side effects.
//! They return the genuinely appended elements alongside the new collection
//! because the orchestrator needs exactly those for selective profile
//! loading.

use std::collections::HashSet;

use crate::types::Keyed;

/// Result of an append-only merge
#[derive(Debug, Clone)]
pub struct MergeOutcome<T> {
    /// The new collection: current ++ new batch elements, insertion order
    pub collection: Vec<T>,
    /// Batch elements that were genuinely new (not already present)
    pub appended: Vec<T>,
}

impl<T> MergeOutcome<T> {
    /// Whether the merge added anything
    pub fn changed(&self) -> bool {
        !self.appended.is_empty()
    }
}

/// Result of a replace-by-identity merge
#[derive(Debug, Clone)]
pub struct ReplaceOutcome<T> {
    /// The new collection with colliding elements replaced
    pub collection: Vec<T>,
    /// The batch element matching the local user's own key, if any
    pub own: Option<T>,
}

/// Append-only merge: keep everything already present, append batch
/// elements whose identity key is unseen.
///
/// Batch-internal duplicates are collapsed to their first occurrence so the
/// result never carries two elements with the same key.
pub fn merge_append<T>(current: &[T], batch: &[T]) -> MergeOutcome<T>
where
    T: Keyed + Clone,
{
    let mut seen: HashSet<&str> = current.iter().map(|x| x.key()).collect();

    let mut appended = Vec::new();
    for item in batch {
        if seen.insert(item.key()) {
            appended.push(item.clone());
        }
    }

    let mut collection = Vec::with_capacity(current.len() + appended.len());
    collection.extend_from_slice(current);
    collection.extend(appended.iter().cloned());

    MergeOutcome {
        collection,
        appended,
    }
}

/// Replace-by-identity merge: drop existing elements whose key collides
/// with a batch element, then append the batch; last-write wins.
///
/// `own_key` is the local user's identity; if the batch carries an element
/// for it, the last such element is surfaced separately so callers can
/// track a singleton current-user record.
///
/// Batch-internal duplicates are collapsed to their last occurrence,
/// consistent with the last-write-wins policy.
pub fn merge_replace<T>(current: &[T], batch: &[T], own_key: &str) -> ReplaceOutcome<T>
where
    T: Keyed + Clone,
{
    // Last occurrence per key, preserving the order of last appearances.
    let mut deduped: Vec<T> = Vec::with_capacity(batch.len());
    for item in batch.iter().rev() {
        if !deduped.iter().any(|x: &T| x.key() == item.key()) {
            deduped.push(item.clone());
        }
    }
    deduped.reverse();

    let incoming: HashSet<&str> = deduped.iter().map(|x| x.key()).collect();

    let mut collection: Vec<T> = current
        .iter()
        .filter(|x| !incoming.contains(x.key()))
        .cloned()
        .collect();
    collection.extend(deduped.iter().cloned());

    let own = deduped.iter().rev().find(|x| x.key() == own_key).cloned();

    ReplaceOutcome { collection, own }
}
