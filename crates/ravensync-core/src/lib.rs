//! Ravensync Core Library
//!
//! Synchronization core that keeps a local view of a nostr chat event
//! stream consistent with a remote relay, using an incremental cursor-based
//! pull protocol and per-kind reconciliation.
//!
//! ## Overview
//!
//! The relay transport lives outside this crate behind the
//! [`RelayClient`] trait. The core consumes its typed event bus, merges
//! incoming batches into six entity collections (profiles, channels,
//! channel updates, deletions, public messages, direct messages), derives
//! the contact list from direct messages, and drives the relay's
//! incremental `listen` call on an adaptive cadence.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  SyncOrchestrator                                               │
//! │  ├── ListenerRegistry: one subscription token per event kind    │
//! │  ├── PollScheduler: since-cursor + cancelable poll timer        │
//! │  │   └── ReadinessGate: poll only after the relay handshake     │
//! │  ├── merge: append-only / replace-by-identity reconciliation    │
//! │  ├── contacts: distinct peers of the DM collection, as npubs    │
//! │  └── SyncState: read-current / publish-new collections          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use ravensync_core::{SchedulerConfig, SyncOrchestrator};
//!
//! let mut orchestrator = SyncOrchestrator::new(my_pubkey, SchedulerConfig::default());
//! let mut events = orchestrator.subscribe();
//!
//! orchestrator.attach_client(relay_client);
//!
//! while let Ok(event) = events.recv().await {
//!     println!("collection changed: {:?}", event);
//! }
//! ```

pub mod contacts;
pub mod error;
pub mod events;
pub mod listener;
pub mod merge;
pub mod orchestrator;
pub mod relay;
pub mod scheduler;
pub mod state;
pub mod types;

// Re-exports
pub use contacts::{derive_contacts, npub_encode};
pub use error::{SyncError, SyncResult};
pub use events::SyncEvent;
pub use listener::{Handler, ListenerRegistry};
pub use merge::{merge_append, merge_replace, MergeOutcome, ReplaceOutcome};
pub use orchestrator::SyncOrchestrator;
pub use relay::{RelayClient, RelayEvent, RelayEventKind};
pub use scheduler::{PollScheduler, ReadinessGate, SchedulerConfig};
pub use state::SyncState;
pub use types::*;
