//! Error types for the ravensync core

use thiserror::Error;

/// Main error type for ravensync operations
///
/// The core deliberately has almost no failure paths: duplicate events and
/// absent relay clients are handled as no-ops, and merges are total. What
/// remains is the strict NIP-19 encoding path.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A string could not be parsed or encoded as a nostr public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Result type alias using SyncError
pub type SyncResult<T> = Result<T, SyncError>;
