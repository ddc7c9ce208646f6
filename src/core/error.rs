use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors produced while syncing offers to Nostr.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Transport or decode failure talking to the Peach API.
    #[error("Peach API error: {0}")]
    Api(#[from] reqwest::Error),

    /// The Peach API answered with a non-success status.
    #[error("Peach API request failed: {status} - {body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// I/O failure reading or writing the offer store.
    #[error("offer store I/O error: {0}")]
    Storage(#[from] std::io::Error),

    /// The offer store file exists but does not hold a well-formed id set.
    #[error("offer store at {path} is corrupt: {source}")]
    StorageCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A fetched offer violates the upstream data contract.
    #[error("malformed offer {id}: {reason}")]
    MalformedOffer { id: u64, reason: &'static str },

    /// The configured Nostr private key could not be parsed.
    #[error("invalid Nostr private key: {0}")]
    Keys(#[from] nostr_sdk::key::Error),

    /// Nostr client failure: signing failed or no relay accepted a send.
    #[error("Nostr client error: {0}")]
    Nostr(#[from] nostr_sdk::client::Error),

    /// JSON serialization failure (offer store encoding).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
