//! Relay publisher adapter.
//!
//! Wraps `nostr_sdk::Client`: one identity, one relay pool, sign-and-send
//! per listing. A send is best-effort across relays: per-relay rejections
//! are logged, and the call only fails when signing fails or no relay
//! accepted the event. Failures propagate to the sync engine so an offer
//! is never recorded as published without a confirmed send.

use async_trait::async_trait;
use nostr_sdk::{Client, Keys};

use super::listing::ListingEvent;
use crate::core::error::Result;

/// Sink for listing events, as consumed by the sync engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingPublisher: Send + Sync {
    async fn publish(&self, listing: &ListingEvent) -> Result<()>;
}

/// Publisher backed by a connected Nostr client.
pub struct NostrPublisher {
    client: Client,
}

impl NostrPublisher {
    /// Parses the signing key, registers every relay, and connects.
    pub async fn connect(secret_key: &str, relays: &[String]) -> Result<Self> {
        let keys = Keys::parse(secret_key)?;
        let client = Client::new(keys);

        for relay in relays {
            tracing::info!("Adding relay {}", relay);
            client.add_relay(relay.as_str()).await?;
        }

        client.connect().await;
        tracing::info!("Nostr client connected to {} relays", relays.len());

        Ok(Self { client })
    }
}

#[async_trait]
impl ListingPublisher for NostrPublisher {
    async fn publish(&self, listing: &ListingEvent) -> Result<()> {
        let output = self.client.send_event_builder(listing.to_builder()).await?;

        for (relay, message) in output.failed.iter() {
            tracing::warn!(
                "Relay {} rejected listing {}: {:?}",
                relay,
                listing.key,
                message
            );
        }
        tracing::debug!(
            "Listing {} accepted by {} relays",
            listing.key,
            output.success.len()
        );

        Ok(())
    }
}
