//! The offer synchronization loop.
//!
//! One strictly sequential cycle: fetch open offers, evict stale ids from
//! the dedup state, map and publish each new offer, persisting the state
//! after every confirmed publish. Errors never unwind past the loop: a
//! failed offer is retried next cycle, a failed cycle backs off and the
//! loop continues.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::store::{self, OfferStore};
use crate::api::peach::OfferSource;
use crate::api::types::Offer;
use crate::core::error::{BridgeError, Result};
use crate::core::health::HealthChecker;
use crate::nostr::listing::map_offer;
use crate::nostr::publisher::ListingPublisher;

/// Per-cycle counters, logged and asserted on in tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub new: usize,
    pub published: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Owns the dedup state and drives the fetch/publish/persist cycle.
///
/// Sole reader and writer of the offer store; nothing else touches the
/// published-id set.
pub struct SyncEngine<S, P> {
    source: S,
    publisher: P,
    store: OfferStore,
    published: HashSet<u64>,
    poll_interval: Duration,
    error_backoff: Duration,
    health: Option<Arc<HealthChecker>>,
}

impl<S, P> SyncEngine<S, P>
where
    S: OfferSource,
    P: ListingPublisher,
{
    /// Loads the persisted id set and builds the engine. A corrupt store
    /// is a startup failure; the loop must not run against bad state.
    pub fn new(
        source: S,
        publisher: P,
        store: OfferStore,
        poll_interval: Duration,
        error_backoff: Duration,
    ) -> Result<Self> {
        let published = store.load()?;
        Ok(Self {
            source,
            publisher,
            store,
            published,
            poll_interval,
            error_backoff,
            health: None,
        })
    }

    pub fn with_health_checker(mut self, health: Arc<HealthChecker>) -> Self {
        self.health = Some(health);
        self
    }

    pub fn published(&self) -> &HashSet<u64> {
        &self.published
    }

    /// Runs cycles until the process is terminated.
    pub async fn run(mut self) {
        tracing::info!(
            "Sync engine started ({} offers already published)",
            self.published.len()
        );

        loop {
            match self.run_cycle().await {
                Ok(report) => {
                    if report.published > 0 || report.failed > 0 {
                        tracing::info!(
                            "Cycle done: {} fetched, {} new, {} published, {} failed",
                            report.fetched,
                            report.new,
                            report.published,
                            report.failed
                        );
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => {
                    tracing::error!("Sync cycle failed: {}", e);
                    tokio::time::sleep(self.error_backoff).await;
                }
            }
        }
    }

    /// One fetch → prune → publish → persist pass.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let offers = match self.source.fetch_open_offers().await {
            Ok(offers) => {
                self.mark_marketplace_health(true).await;
                offers
            }
            Err(e) => {
                self.mark_marketplace_health(false).await;
                return Err(e);
            }
        };

        // Offers gone from the listing are forgotten before diffing.
        let live: HashSet<u64> = offers.iter().map(|o| o.id).collect();
        let retained = store::prune(&self.published, &live);
        let evicted = self.published.len() - retained.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} stale offer ids", evicted);
        }
        self.published = retained;

        let mut report = CycleReport {
            fetched: offers.len(),
            ..Default::default()
        };

        let new_offers: Vec<&Offer> = offers
            .iter()
            .filter(|o| !self.published.contains(&o.id))
            .collect();
        report.new = new_offers.len();

        for offer in new_offers {
            match self.publish_offer(offer).await {
                Ok(true) => {
                    // Persist immediately: a crash later in the cycle
                    // must not cause this offer to publish twice.
                    self.published.insert(offer.id);
                    self.store.save(&self.published)?;
                    tracing::info!("Published offer #{} to Nostr", offer.id);
                    report.published += 1;
                }
                Ok(false) => report.skipped += 1,
                Err(BridgeError::MalformedOffer { id, reason }) => {
                    tracing::error!("Upstream sent a malformed offer #{}: {}", id, reason);
                    report.failed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to publish offer #{}: {}; will retry next cycle",
                        offer.id,
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Publishes every listing event of one offer. `Ok(false)` means the
    /// offer mapped to nothing (buy side) and there was nothing to send.
    async fn publish_offer(&self, offer: &Offer) -> Result<bool> {
        let listings = map_offer(offer)?;
        if listings.is_empty() {
            return Ok(false);
        }

        for listing in &listings {
            self.publisher.publish(listing).await?;
        }

        Ok(true)
    }

    async fn mark_marketplace_health(&self, healthy: bool) {
        if let Some(health) = &self.health {
            health.update_component("marketplace_api", healthy).await;
        }
    }
}
