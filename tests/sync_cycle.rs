//! Full-cycle scenarios driving the sync engine with fake collaborators
//! and a real offer store on disk.

use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use tempfile::tempdir;

use peach_nostr_bridge::api::peach::OfferSource;
use peach_nostr_bridge::api::types::{Offer, OfferSide};
use peach_nostr_bridge::core::error::{BridgeError, Result as BridgeResult};
use peach_nostr_bridge::nostr::listing::ListingEvent;
use peach_nostr_bridge::nostr::publisher::ListingPublisher;
use peach_nostr_bridge::sync::{OfferStore, SyncEngine};

fn ask_offer(id: u64, currencies: &[&str]) -> Offer {
    let mut prices = IndexMap::new();
    let mut means_of_payment = IndexMap::new();
    for (i, currency) in currencies.iter().enumerate() {
        prices.insert(currency.to_string(), 100.0 + i as f64);
        means_of_payment.insert(currency.to_string(), vec!["sepa".to_string()]);
    }

    Offer {
        id,
        side: OfferSide::Ask,
        amount: 300000.0,
        premium: 1.5,
        prices,
        means_of_payment,
        user_id: "seller".to_string(),
        rating: 4.0,
        rating_count: 8,
    }
}

fn bid_offer(id: u64) -> Offer {
    let mut offer = ask_offer(id, &[]);
    offer.side = OfferSide::Bid;
    offer
}

/// Scripted marketplace: each fetch pops the next canned response.
struct FakeMarketplace {
    responses: Mutex<VecDeque<BridgeResult<Vec<Offer>>>>,
}

impl FakeMarketplace {
    fn new(responses: Vec<BridgeResult<Vec<Offer>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl OfferSource for FakeMarketplace {
    async fn fetch_open_offers(&self) -> BridgeResult<Vec<Offer>> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("fetch called more times than scripted")
    }
}

/// Recording publisher that can be told to fail specific listing keys.
#[derive(Default)]
struct FakePublisher {
    fail_keys: Mutex<HashSet<String>>,
    sent: Mutex<Vec<String>>,
}

impl FakePublisher {
    fn failing(keys: &[&str]) -> Self {
        Self {
            fail_keys: Mutex::new(keys.iter().map(|k| k.to_string()).collect()),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent_keys(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    fn clear_failures(&self) {
        self.fail_keys.lock().unwrap().clear();
    }
}

#[async_trait]
impl ListingPublisher for &FakePublisher {
    async fn publish(&self, listing: &ListingEvent) -> BridgeResult<()> {
        if self.fail_keys.lock().unwrap().contains(&listing.key) {
            return Err(BridgeError::Storage(io::Error::new(
                io::ErrorKind::Other,
                "all relays refused the event",
            )));
        }
        self.sent.lock().unwrap().push(listing.key.clone());
        Ok(())
    }
}

fn engine<'a>(
    source: FakeMarketplace,
    publisher: &'a FakePublisher,
    store_path: &Path,
) -> SyncEngine<FakeMarketplace, &'a FakePublisher> {
    SyncEngine::new(
        source,
        publisher,
        OfferStore::new(store_path),
        Duration::from_secs(5),
        Duration::from_secs(10),
    )
    .expect("store should load")
}

#[tokio::test]
async fn one_cycle_publishes_asks_skips_bids_and_persists() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("offers.json");

    let source = FakeMarketplace::new(vec![Ok(vec![
        ask_offer(10, &["EUR"]),
        bid_offer(11),
    ])]);
    let publisher = FakePublisher::default();

    let mut engine = engine(source, &publisher, &store_path);
    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.fetched, 2);
    assert_eq!(report.published, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(publisher.sent_keys(), vec!["10_EUR"]);

    // The bid never made it into durable state.
    let persisted = OfferStore::new(&store_path).load().unwrap();
    assert_eq!(persisted, [10u64].into_iter().collect());
}

#[tokio::test]
async fn published_offers_survive_a_restart() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("offers.json");

    let publisher = FakePublisher::default();
    let source = FakeMarketplace::new(vec![Ok(vec![ask_offer(10, &["EUR"])])]);
    let mut first = engine(source, &publisher, &store_path);
    first.run_cycle().await.unwrap();
    drop(first);

    // Fresh engine, same store file: the offer must not publish again.
    let source = FakeMarketplace::new(vec![Ok(vec![ask_offer(10, &["EUR"])])]);
    let mut second = engine(source, &publisher, &store_path);
    let report = second.run_cycle().await.unwrap();

    assert_eq!(report.new, 0);
    assert_eq!(publisher.sent_keys(), vec!["10_EUR"]);
}

#[tokio::test]
async fn failed_offer_is_retried_on_the_next_cycle() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("offers.json");

    let source = FakeMarketplace::new(vec![
        Ok(vec![ask_offer(10, &["EUR"])]),
        Ok(vec![ask_offer(10, &["EUR"])]),
    ]);
    let publisher = FakePublisher::failing(&["10_EUR"]);

    let mut engine = engine(source, &publisher, &store_path);
    let first = engine.run_cycle().await.unwrap();
    assert_eq!(first.failed, 1);
    assert!(OfferStore::new(&store_path).load().unwrap().is_empty());

    publisher.clear_failures();
    let second = engine.run_cycle().await.unwrap();
    assert_eq!(second.published, 1);
    assert_eq!(
        OfferStore::new(&store_path).load().unwrap(),
        [10u64].into_iter().collect()
    );
}

#[tokio::test]
async fn partial_progress_within_a_cycle_is_durable() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("offers.json");

    let source = FakeMarketplace::new(vec![Ok(vec![
        ask_offer(10, &["EUR"]),
        ask_offer(20, &["CHF"]),
    ])]);
    let publisher = FakePublisher::failing(&["20_CHF"]);

    let mut engine = engine(source, &publisher, &store_path);
    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.published, 1);
    assert_eq!(report.failed, 1);
    // Offer 10 was persisted before offer 20 failed.
    assert_eq!(
        OfferStore::new(&store_path).load().unwrap(),
        [10u64].into_iter().collect()
    );
}

#[tokio::test]
async fn delisted_offer_is_forgotten_and_relisting_counts_as_new() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("offers.json");

    let source = FakeMarketplace::new(vec![
        Ok(vec![ask_offer(10, &["EUR"])]),
        // Offer 10 disappears from the marketplace...
        Ok(vec![ask_offer(99, &["EUR"])]),
        // ...and relists later under the same id.
        Ok(vec![ask_offer(99, &["EUR"]), ask_offer(10, &["EUR"])]),
    ]);
    let publisher = FakePublisher::default();

    let mut engine = engine(source, &publisher, &store_path);
    engine.run_cycle().await.unwrap();
    engine.run_cycle().await.unwrap();
    engine.run_cycle().await.unwrap();

    assert_eq!(publisher.sent_keys(), vec!["10_EUR", "99_EUR", "10_EUR"]);
    assert_eq!(
        OfferStore::new(&store_path).load().unwrap(),
        [10u64, 99].into_iter().collect()
    );
}

#[tokio::test]
async fn fetch_failure_ends_the_cycle_without_touching_state() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("offers.json");
    OfferStore::new(&store_path)
        .save(&[7u64].into_iter().collect())
        .unwrap();

    let source = FakeMarketplace::new(vec![Err(BridgeError::Storage(io::Error::new(
        io::ErrorKind::Other,
        "marketplace unreachable",
    )))]);
    let publisher = FakePublisher::default();

    let mut engine = engine(source, &publisher, &store_path);
    assert!(engine.run_cycle().await.is_err());

    assert!(publisher.sent_keys().is_empty());
    assert_eq!(
        OfferStore::new(&store_path).load().unwrap(),
        [7u64].into_iter().collect()
    );
}
