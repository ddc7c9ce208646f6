//! Bridge between the Peach Bitcoin marketplace and Nostr.
//!
//! Polls the Peach API for open sell offers and republishes each one as a
//! signed kind-38383 listing event on a set of Nostr relays, at most once
//! per offer across process restarts.
//!
//! Module overview:
//! - `api`: Peach REST client and offer records
//! - `nostr`: offer-to-event mapping and the relay publisher
//! - `sync`: dedup store and the polling engine
//! - `core`: config, errors, logging, health

pub mod api;
pub mod core;
pub mod nostr;
pub mod sync;
