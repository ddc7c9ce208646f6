//! Offer-to-event mapping.
//!
//! Each sell-side offer fans out to one kind-38383 listing event per
//! currency in its payment-method map, following the NIP-69 order-event
//! tag vocabulary. Buy-side offers are never published.

use nostr_sdk::{EventBuilder, Kind, Tag, TagKind, Timestamp};
use serde::Serialize;

use crate::api::types::{Offer, OfferSide};
use crate::core::error::{BridgeError, Result};

/// NIP-69 peer-to-peer order event kind.
pub const LISTING_KIND: u16 = 38383;

/// Listings expire one hour after publication.
pub const LISTING_TTL_SECS: u64 = 60 * 60;

const SOURCE_URL: &str = "";
const NETWORK: &str = "mainnet";
const LAYER: &str = "onchain";
const BOND: &str = "0";
const PLATFORM: &str = "peach";
const DOCUMENT: &str = "order";

/// Rating payload embedded in the `rating` tag as compact JSON.
#[derive(Debug, Clone, Serialize)]
struct RatingSummary {
    total_reviews: u32,
    total_rating: f64,
}

/// One offer/currency pair, ready to be rendered as a Nostr event.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEvent {
    /// Replaceable-event identifier: `{offer_id}_{currency}`.
    pub key: String,
    pub side: &'static str,
    pub status: &'static str,
    pub amount: String,
    /// Representative fiat price: the first currency's value in the
    /// offer's price map.
    pub price_sample: String,
    pub premium: String,
    pub rating: String,
    pub display_name: String,
    /// Absolute expiration, unix seconds.
    pub expiration: u64,
    pub currency: String,
    pub payment_methods: Vec<String>,
}

impl ListingEvent {
    /// Renders the listing as an unsigned event draft with the full
    /// NIP-69 tag sequence and empty content.
    pub fn to_builder(&self) -> EventBuilder {
        let tags = vec![
            Tag::identifier(&self.key),
            Tag::custom(TagKind::custom("k"), [self.side]),
            Tag::custom(TagKind::custom("s"), [self.status]),
            Tag::custom(TagKind::custom("amt"), [self.amount.as_str()]),
            Tag::custom(TagKind::custom("fa"), [self.price_sample.as_str()]),
            Tag::custom(TagKind::custom("premium"), [self.premium.as_str()]),
            Tag::custom(TagKind::custom("rating"), [self.rating.as_str()]),
            Tag::custom(TagKind::custom("source"), [SOURCE_URL]),
            Tag::custom(TagKind::custom("network"), [NETWORK]),
            Tag::custom(TagKind::custom("layer"), [LAYER]),
            Tag::custom(TagKind::custom("name"), [self.display_name.as_str()]),
            Tag::custom(TagKind::custom("bond"), [BOND]),
            Tag::expiration(Timestamp::from(self.expiration)),
            Tag::custom(TagKind::custom("y"), [PLATFORM]),
            Tag::custom(TagKind::custom("z"), [DOCUMENT]),
            Tag::custom(TagKind::custom("f"), [self.currency.as_str()]),
            Tag::custom(TagKind::custom("pm"), self.payment_methods.clone()),
        ];

        EventBuilder::new(Kind::from(LISTING_KIND), "").tags(tags)
    }
}

/// Maps a marketplace offer to its listing events.
///
/// Bid-side offers yield an empty vector (skip, not an error). An ask
/// offer without a price map violates the upstream data contract and
/// fails with [`BridgeError::MalformedOffer`].
pub fn map_offer(offer: &Offer) -> Result<Vec<ListingEvent>> {
    if offer.side == OfferSide::Bid {
        tracing::debug!("Skipping buy offer #{}", offer.id);
        return Ok(Vec::new());
    }

    let (_, first_price) =
        offer
            .prices
            .get_index(0)
            .ok_or(BridgeError::MalformedOffer {
                id: offer.id,
                reason: "offer has no price map",
            })?;

    let expiration = Timestamp::now().as_u64() + LISTING_TTL_SECS;

    let rating = serde_json::to_string(&RatingSummary {
        total_reviews: offer.rating_count,
        total_rating: offer.rating,
    })?;

    let listings = offer
        .means_of_payment
        .iter()
        .map(|(currency, methods)| ListingEvent {
            key: format!("{}_{}", offer.id, currency),
            side: "sell",
            status: "pending",
            amount: offer.amount.to_string(),
            price_sample: first_price.to_string(),
            premium: offer.premium.to_string(),
            rating: rating.clone(),
            display_name: offer.user_id.clone(),
            expiration,
            currency: currency.clone(),
            payment_methods: methods.clone(),
        })
        .collect();

    Ok(listings)
}
