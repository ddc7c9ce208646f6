use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Envelope returned by `GET /offer/search/nostr`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferSearchResponse {
    pub offers: Vec<Offer>,
}

/// Which side of the trade an offer sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferSide {
    /// Seller offering bitcoin (published to Nostr).
    Ask,
    /// Buyer looking for bitcoin (never published).
    Bid,
}

/// An open offer as listed by the Peach marketplace.
///
/// Price and payment-method maps keep the document's key order
/// (`IndexMap`), so "first currency" is well-defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: u64,
    #[serde(rename = "type")]
    pub side: OfferSide,
    pub amount: f64,
    #[serde(default)]
    pub premium: f64,
    #[serde(default)]
    pub prices: IndexMap<String, f64>,
    #[serde(default)]
    pub means_of_payment: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_count: u32,
}
