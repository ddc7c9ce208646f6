use async_trait::async_trait;
use reqwest::Client;

use super::types::{Offer, OfferSearchResponse};
use crate::core::error::{BridgeError, Result};

/// Source of open marketplace offers, as consumed by the sync engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferSource: Send + Sync {
    async fn fetch_open_offers(&self) -> Result<Vec<Offer>>;
}

/// REST client for the Peach marketplace API.
pub struct PeachClient {
    client: Client,
    base_url: String,
}

impl PeachClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_offers(&self) -> Result<Vec<Offer>> {
        let url = format!("{}/offer/search/nostr", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Peach API error: {} - {}", status, body);
            return Err(BridgeError::UnexpectedStatus { status, body });
        }

        let parsed: OfferSearchResponse = response.json().await?;
        tracing::debug!("Fetched {} open offers from Peach", parsed.offers.len());
        Ok(parsed.offers)
    }
}

#[async_trait]
impl OfferSource for PeachClient {
    async fn fetch_open_offers(&self) -> Result<Vec<Offer>> {
        self.get_offers().await
    }
}
