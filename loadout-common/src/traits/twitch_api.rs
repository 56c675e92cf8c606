// File: loadout-common/src/traits/twitch_api.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Error;
use crate::models::{EbsProduct, EbsProductDuration, TwitchTransaction};

/// Envelope for the transaction poll. `status == false` means the payload
/// must be discarded and the previous state kept.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsResponse {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub transactions: Vec<TwitchTransaction>,
}

/// Envelope for the EBS product catalog fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsResponse {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub products: Vec<EbsProduct>,
    #[serde(default)]
    pub durations: Vec<EbsProductDuration>,
}

/// Outbound HTTP collaborator. Polled from the network context; results are
/// merged back into the core through the queue/swap mechanisms, never from
/// the tick context.
#[async_trait]
pub trait TwitchApi: Send + Sync {
    /// Transactions that occurred since the given watermark.
    async fn get_ebs_transactions(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<TransactionsResponse, Error>;

    async fn get_ebs_products(&self) -> Result<ProductsResponse, Error>;

    /// The broadcaster configuration segment; contains `streamerProducts`.
    async fn get_configuration_segment(&self) -> Result<serde_json::Value, Error>;
}
