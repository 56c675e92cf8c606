// File: loadout-common/src/models/transaction.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the purchase cost the viewer, as reported by Twitch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitchProductCost {
    pub amount: u32,
    #[serde(rename = "type")]
    pub cost_type: String,
}

/// The Twitch-side product block nested inside an extension transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitchProductData {
    pub sku: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub cost: Option<TwitchProductCost>,
}

/// One extension purchase as delivered by the pub/sub stream or the
/// transaction poll. Immutable once parsed; deduplicated by `id` because
/// upstream delivery is at-least-once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitchTransaction {
    pub id: String,
    pub user_name: String,

    /// Flat SKU field, present on pub/sub payloads.
    #[serde(default)]
    pub product_sku: Option<String>,

    /// Nested product block, present on polled transactions.
    #[serde(default)]
    pub product_data: Option<TwitchProductData>,

    #[serde(skip, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl TwitchTransaction {
    /// The SKU this purchase refers to, whichever shape it arrived in.
    pub fn sku(&self) -> Option<&str> {
        self.product_sku
            .as_deref()
            .or_else(|| self.product_data.as_ref().map(|d| d.sku.as_str()))
    }

    pub fn cost(&self) -> Option<&TwitchProductCost> {
        self.product_data.as_ref().and_then(|d| d.cost.as_ref())
    }
}
