// File: loadout-common/src/models/product.rs

use serde::{Deserialize, Serialize};

use crate::models::notification::EbsNotification;

/// The streamer's choice of which purchasable SKU maps to which EBS product.
/// A SKU without a mapping is inert: a purchase of it never triggers an effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamerProduct {
    pub twitch_product_sku: String,
    pub ebs_product_id: String,
    #[serde(default)]
    pub name: String,
    /// How long the effect runs, in seconds. `None` means until cleared.
    #[serde(default)]
    pub duration_s: Option<i64>,
}

/// Platform-defined effect template. The streamer cannot change these;
/// they only pick which of them a SKU maps onto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbsProduct {
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub effect: EbsEffect,
    /// Ids into the platform-wide duration table.
    #[serde(default)]
    pub durations: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

/// The in-world behaviour an active product performs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbsEffect {
    #[serde(default)]
    pub model_ids: Vec<i32>,
    #[serde(default)]
    pub animation_id: Option<i32>,
    #[serde(default)]
    pub start_notifications: Vec<EbsNotification>,
    #[serde(default)]
    pub end_notifications: Vec<EbsNotification>,
}

/// A platform-wide purchasable duration option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbsProductDuration {
    pub id: String,
    pub duration_s: i64,
}
