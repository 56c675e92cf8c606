// File: loadout-core/src/config.rs

use serde::Deserialize;

/// Tuning for the activation manager and notification scheduler. All of the
/// defaults follow the reference extension behaviour; none of them are hard
/// constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MarketplaceConfig {
    /// How many products may run concurrently. The conservative reference
    /// behaviour serializes activation to one at a time to bound
    /// world-resource usage.
    pub max_active_products: usize,

    /// Bounded transaction queue; oldest entries are evicted on overflow.
    pub transaction_queue_size: usize,

    /// How many transaction ids we remember for deduplication.
    pub transaction_history_size: usize,

    /// The transaction poll asks for everything since the watermark minus
    /// this offset, to absorb upstream delivery delay.
    pub transaction_checked_at_offset_ms: i64,

    /// Bounded notification group queue; oldest groups are evicted.
    pub notification_queue_size: usize,

    pub chat_notification_lock_ms: i64,
    pub overhead_notification_lock_ms: i64,
    pub overhead_notification_duration_ms: i64,

    /// How long after a product stops its end notifications may still fire.
    pub end_notification_grace_ms: i64,

    /// Grace applied when suppressing notifications for expired products.
    pub expiry_suppression_grace_ms: i64,

    /// Period of the apply/update tick loop.
    pub apply_interval_ms: u64,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            max_active_products: 1,
            transaction_queue_size: 50,
            transaction_history_size: 50,
            transaction_checked_at_offset_ms: 10_000,
            notification_queue_size: 200,
            chat_notification_lock_ms: 1_000,
            overhead_notification_lock_ms: 3_000,
            overhead_notification_duration_ms: 2_000,
            end_notification_grace_ms: 7_000,
            expiry_suppression_grace_ms: 2_000,
            apply_interval_ms: 200,
        }
    }
}

/// Connection tuning for the pub/sub socket client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PubSubConfig {
    pub url: String,

    /// Topic we LISTEN on once the socket opens.
    pub topic: String,

    /// OAuth token stamped onto outbound frames that require auth.
    pub auth_token: String,

    pub ping_interval_ms: i64,
    pub ping_timeout_ms: i64,

    /// Back-off between reconnect attempts.
    pub reconnect_delay_ms: u64,
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            url: "wss://pubsub-edge.twitch.tv".to_string(),
            topic: String::new(),
            auth_token: String::new(),
            ping_interval_ms: 180_000,
            ping_timeout_ms: 10_000,
            reconnect_delay_ms: 15_000,
        }
    }
}

/// Settings for the EBS HTTP collaborator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EbsApiConfig {
    pub base_url: String,
    pub auth_token: String,
}

impl Default for EbsApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_token: String::new(),
        }
    }
}

/// Top-level configuration, deserializable from a JSON settings blob.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoadoutConfig {
    pub marketplace: MarketplaceConfig,
    pub pubsub: PubSubConfig,
    pub api: EbsApiConfig,
}

impl LoadoutConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let cfg = MarketplaceConfig::default();
        assert_eq!(cfg.max_active_products, 1);
        assert_eq!(cfg.transaction_queue_size, 50);
        assert_eq!(cfg.notification_queue_size, 200);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg = LoadoutConfig::from_json_str(
            r#"{ "marketplace": { "max_active_products": 3 }, "pubsub": { "topic": "t" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.marketplace.max_active_products, 3);
        assert_eq!(cfg.marketplace.transaction_queue_size, 50);
        assert_eq!(cfg.pubsub.topic, "t");
        assert_eq!(cfg.pubsub.ping_interval_ms, 180_000);
    }
}
