// File: loadout-core/src/services/marketplace_events.rs

use std::sync::Arc;

use tracing::{debug, info, warn};

use loadout_common::models::TwitchTransaction;

use crate::eventbus::{BusEvent, EventBus};
use crate::marketplace::MarketplaceManager;

/// Raw event type carrying a purchase notification.
pub const TRANSACTION_CREATED: &str = "transaction-created";

/// Subscribes to the event bus and dispatches raw pub/sub events into the
/// marketplace by event-type string. Each handler is a pure state
/// transition on the manager; unknown types are logged and dropped.
pub struct MarketplaceEventService {
    event_bus: Arc<EventBus>,
    manager: Arc<MarketplaceManager>,
}

impl MarketplaceEventService {
    pub fn new(event_bus: Arc<EventBus>, manager: Arc<MarketplaceManager>) -> Self {
        Self { event_bus, manager }
    }

    /// Listen until the bus shuts down. Run this inside its own task.
    pub async fn start(&self) {
        let mut rx = self.event_bus.subscribe(None).await;

        info!("MarketplaceEventService started, listening on EventBus.");

        while let Some(event) = rx.recv().await {
            match event {
                BusEvent::PubSub { msg_type, data } => {
                    self.dispatch(&msg_type, data);
                }
                BusEvent::SocketReady => {
                    debug!("pub/sub socket ready");
                }
                _ => {}
            }
        }

        info!("MarketplaceEventService: shutting down listener loop.");
    }

    /// Typed dispatch keyed by the raw event-type string.
    pub fn dispatch(&self, msg_type: &str, data: serde_json::Value) {
        match msg_type {
            TRANSACTION_CREATED => self.handle_transaction_created(data),
            other => {
                debug!("Ignoring unhandled pub/sub event type: {}", other);
            }
        }
    }

    fn handle_transaction_created(&self, data: serde_json::Value) {
        let transaction: TwitchTransaction = match serde_json::from_value(data) {
            Ok(t) => t,
            Err(e) => {
                warn!("Dropping malformed transaction payload: {}", e);
                return;
            }
        };
        self.manager.queue_transaction(transaction);
    }
}
