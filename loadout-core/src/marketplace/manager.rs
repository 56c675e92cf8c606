// File: loadout-core/src/marketplace/manager.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use loadout_common::models::{EbsProduct, EbsProductDuration, StreamerProduct, TwitchTransaction};
use loadout_common::time::SharedClock;
use loadout_common::traits::{GameClient, TwitchApi};

use crate::config::MarketplaceConfig;

use super::notifications::NotificationManager;
use super::products::{MarketplaceProduct, ProductState, SharedProduct};
use super::transactions::TransactionQueue;

/// Validates queued transactions against the catalog, merges the three
/// configuration layers (purchase, streamer mapping, EBS product) into
/// active products, and owns the active set's full lifecycle.
///
/// Catalog collections and the active set are copy-on-write: writers swap
/// the whole `Arc<Vec<_>>`, readers clone the `Arc` and iterate a snapshot,
/// so the network context never races the tick context.
pub struct MarketplaceManager {
    api: Arc<dyn TwitchApi>,
    game: Arc<dyn GameClient>,
    clock: SharedClock,
    config: MarketplaceConfig,

    notifications: NotificationManager,
    transactions: TransactionQueue,

    streamer_products: RwLock<Arc<Vec<StreamerProduct>>>,
    ebs_products: RwLock<Arc<Vec<EbsProduct>>>,
    ebs_durations: RwLock<Arc<Vec<EbsProductDuration>>>,

    active_products: RwLock<Arc<Vec<SharedProduct>>>,

    transactions_last_checked_at: Mutex<Option<DateTime<Utc>>>,
}

impl MarketplaceManager {
    pub fn new(
        api: Arc<dyn TwitchApi>,
        game: Arc<dyn GameClient>,
        clock: SharedClock,
        config: MarketplaceConfig,
    ) -> Self {
        let notifications = NotificationManager::new(game.clone(), clock.clone(), config.clone());
        let transactions = TransactionQueue::new(
            config.transaction_queue_size,
            config.transaction_history_size,
        );
        Self {
            api,
            game,
            clock,
            config,
            notifications,
            transactions,
            streamer_products: RwLock::new(Arc::new(Vec::new())),
            ebs_products: RwLock::new(Arc::new(Vec::new())),
            ebs_durations: RwLock::new(Arc::new(Vec::new())),
            active_products: RwLock::new(Arc::new(Vec::new())),
            transactions_last_checked_at: Mutex::new(None),
        }
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    // ────────────────────────────────────────────────────────────────
    // transaction intake (network context)
    // ────────────────────────────────────────────────────────────────

    /// Queue one raw transaction for validation. Refused while the
    /// concurrency budget is spent, so a burst of purchases cannot trigger
    /// unbounded concurrent activation.
    pub fn queue_transaction(&self, mut transaction: TwitchTransaction) -> bool {
        if self.transactions.len() + self.active_count() >= self.config.max_active_products {
            debug!(
                "Refusing transaction {}: concurrency budget is spent",
                transaction.id
            );
            return false;
        }
        transaction.received_at = self.clock.now();
        self.transactions.push(transaction)
    }

    /// Poll for transactions that occurred since the last successful fetch.
    /// The watermark only advances after a successful parse, so a failed
    /// fetch is naturally retried from the same point.
    pub async fn fetch_new_transactions(&self) {
        let since = self
            .transactions_last_checked_at
            .lock()
            .map(|at| at - Duration::milliseconds(self.config.transaction_checked_at_offset_ms));

        let response = match self.api.get_ebs_transactions(since).await {
            Ok(r) => r,
            Err(e) => {
                debug!("Transaction fetch failed, retrying next poll: {}", e);
                return;
            }
        };

        if !response.status {
            warn!(
                "Could not fetch EBS transactions as the status is invalid with message: {}",
                response.message
            );
            return;
        }

        for transaction in response.transactions {
            self.queue_transaction(transaction);
        }

        *self.transactions_last_checked_at.lock() = Some(self.clock.now());
    }

    // ────────────────────────────────────────────────────────────────
    // activation (tick context)
    // ────────────────────────────────────────────────────────────────

    /// Resolve queued transactions into active products, strictly in
    /// arrival order. A transaction whose SKU was never configured by the
    /// streamer is dropped, not retried: redelivery would repeat the miss.
    pub fn apply_queued_transactions(&self) {
        // only apply products when the player is ready for world effects
        if !self.game.is_logged_in() {
            return;
        }

        loop {
            if self.active_count() >= self.config.max_active_products {
                // the slot is taken; later transactions wait their turn
                return;
            }

            let Some(transaction) = self.transactions.pop_front() else {
                return;
            };

            let Some(sku) = transaction.sku().map(str::to_string) else {
                warn!("Dropping transaction {} without a product SKU", transaction.id);
                continue;
            };

            let Some(streamer_product) = self.streamer_product_by_sku(&sku) else {
                info!(
                    "Dropping transaction {}: no streamer product configured for SKU {}",
                    transaction.id, sku
                );
                continue;
            };

            let Some(ebs_product) = self.ebs_product_by_id(&streamer_product.ebs_product_id)
            else {
                info!(
                    "Dropping transaction {}: no EBS product with ID {}",
                    transaction.id, streamer_product.ebs_product_id
                );
                continue;
            };

            if !ebs_product.enabled {
                info!(
                    "Dropping transaction {}: EBS product {} is disabled",
                    transaction.id, ebs_product.id
                );
                continue;
            }

            info!("Found a valid transaction that we can start: {}", transaction.id);
            info!("Twitch product SKU: {}", sku);
            info!("Streamer product name: {}", streamer_product.name);
            info!("EBS product ID: {}", ebs_product.id);

            let product = MarketplaceProduct::new(
                transaction,
                streamer_product,
                ebs_product,
                self.clock.now(),
            )
            .into_shared();

            let start_definitions = {
                let locked = product.lock();
                locked.ebs_product.effect.start_notifications.clone()
            };

            self.push_active(product.clone());
            self.notifications
                .queue_notifications(&product, &start_definitions);
        }
    }

    /// Behaviour step and expiry check for every active product. Iterates a
    /// snapshot: the set may be appended concurrently from the network path.
    pub fn update_active_products(&self) {
        if !self.game.is_logged_in() {
            return;
        }

        let now = self.clock.now();
        let snapshot = self.active_snapshot();
        let mut any_stopped = false;

        for product in snapshot.iter() {
            let end_definitions = {
                let mut locked = product.lock();
                locked.handle_behaviour(&*self.game);

                if locked.is_active() && locked.is_expired(now, 0) {
                    locked.begin_expiry();
                    let definitions = locked.ebs_product.effect.end_notifications.clone();
                    locked.stop(&*self.game, now);
                    any_stopped = true;
                    Some(definitions)
                } else {
                    None
                }
            };

            if let Some(definitions) = end_definitions {
                self.notifications
                    .queue_notifications(product, &definitions);
            }
        }

        if any_stopped {
            self.remove_stopped_products();
        }
    }

    /// Lightweight per-tick work: pump the notification scheduler.
    pub fn on_game_tick(&self) {
        self.notifications.on_game_tick();
    }

    /// The scene reloaded; every owned object needs re-placement.
    pub fn on_scene_reload(&self) {
        for product in self.active_snapshot().iter() {
            product.lock().mark_respawn_required();
        }
    }

    // ────────────────────────────────────────────────────────────────
    // catalog refresh (network context)
    // ────────────────────────────────────────────────────────────────

    /// Refresh the streamer's SKU → product mappings from the configuration
    /// segment. The collection is swapped whole; a failed fetch keeps the
    /// previous mappings intact.
    pub async fn update_streamer_products(&self) {
        let segment = match self.api.get_configuration_segment().await {
            Ok(s) => s,
            Err(e) => {
                debug!("Configuration segment fetch failed: {}", e);
                return;
            }
        };

        let Some(raw_products) = segment.get("streamerProducts").and_then(|v| v.as_array())
        else {
            return;
        };

        let mut new_products: Vec<StreamerProduct> = Vec::with_capacity(raw_products.len());
        for raw in raw_products {
            match serde_json::from_value::<StreamerProduct>(raw.clone()) {
                Ok(product) => new_products.push(product),
                Err(e) => debug!("Skipping malformed streamer product: {}", e),
            }
        }

        *self.streamer_products.write() = Arc::new(new_products);
    }

    /// Refresh the platform-defined products and durations. An invalid
    /// status keeps the old catalog intact (fail-open to last-known-good).
    pub async fn update_ebs_products(&self) {
        let response = match self.api.get_ebs_products().await {
            Ok(r) => r,
            Err(e) => {
                debug!("EBS product fetch failed: {}", e);
                return;
            }
        };

        if !response.status {
            warn!(
                "Could not fetch EBS products as the status is invalid with message: {}",
                response.message
            );
            return;
        }

        *self.ebs_products.write() = Arc::new(response.products);
        *self.ebs_durations.write() = Arc::new(response.durations);
    }

    // ────────────────────────────────────────────────────────────────
    // shutdown
    // ────────────────────────────────────────────────────────────────

    /// Revert every world-visible side effect deterministically, independent
    /// of normal expiry, and release all owned resources.
    pub fn shutdown(&self) {
        let now = self.clock.now();
        for product in self.active_snapshot().iter() {
            product.lock().stop(&*self.game, now);
        }
        *self.active_products.write() = Arc::new(Vec::new());
        self.transactions.clear();
        self.game.set_overhead_text("");
    }

    // ────────────────────────────────────────────────────────────────
    // lookups and snapshots
    // ────────────────────────────────────────────────────────────────

    pub fn streamer_products(&self) -> Arc<Vec<StreamerProduct>> {
        self.streamer_products.read().clone()
    }

    pub fn ebs_products(&self) -> Arc<Vec<EbsProduct>> {
        self.ebs_products.read().clone()
    }

    pub fn ebs_durations(&self) -> Arc<Vec<EbsProductDuration>> {
        self.ebs_durations.read().clone()
    }

    pub fn active_snapshot(&self) -> Arc<Vec<SharedProduct>> {
        self.active_products.read().clone()
    }

    pub fn active_count(&self) -> usize {
        self.active_products.read().len()
    }

    pub fn queued_count(&self) -> usize {
        self.transactions.len()
    }

    fn streamer_product_by_sku(&self, sku: &str) -> Option<StreamerProduct> {
        self.streamer_products
            .read()
            .iter()
            .find(|p| p.twitch_product_sku == sku)
            .cloned()
    }

    fn ebs_product_by_id(&self, id: &str) -> Option<EbsProduct> {
        self.ebs_products
            .read()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    fn push_active(&self, product: SharedProduct) {
        let mut guard = self.active_products.write();
        let mut next: Vec<SharedProduct> = guard.iter().cloned().collect();
        next.push(product);
        *guard = Arc::new(next);
    }

    fn remove_stopped_products(&self) {
        let mut guard = self.active_products.write();
        let next: Vec<SharedProduct> = guard
            .iter()
            .filter(|p| p.lock().state() != ProductState::Stopped)
            .cloned()
            .collect();
        *guard = Arc::new(next);
    }
}
