// loadout-core/src/tasks/catalog_sync.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::info;

use crate::eventbus::EventBus;
use crate::marketplace::MarketplaceManager;

/// Spawns the periodic catalog refresh: the streamer's SKU mappings and the
/// platform's EBS products. Both refreshes swap their collections whole and
/// fail open to the last known good catalog.
pub fn spawn_catalog_sync_task(
    manager: Arc<MarketplaceManager>,
    event_bus: Arc<EventBus>,
    period: Duration,
) -> JoinHandle<()> {
    let mut shutdown_rx = event_bus.shutdown_rx.clone();
    tokio::spawn(async move {
        let mut ticker = interval(period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    manager.update_streamer_products().await;
                    manager.update_ebs_products().await;
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Catalog sync task shutting down.");
                        return;
                    }
                }
            }
        }
    })
}
