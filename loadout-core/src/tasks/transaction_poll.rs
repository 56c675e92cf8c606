// loadout-core/src/tasks/transaction_poll.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::info;

use crate::eventbus::EventBus;
use crate::marketplace::MarketplaceManager;

/// Spawns the periodic transaction poll. Runs in the network context; the
/// manager merges results back through its queue, never touching the tick
/// context directly.
pub fn spawn_transaction_poll_task(
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
                    manager.fetch_new_transactions().await;
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Transaction poll task shutting down.");
                        return;
                    }
                }
            }
        }
    })
}
