// loadout-core/src/tasks/effect_ticker.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::info;

use crate::eventbus::EventBus;
use crate::marketplace::MarketplaceManager;

/// Drives the tick context when no host game loop does: applies queued
/// transactions, steps active products, and pumps the notification
/// scheduler on a fixed period. On shutdown, reverts all active effects
/// before exiting.
pub fn spawn_effect_ticker_task(
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
                    manager.apply_queued_transactions();
                    manager.update_active_products();
                    manager.on_game_tick();
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Effect ticker shutting down, reverting active products.");
                        manager.shutdown();
                        return;
                    }
                }
            }
        }
    })
}
