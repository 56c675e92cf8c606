// loadout-core/src/tasks/socket_heartbeat.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::info;

use crate::eventbus::EventBus;
use crate::pubsub::PubSubClient;

/// Polls the pub/sub client's heartbeat. The client itself decides whether
/// a PING is due or an outstanding one timed out; this task only supplies
/// the period.
pub fn spawn_socket_heartbeat_task(
    client: PubSubClient,
    event_bus: Arc<EventBus>,
    period: Duration,
) -> JoinHandle<()> {
    let mut shutdown_rx = event_bus.shutdown_rx.clone();
    tokio::spawn(async move {
        let mut ticker = interval(period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    client.ping_check().await;
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Socket heartbeat task shutting down.");
                        client.disconnect().await;
                        return;
                    }
                }
            }
        }
    })
}
