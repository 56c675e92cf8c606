//! src/eventbus/mod.rs
//!
//! In-process event bus bridging the network context (socket callbacks,
//! HTTP polls) and everything that consumes raw events. Guaranteed delivery
//! to every subscriber via bounded MPSC queues.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};

/// Events that cross the network/tick boundary.
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// A non-control frame received on the pub/sub socket, forwarded as-is.
    PubSub {
        msg_type: String,
        data: serde_json::Value,
    },

    /// The socket (re)opened and the LISTEN frame went out.
    SocketReady,

    /// System-wide informational event.
    SystemMessage(String),
}

impl BusEvent {
    pub fn event_type(&self) -> &str {
        match self {
            BusEvent::PubSub { msg_type, .. } => msg_type.as_str(),
            BusEvent::SocketReady => "socket_ready",
            BusEvent::SystemMessage(_) => "system_message",
        }
    }
}

/// Default size for each subscriber's buffer.
const DEFAULT_BUFFER_SIZE: usize = 10000;

/// Each subscriber gets its own `mpsc::Sender<BusEvent>`.
///
/// - If a subscriber's buffer fills, `publish` awaits until there is space
///   (backpressure).
/// - If a subscriber dropped its `Receiver`, sending to it fails and the
///   event is simply not delivered there.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<BusEvent>>>>,
    shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Returns a receiver on which events will be delivered.
    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<BusEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    /// Publish an event to all subscribers.
    pub async fn publish(&self, event: BusEvent) {
        let senders = {
            let subs = self.subscribers.lock().await;
            subs.clone()
        };
        for s in senders {
            let _ = s.send(event.clone()).await;
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Duration, sleep, timeout};

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new();

        let mut rx1 = bus.subscribe(Some(5)).await;
        let mut rx2 = bus.subscribe(Some(5)).await;

        bus.publish(BusEvent::SocketReady).await;

        let evt1 = rx1.recv().await.expect("rx1 should get event");
        let evt2 = rx2.recv().await.expect("rx2 should get event");

        assert!(matches!(evt1, BusEvent::SocketReady));
        assert!(matches!(evt2, BusEvent::SocketReady));
    }

    #[tokio::test]
    async fn test_backpressure_blocking() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe(Some(1)).await;

        bus.publish(BusEvent::SystemMessage("msg1".into())).await;

        let handle = tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            let first = rx.recv().await.expect("expected first message");
            let second = rx.recv().await.expect("expected second message");
            (first, second)
        });

        // This publish must wait until the subscriber drains its queue.
        let second_publish = bus.publish(BusEvent::SystemMessage("msg2".into()));
        let result = timeout(Duration::from_millis(500), second_publish).await;
        assert!(result.is_ok(), "publish should eventually unblock");

        let (evt1, evt2) = handle.await.unwrap();
        match evt1 {
            BusEvent::SystemMessage(txt) => assert_eq!(txt, "msg1"),
            other => panic!("first message mismatch: {other:?}"),
        }
        match evt2 {
            BusEvent::SystemMessage(txt) => assert_eq!(txt, "msg2"),
            other => panic!("second message mismatch: {other:?}"),
        }
    }
}
