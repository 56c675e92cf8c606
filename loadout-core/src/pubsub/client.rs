// pubsub/client.rs
//
// Resilient pub/sub socket client. Owns one long-lived subscribe connection:
// connect/reconnect, heartbeat, and raw-frame dispatch onto the event bus.
// Knows nothing about product semantics.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{Duration, sleep};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};

use loadout_common::time::SharedClock;

use crate::config::PubSubConfig;
use crate::eventbus::{BusEvent, EventBus};

use super::messages::{InboundFrame, OutboundFrame};

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

struct Heartbeat {
    last_pong: DateTime<Utc>,
    ping_sent_at: Option<DateTime<Utc>>,
}

struct ClientInner {
    socket_open: AtomicBool,
    should_reconnect: AtomicBool,
    /// Collapses concurrent reconnect requests into one attempt.
    connecting: AtomicBool,
    /// Bumped on every open and every close, under the writer lock, so a
    /// superseded read loop can never tear down its replacement or trigger
    /// a second reconnect.
    generation: AtomicU64,
    heartbeat: parking_lot::Mutex<Heartbeat>,
    writer: tokio::sync::Mutex<Option<WsWriter>>,
}

/// Pub/sub socket client. Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct PubSubClient {
    config: Arc<PubSubConfig>,
    event_bus: Arc<EventBus>,
    clock: SharedClock,
    inner: Arc<ClientInner>,
}

impl PubSubClient {
    pub fn new(config: PubSubConfig, event_bus: Arc<EventBus>, clock: SharedClock) -> Self {
        let now = clock.now();
        Self {
            config: Arc::new(config),
            event_bus,
            clock,
            inner: Arc::new(ClientInner {
                socket_open: AtomicBool::new(false),
                should_reconnect: AtomicBool::new(false),
                connecting: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                heartbeat: parking_lot::Mutex::new(Heartbeat {
                    last_pong: now,
                    ping_sent_at: None,
                }),
                writer: tokio::sync::Mutex::new(None),
            }),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.socket_open.load(Ordering::SeqCst)
    }

    pub fn awaiting_pong(&self) -> bool {
        self.inner.heartbeat.lock().ping_sent_at.is_some()
    }

    /// Open the connection and enable auto-reconnect. Idempotent.
    pub fn connect(&self) {
        self.inner.should_reconnect.store(true, Ordering::SeqCst);
        if self.is_connected() {
            return;
        }
        self.spawn_connect();
    }

    /// Close the connection and suppress auto-reconnect. Used on shutdown
    /// and when upstream revokes our credentials.
    pub async fn disconnect(&self) {
        self.inner.should_reconnect.store(false, Ordering::SeqCst);
        self.close_socket().await;
    }

    /// Drop the current connection (if any) and open a fresh one, keeping
    /// consumer state untouched. Concurrent calls collapse to one attempt.
    pub async fn reconnect(&self) {
        debug!("[PubSub] reconnect requested");
        self.close_socket().await;
        if self.inner.should_reconnect.load(Ordering::SeqCst) {
            self.spawn_connect();
        }
    }

    /// Heartbeat poll. Call on a fixed period; sends `PING` every
    /// `ping_interval_ms` and declares the connection dead when no `PONG`
    /// arrives within `ping_timeout_ms`.
    pub async fn ping_check(&self) {
        if !self.is_connected() {
            return;
        }

        let now = self.clock.now();
        let (send_ping, timed_out) = {
            let hb = self.inner.heartbeat.lock();
            match hb.ping_sent_at {
                Some(sent_at) => {
                    let timeout = ChronoDuration::milliseconds(self.config.ping_timeout_ms);
                    (false, now - sent_at >= timeout)
                }
                None => {
                    let interval = ChronoDuration::milliseconds(self.config.ping_interval_ms);
                    (now - hb.last_pong >= interval, false)
                }
            }
        };

        if timed_out {
            warn!("[PubSub] ping timeout, dropping connection");
            self.close_socket().await;
            if self.inner.should_reconnect.load(Ordering::SeqCst) {
                self.spawn_connect();
            }
            return;
        }

        if send_ping {
            self.inner.heartbeat.lock().ping_sent_at = Some(now);
            self.send(OutboundFrame::Ping).await;
        }
    }

    /// Send a frame. Silently no-ops when the socket is not open; a send
    /// failure is translated into a reconnect attempt, never surfaced.
    pub async fn send(&self, frame: OutboundFrame) {
        if !self.is_connected() {
            trace!("[PubSub] socket not open, dropping outbound frame");
            return;
        }

        let json = frame.to_json(&self.config.auth_token);
        let text = json.to_string();
        debug!("[PubSub] sending frame: {}", text);

        let failed = {
            let mut writer = self.inner.writer.lock().await;
            match writer.as_mut() {
                Some(w) => w.send(Message::Text(text.into())).await.is_err(),
                None => false,
            }
        };

        if failed {
            warn!("[PubSub] send failure, dropping connection");
            self.close_socket().await;
            if self.inner.should_reconnect.load(Ordering::SeqCst) {
                self.spawn_connect();
            }
        }
    }

    // ────────────────────────────────────────────────────────────────
    // internals
    // ────────────────────────────────────────────────────────────────

    fn spawn_connect(&self) {
        if self.inner.connecting.swap(true, Ordering::SeqCst) {
            debug!("[PubSub] connect already in progress");
            return;
        }
        let client = self.clone();
        tokio::spawn(async move {
            client.connect_task().await;
        });
    }

    /// Retries until a connection opens or auto-reconnect is disabled.
    /// Exactly one of these runs at a time (guarded by `connecting`).
    async fn connect_task(self) {
        loop {
            if !self.inner.should_reconnect.load(Ordering::SeqCst) {
                self.inner.connecting.store(false, Ordering::SeqCst);
                return;
            }

            let ws = match connect_async(self.config.url.as_str()).await {
                Ok((ws, _)) => ws,
                Err(e) => {
                    error!("[PubSub] connect error: {}", e);
                    sleep(Duration::from_millis(self.config.reconnect_delay_ms)).await;
                    continue;
                }
            };

            info!("[PubSub] connected → {}", self.config.url);
            let (write, read) = ws.split();
            // the new writer and its generation stamp become visible
            // atomically; a stale read loop checks against the same lock
            let generation = {
                let mut writer = self.inner.writer.lock().await;
                *writer = Some(write);
                self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
            };
            {
                let mut hb = self.inner.heartbeat.lock();
                hb.last_pong = self.clock.now();
                hb.ping_sent_at = None;
            }
            self.inner.socket_open.store(true, Ordering::SeqCst);
            self.inner.connecting.store(false, Ordering::SeqCst);

            if !self.config.topic.is_empty() {
                self.send(OutboundFrame::Listen {
                    topics: vec![self.config.topic.clone()],
                })
                .await;
            }
            self.event_bus.publish(BusEvent::SocketReady).await;

            let client = self.clone();
            tokio::spawn(async move {
                client.read_loop(read, generation).await;
            });
            return;
        }
    }

    async fn read_loop(self, mut read: WsReader, generation: u64) {
        while let Some(msg_res) = read.next().await {
            let msg = match msg_res {
                Ok(m) => m,
                Err(e) => {
                    warn!("[PubSub] ws error: {}", e);
                    break;
                }
            };

            // websocket-level control frames
            if msg.is_close() {
                debug!("[PubSub] close frame received");
                break;
            }
            if msg.is_ping() || msg.is_pong() {
                continue;
            }

            let Message::Text(txt) = msg else { continue };
            self.handle_frame(txt.as_str()).await;
        }

        // A superseded loop (its socket was closed or replaced) must not
        // tear down the live connection or race a second reconnect. The
        // check happens under the writer lock so it cannot interleave with
        // a connect or close in progress.
        {
            let mut writer = self.inner.writer.lock().await;
            if self.inner.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            self.inner.socket_open.store(false, Ordering::SeqCst);
            writer.take();
        }
        if self.inner.should_reconnect.load(Ordering::SeqCst) {
            info!("[PubSub] connection lost, reconnecting");
            self.spawn_connect();
        } else {
            info!("[PubSub] connection closed");
        }
    }

    /// Dispatch one inbound text frame. Malformed frames are dropped and the
    /// socket stays open; control frames are consumed here and never
    /// surfaced to consumers.
    async fn handle_frame(&self, text: &str) {
        let frame = match InboundFrame::parse(text) {
            Ok(f) => f,
            Err(e) => {
                warn!("[PubSub] dropping malformed frame: {}", e);
                return;
            }
        };

        trace!("[PubSub] received frame type={}", frame.msg_type);

        match frame.msg_type.as_str() {
            "PONG" => {
                let mut hb = self.inner.heartbeat.lock();
                hb.last_pong = self.clock.now();
                hb.ping_sent_at = None;
            }
            "PING" => {
                self.send(OutboundFrame::Pong).await;
            }
            "RECONNECT" => {
                info!("[PubSub] reconnect requested by upstream");
                self.reconnect().await;
            }
            "AUTH_REVOKED" => {
                warn!("[PubSub] auth revoked, closing until credentials refresh");
                self.disconnect().await;
            }
            "RESPONSE" => match frame.error.as_deref() {
                Some("ERR_BADAUTH") => {
                    warn!("[PubSub] bad auth response, closing until credentials refresh");
                    self.disconnect().await;
                }
                Some(err) if !err.is_empty() => {
                    warn!("[PubSub] error response: {}", err);
                }
                _ => {}
            },
            _ => {
                self.event_bus
                    .publish(BusEvent::PubSub {
                        msg_type: frame.msg_type,
                        data: frame.data.unwrap_or(serde_json::Value::Null),
                    })
                    .await;
            }
        }
    }

    async fn close_socket(&self) {
        self.inner.socket_open.store(false, Ordering::SeqCst);
        let mut writer = self.inner.writer.lock().await;
        // invalidate the read loop of the connection being closed, even if
        // it only notices after a replacement connection is already live
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(mut w) = writer.take() {
            let _ = w.send(Message::Close(None)).await;
        }
    }
}
