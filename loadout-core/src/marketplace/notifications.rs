// File: loadout-core/src/marketplace/notifications.rs

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::{debug, trace};

use loadout_common::models::{EbsNotification, NotificationKind, NotificationTiming};
use loadout_common::time::SharedClock;
use loadout_common::traits::GameClient;

use crate::config::MarketplaceConfig;

use super::products::SharedProduct;

/// One announcement bound to the product that requested it.
pub struct Notification {
    pub product: SharedProduct,
    pub definition: EbsNotification,
}

/// Notifications queued together fire together.
type NotificationGroup = Vec<Notification>;

/// Rate-limited announcement scheduler. Groups are queued from wherever a
/// product lifecycle event happens and drained on the game tick, one group
/// per unlock window, so effect chatter never floods the player.
pub struct NotificationManager {
    game: Arc<dyn GameClient>,
    clock: SharedClock,
    config: MarketplaceConfig,

    /// Single shared rate limiter; a lock extension only ever moves the
    /// unlock time later.
    locked_until: Mutex<Option<DateTime<Utc>>>,

    /// Bounded queue of groups, evicted oldest-first on overflow.
    group_queue: Mutex<VecDeque<NotificationGroup>>,

    /// Deadline for clearing transient overhead text, polled per tick.
    overhead_clear_at: Mutex<Option<DateTime<Utc>>>,
}

impl NotificationManager {
    pub fn new(game: Arc<dyn GameClient>, clock: SharedClock, config: MarketplaceConfig) -> Self {
        Self {
            game,
            clock,
            config,
            locked_until: Mutex::new(None),
            group_queue: Mutex::new(VecDeque::new()),
            overhead_clear_at: Mutex::new(None),
        }
    }

    /// Queue a batch of notifications that must fire atomically.
    /// A `now`-timed notification bypasses the queue entirely.
    pub fn queue_notifications(&self, product: &SharedProduct, definitions: &[EbsNotification]) {
        let mut group: NotificationGroup = Vec::new();

        for definition in definitions {
            let notification = Notification {
                product: product.clone(),
                definition: definition.clone(),
            };

            if definition.timing_type == NotificationTiming::Now {
                self.send_notification(&notification);
                return;
            }

            group.push(notification);
        }

        if group.is_empty() {
            return;
        }

        let mut queue = self.group_queue.lock();
        if queue.len() >= self.config.notification_queue_size {
            queue.pop_front();
            debug!("Notification queue full, evicting oldest group");
        }
        queue.push_back(group);
    }

    /// Tick entry point: clear stale overhead text and fire the oldest
    /// queued group if the rate limiter allows.
    pub fn on_game_tick(&self) {
        self.clear_expired_overhead();

        if !self.can_send_notification() {
            return;
        }

        let group = match self.group_queue.lock().pop_front() {
            Some(g) => g,
            None => return,
        };

        for notification in &group {
            self.send_notification(notification);
        }
    }

    pub fn queued_group_count(&self) -> usize {
        self.group_queue.lock().len()
    }

    fn send_notification(&self, notification: &Notification) {
        let now = self.clock.now();

        // Suppress announcements for products already torn down; an
        // end-timed notification stays valid for a short grace window.
        let suppressed = {
            let product = notification.product.lock();
            if notification.definition.timing_type == NotificationTiming::End {
                product.is_expired(now, self.config.end_notification_grace_ms)
                    || !(product.is_active()
                        || product.stopped_within(now, self.config.end_notification_grace_ms))
            } else {
                product.is_expired(now, self.config.expiry_suppression_grace_ms)
                    || !product.is_active()
            }
        };
        if suppressed {
            trace!("Suppressing notification for torn-down product");
            return;
        }

        let message = match &notification.definition.message {
            Some(m) => m.clone(),
            None => self.default_message(notification),
        };

        match notification.definition.message_type {
            NotificationKind::Chat => {
                self.game.queue_chat_message(&message);
                self.lock_notifications_for(self.config.chat_notification_lock_ms);
            }
            NotificationKind::Overhead => {
                self.game.set_overhead_text(&message);
                *self.overhead_clear_at.lock() = Some(
                    now + Duration::milliseconds(self.config.overhead_notification_duration_ms),
                );
                self.lock_notifications_for(self.config.overhead_notification_lock_ms);
            }
            NotificationKind::None => {}
        }
    }

    /// Thank-you line composed from the transaction when the effect
    /// definition carries no message of its own.
    fn default_message(&self, notification: &Notification) -> String {
        let product = notification.product.lock();
        let transaction = &product.transaction;

        match transaction.cost() {
            Some(cost) => format!(
                "Thank you {} for donating {} {}!",
                transaction.user_name, cost.amount, cost.cost_type
            ),
            None => format!("Thank you {} for your donation!", transaction.user_name),
        }
    }

    fn can_send_notification(&self) -> bool {
        match *self.locked_until.lock() {
            Some(until) => self.clock.now() >= until,
            None => true,
        }
    }

    fn lock_notifications_for(&self, duration_ms: i64) {
        let new_until = self.clock.now() + Duration::milliseconds(duration_ms);
        let mut locked = self.locked_until.lock();

        // a lock extension never moves the unlock time earlier
        if let Some(current) = *locked {
            if new_until < current {
                return;
            }
        }
        *locked = Some(new_until);
    }

    fn clear_expired_overhead(&self) {
        let mut clear_at = self.overhead_clear_at.lock();
        if let Some(at) = *clear_at {
            if self.clock.now() >= at {
                self.game.set_overhead_text("");
                *clear_at = None;
            }
        }
    }
}
