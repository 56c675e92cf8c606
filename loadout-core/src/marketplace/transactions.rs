// File: loadout-core/src/marketplace/transactions.rs

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use loadout_common::models::TwitchTransaction;

/// Bounded FIFO of purchases pending validation. Appended from the network
/// context, drained from the tick context. Upstream delivery is
/// at-least-once, so every id we have ever accepted is remembered (up to a
/// bound) and redeliveries are refused.
pub struct TransactionQueue {
    queued: Mutex<VecDeque<TwitchTransaction>>,
    seen: DashMap<String, DateTime<Utc>>,
    capacity: usize,
    history_size: usize,
}

impl TransactionQueue {
    pub fn new(capacity: usize, history_size: usize) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            seen: DashMap::new(),
            capacity,
            history_size,
        }
    }

    /// Queue a transaction. Returns false when it was a duplicate.
    /// On overflow the oldest queued transaction is evicted.
    pub fn push(&self, transaction: TwitchTransaction) -> bool {
        if self.seen.contains_key(&transaction.id) {
            debug!(
                "Refusing redelivered transaction with ID: {}",
                transaction.id
            );
            return false;
        }
        self.seen
            .insert(transaction.id.clone(), transaction.received_at);
        self.prune_seen();

        let mut queued = self.queued.lock();
        if queued.len() >= self.capacity {
            if let Some(evicted) = queued.pop_front() {
                info!("Transaction queue full, evicting oldest: {}", evicted.id);
            }
        }
        info!("Queued a new Twitch transaction with ID: {}", transaction.id);
        queued.push_back(transaction);
        true
    }

    /// Remove and return the oldest queued transaction.
    pub fn pop_front(&self) -> Option<TwitchTransaction> {
        self.queued.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queued.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.lock().is_empty()
    }

    pub fn clear(&self) {
        self.queued.lock().clear();
    }

    /// Drop the oldest dedup entries once the history bound is exceeded.
    fn prune_seen(&self) {
        while self.seen.len() > self.history_size {
            let oldest = self
                .seen
                .iter()
                .min_by_key(|entry| *entry.value())
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.seen.remove(&key);
                }
                None => break,
            }
        }
    }
}
