// File: loadout-core/src/marketplace/products.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::debug;

use loadout_common::models::{EbsProduct, StreamerProduct, TwitchTransaction, WorldPoint};
use loadout_common::traits::{GameClient, SpawnedObjectId};

/// Lifecycle of an active product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductState {
    Starting,
    Active,
    Expiring,
    Stopped,
}

/// Handle to one world object this product spawned and owns.
#[derive(Debug, Clone)]
struct SpawnedHandle {
    object: SpawnedObjectId,
    location: WorldPoint,
    /// Set when the scene reloaded underneath us; honored next update.
    respawn_required: bool,
}

/// The merge of one transaction, one streamer mapping and one EBS product
/// into a running, time-bounded in-world effect. Owned exclusively by the
/// activation manager; world resources are released exactly once, on expiry
/// or shutdown, whichever comes first.
pub struct MarketplaceProduct {
    pub transaction: TwitchTransaction,
    pub streamer_product: StreamerProduct,
    pub ebs_product: EbsProduct,

    pub started_at: DateTime<Utc>,
    /// `None` means the effect runs until externally cleared.
    pub expires_at: Option<DateTime<Utc>>,

    state: ProductState,
    stopped_at: Option<DateTime<Utc>>,
    spawned: Vec<SpawnedHandle>,
    resources_released: bool,
}

/// Active products are iterated from the tick context while the set itself
/// is appended from the network context, so each product sits behind its
/// own lock inside a copy-on-write collection.
pub type SharedProduct = Arc<Mutex<MarketplaceProduct>>;

impl MarketplaceProduct {
    pub fn new(
        transaction: TwitchTransaction,
        streamer_product: StreamerProduct,
        ebs_product: EbsProduct,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = streamer_product
            .duration_s
            .map(|seconds| now + Duration::seconds(seconds));
        Self {
            transaction,
            streamer_product,
            ebs_product,
            started_at: now,
            expires_at,
            state: ProductState::Starting,
            stopped_at: None,
            spawned: Vec::new(),
            resources_released: false,
        }
    }

    pub fn into_shared(self) -> SharedProduct {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> ProductState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ProductState::Starting | ProductState::Active)
    }

    /// Whether the product has been expired for longer than `grace_ms`.
    pub fn is_expired(&self, now: DateTime<Utc>, grace_ms: i64) -> bool {
        match self.expires_at {
            Some(at) => now >= at + Duration::milliseconds(grace_ms),
            None => false,
        }
    }

    /// Whether the product stopped no longer than `grace_ms` ago. End
    /// notifications remain valid inside this window.
    pub fn stopped_within(&self, now: DateTime<Utc>, grace_ms: i64) -> bool {
        match self.stopped_at {
            Some(at) => now - at <= Duration::milliseconds(grace_ms),
            None => false,
        }
    }

    /// One behaviour step, invoked from the tick context only.
    pub fn handle_behaviour(&mut self, game: &dyn GameClient) {
        match self.state {
            ProductState::Starting => self.start(game),
            ProductState::Active => self.respawn_requested(game),
            ProductState::Expiring | ProductState::Stopped => {}
        }
    }

    /// Spawn the effect's world objects near the local player.
    fn start(&mut self, game: &dyn GameClient) {
        let Some(location) = game.local_player_location() else {
            // No player in the scene yet; try again next tick.
            return;
        };

        for model_id in &self.ebs_product.effect.model_ids {
            let object = game.spawn_object(*model_id, location);
            if let Some(animation_id) = self.ebs_product.effect.animation_id {
                game.set_animation(object, animation_id, true);
            }
            game.set_active(object, true);
            self.spawned.push(SpawnedHandle {
                object,
                location,
                respawn_required: false,
            });
        }

        debug!(
            "Started marketplace product for transaction {}",
            self.transaction.id
        );
        self.state = ProductState::Active;
    }

    /// Re-place objects whose scene was reloaded underneath them.
    fn respawn_requested(&mut self, game: &dyn GameClient) {
        for handle in &mut self.spawned {
            if !handle.respawn_required {
                continue;
            }
            game.set_location(handle.object, handle.location);
            game.set_active(handle.object, false);
            game.set_active(handle.object, true);
            handle.respawn_required = false;
        }
    }

    /// Flag every owned object for re-placement on the next update pass.
    pub fn mark_respawn_required(&mut self) {
        for handle in &mut self.spawned {
            handle.respawn_required = true;
        }
    }

    pub fn begin_expiry(&mut self) {
        if self.is_active() {
            self.state = ProductState::Expiring;
        }
    }

    /// Tear the product down and release its world resources. Safe to call
    /// more than once (concurrent expiry and shutdown); resources are
    /// released exactly once.
    pub fn stop(&mut self, game: &dyn GameClient, now: DateTime<Utc>) {
        if self.state != ProductState::Stopped {
            self.state = ProductState::Stopped;
            self.stopped_at = Some(now);
        }
        self.release_resources(game);
    }

    fn release_resources(&mut self, game: &dyn GameClient) {
        if self.resources_released {
            return;
        }
        self.resources_released = true;

        for handle in self.spawned.drain(..) {
            game.set_active(handle.object, false);
            game.despawn_object(handle.object);
        }
        debug!(
            "Released world resources for transaction {}",
            self.transaction.id
        );
    }
}
