// File: loadout-common/src/traits/game_client.rs
//
// The narrow capability seam between the effect pipeline and the host game
// client. Every call is synchronous, idempotent and infallible from the
// pipeline's point of view; all of them may only be made from the tick
// context.

use crate::models::WorldPoint;

/// Handle to an object the host client spawned on our behalf.
pub type SpawnedObjectId = u64;

pub trait GameClient: Send + Sync {
    /// Whether a local player/session is ready for world effects.
    fn is_logged_in(&self) -> bool;

    fn local_player_location(&self) -> Option<WorldPoint>;

    fn spawn_object(&self, model_id: i32, location: WorldPoint) -> SpawnedObjectId;

    fn despawn_object(&self, object: SpawnedObjectId);

    fn set_animation(&self, object: SpawnedObjectId, animation_id: i32, should_loop: bool);

    fn set_location(&self, object: SpawnedObjectId, location: WorldPoint);

    fn set_active(&self, object: SpawnedObjectId, active: bool);

    fn set_overhead_text(&self, text: &str);

    fn queue_chat_message(&self, message: &str);
}
