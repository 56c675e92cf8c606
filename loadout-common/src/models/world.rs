// File: loadout-common/src/models/world.rs

use serde::{Deserialize, Serialize};

/// A tile position in the game world, as understood by the host client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: i32,
    pub y: i32,
    pub plane: i32,
}
