// File: loadout-common/src/traits/mod.rs
pub mod game_client;
pub mod twitch_api;

pub use game_client::{GameClient, SpawnedObjectId};
pub use twitch_api::{ProductsResponse, TransactionsResponse, TwitchApi};
