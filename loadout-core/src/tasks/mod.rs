// File: loadout-core/src/tasks/mod.rs
pub mod catalog_sync;
pub mod effect_ticker;
pub mod socket_heartbeat;
pub mod transaction_poll;

pub use catalog_sync::spawn_catalog_sync_task;
pub use effect_ticker::spawn_effect_ticker_task;
pub use socket_heartbeat::spawn_socket_heartbeat_task;
pub use transaction_poll::spawn_transaction_poll_task;
