// File: loadout-core/src/pubsub/mod.rs

pub mod client;
pub mod messages;

pub use client::PubSubClient;
pub use messages::{InboundFrame, OutboundFrame};
