// File: loadout-core/src/services/mod.rs
pub mod marketplace_events;

pub use marketplace_events::MarketplaceEventService;
