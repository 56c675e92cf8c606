// File: loadout-core/src/marketplace/mod.rs
//
// The transaction-to-effect pipeline: queued purchases are validated against
// the catalog, merged into active products, ticked until they expire, and
// announced through the rate-limited notification scheduler.

pub mod manager;
pub mod notifications;
pub mod products;
pub mod transactions;

pub use manager::MarketplaceManager;
pub use notifications::NotificationManager;
pub use products::{MarketplaceProduct, ProductState, SharedProduct};
pub use transactions::TransactionQueue;
