// File: loadout-common/src/models/mod.rs
pub mod notification;
pub mod product;
pub mod transaction;
pub mod world;

pub use notification::{EbsNotification, NotificationKind, NotificationTiming};
pub use product::{EbsEffect, EbsProduct, EbsProductDuration, StreamerProduct};
pub use transaction::{TwitchProductCost, TwitchProductData, TwitchTransaction};
pub use world::WorldPoint;
