// src/lib.rs

pub mod api;
pub mod config;
pub mod eventbus;
pub mod marketplace;
pub mod pubsub;
pub mod services;
pub mod tasks;

pub use loadout_common::error::Error;
