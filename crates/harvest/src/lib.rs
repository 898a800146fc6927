//! # harvest
//!
//! Core library for the Harvest CLI: contract bindings, the Alchemy indexer
//! client, transaction submission and the approve→sell engine.

#[macro_use]
extern crate tracing;

pub mod contracts;
pub mod indexer;
pub mod sale;
pub mod tx;

pub use contracts::SALE_PRICE_WEI;
pub use harvest_config::HARVEST_ADDRESS;
