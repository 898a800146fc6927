//! # harvest-cli
//!
//! Common CLI utilities: error/panic hooks, shared options and config
//! loading.

#[macro_use]
extern crate tracing;

pub mod handler;
pub mod opts;
pub mod utils;
