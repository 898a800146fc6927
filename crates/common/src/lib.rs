//! # harvest-common
//!
//! Utilities shared by the Harvest crates: provider construction, amount
//! formatting and terminal output.

use std::time::Duration;

pub mod errors;
pub mod fmt;
pub mod provider;
pub mod term;

pub use provider::{ProviderBuilder, RetryProvider, get_http_provider, try_get_http_provider};

/// The default HTTP request timeout for RPC and indexer requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Alchemy free tier rate limit, in compute units per second.
///
/// See <https://docs.alchemy.com/reference/compute-unit-costs>.
pub const ALCHEMY_FREE_TIER_CUPS: u64 = 330;
