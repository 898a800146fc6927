//! Helpers for formatting amounts and addresses for terminal output.

use alloy_primitives::{U256, utils::format_ether};
use std::fmt;

/// Formats a raw token balance in display units.
///
/// The fractional part is truncated to at most four digits and trailing
/// zeros are dropped, so `1500000000000000000` with 18 decimals renders as
/// `1.5` and a dust balance renders as `0`.
pub fn format_token_balance(balance: U256, decimals: u8) -> String {
    if decimals == 0 {
        return balance.to_string();
    }
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let integer = balance / divisor;
    let fractional = balance % divisor;
    if fractional.is_zero() {
        return integer.to_string();
    }

    let fractional = format!("{:0>width$}", fractional.to_string(), width = decimals as usize);
    let fractional = fractional[..fractional.len().min(4)].trim_end_matches('0');
    if fractional.is_empty() {
        return integer.to_string();
    }
    format!("{integer}.{fractional}")
}

/// Formats a wei amount in ether, trimming trailing fractional zeros.
pub fn format_eth(wei: U256) -> String {
    let eth = format_ether(wei);
    let eth = eth.trim_end_matches('0').trim_end_matches('.');
    if eth.is_empty() { "0".to_string() } else { eth.to_string() }
}

/// Shortens a hex string to its first four and last four hex digits,
/// like `0x88bc...5e03`.
pub fn shorten_hex(value: &impl fmt::Display) -> String {
    let s = value.to_string();
    if s.len() <= 10 {
        return s;
    }
    format!("{}...{}", &s[..6], &s[s.len() - 4..])
}
