//! Exact base-unit amounts and their conversion to display units.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

/// 1 gwei = 10^9 wei.
pub const GWEI_DECIMALS: u32 = 9;
/// 1 ether = 10^18 wei.
pub const ETHER_DECIMALS: u32 = 18;

/// Parses a non-negative decimal integer. Anything that is not one or more
/// ASCII digits (after trimming whitespace) decodes to zero.
pub fn parse_base_units(raw: &str) -> BigUint {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return BigUint::zero();
    }
    BigUint::parse_bytes(digits.as_bytes(), 10).unwrap_or_default()
}

/// `base_units / 10^decimals` in floating point. Only for final display values.
pub fn to_display_units(base_units: &BigUint, decimals: u32) -> f64 {
    let value = base_units.to_f64().unwrap_or(f64::INFINITY);
    value / 10f64.powi(decimals as i32)
}
