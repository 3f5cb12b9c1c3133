//! Token unit conversion
//!
//! Amounts on the wire are integers in the token's smallest unit. These
//! helpers convert to and from the human decimal form without going through
//! floating point, so `"0.1"` with 18 decimals is exactly 10^17.

use alloy_primitives::U256;

use crate::errors::FormatError;

/// Decimals of the native asset.
pub const NATIVE_DECIMALS: u8 = 18;

/// 10^exp, or `None` past 10^77.
fn pow10(exp: u8) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

/// Parse a human decimal string (e.g. `"1.5"`) into base units.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, FormatError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(FormatError::Empty { field: "amount" });
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(FormatError::InvalidDecimal {
            field: "amount",
            value: amount.to_string(),
        });
    }
    if fraction.len() > decimals as usize {
        return Err(FormatError::TooManyDecimals {
            provided: fraction.len(),
            allowed: decimals,
        });
    }

    let overflow = || FormatError::Overflow { field: "amount" };
    let whole_value = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).map_err(|_| overflow())?
    };
    let fraction_value = if fraction.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{fraction:0<width$}", width = decimals as usize);
        U256::from_str_radix(&padded, 10).map_err(|_| overflow())?
    };

    whole_value
        .checked_mul(pow10(decimals).ok_or_else(overflow)?)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(overflow)
}

/// Format base units as a human decimal string.
///
/// The fraction is truncated to `display_decimals` and trailing zeros are
/// trimmed; a whole number is printed without a decimal point.
pub fn format_units(amount: U256, decimals: u8, display_decimals: u8) -> String {
    let (whole, remainder) = match pow10(decimals) {
        Some(divisor) => (amount / divisor, amount % divisor),
        None => (U256::ZERO, amount),
    };

    let mut fraction = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    fraction.truncate(display_decimals.min(decimals) as usize);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}
