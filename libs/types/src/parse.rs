//! Boundary parsing for hex and decimal strings
//!
//! Everything that enters the client as text (pasted ids, log topics,
//! signatures, config files) goes through here. Length is checked exactly;
//! a 39-character address is an error, never left-padded.

use alloy_primitives::{Address, Bytes, B256, U256};

use crate::errors::FormatError;
use crate::ids::{LockTag, ResourceId};

/// Strip an optional `0x`/`0X` prefix.
fn strip_prefix(input: &str) -> &str {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}

/// Decode exactly `N` bytes from a hex string with optional `0x` prefix.
fn parse_fixed_hex<const N: usize>(
    input: &str,
    field: &'static str,
) -> Result<[u8; N], FormatError> {
    let digits = strip_prefix(input.trim());
    if digits.len() != N * 2 {
        return Err(FormatError::InvalidLength {
            field,
            expected: N * 2,
            actual: digits.len(),
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|_| FormatError::InvalidHex {
        field,
        value: input.to_string(),
    })?;
    Ok(out)
}

/// Parse a 20-byte address (40 hex chars). Checksum casing is not enforced.
pub fn parse_address(input: &str) -> Result<Address, FormatError> {
    parse_fixed_hex::<20>(input, "address").map(Address::from)
}

/// Parse a 32-byte hash (64 hex chars).
pub fn parse_b256(input: &str) -> Result<B256, FormatError> {
    parse_fixed_hex::<32>(input, "hash").map(B256::from)
}

/// Parse a `bytes12` lock tag (exactly 24 hex chars).
pub fn parse_lock_tag_hex(input: &str) -> Result<LockTag, FormatError> {
    parse_fixed_hex::<12>(input, "lock tag").map(LockTag::from_bytes)
}

/// Parse arbitrary even-length hex (signatures, allocator data).
///
/// An empty string or bare `0x` yields empty bytes.
pub fn parse_hex_bytes(input: &str) -> Result<Bytes, FormatError> {
    let digits = strip_prefix(input.trim());
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|_| FormatError::InvalidHex {
            field: "bytes",
            value: input.to_string(),
        })
}

/// Parse a 256-bit unsigned integer from decimal digits or `0x` hex.
pub fn parse_u256(input: &str, field: &'static str) -> Result<U256, FormatError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FormatError::Empty { field });
    }

    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        let digits = strip_prefix(trimmed);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FormatError::InvalidHex {
                field,
                value: input.to_string(),
            });
        }
        let significant = digits.trim_start_matches('0');
        if significant.len() > 64 {
            return Err(FormatError::Overflow { field });
        }
        return U256::from_str_radix(digits, 16).map_err(|_| FormatError::Overflow { field });
    }

    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(FormatError::InvalidDecimal {
            field,
            value: input.to_string(),
        });
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| FormatError::Overflow { field })
}

/// Parse a resource/lock id as pasted by a user or read from a log.
pub fn parse_resource_id(input: &str) -> Result<ResourceId, FormatError> {
    parse_u256(input, "resource id").map(ResourceId::from_u256)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_with_and_without_prefix() {
        let a = parse_address("0x5c64fC2846B35F950B653a3135E646B942A9dE55").unwrap();
        let b = parse_address("5c64fc2846b35f950b653a3135e646b942a9de55").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_address_rejects_short() {
        let err = parse_address("0x5c64fC2846B35F950B653a3135E646B942A9dE5").unwrap_err();
        assert_eq!(
            err,
            FormatError::InvalidLength {
                field: "address",
                expected: 40,
                actual: 39
            }
        );
    }

    #[test]
    fn test_parse_address_rejects_non_hex() {
        let err = parse_address("0xZZ64fC2846B35F950B653a3135E646B942A9dE55").unwrap_err();
        assert!(matches!(err, FormatError::InvalidHex { field: "address", .. }));
    }

    #[test]
    fn test_parse_b256_requires_64_chars() {
        assert!(parse_b256(&format!("0x{}", "00".repeat(32))).is_ok());
        assert!(matches!(
            parse_b256("0x1234"),
            Err(FormatError::InvalidLength { expected: 64, .. })
        ));
    }

    #[test]
    fn test_parse_lock_tag_hex() {
        let tag = parse_lock_tag_hex("0x000000000000000000000001").unwrap();
        assert_eq!(tag.as_u128(), 1);
        assert!(matches!(
            parse_lock_tag_hex("0x01"),
            Err(FormatError::InvalidLength { expected: 24, actual: 2, .. })
        ));
    }

    #[test]
    fn test_parse_hex_bytes_empty() {
        assert!(parse_hex_bytes("0x").unwrap().is_empty());
        assert!(parse_hex_bytes("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_hex_bytes_odd_length_fails() {
        assert!(parse_hex_bytes("0xabc").is_err());
    }

    #[test]
    fn test_parse_resource_id_decimal_and_hex_agree() {
        let dec = parse_resource_id(
            "36220265157835131660283045058301948894219439718141577796090720841600285540352",
        )
        .unwrap();
        let hex = parse_resource_id(
            "0x5013f18f079b52276faad1790000000000000000000000000000000000000000",
        )
        .unwrap();
        assert_eq!(dec, hex);
    }

    #[test]
    fn test_parse_resource_id_rejects_garbage() {
        assert!(matches!(
            parse_resource_id("12a4"),
            Err(FormatError::InvalidDecimal { .. })
        ));
        assert!(matches!(
            parse_resource_id("   "),
            Err(FormatError::Empty { .. })
        ));
        assert!(matches!(
            parse_resource_id("0x"),
            Err(FormatError::InvalidHex { .. })
        ));
    }

    #[test]
    fn test_parse_resource_id_overflow() {
        let too_wide = format!("0x1{}", "0".repeat(64));
        assert_eq!(
            parse_resource_id(&too_wide),
            Err(FormatError::Overflow { field: "resource id" })
        );
        // 2^256
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert_eq!(
            parse_resource_id(too_big),
            Err(FormatError::Overflow { field: "resource id" })
        );
    }
}
