//! Identifier types for resource locks
//!
//! A resource lock is keyed on-chain by a 256-bit id. Its top 96 bits are the
//! lock tag (scope, reset period, allocator), its low 160 bits the token
//! address, with the zero address denoting the native asset. The bit packing
//! itself lives in `compact_core::codec`; the types here only guarantee that
//! a value fits its declared width.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{FormatError, RangeError};
use crate::parse::{parse_lock_tag_hex, parse_resource_id};

/// Lock scope.
///
/// Encoded as the top bit of a numeric-scheme lock tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Valid across multiple chains
    #[default]
    Multichain = 0,
    /// Valid only on the current chain
    ChainSpecific = 1,
}

impl Scope {
    /// Decode from the raw scope bit.
    pub fn from_bit(bit: u8) -> Result<Self, RangeError> {
        match bit {
            0 => Ok(Scope::Multichain),
            1 => Ok(Scope::ChainSpecific),
            other => Err(RangeError::Scope(other)),
        }
    }

    /// Raw scope bit.
    pub fn as_bit(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scope::Multichain => "Multichain",
            Scope::ChainSpecific => "Chain-specific",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reset period class.
///
/// The class index (0..=7) is what gets packed; the duration table is fixed by
/// the verifying contract and is never computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPeriod {
    OneSecond = 0,
    FifteenSeconds = 1,
    OneMinute = 2,
    #[default]
    TenMinutes = 3,
    OneHourAndFiveMinutes = 4,
    OneDay = 5,
    SevenDaysAndOneHour = 6,
    ThirtyDays = 7,
}

impl ResetPeriod {
    /// All classes in index order.
    pub const ALL: [ResetPeriod; 8] = [
        ResetPeriod::OneSecond,
        ResetPeriod::FifteenSeconds,
        ResetPeriod::OneMinute,
        ResetPeriod::TenMinutes,
        ResetPeriod::OneHourAndFiveMinutes,
        ResetPeriod::OneDay,
        ResetPeriod::SevenDaysAndOneHour,
        ResetPeriod::ThirtyDays,
    ];

    /// Decode from the raw 3-bit class.
    pub fn from_class(class: u8) -> Result<Self, RangeError> {
        Self::ALL
            .get(class as usize)
            .copied()
            .ok_or(RangeError::ResetPeriod(class))
    }

    /// Raw 3-bit class.
    pub fn class(&self) -> u8 {
        *self as u8
    }

    /// Duration in seconds, per the contract's constant table.
    pub fn duration_secs(&self) -> u64 {
        match self {
            ResetPeriod::OneSecond => 1,
            ResetPeriod::FifteenSeconds => 15,
            ResetPeriod::OneMinute => 60,
            ResetPeriod::TenMinutes => 600,
            ResetPeriod::OneHourAndFiveMinutes => 3_900,
            ResetPeriod::OneDay => 86_400,
            ResetPeriod::SevenDaysAndOneHour => 604_800,
            ResetPeriod::ThirtyDays => 2_592_000,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResetPeriod::OneSecond => "1 second",
            ResetPeriod::FifteenSeconds => "15 seconds",
            ResetPeriod::OneMinute => "1 minute",
            ResetPeriod::TenMinutes => "10 minutes",
            ResetPeriod::OneHourAndFiveMinutes => "1 hour 5 min",
            ResetPeriod::OneDay => "1 day",
            ResetPeriod::SevenDaysAndOneHour => "7 days 1 hour",
            ResetPeriod::ThirtyDays => "30 days",
        }
    }
}

impl fmt::Display for ResetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numeric allocator id (at most 92 bits).
///
/// Zero is legal and denotes the default/sentinel allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u128", into = "u128")]
pub struct AllocatorId(u128);

impl AllocatorId {
    /// Width of the allocator id field in bits.
    pub const BITS: u32 = 92;

    /// Largest representable allocator id.
    pub const MAX: AllocatorId = AllocatorId((1u128 << Self::BITS) - 1);

    /// Create an allocator id, rejecting values of 2^92 or more.
    pub fn new(value: u128) -> Result<Self, RangeError> {
        if value >> Self::BITS != 0 {
            return Err(RangeError::AllocatorId {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Keep only the low 92 bits.
    pub fn truncating(value: u128) -> Self {
        Self(value & Self::MAX.0)
    }

    pub fn get(&self) -> u128 {
        self.0
    }
}

impl TryFrom<u128> for AllocatorId {
    type Error = RangeError;

    fn try_from(value: u128) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AllocatorId> for u128 {
    fn from(id: AllocatorId) -> Self {
        id.0
    }
}

impl fmt::Display for AllocatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 96-bit lock tag.
///
/// Textual form is `0x` followed by 24 lowercase hex characters (big-endian,
/// zero-padded), matching the contract's `bytes12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LockTag(u128);

impl LockTag {
    /// Width of a lock tag in bits.
    pub const BITS: u32 = 96;

    /// Width of a lock tag in bytes.
    pub const BYTES: usize = 12;

    /// The all-zero tag.
    pub const ZERO: LockTag = LockTag(0);

    /// Create from a raw integer, rejecting values of 2^96 or more.
    pub fn from_u128(value: u128) -> Result<Self, RangeError> {
        if value >> Self::BITS != 0 {
            return Err(RangeError::LockTag {
                value: format!("{value:#x}"),
            });
        }
        Ok(Self(value))
    }

    /// Create from the contract's big-endian `bytes12`.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        let mut wide = [0u8; 16];
        wide[4..].copy_from_slice(&bytes);
        Self(u128::from_be_bytes(wide))
    }

    /// Big-endian `bytes12` form.
    pub fn to_bytes(&self) -> [u8; 12] {
        let wide = self.0.to_be_bytes();
        let mut out = [0u8; 12];
        out.copy_from_slice(&wide[4..]);
        out
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }

    pub fn to_u256(&self) -> U256 {
        U256::from(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `0x` + 24 hex characters.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for LockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for LockTag {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_lock_tag_hex(&value)
    }
}

impl From<LockTag> for String {
    fn from(tag: LockTag) -> Self {
        tag.to_hex()
    }
}

/// 256-bit resource lock identifier (`lockTag << 160 | token`).
///
/// This is the ERC-6909 token id the contract keys balances by. Displayed in
/// decimal, as deposit logs and block explorers present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(U256);

impl ResourceId {
    pub fn from_u256(value: U256) -> Self {
        Self(value)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// `0x` + 64 hex characters.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0.to_be_bytes::<32>()))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_resource_id(&value)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.to_string()
    }
}

impl From<U256> for ResourceId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_bit() {
        assert_eq!(Scope::from_bit(0), Ok(Scope::Multichain));
        assert_eq!(Scope::from_bit(1), Ok(Scope::ChainSpecific));
        assert_eq!(Scope::from_bit(2), Err(RangeError::Scope(2)));
    }

    #[test]
    fn test_reset_period_table() {
        let secs: Vec<u64> = ResetPeriod::ALL.iter().map(|p| p.duration_secs()).collect();
        assert_eq!(
            secs,
            vec![1, 15, 60, 600, 3_900, 86_400, 604_800, 2_592_000]
        );
    }

    #[test]
    fn test_reset_period_class_roundtrip() {
        for class in 0..8u8 {
            assert_eq!(ResetPeriod::from_class(class).unwrap().class(), class);
        }
        assert_eq!(ResetPeriod::from_class(8), Err(RangeError::ResetPeriod(8)));
    }

    #[test]
    fn test_reset_period_default_is_ten_minutes() {
        assert_eq!(ResetPeriod::default(), ResetPeriod::TenMinutes);
    }

    #[test]
    fn test_allocator_id_bounds() {
        assert!(AllocatorId::new(0).is_ok());
        assert_eq!(AllocatorId::new((1 << 92) - 1).unwrap(), AllocatorId::MAX);
        assert!(matches!(
            AllocatorId::new(1 << 92),
            Err(RangeError::AllocatorId { .. })
        ));
    }

    #[test]
    fn test_lock_tag_bounds() {
        assert!(LockTag::from_u128((1 << 96) - 1).is_ok());
        assert!(matches!(
            LockTag::from_u128(1 << 96),
            Err(RangeError::LockTag { .. })
        ));
    }

    #[test]
    fn test_lock_tag_bytes_roundtrip() {
        let tag = LockTag::from_u128(0x5013f18f079b52276faad179).unwrap();
        assert_eq!(hex::encode(tag.to_bytes()), "5013f18f079b52276faad179");
        assert_eq!(LockTag::from_bytes(tag.to_bytes()), tag);
    }

    #[test]
    fn test_lock_tag_hex_is_zero_padded() {
        let tag = LockTag::from_u128(1).unwrap();
        assert_eq!(tag.to_hex(), "0x000000000000000000000001");
        assert_eq!(LockTag::ZERO.to_hex(), "0x000000000000000000000000");
    }

    #[test]
    fn test_lock_tag_serialization() {
        let tag = LockTag::from_u128(0xabc).unwrap();
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"0x000000000000000000000abc\"");
        let restored: LockTag = serde_json::from_str(&json).unwrap();
        assert_eq!(tag, restored);
    }

    #[test]
    fn test_resource_id_display_decimal() {
        let id = ResourceId::from_u256(U256::from(12345u64));
        assert_eq!(id.to_string(), "12345");
        assert_eq!(
            id.to_hex(),
            "0x0000000000000000000000000000000000000000000000000000000000003039"
        );
    }

    #[test]
    fn test_resource_id_serialization() {
        let id = ResourceId::from_u256(U256::from(42u64));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"42\"");
        let restored: ResourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn test_allocator_id_deserialize_rejects_wide_value() {
        let json = format!("{}", 1u128 << 92);
        assert!(serde_json::from_str::<AllocatorId>(&json).is_err());
    }
}
