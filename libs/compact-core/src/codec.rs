//! Identifier codec: lock tag and resource id packing
//!
//! Pure bit arithmetic shared with the verifying contract. Identical inputs
//! always produce identical bit patterns, which is what lets client and
//! verifier agree on an identifier without coordination.
//!
//! Numeric lock tag layout (96 bits, most significant first):
//!
//! ```text
//! | scope (1) | reset period class (3) | allocator id (92) |
//! ```
//!
//! Resource id layout (256 bits): `lockTag << 160 | tokenAddress`, where the
//! zero token address denotes the native asset.
//!
//! A second, address-derived lock tag scheme exists for deployments that
//! address allocators by contract address (see [`address_scheme`]). The two
//! are not interchangeable; [`IdentifierCodec`] is bound to one of them.

use alloy_primitives::{Address, U256};
use compact_types::errors::RangeError;
use compact_types::ids::{AllocatorId, LockTag, ResetPeriod, ResourceId, Scope};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::CompactError;

/// Width of the token address field in a resource id.
pub const TOKEN_BITS: usize = 160;

const SCOPE_SHIFT: u32 = 95;
const RESET_PERIOD_SHIFT: u32 = 92;
const RESET_PERIOD_MASK: u128 = 0b111;

fn address_mask() -> U256 {
    (U256::from(1u8) << TOKEN_BITS) - U256::from(1u8)
}

/// Pack `(tag << 160) | address` into one word.
///
/// Shared by resource ids and claimant encoding.
pub fn pack_word(lock_tag: LockTag, address: Address) -> U256 {
    (lock_tag.to_u256() << TOKEN_BITS) | U256::from_be_slice(address.as_slice())
}

/// Split a word into its top 96 bits and low 160 bits.
pub fn split_word(word: U256) -> (LockTag, Address) {
    let bytes = word.to_be_bytes::<32>();
    let mut tag = [0u8; 12];
    tag.copy_from_slice(&bytes[..12]);
    (LockTag::from_bytes(tag), Address::from_slice(&bytes[12..]))
}

// ---------------------------------------------------------------------------
// Numeric allocator id scheme
// ---------------------------------------------------------------------------

/// Decoded fields of a numeric-scheme lock tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockTagParts {
    pub scope: Scope,
    pub reset_period: ResetPeriod,
    pub allocator_id: AllocatorId,
}

/// Pack a lock tag from raw inputs.
///
/// Fails if `scope` is not 0/1, `reset_period_class` is not in 0..=7, or
/// `allocator_id` needs more than 92 bits. Nothing is clamped.
pub fn pack_lock_tag(
    scope: u8,
    reset_period_class: u8,
    allocator_id: u128,
) -> Result<LockTag, RangeError> {
    let scope = Scope::from_bit(scope)?;
    let reset_period = ResetPeriod::from_class(reset_period_class)?;
    let allocator_id = AllocatorId::new(allocator_id)?;
    Ok(lock_tag(scope, reset_period, allocator_id))
}

/// Pack a lock tag from already-validated parts.
pub fn lock_tag(scope: Scope, reset_period: ResetPeriod, allocator_id: AllocatorId) -> LockTag {
    let raw = (u128::from(scope.as_bit()) << SCOPE_SHIFT)
        | (u128::from(reset_period.class()) << RESET_PERIOD_SHIFT)
        | allocator_id.get();
    LockTag::from_bytes(raw_to_bytes(raw))
}

fn raw_to_bytes(raw: u128) -> [u8; 12] {
    let wide = raw.to_be_bytes();
    let mut out = [0u8; 12];
    out.copy_from_slice(&wide[4..]);
    out
}

/// Decode a numeric-scheme lock tag. Every 96-bit value decodes.
pub fn decode_lock_tag(tag: LockTag) -> LockTagParts {
    let raw = tag.as_u128();
    let scope = if (raw >> SCOPE_SHIFT) & 1 == 1 {
        Scope::ChainSpecific
    } else {
        Scope::Multichain
    };
    let class = ((raw >> RESET_PERIOD_SHIFT) & RESET_PERIOD_MASK) as usize;

    LockTagParts {
        scope,
        reset_period: ResetPeriod::ALL[class],
        allocator_id: AllocatorId::truncating(raw),
    }
}

/// Combine a lock tag with a token address.
pub fn pack_resource_id(lock_tag: LockTag, token: Address) -> ResourceId {
    ResourceId::from_u256(pack_word(lock_tag, token))
}

/// The lock tag in the top 96 bits of a resource id.
pub fn lock_tag_of(id: ResourceId) -> LockTag {
    split_word(id.as_u256()).0
}

/// The token address in the low 160 bits of a resource id.
pub fn token_of(id: ResourceId) -> Address {
    Address::from_slice(&(id.as_u256() & address_mask()).to_be_bytes::<32>()[12..])
}

/// Decode the numeric lock tag fields of a resource id.
pub fn unpack_lock_tag(id: ResourceId) -> LockTagParts {
    decode_lock_tag(lock_tag_of(id))
}

// ---------------------------------------------------------------------------
// Address-derived allocator scheme
// ---------------------------------------------------------------------------

/// Address-derived lock tag scheme.
///
/// ```text
/// | header (8) = scope << 4 | reset class | allocator address low 11 bytes |
/// ```
///
/// Keeps 11 address bytes so the tag fills a full `bytes12`. Web clients
/// that slice the last 20 hex characters keep only 10 bytes and emit an
/// 11-byte value, which the verifier cannot accept as a lock tag; tags from
/// such clients do not round-trip through [`unpack`].
pub mod address_scheme {
    use super::*;

    /// Bytes of the allocator address kept in the tag.
    pub const SUFFIX_LEN: usize = 11;

    /// Decoded fields of an address-scheme lock tag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AddressLockTagParts {
        pub scope: Scope,
        pub reset_period: ResetPeriod,
        pub allocator_suffix: [u8; SUFFIX_LEN],
    }

    impl AddressLockTagParts {
        /// Whether `allocator` is the address this tag was derived from.
        pub fn matches_allocator(&self, allocator: &Address) -> bool {
            allocator.as_slice()[20 - SUFFIX_LEN..] == self.allocator_suffix
        }
    }

    pub fn pack(scope: Scope, reset_period: ResetPeriod, allocator: &Address) -> LockTag {
        let mut bytes = [0u8; 12];
        bytes[0] = (scope.as_bit() << 4) | reset_period.class();
        bytes[1..].copy_from_slice(&allocator.as_slice()[20 - SUFFIX_LEN..]);
        LockTag::from_bytes(bytes)
    }

    /// Decode a tag; fails if the header byte holds an out-of-range field.
    pub fn unpack(tag: LockTag) -> Result<AddressLockTagParts, RangeError> {
        let bytes = tag.to_bytes();
        let scope = Scope::from_bit(bytes[0] >> 4)?;
        let reset_period = ResetPeriod::from_class(bytes[0] & 0x0f)?;
        let mut allocator_suffix = [0u8; SUFFIX_LEN];
        allocator_suffix.copy_from_slice(&bytes[1..]);
        Ok(AddressLockTagParts {
            scope,
            reset_period,
            allocator_suffix,
        })
    }
}

// ---------------------------------------------------------------------------
// Scheme-bound codec
// ---------------------------------------------------------------------------

/// Which allocator-addressing scheme lock tags follow.
///
/// Must match the deployed verifier version; chosen by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockTagScheme {
    /// 92-bit numeric allocator id
    #[default]
    AllocatorId,
    /// Header byte plus allocator address suffix
    AllocatorAddress,
}

impl LockTagScheme {
    pub fn name(&self) -> &'static str {
        match self {
            LockTagScheme::AllocatorId => "allocator_id",
            LockTagScheme::AllocatorAddress => "allocator_address",
        }
    }
}

/// Allocator reference supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocatorRef {
    Id(AllocatorId),
    Address(Address),
}

impl AllocatorRef {
    fn scheme(&self) -> LockTagScheme {
        match self {
            AllocatorRef::Id(_) => LockTagScheme::AllocatorId,
            AllocatorRef::Address(_) => LockTagScheme::AllocatorAddress,
        }
    }
}

/// Allocator identity recovered from a lock tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocatorIdentity {
    Id(AllocatorId),
    AddressSuffix([u8; address_scheme::SUFFIX_LEN]),
}

/// Everything recoverable from a resource id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockDetails {
    pub token: Address,
    pub scope: Scope,
    pub reset_period: ResetPeriod,
    pub allocator: AllocatorIdentity,
    pub lock_tag: LockTag,
}

impl LockDetails {
    /// Zero token address: the lock holds the native asset.
    pub fn is_native(&self) -> bool {
        self.token == Address::ZERO
    }
}

/// Lock tag codec bound to a single scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierCodec {
    scheme: LockTagScheme,
}

impl IdentifierCodec {
    pub fn new(scheme: LockTagScheme) -> Self {
        info!(scheme = scheme.name(), "IdentifierCodec initialized");
        Self { scheme }
    }

    pub fn scheme(&self) -> LockTagScheme {
        self.scheme
    }

    /// Pack a lock tag; the allocator must be given in the configured form.
    pub fn lock_tag(
        &self,
        scope: Scope,
        reset_period: ResetPeriod,
        allocator: &AllocatorRef,
    ) -> Result<LockTag, CompactError> {
        match (self.scheme, allocator) {
            (LockTagScheme::AllocatorId, AllocatorRef::Id(id)) => {
                Ok(lock_tag(scope, reset_period, *id))
            }
            (LockTagScheme::AllocatorAddress, AllocatorRef::Address(address)) => {
                Ok(address_scheme::pack(scope, reset_period, address))
            }
            _ => Err(CompactError::SchemeMismatch {
                configured: self.scheme.name(),
                provided: allocator.scheme().name(),
            }),
        }
    }

    /// Pack a full resource id.
    pub fn resource_id(
        &self,
        scope: Scope,
        reset_period: ResetPeriod,
        allocator: &AllocatorRef,
        token: Address,
    ) -> Result<ResourceId, CompactError> {
        let tag = self.lock_tag(scope, reset_period, allocator)?;
        Ok(pack_resource_id(tag, token))
    }

    /// Decode a resource id with the configured scheme.
    pub fn lock_details(&self, id: ResourceId) -> Result<LockDetails, CompactError> {
        let tag = lock_tag_of(id);
        let token = token_of(id);
        let details = match self.scheme {
            LockTagScheme::AllocatorId => {
                let parts = decode_lock_tag(tag);
                LockDetails {
                    token,
                    scope: parts.scope,
                    reset_period: parts.reset_period,
                    allocator: AllocatorIdentity::Id(parts.allocator_id),
                    lock_tag: tag,
                }
            }
            LockTagScheme::AllocatorAddress => {
                let parts = address_scheme::unpack(tag)?;
                LockDetails {
                    token,
                    scope: parts.scope,
                    reset_period: parts.reset_period,
                    allocator: AllocatorIdentity::AddressSuffix(parts.allocator_suffix),
                    lock_tag: tag,
                }
            }
        };
        Ok(details)
    }
}

impl Default for IdentifierCodec {
    fn default() -> Self {
        Self::new(LockTagScheme::default())
    }
}
