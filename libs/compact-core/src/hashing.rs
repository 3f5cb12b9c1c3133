//! Structured data hashing for Compact messages
//!
//! Computes the EIP-712 struct hash of a `Compact` (optionally carrying a
//! `Mandate` witness), the domain separator, and the `0x1901` digests the
//! sponsor and allocator sign. The verifier recomputes every one of these
//! bit-for-bit, so field order, widths and primitive encodings here are fixed:
//!
//! - `address` is left-padded to 32 bytes
//! - `uint256` is the 32-byte big-endian word
//! - `bytes12` is right-padded to 32 bytes
//! - `string` is its keccak-256 hash
//! - a nested struct is its own struct hash
//!
//! Schema selection is driven solely by `CompactMessage::mandate`, so a
//! mandate-bearing message cannot be hashed under the plain schema or vice
//! versa.

use alloy_primitives::{keccak256, Address, B256, U256};
use compact_types::errors::FormatError;
use compact_types::ids::{LockTag, ResourceId};
use compact_types::parse::{parse_address, parse_b256, parse_lock_tag_hex, parse_u256};
use serde::{Deserialize, Serialize};

use crate::codec::{lock_tag_of, token_of};

// ---------------------------------------------------------------------------
// Schema strings
// ---------------------------------------------------------------------------

/// Type string of a plain Compact.
pub const COMPACT_TYPESTRING: &str = "Compact(address arbiter,address sponsor,uint256 nonce,uint256 expires,bytes12 lockTag,address token,uint256 amount)";

/// Type string of a Compact carrying a Mandate witness.
pub const COMPACT_WITH_MANDATE_TYPESTRING: &str = "Compact(address arbiter,address sponsor,uint256 nonce,uint256 expires,bytes12 lockTag,address token,uint256 amount,Mandate mandate)Mandate(uint256 witnessArgument)";

/// Type string of the Mandate witness struct.
pub const MANDATE_TYPESTRING: &str = "Mandate(uint256 witnessArgument)";

/// Witness fragment passed to the claim entry point alongside the witness hash.
pub const MANDATE_WITNESS_TYPESTRING: &str = "uint256 witnessArgument";

/// Type string of the EIP-712 domain.
pub const EIP712_DOMAIN_TYPESTRING: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Prefix of every EIP-712 digest.
pub const EIP712_PREFIX: [u8; 2] = [0x19, 0x01];

/// Type hash of the Compact schema selected by mandate presence.
pub fn compact_typehash(has_mandate: bool) -> B256 {
    if has_mandate {
        keccak256(COMPACT_WITH_MANDATE_TYPESTRING)
    } else {
        keccak256(COMPACT_TYPESTRING)
    }
}

pub fn mandate_typehash() -> B256 {
    keccak256(MANDATE_TYPESTRING)
}

pub fn domain_typehash() -> B256 {
    keccak256(EIP712_DOMAIN_TYPESTRING)
}

// ---------------------------------------------------------------------------
// Field encoding
// ---------------------------------------------------------------------------

fn encode_address(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

fn encode_uint(value: &U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}

fn encode_bytes12(tag: &LockTag) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[..12].copy_from_slice(&tag.to_bytes());
    word
}

fn encode_string(value: &str) -> [u8; 32] {
    keccak256(value.as_bytes()).0
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Mandate witness extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mandate {
    pub witness_argument: U256,
}

impl Mandate {
    pub fn new(witness_argument: U256) -> Self {
        Self { witness_argument }
    }
}

/// The signed off-chain message authorizing an arbiter to claim.
///
/// Created per claim and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactMessage {
    pub arbiter: Address,
    pub sponsor: Address,
    pub nonce: U256,
    pub expires: U256,
    pub lock_tag: LockTag,
    pub token: Address,
    pub amount: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandate: Option<Mandate>,
}

impl CompactMessage {
    /// Build a message for an existing lock, splitting its resource id into
    /// lock tag and token.
    pub fn for_resource(
        arbiter: Address,
        sponsor: Address,
        nonce: U256,
        expires: U256,
        id: ResourceId,
        amount: U256,
    ) -> Self {
        Self {
            arbiter,
            sponsor,
            nonce,
            expires,
            lock_tag: lock_tag_of(id),
            token: token_of(id),
            amount,
            mandate: None,
        }
    }

    pub fn with_mandate(mut self, mandate: Mandate) -> Self {
        self.mandate = Some(mandate);
        self
    }

    /// Type hash of the schema this message hashes under.
    pub fn typehash(&self) -> B256 {
        compact_typehash(self.mandate.is_some())
    }
}

/// Boundary form of a Compact message with every field as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactMessageInput {
    pub arbiter: String,
    pub sponsor: String,
    pub nonce: String,
    pub expires: String,
    pub lock_tag: String,
    pub token: String,
    pub amount: String,
    #[serde(default)]
    pub witness_argument: Option<String>,
}

impl TryFrom<&CompactMessageInput> for CompactMessage {
    type Error = FormatError;

    fn try_from(input: &CompactMessageInput) -> Result<Self, Self::Error> {
        let mandate = input
            .witness_argument
            .as_deref()
            .map(|arg| parse_u256(arg, "witness argument").map(Mandate::new))
            .transpose()?;

        Ok(Self {
            arbiter: parse_address(&input.arbiter)?,
            sponsor: parse_address(&input.sponsor)?,
            nonce: parse_u256(&input.nonce, "nonce")?,
            expires: parse_u256(&input.expires, "expires")?,
            lock_tag: parse_lock_tag_hex(&input.lock_tag)?,
            token: parse_address(&input.token)?,
            amount: parse_u256(&input.amount, "amount")?,
            mandate,
        })
    }
}

/// EIP-712 domain parameters of the verifying contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainParams {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Struct hash of a Mandate.
pub fn hash_mandate(mandate: &Mandate) -> B256 {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(mandate_typehash().as_slice());
    buf.extend_from_slice(&encode_uint(&mandate.witness_argument));
    keccak256(buf)
}

/// Struct hash of a Compact (the claim hash).
pub fn hash_compact(message: &CompactMessage) -> B256 {
    let mut buf = Vec::with_capacity(32 * 9);
    buf.extend_from_slice(message.typehash().as_slice());
    buf.extend_from_slice(&encode_address(&message.arbiter));
    buf.extend_from_slice(&encode_address(&message.sponsor));
    buf.extend_from_slice(&encode_uint(&message.nonce));
    buf.extend_from_slice(&encode_uint(&message.expires));
    buf.extend_from_slice(&encode_bytes12(&message.lock_tag));
    buf.extend_from_slice(&encode_address(&message.token));
    buf.extend_from_slice(&encode_uint(&message.amount));
    if let Some(mandate) = &message.mandate {
        buf.extend_from_slice(hash_mandate(mandate).as_slice());
    }
    keccak256(buf)
}

/// Domain separator over the 4-field EIP712Domain schema.
pub fn hash_domain(domain: &DomainParams) -> B256 {
    let mut buf = Vec::with_capacity(32 * 5);
    buf.extend_from_slice(domain_typehash().as_slice());
    buf.extend_from_slice(&encode_string(&domain.name));
    buf.extend_from_slice(&encode_string(&domain.version));
    buf.extend_from_slice(&encode_uint(&U256::from(domain.chain_id)));
    buf.extend_from_slice(&encode_address(&domain.verifying_contract));
    keccak256(buf)
}

/// `keccak256(0x1901 || domainSeparator || structHash)`.
pub fn eip712_digest(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut buf = [0u8; 66];
    buf[..2].copy_from_slice(&EIP712_PREFIX);
    buf[2..34].copy_from_slice(domain_separator.as_slice());
    buf[34..].copy_from_slice(struct_hash.as_slice());
    keccak256(buf)
}

/// Typed-data digest of a claim hash under `domain`, recomputing the separator.
pub fn typed_data_digest(domain: &DomainParams, claim_hash: B256) -> B256 {
    eip712_digest(hash_domain(domain), claim_hash)
}

/// Hasher bound to one verifying-contract domain.
///
/// Caches the domain separator; every method is pure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredDataHasher {
    domain: DomainParams,
    domain_separator: B256,
}

impl StructuredDataHasher {
    pub fn new(domain: DomainParams) -> Self {
        let domain_separator = hash_domain(&domain);
        Self {
            domain,
            domain_separator,
        }
    }

    pub fn domain(&self) -> &DomainParams {
        &self.domain
    }

    pub fn domain_separator(&self) -> B256 {
        self.domain_separator
    }

    /// Claim hash of a message.
    pub fn hash_compact(&self, message: &CompactMessage) -> B256 {
        hash_compact(message)
    }

    /// Digest the allocator signs raw over an already-computed claim hash.
    pub fn hash_allocator_digest(&self, claim_hash: B256) -> B256 {
        eip712_digest(self.domain_separator, claim_hash)
    }

    /// Allocator digest from a `0x`-prefixed claim hash string.
    pub fn allocator_digest_from_hex(&self, claim_hash: &str) -> Result<B256, FormatError> {
        Ok(self.hash_allocator_digest(parse_b256(claim_hash)?))
    }

    /// Typed-data digest a sponsor's wallet signs for this message.
    ///
    /// Same bytes as the allocator digest; the two differ only in how each
    /// party's signer is asked to produce the signature.
    pub fn typed_data_digest(&self, message: &CompactMessage) -> B256 {
        eip712_digest(self.domain_separator, hash_compact(message))
    }
}
