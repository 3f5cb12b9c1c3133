//! Claim payload assembly
//!
//! Turns a signed Compact, the allocator's authorization and a list of
//! claimants into the argument tuple of the verifier's claim entry point.
//! Assembly is purely structural: allocation sums are left to the verifier.

use alloy_primitives::{Address, Bytes, B256, U256};
use compact_types::errors::FormatError;
use compact_types::ids::{LockTag, ResourceId};
use compact_types::parse::{parse_address, parse_hex_bytes, parse_lock_tag_hex, parse_u256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{pack_resource_id, pack_word, split_word};
use crate::hashing::{hash_mandate, CompactMessage, MANDATE_WITNESS_TYPESTRING};

// ---------------------------------------------------------------------------
// Claimants
// ---------------------------------------------------------------------------

/// One recipient of claimed funds.
///
/// `claimant` packs `(effectiveLockTag << 160) | recipient`. A zero tag keeps
/// the funds wrapped as an ERC-6909 transfer; the deposit's own tag unwraps
/// them to the underlying asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimantEntry {
    pub claimant: U256,
    pub amount: U256,
}

impl ClaimantEntry {
    pub fn new(effective_lock_tag: LockTag, recipient: Address, amount: U256) -> Self {
        Self {
            claimant: pack_word(effective_lock_tag, recipient),
            amount,
        }
    }

    /// Pure ERC-6909 transfer to `recipient`.
    pub fn transfer(recipient: Address, amount: U256) -> Self {
        Self::new(LockTag::ZERO, recipient, amount)
    }

    /// Withdrawal of the underlying asset to `recipient`.
    pub fn withdrawal(lock_tag: LockTag, recipient: Address, amount: U256) -> Self {
        Self::new(lock_tag, recipient, amount)
    }

    /// Parse a claimant from its boundary strings.
    pub fn from_strs(lock_tag: &str, recipient: &str, amount: &str) -> Result<Self, FormatError> {
        Ok(Self::new(
            parse_lock_tag_hex(lock_tag)?,
            parse_address(recipient)?,
            parse_u256(amount, "amount")?,
        ))
    }

    /// Split `claimant` back into `(effectiveLockTag, recipient)`.
    pub fn decode(&self) -> (LockTag, Address) {
        split_word(self.claimant)
    }

    pub fn recipient(&self) -> Address {
        self.decode().1
    }

    pub fn is_withdrawal(&self) -> bool {
        !self.decode().0.is_zero()
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Arguments of the claim entry point, in ABI tuple order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPayload {
    pub allocator_data: Bytes,
    pub sponsor_signature: Bytes,
    pub sponsor: Address,
    pub nonce: U256,
    pub expires: U256,
    pub witness: B256,
    pub witness_typestring: String,
    pub id: ResourceId,
    pub allocated_amount: U256,
    pub claimants: Vec<ClaimantEntry>,
}

impl ClaimPayload {
    /// Sum of claimant amounts, saturating at `U256::MAX`.
    pub fn claimed_total(&self) -> U256 {
        self.claimants
            .iter()
            .fold(U256::ZERO, |acc, c| acc.saturating_add(c.amount))
    }

    pub fn has_witness(&self) -> bool {
        !self.witness_typestring.is_empty()
    }
}

/// Witness hash and type fragment for a message; zero hash and `""` without
/// a mandate.
pub fn witness_of(compact: &CompactMessage) -> (B256, String) {
    match &compact.mandate {
        Some(mandate) => (hash_mandate(mandate), MANDATE_WITNESS_TYPESTRING.to_string()),
        None => (B256::ZERO, String::new()),
    }
}

/// Assemble the claim payload.
///
/// Claimant order is preserved as given.
pub fn build_claim(
    compact: &CompactMessage,
    sponsor_signature: Bytes,
    allocator_data: Bytes,
    claimants: Vec<ClaimantEntry>,
) -> ClaimPayload {
    let (witness, witness_typestring) = witness_of(compact);

    debug!(
        sponsor = %compact.sponsor,
        claimants = claimants.len(),
        witness = compact.mandate.is_some(),
        "Claim payload assembled"
    );

    ClaimPayload {
        allocator_data,
        sponsor_signature,
        sponsor: compact.sponsor,
        nonce: compact.nonce,
        expires: compact.expires,
        witness,
        witness_typestring,
        id: pack_resource_id(compact.lock_tag, compact.token),
        allocated_amount: compact.amount,
        claimants,
    }
}

/// Incremental claim assembly from boundary strings.
#[derive(Debug, Clone)]
pub struct ClaimBuilder {
    compact: CompactMessage,
    sponsor_signature: Bytes,
    allocator_data: Bytes,
    claimants: Vec<ClaimantEntry>,
}

impl ClaimBuilder {
    /// Starts with an empty sponsor signature and empty allocator data.
    ///
    /// Empty is a valid final value for both: a registered claim needs no
    /// sponsor signature, and some allocators authorize without data.
    pub fn new(compact: CompactMessage) -> Self {
        Self {
            compact,
            sponsor_signature: Bytes::new(),
            allocator_data: Bytes::new(),
            claimants: Vec::new(),
        }
    }

    pub fn sponsor_signature(mut self, signature: Bytes) -> Self {
        self.sponsor_signature = signature;
        self
    }

    pub fn sponsor_signature_hex(self, signature: &str) -> Result<Self, FormatError> {
        Ok(self.sponsor_signature(parse_hex_bytes(signature)?))
    }

    pub fn allocator_data(mut self, data: Bytes) -> Self {
        self.allocator_data = data;
        self
    }

    pub fn allocator_data_hex(self, data: &str) -> Result<Self, FormatError> {
        Ok(self.allocator_data(parse_hex_bytes(data)?))
    }

    pub fn claimant(mut self, entry: ClaimantEntry) -> Self {
        self.claimants.push(entry);
        self
    }

    pub fn claimants(mut self, entries: impl IntoIterator<Item = ClaimantEntry>) -> Self {
        self.claimants.extend(entries);
        self
    }

    pub fn build(self) -> ClaimPayload {
        build_claim(
            &self.compact,
            self.sponsor_signature,
            self.allocator_data,
            self.claimants,
        )
    }
}
