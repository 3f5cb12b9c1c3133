//! Deposit call payloads and lock id recovery
//!
//! Deposits mint an ERC-6909 balance under a resource id. The id is fully
//! determined by `(lockTag, token)`, so it can be computed before the
//! transaction, and it is also recoverable from the mint's `Transfer` log.

use alloy_primitives::{b256, Address, Bytes, B256, U256};
use compact_types::ids::{LockTag, ResourceId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::pack_resource_id;
use crate::config::CompactConfig;
use crate::hashing::{compact_typehash, CompactMessage, StructuredDataHasher};

/// `keccak256("Transfer(address,address,address,uint256,uint256)")`, the
/// ERC-6909 transfer event. Topics are `[sig, from, to, id]`.
pub const TRANSFER_TOPIC: B256 =
    b256!("1b3d7edb2e9c0b0e7c525b20aaaef0f5940d2ed71663c7d39266ecafac728859");

/// A deposit the caller should submit to the verifying contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum DepositCall {
    /// `depositNative(lockTag, recipient)` with `value` attached.
    Native {
        lock_tag: LockTag,
        recipient: Address,
        value: U256,
    },
    /// `depositERC20(token, lockTag, amount, recipient)`.
    ///
    /// The verifier pulls `amount` from the caller, so the token allowance
    /// must cover it first. See [`DepositCall::approval`].
    Erc20 {
        token: Address,
        lock_tag: LockTag,
        amount: U256,
        recipient: Address,
    },
    /// `depositNativeAndRegister(lockTag, claimHash, typehash)` with `value`.
    NativeAndRegister {
        lock_tag: LockTag,
        claim_hash: B256,
        typehash: B256,
        value: U256,
    },
}

impl DepositCall {
    pub fn native(lock_tag: LockTag, recipient: Address, value: U256) -> Self {
        Self::Native {
            lock_tag,
            recipient,
            value,
        }
    }

    pub fn erc20(token: Address, lock_tag: LockTag, amount: U256, recipient: Address) -> Self {
        Self::Erc20 {
            token,
            lock_tag,
            amount,
            recipient,
        }
    }

    /// Native deposit that registers `message`'s claim hash in the same call.
    ///
    /// The deposited value is the message amount and the typehash follows
    /// the message's mandate presence.
    pub fn native_and_register(hasher: &StructuredDataHasher, message: &CompactMessage) -> Self {
        let claim_hash = hasher.hash_compact(message);
        debug!(
            lock_tag = %message.lock_tag,
            claim_hash = %claim_hash,
            mandate = message.mandate.is_some(),
            "Deposit with registration prepared"
        );
        Self::NativeAndRegister {
            lock_tag: message.lock_tag,
            claim_hash,
            typehash: compact_typehash(message.mandate.is_some()),
            value: message.amount,
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            Self::Native { .. } => "depositNative",
            Self::Erc20 { .. } => "depositERC20",
            Self::NativeAndRegister { .. } => "depositNativeAndRegister",
        }
    }

    /// Native value attached to the transaction.
    pub fn value(&self) -> U256 {
        match self {
            Self::Native { value, .. } | Self::NativeAndRegister { value, .. } => *value,
            Self::Erc20 { .. } => U256::ZERO,
        }
    }

    pub fn lock_tag(&self) -> LockTag {
        match self {
            Self::Native { lock_tag, .. }
            | Self::Erc20 { lock_tag, .. }
            | Self::NativeAndRegister { lock_tag, .. } => *lock_tag,
        }
    }

    /// Token approval an ERC-20 deposit depends on, or `None` for native
    /// deposits.
    pub fn approval(&self, config: &CompactConfig) -> Option<Erc20Approval> {
        match self {
            Self::Erc20 { token, amount, .. } => {
                Some(Erc20Approval::for_verifier(config, *token, *amount))
            }
            _ => None,
        }
    }

    /// Resource id the deposit will credit.
    pub fn resource_id(&self) -> ResourceId {
        match self {
            Self::Erc20 {
                token, lock_tag, ..
            } => pack_resource_id(*lock_tag, *token),
            _ => pack_resource_id(self.lock_tag(), Address::ZERO),
        }
    }
}

/// `approve(spender, amount)` on the deposited token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erc20Approval {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
}

impl Erc20Approval {
    pub fn new(token: Address, spender: Address, amount: U256) -> Self {
        Self {
            token,
            spender,
            amount,
        }
    }

    /// Approval with the configured verifying contract as spender.
    pub fn for_verifier(config: &CompactConfig, token: Address, amount: U256) -> Self {
        let approval = Self::new(token, config.domain.verifying_contract, amount);
        debug!(
            token = %approval.token,
            spender = %approval.spender,
            amount = %approval.amount,
            "Token approval prepared"
        );
        approval
    }

    pub fn function_name(&self) -> &'static str {
        "approve"
    }
}

/// True when `allowance` cannot cover a deposit of `amount`.
pub fn needs_approval(allowance: U256, amount: U256) -> bool {
    allowance < amount
}

/// A receipt log as returned by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    #[serde(default)]
    pub data: Bytes,
}

/// Resource id minted by a deposit, taken from the first `Transfer` log
/// whose `from` topic is the zero address.
pub fn lock_id_from_logs(logs: &[LogEntry]) -> Option<ResourceId> {
    logs.iter()
        .find(|log| {
            log.topics.len() >= 4 && log.topics[0] == TRANSFER_TOPIC && log.topics[1] == B256::ZERO
        })
        .map(|log| ResourceId::from_u256(U256::from_be_bytes(log.topics[3].0)))
}
