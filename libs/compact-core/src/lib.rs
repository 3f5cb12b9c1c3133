//! Compact Core: client computation layer for resource locks
//!
//! Builds everything a client needs to interact with the verifying contract
//! without talking to it:
//! - Lock tag and resource id packing
//! - EIP-712 claim hashes, domain separators and allocator digests
//! - Claim payload assembly
//! - Forced-withdrawal maturity tracking
//! - Deposit payloads, signer plumbing and revert classification
//!
//! # Determinism
//! Codec and hashing functions are pure and synchronous. Time enters only
//! through the forced-withdrawal [`Clock`](forced_withdrawal::Clock), chain
//! state only through [`StatusSource`](forced_withdrawal::StatusSource), and
//! signatures only through [`DigestSigner`](signing::DigestSigner).
//!
//! # Version
//! v1.0.0 - Matches the v1 verifier encoding

pub mod claim;
pub mod codec;
pub mod config;
pub mod deposit;
pub mod errors;
pub mod forced_withdrawal;
pub mod hashing;
pub mod revert;
pub mod signing;

pub use claim::{build_claim, ClaimBuilder, ClaimPayload, ClaimantEntry};
pub use codec::{IdentifierCodec, LockTagScheme};
pub use config::CompactConfig;
pub use errors::CompactError;
pub use forced_withdrawal::{can_withdraw, ForcedWithdrawalTracker};
pub use hashing::{CompactMessage, DomainParams, Mandate, StructuredDataHasher};

/// Crate version constant
pub const COMPACT_CORE_VERSION: &str = "1.0.0";
