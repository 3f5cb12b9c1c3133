//! Reference Vector Tests
//!
//! Hashes and identifiers checked against values produced by an independent
//! keccak-256 implementation and the deployed verifier's constants:
//! - Type hashes
//! - Domain separators (Sepolia, mainnet)
//! - Claim hashes with and without a mandate
//! - Allocator digest
//! - Native deposit identifier

use compact_core::codec::{lock_tag, pack_lock_tag, pack_resource_id, unpack_lock_tag, token_of};
use compact_core::hashing::{
    compact_typehash, hash_compact, hash_domain, hash_mandate, mandate_typehash,
    typed_data_digest, CompactMessage, Mandate,
};
use compact_core::{CompactConfig, StructuredDataHasher};
use compact_types::ids::{AllocatorId, ResetPeriod, Scope};
use compact_types::parse::{parse_address, parse_b256, parse_resource_id};
use compact_types::{Address, U256};

const ALLOCATOR_ID: u128 = 24_110_319_327_574_188_268_114_297;

fn sample_message() -> CompactMessage {
    CompactMessage {
        arbiter: Address::repeat_byte(0x11),
        sponsor: Address::repeat_byte(0x22),
        nonce: U256::from(7u64),
        expires: U256::from(1_700_000_000u64),
        lock_tag: pack_lock_tag(0, 5, ALLOCATOR_ID).unwrap(),
        token: Address::ZERO,
        amount: U256::from(1_000_000_000_000_000_000u128),
        mandate: None,
    }
}

fn hash(hex: &str) -> compact_types::B256 {
    parse_b256(hex).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Type hashes
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_type_hashes() {
    assert_eq!(
        compact_typehash(false),
        hash("0x73b631296de001508966ddfc334593ad8f850ccd3be4d2c58a9ed469844eebc7")
    );
    assert_eq!(
        compact_typehash(true),
        hash("0x14a9a66de63aac1370d8a96ca8241ab0858549b99d2ff7387ae830d610e77cae")
    );
    assert_eq!(
        mandate_typehash(),
        hash("0x9e52cfc72580d3ec00c7361bbb625c7b47e58df37ef770a2b832d0c916115242")
    );
}

// ═══════════════════════════════════════════════════════════════════
// Domain separators
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_sepolia_domain_separator() {
    let config = CompactConfig::sepolia();
    assert_eq!(
        hash_domain(&config.domain),
        hash("0xfdda6e24eb60dac13b561ad88baa9f5853b7e26cefdae82baf08113ce75974c1")
    );
    assert_eq!(config.hasher().domain_separator(), hash_domain(&config.domain));
}

#[test]
fn test_mainnet_domain_separator() {
    assert_eq!(
        hash_domain(&CompactConfig::mainnet().domain),
        hash("0x8b918480126bb3c81f0908491caa8c46eef9e69a42fe46b787858586af770b7d")
    );
}

// ═══════════════════════════════════════════════════════════════════
// Claim hashes and digests
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_claim_hash_without_mandate() {
    assert_eq!(
        hash_compact(&sample_message()),
        hash("0xb6a7d9d8f1f48b8df9508e2f353410788d0d673b406e02f37ea5e331ffe3cc8e")
    );
}

#[test]
fn test_claim_hash_with_mandate() {
    let mandate = Mandate::new(U256::from(42u64));
    assert_eq!(
        hash_mandate(&mandate),
        hash("0x124ce8e0308d5365895a8651677103a8e4bdf3d9512726fdfabebfe918106aa6")
    );

    let message = sample_message().with_mandate(mandate);
    assert_eq!(
        hash_compact(&message),
        hash("0xf2f81681d722cbeaf6c2aaf5e7608d85375329210d206549678bdaae82586ef8")
    );
    assert_ne!(hash_compact(&message), hash_compact(&sample_message()));
}

#[test]
fn test_allocator_digest() {
    let hasher = CompactConfig::sepolia().hasher();
    let claim_hash = hasher.hash_compact(&sample_message());
    let expected = hash("0x57473a7c39f4453cb06f1f7b686d866ffcc85845113cfcd13cd86da9e60f9163");

    assert_eq!(hasher.hash_allocator_digest(claim_hash), expected);
    assert_eq!(
        hasher
            .allocator_digest_from_hex(
                "0xb6a7d9d8f1f48b8df9508e2f353410788d0d673b406e02f37ea5e331ffe3cc8e"
            )
            .unwrap(),
        expected
    );
}

#[test]
fn test_typed_data_digest_with_mandate_on_mainnet() {
    let config = CompactConfig::mainnet();
    let message = sample_message().with_mandate(Mandate::new(U256::from(42u64)));
    let expected = hash("0x8570f1007034d118877ab50c1e36d37316d37521dd4e06b5c619185e83145054");

    assert_eq!(typed_data_digest(&config.domain, hash_compact(&message)), expected);
    assert_eq!(StructuredDataHasher::new(config.domain).typed_data_digest(&message), expected);
}

// ═══════════════════════════════════════════════════════════════════
// Identifiers
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_native_deposit_identifier() {
    let tag = lock_tag(
        Scope::Multichain,
        ResetPeriod::OneDay,
        AllocatorId::new(ALLOCATOR_ID).unwrap(),
    );
    assert_eq!(tag.to_hex(), "0x5013f18f079b52276faad179");

    let id = pack_resource_id(tag, Address::ZERO);
    assert_eq!(
        id.to_string(),
        "36220265157835131660283045058301948894219439718141577796090720841600285540352"
    );
    assert_eq!(token_of(id), Address::ZERO);
    assert!(!id.as_u256().bit(255));

    let parts = unpack_lock_tag(id);
    assert_eq!(parts.scope, Scope::Multichain);
    assert_eq!(parts.reset_period, ResetPeriod::OneDay);
    assert_eq!(parts.allocator_id.get(), ALLOCATOR_ID);
}

#[test]
fn test_pasted_identifier_forms_agree() {
    let decimal = parse_resource_id(
        "36220265157835131660283045058301948894219439718141577796090720841600285540352",
    )
    .unwrap();
    let hex = parse_resource_id(
        "0x5013f18f079b52276faad1790000000000000000000000000000000000000000",
    )
    .unwrap();
    assert_eq!(decimal, hex);
}

#[test]
fn test_erc20_identifier_keeps_token() {
    let token = parse_address("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238").unwrap();
    let tag = pack_lock_tag(1, 3, 116_248_715_932_857_528_787_113_358).unwrap();
    assert_eq!(tag.to_hex(), "0xb060289f84a5a81c00b3958e");

    let id = pack_resource_id(tag, token);
    assert_eq!(token_of(id), token);
    assert!(id.as_u256().bit(255));
}
