//! Digest signing capability
//!
//! The core never holds key material. Both authorizing parties sign through
//! a [`DigestSigner`] supplied by the caller: a wallet for the sponsor, an
//! allocator service for the allocator. The core only prepares the digest
//! and checks the shape of what comes back.

use alloy_primitives::{Address, Bytes, B256};
use tracing::{debug, warn};

use crate::errors::{CompactError, SignerError};
use crate::hashing::{CompactMessage, StructuredDataHasher};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// `r || s || v` signature length.
pub const SIGNATURE_LEN: usize = 65;

/// EIP-2098 compact signature length.
pub const COMPACT_SIGNATURE_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// External signer over raw 32-byte digests.
///
/// Signature acquisition may be slow or cancelled by the user; the core
/// only calls this once the caller is ready to wait on it.
pub trait DigestSigner {
    fn sign_digest(&self, digest: &B256) -> Result<Bytes, SignerError>;

    fn signer_address(&self) -> Address;
}

/// Signer that always reports itself unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSigner;

impl DigestSigner for UnavailableSigner {
    fn sign_digest(&self, _digest: &B256) -> Result<Bytes, SignerError> {
        Err(SignerError::Unavailable("no signer configured".to_string()))
    }

    fn signer_address(&self) -> Address {
        Address::ZERO
    }
}

/// Reject anything that is not a 64- or 65-byte ECDSA signature.
pub fn check_signature(signature: &Bytes) -> Result<(), SignerError> {
    match signature.len() {
        SIGNATURE_LEN | COMPACT_SIGNATURE_LEN => Ok(()),
        len => Err(SignerError::MalformedSignature { len }),
    }
}

fn sign_checked<S: DigestSigner + ?Sized>(
    signer: &S,
    digest: &B256,
    role: &'static str,
) -> Result<Bytes, SignerError> {
    let signature = signer
        .sign_digest(digest)
        .and_then(|sig| check_signature(&sig).map(|_| sig))
        .map_err(|e| {
            warn!(role, signer = %signer.signer_address(), error = %e, "Digest signing failed");
            e
        })?;
    debug!(role, signer = %signer.signer_address(), "Digest signed");
    Ok(signature)
}

// ---------------------------------------------------------------------------
// Authorizations
// ---------------------------------------------------------------------------

/// A claim hash, the digest derived from it, and the signature over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub claim_hash: B256,
    pub digest: B256,
    pub signature: Bytes,
}

/// Allocator authorization: claim hash → allocator digest → signature.
pub fn authorize_allocator<S: DigestSigner + ?Sized>(
    signer: &S,
    hasher: &StructuredDataHasher,
    message: &CompactMessage,
) -> Result<Authorization, CompactError> {
    let claim_hash = hasher.hash_compact(message);
    let digest = hasher.hash_allocator_digest(claim_hash);
    let signature = sign_checked(signer, &digest, "allocator")?;
    Ok(Authorization {
        claim_hash,
        digest,
        signature,
    })
}

/// Sponsor authorization over the typed-data digest of `message`.
///
/// Fails if the signer is not the message's sponsor.
pub fn authorize_sponsor<S: DigestSigner + ?Sized>(
    signer: &S,
    hasher: &StructuredDataHasher,
    message: &CompactMessage,
) -> Result<Authorization, CompactError> {
    if signer.signer_address() != message.sponsor {
        return Err(SignerError::Rejected(format!(
            "signer {} is not sponsor {}",
            signer.signer_address(),
            message.sponsor
        ))
        .into());
    }
    let claim_hash = hasher.hash_compact(message);
    let digest = hasher.typed_data_digest(message);
    let signature = sign_checked(signer, &digest, "sponsor")?;
    Ok(Authorization {
        claim_hash,
        digest,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::DomainParams;
    use alloy_primitives::U256;
    use compact_types::ids::LockTag;
    use std::cell::RefCell;

    struct RecordingSigner {
        address: Address,
        signature_len: usize,
        seen: RefCell<Vec<B256>>,
    }

    impl RecordingSigner {
        fn new(address: Address, signature_len: usize) -> Self {
            Self {
                address,
                signature_len,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl DigestSigner for RecordingSigner {
        fn sign_digest(&self, digest: &B256) -> Result<Bytes, SignerError> {
            self.seen.borrow_mut().push(*digest);
            Ok(Bytes::from(vec![0xab; self.signature_len]))
        }

        fn signer_address(&self) -> Address {
            self.address
        }
    }

    fn hasher() -> StructuredDataHasher {
        StructuredDataHasher::new(DomainParams {
            name: "The Compact".to_string(),
            version: "1".to_string(),
            chain_id: 11_155_111,
            verifying_contract: Address::repeat_byte(0x5c),
        })
    }

    fn message() -> CompactMessage {
        CompactMessage {
            arbiter: Address::repeat_byte(0x11),
            sponsor: Address::repeat_byte(0x22),
            nonce: U256::from(1u64),
            expires: U256::from(2u64),
            lock_tag: LockTag::ZERO,
            token: Address::ZERO,
            amount: U256::from(3u64),
            mandate: None,
        }
    }

    #[test]
    fn test_allocator_signs_allocator_digest() {
        let signer = RecordingSigner::new(Address::repeat_byte(0x77), SIGNATURE_LEN);
        let hasher = hasher();
        let auth = authorize_allocator(&signer, &hasher, &message()).unwrap();

        assert_eq!(auth.claim_hash, hasher.hash_compact(&message()));
        assert_eq!(auth.digest, hasher.hash_allocator_digest(auth.claim_hash));
        assert_eq!(signer.seen.borrow().as_slice(), &[auth.digest]);
        assert_eq!(auth.signature.len(), SIGNATURE_LEN);
    }

    #[test]
    fn test_sponsor_must_match_signer() {
        let signer = RecordingSigner::new(Address::repeat_byte(0x77), SIGNATURE_LEN);
        let err = authorize_sponsor(&signer, &hasher(), &message()).unwrap_err();
        assert!(matches!(err, CompactError::Signer(SignerError::Rejected(_))));
        assert!(signer.seen.borrow().is_empty());
    }

    #[test]
    fn test_sponsor_accepts_compact_signature() {
        let signer = RecordingSigner::new(Address::repeat_byte(0x22), COMPACT_SIGNATURE_LEN);
        let auth = authorize_sponsor(&signer, &hasher(), &message()).unwrap();
        assert_eq!(auth.digest, hasher().typed_data_digest(&message()));
    }

    #[test]
    fn test_malformed_signature_rejected() {
        let signer = RecordingSigner::new(Address::repeat_byte(0x77), 10);
        let err = authorize_allocator(&signer, &hasher(), &message()).unwrap_err();
        assert_eq!(
            err,
            CompactError::Signer(SignerError::MalformedSignature { len: 10 })
        );
    }

    #[test]
    fn test_unavailable_signer() {
        let err = authorize_allocator(&UnavailableSigner, &hasher(), &message()).unwrap_err();
        assert!(matches!(err, CompactError::Signer(SignerError::Unavailable(_))));
    }
}
