//! Runtime configuration
//!
//! One [`CompactConfig`] fixes the verifying-contract domain and the lock-tag
//! scheme for the lifetime of a client. Components are built from it once,
//! so a single process never hashes against two domains or packs tags under
//! two schemes.

use std::fs;
use std::path::Path;

use alloy_primitives::{address, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::codec::{IdentifierCodec, LockTagScheme};
use crate::errors::ConfigError;
use crate::hashing::{DomainParams, StructuredDataHasher};

/// EIP-712 domain name of the verifier.
pub const DOMAIN_NAME: &str = "The Compact";

/// EIP-712 domain version of the verifier.
pub const DOMAIN_VERSION: &str = "1";

pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

pub const MAINNET_CHAIN_ID: u64 = 1;

/// Status polling cadence for forced withdrawals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval while no forced withdrawal is active.
    pub far_interval_secs: u64,
    /// Interval once within `near_window_secs` of maturity.
    pub near_interval_secs: u64,
    pub near_window_secs: u64,
    /// Interval after maturity.
    pub matured_interval_secs: u64,
    /// Slack added when sleeping straight through to maturity.
    pub maturity_grace_millis: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            far_interval_secs: 10,
            near_interval_secs: 1,
            near_window_secs: 10,
            matured_interval_secs: 2,
            maturity_grace_millis: 500,
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactConfig {
    pub domain: DomainParams,
    pub lock_tag_scheme: LockTagScheme,
    pub polling: PollingConfig,
    /// Lifetime given to new claims when the caller sets no expiry.
    pub default_claim_ttl_secs: u64,
}

impl Default for CompactConfig {
    fn default() -> Self {
        Self::sepolia()
    }
}

impl CompactConfig {
    /// Deployment on Sepolia.
    pub fn sepolia() -> Self {
        Self::for_deployment(
            SEPOLIA_CHAIN_ID,
            address!("5c64fC2846B35F950B653a3135E646B942A9dE55"),
        )
    }

    /// Deployment on Ethereum mainnet.
    pub fn mainnet() -> Self {
        Self::for_deployment(
            MAINNET_CHAIN_ID,
            address!("00000000000018DF021F3400757c9151d62c990b"),
        )
    }

    fn for_deployment(chain_id: u64, verifying_contract: alloy_primitives::Address) -> Self {
        Self {
            domain: DomainParams {
                name: DOMAIN_NAME.to_string(),
                version: DOMAIN_VERSION.to_string(),
                chain_id,
                verifying_contract,
            },
            lock_tag_scheme: LockTagScheme::default(),
            polling: PollingConfig::default(),
            default_claim_ttl_secs: 3_600,
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            chain_id = config.domain.chain_id,
            scheme = config.lock_tag_scheme.name(),
            "Config loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain.name.is_empty() {
            return Err(ConfigError::Invalid("domain name is empty".to_string()));
        }
        if self.domain.version.is_empty() {
            return Err(ConfigError::Invalid("domain version is empty".to_string()));
        }
        if self.domain.chain_id == 0 {
            return Err(ConfigError::Invalid("chain id must be non-zero".to_string()));
        }

        let p = &self.polling;
        let intervals = [
            ("far_interval_secs", p.far_interval_secs),
            ("near_interval_secs", p.near_interval_secs),
            ("matured_interval_secs", p.matured_interval_secs),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be non-zero")));
        }
        if self.default_claim_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "default_claim_ttl_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn codec(&self) -> IdentifierCodec {
        IdentifierCodec::new(self.lock_tag_scheme)
    }

    pub fn hasher(&self) -> StructuredDataHasher {
        StructuredDataHasher::new(self.domain.clone())
    }

    /// Expiry for a claim created at `now` with the default lifetime.
    pub fn default_expiry(&self, now: u64) -> U256 {
        U256::from(now.saturating_add(self.default_claim_ttl_secs))
    }
}
