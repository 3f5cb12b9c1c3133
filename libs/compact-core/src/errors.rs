//! Client-side error types
//!
//! Every error here is local and synchronous. Retrying without changing the
//! input cannot succeed, so none of them carry retry hints.

use compact_types::errors::{FormatError, RangeError};
use thiserror::Error;

/// Top-level error for the client core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompactError {
    #[error("Range error: {0}")]
    Range(#[from] RangeError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Lock tag scheme mismatch: codec is configured for {configured}, got {provided}")]
    SchemeMismatch {
        configured: &'static str,
        provided: &'static str,
    },

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("Forced withdrawal error: {0}")]
    Withdrawal(#[from] WithdrawalError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Failures surfaced by an external digest signer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("Signer unavailable: {0}")]
    Unavailable(String),

    #[error("Signing request rejected: {0}")]
    Rejected(String),

    #[error("Signer returned a malformed signature of {len} bytes")]
    MalformedSignature { len: usize },
}

/// Forced-withdrawal gating errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalError {
    #[error("Forced withdrawal not matured: withdrawable at {withdrawable_at}, now {now}")]
    NotMatured { withdrawable_at: u64, now: u64 },

    #[error("Forced withdrawal is not enabled")]
    NotEnabled,

    #[error("Forced withdrawal already enabled")]
    AlreadyEnabled,

    #[error("Withdrawal amount must be positive")]
    InvalidAmount,

    #[error("Status read failed: {0}")]
    StatusRead(String),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
