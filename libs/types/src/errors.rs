//! Error types for identifier and boundary handling
//!
//! Two families, both local and non-retryable: a value outside its declared
//! bit-width or enum domain (`RangeError`), and a malformed string at the
//! boundary (`FormatError`). Neither is ever clamped or coerced.

use thiserror::Error;

/// An input is outside its declared bit-width or enum domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Scope out of range: {0} (expected 0 or 1)")]
    Scope(u8),

    #[error("Reset period class out of range: {0} (expected 0..=7)")]
    ResetPeriod(u8),

    #[error("Allocator id exceeds 92 bits: {value}")]
    AllocatorId { value: String },

    #[error("Lock tag exceeds 96 bits: {value}")]
    LockTag { value: String },

    #[error("Forced withdrawal status out of range: {0} (expected 0..=2)")]
    ForcedWithdrawalStatus(u8),
}

/// A boundary string is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid hex for {field}: {value}")]
    InvalidHex { field: &'static str, value: String },

    #[error("Invalid length for {field}: expected {expected} hex chars, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid decimal for {field}: {value}")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("Value for {field} does not fit in 256 bits")]
    Overflow { field: &'static str },

    #[error("Too many decimal places: {provided} provided, {allowed} allowed")]
    TooManyDecimals { provided: usize, allowed: u8 },

    #[error("Empty input for {field}")]
    Empty { field: &'static str },
}
