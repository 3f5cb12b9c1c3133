//! Contract revert classification
//!
//! Maps node/wallet error text or raw revert data to the verifier's custom
//! errors so callers can show something better than a raw RPC message.

use alloy_primitives::keccak256;
use thiserror::Error;

/// A classified failure of a submitted call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractRevert {
    #[error("The signature has expired.")]
    Expired,

    #[error("The provided signature is invalid.")]
    InvalidSignature,

    #[error("This transaction nonce has already been used.")]
    NonceAlreadyUsed,

    #[error("Your balance in the lock is insufficient.")]
    InsufficientBalance,

    #[error("The reset period has not finished yet.")]
    ResetPeriodNotOver,

    #[error("You are not authorized to perform this action.")]
    Unauthorized,

    #[error("Transaction was rejected in your wallet.")]
    UserRejected,

    #[error("You do not have enough ETH for gas fees.")]
    InsufficientGas,

    #[error("Transaction failed. Check your inputs and try again.")]
    ExecutionReverted,

    #[error("{0}")]
    Other(String),
}

/// Custom errors of the verifier, in match priority order.
const CUSTOM_ERRORS: [(&str, ContractRevert); 6] = [
    ("Expired()", ContractRevert::Expired),
    ("InvalidSignature()", ContractRevert::InvalidSignature),
    ("NonceAlreadyUsed()", ContractRevert::NonceAlreadyUsed),
    ("InsufficientBalance()", ContractRevert::InsufficientBalance),
    ("ResetPeriodNotOver()", ContractRevert::ResetPeriodNotOver),
    ("Unauthorized()", ContractRevert::Unauthorized),
];

impl ContractRevert {
    /// Classify an error message. Unknown messages keep their first line.
    pub fn from_message(message: &str) -> Self {
        if let Some((_, revert)) = CUSTOM_ERRORS.iter().find(|(sig, _)| message.contains(sig)) {
            return revert.clone();
        }

        if message.contains("user rejected action") {
            Self::UserRejected
        } else if message.contains("insufficient funds for gas") {
            Self::InsufficientGas
        } else if message.contains("execution reverted") {
            Self::ExecutionReverted
        } else {
            Self::Other(message.lines().next().unwrap_or_default().to_string())
        }
    }

    /// Classify raw revert data by its 4-byte selector.
    pub fn from_revert_data(data: &[u8]) -> Option<Self> {
        let selector = data.get(..4)?;
        CUSTOM_ERRORS
            .iter()
            .find(|(sig, _)| &keccak256(sig.as_bytes())[..4] == selector)
            .map(|(_, revert)| revert.clone())
    }

    /// Human-readable message.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether the failure came from the verifier rather than the wallet or node.
    pub fn is_contract_error(&self) -> bool {
        !matches!(
            self,
            Self::UserRejected | Self::InsufficientGas | Self::Other(_)
        )
    }
}
