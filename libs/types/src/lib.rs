//! Types library for the Compact client
//!
//! Value types shared by every layer of the client: the identifiers the
//! verifying contract keys balances by, the enumerations it fixes, and the
//! parsers that turn boundary strings into them.
//!
//! # Version
//! v1.0.0 - Frozen against the deployed verifier's bit layout
//!
//! # Modules
//! - `ids`: Lock tags, resource ids, allocator ids, scope and reset period
//! - `numeric`: Token unit parsing and formatting
//! - `parse`: Hex/decimal boundary parsing (addresses, hashes, ids)
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod parse;
pub mod errors;

pub use alloy_primitives::{Address, Bytes, B256, U256};

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::parse::*;
    pub use crate::errors::*;
    pub use alloy_primitives::{Address, Bytes, B256, U256};
}
