/// Ledger SDK - Hashing, Base58Check and binary wire helpers.
///
/// This crate provides the primitives the script crate consumes at its
/// boundary:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
/// - Base58 and Base58Check encoding
/// - Compact-size integers and cursor-based byte readers/writers

pub mod hash;
pub mod base58;
pub mod util;

mod error;
pub use error::PrimitivesError;
