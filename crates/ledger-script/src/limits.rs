//! Consensus limits the classifier relies on.
//!
//! These are not configurable: two nodes using different values would
//! classify the same bytes differently.

/// Scripts longer than this are unspendable.
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum size of a single pushed element.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Sigops charged for a CHECKMULTISIG whose key count is not known.
pub const MAX_PUBKEYS_PER_MULTISIG: u32 = 20;

/// Smallest and largest witness program length.
pub const MIN_WITNESS_PROGRAM_SIZE: usize = 2;
pub const MAX_WITNESS_PROGRAM_SIZE: usize = 40;
