/// Unified error type for all primitives operations.
///
/// Covers errors from Base58 decoding, checksum validation and wire reads.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("non-canonical compact size")]
    NonCanonicalCompactSize,

    #[error("compact size {0} exceeds maximum")]
    CompactSizeTooLarge(u64),

    #[error("unexpected end of data")]
    UnexpectedEof,
}

