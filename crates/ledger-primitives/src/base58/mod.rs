//! Base58 encoding and decoding with optional checksum support.
//!
//! Base58Check (payload followed by the first four bytes of its SHA-256d)
//! is the textual form of legacy addresses. The script crate only consumes
//! the decoded `(version, hash)` pair.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Encode a byte slice to a Base58 string using the Bitcoin alphabet.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string to a byte vector.
///
/// Leading '1' characters decode to leading zero bytes.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or an error for invalid characters.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode a byte slice with a 4-byte double-SHA-256 checksum appended.
///
/// # Arguments
/// * `data` - The bytes to encode (typically version byte + payload).
///
/// # Returns
/// A Base58Check-encoded string.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = Vec::with_capacity(data.len() + 4);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum[..4]);
    encode(&payload)
}

/// Decode a Base58Check string, verifying and stripping the 4-byte checksum.
///
/// # Returns
/// The payload without checksum, or an error for invalid encoding or a
/// checksum mismatch.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = decode(s)?;
    if decoded.len() < 4 {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let (payload, checksum) = decoded.split_at(decoded.len() - 4);
    let expected = sha256d(payload);
    if checksum != &expected[..4] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_empty_string() {
        assert_eq!(encode(&[]), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_base58_decoded_address() {
        let input = hex::decode("00010966776006953D5567439E5E39F86A0D273BEED61967F6").unwrap();
        assert_eq!(encode(&input), "16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM");
        assert_eq!(decode("16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM").unwrap(), input);
    }

    #[test]
    fn test_base58_leading_zeros() {
        let input = hex::decode("000000287FB4CD").unwrap();
        assert_eq!(encode(&input), "111233QC4");
    }

    #[test]
    fn test_base58_decode_invalid_character() {
        assert!(decode("invalid!@#$%").is_err());
    }

    #[test]
    fn test_base58_check_roundtrip() {
        let payload = hex::decode("00f54a5851e9372b87810a8e60cdd2e7cfd80b6e31").unwrap();
        let encoded = check_encode(&payload);
        assert_eq!(check_decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_base58_check_bad_checksum() {
        let payload = vec![0x80, 0x01, 0x02, 0x03];
        let mut encoded = check_encode(&payload);
        let last = encoded.pop().unwrap();
        encoded.push(if last == '1' { '2' } else { '1' });
        assert!(check_decode(&encoded).is_err());
    }

    #[test]
    fn test_base58_check_too_short() {
        // "1" decodes to a single zero byte, too short to hold a checksum.
        assert!(matches!(
            check_decode("1"),
            Err(PrimitivesError::InvalidBase58(_))
        ));
    }
}
