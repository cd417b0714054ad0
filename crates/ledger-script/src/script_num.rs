//! Script number encoding.
//!
//! Numbers pushed onto the script stack are little-endian sign-magnitude byte
//! strings: the most significant bit of the last byte is the sign. Zero is the
//! empty string, and a minimal encoding never ends in a redundant 0x00/0x80
//! byte.

use crate::ScriptError;

/// Serialize an integer as a minimal script number.
///
/// # Arguments
/// * `value` - Any `i64`, including `i64::MIN`.
///
/// # Returns
/// The minimal little-endian sign-magnitude encoding (at most 9 bytes).
pub fn serialize(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }

    let negative = value < 0;
    let mut abs = value.unsigned_abs();
    let mut result = Vec::with_capacity(9);
    while abs > 0 {
        result.push((abs & 0xff) as u8);
        abs >>= 8;
    }

    // The top bit is the sign; if the magnitude already uses it, add a byte.
    let last = result.len() - 1;
    if result[last] & 0x80 != 0 {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        result[last] |= 0x80;
    }
    result
}

/// Parse a script number.
///
/// # Arguments
/// * `bytes` - The encoded number.
/// * `max_len` - Longest encoding accepted (at most 8).
/// * `require_minimal` - Reject encodings with a redundant top byte.
///
/// # Returns
/// The decoded value, or `InvalidScriptNumber`.
pub fn deserialize(bytes: &[u8], max_len: usize, require_minimal: bool) -> Result<i64, ScriptError> {
    if bytes.len() > max_len.min(8) {
        return Err(ScriptError::InvalidScriptNumber(format!(
            "{} bytes exceeds the max allowed of {}",
            bytes.len(),
            max_len.min(8)
        )));
    }
    if require_minimal && !is_minimally_encoded(bytes) {
        return Err(ScriptError::InvalidScriptNumber(format!(
            "{} is not minimally encoded",
            hex::encode(bytes)
        )));
    }
    let Some((&last, _)) = bytes.split_last() else {
        return Ok(0);
    };

    let mut magnitude: u64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        magnitude |= (b as u64) << (8 * i);
    }
    if last & 0x80 == 0 {
        return Ok(magnitude as i64);
    }
    magnitude &= !(0x80u64 << (8 * (bytes.len() - 1)));
    Ok((magnitude as i64).wrapping_neg())
}

/// Check that the encoding has no redundant most significant byte.
pub fn is_minimally_encoded(bytes: &[u8]) -> bool {
    match bytes {
        [] => true,
        // The last byte may only be 0x00/0x80 when the byte before it needs
        // its top bit for magnitude.
        [.., prev, last] if last & 0x7f == 0 => prev & 0x80 != 0,
        [last] => last & 0x7f != 0,
        _ => true,
    }
}
