//! Opcode reader.
//!
//! A script chunk is one opcode plus, for push opcodes, the operand it
//! pushes. `read_op` decodes exactly one chunk and advances a cursor past
//! it; everything else in the crate that interprets script bytes is built on
//! top of it. The reader never reads past the end of the slice: an
//! overrunning length field or operand is reported as `DataTooSmall`.

use std::iter::FusedIterator;

use crate::opcodes::*;
use crate::ScriptError;

/// A single decoded element of a script.
///
/// `data` borrows the operand from the script bytes. It is `Some` for every
/// push-length opcode and for OP_0 (an empty operand), and `None` for all
/// other opcodes, including OP_1NEGATE and OP_1..OP_16.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptChunk<'a> {
    /// The opcode byte. For direct pushes (1-75 bytes), this is the length.
    pub op: u8,
    /// The pushed operand, if this chunk is a push operation.
    pub data: Option<&'a [u8]>,
}

impl ScriptChunk<'_> {
    /// Convert this chunk to its ASM string representation.
    ///
    /// Data pushes are rendered as hex; everything else by opcode name.
    pub fn to_asm_string(&self) -> String {
        if is_push_length_opcode(self.op) {
            if let Some(data) = self.data {
                return hex::encode(data);
            }
        }
        opcode_to_string(self.op).to_string()
    }
}

/// Read a single opcode and its operand starting at `*pos`.
///
/// Decoding rules, in order: a direct push (1..=75) takes the next `op`
/// bytes; OP_PUSHDATA1/2/4 read a 1/2/4-byte little-endian length and then
/// that many bytes; any other opcode has no operand.
///
/// # Arguments
/// * `bytes` - The script bytes.
/// * `pos` - Cursor, advanced past the chunk on success.
///
/// # Returns
/// The decoded chunk, `IndexOutOfRange` if `*pos` is at the end, or
/// `DataTooSmall` if the length field or operand is truncated. On failure
/// `*pos` is left where it was and the parse must not be resumed.
pub fn read_op<'a>(bytes: &'a [u8], pos: &mut usize) -> Result<ScriptChunk<'a>, ScriptError> {
    let op = *bytes.get(*pos).ok_or(ScriptError::IndexOutOfRange)?;
    let mut cursor = *pos + 1;

    if op > OP_PUSHDATA4 {
        *pos = cursor;
        return Ok(ScriptChunk { op, data: None });
    }

    let length = match op {
        OP_PUSHDATA1 => read_length(bytes, &mut cursor, 1)?,
        OP_PUSHDATA2 => read_length(bytes, &mut cursor, 2)?,
        OP_PUSHDATA4 => read_length(bytes, &mut cursor, 4)?,
        // OP_0 and direct pushes: the opcode is the length.
        _ => op as usize,
    };

    let rest = &bytes[cursor..];
    if rest.len() < length {
        return Err(ScriptError::DataTooSmall);
    }
    *pos = cursor + length;
    Ok(ScriptChunk { op, data: Some(&rest[..length]) })
}

fn read_length(bytes: &[u8], cursor: &mut usize, width: usize) -> Result<usize, ScriptError> {
    let field = bytes
        .get(*cursor..*cursor + width)
        .ok_or(ScriptError::DataTooSmall)?;
    let mut le = [0u8; 4];
    le[..width].copy_from_slice(field);
    *cursor += width;
    Ok(u32::from_le_bytes(le) as usize)
}

/// Iterator over the chunks of a script.
///
/// Yields `Err` once for the first malformed chunk and then stops.
#[derive(Clone, Debug)]
pub struct Chunks<'a> {
    bytes: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Chunks<'a> {
    /// Iterate from the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::starting_at(bytes, 0)
    }

    /// Iterate from byte offset `pos`.
    pub fn starting_at(bytes: &'a [u8], pos: usize) -> Self {
        Chunks { bytes, pos, failed: false }
    }

    /// Offset of the next chunk to be read.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<ScriptChunk<'a>, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.bytes.len() {
            return None;
        }
        match read_op(self.bytes, &mut self.pos) {
            Ok(chunk) => Some(Ok(chunk)),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Chunks<'_> {}

/// Decode raw script bytes into a vector of chunks.
///
/// # Returns
/// All chunks, or the error of the first malformed one.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk<'_>>, ScriptError> {
    Chunks::new(bytes).collect()
}

/// Compute the push prefix for a payload of the given length.
///
/// Lengths below 76 use a single length byte, then OP_PUSHDATA1 up to 255,
/// OP_PUSHDATA2 up to 65535 and OP_PUSHDATA4 beyond. This is the only
/// encoding the crate emits, which keeps pushes canonical and comparable.
///
/// # Returns
/// The prefix bytes, or `DataTooBig` if the length does not fit in 4 bytes.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len < OP_PUSHDATA1 as usize {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xff {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xffff {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len as u64 <= 0xffff_ffff {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}
