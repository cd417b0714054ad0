//! Witness stack container.
//!
//! Segregated witness data attached to a transaction input: an ordered list
//! of byte strings, serialized as a compact-size count followed by each item
//! as compact-size length and bytes.

use std::fmt;

use ledger_primitives::util::{ByteReader, ByteWriter, VarInt};
use serde::{Deserialize, Serialize};

use crate::ScriptError;

/// The witness stack of a transaction input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptWitness {
    /// Stack items, bottom first.
    pub stack: Vec<Vec<u8>>,
}

impl ScriptWitness {
    /// Create an empty witness.
    pub fn new() -> Self {
        ScriptWitness { stack: Vec::new() }
    }

    /// Return true if the witness has no items.
    pub fn is_null(&self) -> bool {
        self.stack.is_empty()
    }

    /// Drop every item and release the stack's allocation.
    pub fn set_null(&mut self) {
        self.stack = Vec::new();
    }

    /// Push an item on top of the stack.
    pub fn push(&mut self, item: impl Into<Vec<u8>>) {
        self.stack.push(item.into());
    }

    /// Number of stack items.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Return true if the witness has no items.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Iterate over the items, bottom first.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.stack.iter().map(Vec::as_slice)
    }

    /// Write the witness in wire format.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_varint(VarInt::from(self.stack.len()));
        for item in &self.stack {
            writer.write_var_bytes(item);
        }
    }

    /// Read a witness in wire format.
    ///
    /// # Returns
    /// The witness, or a primitives error for a non-canonical or oversized
    /// count or length, or a truncated item.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, ScriptError> {
        let count = reader.read_compact_size()? as usize;
        // Each item needs at least its one-byte length, so this bounds the
        // allocation by the input size.
        let mut stack = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            let len = reader.read_compact_size()? as usize;
            stack.push(reader.read_bytes(len)?.to_vec());
        }
        Ok(ScriptWitness { stack })
    }
}

impl fmt::Display for ScriptWitness {
    /// Display as `ScriptWitness(hex, hex, ...)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptWitness(")?;
        for (i, item) in self.stack.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", hex::encode(item))?;
        }
        write!(f, ")")
    }
}
