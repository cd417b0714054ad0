//! Script classification.
//!
//! Pure predicates over a script's bytes: template matching (P2PKH, P2SH,
//! P2WSH, witness programs, bare multisig), push-only and well-formedness
//! checks, the unspendable test, and signature-operation counting. These run
//! over untrusted data, so every one of them is total: malformed input gives
//! `false` or a partial count, never an error or a panic.

use crate::chunk::Chunks;
use crate::limits::{
    MAX_PUBKEYS_PER_MULTISIG, MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPT_SIZE,
    MAX_WITNESS_PROGRAM_SIZE, MIN_WITNESS_PROGRAM_SIZE,
};
use crate::opcodes::*;
use crate::{Script, ScriptError};

impl Script {
    // -----------------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------------

    /// Check if this is a Pay-to-Public-Key-Hash (P2PKH) output script.
    ///
    /// Pattern: OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    pub fn is_p2pkh(&self) -> bool {
        let b = self.to_bytes();
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// Check if this is a Pay-to-Script-Hash (P2SH) output script.
    ///
    /// Exactly `OP_HASH160 <20 bytes> OP_EQUAL`, 23 bytes; no other
    /// encoding of the same pattern qualifies.
    pub fn is_pay_to_script_hash(&self) -> bool {
        let b = self.to_bytes();
        b.len() == 23
            && b[0] == OP_HASH160
            && b[1] == OP_DATA_20
            && b[22] == OP_EQUAL
    }

    /// Check if this is a Pay-to-Witness-Script-Hash output script.
    ///
    /// Exactly `OP_0 <32 bytes>`, 34 bytes.
    pub fn is_pay_to_witness_script_hash(&self) -> bool {
        let b = self.to_bytes();
        b.len() == 34 && b[0] == OP_0 && b[1] == OP_DATA_32
    }

    /// Extract the witness version and program.
    ///
    /// A witness program is a version opcode (OP_0 or OP_1..OP_16) followed by
    /// a single direct push of 2 to 40 bytes, and nothing else.
    ///
    /// # Returns
    /// `Some((version, program))` if the script matches, `None` otherwise.
    pub fn witness_program(&self) -> Option<(u8, &[u8])> {
        let b = self.to_bytes();
        if b.len() < MIN_WITNESS_PROGRAM_SIZE + 2 || b.len() > MAX_WITNESS_PROGRAM_SIZE + 2 {
            return None;
        }
        let version = decode_op_n(b[0])?;
        if b[1] as usize + 2 != b.len() {
            return None;
        }
        Some((version, &b[2..]))
    }

    /// Check if this script is a witness program of any version.
    pub fn is_witness_program(&self) -> bool {
        self.witness_program().is_some()
    }

    /// Check if this is a bare multisig output script.
    ///
    /// Pattern: OP_M <pubkey1> ... <pubkeyN> OP_N OP_CHECKMULTISIG
    pub fn is_multisig_out(&self) -> bool {
        let parts: Vec<_> = match self.chunks().collect::<Result<_, _>>() {
            Ok(p) => p,
            Err(_) => return false,
        };
        if parts.len() < 3 || !is_small_int_op(parts[0].op) {
            return false;
        }
        let keys_ok = parts[1..parts.len() - 2]
            .iter()
            .all(|chunk| matches!(chunk.data, Some(d) if !d.is_empty()));
        let second_last = &parts[parts.len() - 2];
        let last = &parts[parts.len() - 1];
        keys_ok && is_small_int_op(second_last.op) && last.op == OP_CHECKMULTISIG
    }

    /// Extract the public key hash from a P2PKH script.
    ///
    /// # Returns
    /// The 20-byte hash, `EmptyScript` for an empty script, or `NotP2PKH`.
    pub fn public_key_hash(&self) -> Result<[u8; 20], ScriptError> {
        if self.is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        if !self.is_p2pkh() {
            return Err(ScriptError::NotP2PKH);
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&self.to_bytes()[3..23]);
        Ok(hash)
    }

    // -----------------------------------------------------------------------
    // Shape checks
    // -----------------------------------------------------------------------

    /// Check that the whole script consists of push operations.
    ///
    /// Push-type means any opcode up to OP_16, which includes OP_1NEGATE and
    /// OP_RESERVED. A malformed push makes the script not push-only.
    pub fn is_push_only(&self) -> bool {
        self.is_push_only_from(0)
    }

    /// Check that the script is push-only from byte offset `pos` onwards.
    pub fn is_push_only_from(&self, pos: usize) -> bool {
        Chunks::starting_at(self.to_bytes(), pos)
            .all(|chunk| matches!(chunk, Ok(c) if c.op <= OP_16))
    }

    /// Check that every opcode decodes and is defined.
    ///
    /// Fails on the first truncated push, the first byte above `MAX_OPCODE`,
    /// or the first pushed element larger than `MAX_SCRIPT_ELEMENT_SIZE`.
    pub fn has_valid_ops(&self) -> bool {
        self.chunks().all(|chunk| match chunk {
            Ok(c) => {
                !is_invalid_opcode(c.op)
                    && c.data.map_or(true, |d| d.len() <= MAX_SCRIPT_ELEMENT_SIZE)
            }
            Err(_) => false,
        })
    }

    /// Returns whether the script is guaranteed to fail at execution,
    /// regardless of the initial stack.
    ///
    /// True when the first byte is OP_RETURN or the script is longer than
    /// `MAX_SCRIPT_SIZE`. Such outputs can be dropped from the unspent set
    /// as soon as they are created.
    pub fn is_unspendable(&self) -> bool {
        let b = self.to_bytes();
        b.first() == Some(&OP_RETURN) || b.len() > MAX_SCRIPT_SIZE
    }

    // -----------------------------------------------------------------------
    // Signature operations
    // -----------------------------------------------------------------------

    /// Count signature operations in this script.
    ///
    /// CHECKSIG and CHECKSIGVERIFY count 1. CHECKMULTISIG and
    /// CHECKMULTISIGVERIFY count 20, except in accurate mode when directly
    /// preceded by OP_1..OP_16, where they count that number. The flat 20 in
    /// legacy mode is the historical rule and must not change. Counting stops
    /// at the first malformed opcode; what was counted so far is returned.
    pub fn sig_op_count(&self, accurate: bool) -> u32 {
        count_sig_ops(self.to_bytes(), accurate)
    }

    /// Count signature operations, looking through pay-to-script-hash.
    ///
    /// If this script is not P2SH, this is the accurate count of the script
    /// itself. Otherwise the cost is that of the redeem script revealed by
    /// `script_sig`: its last pushed element, counted accurately. A
    /// `script_sig` that is malformed or contains a non-push opcode counts 0.
    pub fn p2sh_sig_op_count(&self, script_sig: &Script) -> u32 {
        if !self.is_pay_to_script_hash() {
            return self.sig_op_count(true);
        }

        let mut redeem: &[u8] = &[];
        for chunk in script_sig.chunks() {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    tracing::trace!(error = %e, "malformed scriptSig under P2SH, counting 0 sigops");
                    return 0;
                }
            };
            if chunk.op > OP_16 {
                tracing::trace!(
                    opcode = opcode_to_string(chunk.op),
                    "non-push scriptSig under P2SH, counting 0 sigops"
                );
                return 0;
            }
            redeem = chunk.data.unwrap_or(&[]);
        }
        count_sig_ops(redeem, true)
    }
}

fn count_sig_ops(bytes: &[u8], accurate: bool) -> u32 {
    let mut count: u32 = 0;
    let mut last_op = OP_INVALIDOPCODE;
    for chunk in Chunks::new(bytes) {
        let Ok(chunk) = chunk else { break };
        let cost = match chunk.op {
            OP_CHECKSIG | OP_CHECKSIGVERIFY => 1,
            OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => match last_op {
                // OP_0 is not a key count here; it falls through to 20.
                OP_1..=OP_16 if accurate => (last_op - OP_1 + 1) as u32,
                _ => MAX_PUBKEYS_PER_MULTISIG,
            },
            _ => 0,
        };
        count = count.wrapping_add(cost);
        last_op = chunk.op;
    }
    count
}
